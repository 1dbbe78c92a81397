//! `phpgen.toml` configuration: generator defaults, printer indentation and
//! the PSR-4 autoload map used to place generated files.

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod config;
mod error;
mod validate;

pub use config::{AutoloadConfig, CONFIG_FILENAME, Config, GeneratorConfig};
pub use error::{Error, Result, SourceContext};
