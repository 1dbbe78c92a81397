//! Core utilities and types for phpgen.
//!
//! This crate provides file writing and naming helpers shared by the
//! phpgen crates.

mod file;
mod utils;

// File operations
pub use file::{File, WriteResult, read_if_exists};
// String utilities
pub use utils::{
    getter_name, to_camel_case, to_pascal_case, to_screaming_snake_case, to_snake_case,
};
