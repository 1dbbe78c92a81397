//! Incremental PHP code generation on top of the phpgen AST.
//!
//! Generators describe classes and interfaces with builders, which turn
//! into ordered mutation passes. Each pass adds one element to a parsed (or
//! empty) file when it is missing and leaves everything else alone, so a
//! generator can run against its own earlier output, hand edits included.
//!
//! # Module Organization
//!
//! - [`model`] - Member specs, type and value encoders
//! - [`merge`] - The mutation passes and their insertion rules
//! - [`builder`] - Class and interface aggregates
//! - [`collection`] - Builders keyed by namespace and name
//! - [`resolver`] - Namespace to directory mapping
//! - [`generator`] - Batch realization into printed files
//! - [`accessors`] - Getters and constants derived from properties

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

pub mod accessors;
pub mod builder;
pub mod collection;
mod error;
pub mod generator;
pub mod merge;
pub mod model;
mod pass;
pub mod resolver;

pub use accessors::{add_class_constants_for_properties, add_getter_methods_for_properties};
pub use builder::{ClassBuilder, FileBuilder, FileSpec, Identity, InterfaceBuilder, MemberMap};
pub use collection::BuilderCollection;
pub use error::{Error, Result};
pub use generator::{GeneratedFiles, Generator, existing_file};
pub use merge::Import;
pub use model::{
    AttributeArg, AttributeSpec, ConstSpec, DocBlock, MethodSpec, ParameterSpec, PropertySpec,
    TypeSpec, ValueKind, ValueSpec,
};
pub use pass::{MutationPass, Outcome, PassRecord, Pipeline, PipelineReport};
pub use resolver::{PathResolver, Psr4Resolver};
