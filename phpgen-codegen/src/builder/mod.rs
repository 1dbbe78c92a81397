//! Builder aggregates: a full class or interface description that turns
//! itself into an ordered list of mutation passes.
//!
//! - [`ClassBuilder`] and [`InterfaceBuilder`] hold the declaration model
//! - [`FileSpec`] is the capability the generator works against
//! - [`FileBuilder`] wraps either aggregate for mixed collections
//! - [`MemberMap`] is the name-keyed ordered map both aggregates use

mod class;
mod interface;
mod members;
mod scan;

use std::fmt;

pub use class::ClassBuilder;
pub use interface::InterfaceBuilder;
pub use members::{Keyed, MemberMap};
use phpgen_ast::{Ast, NodeCategory, NodeId, Parser};

use crate::{
    Error, MutationPass, Pipeline, Result,
    merge::{Import, ImportsPass, NamespacePass, StrictTypesPass},
};

/// Identity key of a generated file: namespace plus declaration name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Identity {
    Named {
        namespace: Option<String>,
        name: String,
    },
    /// Anonymous classes are told apart by a caller-chosen label, which also
    /// names their file.
    Anonymous {
        namespace: Option<String>,
        label: String,
    },
}

impl Identity {
    pub fn namespace(&self) -> Option<&str> {
        match self {
            Self::Named { namespace, .. } | Self::Anonymous { namespace, .. } => {
                namespace.as_deref()
            }
        }
    }

    /// File name without extension.
    pub fn file_stem(&self) -> &str {
        match self {
            Self::Named { name, .. } => name,
            Self::Anonymous { label, .. } => label,
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(namespace) = self.namespace() {
            write!(f, "{namespace}\\")?;
        }
        match self {
            Self::Named { name, .. } => write!(f, "{name}"),
            Self::Anonymous { label, .. } => write!(f, "{label} (anonymous class)"),
        }
    }
}

/// Something that can be realized into one PHP file.
pub trait FileSpec {
    fn identity(&self) -> Identity;

    /// The passes that realize this declaration, in pipeline order.
    fn generate<'a>(&self, parser: &'a dyn Parser) -> Vec<Box<dyn MutationPass + 'a>>;

    /// Append [`FileSpec::generate`] to an existing pipeline.
    fn inject_visitors<'a>(&self, pipeline: &mut Pipeline<'a>, parser: &'a dyn Parser) {
        pipeline.extend(self.generate(parser));
    }

    /// The class being built, if this is one.
    fn as_class_mut(&mut self) -> Option<&mut ClassBuilder> {
        None
    }
}

/// Strict marker, namespace and imports: the head of every pipeline.
fn scaffold<'a>(
    strict: bool,
    namespace: Option<&str>,
    imports: &MemberMap<Import>,
) -> Vec<Box<dyn MutationPass + 'a>> {
    let mut passes: Vec<Box<dyn MutationPass + 'a>> = Vec::new();
    if strict {
        passes.push(Box::new(StrictTypesPass));
    }
    if let Some(namespace) = namespace {
        passes.push(Box::new(NamespacePass::new(namespace)));
    }
    if !imports.is_empty() {
        passes.push(Box::new(ImportsPass::new(imports.iter().cloned())));
    }
    passes
}

/// `None` for an empty or all-separator namespace.
fn normalize_namespace(namespace: &str) -> Option<String> {
    let namespace = namespace.trim_matches('\\');
    (!namespace.is_empty()).then(|| namespace.to_string())
}

/// Either kind of aggregate.
#[derive(Debug, Clone, PartialEq)]
pub enum FileBuilder {
    Class(ClassBuilder),
    Interface(InterfaceBuilder),
}

impl FileBuilder {
    /// Rebuild from the first class or interface in a parsed file.
    pub fn from_ast(ast: &Ast) -> Result<Self> {
        Self::from_nodes(ast, &[ast.root()]).ok_or(Error::NoDeclaration {
            kind: "class or interface",
        })
    }

    pub fn from_nodes(ast: &Ast, nodes: &[NodeId]) -> Option<Self> {
        let scan = scan::FileScan::walk(ast, nodes, |_| true);
        match scan.declaration().map(|id| ast.category(id)) {
            Some(NodeCategory::Interface) => {
                InterfaceBuilder::from_scan(ast, scan).map(Self::Interface)
            }
            Some(_) => ClassBuilder::from_scan(ast, scan).map(Self::Class),
            None => None,
        }
    }
}

impl FileSpec for FileBuilder {
    fn identity(&self) -> Identity {
        match self {
            Self::Class(class) => class.identity(),
            Self::Interface(interface) => interface.identity(),
        }
    }

    fn generate<'a>(&self, parser: &'a dyn Parser) -> Vec<Box<dyn MutationPass + 'a>> {
        match self {
            Self::Class(class) => class.generate(parser),
            Self::Interface(interface) => interface.generate(parser),
        }
    }

    fn as_class_mut(&mut self) -> Option<&mut ClassBuilder> {
        match self {
            Self::Class(class) => Some(class),
            Self::Interface(_) => None,
        }
    }
}

impl From<ClassBuilder> for FileBuilder {
    fn from(class: ClassBuilder) -> Self {
        Self::Class(class)
    }
}

impl From<InterfaceBuilder> for FileBuilder {
    fn from(interface: InterfaceBuilder) -> Self {
        Self::Interface(interface)
    }
}

#[cfg(test)]
mod tests {
    use phpgen_ast::PhpParser;

    use super::*;

    #[test]
    fn test_identity_display() {
        let named = ClassBuilder::from_scratch("User").set_namespace("App\\Model").identity();
        assert_eq!(named.to_string(), "App\\Model\\User");
        assert_eq!(named.file_stem(), "User");

        let anonymous = ClassBuilder::anonymous("migration").identity();
        assert_eq!(anonymous.to_string(), "migration (anonymous class)");
        assert_eq!(anonymous.namespace(), None);
    }

    #[test]
    fn test_file_builder_picks_declaration_kind() {
        let ast = PhpParser::new()
            .parse("<?php\nnamespace App;\n\ninterface HasName {}\n")
            .unwrap();
        let builder = FileBuilder::from_ast(&ast).unwrap();
        assert!(matches!(builder, FileBuilder::Interface(_)));
        assert_eq!(builder.identity().namespace(), Some("App"));

        let empty = PhpParser::new().parse("<?php\n").unwrap();
        assert!(FileBuilder::from_ast(&empty).is_err());
    }

    #[test]
    fn test_inject_visitors_appends() {
        let parser = PhpParser::new();
        let class = ClassBuilder::from_scratch("Foo");
        let mut pipeline = Pipeline::new();
        class.inject_visitors(&mut pipeline, &parser);
        let names: Vec<_> = class.generate(&parser).iter().map(|p| p.name()).collect();
        assert_eq!(pipeline.pass_names(), names);
    }
}
