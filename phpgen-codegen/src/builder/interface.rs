use std::cmp::Ordering;

use phpgen_ast::{Ast, NodeCategory, NodeId, NodeKind, Parser};
use phpgen_config::GeneratorConfig;

use super::{
    FileSpec, Identity, MemberMap, normalize_namespace, scaffold,
    scan::{FileScan, Members, decoration},
};
use crate::{
    Error, MutationPass, Result,
    merge::{ConstantPass, Import, InterfaceDeclarationPass, InterfaceExtendsPass, MethodPass},
    model::{AttributeSpec, ConstSpec, MethodSpec},
};

/// Everything needed to generate or extend one PHP interface. Same shape
/// as [`super::ClassBuilder`], minus properties, traits and `implements`;
/// an interface may extend several parents.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceBuilder {
    name: String,
    namespace: Option<String>,
    strict: bool,
    typed: bool,
    extends: MemberMap<String>,
    imports: MemberMap<Import>,
    constants: MemberMap<ConstSpec>,
    methods: MemberMap<MethodSpec>,
    doc_comment: Option<String>,
    attributes: Vec<AttributeSpec>,
}

impl InterfaceBuilder {
    pub fn from_scratch(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            strict: true,
            typed: true,
            extends: MemberMap::new(),
            imports: MemberMap::new(),
            constants: MemberMap::new(),
            methods: MemberMap::new(),
            doc_comment: None,
            attributes: Vec::new(),
        }
    }

    /// Rebuild from the first interface in a parsed file.
    pub fn from_ast(ast: &Ast) -> Result<Self> {
        Self::from_nodes(ast, &[ast.root()]).ok_or(Error::NoDeclaration { kind: "interface" })
    }

    pub fn from_nodes(ast: &Ast, nodes: &[NodeId]) -> Option<Self> {
        let scan = FileScan::walk(ast, nodes, |node| {
            node.category() == NodeCategory::Interface
        });
        Self::from_scan(ast, scan)
    }

    pub(crate) fn from_scan(ast: &Ast, scan: FileScan) -> Option<Self> {
        let id = scan.declaration()?;
        let node = ast.node(id);
        let NodeKind::Interface(decl) = &node.kind else {
            return None;
        };
        let members = Members::collect(ast, id);
        let (doc_comment, attributes) = decoration(node);
        let typed = members.typed();
        Some(Self {
            name: decl.name.clone(),
            namespace: scan.namespace,
            strict: scan.strict,
            typed,
            extends: decl.extends.iter().cloned().collect(),
            imports: scan.imports.into_iter().collect(),
            constants: members.constants.into_iter().collect(),
            methods: members.methods.into_iter().collect(),
            doc_comment,
            attributes,
        })
    }

    pub fn apply_config(&mut self, config: &GeneratorConfig) -> &mut Self {
        self.strict = config.strict_types;
        self.typed = config.typed;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn set_namespace(&mut self, namespace: impl AsRef<str>) -> &mut Self {
        self.namespace = normalize_namespace(namespace.as_ref());
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn set_strict(&mut self, strict: bool) -> &mut Self {
        self.strict = strict;
        self
    }

    pub fn is_typed(&self) -> bool {
        self.typed
    }

    pub fn set_typed(&mut self, typed: bool) -> &mut Self {
        self.typed = typed;
        self
    }

    pub fn doc_comment(&self) -> Option<&str> {
        self.doc_comment.as_deref()
    }

    pub fn set_doc_comment(&mut self, comment: impl Into<String>) -> &mut Self {
        self.doc_comment = Some(comment.into());
        self
    }

    pub fn attributes(&self) -> &[AttributeSpec] {
        &self.attributes
    }

    pub fn add_attribute(&mut self, attribute: AttributeSpec) -> &mut Self {
        self.attributes.push(attribute);
        self
    }

    pub fn extends(&self) -> &MemberMap<String> {
        &self.extends
    }

    pub fn has_extends(&self, parent: &str) -> bool {
        self.extends.contains(parent)
    }

    pub fn add_extends(&mut self, parent: impl Into<String>) -> &mut Self {
        self.extends.add(parent.into());
        self
    }

    pub fn set_extends(&mut self, parents: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.extends.set(parents.into_iter().map(Into::into));
        self
    }

    pub fn remove_extends(&mut self, parent: &str) -> &mut Self {
        self.extends.remove(parent);
        self
    }

    pub fn sort_extends(&mut self, cmp: impl FnMut(&String, &String) -> Ordering) -> &mut Self {
        self.extends.sort_by(cmp);
        self
    }

    pub fn imports(&self) -> &MemberMap<Import> {
        &self.imports
    }

    pub fn has_import(&self, name: &str) -> bool {
        self.imports.contains(name)
    }

    pub fn add_import(&mut self, import: Import) -> &mut Self {
        self.imports.add(import);
        self
    }

    pub fn set_imports(&mut self, imports: impl IntoIterator<Item = Import>) -> &mut Self {
        self.imports.set(imports);
        self
    }

    pub fn remove_import(&mut self, name: &str) -> &mut Self {
        self.imports.remove(name);
        self
    }

    pub fn sort_imports(&mut self, cmp: impl FnMut(&Import, &Import) -> Ordering) -> &mut Self {
        self.imports.sort_by(cmp);
        self
    }

    pub fn constants(&self) -> &MemberMap<ConstSpec> {
        &self.constants
    }

    pub fn has_constant(&self, name: &str) -> bool {
        self.constants.contains(name)
    }

    pub fn add_constant(&mut self, constant: ConstSpec) -> &mut Self {
        self.constants.add(constant);
        self
    }

    pub fn set_constants(&mut self, constants: impl IntoIterator<Item = ConstSpec>) -> &mut Self {
        self.constants.set(constants);
        self
    }

    pub fn remove_constant(&mut self, name: &str) -> &mut Self {
        self.constants.remove(name);
        self
    }

    pub fn sort_constants(
        &mut self,
        cmp: impl FnMut(&ConstSpec, &ConstSpec) -> Ordering,
    ) -> &mut Self {
        self.constants.sort_by(cmp);
        self
    }

    pub fn methods(&self) -> &MemberMap<MethodSpec> {
        &self.methods
    }

    pub fn method(&self, name: &str) -> Option<&MethodSpec> {
        self.methods.get(name)
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains(name)
    }

    pub fn add_method(&mut self, method: MethodSpec) -> &mut Self {
        self.methods.add(method);
        self
    }

    pub fn set_methods(&mut self, methods: impl IntoIterator<Item = MethodSpec>) -> &mut Self {
        self.methods.set(methods);
        self
    }

    pub fn remove_method(&mut self, name: &str) -> &mut Self {
        self.methods.remove(name);
        self
    }

    pub fn sort_methods(
        &mut self,
        cmp: impl FnMut(&MethodSpec, &MethodSpec) -> Ordering,
    ) -> &mut Self {
        self.methods.sort_by(cmp);
        self
    }
}

impl FileSpec for InterfaceBuilder {
    fn identity(&self) -> Identity {
        Identity::Named {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
        }
    }

    fn generate<'a>(&self, parser: &'a dyn Parser) -> Vec<Box<dyn MutationPass + 'a>> {
        let mut passes = scaffold(self.strict, self.namespace.as_deref(), &self.imports);
        passes.push(Box::new(
            InterfaceDeclarationPass::new(&self.name)
                .doc(self.doc_comment.clone())
                .attributes(self.attributes.clone()),
        ));
        if !self.extends.is_empty() {
            passes.push(Box::new(InterfaceExtendsPass::new(
                &self.name,
                self.extends.names(),
            )));
        }
        let target = Some(self.name.clone());
        for constant in self.constants.iter() {
            passes.push(Box::new(ConstantPass::new(target.clone(), constant.clone())));
        }
        for method in self.methods.iter() {
            let method = method.clone().typed(self.typed && method.is_typed());
            passes.push(Box::new(MethodPass::new(target.clone(), method, parser)));
        }
        passes
    }
}

#[cfg(test)]
mod tests {
    use phpgen_ast::{PhpParser, PhpPrinter, Printer};

    use super::*;
    use crate::{ParameterSpec, Pipeline, ValueSpec};

    fn interface() -> InterfaceBuilder {
        let mut repo = InterfaceBuilder::from_scratch("UserRepository");
        repo.set_strict(true)
            .set_namespace("App\\Domain")
            .add_import(Import::new("App\\Model\\User"))
            .set_extends(["\\Countable", "Traversable"])
            .add_constant(ConstSpec::new("PAGE_SIZE", ValueSpec::new(20)))
            .add_method(
                MethodSpec::new("find")
                    .param(ParameterSpec::new("id").ty("int".parse().unwrap()))
                    .returns("?User".parse().unwrap()),
            );
        repo
    }

    #[test]
    fn test_generate_interface() {
        let parser = PhpParser::new();
        let mut ast = parser.parse("").unwrap();
        let repo = interface();
        let mut pipeline = Pipeline::new();
        repo.inject_visitors(&mut pipeline, &parser);
        pipeline.run(&mut ast).unwrap();
        let printed = PhpPrinter::default().print(&ast);
        insta::assert_snapshot!(printed, @r"
<?php

declare(strict_types=1);

namespace App\Domain;

use App\Model\User;

interface UserRepository extends \Countable, Traversable
{
    public const PAGE_SIZE = 20;

    public function find(int $id): ?User;
}
");

        let reparsed = parser.parse(&printed).unwrap();
        assert_eq!(InterfaceBuilder::from_ast(&reparsed).unwrap(), repo);
    }

    #[test]
    fn test_extends_is_a_set() {
        let mut repo = InterfaceBuilder::from_scratch("Repo");
        repo.add_extends("Countable")
            .add_extends("\\countable")
            .add_extends("Traversable")
            .remove_extends("traversable");
        assert_eq!(repo.extends().len(), 1);
        assert!(repo.has_extends("Countable"));
    }
}
