use std::cmp::Ordering;

use phpgen_ast::{Ast, Modifiers, NodeCategory, NodeId, NodeKind, Parser};
use phpgen_config::GeneratorConfig;

use super::{
    FileSpec, Identity, MemberMap, normalize_namespace, scaffold,
    scan::{FileScan, Members, decoration},
};
use crate::{
    Error, MutationPass, Result,
    merge::{
        ClassDeclarationPass, ConstantPass, ExtendsPass, ImplementsPass, Import, MethodPass,
        PropertyPass, TraitUsePass,
    },
    model::{AttributeSpec, ConstSpec, MethodSpec, PropertySpec},
};

/// Label given to anonymous classes read back from a file.
const ANONYMOUS_LABEL: &str = "anonymous";

/// Everything needed to generate or extend one PHP class.
///
/// Setters take `&mut self` and return it for chaining:
///
/// ```ignore
/// let mut user = ClassBuilder::from_scratch("User");
/// user.set_namespace("App\\Model")
///     .set_final(true)
///     .add_property(PropertySpec::new("id").private().ty("int".parse()?));
/// ```
///
/// `add_*` on a name the builder already holds replaces the old member.
/// The merge passes, however, never touch a member already present in the
/// target file.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassBuilder {
    name: Option<String>,
    label: String,
    namespace: Option<String>,
    strict: bool,
    typed: bool,
    modifiers: Modifiers,
    extends: Option<String>,
    implements: MemberMap<String>,
    imports: MemberMap<Import>,
    traits: MemberMap<String>,
    constants: MemberMap<ConstSpec>,
    properties: MemberMap<PropertySpec>,
    methods: MemberMap<MethodSpec>,
    doc_comment: Option<String>,
    attributes: Vec<AttributeSpec>,
}

impl ClassBuilder {
    fn empty(name: Option<String>, label: String) -> Self {
        Self {
            name,
            label,
            namespace: None,
            strict: true,
            typed: true,
            modifiers: Modifiers::NONE,
            extends: None,
            implements: MemberMap::new(),
            imports: MemberMap::new(),
            traits: MemberMap::new(),
            constants: MemberMap::new(),
            properties: MemberMap::new(),
            methods: MemberMap::new(),
            doc_comment: None,
            attributes: Vec::new(),
        }
    }

    /// A new named class; strict and typed until configured otherwise.
    pub fn from_scratch(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::empty(Some(name.clone()), name)
    }

    /// An anonymous class (`return new class { ... };`). The label names the
    /// file and tells anonymous classes apart in a collection.
    pub fn anonymous(label: impl Into<String>) -> Self {
        Self::empty(None, label.into())
    }

    /// Rebuild from the first class in a parsed file.
    pub fn from_ast(ast: &Ast) -> Result<Self> {
        Self::from_nodes(ast, &[ast.root()]).ok_or(Error::NoDeclaration { kind: "class" })
    }

    /// Rebuild from the first class found under `nodes`, walking into
    /// namespaces. `None` when there is no class.
    pub fn from_nodes(ast: &Ast, nodes: &[NodeId]) -> Option<Self> {
        let scan = FileScan::walk(ast, nodes, |node| node.category() == NodeCategory::Class);
        Self::from_scan(ast, scan)
    }

    pub(crate) fn from_scan(ast: &Ast, scan: FileScan) -> Option<Self> {
        let id = scan.declaration()?;
        let node = ast.node(id);
        let NodeKind::Class(decl) = &node.kind else {
            return None;
        };
        let members = Members::collect(ast, id);
        let (doc_comment, attributes) = decoration(node);
        let typed = members.typed();
        Some(Self {
            name: decl.name.clone(),
            label: decl.name.clone().unwrap_or_else(|| ANONYMOUS_LABEL.into()),
            namespace: scan.namespace,
            strict: scan.strict,
            typed,
            modifiers: decl.modifiers,
            extends: decl.extends.clone(),
            implements: decl.implements.iter().cloned().collect(),
            imports: scan.imports.into_iter().collect(),
            traits: members.traits.into_iter().collect(),
            constants: members.constants.into_iter().collect(),
            properties: members.properties.into_iter().collect(),
            methods: members.methods.into_iter().collect(),
            doc_comment,
            attributes,
        })
    }

    /// Take the strict marker and typing defaults from the configuration.
    pub fn apply_config(&mut self, config: &GeneratorConfig) -> &mut Self {
        self.strict = config.strict_types;
        self.typed = config.typed;
        self
    }

    /// `None` for an anonymous class.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) -> &mut Self {
        self.label = label.into();
        self
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Leading and trailing `\` are dropped; an empty name means the global
    /// namespace.
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

    /// When off, every member is realized with doc block hints instead of
    /// native types.
    pub fn set_typed(&mut self, typed: bool) -> &mut Self {
        self.typed = typed;
        self
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn is_final(&self) -> bool {
        self.modifiers.is_final()
    }

    pub fn set_final(&mut self, enabled: bool) -> &mut Self {
        self.modifiers.set(Modifiers::FINAL, enabled);
        self
    }

    pub fn is_abstract(&self) -> bool {
        self.modifiers.is_abstract()
    }

    pub fn set_abstract(&mut self, enabled: bool) -> &mut Self {
        self.modifiers.set(Modifiers::ABSTRACT, enabled);
        self
    }

    pub fn is_readonly(&self) -> bool {
        self.modifiers.contains(Modifiers::READONLY)
    }

    pub fn set_readonly(&mut self, enabled: bool) -> &mut Self {
        self.modifiers.set(Modifiers::READONLY, enabled);
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

    pub fn set_attributes(&mut self, attributes: impl IntoIterator<Item = AttributeSpec>) -> &mut Self {
        self.attributes = attributes.into_iter().collect();
        self
    }

    // extends

    pub fn extends(&self) -> Option<&str> {
        self.extends.as_deref()
    }

    pub fn has_extends(&self) -> bool {
        self.extends.is_some()
    }

    pub fn set_extends(&mut self, parent: impl Into<String>) -> &mut Self {
        self.extends = Some(parent.into());
        self
    }

    pub fn remove_extends(&mut self) -> &mut Self {
        self.extends = None;
        self
    }

    // implements

    pub fn implements(&self) -> &MemberMap<String> {
        &self.implements
    }

    pub fn has_implements(&self, interface: &str) -> bool {
        self.implements.contains(interface)
    }

    pub fn add_implements(&mut self, interface: impl Into<String>) -> &mut Self {
        self.implements.add(interface.into());
        self
    }

    pub fn set_implements(
        &mut self,
        interfaces: impl IntoIterator<Item = impl Into<String>>,
    ) -> &mut Self {
        self.implements.set(interfaces.into_iter().map(Into::into));
        self
    }

    pub fn remove_implements(&mut self, interface: &str) -> &mut Self {
        self.implements.remove(interface);
        self
    }

    pub fn sort_implements(&mut self, cmp: impl FnMut(&String, &String) -> Ordering) -> &mut Self {
        self.implements.sort_by(cmp);
        self
    }

    // imports

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

    // traits

    pub fn traits(&self) -> &MemberMap<String> {
        &self.traits
    }

    pub fn has_trait(&self, name: &str) -> bool {
        self.traits.contains(name)
    }

    pub fn add_trait(&mut self, name: impl Into<String>) -> &mut Self {
        self.traits.add(name.into());
        self
    }

    pub fn set_traits(&mut self, names: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.traits.set(names.into_iter().map(Into::into));
        self
    }

    pub fn remove_trait(&mut self, name: &str) -> &mut Self {
        self.traits.remove(name);
        self
    }

    pub fn sort_traits(&mut self, cmp: impl FnMut(&String, &String) -> Ordering) -> &mut Self {
        self.traits.sort_by(cmp);
        self
    }

    // constants

    pub fn constants(&self) -> &MemberMap<ConstSpec> {
        &self.constants
    }

    pub fn constant(&self, name: &str) -> Option<&ConstSpec> {
        self.constants.get(name)
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

    // properties

    pub fn properties(&self) -> &MemberMap<PropertySpec> {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertySpec> {
        self.properties.get(name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains(name)
    }

    pub fn add_property(&mut self, property: PropertySpec) -> &mut Self {
        self.properties.add(property);
        self
    }

    pub fn set_properties(
        &mut self,
        properties: impl IntoIterator<Item = PropertySpec>,
    ) -> &mut Self {
        self.properties.set(properties);
        self
    }

    pub fn remove_property(&mut self, name: &str) -> &mut Self {
        self.properties.remove(name);
        self
    }

    pub fn sort_properties(
        &mut self,
        cmp: impl FnMut(&PropertySpec, &PropertySpec) -> Ordering,
    ) -> &mut Self {
        self.properties.sort_by(cmp);
        self
    }

    // methods

    pub fn methods(&self) -> &MemberMap<MethodSpec> {
        &self.methods
    }

    pub fn method(&self, name: &str) -> Option<&MethodSpec> {
        self.methods.get(name)
    }

    pub fn method_mut(&mut self, name: &str) -> Option<&mut MethodSpec> {
        self.methods.get_mut(name)
    }

    /// Case-insensitive, like PHP method names.
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

impl FileSpec for ClassBuilder {
    fn identity(&self) -> Identity {
        let namespace = self.namespace.clone();
        match &self.name {
            Some(name) => Identity::Named {
                namespace,
                name: name.clone(),
            },
            None => Identity::Anonymous {
                namespace,
                label: self.label.clone(),
            },
        }
    }

    fn generate<'a>(&self, parser: &'a dyn Parser) -> Vec<Box<dyn MutationPass + 'a>> {
        let class = &self.name;
        let mut passes = scaffold(self.strict, self.namespace.as_deref(), &self.imports);

        passes.push(Box::new(
            ClassDeclarationPass::new(class.clone())
                .modifiers(self.modifiers)
                .doc(self.doc_comment.clone())
                .attributes(self.attributes.clone()),
        ));
        if let Some(parent) = &self.extends {
            passes.push(Box::new(ExtendsPass::new(class.clone(), parent.clone())));
        }
        if !self.implements.is_empty() {
            passes.push(Box::new(ImplementsPass::new(
                class.clone(),
                self.implements.names(),
            )));
        }
        if !self.traits.is_empty() {
            passes.push(Box::new(TraitUsePass::new(class.clone(), self.traits.names())));
        }
        for constant in self.constants.iter() {
            passes.push(Box::new(ConstantPass::new(class.clone(), constant.clone())));
        }
        for property in self.properties.iter() {
            let property = property.clone().typed(self.typed && property.is_typed());
            passes.push(Box::new(PropertyPass::new(class.clone(), property)));
        }
        for method in self.methods.iter() {
            let method = method.clone().typed(self.typed && method.is_typed());
            passes.push(Box::new(MethodPass::new(class.clone(), method, parser)));
        }
        passes
    }

    fn as_class_mut(&mut self) -> Option<&mut ClassBuilder> {
        Some(self)
    }
}
