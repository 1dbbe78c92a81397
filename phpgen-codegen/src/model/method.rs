use indexmap::IndexMap;
use phpgen_ast::{MethodDecl, Modifiers, Node, NodeKind, Parser};

use super::{AttributeSpec, DocBlock, ParameterSpec, TypeSpec, attribute};
use crate::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct MethodSpec {
    name: String,
    params: IndexMap<String, ParameterSpec>,
    return_type: Option<TypeSpec>,
    by_ref: bool,
    body: Option<String>,
    modifiers: Modifiers,
    typed: bool,
    doc_comment: Option<String>,
    doc_return_type: Option<String>,
    doc_block: Option<DocBlock>,
    attributes: Vec<AttributeSpec>,
}

impl MethodSpec {
    /// A public, typed method with an empty body.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: IndexMap::new(),
            return_type: None,
            by_ref: false,
            body: None,
            modifiers: Modifiers::PUBLIC,
            typed: true,
            doc_comment: None,
            doc_return_type: None,
            doc_block: None,
            attributes: Vec::new(),
        }
    }

    /// Add a parameter, replacing one with the same name in place.
    pub fn param(mut self, param: ParameterSpec) -> Self {
        self.params.insert(param.name().to_string(), param);
        self
    }

    pub fn returns(mut self, ty: TypeSpec) -> Self {
        self.return_type = Some(ty);
        self
    }

    /// Return by reference: `function &items()`.
    pub fn by_ref(mut self) -> Self {
        self.by_ref = true;
        self
    }

    /// Statements between the braces, parsed when the method is realized.
    pub fn body(mut self, source: impl Into<String>) -> Self {
        self.body = Some(source.into());
        self
    }

    pub fn public(mut self) -> Self {
        self.modifiers = self.modifiers.with_visibility(Modifiers::PUBLIC);
        self
    }

    pub fn protected(mut self) -> Self {
        self.modifiers = self.modifiers.with_visibility(Modifiers::PROTECTED);
        self
    }

    pub fn private(mut self) -> Self {
        self.modifiers = self.modifiers.with_visibility(Modifiers::PRIVATE);
        self
    }

    pub fn modifier(mut self, flag: Modifiers) -> Self {
        self.modifiers.insert(flag);
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// When false, parameter and return types go to `@param`/`@return`.
    pub fn typed(mut self, typed: bool) -> Self {
        self.typed = typed;
        self
    }

    pub fn doc(mut self, comment: impl Into<String>) -> Self {
        self.doc_comment = Some(comment.into());
        self
    }

    /// Type shown in `@return` instead of the declared one.
    pub fn doc_return(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_return_type = Some(doc_type.into());
        self
    }

    /// Use this block as the whole doc comment.
    pub fn doc_block(mut self, block: DocBlock) -> Self {
        self.doc_block = Some(block);
        self
    }

    pub fn attribute(mut self, attribute: AttributeSpec) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.params.values()
    }

    pub fn has_param(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn remove_param(&mut self, name: &str) -> Option<ParameterSpec> {
        self.params.shift_remove(name)
    }

    pub fn return_type(&self) -> Option<&TypeSpec> {
        self.return_type.as_ref()
    }

    pub fn body_source(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn is_typed(&self) -> bool {
        self.typed
    }

    fn render_doc(&self) -> Option<String> {
        if let Some(block) = &self.doc_block {
            return block.render();
        }
        let mut doc = DocBlock::new();
        if let Some(comment) = &self.doc_comment {
            doc = doc.summary(comment);
        }
        for line in self.params().filter_map(|p| p.doc_line(self.typed)) {
            doc = doc.tag("param", line);
        }
        let returns = match (&self.doc_return_type, &self.return_type) {
            (Some(doc_type), _) => Some(doc_type.clone()),
            (None, Some(ty)) if !self.typed => Some(ty.doc_type()),
            _ => None,
        };
        if let Some(returns) = returns {
            doc = doc.tag("return", returns);
        }
        doc.render()
    }

    /// Realize the method. Interface and abstract methods get no body;
    /// otherwise the body source goes through `parser`.
    pub fn to_node(&self, parser: &dyn Parser, in_interface: bool) -> Result<Node> {
        let body = if in_interface || self.modifiers.is_abstract() {
            None
        } else {
            Some(parser.parse_body(self.body.as_deref().unwrap_or_default())?)
        };
        let decl = MethodDecl {
            name: self.name.clone(),
            modifiers: self.modifiers,
            by_ref: self.by_ref,
            params: self
                .params()
                .map(|p| p.to_param(self.typed))
                .collect::<Result<_>>()?,
            return_type: self
                .return_type
                .as_ref()
                .filter(|_| self.typed)
                .map(TypeSpec::to_hint),
            body,
        };
        Ok(Node::new(NodeKind::Method(decl))
            .with_doc(self.render_doc())
            .with_attributes(attribute::realize_all(&self.attributes)?))
    }

    pub fn from_node(node: &Node) -> Option<Self> {
        let NodeKind::Method(decl) = &node.kind else {
            return None;
        };
        let doc = node.doc.as_deref().map(DocBlock::parse).unwrap_or_default();
        let native = decl.return_type.is_some() || decl.params.iter().any(|p| p.ty.is_some());
        let documented = doc.tags().any(|(tag, _)| tag == "param" || tag == "return");
        let typed = native || !documented;

        let mut params: IndexMap<String, ParameterSpec> = decl
            .params
            .iter()
            .map(|p| (p.name.clone(), ParameterSpec::from_param(p)))
            .collect();
        let mut return_type = decl.return_type.as_ref().map(TypeSpec::from_hint);
        let mut doc_return_type = None;
        let mut extra_tags = false;

        for (tag, value) in doc.tags() {
            match tag {
                "param" => {
                    let Some((hint, name)) = split_param_tag(value) else {
                        extra_tags = true;
                        continue;
                    };
                    let Some(param) = params.get_mut(name) else {
                        extra_tags = true;
                        continue;
                    };
                    match TypeSpec::from_doc_type(hint).filter(|_| !typed) {
                        Some(ty) => param.set_type(Some(ty)),
                        None => param.set_doc_hint(Some(hint.to_string())),
                    }
                }
                "return" => match TypeSpec::from_doc_type(value).filter(|_| !typed) {
                    Some(ty) => return_type = Some(ty),
                    None => doc_return_type = Some(value.to_string()),
                },
                _ => extra_tags = true,
            }
        }

        Some(Self {
            name: decl.name.clone(),
            params,
            return_type,
            by_ref: decl.by_ref,
            body: decl
                .body
                .as_ref()
                .map(|body| body.lines().join("\n"))
                .filter(|source| !source.is_empty()),
            modifiers: decl.modifiers,
            typed,
            doc_comment: doc.summary_text(),
            doc_return_type,
            doc_block: extra_tags.then_some(doc),
            attributes: attribute::recover_all(&node.attributes),
        })
    }
}

/// `int|null ...$ids` to `("int|null", "ids")`.
fn split_param_tag(value: &str) -> Option<(&str, &str)> {
    let (hint, var) = value.split_once(char::is_whitespace)?;
    let var = var.split_whitespace().next()?;
    let name = var
        .trim_start_matches('&')
        .trim_start_matches("...")
        .strip_prefix('$')?;
    Some((hint, name))
}
