use phpgen_ast::{Modifiers, Param};

use super::{AttributeSpec, TypeSpec, ValueSpec, attribute};
use crate::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    name: String,
    ty: Option<TypeSpec>,
    default: Option<ValueSpec>,
    by_ref: bool,
    variadic: bool,
    doc_hint: Option<String>,
    modifiers: Modifiers,
    attributes: Vec<AttributeSpec>,
}

impl ParameterSpec {
    /// A parameter named `name`, without the `$`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            default: None,
            by_ref: false,
            variadic: false,
            doc_hint: None,
            modifiers: Modifiers::NONE,
            attributes: Vec::new(),
        }
    }

    pub fn ty(mut self, ty: TypeSpec) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn default(mut self, value: ValueSpec) -> Self {
        self.default = Some(value);
        self
    }

    pub fn by_ref(mut self) -> Self {
        self.by_ref = true;
        self
    }

    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    /// Type shown in the method's `@param` tag instead of the native one.
    pub fn doc_hint(mut self, hint: impl Into<String>) -> Self {
        self.doc_hint = Some(hint.into());
        self
    }

    /// Constructor promotion: `public readonly int $id`.
    pub fn promote(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn attribute(mut self, attribute: AttributeSpec) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_spec(&self) -> Option<&TypeSpec> {
        self.ty.as_ref()
    }

    pub fn default_value(&self) -> Option<&ValueSpec> {
        self.default.as_ref()
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    /// Realize the parameter; `typed` controls the native type declaration.
    pub fn to_param(&self, typed: bool) -> Result<Param> {
        Ok(Param {
            name: self.name.clone(),
            ty: self.ty.as_ref().filter(|_| typed).map(TypeSpec::to_hint),
            default: self.default.as_ref().map(ValueSpec::materialize).transpose()?,
            by_ref: self.by_ref,
            variadic: self.variadic,
            modifiers: self.modifiers,
            attributes: attribute::realize_all(&self.attributes)?,
        })
    }

    /// `int $id` for the method's `@param` tag, when one is needed.
    pub(crate) fn doc_line(&self, typed: bool) -> Option<String> {
        let hint = match (&self.doc_hint, &self.ty) {
            (Some(hint), _) => hint.clone(),
            (None, Some(ty)) if !typed => ty.doc_type(),
            _ => return None,
        };
        let spread = if self.variadic { "..." } else { "" };
        Some(format!("{hint} {spread}${}", self.name))
    }

    pub(crate) fn set_doc_hint(&mut self, hint: Option<String>) {
        self.doc_hint = hint;
    }

    pub(crate) fn set_type(&mut self, ty: Option<TypeSpec>) {
        self.ty = ty;
    }

    pub fn from_param(param: &Param) -> Self {
        Self {
            name: param.name.clone(),
            ty: param.ty.as_ref().map(TypeSpec::from_hint),
            default: param.default.as_ref().map(ValueSpec::from_expr),
            by_ref: param.by_ref,
            variadic: param.variadic,
            doc_hint: None,
            modifiers: param.modifiers,
            attributes: attribute::recover_all(&param.attributes),
        }
    }
}
