use phpgen_ast::Attribute;

use super::ValueSpec;
use crate::Result;

/// One argument of an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeArg {
    /// Source text used as written: `'users'`, `name: 'id'`.
    Source(String),
    Value(ValueSpec),
}

/// `#[Name(args...)]`
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSpec {
    name: String,
    args: Vec<AttributeArg>,
}

impl AttributeSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Append an argument given as source text.
    pub fn arg(mut self, source: impl Into<String>) -> Self {
        self.args.push(AttributeArg::Source(source.into()));
        self
    }

    /// Append an argument encoded from a value.
    pub fn value(mut self, value: ValueSpec) -> Self {
        self.args.push(AttributeArg::Value(value));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[AttributeArg] {
        &self.args
    }

    pub fn to_attribute(&self) -> Result<Attribute> {
        let args = self
            .args
            .iter()
            .map(|arg| match arg {
                AttributeArg::Source(source) => Ok(source.clone()),
                AttributeArg::Value(value) => Ok(value.materialize()?.to_string()),
            })
            .collect::<Result<_>>()?;
        Ok(Attribute {
            name: self.name.clone(),
            args,
        })
    }

    pub fn from_attribute(attribute: &Attribute) -> Self {
        Self {
            name: attribute.name.clone(),
            args: attribute
                .args
                .iter()
                .cloned()
                .map(AttributeArg::Source)
                .collect(),
        }
    }
}

pub(crate) fn realize_all(attributes: &[AttributeSpec]) -> Result<Vec<Attribute>> {
    attributes.iter().map(AttributeSpec::to_attribute).collect()
}

pub(crate) fn recover_all(attributes: &[Attribute]) -> Vec<AttributeSpec> {
    attributes.iter().map(AttributeSpec::from_attribute).collect()
}
