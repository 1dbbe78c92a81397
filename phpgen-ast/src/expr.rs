//! Expression and type-hint nodes.
//!
//! Only the literal subset needed for constant values, property defaults and
//! parameter defaults is modeled structurally. Everything else is carried as
//! [`Expr::Raw`] source text.

use std::fmt;

/// An expression attached to a declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<ArrayItem>),
    /// Constant fetch: `PHP_EOL`, `\Foo\BAR`.
    Const(String),
    /// Class constant fetch: `self::FOO`, `Foo::class`.
    ClassConst { class: String, name: String },
    /// Opaque expression kept as source text.
    Raw(String),
}

/// One entry of an array literal.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayItem {
    pub key: Option<Expr>,
    pub value: Expr,
}

impl ArrayItem {
    pub fn value(value: Expr) -> Self {
        Self { key: None, value }
    }

    pub fn keyed(key: Expr, value: Expr) -> Self {
        Self {
            key: Some(key),
            value,
        }
    }
}

impl Expr {
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    pub fn raw(source: impl Into<String>) -> Self {
        Self::Raw(source.into())
    }

    pub fn class_const(class: impl Into<String>, name: impl Into<String>) -> Self {
        Self::ClassConst {
            class: class.into(),
            name: name.into(),
        }
    }

    /// Whether this expression is a plain literal (recursively for arrays).
    pub fn is_literal(&self) -> bool {
        match self {
            Self::Null | Self::Bool(_) | Self::Int(_) | Self::Float(_) | Self::String(_) => true,
            Self::Array(items) => items.iter().all(|item| {
                item.key.as_ref().is_none_or(Expr::is_literal) && item.value.is_literal()
            }),
            Self::Const(_) | Self::ClassConst { .. } | Self::Raw(_) => false,
        }
    }
}

/// Quote a string as a PHP single-quoted literal.
pub fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else if value.abs() >= 1e15 {
        format!("{value:e}")
    } else {
        value.to_string()
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{}", format_float(*value)),
            Self::String(value) => write!(f, "{}", quote_string(value)),
            Self::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    if let Some(key) = &item.key {
                        write!(f, "{key} => ")?;
                    }
                    write!(f, "{}", item.value)?;
                }
                write!(f, "]")
            }
            Self::Const(name) => write!(f, "{name}"),
            Self::ClassConst { class, name } => write!(f, "{class}::{name}"),
            Self::Raw(source) => write!(f, "{source}"),
        }
    }
}

/// A declared type: `int`, `?Foo\Bar`, `int|string`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeHint {
    pub nullable: bool,
    pub name: String,
}

impl TypeHint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            nullable: false,
            name: name.into(),
        }
    }

    pub fn nullable(name: impl Into<String>) -> Self {
        Self {
            nullable: true,
            name: name.into(),
        }
    }
}

impl fmt::Display for TypeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "?")?;
        }
        write!(f, "{}", self.name)
    }
}
