use phpgen_ast::{ArrayItem, Expr};
use serde_json::{Map, Number, Value};

use super::{is_identifier, is_qualified_name};
use crate::{Error, Result};

/// How a [`ValueSpec`] literal should be encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueKind {
    /// Pick the encoding from the literal's runtime kind.
    #[default]
    Auto,
    Null,
    Bool,
    Int,
    Float,
    String,
    Array,
    /// A string naming a constant: `PHP_EOL`, `self::FOO`, `Foo::class`.
    Constant,
    /// Opaque expression passed through as is.
    Other,
}

#[derive(Debug, Clone, PartialEq)]
enum Source {
    Literal(Value),
    /// Kept apart from JSON numbers, which cannot hold NaN or infinity.
    Float(f64),
    Expr(Expr),
}

/// A default or constant value, encoded into an [`Expr`] only when the
/// owning member is realized.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueSpec {
    source: Source,
    kind: ValueKind,
}

impl ValueSpec {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            source: Source::Literal(value.into()),
            kind: ValueKind::Auto,
        }
    }

    pub fn null() -> Self {
        Self::new(Value::Null)
    }

    pub fn float(value: f64) -> Self {
        Self {
            source: Source::Float(value),
            kind: ValueKind::Float,
        }
    }

    /// A constant reference such as `self::FOO` or `PHP_EOL`.
    pub fn constant(name: impl Into<String>) -> Self {
        Self::new(name.into()).with_kind(ValueKind::Constant)
    }

    /// An already built expression.
    pub fn expr(expr: Expr) -> Self {
        Self {
            source: Source::Expr(expr),
            kind: ValueKind::Other,
        }
    }

    /// Override the encoding picked for the literal.
    pub fn with_kind(mut self, kind: ValueKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn as_literal(&self) -> Option<&Value> {
        match &self.source {
            Source::Literal(value) => Some(value),
            Source::Float(_) | Source::Expr(_) => None,
        }
    }

    /// Encode into an expression node.
    pub fn materialize(&self) -> Result<Expr> {
        match &self.source {
            Source::Expr(expr) => Ok(expr.clone()),
            Source::Float(value) if value.is_finite() => Ok(Expr::Float(*value)),
            Source::Float(value) => Err(Error::unsupported_value(
                value,
                "floats must be finite",
            )),
            Source::Literal(value) => encode(value, self.kind),
        }
    }

    /// Recover a spec from a parsed expression: literals become plain values,
    /// constant fetches keep the constant kind, anything else stays opaque.
    pub fn from_expr(expr: &Expr) -> Self {
        match expr {
            Expr::Const(name) => Self::constant(name.clone()),
            Expr::ClassConst { class, name } => Self::constant(format!("{class}::{name}")),
            expr => match to_literal(expr) {
                Some(value) => Self::new(value),
                None => Self::expr(expr.clone()),
            },
        }
    }
}

impl From<Expr> for ValueSpec {
    fn from(expr: Expr) -> Self {
        Self::expr(expr)
    }
}

fn encode(value: &Value, kind: ValueKind) -> Result<Expr> {
    let mismatch = |expected: &str| Error::unsupported_value(value, format!("expected {expected}"));
    match kind {
        ValueKind::Auto | ValueKind::Other => encode_auto(value),
        ValueKind::Null => value.is_null().then_some(Expr::Null).ok_or_else(|| mismatch("null")),
        ValueKind::Bool => value.as_bool().map(Expr::Bool).ok_or_else(|| mismatch("a boolean")),
        ValueKind::Int => value.as_i64().map(Expr::Int).ok_or_else(|| mismatch("an integer")),
        ValueKind::Float => value
            .as_f64()
            .map(Expr::Float)
            .ok_or_else(|| mismatch("a number")),
        ValueKind::String => value
            .as_str()
            .map(Expr::string)
            .ok_or_else(|| mismatch("a string")),
        ValueKind::Array if value.is_array() || value.is_object() => encode_auto(value),
        ValueKind::Array => Err(mismatch("an array or object")),
        ValueKind::Constant => {
            let name = value.as_str().ok_or_else(|| mismatch("a constant name"))?;
            constant_fetch(name).ok_or_else(|| {
                Error::unsupported_value(value, "not a valid constant reference")
            })
        }
    }
}

fn encode_auto(value: &Value) -> Result<Expr> {
    Ok(match value {
        Value::Null => Expr::Null,
        Value::Bool(b) => Expr::Bool(*b),
        Value::Number(n) => encode_number(n)?,
        Value::String(s) => Expr::string(s.as_str()),
        Value::Array(items) => Expr::Array(
            items
                .iter()
                .map(|item| encode_auto(item).map(ArrayItem::value))
                .collect::<Result<_>>()?,
        ),
        Value::Object(map) => Expr::Array(
            map.iter()
                .map(|(key, item)| Ok(ArrayItem::keyed(array_key(key), encode_auto(item)?)))
                .collect::<Result<_>>()?,
        ),
    })
}

fn encode_number(n: &Number) -> Result<Expr> {
    if let Some(i) = n.as_i64() {
        return Ok(Expr::Int(i));
    }
    match n.as_f64() {
        Some(f) if f.is_finite() => Ok(Expr::Float(f)),
        _ => Err(Error::unsupported_value(n, "number is out of range")),
    }
}

/// Integer-like keys become ints, like PHP casts them.
fn array_key(key: &str) -> Expr {
    match key.parse::<i64>() {
        Ok(i) if i.to_string() == key => Expr::Int(i),
        _ => Expr::string(key),
    }
}

fn constant_fetch(name: &str) -> Option<Expr> {
    let valid_class = |class: &str| is_qualified_name(class.strip_prefix('\\').unwrap_or(class));
    match name.split_once("::") {
        Some((class, constant)) if valid_class(class) && is_identifier(constant) => {
            Some(Expr::class_const(class, constant))
        }
        Some(_) => None,
        None if valid_class(name) => Some(Expr::Const(name.to_string())),
        None => None,
    }
}

fn to_literal(expr: &Expr) -> Option<Value> {
    match expr {
        Expr::Null => Some(Value::Null),
        Expr::Bool(b) => Some(Value::Bool(*b)),
        Expr::Int(i) => Some(Value::from(*i)),
        Expr::Float(f) => Number::from_f64(*f).map(Value::Number),
        Expr::String(s) => Some(Value::String(s.clone())),
        Expr::Array(items) if items.iter().all(|item| item.key.is_none()) => items
            .iter()
            .map(|item| to_literal(&item.value))
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        Expr::Array(items) => {
            let mut map = Map::new();
            for item in items {
                let key = match item.key.as_ref()? {
                    Expr::Int(i) => i.to_string(),
                    Expr::String(s) => s.clone(),
                    _ => return None,
                };
                if map.insert(key, to_literal(&item.value)?).is_some() {
                    return None;
                }
            }
            Some(Value::Object(map))
        }
        Expr::Const(_) | Expr::ClassConst { .. } | Expr::Raw(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_auto_scalars() {
        assert_eq!(ValueSpec::null().materialize().unwrap(), Expr::Null);
        assert_eq!(ValueSpec::new(true).materialize().unwrap(), Expr::Bool(true));
        assert_eq!(ValueSpec::new(42).materialize().unwrap(), Expr::Int(42));
        assert_eq!(ValueSpec::new(1.5).materialize().unwrap(), Expr::Float(1.5));
        assert_eq!(
            ValueSpec::new("private").materialize().unwrap(),
            Expr::string("private")
        );
    }

    #[test]
    fn test_objects_become_keyed_arrays() {
        let value = ValueSpec::new(json!({"name": "Ada", "10": [1, 2]}));
        assert_eq!(
            value.materialize().unwrap().to_string(),
            "['name' => 'Ada', 10 => [1, 2]]"
        );
    }

    #[test]
    fn test_constant_kind() {
        let cases = [
            ("PHP_EOL", "PHP_EOL"),
            ("self::FOO", "self::FOO"),
            ("\\Foo\\Bar::class", "\\Foo\\Bar::class"),
        ];
        for (name, printed) in cases {
            let expr = ValueSpec::constant(name).materialize().unwrap();
            assert_eq!(expr.to_string(), printed);
        }
        assert!(matches!(
            ValueSpec::constant("self::").materialize(),
            Err(Error::UnsupportedValue { .. })
        ));
        assert!(ValueSpec::constant("not a name").materialize().is_err());
    }

    #[test]
    fn test_kind_mismatch_is_lazy() {
        let value = ValueSpec::new("abc").with_kind(ValueKind::Int);
        let err = value.materialize().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unsupported value \"abc\": expected an integer"
        );
    }

    #[test]
    fn test_non_finite_float() {
        assert!(ValueSpec::float(f64::NAN).materialize().is_err());
        assert!(ValueSpec::float(f64::INFINITY).materialize().is_err());
        assert_eq!(ValueSpec::float(0.5).materialize().unwrap(), Expr::Float(0.5));
    }

    #[test]
    fn test_explicit_kinds() {
        let float = ValueSpec::new(3).with_kind(ValueKind::Float);
        assert_eq!(float.materialize().unwrap(), Expr::Float(3.0));
        let array = ValueSpec::new("x").with_kind(ValueKind::Array);
        assert!(array.materialize().is_err());
    }

    #[test]
    fn test_from_expr_unwraps_literals() {
        let expr = Expr::Array(vec![
            ArrayItem::keyed(Expr::string("a"), Expr::Int(1)),
            ArrayItem::keyed(Expr::Int(2), Expr::Bool(false)),
        ]);
        let value = ValueSpec::from_expr(&expr);
        assert_eq!(value.as_literal(), Some(&json!({"a": 1, "2": false})));
        assert_eq!(value.materialize().unwrap(), expr);
    }

    #[test]
    fn test_from_expr_keeps_opaque_expressions() {
        let raw = Expr::raw("1 << 3");
        assert_eq!(ValueSpec::from_expr(&raw), ValueSpec::expr(raw.clone()));

        let fetch = Expr::class_const("self", "FOO");
        let value = ValueSpec::from_expr(&fetch);
        assert_eq!(value.kind(), ValueKind::Constant);
        assert_eq!(value.materialize().unwrap(), fetch);
    }
}
