use std::{fmt, str::FromStr};

use phpgen_ast::TypeHint;

use super::is_qualified_name;
use crate::{Error, Result};

/// Type names PHP resolves without an import. Matched case-insensitively.
pub const BUILTIN_TYPES: [&str; 17] = [
    "array", "bool", "callable", "float", "int", "iterable", "mixed", "never", "null", "object",
    "self", "static", "parent", "string", "void", "false", "true",
];

/// Built-ins that already include `null` or cannot carry it.
const NEVER_NULLABLE: [&str; 4] = ["void", "mixed", "null", "never"];

/// A parsed type declaration such as `?int` or `\Foo\Bar`.
///
/// ```
/// use phpgen_codegen::TypeSpec;
///
/// let ty: TypeSpec = "?int".parse().unwrap();
/// assert!(ty.is_nullable());
/// assert_eq!(ty.doc_type(), "int|null");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeSpec {
    nullable: bool,
    base: String,
    builtin: bool,
    fully_qualified: bool,
}

impl TypeSpec {
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// The type without nullability or leading `\`. Built-ins are lowercased.
    pub fn base_type(&self) -> &str {
        &self.base
    }

    /// `[base]`, or `[base, "null"]` for nullable types.
    pub fn as_type_list(&self) -> Vec<String> {
        let mut list = vec![self.qualified_base()];
        if self.nullable {
            list.push("null".to_string());
        }
        list
    }

    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    /// The AST type node for a native declaration.
    pub fn to_hint(&self) -> TypeHint {
        TypeHint {
            nullable: self.nullable,
            name: self.qualified_base(),
        }
    }

    /// The doc block form, `int|null` for `?int`.
    pub fn doc_type(&self) -> String {
        self.as_type_list().join("|")
    }

    /// Rebuild a spec from a parsed type node. Hints outside the single-type
    /// grammar (unions, intersections) are kept as written.
    pub fn from_hint(hint: &TypeHint) -> Self {
        hint.to_string().parse().unwrap_or_else(|_| Self {
            nullable: hint.nullable,
            base: hint.name.clone(),
            builtin: false,
            fully_qualified: false,
        })
    }

    /// Inverse of [`TypeSpec::doc_type`]; `None` when `doc` is some other
    /// doc type such as `list<int>`.
    pub(crate) fn from_doc_type(doc: &str) -> Option<Self> {
        let ty: Self = match doc.strip_suffix("|null") {
            Some(base) => format!("?{base}").parse().ok()?,
            None => doc.parse().ok()?,
        };
        (ty.doc_type() == doc).then_some(ty)
    }

    fn qualified_base(&self) -> String {
        if self.fully_qualified {
            format!("\\{}", self.base)
        } else {
            self.base.clone()
        }
    }
}

impl FromStr for TypeSpec {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let (nullable, rest) = match trimmed.strip_prefix('?') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (fully_qualified, name) = match rest.strip_prefix('\\') {
            Some(name) => (true, name),
            None => (false, rest),
        };
        if !is_qualified_name(name) {
            return Err(Error::invalid_type(
                raw,
                "expected identifiers separated by '\\'",
            ));
        }

        let lower = name.to_ascii_lowercase();
        let builtin = BUILTIN_TYPES.contains(&lower.as_str());
        if builtin && fully_qualified {
            return Err(Error::invalid_type(raw, "built-in types cannot be namespaced"));
        }
        if builtin && nullable && NEVER_NULLABLE.contains(&lower.as_str()) {
            return Err(Error::invalid_type(
                raw,
                format!("{lower} cannot be marked nullable"),
            ));
        }

        Ok(Self {
            nullable,
            base: if builtin { lower } else { name.to_string() },
            builtin,
            fully_qualified,
        })
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<TypeSpec> {
        raw.parse()
    }

    #[test]
    fn test_nullable_builtin() {
        let ty = parse("?int").unwrap();
        assert!(ty.is_nullable());
        assert!(ty.is_builtin());
        assert_eq!(ty.base_type(), "int");
        assert_eq!(ty.as_type_list(), vec!["int", "null"]);
        assert_eq!(ty.to_hint(), TypeHint::nullable("int"));
    }

    #[test]
    fn test_fully_qualified_user_type() {
        let ty = parse("\\Foo\\Bar").unwrap();
        assert!(!ty.is_nullable());
        assert!(!ty.is_builtin());
        assert_eq!(ty.base_type(), "Foo\\Bar");
        assert_eq!(ty.to_string(), "\\Foo\\Bar");
        assert_eq!(ty.doc_type(), "\\Foo\\Bar");
    }

    #[test]
    fn test_builtins_are_case_insensitive() {
        let ty = parse("STRING").unwrap();
        assert!(ty.is_builtin());
        assert_eq!(ty.to_string(), "string");
    }

    #[test]
    fn test_nullable_void_is_rejected() {
        let err = parse("?void").unwrap_err();
        assert!(matches!(err, Error::InvalidType { ref reason, .. } if reason.contains("void")));
        assert!(parse("?mixed").is_err());
        assert!(parse("void").is_ok());
    }

    #[test]
    fn test_namespaced_builtin_is_rejected() {
        let err = parse("\\int").unwrap_err();
        assert!(
            matches!(err, Error::InvalidType { ref reason, .. } if reason.contains("namespaced"))
        );
    }

    #[test]
    fn test_grammar_errors() {
        for raw in ["", "?", "Foo\\", "int|string", "1abc", "Foo Bar"] {
            assert!(parse(raw).is_err(), "{raw:?} should not parse");
        }
    }

    #[test]
    fn test_from_doc_type() {
        assert_eq!(TypeSpec::from_doc_type("int|null"), parse("?int").ok());
        assert_eq!(TypeSpec::from_doc_type("\\Foo"), parse("\\Foo").ok());
        assert_eq!(TypeSpec::from_doc_type("list<int>"), None);
        assert_eq!(TypeSpec::from_doc_type("INT"), None);
    }

    #[test]
    fn test_from_hint_keeps_union_types() {
        let ty = TypeSpec::from_hint(&TypeHint::new("int|string"));
        assert_eq!(ty.to_hint(), TypeHint::new("int|string"));
        assert_eq!(
            TypeSpec::from_hint(&TypeHint::nullable("Foo")),
            parse("?Foo").unwrap()
        );
    }
}
