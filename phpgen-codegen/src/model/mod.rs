//! Declaration model: mutable descriptions of members before they are
//! realized into AST nodes.
//!
//! Member specs use consuming builder methods (`PropertySpec::new("id").private()`);
//! the aggregates in [`crate::builder`] own them in name-keyed ordered maps.

mod attribute;
mod constant;
mod doc;
mod method;
mod parameter;
mod property;
mod types;
mod value;

pub use attribute::{AttributeArg, AttributeSpec};
pub use constant::ConstSpec;
pub use doc::DocBlock;
pub use method::MethodSpec;
pub use parameter::ParameterSpec;
pub use property::PropertySpec;
pub use types::{BUILTIN_TYPES, TypeSpec};
pub use value::{ValueKind, ValueSpec};

pub(crate) use attribute::{realize_all as realize_attributes, recover_all as recover_attributes};

/// A `[A-Za-z_][A-Za-z0-9_]*` identifier.
pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Identifiers separated by `\`, without a leading separator.
pub(crate) fn is_qualified_name(s: &str) -> bool {
    !s.is_empty() && s.split('\\').all(is_identifier)
}

/// Class and namespace names compare without their leading `\` and
/// case-insensitively, like PHP resolves them.
pub(crate) fn name_key(name: &str) -> String {
    name.trim_start_matches('\\').to_ascii_lowercase()
}

pub(crate) fn same_name(a: &str, b: &str) -> bool {
    a.trim_start_matches('\\')
        .eq_ignore_ascii_case(b.trim_start_matches('\\'))
}
