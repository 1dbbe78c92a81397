use std::path::PathBuf;

use miette::Diagnostic;
use phpgen_ast::ParseError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("invalid type '{ty}': {reason}")]
    #[diagnostic(code(phpgen::invalid_type))]
    InvalidType { ty: String, reason: String },

    #[error("unsupported value {value}: {reason}")]
    #[diagnostic(code(phpgen::unsupported_value))]
    UnsupportedValue { value: String, reason: String },

    #[error("class {class} already extends {existing}, cannot extend {requested}")]
    #[diagnostic(
        code(phpgen::inheritance_conflict),
        help("remove the existing extends clause by hand, or keep {existing} as the parent")
    )]
    InheritanceConflict {
        class: String,
        existing: String,
        requested: String,
    },

    #[error("cannot resolve a directory for namespace '{namespace}': {reason}")]
    #[diagnostic(
        code(phpgen::resolution),
        help("add a matching prefix under [autoload.psr-4] in phpgen.toml")
    )]
    Resolution { namespace: String, reason: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error("no class or interface named {name} in the file")]
    #[diagnostic(code(phpgen::missing_declaration))]
    MissingDeclaration { name: String },

    #[error("the file declares no {kind}")]
    #[diagnostic(code(phpgen::no_declaration))]
    NoDeclaration { kind: &'static str },

    #[error("failed to read '{path}'")]
    #[diagnostic(code(phpgen::io))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to generate {identity}")]
    #[diagnostic(code(phpgen::realization))]
    Realization {
        identity: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn invalid_type(ty: &str, reason: impl Into<String>) -> Self {
        Self::InvalidType {
            ty: ty.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported_value(value: impl ToString, reason: impl Into<String>) -> Self {
        Self::UnsupportedValue {
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// The innermost error, looking through [`Error::Realization`].
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::Realization { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
