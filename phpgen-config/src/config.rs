//! `phpgen.toml` schema and loading.

use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use indexmap::IndexMap;
use phpgen_ast::Indent;
use serde::Deserialize;

use crate::{Error, Result, error::SourceContext, validate::Validator};

/// Default filename used in diagnostics when parsing from a string.
pub const CONFIG_FILENAME: &str = "phpgen.toml";

/// Root of `phpgen.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Defaults applied to builders created from scratch, and printer style.
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Namespace to directory mapping.
    #[serde(default)]
    pub autoload: AutoloadConfig,

    /// Directory the config was loaded from; relative autoload paths are
    /// resolved against it.
    #[serde(skip)]
    root: PathBuf,
}

/// `[generator]`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Emit `declare(strict_types=1);` in new files.
    #[serde(default = "default_true")]
    pub strict_types: bool,

    /// Emit native type declarations for properties, parameters and return
    /// types. Untyped members get doc block hints instead.
    #[serde(default = "default_true")]
    pub typed: bool,

    /// Indent width in spaces; `0` means tabs.
    #[serde(default = "default_indent")]
    pub indent: u8,
}

fn default_true() -> bool {
    true
}

fn default_indent() -> u8 {
    4
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            strict_types: true,
            typed: true,
            indent: default_indent(),
        }
    }
}

impl GeneratorConfig {
    /// Printer indentation for this configuration.
    pub fn indent(&self) -> Indent {
        Indent::from_width(self.indent)
    }
}

/// `[autoload]`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AutoloadConfig {
    /// `"App\\" = "src/"` entries, in file order.
    #[serde(rename = "psr-4", default)]
    pub psr4: IndexMap<String, PathBuf>,
}

impl Config {
    /// Parse a phpgen.toml file from the given path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Box::new(Error::Io {
                path: path.to_path_buf(),
                source: e,
            })
        })?;
        let mut config = parse_config(&content, &path.display().to_string())?;
        config.root = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(config)
    }

    /// Parse from a string with a custom filename for error reporting.
    pub fn from_str_with_filename(content: &str, filename: &str) -> Result<Self> {
        parse_config(content, filename)
    }

    /// Directory relative autoload paths are resolved against. Empty when
    /// parsed from a string.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve relative autoload paths against `root`.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// PSR-4 entries with directories resolved against [`Config::root`].
    pub fn psr4_roots(&self) -> impl Iterator<Item = (&str, PathBuf)> + '_ {
        self.autoload
            .psr4
            .iter()
            .map(|(prefix, dir)| (prefix.as_str(), self.root.join(dir)))
    }
}

impl FromStr for Config {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        parse_config(s, CONFIG_FILENAME)
    }
}

/// Parse and validate configuration content.
fn parse_config(content: &str, filename: &str) -> Result<Config> {
    let source_ctx = SourceContext::new(content, filename);
    let config: Config = toml::from_str(content).map_err(|e| source_ctx.parse_error(e))?;
    Validator::new(&source_ctx).validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_empty_config() {
        let config: Config = "".parse().unwrap();
        assert!(config.generator.strict_types);
        assert!(config.generator.typed);
        assert_eq!(config.generator.indent(), Indent::Spaces(4));
        assert!(config.autoload.psr4.is_empty());
    }

    #[test]
    fn test_full_config() {
        let config: Config = r#"
            [generator]
            strict_types = false
            typed = false
            indent = 0

            [autoload.psr-4]
            "App\\" = "src/"
            "App\\Tests\\" = "tests/"
        "#
        .parse()
        .unwrap();

        assert!(!config.generator.strict_types);
        assert_eq!(config.generator.indent(), Indent::Tab);
        let prefixes: Vec<_> = config.autoload.psr4.keys().cloned().collect();
        assert_eq!(prefixes, vec!["App\\", "App\\Tests\\"]);
    }

    #[test]
    fn test_unknown_field_is_a_parse_error() {
        let err = "[generator]\nstrict = true\n".parse::<Config>().unwrap_err();
        assert!(matches!(*err, Error::Parse { .. }));
    }

    #[test]
    fn test_psr4_roots_join_root() {
        let config = "[autoload.psr-4]\n\"App\\\\\" = \"src\"\n"
            .parse::<Config>()
            .unwrap()
            .with_root("/project");
        let roots: Vec<_> = config.psr4_roots().collect();
        assert_eq!(roots, vec![("App\\", PathBuf::from("/project/src"))]);
    }

    #[test]
    fn test_from_file_records_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phpgen.toml");
        std::fs::write(&path, "[generator]\nindent = 2\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.root(), dir.path());
        assert_eq!(config.generator.indent(), Indent::Spaces(2));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Config::from_file("/nonexistent/phpgen.toml").unwrap_err();
        assert!(matches!(*err, Error::Io { .. }));
    }
}
