//! Mapping namespaces to output directories.

use std::path::{Path, PathBuf};

use phpgen_config::Config;
use tracing::trace;

use crate::{Error, Result};

/// Maps a namespace to the directory its classes live in.
pub trait PathResolver {
    /// Directory for `namespace`; `None` is the global namespace.
    fn path_for(&self, namespace: Option<&str>) -> Result<PathBuf>;

    /// File for declaration `name` inside `directory`.
    fn filename_for(&self, directory: &Path, name: &str) -> PathBuf {
        directory.join(format!("{name}.php"))
    }
}

/// PSR-4 resolution: the longest registered prefix wins, and the rest of
/// the namespace becomes subdirectories.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Psr4Resolver {
    roots: Vec<(String, PathBuf)>,
}

impl Psr4Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `prefix` (e.g. `App\`) under `directory`. An empty prefix
    /// matches every namespace.
    pub fn with_root(mut self, prefix: impl AsRef<str>, directory: impl Into<PathBuf>) -> Self {
        let prefix = prefix.as_ref().trim_matches('\\').to_string();
        self.roots.push((prefix, directory.into()));
        self
    }

    /// Roots from `[autoload.psr-4]`, resolved against the config directory.
    pub fn from_config(config: &Config) -> Self {
        config
            .psr4_roots()
            .fold(Self::new(), |resolver, (prefix, dir)| resolver.with_root(prefix, dir))
    }

    fn matching_root(&self, namespace: &str) -> Option<&(String, PathBuf)> {
        self.roots
            .iter()
            .filter(|(prefix, _)| {
                prefix.is_empty()
                    || namespace == prefix
                    || namespace
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with('\\'))
            })
            .max_by_key(|(prefix, _)| prefix.len())
    }
}

impl PathResolver for Psr4Resolver {
    fn path_for(&self, namespace: Option<&str>) -> Result<PathBuf> {
        let namespace = namespace.unwrap_or_default().trim_matches('\\');
        let Some((prefix, root)) = self.matching_root(namespace) else {
            return Err(Error::Resolution {
                namespace: namespace.to_string(),
                reason: "no PSR-4 prefix matches".into(),
            });
        };

        let rest = namespace[prefix.len()..].trim_start_matches('\\');
        let path = rest
            .split('\\')
            .filter(|segment| !segment.is_empty())
            .fold(root.clone(), |path, segment| path.join(segment));
        trace!(namespace, prefix = %prefix, path = %path.display(), "resolved namespace");
        Ok(path)
    }
}
