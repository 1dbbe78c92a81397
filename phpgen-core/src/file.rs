use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use tracing::debug;

/// What [`File::write`] did on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    /// New or changed content reached the disk.
    Written,
    /// File already had exactly this content and was left alone
    Unchanged,
}

/// A rendered PHP file waiting to be persisted.
#[derive(Debug, Clone)]
pub struct File {
    path: PathBuf,
    content: String,
}

impl File {
    /// A file that overwrites whatever is at `path`. Its content is
    /// expected to be merged from the current file already.
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Write the file, creating parent directories as needed.
    ///
    /// Identical content is never rewritten, so regenerating an unchanged
    /// file keeps its modification time.
    pub fn write(&self) -> Result<WriteResult> {
        if read_if_exists(&self.path)?.as_deref() == Some(self.content.as_str()) {
            debug!(path = %self.path.display(), "file unchanged");
            return Ok(WriteResult::Unchanged);
        }
        write_file(&self.path, &self.content)?;
        debug!(path = %self.path.display(), bytes = self.content.len(), "wrote file");
        Ok(WriteResult::Written)
    }
}

/// Read a file's content, or `None` when it does not exist.
pub fn read_if_exists(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err).wrap_err_with(|| format!("failed to read {}", path.display())),
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .wrap_err_with(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content).wrap_err_with(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_write_file_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("src").join("Model").join("User.php");

        write_file(&path, "<?php\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "<?php\n");
    }

    #[test]
    fn test_file_write_always_overwrites() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("User.php");

        fs::write(&path, "<?php\n// old\n").unwrap();

        let file = File::new(&path, "<?php\n");
        assert_eq!(file.write().unwrap(), WriteResult::Written);
        assert_eq!(fs::read_to_string(&path).unwrap(), "<?php\n");
    }

    #[test]
    fn test_file_write_same_content_is_unchanged() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("User.php");

        let file = File::new(&path, "<?php\n");
        assert_eq!(file.write().unwrap(), WriteResult::Written);
        assert_eq!(file.write().unwrap(), WriteResult::Unchanged);
    }

    #[test]
    fn test_read_if_exists() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.php");

        assert_eq!(read_if_exists(&path).unwrap(), None);
        fs::write(&path, "<?php\n").unwrap();
        assert_eq!(read_if_exists(&path).unwrap().as_deref(), Some("<?php\n"));
    }
}
