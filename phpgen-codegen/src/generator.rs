//! Generator facade: realizes a whole collection into printed files.

use std::{
    io,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use phpgen_ast::{Ast, Parser, PhpParser, PhpPrinter, Printer};
use phpgen_config::Config;
use phpgen_core::{File, WriteResult};
use tracing::{debug, info};

use crate::{
    BuilderCollection, Error, Pipeline, Result,
    builder::{FileSpec, Identity},
    resolver::{PathResolver, Psr4Resolver},
};

/// Turns builders into PHP source text.
///
/// The parser, printer and resolver are always passed in; there is no
/// implicit default. [`Generator::from_config`] wires the reference
/// implementations.
pub struct Generator {
    parser: Box<dyn Parser>,
    printer: Box<dyn Printer>,
    resolver: Box<dyn PathResolver>,
}

impl Generator {
    pub fn new(
        parser: impl Parser + 'static,
        printer: impl Printer + 'static,
        resolver: impl PathResolver + 'static,
    ) -> Self {
        Self {
            parser: Box::new(parser),
            printer: Box::new(printer),
            resolver: Box::new(resolver),
        }
    }

    /// Reference parser, a printer indented per `[generator]`, and the
    /// PSR-4 roots of `[autoload]`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            PhpParser::new(),
            PhpPrinter::new(config.generator.indent()),
            Psr4Resolver::from_config(config),
        )
    }

    pub fn parser(&self) -> &dyn Parser {
        self.parser.as_ref()
    }

    /// Realize every item against an empty tree.
    pub fn generate_files<T: FileSpec>(
        &self,
        collection: &BuilderCollection<T>,
    ) -> Result<GeneratedFiles> {
        self.generate_files_with(collection, |_, _| Ok(Ast::new()))
    }

    /// Realize every item against the tree `provider` returns for its path.
    ///
    /// The directory is resolved again only when the namespace differs from
    /// the previous item's; sort the collection by identity to make the most
    /// of that. The first failure aborts the batch and names the item.
    pub fn generate_files_with<T: FileSpec>(
        &self,
        collection: &BuilderCollection<T>,
        mut provider: impl FnMut(&Path, &T) -> Result<Ast>,
    ) -> Result<GeneratedFiles> {
        let mut files = GeneratedFiles::default();
        let mut last_dir: Option<(Option<String>, PathBuf)> = None;

        for item in collection {
            let identity = item.identity();
            let wrap = |source: Error| Error::Realization {
                identity: identity.to_string(),
                source: Box::new(source),
            };

            let dir = self.directory(&identity, &mut last_dir).map_err(wrap)?;
            let path = self.resolver.filename_for(&dir, identity.file_stem());
            let mut ast = provider(&path, item).map_err(wrap)?;
            let text = self.realize(item, &mut ast).map_err(wrap)?;
            files.files.insert(path, text);
        }

        info!(files = files.len(), "generated files");
        Ok(files)
    }

    fn directory(
        &self,
        identity: &Identity,
        last: &mut Option<(Option<String>, PathBuf)>,
    ) -> Result<PathBuf> {
        let namespace = identity.namespace();
        if let Some((previous, dir)) = last.as_ref() {
            if previous.as_deref() == namespace {
                return Ok(dir.clone());
            }
        }
        let dir = self.resolver.path_for(namespace)?;
        *last = Some((namespace.map(str::to_string), dir.clone()));
        Ok(dir)
    }

    /// Run one item's passes against `ast` and print the result.
    pub fn realize<T: FileSpec>(&self, item: &T, ast: &mut Ast) -> Result<String> {
        let mut pipeline = Pipeline::new();
        item.inject_visitors(&mut pipeline, self.parser.as_ref());
        let report = pipeline.run(ast)?;
        debug!(
            identity = %item.identity(),
            inserted = report.inserted(),
            passes = report.records().len(),
            "realized item"
        );
        Ok(self.printer.print(ast))
    }
}

/// A provider for [`Generator::generate_files_with`] that parses the file
/// currently at `base/path`, or starts empty when there is none.
pub fn existing_file<'a, T>(
    parser: &'a dyn Parser,
    base: &'a Path,
) -> impl FnMut(&Path, &T) -> Result<Ast> {
    move |path, _| {
        let full = base.join(path);
        match std::fs::read_to_string(&full) {
            Ok(source) => Ok(parser.parse(&source)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Ast::new()),
            Err(source) => Err(Error::Read { path: full, source }),
        }
    }
}

/// Printed files by path, in collection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedFiles {
    files: IndexMap<PathBuf, String>,
}

impl GeneratedFiles {
    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.files
            .iter()
            .map(|(path, text)| (path.as_path(), text.as_str()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Write every file under `base`. Files are merged before printing, so
    /// existing ones are overwritten; identical content is left alone.
    pub fn write_all(&self, base: &Path) -> eyre::Result<Vec<(PathBuf, WriteResult)>> {
        self.files
            .iter()
            .map(|(path, text)| {
                let full = base.join(path);
                let result = File::new(&full, text.as_str()).write()?;
                Ok((full, result))
            })
            .collect()
    }
}

impl IntoIterator for GeneratedFiles {
    type Item = (PathBuf, String);
    type IntoIter = indexmap::map::IntoIter<PathBuf, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::*;
    use crate::{ClassBuilder, ConstSpec, ValueSpec};

    /// Counts directory lookups.
    struct CountingResolver {
        inner: Psr4Resolver,
        calls: Rc<Cell<usize>>,
    }

    impl PathResolver for CountingResolver {
        fn path_for(&self, namespace: Option<&str>) -> Result<PathBuf> {
            self.calls.set(self.calls.get() + 1);
            self.inner.path_for(namespace)
        }
    }

    fn class(namespace: &str, name: &str) -> ClassBuilder {
        let mut class = ClassBuilder::from_scratch(name);
        class.set_namespace(namespace);
        class
    }

    fn generator() -> Generator {
        Generator::new(
            PhpParser::new(),
            PhpPrinter::default(),
            Psr4Resolver::new().with_root("App", "src"),
        )
    }

    #[test]
    fn test_generate_files_maps_paths() {
        let collection: BuilderCollection<_> = [class("App\\Model", "User"), class("App", "Kernel")]
            .into_iter()
            .collect();
        let files = generator().generate_files(&collection).unwrap();

        let paths: Vec<_> = files.paths().collect();
        assert_eq!(paths, vec![Path::new("src/Model/User.php"), Path::new("src/Kernel.php")]);
        insta::assert_snapshot!(files.get("src/Kernel.php").unwrap(), @r"
<?php

declare(strict_types=1);

namespace App;

class Kernel
{
}
");
    }

    #[test]
    fn test_directory_is_resolved_once_per_namespace_run() {
        let calls = Rc::new(Cell::new(0));
        let generator = Generator::new(
            PhpParser::new(),
            PhpPrinter::default(),
            CountingResolver {
                inner: Psr4Resolver::new().with_root("App", "src"),
                calls: Rc::clone(&calls),
            },
        );
        let collection: BuilderCollection<_> = [
            class("App\\Model", "User"),
            class("App\\Model", "Post"),
            class("App", "Kernel"),
            class("App\\Model", "Tag"),
        ]
        .into_iter()
        .collect();

        generator.generate_files(&collection).unwrap();
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_failure_names_the_item() {
        let mut broken = class("App", "Broken");
        broken.add_constant(ConstSpec::new("BAD", ValueSpec::float(f64::NAN)));
        let collection: BuilderCollection<_> = [class("App", "Fine"), broken].into_iter().collect();

        let err = generator().generate_files(&collection).unwrap_err();
        assert_eq!(err.to_string(), "failed to generate App\\Broken");
        assert!(matches!(err.root_cause(), Error::UnsupportedValue { .. }));
    }

    #[test]
    fn test_unresolvable_namespace() {
        let collection: BuilderCollection<_> = [class("Vendor", "Thing")].into_iter().collect();
        let err = generator().generate_files(&collection).unwrap_err();
        assert!(matches!(err.root_cause(), Error::Resolution { .. }));
    }

    #[test]
    fn test_existing_file_provider() {
        let dir = tempfile::tempdir().unwrap();
        let parser = PhpParser::new();
        let mut provider = existing_file::<ClassBuilder>(&parser, dir.path());
        let item = class("App", "User");

        let ast = provider(Path::new("src/User.php"), &item).unwrap();
        assert!(ast.is_empty());

        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/User.php"), "<?php\nclass User {}\n").unwrap();
        let ast = provider(Path::new("src/User.php"), &item).unwrap();
        assert!(ast.find_class_like(Some("User")).is_some());

        std::fs::write(dir.path().join("src/User.php"), "<?php\nclass User {\n").unwrap();
        assert!(matches!(
            provider(Path::new("src/User.php"), &item),
            Err(Error::Parse(_))
        ));
    }
}
