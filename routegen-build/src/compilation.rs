//! The set of sources a generation pass reads.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Module path of an item, `crate` followed by zero or more segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModulePath {
    segments: Vec<String>,
}

impl ModulePath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses `crate::a::b` (or `a::b`, taken relative to the crate root).
    pub fn parse(path: &str) -> Self {
        let segments = path
            .split("::")
            .map(str::trim)
            .filter(|segment| !segment.is_empty() && *segment != "crate")
            .map(str::to_string)
            .collect();
        Self { segments }
    }

    /// Module a source file defines, given its path relative to the source
    /// directory. `lib.rs` and `main.rs` are the crate root, `a/mod.rs` and
    /// `a.rs` both define `crate::a`.
    pub fn from_file(relative: &Path) -> Option<Self> {
        if relative.extension().is_none_or(|ext| ext != "rs") {
            return None;
        }

        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => segments.push(part.to_str()?.to_string()),
                _ => return None,
            }
        }

        let file = segments.pop()?;
        let stem = file.strip_suffix(".rs")?;
        match stem {
            "lib" | "main" if segments.is_empty() => {}
            "mod" => {}
            _ => segments.push(stem.to_string()),
        }

        Some(Self { segments })
    }

    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self { segments }
    }

    pub fn parent(&self) -> Option<Self> {
        let mut segments = self.segments.clone();
        segments.pop()?;
        Some(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("crate")?;
        for segment in &self.segments {
            write!(f, "::{}", segment)?;
        }
        Ok(())
    }
}

/// A parsed source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub module: ModulePath,
    pub syntax: syn::File,
}

/// A source file that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnparsedFile {
    pub path: PathBuf,
    pub line: usize,
    pub message: String,
}

/// Parsed sources plus the crates they can reference.
#[derive(Debug, Clone, Default)]
pub struct Compilation {
    files: Vec<SourceFile>,
    unparsed: Vec<UnparsedFile>,
    references: BTreeSet<String>,
}

impl Compilation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a dependency crate. Dashes are normalized the way rustc
    /// normalizes crate names.
    pub fn with_reference(mut self, name: impl AsRef<str>) -> Self {
        self.add_reference(name);
        self
    }

    pub fn add_reference(&mut self, name: impl AsRef<str>) {
        self.references.insert(crate_ident(name.as_ref()));
    }

    pub fn references(&self, name: &str) -> bool {
        self.references.contains(&crate_ident(name))
    }

    /// Adds a source whose module is derived from its path relative to the
    /// source directory.
    pub fn add_source(&mut self, path: impl Into<PathBuf>, text: &str) {
        let path = path.into();
        let module = ModulePath::from_file(&path).unwrap_or_default();
        self.add_module_source(module, path, text);
    }

    /// Adds a source defining `module`.
    pub fn add_module_source(&mut self, module: ModulePath, path: impl Into<PathBuf>, text: &str) {
        let path = path.into();
        match syn::parse_file(text) {
            Ok(syntax) => self.files.push(SourceFile {
                path,
                module,
                syntax,
            }),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping unparseable source file");
                self.unparsed.push(UnparsedFile {
                    line: err.span().start().line,
                    message: err.to_string(),
                    path,
                });
            }
        }
    }

    /// Reads every `.rs` file under `src_dir` in sorted order. `src_dir/bin`
    /// is left out since each file there is its own crate root.
    pub fn load_dir(&mut self, src_dir: &Path) -> Result<()> {
        let walker = WalkDir::new(src_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !(entry.depth() == 1 && entry.file_name() == "bin"));

        for entry in walker {
            let entry = entry.map_err(|source| Error::Walk {
                path: src_dir.to_path_buf(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(src_dir) else {
                continue;
            };
            let Some(module) = ModulePath::from_file(relative) else {
                continue;
            };

            let text =
                fs::read_to_string(entry.path()).map_err(|source| Error::io(entry.path(), source))?;
            self.add_module_source(module, entry.path(), &text);
        }

        tracing::debug!(
            dir = %src_dir.display(),
            files = self.files.len(),
            unparsed = self.unparsed.len(),
            "loaded sources"
        );
        Ok(())
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn unparsed(&self) -> &[UnparsedFile] {
        &self.unparsed
    }
}

pub(crate) fn crate_ident(name: &str) -> String {
    name.replace('-', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_path_from_file() {
        let cases = [
            ("lib.rs", "crate"),
            ("main.rs", "crate"),
            ("endpoints.rs", "crate::endpoints"),
            ("web/mod.rs", "crate::web"),
            ("web/startup.rs", "crate::web::startup"),
            ("web/main.rs", "crate::web::main"),
        ];
        for (file, expected) in cases {
            let module = ModulePath::from_file(Path::new(file)).unwrap();
            assert_eq!(module.to_string(), expected, "{file}");
        }
    }

    #[test]
    fn test_module_path_from_non_rust_file() {
        assert!(ModulePath::from_file(Path::new("README.md")).is_none());
        assert!(ModulePath::from_file(Path::new("../lib.rs")).is_none());
    }

    #[test]
    fn test_module_path_parse_and_parent() {
        let module = ModulePath::parse("crate::web::startup");
        assert_eq!(module.segments(), ["web", "startup"]);
        assert_eq!(module.parent().unwrap().to_string(), "crate::web");
        assert!(ModulePath::root().parent().is_none());
        assert!(ModulePath::parse("crate").is_root());
    }

    #[test]
    fn test_references_normalize_dashes() {
        let compilation = Compilation::new().with_reference("my-markers");
        assert!(compilation.references("my_markers"));
        assert!(compilation.references("my-markers"));
        assert!(!compilation.references("routegen"));
    }

    #[test]
    fn test_unparseable_source_is_recorded() {
        let mut compilation = Compilation::new();
        compilation.add_source("broken.rs", "fn broken( {");
        compilation.add_source("ok.rs", "pub struct Ok;");

        assert_eq!(compilation.files().len(), 1);
        assert_eq!(compilation.files()[0].module.to_string(), "crate::ok");
        assert_eq!(compilation.unparsed().len(), 1);
        assert_eq!(compilation.unparsed()[0].path, PathBuf::from("broken.rs"));
    }

    #[test]
    fn test_load_dir_sorted_and_skips_bin() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path();
        fs::create_dir_all(src.join("web")).unwrap();
        fs::create_dir_all(src.join("bin")).unwrap();
        fs::write(src.join("lib.rs"), "pub mod web;").unwrap();
        fs::write(src.join("web/mod.rs"), "pub mod startup;").unwrap();
        fs::write(src.join("web/startup.rs"), "pub struct Startup;").unwrap();
        fs::write(src.join("bin/tool.rs"), "fn main() {}").unwrap();
        fs::write(src.join("notes.txt"), "not rust").unwrap();

        let mut compilation = Compilation::new();
        compilation.load_dir(src).unwrap();

        let modules: Vec<String> = compilation
            .files()
            .iter()
            .map(|file| file.module.to_string())
            .collect();
        assert_eq!(modules, ["crate", "crate::web", "crate::web::startup"]);
    }
}
