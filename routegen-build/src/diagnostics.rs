//! Reporting for candidates the pass leaves out.
//!
//! Skipping never fails the build. Every skip of a marker-bearing candidate
//! is recorded here so tooling can surface it.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub path: PathBuf,
    pub line: usize,
}

impl Location {
    pub fn of(path: &Path, ident: &syn::Ident) -> Self {
        Self {
            path: path.to_path_buf(),
            line: ident.span().start().line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path.display(), self.line)
    }
}

/// Why a candidate did not become a route or a generation target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    #[error("handler owner `{0}` does not resolve to a concrete, non-generic type")]
    UnresolvedOwner(String),

    #[error("marker `{marker}` has malformed arguments: {message}")]
    MalformedMarker { marker: String, message: String },

    #[error("marker `{0}` has no route")]
    MissingRoute(String),

    #[error("marker `{0}` does not start with a recognized HTTP verb")]
    UnrecognizedVerb(String),

    #[error("configurator `{0}` does not resolve to a plain type path")]
    UnresolvedConfigurator(String),

    #[error("generation target `{0}` is generic")]
    GenericTarget(String),

    #[error("generation target `{0}` cannot be named from the crate root")]
    InaccessibleTarget(String),

    #[error("source file does not parse: {0}")]
    UnparseableFile(String),
}

/// A skipped candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    pub location: Location,
    /// Function or type name, empty for whole files.
    pub item: String,
    pub reason: SkipReason,
}

impl fmt::Display for Skipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.item.is_empty() {
            write!(f, "{}: {}", self.location, self.reason)
        } else {
            write!(f, "{}: `{}`: {}", self.location, self.item, self.reason)
        }
    }
}
