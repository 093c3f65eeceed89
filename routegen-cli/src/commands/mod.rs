//! CLI command implementations.

pub mod check;
pub mod generate;
pub mod routes;

use std::path::Path;

use routegen_build::{Builder, Generation};

/// Verify that `path` holds a crate and prepare a builder for it.
pub fn project_builder(path: &Path) -> Result<Builder, String> {
    if !path.join("Cargo.toml").exists() {
        return Err(format!(
            "No Cargo.toml found in {}. Are you in a Rust project directory?",
            path.display()
        ));
    }
    tracing::debug!(path = %path.display(), "found crate manifest");
    Ok(Builder::new(path))
}

/// Run a pass over the crate at `path` without writing anything.
pub fn discover(path: &Path) -> Result<Generation, String> {
    let generation = project_builder(path)?
        .generate()
        .map_err(|e| e.to_string())?;

    if !generation.library_referenced {
        return Err(
            "This doesn't appear to be a routegen project (the marker library is not a dependency)"
                .to_string(),
        );
    }
    Ok(generation)
}
