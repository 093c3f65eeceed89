//! `build.rs` entry point.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::compilation::Compilation;
use crate::config::{Config, Manifest};
use crate::error::{Error, Result};
use crate::naming::INDEX_FILE;
use crate::{Generation, generate};

#[derive(Debug, Clone)]
pub struct Builder {
    manifest_dir: PathBuf,
    out_dir: Option<PathBuf>,
    source_dir: Option<PathBuf>,
    app_type: Option<String>,
    warn_skipped: Option<bool>,
    cargo_directives: bool,
}

impl Builder {
    /// Builder for the crate whose `Cargo.toml` lives in `manifest_dir`.
    pub fn new(manifest_dir: impl Into<PathBuf>) -> Self {
        Self {
            manifest_dir: manifest_dir.into(),
            out_dir: None,
            source_dir: None,
            app_type: None,
            warn_skipped: None,
            cargo_directives: false,
        }
    }

    /// Builder configured from the variables cargo sets for build scripts.
    pub fn from_env() -> Result<Self> {
        let manifest_dir = env_path("CARGO_MANIFEST_DIR")?;
        let out_dir = env_path("OUT_DIR")?;
        Ok(Self::new(manifest_dir).out_dir(out_dir).cargo_directives(true))
    }

    pub fn out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(dir.into());
        self
    }

    /// Overrides `source-dir`, relative to the manifest directory.
    pub fn source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dir = Some(dir.into());
        self
    }

    /// Overrides `app-type`.
    pub fn app_type(mut self, ty: impl Into<String>) -> Self {
        self.app_type = Some(ty.into());
        self
    }

    /// Overrides `warn-skipped`.
    pub fn warn_skipped(mut self, warn: bool) -> Self {
        self.warn_skipped = Some(warn);
        self
    }

    /// Print `cargo:` directives while running.
    pub fn cargo_directives(mut self, enabled: bool) -> Self {
        self.cargo_directives = enabled;
        self
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.manifest_dir.join("Cargo.toml")
    }

    /// Reads the manifest and applies the overrides. When the marker library
    /// is a renamed dependency, `library` becomes the name the code uses.
    pub fn manifest(&self) -> Result<Manifest> {
        let mut manifest = Manifest::load(&self.manifest_path())?;

        let config = &mut manifest.config;
        if let Some(dir) = &self.source_dir {
            config.source_dir = dir.clone();
        }
        if let Some(ty) = &self.app_type {
            config.app_type = ty.clone();
        }
        if let Some(warn) = self.warn_skipped {
            config.warn_skipped = warn;
        }
        config.validate()?;

        let local = manifest
            .local_name(&manifest.config.library)
            .map(str::to_string);
        if let Some(local) = local {
            manifest.config.library = local;
        }
        Ok(manifest)
    }

    /// Directory the pass scans.
    pub fn source_path(&self) -> Result<PathBuf> {
        Ok(self.manifest_dir.join(self.manifest()?.config.source_dir))
    }

    /// Reads the manifest and the sources.
    pub fn load(&self) -> Result<(Compilation, Config)> {
        let manifest = self.manifest()?;

        let mut compilation = Compilation::new();
        for name in manifest.dependencies.keys() {
            compilation.add_reference(name);
        }
        compilation.load_dir(&self.manifest_dir.join(&manifest.config.source_dir))?;

        Ok((compilation, manifest.config))
    }

    /// Runs a pass without writing anything.
    pub fn generate(&self) -> Result<Generation> {
        let (compilation, config) = self.load()?;
        Ok(generate(&compilation, &config))
    }

    /// Runs a pass and writes every unit plus the index into the output
    /// directory. The index is written even when empty.
    pub fn run(&self) -> Result<Generation> {
        let out_dir = self
            .out_dir
            .as_deref()
            .ok_or_else(|| Error::Config("no output directory set".to_string()))?;

        let (compilation, config) = self.load()?;
        if self.cargo_directives {
            println!("cargo:rerun-if-changed={}", self.manifest_path().display());
            println!(
                "cargo:rerun-if-changed={}",
                self.manifest_dir.join(&config.source_dir).display()
            );
        }

        let generation = generate(&compilation, &config);

        fs::create_dir_all(out_dir).map_err(|source| Error::io(out_dir, source))?;
        for unit in &generation.units {
            write(&out_dir.join(&unit.file_name), &unit.contents)?;
        }
        write(&out_dir.join(INDEX_FILE), &generation.index())?;

        if self.cargo_directives && config.warn_skipped {
            for skipped in &generation.skipped {
                println!("cargo:warning=routegen skipped {}", skipped);
            }
        }

        Ok(generation)
    }
}

fn env_path(key: &str) -> Result<PathBuf> {
    env::var_os(key)
        .map(PathBuf::from)
        .ok_or_else(|| Error::Config(format!("`{}` is not set; is this running from build.rs?", key)))
}

/// Leaves unchanged files alone so their mtime does not trigger rebuilds.
fn write(path: &Path, contents: &str) -> Result<()> {
    if fs::read_to_string(path).is_ok_and(|existing| existing == contents) {
        return Ok(());
    }
    tracing::debug!(path = %path.display(), "writing");
    fs::write(path, contents).map_err(|source| Error::io(path, source))
}
