//! Generator configuration, read from `[package.metadata.routegen]`.
//!
//! ```toml
//! [package.metadata.routegen]
//! app-type = "crate::app::App"
//! source-dir = "src"
//! warn-skipped = true
//!
//! [package.metadata.routegen.markers]
//! get_cached = "get"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::compilation::crate_ident;
use crate::error::{Error, Result};
use crate::markers::MarkerVocabulary;

pub const DEFAULT_LIBRARY: &str = "routegen";
pub const DEFAULT_APP_TYPE: &str = "::routegen::Router";
pub const DEFAULT_SOURCE_DIR: &str = "src";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Crate that supplies the markers.
    pub library: String,
    /// Type of the `app` parameter of the registration method.
    pub app_type: String,
    /// Scanned directory, relative to the manifest.
    pub source_dir: PathBuf,
    /// Extra markers, `alias = "parent"`.
    pub markers: BTreeMap<String, String>,
    /// Report skipped candidates as cargo warnings.
    pub warn_skipped: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            library: DEFAULT_LIBRARY.to_string(),
            app_type: DEFAULT_APP_TYPE.to_string(),
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            markers: BTreeMap::new(),
            warn_skipped: false,
        }
    }
}

impl Config {
    /// Built-in markers plus the configured aliases.
    pub fn vocabulary(&self) -> MarkerVocabulary {
        MarkerVocabulary::builtin().extend(&self.markers)
    }

    /// Library name as it appears in paths.
    pub fn library_ident(&self) -> String {
        crate_ident(&self.library)
    }

    pub fn validate(&self) -> Result<()> {
        if syn::parse_str::<syn::Ident>(&self.library_ident()).is_err() {
            return Err(Error::Config(format!(
                "`library` must be a crate name, got `{}`",
                self.library
            )));
        }

        if syn::parse_str::<syn::Type>(&self.app_type).is_err() {
            return Err(Error::Config(format!(
                "`app-type` must be a Rust type, got `{}`",
                self.app_type
            )));
        }

        let vocabulary = self.vocabulary();
        let dangling = vocabulary.dangling();
        if !dangling.is_empty() {
            return Err(Error::Config(format!(
                "markers never reach `endpoint`: {}",
                dangling.join(", ")
            )));
        }

        Ok(())
    }
}

/// The parts of a `Cargo.toml` the generator reads.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub path: PathBuf,
    pub package_name: Option<String>,
    /// Name the code uses -> package name, from `[dependencies]` and every
    /// `[target.*.dependencies]`.
    pub dependencies: BTreeMap<String, String>,
    pub config: Config,
}

#[derive(Deserialize, Default)]
struct RawManifest {
    #[serde(default)]
    package: Option<RawPackage>,
    #[serde(default)]
    dependencies: BTreeMap<String, toml::Value>,
    #[serde(default)]
    target: BTreeMap<String, RawTarget>,
}

#[derive(Deserialize)]
struct RawTarget {
    #[serde(default)]
    dependencies: BTreeMap<String, toml::Value>,
}

#[derive(Deserialize)]
struct RawPackage {
    name: Option<String>,
    #[serde(default)]
    metadata: Option<RawMetadata>,
}

#[derive(Deserialize)]
struct RawMetadata {
    #[serde(default)]
    routegen: Option<Config>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::io(path, source))?;
        Self::parse(path, &text)
    }

    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let raw: RawManifest = toml::from_str(text).map_err(|source| Error::Manifest {
            path: path.to_path_buf(),
            source,
        })?;

        let (package_name, config) = match raw.package {
            Some(package) => (
                package.name,
                package
                    .metadata
                    .and_then(|metadata| metadata.routegen)
                    .unwrap_or_default(),
            ),
            None => (None, Config::default()),
        };

        let dependencies = raw
            .dependencies
            .into_iter()
            .chain(raw.target.into_values().flat_map(|target| target.dependencies))
            .map(|(name, spec)| {
                let package = spec
                    .get("package")
                    .and_then(toml::Value::as_str)
                    .map_or_else(|| name.clone(), str::to_string);
                (name, package)
            })
            .collect();

        Ok(Self {
            path: path.to_path_buf(),
            package_name,
            dependencies,
            config,
        })
    }

    /// Name the code refers to `package` by, following `package = ".."`
    /// renames.
    pub fn local_name(&self, package: &str) -> Option<&str> {
        let wanted = crate_ident(package);
        self.dependencies
            .iter()
            .find(|(_, dependency)| crate_ident(dependency) == wanted)
            .map(|(name, _)| name.as_str())
    }

    /// Directory holding the manifest.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}
