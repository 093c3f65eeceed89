//! Route discovery and registration code generation for routegen.
//!
//! A generation pass scans a crate's sources for functions carrying endpoint
//! markers and for types carrying `#[generate_endpoints]`, then emits one
//! `register_generated_endpoints` routine per marked type:
//!
//! ```rust,ignore
//! // build.rs
//! fn main() {
//!     routegen_build::Builder::from_env()
//!         .and_then(|builder| builder.run())
//!         .unwrap();
//! }
//!
//! // src/lib.rs
//! routegen::include_generated!();
//! ```
//!
//! The pass never fails on a candidate it cannot use; such candidates end up
//! in [`Generation::skipped`].

pub mod builder;
pub mod collect;
pub mod compilation;
pub mod config;
pub mod diagnostics;
pub mod emit;
pub mod error;
pub mod markers;
pub mod naming;
pub mod resolve;
pub mod scope;

pub use builder::Builder;
pub use compilation::{Compilation, ModulePath};
pub use config::{Config, Manifest};
pub use diagnostics::{Location, SkipReason, Skipped};
pub use emit::{EmitOptions, GeneratedUnit};
pub use error::{Error, Result};
pub use markers::{EndpointMarker, MarkerArgs, MarkerShape, MarkerVocabulary, Verb};
pub use resolve::{Accessibility, GenerationTarget, HandlerRef, InstanceFields, Route};

use resolve::Resolver;

/// Everything one pass produced.
#[derive(Debug, Clone, Default)]
pub struct Generation {
    /// `false` when the marker library is not a dependency; nothing else is
    /// populated in that case.
    pub library_referenced: bool,
    /// Routes in registration order.
    pub routes: Vec<Route>,
    pub instance_fields: InstanceFields,
    pub targets: Vec<GenerationTarget>,
    pub units: Vec<GeneratedUnit>,
    pub skipped: Vec<Skipped>,
}

impl Generation {
    /// Contents of the index file.
    pub fn index(&self) -> String {
        emit::render_index(&self.units)
    }
}

/// Runs one pass over `compilation`. Pure: reads nothing beyond its inputs.
pub fn generate(compilation: &Compilation, config: &Config) -> Generation {
    if !compilation.references(&config.library) {
        tracing::debug!(library = %config.library, "marker library not referenced, nothing to do");
        return Generation::default();
    }

    let library = config.library_ident();
    let vocabulary = config.vocabulary();
    let candidates = collect::collect(compilation);
    let resolution = Resolver::new(compilation, &vocabulary, &library).resolve(&candidates);

    let options = EmitOptions {
        library: library.clone(),
        app_type: config.app_type.clone(),
    };
    let units = emit::emit(
        &resolution.routes,
        &resolution.instance_fields,
        &resolution.targets,
        &options,
    );

    let mut skipped: Vec<Skipped> = compilation
        .unparsed()
        .iter()
        .map(|file| Skipped {
            location: Location {
                path: file.path.clone(),
                line: file.line,
            },
            item: String::new(),
            reason: SkipReason::UnparseableFile(file.message.clone()),
        })
        .collect();
    skipped.extend(resolution.skipped);

    tracing::info!(
        routes = resolution.routes.len(),
        targets = resolution.targets.len(),
        units = units.len(),
        skipped = skipped.len(),
        "generation complete"
    );

    Generation {
        library_referenced: true,
        routes: resolution.routes,
        instance_fields: resolution.instance_fields,
        targets: resolution.targets,
        units,
        skipped,
    }
}
