//! Classification of candidates into routes and generation targets.

use std::fmt;

use serde::{Serialize, Serializer};
use syn::{Attribute, Type, Visibility};

use crate::collect::{CandidateMethod, CandidateType, Candidates, Owner};
use crate::compilation::{Compilation, ModulePath};
use crate::diagnostics::{Location, SkipReason, Skipped};
use crate::markers::{EndpointMarker, GENERATE_ENDPOINTS, MarkerArgs, MarkerVocabulary, Verb};
use crate::naming;
use crate::scope::SymbolTable;

/// The callable expression handed to the routing layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerRef {
    /// `Owner::method`, or `module::function` for free functions.
    Static { owner: String, method: String },
    /// `field.method` on a generated instance field.
    Instance { field: String, method: String },
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerRef::Static { owner, method } => write!(f, "{}::{}", owner, method),
            HandlerRef::Instance { field, method } => write!(f, "{}.{}", field, method),
        }
    }
}

impl Serialize for HandlerRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// An emission-ready route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub verb: Verb,
    pub path: String,
    pub name: Option<String>,
    pub handler: HandlerRef,
    pub configurator: Option<String>,
    #[serde(skip)]
    pub location: Location,
}

impl Route {
    pub fn new(marker: EndpointMarker, handler: HandlerRef, location: Location) -> Self {
        Self {
            verb: marker.verb,
            path: marker.route,
            name: marker.name,
            handler,
            configurator: marker.configurator,
            location,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceField {
    pub owner: String,
    pub name: String,
}

/// Owner type -> field name, in first-seen order.
///
/// Built fresh for every pass, so field numbering depends on nothing but the
/// order routes are classified in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstanceFields {
    fields: Vec<InstanceField>,
}

impl InstanceFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field holding the instance of `owner`, allocated on first request.
    pub fn field_for(&mut self, owner: &str) -> String {
        let index = match self.fields.iter().position(|field| field.owner == owner) {
            Some(index) => index,
            None => {
                self.fields.push(InstanceField {
                    owner: owner.to_string(),
                    name: naming::instance_field_name(self.fields.len()),
                });
                self.fields.len() - 1
            }
        };
        self.fields[index].name.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InstanceField> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Visibility of the emitted registration method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    Public,
    Crate,
    Private,
}

impl Accessibility {
    pub fn from_visibility(vis: &Visibility) -> Self {
        match vis {
            Visibility::Public(_) => Accessibility::Public,
            Visibility::Restricted(restricted) if restricted.path.is_ident("crate") => {
                Accessibility::Crate
            }
            _ => Accessibility::Private,
        }
    }

    /// Keyword prefix, including the trailing space.
    pub fn keyword(self) -> &'static str {
        match self {
            Accessibility::Public => "pub ",
            Accessibility::Crate => "pub(crate) ",
            Accessibility::Private => "",
        }
    }
}

/// A type receiving the registration method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationTarget {
    pub type_name: String,
    /// Module path, `None` at the crate root.
    pub namespace: Option<String>,
    pub accessibility: Accessibility,
}

impl GenerationTarget {
    /// Path the emitted `impl` block names.
    pub fn impl_path(&self) -> String {
        match &self.namespace {
            Some(namespace) => format!("{}::{}", namespace, self.type_name),
            None => self.type_name.clone(),
        }
    }
}

/// Output of classification.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub routes: Vec<Route>,
    pub instance_fields: InstanceFields,
    pub targets: Vec<GenerationTarget>,
    pub skipped: Vec<Skipped>,
}

pub struct Resolver<'a> {
    symbols: SymbolTable,
    vocabulary: &'a MarkerVocabulary,
    library: &'a str,
}

impl<'a> Resolver<'a> {
    pub fn new(compilation: &Compilation, vocabulary: &'a MarkerVocabulary, library: &'a str) -> Self {
        Self {
            symbols: SymbolTable::build(compilation),
            vocabulary,
            library,
        }
    }

    /// Classifies every candidate. Methods keep collector order; a candidate
    /// that fails any step is skipped without affecting the others.
    pub fn resolve(&self, candidates: &Candidates) -> Resolution {
        let mut resolution = Resolution::default();

        for candidate in &candidates.methods {
            match self.classify_method(candidate, &mut resolution.instance_fields) {
                Ok(Some(route)) => {
                    tracing::debug!(
                        verb = %route.verb,
                        path = %route.path,
                        handler = %route.handler,
                        "classified route"
                    );
                    resolution.routes.push(route);
                }
                Ok(None) => {}
                Err(reason) => {
                    tracing::debug!(method = %candidate.ident, %reason, "skipped candidate");
                    resolution.skipped.push(Skipped {
                        location: candidate.location.clone(),
                        item: candidate.ident.to_string(),
                        reason,
                    });
                }
            }
        }

        for candidate in &candidates.types {
            match self.classify_type(candidate) {
                Ok(Some(target)) => resolution.targets.push(target),
                Ok(None) => {}
                Err(reason) => resolution.skipped.push(Skipped {
                    location: candidate.location.clone(),
                    item: candidate.ident.to_string(),
                    reason,
                }),
            }
        }

        resolution
    }

    /// `Ok(None)` when the candidate carries no endpoint marker at all.
    fn classify_method(
        &self,
        candidate: &CandidateMethod,
        fields: &mut InstanceFields,
    ) -> Result<Option<Route>, SkipReason> {
        let Some((attr, marker)) = self.find_marker(&candidate.module, &candidate.attrs) else {
            return Ok(None);
        };

        let owner = self.resolve_owner(candidate)?;

        let args = MarkerArgs::from_attribute(attr, self.vocabulary.shape(&marker)).map_err(|err| {
            SkipReason::MalformedMarker {
                marker: marker.clone(),
                message: err.to_string(),
            }
        })?;

        let route = args
            .route()
            .ok_or_else(|| SkipReason::MissingRoute(marker.clone()))?;

        let verb = Verb::from_marker_name(&marker)
            .ok_or_else(|| SkipReason::UnrecognizedVerb(marker.clone()))?;

        let configurator = match args.configurator() {
            Some(path) => Some(self.symbols.resolve(&candidate.module, path, self.library).ok_or_else(|| {
                SkipReason::UnresolvedConfigurator(quote::ToTokens::to_token_stream(path).to_string())
            })?),
            None => None,
        };

        let method = candidate.ident.to_string();
        let handler = match owner {
            OwnerSymbol::Module(module) => HandlerRef::Static {
                owner: module.to_string(),
                method,
            },
            OwnerSymbol::Type(owner) if candidate.is_static => HandlerRef::Static { owner, method },
            OwnerSymbol::Type(owner) => HandlerRef::Instance {
                field: fields.field_for(&owner),
                method,
            },
        };

        let marker = EndpointMarker {
            verb,
            route,
            name: args.name.as_ref().map(|name| name.value()),
            configurator,
        };
        Ok(Some(Route::new(marker, handler, candidate.location.clone())))
    }

    fn classify_type(&self, candidate: &CandidateType) -> Result<Option<GenerationTarget>, SkipReason> {
        let marked = candidate.attrs.iter().any(|attr| {
            self.symbols
                .marker_name(&candidate.module, attr.path(), self.library)
                .is_some_and(|name| name == GENERATE_ENDPOINTS)
        });
        if !marked {
            return Ok(None);
        }
        if candidate.generic {
            return Err(SkipReason::GenericTarget(candidate.ident.to_string()));
        }
        // Units are included at the crate root and name the target from there.
        if !self.symbols.visible_from_root(&candidate.module, &candidate.vis) {
            return Err(SkipReason::InaccessibleTarget(format!(
                "{}::{}",
                candidate.module, candidate.ident
            )));
        }

        Ok(Some(GenerationTarget {
            type_name: candidate.ident.to_string(),
            namespace: (!candidate.module.is_root()).then(|| candidate.module.to_string()),
            accessibility: Accessibility::from_visibility(&candidate.vis),
        }))
    }

    /// First attribute whose marker derives from the endpoint root.
    fn find_marker<'c>(
        &self,
        module: &ModulePath,
        attrs: &'c [Attribute],
    ) -> Option<(&'c Attribute, String)> {
        attrs.iter().find_map(|attr| {
            self.symbols
                .marker_name(module, attr.path(), self.library)
                .filter(|name| self.vocabulary.is_endpoint_marker(name))
                .map(|name| (attr, name))
        })
    }

    fn resolve_owner(&self, candidate: &CandidateMethod) -> Result<OwnerSymbol, SkipReason> {
        match &candidate.owner {
            Owner::Module => Ok(OwnerSymbol::Module(candidate.module.clone())),
            Owner::Trait(ident) => Err(SkipReason::UnresolvedOwner(ident.to_string())),
            Owner::Impl {
                self_ty,
                generic,
                trait_impl,
            } => {
                let rendered = || quote::ToTokens::to_token_stream(self_ty).to_string();
                if *generic || *trait_impl {
                    return Err(SkipReason::UnresolvedOwner(rendered()));
                }
                match self_ty {
                    Type::Path(type_path) if type_path.qself.is_none() => self
                        .symbols
                        .resolve(&candidate.module, &type_path.path, self.library)
                        .map(OwnerSymbol::Type)
                        .ok_or_else(|| SkipReason::UnresolvedOwner(rendered())),
                    _ => Err(SkipReason::UnresolvedOwner(rendered())),
                }
            }
        }
    }
}

enum OwnerSymbol {
    Module(ModulePath),
    Type(String),
}
