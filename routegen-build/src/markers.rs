//! The marker vocabulary.
//!
//! Routes are declared with attribute markers on functions:
//!
//! ```rust,ignore
//! #[get("products/{id}")]
//! #[get("products/named", name = "NamedProducts")]
//! #[post("products/buy", configurator = AuthConfigurator)]
//! #[put_with(AuthConfigurator, "member/products/{id}/note")]
//! ```
//!
//! Every marker derives, directly or through other markers, from the abstract
//! `endpoint` root. The `*_with` family derives from `endpoint_with` and binds a
//! configurator type as its first argument. Hosts may register their own
//! aliases through [`Config::markers`](crate::Config::markers); an alias
//! qualifies as a route marker as long as its parent chain reaches the root.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use proc_macro2::{Span, TokenStream};
use serde::Serialize;
use syn::parse::{ParseStream, Parser};
use syn::{Attribute, Ident, LitStr, Meta, Path, Token};

/// Root of every endpoint marker.
pub const ENDPOINT_ROOT: &str = "endpoint";

/// Root of the markers that bind a configurator as their first argument.
pub const ENDPOINT_WITH: &str = "endpoint_with";

/// Marker placed on the type that receives the registration method.
pub const GENERATE_ENDPOINTS: &str = "generate_endpoints";

/// HTTP verbs a route can be registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    pub const ALL: [Verb; 4] = [Verb::Get, Verb::Post, Verb::Put, Verb::Delete];

    /// Lowercase token a marker name starts with.
    pub fn token(self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::Post => "post",
            Verb::Put => "put",
            Verb::Delete => "delete",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
        }
    }

    /// Routing-layer operation that registers a route under this verb.
    pub fn mapping_operation(self) -> &'static str {
        match self {
            Verb::Get => "map_get",
            Verb::Post => "map_post",
            Verb::Put => "map_put",
            Verb::Delete => "map_delete",
        }
    }

    /// Maps a marker name to a verb by prefix, so `get`, `get_with` and a
    /// host alias such as `get_cached` all register under GET.
    pub fn from_marker_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|verb| name.starts_with(verb.token()))
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved endpoint marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointMarker {
    pub verb: Verb,
    pub route: String,
    pub name: Option<String>,
    pub configurator: Option<String>,
}

/// Argument layout of a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    /// `("route", name = "..", configurator = Type)`
    Plain,
    /// `(Type, "route", name = "..", configurator = Type)`
    Bound,
}

/// Raw arguments of a marker attribute, before any resolution.
///
/// The same grammar backs both the compile-time validation done by the
/// marker macros and the build-time classification.
#[derive(Debug, Clone, Default)]
pub struct MarkerArgs {
    pub bound: Option<Path>,
    pub route: Option<LitStr>,
    pub name: Option<LitStr>,
    pub configurator: Option<Path>,
}

impl MarkerArgs {
    pub fn parse(input: ParseStream<'_>, shape: MarkerShape) -> syn::Result<Self> {
        let mut args = MarkerArgs::default();

        if shape == MarkerShape::Bound {
            args.bound = Some(input.parse()?);
            if input.is_empty() {
                return Ok(args);
            }
            input.parse::<Token![,]>()?;
        }

        if input.is_empty() {
            return Ok(args);
        }
        args.route = Some(input.parse()?);

        while !input.is_empty() {
            input.parse::<Token![,]>()?;
            if input.is_empty() {
                break;
            }

            let key: Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            match key.to_string().as_str() {
                "name" if args.name.is_none() => args.name = Some(input.parse()?),
                "configurator" if args.configurator.is_none() => {
                    args.configurator = Some(input.parse()?)
                }
                "name" | "configurator" => {
                    return Err(syn::Error::new(
                        key.span(),
                        format!("duplicate marker property `{}`", key),
                    ));
                }
                other => {
                    return Err(syn::Error::new(
                        key.span(),
                        format!(
                            "unknown marker property `{}`, expected `name` or `configurator`",
                            other
                        ),
                    ));
                }
            }
        }

        Ok(args)
    }

    /// Parses the tokens inside a marker's parentheses.
    pub fn parse_tokens(tokens: TokenStream, shape: MarkerShape) -> syn::Result<Self> {
        (|input: ParseStream<'_>| Self::parse(input, shape)).parse2(tokens)
    }

    /// Parses the arguments of a marker attribute. A bare `#[get]` yields no
    /// arguments at all.
    pub fn from_attribute(attr: &Attribute, shape: MarkerShape) -> syn::Result<Self> {
        match &attr.meta {
            Meta::Path(_) => Ok(Self::default()),
            Meta::List(list) => Self::parse_tokens(list.tokens.clone(), shape),
            Meta::NameValue(meta) => Err(syn::Error::new_spanned(
                meta,
                "expected marker arguments in parentheses",
            )),
        }
    }

    /// Route argument, when present and non-empty.
    pub fn route(&self) -> Option<String> {
        self.route
            .as_ref()
            .map(LitStr::value)
            .filter(|route| !route.is_empty())
    }

    /// Configurator type, an explicit `configurator = ..` property taking
    /// precedence over a bound one.
    pub fn configurator(&self) -> Option<&Path> {
        self.configurator.as_ref().or(self.bound.as_ref())
    }

    /// Compile-time check applied by the marker macros.
    pub fn validate(&self) -> syn::Result<()> {
        match &self.route {
            None => Err(syn::Error::new(
                Span::call_site(),
                "expected a route string literal, e.g. #[get(\"users/{id}\")]",
            )),
            Some(route) if route.value().is_empty() => {
                Err(syn::Error::new(route.span(), "route must not be empty"))
            }
            Some(_) => Ok(()),
        }
    }
}

/// Marker names and the parent each one derives from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerVocabulary {
    parents: BTreeMap<String, String>,
}

impl MarkerVocabulary {
    /// The markers shipped by the marker library.
    pub fn builtin() -> Self {
        let mut parents = BTreeMap::new();
        parents.insert(ENDPOINT_WITH.to_string(), ENDPOINT_ROOT.to_string());
        for verb in Verb::ALL {
            parents.insert(verb.token().to_string(), ENDPOINT_ROOT.to_string());
            parents.insert(format!("{}_with", verb.token()), ENDPOINT_WITH.to_string());
        }
        Self { parents }
    }

    pub fn with_alias(mut self, alias: impl Into<String>, parent: impl Into<String>) -> Self {
        self.parents.insert(alias.into(), parent.into());
        self
    }

    pub fn extend<'a>(mut self, aliases: impl IntoIterator<Item = (&'a String, &'a String)>) -> Self {
        for (alias, parent) in aliases {
            self.parents.insert(alias.clone(), parent.clone());
        }
        self
    }

    /// Whether `name` is `ancestor` or reaches it through its parent chain.
    pub fn derives_from(&self, name: &str, ancestor: &str) -> bool {
        let mut seen = BTreeSet::new();
        let mut current = Some(name);
        while let Some(marker) = current {
            if marker == ancestor {
                return true;
            }
            if !seen.insert(marker) {
                return false;
            }
            current = self.parents.get(marker).map(String::as_str);
        }
        false
    }

    pub fn is_endpoint_marker(&self, name: &str) -> bool {
        self.derives_from(name, ENDPOINT_ROOT)
    }

    pub fn shape(&self, name: &str) -> MarkerShape {
        if self.derives_from(name, ENDPOINT_WITH) {
            MarkerShape::Bound
        } else {
            MarkerShape::Plain
        }
    }

    /// Aliases whose parent chain never reaches the endpoint root.
    pub fn dangling(&self) -> Vec<&str> {
        self.parents
            .keys()
            .map(String::as_str)
            .filter(|name| !self.is_endpoint_marker(name))
            .collect()
    }
}

impl Default for MarkerVocabulary {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    #[test]
    fn test_verb_from_marker_name_uses_prefix() {
        assert_eq!(Verb::from_marker_name("get"), Some(Verb::Get));
        assert_eq!(Verb::from_marker_name("get_with"), Some(Verb::Get));
        assert_eq!(Verb::from_marker_name("post_cached"), Some(Verb::Post));
        assert_eq!(Verb::from_marker_name("put"), Some(Verb::Put));
        assert_eq!(Verb::from_marker_name("delete_with"), Some(Verb::Delete));
        assert_eq!(Verb::from_marker_name("endpoint"), None);
        assert_eq!(Verb::from_marker_name("patch"), None);
    }

    #[test]
    fn test_verb_mapping_operation() {
        assert_eq!(Verb::Get.mapping_operation(), "map_get");
        assert_eq!(Verb::Delete.mapping_operation(), "map_delete");
        assert_eq!(Verb::Post.to_string(), "POST");
    }

    #[test]
    fn test_builtin_markers_derive_from_root() {
        let vocabulary = MarkerVocabulary::builtin();
        for name in ["get", "post", "put", "delete", "get_with", "delete_with"] {
            assert!(vocabulary.is_endpoint_marker(name), "{name}");
        }
        assert!(vocabulary.is_endpoint_marker(ENDPOINT_ROOT));
        assert!(!vocabulary.is_endpoint_marker("inline"));
        assert!(!vocabulary.is_endpoint_marker(GENERATE_ENDPOINTS));
    }

    #[test]
    fn test_shape_follows_parent_chain() {
        let vocabulary = MarkerVocabulary::builtin().with_alias("get_secure", "get_with");
        assert_eq!(vocabulary.shape("get"), MarkerShape::Plain);
        assert_eq!(vocabulary.shape("post_with"), MarkerShape::Bound);
        assert_eq!(vocabulary.shape("get_secure"), MarkerShape::Bound);
    }

    #[test]
    fn test_alias_chain_is_transitive() {
        let vocabulary = MarkerVocabulary::builtin()
            .with_alias("fetch", "get")
            .with_alias("fetch_cached", "fetch");
        assert!(vocabulary.is_endpoint_marker("fetch_cached"));
        assert!(vocabulary.dangling().is_empty());
    }

    #[test]
    fn test_alias_cycle_does_not_derive() {
        let vocabulary = MarkerVocabulary::builtin()
            .with_alias("ping", "pong")
            .with_alias("pong", "ping");
        assert!(!vocabulary.is_endpoint_marker("ping"));
        assert_eq!(vocabulary.dangling(), vec!["ping", "pong"]);
    }

    #[test]
    fn test_parse_plain_route_only() {
        let args = MarkerArgs::parse_tokens(quote!("products/{id}"), MarkerShape::Plain).unwrap();
        assert_eq!(args.route().as_deref(), Some("products/{id}"));
        assert!(args.name.is_none());
        assert!(args.configurator().is_none());
    }

    #[test]
    fn test_parse_plain_with_properties() {
        let args = MarkerArgs::parse_tokens(
            quote!("products/named", name = "NamedProducts", configurator = auth::Admin,),
            MarkerShape::Plain,
        )
        .unwrap();
        assert_eq!(args.name.unwrap().value(), "NamedProducts");
        assert_eq!(args.configurator.unwrap().segments.len(), 2);
    }

    #[test]
    fn test_parse_bound_marker() {
        let args =
            MarkerArgs::parse_tokens(quote!(AuthConfigurator, "member/products"), MarkerShape::Bound)
                .unwrap();
        assert!(args.bound.as_ref().unwrap().is_ident("AuthConfigurator"));
        assert_eq!(args.route().as_deref(), Some("member/products"));
    }

    #[test]
    fn test_explicit_configurator_wins_over_bound() {
        let args = MarkerArgs::parse_tokens(
            quote!(AuthConfigurator, "member/products", configurator = AuditConfigurator),
            MarkerShape::Bound,
        )
        .unwrap();
        assert!(args.configurator().unwrap().is_ident("AuditConfigurator"));
    }

    #[test]
    fn test_empty_arguments_have_no_route() {
        let args = MarkerArgs::parse_tokens(quote!(), MarkerShape::Plain).unwrap();
        assert!(args.route().is_none());
        assert!(args.validate().is_err());

        let args = MarkerArgs::parse_tokens(quote!(""), MarkerShape::Plain).unwrap();
        assert!(args.route().is_none());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_unknown_property_rejected() {
        let err = MarkerArgs::parse_tokens(quote!("a", title = "x"), MarkerShape::Plain)
            .unwrap_err();
        assert!(err.to_string().contains("unknown marker property `title`"));
    }

    #[test]
    fn test_duplicate_property_rejected() {
        let err = MarkerArgs::parse_tokens(quote!("a", name = "x", name = "y"), MarkerShape::Plain)
            .unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_non_literal_route_rejected() {
        assert!(MarkerArgs::parse_tokens(quote!(42), MarkerShape::Plain).is_err());
    }
}
