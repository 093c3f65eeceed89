//! Per-route configuration hooks.

use crate::router::RouteEntry;

/// Runs once against a route right after it is registered.
///
/// Generated registration code default-constructs the configurator named by a
/// marker and passes it the handle returned by the mapping call, so
/// implementors must also implement [`Default`].
pub trait Configurator<R = RouteEntry> {
    fn configure(&self, route: &mut R);
}

/// Marks the route as requiring an `authorization` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequireAuthorization;

impl Configurator for RequireAuthorization {
    fn configure(&self, route: &mut RouteEntry) {
        route.require_authorization();
    }
}
