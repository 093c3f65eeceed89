use routegen::prelude::*;

/// Member routes need an `authorization` header.
#[derive(Default)]
pub struct AuthConfigurator;

impl Configurator for AuthConfigurator {
    fn configure(&self, route: &mut RouteEntry) {
        route.require_authorization();
    }
}

/// Names the route after its path so it shows up in the audit log.
#[derive(Default)]
pub struct AuditConfigurator;

impl Configurator for AuditConfigurator {
    fn configure(&self, route: &mut RouteEntry) {
        let name = format!("audited:{}", route.path());
        route.with_name(&name);
    }
}
