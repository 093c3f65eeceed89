//! Source emission.
//!
//! Every target receives the same registration body; only the `impl` header
//! and the method's visibility differ between units.

use crate::naming::{self, REGISTRATION_FN};
use crate::resolve::{GenerationTarget, HandlerRef, InstanceFields, Route};

const HEADER: &str = "// @generated by routegen-build. Do not edit.\n";

/// One emitted source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    pub target: GenerationTarget,
    pub file_name: String,
    pub contents: String,
}

/// Paths the emitted code refers to.
#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// Crate exporting the routing prelude.
    pub library: String,
    /// Type of the registration method's `app` parameter.
    pub app_type: String,
}

pub fn emit(
    routes: &[Route],
    fields: &InstanceFields,
    targets: &[GenerationTarget],
    options: &EmitOptions,
) -> Vec<GeneratedUnit> {
    if routes.is_empty() {
        return Vec::new();
    }

    let body = render_body(routes, fields, options);
    targets
        .iter()
        .map(|target| {
            let unit = GeneratedUnit {
                target: target.clone(),
                file_name: naming::unit_file_name(target),
                contents: render_unit(target, &body, options),
            };
            tracing::info!(target = %target.impl_path(), file = %unit.file_name, "emitted unit");
            unit
        })
        .collect()
}

/// Index file including every unit, relative to `OUT_DIR`.
pub fn render_index(units: &[GeneratedUnit]) -> String {
    let mut out = String::from(HEADER);
    for unit in units {
        out.push_str(&format!(
            "include!(concat!(env!(\"OUT_DIR\"), \"/{}\"));\n",
            unit.file_name
        ));
    }
    out
}

fn render_unit(target: &GenerationTarget, body: &str, options: &EmitOptions) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    out.push_str(&format!("impl {} {{\n", target.impl_path()));
    out.push_str(&format!(
        "    {}fn {}(app: &mut {}) {{\n",
        target.accessibility.keyword(),
        REGISTRATION_FN,
        options.app_type
    ));
    out.push_str(body);
    out.push_str("    }\n}\n");
    out
}

fn render_body(routes: &[Route], fields: &InstanceFields, options: &EmitOptions) -> String {
    let mut out = String::new();
    out.push_str("        #[allow(unused_imports)]\n");
    out.push_str(&format!("        use ::{}::prelude::*;\n", options.library));
    out.push('\n');

    for field in fields.iter() {
        out.push_str("        #[allow(non_upper_case_globals)]\n");
        out.push_str(&format!(
            "        static {}: ::std::sync::LazyLock<{}> =\n",
            field.name, field.owner
        ));
        out.push_str("            ::std::sync::LazyLock::new(::std::default::Default::default);\n");
    }
    if !fields.is_empty() {
        out.push('\n');
    }

    for route in routes {
        out.push_str(&render_route(route));
    }
    out
}

fn render_route(route: &Route) -> String {
    let mapping = format!(
        "app.{}({:?}, {})",
        route.verb.mapping_operation(),
        route.path,
        handler_expr(&route.handler)
    );

    match (&route.name, &route.configurator) {
        (None, None) => format!("        {};\n", mapping),
        (Some(name), None) => format!("        {}.with_name({:?});\n", mapping, name),
        (name, Some(configurator)) => {
            let mut out = String::from("        {\n");
            out.push_str(&format!("            let route = {};\n", mapping));
            if let Some(name) = name {
                out.push_str(&format!("            route.with_name({:?});\n", name));
            }
            out.push_str(&format!(
                "            let configurator = <{} as ::std::default::Default>::default();\n",
                configurator
            ));
            out.push_str("            configurator.configure(route);\n");
            out.push_str("        }\n");
            out
        }
    }
}

/// Instance methods are bound to their field through a forwarding closure.
fn handler_expr(handler: &HandlerRef) -> String {
    match handler {
        HandlerRef::Static { .. } => handler.to_string(),
        HandlerRef::Instance { field, method } => {
            format!("|req| {}.{}(req)", field, method)
        }
    }
}
