//! Integration tests for the generation pass, from source text to emitted units.

use routegen_build::{Compilation, Config, Generation, SkipReason, Verb, generate};

// ── Fixtures ────────────────────────────────────────────────────────────────

const STARTUP: &str = r#"
use routegen::generate_endpoints;

#[generate_endpoints]
pub struct Startup;
"#;

const ENDPOINTS: &str = r#"
use routegen::prelude::*;
use crate::auth::AuthConfigurator;

#[derive(Default)]
pub struct ProductEndpoints;

impl ProductEndpoints {
    #[get("products/{id}")]
    pub async fn get_by_id(req: Request) -> Response { todo!() }

    #[get("products/named", name = "NamedProducts")]
    pub async fn get_named_endpoint(req: Request) -> Response { todo!() }

    #[get("member/products", configurator = AuthConfigurator)]
    pub async fn get_member_products(&self, req: Request) -> Response { todo!() }

    #[post_with(AuthConfigurator, "member/products/buy")]
    pub async fn buy(&self, req: Request) -> Response { todo!() }

    pub fn helper(&self) {}
}
"#;

const AUTH: &str = r#"
#[derive(Default)]
pub struct AuthConfigurator;
"#;

fn compilation(sources: &[(&str, &str)]) -> Compilation {
    let mut compilation = Compilation::new().with_reference("routegen");
    for (path, text) in sources {
        compilation.add_source(*path, text);
    }
    compilation
}

fn shop() -> Generation {
    generate(
        &compilation(&[
            ("lib.rs", STARTUP),
            ("endpoints.rs", ENDPOINTS),
            ("auth.rs", AUTH),
        ]),
        &Config::default(),
    )
}

// ── Scenarios ───────────────────────────────────────────────────────────────

#[test]
fn test_static_handler_registration() {
    let generation = shop();
    let contents = &generation.units[0].contents;

    assert!(contents.contains(
        "        app.map_get(\"products/{id}\", crate::endpoints::ProductEndpoints::get_by_id);\n"
    ));
}

#[test]
fn test_shared_instance_with_configurators() {
    let generation = shop();
    let contents = &generation.units[0].contents;

    assert_eq!(generation.instance_fields.len(), 1);
    assert_eq!(contents.matches("static __instance_").count(), 1);
    assert!(contents.contains(
        "static __instance_0: ::std::sync::LazyLock<crate::endpoints::ProductEndpoints>"
    ));
    assert!(contents.contains(
        "let route = app.map_get(\"member/products\", |req| __instance_0.get_member_products(req));"
    ));
    assert!(contents.contains(
        "let route = app.map_post(\"member/products/buy\", |req| __instance_0.buy(req));"
    ));
    assert_eq!(
        contents
            .matches(
                "let configurator = <crate::auth::AuthConfigurator as ::std::default::Default>::default();"
            )
            .count(),
        2
    );
    assert_eq!(contents.matches("configurator.configure(route);").count(), 2);
}

#[test]
fn test_named_route() {
    let generation = shop();
    assert!(generation.units[0].contents.contains(
        "app.map_get(\"products/named\", crate::endpoints::ProductEndpoints::get_named_endpoint).with_name(\"NamedProducts\");"
    ));
}

#[test]
fn test_registration_order_follows_source_order() {
    let generation = shop();

    let routes: Vec<(Verb, &str)> = generation
        .routes
        .iter()
        .map(|route| (route.verb, route.path.as_str()))
        .collect();
    assert_eq!(
        routes,
        [
            (Verb::Get, "products/{id}"),
            (Verb::Get, "products/named"),
            (Verb::Get, "member/products"),
            (Verb::Post, "member/products/buy"),
        ]
    );

    let contents = &generation.units[0].contents;
    let positions: Vec<usize> = routes
        .iter()
        .map(|(_, path)| contents.find(&format!("{:?}", path)).unwrap())
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn test_unit_shape() {
    let generation = shop();

    assert_eq!(generation.units.len(), 1);
    let unit = &generation.units[0];
    assert_eq!(unit.file_name, "startup.generated_endpoints.rs");
    assert!(unit.contents.contains("impl Startup {\n"));
    assert!(unit.contents.contains(
        "    pub fn register_generated_endpoints(app: &mut ::routegen::Router) {\n"
    ));
    assert!(unit.contents.contains("use ::routegen::prelude::*;"));
    assert!(generation.skipped.is_empty());
}

// ── Edge cases ──────────────────────────────────────────────────────────────

#[test]
fn test_no_routes_no_units() {
    let generation = generate(&compilation(&[("lib.rs", STARTUP)]), &Config::default());

    assert!(generation.library_referenced);
    assert_eq!(generation.targets.len(), 1);
    assert!(generation.routes.is_empty());
    assert!(generation.units.is_empty());
    assert_eq!(generation.index(), "// @generated by routegen-build. Do not edit.\n");
}

#[test]
fn test_missing_library_reference_is_a_no_op() {
    let mut unreferenced = Compilation::new().with_reference("serde");
    unreferenced.add_source("lib.rs", STARTUP);
    unreferenced.add_source("endpoints.rs", ENDPOINTS);

    let generation = generate(&unreferenced, &Config::default());

    assert!(!generation.library_referenced);
    assert!(generation.routes.is_empty());
    assert!(generation.targets.is_empty());
    assert!(generation.units.is_empty());
}

#[test]
fn test_routes_without_targets_emit_nothing() {
    let generation = generate(
        &compilation(&[("endpoints.rs", ENDPOINTS), ("auth.rs", AUTH)]),
        &Config::default(),
    );
    assert_eq!(generation.routes.len(), 4);
    assert!(generation.units.is_empty());
}

#[test]
fn test_every_target_receives_the_same_body() {
    let generation = generate(
        &compilation(&[
            ("lib.rs", STARTUP),
            ("endpoints.rs", ENDPOINTS),
            ("auth.rs", AUTH),
            (
                "admin/mod.rs",
                "#[routegen::generate_endpoints]\npub(crate) struct AdminStartup;",
            ),
        ]),
        &Config::default(),
    );

    assert_eq!(generation.units.len(), 2);
    let root = &generation.units[0];
    let admin = &generation.units[1];
    assert_eq!(admin.file_name, "admin.admin_startup.generated_endpoints.rs");
    assert!(admin.contents.contains("impl crate::admin::AdminStartup {\n"));
    assert!(admin.contents.contains("    pub(crate) fn register_generated_endpoints("));

    let body = |contents: &str| {
        let (_, after_impl) = contents.split_once("{\n").unwrap();
        after_impl.split_once("{\n").unwrap().1.to_string()
    };
    assert_eq!(body(&admin.contents), body(&root.contents));
}

#[test]
fn test_skips_are_reported_and_do_not_stop_the_pass() {
    let generation = generate(
        &compilation(&[
            ("lib.rs", STARTUP),
            ("broken.rs", "impl Broken { fn ( }"),
            (
                "endpoints.rs",
                r#"
                pub struct E;
                impl E {
                    #[get] fn no_route() {}
                    #[post("ok")] fn ok() {}
                    #[get("bad", configurator = Wrapper<u8>)] fn generic_configurator() {}
                }
                "#,
            ),
        ]),
        &Config::default(),
    );

    assert_eq!(generation.routes.len(), 1);
    assert_eq!(generation.routes[0].path, "ok");

    let reasons: Vec<&SkipReason> = generation.skipped.iter().map(|s| &s.reason).collect();
    assert_eq!(reasons.len(), 3);
    assert!(matches!(reasons[0], SkipReason::UnparseableFile(_)));
    assert!(matches!(reasons[1], SkipReason::MissingRoute(_)));
    assert!(matches!(reasons[2], SkipReason::UnresolvedConfigurator(_)));
    assert!(generation.skipped[1].to_string().contains("`no_route`"));
}

#[test]
fn test_emitted_paths_name_items_from_the_crate_root() {
    let generation = generate(
        &compilation(&[
            ("lib.rs", "mod web;"),
            ("auth.rs", AUTH),
            (
                "endpoints.rs",
                r#"
                use routegen::prelude::*;
                use crate::auth::*;
                #[derive(Default)]
                pub struct E;
                impl E {
                    #[get("member", configurator = AuthConfigurator)] pub fn member(&self) {}
                    #[get_with(RequireAuthorization, "orders")] pub fn orders() {}
                    #[get("lost", configurator = LostConfigurator)] pub fn lost() {}
                }
                "#,
            ),
            (
                "web.rs",
                "#[generate_endpoints]\npub struct Startup;\nmod private { #[routegen::generate_endpoints] pub struct Hidden; }",
            ),
        ]),
        &Config::default(),
    );

    assert_eq!(generation.units.len(), 1);
    let contents = &generation.units[0].contents;
    assert!(contents.contains("impl crate::web::Startup {\n"));
    assert!(contents.contains(
        "let configurator = <crate::auth::AuthConfigurator as ::std::default::Default>::default();"
    ));
    assert!(contents.contains(
        "let configurator = <::routegen::prelude::RequireAuthorization as ::std::default::Default>::default();"
    ));
    assert!(!contents.contains("LostConfigurator"));

    let reasons: Vec<&SkipReason> = generation.skipped.iter().map(|s| &s.reason).collect();
    assert!(matches!(reasons[0], SkipReason::UnresolvedConfigurator(c) if c == "LostConfigurator"));
    assert!(matches!(reasons[1], SkipReason::InaccessibleTarget(t) if t == "crate::web::private::Hidden"));
}

#[test]
fn test_custom_marker_alias() {
    let mut config = Config::default();
    config
        .markers
        .insert("get_cached".to_string(), "get".to_string());

    let generation = generate(
        &compilation(&[
            ("lib.rs", STARTUP),
            (
                "endpoints.rs",
                "pub struct E;\nimpl E { #[get_cached(\"cached\")] fn cached() {} }",
            ),
        ]),
        &config,
    );

    assert_eq!(generation.routes.len(), 1);
    assert_eq!(generation.routes[0].verb, Verb::Get);
}

#[test]
fn test_custom_app_type() {
    let config = Config {
        app_type: "crate::App".to_string(),
        ..Config::default()
    };
    let generation = generate(
        &compilation(&[("lib.rs", STARTUP), ("endpoints.rs", ENDPOINTS), ("auth.rs", AUTH)]),
        &config,
    );
    assert!(generation.units[0]
        .contents
        .contains("fn register_generated_endpoints(app: &mut crate::App)"));
}

#[test]
fn test_output_is_deterministic() {
    let first = shop();
    let second = shop();

    assert_eq!(first.units, second.units);
    assert_eq!(first.index(), second.index());
}
