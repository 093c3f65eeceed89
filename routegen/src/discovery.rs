//! Inclusion of the registration code emitted by `routegen-build`.

/// Includes every registration unit written by `routegen_build::Builder`.
///
/// Invoke once at the crate root, after the build script ran:
///
/// ```rust,ignore
/// routegen::include_generated!();
///
/// fn main() {
///     let mut app = routegen::Router::new();
///     Startup::register_generated_endpoints(&mut app);
/// }
/// ```
#[macro_export]
macro_rules! include_generated {
    () => {
        include!(concat!(env!("OUT_DIR"), "/routegen.rs"));
    };
}
