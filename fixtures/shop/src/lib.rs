//! A host crate wired the way applications use routegen: marked handlers
//! spread over modules, `build.rs` running the generator, and the emitted
//! units included at the crate root.

#![deny(unused_imports)]

pub mod auth;
pub mod endpoints;
pub mod health;
mod web;

pub use web::Startup;

routegen::include_generated!();

/// Router with every generated endpoint registered.
pub fn app() -> routegen::Router {
    let mut app = routegen::Router::new();
    Startup::register_generated_endpoints(&mut app);
    app
}
