//! Route markers and the routing contract for build-time generated endpoint
//! registration.
//!
//! Handlers are marked where they are defined:
//!
//! ```rust,ignore
//! use routegen::prelude::*;
//!
//! #[derive(Default)]
//! pub struct ProductEndpoints;
//!
//! impl ProductEndpoints {
//!     #[get("products/{id}")]
//!     pub async fn get_by_id(req: Request) -> String {
//!         let params = PathParams::from_request(&req);
//!         format!("product {}", params.get("id").unwrap_or_default())
//!     }
//!
//!     #[post_with(RequireAuthorization, "member/products/buy")]
//!     pub async fn buy(&self, req: Request) -> StatusCode {
//!         StatusCode::CREATED
//!     }
//! }
//!
//! #[generate_endpoints]
//! pub struct Startup;
//!
//! routegen::include_generated!();
//! ```
//!
//! `routegen-build` runs from `build.rs` and emits
//! `Startup::register_generated_endpoints(&mut Router)`, which the host calls
//! once at startup.

pub mod configurator;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod introspection;
pub mod response;
pub mod router;

pub use configurator::{Configurator, RequireAuthorization};
pub use error::{Error, Result};
pub use router::{Request, Response, RouteEntry, Router};

pub use routegen_macros::{
    delete, delete_with, generate_endpoints, get, get_with, post, post_with, put, put_with,
};

pub use http::{Method, StatusCode};

pub mod prelude {
    pub use crate::configurator::{Configurator, RequireAuthorization};
    pub use crate::error::Error;
    pub use crate::extract::{Json, PathParams};
    pub use crate::response::IntoResponse;
    pub use crate::router::{Request, Response, RouteEntry, Router};

    pub use http::{Method, StatusCode};

    pub use routegen_macros::{
        delete, delete_with, generate_endpoints, get, get_with, post, post_with, put, put_with,
    };
}
