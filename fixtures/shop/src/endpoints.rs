use routegen::prelude::*;

use crate::auth::*;

pub struct ProductEndpoints {
    greeting: &'static str,
}

impl Default for ProductEndpoints {
    fn default() -> Self {
        Self { greeting: "member" }
    }
}

impl ProductEndpoints {
    #[get("products/{id}")]
    pub async fn get_by_id(req: Request) -> String {
        let params = PathParams::from_request(&req);
        format!("product {}", params.get("id").unwrap_or_default())
    }

    #[get("products/named", name = "NamedProducts")]
    pub async fn get_named(_req: Request) -> &'static str {
        "named"
    }

    #[get("member/products", configurator = AuthConfigurator)]
    pub async fn get_member_products(&self, _req: Request) -> String {
        format!("{} products", self.greeting)
    }

    #[post("member/products/buy", configurator = AuthConfigurator)]
    pub async fn buy(&self, _req: Request) -> StatusCode {
        StatusCode::CREATED
    }

    #[delete_with(RequireAuthorization, "products/{id}", configurator = AuditConfigurator)]
    pub async fn remove(_req: Request) -> StatusCode {
        StatusCode::NO_CONTENT
    }
}
