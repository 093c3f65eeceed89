use routegen::{Request, get_with};

use crate::auth::AuditConfigurator;

#[get_with(AuditConfigurator, "health")]
pub async fn check(_req: Request) -> &'static str {
    "ok"
}
