//! Middleware demo: a namespace middleware list applied to every route
//! registered under the prefix.

use nsroute::middleware::{MiddlewareResult, Next};
use nsroute::{Method, MiddlewareManager, Request, Response, Router, ServerError};

fn require_token(req: Request, next: Next) -> MiddlewareResult {
    Box::pin(async move {
        if req.get_header("x-token") == Some("secret") {
            next.handle(req).await
        } else {
            Err(ServerError::Unauthorized("missing x-token".to_string()))
        }
    })
}

#[tokio::main]
async fn main() {
    let mut router = Router::new();

    router
        .namespace_with("/admin", MiddlewareManager::new().with(require_token))
        .unwrap()
        .get("/panel", |_req| async { Ok(Response::text("admin panel")) })
        .unwrap();

    let anonymous = Request::new(Method::GET, "/admin/panel");
    println!("without token -> {:?}", router.dispatch(anonymous).await);

    let mut authed = Request::new(Method::GET, "/admin/panel");
    authed
        .headers
        .insert("x-token".to_string(), "secret".to_string());
    match router.dispatch(authed).await {
        Ok(res) => println!("with token -> {} {}", res.status, res.body),
        Err(err) => println!("with token -> {}", err),
    }
}
