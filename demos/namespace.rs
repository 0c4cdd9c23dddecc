//! Namespace demo: prefixed registration, named routes, and redirects.

use nsroute::{Method, Request, Response, Router};

#[tokio::main]
async fn main() {
    let mut router = Router::new();

    router
        .get("/", |_req| async { Ok(Response::text("hi, nsroute")) })
        .unwrap();

    let mut sub = router.namespace("/sub").unwrap();
    sub.get("/get", |_req| async { Ok(Response::text("sub get")) })
        .unwrap();
    sub.get("/get/:id", |req: Request| async move {
        let id = req.params.get("id").cloned().unwrap_or_default();
        nsroute::ok_json!({ "id": id })
    })
    .unwrap();
    sub.get(("sub_name", "/name"), |_req| async {
        Ok(Response::text("named"))
    })
    .unwrap();
    sub.redirect("/go", "/get").unwrap();
    sub.redirect("/go_name", "sub_name").unwrap();

    for (method, path) in [
        (Method::GET, "/"),
        (Method::GET, "/sub/get"),
        (Method::GET, "/sub/get/123"),
        (Method::GET, "/sub/go"),
        (Method::GET, "/sub/go_name"),
    ] {
        match router.dispatch(Request::new(method, path)).await {
            Ok(res) => match res.headers.get("Location") {
                Some(location) => println!("{} -> {} {}", path, res.status, location),
                None => println!("{} -> {} {}", path, res.status, res.body),
            },
            Err(err) => println!("{} -> {}", path, err),
        }
    }

    println!("url(sub_name) = {}", router.url("sub_name"));
}
