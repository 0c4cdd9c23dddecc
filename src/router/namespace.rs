//! Namespaced sub-routers.
//!
//! A [`Namespace`] is a scoped view of a [`Router`] bound to one path prefix
//! and one middleware list. Every route registered through it lands on the
//! base router with the prefix prepended and the captured middlewares spliced
//! in between the router-wide middlewares and the handlers. Anything outside
//! the intercepted registration surface (`url`, `middleware`, `dispatch`, …)
//! passes through to the live base router via `Deref`.

use super::{RoutePattern, RouteSpec, Router};
use crate::error::{RouterError, RouterResult};
use std::fmt;
use crate::handler::IntoResponse;
use crate::http::{Method, Request};
use crate::middleware::MiddlewareManager;
use crate::router::Resource;
use std::ops::{Deref, DerefMut};

impl Router {
    /// Returns the sub-router for `prefix`, creating it on first use.
    ///
    /// Equivalent to [`Router::namespace_with`] with an empty middleware
    /// list. Note that if the prefix was already seen, the cached middleware
    /// list applies regardless of what a later call supplies.
    pub fn namespace<P: Into<RoutePattern>>(&mut self, prefix: P) -> RouterResult<Namespace<'_>> {
        self.namespace_with(prefix, MiddlewareManager::new())
    }

    /// Returns the sub-router for `prefix`, capturing `middlewares` on the
    /// first call for that prefix.
    ///
    /// Sub-router state is cached per prefix for the lifetime of the router
    /// and never evicted. The cache is keyed purely by the prefix string:
    /// middlewares supplied after the first call for a prefix are discarded,
    /// not merged. That mirrors the long-standing behavior applications
    /// depend on, so it is kept rather than fixed.
    pub fn namespace_with<P: Into<RoutePattern>>(
        &mut self,
        prefix: P,
        middlewares: MiddlewareManager,
    ) -> RouterResult<Namespace<'_>> {
        let prefix = match prefix.into() {
            RoutePattern::Literal(prefix) => prefix,
            pattern @ RoutePattern::Regex(_) => {
                return Err(RouterError::RegexPrefix(pattern.to_string()))
            }
        };
        if prefix == "/" {
            // the bare root would turn every sub-path into a degenerate
            // double-root path such as `//hello`
            return Err(RouterError::ReservedPrefix);
        }
        if prefix.is_empty() || !prefix.starts_with('/') {
            return Err(RouterError::InvalidPrefix(prefix));
        }

        let middlewares = self
            .namespaces
            .entry(prefix.clone())
            .or_insert(middlewares)
            .clone();
        Ok(Namespace {
            router: self,
            prefix,
            middlewares,
        })
    }
}

/// A sub-router bound to one prefix and one middleware list.
///
/// Registration methods return the base `&mut Router`, so multi-step chains
/// continue on the base router, not the namespace.
pub struct Namespace<'r> {
    router: &'r mut Router,
    prefix: String,
    middlewares: MiddlewareManager,
}

impl fmt::Debug for Namespace<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl<'r> Namespace<'r> {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn get<S, F, R>(&mut self, spec: S, handler: F) -> RouterResult<&mut Router>
    where
        S: Into<RouteSpec>,
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.add(Method::GET, spec.into(), handler)
    }

    pub fn post<S, F, R>(&mut self, spec: S, handler: F) -> RouterResult<&mut Router>
    where
        S: Into<RouteSpec>,
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.add(Method::POST, spec.into(), handler)
    }

    pub fn put<S, F, R>(&mut self, spec: S, handler: F) -> RouterResult<&mut Router>
    where
        S: Into<RouteSpec>,
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.add(Method::PUT, spec.into(), handler)
    }

    pub fn patch<S, F, R>(&mut self, spec: S, handler: F) -> RouterResult<&mut Router>
    where
        S: Into<RouteSpec>,
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.add(Method::PATCH, spec.into(), handler)
    }

    pub fn delete<S, F, R>(&mut self, spec: S, handler: F) -> RouterResult<&mut Router>
    where
        S: Into<RouteSpec>,
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.add(Method::DELETE, spec.into(), handler)
    }

    /// Alias of [`Namespace::delete`].
    pub fn del<S, F, R>(&mut self, spec: S, handler: F) -> RouterResult<&mut Router>
    where
        S: Into<RouteSpec>,
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.delete(spec, handler)
    }

    pub fn head<S, F, R>(&mut self, spec: S, handler: F) -> RouterResult<&mut Router>
    where
        S: Into<RouteSpec>,
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.add(Method::HEAD, spec.into(), handler)
    }

    pub fn options<S, F, R>(&mut self, spec: S, handler: F) -> RouterResult<&mut Router>
    where
        S: Into<RouteSpec>,
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.add(Method::OPTIONS, spec.into(), handler)
    }

    pub fn all<S, F, R>(&mut self, spec: S, handler: F) -> RouterResult<&mut Router>
    where
        S: Into<RouteSpec>,
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        let spec = self.rewrite(spec.into())?;
        self.router
            .register_all(&spec, &self.middlewares, Box::new(handler))?;
        Ok(&mut *self.router)
    }

    pub fn resources<S: Into<RouteSpec>>(
        &mut self,
        spec: S,
        resource: Resource,
    ) -> RouterResult<&mut Router> {
        let spec = self.rewrite(spec.into())?;
        self.router
            .register_resources(&spec, &self.middlewares, resource)?;
        Ok(&mut *self.router)
    }

    /// Registers a redirect under this namespace, answering 301.
    ///
    /// The source is joined under the prefix. A destination beginning with
    /// `/` is a raw path and gets the prefix prepended; anything else is a
    /// route name resolved through [`Router::url`] first, and the resolved
    /// url is already absolute so it is forwarded un-prefixed.
    pub fn redirect(&mut self, source: &str, destination: &str) -> RouterResult<&mut Router> {
        self.redirect_with_code(source, destination, 301)
    }

    pub fn redirect_with_code(
        &mut self,
        source: &str,
        destination: &str,
        code: u16,
    ) -> RouterResult<&mut Router> {
        let source = if source.starts_with('/') {
            format!("{}{}", self.prefix, source)
        } else {
            format!("{}/{}", self.prefix, source)
        };
        let destination = if destination.starts_with('/') {
            format!("{}{}", self.prefix, destination)
        } else {
            self.router.url(destination)
        };
        self.router
            .redirect_with_code(&source, &destination, code)?;
        Ok(&mut *self.router)
    }

    fn add<F, R>(
        &mut self,
        method: Method,
        spec: RouteSpec,
        handler: F,
    ) -> RouterResult<&mut Router>
    where
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        let spec = self.rewrite(spec)?;
        self.router
            .register(method, &spec, &self.middlewares, Box::new(handler))?;
        Ok(&mut *self.router)
    }

    /// Rewrites a route spec for this namespace: the path is replaced with
    /// `prefix + path` in both call shapes, names are left untouched.
    fn rewrite(&self, spec: RouteSpec) -> RouterResult<RouteSpec> {
        match spec {
            RouteSpec::Unnamed(path) => Ok(RouteSpec::Unnamed(self.prefixed(path)?)),
            RouteSpec::Named { name, path } => Ok(RouteSpec::Named {
                name,
                path: self.prefixed(path)?,
            }),
        }
    }

    fn prefixed(&self, path: RoutePattern) -> RouterResult<RoutePattern> {
        match path {
            RoutePattern::Literal(path) => {
                Ok(RoutePattern::Literal(format!("{}{}", self.prefix, path)))
            }
            pattern @ RoutePattern::Regex(_) => Err(RouterError::RegexPath(pattern.to_string())),
        }
    }
}

/// Everything outside the intercepted registration surface resolves live
/// against the base router, including state added after the namespace was
/// created.
impl Deref for Namespace<'_> {
    type Target = Router;

    fn deref(&self) -> &Router {
        self.router
    }
}

impl DerefMut for Namespace<'_> {
    fn deref_mut(&mut self) -> &mut Router {
        self.router
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServerError;
    use crate::handler::HttpResponse;
    use crate::http::{Request, Response};
    use crate::middleware::{Middleware, MiddlewareResult, Next};
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct Tag {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Middleware for Tag {
        fn call(&self, req: Request, next: Next) -> MiddlewareResult {
            let name = self.name;
            let log = Arc::clone(&self.log);
            Box::pin(async move {
                log.lock().unwrap().push(name);
                next.handle(req).await
            })
        }

        fn clone_box(&self) -> Box<dyn Middleware> {
            Box::new(self.clone())
        }
    }

    fn text(
        body: &'static str,
    ) -> impl Fn(Request) -> futures::future::BoxFuture<'static, HttpResponse> + Clone {
        move |_req| Box::pin(async move { Ok(Response::text(body)) })
    }

    fn logging(
        name: &'static str,
        log: &Arc<Mutex<Vec<&'static str>>>,
    ) -> impl Fn(Request) -> futures::future::BoxFuture<'static, HttpResponse> + Clone {
        let log = Arc::clone(log);
        move |_req| {
            let log = Arc::clone(&log);
            Box::pin(async move {
                log.lock().unwrap().push(name);
                Ok(Response::no_content())
            })
        }
    }

    #[tokio::test]
    async fn test_prefix_application() {
        let mut router = Router::new();
        router
            .namespace("/sub")
            .unwrap()
            .get("/get", text("sub get"))
            .unwrap();

        let res = router
            .dispatch(Request::new(Method::GET, "/sub/get"))
            .await
            .unwrap();
        assert_eq!(res.body, "sub get");

        // the unprefixed path is not reachable
        let res = router.dispatch(Request::new(Method::GET, "/get")).await;
        assert!(matches!(res, Err(ServerError::NotFound)));
    }

    #[tokio::test]
    async fn test_every_intercepted_method() {
        let mut router = Router::new();
        let mut sub = router.namespace("/sub").unwrap();
        sub.head("/head", text("head")).unwrap();
        sub.options("/options", text("options")).unwrap();
        sub.get("/get", text("get")).unwrap();
        sub.put("/put", text("put")).unwrap();
        sub.patch("/patch", text("patch")).unwrap();
        sub.post("/post", text("post")).unwrap();
        sub.delete("/delete", text("delete")).unwrap();
        sub.del("/del", text("del")).unwrap();
        sub.all("/all", text("all")).unwrap();

        for (method, path, body) in [
            (Method::HEAD, "/sub/head", "head"),
            (Method::GET, "/sub/get", "get"),
            (Method::PUT, "/sub/put", "put"),
            (Method::PATCH, "/sub/patch", "patch"),
            (Method::POST, "/sub/post", "post"),
            (Method::DELETE, "/sub/delete", "delete"),
            (Method::DELETE, "/sub/del", "del"),
            (Method::OPTIONS, "/sub/options", "options"),
            (Method::GET, "/sub/all", "all"),
            (Method::POST, "/sub/all", "all"),
        ] {
            let res = router.dispatch(Request::new(method, path)).await.unwrap();
            assert_eq!(res.body, body, "{} {}", body, path);
        }
    }

    #[tokio::test]
    async fn test_middleware_insertion_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut router = Router::new();
        router.middleware(Tag {
            name: "global",
            log: Arc::clone(&log),
        });
        router
            .namespace_with(
                "/sub",
                MiddlewareManager::new()
                    .with(Tag {
                        name: "mw1",
                        log: Arc::clone(&log),
                    })
                    .with(Tag {
                        name: "mw2",
                        log: Arc::clone(&log),
                    }),
            )
            .unwrap()
            .get("/get", logging("handler", &log))
            .unwrap();

        router
            .dispatch(Request::new(Method::GET, "/sub/get"))
            .await
            .unwrap();
        // router-wide middlewares first, then the namespace list, then the handler
        assert_eq!(*log.lock().unwrap(), vec!["global", "mw1", "mw2", "handler"]);
    }

    #[tokio::test]
    async fn test_cache_reuses_first_middleware_list() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut router = Router::new();
        router
            .namespace_with(
                "/test",
                MiddlewareManager::new().with(Tag {
                    name: "captured",
                    log: Arc::clone(&log),
                }),
            )
            .unwrap();

        // same prefix, no middlewares supplied: the cached list still applies
        router
            .namespace("/test")
            .unwrap()
            .get("/get", logging("handler", &log))
            .unwrap();

        router
            .dispatch(Request::new(Method::GET, "/test/get"))
            .await
            .unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["captured", "handler"]);
    }

    #[tokio::test]
    async fn test_cache_discards_new_middlewares() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut router = Router::new();
        router
            .namespace_with(
                "/test",
                MiddlewareManager::new().with(Tag {
                    name: "first",
                    log: Arc::clone(&log),
                }),
            )
            .unwrap();

        // a second list for the same prefix is dropped, not merged
        router
            .namespace_with(
                "/test",
                MiddlewareManager::new().with(Tag {
                    name: "second",
                    log: Arc::clone(&log),
                }),
            )
            .unwrap()
            .get("/get", logging("handler", &log))
            .unwrap();

        router
            .dispatch(Request::new(Method::GET, "/test/get"))
            .await
            .unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["first", "handler"]);
    }

    #[tokio::test]
    async fn test_distinct_prefixes_are_independent() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut router = Router::new();
        router
            .namespace_with(
                "/a",
                MiddlewareManager::new().with(Tag {
                    name: "a",
                    log: Arc::clone(&log),
                }),
            )
            .unwrap()
            .get("/get", logging("a handler", &log))
            .unwrap();
        router
            .namespace("/b")
            .unwrap()
            .get("/get", logging("b handler", &log))
            .unwrap();

        router
            .dispatch(Request::new(Method::GET, "/b/get"))
            .await
            .unwrap();
        // the /a middleware list never leaks into /b
        assert_eq!(*log.lock().unwrap(), vec!["b handler"]);
    }

    #[test]
    fn test_root_prefix_rejected() {
        let mut router = Router::new();
        let err = router.namespace("/").unwrap_err();
        assert!(err.to_string().contains("namespace / is not supported"));
        // a failed namespace call caches nothing
        assert!(router.namespaces.is_empty());
    }

    #[test]
    fn test_invalid_prefix_rejected() {
        let mut router = Router::new();
        for prefix in ["", "no-slash"] {
            let err = router.namespace(prefix).unwrap_err();
            assert!(err.to_string().contains("only support prefix with string"));
        }
        assert!(router.namespaces.is_empty());
    }

    #[test]
    fn test_regex_prefix_rejected() {
        let mut router = Router::new();
        let err = router.namespace(RoutePattern::regex("^test/.*")).unwrap_err();
        assert!(err.to_string().contains("don't support regex path yet"));
        assert!(router.namespaces.is_empty());
    }

    #[test]
    fn test_regex_path_rejected() {
        let mut router = Router::new();
        let mut sub = router.namespace("/test").unwrap();

        let err = sub
            .get(RoutePattern::regex(r"(\d+)"), text("never"))
            .unwrap_err();
        assert!(err.to_string().contains("only support path with string"));

        // the named call shape is checked too
        let err = sub
            .get(("name", RoutePattern::regex(r"(\d+)")), text("never"))
            .unwrap_err();
        assert!(err.to_string().contains("only support path with string"));
    }

    #[tokio::test]
    async fn test_redirect_by_path() {
        let mut router = Router::new();
        let mut sub = router.namespace("/sub").unwrap();
        sub.get("/get", text("sub get")).unwrap();
        sub.redirect("/go", "/get").unwrap();

        let res = router
            .dispatch(Request::new(Method::GET, "/sub/go"))
            .await
            .unwrap();
        assert_eq!(res.status, 301);
        assert_eq!(res.headers.get("Location").unwrap(), "/sub/get");
    }

    #[tokio::test]
    async fn test_redirect_source_without_slash() {
        let mut router = Router::new();
        let mut sub = router.namespace("/sub").unwrap();
        sub.get("/get", text("sub get")).unwrap();
        sub.redirect("go", "/get").unwrap();

        let res = router
            .dispatch(Request::new(Method::GET, "/sub/go"))
            .await
            .unwrap();
        assert_eq!(res.headers.get("Location").unwrap(), "/sub/get");
    }

    #[tokio::test]
    async fn test_redirect_by_name() {
        let mut router = Router::new();
        let mut sub = router.namespace("/sub").unwrap();
        sub.get(("sub_name", "/name"), text("named")).unwrap();
        sub.redirect("/go_name", "sub_name").unwrap();

        let res = router
            .dispatch(Request::new(Method::GET, "/sub/go_name"))
            .await
            .unwrap();
        assert_eq!(res.status, 301);
        // resolved through the name registry, not re-prefixed
        assert_eq!(res.headers.get("Location").unwrap(), "/sub/name");
    }

    #[tokio::test]
    async fn test_redirect_with_code() {
        let mut router = Router::new();
        let mut sub = router.namespace("/sub").unwrap();
        sub.get("/get", text("sub get")).unwrap();
        sub.redirect_with_code("/tmp", "/get", 302).unwrap();

        let res = router
            .dispatch(Request::new(Method::GET, "/sub/tmp"))
            .await
            .unwrap();
        assert_eq!(res.status, 302);
        assert_eq!(res.headers.get("Location").unwrap(), "/sub/get");
    }

    #[test]
    fn test_named_route_url_generation() {
        let mut router = Router::new();
        router
            .namespace("/name")
            .unwrap()
            .get(("name_get", "/get"), text("named"))
            .unwrap();

        assert_eq!(router.url("name_get"), "/name/get");
        assert_eq!(router.url("unregistered"), "");
    }

    #[tokio::test]
    async fn test_pass_through_is_live() {
        let mut router = Router::new();
        router.get(("top", "/top"), text("top")).unwrap();

        let mut sub = router.namespace("/sub").unwrap();
        // reads resolve against the base router through deref
        assert_eq!(sub.url("top"), "/top");

        // base-router state created after the namespace is visible too
        sub.get(("late", "/late"), text("late")).unwrap();
        assert_eq!(sub.url("late"), "/sub/late");

        let res = sub
            .dispatch(Request::new(Method::GET, "/sub/late"))
            .await
            .unwrap();
        assert_eq!(res.body, "late");
    }

    #[tokio::test]
    async fn test_namespace_resources() {
        let mut router = Router::new();
        let resource = Resource::new().index(text("index")).show(text("show"));
        router
            .namespace("/api")
            .unwrap()
            .resources(("posts", "/posts"), resource)
            .unwrap();

        let res = router
            .dispatch(Request::new(Method::GET, "/api/posts"))
            .await
            .unwrap();
        assert_eq!(res.body, "index");
        let res = router
            .dispatch(Request::new(Method::GET, "/api/posts/3"))
            .await
            .unwrap();
        assert_eq!(res.body, "show");
        assert_eq!(router.url("posts"), "/api/posts");
    }

    #[tokio::test]
    async fn test_chaining_continues_on_base_router() {
        let mut router = Router::new();
        router
            .namespace("/sub")
            .unwrap()
            .get("/get", text("sub get"))
            .unwrap()
            // the return value is the base router, so this one is unprefixed
            .get("/plain", text("plain"))
            .unwrap();

        let res = router
            .dispatch(Request::new(Method::GET, "/plain"))
            .await
            .unwrap();
        assert_eq!(res.body, "plain");
    }
}
