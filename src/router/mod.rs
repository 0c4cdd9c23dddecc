use crate::error::{RouterError, RouterResult};
use crate::handler::{Handler, HttpResponse, IntoResponse};
use crate::http::{Method, Request, Response};
use crate::middleware::{Middleware, MiddlewareManager, Next};
use std::collections::HashMap;
use std::fmt;

mod namespace;
mod resource;

pub use namespace::Namespace;
pub use resource::Resource;

/// Methods a route registration fans out to for `all()`.
const ROUTABLE_METHODS: [Method; 7] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::HEAD,
    Method::OPTIONS,
];

/// A path value supplied at registration time. The matcher only understands
/// literal paths; regex patterns are representable so the routing layer can
/// reject them with a precise error instead of silently misrouting.
#[derive(Debug, Clone)]
pub enum RoutePattern {
    Literal(String),
    Regex(String),
}

impl RoutePattern {
    pub fn regex(source: impl Into<String>) -> RoutePattern {
        RoutePattern::Regex(source.into())
    }
}

impl From<&str> for RoutePattern {
    fn from(path: &str) -> RoutePattern {
        RoutePattern::Literal(path.to_string())
    }
}

impl From<String> for RoutePattern {
    fn from(path: String) -> RoutePattern {
        RoutePattern::Literal(path)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutePattern::Literal(path) => f.write_str(path),
            RoutePattern::Regex(source) => write!(f, "/{}/", source),
        }
    }
}

/// The two call shapes a registration method accepts: a bare path, or a
/// `(name, path)` pair for a named route usable with [`Router::url`].
#[derive(Debug, Clone)]
pub enum RouteSpec {
    Unnamed(RoutePattern),
    Named { name: String, path: RoutePattern },
}

impl RouteSpec {
    fn pattern(&self) -> &RoutePattern {
        match self {
            RouteSpec::Unnamed(path) => path,
            RouteSpec::Named { path, .. } => path,
        }
    }
}

impl From<&str> for RouteSpec {
    fn from(path: &str) -> RouteSpec {
        RouteSpec::Unnamed(path.into())
    }
}

impl From<String> for RouteSpec {
    fn from(path: String) -> RouteSpec {
        RouteSpec::Unnamed(path.into())
    }
}

impl From<RoutePattern> for RouteSpec {
    fn from(path: RoutePattern) -> RouteSpec {
        RouteSpec::Unnamed(path)
    }
}

impl From<(&str, &str)> for RouteSpec {
    fn from((name, path): (&str, &str)) -> RouteSpec {
        RouteSpec::Named {
            name: name.to_string(),
            path: path.into(),
        }
    }
}

impl From<(&str, RoutePattern)> for RouteSpec {
    fn from((name, path): (&str, RoutePattern)) -> RouteSpec {
        RouteSpec::Named {
            name: name.to_string(),
            path,
        }
    }
}

#[derive(Clone)]
pub(crate) struct Route {
    pub(crate) middlewares: MiddlewareManager,
    pub(crate) handler: Box<dyn Handler>,
}

impl Route {
    pub async fn handle(&self, req: Request) -> HttpResponse {
        self.middlewares
            .call(req, Next::new_handler(self.handler.clone()))
            .await
    }
}

/// The base router: registration tables, a name registry for URL generation,
/// and an async dispatcher. Sub-router state for [`Router::namespace`] lives
/// here too, keyed by prefix.
#[derive(Clone)]
pub struct Router {
    pub(crate) middlewares: MiddlewareManager,
    pub(crate) routes: HashMap<String, HashMap<Method, Route>>,
    pub(crate) dynamic_routes: Vec<String>,
    pub(crate) names: HashMap<String, String>,
    pub(crate) namespaces: HashMap<String, MiddlewareManager>,
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes.keys().collect::<Vec<_>>())
            .field("dynamic_routes", &self.dynamic_routes)
            .field("names", &self.names)
            .field("namespaces", &self.namespaces.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Router {
    pub fn new() -> Self {
        Self {
            middlewares: MiddlewareManager::new(),
            routes: HashMap::new(),
            dynamic_routes: Vec::new(),
            names: HashMap::new(),
            namespaces: HashMap::new(),
        }
    }

    pub fn get<S, F, R>(&mut self, spec: S, handler: F) -> RouterResult<&mut Self>
    where
        S: Into<RouteSpec>,
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.add(Method::GET, spec.into(), handler)
    }

    pub fn post<S, F, R>(&mut self, spec: S, handler: F) -> RouterResult<&mut Self>
    where
        S: Into<RouteSpec>,
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.add(Method::POST, spec.into(), handler)
    }

    pub fn put<S, F, R>(&mut self, spec: S, handler: F) -> RouterResult<&mut Self>
    where
        S: Into<RouteSpec>,
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.add(Method::PUT, spec.into(), handler)
    }

    pub fn patch<S, F, R>(&mut self, spec: S, handler: F) -> RouterResult<&mut Self>
    where
        S: Into<RouteSpec>,
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.add(Method::PATCH, spec.into(), handler)
    }

    pub fn delete<S, F, R>(&mut self, spec: S, handler: F) -> RouterResult<&mut Self>
    where
        S: Into<RouteSpec>,
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.add(Method::DELETE, spec.into(), handler)
    }

    /// Alias of [`Router::delete`].
    pub fn del<S, F, R>(&mut self, spec: S, handler: F) -> RouterResult<&mut Self>
    where
        S: Into<RouteSpec>,
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.delete(spec, handler)
    }

    pub fn head<S, F, R>(&mut self, spec: S, handler: F) -> RouterResult<&mut Self>
    where
        S: Into<RouteSpec>,
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.add(Method::HEAD, spec.into(), handler)
    }

    pub fn options<S, F, R>(&mut self, spec: S, handler: F) -> RouterResult<&mut Self>
    where
        S: Into<RouteSpec>,
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.add(Method::OPTIONS, spec.into(), handler)
    }

    /// Registers `handler` for every routable method on one path.
    pub fn all<S, F, R>(&mut self, spec: S, handler: F) -> RouterResult<&mut Self>
    where
        S: Into<RouteSpec>,
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        let spec = spec.into();
        self.register_all(&spec, &MiddlewareManager::new(), Box::new(handler))?;
        Ok(self)
    }

    /// Expands a RESTful [`Resource`] action set into routes under one path.
    pub fn resources<S: Into<RouteSpec>>(
        &mut self,
        spec: S,
        resource: Resource,
    ) -> RouterResult<&mut Self> {
        let spec = spec.into();
        self.register_resources(&spec, &MiddlewareManager::new(), resource)?;
        Ok(self)
    }

    /// Registers a route at `source` answering with a `301` redirect.
    ///
    /// A `destination` without a leading `/` is a route name, resolved through
    /// [`Router::url`] at registration time.
    pub fn redirect(&mut self, source: &str, destination: &str) -> RouterResult<&mut Self> {
        self.redirect_with_code(source, destination, 301)
    }

    pub fn redirect_with_code(
        &mut self,
        source: &str,
        destination: &str,
        code: u16,
    ) -> RouterResult<&mut Self> {
        let target = if destination.starts_with('/') {
            destination.to_string()
        } else {
            self.url(destination)
        };
        self.all(source, move |_req: Request| {
            let target = target.clone();
            async move { Ok(Response::redirect_status(code, &target)) }
        })
    }

    /// Returns the registered path for a route name, or an empty string for
    /// an unknown name.
    pub fn url(&self, name: &str) -> String {
        self.names.get(name).cloned().unwrap_or_default()
    }

    pub fn middleware(&mut self, middleware: impl Middleware + 'static) {
        self.middlewares.add(middleware);
    }

    fn add<F, R>(&mut self, method: Method, spec: RouteSpec, handler: F) -> RouterResult<&mut Self>
    where
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.register(method, &spec, &MiddlewareManager::new(), Box::new(handler))?;
        Ok(self)
    }

    /// Single registration point. `extra` carries namespace middlewares and
    /// is spliced between the router-wide middlewares and the handler.
    pub(crate) fn register(
        &mut self,
        method: Method,
        spec: &RouteSpec,
        extra: &MiddlewareManager,
        handler: Box<dyn Handler>,
    ) -> RouterResult<()> {
        let path = match spec.pattern() {
            RoutePattern::Literal(path) => normalize_path(path),
            RoutePattern::Regex(_) => {
                return Err(RouterError::RegexPath(spec.pattern().to_string()))
            }
        };
        if let RouteSpec::Named { name, .. } = spec {
            self.names.insert(name.clone(), path.clone());
        }
        if path.contains(':') && !self.dynamic_routes.contains(&path) {
            self.dynamic_routes.push(path.clone());
        }
        let mut middlewares = self.middlewares.clone();
        middlewares.append(extra.clone());
        self.routes
            .entry(path)
            .or_default()
            .insert(method, Route {
                middlewares,
                handler,
            });
        Ok(())
    }

    pub(crate) fn register_all(
        &mut self,
        spec: &RouteSpec,
        extra: &MiddlewareManager,
        handler: Box<dyn Handler>,
    ) -> RouterResult<()> {
        for method in ROUTABLE_METHODS {
            self.register(method, spec, extra, handler.clone())?;
        }
        Ok(())
    }

    pub(crate) fn register_resources(
        &mut self,
        spec: &RouteSpec,
        extra: &MiddlewareManager,
        resource: Resource,
    ) -> RouterResult<()> {
        let base = match spec.pattern() {
            RoutePattern::Literal(path) => normalize_path(path),
            RoutePattern::Regex(_) => {
                return Err(RouterError::RegexPath(spec.pattern().to_string()))
            }
        };
        // a named spec names the collection (index) route
        if let RouteSpec::Named { name, .. } = spec {
            self.names.insert(name.clone(), base.clone());
        }
        let mut entry = |method: Method, path: String, handler: Option<Box<dyn Handler>>| {
            match handler {
                Some(handler) => {
                    self.register(method, &RouteSpec::Unnamed(path.into()), extra, handler)
                }
                None => Ok(()),
            }
        };
        entry(Method::GET, base.clone(), resource.index)?;
        entry(Method::GET, format!("{}/new", base), resource.new_form)?;
        entry(Method::POST, base.clone(), resource.create)?;
        entry(Method::GET, format!("{}/:id", base), resource.show)?;
        entry(Method::GET, format!("{}/:id/edit", base), resource.edit)?;
        entry(Method::PUT, format!("{}/:id", base), resource.update)?;
        entry(Method::DELETE, format!("{}/:id", base), resource.destroy)?;
        Ok(())
    }

    /// Looks up a route for the request and runs it through its middleware
    /// chain. HEAD and OPTIONS fall back to a registered GET route when no
    /// explicit route exists for them.
    pub async fn dispatch(&self, mut req: Request) -> HttpResponse {
        let path = req.path.clone();
        let method = req.method;
        if let Some(routes) = self.routes.get(&path) {
            if let Some(route) = routes.get(&method) {
                return route.handle(req).await;
            }
            if method == Method::HEAD {
                if let Some(route) = routes.get(&Method::GET) {
                    return Self::handle_head(route.clone(), req).await;
                }
            }
            if method == Method::OPTIONS {
                if let Some(route) = routes.get(&Method::GET) {
                    return Self::handle_options(route.clone(), req).await;
                }
            }
        }

        for dynamic_path in &self.dynamic_routes {
            if let Some(params) = Self::match_dynamic_path(dynamic_path, &path) {
                if let Some(routes) = self.routes.get(dynamic_path) {
                    if let Some(route) = routes.get(&method) {
                        req.params = params;
                        return route.handle(req).await;
                    }
                    if method == Method::HEAD {
                        if let Some(route) = routes.get(&Method::GET) {
                            req.params = params;
                            return Self::handle_head(route.clone(), req).await;
                        }
                    }
                    if method == Method::OPTIONS {
                        if let Some(route) = routes.get(&Method::GET) {
                            req.params = params;
                            return Self::handle_options(route.clone(), req).await;
                        }
                    }
                }
            }
        }

        Err(crate::error::ServerError::NotFound)
    }

    async fn handle_head(route: Route, req: Request) -> HttpResponse {
        let mut req = req;
        req.method = Method::GET;
        let mut response = route.handle(req).await?;
        response.body = String::new();
        Ok(response)
    }

    async fn handle_options(route: Route, req: Request) -> HttpResponse {
        let route = Route {
            middlewares: route.middlewares.clone(),
            handler: Box::new(|_| async { Ok(Response::new(200)) }),
        };
        route.handle(req).await
    }

    fn match_dynamic_path(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
        let pattern_parts: Vec<&str> = pattern.split('/').collect();
        let path_parts: Vec<&str> = path.split('/').collect();

        if pattern_parts.len() != path_parts.len() {
            return None;
        }

        let mut params = HashMap::new();

        for (pattern_part, path_part) in pattern_parts.iter().zip(path_parts.iter()) {
            if let Some(name) = pattern_part.strip_prefix(':') {
                params.insert(name.to_string(), path_part.to_string());
            } else if pattern_part != path_part {
                return None;
            }
        }

        Some(params)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_path(path: &str) -> String {
    let path = path.trim_end_matches('/');
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}
