//! Application is the main entry point for building services on nsroute.
//!
//! It owns the base [`Router`], shared plugin state injected into every
//! request, and the error-to-response mapping applied around dispatch.

use crate::error::{RouterResult, ServerError};
use crate::handler::IntoResponse;
use crate::http::{Request, Response};
use crate::middleware::{Middleware, MiddlewareManager};
use crate::plugins::Plugins;
use crate::router::{Namespace, Resource, RouteSpec, Router};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

type ErrorHandler = Arc<dyn Fn(ServerError) -> Response + Send + Sync>;

#[derive(Clone)]
pub struct Application {
    router: Router,
    plugins: Plugins,
    on_error: Option<ErrorHandler>,
}

impl Application {
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            plugins: Plugins::new(),
            on_error: None,
        }
    }

    /// Registers shared state retrievable from any request via
    /// `req.plugins.get::<T>()`.
    pub fn plugins<T>(&mut self, plugin: T) -> &mut Self
    where
        T: Send + Sync + 'static,
    {
        self.plugins.insert(plugin);
        self
    }

    pub fn on_error<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(ServerError) -> Response + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(handler));
        self
    }

    pub fn router(&mut self) -> &mut Router {
        &mut self.router
    }

    /// Sub-router entry point, see [`Router::namespace`].
    pub fn namespace<P>(&mut self, prefix: P) -> RouterResult<Namespace<'_>>
    where
        P: Into<crate::router::RoutePattern>,
    {
        self.router.namespace(prefix)
    }

    pub fn namespace_with<P>(
        &mut self,
        prefix: P,
        middlewares: MiddlewareManager,
    ) -> RouterResult<Namespace<'_>>
    where
        P: Into<crate::router::RoutePattern>,
    {
        self.router.namespace_with(prefix, middlewares)
    }

    pub fn get<S, F, R>(&mut self, spec: S, handler: F) -> RouterResult<()>
    where
        S: Into<RouteSpec>,
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.router.get(spec, handler)?;
        Ok(())
    }

    pub fn post<S, F, R>(&mut self, spec: S, handler: F) -> RouterResult<()>
    where
        S: Into<RouteSpec>,
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.router.post(spec, handler)?;
        Ok(())
    }

    pub fn put<S, F, R>(&mut self, spec: S, handler: F) -> RouterResult<()>
    where
        S: Into<RouteSpec>,
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.router.put(spec, handler)?;
        Ok(())
    }

    pub fn patch<S, F, R>(&mut self, spec: S, handler: F) -> RouterResult<()>
    where
        S: Into<RouteSpec>,
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.router.patch(spec, handler)?;
        Ok(())
    }

    pub fn delete<S, F, R>(&mut self, spec: S, handler: F) -> RouterResult<()>
    where
        S: Into<RouteSpec>,
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.router.delete(spec, handler)?;
        Ok(())
    }

    pub fn all<S, F, R>(&mut self, spec: S, handler: F) -> RouterResult<()>
    where
        S: Into<RouteSpec>,
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.router.all(spec, handler)?;
        Ok(())
    }

    pub fn resources<S: Into<RouteSpec>>(
        &mut self,
        spec: S,
        resource: Resource,
    ) -> RouterResult<()> {
        self.router.resources(spec, resource)?;
        Ok(())
    }

    pub fn redirect(&mut self, source: &str, destination: &str) -> RouterResult<()> {
        self.router.redirect(source, destination)?;
        Ok(())
    }

    pub fn middleware(&mut self, middleware: impl Middleware + 'static) {
        self.router.middleware(middleware);
    }

    /// Dispatches a request and maps any error to a response, catching
    /// handler panics along the way.
    pub async fn handle(&self, mut req: Request) -> Response {
        req.plugins = self.plugins.clone();
        let response = AssertUnwindSafe(self.router.dispatch(req))
            .catch_unwind()
            .await;
        let response = match response {
            Ok(response) => response,
            Err(err) => {
                let panic_msg = if let Some(msg) = err.downcast_ref::<&str>() {
                    msg.to_string()
                } else if let Some(msg) = err.downcast_ref::<String>() {
                    msg.clone()
                } else {
                    "Unknown panic".to_string()
                };
                Err(ServerError::PanicError(panic_msg))
            }
        };
        match response {
            Ok(response) => response,
            Err(err) => self.handle_error(err),
        }
    }

    fn handle_error(&self, error: ServerError) -> Response {
        if let Some(handler) = &self.on_error {
            handler(error)
        } else {
            Response::error(error)
        }
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}
