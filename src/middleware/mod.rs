use crate::http::Request;

use crate::handler::{Handler, HttpResponse, IntoResponse};
use futures::future::BoxFuture;

/// The continuation handed to a middleware: calling `handle` runs the rest of
/// the chain and finally the route handler.
#[derive(Clone)]
pub struct Next {
    handler: Box<dyn Handler>,
}

impl Next {
    pub fn new<F, R>(handler: F) -> Self
    where
        F: Fn(Request) -> R + Send + Sync + Clone + 'static,
        R: IntoResponse,
    {
        Self {
            handler: Box::new(handler),
        }
    }

    pub(crate) fn new_handler(handler: Box<dyn Handler>) -> Self {
        Self { handler }
    }

    pub async fn handle(&self, req: Request) -> HttpResponse {
        self.handler.handle(req).await
    }
}

pub type MiddlewareResult = BoxFuture<'static, HttpResponse>;

pub trait Middleware: Send + Sync + 'static {
    fn call(&self, req: Request, next: Next) -> MiddlewareResult;
    fn clone_box(&self) -> Box<dyn Middleware>;
}

impl Clone for Box<dyn Middleware> {
    fn clone(&self) -> Box<dyn Middleware> {
        self.clone_box()
    }
}

/// Closures of shape `Fn(Request, Next) -> MiddlewareResult` are middlewares,
/// so short middleware lists can be written inline without a struct.
impl<F> Middleware for F
where
    F: Fn(Request, Next) -> MiddlewareResult + Send + Sync + Clone + 'static,
{
    fn call(&self, req: Request, next: Next) -> MiddlewareResult {
        (self)(req, next)
    }

    fn clone_box(&self) -> Box<dyn Middleware> {
        Box::new(self.clone())
    }
}

/// An ordered middleware list. Execution is onion-style: the first middleware
/// added is the outermost wrapper around the route handler.
#[derive(Clone, Default)]
pub struct MiddlewareManager {
    pub(crate) middlewares: Vec<Box<dyn Middleware>>,
}

impl MiddlewareManager {
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
        }
    }

    pub fn add<M: Middleware + 'static>(&mut self, middleware: M) {
        self.middlewares.push(Box::new(middleware));
    }

    /// Builder-style `add`, for assembling a namespace middleware list inline.
    pub fn with<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.add(middleware);
        self
    }

    pub fn append(&mut self, mut other: MiddlewareManager) -> &Self {
        self.middlewares.append(&mut other.middlewares);
        self
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    pub async fn call(&self, req: Request, next: Next) -> HttpResponse {
        let mut next = next;
        let mut index = self.middlewares.len();
        while index > 0 {
            index -= 1;
            let middleware = self.middlewares[index].clone();
            next = Next::new_handler(Box::new(move |req| middleware.call(req, next.clone())));
        }
        next.handle(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Method, Response};
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

    #[tokio::test]
    async fn test_onion_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut manager = MiddlewareManager::new();
        manager.add(Tag {
            name: "first",
            log: Arc::clone(&log),
        });
        manager.add(Tag {
            name: "second",
            log: Arc::clone(&log),
        });

        let inner_log = Arc::clone(&log);
        let next = Next::new(move |_req| {
            let log = Arc::clone(&inner_log);
            async move {
                log.lock().unwrap().push("handler");
                Ok(Response::no_content())
            }
        });

        let res = manager
            .call(Request::new(Method::GET, "/"), next)
            .await
            .unwrap();
        assert_eq!(res.status, 204);
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "handler"]);
    }

    #[tokio::test]
    async fn test_closure_middleware() {
        let called = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&called);
        let mut manager = MiddlewareManager::new();
        manager.add(move |req: Request, next: Next| -> MiddlewareResult {
            let flag = Arc::clone(&flag);
            Box::pin(async move {
                *flag.lock().unwrap() = true;
                next.handle(req).await
            })
        });

        let next = Next::new(|_req| async { Ok(Response::text("done")) });
        let res = manager
            .call(Request::new(Method::GET, "/"), next)
            .await
            .unwrap();
        assert_eq!(res.body, "done");
        assert!(*called.lock().unwrap());
    }
}
