use crate::handler::{Handler, IntoResponse};
use crate::http::Request;

/// A RESTful action set for [`Router::resources`](super::Router::resources).
///
/// Only supplied actions are routed:
///
/// | action  | method | path           |
/// |---------|--------|----------------|
/// | index   | GET    | `p`            |
/// | new     | GET    | `p/new`        |
/// | create  | POST   | `p`            |
/// | show    | GET    | `p/:id`        |
/// | edit    | GET    | `p/:id/edit`   |
/// | update  | PUT    | `p/:id`        |
/// | destroy | DELETE | `p/:id`        |
#[derive(Clone, Default)]
pub struct Resource {
    pub(crate) index: Option<Box<dyn Handler>>,
    pub(crate) new_form: Option<Box<dyn Handler>>,
    pub(crate) create: Option<Box<dyn Handler>>,
    pub(crate) show: Option<Box<dyn Handler>>,
    pub(crate) edit: Option<Box<dyn Handler>>,
    pub(crate) update: Option<Box<dyn Handler>>,
    pub(crate) destroy: Option<Box<dyn Handler>>,
}

impl Resource {
    pub fn new() -> Resource {
        Resource::default()
    }

    pub fn index<F, R>(mut self, handler: F) -> Resource
    where
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.index = Some(Box::new(handler));
        self
    }

    /// The `new` form action (`GET p/new`).
    pub fn new_form<F, R>(mut self, handler: F) -> Resource
    where
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.new_form = Some(Box::new(handler));
        self
    }

    pub fn create<F, R>(mut self, handler: F) -> Resource
    where
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.create = Some(Box::new(handler));
        self
    }

    pub fn show<F, R>(mut self, handler: F) -> Resource
    where
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.show = Some(Box::new(handler));
        self
    }

    pub fn edit<F, R>(mut self, handler: F) -> Resource
    where
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.edit = Some(Box::new(handler));
        self
    }

    pub fn update<F, R>(mut self, handler: F) -> Resource
    where
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.update = Some(Box::new(handler));
        self
    }

    pub fn destroy<F, R>(mut self, handler: F) -> Resource
    where
        F: Fn(Request) -> R + Send + Clone + Sync + 'static,
        R: IntoResponse + 'static,
    {
        self.destroy = Some(Box::new(handler));
        self
    }
}
