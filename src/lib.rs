//! # nsroute
//!
//! Namespaced sub-routers with prefixing and middleware injection for Rust
//! web services.
//!
//! A namespace is a scoped view of a router bound to one path prefix and one
//! middleware list. Routes registered through it are automatically prefixed
//! and wrapped, while named-route URL generation and redirect helpers stay
//! consistent with the prefix.
//!
//! ## Quick start
//!
//! ```rust
//! use nsroute::{Response, Router};
//!
//! let mut router = Router::new();
//!
//! let mut api = router.namespace("/api").unwrap();
//! api.get("/status", |_req| async {
//!     Ok(Response::text("operational"))
//! }).unwrap();
//! // registered as GET /api/status
//! ```
//!
//! ## Namespace middlewares
//!
//! ```rust
//! use nsroute::{MiddlewareManager, Router};
//!
//! # fn demo(auth: impl nsroute::middleware::Middleware + Clone) {
//! let mut router = Router::new();
//! let _admin = router
//!     .namespace_with("/admin", MiddlewareManager::new().with(auth))
//!     .unwrap();
//! # }
//! ```
//!
//! Sub-routers are cached per prefix for the lifetime of the router; the
//! middleware list captured by the first call for a prefix wins.

pub mod app;
pub mod error;
pub mod handler;
pub mod http;
pub mod middleware;
pub mod plugins;
pub mod router;

pub use app::Application;
pub use error::{RouterError, RouterResult, ServerError, ServerResult};
pub use http::{Body, Method, Request, Response};
pub use middleware::{Middleware, MiddlewareManager, Next};
pub use router::{Namespace, Resource, RoutePattern, RouteSpec, Router};

pub extern crate serde_json;

// Reexport serde_json
pub use serde_json::{json, Value};
