//! HTTP routing with typed path parameters, middleware pipelines and a
//! signed on-disk cache of the compiled route table.
//!
//! ```ignore
//! use cinder_router::{routes, HandlerRef, HttpRouter, RouterConfig};
//!
//! let router = HttpRouter::builder(RouterConfig::default())
//!     .resolver(registry)
//!     .build(routes! {
//!         GET "/users/{id:int}" => HandlerRef::action("Users", "show"),
//!         @ "/admin" => routes! {
//!             DELETE "/users/{id:int}" => HandlerRef::action("Users", "destroy")
//!         }
//!     })?;
//!
//! let response = router.handle(request).await;
//! ```

#![deny(unsafe_code)]

mod config;
mod error;

pub mod cache;
pub mod http_router;
pub mod pipeline;
pub mod router;

#[cfg(feature = "hyper-service")]
pub mod hyper_service;

pub use http::Method;

pub use crate::cache::{RouteCache, Signer, SIGNATURE_HEADER};
pub use crate::config::{CacheConfig, RouterConfig, TrailingSlash};
pub use crate::error::{BoxError, RouterError};
pub use crate::http_router::{
    DispatchObserver, ErrorFormatter, HttpRouter, HttpRouterBuilder, JsonFormatter, Matched,
    Outcome, PlainTextFormatter,
};
pub use crate::pipeline::{
    Handler, HandlerRef, Middleware, MiddlewareRef, Next, Pipeline, Registry, Resolver,
};
pub use crate::router::{
    Captures, Dispatch, NamedRoutes, ParamValue, Params, Route, RouteCollector, RouteHandle,
    RouteTable,
};

#[cfg(feature = "hyper-service")]
pub use crate::hyper_service::{MakeRouterService, RouterService};
