#![forbid(unsafe_code)]

mod builder;
mod formatter;
mod observer;

pub use self::builder::HttpRouterBuilder;
pub use self::formatter::{ErrorFormatter, JsonFormatter, PlainTextFormatter};
pub use self::observer::{DispatchObserver, Outcome};

use crate::config::RouterConfig;
use crate::error::{join_methods, RouterError};
use crate::pipeline::{resolve_handler, resolve_middleware, Pipeline, Resolver};
use crate::router::{cast_params, Dispatch, NamedRoutes, Params, PatternCompiler, Route, RouteTable};

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures_util::FutureExt;
use http::header::{self, HeaderValue};
use http::{Method, Request, Response};
use tracing::{debug, warn};

/// A route that matched, with its parameters already cast.
#[derive(Debug)]
pub struct Matched<'a, B> {
    pub route: &'a Route<B>,
    pub params: Params,
}

/// Compiled routes plus everything needed to answer a request.
///
/// Read-only after construction; share it behind an `Arc`.
pub struct HttpRouter<B> {
    table: RouteTable<B>,
    names: NamedRoutes,
    compiler: PatternCompiler,
    resolver: Arc<dyn Resolver<B>>,
    formatter: Arc<dyn ErrorFormatter<B>>,
    observers: Vec<Arc<dyn DispatchObserver>>,
    debug: bool,
}

impl<B> HttpRouter<B> {
    pub fn builder(config: RouterConfig) -> HttpRouterBuilder<B> {
        HttpRouterBuilder::new(config)
    }

    pub fn table(&self) -> &RouteTable<B> {
        &self.table
    }

    pub fn names(&self) -> &NamedRoutes {
        &self.names
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Normalizes `path`, matches it and casts the captures.
    pub fn dispatch(&self, method: &Method, path: &str) -> Result<Matched<'_, B>, RouterError> {
        let path = self.compiler.normalize_path(path);
        let dispatched = self.table.dispatch(method, &path);
        match dispatched {
            Dispatch::Found {
                route,
                captures,
                casts,
            } => {
                let params = cast_params(&captures, casts)?;
                Ok(Matched { route, params })
            }
            Dispatch::MethodNotAllowed(allowed) => Err(RouterError::MethodNotAllowed { allowed }),
            Dispatch::NotFound => Err(RouterError::NotFound {
                path: path.to_string(),
            }),
        }
    }

    /// Turns an error into a response through the configured formatter.
    pub fn error_response(&self, error: &RouterError) -> Response<B> {
        let mut res = self.formatter.format(error, self.debug);
        if let RouterError::MethodNotAllowed { allowed } = error {
            if let Ok(value) = HeaderValue::from_str(&join_methods(allowed)) {
                res.headers_mut().entry(header::ALLOW).or_insert(value);
            }
        }
        res
    }
}

impl<B: Send + 'static> HttpRouter<B> {
    /// Dispatches `req` and runs the matched route's pipeline.
    ///
    /// Every failure ends up as a response; nothing here returns an error.
    pub async fn handle(&self, req: Request<B>) -> Response<B> {
        let started = Instant::now();
        let method = req.method().clone();
        let path = req.uri().path().to_owned();

        let (pattern, result) = match self.dispatch(&method, &path) {
            Ok(matched) => {
                let pattern = matched.route.pattern().to_owned();
                (Some(pattern), self.run(matched, req).await)
            }
            Err(e) => (None, Err(e)),
        };

        let res = match result {
            Ok(res) => res,
            Err(e) => {
                if e.is_client_error() {
                    debug!(%method, %path, error = %e, "request rejected");
                } else {
                    warn!(%method, %path, error = %e, "request failed");
                }
                self.error_response(&e)
            }
        };

        if !self.observers.is_empty() {
            let outcome = Outcome {
                method,
                path,
                pattern,
                status: res.status(),
                elapsed: started.elapsed(),
            };
            observer::notify(&self.observers, &outcome);
        }

        res
    }

    /// A panic anywhere in resolution or the chain becomes a `Handler` error.
    async fn run(&self, matched: Matched<'_, B>, req: Request<B>) -> Result<Response<B>, RouterError> {
        let Matched { route, params } = matched;
        let chain = async move {
            let handler = resolve_handler(&*self.resolver, route.handler())?;
            let middleware = resolve_middleware(&*self.resolver, route.middleware())?;
            let pipeline = Pipeline::new(handler, middleware, params);
            pipeline.run(req).await.map_err(RouterError::Handler)
        };
        match AssertUnwindSafe(chain).catch_unwind().await {
            Ok(ret) => ret,
            Err(payload) => Err(RouterError::Handler(panic_message(&*payload).into())),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string payload"
    };
    format!("panicked: {}", detail)
}
