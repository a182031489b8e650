//! Handlers, middleware and the chain that runs them.

mod resolver;

pub use self::resolver::{HandlerRef, MiddlewareRef, Registry, Resolver};

pub(crate) use self::resolver::{resolve_handler, resolve_middleware};

use crate::error::BoxError;
use crate::router::Params;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http::{Request, Response};
use tracing::trace;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub type HandlerFuture<B> = BoxFuture<'static, Result<Response<B>, BoxError>>;

pub trait Handler<B>: Send + Sync {
    fn call(&self, req: Request<B>, params: Params) -> HandlerFuture<B>;
}

impl<B, F, E, Fut> Handler<B> for F
where
    B: Send + 'static,
    F: Fn(Request<B>, Params) -> Fut + Send + Sync,
    E: Into<BoxError>,
    Fut: Future<Output = Result<Response<B>, E>> + Send + 'static,
{
    fn call(&self, req: Request<B>, params: Params) -> HandlerFuture<B> {
        let fut = (self)(req, params);
        Box::pin(async move {
            match fut.await {
                Ok(r) => Ok(r),
                Err(e) => Err(e.into()),
            }
        })
    }
}

/// A link of the chain. It may change the request, call `next`, post-process
/// the response, or answer without calling `next` at all.
pub trait Middleware<B>: Send + Sync {
    fn handle(&self, req: Request<B>, next: Next<B>) -> HandlerFuture<B>;
}

impl<B, F, Fut> Middleware<B> for F
where
    B: Send + 'static,
    F: Fn(Request<B>, Next<B>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response<B>, BoxError>> + Send + 'static,
{
    fn handle(&self, req: Request<B>, next: Next<B>) -> HandlerFuture<B> {
        Box::pin((self)(req, next))
    }
}

type Link<B> = Arc<dyn Fn(Request<B>) -> HandlerFuture<B> + Send + Sync>;

/// The rest of the chain, as seen from one middleware.
pub struct Next<B> {
    inner: Link<B>,
}

impl<B> Clone for Next<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B> Next<B> {
    pub fn run(self, req: Request<B>) -> HandlerFuture<B> {
        (self.inner)(req)
    }
}

/// `mw[0] -> mw[1] -> ... -> mw[n-1] -> handler`
pub struct Pipeline<B> {
    chain: Link<B>,
    params: Params,
    depth: usize,
}

impl<B: Send + 'static> Pipeline<B> {
    pub fn new(
        handler: Arc<dyn Handler<B>>,
        middleware: Vec<Arc<dyn Middleware<B>>>,
        params: Params,
    ) -> Self {
        let depth = middleware.len();
        let terminal_params = params.clone();
        let mut chain: Link<B> = Arc::new(move |req: Request<B>| {
            trace!("middleware chain complete, calling handler");
            handler.call(req, terminal_params.clone())
        });

        for mw in middleware.into_iter().rev() {
            let next = chain;
            chain = Arc::new(move |req: Request<B>| {
                let next = Next {
                    inner: Arc::clone(&next),
                };
                mw.handle(req, next)
            });
        }

        Self {
            chain,
            params,
            depth,
        }
    }

    /// Attaches the params to the request extensions, then runs the chain.
    pub fn run(&self, mut req: Request<B>) -> HandlerFuture<B> {
        trace!(middleware_count = self.depth, "executing middleware chain");
        req.extensions_mut().insert(self.params.clone());
        (self.chain)(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::ParamValue;

    use std::convert::Infallible;
    use std::sync::Mutex;

    type Log = Arc<Mutex<Vec<String>>>;

    fn tracer(log: &Log, tag: &'static str) -> Arc<dyn Middleware<String>> {
        let log = log.clone();
        Arc::new(move |req: Request<String>, next: Next<String>| {
            let log = log.clone();
            async move {
                log.lock().unwrap().push(format!("{}-before", tag));
                let res = next.run(req).await;
                log.lock().unwrap().push(format!("{}-after", tag));
                res
            }
        })
    }

    #[tokio::test]
    async fn onion_order() {
        let log: Log = Arc::default();
        let handler_log = log.clone();
        let handler: Arc<dyn Handler<String>> =
            Arc::new(move |_req: Request<String>, _params: Params| {
                handler_log.lock().unwrap().push("H".to_owned());
                async { Ok::<_, Infallible>(Response::new("ok".to_owned())) }
            });

        let pipeline = Pipeline::new(
            handler,
            vec![tracer(&log, "A"), tracer(&log, "B")],
            Params::new(),
        );
        let res = pipeline.run(Request::new(String::new())).await.unwrap();
        assert_eq!(res.body(), "ok");
        assert_eq!(
            *log.lock().unwrap(),
            ["A-before", "B-before", "H", "B-after", "A-after"]
        );
    }

    #[tokio::test]
    async fn short_circuit() {
        let handler: Arc<dyn Handler<String>> =
            Arc::new(|_req: Request<String>, _params: Params| async {
                Ok::<_, Infallible>(Response::new("handler".to_owned()))
            });
        let deny: Arc<dyn Middleware<String>> =
            Arc::new(|_req: Request<String>, _next: Next<String>| async {
                let mut res = Response::new("denied".to_owned());
                *res.status_mut() = http::StatusCode::FORBIDDEN;
                Ok::<_, BoxError>(res)
            });

        let res = Pipeline::new(handler, vec![deny], Params::new())
            .run(Request::new(String::new()))
            .await
            .unwrap();
        assert_eq!(res.status(), http::StatusCode::FORBIDDEN);
        assert_eq!(res.body(), "denied");
    }

    #[tokio::test]
    async fn params_visible_to_middleware_and_handler() {
        let mut params = Params::new();
        params.insert("id", ParamValue::Int(42));

        let handler: Arc<dyn Handler<String>> =
            Arc::new(|req: Request<String>, params: Params| async move {
                let seen = req.extensions().get::<String>().cloned().unwrap_or_default();
                let id = params.int("id").unwrap_or_default();
                Ok::<_, Infallible>(Response::new(format!("{}:{}", seen, id)))
            });
        let observe: Arc<dyn Middleware<String>> =
            Arc::new(|mut req: Request<String>, next: Next<String>| async move {
                let id = req.extensions().get::<Params>().and_then(|p| p.int("id"));
                req.extensions_mut().insert(format!("mw saw {:?}", id));
                next.run(req).await
            });

        let res = Pipeline::new(handler, vec![observe], params)
            .run(Request::new(String::new()))
            .await
            .unwrap();
        assert_eq!(res.body(), "mw saw Some(42):42");
    }
}
