use crate::http_router::HttpRouter;
use crate::pipeline::BoxFuture;

use std::convert::Infallible;
use std::future::{ready, Ready};
use std::sync::Arc;
use std::task::{Context, Poll};

use hyper::service::Service;
use hyper::Body;

type Request = hyper::Request<Body>;
type Response = hyper::Response<Body>;

/// Per-connection hyper service over a shared [`HttpRouter`].
#[derive(Clone)]
pub struct RouterService {
    router: Arc<HttpRouter<Body>>,
}

impl RouterService {
    pub fn new(router: HttpRouter<Body>) -> Self {
        Self::from_shared(Arc::new(router))
    }

    pub fn from_shared(router: Arc<HttpRouter<Body>>) -> Self {
        Self { router }
    }

    pub fn router(&self) -> &HttpRouter<Body> {
        &self.router
    }

    /// For `hyper::Server::serve`.
    pub fn into_make_service(self) -> MakeRouterService {
        MakeRouterService { inner: self }
    }
}

impl Service<Request> for RouterService {
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let router = Arc::clone(&self.router);
        Box::pin(async move { Ok(router.handle(req).await) })
    }
}

/// Hands every new connection a clone of the same [`RouterService`].
#[derive(Clone)]
pub struct MakeRouterService {
    inner: RouterService,
}

impl<T> Service<T> for MakeRouterService {
    type Response = RouterService;
    type Error = Infallible;
    type Future = Ready<Result<RouterService, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _target: T) -> Self::Future {
        ready(Ok(self.inner.clone()))
    }
}
