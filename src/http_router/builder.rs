use super::{DispatchObserver, ErrorFormatter, HttpRouter, PlainTextFormatter};
use crate::cache::RouteCache;
use crate::config::RouterConfig;
use crate::error::RouterError;
use crate::pipeline::{Registry, Resolver};
use crate::router::{PatternCompiler, RouteCollector};

use std::sync::Arc;

use tracing::{debug, warn};

pub struct HttpRouterBuilder<B> {
    config: RouterConfig,
    resolver: Option<Arc<dyn Resolver<B>>>,
    formatter: Option<Arc<dyn ErrorFormatter<B>>>,
    observers: Vec<Arc<dyn DispatchObserver>>,
}

impl<B> HttpRouterBuilder<B> {
    pub fn new(config: RouterConfig) -> Self {
        Self {
            config,
            resolver: None,
            formatter: None,
            observers: Vec::new(),
        }
    }

    /// Resolves `Action`/`Service` handlers and named middleware.
    /// Defaults to an empty [`Registry`].
    pub fn resolver(mut self, resolver: impl Resolver<B> + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    pub fn shared_resolver(mut self, resolver: Arc<dyn Resolver<B>>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Renders error responses. Defaults to [`PlainTextFormatter`].
    pub fn formatter(mut self, formatter: impl ErrorFormatter<B> + 'static) -> Self {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    pub fn observer(mut self, observer: impl DispatchObserver + 'static) -> Self {
        self.observers.push(Arc::new(observer));
        self
    }
}

impl<B> HttpRouterBuilder<B>
where
    B: From<String> + 'static,
{
    /// Loads the route table from the cache when possible, otherwise runs
    /// `register`, compiles the routes and tries to cache the result.
    ///
    /// A rejected cache signature is not an error here: it is logged and the
    /// table is rebuilt from `register`.
    pub fn build<F>(self, register: F) -> Result<HttpRouter<B>, RouterError>
    where
        F: FnOnce(&mut RouteCollector<B>) -> Result<(), RouterError>,
    {
        let compiler = PatternCompiler::new(&self.config)?;
        let cache = RouteCache::from_router_config(&self.config);

        let cached = match cache.load() {
            Ok(cached) => cached,
            Err(e) => {
                warn!(path = %cache.path().display(), error = %e, "route cache rejected, rebuilding");
                None
            }
        };

        let (table, names) = match cached {
            Some(loaded) => {
                debug!(path = %cache.path().display(), "routes restored from cache");
                loaded
            }
            None => {
                let mut collector = RouteCollector::new(&self.config)?;
                register(&mut collector)?;
                let (table, names) = collector.compile()?;
                match cache.save(&table, &names) {
                    Ok(()) => {}
                    Err(RouterError::Uncacheable(reason)) => {
                        warn!(%reason, "route cache skipped");
                    }
                    Err(e) => {
                        warn!(path = %cache.path().display(), error = %e, "route cache not written");
                    }
                }
                (table, names)
            }
        };

        let resolver: Arc<dyn Resolver<B>> = match self.resolver {
            Some(r) => r,
            None => Arc::new(Registry::<B>::new()),
        };
        let formatter: Arc<dyn ErrorFormatter<B>> = match self.formatter {
            Some(f) => f,
            None => Arc::new(PlainTextFormatter),
        };

        Ok(HttpRouter {
            table,
            names,
            compiler,
            resolver,
            formatter,
            observers: self.observers,
            debug: self.config.debug,
        })
    }
}
