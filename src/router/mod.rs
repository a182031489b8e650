mod captures;
mod cast;
mod dispatch;
mod pattern;
mod routes_macro;
mod table;

pub use self::captures::Captures;
pub use self::cast::{cast, cast_bool, cast_float, cast_int, cast_params, ParamValue, Params};
pub use self::dispatch::Dispatch;
pub use self::pattern::{CastKind, CastMap, CompiledPattern, PatternCompiler};
pub use self::table::{DynamicRoute, NamedRoutes, RouteTable};

use self::pattern::join_paths;
use crate::config::RouterConfig;
use crate::error::{join_methods, RouterError};
use crate::pipeline::{HandlerRef, MiddlewareRef};

use std::collections::{HashMap, HashSet};
use std::mem;

use http::Method;
use smallvec::SmallVec;
use tracing::debug;

/// A registered route. Immutable once the table is compiled.
#[derive(Debug)]
pub struct Route<B> {
    methods: Vec<Method>,
    pattern: String,
    handler: HandlerRef<B>,
    middleware: Vec<MiddlewareRef<B>>,
    name: Option<String>,
}

impl<B> Route<B> {
    pub(crate) fn from_parts(
        methods: Vec<Method>,
        pattern: String,
        handler: HandlerRef<B>,
        middleware: Vec<MiddlewareRef<B>>,
        name: Option<String>,
    ) -> Self {
        Self {
            methods,
            pattern,
            handler,
            middleware,
            name,
        }
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn handler(&self) -> &HandlerRef<B> {
        &self.handler
    }

    pub fn middleware(&self) -> &[MiddlewareRef<B>] {
        &self.middleware
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl<B> PartialEq for Route<B> {
    fn eq(&self, other: &Self) -> bool {
        self.methods == other.methods
            && self.pattern == other.pattern
            && self.handler == other.handler
            && self.middleware == other.middleware
            && self.name == other.name
    }
}

/// Fluent access to the route that was just registered.
pub struct RouteHandle<'a, B> {
    route: &'a mut Route<B>,
}

impl<B> RouteHandle<'_, B> {
    pub fn name(self, name: impl Into<String>) -> Self {
        self.route.name = Some(name.into());
        self
    }

    /// Appended after any middleware inherited from enclosing groups.
    pub fn middleware(self, middleware: impl Into<MiddlewareRef<B>>) -> Self {
        self.route.middleware.push(middleware.into());
        self
    }

    pub fn pattern(&self) -> &str {
        &self.route.pattern
    }
}

/// Collects route registrations and compiles them into a [`RouteTable`].
pub struct RouteCollector<B> {
    compiler: PatternCompiler,
    pending: Vec<(Route<B>, CompiledPattern)>,
    seen: HashMap<Method, HashSet<String>>,
    prefix: String,
    group_middleware: Vec<MiddlewareRef<B>>,
}

macro_rules! define_method {
    ($name:ident, $method:ident) => {
        pub fn $name(
            &mut self,
            pattern: &str,
            handler: impl Into<HandlerRef<B>>,
        ) -> Result<RouteHandle<'_, B>, RouterError> {
            self.route(&[Method::$method], pattern, handler)
        }
    };
}

impl<B> RouteCollector<B> {
    pub fn new(config: &RouterConfig) -> Result<Self, RouterError> {
        Ok(Self {
            compiler: PatternCompiler::new(config)?,
            pending: Vec::new(),
            seen: HashMap::new(),
            prefix: String::new(),
            group_middleware: Vec::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn route(
        &mut self,
        methods: &[Method],
        pattern: &str,
        handler: impl Into<HandlerRef<B>>,
    ) -> Result<RouteHandle<'_, B>, RouterError> {
        let full = self.compiler.normalize(&join_paths(&self.prefix, pattern));

        let mut unique: SmallVec<[Method; 4]> = SmallVec::new();
        for m in methods {
            if !unique.contains(m) {
                unique.push(m.clone());
            }
        }
        if unique.is_empty() {
            return Err(RouterError::invalid_pattern(&full, "route has no methods"));
        }

        for m in &unique {
            let taken = self.seen.get(m).map_or(false, |s| s.contains(&full));
            if taken {
                return Err(RouterError::DuplicateRoute {
                    method: m.clone(),
                    pattern: full,
                });
            }
        }

        let compiled = self.compiler.compile(&full)?;
        for m in &unique {
            self.seen.entry(m.clone()).or_default().insert(full.clone());
        }

        debug!(
            methods = %join_methods(&unique),
            pattern = %full,
            dynamic = !compiled.is_static(),
            "route registered"
        );

        let route = Route {
            methods: unique.into_vec(),
            pattern: full,
            handler: handler.into(),
            middleware: self.group_middleware.clone(),
            name: None,
        };
        self.pending.push((route, compiled));

        let last = self.pending.len() - 1;
        Ok(RouteHandle {
            route: &mut self.pending[last].0,
        })
    }

    define_method!(get, GET);
    define_method!(post, POST);
    define_method!(put, PUT);
    define_method!(patch, PATCH);
    define_method!(delete, DELETE);
    define_method!(options, OPTIONS);
    define_method!(head, HEAD);

    pub fn any(
        &mut self,
        pattern: &str,
        handler: impl Into<HandlerRef<B>>,
    ) -> Result<RouteHandle<'_, B>, RouterError> {
        const ALL: &[Method] = &[
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
            Method::HEAD,
        ];
        self.route(ALL, pattern, handler)
    }

    /// Registers everything `f` adds under `prefix`. Groups nest.
    pub fn group<F>(&mut self, prefix: &str, f: F) -> Result<&mut Self, RouterError>
    where
        F: FnOnce(&mut Self) -> Result<(), RouterError>,
    {
        let inner = join_paths(&self.prefix, prefix);
        let saved = mem::replace(&mut self.prefix, inner);
        let ret = f(self);
        self.prefix = saved;
        ret.map(move |()| self)
    }

    /// Prepends `middleware` to every route `f` adds.
    pub fn middleware_group<I, F>(&mut self, middleware: I, f: F) -> Result<&mut Self, RouterError>
    where
        I: IntoIterator,
        I::Item: Into<MiddlewareRef<B>>,
        F: FnOnce(&mut Self) -> Result<(), RouterError>,
    {
        let saved = self.group_middleware.len();
        self.group_middleware
            .extend(middleware.into_iter().map(Into::into));
        let ret = f(self);
        self.group_middleware.truncate(saved);
        ret.map(move |()| self)
    }

    pub fn compile(self) -> Result<(RouteTable<B>, NamedRoutes), RouterError> {
        let mut table = RouteTable::new();
        let mut names = NamedRoutes::default();
        for (route, compiled) in self.pending {
            if let Some(name) = &route.name {
                names.insert(name, &route.pattern)?;
            }
            table.push(route, compiled);
        }
        debug!(
            routes = table.len(),
            named = names.len(),
            "route table compiled"
        );
        Ok((table, names))
    }
}
