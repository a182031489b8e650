use crate::error::{join_methods, RouterError};
use crate::pipeline::{HandlerRef, MiddlewareRef};
use crate::router::{CastMap, DynamicRoute, NamedRoutes, Route, RouteTable};

use std::collections::{BTreeMap, HashMap};

use http::Method;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// On-disk shape of a compiled route table plus its name index.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Artifact {
    routes: Vec<CachedRoute>,
    #[serde(rename = "static")]
    static_routes: BTreeMap<String, BTreeMap<String, usize>>,
    dynamic: BTreeMap<String, Vec<CachedDynamic>>,
    names: NamedRoutes,
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedRoute {
    methods: Vec<String>,
    pattern: String,
    handler: CachedHandler,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    middleware: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum CachedHandler {
    Action { class: String, method: String },
    Service { id: String },
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedDynamic {
    regex: String,
    route: usize,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    casts: CastMap,
}

impl Artifact {
    /// Fails with `Uncacheable` on the first closure handler or inline
    /// middleware found.
    pub(crate) fn from_table<B>(
        table: &RouteTable<B>,
        names: &NamedRoutes,
    ) -> Result<Self, RouterError> {
        let routes = table
            .routes()
            .map(CachedRoute::from_route)
            .collect::<Result<Vec<_>, _>>()?;

        let static_routes = table
            .static_routes
            .iter()
            .map(|(method, paths)| {
                let paths = paths.iter().map(|(p, &id)| (p.clone(), id)).collect();
                (method.as_str().to_owned(), paths)
            })
            .collect();

        let dynamic = table
            .dynamic_routes
            .iter()
            .map(|(method, entries)| {
                let entries = entries
                    .iter()
                    .map(|e| CachedDynamic {
                        regex: e.regex.as_str().to_owned(),
                        route: e.route,
                        casts: e.casts.clone(),
                    })
                    .collect();
                (method.as_str().to_owned(), entries)
            })
            .collect();

        Ok(Self {
            routes,
            static_routes,
            dynamic,
            names: names.clone(),
        })
    }

    /// Rebuilds the table. Any inconsistency is reported as a reason string
    /// so the caller can treat it as a cache miss.
    pub(crate) fn into_table<B>(self) -> Result<(RouteTable<B>, NamedRoutes), String> {
        let route_count = self.routes.len();
        let check_id = |id: usize| {
            if id < route_count {
                Ok(id)
            } else {
                Err(format!("route index {} out of range", id))
            }
        };

        let mut static_routes: HashMap<Method, HashMap<String, usize>> = HashMap::new();
        for (method, paths) in self.static_routes {
            let method = parse_method(&method)?;
            let map = static_routes.entry(method).or_default();
            for (path, id) in paths {
                map.insert(path, check_id(id)?);
            }
        }

        let mut dynamic_routes: HashMap<Method, Vec<DynamicRoute>> = HashMap::new();
        for (method, entries) in self.dynamic {
            let method = parse_method(&method)?;
            let list = dynamic_routes.entry(method).or_default();
            for entry in entries {
                let regex = Regex::new(&entry.regex).map_err(|e| e.to_string())?;
                list.push(DynamicRoute {
                    regex,
                    route: check_id(entry.route)?,
                    casts: entry.casts,
                });
            }
        }

        let routes = self
            .routes
            .into_iter()
            .map(CachedRoute::into_route)
            .collect::<Result<Vec<_>, _>>()?;

        let table = RouteTable {
            routes,
            static_routes,
            dynamic_routes,
        };
        Ok((table, self.names))
    }
}

impl CachedRoute {
    fn from_route<B>(route: &Route<B>) -> Result<Self, RouterError> {
        let uncacheable = |what: &str| {
            RouterError::Uncacheable(format!(
                "{} {} uses {}",
                join_methods(route.methods()),
                route.pattern(),
                what
            ))
        };

        let handler = match route.handler() {
            HandlerRef::Direct(_) => return Err(uncacheable("a closure handler")),
            HandlerRef::Action { class, method } => CachedHandler::Action {
                class: class.clone(),
                method: method.clone(),
            },
            HandlerRef::Service(id) => CachedHandler::Service { id: id.clone() },
        };

        let mut middleware = Vec::with_capacity(route.middleware().len());
        for m in route.middleware() {
            match m {
                MiddlewareRef::Named(name) => middleware.push(name.clone()),
                MiddlewareRef::Inline(_) => return Err(uncacheable("inline middleware")),
            }
        }

        Ok(Self {
            methods: route.methods().iter().map(|m| m.as_str().to_owned()).collect(),
            pattern: route.pattern().to_owned(),
            handler,
            middleware,
            name: route.name().map(str::to_owned),
        })
    }

    fn into_route<B>(self) -> Result<Route<B>, String> {
        let methods = self
            .methods
            .iter()
            .map(|m| parse_method(m))
            .collect::<Result<Vec<_>, _>>()?;
        let handler = match self.handler {
            CachedHandler::Action { class, method } => HandlerRef::Action { class, method },
            CachedHandler::Service { id } => HandlerRef::Service(id),
        };
        let middleware = self.middleware.into_iter().map(MiddlewareRef::Named).collect();
        Ok(Route::from_parts(
            methods,
            self.pattern,
            handler,
            middleware,
            self.name,
        ))
    }
}

fn parse_method(s: &str) -> Result<Method, String> {
    Method::from_bytes(s.as_bytes()).map_err(|_| format!("invalid method {:?}", s))
}
