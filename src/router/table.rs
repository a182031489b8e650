use super::pattern::{CastMap, CompiledPattern};
use super::Route;
use crate::error::RouterError;

use std::collections::{BTreeMap, HashMap};

use http::Method;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct DynamicRoute {
    pub(crate) regex: Regex,
    pub(crate) route: usize,
    pub(crate) casts: CastMap,
}

impl DynamicRoute {
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn casts(&self) -> &CastMap {
        &self.casts
    }
}

impl PartialEq for DynamicRoute {
    fn eq(&self, other: &Self) -> bool {
        self.regex.as_str() == other.regex.as_str()
            && self.route == other.route
            && self.casts == other.casts
    }
}

/// The compiled, read-only form of every registered route.
///
/// Static routes are keyed by their literal path. Dynamic routes are kept
/// per method in registration order, which is also their match priority.
#[derive(Debug)]
pub struct RouteTable<B> {
    pub(crate) routes: Vec<Route<B>>,
    pub(crate) static_routes: HashMap<Method, HashMap<String, usize>>,
    pub(crate) dynamic_routes: HashMap<Method, Vec<DynamicRoute>>,
}

impl<B> RouteTable<B> {
    pub(crate) fn new() -> Self {
        Self {
            routes: Vec::new(),
            static_routes: HashMap::new(),
            dynamic_routes: HashMap::new(),
        }
    }

    pub(crate) fn push(&mut self, route: Route<B>, compiled: CompiledPattern) {
        let id = self.routes.len();
        for method in route.methods() {
            match &compiled {
                CompiledPattern::Static(path) => {
                    self.static_routes
                        .entry(method.clone())
                        .or_default()
                        .insert(path.clone(), id);
                }
                CompiledPattern::Dynamic { regex, casts } => {
                    self.dynamic_routes
                        .entry(method.clone())
                        .or_default()
                        .push(DynamicRoute {
                            regex: regex.clone(),
                            route: id,
                            casts: casts.clone(),
                        });
                }
            }
        }
        self.routes.push(route);
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn routes(&self) -> impl Iterator<Item = &Route<B>> {
        self.routes.iter()
    }

    /// False when any route holds a closure handler or inline middleware.
    pub fn is_cacheable(&self) -> bool {
        self.routes.iter().all(|r| {
            r.handler().is_cacheable() && r.middleware().iter().all(|m| m.is_cacheable())
        })
    }
}

impl<B> PartialEq for RouteTable<B> {
    fn eq(&self, other: &Self) -> bool {
        self.routes == other.routes
            && self.static_routes == other.static_routes
            && self.dynamic_routes == other.dynamic_routes
    }
}

/// `name -> pattern`, used for reverse URL generation only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamedRoutes {
    map: BTreeMap<String, String>,
}

impl NamedRoutes {
    pub(crate) fn insert(&mut self, name: &str, pattern: &str) -> Result<(), RouterError> {
        if self.map.contains_key(name) {
            return Err(RouterError::DuplicateRouteName(name.to_owned()));
        }
        self.map.insert(name.to_owned(), pattern.to_owned());
        Ok(())
    }

    pub fn pattern(&self, name: &str) -> Option<&str> {
        self.map.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
