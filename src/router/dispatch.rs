use super::captures::Captures;
use super::pattern::CastMap;
use super::table::RouteTable;
use super::Route;

use std::collections::BTreeMap;

use http::Method;
use tracing::trace;

static NO_CASTS: CastMap = BTreeMap::new();

/// Result of resolving a `(method, path)` pair against a [`RouteTable`].
#[derive(Debug)]
pub enum Dispatch<'t, 'p, B> {
    Found {
        route: &'t Route<B>,
        captures: Captures<'p>,
        casts: &'t CastMap,
    },
    /// The path matches under these methods only.
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

impl<B> Dispatch<'_, '_, B> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

impl<B> RouteTable<B> {
    /// Expects `path` to be normalized already.
    pub fn dispatch<'t: 'p, 'p>(&'t self, method: &Method, path: &'p str) -> Dispatch<'t, 'p, B> {
        if let Some((route, captures, casts)) = self.find(method, path) {
            trace!(%method, path, pattern = route.pattern(), "route found");
            return Dispatch::Found {
                route,
                captures,
                casts,
            };
        }

        let allowed = self.allowed_methods(method, path);
        if allowed.is_empty() {
            trace!(%method, path, "no route");
            Dispatch::NotFound
        } else {
            trace!(%method, path, allowed = allowed.len(), "method not allowed");
            Dispatch::MethodNotAllowed(allowed)
        }
    }

    fn find<'t: 'p, 'p>(
        &'t self,
        method: &Method,
        path: &'p str,
    ) -> Option<(&'t Route<B>, Captures<'p>, &'t CastMap)> {
        let literal = self.static_routes.get(method).and_then(|m| m.get(path));
        if let Some(&id) = literal {
            return Some((&self.routes[id], Captures::empty(), &NO_CASTS));
        }

        self.dynamic_routes.get(method)?.iter().find_map(|entry| {
            let captures = Captures::from_regex(&entry.regex, path)?;
            Some((&self.routes[entry.route], captures, &entry.casts))
        })
    }

    fn matches_path(&self, method: &Method, path: &str) -> bool {
        let literal = self
            .static_routes
            .get(method)
            .map_or(false, |m| m.contains_key(path));
        literal
            || self
                .dynamic_routes
                .get(method)
                .map_or(false, |v| v.iter().any(|e| e.regex.is_match(path)))
    }

    fn allowed_methods(&self, requested: &Method, path: &str) -> Vec<Method> {
        let mut allowed: Vec<Method> = self
            .static_routes
            .keys()
            .chain(self.dynamic_routes.keys())
            .filter(|&m| m != requested)
            .filter(|&m| self.matches_path(m, path))
            .cloned()
            .collect();
        allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        allowed.dedup();
        allowed
    }
}
