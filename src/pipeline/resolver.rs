use super::{Handler, Middleware};
use crate::error::RouterError;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// What a route points at.
///
/// `Direct` holds the handler itself and can not be written to the route
/// cache. The other variants are symbolic and are looked up through a
/// [`Resolver`] on every request.
pub enum HandlerRef<B> {
    Direct(Arc<dyn Handler<B>>),
    Action { class: String, method: String },
    Service(String),
}

impl<B> HandlerRef<B> {
    pub fn direct(handler: impl Handler<B> + 'static) -> Self {
        Self::Direct(Arc::new(handler))
    }

    pub fn action(class: impl Into<String>, method: impl Into<String>) -> Self {
        Self::Action {
            class: class.into(),
            method: method.into(),
        }
    }

    pub fn service(id: impl Into<String>) -> Self {
        Self::Service(id.into())
    }

    pub fn is_cacheable(&self) -> bool {
        !matches!(self, Self::Direct(_))
    }
}

impl<B> Clone for HandlerRef<B> {
    fn clone(&self) -> Self {
        match self {
            Self::Direct(h) => Self::Direct(Arc::clone(h)),
            Self::Action { class, method } => Self::Action {
                class: class.clone(),
                method: method.clone(),
            },
            Self::Service(id) => Self::Service(id.clone()),
        }
    }
}

impl<B> PartialEq for HandlerRef<B> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Direct(a), Self::Direct(b)) => Arc::ptr_eq(a, b),
            (
                Self::Action { class, method },
                Self::Action {
                    class: c2,
                    method: m2,
                },
            ) => class == c2 && method == m2,
            (Self::Service(a), Self::Service(b)) => a == b,
            _ => false,
        }
    }
}

impl<B> fmt::Debug for HandlerRef<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(_) => f.write_str("Direct(..)"),
            Self::Action { class, method } => write!(f, "Action({}::{})", class, method),
            Self::Service(id) => write!(f, "Service({})", id),
        }
    }
}

impl<B> fmt::Display for HandlerRef<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(_) => f.write_str("<closure>"),
            Self::Action { class, method } => write!(f, "{}::{}", class, method),
            Self::Service(id) => write!(f, "service {:?}", id),
        }
    }
}

pub enum MiddlewareRef<B> {
    Named(String),
    Inline(Arc<dyn Middleware<B>>),
}

impl<B> MiddlewareRef<B> {
    pub fn inline(middleware: impl Middleware<B> + 'static) -> Self {
        Self::Inline(Arc::new(middleware))
    }

    pub fn is_cacheable(&self) -> bool {
        matches!(self, Self::Named(_))
    }
}

impl<B> From<&str> for MiddlewareRef<B> {
    fn from(name: &str) -> Self {
        Self::Named(name.to_owned())
    }
}

impl<B> From<String> for MiddlewareRef<B> {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl<B> Clone for MiddlewareRef<B> {
    fn clone(&self) -> Self {
        match self {
            Self::Named(name) => Self::Named(name.clone()),
            Self::Inline(m) => Self::Inline(Arc::clone(m)),
        }
    }
}

impl<B> PartialEq for MiddlewareRef<B> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Named(a), Self::Named(b)) => a == b,
            (Self::Inline(a), Self::Inline(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<B> fmt::Debug for MiddlewareRef<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "Named({})", name),
            Self::Inline(_) => f.write_str("Inline(..)"),
        }
    }
}

/// Turns symbolic handler and middleware references into invocable ones.
pub trait Resolver<B>: Send + Sync {
    fn action(&self, class: &str, method: &str) -> Option<Arc<dyn Handler<B>>>;

    fn service(&self, id: &str) -> Option<Arc<dyn Handler<B>>>;

    fn middleware(&self, name: &str) -> Option<Arc<dyn Middleware<B>>>;
}

type ClassFactory<B> = Box<dyn Fn(&str) -> Option<Arc<dyn Handler<B>>> + Send + Sync>;

/// A [`Resolver`] backed by explicit registrations: one factory per class,
/// plus prebuilt services and named middleware.
pub struct Registry<B> {
    classes: HashMap<String, ClassFactory<B>>,
    services: HashMap<String, Arc<dyn Handler<B>>>,
    middleware: HashMap<String, Arc<dyn Middleware<B>>>,
}

impl<B> Default for Registry<B> {
    fn default() -> Self {
        Self {
            classes: HashMap::new(),
            services: HashMap::new(),
            middleware: HashMap::new(),
        }
    }
}

impl<B> Registry<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// `factory` maps a method name of `class` to its handler.
    pub fn register_class<F>(&mut self, class: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&str) -> Option<Arc<dyn Handler<B>>> + Send + Sync + 'static,
    {
        self.classes.insert(class.into(), Box::new(factory));
        self
    }

    pub fn register_service(
        &mut self,
        id: impl Into<String>,
        handler: impl Handler<B> + 'static,
    ) -> &mut Self {
        self.services.insert(id.into(), Arc::new(handler));
        self
    }

    pub fn register_middleware(
        &mut self,
        name: impl Into<String>,
        middleware: impl Middleware<B> + 'static,
    ) -> &mut Self {
        self.middleware.insert(name.into(), Arc::new(middleware));
        self
    }
}

impl<B> Resolver<B> for Registry<B> {
    fn action(&self, class: &str, method: &str) -> Option<Arc<dyn Handler<B>>> {
        self.classes.get(class).and_then(|factory| factory(method))
    }

    fn service(&self, id: &str) -> Option<Arc<dyn Handler<B>>> {
        self.services.get(id).cloned()
    }

    fn middleware(&self, name: &str) -> Option<Arc<dyn Middleware<B>>> {
        self.middleware.get(name).cloned()
    }
}

pub(crate) fn resolve_handler<B>(
    resolver: &dyn Resolver<B>,
    handler: &HandlerRef<B>,
) -> Result<Arc<dyn Handler<B>>, RouterError> {
    let resolved = match handler {
        HandlerRef::Direct(h) => Some(Arc::clone(h)),
        HandlerRef::Action { class, method } => resolver.action(class, method),
        HandlerRef::Service(id) => resolver.service(id),
    };
    resolved.ok_or_else(|| RouterError::HandlerResolution(handler.to_string()))
}

pub(crate) fn resolve_middleware<B>(
    resolver: &dyn Resolver<B>,
    middleware: &[MiddlewareRef<B>],
) -> Result<Vec<Arc<dyn Middleware<B>>>, RouterError> {
    middleware
        .iter()
        .map(|m| match m {
            MiddlewareRef::Inline(m) => Ok(Arc::clone(m)),
            MiddlewareRef::Named(name) => resolver
                .middleware(name)
                .ok_or_else(|| RouterError::MiddlewareResolution(name.clone())),
        })
        .collect()
}
