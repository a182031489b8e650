use std::error::Error as StdError;

use http::{Method, StatusCode};

pub type BoxError = Box<dyn StdError + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("route already registered: {method} {pattern}")]
    DuplicateRoute { method: Method, pattern: String },

    #[error("route name already in use: {0:?}")]
    DuplicateRouteName(String),

    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("invalid parameter {name:?}: {value:?} is not a valid {expected}")]
    InvalidParameter {
        name: String,
        value: String,
        expected: &'static str,
    },

    #[error("no route matches {path:?}")]
    NotFound { path: String },

    #[error("method not allowed, expected one of {}", join_methods(.allowed))]
    MethodNotAllowed { allowed: Vec<Method> },

    #[error("route table can not be cached: {0}")]
    Uncacheable(String),

    #[error("route cache signature rejected: {0}")]
    InvalidSignature(String),

    #[error("middleware {0:?} can not be resolved")]
    MiddlewareResolution(String),

    #[error("handler {0} can not be resolved")]
    HandlerResolution(String),

    #[error("handler failed: {0}")]
    Handler(BoxError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

impl RouterError {
    pub(crate) fn invalid_pattern(pattern: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_owned(),
            reason: reason.into(),
        }
    }

    /// The transport status this error should surface as.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-input errors carry their message even outside debug mode.
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

pub(crate) fn join_methods(methods: &[Method]) -> String {
    let names: Vec<&str> = methods.iter().map(Method::as_str).collect();
    names.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let err = RouterError::InvalidParameter {
            name: "id".into(),
            value: "007".into(),
            expected: "int",
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.is_client_error());

        let err = RouterError::MethodNotAllowed {
            allowed: vec![Method::GET, Method::POST],
        };
        assert_eq!(err.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            err.to_string(),
            "method not allowed, expected one of GET, POST"
        );

        let err = RouterError::MiddlewareResolution("auth".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.is_client_error());
    }
}
