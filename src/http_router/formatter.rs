use crate::error::RouterError;

use http::header::{self, HeaderValue};
use http::Response;
use serde_json::json;

/// Renders a [`RouterError`] as a response.
///
/// `debug` asks for full detail on server errors. Client errors (400, 404,
/// 405) are safe to describe either way.
pub trait ErrorFormatter<B>: Send + Sync {
    fn format(&self, error: &RouterError, debug: bool) -> Response<B>;
}

impl<B, F> ErrorFormatter<B> for F
where
    F: Fn(&RouterError, bool) -> Response<B> + Send + Sync,
{
    fn format(&self, error: &RouterError, debug: bool) -> Response<B> {
        (self)(error, debug)
    }
}

fn message(error: &RouterError, debug: bool) -> String {
    if debug || error.is_client_error() {
        error.to_string()
    } else {
        let status = error.status_code();
        status.canonical_reason().unwrap_or("Error").to_owned()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextFormatter;

impl<B: From<String>> ErrorFormatter<B> for PlainTextFormatter {
    fn format(&self, error: &RouterError, debug: bool) -> Response<B> {
        let mut res = Response::new(B::from(message(error, debug)));
        *res.status_mut() = error.status_code();
        res.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        res
    }
}

/// `{"error": {"status": 405, "message": "...", "allowed": ["GET"]}}`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl<B: From<String>> ErrorFormatter<B> for JsonFormatter {
    fn format(&self, error: &RouterError, debug: bool) -> Response<B> {
        let status = error.status_code();
        let mut body = json!({
            "status": status.as_u16(),
            "message": message(error, debug),
        });
        if let RouterError::MethodNotAllowed { allowed } = error {
            let allowed: Vec<&str> = allowed.iter().map(|m| m.as_str()).collect();
            body["allowed"] = json!(allowed);
        }

        let mut res = Response::new(B::from(json!({ "error": body }).to_string()));
        *res.status_mut() = status;
        res.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        res
    }
}
