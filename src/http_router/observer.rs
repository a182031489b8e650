use crate::error::BoxError;

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use http::{Method, StatusCode};
use tracing::warn;

/// What happened to one request, reported after the response is built.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub method: Method,
    pub path: String,
    /// Pattern of the matched route, if any.
    pub pattern: Option<String>,
    pub status: StatusCode,
    pub elapsed: Duration,
}

/// Side-channel hook for logging or metrics. Failures never reach the
/// response.
pub trait DispatchObserver: Send + Sync {
    fn observe(&self, outcome: &Outcome) -> Result<(), BoxError>;
}

impl<F> DispatchObserver for F
where
    F: Fn(&Outcome) -> Result<(), BoxError> + Send + Sync,
{
    fn observe(&self, outcome: &Outcome) -> Result<(), BoxError> {
        (self)(outcome)
    }
}

pub(super) fn notify(observers: &[Arc<dyn DispatchObserver>], outcome: &Outcome) {
    for (index, observer) in observers.iter().enumerate() {
        match catch_unwind(AssertUnwindSafe(|| observer.observe(outcome))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(observer = index, error = %e, "dispatch observer failed"),
            Err(_) => warn!(observer = index, "dispatch observer panicked"),
        }
    }
}
