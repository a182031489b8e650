#![forbid(unsafe_code)]

mod service;

pub use self::service::{MakeRouterService, RouterService};
