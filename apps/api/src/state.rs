use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Export defaults used when a layout request leaves the widths out.
    pub config: Config,
}
