use mr_reviewer::{HookConfig, ReviewHook};

use crate::error_handler::AppResult;

/// Shared state for all HTTP handlers.
///
/// Immutable after boot; handlers get it through `State<Arc<AppState>>`.
#[derive(Debug)]
pub struct AppState {
    pub hook: ReviewHook,
}

impl AppState {
    pub fn new(hook: ReviewHook) -> Self {
        Self { hook }
    }

    /// Builds the hook from environment variables.
    pub fn from_env() -> AppResult<Self> {
        let config = HookConfig::from_env()?;
        Ok(Self::new(ReviewHook::new(config)?))
    }
}
