use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use todo_core::TodoStore;

use crate::error::AppError;

/// Deadline applied to the storage work of a single request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

/// Shared handler state. Cloning is cheap; every clone points at the same
/// store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TodoStore>,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self {
            store,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Run `work` under the request deadline. On expiry the future is
    /// dropped, which cancels any storage call still in flight.
    pub async fn within<F, T, E>(&self, work: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, E>>,
        AppError: From<E>,
    {
        match tokio::time::timeout(self.request_timeout, work).await {
            Ok(result) => result.map_err(AppError::from),
            Err(_) => Err(AppError::Timeout),
        }
    }
}
