//! Deduplication of concurrent identical requests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::debug;

use crate::error::ApiResult;

type SharedCall<T> = Shared<BoxFuture<'static, ApiResult<T>>>;

/// Joins concurrent calls with the same key onto one in-flight future.
///
/// An entry exists only while its call is pending; it is removed as soon as
/// the call settles, successfully or not. Nothing is cached.
pub struct Coalescer<T> {
    in_flight: Arc<Mutex<HashMap<String, SharedCall<T>>>>,
}

impl<T> Coalescer<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates an empty coalescer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Awaits the pending call for `key`, or starts one with `factory`.
    ///
    /// `factory` is only invoked when no call for `key` is pending.
    ///
    /// # Errors
    ///
    /// Returns whatever error the shared call produced.
    pub async fn coalesce<F, Fut>(&self, key: &str, factory: F) -> ApiResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<T>> + Send + 'static,
    {
        let call = {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(pending) = in_flight.get(key) {
                debug!(key, "Joining in-flight request");
                pending.clone()
            } else {
                debug!(key, "Starting request");
                let table = Arc::clone(&self.in_flight);
                let owned_key = key.to_string();
                let work = factory();
                let call = async move {
                    let result = work.await;
                    table
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .remove(&owned_key);
                    result
                }
                .boxed()
                .shared();
                in_flight.insert(key.to_string(), call.clone());
                call
            }
        };
        call.await
    }

    /// Number of calls currently pending.
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<T> Clone for Coalescer<T> {
    fn clone(&self) -> Self {
        Self {
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<T> Default for Coalescer<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Coalescer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pending = self
            .in_flight
            .lock()
            .map_or(0, |in_flight| in_flight.len());
        f.debug_struct("Coalescer")
            .field("in_flight", &pending)
            .finish()
    }
}
