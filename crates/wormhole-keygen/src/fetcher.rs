pub mod fake;
pub mod rpc;

use crate::error::FetchError;
use crate::key::Key;
use async_trait::async_trait;
use std::sync::Arc;

/// Source of fresh key batches, usually a remote Key Generation Service.
///
/// Implementations perform no retries; retry policy belongs to the caller.
#[async_trait]
pub trait KeyFetcher: Send + Sync + 'static {
    /// Fetches `count` keys that were never returned to any client before.
    ///
    /// On success exactly `count` keys are expected. On failure no key is
    /// delivered, and the caller must not assume partial delivery.
    async fn fetch_keys(&self, count: usize) -> Result<Vec<Key>, FetchError>;
}

#[async_trait]
impl<F: KeyFetcher + ?Sized> KeyFetcher for Arc<F> {
    async fn fetch_keys(&self, count: usize) -> Result<Vec<Key>, FetchError> {
        (**self).fetch_keys(count).await
    }
}

#[async_trait]
impl<F: KeyFetcher + ?Sized> KeyFetcher for Box<F> {
    async fn fetch_keys(&self, count: usize) -> Result<Vec<Key>, FetchError> {
        (**self).fetch_keys(count).await
    }
}
