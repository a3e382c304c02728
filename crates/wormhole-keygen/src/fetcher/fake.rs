use crate::error::FetchError;
use crate::fetcher::KeyFetcher;
use crate::key::Key;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

/// An in-memory [`KeyFetcher`] for tests of key consumers.
///
/// Hands out its keys in order, exactly `count` per fetch. A fetch asking for
/// more keys than remain fails with [`FetchError::Exhausted`] and hands out
/// nothing, so the remaining keys stay available to smaller requests.
#[derive(Debug, Default)]
pub struct KeyFetcherFake {
    keys: Mutex<VecDeque<Key>>,
    fetches: AtomicUsize,
}

impl KeyFetcherFake {
    pub fn new<I>(keys: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Key>,
    {
        Self {
            keys: Mutex::new(keys.into_iter().map(Into::into).collect()),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Number of `fetch_keys` calls made so far, failed ones included.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Keys not handed out yet.
    pub fn remaining(&self) -> usize {
        self.keys.lock().len()
    }
}

#[async_trait]
impl KeyFetcher for KeyFetcherFake {
    async fn fetch_keys(&self, count: usize) -> Result<Vec<Key>, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let mut keys = self.keys.lock();
        if keys.len() < count {
            return Err(FetchError::Exhausted(format!(
                "{} keys left, {count} requested",
                keys.len()
            )));
        }

        Ok(keys.drain(..count).collect())
    }
}
