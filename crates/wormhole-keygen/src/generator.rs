use crate::buffer::KeyBuffer;
use crate::error::{ConfigError, FetchError, KeyGenError, Result};
use crate::fetcher::KeyFetcher;
use crate::key::Key;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};
use typed_builder::TypedBuilder;

/// Anything that can hand out unique keys, one at a time.
///
/// Consumers such as short-link creation, change-log persistence or request
/// tracing depend on this trait rather than on a concrete generator.
#[async_trait]
pub trait KeySource: Send + Sync + 'static {
    /// Draws a key that no other caller has ever received.
    ///
    /// A failed draw must fail the enclosing operation.
    async fn new_key(&self) -> Result<Key>;
}

/// Configures a [`KeyGenerator`].
#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct KeyGeneratorSettings {
    /// Keys requested per fetch, and the most the buffer ever holds.
    pub buffer_size: usize,
    /// Upper bound on a single fetch. `None` waits as long as the fetcher does.
    #[builder(default)]
    pub fetch_timeout: Option<Duration>,
}

/// Validates a raw buffer size from configuration.
pub fn buffer_size_from(raw: i64) -> std::result::Result<usize, ConfigError> {
    match usize::try_from(raw) {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(ConfigError::InvalidBufferSize(raw)),
    }
}

struct Shared<F> {
    buffer: Mutex<KeyBuffer>,
    fetcher: F,
    buffer_size: usize,
    fetch_timeout: Option<Duration>,
}

/// Serves unique keys to any number of concurrent callers from a local
/// buffer, refilling it from a [`KeyFetcher`] one batch at a time.
///
/// Refill is synchronous: the caller that finds the buffer empty fetches a new
/// batch while holding the buffer lock, and everyone arriving meanwhile waits
/// for that single round trip. At most one fetch is in flight per generator.
///
/// Cloning is cheap and clones share the buffer, so a generator can be handed
/// to several request handlers. Separate instances never share keys.
pub struct KeyGenerator<F> {
    shared: Arc<Shared<F>>,
}

impl<F> Clone for KeyGenerator<F> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<F> std::fmt::Debug for KeyGenerator<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyGenerator")
            .field("buffer_size", &self.shared.buffer_size)
            .field("fetch_timeout", &self.shared.fetch_timeout)
            .finish_non_exhaustive()
    }
}

impl<F: KeyFetcher> KeyGenerator<F> {
    /// Creates a generator that fetches `buffer_size` keys at a time.
    pub fn new(buffer_size: usize, fetcher: F) -> std::result::Result<Self, ConfigError> {
        let settings = KeyGeneratorSettings::builder()
            .buffer_size(buffer_size)
            .build();
        Self::with_settings(settings, fetcher)
    }

    pub fn with_settings(
        settings: KeyGeneratorSettings,
        fetcher: F,
    ) -> std::result::Result<Self, ConfigError> {
        if settings.buffer_size == 0 {
            return Err(ConfigError::InvalidBufferSize(0));
        }

        Ok(Self {
            shared: Arc::new(Shared {
                buffer: Mutex::new(KeyBuffer::with_capacity(settings.buffer_size)),
                fetcher,
                buffer_size: settings.buffer_size,
                fetch_timeout: settings.fetch_timeout,
            }),
        })
    }

    /// Draws the next key, fetching a new batch first if the buffer is empty.
    pub async fn new_key(&self) -> Result<Key> {
        KeySource::new_key(self).await
    }

    /// Number of keys fetched but not issued yet. Only meaningful for
    /// instrumentation; it may change as soon as it is read.
    ///
    /// Takes the buffer lock, so while a refill is in progress this waits for
    /// the whole remote fetch to finish.
    pub async fn buffered(&self) -> usize {
        self.shared.buffer.lock().await.len()
    }

    pub fn buffer_size(&self) -> usize {
        self.shared.buffer_size
    }

    pub fn fetcher(&self) -> &F {
        &self.shared.fetcher
    }

    /// Fills an empty buffer with one batch. On any error the buffer is left
    /// empty and the fetched keys, if any, are dropped.
    async fn refill(&self, buffer: &mut KeyBuffer) -> Result<()> {
        let requested = buffer.capacity();
        let started = Instant::now();
        debug!(requested, "key buffer empty, fetching batch");

        let keys = self.fetch(requested).await.inspect_err(|e| {
            warn!(requested, error = %e, "key fetch failed");
        })?;

        let received = keys.len();
        if received < requested {
            warn!(requested, received, "key service returned a short batch");
            return Err(KeyGenError::ShortBatch {
                requested,
                received,
            });
        }

        buffer.enqueue(keys).inspect_err(|e| {
            warn!(requested, received, error = %e, "key batch rejected");
        })?;

        debug!(
            received,
            elapsed = ?started.elapsed(),
            "key buffer refilled"
        );
        Ok(())
    }

    async fn fetch(&self, count: usize) -> std::result::Result<Vec<Key>, FetchError> {
        let fetch = self.shared.fetcher.fetch_keys(count);
        match self.shared.fetch_timeout {
            // keys minted for a timed-out request are lost to this client
            Some(limit) => tokio::time::timeout(limit, fetch)
                .await
                .map_err(|_| FetchError::Timeout(format!("no batch within {limit:?}")))?,
            None => fetch.await,
        }
    }
}

#[async_trait]
impl<F: KeyFetcher> KeySource for KeyGenerator<F> {
    async fn new_key(&self) -> Result<Key> {
        let mut buffer = self.shared.buffer.lock().await;

        if let Some(key) = buffer.dequeue() {
            trace!(remaining = buffer.len(), "issued buffered key");
            return Ok(key);
        }

        self.refill(&mut buffer).await?;

        // a successful refill put `capacity >= 1` keys in the buffer
        buffer.dequeue().ok_or(KeyGenError::ShortBatch {
            requested: buffer.capacity(),
            received: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::fake::KeyFetcherFake;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mints `k0`, `k1`, ... forever and counts fetches.
    #[derive(Default)]
    struct CountingFetcher {
        fetches: AtomicUsize,
        next: AtomicUsize,
    }

    #[async_trait]
    impl KeyFetcher for CountingFetcher {
        async fn fetch_keys(&self, count: usize) -> std::result::Result<Vec<Key>, FetchError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let start = self.next.fetch_add(count, Ordering::SeqCst);
            Ok((start..start + count)
                .map(|n| Key::new(format!("k{n}")))
                .collect())
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl KeyFetcher for FailingFetcher {
        async fn fetch_keys(&self, _count: usize) -> std::result::Result<Vec<Key>, FetchError> {
            Err(FetchError::Transport("connection refused".to_string()))
        }
    }

    /// Claims success but always delivers one key fewer than asked.
    struct ShortFetcher;

    #[async_trait]
    impl KeyFetcher for ShortFetcher {
        async fn fetch_keys(&self, count: usize) -> std::result::Result<Vec<Key>, FetchError> {
            Ok((1..count).map(|n| Key::new(format!("s{n}"))).collect())
        }
    }

    #[test]
    fn zero_buffer_size_is_rejected() {
        let err = KeyGenerator::new(0, CountingFetcher::default()).unwrap_err();
        assert_eq!(err, ConfigError::InvalidBufferSize(0));
    }

    #[test]
    fn raw_buffer_size_must_be_positive() {
        assert_eq!(buffer_size_from(-1), Err(ConfigError::InvalidBufferSize(-1)));
        assert_eq!(buffer_size_from(0), Err(ConfigError::InvalidBufferSize(0)));
        assert_eq!(buffer_size_from(64), Ok(64));
    }

    #[tokio::test]
    async fn refills_once_per_batch() {
        let generator = KeyGenerator::new(2, CountingFetcher::default()).unwrap();

        let mut fetches_after_call = Vec::new();
        for _ in 0..5 {
            generator.new_key().await.unwrap();
            fetches_after_call.push(generator.fetcher().fetches.load(Ordering::SeqCst));
        }

        // fetches happen on calls 1, 3 and 5
        assert_eq!(fetches_after_call, vec![1, 1, 2, 2, 3]);
    }

    #[tokio::test]
    async fn issues_keys_in_fetch_order() {
        let fake = KeyFetcherFake::new(["a", "b", "c", "d", "e", "f"]);
        let generator = KeyGenerator::new(3, fake).unwrap();

        let mut issued = Vec::new();
        for _ in 0..4 {
            issued.push(generator.new_key().await.unwrap().into_inner());
        }

        assert_eq!(issued, vec!["a", "b", "c", "d"]);
        assert_eq!(generator.fetcher().fetch_count(), 2);
        assert_eq!(generator.buffered().await, 2);
    }

    #[tokio::test]
    async fn fetch_failure_leaves_buffer_empty() {
        let generator = KeyGenerator::new(4, FailingFetcher).unwrap();

        let err = generator.new_key().await.unwrap_err();
        assert_eq!(
            err,
            KeyGenError::Fetch(FetchError::Transport("connection refused".to_string()))
        );
        assert_eq!(generator.buffered().await, 0);
    }

    #[tokio::test]
    async fn short_batch_is_not_buffered() {
        let generator = KeyGenerator::new(2, ShortFetcher).unwrap();

        let err = generator.new_key().await.unwrap_err();
        assert_eq!(
            err,
            KeyGenError::ShortBatch {
                requested: 2,
                received: 1,
            }
        );
        assert_eq!(generator.buffered().await, 0);
    }

    #[tokio::test]
    async fn drained_fake_reports_exhaustion_and_keeps_leftovers() {
        let generator = KeyGenerator::new(2, KeyFetcherFake::new(["a", "b", "c"])).unwrap();

        assert_eq!(generator.new_key().await.unwrap().as_str(), "a");
        assert_eq!(generator.new_key().await.unwrap().as_str(), "b");

        let err = generator.new_key().await.unwrap_err();
        assert!(matches!(err, KeyGenError::Fetch(FetchError::Exhausted(_))));
        assert_eq!(generator.fetcher().remaining(), 1);
        assert_eq!(generator.buffered().await, 0);
    }

    #[tokio::test]
    async fn clones_share_one_buffer() {
        let generator = KeyGenerator::new(2, CountingFetcher::default()).unwrap();
        let clone = generator.clone();

        assert_eq!(generator.new_key().await.unwrap().as_str(), "k0");
        assert_eq!(clone.new_key().await.unwrap().as_str(), "k1");
        assert_eq!(generator.fetcher().fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn generator_is_a_key_source() {
        let source: Arc<dyn KeySource> =
            Arc::new(KeyGenerator::new(1, CountingFetcher::default()).unwrap());

        assert_eq!(source.new_key().await.unwrap().as_str(), "k0");
        assert_eq!(source.new_key().await.unwrap().as_str(), "k1");
    }
}
