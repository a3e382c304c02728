use crate::error::{ConfigError, FetchError};
use crate::fetcher::KeyFetcher;
use crate::key::Key;
use async_trait::async_trait;
use std::time::Duration;
use tonic::transport::{Channel, Endpoint};
use tracing::trace;
use typed_builder::TypedBuilder;
use wormhole_kgs_proto::v1::key_gen_service_client::KeyGenServiceClient;
use wormhole_kgs_proto::v1::FetchKeysRequest;

/// Address of the remote Key Generation Service.
#[derive(Debug, Clone, TypedBuilder)]
pub struct KgsRpcConfig {
    #[builder(setter(into))]
    pub hostname: String,
    pub port: u16,
    /// Deadline attached to every `FetchKeys` call.
    #[builder(default)]
    pub request_timeout: Option<Duration>,
    #[builder(default = Duration::from_secs(5))]
    pub connect_timeout: Duration,
}

impl KgsRpcConfig {
    pub fn uri(&self) -> String {
        format!("http://{}:{}", self.hostname, self.port)
    }
}

/// Fetches key batches from a Key Generation Service over gRPC.
///
/// The channel connects lazily, so constructing the fetcher never touches the
/// network; connection failures surface from the first fetch instead.
#[derive(Debug, Clone)]
pub struct KgsRpcFetcher {
    client: KeyGenServiceClient<Channel>,
}

impl KgsRpcFetcher {
    pub fn new(config: &KgsRpcConfig) -> Result<Self, ConfigError> {
        let uri = config.uri();
        let mut endpoint = Endpoint::from_shared(uri.clone())
            .map_err(|e| ConfigError::InvalidEndpoint(format!("{uri}: {e}")))?
            .connect_timeout(config.connect_timeout);
        if let Some(timeout) = config.request_timeout {
            endpoint = endpoint.timeout(timeout);
        }

        Ok(Self::with_channel(endpoint.connect_lazy()))
    }

    pub fn with_channel(channel: Channel) -> Self {
        Self {
            client: KeyGenServiceClient::new(channel),
        }
    }
}

#[async_trait]
impl KeyFetcher for KgsRpcFetcher {
    async fn fetch_keys(&self, count: usize) -> Result<Vec<Key>, FetchError> {
        let count = u32::try_from(count)
            .map_err(|_| FetchError::Remote(format!("batch size {count} exceeds u32")))?;

        trace!(count, "requesting keys from key generation service");

        // tonic clients are cheap handles over a shared channel
        let mut client = self.client.clone();
        let response = client.fetch_keys(FetchKeysRequest { count }).await?;

        Ok(response.into_inner().keys.into_iter().map(Key::from).collect())
    }
}
