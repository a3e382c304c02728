//! Client-side unique key allocation for the Wormhole URL shortener.
//!
//! A [`KeyGenerator`] hands out globally unique keys (short-link aliases,
//! change-log IDs, request trace IDs) to concurrent callers. Keys are minted
//! by a remote Key Generation Service and fetched in batches through a
//! [`KeyFetcher`], so most draws never touch the network.
//!
//! ```rust
//! use wormhole_keygen::{KeyFetcherFake, KeyGenerator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = KeyFetcherFake::new(["a1", "b2"]);
//! let generator = KeyGenerator::new(2, fetcher)?;
//!
//! assert_eq!(generator.new_key().await?.as_str(), "a1");
//! assert_eq!(generator.new_key().await?.as_str(), "b2");
//! # Ok(())
//! # }
//! ```

pub mod buffer;
pub mod error;
pub mod fetcher;
pub mod generator;
pub mod key;

pub use buffer::KeyBuffer;
pub use error::{BufferError, ConfigError, FetchError, KeyGenError};
pub use fetcher::fake::KeyFetcherFake;
pub use fetcher::rpc::{KgsRpcConfig, KgsRpcFetcher};
pub use fetcher::KeyFetcher;
pub use generator::{buffer_size_from, KeyGenerator, KeyGeneratorSettings, KeySource};
pub use key::Key;
