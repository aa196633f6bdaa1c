//! Asset loading error types.

use std::path::PathBuf;

/// Errors raised while fetching or decoding an image.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// Reading a local file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP request failed or returned an error status.
    #[error("failed to fetch {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    /// Reading the HTTP body failed.
    #[error("failed to read response from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// The payload exceeded the download limit.
    #[error("{origin} is larger than {limit} bytes")]
    TooLarge { origin: String, limit: u64 },

    /// The bytes are not a decodable image.
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// The loader's request queue is full.
    #[error("texture load queue is full")]
    QueueFull,

    /// All loader workers have exited.
    #[error("texture loader has shut down")]
    Disconnected,
}
