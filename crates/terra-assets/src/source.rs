//! Where an image comes from, and how its bytes are fetched.

use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AssetError;

/// Largest payload accepted from a single source.
pub const MAX_DOWNLOAD_BYTES: u64 = 64 * 1024 * 1024;

/// A location an image can be read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureSource {
    /// An `http://` or `https://` URL.
    Url(String),
    /// A local file.
    File(PathBuf),
}

impl TextureSource {
    /// Interpret a config string. Anything with an http(s) scheme is a URL,
    /// everything else a filesystem path.
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::File(PathBuf::from(trimmed))
        }
    }

    /// Final path segment, used in log lines.
    pub fn file_name(&self) -> &str {
        match self {
            Self::Url(url) => url
                .split(['?', '#'])
                .next()
                .and_then(|path| path.rsplit('/').next())
                .filter(|name| !name.is_empty())
                .unwrap_or(url),
            Self::File(path) => path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default(),
        }
    }

    /// Read the raw bytes. Blocks; call from a worker thread.
    pub fn fetch(&self, timeout: Duration) -> Result<Vec<u8>, AssetError> {
        match self {
            Self::Url(url) => fetch_url(url, timeout),
            Self::File(path) => {
                let len = std::fs::metadata(path)
                    .map_err(|source| AssetError::Io {
                        path: path.clone(),
                        source,
                    })?
                    .len();
                if len > MAX_DOWNLOAD_BYTES {
                    return Err(AssetError::TooLarge {
                        origin: path.display().to_string(),
                        limit: MAX_DOWNLOAD_BYTES,
                    });
                }
                std::fs::read(path).map_err(|source| AssetError::Io {
                    path: path.clone(),
                    source,
                })
            }
        }
    }
}

impl std::fmt::Display for TextureSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

fn fetch_url(url: &str, timeout: Duration) -> Result<Vec<u8>, AssetError> {
    let agent = ureq::AgentBuilder::new().timeout(timeout).build();
    let response = agent.get(url).call().map_err(|source| AssetError::Http {
        url: url.to_string(),
        source: Box::new(source),
    })?;

    let mut bytes = Vec::new();
    response
        .into_reader()
        .take(MAX_DOWNLOAD_BYTES + 1)
        .read_to_end(&mut bytes)
        .map_err(|source| AssetError::Body {
            url: url.to_string(),
            source,
        })?;

    if bytes.len() as u64 > MAX_DOWNLOAD_BYTES {
        return Err(AssetError::TooLarge {
            origin: url.to_string(),
            limit: MAX_DOWNLOAD_BYTES,
        });
    }
    Ok(bytes)
}
