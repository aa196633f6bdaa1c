//! Texture sources, decoding and the background loader.

mod decode;
mod error;
mod loader;
mod source;

pub use decode::{LoadedImage, decode_rgba8};
pub use error::AssetError;
pub use loader::{DEFAULT_WORKERS, LoadState, TextureLoadResult, TextureLoader, TextureRequest};
pub use source::{MAX_DOWNLOAD_BYTES, TextureSource};
