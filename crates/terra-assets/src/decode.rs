//! Image decoding into tightly packed RGBA8.

use crate::error::AssetError;

/// A decoded image ready for texture upload.
#[derive(Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    /// `width * height * 4` bytes, row-major, top row first.
    pub rgba: Vec<u8>,
}

impl std::fmt::Debug for LoadedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

/// Decode PNG or JPEG bytes, expanding to four channels.
pub fn decode_rgba8(bytes: &[u8]) -> Result<LoadedImage, AssetError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(LoadedImage {
        width,
        height,
        rgba: rgba.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode_png(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba(pixel));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_png() {
        let bytes = encode_png(3, 2, [10, 20, 30, 128]);
        let img = decode_rgba8(&bytes).unwrap();
        assert_eq!((img.width, img.height), (3, 2));
        assert_eq!(img.rgba.len(), 3 * 2 * 4);
        assert_eq!(&img.rgba[..4], &[10, 20, 30, 128]);
    }

    #[test]
    fn test_decode_rgb_jpeg_gains_opaque_alpha() {
        let img = image::RgbImage::from_pixel(8, 8, image::Rgb([200, 200, 200]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Jpeg)
            .unwrap();

        let decoded = decode_rgba8(&bytes).unwrap();
        assert_eq!((decoded.width, decoded.height), (8, 8));
        assert!(decoded.rgba.chunks_exact(4).all(|px| px[3] == 255));
    }

    #[test]
    fn test_decode_garbage_fails() {
        let err = decode_rgba8(b"definitely not an image").unwrap_err();
        assert!(matches!(err, AssetError::Decode(_)));
    }
}
