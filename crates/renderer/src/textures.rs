use image::imageops::flip_vertical_in_place;

use crate::error::CanvasError;

/// Decoded RGBA8 pixels for one channel, rows ordered bottom-up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl ChannelImage {
    /// Decodes PNG/JPEG/BMP/GIF bytes and flips them so `v = 0` samples the bottom row.
    pub fn decode(channel: usize, bytes: &[u8]) -> Result<Self, CanvasError> {
        let image = image::load_from_memory(bytes).map_err(|err| CanvasError::Texture {
            channel,
            message: err.to_string(),
        })?;
        let mut rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(CanvasError::Texture {
                channel,
                message: "image has zero extent".to_string(),
            });
        }
        flip_vertical_in_place(&mut rgba);
        Ok(Self {
            width,
            height,
            rgba: rgba.into_raw(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut image = RgbaImage::new(width, height);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn decodes_dimensions_and_flips_rows() {
        let decoded = ChannelImage::decode(0, &png_bytes(3, 2)).unwrap();
        assert_eq!((decoded.width, decoded.height), (3, 2));
        assert_eq!(decoded.rgba.len(), 3 * 2 * 4);
        // The red top-left pixel ends up at the start of the last row.
        assert_eq!(&decoded.rgba[12..16], &[255, 0, 0, 255]);
        assert_eq!(&decoded.rgba[0..4], &[0, 0, 0, 0]);
    }

    #[test]
    fn garbage_is_a_texture_error() {
        let err = ChannelImage::decode(2, b"not an image").unwrap_err();
        assert!(matches!(err, CanvasError::Texture { channel: 2, .. }));
    }
}
