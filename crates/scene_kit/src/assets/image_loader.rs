//! Image loading utilities for texture data
//!
//! Decodes PNG and JPEG files into RGBA8 buffers ready for upload. Used for
//! static textures and for frames of image-sequence video sources.

use std::path::Path;

use crate::assets::AssetError;

/// Loaded image data ready for GPU upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Raw RGBA pixel data
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl ImageData {
    /// Load an image from a file path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let path_ref = path.as_ref();

        log::debug!("Loading image from: {:?}", path_ref);

        let img = image::open(path_ref).map_err(|e| AssetError::LoadFailed {
            path: path_ref.display().to_string(),
            reason: e.to_string(),
        })?;

        let rgba_img = img.to_rgba8();
        let (width, height) = rgba_img.dimensions();

        log::debug!("Loaded image {}x{} from {:?}", width, height, path_ref);

        Ok(Self {
            data: rgba_img.into_raw(),
            width,
            height,
        })
    }

    /// Load image from memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AssetError> {
        let img = image::load_from_memory(bytes).map_err(|e| AssetError::LoadFailed {
            path: "<memory>".to_string(),
            reason: e.to_string(),
        })?;

        let rgba_img = img.to_rgba8();
        let (width, height) = rgba_img.dimensions();

        Ok(Self {
            data: rgba_img.into_raw(),
            width,
            height,
        })
    }

    /// Create a solid color image
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = (width * height) as usize;
        let data = color.iter().copied().cycle().take(pixel_count * 4).collect();

        Self { data, width, height }
    }

    /// Get the size of the image data in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer length matches the dimensions
    pub fn is_consistent(&self) -> bool {
        self.data.len() == self.width as usize * self.height as usize * 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_color_image() {
        let img = ImageData::solid_color(4, 4, [255, 0, 0, 255]);
        assert_eq!(img.width, 4);
        assert_eq!(img.height, 4);
        assert_eq!(img.size_bytes(), 4 * 4 * 4);
        assert!(img.is_consistent());

        assert_eq!(&img.data[0..4], &[255, 0, 0, 255]);
        assert_eq!(&img.data[60..64], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_png_round_trip_from_memory() {
        let mut encoded = Vec::new();
        let source = image::RgbaImage::from_pixel(2, 3, image::Rgba([10, 20, 30, 255]));
        source
            .write_to(&mut std::io::Cursor::new(&mut encoded), image::ImageFormat::Png)
            .unwrap();

        let decoded = ImageData::from_bytes(&encoded).unwrap();
        assert_eq!((decoded.width, decoded.height), (2, 3));
        assert_eq!(&decoded.data[0..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_garbage_bytes_fail() {
        assert!(matches!(
            ImageData::from_bytes(b"not an image"),
            Err(AssetError::LoadFailed { .. })
        ));
    }
}
