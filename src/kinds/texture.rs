//! Texture content
//!
//! Decodes image files into RGBA8 pixels. Uploading to the GPU is the
//! renderer's job; it listens for reloads and re-uploads from here.

use crate::error::ContentError;
use crate::files::FileSource;
use crate::kind::ResourceKind;
use crate::loadable::Decode;

/// Decoded image data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Tightly packed RGBA8 pixels, row-major
    pub pixels: Vec<u8>,
}

impl Texture {
    /// Decode a texture from encoded bytes (PNG, JPEG)
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes cannot be decoded as an image
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ContentError> {
        let img =
            image::load_from_memory(bytes).map_err(|e| ContentError::DecodeError(e.to_string()))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        Ok(Self {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }

    /// Width over height
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// RGBA value of a pixel, if in bounds
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let p = self.pixels.get(offset..offset + 4)?;
        Some([p[0], p[1], p[2], p[3]])
    }
}

impl Decode for Texture {
    const KIND: ResourceKind = ResourceKind::Texture;

    fn decode(path: &str, files: &dyn FileSource) -> Result<Self, ContentError> {
        let bytes = files.read(path)?;
        Self::from_bytes(&bytes)
            .map_err(|e| ContentError::DecodeError(format!("texture '{path}': {e}")))
    }
}

/// Encode a small solid-color PNG, for tests
#[cfg(test)]
pub(crate) fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(color));
    let mut bytes = std::io::Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
    bytes.into_inner()
}
