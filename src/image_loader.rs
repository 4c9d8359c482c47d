//! Image decoding
//!
//! Turns downloaded bytes (or a local file) into a [`RasterImage`]: one RGBA
//! frame for still images, every composited frame for animated GIFs.

use std::io::Cursor;
use std::path::Path;

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, ImageFormat, RgbaImage};
use tracing::debug;

use crate::error::{Error, Result};

/// Decoded raster input for the converter
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    frames: Vec<RgbaImage>,
}

impl RasterImage {
    /// All frames must share the same canvas size
    pub fn new(frames: Vec<RgbaImage>) -> Result<Self> {
        let first = frames
            .first()
            .ok_or_else(|| Error::Decode("image has no frames".into()))?;
        let dims = first.dimensions();
        if dims.0 == 0 || dims.1 == 0 {
            return Err(Error::Decode("image has zero size".into()));
        }
        if frames.iter().any(|f| f.dimensions() != dims) {
            return Err(Error::Decode("frames differ in size".into()));
        }
        Ok(Self { frames })
    }

    pub fn still(image: RgbaImage) -> Result<Self> {
        Self::new(vec![image])
    }

    pub fn frames(&self) -> &[RgbaImage] {
        &self.frames
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.frames[0].dimensions()
    }
}

/// Decode image bytes, keeping every frame of an animated GIF
pub fn decode(bytes: &[u8]) -> Result<RasterImage> {
    let format = image::guess_format(bytes)?;

    if format == ImageFormat::Gif {
        let decoder = GifDecoder::new(Cursor::new(bytes))?;
        let frames = decoder
            .into_frames()
            .map(|frame| frame.map(|f| f.into_buffer()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        debug!(frames = frames.len(), "decoded gif");
        return RasterImage::new(frames);
    }

    let img = image::load_from_memory_with_format(bytes, format)?;
    RasterImage::still(img.to_rgba8())
}

/// Load a local image file. Only the extensions in
/// [`supported_extensions`] are read.
pub fn load_path(path: &Path) -> Result<RasterImage> {
    if !is_supported_format(path) {
        return Err(Error::InvalidInput(format!(
            "{} is not one of: {}",
            path.display(),
            supported_extensions().join(", ")
        )));
    }
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}

/// Get supported image format extensions
pub fn supported_extensions() -> &'static [&'static str] {
    &["png", "jpg", "jpeg", "gif", "webp"]
}

/// Check if a file extension is a supported image format
pub fn is_supported_format(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext_lower = ext.to_lowercase();
            supported_extensions().iter().any(|&e| e == ext_lower)
        })
        .unwrap_or(false)
}
