//! ASCII conversion
//!
//! Converts raster frames into coloured character grids using luminance-based
//! character mapping. Each cell keeps the averaged colour of the pixels it
//! covers.

use image::imageops::{self, FilterType};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::artwork::{AsciiArtwork, AsciiFrame, Cell};
use crate::color_space::Rgb;
use crate::error::{Error, Result};
use crate::image_loader::RasterImage;

/// Narrowest accepted grid
pub const MIN_WIDTH: usize = 10;
/// Widest accepted grid
pub const MAX_WIDTH: usize = 300;

/// Terminal cells are roughly twice as tall as they are wide
const CHAR_ASPECT: f32 = 0.5;

/// Character ramp, ordered dark to light
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CharacterSet {
    /// Simple 10-character set: " .:-=+*#%@"
    #[default]
    Standard,
    /// Extended 70-character set for more detail
    Extended,
    /// Unicode block elements: " ░▒▓█"
    Blocks,
    /// Thirteen-step ramp: " .,:-+*?&%S#@"
    Classic,
    /// Custom user-defined character set (sorted dark to light)
    Custom(String),
}

impl CharacterSet {
    pub fn name(&self) -> &str {
        match self {
            CharacterSet::Standard => "Standard",
            CharacterSet::Extended => "Extended",
            CharacterSet::Blocks => "Blocks",
            CharacterSet::Classic => "Classic",
            CharacterSet::Custom(_) => "Custom",
        }
    }

    pub fn chars(&self) -> &str {
        match self {
            CharacterSet::Standard => " .:-=+*#%@",
            CharacterSet::Extended => {
                " .'`^\",:;Il!i><~+_-?][}{1)(|/tfjrxnuvczXYUJCLQ0OZmwqpdbkhao*#MW&8%B@$"
            }
            CharacterSet::Blocks => " ░▒▓█",
            CharacterSet::Classic => " .,:-+*?&%S#@",
            CharacterSet::Custom(chars) => chars,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            CharacterSet::Standard => CharacterSet::Extended,
            CharacterSet::Extended => CharacterSet::Blocks,
            CharacterSet::Blocks => CharacterSet::Classic,
            CharacterSet::Classic => CharacterSet::Standard,
            CharacterSet::Custom(_) => CharacterSet::Standard,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            CharacterSet::Standard => CharacterSet::Classic,
            CharacterSet::Extended => CharacterSet::Standard,
            CharacterSet::Blocks => CharacterSet::Extended,
            CharacterSet::Classic => CharacterSet::Blocks,
            CharacterSet::Custom(_) => CharacterSet::Standard,
        }
    }

    /// Ramp usable for conversion: non-empty, no control characters
    fn ramp(&self) -> Result<Vec<char>> {
        let ramp: Vec<char> = self.chars().chars().collect();
        if ramp.is_empty() || ramp.iter().any(|c| c.is_control()) {
            return Err(Error::InvalidInput(format!(
                "character set '{}' is unusable",
                self.chars()
            )));
        }
        Ok(ramp)
    }
}

/// Validate a requested grid width
pub fn validate_width(width: usize) -> Result<usize> {
    if (MIN_WIDTH..=MAX_WIDTH).contains(&width) {
        Ok(width)
    } else {
        Err(Error::InvalidInput(format!(
            "width must be between {MIN_WIDTH} and {MAX_WIDTH}, got {width}"
        )))
    }
}

/// Convert an image to an artwork, one frame per input frame
pub fn convert(
    image: &RasterImage,
    target_width: usize,
    charset: &CharacterSet,
    title: &str,
) -> Result<AsciiArtwork> {
    let width = validate_width(target_width)?;
    let ramp = charset.ramp()?;
    let (img_w, img_h) = image.dimensions();
    let height = grid_height(img_w, img_h, width);

    let frames = image
        .frames()
        .iter()
        .map(|frame| convert_frame(frame, width, height, &ramp))
        .collect::<Result<Vec<_>>>()?;

    AsciiArtwork::new(title, frames)
}

/// Grid height preserving aspect ratio, at least one row
pub(crate) fn grid_height(img_width: u32, img_height: u32, width: usize) -> usize {
    let aspect_ratio = img_width as f32 / img_height as f32;
    let height = ((width as f32 / aspect_ratio) * CHAR_ASPECT).round() as usize;
    height.max(1)
}

fn convert_frame(frame: &RgbaImage, width: usize, height: usize, ramp: &[char]) -> Result<AsciiFrame> {
    // Triangle filtering averages each cell's source block
    let resized = imageops::resize(frame, width as u32, height as u32, FilterType::Triangle);

    let cells = resized
        .pixels()
        .map(|px| {
            let [r, g, b, a] = px.0;
            // Composite over black so transparent areas read as dark
            let alpha = a as u16;
            let blend = |c: u8| ((c as u16 * alpha + 127) / 255) as u8;
            let color = Rgb::new(blend(r), blend(g), blend(b));
            Cell::new(map_luminance_to_char(color.luminance(), ramp), color)
        })
        .collect();

    AsciiFrame::new(width, height, cells)
}

/// Map a luminance value (0.0-1.0) onto a ramp
pub fn map_luminance_to_char(luminance: f32, ramp: &[char]) -> char {
    let last = ramp.len() - 1;
    let index = (luminance.clamp(0.0, 1.0) * last as f32).round() as usize;
    ramp[index.min(last)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient(w: u32, h: u32) -> RasterImage {
        let img = RgbaImage::from_fn(w, h, |x, y| {
            let v = ((x + y) * 255 / (w + h - 2).max(1)) as u8;
            Rgba([v, v / 2, 255 - v, 255])
        });
        RasterImage::still(img).unwrap()
    }

    #[test]
    fn test_charset_cycling() {
        let charset = CharacterSet::Standard;
        assert_eq!(charset.next(), CharacterSet::Extended);
        assert_eq!(charset.prev(), CharacterSet::Classic);
        assert_eq!(CharacterSet::Classic.next(), CharacterSet::Standard);
    }

    #[test]
    fn test_luminance_mapping() {
        let ramp: Vec<char> = CharacterSet::Standard.chars().chars().collect();
        assert_eq!(map_luminance_to_char(0.0, &ramp), ' ');
        assert_eq!(map_luminance_to_char(1.0, &ramp), '@');
        assert_eq!(map_luminance_to_char(7.0, &ramp), '@');
    }

    #[test]
    fn test_width_bounds() {
        assert!(validate_width(MIN_WIDTH).is_ok());
        assert!(validate_width(MAX_WIDTH).is_ok());
        assert!(matches!(validate_width(0), Err(Error::InvalidInput(_))));
        assert!(validate_width(MAX_WIDTH + 1).is_err());
    }

    #[test]
    fn test_dimension_calculation() {
        assert_eq!(grid_height(100, 100, 80), 40);
        assert_eq!(grid_height(200, 100, 40), 10);
        assert_eq!(grid_height(1000, 1, 10), 1);
    }

    #[test]
    fn test_convert_dimensions_and_title() {
        let art = convert(&gradient(64, 32), 40, &CharacterSet::Standard, "sky").unwrap();
        assert_eq!(art.title(), "sky");
        assert_eq!(art.width(), 40);
        assert_eq!(art.height(), 10);
        assert_eq!(art.frame_count(), 1);
    }

    #[test]
    fn test_convert_keeps_average_colour() {
        let img = RgbaImage::from_pixel(20, 20, Rgba([255, 0, 0, 255]));
        let art = convert(&RasterImage::still(img).unwrap(), 10, &CharacterSet::Standard, "r")
            .unwrap();
        assert!(art
            .frame(0)
            .cells()
            .iter()
            .all(|c| c.color.r >= 254 && c.color.g <= 1 && c.color.b <= 1));
    }

    #[test]
    fn test_transparent_reads_as_dark() {
        let img = RgbaImage::from_pixel(20, 20, Rgba([255, 255, 255, 0]));
        let art = convert(&RasterImage::still(img).unwrap(), 10, &CharacterSet::Standard, "t")
            .unwrap();
        assert!(art.frame(0).cells().iter().all(|c| c.ch == ' '));
    }

    #[test]
    fn test_multi_frame_order() {
        let dark = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255]));
        let light = RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255]));
        let raster = RasterImage::new(vec![dark, light]).unwrap();
        let art = convert(&raster, 10, &CharacterSet::Standard, "blink").unwrap();
        assert_eq!(art.frame_count(), 2);
        assert!(art.plain_text(0).chars().all(|c| c == ' ' || c == '\n'));
        assert!(art.plain_text(1).chars().all(|c| c == '@' || c == '\n'));
    }

    #[test]
    fn test_bad_custom_charset() {
        let err = convert(&gradient(8, 8), 10, &CharacterSet::Custom(String::new()), "x");
        assert!(matches!(err, Err(Error::InvalidInput(_))));
    }
}
