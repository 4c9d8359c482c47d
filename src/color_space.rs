//! Colour handling
//!
//! Cell colours, luminance, and quantisation down to whatever the terminal
//! can actually display.

use ratatui::style::Color;

use crate::terminal_capabilities::ColorSupport;

/// 24-bit colour of one artwork cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `RRGGBB`, upper case, no prefix
    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Parse exactly six hex digits
    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    /// Perceptual luminance in 0.0..=1.0
    pub fn luminance(self) -> f32 {
        rgb_to_luminance(self.r, self.g, self.b)
    }
}

/// Convert RGB to perceptual luminance (0.0 to 1.0)
///
/// Uses ITU-R BT.709 coefficients.
pub fn rgb_to_luminance(r: u8, g: u8, b: u8) -> f32 {
    0.2126 * (r as f32 / 255.0) + 0.7152 * (g as f32 / 255.0) + 0.0722 * (b as f32 / 255.0)
}

/// Quantize RGB to the ANSI 256-color palette
pub fn quantize_to_ansi256(rgb: Rgb) -> u8 {
    let avg = ((rgb.r as u16 + rgb.g as u16 + rgb.b as u16) / 3) as u8;
    let spread = [rgb.r, rgb.g, rgb.b]
        .iter()
        .map(|c| (*c as i16 - avg as i16).abs())
        .max()
        .unwrap_or(0);

    // Near-gray: 24-step grayscale ramp (232-255)
    if spread < 10 {
        let gray_index = (avg as f32 / 255.0 * 23.0).round() as u8;
        return 232 + gray_index;
    }

    // 6x6x6 color cube (16-231)
    let level = |c: u8| (c as f32 / 255.0 * 5.0).round() as u8;
    16 + 36 * level(rgb.r) + 6 * level(rgb.g) + level(rgb.b)
}

/// Quantize RGB to the 16 basic ANSI colors (0-7 normal, 8-15 bright)
pub fn quantize_to_ansi16(rgb: Rgb) -> u8 {
    let luminance = rgb.luminance();

    let r = rgb.r as f32 / 255.0;
    let g = rgb.g as f32 / 255.0;
    let b = rgb.b as f32 / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let saturation = if max > 0.0 { (max - min) / max } else { 0.0 };

    if saturation < 0.2 {
        return if luminance > 0.7 {
            15
        } else if luminance > 0.3 {
            7
        } else {
            0
        };
    }

    let base = if r >= g && r >= b {
        if g > b {
            3
        } else {
            1
        }
    } else if g >= r && g >= b {
        if b > r {
            6
        } else {
            2
        }
    } else if r > g {
        5
    } else {
        4
    };

    if luminance > 0.5 {
        base + 8
    } else {
        base
    }
}

/// Foreground colour for a cell, reduced to the terminal's colour support
pub fn to_terminal_color(rgb: Rgb, support: ColorSupport) -> Option<Color> {
    match support {
        ColorSupport::NoColor => None,
        ColorSupport::Color16 => Some(ansi16_color(quantize_to_ansi16(rgb))),
        ColorSupport::Color256 => Some(Color::Indexed(quantize_to_ansi256(rgb))),
        ColorSupport::TrueColor => Some(Color::Rgb(rgb.r, rgb.g, rgb.b)),
    }
}

fn ansi16_color(index: u8) -> Color {
    match index {
        0 => Color::Black,
        1 => Color::Red,
        2 => Color::Green,
        3 => Color::Yellow,
        4 => Color::Blue,
        5 => Color::Magenta,
        6 => Color::Cyan,
        7 => Color::Gray,
        8 => Color::DarkGray,
        9 => Color::LightRed,
        10 => Color::LightGreen,
        11 => Color::LightYellow,
        12 => Color::LightBlue,
        13 => Color::LightMagenta,
        14 => Color::LightCyan,
        _ => Color::White,
    }
}

/// ANSI TrueColor foreground escape
pub fn rgb_to_ansi_fg(rgb: Rgb) -> String {
    format!("\x1b[38;2;{};{};{}m", rgb.r, rgb.g, rgb.b)
}

pub const ANSI_RESET: &str = "\x1b[0m";
