//! Terminal capability detection
//!
//! The gallery paints every cell with its own colour, so we need to know how
//! many colours the terminal can show before picking a palette.

use std::env;

/// Level of color support in the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSupport {
    NoColor,
    Color16,
    Color256,
    #[default]
    TrueColor,
}

impl ColorSupport {
    pub fn name(&self) -> &'static str {
        match self {
            ColorSupport::NoColor => "None",
            ColorSupport::Color16 => "16 Colors",
            ColorSupport::Color256 => "256 Colors",
            ColorSupport::TrueColor => "True Color",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TerminalCapabilities {
    pub color_support: ColorSupport,
}

impl Default for TerminalCapabilities {
    fn default() -> Self {
        Self {
            color_support: ColorSupport::TrueColor,
        }
    }
}

/// Detect terminal capabilities from the environment
pub fn detect_capabilities() -> TerminalCapabilities {
    TerminalCapabilities {
        color_support: color_support_from_env(|key| env::var(key).ok()),
    }
}

/// Work out colour support from environment variables.
///
/// `lookup` is injected so tests don't have to mutate the process env.
pub fn color_support_from_env(lookup: impl Fn(&str) -> Option<String>) -> ColorSupport {
    if lookup("NO_COLOR").is_some() {
        return ColorSupport::NoColor;
    }

    let colorterm = lookup("COLORTERM").map(|v| v.to_lowercase());
    if let Some(ref ct) = colorterm {
        if ct.contains("truecolor") || ct.contains("24bit") {
            return ColorSupport::TrueColor;
        }
    }

    if let Some(term) = lookup("TERM").map(|v| v.to_lowercase()) {
        if term.contains("kitty")
            || term.contains("alacritty")
            || term.contains("iterm")
            || term.contains("vte")
            || term.contains("256color")
        {
            if colorterm.is_some() {
                return ColorSupport::TrueColor;
            }
            return ColorSupport::Color256;
        }
        if term.contains("xterm") {
            return ColorSupport::Color16;
        }
        if term.contains("screen") || term.contains("tmux") {
            return ColorSupport::Color256;
        }
        if term.contains("linux") || term.contains("console") {
            return ColorSupport::Color16;
        }
        if term == "dumb" {
            return ColorSupport::NoColor;
        }
    }

    // Windows Terminal
    if lookup("WT_SESSION").is_some() {
        return ColorSupport::TrueColor;
    }

    ColorSupport::Color256
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_no_color_wins() {
        let env = env_of(&[("NO_COLOR", "1"), ("COLORTERM", "truecolor")]);
        assert_eq!(color_support_from_env(env), ColorSupport::NoColor);
    }

    #[test]
    fn test_truecolor_from_colorterm() {
        let env = env_of(&[("COLORTERM", "24bit"), ("TERM", "xterm")]);
        assert_eq!(color_support_from_env(env), ColorSupport::TrueColor);
    }

    #[test]
    fn test_term_fallbacks() {
        assert_eq!(
            color_support_from_env(env_of(&[("TERM", "xterm-256color")])),
            ColorSupport::Color256
        );
        assert_eq!(
            color_support_from_env(env_of(&[("TERM", "linux")])),
            ColorSupport::Color16
        );
        assert_eq!(color_support_from_env(env_of(&[])), ColorSupport::Color256);
    }

    #[test]
    fn test_capabilities_default() {
        let caps = TerminalCapabilities::default();
        assert_eq!(caps.color_support, ColorSupport::TrueColor);
    }
}
