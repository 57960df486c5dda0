// Copyright (c) 2026 rezky_nightky

use thiserror::Error;

/// Rejected user input. Raised at the option/keyboard boundary so that the
/// simulation core only ever sees valid values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("failed to apply --speed {0} (must be a finite number greater than 0)")]
    NonPositiveSpeed(f32),

    #[error("failed to apply {name} {value} (min {min} max {max})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("view index {index} is out of range (available views: 0..{count})")]
    ViewOutOfRange { index: usize, count: usize },

    #[error("invalid highlight: {0} (see --list-legend)")]
    UnknownHighlight(String),

    #[error("invalid --colormode: {0} (allowed: 0,16,8,24)")]
    ColorMode(u16),

    #[error("invalid --glyphs: {0} (allowed: auto, ascii, unicode)")]
    GlyphSet(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let e = ConfigError::ViewOutOfRange { index: 7, count: 5 };
        assert_eq!(
            e.to_string(),
            "view index 7 is out of range (available views: 0..5)"
        );
        let e = ConfigError::OutOfRange {
            name: "--fps",
            value: 500.0,
            min: 1.0,
            max: 240.0,
        };
        assert_eq!(e.to_string(), "failed to apply --fps 500 (min 1 max 240)");
    }
}
