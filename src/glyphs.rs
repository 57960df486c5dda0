// Copyright (c) 2026 rezky_nightky

use crate::error::ConfigError;
use crate::runtime::GlyphMode;

/// Characters used for each kind of thing on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyphs {
    pub water: [char; 3],
    pub ground: char,
    pub grass: char,
    pub river: char,
    pub trunk: char,
    pub leaves: char,
    pub mountain: char,
    pub snow: char,
    pub sun: char,
    pub ray: char,
    pub vapor: [char; 3],
    pub cloud: [char; 3],
    pub rain: char,
    pub splash: char,
    pub bar_full: char,
    pub bar_empty: char,
    pub frame: [char; 6],
}

impl Glyphs {
    pub const ASCII: Glyphs = Glyphs {
        water: ['~', '-', '='],
        ground: '.',
        grass: ',',
        river: '~',
        trunk: '|',
        leaves: '@',
        mountain: '^',
        snow: '*',
        sun: 'O',
        ray: '+',
        vapor: ['.', ':', 'o'],
        cloud: ['.', 'o', '@'],
        rain: '|',
        splash: 'o',
        bar_full: '#',
        bar_empty: '-',
        frame: ['+', '+', '+', '+', '-', '|'],
    };

    pub const UNICODE: Glyphs = Glyphs {
        water: ['≈', '∼', '≋'],
        ground: '░',
        grass: '▒',
        river: '≈',
        trunk: '┃',
        leaves: '♣',
        mountain: '▲',
        snow: '△',
        sun: '●',
        ray: '✦',
        vapor: ['·', '∘', '○'],
        cloud: ['░', '▒', '▓'],
        rain: '│',
        splash: '◦',
        bar_full: '█',
        bar_empty: '░',
        frame: ['╭', '╮', '╰', '╯', '─', '│'],
    };

    pub fn for_mode(mode: GlyphMode) -> &'static Glyphs {
        match mode {
            GlyphMode::Ascii => &Self::ASCII,
            GlyphMode::Unicode => &Self::UNICODE,
        }
    }

    /// Pick from a three-step ramp by density in `0..=1`.
    pub fn ramp(ramp: [char; 3], density: f32) -> char {
        if density < 0.34 {
            ramp[0]
        } else if density < 0.67 {
            ramp[1]
        } else {
            ramp[2]
        }
    }
}

pub fn glyph_mode_from_str(value: &str, default_to_ascii: bool) -> Result<GlyphMode, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "auto" => Ok(if default_to_ascii {
            GlyphMode::Ascii
        } else {
            GlyphMode::Unicode
        }),
        "ascii" => Ok(GlyphMode::Ascii),
        "unicode" | "utf8" | "utf-8" => Ok(GlyphMode::Unicode),
        _ => Err(ConfigError::GlyphSet(value.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_follows_locale() {
        assert_eq!(glyph_mode_from_str("auto", true), Ok(GlyphMode::Ascii));
        assert_eq!(glyph_mode_from_str(" AUTO ", false), Ok(GlyphMode::Unicode));
        assert_eq!(glyph_mode_from_str("utf8", true), Ok(GlyphMode::Unicode));
        assert_eq!(
            glyph_mode_from_str("braille", true),
            Err(ConfigError::GlyphSet("braille".to_string()))
        );
    }

    #[test]
    fn ascii_set_is_ascii() {
        let g = Glyphs::ASCII;
        let all = [
            g.ground, g.grass, g.river, g.trunk, g.leaves, g.mountain, g.snow, g.sun, g.ray,
            g.rain, g.splash, g.bar_full, g.bar_empty,
        ];
        assert!(all.iter().all(char::is_ascii));
        assert!(g.frame.iter().chain(&g.water).all(char::is_ascii));
    }

    #[test]
    fn ramp_thresholds() {
        assert_eq!(Glyphs::ramp(['a', 'b', 'c'], 0.0), 'a');
        assert_eq!(Glyphs::ramp(['a', 'b', 'c'], 0.5), 'b');
        assert_eq!(Glyphs::ramp(['a', 'b', 'c'], 1.0), 'c');
    }
}
