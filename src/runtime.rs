// Copyright (c) 2026 rezky_nightky

use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlyphMode {
    Ascii,
    Unicode,
}

/// Animation speed multiplier. Always finite and inside `MIN..=MAX`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Speed(f32);

impl Speed {
    pub const MIN: f32 = 0.1;
    pub const MAX: f32 = 5.0;
    pub const ONE: Speed = Speed(1.0);

    pub fn new(v: f32) -> Result<Self, ConfigError> {
        if !v.is_finite() || v <= 0.0 {
            return Err(ConfigError::NonPositiveSpeed(v));
        }
        if !(Self::MIN..=Self::MAX).contains(&v) {
            return Err(ConfigError::OutOfRange {
                name: "--speed",
                value: v as f64,
                min: Self::MIN as f64,
                max: Self::MAX as f64,
            });
        }
        Ok(Self(v))
    }

    /// Keyboard nudges land here; they clamp instead of failing.
    pub fn clamped(v: f32) -> Self {
        if !v.is_finite() {
            return Self::ONE;
        }
        Self(v.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for Speed {
    fn default() -> Self {
        Self::ONE
    }
}
