// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::runtime::ColorMode;

/// Every colour the scene and its overlays use, named by what it paints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tone {
    Sky,
    Horizon,
    Ocean,
    Foam,
    Ground,
    Grass,
    River,
    Trunk,
    Leaves,
    Mountain,
    Snow,
    Sun,
    Ray,
    Vapor,
    Cloud,
    Rain,
    Splash,
    Text,
    Dim,
    Accent,
    Good,
    Bad,
    Panel,
}

impl Tone {
    fn rgb(self) -> (u8, u8, u8) {
        match self {
            Tone::Sky => (135, 206, 235),
            Tone::Horizon => (200, 230, 245),
            Tone::Ocean => (0, 105, 148),
            Tone::Foam => (150, 210, 230),
            Tone::Ground => (139, 115, 85),
            Tone::Grass => (90, 140, 60),
            Tone::River => (65, 150, 210),
            Tone::Trunk => (101, 67, 33),
            Tone::Leaves => (34, 139, 34),
            Tone::Mountain => (110, 100, 90),
            Tone::Snow => (245, 245, 250),
            Tone::Sun => (255, 215, 0),
            Tone::Ray => (255, 170, 40),
            Tone::Vapor => (230, 240, 255),
            Tone::Cloud => (250, 250, 250),
            Tone::Rain => (70, 130, 220),
            Tone::Splash => (160, 200, 255),
            Tone::Text => (235, 235, 235),
            Tone::Dim => (150, 150, 160),
            Tone::Accent => (80, 200, 255),
            Tone::Good => (90, 220, 120),
            Tone::Bad => (240, 90, 80),
            Tone::Panel => (20, 30, 45),
        }
    }
}

fn dist2(a: (u8, u8, u8), b: (u8, u8, u8)) -> i32 {
    let dr = a.0 as i32 - b.0 as i32;
    let dg = a.1 as i32 - b.1 as i32;
    let db = a.2 as i32 - b.2 as i32;
    dr * dr + dg * dg + db * db
}

fn rgb_to_ansi256((r, g, b): (u8, u8, u8)) -> u8 {
    const LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let step = |v: u8| ((v as u16 * 5 + 127) / 255) as u8;
    let (r6, g6, b6) = (step(r), step(g), step(b));
    let cube = (LEVELS[r6 as usize], LEVELS[g6 as usize], LEVELS[b6 as usize]);
    let cube_idx = 16 + 36 * r6 + 6 * g6 + b6;

    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    let (gray_idx, gray) = match avg {
        0..=7 => (16, (0, 0, 0)),
        239..=255 => (231, (255, 255, 255)),
        _ => {
            let i = (avg - 8) / 10;
            let v = 8 + 10 * i;
            (232 + i, (v, v, v))
        }
    };

    if dist2((r, g, b), gray) < dist2((r, g, b), cube) {
        gray_idx
    } else {
        cube_idx
    }
}

fn rgb_to_color16(rgb: (u8, u8, u8)) -> Color {
    const TABLE: [(Color, (u8, u8, u8)); 16] = [
        (Color::Black, (0, 0, 0)),
        (Color::DarkGrey, (128, 128, 128)),
        (Color::Grey, (192, 192, 192)),
        (Color::White, (255, 255, 255)),
        (Color::DarkRed, (128, 0, 0)),
        (Color::Red, (255, 0, 0)),
        (Color::DarkGreen, (0, 128, 0)),
        (Color::Green, (0, 255, 0)),
        (Color::DarkBlue, (0, 0, 128)),
        (Color::Blue, (0, 0, 255)),
        (Color::DarkCyan, (0, 128, 128)),
        (Color::Cyan, (0, 255, 255)),
        (Color::DarkMagenta, (128, 0, 128)),
        (Color::Magenta, (255, 0, 255)),
        (Color::DarkYellow, (128, 128, 0)),
        (Color::Yellow, (255, 255, 0)),
    ];

    TABLE
        .iter()
        .min_by_key(|(_, c)| dist2(rgb, *c))
        .map(|(c, _)| *c)
        .unwrap_or(Color::White)
}

fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    let a = a as f32;
    let b = b as f32;
    (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
}

fn mix(a: (u8, u8, u8), b: (u8, u8, u8), t: f32) -> (u8, u8, u8) {
    (lerp_u8(a.0, b.0, t), lerp_u8(a.1, b.1, t), lerp_u8(a.2, b.2, t))
}

/// Scale a base colour by a light level. Below 1 it darkens towards black,
/// above 1 it washes out towards white (glow and lightning).
pub fn lit(rgb: (u8, u8, u8), light: f32) -> (u8, u8, u8) {
    let light = if light.is_finite() { light.max(0.0) } else { 1.0 };
    if light <= 1.0 {
        mix((0, 0, 0), rgb, light)
    } else {
        mix(rgb, (255, 255, 255), ((light - 1.0) * 0.5).min(1.0))
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ScenePalette {
    mode: ColorMode,
}

impl ScenePalette {
    pub fn new(mode: ColorMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    pub fn color(&self, tone: Tone, light: f32) -> Option<Color> {
        self.encode(lit(tone.rgb(), light))
    }

    /// Vertical sky gradient; `t` is 0 at the top row and 1 at the horizon.
    pub fn sky(&self, t: f32, light: f32) -> Option<Color> {
        let rgb = mix(Tone::Sky.rgb(), Tone::Horizon.rgb(), t.clamp(0.0, 1.0));
        self.encode(lit(rgb, light))
    }

    fn encode(&self, (r, g, b): (u8, u8, u8)) -> Option<Color> {
        match self.mode {
            ColorMode::Mono => None,
            ColorMode::TrueColor => Some(Color::Rgb { r, g, b }),
            ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256((r, g, b)))),
            ColorMode::Color16 => Some(rgb_to_color16((r, g, b))),
        }
    }

    /// Whether filled backgrounds are worth drawing. Sixteen colours and
    /// mono leave the terminal background alone.
    pub fn paints_background(&self) -> bool {
        matches!(self.mode, ColorMode::TrueColor | ColorMode::Color256)
    }
}
