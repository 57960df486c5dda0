// Copyright (c) 2026 rezky_nightky

use crate::collab::Display;
use crate::cycle::{Phase, Stats};

pub struct PhaseInfo {
    pub title: &'static str,
    pub text: &'static str,
}

pub fn phase_info(phase: Phase) -> PhaseInfo {
    match phase {
        Phase::Idle => PhaseInfo {
            title: "The Water Cycle",
            text: "Press Space to watch water travel from the sea to the sky and back again.",
        },
        Phase::Evaporation => PhaseInfo {
            title: "Evaporation",
            text: "Heat from the sun turns sea water into vapor. The light vapor rises \
                   towards the atmosphere. This is the first stage of the water cycle.",
        },
        Phase::Condensation => PhaseInfo {
            title: "Condensation",
            text: "High in the atmosphere the vapor cools down. Cooling turns it into tiny \
                   droplets that gather into white clouds.",
        },
        Phase::Precipitation => PhaseInfo {
            title: "Precipitation",
            text: "The clouds grow heavy with droplets. When they cannot hold any more, \
                   the water falls back to earth as rain.",
        },
        Phase::Collection => PhaseInfo {
            title: "Collection",
            text: "Rain gathers in the sea, in rivers and in the soil, ready to evaporate \
                   again. The cycle repeats without end.",
        },
    }
}

/// Latest values pushed by the simulation, read back by the renderer.
#[derive(Clone, Debug)]
pub struct Hud {
    phase: Phase,
    percent: u8,
    stats: Stats,
}

impl Default for Hud {
    fn default() -> Self {
        Self::new()
    }
}

impl Hud {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            percent: 0,
            stats: Stats::default(),
        }
    }

    pub fn info(&self) -> PhaseInfo {
        phase_info(self.phase)
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    /// `width` columns of bar glyphs, filled in proportion to the progress.
    pub fn progress_bar(&self, width: usize, full: char, empty: char) -> String {
        let filled = (width * self.percent.min(100) as usize + 50) / 100;
        std::iter::repeat(full)
            .take(filled)
            .chain(std::iter::repeat(empty).take(width - filled))
            .collect()
    }

    pub fn stat_lines(&self) -> [(&'static str, String); 4] {
        [
            ("Vapor", self.stats.vapor.to_string()),
            ("Cloud", self.stats.cloud.to_string()),
            ("Rain", self.stats.rain.to_string()),
            ("Cycles", self.stats.cycle.to_string()),
        ]
    }
}

impl Display for Hud {
    fn set_phase_info(&mut self, phase: Phase) {
        self.phase = phase;
    }

    fn set_progress_percent(&mut self, percent: u8) {
        self.percent = percent.min(100);
    }

    fn set_stats(&mut self, stats: &Stats) {
        self.stats = *stats;
    }
}

/// Greedy word wrap into lines of at most `width` characters.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let need = if line.is_empty() {
            word.chars().count()
        } else {
            line.chars().count() + 1 + word.chars().count()
        };
        if need > width && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}
