// Copyright (c) 2026 rezky_nightky

//! Everything the simulation talks to but does not own. None of these calls
//! can fail back into a tick.

use glam::Vec3;

use crate::cycle::{Phase, Stats};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cue {
    /// Narration played when a phase hands over to the next one.
    Narration(Phase),
    Thunder,
    Chirp,
}

impl Cue {
    pub fn caption(self) -> &'static str {
        match self {
            Cue::Narration(Phase::Evaporation) => "the sun has lifted the water into the sky",
            Cue::Narration(Phase::Condensation) => "the vapor has cooled into clouds",
            Cue::Narration(_) => "",
            Cue::Thunder => "thunder rolls",
            Cue::Chirp => "birds greet the end of the cycle",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ambient {
    Rain,
    Ocean,
}

impl Ambient {
    pub fn label(self) -> &'static str {
        match self {
            Ambient::Rain => "rain",
            Ambient::Ocean => "ocean",
        }
    }
}

pub trait Display {
    fn set_phase_info(&mut self, phase: Phase);
    fn set_progress_percent(&mut self, percent: u8);
    fn set_stats(&mut self, stats: &Stats);
}

pub trait Audio {
    fn play_cue(&mut self, cue: Cue);
    fn play_ambient(&mut self, ambient: Ambient);
    fn stop_ambient(&mut self);
}

pub trait CameraRig {
    fn focus(&mut self, target: Vec3, distance: f32);
    fn change_view(&mut self, index: usize);
    fn view_count(&self) -> usize;
}

pub trait QuizGate {
    fn on_cycle_complete(&mut self);
}

/// The full set of outward calls made by the simulation.
pub trait Collaborators: Display + Audio + CameraRig + QuizGate {}

impl<T: Display + Audio + CameraRig + QuizGate + ?Sized> Collaborators for T {}

/// Swallows every call, for runs where output does not matter.
#[cfg(test)]
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

#[cfg(test)]
impl Display for Silent {
    fn set_phase_info(&mut self, _: Phase) {}
    fn set_progress_percent(&mut self, _: u8) {}
    fn set_stats(&mut self, _: &Stats) {}
}

#[cfg(test)]
impl Audio for Silent {
    fn play_cue(&mut self, _: Cue) {}
    fn play_ambient(&mut self, _: Ambient) {}
    fn stop_ambient(&mut self) {}
}

#[cfg(test)]
impl CameraRig for Silent {
    fn focus(&mut self, _: Vec3, _: f32) {}
    fn change_view(&mut self, _: usize) {}
    fn view_count(&self) -> usize {
        crate::camera::VIEW_COUNT
    }
}

#[cfg(test)]
impl QuizGate for Silent {
    fn on_cycle_complete(&mut self) {}
}
