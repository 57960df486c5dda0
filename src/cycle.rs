// Copyright (c) 2026 rezky_nightky

use crate::runtime::Speed;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    Evaporation,
    Condensation,
    Precipitation,
    Collection,
}

impl Phase {
    /// Progress a phase must accumulate before it hands over to the next one.
    pub fn threshold(self) -> Option<f32> {
        match self {
            Phase::Idle => None,
            Phase::Evaporation => Some(200.0),
            Phase::Condensation => Some(150.0),
            Phase::Precipitation => Some(300.0),
            Phase::Collection => Some(100.0),
        }
    }

    pub fn next(self) -> Phase {
        match self {
            Phase::Idle | Phase::Collection => Phase::Evaporation,
            Phase::Evaporation => Phase::Condensation,
            Phase::Condensation => Phase::Precipitation,
            Phase::Precipitation => Phase::Collection,
        }
    }

    pub fn progress_percent(self) -> u8 {
        match self {
            Phase::Idle => 0,
            Phase::Evaporation => 25,
            Phase::Condensation => 50,
            Phase::Precipitation => 75,
            Phase::Collection => 100,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Evaporation => "evaporation",
            Phase::Condensation => "condensation",
            Phase::Precipitation => "precipitation",
            Phase::Collection => "collection",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub vapor: usize,
    pub cloud: usize,
    pub rain: usize,
    pub cycle: u32,
}

#[derive(Clone, Debug)]
pub struct CycleState {
    pub phase: Phase,
    /// Accumulates `speed` per running tick; zeroed on every phase entry.
    pub progress: f32,
    pub speed: Speed,
    pub running: bool,
    pub cycle_count: u32,
    pub stats: Stats,
}

impl CycleState {
    pub fn new(speed: Speed) -> Self {
        Self {
            phase: Phase::Idle,
            progress: 0.0,
            speed,
            running: false,
            cycle_count: 0,
            stats: Stats::default(),
        }
    }

    pub fn accumulate(&mut self) {
        self.progress += self.speed.get();
    }

    /// The phase to enter now, if the current one has run its course.
    pub fn transition_due(&self) -> Option<Phase> {
        let limit = self.phase.threshold()?;
        (self.progress >= limit).then(|| self.phase.next())
    }

    pub fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        self.progress = 0.0;
    }

    /// Back to Idle. Speed is a user preference and survives.
    pub fn reset(&mut self) {
        self.enter(Phase::Idle);
        self.running = false;
        self.cycle_count = 0;
        self.stats = Stats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_loop_without_skipping() {
        let mut p = Phase::Idle;
        let mut seen = Vec::new();
        for _ in 0..6 {
            p = p.next();
            seen.push(p);
        }
        assert_eq!(
            seen,
            vec![
                Phase::Evaporation,
                Phase::Condensation,
                Phase::Precipitation,
                Phase::Collection,
                Phase::Evaporation,
                Phase::Condensation,
            ]
        );
    }

    #[test]
    fn full_loop_threshold_sum_is_750() {
        let total: f32 = [
            Phase::Evaporation,
            Phase::Condensation,
            Phase::Precipitation,
            Phase::Collection,
        ]
        .iter()
        .filter_map(|p| p.threshold())
        .sum();
        assert_eq!(total, 750.0);
        assert_eq!(Phase::Idle.threshold(), None);
    }

    #[test]
    fn transition_is_due_once_threshold_is_reached() {
        let mut s = CycleState::new(Speed::ONE);
        s.enter(Phase::Collection);
        for _ in 0..99 {
            s.accumulate();
            assert_eq!(s.transition_due(), None);
        }
        s.accumulate();
        assert_eq!(s.transition_due(), Some(Phase::Evaporation));
    }

    #[test]
    fn idle_never_transitions_on_its_own() {
        let mut s = CycleState::new(Speed::ONE);
        s.progress = 10_000.0;
        assert_eq!(s.transition_due(), None);
    }

    #[test]
    fn reset_keeps_speed() {
        let mut s = CycleState::new(Speed::new(2.0).unwrap());
        s.enter(Phase::Precipitation);
        s.running = true;
        s.cycle_count = 3;
        s.progress = 12.0;
        s.reset();
        assert_eq!(s.phase, Phase::Idle);
        assert_eq!(s.progress, 0.0);
        assert!(!s.running);
        assert_eq!(s.cycle_count, 0);
        assert_eq!(s.speed.get(), 2.0);
    }
}
