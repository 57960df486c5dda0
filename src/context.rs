// Copyright (c) 2026 rezky_nightky

//! The simulation as one owned value.
//!
//! [`SimulationContext`] holds every piece of mutable state: the cycle, the
//! pools, the landscape, the lights, the highlight and the deferred-effect
//! scheduler. The driver owns it and calls [`SimulationContext::tick`] once
//! per frame; user controls are plain methods on it.
//!
//! One tick always runs in this order:
//! environment, deferred effects, highlight or idle motion, phase updaters,
//! transition check, display refresh.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace, warn};

use crate::collab::{Ambient, Collaborators, Cue};
use crate::cycle::{CycleState, Phase, Stats};
use crate::error::ConfigError;
use crate::highlight::{HighlightController, HighlightKind};
use crate::kinematics::{
    idle_cloud, idle_rain, idle_vapor, release_point, staggered_due, step_cloud, step_rain,
    step_splash, step_vapor,
};
use crate::particle::{PoolKind, Pools};
use crate::runtime::Speed;
use crate::scene::{Landscape, Lighting};
use crate::scheduler::{Scheduler, TaskId};

pub const LIGHTNING_FLASH: Duration = Duration::from_millis(200);
pub const THUNDER_CHANCE: f32 = 0.02;

/// Ticks of progress between two vapor motes waking up, per unit of speed.
const VAPOR_STAGGER: f32 = 1.5;
const RAIN_STAGGER: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Deferred {
    RestoreLight,
}

#[derive(Clone, Copy, Debug)]
pub struct SimConfig {
    pub speed: Speed,
    pub seed: Option<u64>,
    pub splash: bool,
    /// Per-tick probability of a lightning strike while it rains.
    pub thunder_chance: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            speed: Speed::ONE,
            seed: None,
            splash: false,
            thunder_chance: THUNDER_CHANCE,
        }
    }
}

pub struct SimulationContext {
    cycle: CycleState,
    pools: Pools,
    landscape: Landscape,
    lighting: Lighting,
    highlight: HighlightController,
    scheduler: Scheduler<Deferred>,
    light_restore: Option<TaskId>,
    rng: StdRng,
    clock: Duration,
    splash: bool,
    thunder_chance: f32,
}

impl SimulationContext {
    pub fn new(config: SimConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let pools = Pools::new(&mut rng);
        Self {
            cycle: CycleState::new(config.speed),
            pools,
            landscape: Landscape::new(),
            lighting: Lighting::default(),
            highlight: HighlightController::new(),
            scheduler: Scheduler::new(),
            light_restore: None,
            rng,
            clock: Duration::ZERO,
            splash: config.splash,
            thunder_chance: config.thunder_chance.clamp(0.0, 1.0),
        }
    }

    #[cfg(test)]
    pub fn phase(&self) -> Phase {
        self.cycle.phase
    }

    #[cfg(test)]
    pub fn progress(&self) -> f32 {
        self.cycle.progress
    }

    pub fn is_running(&self) -> bool {
        self.cycle.running
    }

    pub fn cycle_count(&self) -> u32 {
        self.cycle.cycle_count
    }

    pub fn speed(&self) -> Speed {
        self.cycle.speed
    }

    pub fn pools(&self) -> &Pools {
        &self.pools
    }

    pub fn landscape(&self) -> &Landscape {
        &self.landscape
    }

    pub fn lighting(&self) -> Lighting {
        self.lighting
    }

    pub fn highlight(&self) -> Option<HighlightKind> {
        self.highlight.current()
    }

    pub fn splash_enabled(&self) -> bool {
        self.splash
    }

    #[cfg(test)]
    pub fn pending_effects(&self) -> usize {
        self.scheduler.len()
    }

    /// Run the cycle. From Idle this enters Evaporation; after a completed
    /// cycle it lifts the quiz gate.
    pub fn start(&mut self) {
        if self.cycle.phase == Phase::Idle {
            self.cycle.enter(Phase::Evaporation);
            info!("cycle started");
        }
        self.cycle.running = true;
    }

    pub fn pause(&mut self) {
        self.cycle.running = false;
    }

    pub fn toggle_running(&mut self) {
        if self.cycle.running {
            self.pause();
        } else {
            self.start();
        }
    }

    pub fn set_speed(&mut self, speed: Speed) {
        self.cycle.speed = speed;
        debug!(speed = speed.get(), "speed changed");
    }

    /// Back to Idle with every pool at its spawn defaults. Clears any
    /// highlight and pending deferred effects.
    pub fn reset(&mut self, io: &mut dyn Collaborators) {
        self.highlight.forget();
        self.cycle.reset();
        self.pools.reset_all(&mut self.rng);
        self.landscape.restore_emissive();
        self.lighting.restore();
        self.scheduler.clear();
        self.light_restore = None;
        io.stop_ambient();
        io.set_phase_info(Phase::Idle);
        io.set_progress_percent(Phase::Idle.progress_percent());
        io.set_stats(&self.cycle.stats);
        info!("simulation reset");
    }

    pub fn set_highlight(&mut self, kind: Option<HighlightKind>, io: &mut dyn Collaborators) {
        self.highlight.deactivate(&mut self.pools, &mut self.landscape);
        let Some(kind) = kind else {
            return;
        };
        if let Some(phase) = kind.forced_phase() {
            self.force_phase(phase, io);
        }
        self.highlight.activate(
            kind,
            &mut self.pools,
            &mut self.landscape,
            self.clock,
            &mut self.rng,
        );
        let (target, distance) = kind.focus();
        io.focus(target, distance);
    }

    /// Selecting the active kind again turns it off.
    pub fn toggle_highlight(&mut self, kind: HighlightKind, io: &mut dyn Collaborators) {
        if self.highlight.current() == Some(kind) {
            self.set_highlight(None, io);
        } else {
            self.set_highlight(Some(kind), io);
        }
    }

    pub fn change_view(&mut self, index: usize, io: &mut dyn Collaborators) -> Result<(), ConfigError> {
        let count = io.view_count();
        if index >= count {
            warn!(index, count, "rejected view change");
            return Err(ConfigError::ViewOutOfRange { index, count });
        }
        io.change_view(index);
        Ok(())
    }

    pub fn tick(&mut self, dt: Duration, io: &mut dyn Collaborators) {
        self.clock += dt;
        let t = self.clock.as_secs_f32();
        let speed = self.cycle.speed.get();

        self.landscape.animate(t);
        for effect in self.scheduler.poll(self.clock) {
            match effect {
                Deferred::RestoreLight => {
                    self.lighting.restore();
                    self.light_restore = None;
                }
            }
        }

        if self.highlight.current().is_some() {
            self.highlight.step(
                &mut self.pools,
                &mut self.landscape,
                self.clock,
                speed,
                &mut self.rng,
            );
        } else if !self.cycle.running {
            self.idle_motion(t, speed);
        }

        for p in self.pools.splash.particles.iter_mut().filter(|p| p.active) {
            step_splash(p);
        }

        if self.cycle.running {
            self.cycle.accumulate();
            self.run_phase(t, speed, io);
            if let Some(next) = self.cycle.transition_due() {
                self.advance(next, io);
            }
        }

        self.refresh_stats();
        io.set_phase_info(self.cycle.phase);
        io.set_progress_percent(self.cycle.phase.progress_percent());
        io.set_stats(&self.cycle.stats);
    }

    /// Flash the lights and schedule their return. A strike during a flash
    /// replaces the pending restore instead of stacking another one.
    pub fn strike_lightning(&mut self, io: &mut dyn Collaborators) {
        self.lighting.flash();
        if let Some(id) = self.light_restore.take() {
            self.scheduler.cancel(id);
        }
        let id = self
            .scheduler
            .schedule(self.clock, LIGHTNING_FLASH, Deferred::RestoreLight);
        self.light_restore = Some(id);
        io.play_cue(Cue::Thunder);
        trace!(task = ?id, "lightning");
    }

    fn idle_motion(&mut self, t: f32, speed: f32) {
        for (i, p) in self.pools.vapor.particles.iter_mut().enumerate() {
            if p.visible {
                idle_vapor(p, i, t, speed);
            }
        }
        for (i, c) in self.pools.clouds.iter_mut().enumerate() {
            if c.visible {
                idle_cloud(c, i, t, speed);
            }
        }
        for (i, p) in self.pools.rain.particles.iter_mut().enumerate() {
            if p.visible {
                idle_rain(p, i, t, speed, &mut self.rng);
            }
        }
    }

    fn run_phase(&mut self, t: f32, speed: f32, io: &mut dyn Collaborators) {
        match self.cycle.phase {
            Phase::Idle | Phase::Collection => {}
            Phase::Evaporation => self.run_vapor(speed),
            Phase::Condensation => {
                self.run_vapor(speed);
                self.run_clouds(t, speed);
            }
            Phase::Precipitation => {
                self.run_clouds(t, speed);
                self.run_rain(speed);
                if self.rng.random::<f32>() < self.thunder_chance {
                    self.strike_lightning(io);
                }
            }
        }
    }

    fn run_vapor(&mut self, speed: f32) {
        let due = staggered_due(
            self.cycle.progress,
            VAPOR_STAGGER * speed,
            self.pools.vapor.particles.len(),
        );
        let shown = self.highlight.shows(PoolKind::Vapor);
        while self.pools.vapor.active_count() < due {
            let Some(i) = self.pools.spawn_one(PoolKind::Vapor, &mut self.rng) else {
                break;
            };
            self.pools.vapor.particles[i].visible = shown;
        }
        for p in &mut self.pools.vapor.particles {
            if p.is_moving() {
                step_vapor(p, speed, &mut self.rng);
            }
        }
    }

    fn run_clouds(&mut self, t: f32, speed: f32) {
        let shown = self.highlight.shows(PoolKind::Cloud);
        for (i, c) in self.pools.clouds.iter_mut().enumerate() {
            step_cloud(c, i, speed, t);
            c.visible = shown;
        }
    }

    fn run_rain(&mut self, speed: f32) {
        let due = staggered_due(
            self.cycle.progress,
            RAIN_STAGGER * speed,
            self.pools.rain.particles.len(),
        );
        let shown = self.highlight.shows(PoolKind::Rain);
        while self.pools.rain.active_count() < due {
            let at = release_point(&self.pools.clouds, &mut self.rng);
            let Some(i) = self.pools.rain.spawn_one(Some(at), &mut self.rng) else {
                break;
            };
            self.pools.rain.particles[i].visible = shown;
        }
        let splash = self.splash;
        for p in &mut self.pools.rain.particles {
            if !p.active {
                continue;
            }
            if let Some(impact) = step_rain(p, speed, &mut self.rng) {
                if splash {
                    // A full splash pool just means this drop lands quietly.
                    let _ = self.pools.splash.spawn_one(Some(impact), &mut self.rng);
                }
            }
        }
    }

    /// Phase exits act on the scene as the cycle sees it, so a highlight is
    /// lifted for the transition and laid back on top afterwards.
    fn advance(&mut self, next: Phase, io: &mut dyn Collaborators) {
        let held = self.highlight.suspend(&mut self.pools, &mut self.landscape);
        self.transition(next, io);
        if let Some(held) = held {
            self.highlight
                .resume(held, &mut self.pools, &mut self.landscape, &mut self.rng);
        }
    }

    fn transition(&mut self, next: Phase, io: &mut dyn Collaborators) {
        let from = self.cycle.phase;
        self.cycle.enter(next);
        debug!(from = from.label(), to = next.label(), "phase transition");

        match next {
            Phase::Condensation => io.play_cue(Cue::Narration(Phase::Evaporation)),
            Phase::Precipitation => {
                io.play_cue(Cue::Narration(Phase::Condensation));
                self.enter_precipitation(io);
            }
            Phase::Collection => {
                self.pools.rain.clear();
                self.pools.reset(PoolKind::Cloud, &mut self.rng);
                io.play_ambient(Ambient::Ocean);
            }
            Phase::Evaporation => self.complete_cycle(io),
            Phase::Idle => {}
        }
    }

    fn enter_precipitation(&mut self, io: &mut dyn Collaborators) {
        self.pools.reset(PoolKind::Vapor, &mut self.rng);
        for c in &mut self.pools.clouds {
            c.visible = true;
        }
        io.play_ambient(Ambient::Rain);
    }

    fn complete_cycle(&mut self, io: &mut dyn Collaborators) {
        self.cycle.cycle_count += 1;
        self.cycle.running = false;
        for kind in [PoolKind::Vapor, PoolKind::Cloud, PoolKind::Rain] {
            self.pools.reset(kind, &mut self.rng);
        }
        io.stop_ambient();
        io.play_cue(Cue::Chirp);
        io.on_cycle_complete();
        info!(cycle = self.cycle.cycle_count, "cycle complete");
    }

    /// Jump straight into `phase` for a highlight, running.
    fn force_phase(&mut self, phase: Phase, io: &mut dyn Collaborators) {
        if self.cycle.phase != phase {
            self.cycle.enter(phase);
            if phase == Phase::Precipitation {
                self.enter_precipitation(io);
            }
        } else {
            self.cycle.progress = 0.0;
        }
        self.cycle.running = true;
        debug!(phase = phase.label(), "phase forced by highlight");
    }

    fn refresh_stats(&mut self) {
        let pools = &self.pools;
        self.cycle.stats = Stats {
            vapor: pools.vapor.particles.iter().filter(|p| p.is_moving()).count(),
            cloud: pools.clouds.iter().map(|c| c.condensed_puffs()).sum(),
            rain: pools.rain.particles.iter().filter(|p| p.is_moving()).count(),
            cycle: self.cycle.cycle_count,
        };
    }
}
