// Copyright (c) 2026 rezky_nightky

//! Legend highlighting: one concept at a time is pulled to the foreground,
//! pulsed, and animated on its own.
//!
//! Activation takes a snapshot of everything it is about to touch, so
//! switching from one highlight to another always starts from the state the
//! scene was in before the first one, never from a half-overridden scene.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use glam::Vec3;
use rand::Rng;

use crate::cycle::Phase;
use crate::error::ConfigError;
use crate::kinematics::{live_cloud, live_rain, live_vapor};
use crate::particle::{Cloud, Particle, PoolKind, Pools};
use crate::scene::Landscape;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HighlightKind {
    Vapor,
    Cloud,
    Rain,
    Vegetation,
    Ground,
    Ocean,
}

impl HighlightKind {
    /// Legend order; the keyboard binds `1..=6` to these.
    pub const ALL: [HighlightKind; 6] = [
        HighlightKind::Vapor,
        HighlightKind::Cloud,
        HighlightKind::Rain,
        HighlightKind::Vegetation,
        HighlightKind::Ground,
        HighlightKind::Ocean,
    ];

    pub fn name(self) -> &'static str {
        match self {
            HighlightKind::Vapor => "vapor",
            HighlightKind::Cloud => "cloud",
            HighlightKind::Rain => "rain",
            HighlightKind::Vegetation => "vegetation",
            HighlightKind::Ground => "ground",
            HighlightKind::Ocean => "ocean",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            HighlightKind::Vapor => "water vapor rising from the sea",
            HighlightKind::Cloud => "clouds condensing in the cold air",
            HighlightKind::Rain => "rain falling back to the surface",
            HighlightKind::Vegetation => "trees that return water by transpiration",
            HighlightKind::Ground => "soil that soaks up and channels water",
            HighlightKind::Ocean => "the ocean where water collects",
        }
    }

    /// Legend slot, `1..=6`.
    pub fn from_key(n: u8) -> Option<Self> {
        let i = usize::from(n).checked_sub(1)?;
        Self::ALL.get(i).copied()
    }

    pub fn key(self) -> u8 {
        Self::ALL.iter().position(|&k| k == self).unwrap_or(0) as u8 + 1
    }

    /// Camera target and distance used when this kind is selected.
    pub fn focus(self) -> (Vec3, f32) {
        match self {
            HighlightKind::Vapor => (Vec3::new(0.0, 5.0, -5.0), 25.0),
            HighlightKind::Cloud => (Vec3::new(0.0, 10.0, 0.0), 30.0),
            HighlightKind::Rain | HighlightKind::Ocean => (Vec3::new(0.0, 5.0, 0.0), 25.0),
            HighlightKind::Vegetation => (Vec3::new(10.0, 0.0, 10.0), 20.0),
            HighlightKind::Ground => (Vec3::new(0.0, -6.0, 10.0), 20.0),
        }
    }

    /// The pool this kind puts on show, if it is a particle kind.
    pub fn pool(self) -> Option<PoolKind> {
        match self {
            HighlightKind::Vapor => Some(PoolKind::Vapor),
            HighlightKind::Cloud => Some(PoolKind::Cloud),
            HighlightKind::Rain | HighlightKind::Ocean => Some(PoolKind::Rain),
            HighlightKind::Vegetation | HighlightKind::Ground => None,
        }
    }

    /// Phase the cycle is pinned to while this kind is selected.
    pub fn forced_phase(self) -> Option<Phase> {
        match self {
            HighlightKind::Rain | HighlightKind::Ocean => Some(Phase::Precipitation),
            _ => None,
        }
    }

    fn glow(self) -> f32 {
        match self {
            HighlightKind::Vapor => 2.0,
            HighlightKind::Cloud | HighlightKind::Ground => 1.5,
            HighlightKind::Rain | HighlightKind::Ocean => 2.5,
            HighlightKind::Vegetation => 1.8,
        }
    }
}

impl fmt::Display for HighlightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HighlightKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::UnknownHighlight(s.to_string()))
    }
}

/// Emissive multiplier for a highlight that has been on for `elapsed`.
pub fn pulse(elapsed: Duration) -> f32 {
    (elapsed.as_millis() as f32 * 0.005).sin() * 0.3 + 1.0
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Look {
    visible: bool,
    active: bool,
    opacity: f32,
    emissive: f32,
}

impl Look {
    fn of(p: &Particle) -> Self {
        Self {
            visible: p.visible,
            active: p.active,
            opacity: p.opacity,
            emissive: p.emissive,
        }
    }

    fn apply(self, p: &mut Particle) {
        p.visible = self.visible;
        p.active = self.active;
        p.opacity = self.opacity;
        p.emissive = self.emissive;
    }
}

#[derive(Clone, Debug)]
struct CloudLook {
    visible: bool,
    puffs: Vec<(f32, f32)>,
}

#[derive(Clone, Debug)]
struct Snapshot {
    vapor: Vec<Look>,
    rain: Vec<Look>,
    clouds: Vec<CloudLook>,
}

impl Snapshot {
    fn take(pools: &Pools) -> Self {
        Self {
            vapor: pools.vapor.particles.iter().map(Look::of).collect(),
            rain: pools.rain.particles.iter().map(Look::of).collect(),
            clouds: pools
                .clouds
                .iter()
                .map(|c| CloudLook {
                    visible: c.visible,
                    puffs: c.puffs.iter().map(|p| (p.opacity, p.emissive)).collect(),
                })
                .collect(),
        }
    }

    fn restore(&self, pools: &mut Pools) {
        for (p, look) in pools.vapor.particles.iter_mut().zip(&self.vapor) {
            look.apply(p);
        }
        for (p, look) in pools.rain.particles.iter_mut().zip(&self.rain) {
            look.apply(p);
        }
        for (c, look) in pools.clouds.iter_mut().zip(&self.clouds) {
            c.visible = look.visible;
            for (puff, &(opacity, emissive)) in c.puffs.iter_mut().zip(&look.puffs) {
                puff.opacity = opacity;
                puff.emissive = emissive;
            }
        }
    }
}

#[derive(Clone, Debug)]
struct Active {
    kind: HighlightKind,
    since: Duration,
    snapshot: Snapshot,
}

/// A highlight lifted off the scene while the cycle changes underneath it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Held {
    kind: HighlightKind,
    since: Duration,
}

#[derive(Clone, Debug, Default)]
pub struct HighlightController {
    active: Option<Active>,
}

impl HighlightController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<HighlightKind> {
        self.active.as_ref().map(|a| a.kind)
    }

    /// Whether instances of `kind` may be seen. Everything is on show when
    /// nothing is highlighted.
    pub fn shows(&self, kind: PoolKind) -> bool {
        match self.current() {
            None => true,
            Some(h) => h.pool() == Some(kind),
        }
    }

    /// Replace whatever is highlighted with `kind`. The previous highlight is
    /// fully undone before the new one is applied.
    pub fn activate(
        &mut self,
        kind: HighlightKind,
        pools: &mut Pools,
        landscape: &mut Landscape,
        now: Duration,
        rng: &mut impl Rng,
    ) {
        self.deactivate(pools, landscape);
        let snapshot = Snapshot::take(pools);

        pools.hide_all();
        match kind {
            HighlightKind::Vapor => {
                for p in &mut pools.vapor.particles {
                    force_visible(p, 0.6);
                    if p.position.y > 8.0 || p.position.y < -4.0 {
                        p.position.y = rng.random::<f32>() * 10.0 - 2.0;
                    }
                }
            }
            HighlightKind::Cloud => {
                for c in &mut pools.clouds {
                    c.visible = true;
                    for puff in &mut c.puffs {
                        puff.opacity = 0.9;
                    }
                }
            }
            HighlightKind::Rain | HighlightKind::Ocean => {
                for p in &mut pools.rain.particles {
                    force_visible(p, 0.7);
                    if p.position.y < 8.0 {
                        p.position.y = 8.0 + rng.random::<f32>() * 5.0;
                    }
                }
            }
            HighlightKind::Vegetation | HighlightKind::Ground => {}
        }

        self.active = Some(Active {
            kind,
            since: now,
            snapshot,
        });
        apply_glow(kind, kind.glow(), pools, landscape);
        tracing::debug!(highlight = kind.name(), "highlight on");
    }

    /// Undo the current highlight, if any, and return what it was.
    pub fn deactivate(
        &mut self,
        pools: &mut Pools,
        landscape: &mut Landscape,
    ) -> Option<HighlightKind> {
        let active = self.active.take()?;
        active.snapshot.restore(pools);
        landscape.restore_emissive();
        tracing::debug!(highlight = active.kind.name(), "highlight off");
        Some(active.kind)
    }

    /// Undo the current highlight but keep hold of it. Whatever changes the
    /// scene before [`HighlightController::resume`] becomes the state a later
    /// deactivate returns to.
    pub fn suspend(&mut self, pools: &mut Pools, landscape: &mut Landscape) -> Option<Held> {
        let since = self.active.as_ref()?.since;
        let kind = self.deactivate(pools, landscape)?;
        Some(Held { kind, since })
    }

    /// Put a suspended highlight back, keeping its pulse in step.
    pub fn resume(
        &mut self,
        held: Held,
        pools: &mut Pools,
        landscape: &mut Landscape,
        rng: &mut impl Rng,
    ) {
        self.activate(held.kind, pools, landscape, held.since, rng);
    }

    /// Drop the current highlight without restoring anything. Used when the
    /// whole scene is about to be reset anyway.
    pub fn forget(&mut self) {
        self.active = None;
    }

    /// Pulse the emphasis and run the live motion for the highlighted kind.
    pub fn step(
        &mut self,
        pools: &mut Pools,
        landscape: &mut Landscape,
        now: Duration,
        speed: f32,
        rng: &mut impl Rng,
    ) {
        let Some(active) = &self.active else {
            return;
        };
        let kind = active.kind;
        let level = kind.glow() * pulse(now.saturating_sub(active.since));
        apply_glow(kind, level, pools, landscape);

        let t = now.as_secs_f32();
        match kind {
            HighlightKind::Vapor => {
                for (i, p) in pools.vapor.particles.iter_mut().enumerate() {
                    if p.visible {
                        live_vapor(p, i, t, speed, rng);
                    }
                }
            }
            HighlightKind::Cloud => {
                for (i, c) in pools.clouds.iter_mut().enumerate() {
                    if c.visible {
                        live_cloud(c, i, t, speed);
                    }
                }
            }
            HighlightKind::Rain => {
                for (i, p) in pools.rain.particles.iter_mut().enumerate() {
                    if p.visible {
                        live_rain(p, i, t, speed, rng);
                    }
                }
            }
            HighlightKind::Vegetation | HighlightKind::Ground | HighlightKind::Ocean => {}
        }
    }
}

fn force_visible(p: &mut Particle, opacity: f32) {
    p.visible = true;
    p.active = true;
    p.opacity = opacity;
}

fn glow_cloud(c: &mut Cloud, level: f32) {
    for puff in &mut c.puffs {
        puff.emissive = level;
    }
}

fn apply_glow(kind: HighlightKind, level: f32, pools: &mut Pools, landscape: &mut Landscape) {
    match kind {
        HighlightKind::Vapor => pools.vapor.particles.iter_mut().for_each(|p| p.emissive = level),
        HighlightKind::Cloud => pools.clouds.iter_mut().for_each(|c| glow_cloud(c, level)),
        HighlightKind::Rain => pools.rain.particles.iter_mut().for_each(|p| p.emissive = level),
        HighlightKind::Ocean => {
            pools.rain.particles.iter_mut().for_each(|p| p.emissive = level);
            landscape.ocean.emissive = level;
        }
        HighlightKind::Vegetation => landscape.trees.iter_mut().for_each(|t| t.emissive = level),
        HighlightKind::Ground => landscape.ground.emissive = level,
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn scene() -> (Pools, Landscape, StdRng) {
        let mut rng = StdRng::seed_from_u64(11);
        (Pools::new(&mut rng), Landscape::new(), rng)
    }

    #[test]
    fn names_parse_both_ways() {
        for k in HighlightKind::ALL {
            assert_eq!(k.name().parse::<HighlightKind>(), Ok(k));
            assert_eq!(HighlightKind::from_key(k.key()), Some(k));
        }
        assert_eq!("  RAIN ".parse::<HighlightKind>(), Ok(HighlightKind::Rain));
        assert_eq!(
            "snow".parse::<HighlightKind>(),
            Err(ConfigError::UnknownHighlight("snow".into()))
        );
        assert_eq!(HighlightKind::from_key(0), None);
        assert_eq!(HighlightKind::from_key(7), None);
    }

    #[test]
    fn pulse_swings_around_one() {
        assert_eq!(pulse(Duration::ZERO), 1.0);
        for ms in (0..2000).step_by(37) {
            let v = pulse(Duration::from_millis(ms));
            assert!((0.7..=1.3).contains(&v));
        }
    }

    #[test]
    fn rain_highlight_forces_drops_visible_and_glowing() {
        let (mut pools, mut land, mut rng) = scene();
        let mut hl = HighlightController::new();
        hl.activate(HighlightKind::Rain, &mut pools, &mut land, Duration::ZERO, &mut rng);
        assert_eq!(hl.current(), Some(HighlightKind::Rain));
        for p in &pools.rain.particles {
            assert!(p.visible && p.active);
            assert_eq!(p.opacity, 0.7);
            assert_eq!(p.emissive, 2.5);
            assert!(p.position.y >= 8.0);
        }
        assert!(pools.vapor.particles.iter().all(|p| !p.visible));
    }

    #[test]
    fn switching_highlight_restores_the_previous_kind_first() {
        let (mut pools, mut land, mut rng) = scene();
        let before: Vec<_> = pools.rain.particles.iter().map(Look::of).collect();
        let mut hl = HighlightController::new();

        hl.activate(HighlightKind::Rain, &mut pools, &mut land, Duration::ZERO, &mut rng);
        hl.step(&mut pools, &mut land, Duration::from_millis(300), 1.0, &mut rng);
        hl.activate(HighlightKind::Cloud, &mut pools, &mut land, Duration::from_millis(320), &mut rng);

        let after: Vec<_> = pools.rain.particles.iter().map(Look::of).collect();
        assert_eq!(before, after);
        assert!(pools.clouds.iter().all(|c| c.visible));
        assert!(pools.clouds.iter().flat_map(|c| &c.puffs).all(|p| p.emissive == 1.5));
    }

    #[test]
    fn static_highlights_touch_only_the_landscape() {
        let (mut pools, mut land, mut rng) = scene();
        let mut hl = HighlightController::new();
        hl.activate(HighlightKind::Vegetation, &mut pools, &mut land, Duration::ZERO, &mut rng);
        assert!(land.trees.iter().all(|t| t.emissive == 1.8));
        assert!(!land.ground.is_glowing());

        hl.activate(HighlightKind::Ground, &mut pools, &mut land, Duration::ZERO, &mut rng);
        assert!(land.trees.iter().all(|t| !t.is_glowing()));
        assert_eq!(land.ground.emissive, 1.5);

        assert_eq!(hl.deactivate(&mut pools, &mut land), Some(HighlightKind::Ground));
        assert!(!land.ground.is_glowing());
        assert_eq!(hl.deactivate(&mut pools, &mut land), None);
    }

    #[test]
    fn live_vapor_moves_only_while_highlighted() {
        let (mut pools, mut land, mut rng) = scene();
        let mut hl = HighlightController::new();
        hl.activate(HighlightKind::Vapor, &mut pools, &mut land, Duration::ZERO, &mut rng);
        let y0 = pools.vapor.particles[0].position.y;
        hl.step(&mut pools, &mut land, Duration::from_millis(16), 1.0, &mut rng);
        assert!(pools.vapor.particles[0].position.y != y0);

        hl.deactivate(&mut pools, &mut land);
        let y1 = pools.vapor.particles[0].position.y;
        hl.step(&mut pools, &mut land, Duration::from_millis(32), 1.0, &mut rng);
        assert_eq!(pools.vapor.particles[0].position.y, y1);
        assert!(pools.vapor.particles.iter().all(|p| p.emissive == p.base_emissive));
    }

    #[test]
    fn changes_made_while_suspended_are_what_deactivate_returns_to() {
        let (mut pools, mut land, mut rng) = scene();
        pools.rain.particles[0].active = true;
        pools.rain.particles[0].visible = true;
        let mut hl = HighlightController::new();
        hl.activate(HighlightKind::Cloud, &mut pools, &mut land, Duration::from_millis(40), &mut rng);
        assert!(!pools.rain.particles[0].visible);

        let held = hl.suspend(&mut pools, &mut land).expect("a highlight is on");
        assert_eq!(hl.current(), None);
        assert!(pools.rain.particles[0].visible);
        pools.rain.clear();
        hl.resume(held, &mut pools, &mut land, &mut rng);
        assert_eq!(hl.current(), Some(HighlightKind::Cloud));
        assert!(pools.clouds.iter().all(|c| c.visible));

        hl.deactivate(&mut pools, &mut land);
        assert!(!pools.rain.particles[0].visible && !pools.rain.particles[0].active);
        assert!(pools.clouds.iter().all(|c| !c.visible));
        assert_eq!(hl.suspend(&mut pools, &mut land), None);
    }

    #[test]
    fn only_the_highlighted_pool_is_on_show() {
        let (mut pools, mut land, mut rng) = scene();
        let mut hl = HighlightController::new();
        assert!(hl.shows(PoolKind::Rain) && hl.shows(PoolKind::Vapor));
        hl.activate(HighlightKind::Ocean, &mut pools, &mut land, Duration::ZERO, &mut rng);
        assert!(hl.shows(PoolKind::Rain));
        assert!(!hl.shows(PoolKind::Cloud));
        hl.activate(HighlightKind::Ground, &mut pools, &mut land, Duration::ZERO, &mut rng);
        assert!(!hl.shows(PoolKind::Vapor));
    }
}
