// Copyright (c) 2026 rezky_nightky

//! Fixed-size, recycle-in-place storage for every moving visual in the scene.
//!
//! Pools own their instances for the whole run. Nothing is ever allocated or
//! dropped after [`Pools::new`]; the updaters and the highlight controller
//! mutate instances in place and send them back to their spawn state when
//! they run out of road.

use glam::Vec3;
use rand::Rng;

pub const VAPOR_COUNT: usize = 100;
pub const RAIN_COUNT: usize = 200;
pub const SPLASH_COUNT: usize = 50;
pub const PUFFS_PER_CLOUD: usize = 8;

/// Height of the ocean surface where vapor is born.
pub const VAPOR_SPAWN_Y: f32 = -4.5;

pub const CLOUD_ANCHORS: [Vec3; 4] = [
    Vec3::new(-8.0, 10.0, -2.0),
    Vec3::new(6.0, 9.0, 2.0),
    Vec3::new(0.0, 11.0, -5.0),
    Vec3::new(-3.0, 8.0, 3.0),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PoolKind {
    Vapor,
    Cloud,
    Rain,
    Splash,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    /// Per-instance rise/fall rate, fixed at creation.
    pub speed: f32,
    /// Wobble angle; advances while active.
    pub phase_offset: f32,
    /// Vapor only: height at which the mote recycles.
    pub target_height: f32,
    /// Splash only: ticks since the ring appeared.
    pub age: u32,
    pub active: bool,
    pub visible: bool,
    pub opacity: f32,
    pub scale: f32,
    pub base_emissive: f32,
    pub emissive: f32,
}

impl Particle {
    fn new(speed: f32, base_emissive: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            speed,
            phase_offset: 0.0,
            target_height: 0.0,
            age: 0,
            active: false,
            visible: false,
            opacity: 0.0,
            scale: 1.0,
            base_emissive,
            emissive: base_emissive,
        }
    }

    pub fn is_moving(&self) -> bool {
        self.active && self.visible
    }
}

/// Uniform in `[-half, half)`.
fn spread(rng: &mut impl Rng, width: f32) -> f32 {
    (rng.random::<f32>() - 0.5) * width
}

pub fn vapor_spawn_point(rng: &mut impl Rng) -> Vec3 {
    Vec3::new(
        spread(rng, 20.0),
        VAPOR_SPAWN_Y,
        -10.0 + spread(rng, 10.0),
    )
}

pub fn rain_spawn_point(rng: &mut impl Rng) -> Vec3 {
    Vec3::new(
        spread(rng, 30.0),
        8.0 + rng.random::<f32>() * 5.0,
        spread(rng, 30.0),
    )
}

#[derive(Clone, Debug)]
pub struct ParticlePool {
    pub kind: PoolKind,
    pub particles: Vec<Particle>,
}

impl ParticlePool {
    fn with_capacity(kind: PoolKind, n: usize, rng: &mut impl Rng) -> Self {
        let mut particles = Vec::with_capacity(n);
        for _ in 0..n {
            let p = match kind {
                PoolKind::Vapor => {
                    let mut p = Particle::new(0.015 + rng.random::<f32>() * 0.025, 0.3);
                    p.target_height = 6.0 + rng.random::<f32>() * 4.0;
                    p
                }
                PoolKind::Rain => Particle::new(0.25 + rng.random::<f32>() * 0.15, 0.0),
                PoolKind::Splash | PoolKind::Cloud => Particle::new(0.0, 0.0),
            };
            particles.push(p);
        }
        let mut pool = Self { kind, particles };
        pool.reset(rng);
        pool
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn active_count(&self) -> usize {
        self.particles.iter().filter(|p| p.active).count()
    }

    /// Back to the spawn distribution: hidden, inactive, transparent.
    pub fn reset(&mut self, rng: &mut impl Rng) {
        let kind = self.kind;
        for p in &mut self.particles {
            respawn(kind, p, rng);
            p.active = false;
            p.visible = false;
            p.opacity = 0.0;
            p.scale = 1.0;
            p.age = 0;
            p.emissive = p.base_emissive;
            if kind == PoolKind::Vapor {
                p.phase_offset = 0.0;
            }
        }
    }

    /// Hide and stop every instance without moving it.
    pub fn clear(&mut self) {
        for p in &mut self.particles {
            p.active = false;
            p.visible = false;
            p.opacity = 0.0;
        }
    }

    /// Activate one dormant instance. Returns `None` when every instance is
    /// already busy; an exhausted pool is not an error.
    pub fn spawn_one(&mut self, at: Option<Vec3>, rng: &mut impl Rng) -> Option<usize> {
        let kind = self.kind;
        let (i, p) = self
            .particles
            .iter_mut()
            .enumerate()
            .find(|(_, p)| !p.active)?;
        match at {
            Some(pos) => p.position = pos,
            None => respawn(kind, p, rng),
        }
        p.active = true;
        p.visible = true;
        p.age = 0;
        p.scale = 1.0;
        Some(i)
    }
}

/// Re-seat a particle at its kind's spawn point. Flags are left alone.
pub fn respawn(kind: PoolKind, p: &mut Particle, rng: &mut impl Rng) {
    match kind {
        PoolKind::Vapor => p.position = vapor_spawn_point(rng),
        PoolKind::Rain => p.position = rain_spawn_point(rng),
        PoolKind::Splash | PoolKind::Cloud => p.position = Vec3::new(0.0, -4.0, 0.0),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Puff {
    pub offset: Vec3,
    pub radius: f32,
    pub opacity: f32,
    pub emissive: f32,
}

#[derive(Clone, Debug)]
pub struct Cloud {
    pub anchor: Vec3,
    pub position: Vec3,
    pub drift_rate: f32,
    pub visible: bool,
    pub spin: f32,
    pub puffs: Vec<Puff>,
}

impl Cloud {
    fn new(anchor: Vec3, rng: &mut impl Rng) -> Self {
        let puffs = (0..PUFFS_PER_CLOUD)
            .map(|_| Puff {
                offset: Vec3::new(spread(rng, 4.0), spread(rng, 1.5), spread(rng, 3.0)),
                radius: 0.8 + rng.random::<f32>() * 0.7,
                opacity: 0.0,
                emissive: 0.0,
            })
            .collect();
        Self {
            anchor,
            position: anchor,
            drift_rate: rng.random::<f32>() * 0.001,
            visible: false,
            spin: 0.0,
            puffs,
        }
    }

    pub fn reset(&mut self) {
        self.position = self.anchor;
        self.visible = false;
        self.spin = 0.0;
        self.fade_out();
    }

    pub fn fade_out(&mut self) {
        for puff in &mut self.puffs {
            puff.opacity = 0.0;
            puff.emissive = 0.0;
        }
    }

    pub fn condensed_puffs(&self) -> usize {
        if !self.visible {
            return 0;
        }
        self.puffs.iter().filter(|p| p.opacity > 0.0).count()
    }
}

/// All pools of the scene, addressed by [`PoolKind`].
#[derive(Clone, Debug)]
pub struct Pools {
    pub vapor: ParticlePool,
    pub rain: ParticlePool,
    pub splash: ParticlePool,
    pub clouds: Vec<Cloud>,
}

impl Pools {
    pub fn new(rng: &mut impl Rng) -> Self {
        Self {
            vapor: ParticlePool::with_capacity(PoolKind::Vapor, VAPOR_COUNT, rng),
            rain: ParticlePool::with_capacity(PoolKind::Rain, RAIN_COUNT, rng),
            splash: ParticlePool::with_capacity(PoolKind::Splash, SPLASH_COUNT, rng),
            clouds: CLOUD_ANCHORS.iter().map(|&a| Cloud::new(a, rng)).collect(),
        }
    }

    pub fn reset(&mut self, kind: PoolKind, rng: &mut impl Rng) {
        match kind {
            PoolKind::Vapor => self.vapor.reset(rng),
            PoolKind::Rain => self.rain.reset(rng),
            PoolKind::Splash => self.splash.reset(rng),
            PoolKind::Cloud => self.clouds.iter_mut().for_each(Cloud::reset),
        }
    }

    pub fn reset_all(&mut self, rng: &mut impl Rng) {
        for kind in [
            PoolKind::Vapor,
            PoolKind::Cloud,
            PoolKind::Rain,
            PoolKind::Splash,
        ] {
            self.reset(kind, rng);
        }
    }

    /// Returns the slot that was woken, or `None` if the kind is exhausted
    /// (or, for clouds, already fully shown).
    pub fn spawn_one(&mut self, kind: PoolKind, rng: &mut impl Rng) -> Option<usize> {
        match kind {
            PoolKind::Vapor => self.vapor.spawn_one(None, rng),
            PoolKind::Rain => self.rain.spawn_one(None, rng),
            PoolKind::Splash => self.splash.spawn_one(None, rng),
            PoolKind::Cloud => {
                let (i, c) = self.clouds.iter_mut().enumerate().find(|(_, c)| !c.visible)?;
                c.visible = true;
                Some(i)
            }
        }
    }

    pub fn hide_all(&mut self) {
        for pool in [&mut self.vapor, &mut self.rain] {
            for p in &mut pool.particles {
                p.visible = false;
            }
        }
        for c in &mut self.clouds {
            c.visible = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn pools() -> (Pools, StdRng) {
        let mut rng = StdRng::seed_from_u64(7);
        (Pools::new(&mut rng), rng)
    }

    #[test]
    fn pools_are_sized_once_and_start_dormant() {
        let (pools, _) = pools();
        assert_eq!(pools.vapor.len(), VAPOR_COUNT);
        assert_eq!(pools.rain.len(), RAIN_COUNT);
        assert_eq!(pools.splash.len(), SPLASH_COUNT);
        assert_eq!(pools.clouds.len(), CLOUD_ANCHORS.len());
        assert!(pools.clouds.iter().all(|c| c.puffs.len() == PUFFS_PER_CLOUD));
        for p in pools.vapor.particles.iter().chain(&pools.rain.particles) {
            assert!(!p.active && !p.visible);
            assert_eq!(p.opacity, 0.0);
        }
    }

    #[test]
    fn vapor_reset_puts_motes_on_the_ocean_surface() {
        let (mut pools, mut rng) = pools();
        for p in &mut pools.vapor.particles {
            p.position.y = 9.0;
            p.active = true;
            p.visible = true;
            p.opacity = 0.6;
        }
        pools.reset(PoolKind::Vapor, &mut rng);
        for p in &pools.vapor.particles {
            assert_eq!(p.position.y, VAPOR_SPAWN_Y);
            assert!(p.position.x >= -10.0 && p.position.x < 10.0);
            assert!(p.position.z >= -15.0 && p.position.z < -5.0);
            assert!(!p.active && !p.visible);
            assert_eq!(p.opacity, 0.0);
            assert!(p.target_height >= 6.0 && p.target_height <= 10.0);
        }
    }

    #[test]
    fn rain_spawns_high_above_the_ground() {
        let (pools, _) = pools();
        for p in &pools.rain.particles {
            assert!(p.position.y >= 8.0 && p.position.y <= 13.0);
            assert!(p.speed >= 0.25 && p.speed <= 0.4);
        }
    }

    #[test]
    fn spawn_one_is_a_noop_once_the_pool_is_exhausted() {
        let (mut pools, mut rng) = pools();
        for _ in 0..SPLASH_COUNT {
            assert!(pools.spawn_one(PoolKind::Splash, &mut rng).is_some());
        }
        assert_eq!(pools.splash.active_count(), SPLASH_COUNT);
        assert_eq!(pools.spawn_one(PoolKind::Splash, &mut rng), None);
        assert_eq!(pools.splash.active_count(), SPLASH_COUNT);
    }

    #[test]
    fn spawn_one_reuses_the_first_dormant_slot() {
        let (mut pools, mut rng) = pools();
        let at = Vec3::new(1.0, -4.0, 2.0);
        assert_eq!(pools.splash.spawn_one(Some(at), &mut rng), Some(0));
        assert_eq!(pools.splash.spawn_one(Some(at), &mut rng), Some(1));
        pools.splash.particles[0].active = false;
        assert_eq!(pools.splash.spawn_one(Some(at), &mut rng), Some(0));
        assert_eq!(pools.splash.particles[0].position, at);
    }

    #[test]
    fn cloud_reset_returns_to_anchor_and_clears_puffs() {
        let (mut pools, mut rng) = pools();
        let c = &mut pools.clouds[1];
        c.visible = true;
        c.position.x += 3.0;
        c.puffs[0].opacity = 0.9;
        assert_eq!(c.condensed_puffs(), 1);
        pools.reset(PoolKind::Cloud, &mut rng);
        let c = &pools.clouds[1];
        assert_eq!(c.position, CLOUD_ANCHORS[1]);
        assert!(!c.visible);
        assert_eq!(c.condensed_puffs(), 0);
    }
}
