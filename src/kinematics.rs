// Copyright (c) 2026 rezky_nightky

//! Per-kind step functions. Each call advances one instance by one tick.
//!
//! The updaters do not know which phase is running; the caller decides which
//! ones to apply. Every exit check is one-directional and recycles in the same
//! call that detects it, so an instance never sits past its limit for more than
//! the tick in which it crossed.

use glam::Vec3;
use rand::Rng;

use crate::particle::{rain_spawn_point, vapor_spawn_point, Cloud, Particle};

pub const VAPOR_OPACITY_CEILING: f32 = 0.7;
pub const VAPOR_RESPAWN_OPACITY: f32 = 0.1;
pub const CLOUD_OPACITY_CEILING: f32 = 0.95;
pub const RAIN_OPACITY_CEILING: f32 = 0.8;
pub const RAIN_RESPAWN_OPACITY: f32 = 0.7;
pub const SPLASH_START_OPACITY: f32 = 0.8;

/// Rain below this height has reached the ground or the sea.
pub const GROUND_Y: f32 = -4.0;
pub const CLOUD_WRAP_X: f32 = 15.0;
pub const SPLASH_TICKS: u32 = 15;

fn fade_in(opacity: &mut f32, rate: f32, ceiling: f32) {
    if *opacity < ceiling {
        *opacity = (*opacity + rate).min(ceiling);
    }
}

fn wrap_x(x: &mut f32) {
    if *x > CLOUD_WRAP_X {
        *x = -CLOUD_WRAP_X;
    } else if *x < -CLOUD_WRAP_X {
        *x = CLOUD_WRAP_X;
    }
}

fn jitter(rng: &mut impl Rng, width: f32) -> f32 {
    (rng.random::<f32>() - 0.5) * width
}

/// Rise with a wobble. Returns `true` when the mote passed its target height
/// and was sent back to the ocean surface.
pub fn step_vapor(p: &mut Particle, speed: f32, rng: &mut impl Rng) -> bool {
    fade_in(&mut p.opacity, 0.02 * speed, VAPOR_OPACITY_CEILING);

    p.position.y += p.speed * speed;
    p.phase_offset += 0.05;
    p.position.x += p.phase_offset.sin() * 0.01;
    p.position.z += p.phase_offset.cos() * 0.01;
    p.scale = 1.0 + p.phase_offset.sin() * 0.2;

    if p.position.y > p.target_height {
        p.position = vapor_spawn_point(rng);
        p.opacity = VAPOR_RESPAWN_OPACITY;
        p.scale = 1.0;
        return true;
    }
    false
}

/// Condense, drift and bob. `index` desynchronises the bob between clouds.
pub fn step_cloud(c: &mut Cloud, index: usize, speed: f32, clock_s: f32) {
    c.visible = true;
    for puff in &mut c.puffs {
        fade_in(&mut puff.opacity, 0.008 * speed, CLOUD_OPACITY_CEILING);
    }
    c.position.x += c.drift_rate * speed;
    c.position.y += (clock_s + index as f32).sin() * 0.002;
    wrap_x(&mut c.position.x);
}

/// Where a newly woken drop starts: just under one of the clouds.
pub fn release_point(clouds: &[Cloud], rng: &mut impl Rng) -> Vec3 {
    if clouds.is_empty() {
        return rain_spawn_point(rng);
    }
    let source = clouds[rng.random_range(0..clouds.len())].position;
    Vec3::new(
        source.x + jitter(rng, 8.0),
        source.y - 1.0,
        source.z + jitter(rng, 5.0),
    )
}

/// How many of `len` staggered instances are due once `progress` has
/// accumulated, waking one every `gap` units starting at the first unit.
pub fn staggered_due(progress: f32, gap: f32, len: usize) -> usize {
    if progress <= 0.0 || gap <= 0.0 {
        return 0;
    }
    ((progress / gap).ceil() as usize).min(len)
}

/// Fall. Returns the impact point when the drop hit the ground and was
/// lifted back to spawn altitude.
pub fn step_rain(p: &mut Particle, speed: f32, rng: &mut impl Rng) -> Option<Vec3> {
    fade_in(&mut p.opacity, 0.05 * speed, RAIN_OPACITY_CEILING);

    p.position.y -= p.speed * speed;
    p.position.x += jitter(rng, 0.05);

    if p.position.y < GROUND_Y {
        let impact = Vec3::new(p.position.x, GROUND_Y, p.position.z);
        p.position = rain_spawn_point(rng);
        p.opacity = RAIN_RESPAWN_OPACITY;
        return Some(impact);
    }
    None
}

/// Grow and fade a ring; it switches itself off after [`SPLASH_TICKS`].
pub fn step_splash(p: &mut Particle) {
    p.age += 1;
    let t = (p.age as f32 / SPLASH_TICKS as f32).min(1.0);
    p.scale = 1.0 + t * 2.0;
    p.opacity = SPLASH_START_OPACITY * (1.0 - t);
    if p.age >= SPLASH_TICKS {
        p.active = false;
        p.visible = false;
        p.opacity = 0.0;
    }
}

// Ambient motion while the cycle is paused.

pub fn idle_vapor(p: &mut Particle, i: usize, t: f32, speed: f32) {
    let k = t + i as f32;
    p.position.y += k.sin() * 0.002 * speed;
    p.position.x += (t * 0.5 + i as f32).cos() * 0.003 * speed;
    if p.position.y > 8.0 {
        p.position.y = -2.0;
    } else if p.position.y < -3.0 {
        p.position.y = 8.0;
    }
}

pub fn idle_cloud(c: &mut Cloud, i: usize, t: f32, speed: f32) {
    let k = t * 0.1 + i as f32;
    c.position.x += k.sin() * 0.01 * speed;
    c.position.z += k.cos() * 0.005 * speed;
    c.spin += 0.0002 * speed;
    wrap_x(&mut c.position.x);
}

pub fn idle_rain(p: &mut Particle, i: usize, t: f32, speed: f32, rng: &mut impl Rng) {
    p.position.y -= 0.2 * speed;
    p.position.x += (t + i as f32).sin() * 0.01 * speed;
    if p.position.y < GROUND_Y {
        p.position = Vec3::new(jitter(rng, 30.0), 13.0, jitter(rng, 30.0));
    }
}

// Livelier motion for the highlighted kind.

pub fn live_vapor(p: &mut Particle, i: usize, t: f32, speed: f32, rng: &mut impl Rng) {
    let k = t * 2.0 + i as f32;
    p.position.y += 0.03 * speed;
    p.position.x += k.sin() * 0.02 * speed;
    p.position.z += k.cos() * 0.02 * speed;
    if p.position.y > 10.0 {
        p.position = vapor_spawn_point(rng);
        p.position.y = GROUND_Y;
    }
}

pub fn live_cloud(c: &mut Cloud, i: usize, t: f32, speed: f32) {
    c.position.x += (t * 0.2 + i as f32).sin() * 0.02 * speed;
    c.position.y += (t + i as f32).sin() * 0.01 * speed;
    c.spin += 0.001 * speed;
    wrap_x(&mut c.position.x);
}

pub fn live_rain(p: &mut Particle, i: usize, t: f32, speed: f32, rng: &mut impl Rng) {
    p.position.y -= 0.3 * speed;
    p.position.x += (t + i as f32).sin() * 0.02 * speed;
    if p.position.y < GROUND_Y {
        p.position = Vec3::new(jitter(rng, 30.0), 13.0, jitter(rng, 30.0));
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::particle::{Pools, VAPOR_SPAWN_Y};

    fn setup() -> (Pools, StdRng) {
        let mut rng = StdRng::seed_from_u64(42);
        (Pools::new(&mut rng), rng)
    }

    #[test]
    fn vapor_recycles_exactly_when_it_passes_the_target() {
        let (mut pools, mut rng) = setup();
        let p = &mut pools.vapor.particles[0];
        p.active = true;
        p.visible = true;
        p.position.y = p.target_height - 0.001;

        assert!(step_vapor(p, 1.0, &mut rng));
        assert_eq!(p.position.y, VAPOR_SPAWN_Y);
        assert_eq!(p.opacity, VAPOR_RESPAWN_OPACITY);
        assert_eq!(p.scale, 1.0);
        assert!(p.active);

        assert!(!step_vapor(p, 1.0, &mut rng));
        assert!(p.position.y < p.target_height);
    }

    #[test]
    fn vapor_fades_in_up_to_the_ceiling() {
        let (mut pools, mut rng) = setup();
        let p = &mut pools.vapor.particles[3];
        p.target_height = 1000.0;
        for _ in 0..100 {
            step_vapor(p, 1.0, &mut rng);
            assert!(p.opacity <= VAPOR_OPACITY_CEILING);
        }
        assert_eq!(p.opacity, VAPOR_OPACITY_CEILING);
    }

    #[test]
    fn faster_speed_rises_faster() {
        let (pools, mut rng) = setup();
        let mut a = pools.vapor.particles[5].clone();
        let mut b = a.clone();
        a.target_height = 1000.0;
        b.target_height = 1000.0;
        let y0 = a.position.y;
        step_vapor(&mut a, 1.0, &mut rng);
        step_vapor(&mut b, 2.0, &mut rng);
        assert!((b.position.y - y0) > (a.position.y - y0) * 1.99);
    }

    #[test]
    fn clouds_teleport_across_the_wrap_edge() {
        let (mut pools, _) = setup();
        let c = &mut pools.clouds[0];
        c.position.x = CLOUD_WRAP_X;
        c.drift_rate = 0.5;
        step_cloud(c, 0, 1.0, 0.0);
        assert_eq!(c.position.x, -CLOUD_WRAP_X);
        assert!(c.visible);
        assert!(c.puffs.iter().all(|p| p.opacity > 0.0));
    }

    #[test]
    fn cloud_puffs_stop_at_their_ceiling() {
        let (mut pools, _) = setup();
        let c = &mut pools.clouds[2];
        for _ in 0..500 {
            step_cloud(c, 2, 1.0, 0.0);
        }
        assert!(c.puffs.iter().all(|p| p.opacity == CLOUD_OPACITY_CEILING));
    }

    #[test]
    fn rain_released_under_a_cloud_and_recycled_at_ground() {
        let (mut pools, mut rng) = setup();
        let at = release_point(&pools.clouds, &mut rng);
        assert!(pools
            .clouds
            .iter()
            .any(|c| (at.y - (c.position.y - 1.0)).abs() < 1e-5));
        let i = pools.rain.spawn_one(Some(at), &mut rng).expect("pool has room");
        let p = &mut pools.rain.particles[i];
        assert!(p.active && p.visible);
        assert_eq!(p.position, at);

        p.position.y = GROUND_Y + 0.01;
        let impact = step_rain(p, 1.0, &mut rng).expect("drop should land");
        assert_eq!(impact.y, GROUND_Y);
        assert!(p.position.y >= 8.0);
        assert_eq!(p.opacity, RAIN_RESPAWN_OPACITY);
    }

    #[test]
    fn stagger_wakes_one_instance_per_gap() {
        assert_eq!(staggered_due(0.0, 1.5, 100), 0);
        assert_eq!(staggered_due(1.0, 1.5, 100), 1);
        assert_eq!(staggered_due(1.5, 1.5, 100), 1);
        assert_eq!(staggered_due(1.6, 1.5, 100), 2);
        assert_eq!(staggered_due(1.0e6, 1.5, 100), 100);
    }

    #[test]
    fn splash_ring_lives_a_fixed_number_of_ticks() {
        let (mut pools, mut rng) = setup();
        let i = pools.splash.spawn_one(Some(Vec3::ZERO), &mut rng).unwrap();
        let p = &mut pools.splash.particles[i];
        let mut last_scale = p.scale;
        for tick in 1..=SPLASH_TICKS {
            step_splash(p);
            assert!(p.scale > last_scale);
            last_scale = p.scale;
            assert_eq!(p.active, tick < SPLASH_TICKS);
        }
        assert_eq!(p.opacity, 0.0);
        assert!(!p.visible);
    }

    #[test]
    fn idle_rain_wraps_back_to_the_sky() {
        let (mut pools, mut rng) = setup();
        let p = &mut pools.rain.particles[9];
        p.position.y = GROUND_Y + 0.1;
        idle_rain(p, 9, 0.0, 1.0, &mut rng);
        assert_eq!(p.position.y, 13.0);
    }

    #[test]
    fn live_vapor_restarts_at_ground_level() {
        let (mut pools, mut rng) = setup();
        let p = &mut pools.vapor.particles[1];
        p.position.y = 9.99;
        live_vapor(p, 1, 0.0, 1.0, &mut rng);
        assert_eq!(p.position.y, GROUND_Y);
    }
}
