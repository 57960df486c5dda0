// Copyright (c) 2026 rezky_nightky

//! The static landscape as seen by the core: a handful of addressable
//! entities with a position and an emissive level, plus the environmental
//! motion (waves, river, sun) that runs at the start of every tick.

use glam::Vec3;

#[derive(Clone, Debug, PartialEq)]
pub struct StaticMesh {
    pub position: Vec3,
    /// Full extent along each axis (radius in `x` for round things).
    pub size: Vec3,
    pub base_emissive: f32,
    pub emissive: f32,
}

impl StaticMesh {
    fn new(position: Vec3, size: Vec3, base_emissive: f32) -> Self {
        Self {
            position,
            size,
            base_emissive,
            emissive: base_emissive,
        }
    }

    pub fn restore(&mut self) {
        self.emissive = self.base_emissive;
    }

    #[cfg(test)]
    pub fn is_glowing(&self) -> bool {
        self.emissive != self.base_emissive
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mountain {
    pub center: Vec3,
    pub radius: f32,
}

impl Mountain {
    pub fn peak(&self) -> Vec3 {
        self.center + Vec3::Y * self.radius
    }

    pub fn foot_y(&self) -> f32 {
        self.center.y - self.radius
    }
}

const TREE_SPOTS: [(f32, f32); 9] = [
    (5.0, 8.0),
    (8.0, 10.0),
    (10.0, 7.0),
    (6.0, 12.0),
    (12.0, 9.0),
    (14.0, 11.0),
    (7.0, 14.0),
    (15.0, 13.0),
    (4.0, 15.0),
];

pub const OCEAN_LEVEL: f32 = -3.5;

#[derive(Clone, Debug)]
pub struct Landscape {
    pub ocean: StaticMesh,
    pub ground: StaticMesh,
    pub river: StaticMesh,
    pub sun: StaticMesh,
    pub trees: Vec<StaticMesh>,
    pub mountains: Vec<Mountain>,
    clock: f32,
    pub sun_ray_scale: f32,
    pub sun_spin: f32,
}

impl Default for Landscape {
    fn default() -> Self {
        Self::new()
    }
}

impl Landscape {
    pub fn new() -> Self {
        Self {
            ocean: StaticMesh::new(
                Vec3::new(0.0, OCEAN_LEVEL, -10.0),
                Vec3::new(50.0, 0.5, 30.0),
                0.3,
            ),
            ground: StaticMesh::new(Vec3::new(0.0, -6.0, 10.0), Vec3::new(60.0, 2.0, 40.0), 0.0),
            river: StaticMesh::new(Vec3::new(2.0, -4.9, 8.0), Vec3::new(2.0, 0.0, 15.0), 0.0),
            sun: StaticMesh::new(Vec3::new(20.0, 20.0, 10.0), Vec3::splat(2.5), 1.0),
            trees: TREE_SPOTS
                .iter()
                .map(|&(x, z)| StaticMesh::new(Vec3::new(x, -5.0, z), Vec3::new(1.0, 4.2, 1.0), 0.0))
                .collect(),
            mountains: vec![
                Mountain {
                    center: Vec3::new(12.0, -2.0, 12.0),
                    radius: 4.0,
                },
                Mountain {
                    center: Vec3::new(18.0, -3.0, 15.0),
                    radius: 3.0,
                },
                Mountain {
                    center: Vec3::new(8.0, -3.0, 16.0),
                    radius: 3.5,
                },
            ],
            clock: 0.0,
            sun_ray_scale: 1.0,
            sun_spin: 0.0,
        }
    }

    /// Environmental motion; `t` is the simulation clock in seconds.
    pub fn animate(&mut self, t: f32) {
        self.clock = t;
        self.sun_spin += 0.001;
        self.sun_ray_scale = 1.0 + (t * 2.0).sin() * 0.1;
    }

    /// Height of the ocean surface above [`OCEAN_LEVEL`] at world `(x, z)`.
    pub fn wave_height(&self, x: f32, z: f32) -> f32 {
        let t = self.clock;
        (x * 0.2 + t).sin() * 0.15
            + (z * 0.3 + t * 1.5).sin() * 0.1
            + ((x + z) * 0.1 + t * 0.8).sin() * 0.08
    }

    pub fn river_ripple(&self, z: f32) -> f32 {
        (z * 0.5 + self.clock * 2.0).sin() * 0.05
    }

    pub fn restore_emissive(&mut self) {
        self.ocean.restore();
        self.ground.restore();
        for t in &mut self.trees {
            t.restore();
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lighting {
    pub ambient: f32,
    pub sun: f32,
}

impl Lighting {
    pub const BASE_AMBIENT: f32 = 0.5;
    pub const BASE_SUN: f32 = 1.2;
    pub const FLASH_AMBIENT: f32 = 1.5;
    pub const FLASH_SUN: f32 = 2.0;

    pub fn flash(&mut self) {
        self.ambient = Self::FLASH_AMBIENT;
        self.sun = Self::FLASH_SUN;
    }

    pub fn restore(&mut self) {
        *self = Self::default();
    }

    #[cfg(test)]
    pub fn is_flashing(&self) -> bool {
        self.ambient > Self::BASE_AMBIENT
    }
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: Self::BASE_AMBIENT,
            sun: Self::BASE_SUN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waves_move_with_the_clock() {
        let mut l = Landscape::new();
        l.animate(0.0);
        let a = l.wave_height(3.0, -10.0);
        l.animate(0.5);
        let b = l.wave_height(3.0, -10.0);
        assert_ne!(a, b);
        assert!(a.abs() <= 0.33 && b.abs() <= 0.33);
    }

    #[test]
    fn restoring_emissive_undoes_any_glow() {
        let mut l = Landscape::new();
        l.ground.emissive = 2.0;
        l.trees[3].emissive = 1.8;
        assert!(l.ground.is_glowing());
        l.restore_emissive();
        assert!(!l.ground.is_glowing());
        assert!(l.trees.iter().all(|t| !t.is_glowing()));
        assert_eq!(l.ocean.emissive, 0.3);
    }

    #[test]
    fn lightning_flash_and_restore() {
        let mut light = Lighting::default();
        light.flash();
        assert!(light.is_flashing());
        assert_eq!(light.sun, Lighting::FLASH_SUN);
        light.restore();
        assert_eq!(light, Lighting::default());
    }

    #[test]
    fn mountains_stand_on_their_feet() {
        let l = Landscape::new();
        for m in &l.mountains {
            assert!(m.peak().y > m.center.y);
            assert!(m.foot_y() < m.center.y);
        }
    }
}
