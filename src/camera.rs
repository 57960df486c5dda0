// Copyright (c) 2026 rezky_nightky

//! Terminal camera: preset views, eased transitions and the world-to-cell
//! projection used by the renderer.

use std::time::Duration;

use glam::{Mat4, Quat, Vec3, Vec4};

use crate::collab::CameraRig;

pub const VIEW_COUNT: usize = 5;
pub const TWEEN_TIME: Duration = Duration::from_millis(1500);

/// One turn every two minutes, like a slow orbit control.
const AUTO_ROTATE_RAD_PER_SEC: f32 = std::f32::consts::TAU / 120.0;

const FOV_Y_DEG: f32 = 60.0;
const NEAR: f32 = 0.1;
const FAR: f32 = 1000.0;

/// Terminal cells are roughly twice as tall as they are wide.
pub const CELL_ASPECT: f32 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct View {
    pub name: &'static str,
    pub eye: Vec3,
    pub target: Vec3,
}

pub const VIEWS: [View; VIEW_COUNT] = [
    View {
        name: "front",
        eye: Vec3::new(0.0, 8.0, 30.0),
        target: Vec3::ZERO,
    },
    View {
        name: "corner",
        eye: Vec3::new(25.0, 12.0, 20.0),
        target: Vec3::ZERO,
    },
    View {
        name: "overhead",
        eye: Vec3::new(0.0, 25.0, 15.0),
        target: Vec3::ZERO,
    },
    View {
        name: "west",
        eye: Vec3::new(-20.0, 10.0, 10.0),
        target: Vec3::ZERO,
    },
    View {
        name: "hills",
        eye: Vec3::new(15.0, 5.0, 25.0),
        target: Vec3::new(0.0, 5.0, 0.0),
    },
];

pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

#[derive(Clone, Copy, Debug)]
struct Tween {
    from_eye: Vec3,
    from_target: Vec3,
    to_eye: Vec3,
    to_target: Vec3,
    elapsed: Duration,
}

#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    view: usize,
    tween: Option<Tween>,
    auto_rotate: bool,
}

impl Camera {
    pub fn new(view: usize) -> Self {
        let v = VIEWS[view.min(VIEW_COUNT - 1)];
        Self {
            eye: v.eye,
            target: v.target,
            view: view.min(VIEW_COUNT - 1),
            tween: None,
            auto_rotate: false,
        }
    }

    #[cfg(test)]
    pub fn view(&self) -> usize {
        self.view
    }

    pub fn view_name(&self) -> &'static str {
        VIEWS[self.view].name
    }

    pub fn next_view(&self) -> usize {
        (self.view + 1) % VIEW_COUNT
    }

    #[cfg(test)]
    pub fn is_moving(&self) -> bool {
        self.tween.is_some()
    }

    pub fn auto_rotate(&self) -> bool {
        self.auto_rotate
    }

    pub fn toggle_auto_rotate(&mut self) -> bool {
        self.auto_rotate = !self.auto_rotate;
        self.auto_rotate
    }

    /// Start a transition from wherever the camera is right now. A transition
    /// already in flight is replaced, never queued.
    fn glide_to(&mut self, eye: Vec3, target: Vec3) {
        self.tween = Some(Tween {
            from_eye: self.eye,
            from_target: self.target,
            to_eye: eye,
            to_target: target,
            elapsed: Duration::ZERO,
        });
    }

    pub fn update(&mut self, dt: Duration) {
        if let Some(tw) = &mut self.tween {
            tw.elapsed += dt;
            let t = ease_out_cubic(tw.elapsed.as_secs_f32() / TWEEN_TIME.as_secs_f32());
            self.eye = tw.from_eye.lerp(tw.to_eye, t);
            self.target = tw.from_target.lerp(tw.to_target, t);
            if tw.elapsed >= TWEEN_TIME {
                self.tween = None;
            }
            return;
        }
        if self.auto_rotate {
            let spin = Quat::from_rotation_y(AUTO_ROTATE_RAD_PER_SEC * dt.as_secs_f32());
            self.eye = self.target + spin * (self.eye - self.target);
        }
    }

    pub fn projection(&self, cols: u16, rows: u16) -> Projection {
        let cols = cols.max(1) as f32;
        let rows = rows.max(1) as f32;
        let aspect = cols / (rows * CELL_ASPECT);
        let proj = Mat4::perspective_rh(FOV_Y_DEG.to_radians(), aspect, NEAR, FAR);
        let view = Mat4::look_at_rh(self.eye, self.target, Vec3::Y);
        Projection {
            view_proj: proj * view,
            focal_x: proj.x_axis.x,
            cols,
            rows,
        }
    }
}

impl CameraRig for Camera {
    fn focus(&mut self, target: Vec3, distance: f32) {
        let eye = target + Vec3::new(distance * 0.5, distance * 0.5, distance * 0.7);
        self.glide_to(eye, target);
    }

    fn change_view(&mut self, index: usize) {
        let Some(v) = VIEWS.get(index) else {
            return;
        };
        self.view = index;
        self.glide_to(v.eye, v.target);
    }

    fn view_count(&self) -> usize {
        VIEW_COUNT
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    /// Cell coordinates; may be off screen.
    pub x: f32,
    pub y: f32,
    /// Distance along the view axis, for depth testing.
    pub depth: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct Projection {
    view_proj: Mat4,
    focal_x: f32,
    cols: f32,
    rows: f32,
}

impl Projection {
    pub fn project(&self, p: Vec3) -> Option<Projected> {
        let clip: Vec4 = self.view_proj * p.extend(1.0);
        if clip.w <= NEAR {
            return None;
        }
        let nx = clip.x / clip.w;
        let ny = clip.y / clip.w;
        Some(Projected {
            x: (nx + 1.0) * 0.5 * self.cols,
            y: (1.0 - ny) * 0.5 * self.rows,
            depth: clip.w,
        })
    }

    /// Horizontal size in cells of a world length seen at `depth`.
    pub fn span_cells(&self, world: f32, depth: f32) -> f32 {
        if depth <= 0.0 {
            return 0.0;
        }
        world * self.focal_x / depth * self.cols * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn ease_out_cubic_hits_its_ends() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert_eq!(ease_out_cubic(2.0), 1.0);
        assert!(ease_out_cubic(0.5) > 0.5);
    }

    #[test]
    fn view_change_glides_over_the_tween_time() {
        let mut cam = Camera::new(0);
        cam.change_view(2);
        assert!(cam.is_moving());
        cam.update(Duration::from_millis(750));
        assert!(!close(cam.eye, VIEWS[2].eye));
        cam.update(Duration::from_millis(750));
        assert!(!cam.is_moving());
        assert!(close(cam.eye, VIEWS[2].eye));
        assert_eq!(cam.view_name(), "overhead");
    }

    #[test]
    fn retriggering_replaces_the_running_tween() {
        let mut cam = Camera::new(0);
        cam.change_view(1);
        cam.update(Duration::from_millis(500));
        cam.focus(Vec3::new(10.0, 0.0, 10.0), 20.0);
        cam.update(TWEEN_TIME);
        assert!(close(cam.eye, Vec3::new(20.0, 10.0, 24.0)));
        assert!(close(cam.target, Vec3::new(10.0, 0.0, 10.0)));
    }

    #[test]
    fn out_of_range_view_is_ignored() {
        let mut cam = Camera::new(3);
        cam.change_view(VIEW_COUNT);
        assert_eq!(cam.view(), 3);
        assert!(!cam.is_moving());
        assert_eq!(cam.next_view(), 4);
        assert_eq!(Camera::new(4).next_view(), 0);
    }

    #[test]
    fn auto_rotate_keeps_distance_to_target() {
        let mut cam = Camera::new(0);
        let d0 = (cam.eye - cam.target).length();
        cam.toggle_auto_rotate();
        cam.update(Duration::from_secs(7));
        assert!(((cam.eye - cam.target).length() - d0).abs() < 1e-3);
        assert!(!close(cam.eye, VIEWS[0].eye));
    }

    #[test]
    fn target_projects_to_screen_centre() {
        let cam = Camera::new(0);
        let proj = cam.projection(120, 40);
        let p = proj.project(cam.target).unwrap();
        assert!((p.x - 60.0).abs() < 0.01);
        assert!((p.y - 20.0).abs() < 0.01);
        assert!(proj.project(cam.eye + Vec3::Z * 5.0).is_none());

        let up = proj.project(Vec3::new(0.0, 5.0, 0.0)).unwrap();
        assert!(up.y < p.y);
        let near = proj.project(Vec3::new(0.0, 0.0, 20.0)).unwrap();
        assert!(near.depth < p.depth);
    }
}
