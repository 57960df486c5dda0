// Copyright (c) 2026 rezky_nightky

//! Turns the simulation state into cells.
//!
//! World geometry is sampled on a coarse grid, projected through the camera
//! and splatted into the frame's depth buffer, so nearer things win no
//! matter the drawing order. HUD, legend, caption and quiz are overlays that
//! sit above the scene.

use std::f32::consts::TAU;

use glam::{Quat, Vec3};

use crate::camera::{Camera, Projection, CELL_ASPECT};
use crate::cell::Cell;
use crate::context::SimulationContext;
use crate::frame::Frame;
use crate::glyphs::Glyphs;
use crate::highlight::HighlightKind;
use crate::hud::{wrap, Hud};
use crate::palette::{ScenePalette, Tone};
use crate::quiz::{grade, percentage, Quiz, Stage, QUESTIONS, QUESTION_COUNT};
use crate::runtime::{ColorMode, GlyphMode};
use crate::scene::{Lighting, StaticMesh};

const SKY_DEPTH: f32 = f32::MAX;
const FAINT: f32 = 0.05;
const MAX_SPLAT: f32 = 8.0;

/// Everything outside the simulation that the overlays show.
pub struct Status<'a> {
    pub hud: &'a Hud,
    pub quiz: &'a Quiz,
    pub caption: Option<&'static str>,
    pub sound: bool,
    pub view: &'static str,
    pub auto_rotate: bool,
}

fn glow(emissive: f32, base: f32) -> f32 {
    1.0 + (emissive - base).max(0.0) * 0.35
}

fn scene_light(l: Lighting) -> f32 {
    0.6 + 0.4 * l.ambient / Lighting::BASE_AMBIENT
}

fn clip(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}

struct Line {
    text: String,
    tone: Tone,
    bold: bool,
}

impl Line {
    fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
            bold: false,
        }
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    fn blank() -> Self {
        Self::new(String::new(), Tone::Text)
    }
}

pub struct Renderer {
    palette: ScenePalette,
    glyphs: &'static Glyphs,
}

impl Renderer {
    pub fn new(color: ColorMode, glyphs: GlyphMode) -> Self {
        Self {
            palette: ScenePalette::new(color),
            glyphs: Glyphs::for_mode(glyphs),
        }
    }

    fn ink(&self, ch: char, tone: Tone, light: f32) -> Cell {
        let mono_glow = self.palette.mode() == ColorMode::Mono && light > 1.2;
        Cell::new(ch, self.palette.color(tone, light)).bold(mono_glow)
    }

    /// Foreground plus a darker fill of the same tone, for solid surfaces.
    fn solid(&self, ch: char, tone: Tone, light: f32) -> Cell {
        let bg = if self.palette.paints_background() {
            self.palette.color(tone, light * 0.55)
        } else {
            None
        };
        self.ink(ch, tone, light).on(bg)
    }

    pub fn draw(&self, frame: &mut Frame, sim: &SimulationContext, camera: &Camera, status: &Status) {
        let proj = camera.projection(frame.width, frame.height);
        let light = scene_light(sim.lighting());

        frame.begin_pass();
        self.sky(frame, light);
        self.sun(frame, &proj, sim);
        self.ocean(frame, &proj, sim, light);
        self.ground(frame, &proj, sim, light);
        self.river(frame, &proj, sim, light);
        self.mountains(frame, &proj, sim, light);
        self.trees(frame, &proj, sim, light);
        self.vapor(frame, &proj, sim, light);
        self.clouds(frame, &proj, sim, light);
        self.rain(frame, &proj, sim, light);
        if sim.splash_enabled() {
            self.splashes(frame, &proj, sim, light);
        }

        self.hud(frame, sim, status);
        self.legend(frame, sim.highlight());
        self.caption(frame, status.caption);
        if status.quiz.is_open() {
            self.quiz(frame, status.quiz);
        }
        frame.end_pass();
    }

    fn sky(&self, frame: &mut Frame, light: f32) {
        if !self.palette.paints_background() {
            return;
        }
        let h = frame.height.max(1) as f32;
        for y in 0..frame.height {
            let bg = self.palette.sky(y as f32 / h, light);
            for x in 0..frame.width {
                frame.plot(x as i32, y as i32, SKY_DEPTH, Cell::blank_with_bg(bg));
            }
        }
    }

    /// One grid sample of a surface, sized so neighbours touch.
    fn sample(&self, frame: &mut Frame, proj: &Projection, at: Vec3, step: f32, cell: Cell) {
        let Some(s) = proj.project(at) else {
            return;
        };
        let half = (proj.span_cells(step, s.depth) * 0.5).clamp(0.5, MAX_SPLAT);
        frame.splat(s.x, s.y, half, (half / CELL_ASPECT).max(0.5), s.depth, cell);
    }

    /// Filled screen-space ellipse around a projected world point. `shade`
    /// maps the normalised distance from the centre to a cell.
    fn blob(
        &self,
        frame: &mut Frame,
        proj: &Projection,
        centre: Vec3,
        radius: f32,
        shade: impl Fn(f32) -> Option<Cell>,
    ) {
        let Some(s) = proj.project(centre) else {
            return;
        };
        let rx = proj.span_cells(radius, s.depth).clamp(0.5, MAX_SPLAT * 3.0);
        let ry = (rx / CELL_ASPECT).max(0.5);
        let (cx, cy) = (s.x.round() as i32, s.y.round() as i32);
        let (ex, ey) = (rx.ceil() as i32, ry.ceil() as i32);
        for dy in -ey..=ey {
            for dx in -ex..=ex {
                let d2 = (dx as f32 / rx).powi(2) + (dy as f32 / ry).powi(2);
                if d2 > 1.0 {
                    continue;
                }
                if let Some(cell) = shade(d2) {
                    frame.plot_over(cx + dx, cy + dy, s.depth + d2, cell);
                }
            }
        }
    }

    fn sun(&self, frame: &mut Frame, proj: &Projection, sim: &SimulationContext) {
        let land = sim.landscape();
        let sun = &land.sun;
        let lum = sim.lighting().sun / Lighting::BASE_SUN * glow(sun.emissive, sun.base_emissive);
        let disc = self.ink(self.glyphs.sun, Tone::Sun, lum).bold(true);
        self.blob(frame, proj, sun.position, sun.size.x * 0.5, |_| Some(disc));

        let Some(s) = proj.project(sun.position) else {
            return;
        };
        let r = proj.span_cells(sun.size.x * 0.5, s.depth).clamp(0.5, MAX_SPLAT * 3.0);
        let ray = self.ink(self.glyphs.ray, Tone::Ray, lum);
        let reach = r * (1.4 + 0.8 * land.sun_ray_scale);
        for i in 0..8 {
            let a = i as f32 * TAU / 8.0 + land.sun_spin;
            let (sin, cos) = a.sin_cos();
            let mut d = r * 1.4;
            while d <= reach {
                let x = (s.x + cos * d).round() as i32;
                let y = (s.y + sin * d / CELL_ASPECT).round() as i32;
                frame.plot_over(x, y, s.depth + 0.5, ray);
                d += 1.0;
            }
        }
    }

    fn ocean(&self, frame: &mut Frame, proj: &Projection, sim: &SimulationContext, light: f32) {
        let land = sim.landscape();
        let o = &land.ocean;
        let lum = light * glow(o.emissive, o.base_emissive);
        let step = 1.0;
        for (x, z) in grid(o, step) {
            let h = land.wave_height(x, z);
            let ch = Glyphs::ramp(self.glyphs.water, (h + 0.33) / 0.66);
            let tone = if h > 0.25 { Tone::Foam } else { Tone::Ocean };
            let at = Vec3::new(x, o.position.y + h, z);
            self.sample(frame, proj, at, step, self.solid(ch, tone, lum));
        }
    }

    fn ground(&self, frame: &mut Frame, proj: &Projection, sim: &SimulationContext, light: f32) {
        let g = &sim.landscape().ground;
        let lum = light * glow(g.emissive, g.base_emissive);
        let top = g.position.y + g.size.y * 0.5;
        let step = 1.5;
        for (x, z) in grid(g, step) {
            let bare = ((x * 7.0 + z * 13.0) as i32).rem_euclid(5) == 0;
            let cell = if bare {
                self.solid(self.glyphs.ground, Tone::Ground, lum)
            } else {
                self.solid(self.glyphs.grass, Tone::Grass, lum)
            };
            self.sample(frame, proj, Vec3::new(x, top, z), step, cell);
        }
    }

    fn river(&self, frame: &mut Frame, proj: &Projection, sim: &SimulationContext, light: f32) {
        let land = sim.landscape();
        let r = &land.river;
        let cell = self.solid(self.glyphs.river, Tone::River, light);
        let step = 0.5;
        for (x, z) in grid(r, step) {
            let at = Vec3::new(x, r.position.y + land.river_ripple(z), z);
            self.sample(frame, proj, at, step, cell);
        }
    }

    fn mountains(&self, frame: &mut Frame, proj: &Projection, sim: &SimulationContext, light: f32) {
        const RINGS: usize = 8;
        for m in &sim.landscape().mountains {
            let peak = m.peak();
            let height = peak.y - m.foot_y();
            let base = m.radius * 1.5;
            for k in 0..=RINGS {
                let frac = k as f32 / RINGS as f32;
                let y = peak.y - height * frac;
                let r = base * frac;
                let cell = if frac < 0.3 {
                    self.solid(self.glyphs.snow, Tone::Snow, light)
                } else {
                    self.solid(self.glyphs.mountain, Tone::Mountain, light * (1.1 - frac * 0.4))
                };
                let spokes = (6.0 + 24.0 * frac) as usize;
                for s in 0..spokes {
                    let (sin, cos) = (s as f32 * TAU / spokes as f32).sin_cos();
                    let at = Vec3::new(peak.x + cos * r, y, peak.z + sin * r);
                    self.sample(frame, proj, at, base / RINGS as f32 * 1.5, cell);
                }
            }
        }
    }

    fn trees(&self, frame: &mut Frame, proj: &Projection, sim: &SimulationContext, light: f32) {
        for t in &sim.landscape().trees {
            let lum = light * glow(t.emissive, t.base_emissive);
            let h = t.size.y;
            let trunk = self.ink(self.glyphs.trunk, Tone::Trunk, lum);
            let mut y = 0.0;
            while y <= h * 0.45 {
                if let Some(s) = proj.project(t.position + Vec3::Y * y) {
                    frame.plot_over(s.x.round() as i32, s.y.round() as i32, s.depth, trunk);
                }
                y += 0.3;
            }
            let leaves = self.solid(self.glyphs.leaves, Tone::Leaves, lum);
            self.blob(frame, proj, t.position + Vec3::Y * h * 0.7, h * 0.3, |_| Some(leaves));
        }
    }

    fn vapor(&self, frame: &mut Frame, proj: &Projection, sim: &SimulationContext, light: f32) {
        for p in &sim.pools().vapor.particles {
            if !p.visible || p.opacity <= FAINT {
                continue;
            }
            let Some(s) = proj.project(p.position) else {
                continue;
            };
            let ch = Glyphs::ramp(self.glyphs.vapor, p.opacity / 0.7);
            let cell = self.ink(ch, Tone::Vapor, light * glow(p.emissive, p.base_emissive));
            frame.plot_over(s.x.round() as i32, s.y.round() as i32, s.depth, cell);
        }
    }

    fn clouds(&self, frame: &mut Frame, proj: &Projection, sim: &SimulationContext, light: f32) {
        for c in &sim.pools().clouds {
            if !c.visible {
                continue;
            }
            let turn = Quat::from_rotation_y(c.spin);
            for puff in &c.puffs {
                if puff.opacity <= FAINT {
                    continue;
                }
                let lum = light * glow(puff.emissive, 0.0);
                let ramp = self.glyphs.cloud;
                let opacity = puff.opacity;
                let centre = c.position + turn * puff.offset;
                self.blob(frame, proj, centre, puff.radius, |d2| {
                    let density = opacity * (1.0 - d2 * 0.6);
                    (density > FAINT).then(|| self.ink(Glyphs::ramp(ramp, density), Tone::Cloud, lum))
                });
            }
        }
    }

    fn rain(&self, frame: &mut Frame, proj: &Projection, sim: &SimulationContext, light: f32) {
        for p in &sim.pools().rain.particles {
            if !p.visible || p.opacity <= FAINT {
                continue;
            }
            let cell = self.ink(self.glyphs.rain, Tone::Rain, light * glow(p.emissive, p.base_emissive));
            let (Some(head), Some(tail)) = (
                proj.project(p.position),
                proj.project(p.position + Vec3::Y * 0.8),
            ) else {
                continue;
            };
            let (x0, y0) = (head.x.round() as i32, head.y.round() as i32);
            let y1 = tail.y.round() as i32;
            for y in y1.min(y0)..=y0.max(y1).min(y1.min(y0) + 3) {
                frame.plot_over(x0, y, head.depth, cell);
            }
        }
    }

    fn splashes(&self, frame: &mut Frame, proj: &Projection, sim: &SimulationContext, light: f32) {
        for p in &sim.pools().splash.particles {
            if !p.visible || p.opacity <= FAINT {
                continue;
            }
            let Some(s) = proj.project(p.position) else {
                continue;
            };
            let r = proj.span_cells(p.scale * 0.3, s.depth).clamp(0.5, MAX_SPLAT);
            let cell = self.ink(self.glyphs.splash, Tone::Splash, light * (0.5 + p.opacity));
            for i in 0..8 {
                let (sin, cos) = (i as f32 * TAU / 8.0).sin_cos();
                let x = (s.x + cos * r).round() as i32;
                let y = (s.y + sin * r / CELL_ASPECT).round() as i32;
                frame.plot_over(x, y, s.depth, cell);
            }
        }
    }

    fn boxed(&self, frame: &mut Frame, x: u16, y: u16, w: u16, lines: &[Line]) {
        let h = lines.len() as u16 + 2;
        let bg = if self.palette.paints_background() {
            self.palette.color(Tone::Panel, 1.0)
        } else {
            None
        };
        let border = self.palette.color(Tone::Dim, 1.0);
        let [tl, tr, bl, br, hz, vt] = self.glyphs.frame;
        let (right, bottom) = (x + w - 1, y + h - 1);
        for row in y..=bottom {
            for col in x..=right {
                let ch = match (row == y, row == bottom, col == x, col == right) {
                    (true, _, true, _) => tl,
                    (true, _, _, true) => tr,
                    (_, true, true, _) => bl,
                    (_, true, _, true) => br,
                    (true, _, _, _) | (_, true, _, _) => hz,
                    (_, _, true, _) | (_, _, _, true) => vt,
                    _ => ' ',
                };
                frame.overlay(col, row, Cell::new(ch, border).on(bg));
            }
        }
        let inner = w.saturating_sub(4) as usize;
        for (i, line) in lines.iter().enumerate() {
            let fg = self.palette.color(line.tone, 1.0);
            let proto = Cell::new(' ', fg).on(bg).bold(line.bold);
            frame.put_str(x + 2, y + 1 + i as u16, &clip(&line.text, inner), proto);
        }
    }

    fn hud(&self, frame: &mut Frame, sim: &SimulationContext, status: &Status) {
        let w = frame.width.min(46);
        if w < 24 || frame.height < 12 {
            return;
        }
        let inner = w as usize - 4;
        let hud = status.hud;
        let info = hud.info();

        let mut lines = vec![Line::new(info.title, Tone::Accent).bold()];
        lines.extend(
            wrap(info.text, inner)
                .into_iter()
                .take(4)
                .map(|l| Line::new(l, Tone::Text)),
        );
        lines.push(Line::blank());
        let bar = hud.progress_bar(inner.saturating_sub(6), self.glyphs.bar_full, self.glyphs.bar_empty);
        lines.push(Line::new(format!("{bar} {:>3}%", hud.percent()), Tone::Accent));
        let stats = hud
            .stat_lines()
            .iter()
            .map(|(k, v)| format!("{k} {v}"))
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(Line::new(stats, Tone::Text));
        lines.push(Line::new(
            format!(
                "{} {:.2}x  view {}{}  sound {}",
                if sim.is_running() { "running" } else { "paused" },
                sim.speed().get(),
                status.view,
                if status.auto_rotate { "*" } else { "" },
                if status.sound { "on" } else { "off" },
            ),
            Tone::Dim,
        ));
        if let Some(kind) = sim.highlight() {
            lines.push(Line::new(format!("> {}: {}", kind.name(), kind.description()), Tone::Good));
        }

        let room = frame.height.saturating_sub(4) as usize;
        lines.truncate(room.saturating_sub(2));
        self.boxed(frame, 0, 0, w, &lines);
    }

    fn legend(&self, frame: &mut Frame, active: Option<HighlightKind>) {
        if frame.height < 3 {
            return;
        }
        let row = frame.height - 2;
        let mut col = 1u16;
        for kind in HighlightKind::ALL {
            let on = active == Some(kind);
            let tone = if on { Tone::Good } else { Tone::Text };
            let proto = Cell::new(' ', self.palette.color(tone, 1.0)).bold(on);
            let label = format!("{} {}", kind.key(), kind.name());
            col += frame.put_str(col, row, &label, proto) + 2;
        }
        let help = "space start/pause  r reset  v view  a rotate  +/- speed  m sound  q quiz  esc quit";
        let proto = Cell::new(' ', self.palette.color(Tone::Dim, 1.0));
        frame.put_str(1, frame.height - 1, &clip(help, frame.width.saturating_sub(1) as usize), proto);
    }

    fn caption(&self, frame: &mut Frame, caption: Option<&str>) {
        let Some(text) = caption else {
            return;
        };
        let text = format!("~ {text} ~");
        let len = text.chars().count() as u16;
        if len >= frame.width || frame.height < 2 {
            return;
        }
        let x = (frame.width - len) / 2;
        let proto = Cell::new(' ', self.palette.color(Tone::Accent, 1.2)).bold(true);
        frame.put_str(x, 1.min(frame.height - 1), &text, proto);
    }

    fn quiz(&self, frame: &mut Frame, quiz: &Quiz) {
        let w = frame.width.saturating_sub(4).min(64);
        if w < 20 {
            return;
        }
        let inner = w as usize - 4;
        let mut lines = Vec::new();
        match quiz.stage() {
            Stage::Closed => return,
            Stage::Asking => {
                let at = quiz.cursor();
                let q = &QUESTIONS[at];
                lines.push(Line::new(format!("Quiz  question {}/{}", at + 1, QUESTION_COUNT), Tone::Accent).bold());
                lines.push(Line::blank());
                lines.extend(wrap(q.prompt, inner).into_iter().map(|l| Line::new(l, Tone::Text).bold()));
                lines.push(Line::blank());
                for (i, opt) in q.options.iter().enumerate() {
                    let picked = quiz.answer(at) == Some(i);
                    let mark = if picked { '>' } else { ' ' };
                    let tone = if picked { Tone::Good } else { Tone::Text };
                    for (n, l) in wrap(&format!("{}) {opt}", i + 1), inner - 2).into_iter().enumerate() {
                        let lead = if n == 0 { mark } else { ' ' };
                        lines.push(Line::new(format!("{lead} {l}"), tone));
                    }
                }
                lines.push(Line::blank());
                let answered = (0..QUESTION_COUNT).filter(|&i| quiz.answer(i).is_some()).count();
                lines.push(Line::new(format!("answered {answered}/{QUESTION_COUNT}"), Tone::Dim));
                lines.push(Line::new("1-4 answer  left/right question  enter submit  esc close", Tone::Dim));
            }
            Stage::Result { score } => {
                let pct = percentage(score, QUESTION_COUNT);
                let tone = if pct >= 60 { Tone::Good } else { Tone::Bad };
                lines.push(Line::new("Quiz result", Tone::Accent).bold());
                lines.push(Line::blank());
                lines.push(Line::new(format!("Score: {score}/{QUESTION_COUNT}"), tone).bold());
                lines.extend(wrap(grade(pct), inner).into_iter().map(|l| Line::new(l, tone)));
                lines.push(Line::new(format!("Percentage: {pct}%"), Tone::Text));
                lines.push(Line::blank());
                lines.push(Line::new("enter finish  r retry  esc close", Tone::Dim));
            }
        }
        lines.truncate(frame.height.saturating_sub(2) as usize);
        let h = lines.len() as u16 + 2;
        let x = (frame.width - w) / 2;
        let y = frame.height.saturating_sub(h) / 2;
        self.boxed(frame, x, y, w, &lines);
    }
}

/// Sample points covering a mesh's horizontal footprint.
fn grid(mesh: &StaticMesh, step: f32) -> impl Iterator<Item = (f32, f32)> {
    let (hx, hz) = (mesh.size.x * 0.5, mesh.size.z * 0.5);
    let (x0, z0) = (mesh.position.x - hx, mesh.position.z - hz);
    let nx = (mesh.size.x / step).floor() as usize;
    let nz = (mesh.size.z / step).floor() as usize;
    (0..=nz).flat_map(move |j| (0..=nx).map(move |i| (x0 + i as f32 * step, z0 + j as f32 * step)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::Display;
    use crate::context::SimConfig;
    use crate::cycle::Phase;

    fn row(frame: &Frame, y: u16) -> String {
        (0..frame.width)
            .map(|x| frame.get(x, y).map_or(' ', |c| c.ch))
            .collect()
    }

    fn scene() -> (SimulationContext, Camera, Hud, Quiz) {
        let sim = SimulationContext::new(SimConfig {
            seed: Some(3),
            ..SimConfig::default()
        });
        (sim, Camera::new(0), Hud::new(), Quiz::new())
    }

    fn status<'a>(hud: &'a Hud, quiz: &'a Quiz) -> Status<'a> {
        Status {
            hud,
            quiz,
            caption: None,
            sound: true,
            view: "front",
            auto_rotate: false,
        }
    }

    #[test]
    fn grid_covers_the_footprint() {
        let land = crate::scene::Landscape::new();
        let pts: Vec<_> = grid(&land.river, 0.5).collect();
        assert_eq!(pts.len(), 5 * 31);
        assert_eq!(pts[0], (1.0, 0.5));
    }

    #[test]
    fn scene_fills_the_frame_and_hud_names_the_phase() {
        let (sim, cam, mut hud, quiz) = scene();
        hud.set_phase_info(Phase::Evaporation);
        let mut frame = Frame::new(120, 40, None);
        let r = Renderer::new(ColorMode::TrueColor, GlyphMode::Ascii);
        r.draw(&mut frame, &sim, &cam, &status(&hud, &quiz));

        assert!(row(&frame, 1).contains("Evaporation"));
        assert!(row(&frame, 38).contains("1 vapor"));
        assert!(row(&frame, 39).contains("q quiz"));
        let water = (0..frame.height)
            .flat_map(|y| (0..frame.width).map(move |x| (x, y)))
            .filter(|&(x, y)| frame.get(x, y).is_some_and(|c| "~-=".contains(c.ch)))
            .count();
        assert!(water > 50, "ocean should be visible from the front view");
    }

    #[test]
    fn quiz_box_shows_the_current_question() {
        let (sim, cam, hud, mut quiz) = scene();
        quiz.open(false);
        let mut frame = Frame::new(100, 40, None);
        let r = Renderer::new(ColorMode::Mono, GlyphMode::Unicode);
        r.draw(&mut frame, &sim, &cam, &status(&hud, &quiz));
        let text: String = (0..frame.height).map(|y| row(&frame, y)).collect();
        assert!(text.contains(QUESTIONS[0].prompt));
        assert!(text.contains("question 1/5"));
    }

    #[test]
    fn tiny_terminals_do_not_panic() {
        let (sim, cam, hud, mut quiz) = scene();
        quiz.open(true);
        let r = Renderer::new(ColorMode::Color16, GlyphMode::Ascii);
        for (w, h) in [(0, 0), (1, 1), (10, 3), (30, 8)] {
            let mut frame = Frame::new(w, h, None);
            r.draw(&mut frame, &sim, &cam, &status(&hud, &quiz));
        }
    }
}
