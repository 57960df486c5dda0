// Copyright (c) 2026 rezky_nightky

mod audio;
mod camera;
mod cell;
mod collab;
mod config;
mod context;
mod cycle;
mod error;
mod frame;
mod glyphs;
mod highlight;
mod hud;
mod kinematics;
mod palette;
mod particle;
mod quiz;
mod render;
mod runtime;
mod scene;
mod scheduler;
mod terminal;

use std::env;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use glam::Vec3;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::audio::AudioDeck;
use crate::camera::Camera;
use crate::collab::{Ambient, Audio, CameraRig, Cue, Display, QuizGate};
use crate::config::{
    color_enabled_stdout, color_mode_label, color_mode_from_arg, default_params_usage_for_help,
    default_to_ascii, detect_color_mode_auto, print_help_detail, print_list_legend, Args,
    Settings,
};
use crate::context::{SimConfig, SimulationContext};
use crate::cycle::{Phase, Stats};
use crate::frame::Frame;
use crate::highlight::HighlightKind;
use crate::hud::Hud;
use crate::quiz::{Quiz, QuizInput};
use crate::render::{Renderer, Status};
use crate::runtime::Speed;
use crate::terminal::{restore_terminal_best_effort, Terminal};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

const SPEED_STEP: f32 = 0.25;

fn build_info() -> &'static str {
    env!("HYDROCYCLE_BUILD")
}

fn git_sha() -> &'static str {
    env!("HYDROCYCLE_GIT_SHA")
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn init_logging(path: &Path) -> std::io::Result<()> {
    let file = File::create(path)?;
    let filter =
        EnvFilter::try_from_env("HYDROCYCLE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}

/// The terminal-side collaborators, bundled so the simulation sees one
/// `Collaborators` value.
struct Outputs {
    hud: Hud,
    audio: AudioDeck,
    camera: Camera,
    quiz: Quiz,
}

impl Display for Outputs {
    fn set_phase_info(&mut self, phase: Phase) {
        self.hud.set_phase_info(phase);
    }

    fn set_progress_percent(&mut self, percent: u8) {
        self.hud.set_progress_percent(percent);
    }

    fn set_stats(&mut self, stats: &Stats) {
        self.hud.set_stats(stats);
    }
}

impl Audio for Outputs {
    fn play_cue(&mut self, cue: Cue) {
        self.audio.play_cue(cue);
    }

    fn play_ambient(&mut self, ambient: Ambient) {
        self.audio.play_ambient(ambient);
    }

    fn stop_ambient(&mut self) {
        self.audio.stop_ambient();
    }
}

impl CameraRig for Outputs {
    fn focus(&mut self, target: Vec3, distance: f32) {
        self.camera.focus(target, distance);
    }

    fn change_view(&mut self, index: usize) {
        CameraRig::change_view(&mut self.camera, index);
    }

    fn view_count(&self) -> usize {
        self.camera.view_count()
    }
}

impl QuizGate for Outputs {
    fn on_cycle_complete(&mut self) {
        self.quiz.on_cycle_complete();
    }
}

enum Flow {
    Continue,
    Quit,
}

fn quiz_key(code: KeyCode) -> Option<QuizInput> {
    match code {
        KeyCode::Char(c @ '1'..='4') => Some(QuizInput::Choose(c as usize - '1' as usize)),
        KeyCode::Left | KeyCode::Up => Some(QuizInput::Prev),
        KeyCode::Right | KeyCode::Down => Some(QuizInput::Next),
        KeyCode::Enter => Some(QuizInput::Submit),
        KeyCode::Char('r') => Some(QuizInput::Retry),
        KeyCode::Esc => Some(QuizInput::Close),
        _ => None,
    }
}

fn handle_key(k: KeyEvent, sim: &mut SimulationContext, out: &mut Outputs) -> Flow {
    if k.code == KeyCode::Char('c') && k.modifiers.contains(KeyModifiers::CONTROL) {
        return Flow::Quit;
    }

    if out.quiz.is_open() {
        if let Some(exit) = quiz_key(k.code).and_then(|input| out.quiz.apply(input)) {
            if exit.resume {
                sim.start();
            }
        }
        return Flow::Continue;
    }

    match k.code {
        KeyCode::Esc => return Flow::Quit,
        KeyCode::Char(' ') => sim.toggle_running(),
        KeyCode::Char('r') => sim.reset(out),
        KeyCode::Char('v') => {
            let next = out.camera.next_view();
            if let Err(e) = sim.change_view(next, out) {
                warn!("{e}");
            }
        }
        KeyCode::Char('a') => {
            out.camera.toggle_auto_rotate();
        }
        KeyCode::Up | KeyCode::Char('+') | KeyCode::Char('=') => {
            sim.set_speed(Speed::clamped(sim.speed().get() + SPEED_STEP));
        }
        KeyCode::Down | KeyCode::Char('-') => {
            sim.set_speed(Speed::clamped(sim.speed().get() - SPEED_STEP));
        }
        KeyCode::Char('0') => sim.set_highlight(None, out),
        KeyCode::Char(c @ '1'..='6') => {
            if let Some(kind) = HighlightKind::from_key(c as u8 - b'0') {
                sim.toggle_highlight(kind, out);
            }
        }
        KeyCode::Char('m') => {
            out.audio.toggle();
        }
        KeyCode::Char('q') => out.quiz.open(false),
        _ => {}
    }
    Flow::Continue
}

fn main() -> std::io::Result<()> {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();

    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }
    cmd.build();

    let matches = cmd.get_matches_from(env::args_os());
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.list_legend {
        print_list_legend();
        return Ok(());
    }

    if args.help_detail {
        print_help_detail();
        return Ok(());
    }

    if args.check_bitcolor {
        let colorterm = env::var("COLORTERM").unwrap_or_default();
        let term = env::var("TERM").unwrap_or_default();
        let auto = detect_color_mode_auto();

        println!("BITCOLOR CHECK:");
        println!(
            "  COLORTERM: {}",
            if colorterm.is_empty() {
                "(unset)"
            } else {
                &colorterm
            }
        );
        println!(
            "  TERM: {}",
            if term.is_empty() { "(unset)" } else { &term }
        );
        println!("  auto_detected: {}", color_mode_label(auto));
        let effective = match args.colormode.map(color_mode_from_arg).transpose() {
            Ok(forced) => {
                if let Some(m) = forced {
                    println!("  forced: {}", color_mode_label(m));
                }
                forced.unwrap_or(auto)
            }
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        };
        println!("  effective: {}", color_mode_label(effective));
        return Ok(());
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", build_info());
        if !git_sha().is_empty() {
            println!("Commit: {}", git_sha());
        }
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        println!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
        return Ok(());
    }

    let settings = match Settings::from_args(&args, detect_color_mode_auto(), default_to_ascii())
    {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    if let Some(path) = &settings.log_file {
        if let Err(e) = init_logging(path) {
            eprintln!("failed to open --log-file {}: {}", path.display(), e);
            std::process::exit(1);
        }
    }
    info!(
        speed = settings.speed.get(),
        fps = settings.fps,
        color = color_mode_label(settings.color_mode),
        seed = ?settings.seed,
        "starting"
    );

    let mut sim = SimulationContext::new(SimConfig {
        speed: settings.speed,
        seed: settings.seed,
        splash: settings.splash,
        ..SimConfig::default()
    });
    let mut out = Outputs {
        hud: Hud::new(),
        audio: AudioDeck::new(settings.sound),
        camera: Camera::new(settings.view),
        quiz: Quiz::new(),
    };
    if settings.highlight.is_some() {
        sim.set_highlight(settings.highlight, &mut out);
    }
    if settings.autostart {
        sim.start();
    }

    let renderer = Renderer::new(settings.color_mode, settings.glyphs);

    let mut term = Terminal::new()?;
    let _ = term.set_title("hydrocycle");
    let (w, h) = term.size()?;
    let mut frame = Frame::new(w, h, None);

    let start_time = Instant::now();
    let end_time = settings.duration.map(|d| start_time + d);

    let target_period = Duration::from_secs_f64(1.0 / settings.fps);
    let target_period_s = target_period.as_secs_f32().max(0.000_001);
    let mut next_frame = Instant::now();

    let mut perf_frames: u64 = 0;
    let mut perf_drawn_frames: u64 = 0;
    let mut perf_work_sum_s: f64 = 0.0;
    let mut perf_work_max_s: f32 = 0.0;
    let mut perf_overshoot_frames: u64 = 0;

    let mut running = true;
    while running {
        if end_time.is_some_and(|end| Instant::now() >= end) {
            break;
        }
        let mut pending_resize: Option<(u16, u16)> = None;

        loop {
            while Terminal::poll_event(Duration::from_millis(0))? {
                match Terminal::read_event()? {
                    Event::Resize(nw, nh) => {
                        pending_resize = Some((nw, nh));
                    }
                    Event::Key(k) if k.kind == KeyEventKind::Press => {
                        if let Flow::Quit = handle_key(k, &mut sim, &mut out) {
                            running = false;
                            break;
                        }
                    }
                    _ => {}
                }
            }

            if !running || pending_resize.is_some() {
                break;
            }

            let now = Instant::now();
            if now >= next_frame {
                break;
            }

            let mut timeout = next_frame - now;
            if let Some(end) = end_time {
                if now >= end {
                    break;
                }
                timeout = timeout.min(end - now);
            }
            let _ = Terminal::poll_event(timeout)?;
        }

        if !running {
            break;
        }

        if let Some((nw, nh)) = pending_resize {
            frame = Frame::new(nw, nh, None);
        }

        let work_start = Instant::now();
        sim.tick(target_period, &mut out);
        out.camera.update(target_period);
        if out.audio.take_bell() {
            term.bell()?;
        }

        let status = Status {
            hud: &out.hud,
            quiz: &out.quiz,
            caption: out.audio.caption(Instant::now()),
            sound: out.audio.is_enabled(),
            view: out.camera.view_name(),
            auto_rotate: out.camera.auto_rotate(),
        };
        renderer.draw(&mut frame, &sim, &out.camera, &status);
        let did_draw = frame.is_dirty_all() || !frame.dirty_indices().is_empty();
        if did_draw {
            term.draw(&mut frame)?;
        }
        let work_s = work_start.elapsed().as_secs_f32();

        if settings.perf_stats {
            perf_frames = perf_frames.saturating_add(1);
            if did_draw {
                perf_drawn_frames = perf_drawn_frames.saturating_add(1);
            }
            perf_work_sum_s += work_s as f64;
            perf_work_max_s = perf_work_max_s.max(work_s);
            if work_s > target_period_s {
                perf_overshoot_frames = perf_overshoot_frames.saturating_add(1);
            }
        }

        next_frame += target_period;
        let now = Instant::now();
        if now > next_frame {
            next_frame = now;
        }
    }

    info!(cycles = sim.cycle_count(), "stopped");
    drop(term);

    if settings.perf_stats {
        let elapsed_s = start_time.elapsed().as_secs_f64().max(0.000_001);
        let frames = perf_frames.max(1);
        let avg_work_ms = (perf_work_sum_s / frames as f64) * 1000.0;
        let avg_fps = (perf_frames as f64) / elapsed_s;
        let drawn_ratio = (perf_drawn_frames as f64) / (frames as f64);

        println!("PERF STATS:");
        println!("  elapsed_s: {:.3}", elapsed_s);
        println!("  target_fps: {:.3}", settings.fps);
        println!("  avg_fps: {:.3}", avg_fps);
        println!("  frames: {}", perf_frames);
        println!(
            "  drawn_frames: {} ({:.1}%)",
            perf_drawn_frames,
            drawn_ratio * 100.0
        );
        println!("  avg_work_ms: {:.3}", avg_work_ms);
        println!("  max_work_ms: {:.3}", perf_work_max_s as f64 * 1000.0);
        println!(
            "  overshoot_frames: {} ({:.1}%)",
            perf_overshoot_frames,
            (perf_overshoot_frames as f64) / (frames as f64) * 100.0
        );
        println!("  cycles: {}", sim.cycle_count());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (SimulationContext, Outputs) {
        let sim = SimulationContext::new(SimConfig {
            seed: Some(5),
            ..SimConfig::default()
        });
        let out = Outputs {
            hud: Hud::new(),
            audio: AudioDeck::new(true),
            camera: Camera::new(0),
            quiz: Quiz::new(),
        };
        (sim, out)
    }

    fn press(sim: &mut SimulationContext, out: &mut Outputs, code: KeyCode) -> bool {
        matches!(
            handle_key(KeyEvent::new(code, KeyModifiers::NONE), sim, out),
            Flow::Quit
        )
    }

    #[test]
    fn keys_drive_the_simulation() {
        let (mut sim, mut out) = setup();
        press(&mut sim, &mut out, KeyCode::Char(' '));
        assert!(sim.is_running());
        press(&mut sim, &mut out, KeyCode::Char('+'));
        assert_eq!(sim.speed().get(), 1.25);
        press(&mut sim, &mut out, KeyCode::Char('3'));
        assert_eq!(sim.highlight(), Some(HighlightKind::Rain));
        press(&mut sim, &mut out, KeyCode::Char('3'));
        assert_eq!(sim.highlight(), None);
        press(&mut sim, &mut out, KeyCode::Char('m'));
        assert!(!out.audio.is_enabled());
        assert!(press(&mut sim, &mut out, KeyCode::Esc));
    }

    #[test]
    fn open_quiz_swallows_keys_and_esc_only_closes_it() {
        let (mut sim, mut out) = setup();
        press(&mut sim, &mut out, KeyCode::Char('q'));
        assert!(out.quiz.is_open());
        press(&mut sim, &mut out, KeyCode::Char(' '));
        assert!(!sim.is_running());
        assert!(!press(&mut sim, &mut out, KeyCode::Esc));
        assert!(!out.quiz.is_open());
    }

    #[test]
    fn finishing_a_cycle_quiz_resumes_the_cycle() {
        let (mut sim, mut out) = setup();
        out.quiz.on_cycle_complete();
        press(&mut sim, &mut out, KeyCode::Enter);
        assert!(out.quiz.is_open());
        press(&mut sim, &mut out, KeyCode::Enter);
        assert!(!out.quiz.is_open());
        assert!(sim.is_running());
    }

    #[test]
    fn ctrl_c_quits_even_inside_the_quiz() {
        let (mut sim, mut out) = setup();
        out.quiz.open(false);
        let k = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(matches!(handle_key(k, &mut sim, &mut out), Flow::Quit));
    }
}
