// Copyright (c) 2026 rezky_nightky

use std::env;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;

use crate::camera::{VIEWS, VIEW_COUNT};
use crate::error::ConfigError;
use crate::glyphs::glyph_mode_from_str;
use crate::highlight::HighlightKind;
use crate::runtime::{ColorMode, GlyphMode, Speed};

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  hydrocycle --speed 1 --fps 60 --duration 0 --view 0 --glyphs auto";

pub fn color_enabled_stdout() -> bool {
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn colorize_help_detail(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 64);
    for chunk in text.split_inclusive('\n') {
        let (line, nl) = chunk
            .strip_suffix('\n')
            .map(|l| (l, "\n"))
            .unwrap_or((chunk, ""));

        let is_heading =
            !line.starts_with(' ') && line.ends_with(':') && line == line.to_ascii_uppercase();

        let painted = if is_heading {
            format!("\x1b[1;36m{line}\x1b[0m")
        } else if let Some(rest) = line.strip_prefix("      Example:") {
            format!("      \x1b[32mExample:\x1b[0m{rest}")
        } else if let Some(rest) = line.strip_prefix("  hydrocycle") {
            format!("  \x1b[1;34mhydrocycle\x1b[0m{rest}")
        } else if line.starts_with("  -") {
            format!("\x1b[33m{line}\x1b[0m")
        } else {
            line.to_string()
        };
        out.push_str(&painted);
        out.push_str(nl);
    }
    out
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        colorize_help_detail(DEFAULT_PARAMS_USAGE)
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "hydrocycle", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        short = 'S',
        long = "speed",
        default_value_t = 1.0,
        allow_negative_numbers = true,
        help_heading = "SIMULATION",
        help = "Animation speed multiplier (min 0.1 max 5)"
    )]
    pub speed: f32,

    #[arg(
        long = "autostart",
        help_heading = "SIMULATION",
        help = "Start the cycle right away instead of waiting for Space"
    )]
    pub autostart: bool,

    #[arg(
        long = "highlight",
        help_heading = "SIMULATION",
        help = "Start with a legend highlight (see --list-legend)"
    )]
    pub highlight: Option<String>,

    #[arg(
        long = "splash",
        help_heading = "SIMULATION",
        help = "Show splash rings where rain hits the ground"
    )]
    pub splash: bool,

    #[arg(
        long = "seed",
        help_heading = "SIMULATION",
        help = "Seed the random source for a repeatable run"
    )]
    pub seed: Option<u64>,

    #[arg(
        long = "view",
        default_value_t = 0,
        help_heading = "APPEARANCE",
        help = "Initial camera view (min 0 max 4)"
    )]
    pub view: usize,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: 24-bit if supported (COLORTERM), else 8-bit"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "glyphs",
        default_value = "auto",
        help_heading = "APPEARANCE",
        help = "Glyph set: auto, ascii, unicode"
    )]
    pub glyphs: String,

    #[arg(
        long = "no-sound",
        help_heading = "GENERAL",
        help = "Start with sound cues muted"
    )]
    pub no_sound: bool,

    #[arg(
        long = "duration",
        allow_negative_numbers = true,
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        long = "log-file",
        help_heading = "GENERAL",
        help = "Write logs to this file (filter with HYDROCYCLE_LOG)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        short = 'f',
        long = "fps",
        default_value_t = 60.0,
        help_heading = "PERFORMANCE",
        help = "Target FPS (min 1 max 240)"
    )]
    pub fps: f64,

    #[arg(
        long = "perf-stats",
        help_heading = "PERFORMANCE",
        help = "Print performance statistics summary on exit"
    )]
    pub perf_stats: bool,

    #[arg(
        long = "check-bitcolor",
        help_heading = "HELP",
        help = "Print detected terminal color capability and exit"
    )]
    pub check_bitcolor: bool,

    #[arg(
        long = "help-detail",
        help_heading = "HELP",
        help = "Show detailed help for all parameters and exit"
    )]
    pub help_detail: bool,

    #[arg(
        long = "list-legend",
        help_heading = "HELP",
        help = "List legend highlights and their keys, then exit"
    )]
    pub list_legend: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

/// Validated run settings. Everything here is already in range.
#[derive(Clone, Debug)]
pub struct Settings {
    pub speed: Speed,
    pub fps: f64,
    pub duration: Option<Duration>,
    pub view: usize,
    pub highlight: Option<HighlightKind>,
    pub autostart: bool,
    pub splash: bool,
    pub sound: bool,
    pub seed: Option<u64>,
    pub color_mode: ColorMode,
    pub glyphs: GlyphMode,
    pub log_file: Option<PathBuf>,
    pub perf_stats: bool,
}

fn require_range(name: &'static str, v: f64, min: f64, max: f64) -> Result<f64, ConfigError> {
    if !v.is_finite() || v < min || v > max {
        return Err(ConfigError::OutOfRange {
            name,
            value: v,
            min,
            max,
        });
    }
    Ok(v)
}

impl Settings {
    /// `auto_color` and `default_to_ascii` come from the environment; they
    /// apply only when the matching option is left on auto.
    pub fn from_args(
        args: &Args,
        auto_color: ColorMode,
        default_to_ascii: bool,
    ) -> Result<Self, ConfigError> {
        let speed = Speed::new(args.speed)?;
        let fps = require_range("--fps", args.fps, 1.0, 240.0)?;
        let duration = match args.duration {
            Some(s) if s.is_finite() && s <= 0.0 => None,
            Some(s) => Some(Duration::from_secs_f64(require_range(
                "--duration",
                s,
                0.1,
                86400.0,
            )?)),
            None => None,
        };
        if args.view >= VIEW_COUNT {
            return Err(ConfigError::ViewOutOfRange {
                index: args.view,
                count: VIEW_COUNT,
            });
        }
        let highlight = args
            .highlight
            .as_deref()
            .map(HighlightKind::from_str)
            .transpose()?;
        let color_mode = match args.colormode {
            Some(m) => color_mode_from_arg(m)?,
            None => auto_color,
        };

        Ok(Self {
            speed,
            fps,
            duration,
            view: args.view,
            highlight,
            autostart: args.autostart,
            splash: args.splash,
            sound: !args.no_sound,
            seed: args.seed,
            color_mode,
            glyphs: glyph_mode_from_str(&args.glyphs, default_to_ascii)?,
            log_file: args.log_file.clone(),
            perf_stats: args.perf_stats,
        })
    }
}

pub fn color_mode_from_arg(m: u16) -> Result<ColorMode, ConfigError> {
    match m {
        0 => Ok(ColorMode::Mono),
        16 => Ok(ColorMode::Color16),
        8 | 256 => Ok(ColorMode::Color256),
        24 | 32 => Ok(ColorMode::TrueColor),
        _ => Err(ConfigError::ColorMode(m)),
    }
}

pub fn default_to_ascii() -> bool {
    let lang = env::var("LANG").unwrap_or_default();
    !lang.to_ascii_uppercase().contains("UTF")
}

pub fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    if term.contains("256color") {
        return ColorMode::Color256;
    }
    if term == "linux" || term.starts_with("vt") {
        return ColorMode::Color16;
    }

    ColorMode::Color256
}

pub fn color_mode_label(m: ColorMode) -> &'static str {
    match m {
        ColorMode::TrueColor => "24-bit truecolor",
        ColorMode::Color256 => "8-bit (256-color)",
        ColorMode::Mono => "mono",
        ColorMode::Color16 => "16-color",
    }
}

pub fn print_list_legend() {
    if color_enabled_stdout() {
        println!("\x1b[1;36mLEGEND HIGHLIGHTS:\x1b[0m");
        println!("\x1b[2mNOTE: Use the VALUE with --highlight, or press KEY while running.\x1b[0m");
    } else {
        println!("LEGEND HIGHLIGHTS:");
        println!("NOTE: Use the VALUE with --highlight, or press KEY while running.");
    }
    println!();
    println!("KEY  VALUE        DESCRIPTION");
    for kind in HighlightKind::ALL {
        println!("{:<4} {:<12} {}", kind.key(), kind.name(), kind.description());
    }
    println!();
    println!("VIEWS (--view, or press v to cycle):");
    for (i, v) in VIEWS.iter().enumerate() {
        println!("  {}  {}", i, v.name);
    }
}

pub fn print_help_detail() {
    let block = format!(
        "{}\n\nUSAGE:\n  hydrocycle [OPTIONS]\n\nSIMULATION:\n  -S, --speed <number>\n      Animation speed multiplier (min 0.1 max 5).\n      Example: hydrocycle --speed 2\n\n  --autostart\n      Start the cycle right away.\n      Example: hydrocycle --autostart\n\n  --highlight <kind>\n      Start with a legend highlight (vapor, cloud, rain, vegetation, ground, ocean).\n      Example: hydrocycle --highlight cloud\n\n  --splash\n      Show splash rings where rain lands.\n      Example: hydrocycle --autostart --splash\n\n  --seed <number>\n      Seed the random source for a repeatable run.\n      Example: hydrocycle --seed 42\n\nAPPEARANCE:\n  --view <0..4>\n      Initial camera view (0 front, 1 corner, 2 overhead, 3 west, 4 hills).\n      Example: hydrocycle --view 2\n\n  --colormode <0|16|8|24>\n      Force color mode; otherwise auto-detected from COLORTERM/TERM.\n      Example: hydrocycle --colormode 24\n\n  --glyphs <auto|ascii|unicode>\n      Glyph set; auto picks ascii when LANG is not UTF-8.\n      Example: hydrocycle --glyphs unicode\n\nGENERAL:\n  --no-sound\n      Start with sound cues muted.\n      Example: hydrocycle --no-sound\n\n  --duration <seconds>\n      Stop after N seconds (min 0.1 max 86400).\n      Example: hydrocycle --duration 30\n\n  --log-file <path>\n      Write logs to a file; filter with HYDROCYCLE_LOG (default info).\n      Example: HYDROCYCLE_LOG=debug hydrocycle --log-file cycle.log\n\nPERFORMANCE:\n  -f, --fps <number>\n      Target FPS (min 1 max 240). One frame is one simulation step.\n      Example: hydrocycle --fps 30\n\n  --perf-stats\n      Print performance statistics summary on exit.\n      Example: hydrocycle --duration 10 --perf-stats\n\nKEYS:\n  space      start / pause\n  r          reset the cycle\n  v          next camera view\n  a          toggle auto-rotate\n  up/down    speed +/- 0.25 (also + and -)\n  1-6        toggle a legend highlight\n  0          clear the highlight\n  m          toggle sound\n  q          open the quiz\n  esc        quit (or close the quiz)\n\nHELP:\n  --check-bitcolor\n      Print detected terminal color capability and exit.\n\n  --help\n      Show short help.\n\n  --help-detail\n      Show this detailed help.\n\n  --list-legend\n      List legend highlights and views, then exit.\n\n  -v, --version\n      Print version and exit.\n\n  -i, --info\n      Print version info and exit.\n",
        DEFAULT_PARAMS_USAGE
    );

    if color_enabled_stdout() {
        print!("{}", colorize_help_detail(&block));
    } else {
        print!("{}", block);
    }

    println!();
    println!("LIMITS / VALID RANGES:");
    println!("  --speed <number>         min {} max {}", Speed::MIN, Speed::MAX);
    println!("  --fps <number>           min 1 max 240");
    println!("  --duration <seconds>     min 0.1 max 86400 (<=0 disables)");
    println!("  --view <index>           min 0 max {}", VIEW_COUNT - 1);
    println!("  --colormode <0|16|8|24>  allowed values only (8==256, 24==32)");
    println!();
    print_list_legend();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(argv: &[&str]) -> Result<Settings, ConfigError> {
        let mut full = vec!["hydrocycle"];
        full.extend_from_slice(argv);
        let args = Args::try_parse_from(full).expect("argv parses");
        Settings::from_args(&args, ColorMode::Color256, true)
    }

    #[test]
    fn defaults_are_valid() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.speed, Speed::ONE);
        assert_eq!(s.fps, 60.0);
        assert_eq!(s.duration, None);
        assert_eq!(s.view, 0);
        assert_eq!(s.highlight, None);
        assert!(s.sound && !s.autostart && !s.splash);
        assert_eq!(s.color_mode, ColorMode::Color256);
        assert_eq!(s.glyphs, GlyphMode::Ascii);
    }

    #[test]
    fn bad_speed_is_rejected_at_the_boundary() {
        assert!(matches!(
            settings(&["--speed", "0"]),
            Err(ConfigError::NonPositiveSpeed(_))
        ));
        assert!(matches!(
            settings(&["-S", "-2"]),
            Err(ConfigError::NonPositiveSpeed(_))
        ));
        assert!(matches!(
            settings(&["--speed", "9"]),
            Err(ConfigError::OutOfRange { .. })
        ));
        assert_eq!(settings(&["-S", "2.5"]).unwrap().speed.get(), 2.5);
    }

    #[test]
    fn view_and_highlight_are_checked() {
        assert_eq!(
            settings(&["--view", "5"]).unwrap_err(),
            ConfigError::ViewOutOfRange { index: 5, count: 5 }
        );
        assert_eq!(settings(&["--view", "4"]).unwrap().view, 4);
        assert_eq!(
            settings(&["--highlight", "Ocean"]).unwrap().highlight,
            Some(HighlightKind::Ocean)
        );
        assert_eq!(
            settings(&["--highlight", "lava"]).unwrap_err(),
            ConfigError::UnknownHighlight("lava".into())
        );
    }

    #[test]
    fn colormode_values_map_and_others_fail() {
        assert_eq!(
            settings(&["--colormode", "16"]).unwrap().color_mode,
            ColorMode::Color16
        );
        assert_eq!(
            settings(&["--colormode", "32"]).unwrap().color_mode,
            ColorMode::TrueColor
        );
        assert_eq!(
            settings(&["--colormode", "0"]).unwrap().color_mode,
            ColorMode::Mono
        );
        assert_eq!(
            settings(&["--colormode", "7"]).unwrap_err(),
            ConfigError::ColorMode(7)
        );
    }

    #[test]
    fn duration_and_fps_ranges() {
        assert_eq!(settings(&["--duration", "0"]).unwrap().duration, None);
        assert_eq!(settings(&["--duration", "-3"]).unwrap().duration, None);
        assert_eq!(
            settings(&["--duration", "5"]).unwrap().duration,
            Some(Duration::from_secs(5))
        );
        assert!(settings(&["--duration", "0.01"]).is_err());
        assert!(matches!(
            settings(&["--fps", "500"]),
            Err(ConfigError::OutOfRange { name: "--fps", .. })
        ));
    }

    #[test]
    fn glyphs_follow_flag_then_locale() {
        assert_eq!(
            settings(&["--glyphs", "unicode"]).unwrap().glyphs,
            GlyphMode::Unicode
        );
        assert!(matches!(
            settings(&["--glyphs", "emoji"]),
            Err(ConfigError::GlyphSet(_))
        ));
    }

    #[test]
    fn help_detail_colouring_marks_headings_and_flags() {
        let out = colorize_help_detail("KEYS:\n  --speed <n>\nplain\n");
        assert!(out.starts_with("\x1b[1;36mKEYS:\x1b[0m\n"));
        assert!(out.contains("\x1b[33m  --speed <n>\x1b[0m\n"));
        assert!(out.ends_with("plain\n"));
    }
}
