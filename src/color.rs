#![allow(clippy::module_name_repetitions)]
//! Color mode configuration and ANSI painting helpers for stderr diagnostics.
//!
//! Precedence: `NO_COLOR`, then `--color`, then `XCPNG_DEV_COLOR`, then TTY detection.
//! Only stderr one-liners are painted; the runtime's own output is never touched.

use clap::ValueEnum;
use once_cell::sync::OnceCell;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

static COLOR_MODE: OnceCell<ColorMode> = OnceCell::new();

pub fn set_color_mode(mode: ColorMode) {
    let _ = COLOR_MODE.set(mode);
}

fn parse_color_mode(s: &str) -> Option<ColorMode> {
    match s.trim().to_ascii_lowercase().as_str() {
        "auto" => Some(ColorMode::Auto),
        "always" | "on" | "true" | "yes" => Some(ColorMode::Always),
        "never" | "off" | "false" | "no" => Some(ColorMode::Never),
        _ => None,
    }
}

fn resolve(
    no_color: bool,
    cli: Option<ColorMode>,
    env_pref: Option<ColorMode>,
    is_tty: bool,
) -> bool {
    if no_color {
        return false;
    }
    match cli.or(env_pref).unwrap_or(ColorMode::Auto) {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => is_tty,
    }
}

pub fn color_enabled_stderr() -> bool {
    let env_pref = std::env::var("XCPNG_DEV_COLOR")
        .ok()
        .and_then(|v| parse_color_mode(&v));
    resolve(
        std::env::var_os("NO_COLOR").is_some(),
        COLOR_MODE.get().copied(),
        env_pref,
        atty::is(atty::Stream::Stderr),
    )
}

/// Wrap string with ANSI color code when enabled; otherwise return unchanged.
pub fn paint(enabled: bool, code: &str, s: &str) -> String {
    if enabled {
        format!("{code}{s}\x1b[0m")
    } else {
        s.to_string()
    }
}

pub fn log_info_stderr(use_color: bool, msg: &str) {
    eprintln!("{}", paint(use_color, "\x1b[36;1m", msg));
}

pub fn log_error_stderr(use_color: bool, msg: &str) {
    eprintln!("{}", paint(use_color, "\x1b[31;1m", msg));
}
