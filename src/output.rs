//! # Terminal Output
//!
//! Colour and emoji decisions for everything the CLI prints, plus the small
//! painters used by the result tables.
//!
//! `--color=always|never` wins outright. With `auto`, colours are off when
//! `NO_COLOR` is set (any value), `CLICOLOR=0` or `TERM=dumb`, and forced on by
//! a non-zero `CLICOLOR_FORCE`; otherwise stdout must be a colour-capable TTY.
//! Plain mode swaps emoji for bracketed tags such as `[SYNC]`.

use std::env;

use console::style;

use crate::results::SyncState;

/// Whether colours and emoji are used in output.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl OutputConfig {
    /// Builds the configuration from the `--color` flag value and the
    /// process environment. Unknown flag values behave like `auto`.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_ascii_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => auto_color(
                |name| env::var_os(name).map(|v| v.to_string_lossy().into_owned()),
                || console::Term::stdout().features().colors_supported(),
            ),
        };
        Self { use_color }
    }

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

/// The `auto` decision over an environment lookup and a terminal probe.
fn auto_color(var: impl Fn(&str) -> Option<String>, terminal: impl FnOnce() -> bool) -> bool {
    if var("NO_COLOR").is_some() {
        return false;
    }
    if var("CLICOLOR").as_deref() == Some("0") {
        return false;
    }
    if var("CLICOLOR_FORCE").is_some_and(|v| !v.is_empty() && v != "0") {
        return true;
    }
    if var("TERM").as_deref() == Some("dumb") {
        return false;
    }
    terminal()
}

/// `emoji_str` in colour mode, `plain` otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// A sync state label, coloured by outcome when colours are on.
pub fn paint_state(config: &OutputConfig, state: SyncState) -> String {
    let label = state.to_string();
    if !config.use_color {
        return label;
    }
    match state {
        SyncState::Cloned | SyncState::Updated => style(label).green().to_string(),
        SyncState::Failed => style(label).red().bold().to_string(),
        SyncState::InProgress | SyncState::Pending => style(label).yellow().to_string(),
    }
}

/// `ok` or `FAILED`, coloured when colours are on.
pub fn paint_success(config: &OutputConfig, success: bool) -> String {
    let label = if success { "ok" } else { "FAILED" };
    match (config.use_color, success) {
        (false, _) => label.to_string(),
        (true, true) => style(label).green().to_string(),
        (true, false) => style(label).red().bold().to_string(),
    }
}

/// Dims secondary text such as versions and durations.
pub fn dim(config: &OutputConfig, text: &str) -> String {
    if config.use_color {
        style(text).dim().to_string()
    } else {
        text.to_string()
    }
}
