//! Runtime configuration.

use std::env;

use crate::types::{
    DEFAULT_EDITOR_SPLIT, DEFAULT_LOG_CAPACITY, DEFAULT_MAX_EVENTS_PER_PUMP, MIN_PANEL_WIDTH,
};

/// Settings shared by every system a [`crate::Gui`] produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuiConfig {
    /// Attach a visible editor to every new system.
    pub editor_on_start: bool,
    /// Width of the editor's right panel in columns.
    pub editor_split: u16,
    /// Captured diagnostic lines kept for the editor.
    pub log_capacity: usize,
    /// File that receives formatted logs while the terminal is owned.
    pub log_path: Option<String>,
    /// Queued surface events handled per pump.
    pub max_events_per_pump: usize,
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            editor_on_start: false,
            editor_split: DEFAULT_EDITOR_SPLIT,
            log_capacity: DEFAULT_LOG_CAPACITY,
            log_path: None,
            max_events_per_pump: DEFAULT_MAX_EVENTS_PER_PUMP,
        }
    }
}

impl GuiConfig {
    /// Create from `TERMGUI_*` environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`GuiConfig::from_env`] but reading through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let editor_on_start = lookup("TERMGUI_EDITOR")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(defaults.editor_on_start);

        let editor_split = lookup("TERMGUI_EDITOR_SPLIT")
            .and_then(|s| s.trim().parse::<u16>().ok())
            .map(|v| v.max(MIN_PANEL_WIDTH))
            .unwrap_or(defaults.editor_split);

        let log_capacity = lookup("TERMGUI_LOG_CAPACITY")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(defaults.log_capacity);

        let log_path = lookup("TERMGUI_LOG_PATH")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let max_events_per_pump = lookup("TERMGUI_MAX_EVENTS")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(defaults.max_events_per_pump);

        Self {
            editor_on_start,
            editor_split,
            log_capacity,
            log_path,
            max_events_per_pump,
        }
    }
}
