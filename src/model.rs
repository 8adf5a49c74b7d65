//! Core data models for the timestamp display.
//! Cell kinds map onto the CSS classes the admin templates emit.

use serde::Deserialize;

use crate::error::DisplayError;

/// Attribute holding the absolute instant of a cell.
pub const ATTR_UTC: &str = "data-utc";
/// Attribute holding the server-rendered local string of a cell.
pub const ATTR_LOCAL: &str = "data-local";

/// Which rendering the toggleable cells currently show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayMode {
    /// Viewer's local zone, computed in the browser.
    Browser,
    /// Server-chosen zone, taken verbatim from `data-local`.
    Server,
}

impl DisplayMode {
    pub fn from_checked(checked: bool) -> Self {
        if checked {
            DisplayMode::Browser
        } else {
            DisplayMode::Server
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Run-at cell, toggleable between browser and server time.
    Run,
    /// Due-at cell, toggleable between browser and server time.
    Due,
    /// Countdown cell refreshed by the ticker.
    DueIn,
    /// Due-at cell rendered once in browser time.
    DueBrowser,
}

impl CellKind {
    pub const TOGGLEABLE: [CellKind; 2] = [CellKind::Run, CellKind::Due];

    pub fn class_name(self) -> &'static str {
        match self {
            CellKind::Run => "dt-run",
            CellKind::Due => "dt-due",
            CellKind::DueIn => "dt-duein",
            CellKind::DueBrowser => "dt-due-browser",
        }
    }

    pub fn selector(self) -> String {
        format!(".{}", self.class_name())
    }
}

/// Page-level settings, optionally overridden by a JSON script block.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Id of the browser-time checkbox, also the anchor for the zone badge.
    pub toggle_id: String,
    pub tick_interval_ms: u32,
    pub show_tz_badge: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            toggle_id: "view-browser-tz".to_string(),
            tick_interval_ms: 30_000,
            show_tz_badge: true,
        }
    }
}

impl Config {
    pub fn from_json(raw: &str) -> Result<Self, DisplayError> {
        let config: Config = serde_json::from_str(raw)?;
        Ok(config.sanitized())
    }

    // a zero interval would spin the event loop
    fn sanitized(mut self) -> Self {
        if self.tick_interval_ms == 0 {
            self.tick_interval_ms = Config::default().tick_interval_ms;
        }
        self
    }
}
