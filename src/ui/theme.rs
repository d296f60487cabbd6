//! Dashboard colours.
//!
//! Two palettes, picked from the terminal background luminance at startup.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::HealthStatus;

/// Background luminance above which the light palette is used.
const LIGHT_BACKGROUND: f32 = 0.5;

/// Colours and styles used by every widget of the dashboard.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent for status messages and overlays.
    pub highlight: Color,
    pub healthy: Color,
    pub warning: Color,
    pub critical: Color,
    pub border: Color,
    /// History tokens for cycles without reply, and RTTs left over from an
    /// earlier cycle.
    pub missed: Color,
    pub header: Style,
    pub selected: Style,
    pub border_type: BorderType,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            healthy: Color::Green,
            warning: Color::Yellow,
            critical: Color::Red,
            border: Color::Gray,
            missed: Color::LightRed,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
        }
    }

    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            healthy: Color::Green,
            warning: Color::Yellow,
            critical: Color::Red,
            border: Color::DarkGray,
            missed: Color::Red,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            border_type: BorderType::Rounded,
        }
    }

    /// Palette for a background luminance in `0.0..=1.0`; dark when unknown.
    pub fn for_luma(luma: Option<f32>) -> Self {
        match luma {
            Some(luma) if luma > LIGHT_BACKGROUND => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Query the terminal background. Must run before raw mode is enabled.
    pub fn auto_detect() -> Self {
        Self::for_luma(terminal_light::luma().ok())
    }

    pub fn status_style(&self, status: HealthStatus) -> Style {
        match status {
            HealthStatus::Healthy => Style::default().fg(self.healthy),
            HealthStatus::Warning => Style::default().fg(self.warning),
            HealthStatus::Critical => {
                Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
            }
        }
    }

    pub fn missed_style(&self) -> Style {
        Style::default().fg(self.missed)
    }

    /// Style of the RTT cell. A value is stale when the latest cycle got no
    /// reply and the shown RTT comes from an earlier one.
    pub fn rtt_style(&self, stale: bool) -> Style {
        if stale {
            self.missed_style().add_modifier(Modifier::DIM)
        } else {
            Style::default()
        }
    }
}
