//! Terminal rendering.
//!
//! ```text
//! ┌ header: health counts, sweep progress ──────────────┐
//! │ host table                                          │
//! └ status bar: sort, beep, last sweep, controls ───────┘
//! ```

pub mod common;
pub mod table;
pub mod theme;

use ratatui::layout::{Constraint, Layout};
use ratatui::Frame;

pub use theme::Theme;

use crate::app::App;

/// Minimum terminal size for usable display.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 8;

/// Terminal row of the first host, below the header bar, the table border
/// and the table header.
pub const FIRST_HOST_ROW: u16 = 3;

/// Draw one frame.
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        common::render_too_small(frame, area, MIN_WIDTH, MIN_HEIGHT);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Min(4),    // Host table
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    common::render_header(frame, app, chunks[0]);
    table::render(frame, app, chunks[1]);
    common::render_status_bar(frame, app, chunks[2]);

    if app.show_help {
        common::render_help(frame, app, area);
    }
}
