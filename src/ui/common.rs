//! Header bar, status bar and help overlay.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::duration::format_duration;
use crate::data::HealthStatus;

/// Render the header bar with the health overview.
///
/// Displays: status indicator, host counts by health, sweep progress.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref snapshot) = app.snapshot else {
        let line = Line::from(vec![
            Span::styled(" XPING ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("| Starting..."),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let counts = app.health_counts();

    let sweep_info = match snapshot.sweeps.last_duration {
        Some(d) => format!(
            "{} sweeps, last {}",
            snapshot.sweeps.completed,
            format_duration(d)
        ),
        None => "first sweep running".to_string(),
    };

    let line = Line::from(vec![
        Span::styled(" ● ", app.theme.status_style(counts.worst())),
        Span::styled("XPING ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(
            counts.healthy.to_string(),
            Style::default().fg(app.theme.healthy),
        ),
        Span::raw(" up "),
        count_span(counts.warning, HealthStatus::Warning, app),
        Span::raw(" lossy "),
        count_span(counts.critical, HealthStatus::Critical, app),
        Span::raw(" down │ "),
        Span::styled(
            counts.total().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" hosts │ "),
        Span::raw(sweep_info),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn count_span(count: usize, status: HealthStatus, app: &App) -> Span<'static> {
    if count > 0 {
        Span::styled(count.to_string(), app.theme.status_style(status))
    } else {
        Span::styled("0", Style::default().add_modifier(Modifier::DIM))
    }
}

/// Render the status bar at the bottom.
///
/// Shows sort order, beep state, time since the last sweep and the
/// available controls, or a temporary status message.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = if app.filter_active {
        "Type to search | Enter:apply Esc:cancel"
    } else {
        "/:search s:sort S:reverse b:beep e:export ?:help q:quit"
    };

    let updated = match app.since_last_sweep() {
        Some(elapsed) => format!("Swept {:.1}s ago", elapsed.as_secs_f64()),
        None => "Waiting for first sweep".to_string(),
    };

    let status = format!(
        " Sort: {} {} | Beep: {} | {} | --- no reply | {}",
        app.sort_key.label(),
        if app.descending { "desc" } else { "asc" },
        if app.beep_enabled() { "ON" } else { "OFF" },
        updated,
        controls,
    );

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the table.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  ↑/↓ j/k     Move selection"),
        Line::from("  PgUp/PgDn   Jump 10 hosts"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from(""),
        section(" Table"),
        Line::from("  s         Cycle sort key"),
        Line::from("  S         Toggle sort direction"),
        Line::from("  /         Filter by host name"),
        Line::from("  c         Clear filter"),
        Line::from(""),
        section(" General"),
        Line::from("  b         Toggle beep on reply"),
        Line::from("  B         Toggle beep and test"),
        Line::from("  e         Export to JSON"),
        Line::from("  q/Q       Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 23u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

/// Render the notice shown while the terminal is below the minimum size.
pub fn render_too_small(frame: &mut Frame, area: Rect, min_width: u16, min_height: u16) {
    let msg = format!(
        "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
        area.width, area.height, min_width, min_height
    );
    let paragraph = Paragraph::new(msg)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow));
    let height = 5.min(area.height);
    let centered = Rect::new(
        area.x,
        area.y + area.height.saturating_sub(height) / 2,
        area.width,
        height,
    );
    frame.render_widget(paragraph, centered);
}
