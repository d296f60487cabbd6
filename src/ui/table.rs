//! Host table rendering.
//!
//! One row per host: name, last RTT, jitter, loss, rolling average and a
//! numeric history ticker with the newest sample on the left.

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::round_ms;
use crate::monitor::{HostView, SortKey};

const RTT_WIDTH: u16 = 7;
const JITTER_WIDTH: u16 = 7;
const LOSS_WIDTH: u16 = 6;
const AVG_WIDTH: u16 = 7;
/// Fewest history samples shown, however narrow the terminal.
const MIN_SLOTS: usize = 4;
/// Placeholder for a cycle without reply.
const MISSED: &str = "---";

/// Width of the name column for a table `width` cells wide.
pub fn name_width(width: u16) -> u16 {
    (width / 5).clamp(12, 24)
}

/// Number of history samples that fit a table `width` cells wide.
///
/// Each sample takes three cells plus a separator.
pub fn history_slots(width: u16) -> usize {
    // borders, highlight symbol, column spacing
    let chrome = 2 + 2 + 5;
    let fixed = name_width(width) + RTT_WIDTH + JITTER_WIDTH + LOSS_WIDTH + AVG_WIDTH + chrome;
    let available = width.saturating_sub(fixed) as usize;
    ((available + 1) / 4).max(MIN_SLOTS)
}

/// Up to `slots` history samples, newest first.
///
/// `None` is a missed cycle; positions beyond the recorded history are not
/// returned.
pub fn history_tokens(history: &[Option<f64>], slots: usize) -> Vec<Option<u64>> {
    history
        .iter()
        .rev()
        .take(slots)
        .map(|v| v.map(round_ms))
        .collect()
}

/// Render the host table.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(total) = app.snapshot.as_ref().map(|s| s.hosts.len()) else {
        return;
    };
    let hosts = app.visible_hosts();
    let slots = history_slots(area.width);

    let header = Row::new(vec![
        Cell::from(format_header("NAME", SortKey::Name, app)),
        Cell::from(Line::from(format_header("RTT", SortKey::Rtt, app)).right_aligned()),
        Cell::from(Line::from(format_header("JITTER", SortKey::Jitter, app)).right_aligned()),
        Cell::from(Line::from(format_header("LOSS", SortKey::Loss, app)).right_aligned()),
        Cell::from(Line::from("AVG").right_aligned()),
        Cell::from("HISTORY (newest first)"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = hosts
        .iter()
        .map(|h| {
            let status_style = app.theme.status_style(app.health(h));
            Row::new(vec![
                Cell::from(h.name.clone()).style(status_style),
                Cell::from(Line::from(format_ms(h.rtt_ms())).right_aligned())
                    .style(app.theme.rtt_style(is_stale(h))),
                Cell::from(Line::from(h.jitter_ms().to_string()).right_aligned()),
                Cell::from(Line::from(format!("{}%", h.loss_percent())).right_aligned())
                    .style(status_style),
                Cell::from(Line::from(format_ms(h.avg)).right_aligned()),
                Cell::from(history_line(h, slots, app)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(name_width(area.width)),
        Constraint::Length(RTT_WIDTH),
        Constraint::Length(JITTER_WIDTH),
        Constraint::Length(LOSS_WIDTH),
        Constraint::Length(AVG_WIDTH),
        Constraint::Min(16),
    ];

    let selected = app.selected_index.min(hosts.len().saturating_sub(1));

    let sort_dir = if app.descending { "↓" } else { "↑" };

    // Build title with filter info
    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    let title = format!(
        " Hosts ({}/{}) [s:sort {}{}]{} ",
        hosts.len(),
        total,
        app.sort_key.label(),
        sort_dir,
        filter_info,
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default().with_offset(app.table_offset);
    if !hosts.is_empty() {
        state.select(Some(selected));
    }

    frame.render_stateful_widget(table, area, &mut state);
    app.table_offset = state.offset();
}

fn format_header(name: &str, key: SortKey, app: &App) -> String {
    if app.sort_key == key {
        let arrow = if app.descending { "↓" } else { "↑" };
        format!("{}{}", name, arrow)
    } else {
        name.to_string()
    }
}

fn format_ms(value: Option<u64>) -> String {
    value.map_or_else(|| "--".to_string(), |v| v.to_string())
}

/// The RTT on show predates the latest cycle, which got no reply.
fn is_stale(host: &HostView) -> bool {
    host.rtt.is_some() && host.last_sample() == Some(None)
}

fn history_line(host: &HostView, slots: usize, app: &App) -> Line<'static> {
    let missed = app.theme.missed_style();
    let spans = history_tokens(&host.history, slots)
        .into_iter()
        .enumerate()
        .flat_map(|(i, sample)| {
            let sep = (i > 0).then(|| Span::raw(" "));
            let token = match sample {
                Some(ms) => Span::raw(format!("{:>3}", ms)),
                None => Span::styled(MISSED, missed),
            };
            sep.into_iter().chain(std::iter::once(token))
        });
    Line::from(spans.collect::<Vec<_>>())
}
