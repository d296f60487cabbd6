//! Application state and navigation logic.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::data::{HealthStatus, Thresholds};
use crate::monitor::{Bell, HostView, Monitor, Snapshot, SortKey};
use crate::ui::Theme;

/// How long a status message stays in the status bar.
const STATUS_TTL: Duration = Duration::from_secs(3);

/// Host counts by health status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HealthCounts {
    pub healthy: usize,
    pub warning: usize,
    pub critical: usize,
}

impl HealthCounts {
    pub fn total(&self) -> usize {
        self.healthy + self.warning + self.critical
    }

    /// The most severe status present.
    pub fn worst(&self) -> HealthStatus {
        if self.critical > 0 {
            HealthStatus::Critical
        } else if self.warning > 0 {
            HealthStatus::Warning
        } else {
            HealthStatus::Healthy
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,

    monitor: Monitor,
    pub snapshot: Option<Snapshot>,
    pub thresholds: Thresholds,
    bell: Arc<Bell>,
    beep_requested: bool,

    // Navigation state; index into the filtered, sorted rows
    pub selected_index: usize,
    /// First row shown by the table at the last draw.
    pub table_offset: usize,

    // Sorting
    pub sort_key: SortKey,
    pub descending: bool,

    // Search/filter
    pub filter_text: String,
    pub filter_active: bool,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    pub fn new(
        monitor: Monitor,
        bell: Arc<Bell>,
        thresholds: Thresholds,
        sort_key: SortKey,
        descending: bool,
        theme: Theme,
    ) -> Self {
        Self {
            running: true,
            show_help: false,
            monitor,
            snapshot: None,
            thresholds,
            bell,
            beep_requested: false,
            selected_index: 0,
            table_offset: 0,
            sort_key,
            descending,
            filter_text: String::new(),
            filter_active: false,
            theme,
            status_message: None,
        }
    }

    /// Take a fresh snapshot from the monitor.
    pub fn refresh(&mut self) {
        self.snapshot = Some(self.monitor.snapshot(self.sort_key, self.descending));
        self.clamp_selection();
    }

    /// Rows currently shown: filtered, in snapshot order.
    pub fn visible_hosts(&self) -> Vec<&HostView> {
        self.snapshot
            .as_ref()
            .map(|s| s.hosts.iter().filter(|h| self.matches_filter(&h.name)).collect())
            .unwrap_or_default()
    }

    pub fn selected_host(&self) -> Option<&HostView> {
        self.visible_hosts().get(self.selected_index).copied()
    }

    pub fn health(&self, host: &HostView) -> HealthStatus {
        host.health(&self.thresholds)
    }

    /// Counts over all hosts, ignoring the filter.
    pub fn health_counts(&self) -> HealthCounts {
        let mut counts = HealthCounts::default();
        let Some(snapshot) = &self.snapshot else {
            return counts;
        };
        for host in &snapshot.hosts {
            match self.health(host) {
                HealthStatus::Healthy => counts.healthy += 1,
                HealthStatus::Warning => counts.warning += 1,
                HealthStatus::Critical => counts.critical += 1,
            }
        }
        counts
    }

    /// Time since the last sweep finished, if any has.
    pub fn since_last_sweep(&self) -> Option<Duration> {
        self.snapshot
            .as_ref()
            .and_then(|s| s.sweeps.last_finished)
            .map(|t| t.elapsed())
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < STATUS_TTL => Some(msg),
            _ => None,
        }
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.visible_hosts().len().saturating_sub(1);
        self.selected_index = (self.selected_index + n).min(max);
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        self.selected_index = self.selected_index.saturating_sub(n);
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        self.selected_index = 0;
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        self.selected_index = self.visible_hosts().len().saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let count = self.visible_hosts().len();
        if self.selected_index >= count {
            self.selected_index = count.saturating_sub(1);
        }
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Cycle to the next sort key.
    pub fn cycle_sort(&mut self) {
        self.sort_key = self.sort_key.next();
        self.refresh();
    }

    /// Toggle sort direction between ascending and descending.
    pub fn toggle_sort_direction(&mut self) {
        self.descending = !self.descending;
        self.refresh();
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    /// Clear the filter text and exit filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
    }

    /// Append a character to the filter text.
    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
        self.selected_index = 0;
    }

    /// Remove the last character from the filter text.
    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
        self.clamp_selection();
    }

    /// Check if a host name matches the current filter.
    pub fn matches_filter(&self, name: &str) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        name.to_lowercase().contains(&self.filter_text.to_lowercase())
    }

    pub fn beep_enabled(&self) -> bool {
        self.bell.is_enabled()
    }

    /// Toggle beeping on replies.
    pub fn toggle_beep(&mut self) {
        let enabled = self.bell.toggle();
        self.set_status_message(format!("Beep {}", if enabled { "on" } else { "off" }));
    }

    /// Ring once now, whether or not beeping is enabled.
    pub fn test_beep(&mut self) {
        self.beep_requested = true;
        self.set_status_message("Beep test".to_string());
    }

    /// Toggle beeping and ring once so the new setting can be heard.
    pub fn toggle_beep_and_test(&mut self) {
        let enabled = self.bell.toggle();
        self.beep_requested = true;
        self.set_status_message(format!(
            "Beep {} (test)",
            if enabled { "on" } else { "off" }
        ));
    }

    /// Whether a bell should sound this frame. Drains queued rings.
    pub fn take_beep(&mut self) -> bool {
        let pending = self.bell.take_pending() > 0;
        std::mem::take(&mut self.beep_requested) || pending
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the current snapshot to a file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let Some(ref snapshot) = self.snapshot else {
            anyhow::bail!("No data to export");
        };

        let counts = self.health_counts();
        let hosts: Vec<serde_json::Value> = snapshot
            .hosts
            .iter()
            .map(|h| {
                let entry = h.to_entry();
                serde_json::json!({
                    "name": entry.name,
                    "rtt": entry.rtt,
                    "jitter": entry.jitter,
                    "loss_pct": entry.loss_pct,
                    "avg": entry.avg,
                    "history": entry.history,
                    "health": format!("{:?}", self.health(h)),
                })
            })
            .collect();

        let export = serde_json::json!({
            "summary": {
                "total_hosts": counts.total(),
                "healthy": counts.healthy,
                "warning": counts.warning,
                "critical": counts.critical,
                "sweeps": snapshot.sweeps.completed,
            },
            "sort": self.sort_key.label(),
            "descending": self.descending,
            "hosts": hosts,
        });

        let json = serde_json::to_string_pretty(&export)?;
        std::fs::write(path, json)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Capacities, Outcome};

    fn test_app() -> App {
        let monitor = Monitor::new(
            ["alpha.example", "beta.example", "gamma.example", "down.example"],
            Capacities::default(),
        );
        for _ in 0..4 {
            monitor.apply_result(0, Outcome::Reply(10.0));
            monitor.apply_result(1, Outcome::Reply(30.0));
            monitor.apply_result(3, Outcome::Timeout);
        }
        monitor.apply_result(2, Outcome::Reply(20.0));
        monitor.apply_result(2, Outcome::Timeout);

        let mut app = App::new(
            monitor,
            Arc::new(Bell::new(false)),
            Thresholds::default(),
            SortKey::Name,
            false,
            Theme::dark(),
        );
        app.refresh();
        app
    }

    fn names(app: &App) -> Vec<&str> {
        app.visible_hosts().iter().map(|h| h.name.as_str()).collect()
    }

    #[test]
    fn refresh_applies_sort() {
        let mut app = test_app();
        assert_eq!(
            names(&app),
            ["alpha.example", "beta.example", "down.example", "gamma.example"]
        );

        app.cycle_sort();
        assert_eq!(app.sort_key, SortKey::Rtt);
        assert_eq!(
            names(&app),
            ["alpha.example", "gamma.example", "beta.example", "down.example"]
        );

        app.toggle_sort_direction();
        assert_eq!(names(&app)[0], "down.example");
    }

    #[test]
    fn selection_is_clamped() {
        let mut app = test_app();
        app.select_prev();
        assert_eq!(app.selected_index, 0);

        app.select_next_n(10);
        assert_eq!(app.selected_index, 3);

        app.select_first();
        app.select_next();
        assert_eq!(app.selected_host().unwrap().name, "beta.example");

        app.select_last();
        assert_eq!(app.selected_host().unwrap().name, "gamma.example");
    }

    #[test]
    fn filter_narrows_rows() {
        let mut app = test_app();
        app.select_last();
        app.filter_push('a');
        app.filter_push('l');
        assert_eq!(names(&app), ["alpha.example"]);
        assert_eq!(app.selected_index, 0);

        app.filter_pop();
        app.filter_pop();
        assert_eq!(names(&app).len(), 4);

        app.filter_text = "BETA".to_string();
        assert_eq!(names(&app), ["beta.example"]);

        app.clear_filter();
        assert!(app.filter_text.is_empty());
        assert!(!app.filter_active);
    }

    #[test]
    fn health_counts_cover_all_hosts() {
        let mut app = test_app();
        app.filter_text = "alpha".to_string();

        let counts = app.health_counts();
        assert_eq!(counts.healthy, 2);
        // gamma: 1 of 2 lost
        assert_eq!(counts.critical, 2);
        assert_eq!(counts.total(), 4);
        assert_eq!(counts.worst(), HealthStatus::Critical);
    }

    #[test]
    fn beep_toggle_and_test() {
        let mut app = test_app();
        assert!(!app.beep_enabled());
        assert!(!app.take_beep());

        app.test_beep();
        assert!(app.take_beep());
        assert!(!app.take_beep());

        app.toggle_beep();
        assert!(app.beep_enabled());
        assert_eq!(app.get_status_message(), Some("Beep on"));
    }

    #[test]
    fn export_writes_snapshot() {
        let app = test_app();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");

        app.export_state(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["summary"]["total_hosts"], 4);
        assert_eq!(json["sort"], "name");
        assert_eq!(json["hosts"][0]["name"], "alpha.example");
        assert_eq!(json["hosts"][0]["rtt"], 10);
        assert_eq!(json["hosts"][2]["health"], "Critical");
    }

    #[test]
    fn export_without_snapshot_fails() {
        let app = App::new(
            Monitor::new(["a"], Capacities::default()),
            Arc::new(Bell::new(false)),
            Thresholds::default(),
            SortKey::Name,
            false,
            Theme::dark(),
        );
        let dir = tempfile::tempdir().unwrap();
        assert!(app.export_state(&dir.path().join("x.json")).is_err());
    }
}
