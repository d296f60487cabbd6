//! Snapshot publisher: ordered, read-only views of every host.

use std::cmp::Ordering;
use std::str::FromStr;

use xping_types::{HostEntry, SnapshotRecord};

use super::{Monitor, SweepStatus};
use crate::data::{round_ms, HealthStatus, HostRecord, Thresholds};
use crate::error::ConfigError;

/// Column to order hosts by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortKey {
    /// Host name, case-insensitive.
    #[default]
    Name,
    /// Last RTT; hosts that never replied count as infinitely slow.
    Rtt,
    /// Loss percentage.
    Loss,
    /// Jitter.
    Jitter,
}

impl SortKey {
    /// Cycle to the next sort key.
    pub fn next(self) -> Self {
        match self {
            SortKey::Name => SortKey::Rtt,
            SortKey::Rtt => SortKey::Loss,
            SortKey::Loss => SortKey::Jitter,
            SortKey::Jitter => SortKey::Name,
        }
    }

    /// Returns the display label for this key.
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Rtt => "rtt",
            SortKey::Loss => "loss",
            SortKey::Jitter => "jitter",
        }
    }
}

impl FromStr for SortKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "rtt" => Ok(SortKey::Rtt),
            "loss" => Ok(SortKey::Loss),
            "jitter" => Ok(SortKey::Jitter),
            _ => Err(ConfigError::SortKey(s.to_string())),
        }
    }
}

/// Read-only copy of one host's statistics.
///
/// All fields are taken from the same cycle of the same host.
#[derive(Debug, Clone, PartialEq)]
pub struct HostView {
    pub name: String,
    /// Last successful RTT in milliseconds.
    pub rtt: Option<f64>,
    pub jitter: f64,
    pub loss_pct: f64,
    /// Rolling average over `history`, whole milliseconds.
    pub avg: Option<u64>,
    /// Oldest first; `None` is a cycle without reply.
    pub history: Vec<Option<f64>>,
    /// Cycles applied so far.
    pub cycles: u64,
}

impl HostView {
    pub(crate) fn from_record(record: &HostRecord) -> Self {
        Self {
            name: record.name().to_string(),
            rtt: record.last_rtt(),
            jitter: record.jitter(),
            loss_pct: record.loss_pct(),
            avg: record.avg(),
            history: record.history().to_vec(),
            cycles: record.cycles(),
        }
    }

    /// Last RTT rounded for display.
    pub fn rtt_ms(&self) -> Option<u64> {
        self.rtt.map(round_ms)
    }

    /// Jitter rounded for display.
    pub fn jitter_ms(&self) -> u64 {
        round_ms(self.jitter)
    }

    /// Loss percentage rounded for display.
    pub fn loss_percent(&self) -> u32 {
        round_ms(self.loss_pct).min(100) as u32
    }

    pub fn health(&self, thresholds: &Thresholds) -> HealthStatus {
        thresholds.classify(self.loss_pct, self.rtt.is_some(), self.cycles)
    }

    /// Outcome of the most recent cycle, if any cycle ran yet.
    pub fn last_sample(&self) -> Option<Option<f64>> {
        self.history.last().copied()
    }

    /// Convert into the feed's wire entry.
    pub fn to_entry(&self) -> HostEntry {
        HostEntry {
            name: self.name.clone(),
            rtt: self.rtt_ms(),
            jitter: self.jitter_ms(),
            loss_pct: self.loss_percent(),
            avg: self.avg,
            history: self.history.iter().map(|v| v.map(round_ms)).collect(),
        }
    }
}

/// Ordered views of all hosts at one point in time.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub hosts: Vec<HostView>,
    pub sort: SortKey,
    pub descending: bool,
    pub sweeps: SweepStatus,
}

impl Snapshot {
    /// Look up a host by name.
    pub fn get(&self, name: &str) -> Option<&HostView> {
        self.hosts.iter().find(|h| h.name == name)
    }

    /// Build the structured-feed record for this snapshot.
    pub fn to_record(&self) -> SnapshotRecord {
        self.hosts
            .iter()
            .fold(SnapshotRecord::builder(), |b, h| b.entry(h.to_entry()))
            .build()
    }
}

impl Monitor {
    /// Take a consistent, ordered view of every host.
    ///
    /// Safe to call at any time, including while a sweep is applying
    /// results. Calling it twice without an intervening update yields the
    /// same ordered output.
    pub fn snapshot(&self, sort: SortKey, descending: bool) -> Snapshot {
        let mut hosts = self.views();
        // Read after the views so the count never trails the records shown.
        let sweeps = self.sweep_status();
        sort_hosts(&mut hosts, sort, descending);

        Snapshot {
            hosts,
            sort,
            descending,
            sweeps,
        }
    }
}

/// Sort views by `key`; `descending` reverses the whole ordering.
///
/// The sort is stable in both directions, so hosts that compare equal keep
/// their configuration order.
pub fn sort_hosts(hosts: &mut [HostView], key: SortKey, descending: bool) {
    hosts.sort_by(|a, b| {
        let ord = compare(a, b, key);
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });
}

fn compare(a: &HostView, b: &HostView, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortKey::Rtt => {
            let a_rtt = a.rtt.unwrap_or(f64::INFINITY);
            let b_rtt = b.rtt.unwrap_or(f64::INFINITY);
            a_rtt.total_cmp(&b_rtt)
        }
        SortKey::Loss => a.loss_pct.total_cmp(&b.loss_pct),
        SortKey::Jitter => a.jitter.total_cmp(&b.jitter),
    }
}
