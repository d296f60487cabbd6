//! Per-host entry of a feed record.

use alloc::string::String;
use alloc::vec::Vec;

/// Statistics for one monitored host, rounded to whole milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HostEntry {
    /// Host name exactly as configured.
    pub name: String,

    /// Most recent successful round-trip time, `None` until the first reply.
    pub rtt: Option<u64>,

    /// Smoothed RTT variability.
    pub jitter: u64,

    /// Share of lost probes in the loss window, 0..=100.
    pub loss_pct: u32,

    /// Mean of the replies currently held in `history`.
    pub avg: Option<u64>,

    /// Per-cycle outcomes, oldest first; `None` is a probe without reply.
    #[cfg_attr(feature = "serde", serde(default))]
    pub history: Vec<Option<u64>>,
}

impl HostEntry {
    /// Create an entry with no samples yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Number of cycles in `history` that got no reply.
    pub fn missed(&self) -> usize {
        self.history.iter().filter(|v| v.is_none()).count()
    }
}

/// Builder for [`HostEntry`].
#[derive(Debug)]
pub struct HostEntryBuilder {
    entry: HostEntry,
}

impl HostEntryBuilder {
    /// Start a builder for the named host.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            entry: HostEntry::new(name),
        }
    }

    /// Set the last round-trip time in milliseconds.
    pub fn rtt(mut self, ms: u64) -> Self {
        self.entry.rtt = Some(ms);
        self
    }

    /// Set the jitter in milliseconds.
    pub fn jitter(mut self, ms: u64) -> Self {
        self.entry.jitter = ms;
        self
    }

    /// Set the loss percentage (clamped to 100).
    pub fn loss_pct(mut self, pct: u32) -> Self {
        self.entry.loss_pct = pct.min(100);
        self
    }

    /// Set the rolling average in milliseconds.
    pub fn avg(mut self, ms: u64) -> Self {
        self.entry.avg = Some(ms);
        self
    }

    /// Set the history, oldest first.
    pub fn history(mut self, samples: impl IntoIterator<Item = Option<u64>>) -> Self {
        self.entry.history = samples.into_iter().collect();
        self
    }

    /// Build the entry.
    pub fn build(self) -> HostEntry {
        self.entry
    }
}
