//! Feed records - one per publish.

use alloc::string::String;
use alloc::vec::Vec;

use crate::{HostEntry, HostEntryBuilder};

/// A self-delimited record of the structured feed.
///
/// The serialized form carries a `type` tag so consumers can skip record
/// kinds they do not understand.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum FeedRecord {
    /// All hosts' statistics at one point in time.
    Snapshot(SnapshotRecord),
}

impl FeedRecord {
    /// Hosts carried by this record, in publish order.
    pub fn hosts(&self) -> &[HostEntry] {
        match self {
            FeedRecord::Snapshot(s) => &s.hosts,
        }
    }
}

impl From<SnapshotRecord> for FeedRecord {
    fn from(record: SnapshotRecord) -> Self {
        FeedRecord::Snapshot(record)
    }
}

/// Point-in-time statistics for every monitored host.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SnapshotRecord {
    /// Unix timestamp in milliseconds when the snapshot was taken.
    #[cfg_attr(feature = "serde", serde(default))]
    pub timestamp_ms: u64,

    /// Host entries, ordered by the publisher's sort key.
    pub hosts: Vec<HostEntry>,
}

impl SnapshotRecord {
    /// Create a builder for constructing records.
    pub fn builder() -> SnapshotRecordBuilder {
        SnapshotRecordBuilder::new()
    }

    /// Look up a host entry by name.
    pub fn get(&self, name: &str) -> Option<&HostEntry> {
        self.hosts.iter().find(|h| h.name == name)
    }

    /// Number of hosts in the record.
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Check if the record has no hosts.
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

/// Builder for [`SnapshotRecord`].
#[derive(Debug, Default)]
pub struct SnapshotRecordBuilder {
    timestamp_ms: Option<u64>,
    hosts: Vec<HostEntry>,
}

impl SnapshotRecordBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a specific timestamp (milliseconds since Unix epoch).
    pub fn timestamp_ms(mut self, ts: u64) -> Self {
        self.timestamp_ms = Some(ts);
        self
    }

    /// Append a host built with a closure.
    pub fn host<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(HostEntryBuilder) -> HostEntryBuilder,
    {
        self.hosts.push(f(HostEntryBuilder::new(name)).build());
        self
    }

    /// Append a pre-built host entry.
    pub fn entry(mut self, entry: HostEntry) -> Self {
        self.hosts.push(entry);
        self
    }

    /// Build the record, stamping it with the current time if none was set.
    #[cfg(feature = "std")]
    pub fn build(self) -> SnapshotRecord {
        SnapshotRecord {
            timestamp_ms: self.timestamp_ms.unwrap_or_else(current_timestamp_ms),
            hosts: self.hosts,
        }
    }

    /// Build the record with the configured timestamp (for no_std).
    #[cfg(not(feature = "std"))]
    pub fn build(self) -> SnapshotRecord {
        SnapshotRecord {
            timestamp_ms: self.timestamp_ms.unwrap_or(0),
            hosts: self.hosts,
        }
    }
}

/// Get current timestamp in milliseconds since Unix epoch.
#[cfg(feature = "std")]
fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
