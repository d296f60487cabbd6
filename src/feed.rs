//! Structured feed: one JSON snapshot per line on a fixed cadence.
//!
//! The publisher only reads from the [`Monitor`]; a slow or vanished reader
//! never affects the scheduler.

use std::io::Write as _;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use xping_types::FeedRecord;

use crate::monitor::{Bell, Monitor, SortKey};

/// Fastest publishing cadence.
pub const MIN_CADENCE: Duration = Duration::from_millis(200);
/// Slowest publishing cadence.
pub const MAX_CADENCE: Duration = Duration::from_secs(1);

/// Publishing cadence for a given sweep interval.
pub fn cadence_for(interval: Duration) -> Duration {
    interval.clamp(MIN_CADENCE, MAX_CADENCE)
}

/// Writes snapshots of a [`Monitor`] as JSON lines.
#[derive(Debug)]
pub struct FeedPublisher<W> {
    monitor: Monitor,
    writer: W,
    sort: SortKey,
    descending: bool,
    cadence: Duration,
    bell: Option<Arc<Bell>>,
    published: u64,
    failures: u64,
    failing: bool,
}

impl<W: AsyncWrite + Unpin> FeedPublisher<W> {
    pub fn new(monitor: Monitor, writer: W) -> Self {
        Self {
            monitor,
            writer,
            sort: SortKey::default(),
            descending: false,
            cadence: MAX_CADENCE,
            bell: None,
            published: 0,
            failures: 0,
            failing: false,
        }
    }

    /// Host order of every published record.
    pub fn sort(mut self, sort: SortKey, descending: bool) -> Self {
        self.sort = sort;
        self.descending = descending;
        self
    }

    /// Publishing period, no faster than [`MIN_CADENCE`].
    pub fn cadence(mut self, cadence: Duration) -> Self {
        self.cadence = cadence.max(MIN_CADENCE);
        self
    }

    /// Drain `bell` on every tick and ring it on stderr.
    pub fn bell(mut self, bell: Arc<Bell>) -> Self {
        self.bell = Some(bell);
        self
    }

    /// Records written successfully so far.
    pub fn published(&self) -> u64 {
        self.published
    }

    /// Writes that failed so far.
    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Serialize the current snapshot and write it as one line.
    pub async fn publish_once(&mut self) -> std::io::Result<()> {
        let record = FeedRecord::from(self.monitor.snapshot(self.sort, self.descending).to_record());
        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');

        self.writer.write_all(&line).await?;
        self.writer.flush().await
    }

    /// Publish until `stop` turns true or its sender is dropped.
    pub async fn run(&mut self, mut stop: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.cadence);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(cadence = ?self.cadence, sort = self.sort.label(), "Feed started");

        loop {
            tokio::select! {
                biased;
                _ = stop.wait_for(|s| *s) => break,
                _ = ticker.tick() => {}
            }

            // A reader that stops draining must not hold up shutdown.
            let stopped = tokio::select! {
                biased;
                _ = stop.wait_for(|s| *s) => true,
                _ = self.tick() => false,
            };
            if stopped {
                tracing::debug!("Feed write abandoned on shutdown");
                break;
            }
        }

        tracing::info!(
            published = self.published,
            failures = self.failures,
            "Feed stopped"
        );
    }

    async fn tick(&mut self) {
        match self.publish_once().await {
            Ok(()) => {
                self.published += 1;
                if self.failing {
                    tracing::info!("Feed writer recovered");
                    self.failing = false;
                }
            }
            Err(e) => {
                self.failures += 1;
                if !self.failing {
                    tracing::warn!(error = %e, "Feed write failed, continuing");
                    self.failing = true;
                } else {
                    tracing::debug!(error = %e, "Feed write failed");
                }
            }
        }

        if let Some(bell) = &self.bell {
            if bell.take_pending() > 0 {
                let mut stderr = std::io::stderr();
                let _ = stderr.write_all(b"\x07").and_then(|()| stderr.flush());
            }
        }
    }
}
