//! Shared host state, the sweep scheduler and the snapshot publisher.
//!
//! ```text
//! Scheduler ──apply_result──▶ Monitor (per-host RwLock<HostRecord>)
//!                                 │
//!                                 └──snapshot(sort, desc)──▶ TUI / feed
//! ```
//!
//! Only the scheduler writes host records, one host at a time and under that
//! host's lock; readers copy each record under a short read lock, so a view
//! never mixes two cycles of the same host.

mod alert;
mod scheduler;
mod snapshot;

pub use alert::{AlertHook, Bell};
pub use scheduler::{ScheduleConfig, Scheduler, SchedulerHandle};
pub use snapshot::{sort_hosts, HostView, Snapshot, SortKey};

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::data::{Capacities, HostRecord, Outcome};

/// Progress of the sweep loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStatus {
    /// Sweeps fully applied so far.
    pub completed: u64,
    /// Wall time of the last completed sweep (slowest probe of that sweep).
    pub last_duration: Option<Duration>,
    /// When the last sweep finished.
    pub last_finished: Option<Instant>,
}

#[derive(Debug)]
struct Shared {
    names: Vec<String>,
    hosts: Vec<RwLock<HostRecord>>,
    sweeps: RwLock<SweepStatus>,
}

/// Handle to the monitored hosts' statistics.
///
/// Cloning is cheap; all clones see the same state. Host order is the
/// configuration order and never changes.
///
/// # Example
///
/// ```
/// use xping::data::Capacities;
/// use xping::monitor::{Monitor, SortKey};
///
/// let monitor = Monitor::new(["8.8.8.8", "1.1.1.1"], Capacities::default());
/// let snapshot = monitor.snapshot(SortKey::Name, false);
/// assert_eq!(snapshot.hosts[0].name, "1.1.1.1");
/// ```
#[derive(Debug, Clone)]
pub struct Monitor {
    inner: Arc<Shared>,
}

impl Monitor {
    /// Create a record for every host, in the given order.
    pub fn new<I, S>(hosts: I, capacities: Capacities) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = hosts.into_iter().map(Into::into).collect();
        let hosts = names
            .iter()
            .map(|name| RwLock::new(HostRecord::new(name.clone(), capacities)))
            .collect();

        Self {
            inner: Arc::new(Shared {
                names,
                hosts,
                sweeps: RwLock::new(SweepStatus::default()),
            }),
        }
    }

    /// Host names in configuration order.
    pub fn host_names(&self) -> &[String] {
        &self.inner.names
    }

    pub fn host_count(&self) -> usize {
        self.inner.names.len()
    }

    /// Copy of one host's record.
    pub fn record(&self, host: &str) -> Option<HostRecord> {
        let index = self.inner.names.iter().position(|n| n == host)?;
        self.inner.hosts.get(index).map(|slot| slot.read().clone())
    }

    /// Current sweep progress.
    pub fn sweep_status(&self) -> SweepStatus {
        *self.inner.sweeps.read()
    }

    /// Apply one cycle's outcome to the host at `index`.
    ///
    /// The whole update happens under the host's write lock.
    pub(crate) fn apply_result(&self, index: usize, outcome: Outcome) {
        if let Some(slot) = self.inner.hosts.get(index) {
            slot.write().apply_result(outcome);
        }
    }

    pub(crate) fn finish_sweep(&self, duration: Duration) {
        let mut sweeps = self.inner.sweeps.write();
        sweeps.completed += 1;
        sweeps.last_duration = Some(duration);
        sweeps.last_finished = Some(Instant::now());
    }

    fn views(&self) -> Vec<HostView> {
        self.inner
            .hosts
            .iter()
            .map(|slot| HostView::from_record(&slot.read()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_configuration_order() {
        let monitor = Monitor::new(["b", "a", "c"], Capacities::default());
        assert_eq!(monitor.host_names(), ["b", "a", "c"]);
        assert_eq!(monitor.host_count(), 3);
    }

    #[test]
    fn apply_result_updates_one_host() {
        let monitor = Monitor::new(["a", "b"], Capacities::default());
        monitor.apply_result(1, Outcome::Reply(12.0));

        let a = monitor.record("a").unwrap();
        let b = monitor.record("b").unwrap();
        assert_eq!(a.cycles(), 0);
        assert_eq!(b.cycles(), 1);
        assert_eq!(b.last_rtt(), Some(12.0));
    }

    #[test]
    fn out_of_range_index_is_ignored() {
        let monitor = Monitor::new(["a"], Capacities::default());
        monitor.apply_result(5, Outcome::Timeout);
        assert_eq!(monitor.record("a").unwrap().cycles(), 0);
        assert!(monitor.record("missing").is_none());
    }

    #[test]
    fn finish_sweep_counts() {
        let monitor = Monitor::new(["a"], Capacities::default());
        assert_eq!(monitor.sweep_status().completed, 0);

        monitor.finish_sweep(Duration::from_millis(40));
        let status = monitor.sweep_status();
        assert_eq!(status.completed, 1);
        assert_eq!(status.last_duration, Some(Duration::from_millis(40)));
        assert!(status.last_finished.is_some());
    }

    #[test]
    fn clones_share_state() {
        let monitor = Monitor::new(["a"], Capacities::default());
        let reader = monitor.clone();
        monitor.apply_result(0, Outcome::Timeout);
        assert_eq!(reader.record("a").unwrap().loss_pct(), 100.0);
    }

    #[test]
    fn concurrent_readers_see_whole_updates() {
        let monitor = Monitor::new(["a"], Capacities { loss_window: 5, history: 3 });
        let reader = monitor.clone();

        let handle = std::thread::spawn(move || {
            for _ in 0..2000 {
                let view = &reader.snapshot(SortKey::Name, false).hosts[0];
                // Both buffers grow together until the smaller one is full.
                assert_eq!(view.history.len(), (view.cycles as usize).min(3));
            }
        });

        for i in 0..2000 {
            let outcome = if i % 4 == 0 {
                Outcome::Timeout
            } else {
                Outcome::Reply(f64::from(i % 90))
            };
            monitor.apply_result(0, outcome);
        }
        handle.join().unwrap();
    }
}
