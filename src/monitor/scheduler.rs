//! Sweep loop: probe every host concurrently, apply results in order, rest.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::{AlertHook, Monitor};
use crate::data::Outcome;
use crate::probe::{Probe, GRACE};

/// Timing of the sweep loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleConfig {
    /// Rest between the end of one sweep and the start of the next.
    pub interval: Duration,
    /// Per-probe timeout handed to the probe adapter.
    pub timeout: Duration,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            timeout: Duration::from_millis(1000),
        }
    }
}

/// How a sweep ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SweepEnd {
    Completed,
    Cancelled,
}

/// Drives the sweep/rest cycle for one [`Monitor`].
///
/// The period between sweep starts is the slowest probe of the sweep plus
/// the interval; there is no catch-up.
#[derive(Debug)]
pub struct Scheduler {
    monitor: Monitor,
    probe: Arc<dyn Probe>,
    config: ScheduleConfig,
    alert: Option<Arc<dyn AlertHook>>,
}

impl Scheduler {
    pub fn new(monitor: Monitor, probe: Arc<dyn Probe>, config: ScheduleConfig) -> Self {
        Self {
            monitor,
            probe,
            config,
            alert: None,
        }
    }

    /// Notify `hook` after each host's result is applied.
    pub fn with_alert(mut self, hook: Arc<dyn AlertHook>) -> Self {
        self.alert = Some(hook);
        self
    }

    /// Spawn the loop on the current tokio runtime.
    ///
    /// Must be called from within a runtime context.
    pub fn start(self) -> SchedulerHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(stop_rx));
        SchedulerHandle { stop_tx, task }
    }

    /// Run until `stop` turns true or its sender is dropped.
    ///
    /// Cancellation is observed between probe collections and during the
    /// rest, so shutdown never waits for a full interval.
    pub async fn run(self, mut stop: watch::Receiver<bool>) {
        tracing::info!(
            hosts = self.monitor.host_count(),
            interval = ?self.config.interval,
            timeout = ?self.config.timeout,
            probe = self.probe.description(),
            "Scheduler started"
        );

        loop {
            if *stop.borrow() {
                break;
            }
            if self.sweep(&mut stop).await == SweepEnd::Cancelled {
                break;
            }

            let stopped = tokio::select! {
                biased;
                _ = stop.wait_for(|s| *s) => true,
                _ = tokio::time::sleep(self.config.interval) => false,
            };
            if stopped {
                break;
            }
        }

        tracing::info!(
            sweeps = self.monitor.sweep_status().completed,
            "Scheduler stopped"
        );
    }

    /// Probe every host at once, then apply the results in configuration
    /// order as each becomes available.
    ///
    /// On cancellation the remaining probes are aborted and their hosts are
    /// left untouched for this cycle.
    async fn sweep(&self, stop: &mut watch::Receiver<bool>) -> SweepEnd {
        let started = Instant::now();
        let hosts = self.monitor.host_names();

        let mut tasks: Vec<JoinHandle<Outcome>> = hosts
            .iter()
            .map(|host| self.launch(host.clone()))
            .collect();

        for (index, host) in hosts.iter().enumerate() {
            let joined = tokio::select! {
                biased;
                _ = stop.wait_for(|s| *s) => None,
                joined = &mut tasks[index] => Some(joined),
            };

            let Some(joined) = joined else {
                for task in &tasks[index..] {
                    task.abort();
                }
                tracing::debug!(applied = index, "Sweep cancelled");
                return SweepEnd::Cancelled;
            };

            let outcome = joined.unwrap_or_else(|e| {
                tracing::warn!(host = %host, error = %e, "Probe task failed");
                Outcome::Timeout
            });

            self.monitor.apply_result(index, outcome);
            if let Some(alert) = &self.alert {
                alert.on_sample(host, outcome.is_reply());
            }
        }

        let elapsed = started.elapsed();
        self.monitor.finish_sweep(elapsed);
        tracing::trace!(hosts = hosts.len(), elapsed = ?elapsed, "Sweep complete");
        SweepEnd::Completed
    }

    fn launch(&self, host: String) -> JoinHandle<Outcome> {
        let probe = Arc::clone(&self.probe);
        let timeout = self.config.timeout;
        let deadline = timeout + GRACE;

        tokio::spawn(async move {
            match tokio::time::timeout(deadline, probe.probe(&host, timeout)).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    tracing::warn!(host = %host, deadline = ?deadline, "Probe hung past its deadline");
                    Outcome::Timeout
                }
            }
        })
    }
}

/// Handle to a running scheduler. Dropping it also stops the loop.
#[derive(Debug)]
pub struct SchedulerHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Signal the loop to stop without waiting for it.
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the loop and wait for it to exit.
    pub async fn shutdown(self) {
        self.stop();
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Scheduler task ended abnormally");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::*;
    use crate::data::Capacities;
    use crate::probe::SystemPing;

    /// Replies after a per-host delay; `None` means the probe never resolves.
    #[derive(Debug, Default)]
    struct ScriptedProbe {
        delays: HashMap<String, Option<Duration>>,
        panics: Vec<String>,
    }

    impl ScriptedProbe {
        fn new(delays: &[(&str, Option<u64>)]) -> Self {
            Self {
                delays: delays
                    .iter()
                    .map(|(h, d)| (h.to_string(), d.map(Duration::from_millis)))
                    .collect(),
                panics: Vec::new(),
            }
        }

        fn panicking(mut self, host: &str) -> Self {
            self.panics.push(host.to_string());
            self
        }
    }

    #[async_trait]
    impl Probe for ScriptedProbe {
        async fn probe(&self, host: &str, _timeout: Duration) -> Outcome {
            if self.panics.iter().any(|h| h == host) {
                panic!("probe for {host} blew up");
            }
            match self.delays.get(host).copied().flatten() {
                Some(delay) => {
                    tokio::time::sleep(delay).await;
                    Outcome::Reply(delay.as_secs_f64() * 1000.0)
                }
                None => std::future::pending().await,
            }
        }
    }

    #[derive(Debug, Default)]
    struct Recorder {
        seen: Mutex<Vec<(String, bool)>>,
    }

    impl AlertHook for Recorder {
        fn on_sample(&self, host: &str, replied: bool) {
            self.seen.lock().push((host.to_string(), replied));
        }
    }

    fn scheduler(hosts: &[&str], probe: impl Probe + 'static, config: ScheduleConfig) -> Scheduler {
        let monitor = Monitor::new(hosts.iter().copied(), Capacities::default());
        Scheduler::new(monitor, Arc::new(probe), config)
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_lasts_as_long_as_slowest_probe() {
        let probe = ScriptedProbe::new(&[("a", Some(10)), ("b", Some(500)), ("c", Some(20))]);
        let s = scheduler(&["a", "b", "c"], probe, ScheduleConfig::default());
        let (_stop_tx, mut stop) = watch::channel(false);

        assert_eq!(s.sweep(&mut stop).await, SweepEnd::Completed);

        let status = s.monitor.sweep_status();
        assert_eq!(status.completed, 1);
        let elapsed = status.last_duration.unwrap();
        assert!(elapsed >= Duration::from_millis(500));
        assert!(elapsed < Duration::from_millis(600));

        for host in ["a", "b", "c"] {
            assert_eq!(s.monitor.record(host).unwrap().cycles(), 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn results_apply_in_configuration_order() {
        let probe = ScriptedProbe::new(&[("a", Some(300)), ("b", Some(100)), ("c", Some(10))]);
        let recorder = Arc::new(Recorder::default());
        let s = scheduler(&["a", "b", "c"], probe, ScheduleConfig::default())
            .with_alert(recorder.clone());
        let (_stop_tx, mut stop) = watch::channel(false);

        s.sweep(&mut stop).await;

        let seen = recorder.seen.lock().clone();
        let order: Vec<&str> = seen.iter().map(|(h, _)| h.as_str()).collect();
        assert_eq!(order, ["a", "b", "c"]);
        assert!(seen.iter().all(|(_, replied)| *replied));
    }

    #[tokio::test(start_paused = true)]
    async fn hung_probe_counts_as_timeout() {
        let probe = ScriptedProbe::new(&[("ok", Some(5)), ("stuck", None)]);
        let config = ScheduleConfig {
            interval: Duration::from_secs(1),
            timeout: Duration::from_millis(100),
        };
        let s = scheduler(&["ok", "stuck"], probe, config);
        let (_stop_tx, mut stop) = watch::channel(false);

        s.sweep(&mut stop).await;

        let stuck = s.monitor.record("stuck").unwrap();
        assert_eq!(stuck.cycles(), 1);
        assert_eq!(stuck.loss_pct(), 100.0);
        assert_eq!(stuck.last_rtt(), None);
        assert_eq!(s.monitor.record("ok").unwrap().loss_pct(), 0.0);

        let elapsed = s.monitor.sweep_status().last_duration.unwrap();
        assert!(elapsed >= Duration::from_millis(100) + GRACE);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_probe_counts_as_timeout() {
        let probe = ScriptedProbe::new(&[("a", Some(5)), ("b", Some(5))]).panicking("a");
        let s = scheduler(&["a", "b"], probe, ScheduleConfig::default());
        let (_stop_tx, mut stop) = watch::channel(false);

        assert_eq!(s.sweep(&mut stop).await, SweepEnd::Completed);
        assert_eq!(s.monitor.record("a").unwrap().loss_pct(), 100.0);
        assert_eq!(s.monitor.record("b").unwrap().loss_pct(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_leaves_records_whole() {
        let probe = ScriptedProbe::new(&[("a", Some(10)), ("b", Some(1000)), ("c", Some(1000))]);
        let s = scheduler(&["a", "b", "c"], probe, ScheduleConfig::default());
        let (stop_tx, mut stop) = watch::channel(false);

        let cancel = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            stop_tx.send_replace(true);
        };
        let (end, ()) = tokio::join!(s.sweep(&mut stop), cancel);

        assert_eq!(end, SweepEnd::Cancelled);
        assert_eq!(s.monitor.sweep_status().completed, 0);
        assert_eq!(s.monitor.record("a").unwrap().cycles(), 1);
        for host in ["b", "c"] {
            let record = s.monitor.record(host).unwrap();
            assert_eq!(record.cycles(), 0);
            assert_eq!(record.history().len(), record.loss_window().len());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rests_between_sweeps() {
        let probe = ScriptedProbe::new(&[("a", Some(0))]);
        let s = scheduler(&["a"], probe, ScheduleConfig::default());
        let monitor = s.monitor.clone();

        let handle = s.start();
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(monitor.sweep_status().completed, 3);

        handle.shutdown().await;
        assert_eq!(monitor.record("a").unwrap().cycles(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_during_rest_is_prompt() {
        let probe = ScriptedProbe::new(&[("a", Some(0))]);
        let config = ScheduleConfig {
            interval: Duration::from_secs(60),
            timeout: Duration::from_millis(1000),
        };
        let handle = scheduler(&["a"], probe, config).start();
        tokio::time::sleep(Duration::from_millis(100)).await;

        let before = Instant::now();
        handle.shutdown().await;
        assert!(before.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_stops_loop() {
        let probe = ScriptedProbe::new(&[("a", Some(0))]);
        let s = scheduler(&["a"], probe, ScheduleConfig::default());
        let monitor = s.monitor.clone();

        drop(s.start());
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(monitor.sweep_status().completed <= 1);
    }

    #[tokio::test]
    async fn missing_tool_reports_full_loss() {
        let probe = SystemPing::with_program("xping-test-no-such-tool");
        let s = scheduler(&["a", "b"], probe, ScheduleConfig::default());
        let (_stop_tx, mut stop) = watch::channel(false);

        s.sweep(&mut stop).await;
        s.sweep(&mut stop).await;

        for host in ["a", "b"] {
            let record = s.monitor.record(host).unwrap();
            assert_eq!(record.loss_pct(), 100.0);
            assert_eq!(record.cycles(), 2);
        }
    }
}
