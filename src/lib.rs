//! # xping
//!
//! A terminal ping dashboard and library: probes a set of hosts on a fixed
//! rest interval and keeps rolling per-host statistics (last RTT, jitter,
//! loss percentage, rolling average and a bounded history).
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  ┌──────────┐ probe  ┌───────────┐ apply  ┌──────────────┐  │
//! │  │  probe   │◀───────│ Scheduler │───────▶│   Monitor    │  │
//! │  │(SystemPing)       │  (sweep)  │        │ (HostRecord) │  │
//! │  └──────────┘        └─────┬─────┘        └──────┬───────┘  │
//! │                            │ on_sample           │ snapshot │
//! │                            ▼                     ▼          │
//! │                        ┌──────┐       ┌─────────────────┐   │
//! │                        │ Bell │       │ ui (TUI) / feed │   │
//! │                        └──────┘       └─────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`data`]**: The statistics engine - [`HostRecord`] and its once-per-cycle
//!   update, ring buffers, health thresholds, duration parsing
//! - **[`probe`]**: The [`Probe`] trait and the [`SystemPing`] adapter that runs
//!   the platform `ping` tool
//! - **[`monitor`]**: Shared host state ([`Monitor`]), the sweep [`Scheduler`]
//!   and ordered [`Snapshot`]s for consumers
//! - **[`feed`]**: JSON-lines publisher for headless use
//! - **[`config`]**: Layered settings (defaults, file, environment, flags)
//! - **[`app`]**, **[`events`]**, **[`ui`]**: The interactive terminal dashboard
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Dashboard with the default host list
//! xping
//!
//! # Custom hosts, faster sweeps, sorted by loss (worst first)
//! xping --hosts 1.1.1.1 example.com --interval 500ms --sort loss --descending
//!
//! # One JSON snapshot per line on stdout
//! xping --json | jq .hosts
//! ```
//!
//! ### As a library
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use async_trait::async_trait;
//! use xping::data::Capacities;
//! use xping::monitor::{Monitor, ScheduleConfig, Scheduler, SortKey};
//! use xping::probe::{Outcome, Probe};
//!
//! #[derive(Debug)]
//! struct Fixed;
//!
//! #[async_trait]
//! impl Probe for Fixed {
//!     async fn probe(&self, _host: &str, _timeout: Duration) -> Outcome {
//!         Outcome::Reply(7.0)
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let monitor = Monitor::new(["a.example", "b.example"], Capacities::default());
//! let handle = Scheduler::new(monitor.clone(), Arc::new(Fixed), ScheduleConfig::default()).start();
//!
//! tokio::time::sleep(Duration::from_millis(50)).await;
//! handle.shutdown().await;
//!
//! let snapshot = monitor.snapshot(SortKey::Rtt, false);
//! assert_eq!(snapshot.hosts[0].rtt_ms(), Some(7));
//! # });
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod feed;
pub mod monitor;
pub mod probe;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::{RuntimeConfig, Settings};
pub use data::{Capacities, HealthStatus, HostRecord, Outcome, Thresholds};
pub use error::{ConfigError, ProbeError};
pub use feed::FeedPublisher;
pub use monitor::{Bell, HostView, Monitor, Scheduler, SchedulerHandle, Snapshot, SortKey};
pub use probe::{Probe, SystemPing};
