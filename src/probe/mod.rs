//! Probe adapters: one round-trip measurement per call.
//!
//! The engine only sees the [`Probe`] trait. A probe either yields a reply
//! with its RTT or a timeout; every internal failure is folded into
//! [`Outcome::Timeout`] before it reaches the engine.

mod system;

pub use system::{parse_rtt, Platform, SystemPing};

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;

pub use crate::data::Outcome;

/// Slack allowed on top of the configured timeout before a probe is
/// considered hung.
pub const GRACE: Duration = Duration::from_millis(1500);

/// A single-shot reachability probe.
///
/// Implementations must resolve within `timeout` plus [`GRACE`] and must not
/// panic or return errors: failures are reported as [`Outcome::Timeout`].
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use async_trait::async_trait;
/// use xping::probe::{Outcome, Probe};
///
/// #[derive(Debug)]
/// struct Loopback;
///
/// #[async_trait]
/// impl Probe for Loopback {
///     async fn probe(&self, _host: &str, _timeout: Duration) -> Outcome {
///         Outcome::Reply(0.05)
///     }
/// }
/// ```
#[async_trait]
pub trait Probe: Send + Sync + Debug {
    /// Measure one round trip to `host`.
    async fn probe(&self, host: &str, timeout: Duration) -> Outcome;

    /// Human-readable description, used in logs and the status bar.
    fn description(&self) -> &str {
        "probe"
    }
}
