//! Statistics engine: per-host rolling state and its update rules.
//!
//! ## Submodules
//!
//! - [`ring`]: Fixed-capacity ring buffer backing the loss window and history
//! - [`record`]: [`HostRecord`] and the once-per-cycle [`HostRecord::apply_result`]
//! - [`health`]: Loss thresholds and the [`HealthStatus`] of a host
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "1s", "500ms")
//!
//! ## Update flow
//!
//! ```text
//! Outcome (Reply(ms) | Timeout)
//!        │
//!        ▼
//! HostRecord::apply_result()
//!        │
//!        ├──▶ loss window + loss %
//!        ├──▶ jitter (EWMA, replies only)
//!        ├──▶ last RTT (replies only)
//!        └──▶ history ring
//! ```

pub mod duration;
pub mod health;
pub mod record;
pub mod ring;

pub use health::{HealthStatus, Thresholds};
pub use record::{rolling_average, round_ms, Capacities, HostRecord, Outcome};
pub use ring::Ring;
