//! Error types.

use thiserror::Error;

/// Invalid or unloadable settings. Always fatal, and always raised before
/// the scheduler starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file or environment could not be read.
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    /// No hosts to monitor.
    #[error("host list is empty")]
    NoHosts,

    /// A host name is empty or would be read as a command-line flag.
    #[error("invalid host name '{0}'")]
    InvalidHost(String),

    /// A capacity or timeout that must be at least one is zero.
    #[error("{0} must be at least 1")]
    Zero(&'static str),

    /// A duration value could not be parsed or is not positive.
    #[error("invalid {field}: {reason}")]
    Duration {
        field: &'static str,
        reason: String,
    },

    /// Unknown sort key.
    #[error("unknown sort key '{0}' (expected name, rtt, loss or jitter)")]
    SortKey(String),

    /// Loss thresholds out of order or outside 0..=100.
    #[error("loss thresholds must satisfy 0 <= warning ({warning}) <= critical ({critical}) <= 100")]
    Thresholds { warning: f64, critical: f64 },
}

/// Failure of a single probe. Never leaves the probe adapter: every variant
/// is reported to the engine as a timeout.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The ping tool could not be started.
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool did not exit within the deadline.
    #[error("no result within {0:?}")]
    Deadline(std::time::Duration),

    /// The tool ran but its output carried no round-trip time.
    #[error("no reply")]
    NoReply,

    /// A round-trip time was found but is not a usable number.
    #[error("unusable round-trip time '{0}'")]
    BadRtt(String),
}
