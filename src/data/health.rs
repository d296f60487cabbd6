//! Link health classification.

/// Loss thresholds, in percent, for health status computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Loss percentage that triggers a warning.
    pub loss_warning: f64,
    /// Loss percentage that triggers critical status.
    pub loss_critical: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            loss_warning: 1.0,
            loss_critical: 50.0,
        }
    }
}

impl Thresholds {
    /// Classify a host from its loss percentage.
    ///
    /// A host that has been probed but never answered is critical whatever
    /// its loss window says; a host not probed yet is healthy.
    pub fn classify(&self, loss_pct: f64, ever_replied: bool, cycles: u64) -> HealthStatus {
        if cycles == 0 {
            HealthStatus::Healthy
        } else if !ever_replied || loss_pct >= self.loss_critical {
            HealthStatus::Critical
        } else if loss_pct >= self.loss_warning {
            HealthStatus::Warning
        } else {
            HealthStatus::Healthy
        }
    }
}

/// Health status for a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

impl HealthStatus {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "UP",
            HealthStatus::Warning => "LOSS",
            HealthStatus::Critical => "DOWN",
        }
    }
}
