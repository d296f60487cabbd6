//! Probe adapter backed by the platform `ping` tool.

use std::path::Path;
use std::process::Stdio;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;

use super::{Outcome, Probe, GRACE};
use crate::error::ProbeError;

/// Default tool name, resolved through `PATH`.
const DEFAULT_PROGRAM: &str = "ping";

/// Matches `time=12.3 ms`, `time<1ms` and the Windows `Average = 12ms` summary.
static RTT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)time[=<]\s*([\d.]+)\s*ms|Average = (\d+)\s*ms")
        .expect("RTT pattern is a valid regex")
});

/// Command-line dialect of the ping tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// `-n 1 -w <ms>`
    Windows,
    /// `-c 1 -W <ms>`
    MacOs,
    /// `-c 1 -W <whole seconds>`
    Unix,
}

impl Platform {
    /// The dialect of the platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Unix
        }
    }

    /// Arguments for a single echo request to `host`.
    pub fn args(self, host: &str, timeout: Duration) -> Vec<String> {
        let ms = timeout.as_millis();
        match self {
            Platform::Windows => vec![
                "-n".into(),
                "1".into(),
                "-w".into(),
                ms.to_string(),
                host.into(),
            ],
            Platform::MacOs => vec![
                "-c".into(),
                "1".into(),
                "-W".into(),
                ms.to_string(),
                host.into(),
            ],
            Platform::Unix => {
                let secs = ms.div_ceil(1000).max(1);
                vec![
                    "-c".into(),
                    "1".into(),
                    "-W".into(),
                    secs.to_string(),
                    host.into(),
                ]
            }
        }
    }
}

/// Runs one `ping` process per probe and parses the reported RTT.
///
/// The child is killed if the probe is abandoned, so cancelling a sweep
/// does not leave stray processes behind.
#[derive(Debug, Clone)]
pub struct SystemPing {
    program: String,
    platform: Platform,
    description: String,
}

impl Default for SystemPing {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemPing {
    /// Use the platform's `ping` from `PATH`.
    pub fn new() -> Self {
        Self::with_program(DEFAULT_PROGRAM)
    }

    /// Use a specific ping executable (name or path).
    pub fn with_program(program: impl Into<String>) -> Self {
        let program = program.into();
        let description = format!("system: {}", program);
        Self {
            program,
            platform: Platform::current(),
            description,
        }
    }

    /// Override the command-line dialect.
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Check whether the tool can be found.
    ///
    /// A missing tool is not fatal: every probe then reports a timeout.
    pub fn is_available(&self) -> bool {
        let program = Path::new(&self.program);
        if program.components().count() > 1 {
            return program.is_file();
        }

        let Some(paths) = std::env::var_os("PATH") else {
            return false;
        };
        std::env::split_paths(&paths).any(|dir| {
            dir.join(program).is_file()
                || (cfg!(windows) && dir.join(format!("{}.exe", self.program)).is_file())
        })
    }

    async fn measure(&self, host: &str, timeout: Duration) -> Result<f64, ProbeError> {
        let deadline = timeout + GRACE;
        let run = Command::new(&self.program)
            .args(self.platform.args(host, timeout))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(deadline, run)
            .await
            .map_err(|_| ProbeError::Deadline(deadline))?
            .map_err(|source| ProbeError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        parse_rtt(&String::from_utf8_lossy(&output.stdout))
    }
}

#[async_trait]
impl Probe for SystemPing {
    async fn probe(&self, host: &str, timeout: Duration) -> Outcome {
        match self.measure(host, timeout).await {
            Ok(rtt) => Outcome::Reply(rtt),
            Err(e) => {
                tracing::debug!(host = %host, error = %e, "Probe got no reply");
                Outcome::Timeout
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Extract the round-trip time in milliseconds from ping output.
pub fn parse_rtt(output: &str) -> Result<f64, ProbeError> {
    let caps = RTT_PATTERN.captures(output).ok_or(ProbeError::NoReply)?;
    let raw = caps
        .iter()
        .skip(1)
        .flatten()
        .next()
        .ok_or(ProbeError::NoReply)?
        .as_str();

    match raw.parse::<f64>() {
        Ok(rtt) if rtt.is_finite() && rtt >= 0.0 => Ok(rtt),
        _ => Err(ProbeError::BadRtt(raw.to_string())),
    }
}
