//! Settings loading and validation.
//!
//! Layers, lowest precedence first: built-in defaults, an optional config
//! file (TOML, YAML or JSON), `XPING_*` environment variables, command-line
//! flags. Validation happens once, before anything is started.
//!
//! ```toml
//! hosts = ["1.1.1.1", "example.com"]
//! interval = "500ms"
//! loss_window = 30
//! hist_size = 40
//! timeout_ms = 800
//! sort = "rtt"
//! descending = true
//! loss_warning = 2
//! loss_critical = 40
//! ```

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::data::duration::parse_duration;
use crate::data::{Capacities, Thresholds};
use crate::error::ConfigError;
use crate::monitor::{ScheduleConfig, SortKey};

/// Prefix of the environment variables read as settings.
pub const ENV_PREFIX: &str = "XPING";

const DEFAULT_HOSTS: &[&str] = &[
    "1.1.1.1",
    "8.8.8.8",
    "github.com",
    "google.com",
    "amazon.com",
    "facebook.com",
];

/// Raw settings as read from the file and environment layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub hosts: Vec<String>,
    /// Rest between sweeps: seconds, or a value with a unit ("500ms", "2s").
    pub interval: String,
    pub loss_window: usize,
    pub hist_size: usize,
    pub timeout_ms: u64,
    pub sort: String,
    pub descending: bool,
    pub json: bool,
    pub beep: bool,
    pub loss_warning: f64,
    pub loss_critical: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hosts: DEFAULT_HOSTS.iter().map(|h| h.to_string()).collect(),
            interval: "1s".to_string(),
            loss_window: 30,
            hist_size: 40,
            timeout_ms: 1000,
            sort: SortKey::Name.label().to_string(),
            descending: false,
            json: false,
            beep: false,
            loss_warning: 1.0,
            loss_critical: 50.0,
        }
    }
}

/// Command-line values; anything set here wins over every other layer.
///
/// Flags can only switch boolean settings on.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub hosts: Option<Vec<String>>,
    pub interval: Option<String>,
    pub loss_window: Option<usize>,
    pub hist_size: Option<usize>,
    pub timeout_ms: Option<u64>,
    pub sort: Option<SortKey>,
    pub descending: bool,
    pub json: bool,
    pub beep: bool,
}

impl Settings {
    /// Load defaults, then `path` if given, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, environment())
    }

    fn load_with(path: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let settings = builder.add_source(env).build()?.try_deserialize()?;
        Ok(settings)
    }

    /// Apply command-line values on top.
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(hosts) = overrides.hosts.filter(|h| !h.is_empty()) {
            self.hosts = hosts;
        }
        if let Some(interval) = overrides.interval {
            self.interval = interval;
        }
        if let Some(loss_window) = overrides.loss_window {
            self.loss_window = loss_window;
        }
        if let Some(hist_size) = overrides.hist_size {
            self.hist_size = hist_size;
        }
        if let Some(timeout_ms) = overrides.timeout_ms {
            self.timeout_ms = timeout_ms;
        }
        if let Some(sort) = overrides.sort {
            self.sort = sort.label().to_string();
        }
        self.descending |= overrides.descending;
        self.json |= overrides.json;
        self.beep |= overrides.beep;
    }

    /// Check every value and convert to runtime types.
    pub fn validate(self) -> Result<RuntimeConfig, ConfigError> {
        let hosts = unique_hosts(self.hosts)?;

        let interval = parse_duration(&self.interval).map_err(|e| ConfigError::Duration {
            field: "interval",
            reason: e.to_string(),
        })?;
        if interval.is_zero() {
            return Err(ConfigError::Duration {
                field: "interval",
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.loss_window == 0 {
            return Err(ConfigError::Zero("loss_window"));
        }
        if self.hist_size == 0 {
            return Err(ConfigError::Zero("hist_size"));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Zero("timeout_ms"));
        }

        let sort: SortKey = self.sort.parse()?;

        let (warning, critical) = (self.loss_warning, self.loss_critical);
        let ordered = 0.0 <= warning && warning <= critical && critical <= 100.0;
        if !ordered {
            return Err(ConfigError::Thresholds { warning, critical });
        }

        Ok(RuntimeConfig {
            hosts,
            capacities: Capacities {
                loss_window: self.loss_window,
                history: self.hist_size,
            },
            schedule: ScheduleConfig {
                interval,
                timeout: Duration::from_millis(self.timeout_ms),
            },
            sort,
            descending: self.descending,
            json: self.json,
            beep: self.beep,
            thresholds: Thresholds {
                loss_warning: warning,
                loss_critical: critical,
            },
        })
    }
}

/// Validated settings, ready to start the engine with.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Unique host names in configuration order.
    pub hosts: Vec<String>,
    pub capacities: Capacities,
    pub schedule: ScheduleConfig,
    pub sort: SortKey,
    pub descending: bool,
    pub json: bool,
    pub beep: bool,
    pub thresholds: Thresholds,
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("hosts")
}

/// Trim names, reject unusable ones and collapse duplicates to their first
/// occurrence.
fn unique_hosts(hosts: Vec<String>) -> Result<Vec<String>, ConfigError> {
    let mut unique: Vec<String> = Vec::with_capacity(hosts.len());
    for host in hosts {
        let host = host.trim();
        if host.is_empty() || host.starts_with('-') || host.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidHost(host.to_string()));
        }
        if unique.iter().any(|h| h == host) {
            tracing::warn!(host = %host, "Duplicate host ignored");
            continue;
        }
        unique.push(host.to_string());
    }

    if unique.is_empty() {
        return Err(ConfigError::NoHosts);
    }
    Ok(unique)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(map))
    }

    fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_validate() {
        let config = Settings::load_with(None, env(&[])).unwrap().validate().unwrap();
        assert_eq!(config.hosts.len(), 6);
        assert_eq!(config.hosts[0], "1.1.1.1");
        assert_eq!(config.capacities, Capacities::default());
        assert_eq!(config.schedule, ScheduleConfig::default());
        assert_eq!(config.sort, SortKey::Name);
        assert!(!config.descending && !config.json && !config.beep);
        assert_eq!(config.thresholds, Thresholds::default());
    }

    #[test]
    fn file_overrides_defaults() {
        let file = config_file(
            r#"
hosts = ["a.example", "b.example"]
interval = "500ms"
loss_window = 10
sort = "loss"
"#,
        );
        let config = Settings::load_with(Some(file.path()), env(&[]))
            .unwrap()
            .validate()
            .unwrap();

        assert_eq!(config.hosts, ["a.example", "b.example"]);
        assert_eq!(config.schedule.interval, Duration::from_millis(500));
        assert_eq!(config.capacities.loss_window, 10);
        assert_eq!(config.capacities.history, 40);
        assert_eq!(config.sort, SortKey::Loss);
    }

    #[test]
    fn environment_overrides_file() {
        let file = config_file("interval = 3\nhist_size = 12\n");
        let settings = Settings::load_with(
            Some(file.path()),
            env(&[
                ("XPING_INTERVAL", "2"),
                ("XPING_HOSTS", "x.example,y.example"),
                ("XPING_DESCENDING", "true"),
            ]),
        )
        .unwrap();

        let config = settings.validate().unwrap();
        assert_eq!(config.schedule.interval, Duration::from_secs(2));
        assert_eq!(config.capacities.history, 12);
        assert_eq!(config.hosts, ["x.example", "y.example"]);
        assert!(config.descending);
    }

    #[test]
    fn command_line_wins() {
        let mut settings = Settings::load_with(None, env(&[("XPING_TIMEOUT_MS", "300")])).unwrap();
        settings.apply(Overrides {
            hosts: Some(vec!["cli.example".to_string()]),
            timeout_ms: Some(750),
            sort: Some(SortKey::Jitter),
            beep: true,
            ..Overrides::default()
        });

        let config = settings.validate().unwrap();
        assert_eq!(config.hosts, ["cli.example"]);
        assert_eq!(config.schedule.timeout, Duration::from_millis(750));
        assert_eq!(config.sort, SortKey::Jitter);
        assert!(config.beep);
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = Settings::load_with(Some(Path::new("/nonexistent/xping.toml")), env(&[]));
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn duplicates_collapse_to_first_occurrence() {
        let settings = Settings {
            hosts: vec!["b".into(), "a".into(), " b ".into(), "c".into(), "a".into()],
            ..Settings::default()
        };
        assert_eq!(settings.validate().unwrap().hosts, ["b", "a", "c"]);
    }

    #[test]
    fn rejects_bad_hosts() {
        let empty = Settings {
            hosts: vec![],
            ..Settings::default()
        };
        assert!(matches!(empty.validate(), Err(ConfigError::NoHosts)));

        for bad in ["", "  ", "-c", "two words"] {
            let settings = Settings {
                hosts: vec!["ok".into(), bad.into()],
                ..Settings::default()
            };
            assert!(
                matches!(settings.validate(), Err(ConfigError::InvalidHost(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_zero_values() {
        let cases = [
            (
                Settings {
                    loss_window: 0,
                    ..Settings::default()
                },
                "loss_window",
            ),
            (
                Settings {
                    hist_size: 0,
                    ..Settings::default()
                },
                "hist_size",
            ),
            (
                Settings {
                    timeout_ms: 0,
                    ..Settings::default()
                },
                "timeout_ms",
            ),
        ];
        for (settings, field) in cases {
            match settings.validate() {
                Err(ConfigError::Zero(name)) => assert_eq!(name, field),
                other => panic!("expected zero error for {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_bad_intervals() {
        for interval in ["0", "0ms", "-1", "soon", "NaN"] {
            let settings = Settings {
                interval: interval.to_string(),
                ..Settings::default()
            };
            assert!(
                matches!(settings.validate(), Err(ConfigError::Duration { .. })),
                "{interval:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_unknown_sort_key() {
        let settings = Settings {
            sort: "latency".to_string(),
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(ConfigError::SortKey(_))));
    }

    #[test]
    fn rejects_inverted_thresholds() {
        for (warning, critical) in [(60.0, 50.0), (-1.0, 50.0), (1.0, 101.0), (f64::NAN, 50.0)] {
            let settings = Settings {
                loss_warning: warning,
                loss_critical: critical,
                ..Settings::default()
            };
            assert!(matches!(
                settings.validate(),
                Err(ConfigError::Thresholds { .. })
            ));
        }
    }
}
