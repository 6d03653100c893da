use std::path::PathBuf;
use std::time::Duration;

use barpark_services::Simulation;

/// Invalid value in one of the `BARPARK_*` variables.
#[derive(Debug, thiserror::Error)]
#[error("{var} must be {expected}, got '{value}'")]
pub struct ConfigError {
    pub var: &'static str,
    pub expected: &'static str,
    pub value: String,
}

/// How the binary formats its log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Application configuration loaded from environment variables.
///
/// All fields have defaults suitable for running the demo locally.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Delay added to every simulated service call (default: 300 ms).
    pub latency: Duration,
    /// Probability in `0.0..=1.0` that a simulated call fails (default: `0`).
    pub failure_rate: f64,
    /// Where uploaded photos and dashboard settings are written.
    pub data_dir: PathBuf,
    /// Display name of the local user.
    pub user_name: String,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default          |
    /// |------------------------|------------------|
    /// | `BARPARK_LATENCY_MS`   | `300`            |
    /// | `BARPARK_FAILURE_RATE` | `0.0`            |
    /// | `BARPARK_DATA_DIR`     | `./barpark-data` |
    /// | `BARPARK_USER_NAME`    | `You`            |
    /// | `BARPARK_LOG_FORMAT`   | `pretty`         |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads variables through
    /// `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let latency_ms: u64 = match lookup("BARPARK_LATENCY_MS") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError {
                var: "BARPARK_LATENCY_MS",
                expected: "a whole number of milliseconds",
                value: raw,
            })?,
            None => 300,
        };

        let failure_rate: f64 = match lookup("BARPARK_FAILURE_RATE") {
            Some(raw) => match raw.trim().parse::<f64>() {
                Ok(rate) if (0.0..=1.0).contains(&rate) => rate,
                _ => {
                    return Err(ConfigError {
                        var: "BARPARK_FAILURE_RATE",
                        expected: "a probability between 0 and 1",
                        value: raw,
                    })
                }
            },
            None => 0.0,
        };

        let data_dir = lookup("BARPARK_DATA_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./barpark-data"));

        let user_name = lookup("BARPARK_USER_NAME")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "You".into());

        let log_format = match lookup("BARPARK_LOG_FORMAT") {
            None => LogFormat::Pretty,
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "pretty" | "" => LogFormat::Pretty,
                "json" => LogFormat::Json,
                _ => {
                    return Err(ConfigError {
                        var: "BARPARK_LOG_FORMAT",
                        expected: "'pretty' or 'json'",
                        value: raw,
                    })
                }
            },
        };

        Ok(Self {
            latency: Duration::from_millis(latency_ms),
            failure_rate,
            data_dir,
            user_name,
            log_format,
        })
    }

    /// Latency and fault injection shared by every in-memory service.
    pub fn simulation(&self) -> Simulation {
        Simulation::new(self.latency, self.failure_rate)
    }

    pub fn photos_dir(&self) -> PathBuf {
        self.data_dir.join("photos")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join("dashboard.json")
    }
}
