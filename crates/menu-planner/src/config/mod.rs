use std::env;
use std::fmt;

/// Distinguishes runtime behavior for different stages of the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub planner: PlannerConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let seed = match env::var("APP_PLANNER_SEED") {
            Ok(raw) => Some(
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidSeed(raw.clone()))?,
            ),
            Err(_) => None,
        };

        let optimizer_iterations = match env::var("APP_PLANNER_ITERATIONS") {
            Ok(raw) => Some(
                raw.trim()
                    .parse::<usize>()
                    .map_err(|_| ConfigError::InvalidIterations(raw.clone()))?,
            ),
            Err(_) => None,
        };

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            planner: PlannerConfig {
                seed,
                optimizer_iterations,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Process-wide overrides applied on top of each plan configuration.
#[derive(Debug, Clone, Default)]
pub struct PlannerConfig {
    pub seed: Option<u64>,
    pub optimizer_iterations: Option<usize>,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidSeed(String),
    InvalidIterations(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidSeed(raw) => {
                write!(f, "APP_PLANNER_SEED must be a valid u64 (got '{raw}')")
            }
            ConfigError::InvalidIterations(raw) => {
                write!(f, "APP_PLANNER_ITERATIONS must be a valid usize (got '{raw}')")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("APP_PLANNER_SEED");
        env::remove_var("APP_PLANNER_ITERATIONS");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.planner.seed, None);
        assert_eq!(config.planner.optimizer_iterations, None);
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn reads_planner_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "ci");
        env::set_var("APP_PLANNER_SEED", " 42 ");
        env::set_var("APP_PLANNER_ITERATIONS", "50");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Test);
        assert_eq!(config.planner.seed, Some(42));
        assert_eq!(config.planner.optimizer_iterations, Some(50));
        reset_env();
    }

    #[test]
    fn rejects_non_numeric_seed() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_PLANNER_SEED", "forty-two");
        let err = AppConfig::load().expect_err("seed must be numeric");
        assert!(matches!(err, ConfigError::InvalidSeed(ref raw) if raw == "forty-two"));
        reset_env();
    }
}
