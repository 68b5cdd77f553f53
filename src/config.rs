//! Application-level configuration loading, including the round timing knobs.

use std::{env, time::Duration};

use tracing::{info, warn};

/// Environment variable naming the HTTP port.
const PORT_ENV: &str = "PORT";
/// Fallback environment variable for the HTTP port.
const PORT_FALLBACK_ENV: &str = "SERVER_PORT";
/// Environment variable holding the admin bearer token.
const ADMIN_TOKEN_ENV: &str = "ADMIN_TOKEN";
/// Environment variable overriding the per-round answering window, in seconds.
const ANSWERING_SECONDS_ENV: &str = "ANSWERING_SECONDS";
/// Environment variable overriding the pause between rounds, in seconds.
const RESULTS_PAUSE_SECONDS_ENV: &str = "RESULTS_PAUSE_SECONDS";
/// Environment variable overriding the number of rounds per game.
const MAX_ROUNDS_ENV: &str = "MAX_ROUNDS";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_ANSWERING: Duration = Duration::from_secs(30);
const DEFAULT_RESULTS_PAUSE: Duration = Duration::from_secs(5);
const DEFAULT_MAX_ROUNDS: u32 = 5;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Port the HTTP listener binds to.
    pub port: u16,
    /// Bearer token required by the admin endpoints; `None` disables them.
    pub admin_token: Option<String>,
    /// How long players get to answer each round.
    pub answering: Duration,
    /// Pause between a round's results and the next round auto-starting.
    pub results_pause: Duration,
    /// Number of rounds after which the game ends with a leaderboard.
    pub max_rounds: u32,
}

impl AppConfig {
    /// Load the configuration from the environment, falling back to defaults.
    pub fn load() -> Self {
        let config = Self {
            port: env::var(PORT_ENV)
                .or_else(|_| env::var(PORT_FALLBACK_ENV))
                .ok()
                .and_then(|value| parse_env(PORT_ENV, &value))
                .unwrap_or(DEFAULT_PORT),
            admin_token: env::var(ADMIN_TOKEN_ENV)
                .ok()
                .filter(|token| !token.is_empty()),
            answering: duration_from_env(ANSWERING_SECONDS_ENV, DEFAULT_ANSWERING),
            results_pause: duration_from_env(RESULTS_PAUSE_SECONDS_ENV, DEFAULT_RESULTS_PAUSE),
            max_rounds: env::var(MAX_ROUNDS_ENV)
                .ok()
                .and_then(|value| parse_env(MAX_ROUNDS_ENV, &value))
                .filter(|rounds| *rounds > 0)
                .unwrap_or(DEFAULT_MAX_ROUNDS),
        };

        if config.admin_token.is_none() {
            warn!("no admin token configured; admin endpoints will reject all requests");
        }
        info!(
            answering_secs = config.answering.as_secs(),
            results_pause_secs = config.results_pause.as_secs(),
            max_rounds = config.max_rounds,
            "loaded configuration"
        );
        config
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            admin_token: None,
            answering: DEFAULT_ANSWERING,
            results_pause: DEFAULT_RESULTS_PAUSE,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

/// Parse an environment value, logging a warning when it is malformed.
fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Option<T> {
    match value.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!(%name, %value, "ignoring unparsable environment override");
            None
        }
    }
}

/// Read a whole-seconds duration override from the environment.
fn duration_from_env(name: &str, default: Duration) -> Duration {
    env::var(name)
        .ok()
        .and_then(|value| parse_env::<u64>(name, &value))
        .map(Duration::from_secs)
        .unwrap_or(default)
}
