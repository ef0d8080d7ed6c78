use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use tracing::{debug, info, warn};

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub session_file: PathBuf,
    pub request_timeout: Duration,
    pub load_more_delay: Duration,
}

impl Config {
    /// Load from the environment (and `.env`, if present). Bad or missing
    /// values fall back to defaults with a log line.
    pub fn load() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }

        let session_file = env::var("RUMIN_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_session_file());

        Self {
            api_url: try_load::<String>("RUMIN_API_URL", DEFAULT_API_URL)
                .trim_end_matches('/')
                .to_string(),
            session_file,
            request_timeout: Duration::from_secs(try_load("RUMIN_HTTP_TIMEOUT_SECS", "30")),
            load_more_delay: Duration::from_millis(try_load("RUMIN_LOAD_MORE_DELAY_MS", "300")),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_file: default_session_file(),
            request_timeout: Duration::from_secs(30),
            load_more_delay: crate::pipeline::LOAD_MORE_DELAY,
        }
    }
}

fn default_session_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(env::temp_dir)
        .join("rumin")
        .join("session.json")
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
        parse_default(key, default)
    })
}

fn parse_default<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    match default.parse() {
        Ok(value) => value,
        // Defaults are literals in this file; reaching this is a programming error.
        Err(e) => unreachable!("default for {key} does not parse: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_number_falls_back_to_default() {
        env::set_var("RUMIN_TEST_TIMEOUT", "soon");
        let secs: u64 = try_load("RUMIN_TEST_TIMEOUT", "30");
        assert_eq!(secs, 30);
        env::remove_var("RUMIN_TEST_TIMEOUT");
    }

    #[test]
    fn set_value_wins() {
        env::set_var("RUMIN_TEST_DELAY", "50");
        let ms: u64 = try_load("RUMIN_TEST_DELAY", "300");
        assert_eq!(ms, 50);
        env::remove_var("RUMIN_TEST_DELAY");
    }

    #[test]
    fn default_session_file_lives_under_rumin() {
        let path = default_session_file();
        assert!(path.ends_with("rumin/session.json"));
    }
}
