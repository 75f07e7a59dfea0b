use crate::{
    configuration::Configuration,
    session::{DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL},
};
use chrono::{Local, NaiveDate};
use clap::Parser;
use std::{path::PathBuf, time::Duration};

#[derive(Debug, Clone, Parser)]
#[command(name = "clinic_booking", about = "Mock patient and doctor booking dashboards")]
pub struct ConfigurationHandler {
    /// Title printed on startup
    #[arg(long, env = "WEBSITE_TITLE", default_value = "MediCare")]
    website_title: String,

    #[arg(short, long, env = "PORT", default_value = "8000")]
    port: u16,

    /// Simulated authentication delay in milliseconds
    #[arg(long, env = "LOGIN_DELAY_MS", default_value_t = 800)]
    login_delay_ms: u64,

    /// JSON file replacing the built-in seed data
    #[arg(long, env = "SEED_FILE")]
    seed_file: Option<PathBuf>,

    /// Day the doctor dashboard treats as today (defaults to the local date)
    #[arg(long, env = "TODAY")]
    today: Option<NaiveDate>,

    /// Live sessions kept before the oldest one is evicted
    #[arg(long, env = "MAX_SESSIONS", default_value_t = DEFAULT_MAX_SESSIONS)]
    max_sessions: usize,

    /// Seconds after login at which a session expires
    #[arg(long, env = "SESSION_TTL_SECS", default_value_t = DEFAULT_SESSION_TTL.as_secs())]
    session_ttl_secs: u64,
}

impl ConfigurationHandler {
    pub fn parse_arguments() -> Self {
        if let Err(err) = dotenvy::dotenv() {
            tracing::debug!(?err, "No .env file loaded");
        }
        Self::parse()
    }
}

impl Configuration for ConfigurationHandler {
    fn website_title(&self) -> String {
        self.website_title.clone()
    }

    fn port(&self) -> String {
        self.port.to_string()
    }

    fn login_delay(&self) -> Duration {
        Duration::from_millis(self.login_delay_ms)
    }

    fn seed_file(&self) -> Option<PathBuf> {
        self.seed_file.clone()
    }

    fn today(&self) -> String {
        self.today
            .unwrap_or_else(|| Local::now().date_naive())
            .format("%Y-%m-%d")
            .to_string()
    }

    fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const ENV_VARS: [&str; 7] = [
        "WEBSITE_TITLE",
        "PORT",
        "LOGIN_DELAY_MS",
        "SEED_FILE",
        "TODAY",
        "MAX_SESSIONS",
        "SESSION_TTL_SECS",
    ];

    #[test]
    fn test_defaults() {
        for name in ENV_VARS {
            std::env::remove_var(name);
        }

        let configuration = ConfigurationHandler::try_parse_from(["clinic_booking"]).unwrap();
        assert_eq!(configuration.website_title(), "MediCare");
        assert_eq!(configuration.port(), "8000");
        assert_eq!(configuration.login_delay(), Duration::from_millis(800));
        assert!(configuration.seed_file().is_none());
        assert_eq!(configuration.today().len(), "2026-02-20".len());
        assert_eq!(configuration.max_sessions(), DEFAULT_MAX_SESSIONS);
        assert_eq!(configuration.session_ttl(), DEFAULT_SESSION_TTL);
    }

    #[test]
    fn test_arguments() {
        let configuration = ConfigurationHandler::try_parse_from([
            "clinic_booking",
            "--port",
            "3000",
            "--login-delay-ms",
            "0",
            "--seed-file",
            "seed.json",
            "--today",
            "2026-02-20",
            "--max-sessions",
            "16",
            "--session-ttl-secs",
            "60",
        ])
        .unwrap();
        assert_eq!(configuration.port(), "3000");
        assert_eq!(configuration.login_delay(), Duration::ZERO);
        assert_eq!(configuration.seed_file(), Some(PathBuf::from("seed.json")));
        assert_eq!(configuration.today(), "2026-02-20");
        assert_eq!(configuration.max_sessions(), 16);
        assert_eq!(configuration.session_ttl(), Duration::from_secs(60));
    }

    #[test]
    fn test_reject_malformed_day() {
        ConfigurationHandler::try_parse_from(["clinic_booking", "--today", "20.02.2026"])
            .unwrap_err();
    }
}
