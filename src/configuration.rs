use std::{path::PathBuf, time::Duration};

pub trait Configuration: Clone + Send + Sync + 'static {
    fn website_title(&self) -> String;
    fn port(&self) -> String;
    /// Artificial wait before a login or signup answers.
    fn login_delay(&self) -> Duration;
    fn seed_file(&self) -> Option<PathBuf>;
    /// Day shown as "today" on the doctor dashboard, `YYYY-MM-DD`.
    fn today(&self) -> String;
    /// Live sessions kept before the oldest is evicted.
    fn max_sessions(&self) -> usize;
    fn session_ttl(&self) -> Duration;
}
