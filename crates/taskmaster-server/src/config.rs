//! Server configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for the API server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"0.0.0.0"`).
    pub host: String,
    /// Port to bind (default `3001`; `0` for auto-assign).
    pub port: u16,
    /// Database file path. `None` lets the caller pick its default
    /// location (the binary uses `~/.taskmaster/tasks.db`).
    pub db_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3001,
            db_path: None,
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `TASKMASTER_HOST`, `TASKMASTER_PORT`, and
    /// `TASKMASTER_DB_PATH` where set.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply environment-style overrides from a lookup function.
    ///
    /// The lookup is a parameter so tests can drive this without touching
    /// process-global environment state. Unparsable values are logged and
    /// ignored rather than failing startup.
    pub fn with_env_overrides(mut self, get: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(host) = get("TASKMASTER_HOST").filter(|h| !h.trim().is_empty()) {
            self.host = host;
        }
        if let Some(raw) = get("TASKMASTER_PORT") {
            match parse_port(&raw) {
                Some(port) => self.port = port,
                None => tracing::warn!(value = %raw, "ignoring invalid TASKMASTER_PORT"),
            }
        }
        if let Some(path) = get("TASKMASTER_DB_PATH").filter(|p| !p.trim().is_empty()) {
            self.db_path = Some(PathBuf::from(path));
        }
        self
    }

    /// `host:port` string for the TCP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse a port number, rejecting anything that does not fit in u16.
fn parse_port(raw: &str) -> Option<u16> {
    raw.trim().parse().ok()
}
