//! Server configuration
//!
//! All configuration is resolved once in [`Config::from_env`] and passed
//! into components at construction; nothing else reads the environment.
//!
//! | Environment variable | Default | Meaning |
//! |----------------------|-----------------------|------------------------------------|
//! | WORK_DIR | ./data | Working directory (db, logs) |
//! | HTTP_PORT | 5000 | HTTP API port |
//! | DB_PATH | {WORK_DIR}/menu.db | SQLite database file |
//! | INSTANCE_ID | menu-local | Identity attached to sync pushes |
//! | INSTANCE_ROLE | authoritative | authoritative \| mirror |
//! | PEER_URL | (unset) | Base URL of the peer instance |
//! | SYNC_TIMEOUT_MS | 5000 | Peer push/pull timeout |
//! | LOG_LEVEL | info | Log verbosity |
//! | LOG_DIR | (unset) | Enable daily-rolling file logs |

use std::str::FromStr;

/// Fixed role in the two-node pairing
///
/// The authoritative instance is the source of truth when both are
/// reachable; the mirror serves its own last-known state when the peer is
/// down and pulls a fresh snapshot at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceRole {
    Authoritative,
    Mirror,
}

impl FromStr for InstanceRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "authoritative" | "remote" => Ok(InstanceRole::Authoritative),
            "mirror" | "local" => Ok(InstanceRole::Mirror),
            other => Err(format!("unknown instance role: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for the database and logs
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// SQLite database file path
    pub db_path: String,
    /// Identity attached to outgoing sync pushes (loop prevention)
    pub instance_id: String,
    /// Role in the two-node pairing
    pub role: InstanceRole,
    /// Base URL of the peer instance; sync is disabled when unset
    pub peer_url: Option<String>,
    /// Timeout for one peer push/pull attempt (milliseconds)
    pub sync_timeout_ms: u64,
    /// Log verbosity; the logger falls back to "info" when unset
    pub log_level: Option<String>,
    /// Directory for daily-rolling log files; stdout-only when unset
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables, with defaults for
    /// anything unset
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
        let db_path = std::env::var("DB_PATH").unwrap_or_else(|_| format!("{work_dir}/menu.db"));

        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            db_path,
            instance_id: std::env::var("INSTANCE_ID").unwrap_or_else(|_| "menu-local".into()),
            role: std::env::var("INSTANCE_ROLE")
                .ok()
                .and_then(|r| r.parse().ok())
                .unwrap_or(InstanceRole::Authoritative),
            peer_url: std::env::var("PEER_URL").ok().filter(|u| !u.is_empty()),
            sync_timeout_ms: std::env::var("SYNC_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            log_level: std::env::var("LOG_LEVEL").ok().filter(|l| !l.is_empty()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            work_dir,
        }
    }

    /// Override the paths and port (used by tests)
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.db_path = format!("{}/menu.db", config.work_dir);
        config.http_port = http_port;
        config
    }

    pub fn is_mirror(&self) -> bool {
        self.role == InstanceRole::Mirror
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing_accepts_aliases() {
        assert_eq!(
            "authoritative".parse::<InstanceRole>().unwrap(),
            InstanceRole::Authoritative
        );
        assert_eq!("local".parse::<InstanceRole>().unwrap(), InstanceRole::Mirror);
        assert!("primary".parse::<InstanceRole>().is_err());
    }

    #[test]
    fn test_with_overrides_moves_db_path() {
        let config = Config::with_overrides("/tmp/menu-test", 0);
        assert_eq!(config.db_path, "/tmp/menu-test/menu.db");
    }

    #[test]
    fn test_log_level_comes_from_env() {
        std::env::set_var("LOG_LEVEL", "debug");
        let config = Config::from_env();
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        std::env::remove_var("LOG_LEVEL");
    }
}
