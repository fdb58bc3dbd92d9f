//! Runtime configuration from environment variables
//!
//! - `MODEL_DIR`: artifact directory (default `model`)
//! - `PORT`: HTTP port (default 8501)
//! - `SESSION_TTL_SECS`: idle lifetime of a session history (default 1800)
//! - `MAX_SESSIONS`: session cache capacity (default 10000)

use std::path::PathBuf;

pub const DEFAULT_MODEL_DIR: &str = "model";
pub const DEFAULT_PORT: u16 = 8501;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 1800;
pub const DEFAULT_MAX_SESSIONS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    pub model_dir: PathBuf,
    pub port: u16,
    pub session_ttl_secs: u64,
    pub max_sessions: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            port: DEFAULT_PORT,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

impl PlannerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unparsable values fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            model_dir: lookup("MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_dir),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            session_ttl_secs: lookup("SESSION_TTL_SECS")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.session_ttl_secs),
            max_sessions: lookup("MAX_SESSIONS")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.max_sessions),
        }
    }
}
