//! Application-level configuration loading: sign-in accounts, seed members and SSE tuning.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::dao::{
    identity::Identity,
    models::{DEFAULT_ELO, MemberEntity, RoleEntity},
};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "MEETUP_SESSION_CONFIG_PATH";
/// Interval between SSE keep-alive comments when none is configured.
const DEFAULT_KEEP_ALIVE_SECS: u64 = 15;
/// Interval between background roster reloads when none is configured.
const DEFAULT_ROSTER_REFRESH_SECS: u64 = 30;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    accounts: Vec<Identity>,
    seed_members: Vec<MemberEntity>,
    sse_keep_alive: Duration,
    roster_refresh: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        accounts = app_config.accounts.len(),
                        seed_members = app_config.seed_members.len(),
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON configuration document.
    pub fn parse(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Accounts offered by the sign-in flow.
    pub fn accounts(&self) -> &[Identity] {
        &self.accounts
    }

    /// Members written to the in-memory document store at startup.
    pub fn seed_members(&self) -> &[MemberEntity] {
        &self.seed_members
    }

    /// Interval between keep-alive comments on idle SSE streams.
    pub fn sse_keep_alive(&self) -> Duration {
        self.sse_keep_alive
    }

    /// How often the roster is reloaded to pick up records changed outside this process.
    pub fn roster_refresh(&self) -> Duration {
        self.roster_refresh
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            accounts: Vec::new(),
            seed_members: Vec::new(),
            sse_keep_alive: Duration::from_secs(DEFAULT_KEEP_ALIVE_SECS),
            roster_refresh: Duration::from_secs(DEFAULT_ROSTER_REFRESH_SECS),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    accounts: Vec<Identity>,
    #[serde(default)]
    seed_members: Vec<RawMember>,
    #[serde(default)]
    sse_keep_alive_secs: Option<u64>,
    #[serde(default)]
    roster_refresh_secs: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            accounts: value.accounts,
            seed_members: value.seed_members.into_iter().map(Into::into).collect(),
            sse_keep_alive: positive_secs(value.sse_keep_alive_secs, DEFAULT_KEEP_ALIVE_SECS),
            roster_refresh: positive_secs(value.roster_refresh_secs, DEFAULT_ROSTER_REFRESH_SECS),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of a seeded member; rating and role are optional.
struct RawMember {
    id: String,
    name: String,
    #[serde(default)]
    elo: Option<i32>,
    #[serde(default)]
    role: RoleEntity,
}

impl From<RawMember> for MemberEntity {
    fn from(value: RawMember) -> Self {
        Self {
            id: value.id,
            name: value.name,
            elo: value.elo.unwrap_or(DEFAULT_ELO),
            role: value.role,
        }
    }
}

fn positive_secs(value: Option<u64>, default: u64) -> Duration {
    Duration::from_secs(value.filter(|secs| *secs > 0).unwrap_or(default))
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_accounts_and_seed_members() {
        let config = AppConfig::parse(
            r#"{
                "accounts": [{"uid": "u1", "display_name": "Ada", "email": "ada@example.com"}],
                "seed_members": [
                    {"id": "u1", "name": "Ada", "role": "organizer"},
                    {"id": "u2", "name": "Bo", "elo": 1180}
                ],
                "sse_keep_alive_secs": 5
            }"#,
        )
        .unwrap();

        assert_eq!(config.accounts()[0].uid, "u1");
        assert_eq!(config.seed_members()[0].role, RoleEntity::Organizer);
        assert_eq!(config.seed_members()[0].elo, DEFAULT_ELO);
        assert_eq!(config.seed_members()[1].elo, 1180);
        assert_eq!(config.seed_members()[1].role, RoleEntity::Member);
        assert_eq!(config.sse_keep_alive(), Duration::from_secs(5));
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config = AppConfig::parse(r#"{"roster_refresh_secs": 0}"#).unwrap();
        assert!(config.accounts().is_empty());
        assert_eq!(
            config.roster_refresh(),
            Duration::from_secs(DEFAULT_ROSTER_REFRESH_SECS)
        );
        assert_eq!(
            config.sse_keep_alive(),
            Duration::from_secs(DEFAULT_KEEP_ALIVE_SECS)
        );
    }
}
