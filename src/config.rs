//! Runtime configuration.
//!
//! Loaded from `~/.leadflow/config.json`; environment variables
//! override (or stand in for) file values so deployments can stay
//! file-free (`GMAIL_CLIENT_ID`, `SUPABASE_URL`, `OPENAI_API_KEY`, ...).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::gmail::GmailCredentials;
use crate::supabase::SupabaseCredentials;
use crate::types::MatchKey;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// The CRM operator's inbox address; distinguishes outbound from
    /// inbound messages during reconciliation.
    pub own_mailbox: String,
    /// Owning user for lead scoping (used by the `user-company` match key).
    pub user_id: Option<String>,
    /// Dedup key for AI candidate ingestion.
    pub match_key: MatchKey,
    /// How many recent messages a reconciliation pass fetches.
    pub message_limit: u32,
    pub gmail: Option<GmailCredentials>,
    pub supabase: Option<SupabaseCredentials>,
    pub openai_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            own_mailbox: String::new(),
            user_id: None,
            match_key: MatchKey::default(),
            message_limit: 50,
            gmail: None,
            supabase: None,
            openai_api_key: None,
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

impl Config {
    /// Default config file location.
    pub fn path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_default()
            .join(".leadflow")
            .join("config.json")
    }

    /// Load from the default location plus environment overrides.
    /// A missing file is not an error; env vars alone can configure
    /// a deployment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::path())?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from an explicit path, without env overrides. Useful for tests.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(mailbox) = env_var("LEADFLOW_MAILBOX") {
            self.own_mailbox = mailbox;
        }
        if let Some(user_id) = env_var("LEADFLOW_USER_ID") {
            self.user_id = Some(user_id);
        }
        if let (Some(client_id), Some(client_secret), Some(refresh_token)) = (
            env_var("GMAIL_CLIENT_ID"),
            env_var("GMAIL_CLIENT_SECRET"),
            env_var("GMAIL_REFRESH_TOKEN"),
        ) {
            self.gmail = Some(GmailCredentials {
                client_id,
                client_secret,
                refresh_token,
            });
        }
        if let (Some(url), Some(service_key)) =
            (env_var("SUPABASE_URL"), env_var("SUPABASE_SERVICE_KEY"))
        {
            self.supabase = Some(SupabaseCredentials { url, service_key });
        }
        if let Some(key) = env_var("OPENAI_API_KEY") {
            self.openai_api_key = Some(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.message_limit, 50);
        assert_eq!(config.match_key, MatchKey::Company);
        assert!(config.gmail.is_none());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.message_limit, 50);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{
                "ownMailbox": "me@mycrm.dk",
                "matchKey": "name-company",
                "messageLimit": 25,
                "supabase": {"url": "https://x.supabase.co", "service_key": "k"}
            }"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.own_mailbox, "me@mycrm.dk");
        assert_eq!(config.match_key, MatchKey::NameCompany);
        assert_eq!(config.message_limit, 25);
        assert_eq!(config.supabase.unwrap().url, "https://x.supabase.co");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        // Serialized env access: this is the only test touching these vars.
        std::env::set_var("LEADFLOW_MAILBOX", "env@mycrm.dk");
        std::env::set_var("GMAIL_CLIENT_ID", "cid");
        std::env::set_var("GMAIL_CLIENT_SECRET", "secret");
        std::env::set_var("GMAIL_REFRESH_TOKEN", "rt");

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config.own_mailbox, "env@mycrm.dk");
        let gmail = config.gmail.expect("gmail credentials from env");
        assert_eq!(gmail.client_id, "cid");
        assert_eq!(gmail.refresh_token, "rt");

        std::env::remove_var("LEADFLOW_MAILBOX");
        std::env::remove_var("GMAIL_CLIENT_ID");
        std::env::remove_var("GMAIL_CLIENT_SECRET");
        std::env::remove_var("GMAIL_REFRESH_TOKEN");
    }
}
