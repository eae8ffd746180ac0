//! Sync configuration record.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use gitvault_common::{AccessToken, Error, Result};

/// Persisted sync configuration.
///
/// Owned by the caller and passed by reference into each pass; the engine
/// reads only the fields it needs and never writes the record back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Forge provider id (e.g. "github").
    pub provider: String,
    /// Personal access token.
    pub token: AccessToken,
    /// Account login the token belongs to, if known.
    pub username: Option<String>,
    /// Target repository, as the forge-side full name ("owner/name").
    pub repository: String,
    /// Target branch.
    pub branch: String,
    /// Label for this machine, embedded in commit messages.
    pub device_label: String,
    /// Whether scheduled sync is enabled.
    pub auto_sync: bool,
    /// Minutes between scheduled passes.
    pub sync_interval_mins: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            provider: "github".to_string(),
            token: AccessToken::new(""),
            username: None,
            repository: String::new(),
            branch: String::new(),
            device_label: "Unknown Device".to_string(),
            auto_sync: false,
            sync_interval_mins: 5,
        }
    }
}

impl SyncSettings {
    /// Check the record is complete enough to run a pass.
    pub fn validate(&self) -> Result<()> {
        if self.token.is_empty() {
            return Err(Error::Auth("No access token configured".to_string()));
        }
        if self.repository.is_empty() {
            return Err(Error::InvalidInput("No repository selected".to_string()));
        }
        if self.branch.is_empty() {
            return Err(Error::InvalidInput("No branch selected".to_string()));
        }
        if self.sync_interval_mins == 0 {
            return Err(Error::InvalidInput(
                "Sync interval must be at least one minute".to_string(),
            ));
        }
        Ok(())
    }

    /// Scheduler period.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_mins * 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> SyncSettings {
        SyncSettings {
            token: AccessToken::new("ghp_x"),
            repository: "octocat/vault".to_string(),
            branch: "main".to_string(),
            ..SyncSettings::default()
        }
    }

    #[test]
    fn test_defaults() {
        let settings = SyncSettings::default();
        assert_eq!(settings.provider, "github");
        assert_eq!(settings.device_label, "Unknown Device");
        assert_eq!(settings.sync_interval_mins, 5);
        assert!(!settings.auto_sync);
    }

    #[test]
    fn test_validate() {
        assert!(valid().validate().is_ok());

        let mut s = valid();
        s.token = AccessToken::new("");
        assert!(matches!(s.validate(), Err(Error::Auth(_))));

        let mut s = valid();
        s.repository.clear();
        assert!(s.validate().is_err());

        let mut s = valid();
        s.sync_interval_mins = 0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_interval() {
        let mut s = valid();
        s.sync_interval_mins = 5;
        assert_eq!(s.interval(), Duration::from_secs(300));
    }

    #[test]
    fn test_serde_fills_missing_fields() {
        let settings: SyncSettings =
            serde_json::from_str(r#"{ "token": "ghp_x", "repository": "o/r" }"#).unwrap();
        assert_eq!(settings.branch, "");
        assert_eq!(settings.device_label, "Unknown Device");
        assert_eq!(settings.sync_interval_mins, 5);
    }
}
