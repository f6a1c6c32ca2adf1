use crate::utils::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub trakt: TraktConfig,
    pub autodl: AutodlConfig,
    #[serde(default)]
    pub profile: FilterProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraktConfig {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutodlConfig {
    /// Full path of the autodl filter file being kept in sync.
    pub config_file: PathBuf,
    /// Where the access/refresh token pair is persisted.
    pub token_file: PathBuf,
}

/// The parameter block written under every `[filter ...]` section. Passed
/// into the autodl store as one immutable value so a run's output depends
/// only on its inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterProfile {
    pub match_categories: String,
    pub match_sites: String,
    pub min_size: String,
    pub max_size: String,
    pub resolutions: String,
    pub upload_type: String,
    pub upload_watch_dir: String,
}

impl Default for FilterProfile {
    fn default() -> Self {
        Self {
            match_categories: "MovieHD".to_string(),
            match_sites: "ar".to_string(),
            min_size: "1GB".to_string(),
            max_size: "10GB".to_string(),
            resolutions: "720p, 1080p".to_string(),
            upload_type: "watchdir".to_string(),
            upload_watch_dir: "/".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = Self::config_dir();

        Self {
            trakt: TraktConfig {
                client_id: String::new(),
                client_secret: String::new(),
                username: String::new(),
            },
            autodl: AutodlConfig {
                config_file: std::env::current_dir()
                    .unwrap_or_else(|_| PathBuf::from("."))
                    .join("autodl.cfg"),
                token_file: config_dir.join("access_token.txt"),
            },
            profile: FilterProfile::default(),
        }
    }
}

impl Config {
    pub fn load() -> AppResult<Self> {
        Self::load_custom(&Self::config_file_path())
    }

    pub fn ensure_config_exists() -> AppResult<()> {
        let config_path = Self::config_file_path();
        if !config_path.exists() {
            let default_config = Config::default();
            default_config.save()?;
        }
        Ok(())
    }

    pub fn load_custom(config_path: &Path) -> AppResult<Self> {
        if !config_path.exists() {
            let default_config = Config::default();
            default_config.save()?;
            return Ok(default_config);
        }

        let content =
            std::fs::read_to_string(config_path).map_err(|e| AppError::ConfigIo(e.to_string()))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| AppError::System(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.trakt.client_id.is_empty() {
            return Err(AppError::System(
                "Trakt client_id cannot be empty. Register an application at trakt.tv to obtain one".to_string(),
            ));
        }

        if self.trakt.client_secret.is_empty() {
            return Err(AppError::System(
                "Trakt client_secret cannot be empty".to_string(),
            ));
        }

        if self.trakt.username.is_empty() {
            return Err(AppError::System(
                "Trakt username cannot be empty".to_string(),
            ));
        }

        if self.autodl.config_file.as_os_str().is_empty() {
            return Err(AppError::System(
                "Autodl config file path cannot be empty".to_string(),
            ));
        }

        if self.profile.upload_type != "watchdir" && self.profile.upload_type != "webui" {
            return Err(AppError::System(format!(
                "Unknown upload-type '{}' (expected 'watchdir' or 'webui')",
                self.profile.upload_type
            )));
        }

        Ok(())
    }

    pub fn save(&self) -> AppResult<()> {
        let config_path = Self::config_file_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::ConfigIo(e.to_string()))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::System(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(&config_path, content).map_err(|e| AppError::ConfigIo(e.to_string()))?;

        Ok(())
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("autodl-sync")
    }

    pub fn config_file_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated_config() -> Config {
        let mut config = Config::default();
        config.trakt.client_id = "id".to_string();
        config.trakt.client_secret = "secret".to_string();
        config.trakt.username = "shyamsundar2007".to_string();
        config
    }

    #[test]
    fn test_default_profile_matches_shipped_values() {
        let profile = FilterProfile::default();
        assert_eq!(profile.match_categories, "MovieHD");
        assert_eq!(profile.match_sites, "ar");
        assert_eq!(profile.min_size, "1GB");
        assert_eq!(profile.max_size, "10GB");
        assert_eq!(profile.resolutions, "720p, 1080p");
        assert_eq!(profile.upload_type, "watchdir");
        assert_eq!(profile.upload_watch_dir, "/");
    }

    #[test]
    fn test_validate_rejects_missing_trakt_fields() {
        let config = Config::default();
        assert!(config.validate().is_err());

        let config = populated_config();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_upload_type() {
        let mut config = populated_config();
        config.profile.upload_type = "ftp".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = populated_config();
        let content = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&content).unwrap();
        assert_eq!(parsed.trakt.username, "shyamsundar2007");
        assert_eq!(parsed.profile.max_size, "10GB");
    }

    #[test]
    fn test_profile_section_is_optional_in_toml() {
        let content = r#"
            [trakt]
            client_id = "id"
            client_secret = "secret"
            username = "user"

            [autodl]
            config_file = "/tmp/autodl.cfg"
            token_file = "/tmp/access_token.txt"
        "#;
        let parsed: Config = toml::from_str(content).unwrap();
        assert_eq!(parsed.profile.match_categories, "MovieHD");
    }
}
