use std::path::{Path, PathBuf};

use color_eyre::{Result, eyre::Context};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Only playlists owned by this user are curated. Defaults to the logged in user.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default = "default_cache_dir")]
    cache_dir: String,
    #[serde(default)]
    spotify: Option<SpotifyConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

fn default_cache_dir() -> String {
    ".spotify_cache".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: None,
            cache_dir: default_cache_dir(),
            spotify: None,
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .context(format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("playlist-curator").join("config.toml"))
    }

    /// Load the default config file, or defaults when it doesn't exist
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Write a default config file, unless one already exists
    pub fn create_default() -> Result<PathBuf> {
        let path = Self::config_path()
            .ok_or_else(|| color_eyre::eyre::eyre!("No default config directory found"))?;
        if path.exists() {
            return Ok(path);
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create config dir: {}", parent.display()))?;
        }
        let config = Config {
            spotify: Some(SpotifyConfig {
                client_id: String::new(),
                client_secret: String::new(),
                redirect_uri: "http://localhost:8888/callback".to_string(),
            }),
            ..Default::default()
        };
        std::fs::write(&path, toml::to_string_pretty(&config)?)
            .context(format!("Failed to write config file: {}", path.display()))?;
        Ok(path)
    }

    pub fn set_cache_dir(&mut self, cache_dir: String) {
        self.cache_dir = cache_dir;
    }

    /// Expand ~ to home directory
    fn expand_path(&self, path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    /// Get expanded cache directory path
    pub fn cache_dir_path(&self) -> PathBuf {
        self.expand_path(&self.cache_dir)
    }

    /// Get Spotify app credentials, falling back to environment variables
    pub fn spotify_config(&self) -> Result<SpotifyConfig> {
        if let Some(ref spotify) = self.spotify {
            return Ok(spotify.clone());
        }

        let var = |name: &str| {
            std::env::var(name).context(format!(
                "Missing Spotify credentials: set [spotify] in the config file or {}",
                name
            ))
        };
        Ok(SpotifyConfig {
            client_id: var("SPOTIFY_CLIENT_ID")?,
            client_secret: var("SPOTIFY_CLIENT_SECRET")?,
            redirect_uri: var("SPOTIFY_REDIRECT_URI")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
username = "me"
cache_dir = "/tmp/curator"

[spotify]
client_id = "id"
client_secret = "secret"
redirect_uri = "http://localhost:8888/callback"
"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();

        assert_eq!(config.username.as_deref(), Some("me"));
        assert_eq!(config.cache_dir_path(), PathBuf::from("/tmp/curator"));
        assert_eq!(config.spotify_config().unwrap().client_id, "id");
    }

    #[test]
    fn test_defaults_for_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();

        let config = Config::from_file(&path).unwrap();

        assert!(config.username.is_none());
        assert_eq!(config.cache_dir_path(), PathBuf::from(".spotify_cache"));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "username = [").unwrap();

        assert!(Config::from_file(&path).is_err());
    }

    #[test]
    fn test_expand_home() {
        let mut config = Config::default();
        config.set_cache_dir("~/spotify".to_string());

        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.cache_dir_path(), home.join("spotify"));
        }
    }
}
