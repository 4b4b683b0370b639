use crate::banner::DEFAULT_BANNER_PREFIX;
use crate::error::{HarnessError, Result};
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "sailtest.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub fixtures: FixtureConfig,
    #[serde(default)]
    pub run: RunConfig,
}

/// How to launch the server under test
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_command")]
    pub command: String,
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    pub working_directory: Option<Utf8PathBuf>,
    #[serde(default = "default_banner_prefix")]
    pub banner_prefix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FixtureConfig {
    #[serde(default = "default_fixture_dir")]
    pub directory: Utf8PathBuf,
    #[serde(default = "default_fixture_files")]
    pub files: Vec<Utf8PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct RunConfig {
    /// Give up on a reply after this many seconds. Unset means wait forever.
    pub read_timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            args: default_args(),
            working_directory: None,
            banner_prefix: default_banner_prefix(),
        }
    }
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            directory: default_fixture_dir(),
            files: default_fixture_files(),
        }
    }
}

// Default value functions
fn default_command() -> String {
    "cargo".to_owned()
}

fn default_args() -> Vec<String> {
    vec!["run".to_owned()]
}

fn default_banner_prefix() -> String {
    DEFAULT_BANNER_PREFIX.to_owned()
}

fn default_fixture_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("saild/test")
}

fn default_fixture_files() -> Vec<Utf8PathBuf> {
    vec![
        Utf8PathBuf::from("happy_path.txt"),
        Utf8PathBuf::from("abortive.txt"),
    ]
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::find_config_file()?;
        Self::load_from_path(&config_path)
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        debug!("Loading config from {}", path.as_ref().display());
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| HarnessError::Config(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| HarnessError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    fn find_config_file() -> Result<PathBuf> {
        let candidates = [
            Some(PathBuf::from(CONFIG_FILE_NAME)),
            dirs::config_dir().map(|p| p.join("sailtest").join(CONFIG_FILE_NAME)),
        ];

        for candidate in candidates.into_iter().flatten() {
            if candidate.exists() {
                return Ok(candidate);
            }
        }

        Err(HarnessError::Config("Config file not found".to_owned()))
    }

    /// Fixture files in run order, relative names resolved against the
    /// fixture directory.
    pub fn fixture_paths(&self) -> Vec<Utf8PathBuf> {
        self.fixtures
            .files
            .iter()
            .map(|file| self.fixtures.directory.join(file))
            .collect()
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.run.read_timeout_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.command.trim().is_empty() {
            return Err(HarnessError::Config("Server command is empty".to_owned()));
        }
        if self.server.banner_prefix.is_empty() {
            return Err(HarnessError::Config("Banner prefix is empty".to_owned()));
        }
        if self.run.read_timeout_secs == Some(0) {
            return Err(HarnessError::Config(
                "read_timeout_secs must be greater than zero".to_owned(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.command, "cargo");
        assert_eq!(config.server.args, vec!["run"]);
        assert_eq!(config.server.banner_prefix, "saild started ");
        assert_eq!(
            config.fixture_paths(),
            vec![
                Utf8PathBuf::from("saild/test/happy_path.txt"),
                Utf8PathBuf::from("saild/test/abortive.txt"),
            ]
        );
        assert_eq!(config.read_timeout(), None);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.server.command, "cargo");
        assert_eq!(config.fixtures.files.len(), 2);
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_toml(
            r#"
            [server]
            command = "target/debug/saild"
            args = ["--port", "0"]
            working_directory = "/srv/sail"

            [fixtures]
            directory = "fixtures"
            files = ["one.txt", "/abs/two.txt"]

            [run]
            read_timeout_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.server.command, "target/debug/saild");
        assert_eq!(config.server.args, vec!["--port", "0"]);
        assert_eq!(
            config.server.working_directory,
            Some(Utf8PathBuf::from("/srv/sail"))
        );
        assert_eq!(config.server.banner_prefix, "saild started ");
        assert_eq!(
            config.fixture_paths(),
            vec![
                Utf8PathBuf::from("fixtures/one.txt"),
                Utf8PathBuf::from("/abs/two.txt"),
            ]
        );
        assert_eq!(config.read_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_validation() {
        assert!(Config::from_toml("[server]\ncommand = \"  \"").is_err());
        assert!(Config::from_toml("[server]\nbanner_prefix = \"\"").is_err());
        assert!(Config::from_toml("[run]\nread_timeout_secs = 0").is_err());
        assert!(Config::from_toml("[run]\nread_timeout_secs = \"soon\"").is_err());
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[fixtures]\nfiles = [\"a.txt\"]\n").unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.fixture_paths(), vec![Utf8PathBuf::from("saild/test/a.txt")]);

        let missing = Config::load_from_path(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(HarnessError::Config(_))));
    }
}
