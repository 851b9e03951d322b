use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Tool-server URL used when the config file does not override it.
pub const DEFAULT_MCP_URL: &str = "https://mcp.lemonado.io/mcp";

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

fn default_model_options() -> Vec<String> {
    ["gpt-4o-mini", "gpt-4o", "gpt-4.1-mini"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Engine configuration. Mutated only by explicit caller action; changing the
/// auth token invalidates the tool-server session, which
/// [`crate::core::app::ChatApp::set_auth_token`] performs as a single atomic
/// update.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// JSON-RPC endpoint of the MCP data server.
    #[serde(default = "default_mcp_url")]
    pub mcp_url: String,
    /// Bearer token for the MCP data server. Empty means unset.
    #[serde(default)]
    pub mcp_token: String,
    /// Completion model identifier sent with every chat request.
    #[serde(default = "default_model_name")]
    pub model_name: String,
    /// Models the presentation layer may offer for selection.
    #[serde(default = "default_model_options")]
    pub model_options: Vec<String>,
    /// Optional transcript log file. Absent disables transcript logging.
    pub log_file: Option<String>,
}

fn default_mcp_url() -> String {
    DEFAULT_MCP_URL.to_string()
}

fn default_model_name() -> String {
    DEFAULT_MODEL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mcp_url: default_mcp_url(),
            mcp_token: String::new(),
            model_name: default_model_name(),
            model_options: default_model_options(),
            log_file: None,
        }
    }
}

/// Errors that can occur when loading configuration from disk.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse the configuration file as valid TOML.
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "Failed to read config at {}: {}", path_display(path), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "Failed to parse config at {}: {}", path_display(path), source)
            }
        }
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}

impl Config {
    pub fn load() -> Result<Config, ConfigError> {
        Self::load_from_path(&Self::config_path())
    }

    pub fn load_from_path(config_path: &Path) -> Result<Config, ConfigError> {
        if !config_path.exists() {
            return Ok(Config::default());
        }
        let contents = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            path: config_path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })
    }

    pub fn save_to_path(&self, config_path: &Path) -> Result<(), Box<dyn StdError>> {
        let parent = config_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty());

        if let Some(dir) = parent {
            fs::create_dir_all(dir)?;
        }

        let contents = toml::to_string_pretty(self)?;
        let mut temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir)?,
            None => NamedTempFile::new()?,
        };
        use std::io::Write;
        temp_file.write_all(contents.as_bytes())?;
        temp_file
            .persist(config_path)
            .map_err(|err| -> Box<dyn StdError> { Box::new(err) })?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        let proj_dirs = ProjectDirs::from("org", "permacommons", "datachat")
            .expect("Failed to determine config directory");
        proj_dirs.config_dir().join("config.toml")
    }

    pub fn token_is_set(&self) -> bool {
        !self.mcp_token.trim().is_empty()
    }
}

/// Get a user-friendly display string for a path, using ~ notation on
/// Unix-like systems when the path is under the home directory.
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
