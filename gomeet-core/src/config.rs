//! Global gomeet configuration.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{GoMeetError, GoMeetResult};

static DEFAULT_BACKEND_URL: &str = "http://localhost:8080";
static DEFAULT_SESSION_DIR: &str = "~/.local/state/gomeet";

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_session_dir() -> PathBuf {
    PathBuf::from(DEFAULT_SESSION_DIR)
}

/// Configuration at ~/.config/gomeet/config.toml, overridable with
/// `GOMEET_*` environment variables.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GoMeetConfig {
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Where the in-progress draft lives between invocations.
    #[serde(default = "default_session_dir")]
    pub session_dir: PathBuf,

    /// Sent verbatim as the `Cookie` header so the backend knows who we are.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_cookie: Option<String>,
}

impl Default for GoMeetConfig {
    fn default() -> Self {
        GoMeetConfig {
            backend_url: default_backend_url(),
            session_dir: default_session_dir(),
            session_cookie: None,
        }
    }
}

impl GoMeetConfig {
    pub fn config_path() -> GoMeetResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| GoMeetError::Config("Could not determine config directory".into()))?
            .join("gomeet");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, writing a commented template first
    /// if no file exists yet.
    pub fn load() -> GoMeetResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> GoMeetResult<Self> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("GOMEET"))
            .build()
            .map_err(|e| GoMeetError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| GoMeetError::Config(e.to_string()))
    }

    /// The session directory with `~` expanded.
    pub fn session_path(&self) -> PathBuf {
        let expanded = shellexpand::tilde(&self.session_dir.to_string_lossy()).into_owned();
        PathBuf::from(expanded)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> GoMeetResult<()> {
        let contents = format!(
            "\
# gomeet configuration

# Base URL of the meeting backend:
# backend_url = \"{}\"

# Where the in-progress meeting draft is kept:
# session_dir = \"{}\"

# Cookie identifying your login with the backend:
# session_cookie = \"SACSID=...\"
",
            DEFAULT_BACKEND_URL, DEFAULT_SESSION_DIR
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                GoMeetError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| GoMeetError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
