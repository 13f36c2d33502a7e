//! Global configuration.
//!
//! Loaded once from `templar.toml` (or `Templar.toml`) in the working directory.
//! If the file doesn't exist, defaults are used.
//!
//! ```toml
//! [general]
//! tty = true
//!
//! [http]
//! timeout = 30
//! user_agent = "templar"
//! base_url = "https://example.com/views/"
//!
//! [syntax]
//! open = "{{"
//! close = "}}"
//! ```
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fs::read_to_string;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::template::Syntax;

static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Error, Debug)]
pub enum Error {
    #[error("config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("config: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Syntax(#[from] crate::template::Error),

    #[error("config not found")]
    NoConfig,
}

/// Global configuration.
#[derive(Debug, Clone)]
pub struct Config {
    path: Option<PathBuf>,
    pub tty: bool,
    pub http: Http,
    pub syntax: Syntax,
}

#[derive(Debug, Clone)]
pub struct Http {
    pub timeout: Duration,
    pub user_agent: String,
    pub base_url: Option<Url>,
}

impl Default for Http {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(HttpConfig::default_timeout()),
            user_agent: HttpConfig::default_user_agent(),
            base_url: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: None,
            tty: std::io::stderr().is_terminal(),
            http: Http::default(),
            syntax: Syntax::default(),
        }
    }
}

impl Config {
    /// Load configuration from the first config file found in the working directory.
    pub fn load() -> Result<Config, Error> {
        for name in ["templar.toml", "Templar.toml"] {
            let path = PathBuf::from(name);
            if path.exists() {
                return Self::load_file(&path);
            }
        }

        Err(Error::NoConfig)
    }

    pub fn load_file(path: impl AsRef<Path>) -> Result<Config, Error> {
        let file = read_to_string(path.as_ref())?;
        let mut config = Self::from_str(&file)?;
        config.path = Some(path.as_ref().to_owned());

        Ok(config)
    }

    /// Parse configuration from TOML text.
    pub fn from_str(source: &str) -> Result<Config, Error> {
        let file: ConfigFile = toml::from_str(source)?;
        let mut config = Config::default();

        if let Some(tty) = file.general.tty {
            config.tty = tty;
        }

        config.http = Http {
            timeout: Duration::from_secs(file.http.timeout),
            user_agent: file.http.user_agent,
            base_url: file.http.base_url,
        };

        if let Some(syntax) = file.syntax {
            syntax.validate()?;
            config.syntax = syntax;
        }

        Ok(config)
    }

    pub fn get() -> &'static Config {
        get_config()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn log_info(&self) {
        match self.path {
            Some(ref path) => info!("configuration loaded from \"{}\"", path.display()),
            None => info!("configuration file not found, using defaults"),
        }

        info!(
            "templates are fetched with a {}s timeout, delimiters are \"{}\" and \"{}\"",
            self.http.timeout.as_secs(),
            self.syntax.open(),
            self.syntax.close()
        );

        if let Some(ref base_url) = self.http.base_url {
            info!("relative template urls are resolved against {}", base_url);
        }
    }
}

pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(|| Config::load().unwrap_or_default())
}

#[derive(Serialize, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    general: General,
    #[serde(default)]
    http: HttpConfig,
    syntax: Option<Syntax>,
}

#[derive(Serialize, Deserialize, Default)]
struct General {
    tty: Option<bool>,
}

#[derive(Serialize, Deserialize)]
struct HttpConfig {
    #[serde(default = "HttpConfig::default_timeout")]
    timeout: u64,
    #[serde(default = "HttpConfig::default_user_agent")]
    user_agent: String,
    base_url: Option<Url>,
}

impl HttpConfig {
    fn default_timeout() -> u64 {
        30
    }

    fn default_user_agent() -> String {
        "templar".to_string()
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Self::default_timeout(),
            user_agent: Self::default_user_agent(),
            base_url: None,
        }
    }
}
