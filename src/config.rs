//! Database configuration
//!
//! Loaded once at process start from a JSON file and passed down
//! explicitly. Keys are PascalCase:
//!
//! ```json
//! {
//!   "Build": "Release",
//!   "Logging": {
//!     "LogLevel": { "Default": "info", "Exception": "error" },
//!     "OutputFilePath": "__ROOT__/logs",
//!     "FileNameFormat": "xaledb-__YYYY__-__MM__-__DD__.log"
//!   },
//!   "DataFilePath": "__ROOT__/xaledb.bin",
//!   "Server": { "Host": "127.0.0.1", "Port": 8080 }
//! }
//! ```
//!
//! `__ROOT__` expands to the executable's directory; `__DD__`, `__MM__` and
//! `__YYYY__` expand to the current local date.

use crate::error::{DbError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ROOT_PLACEHOLDER: &str = "__ROOT__";
pub const DEFAULT_PORT: u16 = 8080;

/// Build flavour. `Debug` forces debug-level logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BuildType {
    Debug,
    #[default]
    Release,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LogLevelConfig {
    /// Minimum level for ordinary events
    pub default: String,
    /// Level at which failed queries are reported
    pub exception: String,
}

impl Default for LogLevelConfig {
    fn default() -> Self {
        Self {
            default: "info".to_string(),
            exception: "error".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase", default)]
pub struct LoggingConfig {
    pub log_level: LogLevelConfig,

    /// Directory for log files; stderr when unset
    pub output_file_path: Option<String>,

    pub file_name_format: Option<String>,
}

impl LoggingConfig {
    /// Full log file path, when both directory and file name are configured.
    pub fn log_file(&self) -> Option<PathBuf> {
        match (&self.output_file_path, &self.file_name_format) {
            (Some(dir), Some(name)) if !dir.is_empty() && !name.is_empty() => {
                Some(Path::new(dir).join(name))
            }
            _ => None,
        }
    }

    pub fn exception_level(&self) -> tracing::Level {
        self.log_level.exception.parse().unwrap_or(tracing::Level::ERROR)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DbConfig {
    pub build: BuildType,

    pub logging: LoggingConfig,

    /// Registry data file
    pub data_file_path: String,

    pub server: ServerConfig,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            build: BuildType::default(),
            logging: LoggingConfig::default(),
            data_file_path: "xaledb.bin".to_string(),
            server: ServerConfig::default(),
        }
    }
}

impl DbConfig {
    /// Read, parse and resolve a config file against the executable's
    /// directory and today's date.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| DbError::Config(format!("{}: {}", path.display(), e)))?;
        let mut config = Self::from_json(&text)?;
        config.resolve(&executable_root(), chrono::Local::now().date_naive())?;
        Ok(config)
    }

    /// Parse without resolving placeholders.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| DbError::Config(e.to_string()))
    }

    /// Expand placeholders in place and validate.
    pub fn resolve(&mut self, root: &Path, date: NaiveDate) -> Result<()> {
        if self.data_file_path.trim().is_empty() {
            return Err(DbError::Config("DataFilePath is missing".to_string()));
        }
        self.data_file_path = expand_placeholders(&self.data_file_path, root, date);
        if let Some(dir) = self.logging.output_file_path.as_mut() {
            *dir = expand_placeholders(dir, root, date);
        }
        if let Some(name) = self.logging.file_name_format.as_mut() {
            *name = expand_placeholders(name, root, date);
        }
        Ok(())
    }

    pub fn with_data_file(mut self, path: impl Into<String>) -> Self {
        self.data_file_path = path.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.server.port = port;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.server.host = host.into();
        self
    }

    pub fn is_debug(&self) -> bool {
        self.build == BuildType::Debug
    }
}

/// Directory holding the running executable, or `.` if it cannot be found.
pub fn executable_root() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn expand_placeholders(input: &str, root: &Path, date: NaiveDate) -> String {
    input
        .replace(ROOT_PLACEHOLDER, &root.to_string_lossy())
        .replace("__YYYY__", &date.format("%Y").to_string())
        .replace("__MM__", &date.format("%m").to_string())
        .replace("__DD__", &date.format("%d").to_string())
}
