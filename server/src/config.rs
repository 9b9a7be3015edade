use std::env;
use std::path::{Path, PathBuf};

const DATA_DIR_VAR: &str = "FILEBOX_DATA_DIR";
const PORT_VAR: &str = "FILEBOX_PORT";
const MAX_UPLOAD_VAR: &str = "FILEBOX_MAX_UPLOAD";

const CURRENT_DIR: &str = "./";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_UPLOAD: usize = 2 * 1024 * 1024 * 1024; /* 2GB */

const USERS_FILE: &str = "users.json";
const UPLOADS_FILE: &str = "uploads.json";
const UPLOADS_DIR: &str = "uploads";

/// Server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub port: u16,
    /// Request body limit in bytes
    pub max_upload: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(CURRENT_DIR),
            port: DEFAULT_PORT,
            max_upload: DEFAULT_MAX_UPLOAD,
        }
    }
}

impl Config {
    /// Reads `FILEBOX_DATA_DIR`, `FILEBOX_PORT` and `FILEBOX_MAX_UPLOAD`,
    /// falling back to defaults for unset or unparsable values.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let defaults = Self::default();
        Self {
            data_dir: lookup(DATA_DIR_VAR).map_or(defaults.data_dir, PathBuf::from),
            port: lookup(PORT_VAR)
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            max_upload: lookup(MAX_UPLOAD_VAR)
                .and_then(|m| m.parse().ok())
                .unwrap_or(defaults.max_upload),
        }
    }

    #[must_use]
    pub fn with_data_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.data_dir = dir.as_ref().to_path_buf();
        self
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn users_file(&self) -> PathBuf {
        self.data_dir.join(USERS_FILE)
    }

    #[must_use]
    pub fn uploads_file(&self) -> PathBuf {
        self.data_dir.join(UPLOADS_FILE)
    }

    #[must_use]
    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir.join(UPLOADS_DIR)
    }
}
