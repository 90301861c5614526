//! Environment lookup backed by the process environment and a `.env` file.
//!
//! The file is read into memory rather than exported, so nothing mutates the
//! process environment. Real environment variables win over file entries.

use botrelay_client::{Error, Result};
use std::collections::HashMap;
use std::path::Path;

const DEFAULT_ENV_FILE: &str = ".env";

#[derive(Debug, Default)]
pub struct EnvSource {
    file: HashMap<String, String>,
}

impl EnvSource {
    /// Load `path`, or `./.env` if it exists when no path is given.
    ///
    /// An explicit path that cannot be read is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => {
                let default = Path::new(DEFAULT_ENV_FILE);
                if !default.is_file() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let wrap = |e: dotenvy::Error| {
            Error::config_invalid(e.to_string())
                .with_operation("env::load")
                .with_context("path", path.display().to_string())
                .set_source(e)
        };

        let mut file = HashMap::new();
        for item in dotenvy::from_path_iter(path).map_err(wrap)? {
            let (key, value) = item.map_err(wrap)?;
            file.insert(key, value);
        }

        Ok(Self { file })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .or_else(|| self.file.get(key).cloned())
    }
}
