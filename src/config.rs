//! Configuration manager for notas.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const DEFAULT_TIMEOUT: u64 = 30;
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Instance name.
    pub name: String,
    /// Base URL of the backend, e.g. `http://127.0.0.1:8000`.
    pub url: String,
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Fixed navigation targets used by the guard.
    pub routes: Routes,
    /// Default `tracing` filter, overridden by `RUST_LOG`.
    pub log_level: String,
    #[serde(skip)]
    version: String,
    #[serde(skip)]
    path: PathBuf,
}

/// Redirect targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Routes {
    /// Where anonymous users are sent.
    pub login: String,
    /// Where authenticated users land when opening a public route.
    pub home: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            login: "/login".into(),
            home: "/".into(),
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            name: "notas".into(),
            url: String::default(),
            timeout: DEFAULT_TIMEOUT,
            routes: Routes::default(),
            log_level: "info".into(),
            version: VERSION.to_owned(),
            path: PathBuf::default(),
        }
    }
}

impl Configuration {
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Override the backend URL, e.g. from the command line.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Crate version the configuration was loaded with.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Normalizes a URL string by ensuring it starts with a valid scheme
    /// (`http` or `https`).
    fn normalize_url(url: &str) -> Result<String, url::ParseError> {
        if url.is_empty() {
            return Ok(String::default());
        }

        let url_with_scheme =
            if url.starts_with("http://") || url.starts_with("https://") {
                url.to_string()
            } else {
                format!("https://{url}")
            };

        let parsed_url = Url::parse(&url_with_scheme)?;
        Ok(parsed_url.as_str().trim_end_matches('/').to_owned())
    }

    /// Reads the `config.yaml` file from the specified path or the default
    /// location.
    pub fn read(self) -> Result<Arc<Self>, url::ParseError> {
        let file_path = if self.path.is_file() {
            &self.path
        } else {
            &Path::new(DEFAULT_CONFIG_PATH).to_path_buf()
        };

        match File::open(file_path) {
            Ok(file) => {
                let mut config: Configuration =
                    match serde_yaml::from_reader(file) {
                        Ok(config) => config,
                        Err(err) => {
                            return Ok(Arc::new(self.error(err)?));
                        },
                    };

                config.version = VERSION.to_owned();
                config.path = file_path.clone();
                // a URL given by the caller wins over the file.
                if !self.url.is_empty() {
                    config.url = self.url;
                }
                config.url = Self::normalize_url(&config.url)?;

                Ok(Arc::new(config))
            },
            Err(err) => Ok(Arc::new(self.error(err)?)),
        }
    }

    /// Return a default configuration as fallback.
    fn error(&self, err: impl std::error::Error) -> Result<Self, url::ParseError> {
        tracing::error!(error = %err, "`config.yaml` file not found or invalid");
        Ok(Self {
            url: Self::normalize_url(&self.url)?,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            Configuration::normalize_url("notas.example.com").unwrap(),
            "https://notas.example.com"
        );
        assert_eq!(
            Configuration::normalize_url("http://127.0.0.1:8000/").unwrap(),
            "http://127.0.0.1:8000"
        );
        assert_eq!(Configuration::normalize_url("").unwrap(), "");
        assert!(Configuration::normalize_url("http://[::1").is_err());
    }

    #[test]
    fn test_read_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "name: mesa de entradas\nurl: http://127.0.0.1:8000\ntimeout: 5\nroutes:\n  login: /ingresar"
        )
        .unwrap();

        let config = Configuration::default()
            .path(file.path().to_path_buf())
            .read()
            .unwrap();

        assert_eq!(config.name, "mesa de entradas");
        assert_eq!(config.url, "http://127.0.0.1:8000");
        assert_eq!(config.timeout, 5);
        assert_eq!(config.routes.login, "/ingresar");
        // untouched fields keep their defaults.
        assert_eq!(config.routes.home, "/");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.version(), VERSION);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = Configuration::default()
            .path(PathBuf::from("/nonexistent/notas.yaml"))
            .url("localhost:8000")
            .read()
            .unwrap();

        assert_eq!(config.url, "https://localhost:8000");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.routes, Routes::default());
    }
}
