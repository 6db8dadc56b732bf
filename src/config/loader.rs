//! Configuration loader with layered precedence
//!
//! Priority order (highest to lowest):
//! 1. Command line overrides
//! 2. Environment (MT5_API_ENDPOINT, MT5_API_KEY, MT5_FLASK_API, MT5_FLASK_API_KEY)
//! 3. Config file (--config, $MT5_MCP_CONFIG or ~/.config/mt5-mcp/config.toml)
//! 4. Built-in defaults

use crate::config::backend::{Backend, BackendConfig, BackendTarget, HttpSettings};
use crate::config::defaults::*;
use crate::config::user_config::{BackendSection, FileConfig};
use crate::types::ConfigError;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub account_endpoint: Option<String>,
    pub optimization_endpoint: Option<String>,
    pub config_path: Option<PathBuf>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Resolve configuration from the process environment
    pub fn load(overrides: &Overrides) -> Result<BackendConfig, ConfigError> {
        Self::load_with(overrides, |key| std::env::var(key).ok())
    }

    /// Resolve configuration with an explicit environment lookup
    pub fn load_with<F>(overrides: &Overrides, env: F) -> Result<BackendConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match Self::config_path(overrides, &env) {
            Some(path) => Self::load_file(&path)?,
            None => {
                debug!("No config file found");
                FileConfig::default()
            }
        };

        let account = Self::resolve_target(
            Backend::Account,
            overrides.account_endpoint.clone(),
            env(ENV_ACCOUNT_ENDPOINT),
            env(ENV_ACCOUNT_API_KEY),
            file.account.as_ref(),
            DEFAULT_ACCOUNT_ENDPOINT,
        )?;

        let optimization = Self::resolve_target(
            Backend::Optimization,
            overrides.optimization_endpoint.clone(),
            env(ENV_OPTIMIZATION_ENDPOINT),
            env(ENV_OPTIMIZATION_API_KEY),
            file.optimization.as_ref(),
            DEFAULT_OPTIMIZATION_ENDPOINT,
        )?;

        let http_section = file.http.unwrap_or_default();
        let http = HttpSettings {
            connect_timeout: http_section
                .connect_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            timeout: http_section
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        };

        info!(
            "Account API: {} (auth: {}), Optimization API: {} (auth: {})",
            account.base_url,
            account.api_key.is_some(),
            optimization.base_url,
            optimization.api_key.is_some()
        );

        Ok(BackendConfig {
            account,
            optimization,
            http,
        })
    }

    fn resolve_target(
        backend: Backend,
        cli_endpoint: Option<String>,
        env_endpoint: Option<String>,
        env_key: Option<String>,
        file: Option<&BackendSection>,
        default_endpoint: &str,
    ) -> Result<BackendTarget, ConfigError> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        let endpoint = non_empty(cli_endpoint)
            .or_else(|| non_empty(env_endpoint))
            .or_else(|| non_empty(file.and_then(|f| f.endpoint.clone())))
            .unwrap_or_else(|| default_endpoint.to_string());

        let base_url = parse_base_url(backend, endpoint.trim())?;

        let api_key = non_empty(env_key).or_else(|| non_empty(file.and_then(|f| f.api_key.clone())));

        Ok(BackendTarget::new(backend, base_url, api_key))
    }

    fn config_path<F>(overrides: &Overrides, env: &F) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        // An explicitly named file must exist; the user-global one is optional
        if let Some(path) = &overrides.config_path {
            return Some(path.clone());
        }

        if let Some(path) = env(ENV_CONFIG_PATH) {
            return Some(PathBuf::from(path));
        }

        dirs::config_dir()
            .map(|dir| dir.join("mt5-mcp").join("config.toml"))
            .filter(|path| path.exists())
    }

    fn load_file(path: &Path) -> Result<FileConfig, ConfigError> {
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Parse a backend base address; only absolute http(s) URLs are usable
fn parse_base_url(backend: Backend, endpoint: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        backend: backend.name(),
        url: endpoint.to_string(),
        reason,
    };

    let url = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    // An explicit empty file keeps the user-global config out of the tests
    fn empty_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# empty").unwrap();
        file
    }

    fn overrides_for(file: &tempfile::NamedTempFile) -> Overrides {
        Overrides {
            config_path: Some(file.path().to_path_buf()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let file = empty_file();
        let config = ConfigLoader::load_with(&overrides_for(&file), env_from(&[])).unwrap();
        assert_eq!(config.account.base_url.as_str(), "http://localhost:5555/");
        assert_eq!(config.optimization.base_url.as_str(), "http://localhost:5000/");
        assert!(config.account.api_key.is_none());
        assert!(config.optimization.api_key.is_none());
        assert_eq!(config.http.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
        assert_eq!(config.http.timeout, DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn test_environment() {
        let env = env_from(&[
            (ENV_ACCOUNT_ENDPOINT, "http://mt5.internal:8080"),
            (ENV_ACCOUNT_API_KEY, "secret"),
            (ENV_OPTIMIZATION_ENDPOINT, "http://flask.internal:9000"),
        ]);
        let file = empty_file();
        let config = ConfigLoader::load_with(&overrides_for(&file), env).unwrap();
        assert_eq!(config.account.endpoint("/account"), "http://mt5.internal:8080/account");
        assert_eq!(config.account.api_key.as_deref(), Some("secret"));
        assert_eq!(
            config.optimization.endpoint("/optimize"),
            "http://flask.internal:9000/optimize"
        );
        assert!(config.optimization.api_key.is_none());
    }

    #[test]
    fn test_cli_overrides_environment() {
        let file = empty_file();
        let mut overrides = overrides_for(&file);
        overrides.account_endpoint = Some("http://cli:1".to_string());
        let env = env_from(&[(ENV_ACCOUNT_ENDPOINT, "http://env:2")]);
        let config = ConfigLoader::load_with(&overrides, env).unwrap();
        assert_eq!(config.account.base_url.as_str(), "http://cli:1/");
    }

    #[test]
    fn test_file_layer_below_environment() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[account]
endpoint = "http://file-account:5555"
api_key = "file-key"

[optimization]
endpoint = "http://file-opt:5000"

[http]
timeout_secs = 5
"#
        )
        .unwrap();

        let overrides = overrides_for(&file);
        let env = env_from(&[(ENV_OPTIMIZATION_ENDPOINT, "http://env-opt:5000")]);
        let config = ConfigLoader::load_with(&overrides, env).unwrap();

        assert_eq!(config.account.base_url.as_str(), "http://file-account:5555/");
        assert_eq!(config.account.api_key.as_deref(), Some("file-key"));
        assert_eq!(config.optimization.base_url.as_str(), "http://env-opt:5000/");
        assert_eq!(config.http.timeout, Duration::from_secs(5));
        assert_eq!(config.http.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
    }

    #[test]
    fn test_invalid_url() {
        let env = env_from(&[(ENV_ACCOUNT_ENDPOINT, "not a url")]);
        let file = empty_file();
        let result = ConfigLoader::load_with(&overrides_for(&file), env);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidUrl { backend: "account", .. })
        ));
    }

    #[test]
    fn test_base_address_must_be_http() {
        let rejected = [
            "localhost:5555",
            "ftp://mt5.local/",
            "mailto:ops@example.com",
            "file:///tmp/mt5",
            "http//localhost:5555",
        ];
        for endpoint in rejected {
            let file = empty_file();
            let overrides = Overrides {
                optimization_endpoint: Some(endpoint.to_string()),
                ..overrides_for(&file)
            };
            let result = ConfigLoader::load_with(&overrides, env_from(&[]));
            assert!(
                matches!(
                    result,
                    Err(ConfigError::InvalidUrl { backend: "optimization", ref url, .. }) if url == endpoint
                ),
                "{} accepted: {:?}",
                endpoint,
                result
            );
        }

        let accepted = ["http://10.0.0.5:5555/", "https://mt5.example.com/api/"];
        for endpoint in accepted {
            let file = empty_file();
            let overrides = Overrides {
                account_endpoint: Some(endpoint.to_string()),
                ..overrides_for(&file)
            };
            let config = ConfigLoader::load_with(&overrides, env_from(&[])).unwrap();
            assert_eq!(config.account.base_url.as_str(), endpoint);
        }
    }

    #[test]
    fn test_missing_explicit_file() {
        let overrides = Overrides {
            config_path: Some(PathBuf::from("/nonexistent/mt5-mcp.toml")),
            ..Default::default()
        };
        let result = ConfigLoader::load_with(&overrides, env_from(&[]));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[account\nendpoint = ").unwrap();
        let overrides = overrides_for(&file);
        let result = ConfigLoader::load_with(&overrides, env_from(&[]));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
