//! Backend targets resolved at startup

use std::fmt;
use std::time::Duration;
use url::Url;

/// The two REST services tools are dispatched to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    Account,
    Optimization,
}

impl Backend {
    /// Prefix used in readable backend failure messages
    pub fn label(&self) -> &'static str {
        match self {
            Backend::Account => "MetaTrader 5 API",
            Backend::Optimization => "Optimization API",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Backend::Account => "account",
            Backend::Optimization => "optimization",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Base address and optional bearer credential for one backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendTarget {
    pub backend: Backend,
    pub base_url: Url,
    pub api_key: Option<String>,
}

impl BackendTarget {
    pub fn new(backend: Backend, base_url: Url, api_key: Option<String>) -> Self {
        Self {
            backend,
            base_url,
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    /// Full URL for a path such as `/order/123`.
    ///
    /// Any path prefix on the base address is kept.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpSettings {
    pub connect_timeout: Duration,
    pub timeout: Duration,
}

/// Immutable backend configuration shared by every tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub account: BackendTarget,
    pub optimization: BackendTarget,
    pub http: HttpSettings,
}

impl BackendConfig {
    pub fn target(&self, backend: Backend) -> &BackendTarget {
        match backend {
            Backend::Account => &self.account,
            Backend::Optimization => &self.optimization,
        }
    }
}
