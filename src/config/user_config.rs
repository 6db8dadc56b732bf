//! Config file parsing

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    pub account: Option<BackendSection>,
    pub optimization: Option<BackendSection>,
    pub http: Option<HttpSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendSection {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpSection {
    pub connect_timeout_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
}
