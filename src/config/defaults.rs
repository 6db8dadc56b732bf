//! Built-in defaults and environment variable names

use std::time::Duration;

pub const DEFAULT_ACCOUNT_ENDPOINT: &str = "http://localhost:5555";
pub const DEFAULT_OPTIMIZATION_ENDPOINT: &str = "http://localhost:5000";

pub const ENV_ACCOUNT_ENDPOINT: &str = "MT5_API_ENDPOINT";
pub const ENV_ACCOUNT_API_KEY: &str = "MT5_API_KEY";
pub const ENV_OPTIMIZATION_ENDPOINT: &str = "MT5_FLASK_API";
pub const ENV_OPTIMIZATION_API_KEY: &str = "MT5_FLASK_API_KEY";
pub const ENV_CONFIG_PATH: &str = "MT5_MCP_CONFIG";

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
