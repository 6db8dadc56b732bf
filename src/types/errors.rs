use thiserror::Error;

/// Failure taxonomy shared by the dispatcher and the wire layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown method or tool, or a request the protocol cannot interpret
    Protocol,
    /// Arguments missing, mistyped or outside their allowed values
    Validation,
    /// Backend answered with a non-2xx status
    Backend,
    /// Backend could not be reached
    Transport,
    /// Defect in the dispatch logic
    Internal,
}

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("{message}")]
    Backend { status: u16, message: String },

    #[error("{0}")]
    Transport(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GatewayError {
    /// Classify a failure into its taxonomy member
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::MethodNotFound(_) | GatewayError::UnknownTool(_) => ErrorKind::Protocol,
            GatewayError::InvalidParams(_) => ErrorKind::Validation,
            GatewayError::Backend { .. } => ErrorKind::Backend,
            GatewayError::Transport(_) => ErrorKind::Transport,
            GatewayError::Internal(_) | GatewayError::Json(_) => ErrorKind::Internal,
        }
    }

    /// Build a backend error from a non-2xx status and its raw body.
    ///
    /// The message prefers the body's `message` field, then `error`, then
    /// the raw body text, then the status line.
    pub fn from_status(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
        let field = |name: &str| {
            parsed
                .as_ref()
                .and_then(|v| v.get(name))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };

        let message = field("message")
            .or_else(|| field("error"))
            .or_else(|| {
                let trimmed = body.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| format!("HTTP {}", status));

        GatewayError::Backend { status, message }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Transport(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid base address for {backend} ({url}): {reason}")]
    InvalidUrl {
        backend: &'static str,
        url: String,
        reason: String,
    },

    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
