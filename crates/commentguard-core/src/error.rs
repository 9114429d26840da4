//! Error types for CommentGuard

/// Result type alias using CommentGuard's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Result type returned by every moderation stage
pub type ModerationResult<T> = std::result::Result<T, ModerationError>;

/// Failure talking to the upstream moderation provider
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    /// The request never produced a response (connect failure, timeout)
    #[error("request failed: {0}")]
    Transport(String),

    /// The provider answered with a non-success status
    #[error("provider returned status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Provider's reported message, or "Status <code>" when it had none
        message: String,
    },

    /// The body could not be decoded
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The body decoded but carried no result
    #[error("{0}")]
    Empty(&'static str),
}

impl UpstreamError {
    /// Build a status error, falling back to the status code when the
    /// provider did not report a message
    pub fn status(status: u16, message: Option<String>) -> Self {
        Self::Status {
            status,
            message: message.unwrap_or_else(|| format!("Status {}", status)),
        }
    }
}

/// The closed set of hard failures a moderation attempt can end in.
///
/// Ambiguous policy replies are not errors; they become reject decisions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModerationError {
    /// Provider credential or settings are missing
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The safety classifier call failed
    #[error("classifier error: {0}")]
    Classifier(#[source] UpstreamError),

    /// The policy evaluator call failed
    #[error("policy evaluator error: {0}")]
    PolicyEvaluator(#[source] UpstreamError),
}

impl ModerationError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Stage label used in logs and metrics
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Classifier(_) => "classifier",
            Self::PolicyEvaluator(_) => "policy_evaluator",
        }
    }
}

/// Core error type for CommentGuard operations outside the moderation stages
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Moderation stage failures
    #[error(transparent)]
    Moderation(#[from] ModerationError),

    /// A referenced record does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// Input rejected before reaching the pipeline
    #[error("invalid input: {0}")]
    Invalid(String),

    /// Storage backend errors
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new not-found error
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Create a new invalid-input error
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    /// Create a new storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
