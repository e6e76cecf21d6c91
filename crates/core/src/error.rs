/// Result alias that carries the custom [`LimboError`] type.
pub type Result<T> = std::result::Result<T, LimboError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum LimboError {
    /// Free-form message for failures that do not warrant their own variant.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Malformed JSON in a configuration or atlas file.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// A texture, atlas or sound could not be loaded.
    #[error("failed to load asset `{path}`: {reason}")]
    Asset { path: String, reason: String },
    /// A user supplied permutation string was rejected.
    #[error("invalid permutation `{0}`")]
    InvalidPermutation(String),
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl LimboError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub fn asset(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Asset {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
