/// Convenience result type used across reveal.
pub type RevealResult<T> = Result<T, RevealError>;

/// Top-level error taxonomy used by observer, scheduler and config APIs.
#[derive(thiserror::Error, Debug)]
pub enum RevealError {
    /// Invalid user-provided configuration or tree data.
    #[error("validation error: {0}")]
    Validation(String),

    /// The host cannot observe element visibility at all.
    #[error("capability unavailable: {0}")]
    Capability(String),

    /// An element reference no longer points at a mounted element.
    #[error("stale reference: {0}")]
    StaleReference(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RevealError {
    /// Build a [`RevealError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RevealError::Capability`] value.
    pub fn capability(msg: impl Into<String>) -> Self {
        Self::Capability(msg.into())
    }

    /// Build a [`RevealError::StaleReference`] value.
    pub fn stale_reference(msg: impl Into<String>) -> Self {
        Self::StaleReference(msg.into())
    }

    /// Build a [`RevealError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for RevealError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
