/// Result alias that carries the custom [`SceneError`] type.
pub type Result<T> = std::result::Result<T, SceneError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// The component was configured with values it cannot run with, such as
    /// an empty playlist. Always fatal to the operation that reported it.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A media locator failed to load or decode. The playlist does not skip
    /// past it; the cycle stays on this index until the source is fixed.
    #[error("failed to load media `{locator}`: {reason}")]
    MediaLoad { locator: String, reason: String },
    /// A scene referenced an asset that was never registered.
    #[error("unknown asset `{0}` referenced by scene")]
    UnknownAsset(String),
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl SceneError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub fn configuration<T: Into<String>>(msg: T) -> Self {
        Self::Configuration(msg.into())
    }
}

impl From<&str> for SceneError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for SceneError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
