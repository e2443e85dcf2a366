use thiserror::Error;

#[derive(Debug, Error)]
pub enum SiteKeyError {
    #[error("Invalid site key format: {0}")]
    InvalidFormat(String),

    #[error("Base64 decoding error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid url: {0}")]
    InvalidUrl(String),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Signature verification error: {0}")]
    VerificationError(String),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SiteKeyError {
    /// Whether the error means the key could not be checked at all, as
    /// opposed to a key that was checked and found wanting.
    #[inline]
    pub fn is_unchecked(&self) -> bool {
        matches!(
            self,
            Self::TransportError(_) | Self::ConfigError(_) | Self::IoError(_)
        )
    }
}

impl From<url::ParseError> for SiteKeyError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}
