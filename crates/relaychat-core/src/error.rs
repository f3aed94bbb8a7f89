use thiserror::Error;

/// Failure of a single relay request. These are the only two ways `send` can fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The relay (or upstream) answered with a non-success status.
    #[error("{0}")]
    Api(String),

    /// The relay could not be reached at all.
    #[error("{0}")]
    Network(String),
}

impl GatewayError {
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ChatError {
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_displays_bare_message() {
        let err = GatewayError::Api("API request failed: 500 Internal Server Error".into());
        assert_eq!(err.to_string(), "API request failed: 500 Internal Server Error");
        assert!(!err.is_network());

        let err = GatewayError::Network("unreachable".into());
        assert_eq!(err.to_string(), "unreachable");
        assert!(err.is_network());
    }

    #[test]
    fn test_chat_error_wraps_gateway_error() {
        let err: ChatError = GatewayError::Api("boom".into()).into();
        assert!(matches!(err, ChatError::Gateway(GatewayError::Api(_))));
        assert_eq!(err.to_string(), "Gateway error: boom");
    }

    #[test]
    fn test_persistence_constructor() {
        let err = ChatError::persistence("disk full");
        assert_eq!(err.to_string(), "Persistence error: disk full");
    }
}
