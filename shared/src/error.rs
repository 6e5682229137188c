use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WheelError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid prize catalog: {0}")]
    InvalidCatalog(String),
}

impl WheelError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        WheelError::InvalidArgument(message.into())
    }

    pub(crate) fn invalid_catalog(message: impl Into<String>) -> Self {
        WheelError::InvalidCatalog(message.into())
    }
}
