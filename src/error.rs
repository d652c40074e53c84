use thiserror::Error;

/// Everything that can go wrong during one select/analyze cycle
#[derive(Error, Debug)]
pub enum ClientError {
    /// The selected file is missing or is not an image
    #[error("Please select an image file")]
    Validation,

    /// Non-2xx response or transport failure
    #[error("{0}")]
    Network(String),

    /// 2xx response whose body is not an analysis result
    #[error("invalid analysis response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network(err.to_string())
    }
}

impl ClientError {
    /// Validation errors are user mistakes. Everything else is a failed attempt
    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation)
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
