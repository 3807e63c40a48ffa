use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned HTTP {status}")]
    Status { service: &'static str, status: u16 },

    #[error("{service} response could not be decoded: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    #[error("invalid field {field}: {message}")]
    Schema { field: String, message: String },

    #[error("invalid seller key: {0}")]
    InvalidKey(String),

    #[error("projection has {projected} entries but the month has {days} days")]
    ProjectionMismatch { projected: usize, days: usize },

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn schema(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Schema {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
