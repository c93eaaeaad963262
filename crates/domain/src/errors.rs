use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Search provider error: {message}")]
    Provider { message: String },

    #[error("Missing configuration: {key}")]
    Configuration { key: String },

    #[error("Transcription error: {message}")]
    Transcription { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Provider {
            message: err.to_string(),
        }
    }
}
