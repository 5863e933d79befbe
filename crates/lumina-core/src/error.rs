use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("API key not configured. Please add your API key in Settings.")]
    MissingApiKey,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    Parse(String),
}
