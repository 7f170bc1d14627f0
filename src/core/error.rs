use thiserror::Error;

#[derive(Error, Debug)]
pub enum SwarmError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Malformed snapshot: {0}")]
    Snapshot(String),
}

pub type Result<T> = std::result::Result<T, SwarmError>;
