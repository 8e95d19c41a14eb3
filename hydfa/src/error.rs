use thiserror::Error;

#[derive(Debug, Error)]
pub enum DfaError {
    #[error("I/O error while reading '{file}': {source}")]
    IoError {
        source: std::io::Error,
        file: String,
    },

    #[error("Failed to parse analysis configuration '{file}': {source}")]
    ConfigParseError {
        source: toml::de::Error,
        file: String,
    },

    #[error("Class name `{0}` listed in the configuration is not a valid qualified name")]
    InvalidClassName(String),
}

pub type DfaResult<T> = Result<T, DfaError>;
