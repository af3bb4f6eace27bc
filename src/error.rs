//! Error taxonomy shared by every subsystem.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Bytes were malformed or in a container the active backend cannot read.
    #[error("decode error: {0}")]
    Decode(String),

    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid dimension: {0}")]
    InvalidDimension(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("no render device available")]
    NoDevice,

    /// Window or context creation failed. Fatal to the render loop.
    #[error("initialization error: {0}")]
    Initialization(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn unsupported_format(msg: impl Into<String>) -> Self {
        Self::UnsupportedFormat(msg.into())
    }

    pub fn invalid_dimension(msg: impl Into<String>) -> Self {
        Self::InvalidDimension(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn initialization(msg: impl Into<String>) -> Self {
        Self::Initialization(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes_are_stable() {
        assert!(Error::decode("x").to_string().starts_with("decode error:"));
        assert!(Error::unsupported_format("x")
            .to_string()
            .starts_with("unsupported format:"));
        assert!(Error::invalid_dimension("x")
            .to_string()
            .starts_with("invalid dimension:"));
        assert!(Error::invalid_argument("x")
            .to_string()
            .starts_with("invalid argument:"));
        assert!(Error::initialization("x")
            .to_string()
            .starts_with("initialization error:"));
        assert!(Error::config("x").to_string().starts_with("configuration error:"));
        assert_eq!(Error::NoDevice.to_string(), "no render device available");
    }

    #[test]
    fn test_not_found_names_the_path() {
        let err = Error::NotFound(PathBuf::from("assets/checker.png"));
        assert!(err.to_string().contains("assets/checker.png"));
    }

    #[test]
    fn test_io_preserves_source() {
        let err = Error::from(std::io::Error::other("boom"));
        assert!(err.to_string().contains("boom"));
    }
}
