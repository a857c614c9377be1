//! Error handling for pdfstream

use std::io;
use thiserror::Error;

/// The main error type for pdfstream operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Generic(String),
    #[error("System error: {0}")]
    System(#[from] io::Error),
    #[error("Invalid argument: {0}")]
    Argument(String),
    #[error("Unsupported: {0}")]
    Unsupported(String),
    #[error("Format error: {0}")]
    Format(String),
    #[error("Duplicate filter: {0}")]
    DuplicateFilter(String),
    #[error("Buffer bounds violated: {0}")]
    Bounds(String),
    #[error("Unexpected end of data")]
    Eof,
}

impl Error {
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        Error::Generic(msg.into())
    }
    pub fn argument<S: Into<String>>(msg: S) -> Self {
        Error::Argument(msg.into())
    }
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        Error::Unsupported(msg.into())
    }
    pub fn format<S: Into<String>>(msg: S) -> Self {
        Error::Format(msg.into())
    }
    pub fn bounds<S: Into<String>>(msg: S) -> Self {
        Error::Bounds(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
