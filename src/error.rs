//! Global error handling for dir-to-md
//!
//! Only configuration and output failures surface through this type. Per-entry
//! problems (unreadable files, failed conversions) are recorded in the run's
//! statistics and never abort the walk.

use std::io;
use thiserror::Error;

/// Global error type for dir-to-md operations
#[derive(Error, Debug)]
pub enum DirToMdError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Path not found
    #[error("Path not found: {0}")]
    PathNotFound(String),

    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Destination document could not be created or written
    #[error("Output error: {0}")]
    Output(String),
}

/// Specialized Result type for dir-to-md operations
pub type Result<T> = std::result::Result<T, DirToMdError>;

/// Creates a DirToMdError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::DirToMdError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}
