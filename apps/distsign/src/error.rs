//! CLI error handling

use std::fmt;

use distsign_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Error from a library crate
    Distsign(distsign_errors::Error),
    /// Invalid command arguments
    InvalidArguments(String),
}

impl CliError {
    /// Stable code for JSON output
    pub fn code(&self) -> Option<&'static str> {
        match self {
            CliError::Distsign(e) => e.user_code(),
            CliError::InvalidArguments(_) => Some("cli.invalid_arguments"),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Distsign(e) => {
                let message = e.user_message();
                write!(f, "{message}")?;
                if let Some(code) = e.user_code() {
                    write!(f, "\n  Code: {code}")?;
                }
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                if e.is_retryable() {
                    write!(f, "\n  Retry: safe to retry this operation.")?;
                }
                Ok(())
            }
            CliError::InvalidArguments(msg) => write!(f, "Invalid arguments: {msg}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Distsign(e) => Some(e),
            CliError::InvalidArguments(_) => None,
        }
    }
}

impl From<distsign_errors::Error> for CliError {
    fn from(e: distsign_errors::Error) -> Self {
        CliError::Distsign(e)
    }
}
