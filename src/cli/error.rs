//! CLI-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        CliError::Application(ApplicationError::Domain(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => crate::exitcode::USAGE,
            CliError::Application(e) => match e {
                ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                ApplicationError::NodeNotFound(_) => crate::exitcode::DATAERR,
                ApplicationError::Domain(_) => crate::exitcode::SOFTWARE,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exitcode;

    #[test]
    fn test_exit_codes_follow_sysexits() {
        let not_found: CliError = ApplicationError::NodeNotFound("x".into()).into();
        let config: CliError = ApplicationError::Config { message: "bad".into() }.into();
        let domain: CliError = DomainError::CannotDeleteRoot.into();

        assert_eq!(CliError::InvalidArgs("x".into()).exit_code(), exitcode::USAGE);
        assert_eq!(not_found.exit_code(), exitcode::DATAERR);
        assert_eq!(config.exit_code(), exitcode::CONFIG);
        assert_eq!(domain.exit_code(), exitcode::SOFTWARE);
    }
}
