//! CLI error type and exit-code mapping.

use std::fmt::{self, Display, Formatter};

use ferry_config::ConfigError;
use ferry_fsops::FsOpsError;

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(error: ConfigError) -> Self {
        let context = match &error {
            ConfigError::InvalidOperation { value } => format!("'{value}'"),
            ConfigError::MalformedSource { value, reason } => format!("{reason}: '{value}'"),
            ConfigError::InvalidWorkerCount { value } => format!("{value}; must be at least 1"),
            ConfigError::InvalidSetting {
                name,
                reason,
                value,
            } => match value {
                Some(value) => format!("{name} {reason}: '{value}'"),
                None => format!("{name} {reason}"),
            },
        };
        Self::Validation(format!("{error} ({context})"))
    }
}

impl From<FsOpsError> for CliError {
    fn from(error: FsOpsError) -> Self {
        match error {
            FsOpsError::InvalidInput { .. } => Self::Validation(error.detail()),
            other => Self::Failure(anyhow::Error::msg(other.detail())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn exit_codes_distinguish_validation_from_failure() {
        assert_eq!(CliError::validation("bad flag").exit_code(), 2);
        assert_eq!(
            CliError::failure(anyhow::anyhow!("disk on fire")).exit_code(),
            3
        );
    }

    #[test]
    fn config_errors_are_validation_failures_with_context() {
        let err = CliError::from(ConfigError::MalformedSource {
            value: "*.txt".to_string(),
            reason: "missing_directory",
        });
        assert_eq!(err.exit_code(), 2);
        assert_eq!(
            err.display_message(),
            "malformed source specification (missing_directory: '*.txt')"
        );

        let err = CliError::from(ConfigError::InvalidWorkerCount { value: 0 });
        assert_eq!(
            err.display_message(),
            "invalid worker count (0; must be at least 1)"
        );
    }

    #[test]
    fn access_errors_are_run_failures() {
        let err = CliError::from(FsOpsError::Access {
            role: ferry_fsops::DirectoryRole::Source,
            capability: ferry_fsops::Capability::Exists,
            path: PathBuf::from("/no/such/dir"),
            source: io::Error::from(io::ErrorKind::NotFound),
        });
        assert_eq!(err.exit_code(), 3);
        assert!(
            err.display_message()
                .starts_with("directory access check failed (source exists /no/such/dir)")
        );
    }

    #[test]
    fn overlapping_directories_are_validation_failures() {
        let err = CliError::from(FsOpsError::InvalidInput {
            field: "destination",
            reason: "inside_source",
            value: Some("inbox/out".to_string()),
        });
        assert_eq!(err.exit_code(), 2);
        assert!(err.display_message().contains("inside_source"));
    }
}
