//! Exit codes for the ct-core CLI.
//!
//! Exit codes communicate operation outcome without requiring output parsing.

/// Exit codes for ct-core operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Clean = 0,

    /// Triage succeeded and at least one pending request is overdue
    OverdueRequests = 1,

    /// Configuration error
    ConfigError = 10,

    /// Submitted answers failed intake validation
    IntakeError = 11,

    /// Request store error
    StoreError = 12,

    /// I/O error
    IoError = 13,

    /// Request ID not present in the store
    NotFound = 14,

    /// Purge confirmation text did not match
    ConfirmationMismatch = 15,

    /// Internal/unknown error
    InternalError = 99,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Check if this exit code indicates success.
    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Clean | ExitCode::OverdueRequests)
    }

    /// Check if this exit code indicates an error requiring attention.
    pub fn is_error(self) -> bool {
        (self as i32) >= 10
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<&ct_common::Error> for ExitCode {
    fn from(err: &ct_common::Error) -> Self {
        use ct_common::Error;
        match err {
            Error::Config(_) | Error::InvalidPolicy(_) => ExitCode::ConfigError,
            Error::Intake(_) => ExitCode::IntakeError,
            Error::Submission(_) | Error::Store(_) => ExitCode::StoreError,
            Error::RequestNotFound { .. } => ExitCode::NotFound,
            Error::ConfirmationMismatch { .. } => ExitCode::ConfirmationMismatch,
            Error::Io(_) => ExitCode::IoError,
            Error::Json(_) => ExitCode::InternalError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overdue_is_not_an_error() {
        assert!(ExitCode::OverdueRequests.is_success());
        assert!(!ExitCode::OverdueRequests.is_error());
        assert_eq!(ExitCode::OverdueRequests.as_i32(), 1);
    }

    #[test]
    fn test_error_mapping() {
        let err = ct_common::Error::RequestNotFound {
            id: "req-1".to_string(),
        };
        assert_eq!(ExitCode::from(&err), ExitCode::NotFound);
        assert!(ExitCode::from(&err).is_error());

        let err = ct_common::Error::Config("bad".to_string());
        assert_eq!(i32::from(ExitCode::from(&err)), 10);

        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ct_common::Error::from(json);
        assert_eq!(ExitCode::from(&err), ExitCode::InternalError);
    }
}
