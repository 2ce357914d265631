//! Process exit codes
//!
//! Stable values so scripts can branch on the failure class.

use s3p_core::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    /// Bad arguments, unknown provider, invalid path
    UsageError = 2,
    /// The storage service or the connection to it failed
    RemoteError = 3,
    NotFound = 5,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::UnsupportedProvider { .. } | Error::InvalidPath(_) | Error::Config(_) => {
                ExitCode::UsageError
            }
            Error::ProfileNotFound(_) => ExitCode::NotFound,
            Error::Client(_) => ExitCode::RemoteError,
            Error::Io(_) => ExitCode::GeneralError,
        }
    }
}

impl From<&anyhow::Error> for ExitCode {
    fn from(err: &anyhow::Error) -> Self {
        err.downcast_ref::<Error>()
            .map(ExitCode::from)
            .unwrap_or(ExitCode::UsageError)
    }
}
