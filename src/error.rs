use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;

/// Error classes carried on the wire.
///
/// The first group classifies OS errors, `UnsupportedCommand`,
/// `NotSupported` and `NotImplemented` are protocol errors, and
/// `Disconnected`/`Timeout` only ever originate on the client side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    NotFound,
    AlreadyExists,
    NotDirectory,
    IsDirectory,
    NotEmpty,
    PermissionDenied,
    InvalidData,
    InvalidInput,
    Io,
    UnsupportedCommand,
    NotSupported,
    NotImplemented,
    Disconnected,
    Timeout,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NotFound",
            ErrorCode::AlreadyExists => "AlreadyExists",
            ErrorCode::NotDirectory => "NotDirectory",
            ErrorCode::IsDirectory => "IsDirectory",
            ErrorCode::NotEmpty => "NotEmpty",
            ErrorCode::PermissionDenied => "PermissionDenied",
            ErrorCode::InvalidData => "InvalidData",
            ErrorCode::InvalidInput => "InvalidInput",
            ErrorCode::Io => "Io",
            ErrorCode::UnsupportedCommand => "UnsupportedCommand",
            ErrorCode::NotSupported => "NotSupported",
            ErrorCode::NotImplemented => "NotImplemented",
            ErrorCode::Disconnected => "Disconnected",
            ErrorCode::Timeout => "Timeout",
        }
    }

    pub fn is_protocol(self) -> bool {
        matches!(
            self,
            ErrorCode::UnsupportedCommand | ErrorCode::NotSupported | ErrorCode::NotImplemented
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct FsError {
    pub code: ErrorCode,
    pub message: String,
}

impl FsError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn disconnected() -> Self {
        Self::new(ErrorCode::Disconnected, "connection to executor closed")
    }

    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::NotFound
    }
}

impl From<io::Error> for FsError {
    fn from(err: io::Error) -> Self {
        let code = match err.kind() {
            io::ErrorKind::NotFound => ErrorCode::NotFound,
            io::ErrorKind::AlreadyExists => ErrorCode::AlreadyExists,
            io::ErrorKind::NotADirectory => ErrorCode::NotDirectory,
            io::ErrorKind::IsADirectory => ErrorCode::IsDirectory,
            io::ErrorKind::DirectoryNotEmpty => ErrorCode::NotEmpty,
            io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            io::ErrorKind::InvalidData => ErrorCode::InvalidData,
            io::ErrorKind::InvalidInput => ErrorCode::InvalidInput,
            _ => ErrorCode::Io,
        };
        FsError::new(code, err.to_string())
    }
}

impl From<serde_json::Error> for FsError {
    fn from(err: serde_json::Error) -> Self {
        FsError::new(ErrorCode::InvalidData, format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_classification() {
        let cases = vec![
            (io::ErrorKind::NotFound, ErrorCode::NotFound),
            (io::ErrorKind::AlreadyExists, ErrorCode::AlreadyExists),
            (io::ErrorKind::PermissionDenied, ErrorCode::PermissionDenied),
            (io::ErrorKind::DirectoryNotEmpty, ErrorCode::NotEmpty),
            (io::ErrorKind::Other, ErrorCode::Io),
        ];

        for (kind, expected) in cases {
            let err: FsError = io::Error::new(kind, "boom").into();
            assert_eq!(err.code, expected, "Failed for kind: {:?}", kind);
            assert_eq!(err.message, "boom");
        }
    }

    #[test]
    fn test_wire_shape() {
        let err = FsError::not_found("no such file");
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#"{"code":"NotFound","message":"no such file"}"#);

        let back: FsError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, err);
        assert_eq!(back.to_string(), "NotFound: no such file");
    }

    #[test]
    fn test_protocol_codes_are_distinct_from_io() {
        assert!(ErrorCode::UnsupportedCommand.is_protocol());
        assert!(ErrorCode::NotSupported.is_protocol());
        assert!(ErrorCode::NotImplemented.is_protocol());
        assert!(!ErrorCode::Io.is_protocol());
        assert!(!ErrorCode::NotFound.is_protocol());
    }
}
