//! Error types.
//!
//! [`FuseError`] is what an [`Operations`](crate::Operations)
//! implementation returns; the fault translator turns it into a negative
//! errno. [`MountError`] is what [`Fuse::mount`](crate::Fuse::mount)
//! returns to its caller.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure reported by an operation set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FuseError {
    /// A platform error code, reported to the kernel as `-code`.
    #[error("errno {0}")]
    Errno(i32),

    /// The operation set broke the contract (bad result shape, oversized
    /// read, undecodable name). Reported as `EINVAL`.
    #[error("contract violation: {0}")]
    Violation(String),

    /// Any other failure. Reported as `EINVAL`.
    #[error("{0}")]
    Other(String),
}

impl FuseError {
    pub fn errno(code: i32) -> Self {
        Self::Errno(code)
    }

    pub fn not_found() -> Self {
        Self::Errno(libc::ENOENT)
    }

    pub fn exists() -> Self {
        Self::Errno(libc::EEXIST)
    }

    pub fn not_a_directory() -> Self {
        Self::Errno(libc::ENOTDIR)
    }

    pub fn is_a_directory() -> Self {
        Self::Errno(libc::EISDIR)
    }

    pub fn not_empty() -> Self {
        Self::Errno(libc::ENOTEMPTY)
    }

    pub fn invalid() -> Self {
        Self::Errno(libc::EINVAL)
    }

    pub fn bad_handle() -> Self {
        Self::Errno(libc::EBADF)
    }

    /// No such operation (`ENOSYS`).
    pub fn unimplemented() -> Self {
        Self::Errno(libc::ENOSYS)
    }

    /// Operation not supported on this object (`ENOTSUP`).
    pub fn unsupported() -> Self {
        Self::Errno(fusebridge_abi::consts::ENOTSUP)
    }

    /// The destination buffer is too small (`ERANGE`).
    pub fn range() -> Self {
        Self::Errno(libc::ERANGE)
    }

    /// No such extended attribute.
    #[cfg(any(target_os = "macos", target_os = "freebsd"))]
    pub fn no_attribute() -> Self {
        Self::Errno(libc::ENOATTR)
    }

    /// No such extended attribute.
    #[cfg(not(any(target_os = "macos", target_os = "freebsd")))]
    pub fn no_attribute() -> Self {
        Self::Errno(libc::ENODATA)
    }

    /// Inappropriate ioctl for this file (`ENOTTY`).
    pub fn no_ioctl() -> Self {
        Self::Errno(libc::ENOTTY)
    }

    pub fn violation(msg: impl Into<String>) -> Self {
        Self::Violation(msg.into())
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// The error code, if this is an [`FuseError::Errno`].
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Errno(code) => Some(*code),
            _ => None,
        }
    }
}

impl From<io::Error> for FuseError {
    fn from(e: io::Error) -> Self {
        if let Some(code) = e.raw_os_error() {
            return Self::Errno(code);
        }
        match e.kind() {
            io::ErrorKind::NotFound => Self::Errno(libc::ENOENT),
            io::ErrorKind::PermissionDenied => Self::Errno(libc::EACCES),
            io::ErrorKind::AlreadyExists => Self::Errno(libc::EEXIST),
            io::ErrorKind::InvalidInput => Self::Errno(libc::EINVAL),
            io::ErrorKind::Unsupported => Self::Errno(fusebridge_abi::consts::ENOTSUP),
            _ => Self::Other(e.to_string()),
        }
    }
}

/// Result type of every [`Operations`](crate::Operations) method.
pub type FuseResult<T> = Result<T, FuseError>;

/// Failure of a whole mount.
#[derive(Debug, Error)]
pub enum MountError {
    /// The native library could not be loaded or lacks a symbol.
    #[error("cannot load libfuse: {0}")]
    Library(String),

    /// An argument could not be handed to the native layer.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An operation faulted during the session; the session was
    /// terminated and the fault is reported once the native call returned.
    #[error("fatal fault in {op}: {message}")]
    Fault { op: &'static str, message: String },

    /// The native run call returned a nonzero status.
    #[error("libfuse exited with status {0}")]
    Status(i32),
}

/// Failure loading a [`MountConfig`](crate::MountConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
