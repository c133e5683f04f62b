//! Fault translation at the native boundary.
//!
//! Every adapter call runs inside [`guard`]. Contract errors become
//! negative errno values. A panic must never unwind into libfuse: it is
//! caught here and, under [`FaultPolicy::Terminate`], recorded as the
//! session's fatal fault while the session is asked to stop. The fault is
//! handed back to the caller of [`Fuse::mount`](crate::Fuse::mount) once
//! the native run call has returned.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::adapter::Bridge;
use crate::error::{FuseError, FuseResult};

/// What a panicking operation does to the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FaultPolicy {
    /// Record the fault, stop the session and report the fault from
    /// `mount`. Other in-flight requests may still complete.
    #[default]
    Terminate,
    /// Fail only the faulting request with `EIO`; the session keeps
    /// serving. State the operation set was mutating may be left torn.
    FailRequest,
}

/// A fatal fault recorded during a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub op: &'static str,
    pub message: String,
}

/// Native return types that carry a negative errno on failure.
pub trait NativeStatus: Copy {
    fn from_errno(neg_errno: i32) -> Self;
}

impl NativeStatus for i32 {
    fn from_errno(neg_errno: i32) -> Self {
        neg_errno
    }
}

impl NativeStatus for i64 {
    fn from_errno(neg_errno: i32) -> Self {
        neg_errno as i64
    }
}

impl NativeStatus for isize {
    fn from_errno(neg_errno: i32) -> Self {
        neg_errno as isize
    }
}

/// Run one adapter call and translate its outcome into a native status.
///
/// Once a session has recorded a fatal fault, later calls are refused
/// without reaching the operation set.
pub(crate) fn guard<T: NativeStatus>(
    bridge: &Bridge,
    op: &'static str,
    call: impl FnOnce() -> FuseResult<T>,
) -> T {
    if bridge.has_fault() {
        return T::from_errno(-libc::EFAULT);
    }
    match catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => value,
        Ok(Err(err)) => T::from_errno(translate(op, &err)),
        Err(payload) => T::from_errno(fatal(bridge, op, panic_message(payload.as_ref()))),
    }
}

/// Map a contract error to a negative errno.
pub(crate) fn translate(op: &'static str, err: &FuseError) -> i32 {
    match err {
        FuseError::Errno(code) if *code > 0 => {
            debug!(op, errno = code, "operation returned errno");
            -code
        }
        FuseError::Errno(code) => {
            error!(op, errno = code, "operation returned a non-positive errno, answering EINVAL");
            -libc::EINVAL
        }
        FuseError::Violation(msg) => {
            error!(op, "contract violation: {msg}, answering EINVAL");
            -libc::EINVAL
        }
        FuseError::Other(msg) => {
            error!(op, "operation failed: {msg}, answering EINVAL");
            -libc::EINVAL
        }
    }
}

/// Handle a panic caught at the boundary; returns the negative errno.
pub(crate) fn fatal(bridge: &Bridge, op: &'static str, message: String) -> i32 {
    match bridge.policy() {
        FaultPolicy::FailRequest => {
            error!(op, "operation panicked: {message}, answering EIO");
            -libc::EIO
        }
        FaultPolicy::Terminate => {
            error!(op, "operation panicked: {message}, terminating session");
            if bridge.record_fault(Fault { op, message }) {
                crate::session::exit();
            }
            -libc::EFAULT
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
