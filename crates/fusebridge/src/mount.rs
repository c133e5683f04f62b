//! Running a session.

use std::ffi::{c_char, c_int, c_void};

use fusebridge_abi::FuseOperations;
use tracing::{debug, info};

use crate::adapter::Bridge;
use crate::config::MountConfig;
use crate::error::MountError;
use crate::native;
use crate::ops::Operations;
use crate::trampoline;

/// Entry point for mounting an [`Operations`] implementation.
pub struct Fuse;

impl Fuse {
    /// Mount `ops` and serve requests until the filesystem is unmounted
    /// or the session is terminated. Blocks the calling thread.
    ///
    /// `ops` is dropped before this returns. A fatal fault recorded during
    /// the session is reported as [`MountError::Fault`] in preference to
    /// the native status.
    pub fn mount<O: Operations + 'static>(ops: O, config: &MountConfig) -> Result<(), MountError> {
        let native = native::get_or_load()?;

        let args = config.args(ops.name())?;
        let supported = ops.supported();
        let table = trampoline::table(supported);
        debug!(ops = ?supported.op_names(), "dispatch table built");

        let bridge = Box::new(Bridge::new(
            Box::new(ops),
            config.raw_fi,
            config.encoding,
            config.fault_policy,
        ));

        let mut argv: Vec<*mut c_char> = args.iter().map(|a| a.as_ptr().cast_mut()).collect();
        let argc = c_int::try_from(argv.len())
            .map_err(|_| MountError::InvalidArgument("too many arguments".into()))?;
        argv.push(std::ptr::null_mut());

        info!(mountpoint = %config.mountpoint.display(), "mounting");
        let status = {
            let _sigint = SigintGuard::install();
            unsafe {
                native.main_real(
                    argc,
                    argv.as_mut_ptr(),
                    &table,
                    std::mem::size_of::<FuseOperations>(),
                    (&*bridge as *const Bridge).cast_mut().cast::<c_void>(),
                )
            }
        };
        info!(status, "session ended");

        let fault = bridge.fault();
        drop(bridge);

        if let Some(fault) = fault {
            return Err(MountError::Fault {
                op: fault.op,
                message: fault.message,
            });
        }
        if status != 0 {
            return Err(MountError::Status(status));
        }
        Ok(())
    }
}

/// Resets `SIGINT` to its default disposition for the life of the guard so
/// libfuse installs its own handler, then restores the previous one.
pub struct SigintGuard {
    #[cfg(unix)]
    previous: Option<libc::sigaction>,
    #[cfg(not(unix))]
    previous: Option<libc::sighandler_t>,
}

impl SigintGuard {
    #[cfg(unix)]
    pub fn install() -> Self {
        unsafe {
            let mut action: libc::sigaction = std::mem::zeroed();
            action.sa_sigaction = libc::SIG_DFL;
            libc::sigemptyset(&mut action.sa_mask);
            let mut previous: libc::sigaction = std::mem::zeroed();
            if libc::sigaction(libc::SIGINT, &action, &mut previous) != 0 {
                tracing::warn!("cannot reset SIGINT disposition");
                return Self { previous: None };
            }
            Self {
                previous: Some(previous),
            }
        }
    }

    #[cfg(not(unix))]
    pub fn install() -> Self {
        let previous = unsafe { libc::signal(libc::SIGINT, libc::SIG_DFL) };
        Self {
            previous: Some(previous),
        }
    }
}

impl Drop for SigintGuard {
    #[cfg(unix)]
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            unsafe { libc::sigaction(libc::SIGINT, &previous, std::ptr::null_mut()) };
        }
    }

    #[cfg(not(unix))]
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            unsafe { libc::signal(libc::SIGINT, previous) };
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn current_sigint() -> libc::sighandler_t {
        unsafe {
            let mut current: libc::sigaction = std::mem::zeroed();
            libc::sigaction(libc::SIGINT, std::ptr::null(), &mut current);
            current.sa_sigaction
        }
    }

    extern "C" fn ignore(_: c_int) {}

    #[test]
    fn test_sigint_guard_restores_handler() {
        unsafe {
            let mut action: libc::sigaction = std::mem::zeroed();
            action.sa_sigaction = ignore as extern "C" fn(c_int) as libc::sighandler_t;
            libc::sigaction(libc::SIGINT, &action, std::ptr::null_mut());
        }
        let installed = current_sigint();
        {
            let _guard = SigintGuard::install();
            assert_eq!(current_sigint(), libc::SIG_DFL);
        }
        assert_eq!(current_sigint(), installed);
    }
}
