//! Accessors for the request being serviced on the current thread.
//!
//! These only answer inside an operation called by a running session.
//! Elsewhere `context` and `private_data` return `None` and `exit` does
//! nothing.

use fusebridge_abi::{FuseContext, GidT, ModeT, PidT, UidT};

use crate::adapter::Bridge;
use crate::native;
use crate::ops::PrivateData;

/// Identity of the process that issued the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    pub uid: UidT,
    pub gid: GidT,
    pub pid: PidT,
    pub umask: ModeT,
}

fn raw_context<'a>() -> Option<&'a FuseContext> {
    let ctx = native::get()?.context();
    unsafe { ctx.as_ref() }
}

pub fn context() -> Option<RequestContext> {
    raw_context().map(|ctx| RequestContext {
        uid: ctx.uid,
        gid: ctx.gid,
        pid: ctx.pid,
        umask: ctx.umask,
    })
}

/// The value the operation set's `init` returned, if it returned one.
pub fn private_data() -> Option<PrivateData> {
    bridge()?.private_data()
}

/// Ask the running session to stop once the requests in flight finish.
pub fn exit() {
    let Some(native) = native::get() else {
        return;
    };
    let Some(ctx) = raw_context() else {
        return;
    };
    if !ctx.fuse.is_null() {
        unsafe { native.exit(ctx.fuse) };
    }
}

/// The session's bridge. The mount passes it as libfuse's `user_data` and
/// the init trampoline hands the same pointer back, so it is always the
/// context's `private_data`.
pub(crate) fn bridge<'a>() -> Option<&'a Bridge> {
    let ctx = raw_context()?;
    unsafe { ctx.private_data.cast::<Bridge>().cast_const().as_ref() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outside_a_request() {
        // No handle is installed in unit tests.
        if native::get().is_none() {
            assert!(context().is_none());
            assert!(private_data().is_none());
            exit();
        }
    }
}
