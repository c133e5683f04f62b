//! Session-level records: connection negotiation, mount configuration and
//! the per-request context.

use std::ffi::{c_char, c_double, c_int, c_uint, c_void};

use crate::{GidT, ModeT, PidT, UidT};

/// `struct fuse_conn_info`, handed to `init` for capability negotiation.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnInfo {
    pub proto_major: c_uint,
    pub proto_minor: c_uint,
    pub max_write: c_uint,
    pub max_read: c_uint,
    pub max_readahead: c_uint,
    pub capable: c_uint,
    pub want: c_uint,
    pub max_background: c_uint,
    pub congestion_threshold: c_uint,
    pub time_gran: c_uint,
    pub reserved: [c_uint; 22],
}

/// `struct fuse_config`, handed to `init` so the filesystem can adjust
/// timeouts and caching before the first request.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct FuseConfig {
    pub set_gid: c_int,
    pub gid: c_uint,
    pub set_uid: c_int,
    pub uid: c_uint,
    pub set_mode: c_int,
    pub umask: c_uint,
    pub entry_timeout: c_double,
    pub negative_timeout: c_double,
    pub attr_timeout: c_double,
    pub intr: c_int,
    pub intr_signal: c_int,
    pub remember: c_int,
    pub hard_remove: c_int,
    pub use_ino: c_int,
    pub readdir_ino: c_int,
    pub direct_io: c_int,
    pub kernel_cache: c_int,
    pub auto_cache: c_int,
    pub no_rofd_flush: c_int,
    pub ac_attr_timeout_set: c_int,
    pub ac_attr_timeout: c_double,
    pub nullpath_ok: c_int,
    pub parallel_direct_writes: c_int,
    pub show_help: c_int,
    pub modules: *mut c_char,
    pub debug: c_int,
}

impl Default for FuseConfig {
    /// libfuse's defaults: one-second entry and attribute timeouts.
    fn default() -> Self {
        Self {
            set_gid: 0,
            gid: 0,
            set_uid: 0,
            uid: 0,
            set_mode: 0,
            umask: 0,
            entry_timeout: 1.0,
            negative_timeout: 0.0,
            attr_timeout: 1.0,
            intr: 0,
            intr_signal: 10,
            remember: 0,
            hard_remove: 0,
            use_ino: 0,
            readdir_ino: 0,
            direct_io: 0,
            kernel_cache: 0,
            auto_cache: 0,
            no_rofd_flush: 0,
            ac_attr_timeout_set: 0,
            ac_attr_timeout: 0.0,
            nullpath_ok: 0,
            parallel_direct_writes: 0,
            show_help: 0,
            modules: std::ptr::null_mut(),
            debug: 0,
        }
    }
}

/// `struct fuse_context`, valid for the duration of one request.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct FuseContext {
    /// Opaque session handle, the argument `fuse_exit` expects.
    pub fuse: *mut c_void,
    pub uid: UidT,
    pub gid: GidT,
    pub pid: PidT,
    pub private_data: *mut c_void,
    pub umask: ModeT,
}

impl Default for FuseContext {
    fn default() -> Self {
        Self {
            fuse: std::ptr::null_mut(),
            uid: 0,
            gid: 0,
            pid: 0,
            private_data: std::ptr::null_mut(),
            umask: 0,
        }
    }
}
