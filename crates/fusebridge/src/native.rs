//! The seam to the native FUSE library.
//!
//! Everything the bridge needs from libfuse goes through [`NativeFuse`]:
//! the blocking run call, the per-request context and the termination
//! call. A process has exactly one handle. It is either installed up front
//! with [`install`] (tests install a scripted fake) or loaded from
//! libfuse3 on first mount, and never replaced afterwards.

use std::ffi::{c_char, c_int, c_void};
use std::sync::OnceLock;

use fusebridge_abi::{FuseContext, FuseOperations};

use crate::error::MountError;

/// Environment variable naming the libfuse3 shared object to load.
pub const LIBRARY_PATH_ENV: &str = "FUSE_LIBRARY_PATH";

#[cfg(target_os = "macos")]
pub const DEFAULT_LIBRARY: &str = "libfuse3.dylib";
#[cfg(target_os = "linux")]
pub const DEFAULT_LIBRARY: &str = "libfuse3.so.3";
#[cfg(not(any(target_os = "macos", target_os = "linux")))]
pub const DEFAULT_LIBRARY: &str = "libfuse3.so";

/// The three native entry points the bridge consumes.
pub trait NativeFuse: Send + Sync {
    /// `fuse_main_real`: mount, run the request loop, unmount.
    ///
    /// # Safety
    ///
    /// `argv` must hold `argc` NUL-terminated strings and `ops` must point
    /// at a table of `op_size` bytes; both must outlive the call.
    /// `user_data` becomes the initial context `private_data`.
    unsafe fn main_real(
        &self,
        argc: c_int,
        argv: *mut *mut c_char,
        ops: *const FuseOperations,
        op_size: usize,
        user_data: *mut c_void,
    ) -> c_int;

    /// `fuse_get_context`: the context of the request running on this
    /// thread, or null outside a request.
    fn context(&self) -> *mut FuseContext;

    /// `fuse_exit`: ask the session to stop at the next opportunity.
    ///
    /// # Safety
    ///
    /// `fuse` must be the session handle from a live request context.
    unsafe fn exit(&self, fuse: *mut c_void);
}

static NATIVE: OnceLock<Box<dyn NativeFuse>> = OnceLock::new();

/// Install the process-wide handle. Returns `false` if one is already set.
pub fn install(native: impl NativeFuse + 'static) -> bool {
    NATIVE.set(Box::new(native)).is_ok()
}

/// The installed handle, if any.
pub fn get() -> Option<&'static dyn NativeFuse> {
    NATIVE.get().map(|native| native.as_ref())
}

/// The installed handle, loading libfuse3 if nothing was installed yet.
pub fn get_or_load() -> Result<&'static dyn NativeFuse, MountError> {
    if let Some(native) = get() {
        return Ok(native);
    }
    let loaded = load_default()?;
    // A concurrent first mount may have won the race; either handle works.
    let _ = NATIVE.set(loaded);
    get().ok_or_else(|| MountError::Library("native handle not installed".into()))
}

#[cfg(unix)]
fn load_default() -> Result<Box<dyn NativeFuse>, MountError> {
    Ok(Box::new(LibFuse::load()?))
}

#[cfg(not(unix))]
fn load_default() -> Result<Box<dyn NativeFuse>, MountError> {
    Err(MountError::Library(
        "no libfuse loader on this platform; install a NativeFuse handle".into(),
    ))
}

#[cfg(unix)]
pub use self::libfuse::LibFuse;

#[cfg(unix)]
mod libfuse {
    use std::ffi::{CStr, CString, c_char, c_int, c_void};

    use fusebridge_abi::{FuseContext, FuseOperations};
    use tracing::debug;

    use super::{DEFAULT_LIBRARY, LIBRARY_PATH_ENV, NativeFuse};
    use crate::error::MountError;

    type MainRealFn = unsafe extern "C" fn(
        c_int,
        *mut *mut c_char,
        *const FuseOperations,
        usize,
        *mut c_void,
    ) -> c_int;
    type GetContextFn = unsafe extern "C" fn() -> *mut FuseContext;
    type ExitFn = unsafe extern "C" fn(*mut c_void);

    /// libfuse3 opened with `dlopen`. The library stays loaded for the
    /// life of the process.
    pub struct LibFuse {
        main_real: MainRealFn,
        get_context: GetContextFn,
        exit: ExitFn,
    }

    impl LibFuse {
        /// Load from `FUSE_LIBRARY_PATH`, else the platform soname.
        pub fn load() -> Result<Self, MountError> {
            let path = std::env::var(LIBRARY_PATH_ENV).unwrap_or_else(|_| DEFAULT_LIBRARY.to_string());
            Self::open(&path)
        }

        pub fn open(path: &str) -> Result<Self, MountError> {
            let c_path = CString::new(path)
                .map_err(|_| MountError::Library(format!("library path contains NUL: {path:?}")))?;
            let handle = unsafe { libc::dlopen(c_path.as_ptr(), libc::RTLD_NOW | libc::RTLD_GLOBAL) };
            if handle.is_null() {
                return Err(MountError::Library(dlerror(path)));
            }
            debug!("loaded {path}");

            unsafe {
                Ok(Self {
                    main_real: std::mem::transmute::<*mut c_void, MainRealFn>(symbol(handle, c"fuse_main_real")?),
                    get_context: std::mem::transmute::<*mut c_void, GetContextFn>(symbol(
                        handle,
                        c"fuse_get_context",
                    )?),
                    exit: std::mem::transmute::<*mut c_void, ExitFn>(symbol(handle, c"fuse_exit")?),
                })
            }
        }
    }

    unsafe fn symbol(handle: *mut c_void, name: &CStr) -> Result<*mut c_void, MountError> {
        let sym = unsafe { libc::dlsym(handle, name.as_ptr()) };
        if sym.is_null() {
            return Err(MountError::Library(format!(
                "missing symbol {}",
                name.to_string_lossy()
            )));
        }
        Ok(sym)
    }

    fn dlerror(path: &str) -> String {
        let msg = unsafe { libc::dlerror() };
        if msg.is_null() {
            format!("cannot open {path}")
        } else {
            unsafe { CStr::from_ptr(msg) }.to_string_lossy().into_owned()
        }
    }

    impl NativeFuse for LibFuse {
        unsafe fn main_real(
            &self,
            argc: c_int,
            argv: *mut *mut c_char,
            ops: *const FuseOperations,
            op_size: usize,
            user_data: *mut c_void,
        ) -> c_int {
            unsafe { (self.main_real)(argc, argv, ops, op_size, user_data) }
        }

        fn context(&self) -> *mut FuseContext {
            unsafe { (self.get_context)() }
        }

        unsafe fn exit(&self, fuse: *mut c_void) {
            unsafe { (self.exit)(fuse) }
        }
    }
}
