//! A scripted stand-in for libfuse.
//!
//! `FakeNative` implements the native seam the way libfuse behaves for one
//! session on the calling thread: it sets up the request context with the
//! mount's `user_data`, calls `init`, runs the test's script against the
//! dispatch table, then calls `destroy`. Scripts drive the table through
//! [`Session`], which wraps the raw slots in safe helpers.

#![allow(dead_code)]

use std::cell::{Cell, UnsafeCell};
use std::ffi::{CStr, CString, c_char, c_int, c_uint, c_void};
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};

use fusebridge::abi::{ConnInfo, FileInfo, FuseConfig, FuseContext, FuseOperations, OffT, Stat, StatVfs, Timespec};
use fusebridge::native::{self, NativeFuse};
use fusebridge::{MountConfig, MountError, Operations};
use parking_lot::Mutex;

pub type Script = Box<dyn FnOnce(&Session) -> c_int + Send>;

pub const UID: u32 = 1000;
pub const GID: u32 = 100;
pub const PID: i32 = 4242;

static SESSION_LOCK: Mutex<()> = Mutex::new(());
static SCRIPT: Mutex<Option<Script>> = Mutex::new(None);
static LAST_ARGS: Mutex<Vec<String>> = Mutex::new(Vec::new());
static EXITS: AtomicUsize = AtomicUsize::new(0);
static FUSE_HANDLE: u8 = 0;

thread_local! {
    static CONTEXT: UnsafeCell<FuseContext> = UnsafeCell::new(FuseContext::default());
    static ACTIVE: Cell<bool> = const { Cell::new(false) };
}

pub struct FakeNative;

struct Deactivate;

impl Drop for Deactivate {
    fn drop(&mut self) {
        ACTIVE.with(|a| a.set(false));
    }
}

fn context_ptr() -> *mut FuseContext {
    CONTEXT.with(|c| c.get())
}

impl NativeFuse for FakeNative {
    unsafe fn main_real(
        &self,
        argc: c_int,
        argv: *mut *mut c_char,
        ops: *const FuseOperations,
        op_size: usize,
        user_data: *mut c_void,
    ) -> c_int {
        assert_eq!(op_size, std::mem::size_of::<FuseOperations>());
        let args = (0..argc as usize)
            .map(|i| unsafe { CStr::from_ptr(*argv.add(i)) }.to_string_lossy().into_owned())
            .collect();
        assert!(unsafe { *argv.add(argc as usize) }.is_null());
        *LAST_ARGS.lock() = args;

        let table = unsafe { *ops };
        unsafe {
            *context_ptr() = FuseContext {
                fuse: &FUSE_HANDLE as *const u8 as *mut c_void,
                uid: UID,
                gid: GID,
                pid: PID,
                private_data: user_data,
                umask: 0o022,
            };
        }
        ACTIVE.with(|a| a.set(true));
        let _deactivate = Deactivate;

        if let Some(init) = table.init {
            let mut conn = ConnInfo::default();
            let mut cfg = FuseConfig::default();
            let data = unsafe { init(&mut conn, &mut cfg) };
            unsafe { (*context_ptr()).private_data = data };
        }

        let script = SCRIPT.lock().take();
        let status = match script {
            Some(script) => script(&Session { table }),
            None => 0,
        };

        if let Some(destroy) = table.destroy {
            unsafe { destroy((*context_ptr()).private_data) };
        }
        status
    }

    fn context(&self) -> *mut FuseContext {
        if ACTIVE.with(|a| a.get()) {
            context_ptr()
        } else {
            ptr::null_mut()
        }
    }

    unsafe fn exit(&self, fuse: *mut c_void) {
        assert_eq!(fuse, &FUSE_HANDLE as *const u8 as *mut c_void);
        EXITS.fetch_add(1, Ordering::SeqCst);
    }
}

/// What a finished session left behind.
#[derive(Debug)]
pub struct Outcome {
    pub result: Result<(), MountError>,
    pub args: Vec<String>,
    pub exits: usize,
}

/// Mount `ops` under the fake native layer and run `script` as the
/// session. Sessions are serialised across the test binary.
pub fn session<O: Operations + 'static>(
    ops: O,
    config: &MountConfig,
    script: impl FnOnce(&Session) -> c_int + Send + 'static,
) -> Outcome {
    let _session = SESSION_LOCK.lock();
    native::install(FakeNative);
    EXITS.store(0, Ordering::SeqCst);
    LAST_ARGS.lock().clear();
    *SCRIPT.lock() = Some(Box::new(script));
    let result = fusebridge::Fuse::mount(ops, config);
    Outcome {
        result,
        args: LAST_ARGS.lock().clone(),
        exits: EXITS.load(Ordering::SeqCst),
    }
}

pub fn run<O: Operations + 'static>(
    ops: O,
    config: &MountConfig,
    script: impl FnOnce(&Session) -> c_int + Send + 'static,
) -> Result<(), MountError> {
    session(ops, config, script).result
}

pub fn mount_config() -> MountConfig {
    MountConfig::new("/mnt/test").foreground(true)
}

/// Termination requests issued so far in the running session. Only
/// meaningful inside a script.
pub fn exits() -> usize {
    EXITS.load(Ordering::SeqCst)
}

/// Directory listing collected by [`Session::readdir`].
#[derive(Debug, Default)]
pub struct Listing {
    capacity: usize,
    pub entries: Vec<(String, Option<Stat>, OffT)>,
}

unsafe extern "C" fn fill(buf: *mut c_void, name: *const c_char, st: *const Stat, off: OffT, _flags: c_uint) -> c_int {
    let listing = unsafe { &mut *buf.cast::<Listing>() };
    if listing.entries.len() == listing.capacity {
        return 1;
    }
    let name = unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned();
    let st = unsafe { st.as_ref() }.copied();
    listing.entries.push((name, st, off));
    0
}

fn c(text: &str) -> CString {
    CString::new(text).unwrap()
}

/// Safe calls into the dispatch table the way libfuse makes them.
pub struct Session {
    pub table: FuseOperations,
}

impl Session {
    pub fn getattr(&self, path: &str) -> (c_int, Stat) {
        self.getattr_fi(Some(path), None)
    }

    pub fn getattr_fi(&self, path: Option<&str>, fi: Option<&mut FileInfo>) -> (c_int, Stat) {
        let mut st = Stat::default();
        let path = path.map(c);
        let status = unsafe {
            self.table.getattr.unwrap()(
                path.as_ref().map_or(ptr::null(), |p| p.as_ptr()),
                &mut st,
                fi.map_or(ptr::null_mut(), |fi| fi as *mut FileInfo),
            )
        };
        (status, st)
    }

    pub fn readdir(&self, path: &str, offset: OffT, capacity: usize) -> (c_int, Listing) {
        let mut listing = Listing {
            capacity,
            entries: Vec::new(),
        };
        let path = c(path);
        let mut fi = FileInfo::default();
        let status = unsafe {
            self.table.readdir.unwrap()(
                path.as_ptr(),
                (&mut listing as *mut Listing).cast(),
                Some(fill),
                offset,
                &mut fi,
                0,
            )
        };
        (status, listing)
    }

    pub fn open(&self, path: &str, flags: c_int) -> (c_int, FileInfo) {
        let mut fi = FileInfo {
            flags,
            ..FileInfo::default()
        };
        let status = unsafe { self.table.open.unwrap()(c(path).as_ptr(), &mut fi) };
        (status, fi)
    }

    pub fn create(&self, path: &str, mode: u32) -> (c_int, FileInfo) {
        let mut fi = FileInfo::default();
        let status = unsafe { self.table.create.unwrap()(c(path).as_ptr(), mode as _, &mut fi) };
        (status, fi)
    }

    pub fn read(&self, path: &str, size: usize, offset: OffT, fi: &mut FileInfo) -> (c_int, Vec<u8>) {
        let mut buf = vec![0u8; size];
        let status =
            unsafe { self.table.read.unwrap()(c(path).as_ptr(), buf.as_mut_ptr().cast(), size, offset, fi) };
        buf.truncate(status.max(0) as usize);
        (status, buf)
    }

    pub fn write(&self, path: &str, data: &[u8], offset: OffT, fi: &mut FileInfo) -> c_int {
        unsafe { self.table.write.unwrap()(c(path).as_ptr(), data.as_ptr().cast(), data.len(), offset, fi) }
    }

    pub fn release(&self, path: &str, fi: &mut FileInfo) -> c_int {
        unsafe { self.table.release.unwrap()(c(path).as_ptr(), fi) }
    }

    pub fn mkdir(&self, path: &str, mode: u32) -> c_int {
        unsafe { self.table.mkdir.unwrap()(c(path).as_ptr(), mode as _) }
    }

    pub fn unlink(&self, path: &str) -> c_int {
        unsafe { self.table.unlink.unwrap()(c(path).as_ptr()) }
    }

    pub fn rmdir(&self, path: &str) -> c_int {
        unsafe { self.table.rmdir.unwrap()(c(path).as_ptr()) }
    }

    /// Native argument order: link content, then the new link's path.
    pub fn symlink(&self, content: &str, link: &str) -> c_int {
        unsafe { self.table.symlink.unwrap()(c(content).as_ptr(), c(link).as_ptr()) }
    }

    /// Native argument order: existing file, then the new link's path.
    pub fn link(&self, existing: &str, link: &str) -> c_int {
        unsafe { self.table.link.unwrap()(c(existing).as_ptr(), c(link).as_ptr()) }
    }

    pub fn rename(&self, from: &str, to: &str, flags: c_uint) -> c_int {
        unsafe { self.table.rename.unwrap()(c(from).as_ptr(), c(to).as_ptr(), flags) }
    }

    pub fn readlink(&self, path: &str, size: usize) -> (c_int, Vec<u8>) {
        let mut buf = vec![0xffu8; size];
        let status = unsafe { self.table.readlink.unwrap()(c(path).as_ptr(), buf.as_mut_ptr().cast(), size) };
        (status, buf)
    }

    pub fn chmod(&self, path: &str, mode: u32) -> c_int {
        unsafe { self.table.chmod.unwrap()(c(path).as_ptr(), mode as _, ptr::null_mut()) }
    }

    pub fn chown(&self, path: &str, uid: u32, gid: u32) -> c_int {
        unsafe { self.table.chown.unwrap()(c(path).as_ptr(), uid, gid, ptr::null_mut()) }
    }

    pub fn truncate(&self, path: &str, length: OffT) -> c_int {
        unsafe { self.table.truncate.unwrap()(c(path).as_ptr(), length, ptr::null_mut()) }
    }

    pub fn utimens(&self, path: &str, times: Option<[Timespec; 2]>) -> c_int {
        let tv = times.as_ref().map_or(ptr::null(), |t| t.as_ptr());
        unsafe { self.table.utimens.unwrap()(c(path).as_ptr(), tv, ptr::null_mut()) }
    }

    pub fn statfs(&self, path: &str) -> (c_int, StatVfs) {
        let mut stv = StatVfs::default();
        let status = unsafe { self.table.statfs.unwrap()(c(path).as_ptr(), &mut stv) };
        (status, stv)
    }

    #[cfg(not(target_os = "macos"))]
    pub fn setxattr(&self, path: &str, name: &str, value: &[u8], flags: c_int) -> c_int {
        unsafe {
            self.table.setxattr.unwrap()(
                c(path).as_ptr(),
                c(name).as_ptr(),
                value.as_ptr().cast(),
                value.len(),
                flags,
            )
        }
    }

    #[cfg(target_os = "macos")]
    pub fn setxattr(&self, path: &str, name: &str, value: &[u8], flags: c_int) -> c_int {
        unsafe {
            self.table.setxattr.unwrap()(
                c(path).as_ptr(),
                c(name).as_ptr(),
                value.as_ptr().cast(),
                value.len(),
                flags,
                0,
            )
        }
    }

    /// `None` for `size` passes a null destination.
    pub fn getxattr(&self, path: &str, name: &str, size: Option<usize>) -> (c_int, Vec<u8>) {
        let mut buf = vec![0xffu8; size.unwrap_or(0)];
        let dst = if size.is_some() {
            buf.as_mut_ptr().cast::<c_char>()
        } else {
            ptr::null_mut()
        };
        #[cfg(not(target_os = "macos"))]
        let status = unsafe {
            self.table.getxattr.unwrap()(c(path).as_ptr(), c(name).as_ptr(), dst, size.unwrap_or(0))
        };
        #[cfg(target_os = "macos")]
        let status = unsafe {
            self.table.getxattr.unwrap()(c(path).as_ptr(), c(name).as_ptr(), dst, size.unwrap_or(0), 0)
        };
        (status, buf)
    }

    pub fn listxattr(&self, path: &str, size: Option<usize>) -> (c_int, Vec<u8>) {
        let mut buf = vec![0xffu8; size.unwrap_or(0)];
        let dst = if size.is_some() {
            buf.as_mut_ptr().cast::<c_char>()
        } else {
            ptr::null_mut()
        };
        let status = unsafe { self.table.listxattr.unwrap()(c(path).as_ptr(), dst, size.unwrap_or(0)) };
        (status, buf)
    }

    pub fn removexattr(&self, path: &str, name: &str) -> c_int {
        unsafe { self.table.removexattr.unwrap()(c(path).as_ptr(), c(name).as_ptr()) }
    }
}
