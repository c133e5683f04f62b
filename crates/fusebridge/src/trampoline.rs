//! `extern "C"` entry points and the dispatch table built from them.
//!
//! Every trampoline finds the session's [`Bridge`] through the request
//! context and runs the matching adapter method under the fault guard.

use std::ffi::{c_char, c_int, c_uint, c_void};
use std::panic::{AssertUnwindSafe, catch_unwind};

use fusebridge_abi::{
    ConnInfo, DevT, FileInfo, FillDir, FuseBufVec, FuseConfig, FuseOperations, GidT, ModeT, OffT,
    Stat, StatVfs, Timespec, UidT,
};
use tracing::error;

use crate::adapter::Bridge;
use crate::error::FuseResult;
use crate::fault::{self, Fault, FaultPolicy, NativeStatus};
use crate::ops::OpSet;
use crate::session;

fn dispatch<T: NativeStatus>(op: &'static str, call: impl FnOnce(&Bridge) -> FuseResult<T>) -> T {
    match session::bridge() {
        Some(bridge) => fault::guard(bridge, op, || call(bridge)),
        None => {
            error!(op, "request outside a fusebridge session");
            T::from_errno(-libc::EIO)
        }
    }
}

macro_rules! trampolines {
    ($( $name:ident ( $($arg:ident : $ty:ty),* $(,)? ) -> $ret:ty; )*) => {
        $(
            unsafe extern "C" fn $name($($arg: $ty),*) -> $ret {
                dispatch(stringify!($name), |bridge| unsafe { bridge.$name($($arg),*) })
            }
        )*
    };
}

trampolines! {
    getattr(path: *const c_char, st: *mut Stat, fi: *mut FileInfo) -> c_int;
    readlink(path: *const c_char, buf: *mut c_char, size: usize) -> c_int;
    mknod(path: *const c_char, mode: ModeT, dev: DevT) -> c_int;
    mkdir(path: *const c_char, mode: ModeT) -> c_int;
    unlink(path: *const c_char) -> c_int;
    rmdir(path: *const c_char) -> c_int;
    symlink(source: *const c_char, target: *const c_char) -> c_int;
    rename(old: *const c_char, new: *const c_char, flags: c_uint) -> c_int;
    link(source: *const c_char, target: *const c_char) -> c_int;
    chmod(path: *const c_char, mode: ModeT, fi: *mut FileInfo) -> c_int;
    chown(path: *const c_char, uid: UidT, gid: GidT, fi: *mut FileInfo) -> c_int;
    truncate(path: *const c_char, length: OffT, fi: *mut FileInfo) -> c_int;
    open(path: *const c_char, fi: *mut FileInfo) -> c_int;
    read(path: *const c_char, buf: *mut c_char, size: usize, offset: OffT, fi: *mut FileInfo) -> c_int;
    write(path: *const c_char, buf: *const c_char, size: usize, offset: OffT, fi: *mut FileInfo) -> c_int;
    statfs(path: *const c_char, stv: *mut StatVfs) -> c_int;
    flush(path: *const c_char, fi: *mut FileInfo) -> c_int;
    release(path: *const c_char, fi: *mut FileInfo) -> c_int;
    fsync(path: *const c_char, datasync: c_int, fi: *mut FileInfo) -> c_int;
    listxattr(path: *const c_char, list: *mut c_char, size: usize) -> c_int;
    removexattr(path: *const c_char, name: *const c_char) -> c_int;
    opendir(path: *const c_char, fi: *mut FileInfo) -> c_int;
    readdir(
        path: *const c_char,
        buf: *mut c_void,
        filler: Option<FillDir>,
        offset: OffT,
        fi: *mut FileInfo,
        flags: c_uint,
    ) -> c_int;
    releasedir(path: *const c_char, fi: *mut FileInfo) -> c_int;
    fsyncdir(path: *const c_char, datasync: c_int, fi: *mut FileInfo) -> c_int;
    access(path: *const c_char, mask: c_int) -> c_int;
    create(path: *const c_char, mode: ModeT, fi: *mut FileInfo) -> c_int;
    lock(path: *const c_char, fi: *mut FileInfo, cmd: c_int, lock: *mut c_void) -> c_int;
    utimens(path: *const c_char, tv: *const Timespec, fi: *mut FileInfo) -> c_int;
    bmap(path: *const c_char, blocksize: usize, idx: *mut u64) -> c_int;
    ioctl(
        path: *const c_char,
        cmd: c_uint,
        arg: *mut c_void,
        fi: *mut FileInfo,
        flags: c_uint,
        data: *mut c_void,
    ) -> c_int;
    poll(path: *const c_char, fi: *mut FileInfo, ph: *mut c_void, reventsp: *mut c_uint) -> c_int;
    write_buf(path: *const c_char, bufv: *mut FuseBufVec, offset: OffT, fi: *mut FileInfo) -> c_int;
    read_buf(
        path: *const c_char,
        bufp: *mut *mut FuseBufVec,
        size: usize,
        offset: OffT,
        fi: *mut FileInfo,
    ) -> c_int;
    flock(path: *const c_char, fi: *mut FileInfo, op: c_int) -> c_int;
    fallocate(path: *const c_char, mode: c_int, offset: OffT, length: OffT, fi: *mut FileInfo) -> c_int;
    copy_file_range(
        path_in: *const c_char,
        fi_in: *mut FileInfo,
        offset_in: OffT,
        path_out: *const c_char,
        fi_out: *mut FileInfo,
        offset_out: OffT,
        len: usize,
        flags: c_int,
    ) -> isize;
    lseek(path: *const c_char, offset: OffT, whence: c_int, fi: *mut FileInfo) -> OffT;
}

#[cfg(not(target_os = "macos"))]
unsafe extern "C" fn setxattr(
    path: *const c_char,
    name: *const c_char,
    value: *const c_char,
    size: usize,
    flags: c_int,
) -> c_int {
    dispatch("setxattr", |bridge| unsafe { bridge.setxattr(path, name, value, size, flags, 0) })
}

#[cfg(target_os = "macos")]
unsafe extern "C" fn setxattr(
    path: *const c_char,
    name: *const c_char,
    value: *const c_char,
    size: usize,
    flags: c_int,
    position: u32,
) -> c_int {
    dispatch("setxattr", |bridge| unsafe {
        bridge.setxattr(path, name, value, size, flags, position)
    })
}

#[cfg(not(target_os = "macos"))]
unsafe extern "C" fn getxattr(path: *const c_char, name: *const c_char, value: *mut c_char, size: usize) -> c_int {
    dispatch("getxattr", |bridge| unsafe { bridge.getxattr(path, name, value, size, 0) })
}

#[cfg(target_os = "macos")]
unsafe extern "C" fn getxattr(
    path: *const c_char,
    name: *const c_char,
    value: *mut c_char,
    size: usize,
    position: u32,
) -> c_int {
    dispatch("getxattr", |bridge| unsafe { bridge.getxattr(path, name, value, size, position) })
}

/// Always succeeds and always returns the bridge pointer, which libfuse
/// then keeps as the context's `private_data`.
unsafe extern "C" fn init(conn: *mut ConnInfo, cfg: *mut FuseConfig) -> *mut c_void {
    let Some(bridge) = session::bridge() else {
        error!("init outside a fusebridge session");
        return std::ptr::null_mut();
    };
    let this = bridge as *const Bridge as *mut c_void;
    if let Err(payload) = catch_unwind(AssertUnwindSafe(|| unsafe { bridge.init(conn, cfg) })) {
        let message = fault::panic_message(payload.as_ref());
        match bridge.policy() {
            FaultPolicy::FailRequest => error!("init panicked: {message}, continuing"),
            FaultPolicy::Terminate => {
                error!("init panicked: {message}, terminating session");
                if bridge.record_fault(Fault { op: "init", message }) {
                    session::exit();
                }
            }
        }
    }
    this
}

unsafe extern "C" fn destroy(private_data: *mut c_void) {
    let Some(bridge) = (unsafe { private_data.cast::<Bridge>().cast_const().as_ref() }) else {
        return;
    };
    let _: c_int = fault::guard(bridge, "destroy", || bridge.destroy());
}

/// Build the dispatch table: a slot is populated exactly when its
/// operation is in `ops`.
pub(crate) fn table(ops: OpSet) -> FuseOperations {
    let mut t = FuseOperations::default();
    let has = |op: OpSet| ops.contains(op);

    if has(OpSet::GETATTR) {
        t.getattr = Some(getattr);
    }
    if has(OpSet::READLINK) {
        t.readlink = Some(readlink);
    }
    if has(OpSet::MKNOD) {
        t.mknod = Some(mknod);
    }
    if has(OpSet::MKDIR) {
        t.mkdir = Some(mkdir);
    }
    if has(OpSet::UNLINK) {
        t.unlink = Some(unlink);
    }
    if has(OpSet::RMDIR) {
        t.rmdir = Some(rmdir);
    }
    if has(OpSet::SYMLINK) {
        t.symlink = Some(symlink);
    }
    if has(OpSet::RENAME) {
        t.rename = Some(rename);
    }
    if has(OpSet::LINK) {
        t.link = Some(link);
    }
    if has(OpSet::CHMOD) {
        t.chmod = Some(chmod);
    }
    if has(OpSet::CHOWN) {
        t.chown = Some(chown);
    }
    if has(OpSet::TRUNCATE) {
        t.truncate = Some(truncate);
    }
    if has(OpSet::OPEN) {
        t.open = Some(open);
    }
    if has(OpSet::READ) {
        t.read = Some(read);
    }
    if has(OpSet::WRITE) {
        t.write = Some(write);
    }
    if has(OpSet::STATFS) {
        t.statfs = Some(statfs);
    }
    if has(OpSet::FLUSH) {
        t.flush = Some(flush);
    }
    if has(OpSet::RELEASE) {
        t.release = Some(release);
    }
    if has(OpSet::FSYNC) {
        t.fsync = Some(fsync);
    }
    if has(OpSet::SETXATTR) {
        t.setxattr = Some(setxattr);
    }
    if has(OpSet::GETXATTR) {
        t.getxattr = Some(getxattr);
    }
    if has(OpSet::LISTXATTR) {
        t.listxattr = Some(listxattr);
    }
    if has(OpSet::REMOVEXATTR) {
        t.removexattr = Some(removexattr);
    }
    if has(OpSet::OPENDIR) {
        t.opendir = Some(opendir);
    }
    if has(OpSet::READDIR) {
        t.readdir = Some(readdir);
    }
    if has(OpSet::RELEASEDIR) {
        t.releasedir = Some(releasedir);
    }
    if has(OpSet::FSYNCDIR) {
        t.fsyncdir = Some(fsyncdir);
    }
    if has(OpSet::INIT) {
        t.init = Some(init);
    }
    if has(OpSet::DESTROY) {
        t.destroy = Some(destroy);
    }
    if has(OpSet::ACCESS) {
        t.access = Some(access);
    }
    if has(OpSet::CREATE) {
        t.create = Some(create);
    }
    if has(OpSet::LOCK) {
        t.lock = Some(lock);
    }
    if has(OpSet::UTIMENS) {
        t.utimens = Some(utimens);
    }
    if has(OpSet::BMAP) {
        t.bmap = Some(bmap);
    }
    if has(OpSet::IOCTL) {
        t.ioctl = Some(ioctl);
    }
    if has(OpSet::POLL) {
        t.poll = Some(poll);
    }
    if has(OpSet::WRITE_BUF) {
        t.write_buf = Some(write_buf);
    }
    if has(OpSet::READ_BUF) {
        t.read_buf = Some(read_buf);
    }
    if has(OpSet::FLOCK) {
        t.flock = Some(flock);
    }
    if has(OpSet::FALLOCATE) {
        t.fallocate = Some(fallocate);
    }
    if has(OpSet::COPY_FILE_RANGE) {
        t.copy_file_range = Some(copy_file_range);
    }
    if has(OpSet::LSEEK) {
        t.lseek = Some(lseek);
    }
    t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_set_builds_empty_table() {
        assert!(table(OpSet::empty()).populated().is_empty());
    }

    #[test]
    fn test_slots_follow_the_set() {
        let ops = OpSet::GETATTR | OpSet::READDIR | OpSet::WRITE_BUF | OpSet::LSEEK;
        let t = table(ops);
        assert_eq!(t.populated(), vec!["getattr", "readdir", "write_buf", "lseek"]);
        assert!(t.read.is_none());
        assert!(t.init.is_none());
    }

    #[test]
    fn test_full_set_fills_every_slot() {
        let t = table(OpSet::all());
        assert_eq!(t.populated().len(), FuseOperations::SLOTS);
        let names: Vec<String> = t.populated().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, OpSet::all().op_names());
    }
}
