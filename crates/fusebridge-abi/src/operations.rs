//! `struct fuse_operations`, the dispatch table handed to `fuse_main_real`.
//!
//! Slots follow libfuse3 declaration order. A `None` slot tells libfuse
//! the operation is unimplemented and it answers `ENOSYS` itself.

use std::ffi::{c_char, c_int, c_uint, c_void};

use crate::buf::FuseBufVec;
use crate::conn::{ConnInfo, FuseConfig};
use crate::file_info::FileInfo;
use crate::stat::Stat;
use crate::statvfs::StatVfs;
use crate::time::Timespec;
use crate::{DevT, GidT, ModeT, OffT, UidT};

/// `fuse_fill_dir_t`: add one entry to a directory listing.
///
/// Returns nonzero once the reply buffer is full.
pub type FillDir = unsafe extern "C" fn(
    buf: *mut c_void,
    name: *const c_char,
    stbuf: *const Stat,
    off: OffT,
    flags: c_uint,
) -> c_int;

#[cfg(not(target_os = "macos"))]
pub type SetxattrFn = unsafe extern "C" fn(
    path: *const c_char,
    name: *const c_char,
    value: *const c_char,
    size: usize,
    flags: c_int,
) -> c_int;

/// macOS passes a resource-fork position after the flags.
#[cfg(target_os = "macos")]
pub type SetxattrFn = unsafe extern "C" fn(
    path: *const c_char,
    name: *const c_char,
    value: *const c_char,
    size: usize,
    flags: c_int,
    position: u32,
) -> c_int;

#[cfg(not(target_os = "macos"))]
pub type GetxattrFn = unsafe extern "C" fn(
    path: *const c_char,
    name: *const c_char,
    value: *mut c_char,
    size: usize,
) -> c_int;

#[cfg(target_os = "macos")]
pub type GetxattrFn = unsafe extern "C" fn(
    path: *const c_char,
    name: *const c_char,
    value: *mut c_char,
    size: usize,
    position: u32,
) -> c_int;

#[repr(C)]
#[derive(Clone, Copy, Default)]
pub struct FuseOperations {
    pub getattr:
        Option<unsafe extern "C" fn(path: *const c_char, stbuf: *mut Stat, fi: *mut FileInfo) -> c_int>,
    pub readlink:
        Option<unsafe extern "C" fn(path: *const c_char, buf: *mut c_char, size: usize) -> c_int>,
    pub mknod: Option<unsafe extern "C" fn(path: *const c_char, mode: ModeT, rdev: DevT) -> c_int>,
    pub mkdir: Option<unsafe extern "C" fn(path: *const c_char, mode: ModeT) -> c_int>,
    pub unlink: Option<unsafe extern "C" fn(path: *const c_char) -> c_int>,
    pub rmdir: Option<unsafe extern "C" fn(path: *const c_char) -> c_int>,
    pub symlink: Option<unsafe extern "C" fn(target: *const c_char, link: *const c_char) -> c_int>,
    pub rename: Option<
        unsafe extern "C" fn(from: *const c_char, to: *const c_char, flags: c_uint) -> c_int,
    >,
    pub link: Option<unsafe extern "C" fn(from: *const c_char, to: *const c_char) -> c_int>,
    pub chmod:
        Option<unsafe extern "C" fn(path: *const c_char, mode: ModeT, fi: *mut FileInfo) -> c_int>,
    pub chown: Option<
        unsafe extern "C" fn(path: *const c_char, uid: UidT, gid: GidT, fi: *mut FileInfo) -> c_int,
    >,
    pub truncate:
        Option<unsafe extern "C" fn(path: *const c_char, size: OffT, fi: *mut FileInfo) -> c_int>,
    pub open: Option<unsafe extern "C" fn(path: *const c_char, fi: *mut FileInfo) -> c_int>,
    pub read: Option<
        unsafe extern "C" fn(
            path: *const c_char,
            buf: *mut c_char,
            size: usize,
            offset: OffT,
            fi: *mut FileInfo,
        ) -> c_int,
    >,
    pub write: Option<
        unsafe extern "C" fn(
            path: *const c_char,
            buf: *const c_char,
            size: usize,
            offset: OffT,
            fi: *mut FileInfo,
        ) -> c_int,
    >,
    pub statfs: Option<unsafe extern "C" fn(path: *const c_char, stbuf: *mut StatVfs) -> c_int>,
    pub flush: Option<unsafe extern "C" fn(path: *const c_char, fi: *mut FileInfo) -> c_int>,
    pub release: Option<unsafe extern "C" fn(path: *const c_char, fi: *mut FileInfo) -> c_int>,
    pub fsync: Option<
        unsafe extern "C" fn(path: *const c_char, datasync: c_int, fi: *mut FileInfo) -> c_int,
    >,
    pub setxattr: Option<SetxattrFn>,
    pub getxattr: Option<GetxattrFn>,
    pub listxattr:
        Option<unsafe extern "C" fn(path: *const c_char, list: *mut c_char, size: usize) -> c_int>,
    pub removexattr: Option<unsafe extern "C" fn(path: *const c_char, name: *const c_char) -> c_int>,
    pub opendir: Option<unsafe extern "C" fn(path: *const c_char, fi: *mut FileInfo) -> c_int>,
    pub readdir: Option<
        unsafe extern "C" fn(
            path: *const c_char,
            buf: *mut c_void,
            filler: Option<FillDir>,
            offset: OffT,
            fi: *mut FileInfo,
            flags: c_uint,
        ) -> c_int,
    >,
    pub releasedir: Option<unsafe extern "C" fn(path: *const c_char, fi: *mut FileInfo) -> c_int>,
    pub fsyncdir: Option<
        unsafe extern "C" fn(path: *const c_char, datasync: c_int, fi: *mut FileInfo) -> c_int,
    >,
    pub init: Option<unsafe extern "C" fn(conn: *mut ConnInfo, cfg: *mut FuseConfig) -> *mut c_void>,
    pub destroy: Option<unsafe extern "C" fn(private_data: *mut c_void)>,
    pub access: Option<unsafe extern "C" fn(path: *const c_char, mask: c_int) -> c_int>,
    pub create:
        Option<unsafe extern "C" fn(path: *const c_char, mode: ModeT, fi: *mut FileInfo) -> c_int>,
    pub lock: Option<
        unsafe extern "C" fn(
            path: *const c_char,
            fi: *mut FileInfo,
            cmd: c_int,
            lock: *mut c_void,
        ) -> c_int,
    >,
    pub utimens: Option<
        unsafe extern "C" fn(path: *const c_char, tv: *const Timespec, fi: *mut FileInfo) -> c_int,
    >,
    pub bmap:
        Option<unsafe extern "C" fn(path: *const c_char, blocksize: usize, idx: *mut u64) -> c_int>,
    pub ioctl: Option<
        unsafe extern "C" fn(
            path: *const c_char,
            cmd: c_uint,
            arg: *mut c_void,
            fi: *mut FileInfo,
            flags: c_uint,
            data: *mut c_void,
        ) -> c_int,
    >,
    pub poll: Option<
        unsafe extern "C" fn(
            path: *const c_char,
            fi: *mut FileInfo,
            ph: *mut c_void,
            reventsp: *mut c_uint,
        ) -> c_int,
    >,
    pub write_buf: Option<
        unsafe extern "C" fn(
            path: *const c_char,
            buf: *mut FuseBufVec,
            offset: OffT,
            fi: *mut FileInfo,
        ) -> c_int,
    >,
    pub read_buf: Option<
        unsafe extern "C" fn(
            path: *const c_char,
            bufp: *mut *mut FuseBufVec,
            size: usize,
            offset: OffT,
            fi: *mut FileInfo,
        ) -> c_int,
    >,
    pub flock: Option<unsafe extern "C" fn(path: *const c_char, fi: *mut FileInfo, op: c_int) -> c_int>,
    pub fallocate: Option<
        unsafe extern "C" fn(
            path: *const c_char,
            mode: c_int,
            offset: OffT,
            length: OffT,
            fi: *mut FileInfo,
        ) -> c_int,
    >,
    pub copy_file_range: Option<
        unsafe extern "C" fn(
            path_in: *const c_char,
            fi_in: *mut FileInfo,
            off_in: OffT,
            path_out: *const c_char,
            fi_out: *mut FileInfo,
            off_out: OffT,
            len: usize,
            flags: c_int,
        ) -> isize,
    >,
    pub lseek: Option<
        unsafe extern "C" fn(path: *const c_char, off: OffT, whence: c_int, fi: *mut FileInfo) -> OffT,
    >,
}

impl FuseOperations {
    /// Number of slots in the table.
    pub const SLOTS: usize = 42;

    /// Names of the populated slots, in table order.
    pub fn populated(&self) -> Vec<&'static str> {
        let slots: [(&'static str, bool); Self::SLOTS] = [
            ("getattr", self.getattr.is_some()),
            ("readlink", self.readlink.is_some()),
            ("mknod", self.mknod.is_some()),
            ("mkdir", self.mkdir.is_some()),
            ("unlink", self.unlink.is_some()),
            ("rmdir", self.rmdir.is_some()),
            ("symlink", self.symlink.is_some()),
            ("rename", self.rename.is_some()),
            ("link", self.link.is_some()),
            ("chmod", self.chmod.is_some()),
            ("chown", self.chown.is_some()),
            ("truncate", self.truncate.is_some()),
            ("open", self.open.is_some()),
            ("read", self.read.is_some()),
            ("write", self.write.is_some()),
            ("statfs", self.statfs.is_some()),
            ("flush", self.flush.is_some()),
            ("release", self.release.is_some()),
            ("fsync", self.fsync.is_some()),
            ("setxattr", self.setxattr.is_some()),
            ("getxattr", self.getxattr.is_some()),
            ("listxattr", self.listxattr.is_some()),
            ("removexattr", self.removexattr.is_some()),
            ("opendir", self.opendir.is_some()),
            ("readdir", self.readdir.is_some()),
            ("releasedir", self.releasedir.is_some()),
            ("fsyncdir", self.fsyncdir.is_some()),
            ("init", self.init.is_some()),
            ("destroy", self.destroy.is_some()),
            ("access", self.access.is_some()),
            ("create", self.create.is_some()),
            ("lock", self.lock.is_some()),
            ("utimens", self.utimens.is_some()),
            ("bmap", self.bmap.is_some()),
            ("ioctl", self.ioctl.is_some()),
            ("poll", self.poll.is_some()),
            ("write_buf", self.write_buf.is_some()),
            ("read_buf", self.read_buf.is_some()),
            ("flock", self.flock.is_some()),
            ("fallocate", self.fallocate.is_some()),
            ("copy_file_range", self.copy_file_range.is_some()),
            ("lseek", self.lseek.is_some()),
        ];
        slots
            .into_iter()
            .filter(|(_, set)| *set)
            .map(|(name, _)| name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    #[test]
    fn test_table_is_pointer_array() {
        let ptr = size_of::<*const c_void>();
        assert_eq!(size_of::<FuseOperations>(), FuseOperations::SLOTS * ptr);
        assert_eq!(offset_of!(FuseOperations, getattr), 0);
        assert_eq!(offset_of!(FuseOperations, setxattr), 19 * ptr);
        assert_eq!(offset_of!(FuseOperations, readdir), 24 * ptr);
        assert_eq!(offset_of!(FuseOperations, init), 27 * ptr);
        assert_eq!(offset_of!(FuseOperations, utimens), 32 * ptr);
        assert_eq!(offset_of!(FuseOperations, lseek), 41 * ptr);
    }

    #[test]
    fn test_default_table_is_empty() {
        assert!(FuseOperations::default().populated().is_empty());
    }
}
