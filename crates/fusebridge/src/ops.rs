//! The operation-set contract.
//!
//! A filesystem is any `Operations` implementation. Every operation is a
//! provided method answering `ENOSYS`; an implementation overrides the ones
//! it supports and lists them in [`Operations::supported`]. That set is
//! read once when the dispatch table is built: slots outside it stay empty
//! and libfuse answers those requests itself.

use std::any::Any;
use std::sync::Arc;

use bitflags::bitflags;
use fusebridge_abi::{ConnInfo, FileInfo, FuseConfig};

use crate::error::{FuseError, FuseResult};
use crate::types::{Attrs, BufView, DirIter, FileRef, RawPtr, TimeValue};

/// Value returned by `init` and exposed through
/// [`session::private_data`](crate::session::private_data).
pub type PrivateData = Arc<dyn Any + Send + Sync>;

bitflags! {
    /// The operations an implementation provides, one bit per table slot.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OpSet: u64 {
        const GETATTR = 1 << 0;
        const READLINK = 1 << 1;
        const MKNOD = 1 << 2;
        const MKDIR = 1 << 3;
        const UNLINK = 1 << 4;
        const RMDIR = 1 << 5;
        const SYMLINK = 1 << 6;
        const RENAME = 1 << 7;
        const LINK = 1 << 8;
        const CHMOD = 1 << 9;
        const CHOWN = 1 << 10;
        const TRUNCATE = 1 << 11;
        const OPEN = 1 << 12;
        const READ = 1 << 13;
        const WRITE = 1 << 14;
        const STATFS = 1 << 15;
        const FLUSH = 1 << 16;
        const RELEASE = 1 << 17;
        const FSYNC = 1 << 18;
        const SETXATTR = 1 << 19;
        const GETXATTR = 1 << 20;
        const LISTXATTR = 1 << 21;
        const REMOVEXATTR = 1 << 22;
        const OPENDIR = 1 << 23;
        const READDIR = 1 << 24;
        const RELEASEDIR = 1 << 25;
        const FSYNCDIR = 1 << 26;
        const INIT = 1 << 27;
        const DESTROY = 1 << 28;
        const ACCESS = 1 << 29;
        const CREATE = 1 << 30;
        const LOCK = 1 << 31;
        const UTIMENS = 1 << 32;
        const BMAP = 1 << 33;
        const IOCTL = 1 << 34;
        const POLL = 1 << 35;
        const WRITE_BUF = 1 << 36;
        const READ_BUF = 1 << 37;
        const FLOCK = 1 << 38;
        const FALLOCATE = 1 << 39;
        const COPY_FILE_RANGE = 1 << 40;
        const LSEEK = 1 << 41;
    }
}

impl OpSet {
    /// Look up an operation by its lowercase name (`"getattr"`).
    pub fn from_op_name(name: &str) -> Option<Self> {
        Self::from_name(&name.to_ascii_uppercase())
    }

    /// Lowercase names of the operations in the set, in table order.
    pub fn op_names(&self) -> Vec<String> {
        self.iter_names()
            .map(|(name, _)| name.to_ascii_lowercase())
            .collect()
    }
}

/// A user-space filesystem.
///
/// Paths are absolute within the mount (`/dir/file`). Arguments typed
/// `Option<&str>` may be absent when libfuse services a request on an open
/// file whose path is no longer known.
///
/// Methods are called concurrently from libfuse's worker threads unless
/// the mount is single-threaded; implementations serialise their own
/// state.
#[allow(unused_variables)]
pub trait Operations: Send + Sync {
    /// Operations this implementation provides.
    fn supported(&self) -> OpSet;

    /// Timestamps as integer nanoseconds instead of float seconds.
    fn use_ns(&self) -> bool {
        false
    }

    /// Default `fsname` mount option.
    fn name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        let base = full.split('<').next().unwrap_or(full);
        base.rsplit("::").next().unwrap_or(base)
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    /// Attributes of `path` as a dictionary of `stat` field names.
    ///
    /// `fh` is present when the kernel asks about an open file.
    fn getattr(&self, path: Option<&str>, fh: Option<FileRef<'_>>) -> FuseResult<Attrs> {
        Err(FuseError::unimplemented())
    }

    fn chmod(&self, path: &str, mode: u32, fh: Option<FileRef<'_>>) -> FuseResult<()> {
        Err(FuseError::unimplemented())
    }

    /// Change ownership. `-1` leaves the id unchanged.
    fn chown(&self, path: &str, uid: i64, gid: i64, fh: Option<FileRef<'_>>) -> FuseResult<()> {
        Err(FuseError::unimplemented())
    }

    fn truncate(&self, path: Option<&str>, length: i64, fh: Option<FileRef<'_>>) -> FuseResult<()> {
        Err(FuseError::unimplemented())
    }

    /// Set access and modification times; `None` means "now".
    fn utimens(&self, path: &str, times: Option<(TimeValue, TimeValue)>) -> FuseResult<()> {
        Err(FuseError::unimplemented())
    }

    fn access(&self, path: &str, mask: i32) -> FuseResult<()> {
        Err(FuseError::unimplemented())
    }

    /// Filesystem statistics as a dictionary of `statvfs` field names.
    fn statfs(&self, path: &str) -> FuseResult<Attrs> {
        Err(FuseError::unimplemented())
    }

    // ========================================================================
    // Namespace
    // ========================================================================

    fn readlink(&self, path: &str) -> FuseResult<String> {
        Err(FuseError::unimplemented())
    }

    fn mknod(&self, path: &str, mode: u32, dev: u64) -> FuseResult<()> {
        Err(FuseError::unimplemented())
    }

    fn mkdir(&self, path: &str, mode: u32) -> FuseResult<()> {
        Err(FuseError::unimplemented())
    }

    fn unlink(&self, path: &str) -> FuseResult<()> {
        Err(FuseError::unimplemented())
    }

    fn rmdir(&self, path: &str) -> FuseResult<()> {
        Err(FuseError::unimplemented())
    }

    /// Create the symbolic link `target` whose content is `source`
    /// (`ln -s source target`).
    fn symlink(&self, target: &str, source: &str) -> FuseResult<()> {
        Err(FuseError::unimplemented())
    }

    /// `flags` carries `RENAME_NOREPLACE` / `RENAME_EXCHANGE`.
    fn rename(&self, old: &str, new: &str, flags: u32) -> FuseResult<()> {
        Err(FuseError::unimplemented())
    }

    /// Create the hard link `target` to the existing `source`
    /// (`ln source target`).
    fn link(&self, target: &str, source: &str) -> FuseResult<()> {
        Err(FuseError::unimplemented())
    }

    // ========================================================================
    // Files
    // ========================================================================

    /// Open `path` and return the handle later requests will carry.
    fn open(&self, path: &str, flags: i32) -> FuseResult<u64> {
        Err(FuseError::unimplemented())
    }

    /// `open` for `raw_fi` mounts: set `fi.fh` and any cache bits directly.
    fn open_raw(&self, path: &str, fi: &mut FileInfo) -> FuseResult<()> {
        fi.fh = self.open(path, fi.flags)?;
        Ok(())
    }

    /// Create and open `path`, returning its handle.
    fn create(&self, path: &str, mode: u32) -> FuseResult<u64> {
        Err(FuseError::unimplemented())
    }

    /// `create` for `raw_fi` mounts.
    fn create_raw(&self, path: &str, mode: u32, fi: &mut FileInfo) -> FuseResult<()> {
        fi.fh = self.create(path, mode)?;
        Ok(())
    }

    /// Read at most `size` bytes. Returning more is a contract violation;
    /// returning fewer signals end of file.
    fn read(&self, path: Option<&str>, size: usize, offset: i64, fh: FileRef<'_>) -> FuseResult<Vec<u8>> {
        Err(FuseError::unimplemented())
    }

    /// Write `data`; returns the number of bytes written.
    fn write(&self, path: Option<&str>, data: &[u8], offset: i64, fh: FileRef<'_>) -> FuseResult<usize> {
        Err(FuseError::unimplemented())
    }

    fn flush(&self, path: Option<&str>, fh: FileRef<'_>) -> FuseResult<()> {
        Err(FuseError::unimplemented())
    }

    fn release(&self, path: Option<&str>, fh: FileRef<'_>) -> FuseResult<()> {
        Err(FuseError::unimplemented())
    }

    fn fsync(&self, path: Option<&str>, datasync: bool, fh: FileRef<'_>) -> FuseResult<()> {
        Err(FuseError::unimplemented())
    }

    /// POSIX record lock; `lock` is the native `struct flock`.
    fn lock(&self, path: Option<&str>, fh: FileRef<'_>, cmd: i32, lock: RawPtr) -> FuseResult<()> {
        Err(FuseError::unimplemented())
    }

    fn flock(&self, path: Option<&str>, fh: FileRef<'_>, op: i32) -> FuseResult<()> {
        Err(FuseError::unimplemented())
    }

    fn fallocate(
        &self,
        path: Option<&str>,
        mode: i32,
        offset: i64,
        length: i64,
        fh: FileRef<'_>,
    ) -> FuseResult<()> {
        Err(FuseError::unimplemented())
    }

    /// Map a file block index to a device block index.
    fn bmap(&self, path: &str, blocksize: usize, idx: u64) -> FuseResult<u64> {
        Err(FuseError::unimplemented())
    }

    /// `arg` and `data` are the native pointers; the return value is the
    /// ioctl result.
    fn ioctl(
        &self,
        path: Option<&str>,
        cmd: u32,
        arg: RawPtr,
        fh: FileRef<'_>,
        flags: u32,
        data: RawPtr,
    ) -> FuseResult<i32> {
        Err(FuseError::unimplemented())
    }

    /// Returns the ready events. `ph` is the native poll handle.
    fn poll(&self, path: Option<&str>, fh: FileRef<'_>, ph: RawPtr) -> FuseResult<u32> {
        Err(FuseError::unimplemented())
    }

    /// Scatter/gather write; returns the number of bytes written.
    fn write_buf(&self, path: Option<&str>, buf: BufView<'_>, offset: i64, fh: FileRef<'_>) -> FuseResult<usize> {
        Err(FuseError::unimplemented())
    }

    /// Zero-copy read; the adapter moves the bytes into a native-owned
    /// buffer vector. Same size rule as [`Operations::read`].
    fn read_buf(&self, path: Option<&str>, size: usize, offset: i64, fh: FileRef<'_>) -> FuseResult<Vec<u8>> {
        Err(FuseError::unimplemented())
    }

    #[allow(clippy::too_many_arguments)]
    fn copy_file_range(
        &self,
        path_in: Option<&str>,
        fh_in: FileRef<'_>,
        offset_in: i64,
        path_out: Option<&str>,
        fh_out: FileRef<'_>,
        offset_out: i64,
        len: usize,
        flags: i32,
    ) -> FuseResult<usize> {
        Err(FuseError::unimplemented())
    }

    /// Returns the new offset (`SEEK_DATA` / `SEEK_HOLE` support).
    fn lseek(&self, path: Option<&str>, offset: i64, whence: i32, fh: FileRef<'_>) -> FuseResult<i64> {
        Err(FuseError::unimplemented())
    }

    // ========================================================================
    // Extended attributes
    // ========================================================================

    /// `position` is only nonzero on macOS (resource forks).
    fn setxattr(&self, path: &str, name: &str, value: &[u8], flags: i32, position: u32) -> FuseResult<()> {
        Err(FuseError::unimplemented())
    }

    /// The whole value. The adapter handles size queries and `ERANGE`.
    fn getxattr(&self, path: &str, name: &str, position: u32) -> FuseResult<Vec<u8>> {
        Err(FuseError::unimplemented())
    }

    fn listxattr(&self, path: &str) -> FuseResult<Vec<String>> {
        Err(FuseError::unimplemented())
    }

    fn removexattr(&self, path: &str, name: &str) -> FuseResult<()> {
        Err(FuseError::unimplemented())
    }

    // ========================================================================
    // Directories
    // ========================================================================

    /// Open a directory and return its handle.
    fn opendir(&self, path: &str) -> FuseResult<u64> {
        Err(FuseError::unimplemented())
    }

    /// Lazily list a directory from `offset`.
    ///
    /// The listing is abandoned when the reply buffer fills; libfuse asks
    /// again with the offset of the last entry it accepted.
    fn readdir<'a>(
        &'a self,
        path: Option<&str>,
        offset: i64,
        fh: u64,
        flags: u32,
    ) -> FuseResult<DirIter<'a>> {
        Err(FuseError::unimplemented())
    }

    fn releasedir(&self, path: Option<&str>, fh: u64) -> FuseResult<()> {
        Err(FuseError::unimplemented())
    }

    fn fsyncdir(&self, path: Option<&str>, datasync: bool, fh: u64) -> FuseResult<()> {
        Err(FuseError::unimplemented())
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Called once before the first request. May adjust `conn` and
    /// `config`. Failure is logged and ignored.
    fn init(&self, conn: &mut ConnInfo, config: &mut FuseConfig) -> FuseResult<Option<PrivateData>> {
        Ok(None)
    }

    /// Called once when the session ends.
    fn destroy(&self) -> FuseResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nothing;

    impl Operations for Nothing {
        fn supported(&self) -> OpSet {
            OpSet::empty()
        }
    }

    struct Wrapper<T>(T);

    impl<T: Send + Sync> Operations for Wrapper<T> {
        fn supported(&self) -> OpSet {
            OpSet::GETATTR
        }
    }

    #[test]
    fn test_default_name() {
        assert_eq!(Nothing.name(), "Nothing");
        assert_eq!(Wrapper(Nothing).name(), "Wrapper");
    }

    #[test]
    fn test_defaults_are_enosys() {
        let ops = Nothing;
        assert_eq!(ops.getattr(Some("/"), None).unwrap_err().code(), Some(libc::ENOSYS));
        assert_eq!(ops.open("/f", 0).unwrap_err().code(), Some(libc::ENOSYS));
        let mut fi = FileInfo::default();
        assert_eq!(ops.open_raw("/f", &mut fi).unwrap_err().code(), Some(libc::ENOSYS));
        assert!(!ops.use_ns());
    }

    #[test]
    fn test_op_names() {
        assert_eq!(OpSet::from_op_name("copy_file_range"), Some(OpSet::COPY_FILE_RANGE));
        assert_eq!(OpSet::from_op_name("nope"), None);
        assert_eq!(
            (OpSet::GETATTR | OpSet::READDIR).op_names(),
            vec!["getattr".to_string(), "readdir".to_string()]
        );
        assert_eq!(OpSet::all().bits().count_ones(), 42);
    }
}
