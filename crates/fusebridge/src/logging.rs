//! Request logging decorator.

use std::fmt::Debug;

use fusebridge_abi::{ConnInfo, FileInfo, FuseConfig};
use tracing::debug;

use crate::error::FuseResult;
use crate::ops::{OpSet, Operations, PrivateData};
use crate::types::{Attrs, BufView, DirIter, FileRef, RawPtr, TimeValue};

/// Wraps an operation set and logs every call and its outcome at debug
/// level: `-> op path args` before, `<- op result` after.
pub struct LoggingOps<T> {
    inner: T,
}

impl<T: Operations> LoggingOps<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

fn logged<R: Debug>(op: &str, path: impl Debug, args: impl Debug, call: impl FnOnce() -> FuseResult<R>) -> FuseResult<R> {
    debug!("-> {op} {path:?} {args:?}");
    let result = call();
    match &result {
        Ok(value) => debug!("<- {op} {value:?}"),
        Err(err) => debug!("<- {op} {err}"),
    }
    result
}

/// Like [`logged`] but reports only the length of a byte result.
fn logged_bytes(op: &str, path: impl Debug, args: impl Debug, call: impl FnOnce() -> FuseResult<Vec<u8>>) -> FuseResult<Vec<u8>> {
    debug!("-> {op} {path:?} {args:?}");
    let result = call();
    match &result {
        Ok(data) => debug!("<- {op} {} bytes", data.len()),
        Err(err) => debug!("<- {op} {err}"),
    }
    result
}

impl<T: Operations> Operations for LoggingOps<T> {
    fn supported(&self) -> OpSet {
        self.inner.supported()
    }

    fn use_ns(&self) -> bool {
        self.inner.use_ns()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn getattr(&self, path: Option<&str>, fh: Option<FileRef<'_>>) -> FuseResult<Attrs> {
        logged("getattr", path, fh.map(|f| f.fh()), || self.inner.getattr(path, fh))
    }

    fn chmod(&self, path: &str, mode: u32, fh: Option<FileRef<'_>>) -> FuseResult<()> {
        logged("chmod", path, format_args!("{mode:o}"), || self.inner.chmod(path, mode, fh))
    }

    fn chown(&self, path: &str, uid: i64, gid: i64, fh: Option<FileRef<'_>>) -> FuseResult<()> {
        logged("chown", path, (uid, gid), || self.inner.chown(path, uid, gid, fh))
    }

    fn truncate(&self, path: Option<&str>, length: i64, fh: Option<FileRef<'_>>) -> FuseResult<()> {
        logged("truncate", path, length, || self.inner.truncate(path, length, fh))
    }

    fn utimens(&self, path: &str, times: Option<(TimeValue, TimeValue)>) -> FuseResult<()> {
        logged("utimens", path, times, || self.inner.utimens(path, times))
    }

    fn access(&self, path: &str, mask: i32) -> FuseResult<()> {
        logged("access", path, mask, || self.inner.access(path, mask))
    }

    fn statfs(&self, path: &str) -> FuseResult<Attrs> {
        logged("statfs", path, (), || self.inner.statfs(path))
    }

    fn readlink(&self, path: &str) -> FuseResult<String> {
        logged("readlink", path, (), || self.inner.readlink(path))
    }

    fn mknod(&self, path: &str, mode: u32, dev: u64) -> FuseResult<()> {
        logged("mknod", path, (mode, dev), || self.inner.mknod(path, mode, dev))
    }

    fn mkdir(&self, path: &str, mode: u32) -> FuseResult<()> {
        logged("mkdir", path, format_args!("{mode:o}"), || self.inner.mkdir(path, mode))
    }

    fn unlink(&self, path: &str) -> FuseResult<()> {
        logged("unlink", path, (), || self.inner.unlink(path))
    }

    fn rmdir(&self, path: &str) -> FuseResult<()> {
        logged("rmdir", path, (), || self.inner.rmdir(path))
    }

    fn symlink(&self, target: &str, source: &str) -> FuseResult<()> {
        logged("symlink", target, source, || self.inner.symlink(target, source))
    }

    fn rename(&self, old: &str, new: &str, flags: u32) -> FuseResult<()> {
        logged("rename", old, (new, flags), || self.inner.rename(old, new, flags))
    }

    fn link(&self, target: &str, source: &str) -> FuseResult<()> {
        logged("link", target, source, || self.inner.link(target, source))
    }

    fn open(&self, path: &str, flags: i32) -> FuseResult<u64> {
        logged("open", path, flags, || self.inner.open(path, flags))
    }

    fn open_raw(&self, path: &str, fi: &mut FileInfo) -> FuseResult<()> {
        logged("open", path, fi.flags, || self.inner.open_raw(path, fi))
    }

    fn create(&self, path: &str, mode: u32) -> FuseResult<u64> {
        logged("create", path, format_args!("{mode:o}"), || self.inner.create(path, mode))
    }

    fn create_raw(&self, path: &str, mode: u32, fi: &mut FileInfo) -> FuseResult<()> {
        logged("create", path, format_args!("{mode:o}"), || self.inner.create_raw(path, mode, fi))
    }

    fn read(&self, path: Option<&str>, size: usize, offset: i64, fh: FileRef<'_>) -> FuseResult<Vec<u8>> {
        logged_bytes("read", path, (size, offset, fh.fh()), || self.inner.read(path, size, offset, fh))
    }

    fn write(&self, path: Option<&str>, data: &[u8], offset: i64, fh: FileRef<'_>) -> FuseResult<usize> {
        logged("write", path, (data.len(), offset, fh.fh()), || self.inner.write(path, data, offset, fh))
    }

    fn flush(&self, path: Option<&str>, fh: FileRef<'_>) -> FuseResult<()> {
        logged("flush", path, fh.fh(), || self.inner.flush(path, fh))
    }

    fn release(&self, path: Option<&str>, fh: FileRef<'_>) -> FuseResult<()> {
        logged("release", path, fh.fh(), || self.inner.release(path, fh))
    }

    fn fsync(&self, path: Option<&str>, datasync: bool, fh: FileRef<'_>) -> FuseResult<()> {
        logged("fsync", path, (datasync, fh.fh()), || self.inner.fsync(path, datasync, fh))
    }

    fn lock(&self, path: Option<&str>, fh: FileRef<'_>, cmd: i32, lock: RawPtr) -> FuseResult<()> {
        logged("lock", path, (fh.fh(), cmd), || self.inner.lock(path, fh, cmd, lock))
    }

    fn flock(&self, path: Option<&str>, fh: FileRef<'_>, op: i32) -> FuseResult<()> {
        logged("flock", path, (fh.fh(), op), || self.inner.flock(path, fh, op))
    }

    fn fallocate(&self, path: Option<&str>, mode: i32, offset: i64, length: i64, fh: FileRef<'_>) -> FuseResult<()> {
        logged("fallocate", path, (mode, offset, length), || {
            self.inner.fallocate(path, mode, offset, length, fh)
        })
    }

    fn bmap(&self, path: &str, blocksize: usize, idx: u64) -> FuseResult<u64> {
        logged("bmap", path, (blocksize, idx), || self.inner.bmap(path, blocksize, idx))
    }

    fn ioctl(&self, path: Option<&str>, cmd: u32, arg: RawPtr, fh: FileRef<'_>, flags: u32, data: RawPtr) -> FuseResult<i32> {
        logged("ioctl", path, format_args!("{cmd:#x} {flags:#x}"), || {
            self.inner.ioctl(path, cmd, arg, fh, flags, data)
        })
    }

    fn poll(&self, path: Option<&str>, fh: FileRef<'_>, ph: RawPtr) -> FuseResult<u32> {
        logged("poll", path, fh.fh(), || self.inner.poll(path, fh, ph))
    }

    fn write_buf(&self, path: Option<&str>, buf: BufView<'_>, offset: i64, fh: FileRef<'_>) -> FuseResult<usize> {
        logged("write_buf", path, (buf.len(), offset, fh.fh()), || {
            self.inner.write_buf(path, buf, offset, fh)
        })
    }

    fn read_buf(&self, path: Option<&str>, size: usize, offset: i64, fh: FileRef<'_>) -> FuseResult<Vec<u8>> {
        logged_bytes("read_buf", path, (size, offset, fh.fh()), || {
            self.inner.read_buf(path, size, offset, fh)
        })
    }

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
        logged("copy_file_range", path_in, (offset_in, path_out, offset_out, len), || {
            self.inner
                .copy_file_range(path_in, fh_in, offset_in, path_out, fh_out, offset_out, len, flags)
        })
    }

    fn lseek(&self, path: Option<&str>, offset: i64, whence: i32, fh: FileRef<'_>) -> FuseResult<i64> {
        logged("lseek", path, (offset, whence), || self.inner.lseek(path, offset, whence, fh))
    }

    fn setxattr(&self, path: &str, name: &str, value: &[u8], flags: i32, position: u32) -> FuseResult<()> {
        logged("setxattr", path, (name, value.len(), flags), || {
            self.inner.setxattr(path, name, value, flags, position)
        })
    }

    fn getxattr(&self, path: &str, name: &str, position: u32) -> FuseResult<Vec<u8>> {
        logged_bytes("getxattr", path, name, || self.inner.getxattr(path, name, position))
    }

    fn listxattr(&self, path: &str) -> FuseResult<Vec<String>> {
        logged("listxattr", path, (), || self.inner.listxattr(path))
    }

    fn removexattr(&self, path: &str, name: &str) -> FuseResult<()> {
        logged("removexattr", path, name, || self.inner.removexattr(path, name))
    }

    fn opendir(&self, path: &str) -> FuseResult<u64> {
        logged("opendir", path, (), || self.inner.opendir(path))
    }

    fn readdir<'a>(&'a self, path: Option<&str>, offset: i64, fh: u64, flags: u32) -> FuseResult<DirIter<'a>> {
        debug!("-> readdir {path:?} {offset} {fh}");
        let result = self.inner.readdir(path, offset, fh, flags);
        if let Err(err) = &result {
            debug!("<- readdir {err}");
        }
        result
    }

    fn releasedir(&self, path: Option<&str>, fh: u64) -> FuseResult<()> {
        logged("releasedir", path, fh, || self.inner.releasedir(path, fh))
    }

    fn fsyncdir(&self, path: Option<&str>, datasync: bool, fh: u64) -> FuseResult<()> {
        logged("fsyncdir", path, (datasync, fh), || self.inner.fsyncdir(path, datasync, fh))
    }

    fn init(&self, conn: &mut ConnInfo, config: &mut FuseConfig) -> FuseResult<Option<PrivateData>> {
        debug!("-> init proto {}.{}", conn.proto_major, conn.proto_minor);
        let result = self.inner.init(conn, config);
        match &result {
            Ok(data) => debug!("<- init private data: {}", data.is_some()),
            Err(err) => debug!("<- init {err}"),
        }
        result
    }

    fn destroy(&self) -> FuseResult<()> {
        logged("destroy", (), (), || self.inner.destroy())
    }
}
