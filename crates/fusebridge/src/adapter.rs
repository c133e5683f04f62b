//! Per-operation adapters.
//!
//! [`Bridge`] is the per-session state libfuse carries as the context's
//! `private_data`. Each method decodes the native arguments of one table
//! slot, calls the operation set and encodes the result back into the
//! caller's buffers. Methods return `FuseResult`; the trampolines run them
//! under [`fault::guard`](crate::fault::guard), which owns the errno
//! convention.

use std::cmp::min;
use std::ffi::{CStr, CString, c_char, c_int, c_uint, c_void};
use std::ptr;
use std::sync::OnceLock;

use fusebridge_abi::consts::{GID_UNCHANGED, UID_UNCHANGED};
use fusebridge_abi::{
    ConnInfo, DevT, FileInfo, FillDir, FuseBufVec, FuseConfig, GidT, ModeT, OffT, Stat, StatVfs,
    Timespec, TimespecField, UidT,
};
use tracing::warn;

use crate::encoding::Encoding;
use crate::error::{FuseError, FuseResult};
use crate::fault::{Fault, FaultPolicy};
use crate::ops::{Operations, PrivateData};
use crate::types::{AttrValue, BufView, FileRef, RawPtr};

/// Adapter state for one mounted session.
pub struct Bridge {
    ops: Box<dyn Operations>,
    raw_fi: bool,
    encoding: Encoding,
    use_ns: bool,
    policy: FaultPolicy,
    fault: OnceLock<Fault>,
    private: OnceLock<PrivateData>,
}

impl Bridge {
    pub(crate) fn new(ops: Box<dyn Operations>, raw_fi: bool, encoding: Encoding, policy: FaultPolicy) -> Self {
        let use_ns = ops.use_ns();
        Self {
            ops,
            raw_fi,
            encoding,
            use_ns,
            policy,
            fault: OnceLock::new(),
            private: OnceLock::new(),
        }
    }

    pub(crate) fn policy(&self) -> FaultPolicy {
        self.policy
    }

    /// Record the session's fatal fault. Only the first one sticks; returns
    /// whether this call recorded it.
    pub(crate) fn record_fault(&self, fault: Fault) -> bool {
        self.fault.set(fault).is_ok()
    }

    pub(crate) fn fault(&self) -> Option<Fault> {
        self.fault.get().cloned()
    }

    pub(crate) fn has_fault(&self) -> bool {
        self.fault.get().is_some()
    }

    pub(crate) fn private_data(&self) -> Option<PrivateData> {
        self.private.get().cloned()
    }

    // ========================================================================
    // Argument decoding
    // ========================================================================

    unsafe fn decode(&self, ptr: *const c_char) -> FuseResult<Option<String>> {
        if ptr.is_null() {
            return Ok(None);
        }
        let bytes = unsafe { CStr::from_ptr(ptr) }.to_bytes();
        self.encoding.decode(bytes).map(Some)
    }

    unsafe fn required(&self, ptr: *const c_char, what: &str) -> FuseResult<String> {
        unsafe { self.decode(ptr) }?.ok_or_else(|| FuseError::violation(format!("null {what}")))
    }

    unsafe fn file_ref<'a>(&self, fi: *mut FileInfo) -> FileRef<'a> {
        unsafe { self.file_ref_opt(fi) }.unwrap_or(FileRef::Handle(0))
    }

    unsafe fn file_ref_opt<'a>(&self, fi: *mut FileInfo) -> Option<FileRef<'a>> {
        let fi = unsafe { fi.as_ref() }?;
        Some(if self.raw_fi {
            FileRef::Info(fi)
        } else {
            FileRef::Handle(fi.fh)
        })
    }

    fn encode_c(&self, text: &str, what: &str) -> FuseResult<CString> {
        CString::new(self.encoding.encode(text)?)
            .map_err(|_| FuseError::violation(format!("{what} contains NUL: {text:?}")))
    }

    fn status(len: usize) -> FuseResult<c_int> {
        c_int::try_from(len).map_err(|_| FuseError::violation(format!("length {len} overflows the native status")))
    }

    /// Two-phase size-query copy shared by getxattr and listxattr.
    unsafe fn copy_sized(data: &[u8], dst: *mut c_char, size: usize) -> FuseResult<c_int> {
        if dst.is_null() || size == 0 {
            return Self::status(data.len());
        }
        if data.len() > size {
            return Err(FuseError::range());
        }
        unsafe { ptr::copy_nonoverlapping(data.as_ptr(), dst.cast::<u8>(), data.len()) };
        Self::status(data.len())
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    pub(crate) unsafe fn getattr(&self, path: *const c_char, st: *mut Stat, fi: *mut FileInfo) -> FuseResult<c_int> {
        let path = unsafe { self.decode(path) }?;
        let fh = unsafe { self.file_ref_opt(fi) };
        let attrs = self.ops.getattr(path.as_deref(), fh)?;
        let st = unsafe { st.as_mut() }.ok_or_else(|| FuseError::violation("null stat buffer"))?;
        *st = Stat::default();
        attrs.apply_stat(st, self.use_ns);
        Ok(0)
    }

    pub(crate) unsafe fn chmod(&self, path: *const c_char, mode: ModeT, fi: *mut FileInfo) -> FuseResult<c_int> {
        let path = unsafe { self.required(path, "path") }?;
        self.ops.chmod(&path, mode as u32, unsafe { self.file_ref_opt(fi) })?;
        Ok(0)
    }

    pub(crate) unsafe fn chown(&self, path: *const c_char, uid: UidT, gid: GidT, fi: *mut FileInfo) -> FuseResult<c_int> {
        let path = unsafe { self.required(path, "path") }?;
        let uid = if uid == UID_UNCHANGED { -1 } else { uid as i64 };
        let gid = if gid == GID_UNCHANGED { -1 } else { gid as i64 };
        self.ops.chown(&path, uid, gid, unsafe { self.file_ref_opt(fi) })?;
        Ok(0)
    }

    pub(crate) unsafe fn truncate(&self, path: *const c_char, length: OffT, fi: *mut FileInfo) -> FuseResult<c_int> {
        let path = unsafe { self.decode(path) }?;
        self.ops.truncate(path.as_deref(), length, unsafe { self.file_ref_opt(fi) })?;
        Ok(0)
    }

    pub(crate) unsafe fn utimens(&self, path: *const c_char, tv: *const Timespec, _fi: *mut FileInfo) -> FuseResult<c_int> {
        let path = unsafe { self.required(path, "path") }?;
        let times = if tv.is_null() {
            None
        } else {
            let (atime, mtime) = unsafe { (*tv, *tv.add(1)) };
            let (asec, ansec) = atime.parts();
            let (msec, mnsec) = mtime.parts();
            Some((
                AttrValue::from_timespec(asec, ansec, self.use_ns)?,
                AttrValue::from_timespec(msec, mnsec, self.use_ns)?,
            ))
        };
        self.ops.utimens(&path, times)?;
        Ok(0)
    }

    pub(crate) unsafe fn access(&self, path: *const c_char, mask: c_int) -> FuseResult<c_int> {
        let path = unsafe { self.required(path, "path") }?;
        self.ops.access(&path, mask)?;
        Ok(0)
    }

    pub(crate) unsafe fn statfs(&self, path: *const c_char, stv: *mut StatVfs) -> FuseResult<c_int> {
        let path = unsafe { self.required(path, "path") }?;
        let attrs = self.ops.statfs(&path)?;
        let stv = unsafe { stv.as_mut() }.ok_or_else(|| FuseError::violation("null statvfs buffer"))?;
        *stv = StatVfs::default();
        attrs.apply_statvfs(stv);
        Ok(0)
    }

    // ========================================================================
    // Namespace
    // ========================================================================

    /// Copies the target NUL-terminated, truncated to `size - 1` bytes.
    pub(crate) unsafe fn readlink(&self, path: *const c_char, buf: *mut c_char, size: usize) -> FuseResult<c_int> {
        let path = unsafe { self.required(path, "path") }?;
        let target = self.encoding.encode(&self.ops.readlink(&path)?)?;
        if buf.is_null() || size == 0 {
            return Err(FuseError::violation("readlink buffer is empty"));
        }
        let len = min(target.len(), size - 1);
        unsafe {
            ptr::copy_nonoverlapping(target.as_ptr(), buf.cast::<u8>(), len);
            *buf.add(len) = 0;
        }
        Ok(0)
    }

    pub(crate) unsafe fn mknod(&self, path: *const c_char, mode: ModeT, dev: DevT) -> FuseResult<c_int> {
        let path = unsafe { self.required(path, "path") }?;
        self.ops.mknod(&path, mode as u32, dev as u64)?;
        Ok(0)
    }

    pub(crate) unsafe fn mkdir(&self, path: *const c_char, mode: ModeT) -> FuseResult<c_int> {
        let path = unsafe { self.required(path, "path") }?;
        self.ops.mkdir(&path, mode as u32)?;
        Ok(0)
    }

    pub(crate) unsafe fn unlink(&self, path: *const c_char) -> FuseResult<c_int> {
        let path = unsafe { self.required(path, "path") }?;
        self.ops.unlink(&path)?;
        Ok(0)
    }

    pub(crate) unsafe fn rmdir(&self, path: *const c_char) -> FuseResult<c_int> {
        let path = unsafe { self.required(path, "path") }?;
        self.ops.rmdir(&path)?;
        Ok(0)
    }

    /// Native order is (link content, new link path); the contract takes
    /// (target, source).
    pub(crate) unsafe fn symlink(&self, source: *const c_char, target: *const c_char) -> FuseResult<c_int> {
        let source = unsafe { self.required(source, "symlink source") }?;
        let target = unsafe { self.required(target, "symlink target") }?;
        self.ops.symlink(&target, &source)?;
        Ok(0)
    }

    pub(crate) unsafe fn rename(&self, old: *const c_char, new: *const c_char, flags: c_uint) -> FuseResult<c_int> {
        let old = unsafe { self.required(old, "rename source") }?;
        let new = unsafe { self.required(new, "rename target") }?;
        self.ops.rename(&old, &new, flags)?;
        Ok(0)
    }

    /// Native order is (existing, new link); the contract takes
    /// (target, source).
    pub(crate) unsafe fn link(&self, source: *const c_char, target: *const c_char) -> FuseResult<c_int> {
        let source = unsafe { self.required(source, "link source") }?;
        let target = unsafe { self.required(target, "link target") }?;
        self.ops.link(&target, &source)?;
        Ok(0)
    }

    // ========================================================================
    // Files
    // ========================================================================

    pub(crate) unsafe fn open(&self, path: *const c_char, fi: *mut FileInfo) -> FuseResult<c_int> {
        let path = unsafe { self.required(path, "path") }?;
        let fi = unsafe { fi.as_mut() }.ok_or_else(|| FuseError::violation("null file info"))?;
        if self.raw_fi {
            self.ops.open_raw(&path, fi)?;
        } else {
            fi.fh = self.ops.open(&path, fi.flags)?;
        }
        Ok(0)
    }

    pub(crate) unsafe fn create(&self, path: *const c_char, mode: ModeT, fi: *mut FileInfo) -> FuseResult<c_int> {
        let path = unsafe { self.required(path, "path") }?;
        let fi = unsafe { fi.as_mut() }.ok_or_else(|| FuseError::violation("null file info"))?;
        if self.raw_fi {
            self.ops.create_raw(&path, mode as u32, fi)?;
        } else {
            fi.fh = self.ops.create(&path, mode as u32)?;
        }
        Ok(0)
    }

    pub(crate) unsafe fn read(
        &self,
        path: *const c_char,
        buf: *mut c_char,
        size: usize,
        offset: OffT,
        fi: *mut FileInfo,
    ) -> FuseResult<c_int> {
        let path = unsafe { self.decode(path) }?;
        let data = self.ops.read(path.as_deref(), size, offset, unsafe { self.file_ref(fi) })?;
        if data.is_empty() {
            return Ok(0);
        }
        if data.len() > size {
            return Err(FuseError::violation(format!(
                "read returned {} bytes, {size} requested",
                data.len()
            )));
        }
        if buf.is_null() {
            return Err(FuseError::violation("null read buffer"));
        }
        unsafe { ptr::copy_nonoverlapping(data.as_ptr(), buf.cast::<u8>(), data.len()) };
        Self::status(data.len())
    }

    pub(crate) unsafe fn write(
        &self,
        path: *const c_char,
        buf: *const c_char,
        size: usize,
        offset: OffT,
        fi: *mut FileInfo,
    ) -> FuseResult<c_int> {
        let path = unsafe { self.decode(path) }?;
        let data: &[u8] = if size == 0 {
            &[]
        } else if buf.is_null() {
            return Err(FuseError::violation("null write buffer"));
        } else {
            unsafe { std::slice::from_raw_parts(buf.cast::<u8>(), size) }
        };
        let written = self.ops.write(path.as_deref(), data, offset, unsafe { self.file_ref(fi) })?;
        Self::status(written)
    }

    pub(crate) unsafe fn flush(&self, path: *const c_char, fi: *mut FileInfo) -> FuseResult<c_int> {
        let path = unsafe { self.decode(path) }?;
        self.ops.flush(path.as_deref(), unsafe { self.file_ref(fi) })?;
        Ok(0)
    }

    pub(crate) unsafe fn release(&self, path: *const c_char, fi: *mut FileInfo) -> FuseResult<c_int> {
        let path = unsafe { self.decode(path) }?;
        self.ops.release(path.as_deref(), unsafe { self.file_ref(fi) })?;
        Ok(0)
    }

    pub(crate) unsafe fn fsync(&self, path: *const c_char, datasync: c_int, fi: *mut FileInfo) -> FuseResult<c_int> {
        let path = unsafe { self.decode(path) }?;
        self.ops.fsync(path.as_deref(), datasync != 0, unsafe { self.file_ref(fi) })?;
        Ok(0)
    }

    pub(crate) unsafe fn lock(&self, path: *const c_char, fi: *mut FileInfo, cmd: c_int, lock: *mut c_void) -> FuseResult<c_int> {
        let path = unsafe { self.decode(path) }?;
        self.ops.lock(path.as_deref(), unsafe { self.file_ref(fi) }, cmd, RawPtr::new(lock))?;
        Ok(0)
    }

    pub(crate) unsafe fn flock(&self, path: *const c_char, fi: *mut FileInfo, op: c_int) -> FuseResult<c_int> {
        let path = unsafe { self.decode(path) }?;
        self.ops.flock(path.as_deref(), unsafe { self.file_ref(fi) }, op)?;
        Ok(0)
    }

    pub(crate) unsafe fn fallocate(
        &self,
        path: *const c_char,
        mode: c_int,
        offset: OffT,
        length: OffT,
        fi: *mut FileInfo,
    ) -> FuseResult<c_int> {
        let path = unsafe { self.decode(path) }?;
        self.ops.fallocate(path.as_deref(), mode, offset, length, unsafe { self.file_ref(fi) })?;
        Ok(0)
    }

    pub(crate) unsafe fn bmap(&self, path: *const c_char, blocksize: usize, idx: *mut u64) -> FuseResult<c_int> {
        let path = unsafe { self.required(path, "path") }?;
        let idx = unsafe { idx.as_mut() }.ok_or_else(|| FuseError::violation("null block index"))?;
        *idx = self.ops.bmap(&path, blocksize, *idx)?;
        Ok(0)
    }

    pub(crate) unsafe fn ioctl(
        &self,
        path: *const c_char,
        cmd: c_uint,
        arg: *mut c_void,
        fi: *mut FileInfo,
        flags: c_uint,
        data: *mut c_void,
    ) -> FuseResult<c_int> {
        let path = unsafe { self.decode(path) }?;
        self.ops.ioctl(
            path.as_deref(),
            cmd,
            RawPtr::new(arg),
            unsafe { self.file_ref(fi) },
            flags,
            RawPtr::new(data),
        )
    }

    pub(crate) unsafe fn poll(
        &self,
        path: *const c_char,
        fi: *mut FileInfo,
        ph: *mut c_void,
        reventsp: *mut c_uint,
    ) -> FuseResult<c_int> {
        let path = unsafe { self.decode(path) }?;
        let revents = self.ops.poll(path.as_deref(), unsafe { self.file_ref(fi) }, RawPtr::new(ph))?;
        if let Some(out) = unsafe { reventsp.as_mut() } {
            *out = revents;
        }
        Ok(0)
    }

    /// The count the operation set reports must not exceed what the
    /// vector describes.
    pub(crate) unsafe fn write_buf(
        &self,
        path: *const c_char,
        bufv: *mut FuseBufVec,
        offset: OffT,
        fi: *mut FileInfo,
    ) -> FuseResult<c_int> {
        let path = unsafe { self.decode(path) }?;
        let view = unsafe { BufView::from_raw(bufv) }?;
        let available = unsafe { FuseBufVec::total_size(bufv) };
        let written = self.ops.write_buf(path.as_deref(), view, offset, unsafe { self.file_ref(fi) })?;
        if written > available {
            return Err(FuseError::violation(format!(
                "write_buf reported {written} bytes of {available}"
            )));
        }
        Self::status(written)
    }

    /// Hands libfuse a `malloc`ed single-buffer vector; libfuse frees both
    /// the vector and its memory.
    pub(crate) unsafe fn read_buf(
        &self,
        path: *const c_char,
        bufp: *mut *mut FuseBufVec,
        size: usize,
        offset: OffT,
        fi: *mut FileInfo,
    ) -> FuseResult<c_int> {
        let path = unsafe { self.decode(path) }?;
        if bufp.is_null() {
            return Err(FuseError::violation("null buffer vector slot"));
        }
        let data = self.ops.read_buf(path.as_deref(), size, offset, unsafe { self.file_ref(fi) })?;
        if data.len() > size {
            return Err(FuseError::violation(format!(
                "read_buf returned {} bytes, {size} requested",
                data.len()
            )));
        }
        unsafe {
            let mem = libc::malloc(data.len().max(1));
            if mem.is_null() {
                return Err(FuseError::errno(libc::ENOMEM));
            }
            let vec = libc::malloc(std::mem::size_of::<FuseBufVec>()).cast::<FuseBufVec>();
            if vec.is_null() {
                libc::free(mem);
                return Err(FuseError::errno(libc::ENOMEM));
            }
            ptr::copy_nonoverlapping(data.as_ptr(), mem.cast::<u8>(), data.len());
            vec.write(FuseBufVec::single(mem, data.len()));
            *bufp = vec;
        }
        Ok(0)
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) unsafe fn copy_file_range(
        &self,
        path_in: *const c_char,
        fi_in: *mut FileInfo,
        offset_in: OffT,
        path_out: *const c_char,
        fi_out: *mut FileInfo,
        offset_out: OffT,
        len: usize,
        flags: c_int,
    ) -> FuseResult<isize> {
        let path_in = unsafe { self.decode(path_in) }?;
        let path_out = unsafe { self.decode(path_out) }?;
        let copied = self.ops.copy_file_range(
            path_in.as_deref(),
            unsafe { self.file_ref(fi_in) },
            offset_in,
            path_out.as_deref(),
            unsafe { self.file_ref(fi_out) },
            offset_out,
            len,
            flags,
        )?;
        isize::try_from(copied).map_err(|_| FuseError::violation(format!("copy_file_range reported {copied} bytes")))
    }

    pub(crate) unsafe fn lseek(&self, path: *const c_char, offset: OffT, whence: c_int, fi: *mut FileInfo) -> FuseResult<OffT> {
        let path = unsafe { self.decode(path) }?;
        self.ops.lseek(path.as_deref(), offset, whence, unsafe { self.file_ref(fi) })
    }

    // ========================================================================
    // Extended attributes
    // ========================================================================

    pub(crate) unsafe fn setxattr(
        &self,
        path: *const c_char,
        name: *const c_char,
        value: *const c_char,
        size: usize,
        flags: c_int,
        position: u32,
    ) -> FuseResult<c_int> {
        let path = unsafe { self.required(path, "path") }?;
        let name = unsafe { self.required(name, "attribute name") }?;
        let value: &[u8] = if size == 0 || value.is_null() {
            &[]
        } else {
            unsafe { std::slice::from_raw_parts(value.cast::<u8>(), size) }
        };
        self.ops.setxattr(&path, &name, value, flags, position)?;
        Ok(0)
    }

    /// Null or zero-sized destination: return the value length only.
    /// Too small: `ERANGE`. Otherwise copy without a terminator.
    pub(crate) unsafe fn getxattr(
        &self,
        path: *const c_char,
        name: *const c_char,
        value: *mut c_char,
        size: usize,
        position: u32,
    ) -> FuseResult<c_int> {
        let path = unsafe { self.required(path, "path") }?;
        let name = unsafe { self.required(name, "attribute name") }?;
        let data = self.ops.getxattr(&path, &name, position)?;
        unsafe { Self::copy_sized(&data, value, size) }
    }

    /// Names joined by NUL, with a trailing NUL when non-empty; same size
    /// protocol as getxattr.
    pub(crate) unsafe fn listxattr(&self, path: *const c_char, list: *mut c_char, size: usize) -> FuseResult<c_int> {
        let path = unsafe { self.required(path, "path") }?;
        let names = self.ops.listxattr(&path)?;
        let mut joined = Vec::new();
        for name in &names {
            joined.extend_from_slice(&self.encoding.encode(name)?);
            joined.push(0);
        }
        unsafe { Self::copy_sized(&joined, list, size) }
    }

    pub(crate) unsafe fn removexattr(&self, path: *const c_char, name: *const c_char) -> FuseResult<c_int> {
        let path = unsafe { self.required(path, "path") }?;
        let name = unsafe { self.required(name, "attribute name") }?;
        self.ops.removexattr(&path, &name)?;
        Ok(0)
    }

    // ========================================================================
    // Directories
    // ========================================================================

    pub(crate) unsafe fn opendir(&self, path: *const c_char, fi: *mut FileInfo) -> FuseResult<c_int> {
        let path = unsafe { self.required(path, "path") }?;
        let fi = unsafe { fi.as_mut() }.ok_or_else(|| FuseError::violation("null file info"))?;
        fi.fh = self.ops.opendir(&path)?;
        Ok(0)
    }

    /// Feeds entries to `filler` until it reports the reply buffer full.
    pub(crate) unsafe fn readdir(
        &self,
        path: *const c_char,
        buf: *mut c_void,
        filler: Option<FillDir>,
        offset: OffT,
        fi: *mut FileInfo,
        flags: c_uint,
    ) -> FuseResult<c_int> {
        let filler = filler.ok_or_else(|| FuseError::violation("null filler"))?;
        let path = unsafe { self.decode(path) }?;
        let fh = unsafe { fi.as_ref() }.map_or(0, |fi| fi.fh);

        for item in self.ops.readdir(path.as_deref(), offset, fh, flags)? {
            let (name, attrs, next) = item?.into_parts();
            let name = self.encode_c(&name, "directory entry")?;
            let mut st = Stat::default();
            let st_ptr = match attrs {
                Some(attrs) if !attrs.is_empty() => {
                    attrs.apply_stat(&mut st, self.use_ns);
                    &st as *const Stat
                }
                _ => ptr::null(),
            };
            if unsafe { filler(buf, name.as_ptr(), st_ptr, next, 0) } != 0 {
                break;
            }
        }
        Ok(0)
    }

    pub(crate) unsafe fn releasedir(&self, path: *const c_char, fi: *mut FileInfo) -> FuseResult<c_int> {
        let path = unsafe { self.decode(path) }?;
        let fh = unsafe { fi.as_ref() }.map_or(0, |fi| fi.fh);
        self.ops.releasedir(path.as_deref(), fh)?;
        Ok(0)
    }

    pub(crate) unsafe fn fsyncdir(&self, path: *const c_char, datasync: c_int, fi: *mut FileInfo) -> FuseResult<c_int> {
        let path = unsafe { self.decode(path) }?;
        let fh = unsafe { fi.as_ref() }.map_or(0, |fi| fi.fh);
        self.ops.fsyncdir(path.as_deref(), datasync != 0, fh)?;
        Ok(0)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Never fails: an error is logged and the session starts anyway. The
    /// returned value becomes the session's private data.
    pub(crate) unsafe fn init(&self, conn: *mut ConnInfo, cfg: *mut FuseConfig) {
        let mut conn_fallback = ConnInfo::default();
        let mut cfg_fallback = FuseConfig::default();
        let conn = unsafe { conn.as_mut() }.unwrap_or(&mut conn_fallback);
        let cfg = unsafe { cfg.as_mut() }.unwrap_or(&mut cfg_fallback);
        match self.ops.init(conn, cfg) {
            Ok(Some(data)) => {
                let _ = self.private.set(data);
            }
            Ok(None) => {}
            Err(err) => warn!("init failed, continuing: {err}"),
        }
    }

    pub(crate) fn destroy(&self) -> FuseResult<c_int> {
        self.ops.destroy()?;
        Ok(0)
    }
}
