//! Logical values exchanged with an [`Operations`](crate::Operations)
//! implementation.

use std::ffi::c_void;

use fusebridge_abi::{FileInfo, FuseBuf, FuseBufFlags, FuseBufVec, NativeRecord, StatRecord, TimeKind};
use indexmap::IndexMap;

use crate::error::{FuseError, FuseResult};

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Integer fields copied verbatim into a file-status record.
pub const STAT_FIELDS: &[&str] = &[
    "st_dev",
    "st_ino",
    "st_nlink",
    "st_mode",
    "st_uid",
    "st_gid",
    "st_rdev",
    "st_size",
    "st_blksize",
    "st_blocks",
    "st_flags",
    "st_gen",
];

/// Fields of a filesystem-status record.
pub const STATVFS_FIELDS: &[&str] = &[
    "f_bsize",
    "f_frsize",
    "f_blocks",
    "f_bfree",
    "f_bavail",
    "f_files",
    "f_ffree",
    "f_favail",
    "f_fsid",
    "f_flag",
    "f_namemax",
];

/// One attribute value.
///
/// Timestamps are [`AttrValue::Float`] seconds, or [`AttrValue::Int`]
/// nanoseconds when the operation set reports `use_ns()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
}

/// A timestamp as handed to `utimens`; same conventions as [`AttrValue`].
pub type TimeValue = AttrValue;

impl AttrValue {
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Int(v) => v,
            Self::Float(v) => v as i64,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }

    /// Split a timestamp into `(seconds, nanoseconds)`.
    ///
    /// Nanosecond counts are floor-divided so pre-epoch times keep a
    /// non-negative nanosecond part. Fractional seconds truncate toward
    /// zero.
    pub fn to_timespec(self, use_ns: bool) -> (i64, i64) {
        if use_ns {
            let ns = self.as_i64();
            (ns.div_euclid(NANOS_PER_SEC), ns.rem_euclid(NANOS_PER_SEC))
        } else {
            let value = self.as_f64();
            let sec = value.trunc();
            (sec as i64, ((value - sec) * 1e9) as i64)
        }
    }

    /// Join `(seconds, nanoseconds)` back into a timestamp.
    ///
    /// A nanosecond count that does not fit in an `i64` (beyond year 2262)
    /// is `EOVERFLOW`.
    pub fn from_timespec(sec: i64, nsec: i64, use_ns: bool) -> FuseResult<Self> {
        if use_ns {
            sec.checked_mul(NANOS_PER_SEC)
                .and_then(|ns| ns.checked_add(nsec))
                .map(Self::Int)
                .ok_or_else(|| FuseError::errno(libc::EOVERFLOW))
        } else {
            Ok(Self::Float(sec as f64 + nsec as f64 / 1e9))
        }
    }
}

macro_rules! attr_value_from {
    ($variant:ident, $cast:ty: $($t:ty),*) => {
        $(
            impl From<$t> for AttrValue {
                fn from(v: $t) -> Self {
                    Self::$variant(v as $cast)
                }
            }
        )*
    };
}

attr_value_from!(Int, i64: i64, i32, u32, u64, u16, usize);
attr_value_from!(Float, f64: f64, f32);

/// Attribute dictionary keyed by C field name (`st_mode`, `f_bavail`, ...).
///
/// Keys that name no field of the target record are ignored when the
/// dictionary is applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attrs {
    values: IndexMap<String, AttrValue>,
}

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<AttrValue> {
        self.values.get(key).copied()
    }

    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        self.values.shift_remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, AttrValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn mode(self, mode: u32) -> Self {
        self.with("st_mode", mode)
    }

    pub fn nlink(self, nlink: u64) -> Self {
        self.with("st_nlink", nlink)
    }

    pub fn size(self, size: u64) -> Self {
        self.with("st_size", size)
    }

    pub fn ino(self, ino: u64) -> Self {
        self.with("st_ino", ino)
    }

    pub fn owner(self, uid: u32, gid: u32) -> Self {
        self.with("st_uid", uid).with("st_gid", gid)
    }

    pub fn time(self, kind: TimeKind, value: impl Into<AttrValue>) -> Self {
        self.with(kind.key(), value)
    }

    /// Populate a zeroed file-status record.
    ///
    /// Integer keys are copied verbatim into same-named fields; the
    /// `st_*time` keys are split into timespec pairs per `use_ns`.
    pub fn apply_stat<S: StatRecord>(&self, st: &mut S, use_ns: bool) {
        for (key, value) in self.iter() {
            match TimeKind::from_key(key) {
                Some(kind) => {
                    let (sec, nsec) = value.to_timespec(use_ns);
                    st.set_time(kind, sec, nsec);
                }
                None => {
                    st.set_field(key, value.as_i64());
                }
            }
        }
    }

    /// Populate a zeroed filesystem-status record.
    pub fn apply_statvfs<V: NativeRecord>(&self, stv: &mut V) {
        for (key, value) in self.iter() {
            stv.set_field(key, value.as_i64());
        }
    }

    /// Read a populated file-status record back into a dictionary.
    pub fn from_stat<S: StatRecord>(st: &S, use_ns: bool) -> FuseResult<Self> {
        let mut attrs = Self::new();
        for key in STAT_FIELDS {
            if let Some(value) = st.get_field(key) {
                attrs.insert(*key, value);
            }
        }
        for kind in TimeKind::ALL {
            if let Some((sec, nsec)) = st.get_time(kind) {
                attrs.insert(kind.key(), AttrValue::from_timespec(sec, nsec, use_ns)?);
            }
        }
        Ok(attrs)
    }

    pub fn from_statvfs<V: NativeRecord>(stv: &V) -> Self {
        let mut attrs = Self::new();
        for key in STATVFS_FIELDS {
            if let Some(value) = stv.get_field(key) {
                attrs.insert(*key, value);
            }
        }
        attrs
    }
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (k, v) in iter {
            attrs.insert(k, v);
        }
        attrs
    }
}

/// One directory-listing element.
#[derive(Debug, Clone, PartialEq)]
pub enum DirItem {
    /// A bare name: no attributes, offset 0.
    Name(String),
    /// A name with optional attributes and the offset of the next entry.
    Entry {
        name: String,
        attrs: Option<Attrs>,
        offset: i64,
    },
}

impl DirItem {
    pub fn entry(name: impl Into<String>, attrs: Option<Attrs>, offset: i64) -> Self {
        Self::Entry {
            name: name.into(),
            attrs,
            offset,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) | Self::Entry { name, .. } => name,
        }
    }

    pub fn into_parts(self) -> (String, Option<Attrs>, i64) {
        match self {
            Self::Name(name) => (name, None, 0),
            Self::Entry {
                name,
                attrs,
                offset,
            } => (name, attrs, offset),
        }
    }
}

impl From<&str> for DirItem {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for DirItem {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/// Lazy directory listing. The adapter stops pulling as soon as the
/// native reply buffer is full.
pub type DirIter<'a> = Box<dyn Iterator<Item = FuseResult<DirItem>> + 'a>;

/// An open file as the operation set sees it: the handle it returned from
/// `open`/`create`, or the whole native file info when mounted with
/// `raw_fi`.
#[derive(Debug, Clone, Copy)]
pub enum FileRef<'a> {
    Handle(u64),
    Info(&'a FileInfo),
}

impl FileRef<'_> {
    pub fn fh(&self) -> u64 {
        match self {
            Self::Handle(fh) => *fh,
            Self::Info(fi) => fi.fh,
        }
    }

    pub fn info(&self) -> Option<&FileInfo> {
        match self {
            Self::Handle(_) => None,
            Self::Info(fi) => Some(fi),
        }
    }
}

/// An opaque native pointer passed through untouched (`lock`, `ioctl`,
/// `poll`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPtr(*mut c_void);

impl RawPtr {
    pub fn new(ptr: *mut c_void) -> Self {
        Self(ptr)
    }

    pub fn null() -> Self {
        Self(std::ptr::null_mut())
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0
    }

    pub fn is_null(self) -> bool {
        self.0.is_null()
    }

    pub fn cast<T>(self) -> *mut T {
        self.0.cast()
    }
}

/// One segment of a [`BufView`].
#[derive(Debug, Clone, Copy)]
pub enum BufSegment<'a> {
    Memory(&'a [u8]),
    /// `size` bytes to be read from `fd`, at `pos` if seeking.
    Fd {
        fd: i32,
        pos: Option<i64>,
        size: usize,
    },
}

/// Read-only view of the scatter/gather vector handed to `write_buf`.
#[derive(Debug, Clone)]
pub struct BufView<'a> {
    segments: Vec<BufSegment<'a>>,
}

impl<'a> BufView<'a> {
    /// Build a view over the unconsumed part of a native vector.
    ///
    /// # Safety
    ///
    /// `bufv` must point at a live vector whose memory buffers stay valid
    /// for `'a`.
    pub unsafe fn from_raw(bufv: *const FuseBufVec) -> FuseResult<Self> {
        if bufv.is_null() {
            return Err(FuseError::violation("null buffer vector"));
        }
        let (bufs, idx, off) = unsafe { (FuseBufVec::buffers(bufv), (*bufv).idx, (*bufv).off) };
        let mut segments = Vec::with_capacity(bufs.len().saturating_sub(idx));
        for (i, buf) in bufs.iter().enumerate().skip(idx) {
            let skip = if i == idx { off.min(buf.size) } else { 0 };
            segments.push(unsafe { Self::segment(buf, skip) }?);
        }
        Ok(Self { segments })
    }

    unsafe fn segment(buf: &FuseBuf, skip: usize) -> FuseResult<BufSegment<'a>> {
        let size = buf.size - skip;
        let flags = buf.buf_flags();
        if flags.contains(FuseBufFlags::IS_FD) {
            let pos = flags
                .contains(FuseBufFlags::FD_SEEK)
                .then_some(buf.pos + skip as i64);
            return Ok(BufSegment::Fd {
                fd: buf.fd,
                pos,
                size,
            });
        }
        if size == 0 {
            return Ok(BufSegment::Memory(&[]));
        }
        if buf.mem.is_null() {
            return Err(FuseError::violation("null memory buffer"));
        }
        let bytes = unsafe { std::slice::from_raw_parts(buf.mem.cast::<u8>().add(skip), size) };
        Ok(BufSegment::Memory(bytes))
    }

    /// View over plain memory, for callers outside the native path.
    pub fn from_slices(slices: &[&'a [u8]]) -> Self {
        Self {
            segments: slices.iter().map(|s| BufSegment::Memory(*s)).collect(),
        }
    }

    pub fn segments(&self) -> &[BufSegment<'a>] {
        &self.segments
    }

    /// Total bytes described by the view.
    pub fn len(&self) -> usize {
        self.segments
            .iter()
            .map(|seg| match seg {
                BufSegment::Memory(bytes) => bytes.len(),
                BufSegment::Fd { size, .. } => *size,
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gather every segment into one buffer, reading descriptor segments.
    pub fn to_vec(&self) -> FuseResult<Vec<u8>> {
        let mut out = Vec::with_capacity(self.len());
        for seg in &self.segments {
            match *seg {
                BufSegment::Memory(bytes) => out.extend_from_slice(bytes),
                BufSegment::Fd { fd, pos, size } => read_fd(fd, pos, size, &mut out)?,
            }
        }
        Ok(out)
    }
}

#[cfg(unix)]
fn read_fd(fd: i32, pos: Option<i64>, size: usize, out: &mut Vec<u8>) -> FuseResult<()> {
    let start = out.len();
    out.resize(start + size, 0);
    let mut done = 0;
    while done < size {
        let dst = out[start + done..].as_mut_ptr().cast::<c_void>();
        let n = unsafe {
            match pos {
                Some(pos) => libc::pread(fd, dst, size - done, (pos + done as i64) as libc::off_t),
                None => libc::read(fd, dst, size - done),
            }
        };
        if n < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err.into());
        }
        if n == 0 {
            break;
        }
        done += n as usize;
    }
    out.truncate(start + done);
    Ok(())
}

#[cfg(not(unix))]
fn read_fd(_fd: i32, _pos: Option<i64>, _size: usize, _out: &mut Vec<u8>) -> FuseResult<()> {
    Err(FuseError::unsupported())
}
