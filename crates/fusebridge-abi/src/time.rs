//! Timestamp pairs as they appear inside native records.

/// `struct timespec` where `time_t` and `long` are 32 bits wide.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timespec32 {
    pub tv_sec: i32,
    pub tv_nsec: i32,
}

/// `struct timespec` where `time_t` and `long` are 64 bits wide.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timespec64 {
    pub tv_sec: i64,
    pub tv_nsec: i64,
}

/// Conversion between a native timestamp pair and `(seconds, nanoseconds)`.
///
/// Narrowing into [`Timespec32`] truncates; records using it cannot carry
/// dates past 2038 anyway.
pub trait TimespecField: Copy {
    fn from_parts(sec: i64, nsec: i64) -> Self;
    fn parts(&self) -> (i64, i64);
}

impl TimespecField for Timespec32 {
    fn from_parts(sec: i64, nsec: i64) -> Self {
        Self {
            tv_sec: sec as i32,
            tv_nsec: nsec as i32,
        }
    }

    fn parts(&self) -> (i64, i64) {
        (self.tv_sec as i64, self.tv_nsec as i64)
    }
}

impl TimespecField for Timespec64 {
    fn from_parts(sec: i64, nsec: i64) -> Self {
        Self {
            tv_sec: sec,
            tv_nsec: nsec,
        }
    }

    fn parts(&self) -> (i64, i64) {
        (self.tv_sec, self.tv_nsec)
    }
}

/// The timestamp pair libfuse uses on the build target (`utimens`, stat).
#[cfg(target_pointer_width = "64")]
pub type Timespec = Timespec64;
#[cfg(not(target_pointer_width = "64"))]
pub type Timespec = Timespec32;

/// Which of a file-status record's timestamps is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeKind {
    Access,
    Modify,
    Change,
    Birth,
}

impl TimeKind {
    pub const ALL: [TimeKind; 4] = [Self::Access, Self::Modify, Self::Change, Self::Birth];

    /// Attribute key used for this timestamp in attribute dictionaries.
    pub fn key(self) -> &'static str {
        match self {
            Self::Access => "st_atime",
            Self::Modify => "st_mtime",
            Self::Change => "st_ctime",
            Self::Birth => "st_birthtime",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }
}
