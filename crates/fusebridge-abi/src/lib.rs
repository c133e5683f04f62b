//! Byte-exact libfuse3 structure layouts.
//!
//! This crate is pure data: the records libfuse reads and writes through
//! the pointers it passes to filesystem callbacks, and the callback table
//! itself. It has no behaviour beyond named-field access for the status
//! records.
//!
//! # Layout selection
//!
//! The file-status record differs per OS and, on Linux, per CPU
//! architecture. Every variant is compiled on every host (so each one is
//! layout-tested everywhere) and the build target's variant is exported as
//! [`Stat`]:
//!
//! |----------------------|-------------------------------------------|
//! | Variant              | Used for                                  |
//! |----------------------|-------------------------------------------|
//! | [`StatLinuxX86_64`]  | Linux x86_64                              |
//! | [`StatLinuxAarch64`] | Linux aarch64, riscv64, loongarch64       |
//! | [`StatLinuxPpc64`]   | Linux ppc64 / ppc64le                     |
//! | [`StatLinuxPpc`]     | Linux 32-bit PowerPC                      |
//! | [`StatLinuxMips`]    | Linux MIPS o32                            |
//! | [`StatLinuxI686`]    | Linux i686 and any other architecture     |
//! | [`StatDarwin`]       | macOS (has birth time)                    |
//! | [`StatFreeBsd`]      | FreeBSD (has birth time)                  |
//! | [`StatWindows`]      | Windows / Cygwin via WinFsp               |
//! |----------------------|-------------------------------------------|
//!
//! [`AbiVariant`] names the same set at runtime.

#[cfg(not(any(
    target_os = "linux",
    target_os = "macos",
    target_os = "freebsd",
    target_os = "windows"
)))]
compile_error!("fusebridge-abi has no native layouts for this operating system");

pub mod buf;
pub mod conn;
pub mod consts;
pub mod file_info;
pub mod operations;
mod record;
pub mod stat;
pub mod statvfs;
pub mod time;
mod variant;

pub use buf::{FuseBuf, FuseBufFlags, FuseBufVec};
pub use conn::{ConnInfo, FuseConfig, FuseContext};
pub use file_info::{FileInfo, FileInfoBits};
pub use operations::{FillDir, FuseOperations};
pub use record::{NativeRecord, RecordLayout, StatRecord};
pub use stat::{
    Stat, StatDarwin, StatFreeBsd, StatLinuxAarch64, StatLinuxI686, StatLinuxMips, StatLinuxPpc,
    StatLinuxPpc64, StatLinuxX86_64, StatWindows,
};
pub use statvfs::{
    StatVfs, StatVfsDarwin, StatVfsFreeBsd, StatVfsLinux32, StatVfsLinux64, StatVfsWindows,
};
pub use time::{TimeKind, Timespec, Timespec32, Timespec64, TimespecField};
pub use variant::{AbiVariant, UnsupportedPlatform};

/// `off_t`; libfuse3 is always built with 64-bit file offsets.
pub type OffT = i64;
pub type UidT = u32;
pub type GidT = u32;
pub type PidT = i32;

#[cfg(any(target_os = "macos", target_os = "freebsd"))]
pub type ModeT = u16;
#[cfg(not(any(target_os = "macos", target_os = "freebsd")))]
pub type ModeT = u32;

#[cfg(any(target_os = "linux", target_os = "freebsd"))]
pub type DevT = u64;
#[cfg(target_os = "macos")]
pub type DevT = i32;
#[cfg(target_os = "windows")]
pub type DevT = u32;
