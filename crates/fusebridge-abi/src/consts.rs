//! Platform constants the adapters need.

/// "Operation not supported" on the build target.
#[cfg(target_os = "linux")]
pub const ENOTSUP: i32 = 95;
#[cfg(any(target_os = "macos", target_os = "freebsd"))]
pub const ENOTSUP: i32 = 45;
#[cfg(target_os = "windows")]
pub const ENOTSUP: i32 = 129;

/// `(uid_t)-1`: `chown` leaves the owner unchanged.
pub const UID_UNCHANGED: crate::UidT = crate::UidT::MAX;
/// `(gid_t)-1`: `chown` leaves the group unchanged.
pub const GID_UNCHANGED: crate::GidT = crate::GidT::MAX;

/// `enum fuse_readdir_flags`: the kernel asked for attributes too.
pub const FUSE_READDIR_PLUS: u32 = 1 << 0;
/// `enum fuse_fill_dir_flags`: the entry carries full attributes.
pub const FUSE_FILL_DIR_PLUS: u32 = 1 << 1;

pub const RENAME_NOREPLACE: u32 = 1 << 0;
pub const RENAME_EXCHANGE: u32 = 1 << 1;

pub const XATTR_CREATE: i32 = 1;
pub const XATTR_REPLACE: i32 = 2;

/// `ioctl` flags.
pub const FUSE_IOCTL_COMPAT: u32 = 1 << 0;
pub const FUSE_IOCTL_UNRESTRICTED: u32 = 1 << 1;
pub const FUSE_IOCTL_RETRY: u32 = 1 << 2;
pub const FUSE_IOCTL_DIR: u32 = 1 << 4;
