//! Filesystem-status records (`struct statvfs`).

use crate::record::abi_record;

abi_record! {
    /// Linux with a 64-bit `long`.
    #[repr(C)]
    pub struct StatVfsLinux64 {
        pub f_bsize: u64,
        pub f_frsize: u64,
        pub f_blocks: u64,
        pub f_bfree: u64,
        pub f_bavail: u64,
        pub f_files: u64,
        pub f_ffree: u64,
        pub f_favail: u64,
        pub f_fsid: u64,
        pub f_flag: u64,
        pub f_namemax: u64,
        pub __f_spare: [i32; 6],
    }
    fields { f_bsize, f_frsize, f_blocks, f_bfree, f_bavail, f_files, f_ffree, f_favail, f_fsid, f_flag, f_namemax }
}

abi_record! {
    /// Linux with a 32-bit `long` (`statvfs64`).
    #[repr(C)]
    pub struct StatVfsLinux32 {
        pub f_bsize: u32,
        pub f_frsize: u32,
        pub f_blocks: u64,
        pub f_bfree: u64,
        pub f_bavail: u64,
        pub f_files: u64,
        pub f_ffree: u64,
        pub f_favail: u64,
        pub f_fsid: u32,
        pub __f_unused: i32,
        pub f_flag: u32,
        pub f_namemax: u32,
        pub __f_spare: [i32; 6],
    }
    fields { f_bsize, f_frsize, f_blocks, f_bfree, f_bavail, f_files, f_ffree, f_favail, f_fsid, f_flag, f_namemax }
}

abi_record! {
    /// macOS. Block and file counts are 32 bits wide.
    #[repr(C)]
    pub struct StatVfsDarwin {
        pub f_bsize: u64,
        pub f_frsize: u64,
        pub f_blocks: u32,
        pub f_bfree: u32,
        pub f_bavail: u32,
        pub f_files: u32,
        pub f_ffree: u32,
        pub f_favail: u32,
        pub f_fsid: u64,
        pub f_flag: u64,
        pub f_namemax: u64,
    }
    fields { f_bsize, f_frsize, f_blocks, f_bfree, f_bavail, f_files, f_ffree, f_favail, f_fsid, f_flag, f_namemax }
}

abi_record! {
    /// FreeBSD. Counts come first, sorted by name.
    #[repr(C)]
    pub struct StatVfsFreeBsd {
        pub f_bavail: u64,
        pub f_bfree: u64,
        pub f_blocks: u64,
        pub f_favail: u64,
        pub f_ffree: u64,
        pub f_files: u64,
        pub f_bsize: u64,
        pub f_flag: u64,
        pub f_frsize: u64,
        pub f_fsid: u64,
        pub f_namemax: u64,
    }
    fields { f_bsize, f_frsize, f_blocks, f_bfree, f_bavail, f_files, f_ffree, f_favail, f_fsid, f_flag, f_namemax }
}

abi_record! {
    /// Windows (WinFsp).
    #[repr(C)]
    pub struct StatVfsWindows {
        pub f_bsize: u64,
        pub f_frsize: u64,
        pub f_blocks: u64,
        pub f_bfree: u64,
        pub f_bavail: u64,
        pub f_files: u64,
        pub f_ffree: u64,
        pub f_favail: u64,
        pub f_fsid: u64,
        pub f_flag: u64,
        pub f_namemax: u64,
    }
    fields { f_bsize, f_frsize, f_blocks, f_bfree, f_bavail, f_files, f_ffree, f_favail, f_fsid, f_flag, f_namemax }
}

#[cfg(all(target_os = "linux", target_pointer_width = "64"))]
pub type StatVfs = StatVfsLinux64;
#[cfg(all(target_os = "linux", not(target_pointer_width = "64")))]
pub type StatVfs = StatVfsLinux32;
#[cfg(target_os = "macos")]
pub type StatVfs = StatVfsDarwin;
#[cfg(target_os = "freebsd")]
pub type StatVfs = StatVfsFreeBsd;
#[cfg(target_os = "windows")]
pub type StatVfs = StatVfsWindows;
