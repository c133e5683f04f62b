//! File-status records (`struct stat`) per OS and architecture.
//!
//! Every variant is spelled with fixed-width types and explicit padding so
//! that it has the same offsets no matter which host compiles it. The
//! Linux variants follow glibc's large-file (`_FILE_OFFSET_BITS=64`)
//! layout, which is what libfuse3 is built against; the adapter zero-fills
//! the record, and the directory filler copies `sizeof(struct stat)`
//! bytes, so reserved tail words are declared too.

use crate::record::abi_record;
use crate::time::{Timespec32, Timespec64};

abi_record! {
    /// Linux x86_64.
    #[repr(C)]
    pub struct StatLinuxX86_64 {
        pub st_dev: u64,
        pub st_ino: u64,
        pub st_nlink: u64,
        pub st_mode: u32,
        pub st_uid: u32,
        pub st_gid: u32,
        pub __pad0: i32,
        pub st_rdev: u64,
        pub st_size: i64,
        pub st_blksize: i64,
        pub st_blocks: i64,
        pub st_atim: Timespec64,
        pub st_mtim: Timespec64,
        pub st_ctim: Timespec64,
        pub __glibc_reserved: [i64; 3],
    }
    fields { st_dev, st_ino, st_nlink, st_mode, st_uid, st_gid, st_rdev, st_size, st_blksize, st_blocks }
    times { Access => st_atim, Modify => st_mtim, Change => st_ctim }
}

abi_record! {
    /// Linux aarch64. riscv64 and loongarch64 use the same asm-generic
    /// layout.
    #[repr(C)]
    pub struct StatLinuxAarch64 {
        pub st_dev: u64,
        pub st_ino: u64,
        pub st_mode: u32,
        pub st_nlink: u32,
        pub st_uid: u32,
        pub st_gid: u32,
        pub st_rdev: u64,
        pub __pad1: u64,
        pub st_size: i64,
        pub st_blksize: i32,
        pub __pad2: i32,
        pub st_blocks: i64,
        pub st_atim: Timespec64,
        pub st_mtim: Timespec64,
        pub st_ctim: Timespec64,
        pub __glibc_reserved: [i32; 2],
    }
    fields { st_dev, st_ino, st_nlink, st_mode, st_uid, st_gid, st_rdev, st_size, st_blksize, st_blocks }
    times { Access => st_atim, Modify => st_mtim, Change => st_ctim }
}

abi_record! {
    /// Linux ppc64, big and little endian.
    #[repr(C)]
    pub struct StatLinuxPpc64 {
        pub st_dev: u64,
        pub st_ino: u64,
        pub st_nlink: u64,
        pub st_mode: u32,
        pub st_uid: u32,
        pub st_gid: u32,
        pub __pad2: i32,
        pub st_rdev: u64,
        pub st_size: i64,
        pub st_blksize: i64,
        pub st_blocks: i64,
        pub st_atim: Timespec64,
        pub st_mtim: Timespec64,
        pub st_ctim: Timespec64,
        pub __glibc_reserved: [u64; 3],
    }
    fields { st_dev, st_ino, st_nlink, st_mode, st_uid, st_gid, st_rdev, st_size, st_blksize, st_blocks }
    times { Access => st_atim, Modify => st_mtim, Change => st_ctim }
}

abi_record! {
    /// Linux 32-bit PowerPC.
    #[repr(C)]
    pub struct StatLinuxPpc {
        pub st_dev: u64,
        pub st_ino: u64,
        pub st_mode: u32,
        pub st_nlink: u32,
        pub st_uid: u32,
        pub st_gid: u32,
        pub st_rdev: u64,
        pub __pad2: u16,
        pub __pad2_align: [u8; 6],
        pub st_size: i64,
        pub st_blksize: i32,
        pub __pad3: u32,
        pub st_blocks: i64,
        pub st_atim: Timespec32,
        pub st_mtim: Timespec32,
        pub st_ctim: Timespec32,
        pub __glibc_reserved4: u32,
        pub __glibc_reserved5: u32,
    }
    fields { st_dev, st_ino, st_nlink, st_mode, st_uid, st_gid, st_rdev, st_size, st_blksize, st_blocks }
    times { Access => st_atim, Modify => st_mtim, Change => st_ctim }
}

abi_record! {
    /// Linux MIPS o32.
    #[repr(C)]
    pub struct StatLinuxMips {
        pub st_dev: u32,
        pub st_pad1: [i32; 3],
        pub st_ino: u64,
        pub st_mode: u32,
        pub st_nlink: u32,
        pub st_uid: u32,
        pub st_gid: u32,
        pub st_rdev: u32,
        pub st_pad2: [i32; 3],
        pub st_size: i64,
        pub st_atim: Timespec32,
        pub st_mtim: Timespec32,
        pub st_ctim: Timespec32,
        pub st_blksize: i32,
        pub st_pad4: i32,
        pub st_blocks: i64,
        pub st_pad5: [i32; 14],
    }
    fields { st_dev, st_ino, st_nlink, st_mode, st_uid, st_gid, st_rdev, st_size, st_blksize, st_blocks }
    times { Access => st_atim, Modify => st_mtim, Change => st_ctim }
}

abi_record! {
    /// Linux i686, and the fallback for unrecognised architectures.
    ///
    /// 64-bit members are only 4-byte aligned on i386, hence `packed(4)`.
    /// Read fields by value; never take references into this record.
    #[repr(C, packed(4))]
    pub struct StatLinuxI686 {
        pub st_dev: u64,
        pub __pad1: u32,
        pub __st_ino: u32,
        pub st_mode: u32,
        pub st_nlink: u32,
        pub st_uid: u32,
        pub st_gid: u32,
        pub st_rdev: u64,
        pub __pad2: u32,
        pub st_size: i64,
        pub st_blksize: i32,
        pub st_blocks: i64,
        pub st_atim: Timespec32,
        pub st_mtim: Timespec32,
        pub st_ctim: Timespec32,
        pub st_ino: u64,
    }
    fields { st_dev, st_ino, st_nlink, st_mode, st_uid, st_gid, st_rdev, st_size, st_blksize, st_blocks }
    times { Access => st_atim, Modify => st_mtim, Change => st_ctim }
}

abi_record! {
    /// macOS, 64-bit inode layout.
    #[repr(C)]
    pub struct StatDarwin {
        pub st_dev: i32,
        pub st_mode: u16,
        pub st_nlink: u16,
        pub st_ino: u64,
        pub st_uid: u32,
        pub st_gid: u32,
        pub st_rdev: i32,
        pub __pad0: u32,
        pub st_atim: Timespec64,
        pub st_mtim: Timespec64,
        pub st_ctim: Timespec64,
        pub st_birthtim: Timespec64,
        pub st_size: i64,
        pub st_blocks: i64,
        pub st_blksize: i32,
        pub st_flags: u32,
        pub st_gen: u32,
        pub st_lspare: i32,
        pub st_qspare: [i64; 2],
    }
    fields { st_dev, st_ino, st_nlink, st_mode, st_uid, st_gid, st_rdev, st_size, st_blksize, st_blocks, st_flags, st_gen }
    times { Access => st_atim, Modify => st_mtim, Change => st_ctim, Birth => st_birthtim }
}

abi_record! {
    /// FreeBSD amd64, ino64 layout (FreeBSD 12 and later).
    #[repr(C)]
    pub struct StatFreeBsd {
        pub st_dev: u64,
        pub st_ino: u64,
        pub st_nlink: u64,
        pub st_mode: u16,
        pub st_bsdflags: i16,
        pub st_uid: u32,
        pub st_gid: u32,
        pub st_padding1: i32,
        pub st_rdev: u64,
        pub st_atim: Timespec64,
        pub st_mtim: Timespec64,
        pub st_ctim: Timespec64,
        pub st_birthtim: Timespec64,
        pub st_size: i64,
        pub st_blocks: i64,
        pub st_blksize: i32,
        pub st_flags: u32,
        pub st_gen: u64,
        pub st_spare: [u64; 10],
    }
    fields { st_dev, st_ino, st_nlink, st_mode, st_uid, st_gid, st_rdev, st_size, st_blksize, st_blocks, st_flags, st_gen }
    times { Access => st_atim, Modify => st_mtim, Change => st_ctim, Birth => st_birthtim }
}

abi_record! {
    /// Windows, WinFsp `fuse_stat` on 64-bit.
    #[repr(C)]
    pub struct StatWindows {
        pub st_dev: u32,
        pub __pad0: u32,
        pub st_ino: u64,
        pub st_mode: u32,
        pub st_nlink: u16,
        pub __pad1: u16,
        pub st_uid: u32,
        pub st_gid: u32,
        pub st_rdev: u32,
        pub __pad2: u32,
        pub st_size: i64,
        pub st_atim: Timespec64,
        pub st_mtim: Timespec64,
        pub st_ctim: Timespec64,
        pub st_blksize: i32,
        pub __pad3: u32,
        pub st_blocks: i64,
        pub st_birthtim: Timespec64,
    }
    fields { st_dev, st_ino, st_nlink, st_mode, st_uid, st_gid, st_rdev, st_size, st_blksize, st_blocks }
    times { Access => st_atim, Modify => st_mtim, Change => st_ctim, Birth => st_birthtim }
}

#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
pub type Stat = StatLinuxX86_64;
#[cfg(all(
    target_os = "linux",
    any(target_arch = "aarch64", target_arch = "riscv64", target_arch = "loongarch64")
))]
pub type Stat = StatLinuxAarch64;
#[cfg(all(target_os = "linux", target_arch = "powerpc64"))]
pub type Stat = StatLinuxPpc64;
#[cfg(all(target_os = "linux", target_arch = "powerpc"))]
pub type Stat = StatLinuxPpc;
#[cfg(all(target_os = "linux", target_arch = "mips"))]
pub type Stat = StatLinuxMips;
/// Any other 32-bit Linux target (i686, arm, ...) gets the i686 layout:
/// glibc's `stat64` there is all fixed-width fields with 4-byte alignment.
#[cfg(all(
    target_os = "linux",
    target_pointer_width = "32",
    not(any(target_arch = "powerpc", target_arch = "mips")),
))]
pub type Stat = StatLinuxI686;

// A 64-bit Linux target with no layout above would silently get the 32-bit
// record and corrupt every attribute reply.
#[cfg(all(
    target_os = "linux",
    target_pointer_width = "64",
    not(any(
        target_arch = "x86_64",
        target_arch = "aarch64",
        target_arch = "riscv64",
        target_arch = "loongarch64",
        target_arch = "powerpc64",
    ))
))]
compile_error!("no struct stat layout for this 64-bit Linux architecture");
#[cfg(target_os = "macos")]
pub type Stat = StatDarwin;
#[cfg(target_os = "freebsd")]
pub type Stat = StatFreeBsd;
#[cfg(target_os = "windows")]
pub type Stat = StatWindows;
