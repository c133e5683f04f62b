//! `struct fuse_file_info`.

use bitflags::bitflags;

/// Mask for bit-field member `n` of the word following `flags`.
///
/// Big-endian ABIs allocate bit-fields from the most significant bit.
const fn bit(n: u32) -> u32 {
    if cfg!(target_endian = "big") {
        1 << (31 - n)
    } else {
        1 << n
    }
}

bitflags! {
    /// The single-bit members of `fuse_file_info`, in declaration order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FileInfoBits: u32 {
        const WRITEPAGE = bit(0);
        const DIRECT_IO = bit(1);
        const KEEP_CACHE = bit(2);
        const PARALLEL_DIRECT_WRITES = bit(3);
        const FLUSH = bit(4);
        const NONSEEKABLE = bit(5);
        const FLOCK_RELEASE = bit(6);
        const CACHE_READDIR = bit(7);
        const NOFLUSH = bit(8);
    }
}

/// Per-open-file context owned by libfuse.
///
/// `fh` is ours to fill in from `open`, `create` and `opendir`; every
/// later request on that file carries it back.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct FileInfo {
    /// `open(2)` flags.
    pub flags: i32,
    /// Raw bit-field word, see [`FileInfoBits`].
    pub bits: u32,
    pub padding2: u32,
    pub padding3: u32,
    pub fh: u64,
    pub lock_owner: u64,
    pub poll_events: u32,
}

impl FileInfo {
    pub fn with_fh(fh: u64) -> Self {
        Self {
            fh,
            ..Default::default()
        }
    }

    pub fn bit_flags(&self) -> FileInfoBits {
        FileInfoBits::from_bits_retain(self.bits)
    }

    pub fn contains(&self, bits: FileInfoBits) -> bool {
        self.bit_flags().contains(bits)
    }

    /// Set or clear `bits`, leaving the reserved positions untouched.
    pub fn set(&mut self, bits: FileInfoBits, value: bool) {
        let mut current = self.bit_flags();
        current.set(bits, value);
        self.bits = current.bits();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::offset_of;

    #[test]
    fn test_file_info_layout() {
        assert_eq!(offset_of!(FileInfo, flags), 0);
        assert_eq!(offset_of!(FileInfo, bits), 4);
        assert_eq!(offset_of!(FileInfo, fh), 16);
        assert_eq!(offset_of!(FileInfo, lock_owner), 24);
        assert_eq!(offset_of!(FileInfo, poll_events), 32);
        #[cfg(target_pointer_width = "64")]
        assert_eq!(std::mem::size_of::<FileInfo>(), 40);
    }

    #[test]
    fn test_bits_are_distinct() {
        let all = FileInfoBits::all();
        assert_eq!(all.bits().count_ones(), 9);
    }

    #[cfg(target_endian = "little")]
    #[test]
    fn test_little_endian_positions() {
        assert_eq!(FileInfoBits::WRITEPAGE.bits(), 1);
        assert_eq!(FileInfoBits::DIRECT_IO.bits(), 2);
        assert_eq!(FileInfoBits::NOFLUSH.bits(), 1 << 8);
    }

    #[test]
    fn test_set_keeps_other_bits() {
        let mut fi = FileInfo::with_fh(7);
        fi.bits = 0xdead_0000 & !FileInfoBits::all().bits();
        let reserved = fi.bits;
        fi.set(FileInfoBits::DIRECT_IO | FileInfoBits::KEEP_CACHE, true);
        assert!(fi.contains(FileInfoBits::DIRECT_IO));
        assert!(fi.contains(FileInfoBits::KEEP_CACHE));
        fi.set(FileInfoBits::DIRECT_IO, false);
        assert!(!fi.contains(FileInfoBits::DIRECT_IO));
        assert_eq!(fi.bits & !FileInfoBits::all().bits(), reserved);
        assert_eq!(fi.fh, 7);
    }
}
