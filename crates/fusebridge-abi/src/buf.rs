//! Scatter/gather buffers (`struct fuse_buf`, `struct fuse_bufvec`).

use std::ffi::{c_int, c_uint, c_void};

use bitflags::bitflags;

use crate::OffT;

bitflags! {
    /// `enum fuse_buf_flags`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FuseBufFlags: c_uint {
        /// The buffer is a file descriptor, not memory.
        const IS_FD = 1 << 1;
        /// Seek to `pos` before reading or writing the descriptor.
        const FD_SEEK = 1 << 2;
        /// Retry short reads and writes on the descriptor.
        const FD_RETRY = 1 << 3;
    }
}

/// One buffer: either `size` bytes at `mem`, or a descriptor and position.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct FuseBuf {
    pub size: usize,
    pub flags: c_uint,
    pub mem: *mut c_void,
    pub fd: c_int,
    pub pos: OffT,
}

impl FuseBuf {
    pub fn memory(mem: *mut c_void, size: usize) -> Self {
        Self {
            size,
            flags: 0,
            mem,
            fd: -1,
            pos: 0,
        }
    }

    pub fn buf_flags(&self) -> FuseBufFlags {
        FuseBufFlags::from_bits_retain(self.flags)
    }
}

/// A vector of buffers. `buf` is a C flexible array: `count` entries
/// follow in memory even though one is declared.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct FuseBufVec {
    pub count: usize,
    pub idx: usize,
    pub off: usize,
    pub buf: [FuseBuf; 1],
}

impl FuseBufVec {
    /// `FUSE_BUFVEC_INIT`: a single memory buffer.
    pub fn single(mem: *mut c_void, size: usize) -> Self {
        Self {
            count: 1,
            idx: 0,
            off: 0,
            buf: [FuseBuf::memory(mem, size)],
        }
    }

    /// Borrow all `count` entries of the vector at `this`.
    ///
    /// # Safety
    ///
    /// `this` must point at a live vector whose allocation really holds
    /// `count` buffers, and it must outlive `'a`.
    pub unsafe fn buffers<'a>(this: *const FuseBufVec) -> &'a [FuseBuf] {
        unsafe {
            let first = std::ptr::addr_of!((*this).buf).cast::<FuseBuf>();
            std::slice::from_raw_parts(first, (*this).count)
        }
    }

    /// Bytes left in the vector from the current `idx`/`off` position.
    ///
    /// # Safety
    ///
    /// Same requirements as [`FuseBufVec::buffers`].
    pub unsafe fn total_size(this: *const FuseBufVec) -> usize {
        let (bufs, idx, off) = unsafe { (Self::buffers(this), (*this).idx, (*this).off) };
        bufs.iter()
            .skip(idx)
            .map(|buf| buf.size)
            .sum::<usize>()
            .saturating_sub(off)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_buf_layout() {
        assert_eq!(offset_of!(FuseBuf, flags), 8);
        assert_eq!(offset_of!(FuseBuf, mem), 16);
        assert_eq!(offset_of!(FuseBuf, fd), 24);
        assert_eq!(offset_of!(FuseBuf, pos), 32);
        assert_eq!(size_of::<FuseBuf>(), 40);
        assert_eq!(offset_of!(FuseBufVec, buf), 24);
        assert_eq!(size_of::<FuseBufVec>(), 64);
    }

    #[test]
    fn test_single_total_size() {
        let mut data = [0u8; 12];
        let mut vec = FuseBufVec::single(data.as_mut_ptr().cast(), data.len());
        assert_eq!(unsafe { FuseBufVec::total_size(&vec) }, 12);
        vec.off = 4;
        assert_eq!(unsafe { FuseBufVec::total_size(&vec) }, 8);
        assert!(!vec.buf[0].buf_flags().contains(FuseBufFlags::IS_FD));
    }
}
