//! DRAM Buffer Implementation.
//!
//! This module provides a safe wrapper around the raw allocation backing guest RAM.
//! On Unix it uses an anonymous `mmap`, so pages are only committed by the OS when
//! touched; a 128 MiB default RAM costs nothing until the harness writes to it.

use std::io;
use std::slice;

/// Zero-initialised backing storage for one RAM region.
pub struct DramBuffer {
    ptr: *mut u8,
    size: usize,
}

// SAFETY: the buffer exclusively owns its allocation; shared access only hands out
// `&[u8]` and mutation requires `&mut self`.
unsafe impl Send for DramBuffer {}
// SAFETY: see `Send`; no interior mutability.
unsafe impl Sync for DramBuffer {}

impl std::fmt::Debug for DramBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DramBuffer").field("size", &self.size).finish()
    }
}

impl DramBuffer {
    /// Allocates a zeroed buffer of `size` bytes.
    ///
    /// # Errors
    ///
    /// Returns the OS error when the mapping cannot be created.
    #[cfg(unix)]
    pub fn new(size: usize) -> io::Result<Self> {
        if size == 0 {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "zero-sized DRAM"));
        }
        // SAFETY: anonymous private mapping with no fixed address; the result is checked
        // against MAP_FAILED before use.
        let ptr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                size,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS | libc::MAP_NORESERVE,
                -1,
                0,
            )
        };
        if ptr == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }
        Ok(Self {
            ptr: ptr as *mut u8,
            size,
        })
    }

    /// Allocates a zeroed buffer of `size` bytes.
    ///
    /// # Errors
    ///
    /// Returns `OutOfMemory` when the allocation cannot be reserved.
    #[cfg(not(unix))]
    pub fn new(size: usize) -> io::Result<Self> {
        if size == 0 {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "zero-sized DRAM"));
        }
        let mut vec = Vec::new();
        vec.try_reserve_exact(size)
            .map_err(|e| io::Error::new(io::ErrorKind::OutOfMemory, e))?;
        vec.resize(size, 0u8);
        let mut boxed = vec.into_boxed_slice();
        let ptr = boxed.as_mut_ptr();
        std::mem::forget(boxed);
        Ok(Self { ptr, size })
    }

    /// Returns the size of the buffer in bytes.
    pub const fn len(&self) -> usize {
        self.size
    }

    /// Returns true for a zero-length buffer (never the case for a constructed buffer).
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The whole buffer as a byte slice.
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: `ptr` is a live allocation of `size` initialised (zeroed) bytes owned by self.
        unsafe { slice::from_raw_parts(self.ptr, self.size) }
    }

    /// The whole buffer as a mutable byte slice.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: as in `as_slice`; `&mut self` guarantees exclusivity.
        unsafe { slice::from_raw_parts_mut(self.ptr, self.size) }
    }
}

impl Drop for DramBuffer {
    fn drop(&mut self) {
        #[cfg(unix)]
        // SAFETY: `ptr`/`size` describe the mapping created in `new`, unmapped exactly once.
        unsafe {
            let _ = libc::munmap(self.ptr.cast(), self.size);
        }

        #[cfg(not(unix))]
        // SAFETY: `ptr`/`size` come from the boxed slice leaked in `new`.
        unsafe {
            drop(Box::from_raw(std::ptr::slice_from_raw_parts_mut(self.ptr, self.size)));
        }
    }
}
