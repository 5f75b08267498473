//! Storage: device memory management with Arc-based sharing
//!
//! Storage comes from one of two places: memory this runtime allocated
//! itself (freed on drop), or memory borrowed from a foreign allocator
//! through a [`ShareGuard`](crate::interop) (share released on drop, the
//! memory itself untouched).

use crate::dtype::{DType, Element};
use crate::error::Result;
use crate::interop::share::ShareGuard;
use crate::runtime::Runtime;
use std::sync::Arc;

/// Storage for tensor data on a device
///
/// Storage wraps device memory with reference counting, enabling zero-copy
/// views (transpose, broadcast, etc.) that share the underlying buffer.
///
/// Owned memory is deallocated when the last reference is dropped. Foreign
/// memory is never deallocated here; dropping the last reference only
/// returns the ownership share to the foreign allocator.
pub struct Storage<R: Runtime> {
    inner: Arc<StorageInner<R>>,
}

struct StorageInner<R: Runtime> {
    /// Raw device pointer (GPU address or CPU ptr cast to u64)
    ptr: u64,
    /// Number of elements (not bytes)
    len: usize,
    /// Element type
    dtype: DType,
    /// Device where memory is allocated
    device: R::Device,
    /// Where the memory came from, and what drop must do about it
    source: Source,
}

/// How a storage buffer came to exist
enum Source {
    /// Allocated by this runtime; deallocated on drop
    Owned,
    /// Borrowed from a foreign allocator; the guard returns our share on drop
    Foreign(#[allow(dead_code)] ShareGuard),
}

impl<R: Runtime> Storage<R> {
    /// Create new storage with allocated memory
    ///
    /// Allocates `len` elements of type `dtype` on the specified device.
    pub fn new(len: usize, dtype: DType, device: &R::Device) -> Result<Self> {
        let size_bytes = len * dtype.size_in_bytes();
        let ptr = R::allocate(size_bytes, device)?;

        Ok(Self {
            inner: Arc::new(StorageInner {
                ptr,
                len,
                dtype,
                device: device.clone(),
                source: Source::Owned,
            }),
        })
    }

    /// Create storage from existing data with inferred dtype
    ///
    /// Copies `data` to the device. The dtype is inferred from the Element type.
    pub fn from_slice<T: Element>(data: &[T], device: &R::Device) -> Result<Self> {
        let dtype = T::DTYPE;
        let len = data.len();

        let bytes = bytemuck::cast_slice(data);
        let ptr = R::allocate(bytes.len(), device)?;

        R::copy_to_device(bytes, ptr, device)?;

        Ok(Self {
            inner: Arc::new(StorageInner {
                ptr,
                len,
                dtype,
                device: device.clone(),
                source: Source::Owned,
            }),
        })
    }

    /// Create storage from raw bytes with explicit dtype
    pub fn from_bytes(data: &[u8], dtype: DType, device: &R::Device) -> Result<Self> {
        let len = data.len() / dtype.size_in_bytes();
        let ptr = R::allocate(data.len(), device)?;

        R::copy_to_device(data, ptr, device)?;

        Ok(Self {
            inner: Arc::new(StorageInner {
                ptr,
                len,
                dtype,
                device: device.clone(),
                source: Source::Owned,
            }),
        })
    }

    /// Wrap device memory owned by a foreign allocator
    ///
    /// The guard has already retained one share of the foreign allocation;
    /// dropping the last reference to this storage releases it. There is no
    /// deallocation path for foreign memory in this crate.
    ///
    /// # Safety
    /// - `ptr` must point to valid device memory holding at least `len`
    ///   elements of `dtype`
    /// - The foreign allocator must keep the memory alive while it has
    ///   outstanding shares
    pub(crate) unsafe fn from_foreign(
        ptr: u64,
        len: usize,
        dtype: DType,
        device: &R::Device,
        guard: ShareGuard,
    ) -> Self {
        Self {
            inner: Arc::new(StorageInner {
                ptr,
                len,
                dtype,
                device: device.clone(),
                source: Source::Foreign(guard),
            }),
        }
    }

    /// Get the raw device pointer
    #[inline]
    pub fn ptr(&self) -> u64 {
        self.inner.ptr
    }

    /// Get the number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len
    }

    /// Check if storage is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.len == 0
    }

    /// Get the element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.inner.dtype
    }

    /// Get the device
    #[inline]
    pub fn device(&self) -> &R::Device {
        &self.inner.device
    }

    /// Get size in bytes
    #[inline]
    pub fn size_in_bytes(&self) -> usize {
        self.inner.len * self.inner.dtype.size_in_bytes()
    }

    /// Get the reference count (number of tensors sharing this buffer)
    #[inline]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Whether this storage borrows memory from a foreign allocator
    #[inline]
    pub fn is_foreign(&self) -> bool {
        matches!(self.inner.source, Source::Foreign(_))
    }

    /// Get as raw buffer for passing to operations
    #[inline]
    pub fn as_raw(&self) -> RawBuffer {
        RawBuffer {
            ptr: self.inner.ptr,
            len: self.inner.len,
            dtype: self.inner.dtype,
        }
    }
}

impl<R: Runtime> Clone for Storage<R> {
    /// Clone increments the reference count (zero-copy)
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Runtime> Drop for StorageInner<R> {
    fn drop(&mut self) {
        // Foreign storage: dropping the ShareGuard field releases our share.
        // The foreign allocator decides when the memory actually dies.
        if matches!(self.source, Source::Owned) && self.ptr != 0 {
            R::deallocate(self.ptr, self.len * self.dtype.size_in_bytes(), &self.device);
        }
    }
}

impl<R: Runtime> std::fmt::Debug for Storage<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("ptr", &format!("0x{:x}", self.inner.ptr))
            .field("len", &self.inner.len)
            .field("dtype", &self.inner.dtype)
            .field("foreign", &self.is_foreign())
            .field("refs", &Arc::strong_count(&self.inner))
            .finish()
    }
}

/// Raw buffer for passing to operations
///
/// This is a simple struct that can be passed across FFI boundaries
/// without lifetime complications. Contains all info needed by kernels.
#[derive(Copy, Clone, Debug)]
pub struct RawBuffer {
    /// Device pointer
    pub ptr: u64,
    /// Number of elements
    pub len: usize,
    /// Element type
    pub dtype: DType,
}

impl RawBuffer {
    /// Create a new raw buffer
    #[inline]
    pub const fn new(ptr: u64, len: usize, dtype: DType) -> Self {
        Self { ptr, len, dtype }
    }

    /// Size in bytes
    #[inline]
    pub const fn size_in_bytes(&self) -> usize {
        self.len * self.dtype.size_in_bytes()
    }
}

// Storage tests are in the runtime and interop tests (require a concrete runtime)
