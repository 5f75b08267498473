//! Shared test fixtures
//!
//! `ForeignAllocation` stands in for an external device array library: it
//! owns one allocation outright and exposes its reference count through
//! `AtomicShareCount`. Its Drop is the allocator-side check of the import
//! contract - the share count must be back at the allocator's own
//! baseline before the memory dies.
#![allow(dead_code)]

use std::sync::Arc;

use tensorlink::dtype::DType;
use tensorlink::interop::{AtomicShareCount, ShareCounter};
use tensorlink::runtime::cpu::{CpuDevice, CpuRuntime};
use tensorlink::runtime::Runtime;

/// Mock foreign allocator owning a single device allocation
pub struct ForeignAllocation {
    pub ptr: u64,
    pub device: CpuDevice,
    size_bytes: usize,
    shares: Arc<AtomicShareCount>,
}

impl ForeignAllocation {
    /// Allocate a zero-filled buffer for `shape` elements of `dtype`
    pub fn zeros(shape: &[usize], dtype: DType) -> Self {
        let device = CpuDevice::new();
        let size_bytes = shape.iter().product::<usize>() * dtype.size_in_bytes();
        let ptr = CpuRuntime::allocate(size_bytes, &device).unwrap();
        Self {
            ptr,
            device,
            size_bytes,
            shares: Arc::new(AtomicShareCount::new()),
        }
    }

    /// Allocate a buffer holding a copy of `data`
    pub fn from_f32(data: &[f32]) -> Self {
        let device = CpuDevice::new();
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let ptr = CpuRuntime::allocate(bytes.len(), &device).unwrap();
        CpuRuntime::copy_to_device(bytes, ptr, &device).unwrap();
        Self {
            ptr,
            device,
            size_bytes: bytes.len(),
            shares: Arc::new(AtomicShareCount::new()),
        }
    }

    /// The allocation's reference count handle, as imports consume it
    pub fn owner(&self) -> Arc<dyn ShareCounter> {
        self.shares.clone()
    }

    /// Current share count (1 = only the allocator's own share)
    pub fn share_count(&self) -> usize {
        self.shares.count()
    }

    /// Read the allocation back to the host, bypassing any tensor view
    pub fn read_f32(&self) -> Vec<f32> {
        let mut bytes = vec![0u8; self.size_bytes];
        CpuRuntime::copy_from_device(self.ptr, &mut bytes, &self.device).unwrap();
        bytemuck::cast_slice(&bytes).to_vec()
    }
}

impl Drop for ForeignAllocation {
    fn drop(&mut self) {
        assert_eq!(
            self.shares.count(),
            1,
            "foreign allocation dropped while import shares are outstanding"
        );
        CpuRuntime::deallocate(self.ptr, self.size_bytes, &self.device);
    }
}
