//! Compile test: simulates an external crate implementing tensorlink traits.
//!
//! If this test compiles, the runtime API is implementable by downstream
//! GPU backends. It also exercises the one runtime-dependent policy of the
//! import path: a backend whose buffers are opaque handles (no addresses)
//! must reject foreign pointer imports without touching the owner's count.

use std::sync::Arc;

use tensorlink::dtype::DType;
use tensorlink::error::{self, Error};
use tensorlink::interop::{import_foreign_buffer, AtomicShareCount, DeviceCapabilities, ShareCounter};
use tensorlink::runtime::{Device, Runtime, RuntimeClient};

// =============================================================================
// Mock backend with opaque buffer handles
// =============================================================================

#[derive(Clone)]
struct MockDevice;

impl Device for MockDevice {
    fn id(&self) -> usize {
        0
    }
}

#[derive(Clone)]
struct MockClient;

#[derive(Clone)]
struct MockRuntime;

impl Runtime for MockRuntime {
    type Device = MockDevice;
    type Client = MockClient;

    fn name() -> &'static str {
        "mock"
    }

    // Buffers are opaque IDs on this backend; raw pointers mean nothing
    fn supports_foreign_import() -> bool {
        false
    }

    fn allocate(_size_bytes: usize, _device: &Self::Device) -> error::Result<u64> {
        Ok(0)
    }

    fn deallocate(_ptr: u64, _size_bytes: usize, _device: &Self::Device) {}

    fn copy_to_device(_src: &[u8], _dst: u64, _device: &Self::Device) -> error::Result<()> {
        Ok(())
    }

    fn copy_from_device(_src: u64, _dst: &mut [u8], _device: &Self::Device) -> error::Result<()> {
        Ok(())
    }

    fn copy_strided(
        _src_handle: u64,
        _src_byte_offset: usize,
        _dst_handle: u64,
        _shape: &[usize],
        _strides: &[isize],
        _elem_size: usize,
        _device: &Self::Device,
    ) -> error::Result<()> {
        Ok(())
    }

    fn default_device() -> Self::Device {
        MockDevice
    }

    fn default_client(_device: &Self::Device) -> Self::Client {
        MockClient
    }
}

impl RuntimeClient<MockRuntime> for MockClient {
    fn device(&self) -> &MockDevice {
        &MockDevice
    }

    fn synchronize(&self) {}
}

#[test]
fn external_backend_compiles() {
    // If we got here, the traits compiled with a minimal impl
    let device = MockRuntime::default_device();
    let client = MockRuntime::default_client(&device);
    client.synchronize();
}

#[test]
fn capabilities_reflect_backend_policy() {
    let caps = DeviceCapabilities::probe::<MockRuntime>(&MockDevice);
    assert_eq!(caps.runtime(), "mock");
    assert!(!caps.supports_foreign_import());
}

#[test]
fn opaque_buffer_backend_rejects_import() {
    let owner = Arc::new(AtomicShareCount::new());

    let result = unsafe {
        import_foreign_buffer::<MockRuntime>(
            0x1000,
            &[3, 4],
            &[4, 1],
            DType::F32,
            &MockDevice,
            owner.clone(),
        )
    };

    assert!(matches!(result, Err(Error::BackendLimitation { .. })));
    assert_eq!(owner.count(), 1);
}
