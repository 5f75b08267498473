//! # tensorlink
//!
//! **Zero-copy import of foreign device buffers into a small multi-backend
//! tensor runtime.**
//!
//! tensorlink lets a tensor runtime view device memory that was allocated by
//! a *different* library - a CUDA array library, a custom allocator, another
//! framework's memory pool - without copying it and without either side losing
//! track of who may free it. The imported buffer behaves like any other
//! tensor: it has a shape, strides and a dtype, and it participates in
//! elementwise arithmetic, including the in-place forms that write straight
//! through the foreign pointer.
//!
//! ## How ownership is shared
//!
//! The foreign allocator exposes its reference count through the
//! [`ShareCounter`](interop::ShareCounter) trait. Importing a buffer retains
//! exactly one share; dropping the last tensor referencing the imported
//! storage releases exactly one share. The foreign memory itself is never
//! freed by this crate - the foreign allocator stays the sole deallocation
//! authority.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tensorlink::prelude::*;
//! use std::sync::Arc;
//!
//! let device = CpuDevice::new();
//! let shares = Arc::new(AtomicShareCount::new());
//!
//! // `ptr` points at memory owned by some other allocator.
//! let z = unsafe {
//!     import_foreign_contiguous::<CpuRuntime>(ptr, &[3, 4, 5], DType::F32, &device, shares)?
//! };
//!
//! let client = CpuRuntime::default_client(&device);
//! let ones = Tensor::<CpuRuntime>::ones(&[1, 1, 1], DType::F32, &device);
//! client.add_assign(&z, &ones)?; // writes through the foreign pointer
//! ```
//!
//! ## Feature Flags
//!
//! - `rayon` (default): multi-threaded CPU kernels
//! - `f16`: half-precision floats (F16, BF16) via the `half` crate

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dtype;
pub mod error;
pub mod interop;
pub mod ops;
pub mod runtime;
pub mod tensor;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::dtype::DType;
    pub use crate::error::{Error, Result};
    pub use crate::interop::{
        import_foreign_buffer, import_foreign_contiguous, AtomicShareCount, DeviceCapabilities,
        ShareCounter,
    };
    pub use crate::ops::{AssignOps, TensorOps};
    pub use crate::runtime::cpu::{CpuDevice, CpuRuntime};
    pub use crate::runtime::{Device, Runtime, RuntimeClient};
    pub use crate::tensor::{Layout, Tensor};
}

/// Default runtime for this build
///
/// Only the CPU reference backend is bundled; GPU backends implement
/// [`runtime::Runtime`] out of tree and reuse the same import path.
pub type DefaultRuntime = runtime::cpu::CpuRuntime;
