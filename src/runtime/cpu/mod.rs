//! CPU runtime implementation
//!
//! The CPU runtime uses standard heap allocation and provides the reference
//! implementation for all tensor operations.
//!
//! # Broadcasting
//!
//! NumPy-style broadcasting is fully supported for binary arithmetic
//! operations, allocating and in-place. Shapes are broadcast according to
//! standard rules: dimensions are right-aligned and expanded where one
//! operand has size 1.
//!
//! # Non-contiguous Tensors
//!
//! Operations handle non-contiguous tensors via strided memory access. For
//! broadcasting, a strided kernel is used that correctly handles stride-0
//! dimensions (where a single value is broadcast across the dimension).
//! This is also what makes imported foreign buffers with arbitrary strides
//! work as ordinary operands.

mod client;
mod device;
pub(crate) mod helpers;
mod kernel;
pub(crate) mod kernels;
mod ops;
mod runtime;

pub use client::CpuClient;
pub use device::CpuDevice;
pub use runtime::CpuRuntime;
