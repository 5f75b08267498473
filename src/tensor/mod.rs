//! Tensor types and operations
//!
//! This module provides the core `Tensor` type, which represents an
//! n-dimensional array stored on a compute device, whether the memory was
//! allocated by this runtime or borrowed from a foreign allocator.

mod core;
mod layout;
mod storage;

pub use core::Tensor;
pub use layout::{contiguous_strides, Layout, Shape, Strides};
pub use storage::{RawBuffer, Storage};
