//! Kernel trait implementation for CPU runtime

use super::client::CpuClient;
use super::kernels;
use super::CpuRuntime;
use crate::dtype::Element;
use crate::ops::{BinaryOp, Kernel};

#[allow(unsafe_op_in_unsafe_fn)] // Kernels are already marked unsafe
impl Kernel<CpuRuntime> for CpuClient {
    unsafe fn binary_op<T: Element>(
        &self,
        op: BinaryOp,
        a: *const T,
        b: *const T,
        out: *mut T,
        len: usize,
    ) {
        kernels::binary_op_kernel(op, a, b, out, len);
    }
}
