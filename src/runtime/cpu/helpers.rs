//! Helper functions for CPU tensor operations
//!
//! This module contains shared helper functions used by the TensorOps and
//! AssignOps implementations.

use super::{kernels, CpuClient, CpuRuntime};
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::ops::{broadcast_shape, BinaryOp, Kernel};
use crate::tensor::Tensor;

// ============================================================================
// DType Dispatch Macro
// ============================================================================

/// Macro for dtype dispatch to typed kernel calls
///
/// This macro matches on dtype and executes the code block with the
/// appropriate type. Usage:
/// `dispatch_dtype!(dtype, T => { code using T }, "op_name")`
///
/// F16 and BF16 are supported when the "f16" feature is enabled; without
/// it these types return an `UnsupportedDType` error.
macro_rules! dispatch_dtype {
    ($dtype:expr, $T:ident => $body:block, $error_op:expr) => {
        match $dtype {
            DType::F64 => {
                type $T = f64;
                $body
            }
            DType::F32 => {
                type $T = f32;
                $body
            }
            DType::F16 => {
                #[cfg(feature = "f16")]
                {
                    type $T = half::f16;
                    $body
                }
                #[cfg(not(feature = "f16"))]
                {
                    return Err(Error::UnsupportedDType {
                        dtype: $dtype,
                        op: $error_op,
                    });
                }
            }
            DType::BF16 => {
                #[cfg(feature = "f16")]
                {
                    type $T = half::bf16;
                    $body
                }
                #[cfg(not(feature = "f16"))]
                {
                    return Err(Error::UnsupportedDType {
                        dtype: $dtype,
                        op: $error_op,
                    });
                }
            }
            DType::I64 => {
                type $T = i64;
                $body
            }
            DType::I32 => {
                type $T = i32;
                $body
            }
            DType::I16 => {
                type $T = i16;
                $body
            }
            DType::I8 => {
                type $T = i8;
                $body
            }
            DType::U64 => {
                type $T = u64;
                $body
            }
            DType::U32 => {
                type $T = u32;
                $body
            }
            DType::U16 => {
                type $T = u16;
                $body
            }
            DType::U8 => {
                type $T = u8;
                $body
            }
            DType::Bool => {
                return Err(Error::UnsupportedDType {
                    dtype: $dtype,
                    op: $error_op,
                })
            }
        }
    };
}

pub(super) use dispatch_dtype;

// ============================================================================
// Helper Functions
// ============================================================================

/// Validate that two tensors have matching dtypes for binary operations.
#[inline]
pub(super) fn validate_binary_dtypes(
    a: &Tensor<CpuRuntime>,
    b: &Tensor<CpuRuntime>,
) -> Result<DType> {
    if a.dtype() != b.dtype() {
        return Err(Error::DTypeMismatch {
            lhs: a.dtype(),
            rhs: b.dtype(),
        });
    }
    Ok(a.dtype())
}

/// Compute broadcast shape for binary operations.
#[inline]
pub(super) fn compute_broadcast_shape(
    a: &Tensor<CpuRuntime>,
    b: &Tensor<CpuRuntime>,
) -> Result<Vec<usize>> {
    broadcast_shape(a.shape(), b.shape()).ok_or_else(|| Error::BroadcastError {
        lhs: a.shape().to_vec(),
        rhs: b.shape().to_vec(),
    })
}

// ============================================================================
// Operation Implementation Helpers
// ============================================================================

pub(super) fn binary_op_impl(
    client: &CpuClient,
    op: BinaryOp,
    a: &Tensor<CpuRuntime>,
    b: &Tensor<CpuRuntime>,
    op_name: &'static str,
) -> Result<Tensor<CpuRuntime>> {
    let dtype = validate_binary_dtypes(a, b)?;
    let out_shape = compute_broadcast_shape(a, b)?;

    let out = Tensor::<CpuRuntime>::try_empty(&out_shape, dtype, &client.device)?;
    let out_ptr = out.storage().ptr();

    // Fast path: same shapes, both contiguous
    let same_shapes = a.shape() == b.shape() && a.shape() == out_shape.as_slice();
    let both_contiguous = a.is_contiguous() && b.is_contiguous();

    if same_shapes && both_contiguous {
        let len = a.numel();
        let a_ptr = a.storage().ptr();
        let b_ptr = b.storage().ptr();

        dispatch_dtype!(dtype, T => {
            unsafe {
                <CpuClient as Kernel<CpuRuntime>>::binary_op::<T>(
                    client, op,
                    a_ptr as *const T,
                    b_ptr as *const T,
                    out_ptr as *mut T,
                    len,
                );
            }
        }, op_name);
    } else {
        // Broadcasting path: zero-copy views with stride 0 for broadcast dims
        let a_broadcast = a.broadcast_to(&out_shape)?;
        let b_broadcast = b.broadcast_to(&out_shape)?;

        let a_ptr = a_broadcast.storage().ptr();
        let b_ptr = b_broadcast.storage().ptr();

        dispatch_dtype!(dtype, T => {
            unsafe {
                kernels::binary_op_strided_kernel::<T>(
                    op,
                    a_ptr as *const T,
                    b_ptr as *const T,
                    out_ptr as *mut T,
                    &out_shape,
                    a_broadcast.strides(),
                    b_broadcast.strides(),
                    a_broadcast.layout().offset(),
                    b_broadcast.layout().offset(),
                );
            }
        }, op_name);
    }

    Ok(out)
}

pub(super) fn binary_assign_impl(
    _client: &CpuClient,
    op: BinaryOp,
    a: &Tensor<CpuRuntime>,
    b: &Tensor<CpuRuntime>,
    op_name: &'static str,
) -> Result<()> {
    let dtype = validate_binary_dtypes(a, b)?;

    // In place, the result lands in `a`, so `b` must broadcast to `a`'s
    // shape - the destination never grows.
    let out_shape = compute_broadcast_shape(a, b)?;
    if out_shape.as_slice() != a.shape() {
        return Err(Error::BroadcastError {
            lhs: a.shape().to_vec(),
            rhs: b.shape().to_vec(),
        });
    }

    let b_broadcast = b.broadcast_to(a.shape())?;

    let a_ptr = a.storage().ptr();
    let b_ptr = b_broadcast.storage().ptr();

    dispatch_dtype!(dtype, T => {
        unsafe {
            kernels::binary_assign_strided_kernel::<T>(
                op,
                a_ptr as *mut T,
                b_ptr as *const T,
                a.shape(),
                a.strides(),
                b_broadcast.strides(),
                a.layout().offset(),
                b_broadcast.layout().offset(),
            );
        }
    }, op_name);

    Ok(())
}
