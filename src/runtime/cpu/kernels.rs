//! CPU kernel implementations
//!
//! This module provides low-level compute kernels for CPU operations.
//! Kernels are generic over `T: Element` and dispatch based on operation
//! type. The strided variants are what make broadcast and imported-buffer
//! operands work: they follow arbitrary element strides, including the
//! stride-0 dimensions produced by broadcasting.

#![allow(unsafe_op_in_unsafe_fn)] // Kernels are already marked unsafe, inner unsafe is redundant

use crate::dtype::Element;
use crate::ops::BinaryOp;

/// Minimum element count before the contiguous kernel goes parallel
#[cfg(feature = "rayon")]
const PAR_THRESHOLD: usize = 4096;

#[inline(always)]
fn apply_binary<T: Element>(op: BinaryOp, a: T, b: T) -> T {
    match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
    }
}

// ============================================================================
// Contiguous Binary Operations
// ============================================================================

/// Execute a binary operation element-wise over contiguous buffers
///
/// # Safety
/// - `a`, `b`, and `out` must be valid pointers to `len` elements
/// - `out` must not overlap with `a` or `b` unless they are the same pointer
#[inline]
pub unsafe fn binary_op_kernel<T: Element>(
    op: BinaryOp,
    a: *const T,
    b: *const T,
    out: *mut T,
    len: usize,
) {
    let a_slice = std::slice::from_raw_parts(a, len);
    let b_slice = std::slice::from_raw_parts(b, len);
    let out_slice = std::slice::from_raw_parts_mut(out, len);

    #[cfg(feature = "rayon")]
    if len >= PAR_THRESHOLD {
        use rayon::prelude::*;
        out_slice
            .par_iter_mut()
            .zip(a_slice.par_iter().zip(b_slice.par_iter()))
            .for_each(|(o, (&x, &y))| *o = apply_binary(op, x, y));
        return;
    }

    for i in 0..len {
        out_slice[i] = apply_binary(op, a_slice[i], b_slice[i]);
    }
}

// ============================================================================
// Strided Binary Operations (for broadcasting and imported buffers)
// ============================================================================

/// Execute a binary operation with broadcasting support
///
/// Uses strides to handle arbitrary broadcasting patterns. Stride of 0 means
/// the dimension is broadcast (all indices access the same element). The
/// output is written contiguously in row-major order.
///
/// # Safety
/// - All pointers must be valid for the specified shapes and strides
/// - `out` must not overlap with `a` or `b`
#[inline]
#[allow(clippy::too_many_arguments)]
pub unsafe fn binary_op_strided_kernel<T: Element>(
    op: BinaryOp,
    a: *const T,
    b: *const T,
    out: *mut T,
    out_shape: &[usize],
    a_strides: &[isize],
    b_strides: &[isize],
    a_offset: usize,
    b_offset: usize,
) {
    let ndim = out_shape.len();
    let total = out_shape.iter().product::<usize>();

    if total == 0 {
        return;
    }

    // Incremental offset updates avoid O(ndim) recalculation per element
    let mut indices = vec![0usize; ndim];
    let mut a_idx = a_offset as isize;
    let mut b_idx = b_offset as isize;

    for out_idx in 0..total {
        *out.add(out_idx) = apply_binary(op, *a.offset(a_idx), *b.offset(b_idx));

        // Increment multi-dimensional index
        for dim in (0..ndim).rev() {
            indices[dim] += 1;
            a_idx += a_strides[dim];
            b_idx += b_strides[dim];

            if indices[dim] < out_shape[dim] {
                break;
            }

            // Reset this dimension and adjust offsets
            indices[dim] = 0;
            a_idx -= (out_shape[dim] as isize) * a_strides[dim];
            b_idx -= (out_shape[dim] as isize) * b_strides[dim];
        }
    }
}

/// Execute a binary operation in place: `a[i] = op(a[i], b[i])`
///
/// The destination `a` is strided (an imported buffer keeps its foreign
/// strides; a transposed view keeps its swapped strides) and `b` follows
/// its own strides, with stride-0 dimensions broadcasting a single value.
///
/// # Safety
/// - `a` must be valid for writes at every address reachable from `shape`
///   and `a_strides`
/// - `b` must be valid for reads likewise; `b` may alias `a` only if the
///   strides match exactly (each element is read before it is written)
#[inline]
#[allow(clippy::too_many_arguments)]
pub unsafe fn binary_assign_strided_kernel<T: Element>(
    op: BinaryOp,
    a: *mut T,
    b: *const T,
    shape: &[usize],
    a_strides: &[isize],
    b_strides: &[isize],
    a_offset: usize,
    b_offset: usize,
) {
    let ndim = shape.len();
    let total = shape.iter().product::<usize>();

    if total == 0 {
        return;
    }

    let mut indices = vec![0usize; ndim];
    let mut a_idx = a_offset as isize;
    let mut b_idx = b_offset as isize;

    for _ in 0..total {
        *a.offset(a_idx) = apply_binary(op, *a.offset(a_idx), *b.offset(b_idx));

        for dim in (0..ndim).rev() {
            indices[dim] += 1;
            a_idx += a_strides[dim];
            b_idx += b_strides[dim];

            if indices[dim] < shape[dim] {
                break;
            }

            indices[dim] = 0;
            a_idx -= (shape[dim] as isize) * a_strides[dim];
            b_idx -= (shape[dim] as isize) * b_strides[dim];
        }
    }
}
