//! Importing foreign device buffers as tensors
//!
//! `import_foreign_buffer` is the single entry point for viewing memory
//! allocated by another library as a tensor. The returned tensor does not
//! own the memory: it holds one ownership share, taken from the foreign
//! allocator's reference count at import and returned when the last view
//! of the imported storage drops. The device memory itself is never read,
//! written, or freed by the import or the release - only by the tensor
//! operations the caller runs on the result.

use super::share::{ShareCounter, ShareGuard};
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use crate::tensor::{contiguous_strides, Layout, Storage, Tensor};
use std::sync::Arc;

/// View a foreign device buffer as a tensor without copying
///
/// Takes the raw device address of a live allocation owned by `owner`,
/// the shape and element strides describing its layout, and constructs a
/// tensor over it. Exactly one share is retained from `owner` on success;
/// a failed import leaves the count untouched. Dropping the last tensor
/// referencing the imported storage releases the share - nothing else.
///
/// Strides need not be row-major: a transposed or otherwise re-strided
/// foreign view imports as-is and the strided kernels follow it. For the
/// common contiguous case use [`import_foreign_contiguous`].
///
/// # Errors
///
/// - [`Error::InvalidPointer`] if `ptr` is null
/// - [`Error::ShapeMismatch`] if `shape` and `strides` disagree in rank
///   (the error carries the two ranks)
/// - [`Error::InvalidArgument`] for a rank-0 shape or a zero-sized
///   dimension - there is no addressable element to view
/// - [`Error::BackendLimitation`] if the backend's buffers are opaque
///   handles rather than addresses
///
/// # Safety
///
/// Pointer validity is trusted from the caller, exactly as when handing a
/// raw pointer across any FFI boundary:
/// - `ptr` must be a live device address on `device`, valid for every
///   element reachable through `shape` and `strides` at `dtype`
/// - `owner` must be the allocation's actual owner, and must keep the
///   memory alive while it has outstanding shares
pub unsafe fn import_foreign_buffer<R: Runtime>(
    ptr: u64,
    shape: &[usize],
    strides: &[isize],
    dtype: DType,
    device: &R::Device,
    owner: Arc<dyn ShareCounter>,
) -> Result<Tensor<R>> {
    if !R::supports_foreign_import() {
        return Err(Error::backend_limitation(
            R::name(),
            "import_foreign_buffer",
            "backend buffers are opaque handles, not addresses",
        ));
    }

    if ptr == 0 {
        return Err(Error::InvalidPointer);
    }

    if shape.len() != strides.len() {
        // Carries the two ranks, not the shapes themselves
        return Err(Error::ShapeMismatch {
            expected: vec![shape.len()],
            got: vec![strides.len()],
        });
    }

    if shape.is_empty() {
        return Err(Error::InvalidArgument {
            arg: "shape",
            reason: "cannot import a rank-0 buffer".to_string(),
        });
    }

    if shape.contains(&0) {
        return Err(Error::InvalidArgument {
            arg: "shape",
            reason: format!("zero-sized dimension in shape {:?}", shape),
        });
    }

    // All validation passed; only now is the owner's count touched, so a
    // failed import can never leave a stray share behind.
    let guard = ShareGuard::acquire(owner);

    let len: usize = shape.iter().product();
    let storage = unsafe { Storage::from_foreign(ptr, len, dtype, device, guard) };
    let layout = Layout::new(
        shape.iter().copied().collect(),
        strides.iter().copied().collect(),
        0,
    );

    Ok(Tensor::from_parts(storage, layout))
}

/// View a row-major foreign device buffer as a tensor without copying
///
/// Derives C-contiguous strides from `shape` and delegates to
/// [`import_foreign_buffer`]. This is the layout a freshly allocated
/// array from any row-major foreign library has.
///
/// # Safety
///
/// Same contract as [`import_foreign_buffer`].
pub unsafe fn import_foreign_contiguous<R: Runtime>(
    ptr: u64,
    shape: &[usize],
    dtype: DType,
    device: &R::Device,
    owner: Arc<dyn ShareCounter>,
) -> Result<Tensor<R>> {
    let strides = contiguous_strides(shape);
    unsafe { import_foreign_buffer::<R>(ptr, shape, &strides, dtype, device, owner) }
}
