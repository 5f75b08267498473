//! Tensor operations
//!
//! This module defines operation traits and implementations for elementwise
//! arithmetic.
//!
//! # Design
//!
//! Operations are defined as traits that are implemented by `RuntimeClient`
//! types. This gives operations access to the device for creating output
//! tensors.
//!
//! ```text
//! RuntimeClient<R>
//!   ├── implements TensorOps<R>   (allocating: c = a + b)
//!   ├── implements AssignOps<R>   (in-place:   a += b)
//!   └── implements Kernel<R>      (typed low-level loops)
//! ```
//!
//! The in-place forms exist because an imported foreign buffer is often
//! the *destination* of a computation: `z += ones` must write through the
//! foreign pointer at the imported strides, not allocate a fresh buffer.
//!
//! Both layers take any mix of runtime-owned and imported tensors; the
//! kernels only ever see pointers and strides.

mod arithmetic;

pub use arithmetic::*;

use crate::dtype::Element;
use crate::error::Result;
use crate::runtime::Runtime;
use crate::tensor::Tensor;

// ============================================================================
// Low-Level Kernel Trait (Layer 0)
// ============================================================================

/// Low-level typed kernels for compute operations
///
/// This trait defines the actual compute kernels that operate on typed
/// pointers. It is generic over `T: Element` for code reuse and
/// specialization via monomorphization. Backend implementations provide
/// optimized kernels for each operation and element type.
pub trait Kernel<R: Runtime>: Send + Sync {
    /// Element-wise binary operation over contiguous buffers
    ///
    /// # Safety
    /// - `a`, `b`, and `out` must be valid pointers to `len` elements
    /// - `out` must not overlap with `a` or `b` unless they are the same pointer
    unsafe fn binary_op<T: Element>(
        &self,
        op: BinaryOp,
        a: *const T,
        b: *const T,
        out: *mut T,
        len: usize,
    );
}

// ============================================================================
// High-Level Operation Traits (Layer 1)
// ============================================================================

/// Core tensor operations trait
///
/// Allocating elementwise arithmetic with NumPy-style broadcasting.
///
/// # Example
///
/// ```ignore
/// use tensorlink::prelude::*;
///
/// let device = CpuDevice::new();
/// let client = CpuRuntime::default_client(&device);
///
/// let a = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2], &device);
/// let b = Tensor::<CpuRuntime>::from_slice(&[5.0f32, 6.0, 7.0, 8.0], &[2, 2], &device);
///
/// let c = client.add(&a, &b)?;
/// ```
pub trait TensorOps<R: Runtime> {
    /// Element-wise addition: a + b
    fn add(&self, a: &Tensor<R>, b: &Tensor<R>) -> Result<Tensor<R>>;

    /// Element-wise subtraction: a - b
    fn sub(&self, a: &Tensor<R>, b: &Tensor<R>) -> Result<Tensor<R>>;

    /// Element-wise multiplication: a * b
    fn mul(&self, a: &Tensor<R>, b: &Tensor<R>) -> Result<Tensor<R>>;

    /// Element-wise division: a / b
    fn div(&self, a: &Tensor<R>, b: &Tensor<R>) -> Result<Tensor<R>>;
}

/// In-place tensor operations trait
///
/// These write the result through the left operand's device pointer at its
/// strides - no allocation. The right operand must broadcast **to** the
/// left operand's shape (the destination never grows).
///
/// The left operand may be non-contiguous, including an imported foreign
/// buffer with arbitrary strides.
pub trait AssignOps<R: Runtime> {
    /// In-place element-wise addition: a += b
    fn add_assign(&self, a: &Tensor<R>, b: &Tensor<R>) -> Result<()>;

    /// In-place element-wise subtraction: a -= b
    fn sub_assign(&self, a: &Tensor<R>, b: &Tensor<R>) -> Result<()>;

    /// In-place element-wise multiplication: a *= b
    fn mul_assign(&self, a: &Tensor<R>, b: &Tensor<R>) -> Result<()>;

    /// In-place element-wise division: a /= b
    fn div_assign(&self, a: &Tensor<R>, b: &Tensor<R>) -> Result<()>;
}

// ============================================================================
// Operator Sugar
// ============================================================================
//
// The std::ops impls route through the default client for the tensor's
// device. They panic on error (shape/dtype mismatch), mirroring the
// panicking constructors; use the trait methods for fallible variants.

macro_rules! impl_binary_operator {
    ($trait:ident, $method:ident) => {
        impl<'a, 'b, R> std::ops::$trait<&'b Tensor<R>> for &'a Tensor<R>
        where
            R: Runtime,
            R::Client: TensorOps<R>,
        {
            type Output = Tensor<R>;

            fn $method(self, rhs: &'b Tensor<R>) -> Tensor<R> {
                let client = R::default_client(self.device());
                TensorOps::$method(&client, self, rhs)
                    .expect(concat!("tensor ", stringify!($method), " failed"))
            }
        }
    };
}

impl_binary_operator!(Add, add);
impl_binary_operator!(Sub, sub);
impl_binary_operator!(Mul, mul);
impl_binary_operator!(Div, div);

macro_rules! impl_assign_operator {
    ($trait:ident, $method:ident) => {
        impl<'a, R> std::ops::$trait<&'a Tensor<R>> for Tensor<R>
        where
            R: Runtime,
            R::Client: AssignOps<R>,
        {
            fn $method(&mut self, rhs: &'a Tensor<R>) {
                let client = R::default_client(self.device());
                AssignOps::$method(&client, self, rhs)
                    .expect(concat!("tensor ", stringify!($method), " failed"))
            }
        }
    };
}

impl_assign_operator!(AddAssign, add_assign);
impl_assign_operator!(SubAssign, sub_assign);
impl_assign_operator!(MulAssign, mul_assign);
impl_assign_operator!(DivAssign, div_assign);
