//! TensorOps and AssignOps implementations for CPU runtime
//!
//! This module contains the high-level operation trait implementations that
//! dispatch to the low-level kernels.

use super::helpers::{binary_assign_impl, binary_op_impl};
use super::{CpuClient, CpuRuntime};
use crate::error::Result;
use crate::ops::{AssignOps, BinaryOp, TensorOps};
use crate::tensor::Tensor;

impl TensorOps<CpuRuntime> for CpuClient {
    fn add(&self, a: &Tensor<CpuRuntime>, b: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
        binary_op_impl(self, BinaryOp::Add, a, b, "add")
    }

    fn sub(&self, a: &Tensor<CpuRuntime>, b: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
        binary_op_impl(self, BinaryOp::Sub, a, b, "sub")
    }

    fn mul(&self, a: &Tensor<CpuRuntime>, b: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
        binary_op_impl(self, BinaryOp::Mul, a, b, "mul")
    }

    fn div(&self, a: &Tensor<CpuRuntime>, b: &Tensor<CpuRuntime>) -> Result<Tensor<CpuRuntime>> {
        binary_op_impl(self, BinaryOp::Div, a, b, "div")
    }
}

impl AssignOps<CpuRuntime> for CpuClient {
    fn add_assign(&self, a: &Tensor<CpuRuntime>, b: &Tensor<CpuRuntime>) -> Result<()> {
        binary_assign_impl(self, BinaryOp::Add, a, b, "add_assign")
    }

    fn sub_assign(&self, a: &Tensor<CpuRuntime>, b: &Tensor<CpuRuntime>) -> Result<()> {
        binary_assign_impl(self, BinaryOp::Sub, a, b, "sub_assign")
    }

    fn mul_assign(&self, a: &Tensor<CpuRuntime>, b: &Tensor<CpuRuntime>) -> Result<()> {
        binary_assign_impl(self, BinaryOp::Mul, a, b, "mul_assign")
    }

    fn div_assign(&self, a: &Tensor<CpuRuntime>, b: &Tensor<CpuRuntime>) -> Result<()> {
        binary_assign_impl(self, BinaryOp::Div, a, b, "div_assign")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::DType;
    use crate::runtime::cpu::CpuDevice;
    use crate::runtime::Runtime;

    fn client() -> CpuClient {
        CpuRuntime::default_client(&CpuDevice::new())
    }

    #[test]
    fn test_add_same_shape() {
        let device = CpuDevice::new();
        let a = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2], &device);
        let b = Tensor::<CpuRuntime>::from_slice(&[5.0f32, 6.0, 7.0, 8.0], &[2, 2], &device);

        let c = client().add(&a, &b).unwrap();
        let result: Vec<f32> = c.to_vec();
        assert_eq!(result, [6.0, 8.0, 10.0, 12.0]);
    }

    #[test]
    fn test_add_broadcast() {
        let device = CpuDevice::new();
        let a = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3], &device);
        let b = Tensor::<CpuRuntime>::from_slice(&[10.0f32, 20.0, 30.0], &[3], &device);

        let c = client().add(&a, &b).unwrap();
        assert_eq!(c.shape(), &[2, 3]);
        let result: Vec<f32> = c.to_vec();
        assert_eq!(result, [11.0, 22.0, 33.0, 14.0, 25.0, 36.0]);
    }

    #[test]
    fn test_mul_broadcast_scalar_shape() {
        let device = CpuDevice::new();
        let a = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2], &device);
        let b = Tensor::<CpuRuntime>::full_scalar(&[1, 1], DType::F32, 3.0, &device);

        let c = client().mul(&a, &b).unwrap();
        let result: Vec<f32> = c.to_vec();
        assert_eq!(result, [3.0, 6.0, 9.0, 12.0]);
    }

    #[test]
    fn test_add_assign_same_shape() {
        let device = CpuDevice::new();
        let a = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0], &[3], &device);
        let b = Tensor::<CpuRuntime>::from_slice(&[10.0f32, 20.0, 30.0], &[3], &device);

        client().add_assign(&a, &b).unwrap();
        let result: Vec<f32> = a.to_vec();
        assert_eq!(result, [11.0, 22.0, 33.0]);
    }

    #[test]
    fn test_add_assign_broadcast() {
        let device = CpuDevice::new();
        let a = Tensor::<CpuRuntime>::zeros(&[3, 4, 5], DType::F32, &device);
        let ones = Tensor::<CpuRuntime>::ones(&[1, 1, 1], DType::F32, &device);

        client().add_assign(&a, &ones).unwrap();
        let result: Vec<f32> = a.to_vec();
        assert!(result.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_add_assign_rejects_growing_destination() {
        let device = CpuDevice::new();
        let a = Tensor::<CpuRuntime>::zeros(&[1, 1, 1], DType::F32, &device);
        let b = Tensor::<CpuRuntime>::zeros(&[3, 4, 5], DType::F32, &device);

        // b broadcasts over a, but the destination cannot grow
        assert!(client().add_assign(&a, &b).is_err());
    }

    #[test]
    fn test_add_assign_noncontiguous_destination() {
        let device = CpuDevice::new();
        // [[1, 2, 3], [4, 5, 6]] viewed transposed: [[1, 4], [2, 5], [3, 6]]
        let base =
            Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3], &device);
        let view = base.transpose(0, 1).unwrap();
        let inc = Tensor::<CpuRuntime>::from_slice(
            &[10.0f32, 20.0, 30.0, 40.0, 50.0, 60.0],
            &[3, 2],
            &device,
        );

        client().add_assign(&view, &inc).unwrap();

        // Writes land in the base tensor's memory at transposed addresses
        let result: Vec<f32> = base.to_vec();
        assert_eq!(result, [11.0, 32.0, 53.0, 24.0, 45.0, 66.0]);
    }

    #[test]
    fn test_dtype_mismatch() {
        let device = CpuDevice::new();
        let a = Tensor::<CpuRuntime>::zeros(&[2], DType::F32, &device);
        let b = Tensor::<CpuRuntime>::zeros(&[2], DType::F64, &device);

        assert!(client().add(&a, &b).is_err());
        assert!(client().add_assign(&a, &b).is_err());
    }

    #[test]
    fn test_operator_sugar() {
        let device = CpuDevice::new();
        let a = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0], &[2], &device);
        let b = Tensor::<CpuRuntime>::from_slice(&[3.0f32, 4.0], &[2], &device);

        let c = &a + &b;
        let result: Vec<f32> = c.to_vec();
        assert_eq!(result, [4.0, 6.0]);

        let mut d = a.clone();
        d += &b;
        let result: Vec<f32> = d.to_vec();
        assert_eq!(result, [4.0, 6.0]);
    }
}
