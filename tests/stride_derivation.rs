//! Property tests for row-major stride derivation
//!
//! The import path promises that the strides it derives for a contiguous
//! buffer match what a row-major host array library computes for the same
//! shape - this is what lets an imported buffer and its host mirror agree
//! on element addressing. These tests check that promise against an
//! independently written reference over random shapes, and exercise the
//! non-contiguous import path that the derivation does not cover.

use rand::Rng;
use tensorlink::dtype::DType;
use tensorlink::interop::import_foreign_contiguous;
use tensorlink::runtime::cpu::CpuRuntime;
use tensorlink::tensor::contiguous_strides;

mod common;
use common::ForeignAllocation;

/// Reference stride computation, written the way host array libraries do
/// it: walk the shape from the trailing dimension, accumulating products.
fn reference_strides(shape: &[usize]) -> Vec<isize> {
    if shape.is_empty() {
        return Vec::new();
    }

    let mut strides = vec![1isize];
    for &dim in shape.iter().rev().take(shape.len() - 1) {
        strides.push(strides.last().unwrap() * dim as isize);
    }
    strides.reverse();
    strides
}

#[test]
fn matches_reference_for_random_shapes() {
    let mut rng = rand::rng();

    for _ in 0..200 {
        let rank = rng.random_range(1..=4);
        let shape: Vec<usize> = (0..rank).map(|_| rng.random_range(1..=10)).collect();

        assert_eq!(
            contiguous_strides(&shape).as_slice(),
            reference_strides(&shape).as_slice(),
            "shape {:?}",
            shape
        );
    }
}

#[test]
fn rank_edge_cases() {
    // Rank-0 (scalar): no dimensions, no strides
    assert!(contiguous_strides(&[]).is_empty());

    // Rank-1: single unit stride regardless of length
    assert_eq!(contiguous_strides(&[1]).as_slice(), &[1]);
    assert_eq!(contiguous_strides(&[9]).as_slice(), &[1]);
}

#[test]
fn contiguous_import_is_contiguous_for_random_shapes() {
    let mut rng = rand::rng();

    for _ in 0..50 {
        let rank = rng.random_range(1..=4);
        let shape: Vec<usize> = (0..rank).map(|_| rng.random_range(1..=6)).collect();

        let foreign = ForeignAllocation::zeros(&shape, DType::F32);
        let t = unsafe {
            import_foreign_contiguous::<CpuRuntime>(
                foreign.ptr,
                &shape,
                DType::F32,
                &foreign.device,
                foreign.owner(),
            )
        }
        .unwrap();

        assert!(t.is_contiguous(), "shape {:?}", shape);
        assert_eq!(t.strides(), contiguous_strides(&shape).as_slice());
    }
}

#[test]
fn transposed_strides_address_the_same_memory() {
    use tensorlink::interop::import_foreign_buffer;

    let mut rng = rand::rng();

    for _ in 0..50 {
        let rows = rng.random_range(1..=8usize);
        let cols = rng.random_range(1..=8usize);

        // Row-major (rows x cols) buffer of sequential values
        let data: Vec<f32> = (0..rows * cols).map(|i| i as f32).collect();
        let foreign = ForeignAllocation::from_f32(&data);

        // Import as the (cols x rows) transpose via column-first strides
        let t = unsafe {
            import_foreign_buffer::<CpuRuntime>(
                foreign.ptr,
                &[cols, rows],
                &[1, cols as isize],
                DType::F32,
                &foreign.device,
                foreign.owner(),
            )
        }
        .unwrap();

        let host: Vec<f32> = t.to_vec();

        // Host-side transpose of the original data
        let mut expected = vec![0.0f32; rows * cols];
        for r in 0..rows {
            for c in 0..cols {
                expected[c * rows + r] = data[r * cols + c];
            }
        }

        assert_eq!(host, expected, "rows {} cols {}", rows, cols);
    }
}
