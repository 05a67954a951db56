//! Low-level vector math over raw descriptor slices.
//!
//! Every function validates its inputs first: vectors must have equal
//! length and contain only finite values. Nothing non-finite is ever
//! returned; an overflowing intermediate sum is reported as an error.

use std::fmt;
use thiserror::Error;

/// Norms below this are treated as the zero vector by [`cosine_similarity`].
pub const DEFAULT_ZERO_NORM_EPSILON: f32 = 1e-10;

/// Which argument of a two-vector operation an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VectorError {
    #[error("dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },
    #[error("non-finite value {value} at index {index} of {side} vector")]
    InvalidVector { side: Side, index: usize, value: f32 },
    #[error("intermediate sum overflowed the f32 range")]
    Overflow,
}

/// Check that a single vector contains only finite values.
pub fn check_finite(v: &[f32], side: Side) -> Result<(), VectorError> {
    match v.iter().position(|x| !x.is_finite()) {
        Some(index) => Err(VectorError::InvalidVector {
            side,
            index,
            value: v[index],
        }),
        None => Ok(()),
    }
}

/// Check that two vectors can be compared: equal length, all finite.
pub fn check_pair(a: &[f32], b: &[f32]) -> Result<(), VectorError> {
    if a.len() != b.len() {
        return Err(VectorError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    check_finite(a, Side::Left)?;
    check_finite(b, Side::Right)
}

fn finite(value: f32) -> Result<f32, VectorError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(VectorError::Overflow)
    }
}

/// Sum of element-wise products.
pub fn dot(a: &[f32], b: &[f32]) -> Result<f32, VectorError> {
    check_pair(a, b)?;
    finite(a.iter().zip(b).map(|(x, y)| x * y).sum())
}

/// Euclidean (L2) norm.
pub fn norm(a: &[f32]) -> Result<f32, VectorError> {
    check_finite(a, Side::Left)?;
    finite(a.iter().map(|x| x * x).sum::<f32>().sqrt())
}

/// Cosine similarity in [-1, 1].
///
/// Returns exactly 0.0 when either norm is below `epsilon`. A single pass
/// accumulates the dot product and both squared norms; swapping the
/// arguments only swaps the two norm accumulators, so the result is
/// bit-for-bit symmetric.
///
/// Accumulation is in `f64`: squares of finite `f32` values cannot overflow
/// it, so any pair that passes the finiteness check yields a cosine.
pub fn cosine_similarity(a: &[f32], b: &[f32], epsilon: f32) -> Result<f32, VectorError> {
    check_pair(a, b)?;

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let norm_a = norm_a.sqrt();
    let norm_b = norm_b.sqrt();
    let epsilon = f64::from(epsilon);
    if norm_a < epsilon || norm_b < epsilon || norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    let cosine = dot / (norm_a * norm_b);
    finite(cosine.clamp(-1.0, 1.0) as f32)
}

/// Straight-line distance between two vectors.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> Result<f32, VectorError> {
    check_pair(a, b)?;
    let squared: f32 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
    finite(squared.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(seed: f32, scale: f32, len: usize) -> Vec<f32> {
        (0..len).map(|i| (seed + i as f32 * 0.1).sin() * scale).collect()
    }

    #[test]
    fn test_dot_basic() {
        assert_eq!(dot(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]).unwrap(), 32.0);
    }

    #[test]
    fn test_dot_dimension_mismatch() {
        let err = dot(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert_eq!(err, VectorError::DimensionMismatch { left: 2, right: 1 });
    }

    #[test]
    fn test_norm() {
        assert!((norm(&[3.0, 4.0]).unwrap() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_identical() {
        let a = wave(1.5, 0.5, 128);
        assert!((cosine_similarity(&a, &a, DEFAULT_ZERO_NORM_EPSILON).unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal() {
        let sim = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0], DEFAULT_ZERO_NORM_EPSILON).unwrap();
        assert!(sim.abs() < 1e-6);
    }

    #[test]
    fn test_cosine_opposite() {
        let a = vec![1.0f32; 128];
        let b = vec![-1.0f32; 128];
        let sim = cosine_similarity(&a, &b, DEFAULT_ZERO_NORM_EPSILON).unwrap();
        assert!((sim + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_vector() {
        let sim = cosine_similarity(&[0.0, 0.0], &[1.0, 0.0], DEFAULT_ZERO_NORM_EPSILON).unwrap();
        assert_eq!(sim, 0.0);
    }

    #[test]
    fn test_cosine_tiny_norm_below_epsilon() {
        let a = [1e-12f32, 0.0, 0.0];
        let b = [1.0f32, 2.0, 3.0];
        assert_eq!(cosine_similarity(&a, &b, 1e-10).unwrap(), 0.0);
    }

    #[test]
    fn test_cosine_symmetric_exactly() {
        for seed in 0..5 {
            let a = wave(seed as f32, 0.5, 128);
            let b: Vec<f32> = (0..128).map(|i| (seed as f32 + i as f32 * 0.1).cos() * 0.4).collect();
            let ab = cosine_similarity(&a, &b, DEFAULT_ZERO_NORM_EPSILON).unwrap();
            let ba = cosine_similarity(&b, &a, DEFAULT_ZERO_NORM_EPSILON).unwrap();
            assert_eq!(ab.to_bits(), ba.to_bits(), "seed {seed}: {ab} vs {ba}");
        }
    }

    #[test]
    fn test_cosine_small_values_symmetric() {
        let a = [1e-8f32, 2e-8, 3e-8];
        let b = [2e-8f32, 1e-8, 4e-8];
        let ab = cosine_similarity(&a, &b, DEFAULT_ZERO_NORM_EPSILON).unwrap();
        let ba = cosine_similarity(&b, &a, DEFAULT_ZERO_NORM_EPSILON).unwrap();
        assert_eq!(ab.to_bits(), ba.to_bits());
        assert!((-1.0..=1.0).contains(&ab));
    }

    #[test]
    fn test_cosine_large_finite_values() {
        let a = [3e19f32, 3e19];
        let sim = cosine_similarity(&a, &a, DEFAULT_ZERO_NORM_EPSILON).unwrap();
        assert!((sim - 1.0).abs() < 1e-6);

        let big = [f32::MAX, f32::MAX];
        let neg = [-f32::MAX, -f32::MAX];
        let sim = cosine_similarity(&big, &neg, DEFAULT_ZERO_NORM_EPSILON).unwrap();
        assert!((sim + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_vector_with_zero_epsilon() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.3, 0.0], 0.0).unwrap(), 0.0);
    }

    #[test]
    fn test_euclidean_self_is_zero() {
        let a = wave(2.7, 0.5, 128);
        assert_eq!(euclidean_distance(&a, &a).unwrap(), 0.0);
    }

    #[test]
    fn test_euclidean_symmetric_exactly() {
        let a = wave(1.5, 0.5, 128);
        let b = wave(2.7, 0.5, 128);
        let ab = euclidean_distance(&a, &b).unwrap();
        let ba = euclidean_distance(&b, &a).unwrap();
        assert_eq!(ab.to_bits(), ba.to_bits());
        assert!(ab > 0.0);
    }

    #[test]
    fn test_euclidean_known_value() {
        assert!((euclidean_distance(&[0.0, 0.0], &[3.0, 4.0]).unwrap() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_nan_rejected() {
        let err = euclidean_distance(&[0.1, 0.2, 0.3], &[f32::NAN, 0.2, 0.3]).unwrap_err();
        assert!(matches!(
            err,
            VectorError::InvalidVector { side: Side::Right, index: 0, .. }
        ));
    }

    #[test]
    fn test_infinity_rejected() {
        let err = cosine_similarity(&[f32::INFINITY, 1.0], &[1.0, 1.0], DEFAULT_ZERO_NORM_EPSILON)
            .unwrap_err();
        assert!(matches!(err, VectorError::InvalidVector { side: Side::Left, .. }));
    }

    #[test]
    fn test_overflow_reported() {
        let a = [f32::MAX, f32::MAX];
        let b = [-f32::MAX, -f32::MAX];
        assert_eq!(euclidean_distance(&a, &b).unwrap_err(), VectorError::Overflow);
    }
}
