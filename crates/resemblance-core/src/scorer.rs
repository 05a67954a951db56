//! Pairwise similarity scoring.
//!
//! [`Scorer`] is the seam every batch component goes through. The canonical
//! implementation, [`DistanceScorer`], derives the score from Euclidean
//! distance alone, which makes `compare(a, b)` and `compare(b, a)`
//! bit-for-bit identical.

use crate::config::EngineConfig;
use crate::curve::SimilarityCurve;
use crate::types::{Face, SimilarityResult};
use crate::vector::{self, Side, VectorError};
use thiserror::Error;

/// What was wrong with a descriptor that could not be scored.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DescriptorFault {
    #[error("{0} descriptor is missing")]
    Missing(Side),
    #[error("{side} descriptor has non-finite value {value} at index {index}")]
    NonFinite { side: Side, index: usize, value: f32 },
    #[error("descriptor magnitudes overflow")]
    Overflow,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoreError {
    #[error("descriptor dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(DescriptorFault),
}

impl From<VectorError> for ScoreError {
    fn from(err: VectorError) -> Self {
        match err {
            VectorError::DimensionMismatch { left, right } => {
                ScoreError::DimensionMismatch { left, right }
            }
            VectorError::InvalidVector { side, index, value } => {
                ScoreError::InvalidDescriptor(DescriptorFault::NonFinite { side, index, value })
            }
            VectorError::Overflow => ScoreError::InvalidDescriptor(DescriptorFault::Overflow),
        }
    }
}

/// Strategy for turning two descriptors into a bounded similarity.
pub trait Scorer {
    /// Compare two raw descriptors. Errors are hard failures.
    fn compare(&self, a: &[f32], b: &[f32]) -> Result<SimilarityResult, ScoreError>;

    /// Compare two face records by their descriptors.
    fn compare_faces(&self, a: &Face, b: &Face) -> Result<SimilarityResult, ScoreError> {
        self.compare(a.descriptor.as_slice(), b.descriptor.as_slice())
    }

    /// Batch entry point: a failed comparison becomes a degraded zero result
    /// so the caller can keep going over the remaining pairs.
    fn compare_or_zero(&self, a: &Face, b: &Face) -> SimilarityResult {
        match self.compare_faces(a, b) {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(
                    face_a = %a.id,
                    face_b = %b.id,
                    error = %err,
                    "comparison failed; scoring pair as 0"
                );
                SimilarityResult::degraded()
            }
        }
    }
}

/// Euclidean-distance scorer with a piecewise-linear similarity curve.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceScorer {
    curve: SimilarityCurve,
    likely_match_threshold: f32,
    zero_norm_epsilon: f32,
}

impl Default for DistanceScorer {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl DistanceScorer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            curve: config.curve.clone(),
            likely_match_threshold: config.likely_match_threshold,
            zero_norm_epsilon: config.zero_norm_epsilon,
        }
    }

    pub fn curve(&self) -> &SimilarityCurve {
        &self.curve
    }
}

impl Scorer for DistanceScorer {
    fn compare(&self, a: &[f32], b: &[f32]) -> Result<SimilarityResult, ScoreError> {
        if a.is_empty() {
            return Err(ScoreError::InvalidDescriptor(DescriptorFault::Missing(Side::Left)));
        }
        if b.is_empty() {
            return Err(ScoreError::InvalidDescriptor(DescriptorFault::Missing(Side::Right)));
        }

        let distance = vector::euclidean_distance(a, b)?;
        let cosine = vector::cosine_similarity(a, b, self.zero_norm_epsilon)?;
        let score = self.curve.score(distance).clamp(0.0, 1.0);

        Ok(SimilarityResult {
            distance,
            cosine,
            score,
            is_likely_match: distance < self.likely_match_threshold,
            degraded: false,
        })
    }
}
