//! All-pairs similarity matrix over a face set, independent of role.

use crate::scorer::{DistanceScorer, Scorer};
use crate::types::{Face, SimilarityResult};
use ndarray::Array2;
use serde::Serialize;

/// One unique (upper-triangle) comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairComparison {
    pub i: usize,
    pub j: usize,
    pub face1_id: String,
    pub face2_id: String,
    pub score: f32,
    pub result: SimilarityResult,
}

/// Symmetric N×N score matrix with 1.0 on the diagonal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseMatrix {
    face_ids: Vec<String>,
    scores: Array2<f32>,
    comparisons: Vec<PairComparison>,
}

/// Summary over the N·(N−1)/2 unique off-diagonal scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatrixStatistics {
    pub total_comparisons: usize,
    pub face_count: usize,
    pub mean: f32,
    pub median: f32,
    pub min: f32,
    pub max: f32,
    /// Population standard deviation.
    pub standard_deviation: f32,
    pub range: f32,
}

impl PairwiseMatrix {
    pub fn len(&self) -> usize {
        self.face_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.face_ids.is_empty()
    }

    pub fn face_ids(&self) -> &[String] {
        &self.face_ids
    }

    pub fn scores(&self) -> &Array2<f32> {
        &self.scores
    }

    pub fn comparisons(&self) -> &[PairComparison] {
        &self.comparisons
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        self.scores.get((i, j)).copied()
    }

    /// Unique off-diagonal scores in row-major upper-triangle order.
    pub fn upper_triangle(&self) -> Vec<f32> {
        let n = self.len();
        let mut values = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                values.push(self.scores[[i, j]]);
            }
        }
        values
    }

    /// Highest-scoring distinct pair; ties keep the earliest pair.
    pub fn most_similar_pair(&self) -> Option<&PairComparison> {
        self.comparisons.iter().fold(None, |best, c| match best {
            Some(b) if b.score >= c.score => Some(b),
            _ => Some(c),
        })
    }

    pub fn statistics(&self) -> Option<MatrixStatistics> {
        let values = self.upper_triangle();
        if values.is_empty() {
            return None;
        }

        let count = values.len();
        let mean = values.iter().sum::<f32>() / count as f32;

        let mut sorted = values.clone();
        sorted.sort_by(f32::total_cmp);
        let min = sorted[0];
        let max = sorted[count - 1];
        let median = if count % 2 == 0 {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        } else {
            sorted[count / 2]
        };

        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / count as f32;

        Some(MatrixStatistics {
            total_comparisons: count,
            face_count: self.len(),
            mean,
            median,
            min,
            max,
            standard_deviation: variance.sqrt(),
            range: max - min,
        })
    }
}

/// Statistics of an optional matrix; `None` in, `None` out.
pub fn statistics(matrix: Option<&PairwiseMatrix>) -> Option<MatrixStatistics> {
    matrix.and_then(PairwiseMatrix::statistics)
}

#[derive(Debug, Clone, Default)]
pub struct PairwiseMatrixBuilder<S = DistanceScorer> {
    scorer: S,
}

impl<S: Scorer> PairwiseMatrixBuilder<S> {
    pub fn new(scorer: S) -> Self {
        Self { scorer }
    }

    /// Build the matrix, or `None` when fewer than two faces are given.
    ///
    /// Each unordered pair is scored once and written to both cells. The
    /// diagonal is set to 1.0, never computed.
    pub fn build(&self, faces: &[Face]) -> Option<PairwiseMatrix> {
        let n = faces.len();
        if n < 2 {
            tracing::debug!(faces = n, "not enough faces for a pairwise matrix");
            return None;
        }

        let mut scores = Array2::<f32>::zeros((n, n));
        scores.diag_mut().fill(1.0);
        let mut comparisons = Vec::with_capacity(n * (n - 1) / 2);

        for i in 0..n {
            for j in (i + 1)..n {
                let result = self.scorer.compare_or_zero(&faces[i], &faces[j]);
                scores[[i, j]] = result.score;
                scores[[j, i]] = result.score;
                comparisons.push(PairComparison {
                    i,
                    j,
                    face1_id: faces[i].id.clone(),
                    face2_id: faces[j].id.clone(),
                    score: result.score,
                    result,
                });
            }
        }

        let degraded = comparisons.iter().filter(|c| c.result.degraded).count();
        tracing::debug!(
            faces = n,
            comparisons = comparisons.len(),
            degraded,
            "built pairwise matrix"
        );

        Some(PairwiseMatrix {
            face_ids: faces.iter().map(|f| f.id.clone()).collect(),
            scores,
            comparisons,
        })
    }
}
