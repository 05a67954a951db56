//! Distance-to-similarity mapping.
//!
//! A piecewise-linear, continuous, non-increasing curve through a list of
//! `(distance, score)` breakpoints. Distances past the last breakpoint keep
//! the last score.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default breakpoints, tuned for 128-d face descriptors where same-person
/// distances sit well under 0.6.
const DEFAULT_BREAKPOINTS: [(f32, f32); 5] = [
    (0.0, 1.0),
    (0.4, 0.85),
    (0.6, 0.6),
    (1.0, 0.3),
    (1.5, 0.0),
];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    #[error("curve needs at least 2 breakpoints, got {0}")]
    TooFewBreakpoints(usize),
    #[error("first breakpoint must be at distance 0, got {0}")]
    FirstNotAtZero(f32),
    #[error("breakpoint {index} is not finite")]
    NotFinite { index: usize },
    #[error("breakpoint {index}: distances must be strictly increasing")]
    DistanceNotIncreasing { index: usize },
    #[error("breakpoint {index}: score {score} outside [0, 1]")]
    ScoreOutOfRange { index: usize, score: f32 },
    #[error("breakpoint {index}: scores must not increase with distance")]
    ScoreIncreasing { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub distance: f32,
    pub score: f32,
}

/// Validated piecewise-linear curve. Construct via [`SimilarityCurve::new`]
/// or [`Default`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SimilarityCurve {
    points: Vec<Breakpoint>,
}

impl Default for SimilarityCurve {
    fn default() -> Self {
        Self {
            points: DEFAULT_BREAKPOINTS
                .iter()
                .map(|&(distance, score)| Breakpoint { distance, score })
                .collect(),
        }
    }
}

impl<'de> Deserialize<'de> for SimilarityCurve {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let points = Vec::<Breakpoint>::deserialize(deserializer)?;
        Self::new(points).map_err(serde::de::Error::custom)
    }
}

impl SimilarityCurve {
    pub fn new(points: Vec<Breakpoint>) -> Result<Self, CurveError> {
        if points.len() < 2 {
            return Err(CurveError::TooFewBreakpoints(points.len()));
        }
        for (index, p) in points.iter().enumerate() {
            if !p.distance.is_finite() || !p.score.is_finite() {
                return Err(CurveError::NotFinite { index });
            }
            if !(0.0..=1.0).contains(&p.score) {
                return Err(CurveError::ScoreOutOfRange { index, score: p.score });
            }
        }
        if points[0].distance != 0.0 {
            return Err(CurveError::FirstNotAtZero(points[0].distance));
        }
        for (i, pair) in points.windows(2).enumerate() {
            if pair[1].distance <= pair[0].distance {
                return Err(CurveError::DistanceNotIncreasing { index: i + 1 });
            }
            if pair[1].score > pair[0].score {
                return Err(CurveError::ScoreIncreasing { index: i + 1 });
            }
        }
        Ok(Self { points })
    }

    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.points
    }

    /// Map a non-negative distance to a score in [0, 1].
    ///
    /// Exact breakpoint distances return the breakpoint score unchanged so
    /// adjacent segments meet without rounding seams.
    pub fn score(&self, distance: f32) -> f32 {
        let first = self.points[0];
        if distance.is_nan() || distance <= first.distance {
            return first.score;
        }

        for pair in self.points.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if distance == hi.distance {
                return hi.score;
            }
            if distance < hi.distance {
                let t = (distance - lo.distance) / (hi.distance - lo.distance);
                return (lo.score + t * (hi.score - lo.score)).clamp(hi.score, lo.score);
            }
        }

        self.points[self.points.len() - 1].score
    }
}
