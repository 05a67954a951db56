use crate::vector::{self, VectorError};
use serde::{Deserialize, Serialize};

/// Bounding box for a detected face. Presentation only; never scored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn is_valid(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}

/// Face descriptor vector (typically 128-dimensional).
///
/// The length is whatever the detector produced; comparisons check it at
/// runtime. An empty descriptor means the detector supplied none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Descriptor {
    pub values: Vec<f32>,
}

impl Descriptor {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Cosine similarity in [-1, 1], see [`vector::cosine_similarity`].
    pub fn cosine_similarity(&self, other: &Descriptor) -> Result<f32, VectorError> {
        vector::cosine_similarity(&self.values, &other.values, vector::DEFAULT_ZERO_NORM_EPSILON)
    }

    pub fn euclidean_distance(&self, other: &Descriptor) -> Result<f32, VectorError> {
        vector::euclidean_distance(&self.values, &other.values)
    }
}

impl From<Vec<f32>> for Descriptor {
    fn from(values: Vec<f32>) -> Self {
        Self { values }
    }
}

/// Family role attached to a face after detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Unassigned,
    Parent1,
    Parent2,
    Child,
}

impl Role {
    /// Parent-like roles. Scoring only ever distinguishes parent-like from child.
    pub fn is_parent(self) -> bool {
        matches!(self, Role::Parent1 | Role::Parent2)
    }

    pub fn is_child(self) -> bool {
        self == Role::Child
    }
}

/// A detected face as handed over by the external detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    pub id: String,
    #[serde(rename = "box", default)]
    pub bbox: BoundingBox,
    #[serde(default)]
    pub descriptor: Descriptor,
    /// Detector confidence in [0, 1]. Exports without it are taken as certain.
    #[serde(default = "full_confidence")]
    pub confidence: f32,
    #[serde(default)]
    pub role: Role,
}

fn full_confidence() -> f32 {
    1.0
}

impl Face {
    pub fn new(id: impl Into<String>, descriptor: impl Into<Descriptor>) -> Self {
        Self {
            id: id.into(),
            bbox: BoundingBox::default(),
            descriptor: descriptor.into(),
            confidence: full_confidence(),
            role: Role::Unassigned,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

/// Result of comparing two descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    /// Euclidean distance, >= 0.
    pub distance: f32,
    /// Cosine similarity [-1, 1]. Reported only; not used for `score`.
    pub cosine: f32,
    /// Bounded similarity [0, 1] derived from `distance`.
    pub score: f32,
    pub is_likely_match: bool,
    /// Set when this is a zero-score stand-in for a failed comparison.
    #[serde(default)]
    pub degraded: bool,
}

impl SimilarityResult {
    /// Zero-similarity stand-in used when a comparison inside a batch fails.
    pub fn degraded() -> Self {
        Self {
            distance: 0.0,
            cosine: 0.0,
            score: 0.0,
            is_likely_match: false,
            degraded: true,
        }
    }
}
