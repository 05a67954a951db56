//! resemblance-core — Family resemblance scoring engine.
//!
//! Turns externally extracted face descriptors into bounded similarity
//! scores, picks the most similar parent for each child, builds pairwise
//! similarity matrices and checks consistency across several photos.

pub mod config;
pub mod curve;
pub mod display;
pub mod matrix;
pub mod resemblance;
pub mod scorer;
pub mod source;
pub mod types;
pub mod validation;
pub mod vector;

pub use config::{ConfigError, EngineConfig, ValidationThresholds};
pub use curve::{Breakpoint, SimilarityCurve};
pub use matrix::{statistics, MatrixStatistics, PairwiseMatrix, PairwiseMatrixBuilder};
pub use resemblance::{ChildResemblance, ParentScore, ResemblanceAnalyzer};
pub use scorer::{DistanceScorer, ScoreError, Scorer};
pub use source::{FaceSource, JsonFaceSource, SourceError};
pub use types::{BoundingBox, Descriptor, Face, Role, SimilarityResult};
pub use validation::{ChildPairing, MultiPhotoValidator, ValidationReport};
pub use vector::VectorError;

/// Scorer, analyzer, matrix builder and validator sharing one configuration.
#[derive(Debug, Clone)]
pub struct Engine {
    pub analyzer: ResemblanceAnalyzer<DistanceScorer>,
    pub matrix: PairwiseMatrixBuilder<DistanceScorer>,
    pub validator: MultiPhotoValidator,
}

impl Engine {
    pub fn new(config: &EngineConfig) -> Self {
        let scorer = DistanceScorer::new(config);
        Self {
            analyzer: ResemblanceAnalyzer::new(scorer.clone()),
            matrix: PairwiseMatrixBuilder::new(scorer),
            validator: MultiPhotoValidator::new(config.validation),
        }
    }

    pub fn scorer(&self) -> &DistanceScorer {
        self.analyzer.scorer()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}
