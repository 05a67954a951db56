//! Cross-photo consistency of best-parent assignments.
//!
//! Each photo of the same family is analyzed independently; a child is
//! consistent when every photo picks the same best parent for it.
//!
//! By default children are paired across photos by position (`child_index`),
//! which assumes detection order is stable between photos. It is not
//! guaranteed to be; callers that can supply a stable per-person id should
//! use [`ChildPairing::ByChildId`].

use crate::config::ValidationThresholds;
use crate::resemblance::ChildResemblance;
use serde::{Deserialize, Serialize};

/// How children in different photos are identified as the same person.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildPairing {
    /// Same position in each photo's result list.
    #[default]
    Positional,
    /// Same `child.id` in each photo.
    ByChildId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub consistency_score: f32,
    pub confidence: f32,
    pub children_compared: usize,
    pub consistent_children: usize,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MultiPhotoValidator {
    thresholds: ValidationThresholds,
    pairing: ChildPairing,
}

impl MultiPhotoValidator {
    pub fn new(thresholds: ValidationThresholds) -> Self {
        Self {
            thresholds,
            pairing: ChildPairing::default(),
        }
    }

    pub fn with_pairing(mut self, pairing: ChildPairing) -> Self {
        self.pairing = pairing;
        self
    }

    pub fn validate(&self, per_photo: &[Vec<ChildResemblance>]) -> ValidationReport {
        if per_photo.len() < 2 {
            return ValidationReport {
                is_valid: true,
                consistency_score: 1.0,
                confidence: 1.0,
                children_compared: per_photo.first().map_or(0, Vec::len),
                consistent_children: per_photo.first().map_or(0, Vec::len),
                recommendations: vec![
                    "Single photo analyzed; add more photos of the same family to cross-check results."
                        .to_string(),
                ],
            };
        }

        let (first, others) = (&per_photo[0], &per_photo[1..]);
        if first.is_empty() {
            return ValidationReport {
                is_valid: false,
                consistency_score: 0.0,
                confidence: 0.0,
                children_compared: 0,
                consistent_children: 0,
                recommendations: vec![
                    "No children found in the first photo; label at least one child in every photo."
                        .to_string(),
                ],
            };
        }

        let mut inconsistent = Vec::new();
        for child in first {
            let agrees = others.iter().all(|photo| {
                self.counterpart(child, photo)
                    .is_some_and(|other| other.best_parent_id() == child.best_parent_id())
            });
            if !agrees {
                inconsistent.push(child.child_index + 1);
            }
        }

        let compared = first.len();
        let consistent = compared - inconsistent.len();
        let score = (consistent as f32 / compared as f32).clamp(0.0, 1.0);

        tracing::debug!(
            photos = per_photo.len(),
            compared,
            consistent,
            score,
            pairing = ?self.pairing,
            "cross-photo validation"
        );

        let mut recommendations = Vec::new();
        let is_valid = score >= self.thresholds.valid;
        if !is_valid {
            recommendations.push(
                "Results vary between photos. Use clearer, well-lit photos with faces looking at the camera."
                    .to_string(),
            );
            let list: Vec<String> = inconsistent.iter().map(usize::to_string).collect();
            recommendations.push(format!(
                "Inconsistent best match for child {}; check that children are labeled in the same order in every photo.",
                list.join(", ")
            ));
        } else if score < self.thresholds.excellent {
            recommendations.push(
                "Good consistency across photos; results are reasonably reliable.".to_string(),
            );
        } else {
            recommendations.push(
                "Excellent consistency across photos; results are highly reliable.".to_string(),
            );
        }

        ValidationReport {
            is_valid,
            consistency_score: score,
            confidence: score,
            children_compared: compared,
            consistent_children: consistent,
            recommendations,
        }
    }

    fn counterpart<'a>(
        &self,
        child: &ChildResemblance,
        photo: &'a [ChildResemblance],
    ) -> Option<&'a ChildResemblance> {
        match self.pairing {
            ChildPairing::Positional => photo.get(child.child_index),
            ChildPairing::ByChildId => photo.iter().find(|c| c.child.id == child.child.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Face;

    fn result(child_index: usize, child_id: &str, best: &str) -> ChildResemblance {
        let parent = Face::new(best, vec![0.0]);
        ChildResemblance {
            child_index,
            face_index: None,
            child: Face::new(child_id, vec![0.0]),
            per_parent_scores: Vec::new(),
            best_parent: parent,
            best_score: 0.9,
        }
    }

    fn photo(bests: &[&str]) -> Vec<ChildResemblance> {
        bests
            .iter()
            .enumerate()
            .map(|(i, b)| result(i, &format!("child_{i}"), b))
            .collect()
    }

    #[test]
    fn test_single_photo_is_trivially_valid() {
        let report = MultiPhotoValidator::default().validate(&[photo(&["mom"])]);
        assert!(report.is_valid);
        assert_eq!(report.confidence, 1.0);
        assert_eq!(report.consistency_score, 1.0);

        let report = MultiPhotoValidator::default().validate(&[]);
        assert!(report.is_valid);
        assert_eq!(report.confidence, 1.0);
    }

    #[test]
    fn test_full_agreement_is_excellent() {
        let photos = [photo(&["mom", "dad"]), photo(&["mom", "dad"]), photo(&["mom", "dad"])];
        let report = MultiPhotoValidator::default().validate(&photos);
        assert!(report.is_valid);
        assert_eq!(report.consistency_score, 1.0);
        assert_eq!(report.confidence, report.consistency_score);
        assert!(report.recommendations[0].contains("Excellent"));
    }

    #[test]
    fn test_first_child_disagrees() {
        let photos = [photo(&["mom", "dad"]), photo(&["dad", "dad"])];
        let report = MultiPhotoValidator::default().validate(&photos);
        assert_eq!(report.children_compared, 2);
        assert_eq!(report.consistent_children, 1);
        assert!((report.consistency_score - 0.5).abs() < 1e-6);
        assert!(!report.is_valid);
        assert!(report.recommendations[0].contains("clearer"));
        assert!(report.recommendations[1].contains("child 1"));
    }

    #[test]
    fn test_good_band() {
        let first = photo(&["mom", "dad", "mom", "dad", "mom"]);
        let second = photo(&["mom", "dad", "mom", "dad", "dad"]);
        let report = MultiPhotoValidator::default().validate(&[first, second]);
        assert!((report.consistency_score - 0.8).abs() < 1e-6);
        assert!(report.is_valid);
        assert!(report.recommendations[0].contains("Good"));
    }

    #[test]
    fn test_missing_counterpart_is_inconsistent() {
        let photos = [photo(&["mom", "dad"]), photo(&["mom"])];
        let report = MultiPhotoValidator::default().validate(&photos);
        assert_eq!(report.consistent_children, 1);
        assert!(!report.is_valid);
    }

    #[test]
    fn test_empty_first_photo() {
        let report = MultiPhotoValidator::default().validate(&[Vec::new(), photo(&["mom"])]);
        assert!(!report.is_valid);
        assert_eq!(report.consistency_score, 0.0);
        assert_eq!(report.children_compared, 0);
    }

    #[test]
    fn test_by_child_id_pairing_ignores_order() {
        let first = vec![result(0, "ann", "mom"), result(1, "ben", "dad")];
        let second = vec![result(0, "ben", "dad"), result(1, "ann", "mom")];

        let positional = MultiPhotoValidator::default().validate(&[first.clone(), second.clone()]);
        assert_eq!(positional.consistency_score, 0.0);

        let keyed = MultiPhotoValidator::default()
            .with_pairing(ChildPairing::ByChildId)
            .validate(&[first, second]);
        assert_eq!(keyed.consistency_score, 1.0);
        assert!(keyed.is_valid);
    }

    #[test]
    fn test_custom_thresholds() {
        let validator = MultiPhotoValidator::new(ValidationThresholds {
            valid: 0.5,
            excellent: 0.95,
        });
        let report = validator.validate(&[photo(&["mom", "dad"]), photo(&["dad", "dad"])]);
        assert!(report.is_valid);
        assert!(report.recommendations[0].contains("Good"));
    }
}
