//! Per-child parent resemblance.
//!
//! Every child is scored against every parent; the best match is the
//! highest score, ties going to the parent listed first.

use crate::scorer::{DistanceScorer, Scorer};
use crate::types::{Face, SimilarityResult};
use serde::{Deserialize, Serialize};

/// One child-parent comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentScore {
    pub parent: Face,
    /// Ordinal of the parent in the parent list it was compared against.
    pub parent_index: usize,
    pub score: f32,
    pub result: SimilarityResult,
}

/// Resemblance of one child to every parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildResemblance {
    /// Ordinal of the child among the children analyzed.
    pub child_index: usize,
    /// Position of the child in the full labeled face list, when known.
    pub face_index: Option<usize>,
    pub child: Face,
    /// Scores in parent input order.
    pub per_parent_scores: Vec<ParentScore>,
    pub best_parent: Face,
    pub best_score: f32,
}

impl ChildResemblance {
    pub fn best_parent_id(&self) -> &str {
        &self.best_parent.id
    }

    /// Parent scores from most to least similar. Stable, so equal scores
    /// keep parent input order.
    pub fn ranked(&self) -> Vec<&ParentScore> {
        let mut ranked: Vec<&ParentScore> = self.per_parent_scores.iter().collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked
    }
}

/// Faces split by role, each paired with its position in the source list.
#[derive(Debug, Default)]
pub struct RoleGroups<'a> {
    pub parents: Vec<(usize, &'a Face)>,
    pub children: Vec<(usize, &'a Face)>,
    pub unassigned: Vec<(usize, &'a Face)>,
}

pub fn group_by_role(faces: &[Face]) -> RoleGroups<'_> {
    let mut groups = RoleGroups::default();
    for (i, face) in faces.iter().enumerate() {
        if face.role.is_parent() {
            groups.parents.push((i, face));
        } else if face.role.is_child() {
            groups.children.push((i, face));
        } else {
            groups.unassigned.push((i, face));
        }
    }
    groups
}

#[derive(Debug, Clone, Default)]
pub struct ResemblanceAnalyzer<S = DistanceScorer> {
    scorer: S,
}

impl<S: Scorer> ResemblanceAnalyzer<S> {
    pub fn new(scorer: S) -> Self {
        Self { scorer }
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Analyze children against parents. Either list empty yields an empty result.
    pub fn analyze(&self, parents: &[Face], children: &[Face]) -> Vec<ChildResemblance> {
        let parents: Vec<&Face> = parents.iter().collect();
        let children: Vec<(Option<usize>, &Face)> = children.iter().map(|c| (None, c)).collect();
        self.analyze_refs(&parents, &children)
    }

    /// Group `faces` by role and analyze, keeping each child's position in
    /// `faces` as `face_index`. Unassigned faces are ignored.
    pub fn analyze_labeled(&self, faces: &[Face]) -> Vec<ChildResemblance> {
        let groups = group_by_role(faces);
        let parents: Vec<&Face> = groups.parents.iter().map(|&(_, f)| f).collect();
        let children: Vec<(Option<usize>, &Face)> =
            groups.children.iter().map(|&(i, f)| (Some(i), f)).collect();
        self.analyze_refs(&parents, &children)
    }

    /// Most similar candidate to `target`: its index and comparison result.
    pub fn best_match(&self, target: &Face, candidates: &[Face]) -> Option<(usize, SimilarityResult)> {
        candidates
            .iter()
            .map(|c| self.scorer.compare_or_zero(target, c))
            .enumerate()
            .fold(None, |best, (i, r)| match best {
                Some((_, prev)) if prev.score >= r.score => best,
                _ => Some((i, r)),
            })
    }

    fn analyze_refs(
        &self,
        parents: &[&Face],
        children: &[(Option<usize>, &Face)],
    ) -> Vec<ChildResemblance> {
        if parents.is_empty() || children.is_empty() {
            tracing::debug!(
                parents = parents.len(),
                children = children.len(),
                "nothing to analyze"
            );
            return Vec::new();
        }

        tracing::debug!(
            parents = parents.len(),
            children = children.len(),
            "analyzing family resemblance"
        );

        children
            .iter()
            .enumerate()
            .map(|(child_index, &(face_index, child))| {
                let per_parent_scores: Vec<ParentScore> = parents
                    .iter()
                    .enumerate()
                    .map(|(parent_index, &parent)| {
                        let result = self.scorer.compare_or_zero(child, parent);
                        ParentScore {
                            parent: parent.clone(),
                            parent_index,
                            score: result.score,
                            result,
                        }
                    })
                    .collect();

                let mut best = &per_parent_scores[0];
                for entry in &per_parent_scores[1..] {
                    if entry.score > best.score {
                        best = entry;
                    }
                }

                tracing::debug!(
                    child = %child.id,
                    best_parent = %best.parent.id,
                    score = best.score,
                    "best match selected"
                );

                ChildResemblance {
                    child_index,
                    face_index,
                    child: child.clone(),
                    best_parent: best.parent.clone(),
                    best_score: best.score,
                    per_parent_scores,
                }
            })
            .collect()
    }
}
