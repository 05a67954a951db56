//! Presentation helpers shared by hosts.

use crate::types::{Face, Role};
use serde::Serialize;
use std::fmt;

/// Coarse verbal level for a resemblance score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ResemblanceLevel {
    Little,
    Slight,
    Moderate,
    Strong,
    VeryStrong,
}

impl ResemblanceLevel {
    pub fn from_score(score: f32) -> Self {
        if score >= 0.8 {
            Self::VeryStrong
        } else if score >= 0.6 {
            Self::Strong
        } else if score >= 0.4 {
            Self::Moderate
        } else if score >= 0.2 {
            Self::Slight
        } else {
            Self::Little
        }
    }
}

impl fmt::Display for ResemblanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::VeryStrong => "Very Strong Resemblance",
            Self::Strong => "Strong Resemblance",
            Self::Moderate => "Moderate Resemblance",
            Self::Slight => "Slight Resemblance",
            Self::Little => "Little Resemblance",
        };
        f.write_str(text)
    }
}

/// Score as a whole percentage, e.g. `0.846` → `"85%"`.
pub fn format_percent(score: f32) -> String {
    format!("{}%", (score.clamp(0.0, 1.0) * 100.0).round() as u32)
}

/// Human label for a face. `ordinal` is zero-based within whatever list the
/// caller is rendering (children are usually numbered among children).
pub fn display_label(face: &Face, ordinal: usize) -> String {
    match face.role {
        Role::Parent1 => "Parent 1".to_string(),
        Role::Parent2 => "Parent 2".to_string(),
        Role::Child => format!("Child {}", ordinal + 1),
        Role::Unassigned => format!("Face {}", ordinal + 1),
    }
}
