//! Face sources: the seam to the external detector.
//!
//! Detection and descriptor extraction happen outside this crate. A
//! [`FaceSource`] hands over the detector's output; the host calls
//! [`FaceSource::ensure_ready`] once before use; repeated calls are no-ops.

use crate::types::Face;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("detections file not found: {0}")]
    NotFound(PathBuf),
    #[error("reading detections: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing detections: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("face {id}: {reason}")]
    InvalidFace { id: String, reason: String },
}

/// Provider of detected faces for one photo.
pub trait FaceSource {
    /// Prepare the source. Idempotent.
    fn ensure_ready(&mut self) -> Result<(), SourceError>;

    /// Detected faces, in detector order.
    fn faces(&mut self) -> Result<Vec<Face>, SourceError>;
}

/// Detections for one photo as exported by the detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoFaces {
    #[serde(default)]
    pub photo: Option<String>,
    pub faces: Vec<Face>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Export {
    Bare(Vec<Face>),
    Photo(PhotoFaces),
}

/// Parse a detector export: a bare JSON array of faces, or
/// `{ "photo": "...", "faces": [...] }`.
pub fn parse_faces(raw: &str) -> Result<PhotoFaces, SourceError> {
    let photo = match serde_json::from_str::<Export>(raw) {
        Ok(Export::Bare(faces)) => PhotoFaces { photo: None, faces },
        Ok(Export::Photo(photo)) => photo,
        // Untagged errors are opaque; re-parse the object form for a useful message.
        Err(_) => serde_json::from_str::<PhotoFaces>(raw)?,
    };
    for face in &photo.faces {
        check_face(face)?;
    }
    Ok(photo)
}

fn check_face(face: &Face) -> Result<(), SourceError> {
    if !face.bbox.is_valid() {
        return Err(SourceError::InvalidFace {
            id: face.id.clone(),
            reason: "bounding box must be finite and non-negative".into(),
        });
    }
    if !(0.0..=1.0).contains(&face.confidence) {
        return Err(SourceError::InvalidFace {
            id: face.id.clone(),
            reason: format!("confidence {} outside [0, 1]", face.confidence),
        });
    }
    Ok(())
}

/// Face source backed by a JSON detections file.
pub struct JsonFaceSource {
    path: PathBuf,
    loaded: Option<PhotoFaces>,
}

impl JsonFaceSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        if !path.exists() {
            return Err(SourceError::NotFound(path.to_path_buf()));
        }
        Ok(Self {
            path: path.to_path_buf(),
            loaded: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_ready(&self) -> bool {
        self.loaded.is_some()
    }

    /// Photo label from the export, falling back to the file name.
    pub fn photo_label(&self) -> String {
        self.loaded
            .as_ref()
            .and_then(|p| p.photo.clone())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

impl FaceSource for JsonFaceSource {
    fn ensure_ready(&mut self) -> Result<(), SourceError> {
        if self.loaded.is_some() {
            return Ok(());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        let photo = parse_faces(&raw)?;
        tracing::info!(
            path = %self.path.display(),
            faces = photo.faces.len(),
            "loaded face detections"
        );
        self.loaded = Some(photo);
        Ok(())
    }

    fn faces(&mut self) -> Result<Vec<Face>, SourceError> {
        self.ensure_ready()?;
        Ok(self
            .loaded
            .as_ref()
            .map(|p| p.faces.clone())
            .unwrap_or_default())
    }
}
