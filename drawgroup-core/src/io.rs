//! Filesystem boundary: the only suspension points in this pipeline are
//! reading the OCR artifact and writing the grouping artifact. The output
//! path is written once, atomically (temp sibling, then rename).

use std::fs;
use std::path::Path;

use crate::artifact::{to_canonical_json, GroupingArtifact, OcrDocument};
use crate::error::GroupingError;

/// Reads and schema-validates the OCR artifact at `path`.
pub fn read_ocr_document(path: &Path) -> Result<OcrDocument, GroupingError> {
    let raw = fs::read(path).map_err(|e| GroupingError::InputMissing {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let doc: OcrDocument = serde_json::from_slice(&raw).map_err(|e| GroupingError::InputMalformed {
        reason: e.to_string(),
    })?;
    doc.validate()?;
    Ok(doc)
}

/// Writes the artifact atomically: a temp file in the output's own
/// directory, then an atomic rename. No partial artifact is ever visible
/// under `path`.
pub fn write_artifact_atomically(path: &Path, artifact: &GroupingArtifact) -> Result<(), GroupingError> {
    let bytes = to_canonical_json(artifact)?;
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| GroupingError::OutputUnwritable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    use std::io::Write;
    tmp.write_all(&bytes).map_err(|e| GroupingError::OutputUnwritable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    tmp.persist(path).map_err(|e| GroupingError::OutputUnwritable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(())
}
