//! JSON document files.

use super::{DocumentFile, DocumentRecord, StorageError, StorageResult};
use crate::canvas::CanvasDocument;
use std::fs;
use std::path::Path;

/// Write the vector data of `document` to `path`.
pub fn save_document<T>(document: &CanvasDocument<T>, path: &Path) -> StorageResult<()> {
    let file = DocumentFile {
        doc: DocumentRecord::from_document(document),
    };
    let json = serde_json::to_string_pretty(&file)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;

    fs::write(path, json)
        .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", path.display(), e)))?;

    log::info!(
        "Saved {} strokes and {} texts to {}",
        file.doc.line.len(),
        file.doc.text.len(),
        path.display()
    );
    Ok(())
}

/// Read and validate a document file.
///
/// Nothing is built from the records here; the caller decides when to
/// swap them in.
pub fn load_document(path: &Path) -> StorageResult<DocumentRecord> {
    let json = fs::read_to_string(path)
        .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))?;

    let file: DocumentFile = serde_json::from_str(&json).map_err(|e| {
        StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
    })?;
    file.doc.validate()?;

    log::info!(
        "Loaded {} strokes and {} texts from {}",
        file.doc.line.len(),
        file.doc.text.len(),
        path.display()
    );
    Ok(file.doc)
}
