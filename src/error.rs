//! Error types for pdf2png

use crate::exporter::PageFile;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for export operations
pub type Result<T> = std::result::Result<T, ExportError>;

/// Error types for PDF page export
#[derive(Error, Debug)]
pub enum ExportError {
    /// Failed to bind the PDFium shared library
    #[error("Failed to bind PDFium library: {reason}")]
    Initialization { reason: String },

    /// Input path is missing, unreadable, or not parseable as PDF
    #[error("Not a readable PDF {}: {reason}", .path.display())]
    InvalidInput { path: PathBuf, reason: String },

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Replacement font could not be read or registered
    #[error("Failed to load font override {name:?} from {}: {reason}", .path.display())]
    FontOverride {
        name: String,
        path: PathBuf,
        reason: String,
    },

    /// Failed to rasterize a page
    #[error("Failed to render page {index}: {reason}")]
    RenderFailure {
        index: usize,
        reason: String,
        completed: Vec<PageFile>,
    },

    /// Failed to encode or write a page image
    #[error("Failed to write page {index} to {}: {reason}", .path.display())]
    EncodeFailure {
        index: usize,
        path: PathBuf,
        reason: String,
        completed: Vec<PageFile>,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExportError {
    /// Pages successfully written before the failure.
    ///
    /// Only `RenderFailure` and `EncodeFailure` can occur after output has
    /// been produced; every other variant returns an empty slice. The files
    /// themselves are left on disk (there is no rollback).
    pub fn completed_pages(&self) -> &[PageFile] {
        match self {
            ExportError::RenderFailure { completed, .. }
            | ExportError::EncodeFailure { completed, .. } => completed,
            _ => &[],
        }
    }
}
