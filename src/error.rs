//! # Error Types Module
//!
//! Questo modulo definisce i tipi di errore dell'applicazione.
//!
//! ## Responsabilità:
//! - `ScanError`: errori fatali della fase di discovery (la run si interrompe
//!   prima di elaborare qualsiasi file, nessun report)
//! - `TransformError`: errori per singolo file, registrati nel relativo
//!   `OptimizeResult` senza interrompere gli altri file
//!
//! ## Categorie di errori per file:
//! - `UnsupportedFileType`: nessun transformer registrato gestisce il file
//! - `DecodeFailed`: il contenuto non è un'immagine decodificabile
//! - `UnsupportedFormat`: formato senza policy di encoding (es. WebP)
//! - `EncodeFailed`: encoding, scrittura o stat del file temporaneo falliti
//! - `ReplaceFailed`: rename atomico sopra l'originale fallito
//! - `TaskFailed`: il worker del file è andato in panic
//!
//! ## Esempio:
//! ```rust
//! use prefine::error::TransformError;
//!
//! let err = TransformError::DecodeFailed("invalid JPEG marker".to_string());
//! assert_eq!(err.to_string(), "Failed to decode image: invalid JPEG marker");
//! ```

use serde::Serialize;
use std::path::PathBuf;

/// Scan-level failures. Any of these aborts the whole run.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    #[error("Root path does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("IO error while scanning: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Scan cancelled")]
    Cancelled,

    #[error("Scan task failed: {0}")]
    Task(String),
}

/// Per-file failures, recorded in the file's result.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum TransformError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to encode image: {0}")]
    EncodeFailed(String),

    #[error("Failed to replace original file: {0}")]
    ReplaceFailed(String),

    #[error("Transform task failed: {0}")]
    TaskFailed(String),
}

impl TransformError {
    /// Short stable name of the error kind, used in log lines and JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedFileType(_) => "unsupported_file_type",
            Self::DecodeFailed(_) => "decode_failed",
            Self::UnsupportedFormat(_) => "unsupported_format",
            Self::EncodeFailed(_) => "encode_failed",
            Self::ReplaceFailed(_) => "replace_failed",
            Self::TaskFailed(_) => "task_failed",
        }
    }
}
