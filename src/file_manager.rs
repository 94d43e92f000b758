//! # File Management Module
//!
//! Questo modulo gestisce la classificazione dei file e le operazioni sicure
//! sul filesystem.
//!
//! ## Responsabilità:
//! - Classificazione per estensione (case-insensitive) in `FileType`
//! - Descrittore immutabile `MediaFile` prodotto dallo scanner
//! - Creazione del file temporaneo accanto all'originale
//! - Sostituzione atomica (rename) dell'originale con il file ottimizzato
//! - Formattazione human-readable delle dimensioni
//!
//! ## Formati riconosciuti:
//! - **Immagini**: JPG, JPEG, PNG, WebP
//! - **Config**: JSON, YAML/YML (riconosciuti ma non ottimizzati)
//!
//! ## Sicurezza operazioni:
//! - Il file temporaneo vive nella stessa directory dell'originale, quindi il
//!   rename finale resta sullo stesso volume ed è atomico
//! - Il file temporaneo viene rimosso automaticamente se non viene promosso
//!
//! ## Esempio:
//! ```rust
//! use prefine::file_manager::{FileManager, FileType};
//! use std::path::Path;
//!
//! assert_eq!(FileType::from_path(Path::new("photo.JPG")), FileType::Image);
//! assert_eq!(FileManager::format_size(1536), "1.50 KB");
//! ```

use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// File categories, determined solely by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Image,
    Json,
    Yaml,
    Unsupported,
}

impl FileType {
    /// Classify a path by its extension (case-insensitive)
    pub fn from_path(path: &Path) -> Self {
        let Some(ext) = path.extension() else {
            return Self::Unsupported;
        };

        match ext.to_string_lossy().to_lowercase().as_str() {
            "jpg" | "jpeg" | "png" | "webp" => Self::Image,
            "json" => Self::Json,
            "yaml" | "yml" => Self::Yaml,
            _ => Self::Unsupported,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Unsupported => "unsupported",
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A discovered file. The size is the one reported at scan time and may be
/// stale by the time the file is processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaFile {
    pub path: PathBuf,
    pub file_type: FileType,
    pub size: u64,
}

impl MediaFile {
    pub fn new(path: impl Into<PathBuf>, file_type: FileType, size: u64) -> Self {
        Self {
            path: path.into(),
            file_type,
            size,
        }
    }

    /// File name for log lines, falls back to the full path
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Lowercased extension including the leading dot, or an empty string
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
            .unwrap_or_default()
    }
}

/// Filesystem helpers shared by the scanner and the transformers
pub struct FileManager;

impl FileManager {
    /// Create a temporary file next to `original`, named `<file name>.<random>.tmp`.
    ///
    /// The file is deleted when the returned handle is dropped, unless it is
    /// promoted with [`FileManager::replace_file`].
    pub fn create_temp_sibling(original: &Path) -> io::Result<NamedTempFile> {
        let dir = match original.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let name = original
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "prefine".to_string());

        tempfile::Builder::new()
            .prefix(&format!("{}.", name))
            .suffix(".tmp")
            .tempfile_in(dir)
    }

    /// Atomically replace `original` with the temporary file.
    ///
    /// Uses rename semantics, so observers see either the old or the new file,
    /// never a truncated one. On failure the temporary file is removed and the
    /// original is left intact.
    pub fn replace_file(temp: NamedTempFile, original: &Path) -> io::Result<()> {
        // NamedTempFile is created 0600; keep the original's access mode
        match fs::metadata(original) {
            Ok(metadata) => {
                if let Err(e) = fs::set_permissions(temp.path(), metadata.permissions()) {
                    debug!("Could not copy permissions onto {}: {}", temp.path().display(), e);
                }
            }
            Err(e) => debug!("Could not read permissions of {}: {}", original.display(), e),
        }

        temp.persist(original).map(|_| ()).map_err(|e| e.error)
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Calculate percentage reduction
    pub fn calculate_reduction(original_size: u64, new_size: u64) -> f64 {
        if original_size == 0 {
            0.0
        } else {
            ((original_size as f64 - new_size as f64) / original_size as f64) * 100.0
        }
    }
}
