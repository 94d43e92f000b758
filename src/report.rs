//! # Result and Report Module
//!
//! Modello dei risultati: un `OptimizeResult` per file e un
//! `OptimizationReport` aggregato per run.
//!
//! ## Invarianti:
//! - `savings > 0` solo se non c'è errore e il file è stato davvero sostituito
//! - Nessun miglioramento: `savings == 0`, `new_size == original_size`
//! - `optimized_files` conta i risultati con `savings > 0` e senza errore
//! - `results` è allineato per indice con la lista prodotta dallo scanner
//!
//! ## Esempio:
//! ```rust
//! use prefine::file_manager::{FileType, MediaFile};
//! use prefine::report::{OptimizationReport, OptimizeResult};
//! use std::time::Duration;
//!
//! let file = MediaFile::new("a.png", FileType::Image, 1000);
//! let results = vec![OptimizeResult::optimized(file, 400, Duration::ZERO)];
//! let report = OptimizationReport::from_results(results, Duration::ZERO);
//! assert_eq!(report.total_savings, 600);
//! assert_eq!(report.total_savings_percent(), 60.0);
//! ```

use crate::{
    error::TransformError,
    file_manager::{FileManager, MediaFile},
};
use std::time::Duration;

/// Outcome of processing one file
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeResult {
    pub file: MediaFile,
    pub original_size: u64,
    pub new_size: u64,
    pub savings: u64,
    pub duration: Duration,
    pub error: Option<TransformError>,
}

impl OptimizeResult {
    /// The original was replaced by a smaller file of `new_size` bytes
    pub fn optimized(file: MediaFile, new_size: u64, duration: Duration) -> Self {
        let original_size = file.size;
        Self {
            file,
            original_size,
            new_size,
            savings: original_size.saturating_sub(new_size),
            duration,
            error: None,
        }
    }

    /// Nothing written: dry run, or no improvement found
    pub fn unchanged(file: MediaFile, duration: Duration) -> Self {
        let original_size = file.size;
        Self {
            file,
            original_size,
            new_size: original_size,
            savings: 0,
            duration,
            error: None,
        }
    }

    /// Processing failed; the original is left as it was
    pub fn failed(file: MediaFile, error: TransformError, duration: Duration) -> Self {
        Self {
            error: Some(error),
            ..Self::unchanged(file, duration)
        }
    }

    /// No transformer accepted the file. No disk I/O happened.
    pub fn unsupported(file: MediaFile) -> Self {
        let error = TransformError::UnsupportedFileType(file.file_type.to_string());
        Self::failed(file, error, Duration::ZERO)
    }

    pub fn savings_percent(&self) -> f64 {
        FileManager::calculate_reduction(self.original_size, self.new_size)
    }

    pub fn was_optimized(&self) -> bool {
        self.savings > 0 && self.error.is_none()
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Aggregate over all results of one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptimizationReport {
    pub total_files: usize,
    pub optimized_files: usize,
    pub failed_files: usize,
    pub total_savings: u64,
    pub duration: Duration,
    pub results: Vec<OptimizeResult>,
}

impl OptimizationReport {
    pub fn from_results(results: Vec<OptimizeResult>, duration: Duration) -> Self {
        let mut optimized_files = 0;
        let mut failed_files = 0;
        let mut total_savings = 0;

        for result in &results {
            if result.is_failed() {
                failed_files += 1;
            } else if result.was_optimized() {
                optimized_files += 1;
                total_savings += result.savings;
            }
        }

        Self {
            total_files: results.len(),
            optimized_files,
            failed_files,
            total_savings,
            duration,
            results,
        }
    }

    pub fn total_original_size(&self) -> u64 {
        self.results.iter().map(|r| r.original_size).sum()
    }

    /// Savings relative to the summed original sizes, 0 when that sum is 0
    pub fn total_savings_percent(&self) -> f64 {
        let total_original = self.total_original_size();
        if total_original == 0 {
            0.0
        } else {
            self.total_savings as f64 / total_original as f64 * 100.0
        }
    }

    pub fn failed(&self) -> impl Iterator<Item = &OptimizeResult> {
        self.results.iter().filter(|r| r.is_failed())
    }

    pub fn optimized(&self) -> impl Iterator<Item = &OptimizeResult> {
        self.results.iter().filter(|r| r.was_optimized())
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Processed: {} files | Optimized: {} | Errors: {} | Total saved: {} ({:.1}%)",
            self.total_files,
            self.optimized_files,
            self.failed_files,
            FileManager::format_size(self.total_savings),
            self.total_savings_percent()
        )
    }
}
