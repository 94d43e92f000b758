//! # JSON Output Module
//!
//! Output strutturato in JSON per l'uso programmatico (script, CI, GUI).
//!
//! ## Responsabilità:
//! - Emette un oggetto JSON per riga su stdout
//! - Riutilizza `OptimizeResult` e `OptimizationReport` senza duplicarne i calcoli
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio run (radice, numero file, configurazione)
//! - `file_complete`: Esito di un singolo file
//! - `complete`: Fine run con le statistiche aggregate
//! - `error`: Errore fatale (es. scansione fallita)

use crate::{
    config::OptimizeConfig,
    error::TransformError,
    file_manager::FileType,
    report::{OptimizationReport, OptimizeResult},
};
use serde::Serialize;
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum JsonMessage {
    /// Inizio del processo di ottimizzazione
    #[serde(rename = "start")]
    Start {
        root: PathBuf,
        total_files: usize,
        config: JsonConfig,
    },

    /// Fine elaborazione di un file specifico
    #[serde(rename = "file_complete")]
    FileComplete {
        path: PathBuf,
        file_type: FileType,
        original_size: u64,
        new_size: u64,
        savings: u64,
        savings_percent: f64,
        duration_ms: u64,
        error: Option<TransformError>,
    },

    /// Processo completato
    #[serde(rename = "complete")]
    Complete {
        total_files: usize,
        optimized_files: usize,
        failed_files: usize,
        total_savings: u64,
        total_savings_percent: f64,
        duration_seconds: f64,
    },

    /// Errore generale
    #[serde(rename = "error")]
    Error {
        message: String,
        details: Option<String>,
    },
}

/// Configurazione per output JSON
#[derive(Debug, Serialize)]
pub struct JsonConfig {
    pub quality: u8,
    pub max_width: u32,
    pub max_height: u32,
    pub dry_run: bool,
    pub workers: Option<usize>,
}

impl JsonConfig {
    pub fn new(config: &OptimizeConfig, workers: Option<usize>) -> Self {
        Self {
            quality: config.quality,
            max_width: config.max_width,
            max_height: config.max_height,
            dry_run: config.dry_run,
            workers,
        }
    }
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = self.to_line() {
            println!("{}", json);
        }
    }

    /// Serializza su una singola riga
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Crea un messaggio di inizio
    pub fn start(root: PathBuf, total_files: usize, config: JsonConfig) -> Self {
        Self::Start {
            root,
            total_files,
            config,
        }
    }

    /// Crea un messaggio di completamento file
    pub fn file_complete(result: &OptimizeResult) -> Self {
        Self::FileComplete {
            path: result.file.path.clone(),
            file_type: result.file.file_type,
            original_size: result.original_size,
            new_size: result.new_size,
            savings: result.savings,
            savings_percent: result.savings_percent(),
            duration_ms: result.duration.as_millis() as u64,
            error: result.error.clone(),
        }
    }

    /// Crea un messaggio di completamento generale
    pub fn complete(report: &OptimizationReport) -> Self {
        Self::Complete {
            total_files: report.total_files,
            optimized_files: report.optimized_files,
            failed_files: report.failed_files,
            total_savings: report.total_savings,
            total_savings_percent: report.total_savings_percent(),
            duration_seconds: report.duration.as_secs_f64(),
        }
    }

    /// Crea un messaggio di errore
    pub fn error(message: String, details: Option<String>) -> Self {
        Self::Error { message, details }
    }
}
