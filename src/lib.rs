//! # Prefine Library
//!
//! Ottimizzazione in-place di immagini: scansione di un albero di directory,
//! ridimensionamento entro un bounding box, ricompressione e sostituzione
//! atomica dell'originale solo quando il risultato è più piccolo.
//!
//! ## Architettura dei moduli:
//! - `config`: Configurazione di scansione/ottimizzazione e validazione
//! - `error`: Errori di scansione (fatali) e di trasformazione (per file)
//! - `file_manager`: Classificazione file, temp file e sostituzione atomica
//! - `scanner`: Discovery dei file con filtri include/exclude
//! - `codec`: Decode, resize ed encode delle immagini
//! - `transform`: Trait `Transformer`, registry e trasformatore immagini
//! - `report`: Risultati per file e report aggregato
//! - `optimizer`: Orchestratore principale del processo
//! - `progress`: Progress bar
//! - `json_output`: Output JSON per l'uso programmatico
//!
//! ## Utilizzo:
//! ```rust,no_run
//! use prefine::{MediaOptimizer, OptimizeConfig, ScanConfig, TransformerRegistry};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let optimizer =
//!         MediaOptimizer::new(TransformerRegistry::standard(), OptimizeConfig::default())?;
//!     let report = optimizer
//!         .optimize_directory(&ScanConfig::new("./assets"), None)
//!         .await?;
//!     println!("{}", report.format_summary());
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod file_manager;
pub mod json_output;
pub mod optimizer;
pub mod progress;
pub mod report;
pub mod scanner;
pub mod transform;

#[cfg(test)]
mod test_support;

pub use config::{OptimizeConfig, ScanConfig, Settings};
pub use error::{ScanError, TransformError};
pub use file_manager::{FileType, MediaFile};
pub use optimizer::{Concurrency, MediaOptimizer, StopSignal};
pub use report::{OptimizationReport, OptimizeResult};
pub use transform::{ImageTransformer, Transformer, TransformerRegistry};
