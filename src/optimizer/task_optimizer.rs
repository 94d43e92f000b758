//! # Task Optimizer Module
//!
//! Worker per l'ottimizzazione di singoli file.
//! Separato dall'orchestratore principale per maggiore modularità.

use crate::{
    config::OptimizeConfig, file_manager::MediaFile, report::OptimizeResult,
    transform::TransformerRegistry,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Dispatch + process for one file. Cheap to clone, one clone per task.
#[derive(Clone, Debug)]
pub struct TaskOptimizer {
    registry: Arc<TransformerRegistry>,
    config: Arc<OptimizeConfig>,
}

impl TaskOptimizer {
    /// Crea nuovo task optimizer
    pub fn new(registry: Arc<TransformerRegistry>, config: Arc<OptimizeConfig>) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &OptimizeConfig {
        &self.config
    }

    /// Processa un singolo file
    pub fn process_single_file(&self, file: MediaFile) -> OptimizeResult {
        let Some(transformer) = self.registry.dispatch(&file) else {
            debug!(
                "No transformer for {} ({}), skipping",
                file.path.display(),
                file.file_type
            );
            return OptimizeResult::unsupported(file);
        };

        if self.config.verbose {
            info!("Processing: {}", file.path.display());
        }

        let result = transformer.process(&file, &self.config);
        Self::log_outcome(transformer.name(), &result);
        result
    }

    fn log_outcome(transformer: &str, result: &OptimizeResult) {
        match &result.error {
            Some(error) => warn!(
                "[{}] {} failed: {}",
                transformer,
                result.file.path.display(),
                error
            ),
            None if result.was_optimized() => debug!(
                "[{}] {}: {} -> {} bytes in {:?}",
                transformer,
                result.file.path.display(),
                result.original_size,
                result.new_size,
                result.duration
            ),
            None => debug!(
                "[{}] {}: unchanged",
                transformer,
                result.file.path.display()
            ),
        }
    }
}
