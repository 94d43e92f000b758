//! # Transform Module
//!
//! Contratto per tipo di file e dispatch verso il transformer giusto.
//!
//! - `Transformer`: capability `{can_process, process}` implementata per tipo
//! - `TransformerRegistry`: sequenza ordinata; vince il primo che accetta il file
//! - `ImageTransformer`: decode → resize condizionale → encode → replace atomico
//!
//! Per supportare un nuovo tipo basta implementare `Transformer` e registrarlo:
//! orchestratore e dispatcher non cambiano.

pub mod image_transformer;

pub use image_transformer::ImageTransformer;

use crate::{config::OptimizeConfig, file_manager::MediaFile, report::OptimizeResult};
use std::sync::Arc;

/// Per-type optimizing rewrite
pub trait Transformer: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Whether this transformer handles `file`
    fn can_process(&self, file: &MediaFile) -> bool;

    /// Optimize `file` in place. Always returns a result; failures are
    /// recorded in it rather than propagated.
    fn process(&self, file: &MediaFile, config: &OptimizeConfig) -> OptimizeResult;
}

/// Ordered set of transformers. Order is significant: the first match wins.
#[derive(Clone, Default)]
pub struct TransformerRegistry {
    transformers: Vec<Arc<dyn Transformer>>,
}

impl TransformerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in transformers
    pub fn standard() -> Self {
        Self::new().with(ImageTransformer::new())
    }

    /// Append a transformer after the ones already registered
    pub fn with<T: Transformer + 'static>(mut self, transformer: T) -> Self {
        self.transformers.push(Arc::new(transformer));
        self
    }

    pub fn register(&mut self, transformer: Arc<dyn Transformer>) {
        self.transformers.push(transformer);
    }

    /// First transformer, in registration order, that accepts `file`
    pub fn dispatch(&self, file: &MediaFile) -> Option<&Arc<dyn Transformer>> {
        self.transformers.iter().find(|t| t.can_process(file))
    }

    pub fn len(&self) -> usize {
        self.transformers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }
}

impl std::fmt::Debug for TransformerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.transformers.iter().map(|t| t.name()))
            .finish()
    }
}
