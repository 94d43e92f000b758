//! # Image Transformer
//!
//! Ottimizzazione in-place di immagini raster.
//!
//! ## Pipeline per file:
//! 1. **Dry run**: esce subito con `new_size == original_size`, nessun accesso al disco
//! 2. **Decode**: fallimento → `DecodeFailed`, nulla viene scritto
//! 3. **Resize condizionale**: solo se l'immagine supera `max_width`/`max_height`
//! 4. **Encode su file temporaneo** accanto all'originale (JPEG a `quality`,
//!    PNG a compressione massima, altro → `UnsupportedFormat`)
//! 5. **Stat** del temporaneo per ottenere `new_size`
//! 6. **Confronto**: se `new_size >= original_size` il temporaneo viene rimosso
//!    e l'originale resta intatto
//! 7. **Replace atomico** (rename); in caso di errore → `ReplaceFailed`,
//!    l'originale resta intatto
//!
//! Il file temporaneo è un `NamedTempFile`: su ogni percorso di uscita che non
//! lo promuove viene cancellato al drop, quindi non restano artefatti.

use crate::{
    codec::{exceeds_bounds, ImageCodec, StandardCodec, TargetFormat},
    config::OptimizeConfig,
    error::TransformError,
    file_manager::{FileManager, FileType, MediaFile},
    report::OptimizeResult,
    transform::Transformer,
};
use image::GenericImageView;
use std::io::Write;
use std::time::Instant;
use tracing::debug;

/// How a non-failing transform ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Replaced { new_size: u64 },
    Unchanged,
}

/// Rewrites JPEG and PNG images with a smaller encoding
#[derive(Debug, Clone, Default)]
pub struct ImageTransformer<C = StandardCodec> {
    codec: C,
}

impl ImageTransformer<StandardCodec> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: ImageCodec> ImageTransformer<C> {
    /// Transformer using a custom codec
    pub fn with_codec(codec: C) -> Self {
        Self { codec }
    }

    fn optimize(&self, file: &MediaFile, config: &OptimizeConfig) -> Result<Outcome, TransformError> {
        let image = self
            .codec
            .decode(&file.path)
            .map_err(|e| TransformError::DecodeFailed(e.to_string()))?;

        let (width, height) = image.dimensions();
        let image = if exceeds_bounds(width, height, config.max_width, config.max_height) {
            let resized = self
                .codec
                .fit_within_bounds(image, config.max_width, config.max_height);
            debug!(
                "Resized {} from {}x{} to {}x{}",
                file.display_name(),
                width,
                height,
                resized.width(),
                resized.height()
            );
            resized
        } else {
            image
        };

        let format = TargetFormat::from_path(&file.path)
            .ok_or_else(|| TransformError::UnsupportedFormat(file.extension()))?;

        let encoded = self
            .codec
            .encode(&image, format, config.quality)
            .map_err(|e| TransformError::EncodeFailed(e.to_string()))?;

        let mut temp = FileManager::create_temp_sibling(&file.path).map_err(|e| {
            TransformError::EncodeFailed(format!("failed to create temporary file: {}", e))
        })?;
        temp.write_all(&encoded)
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| {
                TransformError::EncodeFailed(format!("failed to write temporary file: {}", e))
            })?;

        let new_size = std::fs::metadata(temp.path())
            .map_err(|e| {
                TransformError::EncodeFailed(format!("failed to stat optimized file: {}", e))
            })?
            .len();

        if new_size >= file.size {
            debug!("No improvement for {}, keeping original", file.display_name());
            return Ok(Outcome::Unchanged);
        }

        FileManager::replace_file(temp, &file.path)
            .map_err(|e| TransformError::ReplaceFailed(e.to_string()))?;

        Ok(Outcome::Replaced { new_size })
    }
}

impl<C: ImageCodec> Transformer for ImageTransformer<C> {
    fn name(&self) -> &'static str {
        "image"
    }

    fn can_process(&self, file: &MediaFile) -> bool {
        file.file_type == FileType::Image
    }

    fn process(&self, file: &MediaFile, config: &OptimizeConfig) -> OptimizeResult {
        let start = Instant::now();

        if config.dry_run {
            return OptimizeResult::unchanged(file.clone(), start.elapsed());
        }

        match self.optimize(file, config) {
            Ok(Outcome::Replaced { new_size }) => {
                OptimizeResult::optimized(file.clone(), new_size, start.elapsed())
            }
            Ok(Outcome::Unchanged) => OptimizeResult::unchanged(file.clone(), start.elapsed()),
            Err(error) => OptimizeResult::failed(file.clone(), error, start.elapsed()),
        }
    }
}
