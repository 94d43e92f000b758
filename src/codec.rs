//! # Image Codec Module
//!
//! Capability di decode / resize / encode usata dal transformer immagini.
//!
//! Il transformer dipende solo dal trait `ImageCodec`; `StandardCodec` lo
//! implementa in memoria con il crate `image`, senza tool esterni.
//!
//! ## Policy di encoding:
//! | Estensione   | Formato | Parametri                              |
//! |--------------|---------|----------------------------------------|
//! | .jpg / .jpeg | JPEG    | lossy, `quality` 1-100, RGB 8 bit      |
//! | .png         | PNG     | lossless, `CompressionType::Best`      |
//! | altro        | -       | `UnsupportedFormat` nel transformer    |
//!
//! ## Resize:
//! Solo downscale, con filtro Lanczos3 e aspect ratio preservato.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::imageops::FilterType;
use image::io::Reader as ImageReader;
use image::{ColorType, DynamicImage, GenericImageView, ImageEncoder, ImageResult};
use std::path::Path;

/// Output formats the optimizer knows how to write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    Jpeg,
    Png,
}

impl TargetFormat {
    /// Pick the encoding policy from the original file's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }
}

/// True when the image exceeds the bounding box on either axis
pub fn exceeds_bounds(width: u32, height: u32, max_width: u32, max_height: u32) -> bool {
    width > max_width || height > max_height
}

/// Decode / fit / encode primitives
pub trait ImageCodec: Send + Sync {
    /// Read and decode the image stored at `path`
    fn decode(&self, path: &Path) -> ImageResult<DynamicImage>;

    /// Scale down to fit within `max_width` x `max_height`, preserving aspect ratio
    fn fit_within_bounds(&self, image: DynamicImage, max_width: u32, max_height: u32)
        -> DynamicImage;

    /// Encode into an in-memory buffer
    fn encode(&self, image: &DynamicImage, format: TargetFormat, quality: u8)
        -> ImageResult<Vec<u8>>;
}

/// [`ImageCodec`] backed by the `image` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCodec;

impl ImageCodec for StandardCodec {
    fn decode(&self, path: &Path) -> ImageResult<DynamicImage> {
        // Sniff the content instead of trusting the extension
        ImageReader::open(path)?.with_guessed_format()?.decode()
    }

    fn fit_within_bounds(
        &self,
        image: DynamicImage,
        max_width: u32,
        max_height: u32,
    ) -> DynamicImage {
        let (width, height) = image.dimensions();
        if !exceeds_bounds(width, height, max_width, max_height) {
            return image;
        }
        image.resize(max_width, max_height, FilterType::Lanczos3)
    }

    fn encode(
        &self,
        image: &DynamicImage,
        format: TargetFormat,
        quality: u8,
    ) -> ImageResult<Vec<u8>> {
        let mut buffer = Vec::new();

        match format {
            TargetFormat::Jpeg => {
                // JPEG has no alpha channel
                let rgb = image.to_rgb8();
                let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
                encoder.encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)?;
            }
            TargetFormat::Png => {
                let encoder = PngEncoder::new_with_quality(
                    &mut buffer,
                    CompressionType::Best,
                    PngFilterType::Adaptive,
                );
                encoder.write_image(image.as_bytes(), image.width(), image.height(), image.color())?;
            }
        }

        Ok(buffer)
    }
}
