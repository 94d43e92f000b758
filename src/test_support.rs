//! Fixtures shared by the unit tests.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ColorType, DynamicImage, ImageEncoder, Rgb, RgbImage};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

/// Smooth RGB ramp, compressible but not trivially so
pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    DynamicImage::ImageRgb8(image)
}

/// Write a deliberately poorly compressed PNG
pub fn write_png(path: &Path, width: u32, height: u32) {
    let image = gradient_image(width, height);
    let writer = BufWriter::new(File::create(path).unwrap());
    PngEncoder::new_with_quality(writer, CompressionType::Fast, FilterType::NoFilter)
        .write_image(image.as_bytes(), width, height, ColorType::Rgb8)
        .unwrap();
}

pub fn write_jpeg(path: &Path, width: u32, height: u32, quality: u8) {
    let image = gradient_image(width, height);
    let mut writer = BufWriter::new(File::create(path).unwrap());
    JpegEncoder::new_with_quality(&mut writer, quality)
        .encode(image.as_bytes(), width, height, ColorType::Rgb8)
        .unwrap();
}

/// Sorted entry names of a directory, to spot leaked temp files
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
