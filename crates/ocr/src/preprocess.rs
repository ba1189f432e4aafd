use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

/// Upload extensions accepted for OCR.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp"];

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to load image: {0}")]
    Load(#[from] image::ImageError),
    #[error("Failed to encode processed image: {0}")]
    Encode(String),
}

/// Whether an uploaded file name carries one of [`ALLOWED_EXTENSIONS`] (case-insensitive).
pub fn extension_allowed(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Process raw image bytes (JPEG / PNG / GIF / BMP) and return normalized PNG bytes.
pub fn prepare_for_ocr_from_bytes(data: &[u8]) -> Result<Vec<u8>, PreprocessError> {
    let img = image::load_from_memory(data)?;
    encode_as_png(normalize(img))
}

/// Longest side handed to OCR; phone photos of receipts are often 4000 px tall.
const MAX_SIDE: u32 = 2800;

/// Levels within this distance of black or white count as ink or paper.
const INK_MARGIN: usize = 32;

/// Share of pixels, per mille, ignored at each end of the histogram when
/// stretching. Keeps a glare spot or a speck of dirt from pinning the range.
const CLIP_PER_MILLE: usize = 5;

/// Downscale, convert to grayscale and stretch contrast.
///
/// Already-binarized scans (thermal printer output run through a scanner app)
/// are left as they are; stretching would only amplify JPEG noise.
fn normalize(img: DynamicImage) -> DynamicImage {
    let img = if img.width() > MAX_SIDE || img.height() > MAX_SIDE {
        img.resize(MAX_SIDE, MAX_SIDE, FilterType::Lanczos3)
    } else {
        img
    };

    let gray: GrayImage = img.to_luma8();
    let histogram = luma_histogram(&gray);
    let total = gray.width() as usize * gray.height() as usize;

    if is_binarized(&histogram, total) {
        return DynamicImage::ImageLuma8(gray);
    }
    let Some((low, high)) = clipped_range(&histogram, total) else {
        return DynamicImage::ImageLuma8(gray);
    };

    let span = (high - low) as u32;
    let lut: Vec<u8> = (0..=255u8)
        .map(|v| (v.saturating_sub(low) as u32 * 255 / span).min(255) as u8)
        .collect();
    let stretched: GrayImage = ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        Luma([lut[gray.get_pixel(x, y)[0] as usize]])
    });

    DynamicImage::ImageLuma8(stretched)
}

fn luma_histogram(gray: &GrayImage) -> [usize; 256] {
    let mut histogram = [0usize; 256];
    for p in gray.pixels() {
        histogram[p[0] as usize] += 1;
    }
    histogram
}

/// At most 1% of pixels sit between ink and paper.
fn is_binarized(histogram: &[usize; 256], total: usize) -> bool {
    let midtones: usize = histogram[INK_MARGIN + 1..256 - INK_MARGIN - 1].iter().sum();
    total > 0 && midtones * 100 <= total
}

/// Darkest and brightest levels once the clipped tails are dropped; `None` when
/// nothing is left to stretch.
fn clipped_range(histogram: &[usize; 256], total: usize) -> Option<(u8, u8)> {
    let cut = total * CLIP_PER_MILLE / 1000;
    let low = first_past(histogram, cut, 0..256)?;
    let high = first_past(histogram, cut, (0..256).rev())?;
    (high > low).then_some((low as u8, high as u8))
}

/// First of `levels` at which more than `cut` pixels have been counted.
fn first_past(
    histogram: &[usize; 256],
    cut: usize,
    levels: impl Iterator<Item = usize>,
) -> Option<usize> {
    let mut seen = 0;
    for level in levels {
        seen += histogram[level];
        if seen > cut {
            return Some(level);
        }
    }
    None
}

fn encode_as_png(img: DynamicImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}
