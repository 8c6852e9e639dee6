use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;

use crate::error::{ReportError, Result};

/// Pixel width every picture is resized to before it goes into the document.
pub const DOCUMENT_IMAGE_WIDTH: u32 = 800;
/// Tallest picture accepted after scaling to the document width.
pub const MAX_DOCUMENT_IMAGE_HEIGHT: u32 = 16_000;

/// Encoded picture ready to embed: PNG bytes plus pixel size.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

pub fn load_image(path: &Path) -> Result<DynamicImage> {
    image::open(path).map_err(|e| {
        log::warn!("Could not decode {}: {}", path.display(), e);
        ReportError::Image(format!("{}: {}", path.display(), e))
    })
}

/// Output height for a source of `width` x `height` scaled to `target_width`.
pub fn scaled_height(width: u32, height: u32, target_width: u32) -> u32 {
    if width == 0 {
        return 0;
    }
    let h = (height as f64 * target_width as f64 / width as f64).round() as u32;
    h.max(1)
}

/// Convert to RGB, resize to the fixed document width keeping aspect ratio, encode as PNG.
pub fn prepare_for_document(img: &DynamicImage) -> Result<PreparedImage> {
    if img.width() == 0 || img.height() == 0 {
        return Err(ReportError::Image("Image has no pixels.".to_string()));
    }
    let height = scaled_height(img.width(), img.height(), DOCUMENT_IMAGE_WIDTH);
    if height > MAX_DOCUMENT_IMAGE_HEIGHT {
        return Err(ReportError::Image(format!(
            "Image is too tall ({}x{}); at most {} px high after scaling to {} px wide.",
            img.width(),
            img.height(),
            MAX_DOCUMENT_IMAGE_HEIGHT,
            DOCUMENT_IMAGE_WIDTH
        )));
    }
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let resized = rgb.resize_exact(DOCUMENT_IMAGE_WIDTH, height, FilterType::Lanczos3);

    let mut png = Vec::new();
    resized
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| ReportError::Image(format!("Could not encode PNG: {}", e)))?;
    Ok(PreparedImage {
        png,
        width: resized.width(),
        height: resized.height(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn height_follows_aspect_ratio() {
        assert_eq!(scaled_height(1600, 1200, 800), 600);
        assert_eq!(scaled_height(400, 300, 800), 600);
        // 999 * 800 / 1000 = 799.2
        assert_eq!(scaled_height(1000, 999, 800), 799);
        // 800 / 3 = 266.67
        assert_eq!(scaled_height(3, 1, 800), 267);
    }

    #[test]
    fn very_wide_image_keeps_at_least_one_row() {
        assert_eq!(scaled_height(100_000, 1, 800), 1);
    }

    #[test]
    fn prepared_image_is_rgb_png_at_fixed_width() {
        let src = DynamicImage::ImageRgba8(RgbaImage::from_pixel(120, 90, Rgba([10, 20, 30, 128])));
        let out = prepare_for_document(&src).unwrap();
        assert_eq!(out.width, DOCUMENT_IMAGE_WIDTH);
        assert_eq!(out.height, 600);
        assert_eq!(&out.png[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory(&out.png).unwrap();
        assert_eq!(decoded.width(), 800);
        assert_eq!(decoded.height(), 600);
        assert!(matches!(decoded, DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn tall_narrow_image_is_rejected_before_resizing() {
        let src = DynamicImage::ImageRgb8(image::RgbImage::new(1, 100_000));
        assert_eq!(scaled_height(1, 100_000, DOCUMENT_IMAGE_WIDTH), 80_000_000);
        match prepare_for_document(&src) {
            Err(ReportError::Image(msg)) => assert!(msg.contains("too tall")),
            other => panic!("expected image error, got {:?}", other.map(|p| p.height)),
        }
    }

    #[test]
    fn load_image_reports_undecodable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();
        assert!(matches!(load_image(&path), Err(ReportError::Image(_))));
    }
}
