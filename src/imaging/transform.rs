use image::imageops::{self, FilterType};
use image::RgbImage;
use tracing::debug;

use crate::config::ImageConfig;
use crate::error::{ImageError, Result};
use crate::imaging::types::{ProcessedImage, SourceImage};

/// Parameters for the blur-backdrop crop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformParams {
    /// Backdrop canvas size (width, height)
    pub target_size: (u32, u32),

    /// Gaussian blur sigma applied to the backdrop; 0 disables blurring
    pub blur_radius: u32,

    /// Aspect ratio of the output, horizontal part
    pub ratio_w: u32,

    /// Aspect ratio of the output, vertical part
    pub ratio_h: u32,
}

impl TransformParams {
    pub fn validate(&self) -> Result<()> {
        if self.target_size.0 == 0 || self.target_size.1 == 0 {
            return Err(ImageError::InvalidParameters {
                details: format!("target size must be non-zero, got {}x{}", self.target_size.0, self.target_size.1),
            }.into());
        }

        if self.ratio_w == 0 || self.ratio_h == 0 {
            return Err(ImageError::InvalidParameters {
                details: format!("aspect ratio parts must be positive, got {}:{}", self.ratio_w, self.ratio_h),
            }.into());
        }

        Ok(())
    }

    /// Width of the cropped output for a canvas of the given height
    pub fn output_width(&self, canvas_height: u32) -> u32 {
        let aspect = self.ratio_w as f64 / self.ratio_h as f64;
        (canvas_height as f64 * aspect).round() as u32
    }
}

impl From<&ImageConfig> for TransformParams {
    fn from(config: &ImageConfig) -> Self {
        Self {
            target_size: config.target_dimensions(),
            blur_radius: config.blur_radius,
            ratio_w: config.aspect_ratio_w,
            ratio_h: config.aspect_ratio_h,
        }
    }
}

/// Turns a square upload into a blurred-backdrop still with the configured aspect ratio
pub struct ImageTransformer {
    params: TransformParams,
}

impl ImageTransformer {
    pub fn new(params: TransformParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn from_config(config: &ImageConfig) -> Result<Self> {
        Self::new(TransformParams::from(config))
    }

    pub fn params(&self) -> &TransformParams {
        &self.params
    }

    pub fn transform(&self, source: &SourceImage) -> Result<ProcessedImage> {
        let output = transform_image(source.as_image(), &self.params)?;

        debug!(
            "Transformed '{}': {}x{} -> {}x{}",
            source.name(),
            source.width(),
            source.height(),
            output.width(),
            output.height()
        );

        Ok(ProcessedImage::new(source.name(), output))
    }
}

/// Resize to the canvas, blur it, paste the original in the middle, then crop
/// horizontally around the center to `ratio_w:ratio_h`.
///
/// The original is pasted unresized. When it is larger than the canvas the
/// paste offset goes negative and the overhang is clipped. When the requested
/// ratio is wider than the canvas, the area outside the canvas is black.
pub fn transform_image(original: &RgbImage, params: &TransformParams) -> Result<RgbImage> {
    params.validate()?;

    let (target_w, target_h) = params.target_size;

    let mut canvas = imageops::resize(original, target_w, target_h, FilterType::CatmullRom);
    if params.blur_radius > 0 {
        canvas = imageops::blur(&canvas, params.blur_radius as f32);
    }

    // Truncating division, same as the paste offset of the centered original
    let paste_x = (target_w as i64 - original.width() as i64) / 2;
    let paste_y = (target_h as i64 - original.height() as i64) / 2;
    imageops::replace(&mut canvas, original, paste_x, paste_y);

    let crop_width = params.output_width(canvas.height());
    if crop_width == 0 {
        return Err(ImageError::InvalidParameters {
            details: format!(
                "ratio {}:{} leaves no pixels on a canvas {} high",
                params.ratio_w, params.ratio_h, canvas.height()
            ),
        }.into());
    }

    // Left edge from the unrounded width, rounded to the nearest column
    let exact_width = canvas.height() as f64 * params.ratio_w as f64 / params.ratio_h as f64;
    let left = ((canvas.width() as f64 - exact_width) / 2.0).round() as i64;
    let mut cropped = RgbImage::new(crop_width, canvas.height());
    imageops::replace(&mut cropped, &canvas, -left, 0);

    Ok(cropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn params(target: u32, blur: u32, ratio_w: u32, ratio_h: u32) -> TransformParams {
        TransformParams {
            target_size: (target, target),
            blur_radius: blur,
            ratio_w,
            ratio_h,
        }
    }

    fn gradient(size: u32) -> RgbImage {
        RgbImage::from_fn(size, size, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]))
    }

    #[test]
    fn test_vertical_crop_dimensions() {
        let output = transform_image(&gradient(500), &params(1000, 10, 9, 16)).unwrap();
        assert_eq!(output.dimensions(), (563, 1000));

        let output = transform_image(&gradient(800), &params(1000, 10, 9, 16)).unwrap();
        assert_eq!(output.dimensions(), (563, 1000));
    }

    #[test]
    fn test_crop_left_edge_rounds_exact_offset() {
        // Every column is distinguishable, and the original covers the whole canvas
        let source = RgbImage::from_fn(1000, 1000, |x, _| Rgb([(x % 256) as u8, (x / 256) as u8, 0]));
        let output = transform_image(&source, &params(1000, 0, 9, 16)).unwrap();

        // (1000 - 562.5) / 2 = 218.75, so the crop starts at column 219
        assert_eq!(output.get_pixel(0, 0), source.get_pixel(219, 0));
        assert_eq!(output.get_pixel(562, 0), source.get_pixel(781, 0));
    }

    #[test]
    fn test_aspect_ratio_holds_within_one_pixel() {
        let source = gradient(64);
        for &(target, ratio_w, ratio_h) in &[
            (100, 9, 16),
            (333, 3, 4),
            (250, 1, 1),
            (150, 1, 20),
            (120, 20, 1),
            (777, 4, 5),
            (101, 7, 13),
        ] {
            let output = transform_image(&source, &params(target, 0, ratio_w, ratio_h)).unwrap();
            let expected_width = output.height() as f64 * ratio_w as f64 / ratio_h as f64;
            assert!(
                (output.width() as f64 - expected_width).abs() <= 1.0,
                "{}:{} on {} gave {}x{}",
                ratio_w, ratio_h, target, output.width(), output.height()
            );
            assert_eq!(output.height(), target);
        }
    }

    #[test]
    fn test_original_is_pasted_unresized_in_center() {
        let source = RgbImage::from_pixel(100, 100, Rgb([255, 0, 0]));
        let output = transform_image(&source, &params(400, 0, 1, 1)).unwrap();
        assert_eq!(output.dimensions(), (400, 400));

        // The pasted original covers 150..250 in both directions
        assert_eq!(output.get_pixel(150, 150), &Rgb([255, 0, 0]));
        assert_eq!(output.get_pixel(249, 249), &Rgb([255, 0, 0]));
    }

    #[test]
    fn test_backdrop_differs_from_pasted_original() {
        // Left half black, right half white: blur smears the edge on the backdrop
        let source = RgbImage::from_fn(100, 100, |x, _| {
            if x < 50 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
        });
        let output = transform_image(&source, &params(400, 20, 1, 1)).unwrap();

        let edge = output.get_pixel(200, 20);
        assert!(edge[0] > 0 && edge[0] < 255, "backdrop edge should be blurred, got {:?}", edge);

        // Inside the pasted original the edge stays sharp
        assert_eq!(output.get_pixel(199, 200), &Rgb([0, 0, 0]));
        assert_eq!(output.get_pixel(200, 200), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_zero_blur_is_identity_on_flat_image() {
        let source = RgbImage::from_pixel(50, 50, Rgb([10, 20, 30]));
        let output = transform_image(&source, &params(200, 0, 1, 1)).unwrap();
        assert!(output.pixels().all(|p| *p == Rgb([10, 20, 30])));
    }

    #[test]
    fn test_oversized_original_is_clipped() {
        let source = RgbImage::from_pixel(300, 300, Rgb([0, 255, 0]));
        let output = transform_image(&source, &params(100, 5, 9, 16)).unwrap();
        assert_eq!(output.dimensions(), (56, 100));
        assert!(output.pixels().all(|p| *p == Rgb([0, 255, 0])));
    }

    #[test]
    fn test_wide_ratio_pads_with_black() {
        let source = RgbImage::from_pixel(100, 100, Rgb([200, 200, 200]));
        let output = transform_image(&source, &params(100, 0, 2, 1)).unwrap();
        assert_eq!(output.dimensions(), (200, 100));
        assert_eq!(output.get_pixel(0, 50), &Rgb([0, 0, 0]));
        assert_eq!(output.get_pixel(100, 50), &Rgb([200, 200, 200]));
        assert_eq!(output.get_pixel(199, 50), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_zero_ratio_rejected() {
        assert!(ImageTransformer::new(params(100, 0, 0, 16)).is_err());
        assert!(ImageTransformer::new(params(0, 0, 9, 16)).is_err());
    }

    #[test]
    fn test_transformer_keeps_source_name() {
        let transformer = ImageTransformer::new(params(120, 2, 9, 16)).unwrap();
        let processed = transformer
            .transform(&SourceImage::new("cat.png", gradient(60)))
            .unwrap();
        assert_eq!(processed.source_name(), "cat.png");
        assert_eq!(processed.dimensions(), (68, 120));
    }
}
