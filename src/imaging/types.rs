use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageOutputFormat, RgbImage};

use crate::error::{ImageError, Result};

/// An uploaded image, decoded to RGB, together with the name it was uploaded under
#[derive(Clone, Debug)]
pub struct SourceImage {
    name: String,
    image: RgbImage,
}

impl SourceImage {
    /// Wrap an already decoded image
    pub fn new<S: Into<String>>(name: S, image: RgbImage) -> Self {
        Self { name: name.into(), image }
    }

    /// Decode PNG/JPEG bytes. Alpha is dropped.
    pub fn decode<S: Into<String>>(name: S, bytes: &[u8]) -> Result<Self> {
        let name = name.into();
        let decoded = image::load_from_memory(bytes)
            .map_err(|_| ImageError::DecodeFailed { name: name.clone() })?;

        Ok(Self::from_dynamic(name, decoded))
    }

    /// Load and decode an image file; the file name becomes the image name
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();
        let bytes = std::fs::read(path)
            .map_err(|_| ImageError::DecodeFailed { name: path.display().to_string() })?;
        Self::decode(name, &bytes)
    }

    fn from_dynamic(name: String, decoded: DynamicImage) -> Self {
        let image = match decoded {
            DynamicImage::ImageRgb8(img) => img,
            other => other.to_rgb8(),
        };
        Self { name, image }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_image(&self) -> &RgbImage {
        &self.image
    }
}

/// A transformed still, ready to be shown, downloaded or turned into a clip
#[derive(Clone, Debug)]
pub struct ProcessedImage {
    source_name: String,
    image: RgbImage,
}

impl ProcessedImage {
    pub fn new<S: Into<String>>(source_name: S, image: RgbImage) -> Self {
        Self {
            source_name: source_name.into(),
            image,
        }
    }

    /// Name of the upload this still was made from
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// File name offered for download
    pub fn download_name(&self) -> String {
        format!("processed_{}", self.source_name)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn as_image(&self) -> &RgbImage {
        &self.image
    }

    /// Encode the still as PNG
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(self.image.clone())
            .write_to(&mut buffer, ImageOutputFormat::Png)
            .map_err(|e| ImageError::EncodeFailed {
                name: self.download_name(),
                reason: e.to_string(),
            })?;
        Ok(buffer.into_inner())
    }
}
