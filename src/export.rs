//! Caller-facing artifacts: the ZIP bundle of processed stills and writing a
//! run's output to a directory.

use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::composition::CompositionOutput;
use crate::error::{CompositionError, Result};
use crate::imaging::ProcessedImage;
use crate::video::CombinedVideo;

/// File name of the bundle of processed stills
pub const ZIP_NAME: &str = "processed_images.zip";

/// Bundle processed stills as deflated PNG entries named `processed_<upload name>`
pub fn zip_processed_images(images: &[ProcessedImage]) -> Result<Vec<u8>> {
    let zip_failed = |e: zip::result::ZipError| CompositionError::OutputFailed {
        reason: format!("Failed to build {}: {}", ZIP_NAME, e),
    };

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut used = HashSet::new();

    for image in images {
        let name = unique_name(image.download_name(), &mut used);
        writer.start_file(name, options).map_err(zip_failed)?;
        writer.write_all(&image.to_png_bytes()?)?;
    }

    let cursor = writer.finish().map_err(zip_failed)?;
    Ok(cursor.into_inner())
}

/// Write every artifact of a run into `dir` and return the written paths
pub fn write_artifacts<P: AsRef<Path>>(output: &CompositionOutput, dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    let mut used = HashSet::new();

    for image in &output.images {
        let path = dir.join(unique_name(image.download_name(), &mut used));
        std::fs::write(&path, image.to_png_bytes()?)?;
        written.push(path);
    }

    let zip_path = dir.join(unique_name(ZIP_NAME.to_string(), &mut used));
    std::fs::write(&zip_path, zip_processed_images(&output.images)?)?;
    written.push(zip_path);

    for clip in &output.clips {
        let path = dir.join(unique_name(clip.download_name(), &mut used));
        std::fs::write(&path, &clip.bytes)?;
        written.push(path);
    }

    let combined_path = dir.join(unique_name(CombinedVideo::DOWNLOAD_NAME.to_string(), &mut used));
    std::fs::write(&combined_path, &output.combined.bytes)?;
    written.push(combined_path);

    info!("Wrote {} artifacts to {:?}", written.len(), dir);
    Ok(written)
}

/// Two uploads may share a name; later ones get a numeric prefix
fn unique_name(name: String, used: &mut HashSet<String>) -> String {
    if used.insert(name.clone()) {
        return name;
    }

    let mut n = 2;
    loop {
        let candidate = format!("{}_{}", n, name);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
