//! Image encoding and saving utilities.

use std::fs;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::RgbImage;

use crate::error::{Error, Result};

/// Encoded output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Lossy JPEG, honoring the configured quality.
    Jpeg,
    /// Lossless PNG.
    Png,
}

impl OutputFormat {
    /// Pick the format from a file extension, falling back to PNG.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("png")
            .to_lowercase();

        match extension.as_str() {
            "jpg" | "jpeg" => Self::Jpeg,
            _ => Self::Png,
        }
    }

    /// Canonical file extension.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

/// Encode an RGB image to bytes.
///
/// `quality` (1-100) only applies to JPEG.
///
/// # Errors
///
/// Returns an error if the encoder fails.
pub fn encode(img: &RgbImage, format: OutputFormat, quality: u8) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();

    let result = match format {
        OutputFormat::Jpeg => {
            img.write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, quality))
        }
        OutputFormat::Png => img.write_with_encoder(PngEncoder::new(&mut bytes)),
    };

    result.map_err(|source| Error::ImageEncode {
        format: format.extension().to_string(),
        source,
    })?;

    Ok(bytes)
}

/// Save an RGB image to a file; the format is inferred from the extension.
///
/// # Errors
///
/// Returns an error if the image cannot be encoded or written.
pub fn save_image<P: AsRef<Path>>(img: &RgbImage, path: P, quality: u8) -> Result<()> {
    let path = path.as_ref();
    let bytes = encode(img, OutputFormat::from_path(path), quality)?;

    fs::write(path, bytes).map_err(|source| Error::ImageSave {
        path: path.to_path_buf(),
        source,
    })
}

/// Somewhere encoded images can be stored by name.
pub trait ImageSink {
    /// Store `bytes` under `name` and return where they ended up.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes cannot be stored.
    fn save(&self, bytes: &[u8], name: &str) -> Result<PathBuf>;
}

/// An [`ImageSink`] writing files into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Create a sink for `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new<P: Into<PathBuf>>(dir: P) -> Result<Self> {
        let dir = dir.into();

        fs::create_dir_all(&dir).map_err(|source| Error::ImageSave {
            path: dir.clone(),
            source,
        })?;

        Ok(Self { dir })
    }

    /// Sink for the user's Pictures directory.
    ///
    /// Falls back to the current directory on platforms without one.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn pictures() -> Result<Self> {
        Self::new(dirs::picture_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Directory this sink writes to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ImageSink for DirectorySink {
    fn save(&self, bytes: &[u8], name: &str) -> Result<PathBuf> {
        let path = self.dir.join(name);

        fs::write(&path, bytes).map_err(|source| Error::ImageSave {
            path: path.clone(),
            source,
        })?;

        tracing::info!("Image saved to {}", path.display());
        Ok(path)
    }
}
