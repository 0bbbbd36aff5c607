//! Model lookup, download, and loading utilities.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;

use crate::error::{Error, Result};

/// File name of the cached model: a pix2pix generator taking `1x256x256x1` L
/// and producing `1x256x256x2` ab, both normalized to `[-1, 1]`.
pub const MODEL_FILENAME: &str = "pix2pix_lab_256.onnx";

/// Manages the model cache directory and downloads.
pub struct ModelCache {
    cache_dir: PathBuf,
}

impl ModelCache {
    /// Create a new model cache.
    ///
    /// Uses the platform-appropriate cache directory:
    /// - Windows: `%LOCALAPPDATA%\colorizer\models`
    /// - Linux: `~/.cache/colorizer/models`
    /// - macOS: `~/Library/Caches/colorizer/models`
    ///
    /// # Errors
    ///
    /// Returns an error if the cache directory cannot be created.
    pub fn new() -> Result<Self> {
        let base = dirs::cache_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::with_dir(base.join("colorizer").join("models"))
    }

    /// Create a cache rooted at `cache_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache directory cannot be created.
    pub fn with_dir<P: Into<PathBuf>>(cache_dir: P) -> Result<Self> {
        let cache_dir = cache_dir.into();

        fs::create_dir_all(&cache_dir).map_err(|source| Error::CacheDir {
            path: cache_dir.clone(),
            source,
        })?;

        Ok(Self { cache_dir })
    }

    /// Where the model lives inside the cache, whether or not it exists yet.
    #[must_use]
    pub fn cached_path(&self) -> PathBuf {
        self.cache_dir.join(MODEL_FILENAME)
    }

    /// Resolve the cached model file, downloading it from `url` first when it
    /// is missing and a URL is given.
    ///
    /// # Errors
    ///
    /// Returns an error if no model is cached and it cannot be downloaded.
    pub fn resolve(&self, url: Option<&str>) -> Result<PathBuf> {
        let path = self.cached_path();
        if path.is_file() {
            tracing::debug!("Using cached model {}", path.display());
            return Ok(path);
        }

        match url {
            Some(url) => {
                download_file(url, &path, MODEL_FILENAME)?;
                Ok(path)
            }
            None => Err(Error::ModelNotFound { path }),
        }
    }
}

/// Load an ONNX model session.
///
/// The runtime is free to pick whatever execution provider it was built with;
/// callers only control the intra-op thread count.
///
/// # Errors
///
/// Returns an error if the model cannot be loaded.
pub fn load_session(path: &Path, intra_threads: usize) -> Result<Session> {
    tracing::info!("Loading model {}", path.display());

    build_session(path, intra_threads).map_err(|source| Error::ModelLoad {
        name: path
            .file_name()
            .map_or_else(|| MODEL_FILENAME.to_string(), |n| n.to_string_lossy().into_owned()),
        source,
    })
}

fn build_session(path: &Path, intra_threads: usize) -> ort::Result<Session> {
    Ok(Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(intra_threads)?
        .commit_from_file(path)?)
}

/// Download a file from a URL to a path with progress indication.
fn download_file(url: &str, path: &Path, name: &str) -> Result<()> {
    tracing::info!("Downloading {name} from {url}");

    let client = reqwest::blocking::Client::new();
    let response = client
        .get(url)
        .send()
        .and_then(reqwest::blocking::Response::error_for_status)
        .map_err(|source| Error::ModelDownload {
            name: name.to_string(),
            source,
        })?;

    let pb = match response.content_length() {
        Some(total_size) => {
            let pb = ProgressBar::new(total_size);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb
        }
        None => ProgressBar::new_spinner(),
    };
    pb.set_message(format!("Downloading {name}"));

    // Write to a temporary file first, then rename for atomicity
    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)?;

    let mut downloaded = 0u64;
    let mut reader = response;

    loop {
        let mut buffer = [0u8; 8192];
        let bytes_read = std::io::Read::read(&mut reader, &mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        file.write_all(&buffer[..bytes_read])?;
        downloaded += bytes_read as u64;
        pb.set_position(downloaded);
    }
    file.flush()?;

    pb.finish_with_message(format!("Downloaded {name}"));

    fs::rename(&temp_path, path)?;

    Ok(())
}
