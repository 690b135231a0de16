use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncWriteExt;

use crate::domain::AppError;
use crate::utils::sanitize_filename;

/// Host capabilities the orchestrator needs from its environment
#[async_trait]
pub trait PlatformServices: Send + Sync {
    /// Persist a downloaded payload under `filename`, returning where it landed
    async fn save_file(&self, data: Bytes, filename: &str) -> Result<PathBuf, AppError>;
}

/// Saves into a download folder, never overwriting an existing file
#[derive(Debug)]
pub struct DesktopPlatform {
    download_dir: RwLock<PathBuf>,
}

impl DesktopPlatform {
    pub fn new(download_dir: PathBuf) -> Self {
        Self {
            download_dir: RwLock::new(download_dir),
        }
    }

    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn set_download_dir(&self, dir: PathBuf) {
        *self
            .download_dir
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = dir;
    }
}

/// Reduce a server- or user-supplied name to a single path component
fn local_file_name(filename: &str) -> Result<String, AppError> {
    let cleaned = sanitize_filename(filename);
    match Path::new(&cleaned).file_name().and_then(|name| name.to_str()) {
        Some(name) if !name.is_empty() && name != ".." => Ok(name.to_string()),
        _ => Err(AppError::Io(format!("Invalid file name: {:?}", filename))),
    }
}

/// `name.ext`, then `name (1).ext`, `name (2).ext`, ...
fn candidate_path(dir: &Path, filename: &str, attempt: u32) -> PathBuf {
    if attempt == 0 {
        return dir.join(filename);
    }

    match filename.rfind('.') {
        Some(dot) if dot > 0 => dir.join(format!(
            "{} ({}){}",
            &filename[..dot],
            attempt,
            &filename[dot..]
        )),
        _ => dir.join(format!("{} ({})", filename, attempt)),
    }
}

#[async_trait]
impl PlatformServices for DesktopPlatform {
    async fn save_file(&self, data: Bytes, filename: &str) -> Result<PathBuf, AppError> {
        let filename = local_file_name(filename)?;
        let dir = self.download_dir();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::Io(format!("Failed to create {}: {}", dir.display(), e)))?;

        let mut attempt = 0;
        let (mut file, path) = loop {
            let path = candidate_path(&dir, &filename, attempt);
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => break (file, path),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => {
                    return Err(AppError::Io(format!(
                        "Failed to create file {}: {}",
                        path.display(),
                        e
                    )))
                }
            }
        };

        file.write_all(&data)
            .await
            .map_err(|e| AppError::Io(format!("Write error: {}", e)))?;
        file.sync_all()
            .await
            .map_err(|e| AppError::Io(format!("Failed to sync file: {}", e)))?;

        tracing::info!(path = %path.display(), bytes = data.len(), "file saved");
        Ok(path)
    }
}
