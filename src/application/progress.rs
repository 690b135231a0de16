use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;

/// Where transfers report their byte progress. Shared across the whole app
/// and keyed by display key.
pub trait ProgressRegistry: Send + Sync {
    fn add(&self, key: &str, total: u64, cancel: CancellationToken);
    fn update(&self, key: &str, progress: u64, total: Option<u64>);
    fn clear(&self, key: &str);
}

#[derive(Debug, Clone)]
pub struct DownloadProgressEntry {
    pub progress: u64,
    pub total: u64,
    /// 0.0..=100.0
    pub percentage: f32,
    /// Dropped once the transfer has received every byte
    pub abort: Option<CancellationToken>,
}

/// In-memory registry rendered by the progress list
#[derive(Debug, Default)]
pub struct DownloadManager {
    assets: Mutex<HashMap<String, DownloadProgressEntry>>,
}

impl DownloadManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, DownloadProgressEntry>> {
        self.assets.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Trigger the cancellation handle of an in-flight transfer
    pub fn cancel(&self, key: &str) -> bool {
        match self.lock().get(key).and_then(|entry| entry.abort.as_ref()) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Snapshot sorted by key
    pub fn entries(&self) -> Vec<(String, DownloadProgressEntry)> {
        let mut entries: Vec<_> = self
            .lock()
            .iter()
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<DownloadProgressEntry> {
        self.lock().get(key).cloned()
    }

    pub fn is_downloading(&self) -> bool {
        !self.lock().is_empty()
    }
}

impl ProgressRegistry for DownloadManager {
    fn add(&self, key: &str, total: u64, cancel: CancellationToken) {
        tracing::debug!(key, total, "progress entry registered");
        self.lock().insert(
            key.to_string(),
            DownloadProgressEntry {
                progress: 0,
                total,
                percentage: 0.0,
                abort: Some(cancel),
            },
        );
    }

    fn update(&self, key: &str, progress: u64, total: Option<u64>) {
        let mut assets = self.lock();
        let Some(entry) = assets.get_mut(key) else {
            return;
        };

        if let Some(total) = total {
            entry.total = total;
        }
        entry.progress = progress;
        entry.percentage = if entry.total > 0 {
            (progress as f32 / entry.total as f32 * 100.0).min(100.0)
        } else {
            0.0
        };

        if entry.total > 0 && progress >= entry.total {
            entry.abort = None;
        }
    }

    fn clear(&self, key: &str) {
        if self.lock().remove(key).is_some() {
            tracing::debug!(key, "progress entry cleared");
        }
    }
}
