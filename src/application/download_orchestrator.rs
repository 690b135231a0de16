use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::Local;
use tokio_util::sync::CancellationToken;

use crate::{
    api::{
        self,
        models::{AlbumResponseDto, AssetIdsDto, AssetResponseDto},
        ApiClient, ByteStream,
    },
    domain::{
        asset::{file_size_in_bytes, is_android_motion_video},
        AppError, DownloadPhase, DownloadPlan, DownloadPlanRequest, DownloadPreferences,
        DownloadTarget, TargetSpec,
    },
    utils::{archive_name, archive_timestamp, download_key, sanitize_filename},
};

use super::{
    i18n::I18n,
    notification::{handle_error, NotificationType, Notifier},
    platform::PlatformServices,
    progress::ProgressRegistry,
    transfer::{fetch_with_progress, TotalReporting},
};

/// How long a finished entry stays in the progress list
pub const PROGRESS_CLEAR_DELAY: Duration = Duration::from_secs(5);

/// Result of one archive or target transfer
#[derive(Debug)]
pub enum StepOutcome {
    Saved(PathBuf),
    Failed(AppError),
}

/// What a download action left behind
#[derive(Debug, Clone, Default)]
pub struct DownloadReport {
    pub saved: Vec<PathBuf>,
    pub failures: usize,
}

#[derive(Clone)]
pub struct DownloadOrchestrator {
    api_client: ApiClient,
    registry: Arc<dyn ProgressRegistry>,
    notifier: Arc<dyn Notifier>,
    platform: Arc<dyn PlatformServices>,
    i18n: Arc<I18n>,
    preferences: Arc<RwLock<DownloadPreferences>>,
    clear_delay: Duration,
}

fn advance(key: &str, phase: &mut DownloadPhase, next: DownloadPhase) {
    debug_assert!(phase.can_advance_to(next), "{:?} -> {:?}", phase, next);
    tracing::debug!(key, from = ?phase, to = ?next, "transfer phase");
    *phase = next;
}

impl DownloadOrchestrator {
    pub fn new(
        api_client: ApiClient,
        registry: Arc<dyn ProgressRegistry>,
        notifier: Arc<dyn Notifier>,
        platform: Arc<dyn PlatformServices>,
        i18n: Arc<I18n>,
        preferences: DownloadPreferences,
    ) -> Self {
        Self {
            api_client,
            registry,
            notifier,
            platform,
            i18n,
            preferences: Arc::new(RwLock::new(preferences)),
            clear_delay: PROGRESS_CLEAR_DELAY,
        }
    }

    pub fn with_clear_delay(mut self, clear_delay: Duration) -> Self {
        self.clear_delay = clear_delay;
        self
    }

    pub fn api_client(&self) -> &ApiClient {
        &self.api_client
    }

    pub fn preferences(&self) -> DownloadPreferences {
        self.preferences
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn set_preferences(&self, preferences: DownloadPreferences) {
        *self
            .preferences
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = preferences;
    }

    pub async fn download_album(&self, album: &AlbumResponseDto) -> DownloadReport {
        let file_name = format!("{}.zip", sanitize_filename(&album.album_name));
        self.download_archive(&file_name, TargetSpec::Album(album.id.clone()))
            .await
    }

    /// Ask the server for an archive plan covering `target`, then fetch and
    /// save each archive in plan order. The first failing archive ends the
    /// whole action.
    pub async fn download_archive(&self, file_name: &str, target: TargetSpec) -> DownloadReport {
        let mut report = DownloadReport::default();
        let request = DownloadPlanRequest {
            target,
            archive_size: self.preferences().archive_size,
        };

        let plan: DownloadPlan = match self.api_client.get_download_info(&request.into()).await {
            Ok(response) => response.into(),
            Err(e) => {
                handle_error(
                    self.notifier.as_ref(),
                    &AppError::from(e),
                    &self.i18n.t("errors.unable_to_download_files"),
                );
                report.failures += 1;
                return report;
            }
        };

        if plan.is_empty() {
            tracing::info!(file_name, "download plan is empty");
            return report;
        }

        let count = plan.len();
        tracing::info!(archives = count, total_size = plan.total_size, file_name, "download plan received");

        for (index, archive) in plan.archives.into_iter().enumerate() {
            let timestamp = archive_timestamp(Local::now().naive_local());
            let name = archive_name(file_name, index, count, &timestamp);
            let key = download_key(&name, index, count);
            let dto = AssetIdsDto {
                asset_ids: archive.asset_ids,
            };

            tracing::info!(archive = %key, size = archive.size, "downloading archive");
            let outcome = self
                .transfer(
                    &key,
                    archive.size,
                    &name,
                    TotalReporting::Registered,
                    self.api_client.download_archive(&dto),
                )
                .await;

            match outcome {
                StepOutcome::Saved(path) => report.saved.push(path),
                StepOutcome::Failed(error) => {
                    handle_error(
                        self.notifier.as_ref(),
                        &error,
                        &self.i18n.t("errors.unable_to_download_files"),
                    );
                    report.failures += 1;
                    tracing::warn!(
                        archive = %key,
                        cancelled = error.is_aborted(),
                        skipped = count - index - 1,
                        "archive download failed, abandoning remaining archives"
                    );
                    return report;
                }
            }
        }

        report
    }

    /// Download the original of `asset`, plus its linked motion video when
    /// there is one. Each file succeeds or fails on its own.
    pub async fn download_file(&self, asset: &AssetResponseDto) -> DownloadReport {
        let mut report = DownloadReport::default();
        let mut targets = vec![DownloadTarget {
            filename: asset.original_file_name.clone(),
            id: asset.id.clone(),
            size: file_size_in_bytes(asset),
        }];

        if let Some(motion_id) = asset.live_photo_video_id.as_deref() {
            match self.api_client.get_asset_info(motion_id).await {
                Ok(motion) => {
                    if !is_android_motion_video(&motion) || self.preferences().include_embedded_videos {
                        targets.push(DownloadTarget {
                            filename: motion.original_file_name.clone(),
                            id: motion_id.to_string(),
                            size: file_size_in_bytes(&motion),
                        });
                    } else {
                        tracing::debug!(asset = %asset.id, motion = motion_id, "skipping embedded motion video");
                    }
                }
                Err(e) => {
                    handle_error(
                        self.notifier.as_ref(),
                        &AppError::from(e),
                        &self
                            .i18n
                            .t_with("errors.error_downloading", &[("filename", motion_id)]),
                    );
                    report.failures += 1;
                }
            }
        }

        for target in targets {
            self.notifier.show(
                self.i18n.t_with(
                    "downloading_asset_filename",
                    &[("filename", &asset.original_file_name)],
                ),
                NotificationType::Info,
            );

            let outcome = self
                .transfer(
                    &target.filename,
                    target.size,
                    &target.filename,
                    TotalReporting::FromResponse,
                    self.api_client.download_asset(&target.id),
                )
                .await;

            match outcome {
                StepOutcome::Saved(path) => report.saved.push(path),
                StepOutcome::Failed(error) => {
                    handle_error(
                        self.notifier.as_ref(),
                        &error,
                        &self
                            .i18n
                            .t_with("errors.error_downloading", &[("filename", &target.filename)]),
                    );
                    report.failures += 1;
                }
            }
        }

        report
    }

    /// Register `key`, run `request` with progress and a fresh cancellation
    /// handle, and hand the payload to the platform. A failed entry is
    /// cleared at once; every entry is cleared again after the delay.
    async fn transfer<F>(
        &self,
        key: &str,
        size: u64,
        filename: &str,
        reporting: TotalReporting,
        request: F,
    ) -> StepOutcome
    where
        F: Future<Output = api::Result<(Option<u64>, ByteStream)>>,
    {
        let mut phase = DownloadPhase::Pending;
        let cancel = CancellationToken::new();
        self.registry.add(key, size, cancel.clone());
        advance(key, &mut phase, DownloadPhase::Registered);

        advance(key, &mut phase, DownloadPhase::Transferring);
        let result =
            match fetch_with_progress(request, key, self.registry.as_ref(), &cancel, reporting).await {
                Ok(data) => self.platform.save_file(data, filename).await,
                Err(e) => Err(e),
            };

        let outcome = match result {
            Ok(path) => {
                advance(key, &mut phase, DownloadPhase::Completed);
                StepOutcome::Saved(path)
            }
            Err(error) => {
                advance(key, &mut phase, DownloadPhase::Failed);
                self.registry.clear(key);
                StepOutcome::Failed(error)
            }
        };

        self.schedule_clear(key.to_string(), phase);
        outcome
    }

    fn schedule_clear(&self, key: String, mut phase: DownloadPhase) {
        let registry = Arc::clone(&self.registry);
        let delay = self.clear_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            registry.clear(&key);
            advance(&key, &mut phase, DownloadPhase::Cleared);
        });
    }
}
