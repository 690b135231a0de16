use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use iced::{Subscription, Task};

use crate::api::models::{AlbumResponseDto, AssetResponseDto};
use crate::api::{self, ApiClient};
use crate::application::{
    i18n::I18n,
    notification::{handle_error, NotificationCenter, NotificationType, Notifier},
    platform::DesktopPlatform,
    progress::DownloadManager,
    DownloadOrchestrator, DownloadReport,
};
use crate::config::AppConfig;
use crate::domain::{
    asset::{asset_filename, asset_resolution, asset_type_label, file_size, is_web_compatible_image},
    AppError, TargetSpec,
};
use crate::ui::{parse_archive_size, DownloadMessage, DownloadView};
use crate::utils::extract_asset_ids;

/// How often the progress list and notifications are refreshed
const REFRESH_INTERVAL: Duration = Duration::from_millis(200);

pub struct DownloadApp {
    view: DownloadView,
    orchestrator: DownloadOrchestrator,
    downloads: Arc<DownloadManager>,
    notifications: Arc<NotificationCenter>,
    platform: Arc<DesktopPlatform>,
    i18n: Arc<I18n>,
    /// Shared-link key, when browsing through a shared link
    shared_key: Option<String>,
    /// Last asset fetched for an original download
    loaded_asset: Option<AssetResponseDto>,
}

impl Default for DownloadApp {
    fn default() -> Self {
        Self::new(AppConfig::from_env())
    }
}

fn load_i18n(config: &AppConfig) -> I18n {
    let Some(path) = config.locale_file.as_ref() else {
        return I18n::default();
    };

    match std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|json| I18n::from_json(&json).map_err(|e| e.to_string()))
    {
        Ok(i18n) => i18n,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to load locale file, using English");
            I18n::default()
        }
    }
}

impl DownloadApp {
    pub fn new(config: AppConfig) -> Self {
        let i18n = Arc::new(load_i18n(&config));
        let downloads = Arc::new(DownloadManager::new());
        let notifications = Arc::new(NotificationCenter::new());
        let platform = Arc::new(DesktopPlatform::new(config.download_dir.clone()));

        tracing::info!(
            server = %config.api.base_url,
            download_dir = %config.download_dir.display(),
            "starting downloader"
        );

        let shared_key = config.api.shared_key.clone();
        let orchestrator = DownloadOrchestrator::new(
            ApiClient::new(config.api),
            downloads.clone(),
            notifications.clone(),
            platform.clone(),
            i18n.clone(),
            config.preferences.clone(),
        );

        let mut view = DownloadView::default();
        view.download_dir = config.download_dir.display().to_string();
        view.include_embedded_videos = config.preferences.include_embedded_videos;
        if let Some(size) = config.preferences.archive_size {
            view.archive_size = format!("{}", size as f64 / (1024.0 * 1024.0 * 1024.0));
        }

        Self {
            view,
            orchestrator,
            downloads,
            notifications,
            platform,
            i18n,
            shared_key,
            loaded_asset: None,
        }
    }

    fn api_client(&self) -> ApiClient {
        self.orchestrator.api_client().clone()
    }

    fn sync_preferences(&mut self) {
        let mut preferences = self.orchestrator.preferences();
        preferences.include_embedded_videos = self.view.include_embedded_videos;
        match parse_archive_size(&self.view.archive_size) {
            Ok(size) => preferences.archive_size = size,
            Err(e) => {
                self.view.status_message = e;
                return;
            }
        }
        self.orchestrator.set_preferences(preferences);
    }

    fn handle_ui(&mut self, message: DownloadMessage) -> Task<Message> {
        self.view.update(message.clone());

        match message {
            DownloadMessage::ArchiveSizeChanged(_) | DownloadMessage::EmbeddedVideosToggled => {
                self.sync_preferences();
            }
            DownloadMessage::DownloadAlbumPressed => {
                let album_id = self.view.album_id.trim().to_string();
                if album_id.is_empty() {
                    self.view.status_message = self.i18n.t("errors.album_id_required");
                    return Task::none();
                }

                self.view.status_message = self.i18n.t_with("fetching_album", &[("id", &album_id)]);
                let api_client = self.api_client();
                return Task::perform(
                    async move {
                        api_client
                            .get_album_info(&album_id, true)
                            .await
                            .map_err(AppError::from)
                    },
                    Message::AlbumLoaded,
                );
            }
            DownloadMessage::DownloadAssetsPressed => {
                let asset_ids = extract_asset_ids(&self.view.asset_ids);
                if asset_ids.is_empty() {
                    self.notifications.show(
                        self.i18n.t("errors.invalid_asset_ids"),
                        NotificationType::Warning,
                    );
                    return Task::none();
                }

                self.view.status_message = self
                    .i18n
                    .t_with("preparing_assets", &[("count", &asset_ids.len().to_string())]);
                let orchestrator = self.orchestrator.clone();
                let file_name = self.view.archive_name_or_default();
                return Task::perform(
                    async move {
                        orchestrator
                            .download_archive(&file_name, TargetSpec::Assets(asset_ids))
                            .await
                    },
                    Message::DownloadFinished,
                );
            }
            DownloadMessage::DownloadOriginalPressed => {
                let asset_id = self.view.asset_id.trim().to_string();
                if asset_id.is_empty() {
                    self.view.status_message = self.i18n.t("errors.asset_id_required");
                    return Task::none();
                }

                let api_client = self.api_client();
                return Task::perform(
                    async move {
                        api_client
                            .get_asset_info(&asset_id)
                            .await
                            .map_err(AppError::from)
                    },
                    Message::AssetLoaded,
                );
            }
            DownloadMessage::CopyLinkPressed => {
                match self.link_to_copy() {
                    Some(Ok(url)) => {
                        return iced::clipboard::write(url).chain(Task::done(Message::LinkCopied));
                    }
                    None => {
                        self.view.status_message = self.i18n.t("errors.asset_id_required");
                    }
                    Some(Err(e)) => handle_error(
                        self.notifications.as_ref(),
                        &AppError::from(e),
                        &self.i18n.t("errors.unable_to_copy_to_clipboard"),
                    ),
                }
            }
            DownloadMessage::PickFolderPressed => {
                let current = self.platform.download_dir();
                return Task::perform(
                    async move {
                        rfd::AsyncFileDialog::new()
                            .set_directory(&current)
                            .pick_folder()
                            .await
                            .map(|handle| handle.path().to_path_buf())
                    },
                    Message::FolderPicked,
                );
            }
            DownloadMessage::CancelPressed(key) => {
                if self.downloads.cancel(&key) {
                    tracing::info!(key = %key, "download cancelled by user");
                }
            }
            DownloadMessage::DismissNotification(id) => {
                self.notifications.dismiss(id);
                self.refresh();
            }
            _ => {}
        }

        Task::none()
    }

    /// Original URL of the entered asset (with its checksum once loaded), or
    /// the shared-link URL when no asset is entered
    fn link_to_copy(&self) -> Option<api::Result<String>> {
        let asset_id = self.view.asset_id.trim();
        if asset_id.is_empty() {
            let key = self.shared_key.as_deref()?;
            return Some(self.api_client().shared_link_url("", key));
        }

        let checksum = self
            .loaded_asset
            .as_ref()
            .filter(|asset| asset.id == asset_id && !asset.checksum.is_empty())
            .map(|asset| asset.checksum.as_str());
        Some(self.api_client().asset_original_url(asset_id, checksum))
    }

    fn refresh(&mut self) {
        self.notifications.expire(Instant::now());
        self.view.downloads = self.downloads.entries();
        self.view.notifications = self.notifications.active();
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(DownloadMessage),
    /// Periodic refresh of progress and notifications
    Tick,
    AlbumLoaded(Result<AlbumResponseDto, AppError>),
    AssetLoaded(Result<AssetResponseDto, AppError>),
    /// Final result of one download action
    DownloadFinished(DownloadReport),
    /// Clipboard write has been issued
    LinkCopied,
    FolderPicked(Option<PathBuf>),
}

pub fn update(app: &mut DownloadApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => return app.handle_ui(ui_msg),
        Message::Tick => app.refresh(),
        Message::AlbumLoaded(Ok(album)) => {
            app.view.status_message = app
                .i18n
                .t_with("downloading_album", &[("name", &album.album_name)]);
            let orchestrator = app.orchestrator.clone();
            return Task::perform(
                async move { orchestrator.download_album(&album).await },
                Message::DownloadFinished,
            );
        }
        Message::AlbumLoaded(Err(e)) => {
            app.view.status_message = e.to_string();
            handle_error(
                app.notifications.as_ref(),
                &e,
                &app.i18n.t("errors.unable_to_load_album"),
            );
        }
        Message::AssetLoaded(Ok(asset)) => {
            app.view.status_message = format!(
                "{} {} ({}, {}{})",
                asset_type_label(asset.asset_type),
                asset_filename(&asset),
                file_size(&asset),
                asset_resolution(&asset),
                if is_web_compatible_image(&asset) {
                    format!(", {}", app.i18n.t("previewable"))
                } else {
                    String::new()
                },
            );
            app.loaded_asset = Some(asset.clone());
            let orchestrator = app.orchestrator.clone();
            return Task::perform(
                async move { orchestrator.download_file(&asset).await },
                Message::DownloadFinished,
            );
        }
        Message::AssetLoaded(Err(e)) => {
            app.view.status_message = e.to_string();
            handle_error(
                app.notifications.as_ref(),
                &e,
                &app.i18n.t("errors.unable_to_load_asset"),
            );
        }
        Message::DownloadFinished(report) => {
            app.view.status_message = match (report.saved.last(), report.failures) {
                (Some(path), 0) => app
                    .i18n
                    .t_with("saved_to", &[("filename", &path.display().to_string())]),
                (_, 0) => app.i18n.t("nothing_to_download"),
                (_, failures) => app.i18n.t_with(
                    "download_summary",
                    &[
                        ("saved", &report.saved.len().to_string()),
                        ("failures", &failures.to_string()),
                    ],
                ),
            };
            app.refresh();
        }
        Message::LinkCopied => {
            app.notifications
                .show(app.i18n.t("copied_to_clipboard"), NotificationType::Info);
        }
        Message::FolderPicked(Some(path)) => {
            app.view.download_dir = path.display().to_string();
            app.platform.set_download_dir(path);
        }
        Message::FolderPicked(None) => {
            // User cancelled dialog
        }
    }
    Task::none()
}

pub fn view(app: &DownloadApp) -> iced::Element<'_, Message> {
    app.view.view().map(Message::UiMessage)
}

pub fn subscription(_app: &DownloadApp) -> Subscription<Message> {
    iced::time::every(REFRESH_INTERVAL).map(|_| Message::Tick)
}
