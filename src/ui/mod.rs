use iced::{
    widget::{button, column, progress_bar, row, text, text_input, Column, Space},
    Element, Length,
};

use crate::application::{notification::Notification, progress::DownloadProgressEntry};

pub const DEFAULT_ARCHIVE_NAME: &str = "immich.zip";

/// Main view state
pub struct DownloadView {
    pub album_id: String,
    pub asset_ids: String,
    pub asset_id: String,
    pub archive_name: String,
    /// Preferred archive size in GiB, empty for the server default
    pub archive_size: String,
    pub include_embedded_videos: bool,
    pub download_dir: String,
    pub status_message: String,
    /// Refreshed from the progress registry on every tick
    pub downloads: Vec<(String, DownloadProgressEntry)>,
    /// Refreshed from the notification center on every tick
    pub notifications: Vec<Notification>,
}

impl Default for DownloadView {
    fn default() -> Self {
        Self {
            album_id: String::new(),
            asset_ids: String::new(),
            asset_id: String::new(),
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
            archive_size: String::new(),
            include_embedded_videos: false,
            download_dir: String::new(),
            status_message: "Enter an album or asset ids to download".to_string(),
            downloads: Vec::new(),
            notifications: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum DownloadMessage {
    AlbumIdChanged(String),
    AssetIdsChanged(String),
    AssetIdChanged(String),
    ArchiveNameChanged(String),
    ArchiveSizeChanged(String),
    EmbeddedVideosToggled,
    DownloadAlbumPressed,
    DownloadAssetsPressed,
    DownloadOriginalPressed,
    CopyLinkPressed,
    PickFolderPressed,
    CancelPressed(String),
    DismissNotification(u64),
}

/// Parse a size in GiB into bytes; empty means "server default"
pub fn parse_archive_size(input: &str) -> Result<Option<u64>, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    match input.parse::<f64>() {
        Ok(gib) if gib > 0.0 && gib.is_finite() => {
            Ok(Some((gib * 1024.0 * 1024.0 * 1024.0).round() as u64))
        }
        _ => Err(format!("Invalid archive size: {}", input)),
    }
}

impl DownloadView {
    pub fn update(&mut self, message: DownloadMessage) {
        match message {
            DownloadMessage::AlbumIdChanged(id) => {
                self.album_id = id;
            }
            DownloadMessage::AssetIdsChanged(ids) => {
                self.asset_ids = ids;
            }
            DownloadMessage::AssetIdChanged(id) => {
                self.asset_id = id;
            }
            DownloadMessage::ArchiveNameChanged(name) => {
                self.archive_name = name;
            }
            DownloadMessage::ArchiveSizeChanged(size) => {
                self.archive_size = size;
            }
            DownloadMessage::EmbeddedVideosToggled => {
                self.include_embedded_videos = !self.include_embedded_videos;
            }
            _ => {
                // Will be handled by the app
            }
        }
    }

    /// Archive name to request, falling back to the default when left empty
    pub fn archive_name_or_default(&self) -> String {
        let name = self.archive_name.trim();
        if name.is_empty() {
            DEFAULT_ARCHIVE_NAME.to_string()
        } else {
            name.to_string()
        }
    }

    fn downloads_view(&self) -> Element<'_, DownloadMessage> {
        let rows: Vec<Element<'_, DownloadMessage>> = self
            .downloads
            .iter()
            .map(|(key, entry)| {
                let cancel = button(text("Cancel").size(12))
                    .on_press_maybe(
                        entry
                            .abort
                            .as_ref()
                            .map(|_| DownloadMessage::CancelPressed(key.clone())),
                    )
                    .padding([2, 8]);

                row![
                    text(key.clone()).size(14).width(Length::FillPortion(3)),
                    progress_bar(0.0..=100.0, entry.percentage),
                    text(format!("{:.0}%", entry.percentage)).size(14),
                    cancel,
                ]
                .spacing(10)
                .into()
            })
            .collect();

        Column::with_children(rows).spacing(6).into()
    }

    fn notifications_view(&self) -> Element<'_, DownloadMessage> {
        let rows: Vec<Element<'_, DownloadMessage>> = self
            .notifications
            .iter()
            .map(|notification| {
                row![
                    text(format!("[{:?}] {}", notification.kind, notification.message))
                        .size(14)
                        .width(Length::Fill),
                    button(text("x").size(12))
                        .on_press(DownloadMessage::DismissNotification(notification.id))
                        .padding([2, 8]),
                ]
                .spacing(10)
                .into()
            })
            .collect();

        Column::with_children(rows).spacing(4).into()
    }

    pub fn view(&self) -> Element<'_, DownloadMessage> {
        let embedded_label = if self.include_embedded_videos {
            "Embedded videos: included"
        } else {
            "Embedded videos: skipped"
        };

        column![
            text("Immich Downloader").size(32),
            Space::new().height(Length::Fixed(10.0)),
            row![
                text(format!("Save to: {}", self.download_dir)).size(14).width(Length::Fill),
                button("Choose folder")
                    .on_press(DownloadMessage::PickFolderPressed)
                    .padding([6, 12]),
            ]
            .spacing(10),
            row![
                text_input("Max archive size (GiB)", &self.archive_size)
                    .on_input(DownloadMessage::ArchiveSizeChanged)
                    .padding(10),
                button(embedded_label)
                    .on_press(DownloadMessage::EmbeddedVideosToggled)
                    .padding([10, 20]),
            ]
            .spacing(10),
            Space::new().height(Length::Fixed(10.0)),
            text("Album ID:").size(16),
            row![
                text_input("Enter album ID...", &self.album_id)
                    .on_input(DownloadMessage::AlbumIdChanged)
                    .padding(10),
                button("Download album")
                    .on_press(DownloadMessage::DownloadAlbumPressed)
                    .padding([10, 20]),
            ]
            .spacing(10),
            text("Asset IDs:").size(16),
            text_input("Paste asset IDs...", &self.asset_ids)
                .on_input(DownloadMessage::AssetIdsChanged)
                .padding(10),
            row![
                text_input("Archive name", &self.archive_name)
                    .on_input(DownloadMessage::ArchiveNameChanged)
                    .padding(10),
                button("Download archive")
                    .on_press(DownloadMessage::DownloadAssetsPressed)
                    .padding([10, 20]),
            ]
            .spacing(10),
            text("Single asset:").size(16),
            row![
                text_input("Enter asset ID...", &self.asset_id)
                    .on_input(DownloadMessage::AssetIdChanged)
                    .padding(10),
                button("Download original")
                    .on_press(DownloadMessage::DownloadOriginalPressed)
                    .padding([10, 20]),
                button("Copy link")
                    .on_press(DownloadMessage::CopyLinkPressed)
                    .padding([10, 20]),
            ]
            .spacing(10),
            Space::new().height(Length::Fixed(10.0)),
            text(&self.status_message).size(14),
            self.downloads_view(),
            self.notifications_view(),
        ]
        .padding(20)
        .spacing(10)
        .into()
    }
}
