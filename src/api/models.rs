use serde::{Deserialize, Serialize};

/// Request body for `POST /download/info`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadInfoDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_ids: Option<Vec<String>>,
}

/// One archive of a download plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadArchiveInfo {
    pub asset_ids: Vec<String>,
    pub size: u64,
}

/// Response from `POST /download/info`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponseDto {
    pub archives: Vec<DownloadArchiveInfo>,
    pub total_size: u64,
}

/// Request body for `POST /download/archive`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetIdsDto {
    pub asset_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssetTypeEnum {
    Image,
    Video,
    Audio,
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExifResponseDto {
    #[serde(default)]
    pub exif_image_height: Option<u32>,
    #[serde(default)]
    pub exif_image_width: Option<u32>,
    #[serde(default)]
    pub file_size_in_byte: Option<u64>,
    #[serde(default)]
    pub orientation: Option<String>,
}

/// The subset of an asset record the downloader relies on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetResponseDto {
    pub id: String,
    pub owner_id: String,
    pub original_file_name: String,
    pub original_path: String,
    #[serde(default)]
    pub original_mime_type: Option<String>,
    #[serde(rename = "type")]
    pub asset_type: AssetTypeEnum,
    #[serde(default)]
    pub checksum: String,
    #[serde(default)]
    pub live_photo_video_id: Option<String>,
    #[serde(default)]
    pub exif_info: Option<ExifResponseDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumResponseDto {
    pub id: String,
    pub album_name: String,
    #[serde(default)]
    pub asset_count: u64,
    #[serde(default)]
    pub assets: Vec<AssetResponseDto>,
}

/// Error body returned by the server on non-success statuses
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponseDto {
    #[serde(default)]
    pub message: Option<String>,
}

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL including the `/api` prefix
    pub base_url: String,
    /// Sent as the `x-api-key` header
    pub api_key: Option<String>,
    /// Shared-link key, appended to every request as `?key=`
    pub shared_key: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:2283/api".to_string(),
            api_key: None,
            shared_key: None,
        }
    }
}
