use std::path::PathBuf;

use crate::api::models::ApiConfig;
use crate::domain::DownloadPreferences;

/// Application configuration loaded from environment variables.
///
/// | Env Var                          | Default                      |
/// |----------------------------------|------------------------------|
/// | `IMMICH_URL`                     | `http://localhost:2283/api`  |
/// | `IMMICH_API_KEY`                 | unset                        |
/// | `IMMICH_SHARED_KEY`              | unset                        |
/// | `IMMICH_DOWNLOAD_DIR`            | `$HOME/Downloads`, else `.`  |
/// | `IMMICH_ARCHIVE_SIZE`            | unset (server default)       |
/// | `IMMICH_INCLUDE_EMBEDDED_VIDEOS` | `false`                      |
/// | `IMMICH_LOCALE_FILE`             | unset (English)              |
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub download_dir: PathBuf,
    pub preferences: DownloadPreferences,
    /// JSON message catalog overriding the built-in English one
    pub locale_file: Option<PathBuf>,
}

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn default_download_dir() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(|home| PathBuf::from(home).join("Downloads"))
        .unwrap_or_else(|| PathBuf::from("."))
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = ApiConfig::default();
        let api = ApiConfig {
            base_url: non_empty("IMMICH_URL").unwrap_or(defaults.base_url),
            api_key: non_empty("IMMICH_API_KEY"),
            shared_key: non_empty("IMMICH_SHARED_KEY"),
        };

        let download_dir = non_empty("IMMICH_DOWNLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_download_dir);

        let archive_size = non_empty("IMMICH_ARCHIVE_SIZE").and_then(|value| match value.parse::<u64>() {
            Ok(size) if size > 0 => Some(size),
            _ => {
                tracing::warn!(value = %value, "ignoring invalid IMMICH_ARCHIVE_SIZE");
                None
            }
        });

        let include_embedded_videos = non_empty("IMMICH_INCLUDE_EMBEDDED_VIDEOS")
            .map(|value| parse_flag(&value))
            .unwrap_or(false);

        Self {
            api,
            download_dir,
            preferences: DownloadPreferences {
                archive_size,
                include_embedded_videos,
            },
            locale_file: non_empty("IMMICH_LOCALE_FILE").map(PathBuf::from),
        }
    }
}
