//! Metadata helpers over asset records.

use crate::api::models::{AssetResponseDto, AssetTypeEnum};
use crate::utils::format_bytes;

const PLACEHOLDER_DIMENSION: u32 = 235;
const INVALID_DATA: &str = "Invalid Data";

/// Image MIME types every supported desktop renderer can display
const WEB_COMPATIBLE_IMAGE_TYPES: [&str; 6] = [
    "image/apng",
    "image/avif",
    "image/gif",
    "image/jpeg",
    "image/png",
    "image/webp",
];

/// Lowercase extension without the dot, or an empty string when there is none.
/// A leading dot (`.bashrc`) does not start an extension.
pub fn filename_extension(filename: &str) -> String {
    match filename.rfind('.') {
        Some(index) if index > 0 => filename[index + 1..].to_lowercase(),
        _ => String::new(),
    }
}

/// Original file name with the extension taken from the stored path
pub fn asset_filename(asset: &AssetResponseDto) -> String {
    format!(
        "{}.{}",
        asset.original_file_name,
        filename_extension(&asset.original_path)
    )
}

/// Motion parts of Android motion photos are stored as encoded videos
pub fn is_android_motion_video(asset: &AssetResponseDto) -> bool {
    asset.original_path.contains("encoded-video")
}

fn is_rotated_90_cw(orientation: i32) -> bool {
    matches!(orientation, 5 | 6 | 90)
}

fn is_rotated_270_cw(orientation: i32) -> bool {
    matches!(orientation, 7 | 8 | -90)
}

/// Whether the EXIF orientation swaps width and height
pub fn is_flipped(orientation: Option<&str>) -> bool {
    orientation
        .and_then(|value| value.trim().parse::<i32>().ok())
        .is_some_and(|value| is_rotated_90_cw(value) || is_rotated_270_cw(value))
}

pub fn file_size_in_bytes(asset: &AssetResponseDto) -> u64 {
    asset
        .exif_info
        .as_ref()
        .and_then(|exif| exif.file_size_in_byte)
        .unwrap_or(0)
}

pub fn file_size(asset: &AssetResponseDto) -> String {
    match file_size_in_bytes(asset) {
        0 => INVALID_DATA.to_string(),
        size => format_bytes(size, 4),
    }
}

/// Display (width, height), swapped for rotated images
pub fn asset_ratio(asset: &AssetResponseDto) -> (u32, u32) {
    let exif = asset.exif_info.as_ref();
    let height = exif
        .and_then(|e| e.exif_image_height)
        .filter(|h| *h > 0)
        .unwrap_or(PLACEHOLDER_DIMENSION);
    let width = exif
        .and_then(|e| e.exif_image_width)
        .filter(|w| *w > 0)
        .unwrap_or(PLACEHOLDER_DIMENSION);

    if is_flipped(exif.and_then(|e| e.orientation.as_deref())) {
        (height, width)
    } else {
        (width, height)
    }
}

pub fn asset_resolution(asset: &AssetResponseDto) -> String {
    match asset_ratio(asset) {
        (PLACEHOLDER_DIMENSION, PLACEHOLDER_DIMENSION) => INVALID_DATA.to_string(),
        (width, height) => format!("{} x {}", width, height),
    }
}

pub fn is_web_compatible_image(asset: &AssetResponseDto) -> bool {
    asset
        .original_mime_type
        .as_deref()
        .is_some_and(|mime| WEB_COMPATIBLE_IMAGE_TYPES.contains(&mime))
}

pub fn asset_type_label(asset_type: AssetTypeEnum) -> &'static str {
    match asset_type {
        AssetTypeEnum::Image => "Photo",
        AssetTypeEnum::Video => "Video",
        _ => "Asset",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::ExifResponseDto;

    fn asset(id: &str, owner: &str, path: &str, exif: Option<ExifResponseDto>) -> AssetResponseDto {
        AssetResponseDto {
            id: id.to_string(),
            owner_id: owner.to_string(),
            original_file_name: "IMG_0001".to_string(),
            original_path: path.to_string(),
            original_mime_type: Some("image/heic".to_string()),
            asset_type: AssetTypeEnum::Image,
            checksum: String::new(),
            live_photo_video_id: None,
            exif_info: exif,
        }
    }

    #[test]
    fn test_filename_extension() {
        assert_eq!(filename_extension("photo.JPG"), "jpg");
        assert_eq!(filename_extension("archive.tar.gz"), "gz");
        assert_eq!(filename_extension("noext"), "");
        assert_eq!(filename_extension(".hidden"), "");
    }

    #[test]
    fn test_asset_filename() {
        let a = asset("a", "u", "upload/u/IMG_0001.HEIC", None);
        assert_eq!(asset_filename(&a), "IMG_0001.heic");
    }

    #[test]
    fn test_android_motion_video() {
        let a = asset("a", "u", "encoded-video/u/ab/a.mp4", None);
        assert!(is_android_motion_video(&a));
        let b = asset("b", "u", "upload/u/b.mov", None);
        assert!(!is_android_motion_video(&b));
    }

    #[test]
    fn rotated_assets_swap_dimensions() {
        let a = asset(
            "a",
            "u",
            "p.jpg",
            Some(ExifResponseDto {
                exif_image_width: Some(4000),
                exif_image_height: Some(3000),
                orientation: Some("6".to_string()),
                ..Default::default()
            }),
        );
        assert_eq!(asset_ratio(&a), (3000, 4000));
        assert_eq!(asset_resolution(&a), "3000 x 4000");
        assert!(!is_flipped(Some("1")));
        assert!(!is_flipped(None));
    }

    #[test]
    fn missing_exif_is_invalid_data() {
        let a = asset("a", "u", "p.jpg", None);
        assert_eq!(asset_resolution(&a), "Invalid Data");
        assert_eq!(file_size(&a), "Invalid Data");
    }

    #[test]
    fn test_file_size() {
        let a = asset(
            "a",
            "u",
            "p.jpg",
            Some(ExifResponseDto {
                file_size_in_byte: Some(2_621_440),
                ..Default::default()
            }),
        );
        assert_eq!(file_size(&a), "2.5 MiB");
    }

    #[test]
    fn heic_is_not_web_compatible() {
        let mut a = asset("a", "u", "p.heic", None);
        assert!(!is_web_compatible_image(&a));
        a.original_mime_type = Some("image/webp".to_string());
        assert!(is_web_compatible_image(&a));
    }

    #[test]
    fn test_asset_type_label() {
        assert_eq!(asset_type_label(AssetTypeEnum::Image), "Photo");
        assert_eq!(asset_type_label(AssetTypeEnum::Video), "Video");
        assert_eq!(asset_type_label(AssetTypeEnum::Audio), "Asset");
    }
}
