use std::collections::HashMap;

use serde_json::Value;

const EN: &[(&str, &str)] = &[
    ("copied_to_clipboard", "Copied to clipboard!"),
    ("download_summary", "Saved {saved} file(s), {failures} failed"),
    ("downloading_album", "Downloading album {name}"),
    ("downloading_asset_filename", "Downloading asset {filename}"),
    ("errors.album_id_required", "Enter an album ID first"),
    ("errors.asset_id_required", "Enter an asset ID first"),
    ("errors.error_downloading", "Error downloading {filename}"),
    ("errors.invalid_asset_ids", "No valid asset ids were entered"),
    ("errors.unable_to_copy_to_clipboard", "Cannot copy to clipboard, make sure you are accessing the page through https"),
    ("errors.unable_to_download_files", "Unable to download files"),
    ("errors.unable_to_load_album", "Unable to load album"),
    ("errors.unable_to_load_asset", "Unable to load asset"),
    ("fetching_album", "Fetching album {id}"),
    ("nothing_to_download", "Nothing to download"),
    ("preparing_assets", "Preparing {count} assets"),
    ("previewable", "previewable"),
    ("saved_to", "Saved {filename}"),
];

/// Localized message lookup with `{name}` interpolation.
#[derive(Debug, Clone)]
pub struct I18n {
    messages: HashMap<String, String>,
}

impl Default for I18n {
    fn default() -> Self {
        Self {
            messages: EN
                .iter()
                .map(|(key, message)| (key.to_string(), message.to_string()))
                .collect(),
        }
    }
}

impl I18n {
    /// English catalog overlaid with the messages of a JSON catalog.
    /// Nested objects flatten into dotted keys (`{"errors": {"x": ..}}` -> `errors.x`).
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(json)?;
        let mut i18n = Self::default();
        flatten_into(&mut i18n.messages, String::new(), &value);
        Ok(i18n)
    }

    pub fn t(&self, key: &str) -> String {
        self.t_with(key, &[])
    }

    /// Unknown keys render as the key itself
    pub fn t_with(&self, key: &str, values: &[(&str, &str)]) -> String {
        let mut message = self
            .messages
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string());
        for (name, value) in values {
            message = message.replace(&format!("{{{}}}", name), value);
        }
        message
    }
}

fn flatten_into(messages: &mut HashMap<String, String>, prefix: String, value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_into(messages, key, child);
            }
        }
        Value::String(message) if !prefix.is_empty() => {
            messages.insert(prefix, message.clone());
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_values() {
        let i18n = I18n::default();
        assert_eq!(
            i18n.t_with("errors.error_downloading", &[("filename", "IMG_0001.jpg")]),
            "Error downloading IMG_0001.jpg"
        );
        assert_eq!(i18n.t("errors.unable_to_download_files"), "Unable to download files");
    }

    #[test]
    fn unknown_key_falls_back_to_key() {
        assert_eq!(I18n::default().t("does.not.exist"), "does.not.exist");
    }

    #[test]
    fn json_catalog_overrides_and_flattens() {
        let i18n = I18n::from_json(
            r#"{ "errors": { "unable_to_download_files": "Dateien konnten nicht heruntergeladen werden" },
                 "saved_to": "{filename} gespeichert", "ignored": 3 }"#,
        )
        .unwrap();
        assert_eq!(
            i18n.t("errors.unable_to_download_files"),
            "Dateien konnten nicht heruntergeladen werden"
        );
        assert_eq!(
            i18n.t_with("saved_to", &[("filename", "a.zip")]),
            "a.zip gespeichert"
        );
        assert_eq!(i18n.t("ignored"), "ignored");
        assert_eq!(i18n.t("copied_to_clipboard"), "Copied to clipboard!");
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(I18n::from_json("{ not json").is_err());
    }
}
