use chrono::NaiveDateTime;
use regex::Regex;

const BYTE_UNITS: [&str; 6] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];

/// Timestamp segment used in archive names, e.g. `20261017_093005`
pub fn archive_timestamp(now: NaiveDateTime) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}

/// Name of archive `index` out of `count`.
///
/// `vacation.zip` becomes `vacation-<timestamp>.zip` for a single archive and
/// `vacation+2-<timestamp>.zip` for the second of several.
pub fn archive_name(template: &str, index: usize, count: usize, timestamp: &str) -> String {
    let suffix = if count > 1 {
        format!("+{}", index + 1)
    } else {
        String::new()
    };

    match template.rfind('.') {
        Some(dot) if dot > 0 => format!(
            "{}{}-{}{}",
            &template[..dot],
            suffix,
            timestamp,
            &template[dot..]
        ),
        _ => format!("{}{}-{}", template, suffix, timestamp),
    }
}

/// Key under which an archive shows up in the progress list
pub fn download_key(archive_name: &str, index: usize, count: usize) -> String {
    if count > 1 {
        format!("{} ({}/{})", archive_name, index + 1, count)
    } else {
        archive_name.to_string()
    }
}

/// Sanitize filename to remove invalid characters
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Pull every asset id (UUID) out of free-form text, keeping first-seen order
pub fn extract_asset_ids(input: &str) -> Vec<String> {
    let Ok(re) = Regex::new(
        r"(?i)\b[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}\b",
    ) else {
        return Vec::new();
    };

    let mut ids: Vec<String> = Vec::new();
    for m in re.find_iter(input) {
        let id = m.as_str().to_lowercase();
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// Human readable size in binary units with at most `max_precision` fraction digits
pub fn format_bytes(bytes: u64, max_precision: usize) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let mut number = format!("{:.*}", max_precision, value);
    if number.contains('.') {
        number = number.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    format!("{} {}", number, BYTE_UNITS[unit])
}
