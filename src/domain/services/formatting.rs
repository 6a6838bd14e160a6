#[cfg(test)]
#[path = "formatting_test.rs"]
mod tests;

use chrono::DateTime;

/// Renders an RFC 3339 timestamp like `Mar 4, 2024 10:15` (UTC). Input that
/// does not parse is returned unchanged.
pub fn format_date(raw: &str) -> String {
    return match DateTime::parse_from_rfc3339(raw) {
        Ok(date) => date
            .naive_utc()
            .format("%b %-d, %Y %H:%M")
            .to_string(),
        Err(_) => raw.to_string(),
    };
}

/// Absolute URLs pass through. Relative storage paths are served from the API
/// host under `/storage/`.
pub fn resolve_image_url(api_url: &str, image_path: &str) -> String {
    if image_path.starts_with("http://")
        || image_path.starts_with("https://")
        || image_path.starts_with("data:")
    {
        return image_path.to_string();
    }

    let trimmed = api_url.trim_end_matches('/');
    let host = trimmed.strip_suffix("/api").unwrap_or(trimmed);
    let relative = image_path
        .trim_start_matches('/')
        .trim_start_matches("storage/");

    return format!("{host}/storage/{relative}");
}
