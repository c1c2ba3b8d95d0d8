use std::sync::LazyLock;

use regex::Regex;
use url::Url;

pub const DEFAULT_MEDIA_HOST: &str = "https://static.wixstatic.com/media/";
pub const FALLBACK_IMAGE_MIME: &str = "image/*";

// wix:image://v1/3d487b_xxx~mv2.avif/Name.avif#originWidth=...
static VENDOR_IMAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^wix:image://v\d+/([^/#]+)").unwrap());

/// Turns whatever the CMS gave us into a public HTTP(S) URL, or nothing.
pub fn normalize_image(raw: &str, media_host: &str) -> Option<String> {
    let raw = raw.trim();
    if let Some(c) = VENDOR_IMAGE.captures(raw) {
        return Some(format!("{media_host}{}", &c[1]));
    }
    let lower = raw.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Some(raw.to_string());
    }
    if raw.starts_with("//") && raw.len() > 2 {
        return Some(format!("https:{raw}"));
    }
    None
}

/// MIME type for an enclosure, guessed from the URL path's extension.
pub fn enclosure_mime(url: &str) -> String {
    let path = match Url::parse(url) {
        Ok(u) => u.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };
    mime_guess::from_path(&path)
        .first_raw()
        .unwrap_or(FALLBACK_IMAGE_MIME)
        .to_string()
}
