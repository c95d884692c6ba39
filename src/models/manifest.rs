use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::OffsetDateTime;

use vk_photo_backup_api_structs::{Photo, Size};

/// One transferred photo, as recorded in the manifest file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ManifestEntry {
    pub file_name: String,
    #[serde(rename = "size")]
    pub size_label: String,
}

/// Picks the size with the largest area. Among sizes of equal area the first one wins.
pub fn largest_size(sizes: &[Size]) -> Option<&Size> {
    sizes.iter().fold(None, |largest, size| match largest {
        Some(largest) if largest.area() >= size.area() => Some(largest),
        _ => Some(size),
    })
}

/// Formats a capture timestamp as `YYYY-MM-DD` in UTC.
pub fn capture_date(timestamp: i64) -> Result<String, time::Error> {
    let datetime = OffsetDateTime::from_unix_timestamp(timestamp)?;
    Ok(datetime.format(format_description!("[year]-[month]-[day]"))?)
}

/// Names the photo after its like count, falling back to likes and capture date when the
/// manifest already holds that name.
///
/// Two photos with the same like count and capture date still end up with the same name.
pub fn file_name_for(photo: &Photo, manifest: &[ManifestEntry]) -> Result<String, time::Error> {
    let file_name = format!("{}.jpg", photo.likes.count);
    if !manifest.iter().any(|entry| entry.file_name == file_name) {
        return Ok(file_name);
    }

    Ok(format!(
        "{}_{}.jpg",
        photo.likes.count,
        capture_date(photo.date)?
    ))
}

/// Serializes the manifest as a JSON array indented with four spaces.
pub fn to_json_pretty(manifest: &[ManifestEntry]) -> Result<Vec<u8>, serde_json::Error> {
    let mut data = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut data, formatter);
    manifest.serialize(&mut serializer)?;
    Ok(data)
}
