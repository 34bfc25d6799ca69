//! 静态 MIME 表。

use super::MimeLookup;

/// 常见媒体扩展名对应表，作为平台 MIME 查询的默认实现。
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticMimeTable;

const TABLE: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("svg", "image/svg+xml"),
    ("heic", "image/heic"),
    ("mp4", "video/mp4"),
    ("m4v", "video/x-m4v"),
    ("mov", "video/quicktime"),
    ("webm", "video/webm"),
    ("mkv", "video/x-matroska"),
    ("3gp", "video/3gpp"),
    ("mp3", "audio/mpeg"),
    ("m4a", "audio/mp4"),
    ("aac", "audio/aac"),
    ("wav", "audio/x-wav"),
    ("ogg", "audio/ogg"),
    ("flac", "audio/flac"),
    ("pdf", "application/pdf"),
    ("txt", "text/plain"),
    ("html", "text/html"),
    ("json", "application/json"),
    ("zip", "application/zip"),
];

impl StaticMimeTable {
    /// 反向查询：MIME → 扩展名（取表中第一个匹配项）。
    pub fn extension_for_mime_type(mime_type: &str) -> Option<&'static str> {
        let normalized = mime_type.trim().to_ascii_lowercase();
        TABLE
            .iter()
            .find(|(_, mime)| *mime == normalized)
            .map(|(ext, _)| *ext)
    }
}

impl MimeLookup for StaticMimeTable {
    fn mime_type_for_extension(&self, extension: &str) -> Option<String> {
        let normalized = extension.trim_start_matches('.').to_ascii_lowercase();
        TABLE
            .iter()
            .find(|(ext, _)| *ext == normalized)
            .map(|(_, mime)| (*mime).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive_and_ignores_leading_dot() {
        let table = StaticMimeTable;
        assert_eq!(table.mime_type_for_extension("PNG").as_deref(), Some("image/png"));
        assert_eq!(table.mime_type_for_extension(".pdf").as_deref(), Some("application/pdf"));
        assert_eq!(table.mime_type_for_extension("xyz"), None);
    }

    #[test]
    fn reverse_lookup_prefers_first_entry() {
        assert_eq!(StaticMimeTable::extension_for_mime_type("image/jpeg"), Some("jpg"));
        assert_eq!(StaticMimeTable::extension_for_mime_type("video/mp4"), Some("mp4"));
        assert_eq!(StaticMimeTable::extension_for_mime_type("application/x-unknown"), None);
    }
}
