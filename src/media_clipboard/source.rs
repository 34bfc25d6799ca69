//! # 数据模型模块
//!
//! ## 设计思路
//!
//! 调用方传入的引用字符串只在入口处解析一次，后续阶段按枚举分支处理，
//! 不再重复做前缀判断。解析顺序固定：
//!
//! 1. `data:` → Data URI
//! 2. `http://` / `https://` → 远程地址
//! 3. `content://` → 已是受能力约束的 URI，直接透传
//! 4. 含 `./`、`../` 片段的相对路径 → 拒绝（在绝对路径判断之前，`/a/../b` 同样被拒绝）
//! 5. `/` 开头 → 绝对路径
//! 6. 其余 → 资源名，交给路径解析器探测
//!
//! ## 实现思路
//!
//! `Operation` 描述对外暴露的方法，携带兜底错误码与媒体类别；
//! `ClipboardContent` 是 `getContent` 的序列化出参。

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;

/// 调用方提供的内容引用。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceString {
    /// 原始 Data URI 字符串，格式校验由解码器完成。
    DataUri(String),
    HttpUrl(String),
    ContentUri(String),
    AbsolutePath(PathBuf),
    /// 带 `./`、`../` 片段的相对路径，一律拒绝。
    RelativePath(String),
    /// 不带目录片段的资源名，按候选目录探测。
    AssetName(String),
}

impl ReferenceString {
    pub fn parse(reference: &str) -> Self {
        if reference.starts_with("data:") {
            return Self::DataUri(reference.to_string());
        }
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return Self::HttpUrl(reference.to_string());
        }
        if reference.starts_with("content://") {
            return Self::ContentUri(reference.to_string());
        }
        if is_dotted_relative(reference) {
            return Self::RelativePath(reference.to_string());
        }
        if reference.starts_with('/') {
            return Self::AbsolutePath(PathBuf::from(reference));
        }
        Self::AssetName(reference.to_string())
    }
}

/// 是否为带 `.` / `..` 片段的相对路径。
pub fn is_dotted_relative(reference: &str) -> bool {
    reference == "."
        || reference == ".."
        || reference.starts_with("./")
        || reference.starts_with("../")
        || reference.contains("/../")
        || reference.contains("/./")
        || reference.ends_with("/..")
        || reference.ends_with("/.")
}

/// 路径解析结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(PathBuf),
    RejectedRelative,
    /// 未能定位到文件，携带原始字符串（资源未命中或下载失败时的原 URL）。
    Unresolved(String),
}

/// 远程下载结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Cached(PathBuf),
    /// 下载失败，保留原始 URL 便于后续“文件不存在”错误展示。
    Failed(String),
}

impl FetchOutcome {
    /// 折叠为对外的字符串形式：成功为缓存路径，失败为原 URL。
    pub fn into_path_string(self) -> String {
        match self {
            Self::Cached(path) => path.to_string_lossy().into_owned(),
            Self::Failed(url) => url,
        }
    }
}

/// 复制目标的媒体类别。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Pdf,
    File,
}

impl MediaKind {
    /// 剪贴记录标签。
    pub fn clip_label(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Pdf => "pdf",
            Self::File => "file",
        }
    }

    /// 日志与错误信息中的中文名称。
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Image => "图片",
            Self::Video => "视频",
            Self::Audio => "音频",
            Self::Pdf => "PDF",
            Self::File => "文件",
        }
    }

    /// 未知 MIME 时使用的兜底类型。
    pub fn wildcard_mime(self) -> &'static str {
        match self {
            Self::Image => "image/*",
            Self::Video => "video/*",
            Self::Audio => "audio/*",
            Self::Pdf => "application/pdf",
            Self::File => "*/*",
        }
    }

    /// 相对路径错误提示里的示例文件名与 MIME。
    fn sample(self) -> (&'static str, &'static str) {
        match self {
            Self::Image => ("image.jpg", "image/jpeg"),
            Self::Video => ("video.mp4", "video/mp4"),
            Self::Audio => ("audio.mp3", "audio/mpeg"),
            Self::Pdf => ("document.pdf", "application/pdf"),
            Self::File => ("file.dat", "application/octet-stream"),
        }
    }

    /// 相对路径被拒绝时的可选替代写法。
    pub fn relative_path_alternatives(self) -> String {
        let (name, mime) = self.sample();
        format!(
            "1. Base64 Data URI：data:{};base64,<数据>\n\
             2. HTTP/HTTPS 地址：https://example.com/{}\n\
             3. 绝对路径：/absolute/path/to/{}\n\
             4. content:// URI：content://provider/path/to/{}",
            mime, name, name, name
        )
    }
}

/// 对外暴露的方法。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CopyText,
    CopyImage,
    CopyVideo,
    CopyAudio,
    CopyPdf,
    CopyFile,
    CopyLargeFile,
    HasContent,
    GetContent,
    Clear,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Self::CopyText => "copyText",
            Self::CopyImage => "copyImage",
            Self::CopyVideo => "copyVideo",
            Self::CopyAudio => "copyAudio",
            Self::CopyPdf => "copyPDF",
            Self::CopyFile => "copyFile",
            Self::CopyLargeFile => "copyLargeFile",
            Self::HasContent => "hasContent",
            Self::GetContent => "getContent",
            Self::Clear => "clear",
        }
    }

    /// 未归入具体分类的失败使用的错误码。
    pub fn fallback_code(self) -> ErrorCode {
        match self {
            Self::CopyText => ErrorCode::CopyTextError,
            Self::CopyImage => ErrorCode::CopyImageError,
            Self::CopyVideo => ErrorCode::CopyVideoError,
            Self::CopyAudio => ErrorCode::CopyAudioError,
            Self::CopyPdf => ErrorCode::CopyPdfError,
            Self::CopyFile => ErrorCode::CopyFileError,
            Self::CopyLargeFile => ErrorCode::CopyLargeFileError,
            Self::HasContent => ErrorCode::HasContentError,
            Self::GetContent => ErrorCode::GetContentError,
            Self::Clear => ErrorCode::ClearError,
        }
    }

    /// 复制类方法对应的媒体类别；非复制方法返回 `None`。
    pub fn media_kind(self) -> Option<MediaKind> {
        match self {
            Self::CopyImage => Some(MediaKind::Image),
            Self::CopyVideo => Some(MediaKind::Video),
            Self::CopyAudio => Some(MediaKind::Audio),
            Self::CopyPdf => Some(MediaKind::Pdf),
            Self::CopyFile | Self::CopyLargeFile => Some(MediaKind::File),
            Self::CopyText | Self::HasContent | Self::GetContent | Self::Clear => None,
        }
    }
}

/// 复制选项。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CopyOptions {
    /// 显式 MIME 类型，优先于按扩展名推断。
    pub mime_type: Option<String>,
    /// 预留的展示文件名，当前仅用于日志。
    pub filename: Option<String>,
    /// 成功后输出一条提示日志。
    pub show_notification: bool,
}

/// 剪贴板内容分类。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
    Image,
    Video,
    Audio,
    Pdf,
    File,
    Unknown,
}

impl ContentType {
    /// 按 MIME 前缀 / 精确匹配分类。
    pub fn from_mime_type(mime_type: &str) -> Self {
        if mime_type.starts_with("image/") {
            Self::Image
        } else if mime_type.starts_with("video/") {
            Self::Video
        } else if mime_type.starts_with("audio/") {
            Self::Audio
        } else if mime_type == "application/pdf" {
            Self::Pdf
        } else {
            Self::File
        }
    }
}

/// `getContent` 的返回值。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipboardContent {
    #[serde(rename = "type")]
    pub content_type: ContentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl ClipboardContent {
    pub fn unknown() -> Self {
        Self {
            content_type: ContentType::Unknown,
            data: None,
            mime_type: None,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content_type: ContentType::Text,
            data: Some(text.into()),
            mime_type: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_follows_declared_precedence() {
        assert!(matches!(
            ReferenceString::parse("data:image/png;base64,AAAA"),
            ReferenceString::DataUri(_)
        ));
        assert!(matches!(
            ReferenceString::parse("https://example.com/a.png"),
            ReferenceString::HttpUrl(_)
        ));
        assert!(matches!(
            ReferenceString::parse("content://media/external/images/1"),
            ReferenceString::ContentUri(_)
        ));
        assert_eq!(
            ReferenceString::parse("/sdcard/a.png"),
            ReferenceString::AbsolutePath(PathBuf::from("/sdcard/a.png"))
        );
        assert_eq!(
            ReferenceString::parse("logo.png"),
            ReferenceString::AssetName("logo.png".to_string())
        );
    }

    #[test]
    fn dotted_segments_are_rejected_even_when_absolute() {
        for reference in ["./a.png", "../a.png", "img/../a.png", "img/./a.png", "/data/../etc/a.png"] {
            assert_eq!(
                ReferenceString::parse(reference),
                ReferenceString::RelativePath(reference.to_string()),
                "{reference}"
            );
        }
        for trailing in [".", "..", "assets/..", "assets/."] {
            assert!(is_dotted_relative(trailing), "{trailing}");
        }
        // 文件名中的点不是目录片段
        assert!(!is_dotted_relative("my.photo.png"));
        assert!(!is_dotted_relative("assets/..hidden"));
        assert!(!is_dotted_relative("dir/.hidden"));
    }

    #[test]
    fn content_type_classification() {
        assert_eq!(ContentType::from_mime_type("image/png"), ContentType::Image);
        assert_eq!(ContentType::from_mime_type("video/mp4"), ContentType::Video);
        assert_eq!(ContentType::from_mime_type("audio/mpeg"), ContentType::Audio);
        assert_eq!(ContentType::from_mime_type("application/pdf"), ContentType::Pdf);
        assert_eq!(ContentType::from_mime_type("application/zip"), ContentType::File);
    }

    #[test]
    fn clipboard_content_skips_absent_fields() {
        let json = serde_json::to_value(ClipboardContent::unknown()).expect("serialize failed");
        assert_eq!(json, serde_json::json!({ "type": "unknown" }));

        let json = serde_json::to_value(ClipboardContent {
            content_type: ContentType::Pdf,
            data: None,
            mime_type: Some("application/pdf".into()),
        })
        .expect("serialize failed");
        assert_eq!(json, serde_json::json!({ "type": "pdf", "mimeType": "application/pdf" }));
    }

    #[test]
    fn copy_options_accept_camel_case_and_missing_fields() {
        let options: CopyOptions =
            serde_json::from_str(r#"{ "showNotification": true }"#).expect("deserialize failed");
        assert!(options.show_notification);
        assert_eq!(options.mime_type, None);
    }

    #[test]
    fn fetch_outcome_collapses_to_string() {
        assert_eq!(
            FetchOutcome::Failed("https://unreachable.test/a.png".into()).into_path_string(),
            "https://unreachable.test/a.png"
        );
        assert_eq!(
            FetchOutcome::Cached(PathBuf::from("/cache/clipboard_a.png")).into_path_string(),
            "/cache/clipboard_a.png"
        );
    }

    #[test]
    fn large_file_shares_file_kind_but_not_error_code() {
        assert_eq!(Operation::CopyLargeFile.media_kind(), Some(MediaKind::File));
        assert_eq!(Operation::CopyLargeFile.fallback_code(), ErrorCode::CopyLargeFileError);
        assert_eq!(Operation::CopyText.media_kind(), None);
    }
}
