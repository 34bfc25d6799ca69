//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 宿主运行时只认识“稳定字符串错误码 + 人类可读消息”这一种拒绝形式。
//! 这里定义 `ErrorCode` 与 `CommandError`，所有对外操作在自身边界把内部错误
//! （`ClipboardError`）统一折叠成 `CommandError`，不会有错误以其他形式越过异步边界。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - `ErrorCode` 手写 `Serialize`，序列化为 `COPY_TEXT_ERROR` 这类稳定字符串。
//! - `CommandError` 序列化为 `{ code, message }`，满足桥接层的 reject 约定。

use serde::Serialize;

/// 对外暴露的稳定错误码。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    CopyTextError,
    RelativePathError,
    FileNotFound,
    UriCreationError,
    ClipdataCreationError,
    CopyImageError,
    CopyVideoError,
    CopyPdfError,
    CopyAudioError,
    CopyFileError,
    CopyLargeFileError,
    InvalidBase64,
    Base64DecodeError,
    Base64ImageError,
    HasContentError,
    GetContentError,
    ClearError,
}

impl ErrorCode {
    /// 输出稳定字符串，供宿主侧按码分支处理。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CopyTextError => "COPY_TEXT_ERROR",
            Self::RelativePathError => "RELATIVE_PATH_ERROR",
            Self::FileNotFound => "FILE_NOT_FOUND",
            Self::UriCreationError => "URI_CREATION_ERROR",
            Self::ClipdataCreationError => "CLIPDATA_CREATION_ERROR",
            Self::CopyImageError => "COPY_IMAGE_ERROR",
            Self::CopyVideoError => "COPY_VIDEO_ERROR",
            Self::CopyPdfError => "COPY_PDF_ERROR",
            Self::CopyAudioError => "COPY_AUDIO_ERROR",
            Self::CopyFileError => "COPY_FILE_ERROR",
            Self::CopyLargeFileError => "COPY_LARGE_FILE_ERROR",
            Self::InvalidBase64 => "INVALID_BASE64",
            Self::Base64DecodeError => "BASE64_DECODE_ERROR",
            Self::Base64ImageError => "BASE64_IMAGE_ERROR",
            Self::HasContentError => "HAS_CONTENT_ERROR",
            Self::GetContentError => "GET_CONTENT_ERROR",
            Self::ClearError => "CLEAR_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// 一次 reject 的完整负载。
///
/// `message` 需要足够自解释：原始输入、尝试过的解析路径、可选替代写法。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("[{code}] {message}")]
pub struct CommandError {
    pub code: ErrorCode,
    pub message: String,
}

impl CommandError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}
