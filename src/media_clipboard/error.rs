//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 复制链路内部只使用 `ClipboardError`，各分支携带可读上下文（原始输入、解析后的路径、替代写法）。
//! 到达对外方法边界时再按 `Operation` 折叠为稳定错误码：输入形态、未找到、平台构造失败
//! 各有专属错误码，其余一律落到该方法的兜底错误码。

use crate::error::{CommandError, ErrorCode};
use crate::platform::PlatformError;

use super::Operation;

/// 剪贴板桥接统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("不支持相对路径 '{reference}'，'./' 与 '../' 无法确定根目录。可改用以下任一写法：\n{alternatives}")]
    RelativePath {
        reference: String,
        alternatives: String,
    },

    #[error("{kind}不存在：{reference}（解析为：{resolved}）")]
    FileNotFound {
        kind: &'static str,
        reference: String,
        resolved: String,
    },

    #[error("无法为{kind}创建 content URI：{detail}")]
    UriCreation { kind: &'static str, detail: String },

    #[error("无法为{kind}创建剪贴记录：{detail}")]
    ClipDataCreation { kind: &'static str, detail: String },

    #[error("Data URI 格式错误：{0}。期望格式：data:<mime>;base64,<数据>")]
    InvalidBase64(String),

    #[error("Base64 解码失败：{0}")]
    Base64Decode(String),

    #[error("Base64 内容写出失败：{0}")]
    Base64Content(String),

    #[error("网络错误：{0}")]
    Network(String),

    #[error("超时错误：{0}")]
    Timeout(String),

    #[error("配置无效：{0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error("文件错误：{0}")]
    Io(#[from] std::io::Error),

    #[error("模块已销毁，无法继续处理请求")]
    Invalidated,
}

impl ClipboardError {
    /// 映射为对外错误码。
    pub fn code(&self, operation: Operation) -> ErrorCode {
        match self {
            Self::RelativePath { .. } => ErrorCode::RelativePathError,
            Self::FileNotFound { .. } => ErrorCode::FileNotFound,
            Self::UriCreation { .. } => ErrorCode::UriCreationError,
            Self::ClipDataCreation { .. } => ErrorCode::ClipdataCreationError,
            Self::InvalidBase64(_) => ErrorCode::InvalidBase64,
            Self::Base64Decode(_) => ErrorCode::Base64DecodeError,
            Self::Base64Content(_) => ErrorCode::Base64ImageError,
            Self::Network(_)
            | Self::Timeout(_)
            | Self::InvalidConfig(_)
            | Self::Platform(_)
            | Self::Io(_)
            | Self::Invalidated => operation.fallback_code(),
        }
    }

    pub fn into_command_error(self, operation: Operation) -> CommandError {
        CommandError::new(self.code(operation), self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classified_errors_keep_their_own_code_for_every_operation() {
        let err = ClipboardError::InvalidBase64("缺少 ';base64,'".into());
        assert_eq!(err.code(Operation::CopyVideo), ErrorCode::InvalidBase64);

        let err = ClipboardError::FileNotFound {
            kind: "图片",
            reference: "https://unreachable.test/a.png".into(),
            resolved: "https://unreachable.test/a.png".into(),
        };
        let command = err.into_command_error(Operation::CopyImage);
        assert_eq!(command.code, ErrorCode::FileNotFound);
        assert!(command.message.contains("https://unreachable.test/a.png"));
    }

    #[test]
    fn generic_errors_fall_back_to_operation_code() {
        let err = ClipboardError::Platform(PlatformError::Unavailable("剪贴板未就绪".into()));
        assert_eq!(err.code(Operation::CopyPdf), ErrorCode::CopyPdfError);
        assert_eq!(err.code(Operation::Clear), ErrorCode::ClearError);
        assert_eq!(
            ClipboardError::Invalidated.code(Operation::CopyLargeFile),
            ErrorCode::CopyLargeFileError
        );
    }

    #[test]
    fn relative_path_message_lists_alternatives() {
        let err = ClipboardError::RelativePath {
            reference: "./cat.png".into(),
            alternatives: super::super::MediaKind::Image.relative_path_alternatives(),
        };
        let message = err.to_string();
        assert!(message.contains("./cat.png"));
        assert!(message.contains("data:image/jpeg;base64,"));
        assert!(message.contains("content://"));
    }
}
