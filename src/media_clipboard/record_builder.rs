//! # 剪贴记录构造模块
//!
//! ## 设计思路
//!
//! 把已定位的本地文件包装成系统剪贴记录：
//!
//! - 平台支持显式剪贴描述时，记录携带 MIME（未知时用该媒体类别的通配类型），
//!   并逐个向授权名单中的消费者授予读权限；单个授权失败只记日志，不影响其他消费者。
//! - 平台不支持时，退化为只带 URI 的简化记录，不做逐消费者授权。
//!
//! ## 实现思路
//!
//! content URI 由平台提供者生成；提供者拒绝或平台不支持 content URI 时退回 `file://` URI，
//! 两者都失败才报 `UriCreation`。

use std::path::Path;
use std::sync::Arc;

use crate::platform::{ClipRecord, ContentUriProvider, PlatformCapabilities, UriRecord};

use super::{ClipboardConfig, ClipboardError, MediaKind};

/// 剪贴记录构造器。
pub struct ClipRecordBuilder {
    uri_provider: Arc<dyn ContentUriProvider>,
    consumers: Vec<String>,
    capabilities: PlatformCapabilities,
}

impl ClipRecordBuilder {
    /// 授权名单 = 配置中的系统消费者 + 宿主应用自身。
    pub fn new(
        uri_provider: Arc<dyn ContentUriProvider>,
        config: &ClipboardConfig,
        host_package: &str,
        capabilities: PlatformCapabilities,
    ) -> Self {
        let mut consumers = config.system_consumers.clone();
        if !consumers.iter().any(|consumer| consumer == host_package) {
            consumers.push(host_package.to_string());
        }

        Self {
            uri_provider,
            consumers,
            capabilities,
        }
    }

    pub fn consumers(&self) -> &[String] {
        &self.consumers
    }

    /// 为本地文件生成可共享的 URI。
    pub fn content_uri_for(&self, path: &Path, kind: MediaKind) -> Result<String, ClipboardError> {
        if self.capabilities.content_uris {
            match self.uri_provider.uri_for_file(path) {
                Ok(uri) => return Ok(uri),
                Err(e) => log::warn!(
                    "⚠️ content URI 生成失败，尝试 file:// URI - 路径: {}，原因: {}",
                    path.display(),
                    e
                ),
            }
        }

        reqwest::Url::from_file_path(path)
            .map(|url| url.to_string())
            .map_err(|_| ClipboardError::UriCreation {
                kind: kind.display_name(),
                detail: format!("无法为路径生成 URI：{}", path.display()),
            })
    }

    /// 构造 URI 剪贴记录。
    pub fn build(&self, uri: &str, mime_type: Option<&str>, kind: MediaKind) -> Result<ClipRecord, ClipboardError> {
        if uri.trim().is_empty() || !uri.contains("://") {
            return Err(ClipboardError::ClipDataCreation {
                kind: kind.display_name(),
                detail: format!("URI 无效：'{}'", uri),
            });
        }

        if !self.capabilities.clip_descriptions {
            return Ok(ClipRecord::Uri(UriRecord {
                label: kind.clip_label().to_string(),
                uri: uri.to_string(),
                mime_type: None,
                granted_consumers: Vec::new(),
            }));
        }

        let mime_type = mime_type
            .filter(|mime| !mime.trim().is_empty())
            .unwrap_or(kind.wildcard_mime())
            .to_string();

        let mut granted_consumers = Vec::with_capacity(self.consumers.len());
        for consumer in &self.consumers {
            match self.uri_provider.grant_read_permission(consumer, uri) {
                Ok(()) => {
                    log::debug!("🔑 已授予读权限: {}", consumer);
                    granted_consumers.push(consumer.clone());
                }
                Err(e) => log::warn!("⚠️ 授予读权限失败 - 消费者: {}，原因: {}", consumer, e),
            }
        }

        Ok(ClipRecord::Uri(UriRecord {
            label: kind.clip_label().to_string(),
            uri: uri.to_string(),
            mime_type: Some(mime_type),
            granted_consumers,
        }))
    }
}
