//! # 复制流程编排模块
//!
//! ## 设计思路
//!
//! `MediaClipboardHandler` 串起一次复制请求的完整链路：
//!
//! ```text
//! 引用字符串
//!    ├─ data:      → 清扫过期文件 → 解码 → 写入临时文件 ─┐
//!    ├─ content:// → 直接构造剪贴记录                      │
//!    └─ 其他       → 路径解析（含远程下载）→ 存在性检查 ─┤
//!                                                          ↓
//!                                  content URI → 剪贴记录 → 系统剪贴板
//! ```
//!
//! 同时承载不涉及 I/O 的同步操作：写入文本、查询、读取分类、清空。
//!
//! ## 实现思路
//!
//! 所有阶段返回 `ClipboardError`，错误码在服务层按方法折叠；
//! MIME 优先级：显式参数 > 选项 > Data URI 声明 > 按扩展名查表 > 类别通配类型。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::platform::{ClipRecord, HostContext, PlatformCapabilities, PlatformServices};
use crate::storage::{DECODED_IMAGE_PREFIX, TempArtifactStore};

use super::decoder;
use super::fetcher::redact_url_for_log;
use super::{
    AssetPathResolver, ClipRecordBuilder, ClipboardConfig, ClipboardContent, ClipboardError,
    ContentType, CopyOptions, MediaKind, Operation, ReferenceString, RemoteFetcher, Resolution,
};

const DATA_URI_OWNER_TAG: &str = "data-uri";
const TEXT_CLIP_LABEL: &str = "text";

/// 一次复制请求。
#[derive(Debug, Clone)]
pub struct CopyRequest {
    pub operation: Operation,
    pub reference: String,
    /// `copyFile` / `copyLargeFile` 的显式 MIME 参数。
    pub mime_type: Option<String>,
    pub options: CopyOptions,
}

impl CopyRequest {
    fn kind(&self) -> MediaKind {
        self.operation.media_kind().unwrap_or(MediaKind::File)
    }

    fn preferred_mime(&self) -> Option<&str> {
        self.mime_type
            .as_deref()
            .or(self.options.mime_type.as_deref())
            .filter(|mime| !mime.trim().is_empty())
    }
}

/// 复制流程编排器。
pub struct MediaClipboardHandler {
    services: PlatformServices,
    store: Arc<TempArtifactStore>,
    resolver: AssetPathResolver,
    builder: ClipRecordBuilder,
    config: ClipboardConfig,
    capabilities: PlatformCapabilities,
}

impl MediaClipboardHandler {
    pub fn new(
        host: &HostContext,
        services: PlatformServices,
        config: ClipboardConfig,
    ) -> Result<Self, ClipboardError> {
        config.validate()?;

        let store = Arc::new(TempArtifactStore::new(&host.cache_dir));
        let fetcher = Arc::new(RemoteFetcher::new(store.clone(), config.clone())?);
        let resolver = AssetPathResolver::new(host.asset_search_roots(), services.probe.clone(), fetcher);
        let builder = ClipRecordBuilder::new(
            services.uri_provider.clone(),
            &config,
            &host.package_name,
            host.capabilities,
        );

        Ok(Self {
            services,
            store,
            resolver,
            builder,
            config,
            capabilities: host.capabilities,
        })
    }

    pub fn store(&self) -> &Arc<TempArtifactStore> {
        &self.store
    }

    pub fn resolver(&self) -> &AssetPathResolver {
        &self.resolver
    }

    /// 执行一次媒体复制。
    pub async fn copy_media(&self, request: &CopyRequest) -> Result<(), ClipboardError> {
        let kind = request.kind();
        log::debug!(
            "📋 {} - 引用: {}",
            request.operation.name(),
            describe_reference(&request.reference)
        );

        match ReferenceString::parse(&request.reference) {
            ReferenceString::DataUri(raw) => self.copy_data_uri(&raw, request).await,
            ReferenceString::ContentUri(uri) => {
                let mime = request
                    .preferred_mime()
                    .map(str::to_string)
                    .or_else(|| self.services.uri_provider.mime_type_of(&uri));
                self.publish_uri(&uri, mime.as_deref(), request)
            }
            _ => {
                let path = self.locate(&request.reference, kind).await?;
                let uri = self.builder.content_uri_for(&path, kind)?;
                let mime = request
                    .preferred_mime()
                    .map(str::to_string)
                    .or_else(|| self.mime_for_path(&path));
                self.publish_uri(&uri, mime.as_deref(), request)
            }
        }
    }

    /// 解析引用并确认文件存在。
    async fn locate(&self, reference: &str, kind: MediaKind) -> Result<PathBuf, ClipboardError> {
        match self.resolver.resolve(reference).await {
            Resolution::RejectedRelative => Err(ClipboardError::RelativePath {
                reference: reference.to_string(),
                alternatives: kind.relative_path_alternatives(),
            }),
            Resolution::Unresolved(original) => Err(ClipboardError::FileNotFound {
                kind: kind.display_name(),
                reference: reference.to_string(),
                resolved: original,
            }),
            Resolution::Resolved(path) => {
                if !self.services.probe.exists(&path) {
                    return Err(ClipboardError::FileNotFound {
                        kind: kind.display_name(),
                        reference: reference.to_string(),
                        resolved: path.display().to_string(),
                    });
                }
                Ok(path)
            }
        }
    }

    async fn copy_data_uri(&self, data_uri: &str, request: &CopyRequest) -> Result<(), ClipboardError> {
        let kind = request.kind();

        let swept = self
            .store
            .sweep_stale_blocking(self.config.temp_retention())
            .await;
        if swept > 0 {
            log::debug!("🧹 解码前清理过期临时文件 {} 个", swept);
        }

        let decoded = decoder::decode_data_uri(data_uri)?;

        let path = self
            .store
            .allocate(DECODED_IMAGE_PREFIX, &decoded.extension, DATA_URI_OWNER_TAG)
            .map_err(|e| ClipboardError::Base64Content(format!("无法创建临时文件：{}", e)))?;
        tokio::fs::write(&path, &decoded.bytes)
            .await
            .map_err(|e| ClipboardError::Base64Content(format!("写入临时文件失败：{}", e)))?;

        log::debug!(
            "💾 已写出临时文件: {}（{} 字节）",
            path.display(),
            decoded.bytes.len()
        );

        let uri = self.builder.content_uri_for(&path, kind)?;
        let mime = request
            .preferred_mime()
            .map(str::to_string)
            .or(decoded.mime_type)
            .or_else(|| self.mime_for_path(&path));
        self.publish_uri(&uri, mime.as_deref(), request)
    }

    fn publish_uri(&self, uri: &str, mime_type: Option<&str>, request: &CopyRequest) -> Result<(), ClipboardError> {
        let kind = request.kind();
        let record = self.builder.build(uri, mime_type, kind)?;
        self.services.clipboard.set_primary_clip(record)?;

        log::info!("✅ {}已复制到剪贴板 - URI: {}", kind.display_name(), uri);
        if request.options.show_notification {
            match request.options.filename.as_deref() {
                Some(name) => log::info!("🔔 {}「{}」已复制到剪贴板", kind.display_name(), name),
                None => log::info!("🔔 {}已复制到剪贴板", kind.display_name()),
            }
        }
        Ok(())
    }

    fn mime_for_path(&self, path: &Path) -> Option<String> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.services.mime_lookup.mime_type_for_extension(ext))
    }

    /// 写入纯文本剪贴记录。
    pub fn copy_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.services.clipboard.set_primary_clip(ClipRecord::PlainText {
            label: TEXT_CLIP_LABEL.to_string(),
            text: text.to_string(),
        })?;
        log::debug!("📋 文本已复制到剪贴板（{} 字符）", text.chars().count());
        Ok(())
    }

    pub fn has_content(&self) -> Result<bool, ClipboardError> {
        Ok(self.services.clipboard.primary_clip()?.is_some())
    }

    /// 读取并分类当前剪贴板内容。
    pub fn get_content(&self) -> Result<ClipboardContent, ClipboardError> {
        let Some(record) = self.services.clipboard.primary_clip()? else {
            return Ok(ClipboardContent::unknown());
        };

        match record {
            ClipRecord::PlainText { text, .. } => Ok(ClipboardContent::text(text)),
            ClipRecord::Uri(record) => {
                // 通配提示不如提供者给出的具体类型
                let mime_type = match record.mime_type {
                    Some(hint) if !hint.contains('*') => Some(hint),
                    hint => self.services.uri_provider.mime_type_of(&record.uri).or(hint),
                };

                Ok(match mime_type {
                    Some(mime) => ClipboardContent {
                        content_type: ContentType::from_mime_type(&mime),
                        data: None,
                        mime_type: Some(mime),
                    },
                    None => ClipboardContent {
                        content_type: ContentType::File,
                        data: None,
                        mime_type: None,
                    },
                })
            }
        }
    }

    /// 清空主剪贴板；平台无显式清空原语时写入空文本记录。
    pub fn clear(&self) -> Result<(), ClipboardError> {
        if self.capabilities.explicit_clear {
            self.services.clipboard.clear_primary_clip()?;
        } else {
            self.services.clipboard.set_primary_clip(ClipRecord::PlainText {
                label: String::new(),
                text: String::new(),
            })?;
        }
        log::debug!("🧽 剪贴板已清空");
        Ok(())
    }
}

/// 日志用的引用描述：URL 去敏，Data URI 只保留头部。
fn describe_reference(reference: &str) -> String {
    if reference.starts_with("http://") || reference.starts_with("https://") {
        return redact_url_for_log(reference);
    }
    if reference.starts_with("data:") {
        let header = reference.split(',').next().unwrap_or_default();
        return format!("{},…（{} 字符）", header, reference.len());
    }
    reference.to_string()
}
