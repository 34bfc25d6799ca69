//! # 平台服务抽象
//!
//! ## 设计思路
//!
//! 系统剪贴板读写、content URI 生成与授权、扩展名到 MIME 的查询都属于宿主平台能力，
//! 本 crate 只以 trait 形式消费它们：
//!
//! - `ClipboardService`：设置 / 读取 / 清空主剪贴板记录
//! - `ContentUriProvider`：把文件映射为受能力约束的 URI，并向指定消费者授予读权限
//! - `MimeLookup`：扩展名 → MIME 类型
//! - `PathProbe`：文件存在性探测（资源路径搜索的唯一文件系统触点）
//!
//! ## 实现思路
//!
//! `HostContext` 描述宿主应用（包名、各类目录、能力级别），由宿主在构造模块时注入。
//! `memory` / `mime` 子模块提供纯内存与静态表实现，既用于测试，也可作为无系统剪贴板时的后备。

mod memory;
mod mime;

#[cfg(feature = "desktop")]
mod desktop;

use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use memory::{LocalFileProvider, MemoryClipboard};
pub use mime::StaticMimeTable;

#[cfg(feature = "desktop")]
pub use desktop::ArboardClipboard;

/// 平台服务调用失败。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    /// 服务暂不可用（剪贴板未就绪、系统服务断开等）。
    #[error("平台服务不可用：{0}")]
    Unavailable(String),

    /// 请求被平台拒绝（路径不在共享根目录内、授权被拒等）。
    #[error("平台拒绝请求：{0}")]
    Rejected(String),
}

/// 剪贴板记录：系统剪贴板中的一个数据单元。
///
/// 一旦交给 `ClipboardService::set_primary_clip`，所有权即归系统剪贴板，模块不再持有引用。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipRecord {
    PlainText { label: String, text: String },
    Uri(UriRecord),
}

/// 携带 URI 的剪贴板记录。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriRecord {
    pub label: String,
    pub uri: String,
    /// 显式剪贴描述中的 MIME 类型；简化记录为 `None`。
    pub mime_type: Option<String>,
    /// 成功获得读权限的消费者身份。
    pub granted_consumers: Vec<String>,
}

/// 宿主平台能力级别。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformCapabilities {
    /// 支持带 MIME 的显式剪贴描述与逐消费者授权。
    pub clip_descriptions: bool,
    /// 提供显式的“清空主剪贴板”原语。
    pub explicit_clear: bool,
    /// 支持 content URI；不支持时退回 `file://` URI。
    pub content_uris: bool,
}

impl Default for PlatformCapabilities {
    fn default() -> Self {
        Self {
            clip_descriptions: true,
            explicit_clear: true,
            content_uris: true,
        }
    }
}

/// 宿主应用上下文：包名、目录布局与能力级别。
#[derive(Debug, Clone)]
pub struct HostContext {
    pub package_name: String,
    /// 应用私有存储根目录。
    pub files_dir: PathBuf,
    /// 应用私有外部存储根目录（可能不存在）。
    pub external_files_dir: Option<PathBuf>,
    /// 缓存目录，临时产物写在这里。
    pub cache_dir: PathBuf,
    pub external_cache_dir: Option<PathBuf>,
    /// 应用数据根目录。
    pub data_dir: PathBuf,
    pub capabilities: PlatformCapabilities,
}

impl HostContext {
    /// 以单一根目录构造上下文，布局为 `<root>/files`、`<root>/cache`，数据目录即 `<root>`。
    pub fn rooted_at(package_name: impl Into<String>, root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            package_name: package_name.into(),
            files_dir: root.join("files"),
            external_files_dir: None,
            cache_dir: root.join("cache"),
            external_cache_dir: None,
            data_dir: root.to_path_buf(),
            capabilities: PlatformCapabilities::default(),
        }
    }

    /// 资源搜索的基础目录，顺序即优先级：
    /// 私有存储、外部存储、两个缓存目录、`files/assets`、`files/www`、`files/public`、数据根目录。
    /// 不存在的外部目录直接跳过。
    pub fn asset_search_roots(&self) -> Vec<PathBuf> {
        [
            Some(self.files_dir.clone()),
            self.external_files_dir.clone(),
            Some(self.cache_dir.clone()),
            self.external_cache_dir.clone(),
            Some(self.files_dir.join("assets")),
            Some(self.files_dir.join("www")),
            Some(self.files_dir.join("public")),
            Some(self.data_dir.clone()),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// 系统剪贴板服务。
pub trait ClipboardService: Send + Sync {
    fn set_primary_clip(&self, record: ClipRecord) -> Result<(), PlatformError>;

    fn primary_clip(&self) -> Result<Option<ClipRecord>, PlatformError>;

    fn clear_primary_clip(&self) -> Result<(), PlatformError>;
}

/// content URI 提供者（对应平台的 FileProvider）。
pub trait ContentUriProvider: Send + Sync {
    /// 为本地文件生成受能力约束的 URI。
    fn uri_for_file(&self, path: &Path) -> Result<String, PlatformError>;

    /// 向单个消费者授予该 URI 的临时读权限。
    fn grant_read_permission(&self, consumer: &str, uri: &str) -> Result<(), PlatformError>;

    /// 查询 URI 背后内容的 MIME 类型。
    fn mime_type_of(&self, _uri: &str) -> Option<String> {
        None
    }
}

/// 扩展名 → MIME 查询服务。
pub trait MimeLookup: Send + Sync {
    fn mime_type_for_extension(&self, extension: &str) -> Option<String>;
}

/// 文件存在性探测。
pub trait PathProbe: Send + Sync {
    /// 路径存在且是普通文件；目录不算。
    fn exists(&self, path: &Path) -> bool;
}

/// 基于真实文件系统的探测实现。
#[derive(Debug, Default, Clone, Copy)]
pub struct FsProbe;

impl PathProbe for FsProbe {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// 模块运行所需的全部平台服务。
#[derive(Clone)]
pub struct PlatformServices {
    pub clipboard: Arc<dyn ClipboardService>,
    pub uri_provider: Arc<dyn ContentUriProvider>,
    pub mime_lookup: Arc<dyn MimeLookup>,
    pub probe: Arc<dyn PathProbe>,
}

impl PlatformServices {
    /// 使用静态 MIME 表与真实文件系统探测组装服务集合。
    pub fn new(
        clipboard: Arc<dyn ClipboardService>,
        uri_provider: Arc<dyn ContentUriProvider>,
    ) -> Self {
        Self {
            clipboard,
            uri_provider,
            mime_lookup: Arc::new(StaticMimeTable),
            probe: Arc::new(FsProbe),
        }
    }

    pub fn with_mime_lookup(mut self, mime_lookup: Arc<dyn MimeLookup>) -> Self {
        self.mime_lookup = mime_lookup;
        self
    }

    pub fn with_probe(mut self, probe: Arc<dyn PathProbe>) -> Self {
        self.probe = probe;
        self
    }
}
