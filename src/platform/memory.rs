//! 纯内存平台实现。
//!
//! `MemoryClipboard` 是单槽剪贴板：最后一次 `set_primary_clip` 生效。
//! `LocalFileProvider` 模拟 FileProvider：把宿主目录映射为
//! `content://<authority>/<root>/<relative>`，并记录授权台账。

use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use super::{
    ClipRecord, ClipboardService, ContentUriProvider, HostContext, MimeLookup, PlatformError,
    StaticMimeTable,
};

/// 单槽内存剪贴板。
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    slot: Mutex<Option<ClipRecord>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardService for MemoryClipboard {
    fn set_primary_clip(&self, record: ClipRecord) -> Result<(), PlatformError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(record);
        Ok(())
    }

    fn primary_clip(&self) -> Result<Option<ClipRecord>, PlatformError> {
        Ok(self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn clear_primary_clip(&self) -> Result<(), PlatformError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// 本地 FileProvider 实现。
#[derive(Debug)]
pub struct LocalFileProvider {
    authority: String,
    roots: Vec<(String, PathBuf)>,
    grants: Mutex<Vec<(String, String)>>,
}

impl LocalFileProvider {
    pub fn new(authority: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
            roots: Vec::new(),
            grants: Mutex::new(Vec::new()),
        }
    }

    /// 按宿主目录布局注册共享根目录，authority 为 `<包名><后缀>`。
    pub fn for_host(host: &HostContext, authority_suffix: &str) -> Self {
        let mut provider = Self::new(format!("{}{}", host.package_name, authority_suffix))
            .with_root("files", &host.files_dir)
            .with_root("cache", &host.cache_dir)
            .with_root("data", &host.data_dir);
        if let Some(dir) = &host.external_files_dir {
            provider = provider.with_root("external_files", dir);
        }
        if let Some(dir) = &host.external_cache_dir {
            provider = provider.with_root("external_cache", dir);
        }
        provider
    }

    pub fn with_root(mut self, name: impl Into<String>, dir: impl AsRef<Path>) -> Self {
        self.roots.push((name.into(), dir.as_ref().to_path_buf()));
        self
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// 已授予的 `(消费者, URI)` 列表。
    pub fn grants(&self) -> Vec<(String, String)> {
        self.grants.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl ContentUriProvider for LocalFileProvider {
    fn uri_for_file(&self, path: &Path) -> Result<String, PlatformError> {
        // 取最长匹配的根目录，避免数据根目录吞掉更具体的 files/cache 映射
        let (name, relative) = self
            .roots
            .iter()
            .filter_map(|(name, root)| {
                path.strip_prefix(root)
                    .ok()
                    .map(|rel| (name, rel, root.components().count()))
            })
            .max_by_key(|(_, _, depth)| *depth)
            .map(|(name, rel, _)| (name, rel))
            .ok_or_else(|| {
                PlatformError::Rejected(format!("路径不在任何共享根目录内：{}", path.display()))
            })?;

        let segments: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        if segments.is_empty() {
            return Err(PlatformError::Rejected(format!(
                "不能共享目录本身：{}",
                path.display()
            )));
        }

        Ok(format!("content://{}/{}/{}", self.authority, name, segments.join("/")))
    }

    fn grant_read_permission(&self, consumer: &str, uri: &str) -> Result<(), PlatformError> {
        if consumer.trim().is_empty() {
            return Err(PlatformError::Rejected("消费者身份为空".to_string()));
        }
        self.grants
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((consumer.to_string(), uri.to_string()));
        Ok(())
    }

    fn mime_type_of(&self, uri: &str) -> Option<String> {
        let last = uri.rsplit('/').next()?;
        let (_, ext) = last.rsplit_once('.')?;
        StaticMimeTable.mime_type_for_extension(ext)
    }
}
