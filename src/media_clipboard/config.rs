//! # 配置模块
//!
//! ## 设计思路
//!
//! 所有可调参数集中到 `ClipboardConfig`：下载超时、临时文件保留时长、下载文件名长度上限、
//! 写盘缓冲大小、FileProvider authority 后缀与默认授权消费者。
//!
//! ## 实现思路
//!
//! - `Default` 提供与平台约定一致的默认值。
//! - `serde(default)` 允许宿主只覆盖部分字段。
//! - `load_from_path` 读取 JSON 覆盖文件；文件缺失或损坏时回退默认值并告警。
//! - `validate` 对数值做范围校验，拒绝明显错误的配置。

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ClipboardError;

/// 剪贴板桥接配置。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardConfig {
    /// 建立连接超时（秒）。
    pub connect_timeout: u64,
    /// 单次读取超时（秒）。
    pub read_timeout: u64,
    /// 临时文件保留时长（秒），超过即在下一次解码/下载前被清扫。
    pub temp_retention_secs: u64,
    /// 下载文件名（URL 路径末段）允许的最大长度，超过则改用合成名。
    pub max_download_name_len: usize,
    /// 下载写盘缓冲大小（字节）。
    pub download_buffer_size: usize,
    /// FileProvider authority = 包名 + 该后缀。
    pub file_provider_authority_suffix: String,
    /// 获得读权限的系统消费者；宿主应用自身会在运行时追加。
    pub system_consumers: Vec<String>,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            connect_timeout: 10,
            read_timeout: 30,
            temp_retention_secs: 3600,
            max_download_name_len: 50,
            download_buffer_size: 8 * 1024,
            file_provider_authority_suffix: ".mediaclipboard.fileprovider".to_string(),
            system_consumers: vec![
                "com.android.systemui".to_string(),
                "android".to_string(),
                "com.android.providers.media".to_string(),
            ],
        }
    }
}

impl ClipboardConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout)
    }

    pub fn temp_retention(&self) -> Duration {
        Duration::from_secs(self.temp_retention_secs)
    }

    /// 校验各项参数范围。
    pub fn validate(&self) -> Result<(), ClipboardError> {
        if !(1..=120).contains(&self.connect_timeout) {
            return Err(ClipboardError::InvalidConfig(
                "connect_timeout 必须在 1~120 秒之间".to_string(),
            ));
        }
        if !(1..=600).contains(&self.read_timeout) {
            return Err(ClipboardError::InvalidConfig(
                "read_timeout 必须在 1~600 秒之间".to_string(),
            ));
        }
        if self.temp_retention_secs == 0 {
            return Err(ClipboardError::InvalidConfig(
                "temp_retention_secs 不能为 0".to_string(),
            ));
        }
        if !(8..=255).contains(&self.max_download_name_len) {
            return Err(ClipboardError::InvalidConfig(
                "max_download_name_len 必须在 8~255 之间".to_string(),
            ));
        }
        if !(512..=1024 * 1024).contains(&self.download_buffer_size) {
            return Err(ClipboardError::InvalidConfig(
                "download_buffer_size 必须在 512B~1MB 之间".to_string(),
            ));
        }
        if self.file_provider_authority_suffix.trim().is_empty() {
            return Err(ClipboardError::InvalidConfig(
                "file_provider_authority_suffix 不能为空".to_string(),
            ));
        }
        Ok(())
    }

    /// 读取 JSON 配置文件；缺失、无法解析或校验失败时回退默认配置。
    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("⚠️ 读取配置文件失败 '{}'，使用默认配置: {}", path.display(), e);
                return Self::default();
            }
        };

        let config: Self = match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("⚠️ 解析配置文件失败 '{}'，使用默认配置: {}", path.display(), e);
                return Self::default();
            }
        };

        if let Err(e) = config.validate() {
            log::warn!("⚠️ 配置文件校验失败 '{}'，使用默认配置: {}", path.display(), e);
            return Self::default();
        }

        config
    }
}
