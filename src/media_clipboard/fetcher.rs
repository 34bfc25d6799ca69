//! # 远程下载模块
//!
//! ## 设计思路
//!
//! 把 HTTP/HTTPS 地址下载为缓存目录中的临时文件。单次尝试、无重试、无体积上限；
//! 任何失败都不越过本模块边界，而是以 `FetchOutcome::Failed(原 URL)` 返回，
//! 让后续“文件不存在”错误能直接展示不可达的地址。
//!
//! ## 实现思路
//!
//! - 下载前先清扫过期临时文件。
//! - 连接超时由客户端控制；响应头与每个数据块的读取各自套一层 `tokio::time::timeout`。
//! - 文件名优先取 URL 路径末段（不超过长度上限），过长时合成 `file_<时间戳><扩展名>`；
//!   路径无扩展名时按响应类型推断，仍无则嗅探首个数据块，最后回落 `dat`。
//! - 目标文件先登记再写入，中途失败的残留文件同样会被清理。
//! - 日志中的 URL 去掉 query / fragment。

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncWriteExt, BufWriter};

use crate::storage::{TEMP_FILE_PREFIX, TempArtifactStore};

use super::{ClipboardConfig, ClipboardError, FetchOutcome};

const FALLBACK_DOWNLOAD_NAME: &str = "downloaded_file";
const FALLBACK_EXTENSION: &str = "dat";
const DOWNLOAD_OWNER_TAG: &str = "download";

/// 远程下载器。
pub struct RemoteFetcher {
    client: reqwest::Client,
    store: Arc<TempArtifactStore>,
    config: ClipboardConfig,
}

impl RemoteFetcher {
    pub fn new(store: Arc<TempArtifactStore>, config: ClipboardConfig) -> Result<Self, ClipboardError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| ClipboardError::Network(format!("无法创建 HTTP 客户端：{}", e)))?;

        Ok(Self {
            client,
            store,
            config,
        })
    }

    /// 下载并缓存；失败时返回原 URL。
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        log::info!("🌐 开始下载 - URL: {}", redact_url_for_log(url));

        match self.download(url).await {
            Ok(path) => FetchOutcome::Cached(path),
            Err(e) => {
                let message = e.to_string().replace(url, &redact_url_for_log(url));
                log::error!("❌ 下载失败 - URL: {}，{}", redact_url_for_log(url), message);
                FetchOutcome::Failed(url.to_string())
            }
        }
    }

    async fn download(&self, url: &str) -> Result<PathBuf, ClipboardError> {
        let swept = self
            .store
            .sweep_stale_blocking(self.config.temp_retention())
            .await;
        if swept > 0 {
            log::debug!("🧹 下载前清理过期临时文件 {} 个", swept);
        }

        let parsed = reqwest::Url::parse(url)
            .map_err(|e| ClipboardError::Network(format!("URL 格式错误：{}", e)))?;

        let header_timeout = self.config.connect_timeout() + self.config.read_timeout();
        let response = tokio::time::timeout(header_timeout, self.client.get(parsed.clone()).send())
            .await
            .map_err(|_| {
                ClipboardError::Timeout(format!("等待响应超时（{}秒）", header_timeout.as_secs()))
            })?
            .map_err(|e| map_reqwest_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClipboardError::Network(format!("HTTP {}", status.as_u16())));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_ascii_lowercase());

        let mut response = response;
        let read_timeout = self.config.read_timeout();
        let first_chunk: Option<bytes::Bytes> = tokio::time::timeout(read_timeout, response.chunk())
            .await
            .map_err(|_| ClipboardError::Timeout("下载首包超时".to_string()))?
            .map_err(|e| map_reqwest_error(&e))?;

        let file_name = derive_file_name(
            &parsed,
            content_type.as_deref(),
            first_chunk.as_deref(),
            self.config.max_download_name_len,
        );
        let (prefix, extension) = split_prefix_and_extension(&file_name);

        let path = self.store.allocate(&prefix, &extension, DOWNLOAD_OWNER_TAG)?;

        let file = tokio::fs::File::create(&path).await?;
        let mut writer = BufWriter::with_capacity(self.config.download_buffer_size, file);
        let mut total: u64 = 0;

        if let Some(chunk) = first_chunk {
            writer.write_all(&chunk).await?;
            total = total.saturating_add(chunk.len() as u64);

            loop {
                let next = tokio::time::timeout(read_timeout, response.chunk())
                    .await
                    .map_err(|_| ClipboardError::Timeout("下载数据流读取超时".to_string()))?
                    .map_err(|e| map_reqwest_error(&e))?;

                let Some(chunk) = next else {
                    break;
                };

                writer.write_all(&chunk).await?;
                total = total.saturating_add(chunk.len() as u64);
            }
        }

        writer.flush().await?;

        log::info!("✅ 下载完成 - {} 字节 → {}", total, path.display());
        Ok(path)
    }
}

fn map_reqwest_error(error: &reqwest::Error) -> ClipboardError {
    if error.is_timeout() {
        ClipboardError::Timeout(format!("请求超时：{}", error))
    } else if error.is_connect() {
        ClipboardError::Network(format!("无法连接：{}", error))
    } else {
        ClipboardError::Network(format!("请求失败：{}", error))
    }
}

/// 去掉 query 与 fragment，避免把签名参数写进日志。
pub(crate) fn redact_url_for_log(url: &str) -> String {
    let Ok(parsed) = reqwest::Url::parse(url) else {
        return "<invalid-url>".to_string();
    };

    let host = parsed.host_str().unwrap_or("<unknown-host>");
    let port = parsed.port().map(|p| format!(":{}", p)).unwrap_or_default();

    format!("{}://{}{}{}", parsed.scheme(), host, port, parsed.path())
}

/// 按 URL 路径、响应类型与首块内容推导目标文件名。
fn derive_file_name(
    url: &reqwest::Url,
    content_type: Option<&str>,
    first_chunk: Option<&[u8]>,
    max_name_len: usize,
) -> String {
    let path = url.path();
    let basename = path.rsplit('/').next().unwrap_or_default();

    if path.contains('.') && !basename.is_empty() {
        if basename.chars().count() <= max_name_len {
            return basename.to_string();
        }

        let extension = basename
            .rfind('.')
            .map(|idx| &basename[idx..])
            .unwrap_or_default();
        return format!("file_{}{}", chrono::Utc::now().timestamp_millis(), extension);
    }

    let extension = content_type
        .and_then(extension_for_content_type)
        .or_else(|| first_chunk.and_then(infer::get).map(|kind| kind.extension()));

    match extension {
        Some(ext) => format!("{}.{}", FALLBACK_DOWNLOAD_NAME, ext.trim_start_matches('.')),
        None => FALLBACK_DOWNLOAD_NAME.to_string(),
    }
}

fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    if content_type.starts_with("image/") {
        Some("jpg")
    } else if content_type.starts_with("video/") {
        Some("mp4")
    } else if content_type.starts_with("audio/") {
        Some("mp3")
    } else if content_type.starts_with("application/pdf") {
        Some("pdf")
    } else {
        None
    }
}

/// `photo.png` → (`clipboard_photo`, `png`)；无扩展名时使用 `dat`。
fn split_prefix_and_extension(file_name: &str) -> (String, String) {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() => {
            (format!("{}{}", TEMP_FILE_PREFIX, stem), ext.to_string())
        }
        _ => (
            format!("{}{}", TEMP_FILE_PREFIX, file_name.trim_end_matches('.')),
            FALLBACK_EXTENSION.to_string(),
        ),
    }
}
