//! # 服务入口模块
//!
//! ## 设计思路
//!
//! `MediaClipboardModule` 是宿主直接持有的对象，对应桥接层暴露的全部方法。
//! 复制类方法在 tokio 运行时上各自作为独立任务执行，通过 `PendingResult` 回传结果；
//! `copyText`、`hasContent`、`getContent`、`clear` 只涉及内存中的剪贴板服务，在调用线程同步完成。
//!
//! ## 实现思路
//!
//! - 运行时可以由模块自建（多线程），也可以复用宿主传入的 `Handle`。
//! - 每个方法在自身边界把 `ClipboardError` 折叠为 `CommandError`。
//! - `invalidate` 删除全部临时产物并拒绝后续复制请求；`Drop` 时自动执行。
//! - 多个复制任务之间不保证顺序，剪贴板以最后完成的写入为准。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::runtime::{Handle, Runtime};

use crate::error::CommandError;
use crate::platform::{HostContext, PlatformServices};
use crate::storage::TempArtifactStore;

use super::handler::{CopyRequest, MediaClipboardHandler};
use super::{ClipboardConfig, ClipboardContent, ClipboardError, CopyOptions, Operation, PendingResult, Promise};

const WORKER_THREAD_NAME: &str = "media-clipboard-worker";

/// 媒体剪贴板模块。
pub struct MediaClipboardModule {
    handler: Arc<MediaClipboardHandler>,
    handle: Handle,
    owned_runtime: Option<Runtime>,
    invalidated: AtomicBool,
}

impl MediaClipboardModule {
    /// 创建模块并自建多线程运行时。
    pub fn new(
        host: HostContext,
        services: PlatformServices,
        config: ClipboardConfig,
    ) -> Result<Self, ClipboardError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name(WORKER_THREAD_NAME)
            .build()?;
        let handle = runtime.handle().clone();

        Self::build(host, services, config, handle, Some(runtime))
    }

    /// 复用宿主已有的运行时。
    pub fn with_runtime(
        handle: Handle,
        host: HostContext,
        services: PlatformServices,
        config: ClipboardConfig,
    ) -> Result<Self, ClipboardError> {
        Self::build(host, services, config, handle, None)
    }

    fn build(
        host: HostContext,
        services: PlatformServices,
        config: ClipboardConfig,
        handle: Handle,
        owned_runtime: Option<Runtime>,
    ) -> Result<Self, ClipboardError> {
        let handler = MediaClipboardHandler::new(&host, services, config)?;
        log::info!(
            "🚀 媒体剪贴板模块已初始化 - 包名: {}，缓存目录: {}",
            host.package_name,
            host.cache_dir.display()
        );

        Ok(Self {
            handler: Arc::new(handler),
            handle,
            owned_runtime,
            invalidated: AtomicBool::new(false),
        })
    }

    pub fn temp_store(&self) -> &Arc<TempArtifactStore> {
        self.handler.store()
    }

    pub fn is_invalidated(&self) -> bool {
        self.invalidated.load(Ordering::SeqCst)
    }

    pub fn copy_text(&self, text: &str) -> Result<(), CommandError> {
        self.handler
            .copy_text(text)
            .map_err(|e| boundary_error(e, Operation::CopyText))
    }

    pub fn copy_image(&self, path: &str, options: CopyOptions) -> PendingResult<()> {
        self.dispatch(Operation::CopyImage, path, None, options)
    }

    pub fn copy_video(&self, path: &str, options: CopyOptions) -> PendingResult<()> {
        self.dispatch(Operation::CopyVideo, path, None, options)
    }

    pub fn copy_audio(&self, path: &str, options: CopyOptions) -> PendingResult<()> {
        self.dispatch(Operation::CopyAudio, path, None, options)
    }

    pub fn copy_pdf(&self, path: &str, options: CopyOptions) -> PendingResult<()> {
        self.dispatch(Operation::CopyPdf, path, None, options)
    }

    pub fn copy_file(&self, path: &str, mime_type: Option<&str>, options: CopyOptions) -> PendingResult<()> {
        self.dispatch(Operation::CopyFile, path, mime_type, options)
    }

    /// 目前与 `copy_file` 行为一致，仅错误码不同。
    pub fn copy_large_file(
        &self,
        path: &str,
        mime_type: Option<&str>,
        options: CopyOptions,
    ) -> PendingResult<()> {
        self.dispatch(Operation::CopyLargeFile, path, mime_type, options)
    }

    pub fn has_content(&self) -> Result<bool, CommandError> {
        self.handler
            .has_content()
            .map_err(|e| boundary_error(e, Operation::HasContent))
    }

    pub fn get_content(&self) -> Result<ClipboardContent, CommandError> {
        self.handler
            .get_content()
            .map_err(|e| boundary_error(e, Operation::GetContent))
    }

    pub fn clear(&self) -> Result<(), CommandError> {
        self.handler
            .clear()
            .map_err(|e| boundary_error(e, Operation::Clear))
    }

    /// 宿主销毁模块时调用：删除全部临时产物，之后的复制请求一律拒绝。
    pub fn invalidate(&self) {
        if self.invalidated.swap(true, Ordering::SeqCst) {
            return;
        }
        let deleted = self.handler.store().teardown();
        log::info!("🗑️ 模块已销毁，删除临时文件 {} 个", deleted);
    }

    fn dispatch(
        &self,
        operation: Operation,
        reference: &str,
        mime_type: Option<&str>,
        options: CopyOptions,
    ) -> PendingResult<()> {
        let (promise, pending) = Promise::channel(operation);

        if self.is_invalidated() {
            promise.reject(boundary_error(ClipboardError::Invalidated, operation));
            return pending;
        }

        let request = CopyRequest {
            operation,
            reference: reference.to_string(),
            mime_type: mime_type.map(str::to_string),
            options,
        };
        let handler = self.handler.clone();

        self.handle.spawn(async move {
            match handler.copy_media(&request).await {
                Ok(()) => promise.resolve(()),
                Err(e) => promise.reject(boundary_error(e, request.operation)),
            }
        });

        pending
    }
}

impl Drop for MediaClipboardModule {
    fn drop(&mut self) {
        self.invalidate();
        if let Some(runtime) = self.owned_runtime.take() {
            runtime.shutdown_background();
        }
    }
}

fn boundary_error(error: ClipboardError, operation: Operation) -> CommandError {
    let command = error.into_command_error(operation);
    log::error!("❌ {} 失败 [{}]: {}", operation.name(), command.code, command.message);
    command
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::platform::{LocalFileProvider, MemoryClipboard};

    fn module_in(dir: &std::path::Path) -> MediaClipboardModule {
        let host = HostContext::rooted_at("com.example.app", dir);
        let services = PlatformServices::new(
            Arc::new(MemoryClipboard::new()),
            Arc::new(LocalFileProvider::for_host(&host, ".fp")),
        );
        MediaClipboardModule::new(host, services, ClipboardConfig::default()).expect("module init failed")
    }

    #[test]
    fn owned_runtime_runs_copy_tasks() {
        let dir = tempfile::tempdir().expect("tempdir failed");
        let module = module_in(dir.path());

        let image = dir.path().join("files").join("cat.png");
        std::fs::create_dir_all(image.parent().expect("parent")).expect("mkdir failed");
        std::fs::write(&image, b"png").expect("write failed");

        module
            .copy_image("cat.png", CopyOptions::default())
            .wait_blocking()
            .expect("copy failed");

        let content = module.get_content().expect("get failed");
        assert_eq!(content.mime_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn invalidated_module_rejects_copies_with_fallback_code() {
        let dir = tempfile::tempdir().expect("tempdir failed");
        let module = module_in(dir.path());

        module.invalidate();
        assert!(module.is_invalidated());

        let err = module
            .copy_video("clip.mp4", CopyOptions::default())
            .wait_blocking()
            .expect_err("should reject");
        assert_eq!(err.code, ErrorCode::CopyVideoError);
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let dir = tempfile::tempdir().expect("tempdir failed");
        let host = HostContext::rooted_at("com.example.app", dir.path());
        let services = PlatformServices::new(
            Arc::new(MemoryClipboard::new()),
            Arc::new(LocalFileProvider::for_host(&host, ".fp")),
        );
        let config = ClipboardConfig {
            download_buffer_size: 0,
            ..ClipboardConfig::default()
        };

        assert!(matches!(
            MediaClipboardModule::new(host, services, config),
            Err(ClipboardError::InvalidConfig(_))
        ));
    }
}
