//! # 媒体剪贴板模块（media_clipboard）
//!
//! ## 设计思路
//!
//! 该模块把“引用识别 → 定位字节 → 生成可共享 URI → 写入系统剪贴板”按职责拆分为多个子模块：
//!
//! - `service`：对外入口（`MediaClipboardModule`），负责任务调度与错误码折叠
//! - `handler`：编排单次复制请求的完整链路
//! - `resolver`：资源名按固定优先级探测本地候选路径
//! - `fetcher`：远程地址单次下载到缓存目录
//! - `decoder`：Base64 Data URI 解码
//! - `record_builder`：content URI 生成、剪贴记录构造与逐消费者授权
//! - `promise`：异步结果恰好完成一次的约定
//! - `config/error/source`：配置、错误、数据模型
//!
//! ## 新同事快速上手
//!
//! ```text
//! 宿主调用 copy_image / copy_file ...
//!    ↓
//! service.rs（派发到运行时，返回 PendingResult）
//!    ↓
//! handler.rs（按引用类型分支）
//!    ├─ decoder.rs（data:）
//!    ├─ resolver.rs → fetcher.rs（资源名 / http(s)）
//!    └─ record_builder.rs（URI + 授权 + 剪贴记录）
//!    ↓
//! ClipboardService::set_primary_clip
//! ```
//!
//! ## 分层职责建议
//!
//! - 新增对外方法优先改 `service.rs` 与 `source.rs` 的 `Operation`
//! - 搜索目录或模板变更改 `resolver.rs`（顺序是对外约定，改动需谨慎）
//! - 超时、保留时长等参数改 `config.rs`

mod config;
mod decoder;
mod error;
mod fetcher;
mod handler;
mod promise;
mod record_builder;
mod resolver;
mod service;
mod source;

pub use config::ClipboardConfig;
pub use decoder::{DecodedContent, decode_data_uri};
pub use error::ClipboardError;
pub use fetcher::RemoteFetcher;
pub use handler::{CopyRequest, MediaClipboardHandler};
pub use promise::{PendingResult, Promise};
pub use record_builder::ClipRecordBuilder;
pub use resolver::{AssetPathResolver, SUB_PATH_TEMPLATES};
pub use service::MediaClipboardModule;
pub use source::{
    ClipboardContent, ContentType, CopyOptions, FetchOutcome, MediaKind, Operation, ReferenceString,
    Resolution, is_dotted_relative,
};
