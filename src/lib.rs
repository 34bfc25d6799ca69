//! # 媒体剪贴板桥接 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 宿主应用运行时（方法调用 / Promise）       │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕ PendingResult<T> / Result<T, CommandError>
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            media_clipboard                       │
//! │                                                          │
//! │  ┌─ service ──────── MediaClipboardModule（对外方法）     │
//! │  ├─ handler ──────── 复制链路编排                         │
//! │  │   ├─ decoder        Data URI → 字节                    │
//! │  │   ├─ resolver       资源名 → 本地路径                  │
//! │  │   │   └─ fetcher    http(s) → 缓存文件                 │
//! │  │   └─ record_builder URI + 授权 → 剪贴记录              │
//! │  └─ storage ──────── 临时产物命名·登记·清扫               │
//! └───────┼──────────────────────────────────────────────────┘
//!         ↕ trait 对象
//! ┌───────┼──────────────────────────────────────────────────┐
//! │  platform：ClipboardService / ContentUriProvider /       │
//! │            MimeLookup / PathProbe                        │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 对外错误码 `ErrorCode` 与 reject 负载 `CommandError` |
//! | [`platform`] | 平台服务 trait、宿主上下文、内存与桌面实现 |
//! | [`storage`] | 临时产物存储：命名、登记、按年龄清扫、销毁时删除 |
//! | [`media_clipboard`] | 引用解析、下载、解码、剪贴记录构造与对外方法 |

pub mod error;
pub mod media_clipboard;
pub mod platform;
pub mod storage;

pub use error::{CommandError, ErrorCode};
pub use media_clipboard::{
    ClipboardConfig, ClipboardContent, ContentType, CopyOptions, MediaClipboardModule,
};
pub use platform::{HostContext, PlatformCapabilities, PlatformServices};
