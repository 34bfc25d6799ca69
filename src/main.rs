//! # 媒体剪贴板桥接 — 诊断命令行
//!
//! 在指定宿主根目录下执行一次复制，并以 JSON 打印剪贴板读回的内容。
//! 默认使用内存剪贴板；启用 `desktop` feature 后可用 `--system-clipboard` 写入系统剪贴板。

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use media_clipboard::platform::{ClipboardService, LocalFileProvider, MemoryClipboard};
use media_clipboard::storage::TempArtifactStore;
use media_clipboard::{
    ClipboardConfig, CommandError, CopyOptions, HostContext, MediaClipboardModule, PlatformServices,
};

#[derive(Parser)]
#[command(name = "media-clipboard", about = "Resolve a media reference and place it on the clipboard")]
struct Cli {
    /// JSON 配置文件，缺失或无效时使用默认配置
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 复制一个引用（路径 / 资源名 / http(s) / data: / content://）
    Copy {
        reference: String,

        #[arg(long, value_enum, default_value_t = Kind::Image)]
        kind: Kind,

        /// 宿主根目录，布局为 <root>/files 与 <root>/cache
        #[arg(long)]
        root: PathBuf,

        #[arg(long, default_value = "com.example.mediaclipboard")]
        package: String,

        /// 显式 MIME 类型（file / large-file）
        #[arg(long)]
        mime: Option<String>,

        #[arg(long)]
        notify: bool,

        /// 写入系统剪贴板而非内存剪贴板
        #[cfg(feature = "desktop")]
        #[arg(long)]
        system_clipboard: bool,
    },

    /// 清扫宿主缓存目录中的过期临时文件
    Sweep {
        #[arg(long)]
        root: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Text,
    Image,
    Video,
    Audio,
    Pdf,
    File,
    LargeFile,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli
        .config
        .as_deref()
        .map(ClipboardConfig::load_from_path)
        .unwrap_or_default();

    match cli.command {
        Command::Copy {
            reference,
            kind,
            root,
            package,
            mime,
            notify,
            #[cfg(feature = "desktop")]
            system_clipboard,
        } => {
            let host = HostContext::rooted_at(package, &root);

            #[cfg(feature = "desktop")]
            let clipboard: Arc<dyn ClipboardService> = if system_clipboard {
                match media_clipboard::platform::ArboardClipboard::new() {
                    Ok(clipboard) => Arc::new(clipboard),
                    Err(e) => {
                        eprintln!("media-clipboard: {e}");
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                Arc::new(MemoryClipboard::new())
            };
            #[cfg(not(feature = "desktop"))]
            let clipboard: Arc<dyn ClipboardService> = Arc::new(MemoryClipboard::new());

            let provider = Arc::new(LocalFileProvider::for_host(
                &host,
                &config.file_provider_authority_suffix,
            ));
            let services = PlatformServices::new(clipboard, provider);

            let module = match MediaClipboardModule::new(host, services, config) {
                Ok(module) => module,
                Err(e) => {
                    eprintln!("media-clipboard: {e}");
                    return ExitCode::FAILURE;
                }
            };

            let options = CopyOptions {
                mime_type: None,
                filename: None,
                show_notification: notify,
            };
            match run_copy(&module, kind, &reference, mime.as_deref(), options) {
                Ok(()) => print_content(&module),
                Err(e) => {
                    print_error(&e);
                    ExitCode::FAILURE
                }
            }
        }
        Command::Sweep { root } => {
            let store = TempArtifactStore::new(root.join("cache"));
            let removed = store.sweep_stale(config.temp_retention());
            println!("{removed}");
            ExitCode::SUCCESS
        }
    }
}

fn run_copy(
    module: &MediaClipboardModule,
    kind: Kind,
    reference: &str,
    mime: Option<&str>,
    options: CopyOptions,
) -> Result<(), CommandError> {
    let pending = match kind {
        Kind::Text => return module.copy_text(reference),
        Kind::Image => module.copy_image(reference, options),
        Kind::Video => module.copy_video(reference, options),
        Kind::Audio => module.copy_audio(reference, options),
        Kind::Pdf => module.copy_pdf(reference, options),
        Kind::File => module.copy_file(reference, mime, options),
        Kind::LargeFile => module.copy_large_file(reference, mime, options),
    };
    pending.wait_blocking()
}

fn print_content(module: &MediaClipboardModule) -> ExitCode {
    match module.get_content() {
        Ok(content) => match serde_json::to_string_pretty(&content) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("media-clipboard: {e}");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            print_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn print_error(error: &CommandError) {
    match serde_json::to_string_pretty(error) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!("{error}"),
    }
}
