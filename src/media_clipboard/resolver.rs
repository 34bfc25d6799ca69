//! # 资源路径解析模块
//!
//! ## 设计思路
//!
//! 宿主运行时的打包器会把资源挪到运行期才确定的位置，调用方只知道资源名。
//! 解析器按固定优先级探测 “基础目录 × 子路径模板” 的笛卡尔积，返回第一个存在的候选。
//! 该顺序是对外约定：越可能放运行期用户资源的目录越靠前。
//!
//! ## 实现思路
//!
//! - 远程地址委托给下载器，下载失败以 `Unresolved(原 URL)` 返回，不在本层区分成败。
//! - 带 `./`、`../` 片段的引用直接拒绝，不做任何文件系统探测。
//! - 绝对路径原样返回，存在性由调用方检查。
//! - 候选路径由迭代器惰性生成（基础目录为外层、模板为内层），命中即短路。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::platform::PathProbe;

use super::{FetchOutcome, ReferenceString, RemoteFetcher, Resolution};

/// 子路径模板，顺序即优先级。
pub const SUB_PATH_TEMPLATES: [&str; 8] = [
    "",
    "assets/",
    "src/assets/",
    "app/assets/",
    "resources/",
    "www/",
    "public/",
    "static/",
];

/// 资源路径解析器。
pub struct AssetPathResolver {
    base_dirs: Vec<PathBuf>,
    probe: Arc<dyn PathProbe>,
    fetcher: Arc<RemoteFetcher>,
}

impl AssetPathResolver {
    pub fn new(
        base_dirs: Vec<PathBuf>,
        probe: Arc<dyn PathProbe>,
        fetcher: Arc<RemoteFetcher>,
    ) -> Self {
        Self {
            base_dirs,
            probe,
            fetcher,
        }
    }

    pub fn base_dirs(&self) -> &[PathBuf] {
        &self.base_dirs
    }

    /// 按优先级惰性生成资源名的全部候选路径。
    pub fn candidates<'a>(&'a self, asset_name: &'a str) -> impl Iterator<Item = PathBuf> + 'a {
        candidate_paths(&self.base_dirs, asset_name)
    }

    /// 解析任意引用字符串（含远程地址）。
    pub async fn resolve(&self, reference: &str) -> Resolution {
        match ReferenceString::parse(reference) {
            ReferenceString::HttpUrl(url) => match self.fetcher.fetch(&url).await {
                FetchOutcome::Cached(path) => Resolution::Resolved(path),
                FetchOutcome::Failed(url) => Resolution::Unresolved(url),
            },
            _ => self.resolve_local(reference),
        }
    }

    /// 解析本地引用；远程地址与 Data URI 不在此处理，原样作为未解析返回。
    pub fn resolve_local(&self, reference: &str) -> Resolution {
        match ReferenceString::parse(reference) {
            ReferenceString::RelativePath(path) => {
                log::warn!("⚠️ 拒绝带 './' 或 '../' 的相对路径: {}", path);
                Resolution::RejectedRelative
            }
            ReferenceString::AbsolutePath(path) => Resolution::Resolved(path),
            ReferenceString::AssetName(name) => self.probe_asset(&name),
            ReferenceString::DataUri(raw)
            | ReferenceString::HttpUrl(raw)
            | ReferenceString::ContentUri(raw) => Resolution::Unresolved(raw),
        }
    }

    fn probe_asset(&self, asset_name: &str) -> Resolution {
        match self.candidates(asset_name).find(|candidate| self.probe.exists(candidate)) {
            Some(found) => {
                log::debug!("📂 找到资源: {}", found.display());
                Resolution::Resolved(found)
            }
            None => {
                log::debug!("🔍 未找到资源，保留原始路径: {}", asset_name);
                Resolution::Unresolved(asset_name.to_string())
            }
        }
    }
}

fn candidate_paths<'a>(
    base_dirs: &'a [PathBuf],
    asset_name: &'a str,
) -> impl Iterator<Item = PathBuf> + 'a {
    base_dirs.iter().flat_map(move |base| {
        SUB_PATH_TEMPLATES
            .into_iter()
            .map(move |template| join_template(base, template, asset_name))
    })
}

fn join_template(base: &Path, template: &str, asset_name: &str) -> PathBuf {
    base.join(format!("{}{}", template, asset_name))
}
