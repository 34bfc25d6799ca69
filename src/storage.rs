//! 临时产物存储模块
//!
//! # 设计思路
//!
//! 模块自己生成的文件（URL 下载缓存、Base64 解码结果）统一由 `TempArtifactStore` 管理：
//! 命名、登记、按年龄清扫、模块销毁时全部删除。
//! 存储对象由模块实例持有并注入到下载器与编排器，不使用全局列表。
//!
//! # 实现思路
//!
//! - 文件名 = 前缀 + 毫秒时间戳 + 随机小数 + 扩展名；碰撞概率可忽略但并非为零，
//!   碰撞最多覆盖同一批次里的另一个临时文件，不会波及调用方原始文件。
//! - `sweep_stale` 扫描整个缓存目录中带 `clipboard_` 前缀的文件，
//!   与是否仍在登记集合中无关（进程重启后内存登记会丢失）。
//! - `teardown` 无条件删除所有登记文件并清空集合；删除失败只记日志。
//! - 运行时内的调用走 `sweep_stale_blocking`，目录扫描与删除放进 `spawn_blocking`。
//! - 已知竞态：若 teardown 时仍有下载在进行，其文件可能被提前删除。
//!   teardown 只发生在模块生命周期结束，接受该情况。

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// 清扫逻辑依赖的文件名前缀。
pub const TEMP_FILE_PREFIX: &str = "clipboard_";
/// Base64 解码产物的前缀。
pub const DECODED_IMAGE_PREFIX: &str = "clipboard_image";

/// 模块创建的一个临时文件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempArtifact {
    pub path: PathBuf,
    pub created_at: SystemTime,
    /// 创建来源（如 `download`、`data-uri`），仅用于诊断。
    pub owner_tag: String,
}

/// 临时产物存储。
#[derive(Debug)]
pub struct TempArtifactStore {
    cache_dir: PathBuf,
    tracked: Mutex<Vec<TempArtifact>>,
}

static NAME_JITTER_STATE: AtomicU64 = AtomicU64::new(0);

fn seed_jitter_state() -> u64 {
    let time_seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let mut state = time_seed ^ ((std::process::id() as u64) << 32) ^ 0x9E37_79B9_7F4A_7C15;
    if state == 0 {
        state = 0xA5A5_5A5A_0123_4567;
    }
    state
}

fn next_jitter_u64() -> u64 {
    let mut current = NAME_JITTER_STATE.load(Ordering::Relaxed);

    loop {
        let seeded = if current == 0 {
            seed_jitter_state()
        } else {
            current
        };

        let mut next = seeded;
        next ^= next << 13;
        next ^= next >> 7;
        next ^= next << 17;

        match NAME_JITTER_STATE.compare_exchange_weak(current, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(observed) => current = observed,
        }
    }
}

/// `[0, 1000)` 区间内的随机小数。
fn random_fraction() -> f64 {
    (next_jitter_u64() >> 11) as f64 / (1_u64 << 53) as f64 * 1000.0
}

impl TempArtifactStore {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            tracked: Mutex::new(Vec::new()),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn tracked_guard(&self) -> MutexGuard<'_, Vec<TempArtifact>> {
        self.tracked.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 生成唯一文件名：`<prefix>_<毫秒时间戳>_<随机小数>.<extension>`。
    pub fn create_name(prefix: &str, extension: &str) -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        format!(
            "{}_{}_{:.3}.{}",
            prefix,
            millis,
            random_fraction(),
            extension.trim_start_matches('.')
        )
    }

    /// 在缓存目录中分配一个新文件路径并立即登记（文件尚未创建）。
    pub fn allocate(&self, prefix: &str, extension: &str, owner_tag: &str) -> std::io::Result<PathBuf> {
        fs::create_dir_all(&self.cache_dir)?;
        let path = self.cache_dir.join(Self::create_name(prefix, extension));
        self.register(&path, owner_tag);
        Ok(path)
    }

    /// 登记一个路径。
    pub fn register(&self, path: &Path, owner_tag: &str) {
        let mut tracked = self.tracked_guard();
        if tracked.iter().any(|artifact| artifact.path == path) {
            return;
        }
        tracked.push(TempArtifact {
            path: path.to_path_buf(),
            created_at: SystemTime::now(),
            owner_tag: owner_tag.to_string(),
        });
    }

    /// 当前登记的全部产物快照。
    pub fn tracked(&self) -> Vec<TempArtifact> {
        self.tracked_guard().clone()
    }

    pub fn is_tracked(&self, path: &Path) -> bool {
        self.tracked_guard().iter().any(|artifact| artifact.path == path)
    }

    /// 删除缓存目录中所有带 `clipboard_` 前缀且修改时间早于 `max_age` 的文件。
    ///
    /// 返回删除数量。目录不存在视为无事可做；单个文件失败只记日志。
    pub fn sweep_stale(&self, max_age: Duration) -> usize {
        let entries = match fs::read_dir(&self.cache_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return 0,
            Err(e) => {
                log::warn!("⚠️ 扫描缓存目录失败 '{}': {}", self.cache_dir.display(), e);
                return 0;
            }
        };

        let now = SystemTime::now();
        let mut removed = Vec::new();

        for entry in entries.flatten() {
            let name = entry.file_name();
            if !name.to_string_lossy().starts_with(TEMP_FILE_PREFIX) {
                continue;
            }

            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if !metadata.is_file() {
                continue;
            }

            let age = metadata
                .modified()
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .unwrap_or_default();
            if age <= max_age {
                continue;
            }

            let path = entry.path();
            match fs::remove_file(&path) {
                Ok(()) => {
                    log::debug!("🧹 已清理过期临时文件: {}", path.display());
                    removed.push(path);
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => log::warn!("⚠️ 删除过期临时文件失败 '{}': {}", path.display(), e),
            }
        }

        if !removed.is_empty() {
            self.tracked_guard()
                .retain(|artifact| !removed.contains(&artifact.path));
        }

        removed.len()
    }

    /// 在阻塞线程池中执行 [`Self::sweep_stale`]，供运行时内的异步任务调用。
    pub async fn sweep_stale_blocking(self: &Arc<Self>, max_age: Duration) -> usize {
        let store = Arc::clone(self);
        tokio::task::spawn_blocking(move || store.sweep_stale(max_age))
            .await
            .unwrap_or_else(|e| {
                log::warn!("⚠️ 清扫线程执行失败：{}", e);
                0
            })
    }

    /// 删除所有登记文件并清空登记集合，返回实际删除数量。
    pub fn teardown(&self) -> usize {
        let artifacts = std::mem::take(&mut *self.tracked_guard());
        let mut deleted = 0;

        for artifact in artifacts {
            match fs::remove_file(&artifact.path) {
                Ok(()) => {
                    deleted += 1;
                    log::debug!("🗑️ 已删除临时文件: {}", artifact.path.display());
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => log::error!(
                    "删除临时文件失败 '{}'（来源 {}）: {}",
                    artifact.path.display(),
                    artifact.owner_tag,
                    e
                ),
            }
        }

        deleted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn age_file(path: &Path, age: Duration) {
        let file = File::options().write(true).open(path).expect("open for mtime failed");
        file.set_modified(SystemTime::now() - age).expect("set mtime failed");
    }

    #[test]
    fn create_name_combines_prefix_timestamp_fraction_and_extension() {
        let name = TempArtifactStore::create_name("clipboard_image", "png");

        assert!(name.starts_with("clipboard_image_"));
        assert!(name.ends_with(".png"));

        let middle = &name["clipboard_image_".len()..name.len() - ".png".len()];
        let (millis, fraction) = middle.split_once('_').expect("missing fraction separator");
        assert!(millis.parse::<i64>().is_ok());
        let fraction: f64 = fraction.parse().expect("fraction should be numeric");
        assert!((0.0..=1000.0).contains(&fraction));
    }

    #[test]
    fn consecutive_names_differ() {
        let a = TempArtifactStore::create_name("clipboard", "dat");
        let b = TempArtifactStore::create_name("clipboard", "dat");
        assert_ne!(a, b);
    }

    #[test]
    fn sweep_deletes_old_prefixed_files_and_keeps_young_ones() {
        let dir = tempfile::tempdir().expect("tempdir failed");
        let store = TempArtifactStore::new(dir.path());

        let old = dir.path().join("clipboard_old_1.png");
        let young = dir.path().join("clipboard_young_1.png");
        let foreign = dir.path().join("user_photo.png");
        for path in [&old, &young, &foreign] {
            fs::write(path, b"x").expect("write failed");
        }
        age_file(&old, Duration::from_secs(3601 + 60));
        age_file(&foreign, Duration::from_secs(7200));
        store.register(&old, "download");

        let removed = store.sweep_stale(Duration::from_secs(3600));

        assert_eq!(removed, 1);
        assert!(!old.exists());
        assert!(young.exists());
        assert!(foreign.exists());
        assert!(!store.is_tracked(&old));
    }

    #[test]
    fn sweep_covers_untracked_files_from_previous_process() {
        let dir = tempfile::tempdir().expect("tempdir failed");
        let store = TempArtifactStore::new(dir.path());

        let orphan = dir.path().join("clipboard_image_1_2.jpg");
        fs::write(&orphan, b"x").expect("write failed");
        age_file(&orphan, Duration::from_secs(2 * 3600));

        assert_eq!(store.sweep_stale(Duration::from_secs(3600)), 1);
        assert!(!orphan.exists());
    }

    #[test]
    fn sweep_on_missing_directory_is_noop() {
        let dir = tempfile::tempdir().expect("tempdir failed");
        let store = TempArtifactStore::new(dir.path().join("missing"));
        assert_eq!(store.sweep_stale(Duration::from_secs(1)), 0);
    }

    #[tokio::test]
    async fn blocking_sweep_runs_off_the_async_worker() {
        let dir = tempfile::tempdir().expect("tempdir failed");
        let store = Arc::new(TempArtifactStore::new(dir.path()));

        let stale = dir.path().join("clipboard_stale_1.mp4");
        fs::write(&stale, b"x").expect("write failed");
        age_file(&stale, Duration::from_secs(2 * 3600));
        store.register(&stale, "download");

        assert_eq!(store.sweep_stale_blocking(Duration::from_secs(3600)).await, 1);
        assert!(!stale.exists());
        assert!(store.tracked().is_empty());
    }

    #[test]
    fn teardown_deletes_every_tracked_file_and_empties_the_set() {
        let dir = tempfile::tempdir().expect("tempdir failed");
        let store = TempArtifactStore::new(dir.path().join("cache"));

        let a = store.allocate("clipboard_image", "png", "data-uri").expect("allocate failed");
        let b = store.allocate("clipboard_photo", "jpg", "download").expect("allocate failed");
        fs::write(&a, b"a").expect("write failed");
        fs::write(&b, b"b").expect("write failed");
        // 登记了但从未写出的文件也不影响 teardown
        store.allocate("clipboard_partial", "dat", "download").expect("allocate failed");

        assert_eq!(store.tracked().len(), 3);
        assert_eq!(store.teardown(), 2);
        assert!(!a.exists());
        assert!(!b.exists());
        assert!(store.tracked().is_empty());
    }

    #[test]
    fn register_ignores_duplicates() {
        let store = TempArtifactStore::new("/tmp/unused");
        let path = Path::new("/tmp/unused/clipboard_a.png");
        store.register(path, "download");
        store.register(path, "download");
        assert_eq!(store.tracked().len(), 1);
    }
}
