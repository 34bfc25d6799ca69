//! 桌面端剪贴板后端（`desktop` feature）。
//!
//! 桌面系统剪贴板没有“URI + 授权”这种记录形态，URI 记录退化为写入其 URI 文本。
//! 读取时若剪贴板文本仍等于最近写入的 URI，则还原为当时的 URI 记录。

use std::sync::{Mutex, PoisonError};

use super::{ClipRecord, ClipboardService, PlatformError};

pub struct ArboardClipboard {
    inner: Mutex<arboard::Clipboard>,
    last_uri_record: Mutex<Option<ClipRecord>>,
}

impl ArboardClipboard {
    pub fn new() -> Result<Self, PlatformError> {
        let clipboard = arboard::Clipboard::new()
            .map_err(|e| PlatformError::Unavailable(format!("无法打开系统剪贴板：{}", e)))?;
        Ok(Self {
            inner: Mutex::new(clipboard),
            last_uri_record: Mutex::new(None),
        })
    }
}

impl ClipboardService for ArboardClipboard {
    fn set_primary_clip(&self, record: ClipRecord) -> Result<(), PlatformError> {
        let text = match &record {
            ClipRecord::PlainText { text, .. } => text.clone(),
            ClipRecord::Uri(uri_record) => uri_record.uri.clone(),
        };

        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set_text(text)
            .map_err(|e| PlatformError::Unavailable(format!("写入系统剪贴板失败：{}", e)))?;

        let mut last = self.last_uri_record.lock().unwrap_or_else(PoisonError::into_inner);
        *last = match record {
            ClipRecord::Uri(_) => Some(record),
            ClipRecord::PlainText { .. } => None,
        };
        Ok(())
    }

    fn primary_clip(&self) -> Result<Option<ClipRecord>, PlatformError> {
        let text = match self.inner.lock().unwrap_or_else(PoisonError::into_inner).get_text() {
            Ok(text) => text,
            Err(arboard::Error::ContentNotAvailable) => return Ok(None),
            Err(e) => {
                return Err(PlatformError::Unavailable(format!("读取系统剪贴板失败：{}", e)));
            }
        };

        let last = self.last_uri_record.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(ClipRecord::Uri(uri_record)) = last.as_ref() {
            if uri_record.uri == text {
                return Ok(Some(ClipRecord::Uri(uri_record.clone())));
            }
        }

        Ok(Some(ClipRecord::PlainText {
            label: "text".to_string(),
            text,
        }))
    }

    fn clear_primary_clip(&self) -> Result<(), PlatformError> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear()
            .map_err(|e| PlatformError::Unavailable(format!("清空系统剪贴板失败：{}", e)))?;
        *self.last_uri_record.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
