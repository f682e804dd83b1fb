//! 系统剪贴板适配子模块
//!
//! ## 职责
//! - 基于 `arboard` 实现 [`ClipboardReader`](super::ClipboardReader)
//! - 合成单调变化计数：`arboard` 不暴露系统的 changeCount，
//!   这里对快照取轻量指纹（文本哈希 + 图片尺寸），指纹变化时计数 +1
//!
//! ## 错误语义
//! - 某一类型读取失败视为该表示不存在（瞬态失败，不冒泡）
//! - 仅 `Clipboard::new()` 失败返回 `AppError::Clipboard`
//!
//! 注意：指纹只用于变化检测，不参与内容去重；图片指纹取
//! 尺寸与字节数而非内容哈希。`arboard` 不支持文件列表表示，
//! 本适配器的 `read_file_urls` 恒为空。

use std::hash::{DefaultHasher, Hash, Hasher};

use arboard::Clipboard;

use super::ClipboardReader;
use crate::error::AppError;
use crate::model::ImageData;

/// 快照指纹：仅用于检测变化，不做内容级去重
#[derive(Debug, Clone, PartialEq, Eq)]
struct Fingerprint {
    text_hash: Option<u64>,
    /// (宽, 高, 字节数)
    image_meta: Option<(usize, usize, usize)>,
}

impl Fingerprint {
    fn of(text: Option<&str>, image: Option<&ImageData>) -> Self {
        let text_hash = text.map(|text| {
            let mut hasher = DefaultHasher::new();
            text.hash(&mut hasher);
            hasher.finish()
        });
        let image_meta = image.map(|image| (image.width, image.height, image.bytes.len()));
        Self { text_hash, image_meta }
    }

    fn is_empty(&self) -> bool {
        self.text_hash.is_none() && self.image_meta.is_none()
    }
}

/// 当前变化对应的缓存快照，供各 read 方法复用
#[derive(Default)]
struct Snapshot {
    text: Option<String>,
    image: Option<ImageData>,
}

/// `arboard` 支撑的系统剪贴板读取器
pub struct SystemClipboard {
    clipboard: Clipboard,
    counter: u64,
    fingerprint: Fingerprint,
    snapshot: Snapshot,
}

impl SystemClipboard {
    pub fn new() -> Result<Self, AppError> {
        let clipboard = Clipboard::new()
            .map_err(|e| AppError::Clipboard(format!("打开系统剪贴板失败: {}", e)))?;
        Ok(Self {
            clipboard,
            counter: 0,
            fingerprint: Fingerprint { text_hash: None, image_meta: None },
            snapshot: Snapshot::default(),
        })
    }

    fn take_snapshot(&mut self) -> (Snapshot, Fingerprint) {
        let text = self.clipboard.get_text().ok();
        let image = self.clipboard.get_image().ok().map(|image| ImageData {
            width: image.width,
            height: image.height,
            bytes: image.bytes.into_owned(),
        });
        let fingerprint = Fingerprint::of(text.as_deref(), image.as_ref());
        (Snapshot { text, image }, fingerprint)
    }
}

impl ClipboardReader for SystemClipboard {
    fn change_count(&mut self) -> u64 {
        let (snapshot, fingerprint) = self.take_snapshot();
        if fingerprint != self.fingerprint && !fingerprint.is_empty() {
            self.counter += 1;
            self.fingerprint = fingerprint;
            self.snapshot = snapshot;
            log::trace!("📋 剪贴板指纹变化，计数 -> {}", self.counter);
        }
        self.counter
    }

    fn available_types(&mut self) -> Vec<String> {
        let mut types = Vec::new();
        if self.snapshot.text.is_some() {
            types.push("public.utf8-plain-text".to_string());
        }
        if self.snapshot.image.is_some() {
            types.push("public.png".to_string());
        }
        types
    }

    fn read_text(&mut self) -> Option<String> {
        self.snapshot.text.clone()
    }

    fn read_image(&mut self) -> Option<ImageData> {
        self.snapshot.image.clone()
    }

    fn read_file_urls(&mut self) -> Vec<String> {
        // arboard 不暴露文件列表表示
        Vec::new()
    }
}
