//! 持久化编解码模块
//!
//! # 设计思路
//!
//! 将 `ClipItem` 与持久化记录 `PersistedRecord` 互相转换：
//! - **编码**：`Image` 内容不可持久化，`encode` 返回 `None`，
//!   其余类型生成带 `type` 标签的记录。
//! - **解码**：未知 `type` 标签返回 `None`（向前兼容 / 容忍损坏），
//!   条目级损坏只丢弃该条，整体 JSON 损坏降级为空列表，永不致命。
//!
//! # 实现思路
//!
//! - 记录格式沿用历史数据的字段名：`id` / `type` / `content` / `timestamp`。
//! - 文件列表负载为换行拼接的绝对路径；文本与描述符负载为原始字符串。
//! - 列表序列化为 JSON 数组字节串，由调用方决定写到哪个存储键。
//! - 逐条目容错：先解析为 `serde_json::Value` 数组，再逐条转换，
//!   单条失败不影响其余条目。

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::model::{ClipItem, ClipboardContent};

/// 默认历史的存储键
pub const KEY_HISTORY: &str = "clipboard.default.history";
/// 标签元数据的存储键
pub const KEY_TABS: &str = "clipboard.tabs";
/// 标签条目列表的存储键
pub const KEY_TAB_ITEMS: &str = "clipboard.tab.items";

const KIND_TEXT: &str = "text";
const KIND_FILE: &str = "file";
const KIND_OTHER: &str = "other";

/// 可持久化的条目记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedRecord {
    pub id: Uuid,
    /// 类型标签：`text` / `file` / `other`
    #[serde(rename = "type")]
    pub kind: String,
    /// 按类型规范化后的负载字符串
    pub content: String,
    /// Unix 毫秒时间戳
    pub timestamp: i64,
}

/// 条目 → 记录
///
/// `Image` 内容仅存在于会话中，返回 `None`。
pub fn encode(item: &ClipItem) -> Option<PersistedRecord> {
    let (kind, content) = match &item.content {
        ClipboardContent::Text(text) => (KIND_TEXT, text.clone()),
        ClipboardContent::Image(_) => return None,
        ClipboardContent::FileList(paths) => (
            KIND_FILE,
            paths
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        ClipboardContent::Other(descriptor) => (KIND_OTHER, descriptor.clone()),
    };
    Some(PersistedRecord {
        id: item.id,
        kind: kind.to_string(),
        content,
        timestamp: item.timestamp,
    })
}

/// 记录 → 条目
///
/// `id` 与时间戳原样恢复；未知类型标签返回 `None`。
pub fn decode(record: &PersistedRecord) -> Option<ClipItem> {
    let content = match record.kind.as_str() {
        KIND_TEXT => ClipboardContent::Text(record.content.clone()),
        KIND_FILE => ClipboardContent::FileList(
            record
                .content
                .split('\n')
                .filter(|line| !line.is_empty())
                .map(PathBuf::from)
                .collect(),
        ),
        KIND_OTHER => ClipboardContent::Other(record.content.clone()),
        unknown => {
            log::warn!("跳过未知类型的持久化记录: type='{}'", unknown);
            return None;
        }
    };
    Some(ClipItem {
        id: record.id,
        content,
        timestamp: record.timestamp,
    })
}

/// 将条目列表编码为 JSON 字节串
///
/// 不可持久化的条目（`Image`）被静默跳过。
pub fn encode_items(items: &[ClipItem]) -> Result<Vec<u8>, AppError> {
    let records: Vec<PersistedRecord> = items.iter().filter_map(encode).collect();
    serde_json::to_vec(&records)
        .map_err(|e| AppError::Storage(format!("序列化剪贴板记录失败: {}", e)))
}

/// 从 JSON 字节串解码条目列表（逐条容错）
///
/// 整体解析失败返回空列表；单条损坏或类型未知的记录被丢弃，
/// 其余记录正常加载。
pub fn decode_items(bytes: &[u8]) -> Vec<ClipItem> {
    let values: Vec<serde_json::Value> = match serde_json::from_slice(bytes) {
        Ok(values) => values,
        Err(err) => {
            log::warn!("解析剪贴板历史失败，按空历史处理: {}", err);
            return Vec::new();
        }
    };

    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<PersistedRecord>(value) {
            Ok(record) => decode(&record),
            Err(err) => {
                log::warn!("跳过损坏的持久化记录: {}", err);
                None
            }
        })
        .collect()
}
