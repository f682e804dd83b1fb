//! 数据模型模块
//!
//! # 设计思路
//!
//! 定义剪贴板内容的封闭和类型 `ClipboardContent` 与历史条目 `ClipItem`，
//! 以及两条贯穿全系统的规则：
//! - **内容等价**（`same_content`）：按类型判定去重，`Image` 永不等价
//!   （包括与另一张 `Image`），因此故意不实现 `PartialEq`。
//! - **检索投影**（`search_text`）：每种内容到可搜索文本的规范映射，
//!   历史存储与标签集合的搜索共用同一份投影。
//!
//! # 实现思路
//!
//! - 条目 `id` 使用 UUID，创建后不可变，持久化往返保持不变。
//! - 时间戳为 Unix 毫秒（`chrono::Utc::now().timestamp_millis()`）。
//! - 所有消费点（等价、投影、编码）对枚举做穷尽匹配。

use std::collections::BTreeSet;
use std::path::PathBuf;

use uuid::Uuid;

/// `Image` 条目在搜索投影中的固定标签
pub const IMAGE_SEARCH_LABEL: &str = "图片";

/// 不透明位图句柄（RGBA 像素）
///
/// 仅存在于会话内存中，永不持久化，也永不参与内容去重。
#[derive(Debug, Clone)]
pub struct ImageData {
    /// 图像宽度（像素）
    pub width: usize,
    /// 图像高度（像素）
    pub height: usize,
    /// RGBA 字节数组（`width * height * 4`）
    pub bytes: Vec<u8>,
}

/// 剪贴板内容的语义分类
#[derive(Debug, Clone)]
pub enum ClipboardContent {
    /// 纯文本
    Text(String),
    /// 位图（仅会话内，不持久化）
    Image(ImageData),
    /// 文件列表（绝对路径，有序）
    FileList(Vec<PathBuf>),
    /// 其他类型（保存类型描述符串）
    Other(String),
}

impl ClipboardContent {
    /// 内容等价判定（去重规则）
    ///
    /// - `Text` / `Other`：字符串精确相等
    /// - `FileList`：路径**集合**相等（与顺序无关）
    /// - `Image`：永不等价，每次都视为新内容
    /// - 跨类型：永不等价
    pub fn same_content(&self, other: &ClipboardContent) -> bool {
        match (self, other) {
            (ClipboardContent::Text(a), ClipboardContent::Text(b)) => a == b,
            (ClipboardContent::Image(_), ClipboardContent::Image(_)) => false,
            (ClipboardContent::FileList(a), ClipboardContent::FileList(b)) => {
                let a: BTreeSet<&PathBuf> = a.iter().collect();
                let b: BTreeSet<&PathBuf> = b.iter().collect();
                a == b
            }
            (ClipboardContent::Other(a), ClipboardContent::Other(b)) => a == b,
            _ => false,
        }
    }

    /// 检索用的规范文本投影
    ///
    /// 搜索永远针对此投影做大小写不敏感的子串匹配。
    pub fn search_text(&self) -> String {
        match self {
            ClipboardContent::Text(text) => text.clone(),
            ClipboardContent::Image(_) => IMAGE_SEARCH_LABEL.to_string(),
            ClipboardContent::FileList(paths) => paths
                .iter()
                .map(|p| {
                    p.file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_else(|| p.to_string_lossy().into_owned())
                })
                .collect::<Vec<_>>()
                .join(", "),
            ClipboardContent::Other(descriptor) => descriptor.clone(),
        }
    }

    /// 投影是否包含查询串（大小写不敏感）
    pub fn matches(&self, query: &str) -> bool {
        self.search_text()
            .to_lowercase()
            .contains(&query.to_lowercase())
    }
}

/// 剪贴板历史条目
///
/// 创建后不可变；`id` 在条目整个生命周期内稳定，
/// 并且跨持久化往返保持不变。
#[derive(Debug, Clone)]
pub struct ClipItem {
    pub id: Uuid,
    pub content: ClipboardContent,
    /// Unix 毫秒时间戳
    pub timestamp: i64,
}

impl ClipItem {
    /// 以当前时间创建新条目
    pub fn new(content: ClipboardContent) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// 复制出一个内容与时间戳相同、但 `id` 全新的独立条目
    ///
    /// 跨集合的内容副本是彼此独立的实体，各自拥有自己的 `id`。
    pub fn independent_copy(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: self.content.clone(),
            timestamp: self.timestamp,
        }
    }
}

/// 存储变更通知
///
/// 每次变更操作完成后由对应存储主动发出，
/// 取代隐式的属性观察机制；展示层按需订阅。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// 默认历史（全量列表或已加载窗口）发生变化
    HistoryChanged,
    /// 标签列表（创建 / 删除 / 修复）发生变化
    TabListChanged,
    /// 某个标签的条目列表发生变化
    TabItemsChanged(Uuid),
    /// 选中标签发生变化
    SelectionChanged,
}

/// 存储事件订阅者
pub type Subscriber = Box<dyn Fn(&StoreEvent) + Send>;
