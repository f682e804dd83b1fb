//! 内容分类子模块
//!
//! ## 职责
//! - 根据剪贴板上表示的类型描述符集合，判定快照的语义类型
//! - 按优先级取首个命中：纯文本（裸文本或文本 + 富文本伴随类型）→
//!   图片 → 文件列表（全部 `file://` 方案）→ 纯文本兜底 → 其他
//!
//! ## 输入/输出
//! - 输入：`&mut dyn ClipboardReader`
//! - 输出：`Option<ClipboardContent>`；空的或完全不可读的剪贴板
//!   返回 `None`，不产出条目也不报错

use std::path::PathBuf;

use super::ClipboardReader;
use crate::model::ClipboardContent;

/// 纯文本表示的类型描述符
const PLAIN_TEXT_TYPES: &[&str] = &["public.utf8-plain-text", "public.plain-text", "text/plain"];

/// 已知的"富文本伴随类型"：复制富文本时与纯文本一同出现
const RICH_TEXT_COMPANIONS: &[&str] = &["public.rtf", "public.html", "text/rtf", "text/html"];

fn is_plain_text(descriptor: &str) -> bool {
    PLAIN_TEXT_TYPES.contains(&descriptor)
}

fn is_rich_companion(descriptor: &str) -> bool {
    RICH_TEXT_COMPANIONS.contains(&descriptor)
}

/// `file://` URL → 绝对路径；非 file 方案返回 `None`
fn file_url_to_path(url: &str) -> Option<PathBuf> {
    let rest = url.strip_prefix("file://")?;
    // "file:///a/b" 去掉前缀后以 '/' 开头；带主机名的形式不支持
    if rest.starts_with('/') {
        Some(PathBuf::from(rest))
    } else {
        None
    }
}

/// 对当前剪贴板快照分类
///
/// 优先级规则（首个命中即返回）：
/// 1. 存在纯文本表示，且表示集是裸文本（仅 1 个类型）或
///    "文本 + 富文本伴随类型"（恰 2 个类型）→ `Text`
/// 2. 图片表示可解码 → `Image`
/// 3. 文件 URL 表示可解码且**全部**为 `file://` 方案 → `FileList`
/// 4. 存在纯文本表示（富文本等组合的兜底）→ `Text`
/// 5. 以上皆否 → `Other`（类型名拼接）
pub fn classify(reader: &mut dyn ClipboardReader) -> Option<ClipboardContent> {
    let types = reader.available_types();
    if types.is_empty() {
        return None;
    }

    let has_plain_text = types.iter().any(|t| is_plain_text(t));

    // 1. 裸文本，或文本 + 富文本伴随类型
    if has_plain_text {
        let bare_text = types.len() == 1
            || (types.len() == 2
                && types
                    .iter()
                    .filter(|t| !is_plain_text(t))
                    .all(|t| is_rich_companion(t)));
        if bare_text {
            if let Some(text) = reader.read_text() {
                return Some(ClipboardContent::Text(text));
            }
        }
    }

    // 2. 图片
    if let Some(image) = reader.read_image() {
        return Some(ClipboardContent::Image(image));
    }

    // 3. 文件列表：所有 URL 必须都是 file 方案
    let urls = reader.read_file_urls();
    if !urls.is_empty() {
        let paths: Option<Vec<PathBuf>> = urls.iter().map(|url| file_url_to_path(url)).collect();
        if let Some(paths) = paths {
            return Some(ClipboardContent::FileList(paths));
        }
    }

    // 4. 纯文本兜底（未被规则 1 捕获的富文本 / 混合组合）
    if has_plain_text {
        if let Some(text) = reader.read_text() {
            return Some(ClipboardContent::Text(text));
        }
    }

    // 5. 其他：记录类型名
    Some(ClipboardContent::Other(types.join(", ")))
}
