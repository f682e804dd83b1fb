//! 剪贴板采集模块
//!
//! # 设计思路
//!
//! 统一管理剪贴板相关的核心能力：
//! - **读取抽象**：`ClipboardReader` 描述核心所需的全部系统剪贴板能力
//!   （单调变化计数 + 各类型表示的读取），由平台适配层实现。
//! - **变化检测**：`ClipboardMonitor` 通过比较变化计数判断剪贴板是否
//!   被写入，变化时交给分类器产出内容并写入历史存储。
//! - **分类**：识别快照的语义类型，归 `classify` 子模块。
//!
//! # 实现思路
//!
//! - 监控器只读剪贴板，绝不写入。
//! - 调度显式化：宿主（定时器 / 事件循环 / 测试）按固定短周期调用
//!   `tick()`，计数未变时本次调用零成本返回。
//! - 瞬态读取失败（本次 tick 读不到内容）不产出条目、不算错误。
//! - 构造时用当前计数预热 `last_change_count`，启动前已有的
//!   剪贴板内容不会被采集。

pub mod classify;
pub mod system;

use crate::error::AppError;
use crate::history::HistoryStore;
use crate::model::{ClipItem, ImageData};

/// 默认轮询周期（毫秒）
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 300;

/// 系统剪贴板读取抽象（外部协作者接口）
pub trait ClipboardReader {
    /// 单调递增的变化计数，每次剪贴板被写入时增加
    fn change_count(&mut self) -> u64;

    /// 当前剪贴板上所有表示的类型描述符
    fn available_types(&mut self) -> Vec<String>;

    /// 读取纯文本表示
    fn read_text(&mut self) -> Option<String>;

    /// 解码图片表示
    fn read_image(&mut self) -> Option<ImageData>;

    /// 读取文件 URL 表示（`file://` 形式的 URL 串）
    fn read_file_urls(&mut self) -> Vec<String>;
}

/// 剪贴板变化监控器
///
/// 宿主调度器按周期调用 [`tick`](ClipboardMonitor::tick)；
/// 监控器自身不持有定时器，也不持有历史存储。
pub struct ClipboardMonitor {
    reader: Box<dyn ClipboardReader>,
    last_change_count: u64,
}

impl ClipboardMonitor {
    /// 创建监控器并以当前计数预热
    pub fn new(mut reader: Box<dyn ClipboardReader>) -> Self {
        let last_change_count = reader.change_count();
        Self {
            reader,
            last_change_count,
        }
    }

    /// 一次调度节拍
    ///
    /// 计数未变时空操作；变化时更新计数、分类快照，
    /// 产出内容则写入历史存储。
    pub fn tick(&mut self, history: &mut HistoryStore) -> Result<(), AppError> {
        let current = self.reader.change_count();
        if current == self.last_change_count {
            return Ok(());
        }
        self.last_change_count = current;

        let Some(content) = classify::classify(self.reader.as_mut()) else {
            log::debug!("剪贴板变化但本次读不到内容，跳过");
            return Ok(());
        };

        history.add_item(ClipItem::new(content))
    }
}
