//! # clipdeck — 剪贴板历史与标签集合引擎
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │            宿主 / 展示层（外部协作者，不在本库内）         │
//! │      定时器驱动 tick() ── 订阅 StoreEvent ── 调用操作      │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕ 公开操作 (Result<T, AppError>)
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕                 核心 (Rust)                      │
//! │                                                          │
//! │  ┌─ error ────── AppError (统一错误类型)                  │
//! │  │                                                       │
//! │  ├─ clipboard ── ClipboardReader + 变化计数监控            │
//! │  │   ├─ classify   类型描述符 → 语义分类                  │
//! │  │   └─ system     arboard 适配（合成变化计数）            │
//! │  │                                                       │
//! │  ├─ history ──── 有界·去重·分页·持久化的默认历史           │
//! │  ├─ tabs ─────── 命名标签集合（前移去重 + 默认标签自愈）   │
//! │  │                                                       │
//! │  ├─ persist ──── 条目 ↔ 带类型标签的持久化记录            │
//! │  ├─ storage ──── KvStorage 抽象 + SQLite 键值实现         │
//! │  └─ settings ─── settings.json（容量 / 分页 / 轮询周期）  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，所有可失败操作的返回类型 |
//! | [`model`] | 内容和类型、条目、内容等价与检索投影、变更事件 |
//! | [`clipboard`] | 剪贴板读取抽象、变化检测 `tick()`、内容分类、系统适配 |
//! | [`history`] | 默认历史：容量淘汰、丢弃式去重、分页窗口、全量搜索 |
//! | [`tabs`] | 标签集合：前移式去重、拖拽排序、默认标签自愈 |
//! | [`persist`] | 持久化记录编解码（`Image` 不落盘，未知类型容忍） |
//! | [`storage`] | 键值存储抽象与 SQLite / 内存实现 |
//! | [`settings`] | 运行参数（容量、分页大小、轮询周期）加载与保存 |
//!
//! ## 并发模型
//!
//! 单一逻辑执行上下文：轮询 tick、存储变更、持久化写入串行进行。
//! 唯一的"挂起点"是分页加载的两段式令牌边界，重叠的加载请求被
//! `is_loading` 守卫拒绝而不是排队。宿主停机时先停掉驱动 `tick()`
//! 的定时器，再析构各存储。

pub mod error;
pub mod model;
pub mod clipboard;
pub mod history;
pub mod tabs;
pub mod persist;
pub mod storage;
pub mod settings;
