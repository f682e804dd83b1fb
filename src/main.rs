//! # clipdeck — 守护进程入口
//!
//! 本文件仅负责组合根：初始化日志与设置、打开存储后端、
//! 构造历史与标签存储、接上系统剪贴板适配器，并用定时器
//! 驱动监控器的 `tick()`。业务逻辑分布在各子模块中，
//! 详见 `lib.rs` 架构文档。

use std::path::PathBuf;
use std::time::Duration;

use clipdeck::clipboard::system::SystemClipboard;
use clipdeck::clipboard::ClipboardMonitor;
use clipdeck::error::AppError;
use clipdeck::history::HistoryStore;
use clipdeck::settings;
use clipdeck::storage::{shared, SqliteStorage};
use clipdeck::tabs::TabStore;

fn data_dir() -> Result<PathBuf, AppError> {
    dirs::data_dir()
        .map(|dir| dir.join("clipdeck"))
        .ok_or_else(|| AppError::Storage("获取应用数据目录失败".to_string()))
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let data_dir = data_dir()?;
    let settings = settings::load(&settings::settings_file_path(&data_dir));
    let poll_interval = Duration::from_millis(settings.normalized_poll_interval_ms());
    log::info!(
        "启动: 容量={} 每页={} 轮询={}ms",
        settings.max_history_items,
        settings.page_size,
        poll_interval.as_millis()
    );

    let storage = shared(SqliteStorage::open(&data_dir.join("clipdeck.db"))?);
    let mut history = HistoryStore::new(
        storage.clone(),
        settings.max_history_items,
        settings.page_size,
    );
    let tab_store = TabStore::new(storage);
    log::info!(
        "历史 {} 条，标签 {} 个",
        history.total_count(),
        tab_store.tabs().len()
    );

    let mut monitor = ClipboardMonitor::new(Box::new(SystemClipboard::new()?));
    log::info!("📋 剪贴板监控已启动");

    let mut ticker = tokio::time::interval(poll_interval);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(err) = monitor.tick(&mut history) {
                    log::warn!("保存剪贴板条目失败: {}", err);
                }
            }
            _ = &mut ctrl_c => {
                break;
            }
        }
    }

    // 先停定时器与监控器，再析构存储
    drop(monitor);
    log::info!("📋 剪贴板监控已停止，退出");
    Ok(())
}
