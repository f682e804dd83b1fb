//! 应用设置模块
//!
//! # 设计思路
//!
//! 核心的三个可调参数集中在一个 `settings.json` 中：
//! 历史容量上限、分页大小、轮询周期。文件缺失或损坏时
//! 回退到默认值，永不致命。
//!
//! # 实现思路
//!
//! - 轮询周期做上下限钳制，避免把 CPU 烧在轮询上或迟钝到不可用。
//! - 读写均走 `serde_json`，保存时使用 pretty 格式便于手工编辑。

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::clipboard::DEFAULT_POLL_INTERVAL_MS;
use crate::error::AppError;

const POLL_INTERVAL_MIN_MS: u64 = 20;
const POLL_INTERVAL_MAX_MS: u64 = 5_000;

/// 核心运行参数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// 默认历史的容量上限
    pub max_history_items: usize,
    /// 每页加载的条目数
    pub page_size: usize,
    /// 剪贴板轮询周期（毫秒，读取时钳制到 20..=5000）
    pub poll_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_history_items: 500,
            page_size: 20,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl Settings {
    /// 钳制后的轮询周期
    pub fn normalized_poll_interval_ms(&self) -> u64 {
        self.poll_interval_ms
            .clamp(POLL_INTERVAL_MIN_MS, POLL_INTERVAL_MAX_MS)
    }
}

/// 设置文件路径（数据目录下的 `settings.json`）
pub fn settings_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join("settings.json")
}

/// 加载设置；文件缺失或损坏时返回默认值
pub fn load(path: &Path) -> Settings {
    if !path.exists() {
        return Settings::default();
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            log::warn!("读取设置文件失败，使用默认设置: {}", err);
            return Settings::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(settings) => settings,
        Err(err) => {
            log::warn!("解析设置文件失败，使用默认设置: {}", err);
            Settings::default()
        }
    }
}

/// 保存设置
pub fn save(path: &Path, settings: &Settings) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::Storage(format!("创建设置目录失败: {}", e)))?;
    }
    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| AppError::Storage(format!("序列化设置失败: {}", e)))?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{load, save, Settings};

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("clipdeck-settings-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn defaults_when_file_is_missing() {
        let settings = load(std::path::Path::new("/definitely/not/here.json"));
        assert_eq!(settings.max_history_items, 500);
        assert_eq!(settings.page_size, 20);
        assert_eq!(settings.poll_interval_ms, 300);
    }

    #[test]
    fn default_poll_interval_matches_monitor_constant() {
        let settings = Settings::default();
        assert_eq!(
            settings.poll_interval_ms,
            crate::clipboard::DEFAULT_POLL_INTERVAL_MS
        );
        // 默认值本身就在钳制范围内
        assert_eq!(
            settings.normalized_poll_interval_ms(),
            settings.poll_interval_ms
        );
    }

    #[test]
    fn poll_interval_is_clamped() {
        let mut settings = Settings::default();
        settings.poll_interval_ms = 5;
        assert_eq!(settings.normalized_poll_interval_ms(), 20);
        settings.poll_interval_ms = 80;
        assert_eq!(settings.normalized_poll_interval_ms(), 80);
        settings.poll_interval_ms = 60_000;
        assert_eq!(settings.normalized_poll_interval_ms(), 5_000);
    }

    #[test]
    fn save_then_load_roundtrips() {
        let path = temp_path("roundtrip");
        let settings = Settings {
            max_history_items: 42,
            page_size: 7,
            poll_interval_ms: 150,
        };
        save(&path, &settings).expect("save settings");

        let loaded = load(&path);
        assert_eq!(loaded.max_history_items, 42);
        assert_eq!(loaded.page_size, 7);
        assert_eq!(loaded.poll_interval_ms, 150);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn garbled_file_falls_back_to_defaults() {
        let path = temp_path("garbled");
        std::fs::write(&path, "{not json").expect("write garbage");

        let loaded = load(&path);
        assert_eq!(loaded.max_history_items, 500);

        let _ = std::fs::remove_file(&path);
    }
}
