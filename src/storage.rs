//! 持久化键值存储模块
//!
//! # 设计思路
//!
//! 核心只依赖一个极小的键值抽象 `KvStorage`（`get` / `set` 字节串），
//! 历史存储与标签集合各自使用独立的键，互不共享可变状态。
//! 生产实现 `SqliteStorage` 将键值对落在单张 SQLite 表里；
//! 测试使用内存实现 `MemoryStorage`，无需临时文件。
//!
//! # 实现思路
//!
//! - SQLite 打开时设置 WAL 与外键，Schema 通过 `PRAGMA user_version`
//!   做幂等初始化与版本校验。
//! - 存储由多个消费者共享（历史 + 标签），统一包在 `Arc<Mutex<...>>`
//!   中，通过 `with_storage` 辅助函数获取锁并映射锁中毒错误。
//! - 写入是变更即写（write-through）：负载很小，不做批量缓冲。

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection};

use crate::error::AppError;

const SCHEMA_VERSION: i64 = 1;

/// 持久化键值存储抽象
///
/// 外部协作者接口：键为稳定字符串，值为不透明字节串。
/// 读不到键返回 `Ok(None)`，不是错误。
pub trait KvStorage: Send {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError>;
    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), AppError>;
}

/// 多个存储消费者共享的键值后端
pub type SharedStorage = Arc<Mutex<Box<dyn KvStorage>>>;

/// 将任意 `KvStorage` 实现包装为可共享句柄
pub fn shared(storage: impl KvStorage + 'static) -> SharedStorage {
    Arc::new(Mutex::new(Box::new(storage)))
}

/// 获取存储锁并执行操作，统一映射锁中毒错误
pub fn with_storage<T>(
    storage: &SharedStorage,
    op: impl FnOnce(&mut dyn KvStorage) -> Result<T, AppError>,
) -> Result<T, AppError> {
    let mut guard = storage
        .lock()
        .map_err(|e| AppError::Storage(format!("获取存储锁失败: {}", e)))?;
    op(guard.as_mut())
}

// ============================================================================
// SQLite 实现
// ============================================================================

/// SQLite 键值存储
///
/// 单表 `kv(key TEXT PRIMARY KEY, value BLOB)`，
/// `set` 使用 UPSERT，变更即落盘。
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// 打开（或创建）指定路径的数据库并初始化 Schema
    pub fn open(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Database(format!("创建数据库目录失败: {}", e)))?;
        }
        let conn = Connection::open(path)
            .map_err(|e| AppError::Database(format!("打开数据库失败: {}", e)))?;
        initialize_schema(&conn)?;
        log::info!("数据库路径: {}", path.display());
        Ok(Self { conn })
    }

    /// 打开内存数据库（测试用）
    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Database(format!("打开内存数据库失败: {}", e)))?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl KvStorage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError> {
        use rusqlite::OptionalExtension;
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, Vec<u8>>(0)
            })
            .optional()
            .map_err(|e| AppError::Database(format!("读取键 '{}' 失败: {}", key, e)))
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), AppError> {
        self.conn
            .execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(|e| AppError::Database(format!("写入键 '{}' 失败: {}", key, e)))?;
        Ok(())
    }
}

fn get_user_version(conn: &Connection) -> Result<i64, AppError> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| AppError::Database(format!("读取数据库版本失败: {}", e)))
}

fn set_user_version(conn: &Connection, version: i64) -> Result<(), AppError> {
    conn.execute_batch(&format!("PRAGMA user_version = {version};"))
        .map_err(|e| AppError::Database(format!("写入数据库版本失败: {}", e)))
}

fn initialize_schema(conn: &Connection) -> Result<(), AppError> {
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
        .ok();

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            value BLOB NOT NULL
        );",
    )
    .map_err(|e| AppError::Database(format!("创建键值表失败: {}", e)))?;

    let mut version = get_user_version(conn)?;
    if version < 1 {
        set_user_version(conn, 1)?;
        version = 1;
    }

    if version != SCHEMA_VERSION {
        return Err(AppError::Database(format!(
            "数据库版本不匹配: current={}, expected={}",
            version, SCHEMA_VERSION
        )));
    }

    Ok(())
}

// ============================================================================
// 内存实现（测试用）
// ============================================================================

/// 内存键值存储，用于测试与无盘运行
#[derive(Default)]
pub struct MemoryStorage {
    map: HashMap<String, Vec<u8>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError> {
        Ok(self.map.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), AppError> {
        self.map.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}
