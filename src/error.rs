//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，替代各模块中分散的
//! `.map_err(|e| e.to_string())`、`format!(...)`、`expect()` 等不一致模式。
//!
//! 本子系统的错误语义（见各模块文档）：瞬态剪贴板读取失败、
//! 损坏的持久化记录等都在模块内部降级处理，不会以 `AppError`
//! 形式冒泡；真正返回 `Err` 的只有存储后端与序列化失败，
//! 调用方记录日志后继续运行，不存在致命路径。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `std::io::Error` 提供 `From` 转换，无需手动 map。

/// 应用级统一错误类型
///
/// 所有可失败的公开操作均返回此类型，确保调用方收到一致的错误格式。
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 剪贴板读写操作失败
    #[error("剪贴板操作失败: {0}")]
    Clipboard(String),

    /// 持久化存储（序列化 / 设置文件 / 目录）失败
    #[error("存储操作失败: {0}")]
    Storage(String),

    /// SQLite 键值库操作失败
    #[error("数据库错误: {0}")]
    Database(String),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),
}
