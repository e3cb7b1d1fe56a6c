//! 统一错误处理模块
//!
//! 定义应用级错误类型，各子模块的错误在边界处转换为 AppError。

use thiserror::Error;

/// 应用错误枚举
#[derive(Error, Debug)]
pub enum AppError {
    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(String),

    /// LLM 调用错误
    #[error("LLM 错误: {0}")]
    Llm(String),

    /// 目录扫描错误
    #[error("扫描错误: {0}")]
    Scan(String),

    /// 页面落盘错误
    #[error("IO 错误: {0}")]
    Io(String),

    /// 导航清单读写错误
    #[error("清单错误: {0}")]
    Manifest(String),
}

/// 便捷类型别名
pub type AppResult<T> = Result<T, AppError>;
