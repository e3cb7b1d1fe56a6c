//! 文档生成器模块
//!
//! 基于 LLM 的 MDX 文档生成流水线
//!
//! # 流程
//!
//! - 扫描源码目录，收集支持的源文件
//! - 构建 Prompt（逐文件模式 / 总览模式）并经限流调度器调用 LLM
//! - 清洗响应为 MDX 正文
//! - 落盘页面并维护 mint.json 侧边栏导航清单

mod formatter;
mod processor;
pub mod prompts;
mod scanner;
pub mod types;
mod writer;

pub use formatter::MdxFormatter;
pub use processor::DocGenPipeline;
pub use scanner::DirectoryScanner;
pub use types::{DocGenConfig, DocType, RunStats, SourceFile};
pub use writer::PageWriter;
