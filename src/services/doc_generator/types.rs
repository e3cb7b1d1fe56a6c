//! 文档生成器类型定义

use serde::{Deserialize, Serialize};

/// 总览文档类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocType {
    /// 欢迎页
    Welcome,
    /// 快速上手
    Quickstart,
    /// 这是什么
    WhatIsIt,
    /// 工作原理
    HowItWorks,
}

impl DocType {
    /// 固定的四种总览文档，按侧边栏顺序
    pub const ALL: [DocType; 4] = [
        DocType::Welcome,
        DocType::Quickstart,
        DocType::WhatIsIt,
        DocType::HowItWorks,
    ];

    /// 类型键，同时作为输出页名
    pub fn key(self) -> &'static str {
        match self {
            DocType::Welcome => "welcome",
            DocType::Quickstart => "quickstart",
            DocType::WhatIsIt => "what-is-it",
            DocType::HowItWorks => "how-it-works",
        }
    }

    /// 从类型键解析，未知键返回 None
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.key() == key)
    }
}

/// 扫描到的源文件
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// 相对于源码根目录的路径
    pub relative_path: String,
    /// 文件名
    pub name: String,
    /// 文件内容
    pub content: String,
    /// 是否包含跳过标记
    pub skip: bool,
}

/// 文档生成配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocGenConfig {
    /// 输出目录名（默认 "docs"）
    #[serde(default = "default_docs_dir_name")]
    pub docs_dir_name: String,

    /// 导航清单文件名（默认 "mint.json"）
    #[serde(default = "default_manifest_name")]
    pub manifest_name: String,

    /// 逐文件页面归属的导航分组
    #[serde(default = "default_element_group")]
    pub element_group: String,

    /// 忽略的目录模式
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,

    /// 支持的文件扩展名
    #[serde(default = "default_supported_extensions")]
    pub supported_extensions: Vec<String>,

    /// 最大文件大小（字节，默认1MB）
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// 跳过标记：内容中出现任一标记则不做逐文件处理
    #[serde(default = "default_skip_markers")]
    pub skip_markers: Vec<String>,
}

fn default_docs_dir_name() -> String {
    "docs".to_string()
}

fn default_manifest_name() -> String {
    "mint.json".to_string()
}

fn default_element_group() -> String {
    "Element Details".to_string()
}

fn default_ignore_patterns() -> Vec<String> {
    vec![
        ".git".to_string(),
        "node_modules".to_string(),
        "__pycache__".to_string(),
        ".venv".to_string(),
        "venv".to_string(),
        "target".to_string(),
        "dist".to_string(),
        "build".to_string(),
        ".idea".to_string(),
        ".vscode".to_string(),
        ".next".to_string(),
        "out".to_string(),
        ".cache".to_string(),
        "*.pyc".to_string(),
        "*.pyo".to_string(),
        "*.so".to_string(),
        "*.dll".to_string(),
        "*.exe".to_string(),
    ]
}

fn default_supported_extensions() -> Vec<String> {
    vec![
        "py".to_string(),
        "js".to_string(),
        "ts".to_string(),
        "jsx".to_string(),
        "tsx".to_string(),
        "java".to_string(),
        "go".to_string(),
        "rs".to_string(),
        "c".to_string(),
        "cpp".to_string(),
        "h".to_string(),
        "hpp".to_string(),
        "cs".to_string(),
        "rb".to_string(),
        "php".to_string(),
        "swift".to_string(),
        "kt".to_string(),
        "scala".to_string(),
        "vue".to_string(),
        "svelte".to_string(),
    ]
}

fn default_max_file_size() -> u64 {
    1024 * 1024 // 1MB
}

fn default_skip_markers() -> Vec<String> {
    vec![
        "@skip_documentation".to_string(),
        "# skip_documentation".to_string(),
    ]
}

impl Default for DocGenConfig {
    fn default() -> Self {
        Self {
            docs_dir_name: default_docs_dir_name(),
            manifest_name: default_manifest_name(),
            element_group: default_element_group(),
            ignore_patterns: default_ignore_patterns(),
            supported_extensions: default_supported_extensions(),
            max_file_size: default_max_file_size(),
            skip_markers: default_skip_markers(),
        }
    }
}

/// 一次运行的统计信息
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    /// 扫描到的文件总数
    pub total_files: usize,
    /// 成功生成的逐文件页面数
    pub generated: usize,
    /// 因跳过标记而跳过的文件数
    pub skipped: usize,
    /// 失败的文件数
    pub failed: usize,
    /// 成功生成的总览页面数
    pub overview_generated: usize,
    /// 失败的总览页面数
    pub overview_failed: usize,
    /// 失败文件的相对路径
    pub failures: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_type_keys_round_trip() {
        for doc_type in DocType::ALL {
            assert_eq!(DocType::parse(doc_type.key()), Some(doc_type));
        }
    }

    #[test]
    fn test_doc_type_unknown_key() {
        assert_eq!(DocType::parse("bogus"), None);
        assert_eq!(DocType::parse(""), None);
        // 键区分大小写
        assert_eq!(DocType::parse("Welcome"), None);
    }

    #[test]
    fn test_default_config() {
        let config = DocGenConfig::default();
        assert_eq!(config.docs_dir_name, "docs");
        assert_eq!(config.manifest_name, "mint.json");
        assert_eq!(config.element_group, "Element Details");
        assert!(config.supported_extensions.contains(&"py".to_string()));
        assert_eq!(config.skip_markers.len(), 2);
    }
}
