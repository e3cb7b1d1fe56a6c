//! 目录扫描器
//!
//! 递归收集源码目录下支持的源文件并读取内容，标记含跳过指令的文件。

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::types::{DocGenConfig, SourceFile};

/// 目录扫描器
pub struct DirectoryScanner {
    config: DocGenConfig,
    /// 编译后的忽略模式（glob patterns）
    ignore_patterns: Vec<glob::Pattern>,
}

impl DirectoryScanner {
    /// 创建新的目录扫描器
    pub fn new(config: DocGenConfig) -> Self {
        let ignore_patterns = config
            .ignore_patterns
            .iter()
            .filter_map(|p| match glob::Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!("Invalid ignore pattern '{}': {}", p, e);
                    None
                }
            })
            .collect();

        Self {
            config,
            ignore_patterns,
        }
    }

    /// 扫描目录，按路径排序返回所有支持的源文件
    pub fn scan(&self, root_path: &Path) -> Result<Vec<SourceFile>, ScanError> {
        if !root_path.exists() {
            return Err(ScanError::PathNotFound(root_path.to_path_buf()));
        }

        if !root_path.is_dir() {
            return Err(ScanError::NotADirectory(root_path.to_path_buf()));
        }

        info!("Starting directory scan: {}", root_path.display());

        let mut files = Vec::new();

        for entry in WalkDir::new(root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                // 根节点本身不参与忽略判断
                e.depth() == 0 || !self.should_ignore(e.path(), &e.file_name().to_string_lossy())
            })
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !self.is_supported_file(path) {
                continue;
            }

            if let Ok(metadata) = entry.metadata() {
                if metadata.len() > self.config.max_file_size {
                    debug!(
                        "Skipping oversized file: {} ({} bytes)",
                        path.display(),
                        metadata.len()
                    );
                    continue;
                }
            }

            let content = match fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    warn!("Failed to read {}: {}", path.display(), e);
                    continue;
                }
            };

            let relative_path = path
                .strip_prefix(root_path)
                .map(|p| p.to_string_lossy().to_string().replace('\\', "/"))
                .unwrap_or_default();

            let name = entry.file_name().to_string_lossy().to_string();
            let skip = self.has_skip_marker(&content);

            if skip {
                debug!("Skip marker found in {}", relative_path);
            }

            files.push(SourceFile {
                relative_path,
                name,
                content,
                skip,
            });
        }

        info!("Scan completed: {} files", files.len());
        Ok(files)
    }

    /// 检查是否应该忽略该路径
    fn should_ignore(&self, path: &Path, name: &str) -> bool {
        // 忽略隐藏文件/目录（以 . 开头）
        if name.starts_with('.') {
            return true;
        }

        // 不重新扫描已生成的文档目录
        if name == self.config.docs_dir_name {
            return true;
        }

        // 检查是否匹配忽略模式
        for pattern in &self.ignore_patterns {
            if pattern.matches(name) {
                return true;
            }

            if let Some(path_str) = path.to_str() {
                if pattern.matches(path_str) {
                    return true;
                }
            }
        }

        false
    }

    /// 检查是否是支持的文件类型
    fn is_supported_file(&self, path: &Path) -> bool {
        if let Some(ext) = path.extension() {
            let ext_str = ext.to_string_lossy().to_lowercase();
            self.config.supported_extensions.contains(&ext_str)
        } else {
            false
        }
    }

    /// 检查内容是否包含跳过标记
    fn has_skip_marker(&self, content: &str) -> bool {
        self.config
            .skip_markers
            .iter()
            .any(|marker| content.contains(marker))
    }
}

/// 扫描错误类型
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("路径不存在: {0}")]
    PathNotFound(PathBuf),

    #[error("路径不是目录: {0}")]
    NotADirectory(PathBuf),
}
