//! 页面写入器
//!
//! 把格式化后的正文落盘为 .mdx 页面，并把页名登记进 mint.json
//! 导航清单的 "Element Details" 分组。清单缺失或损坏时回退到
//! 内置模板资产；登记是幂等的，且从不改动其他分组。

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use super::types::DocGenConfig;

/// 内置的默认清单模板（构建时嵌入的资产）
static DEFAULT_MANIFEST: Lazy<MintManifest> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../../assets/default_mint.json"))
        .expect("default manifest template is valid JSON")
});

/// 导航清单
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintManifest {
    /// 导航分组，顺序即侧边栏顺序
    #[serde(default)]
    pub navigation: Vec<NavGroup>,
    /// 其余清单字段原样保留
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 导航分组
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavGroup {
    /// 分组名
    pub group: String,
    /// 页名列表，组内唯一
    #[serde(default)]
    pub pages: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 页面写入器
pub struct PageWriter {
    config: DocGenConfig,
}

impl PageWriter {
    /// 创建新的页面写入器
    pub fn new(config: DocGenConfig) -> Self {
        Self { config }
    }

    /// 保存页面正文，按需创建父目录，覆盖已有文件
    pub async fn save_page(&self, body: &str, path: &Path) -> Result<(), WriterError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| WriterError::IoError(parent.to_path_buf(), e))?;
        }

        fs::write(path, body)
            .await
            .map_err(|e| WriterError::IoError(path.to_path_buf(), e))?;

        debug!("Page saved: {}", path.display());
        Ok(())
    }

    /// 把页名登记进导航清单的元素分组（幂等）
    pub async fn register_page(&self, docs_dir: &Path, page_name: &str) -> Result<(), WriterError> {
        let manifest_path = docs_dir.join(&self.config.manifest_name);
        let mut manifest = self.load_manifest(&manifest_path).await;

        match manifest
            .navigation
            .iter_mut()
            .find(|g| g.group == self.config.element_group)
        {
            Some(group) => {
                if group.pages.iter().any(|p| p == page_name) {
                    debug!("Page '{}' already registered", page_name);
                } else {
                    group.pages.push(page_name.to_string());
                    info!("Registered page '{}' in '{}'", page_name, self.config.element_group);
                }
            }
            None => {
                warn!(
                    "Navigation group '{}' not found in {}, page '{}' not registered",
                    self.config.element_group,
                    manifest_path.display(),
                    page_name
                );
            }
        }

        let content = serde_json::to_string_pretty(&manifest)
            .map_err(|e| WriterError::SerializeError(e.to_string()))?;

        if let Some(parent) = manifest_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| WriterError::IoError(parent.to_path_buf(), e))?;
        }

        fs::write(&manifest_path, content)
            .await
            .map_err(|e| WriterError::IoError(manifest_path.clone(), e))?;

        Ok(())
    }

    /// 加载清单；不存在或损坏时回退到默认模板
    async fn load_manifest(&self, manifest_path: &Path) -> MintManifest {
        match fs::read_to_string(manifest_path).await {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(manifest) => manifest,
                Err(e) => {
                    warn!(
                        "Malformed manifest {}, falling back to default template: {}",
                        manifest_path.display(),
                        e
                    );
                    DEFAULT_MANIFEST.clone()
                }
            },
            Err(_) => {
                debug!(
                    "Manifest {} not found, using default template",
                    manifest_path.display()
                );
                DEFAULT_MANIFEST.clone()
            }
        }
    }
}

/// 写入错误类型
#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    #[error("IO错误 ({0}): {1}")]
    IoError(PathBuf, #[source] std::io::Error),

    #[error("序列化清单失败: {0}")]
    SerializeError(String),
}
