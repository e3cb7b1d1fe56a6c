//! 应用配置管理
//!
//! 启动时从工作目录的 config.json 加载一次，环境变量 OPENAI_API_KEY
//! 覆盖文件中的密钥。CLI 运行期间配置只读。

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// 获取配置文件路径
fn get_config_path() -> PathBuf {
    PathBuf::from("config.json")
}

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// LLM API 密钥
    #[serde(default)]
    pub api_key: String,

    /// LLM API 基础 URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// 模型名称
    #[serde(default = "default_model")]
    pub model: String,

    /// 温度参数 (0.0 - 2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// 最大 token 数
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// 每分钟最大请求数
    #[serde(default = "default_max_requests_per_minute")]
    pub max_requests_per_minute: u32,

    /// 每分钟最大 token 数
    #[serde(default = "default_max_tokens_per_minute")]
    pub max_tokens_per_minute: u32,

    /// 瞬态错误最大重试次数
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_temperature() -> f64 {
    0.3
}

fn default_max_tokens() -> u32 {
    8192
}

fn default_max_requests_per_minute() -> u32 {
    20
}

fn default_max_tokens_per_minute() -> u32 {
    40000
}

fn default_max_retries() -> u32 {
    2
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_requests_per_minute: default_max_requests_per_minute(),
            max_tokens_per_minute: default_max_tokens_per_minute(),
            max_retries: default_max_retries(),
        }
    }
}

impl AppConfig {
    /// 加载配置：文件优先，环境变量覆盖密钥
    fn load() -> Self {
        let mut config = load_config_from_file().unwrap_or_default();

        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                config.api_key = key;
            }
        }

        config
    }
}

/// 全局配置单例
static CONFIG: Lazy<RwLock<AppConfig>> = Lazy::new(|| RwLock::new(AppConfig::load()));

/// 从文件加载配置
fn load_config_from_file() -> Option<AppConfig> {
    let path = get_config_path();
    if path.exists() {
        let content = fs::read_to_string(&path).ok()?;
        serde_json::from_str(&content).ok()
    } else {
        None
    }
}

/// 获取当前配置（克隆）
pub fn get_config() -> AppConfig {
    CONFIG.read().clone()
}
