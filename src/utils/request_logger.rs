//! LLM 请求日志记录器
//!
//! 每次调度完成后追加一条 JSONL 记录，便于调试和用量核对。
//! 日志写入失败只告警，不影响调度本身。

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tracing::warn;
use uuid::Uuid;

/// 请求日志条目
#[derive(Debug, Clone, Serialize)]
pub struct RequestLogEntry {
    /// 请求 ID
    pub request_id: String,
    /// 时间戳
    pub timestamp: DateTime<Utc>,
    /// 端点 URL
    pub endpoint: String,
    /// 模型名称
    pub model: String,
    /// 消息数量
    pub messages_count: usize,
    /// 估算 token 数
    pub estimated_tokens: u32,
    /// API 密钥（脱敏）
    pub api_key_masked: String,
    /// 状态：success / error
    pub status: String,
    /// 持续时间（毫秒）
    pub duration_ms: u64,
    /// 重试次数
    pub retries: u32,
    /// 响应片段数
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragment_count: Option<usize>,
    /// 错误信息
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// 请求日志记录器
pub struct RequestLogger {
    log_path: PathBuf,
    file: Mutex<Option<File>>,
}

impl RequestLogger {
    /// 创建新的日志记录器，默认写到可执行文件旁的 storage 目录
    pub fn new(log_dir: Option<PathBuf>) -> Self {
        let log_dir = log_dir.unwrap_or_else(|| {
            std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."))
                .join("storage")
        });

        let log_path = log_dir.join("llm_requests.jsonl");

        Self {
            log_path,
            file: Mutex::new(None),
        }
    }

    /// 生成请求 ID
    pub fn generate_request_id() -> String {
        Uuid::new_v4().to_string()[..8].to_string()
    }

    /// API 密钥脱敏
    pub fn mask_api_key(api_key: &str) -> String {
        if api_key.len() <= 8 {
            "*".repeat(api_key.len())
        } else {
            format!("{}...{}", &api_key[..4], &api_key[api_key.len() - 4..])
        }
    }

    /// 追加一条日志记录
    pub fn record(&self, entry: &RequestLogEntry) {
        let line = match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize request log entry: {}", e);
                return;
            }
        };

        let mut guard = self.file.lock();
        if guard.is_none() {
            if let Some(parent) = self.log_path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            match OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.log_path)
            {
                Ok(file) => *guard = Some(file),
                Err(e) => {
                    warn!("Failed to open request log {}: {}", self.log_path.display(), e);
                    return;
                }
            }
        }

        if let Some(file) = guard.as_mut() {
            if let Err(e) = writeln!(file, "{}", line) {
                warn!("Failed to write request log entry: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_entry() -> RequestLogEntry {
        RequestLogEntry {
            request_id: "abcd1234".to_string(),
            timestamp: Utc::now(),
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o".to_string(),
            messages_count: 2,
            estimated_tokens: 1000,
            api_key_masked: "sk-t...1234".to_string(),
            status: "success".to_string(),
            duration_ms: 42,
            retries: 0,
            fragment_count: Some(1),
            error_message: None,
        }
    }

    #[test]
    fn test_mask_api_key() {
        assert_eq!(RequestLogger::mask_api_key("short"), "*****");
        assert_eq!(
            RequestLogger::mask_api_key("sk-test-12345678"),
            "sk-t...5678"
        );
    }

    #[test]
    fn test_generate_request_id_length() {
        assert_eq!(RequestLogger::generate_request_id().len(), 8);
    }

    #[test]
    fn test_record_appends_jsonl_lines() {
        let dir = TempDir::new().unwrap();
        let logger = RequestLogger::new(Some(dir.path().to_path_buf()));

        logger.record(&sample_entry());
        logger.record(&sample_entry());

        let content = fs::read_to_string(dir.path().join("llm_requests.jsonl")).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed["request_id"], "abcd1234");
        assert_eq!(parsed["status"], "success");
        // 密钥只落盘脱敏形式
        assert_eq!(parsed["api_key_masked"], "sk-t...1234");
    }
}
