//! 请求/token 双池限流器
//!
//! 连续令牌桶：两个池按各自速率随时间补充，封顶于每分钟上限。
//! 获取许可时一次性扣减一个请求槽位和估算的 token 预算；不足时
//! 按闭式公式计算需等待的时长后休眠，醒来重新检查。

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use super::types::ChatMessage;

/// token 估算：约 4 字符 1 token
const CHARS_PER_TOKEN: usize = 4;

/// 每次请求的 token 预算下限（含响应开销）
const MIN_REQUEST_TOKENS: u32 = 1000;

/// 闭式等待之上附加的余量，避免浮点误差导致的空转
const WAIT_SLACK_SECS: f64 = 0.005;

/// 估算一次聊天请求消耗的 token 数
pub fn estimate_request_tokens(messages: &[ChatMessage]) -> u32 {
    let chars: usize = messages.iter().map(|m| m.content.len()).sum();
    ((chars / CHARS_PER_TOKEN) as u32).max(MIN_REQUEST_TOKENS)
}

/// 双池预算状态
#[derive(Debug)]
struct RateBudget {
    available_requests: f64,
    available_tokens: f64,
    last_refill: Instant,
}

/// 限流器
pub struct RateLimiter {
    max_requests_per_minute: f64,
    max_tokens_per_minute: f64,
    budget: Mutex<RateBudget>,
}

impl RateLimiter {
    /// 创建限流器，两个池初始为满
    pub fn new(max_requests_per_minute: u32, max_tokens_per_minute: u32) -> Self {
        Self {
            max_requests_per_minute: f64::from(max_requests_per_minute),
            max_tokens_per_minute: f64::from(max_tokens_per_minute),
            budget: Mutex::new(RateBudget {
                available_requests: f64::from(max_requests_per_minute),
                available_tokens: f64::from(max_tokens_per_minute),
                last_refill: Instant::now(),
            }),
        }
    }

    /// 等待直到一个请求槽位和估算 token 预算同时可用，然后原子扣减
    pub async fn acquire(&self, estimated_tokens: u32) {
        // 超过整池容量的请求永远无法满足，按整池扣减
        let needed_tokens = f64::from(estimated_tokens).min(self.max_tokens_per_minute);

        loop {
            let wait_secs = {
                let mut budget = self.budget.lock().await;
                let now = Instant::now();
                let elapsed = now.duration_since(budget.last_refill).as_secs_f64();

                budget.available_requests = (budget.available_requests
                    + self.max_requests_per_minute * elapsed / 60.0)
                    .min(self.max_requests_per_minute);
                budget.available_tokens = (budget.available_tokens
                    + self.max_tokens_per_minute * elapsed / 60.0)
                    .min(self.max_tokens_per_minute);
                budget.last_refill = now;

                if budget.available_requests >= 1.0 && budget.available_tokens >= needed_tokens {
                    budget.available_requests -= 1.0;
                    budget.available_tokens -= needed_tokens;
                    debug!(
                        "Rate permit acquired: {:.1} requests, {:.0} tokens remaining",
                        budget.available_requests, budget.available_tokens
                    );
                    return;
                }

                let request_rate = self.max_requests_per_minute / 60.0;
                let token_rate = self.max_tokens_per_minute / 60.0;
                let request_wait = (1.0 - budget.available_requests) / request_rate;
                let token_wait = (needed_tokens - budget.available_tokens) / token_rate;
                request_wait.max(token_wait).max(0.0)
            };

            debug!("Rate budget exhausted, waiting {:.2}s", wait_secs);
            tokio::time::sleep(Duration::from_secs_f64(wait_secs + WAIT_SLACK_SECS)).await;
        }
    }
}
