//! 响应格式化器
//!
//! 把调度器返回的响应片段清洗为可落盘的 MDX 正文：
//! 还原字面 \n、剥掉开头的 ```mdx 围栏和结尾的反引号、去首尾空白。
//! 对已清洗的文本重复执行是幂等的。

use once_cell::sync::Lazy;
use regex::Regex;

/// 响应为空时的占位正文
pub const NO_DOCUMENTATION_PLACEHOLDER: &str = "No documentation generated.";

/// 开头的 MDX 围栏标记
static LEADING_MDX_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```mdx").expect("valid fence regex"));

/// MDX 格式化器
#[derive(Debug, Default)]
pub struct MdxFormatter;

impl MdxFormatter {
    /// 清洗响应片段序列，返回最终文档正文
    ///
    /// 序列非空取第一个片段，否则使用占位文本。
    pub fn format(&self, fragments: &[String]) -> String {
        let raw = fragments
            .first()
            .map(String::as_str)
            .unwrap_or(NO_DOCUMENTATION_PLACEHOLDER);

        let unescaped = raw.replace("\\n", "\n");
        let without_fence = LEADING_MDX_FENCE.replace(&unescaped, "");
        let trimmed = without_fence.trim();
        let without_ticks = trimmed.trim_end_matches('`');

        without_ticks.trim_end().to_string()
    }
}
