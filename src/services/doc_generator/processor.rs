//! 文档生成流水线
//!
//! 调度顺序：扫描 → 四种总览文档 → 逐文件文档。
//! 单个文档失败只记录并继续，最后汇总成功/失败统计。

use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use super::formatter::MdxFormatter;
use super::prompts;
use super::scanner::DirectoryScanner;
use super::types::{DocGenConfig, DocType, RunStats, SourceFile};
use super::writer::PageWriter;
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::llm::{ChatOptions, LlmClient, RetryConfig};

/// 文档生成流水线
pub struct DocGenPipeline {
    config: DocGenConfig,
    llm_client: LlmClient,
    model: String,
    options: ChatOptions,
    formatter: MdxFormatter,
    writer: PageWriter,
}

impl DocGenPipeline {
    /// 从应用配置创建流水线
    pub fn new(app_config: &AppConfig, config: DocGenConfig) -> AppResult<Self> {
        let retry = RetryConfig {
            max_retries: app_config.max_retries,
            ..Default::default()
        };

        let llm_client = LlmClient::new(
            &app_config.api_key,
            &app_config.base_url,
            app_config.max_requests_per_minute,
            app_config.max_tokens_per_minute,
            retry,
        )
        .map_err(|e| AppError::Config(e.to_string()))?;

        let options = ChatOptions {
            temperature: Some(app_config.temperature),
            max_tokens: Some(app_config.max_tokens),
            ..Default::default()
        };

        Ok(Self {
            writer: PageWriter::new(config.clone()),
            config,
            llm_client,
            model: app_config.model.clone(),
            options,
            formatter: MdxFormatter,
        })
    }

    /// 处理整个源码目录，返回运行统计
    pub async fn run(&self, source_dir: &Path) -> AppResult<RunStats> {
        let scanner = DirectoryScanner::new(self.config.clone());
        let files = scanner
            .scan(source_dir)
            .map_err(|e| AppError::Scan(e.to_string()))?;

        let docs_dir = source_dir.join(&self.config.docs_dir_name);
        let mut stats = RunStats {
            total_files: files.len(),
            ..Default::default()
        };

        // 总览文档读取全部源码，包括带跳过标记的文件
        for doc_type in DocType::ALL {
            match self.generate_overview_doc(doc_type.key(), &files, &docs_dir).await {
                Ok(Some(path)) => {
                    stats.overview_generated += 1;
                    info!("Overview '{}' saved to {}", doc_type.key(), path.display());
                }
                Ok(None) => {}
                Err(e) => {
                    stats.overview_failed += 1;
                    error!("Overview '{}' failed: {}", doc_type.key(), e);
                }
            }
        }

        for file in &files {
            if file.skip {
                info!("Skipping {} (skip marker)", file.relative_path);
                stats.skipped += 1;
                continue;
            }

            match self.process_file(file, &docs_dir).await {
                Ok(path) => {
                    stats.generated += 1;
                    info!(
                        "Documentation for {} saved to {}",
                        file.relative_path,
                        path.display()
                    );
                }
                Err(e) => {
                    stats.failed += 1;
                    stats.failures.push(file.relative_path.clone());
                    error!("Failed to document {}: {}", file.relative_path, e);
                }
            }
        }

        Ok(stats)
    }

    /// 生成一种总览文档；未知类型键只告警并跳过
    pub async fn generate_overview_doc(
        &self,
        doc_type_key: &str,
        files: &[SourceFile],
        docs_dir: &Path,
    ) -> AppResult<Option<PathBuf>> {
        let doc_type = match DocType::parse(doc_type_key) {
            Some(doc_type) => doc_type,
            None => {
                warn!("Unknown documentation type: {}", doc_type_key);
                return Ok(None);
            }
        };

        let messages = prompts::build_aggregate_messages(doc_type, files);
        let fragments = self
            .llm_client
            .chat(messages, &self.model, &self.options)
            .await
            .map_err(|e| AppError::Llm(e.to_string()))?;

        let body = self.formatter.format(&fragments);
        let output_path = docs_dir.join(format!("{}.mdx", doc_type.key()));

        self.writer
            .save_page(&body, &output_path)
            .await
            .map_err(|e| AppError::Io(e.to_string()))?;

        Ok(Some(output_path))
    }

    /// 处理单个源文件：生成文档、落盘并登记导航页名
    async fn process_file(&self, file: &SourceFile, docs_dir: &Path) -> AppResult<PathBuf> {
        let messages = prompts::build_file_messages(&file.content);
        let fragments = self
            .llm_client
            .chat(messages, &self.model, &self.options)
            .await
            .map_err(|e| AppError::Llm(e.to_string()))?;

        let body = self.formatter.format(&fragments);
        let page_name = page_name(&file.name);
        let output_path = docs_dir.join(format!("{}.mdx", page_name));

        self.writer
            .save_page(&body, &output_path)
            .await
            .map_err(|e| AppError::Io(e.to_string()))?;

        self.writer
            .register_page(docs_dir, &page_name)
            .await
            .map_err(|e| AppError::Manifest(e.to_string()))?;

        Ok(output_path)
    }
}

/// 文件名转页名：去扩展名，下划线换连字符
fn page_name(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| file_name.to_string())
        .replace('_', "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn test_app_config(base_url: String) -> AppConfig {
        AppConfig {
            api_key: "test-key".to_string(),
            base_url,
            ..Default::default()
        }
    }

    fn pipeline(base_url: String) -> DocGenPipeline {
        DocGenPipeline::new(&test_app_config(base_url), DocGenConfig::default()).unwrap()
    }

    async fn mount_completion(server: &wiremock::MockServer, content: &str) {
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/v1/chat/completions"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(json!({
                "choices": [
                    {"message": {"role": "assistant", "content": content}}
                ]
            })))
            .mount(server)
            .await;
    }

    async fn request_count(server: &wiremock::MockServer) -> usize {
        server.received_requests().await.unwrap_or_default().len()
    }

    #[test]
    fn test_page_name() {
        assert_eq!(page_name("foo_bar.py"), "foo-bar");
        assert_eq!(page_name("helper.rs"), "helper");
        assert_eq!(page_name("multi_word_name.ts"), "multi-word-name");
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let app_config = AppConfig::default();
        let result = DocGenPipeline::new(&app_config, DocGenConfig::default());
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_unknown_doc_type_is_noop() {
        let server = wiremock::MockServer::start().await;
        mount_completion(&server, "# Anything").await;
        let dir = TempDir::new().unwrap();
        let docs_dir = dir.path().join("docs");

        let result = pipeline(server.uri())
            .generate_overview_doc("bogus", &[], &docs_dir)
            .await
            .unwrap();

        assert!(result.is_none());
        // 无请求发出，无文件写入
        assert_eq!(request_count(&server).await, 0);
        assert!(!docs_dir.exists());
    }

    #[tokio::test]
    async fn test_end_to_end_single_file() {
        let server = wiremock::MockServer::start().await;
        mount_completion(&server, "```mdx\n# Foo Bar\n\nGenerated body.\n```").await;

        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("foo_bar.py"), "print('hello')").unwrap();

        let stats = pipeline(server.uri()).run(dir.path()).await.unwrap();

        assert_eq!(stats.total_files, 1);
        assert_eq!(stats.generated, 1);
        assert_eq!(stats.skipped, 0);
        assert_eq!(stats.failed, 0);
        assert_eq!(stats.overview_generated, 4);

        // 4 个总览 + 1 个逐文件
        assert_eq!(request_count(&server).await, 5);

        // 逐文件页面：下划线换连字符，围栏已剥除
        let page = fs::read_to_string(dir.path().join("docs").join("foo-bar.mdx")).unwrap();
        assert_eq!(page, "# Foo Bar\n\nGenerated body.");

        // 四种总览页面就位
        for key in ["welcome", "quickstart", "what-is-it", "how-it-works"] {
            assert!(dir.path().join("docs").join(format!("{}.mdx", key)).exists());
        }

        // 清单恰好登记一次
        let manifest: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(dir.path().join("docs").join("mint.json")).unwrap(),
        )
        .unwrap();
        let element_pages = manifest["navigation"]
            .as_array()
            .unwrap()
            .iter()
            .find(|g| g["group"] == "Element Details")
            .unwrap()["pages"]
            .as_array()
            .unwrap()
            .clone();
        assert_eq!(element_pages, vec![json!("foo-bar")]);
    }

    #[tokio::test]
    async fn test_skip_marker_excludes_file_but_not_overview() {
        let server = wiremock::MockServer::start().await;
        mount_completion(&server, "# Docs").await;

        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("public.py"), "print('hello')").unwrap();
        fs::write(
            dir.path().join("internal.py"),
            "# skip_documentation\nprint('private')",
        )
        .unwrap();

        let stats = pipeline(server.uri()).run(dir.path()).await.unwrap();

        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.generated, 1);
        assert_eq!(stats.skipped, 1);

        // 4 个总览 + 1 个未跳过的文件
        assert_eq!(request_count(&server).await, 5);
        assert!(dir.path().join("docs").join("public.mdx").exists());
        assert!(!dir.path().join("docs").join("internal.mdx").exists());
    }

    #[tokio::test]
    async fn test_per_file_failure_does_not_abort_run() {
        let server = wiremock::MockServer::start().await;
        // 所有调用都失败（4xx 不重试）
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/v1/chat/completions"))
            .respond_with(wiremock::ResponseTemplate::new(400).set_body_string("bad request"))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.py"), "print('a')").unwrap();
        fs::write(dir.path().join("b.py"), "print('b')").unwrap();

        let stats = pipeline(server.uri()).run(dir.path()).await.unwrap();

        // 两个文件都被尝试过，失败被记录而不是中止
        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.generated, 0);
        assert_eq!(stats.overview_failed, 4);
        assert_eq!(stats.failures.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_response_writes_placeholder() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/v1/chat/completions"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_json(json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("empty.py"), "print('x')").unwrap();

        let stats = pipeline(server.uri()).run(dir.path()).await.unwrap();
        assert_eq!(stats.generated, 1);

        let page = fs::read_to_string(dir.path().join("docs").join("empty.mdx")).unwrap();
        assert_eq!(page, "No documentation generated.");
    }
}
