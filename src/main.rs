//! AI MDX Documentation Generator - Rust CLI
//!
//! 扫描源码目录，调用 LLM 生成 MDX 文档页面并维护 mint.json 导航清单。

use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod llm;
mod services;
mod utils;

use services::doc_generator::{DocGenConfig, DocGenPipeline};

/// AI 代码文档生成器
#[derive(Parser, Debug)]
#[command(name = "docgen", version, about = "AI MDX documentation generator")]
struct Cli {
    /// 源码目录路径
    source_directory: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // 初始化日志
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docgen_rs=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    info!(
        "Starting documentation generation for {}",
        cli.source_directory.display()
    );

    let app_config = config::get_config();
    let pipeline = DocGenPipeline::new(&app_config, DocGenConfig::default())?;
    let stats = pipeline.run(&cli.source_directory).await?;

    info!(
        "Run finished: {} page(s) generated, {} skipped, {} failed ({} file(s) scanned); overviews: {} generated, {} failed",
        stats.generated,
        stats.skipped,
        stats.failed,
        stats.total_files,
        stats.overview_generated,
        stats.overview_failed
    );

    if !stats.failures.is_empty() {
        warn!("Failed files: {}", stats.failures.join(", "));
    }

    Ok(())
}
