//! 应用程序入口 (Application Entrypoint)
//!
//! 负责 CLI 指令解析、遥测层初始化、依赖注入及系统生命周期管理。

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use webtoon_crawler::core::config::AppConfig;
use webtoon_crawler::core::event::{CrawlEvent, EventReceiver, create_event_channel};
use webtoon_crawler::delivery::{JsonFileSink, LogSink};
use webtoon_crawler::engine::{CollectorSet, Crawler, MessageHandler};
use webtoon_crawler::interfaces::ResultSink;
use webtoon_crawler::network::ChromeProvider;
use webtoon_crawler::sites::PlatformRegistry;

/// 命令行界面脚手架 (CLI Scaffolding)
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// 配置文件路径
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// 结果 JSON 保存目录 (覆盖配置)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// 以 JSON 格式输出日志
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 执行单个抓取事件
    Crawl {
        /// 事件类型 (FULL_DETAIL / INCREMENTAL_UPDATE / NEW_TITLE_DISCOVERY / FULL_CATALOG)
        #[arg(short, long)]
        event: String,
        /// 工作条目 JSON (对象或数组)
        #[arg(short, long)]
        data: Option<String>,
        /// 请求标识，缺省时自动生成
        #[arg(short, long)]
        request_id: Option<String>,
    },
    /// 处理一条完整的请求消息
    Run {
        /// 请求 JSON 文件路径，`-` 表示标准输入
        #[arg(short, long)]
        request: PathBuf,
    },
}

fn init_tracing(json_logs: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false);

    if json_logs {
        builder.json().init();
    } else {
        builder.with_ansi(true).init();
    }
}

/// 事件流转入调试日志
fn spawn_event_logger(events: EventReceiver) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv_async().await {
            match event {
                CrawlEvent::ItemStarted { index, total, label } => {
                    debug!("事件: 条目 {}/{} 开始 {}", index + 1, total, label)
                }
                CrawlEvent::ItemFailed { index, label, error } => {
                    debug!("事件: 条目 {} 失败 {}: {}", index + 1, label, error)
                }
                other => debug!("事件: {:?}", other),
            }
        }
    })
}

async fn read_request(path: &PathBuf) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        return io::read_to_string(io::stdin()).context("读取标准输入失败");
    }
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("读取请求文件失败: {}", path.display()))
}

fn build_body(event: String, data: Option<String>, request_id: Option<String>) -> anyhow::Result<String> {
    let data: Value = match data {
        Some(raw) => serde_json::from_str(&raw).context("--data 不是合法的 JSON")?,
        None => Value::Null,
    };
    let mut body = json!({ "eventType": event, "data": data });
    if let Some(id) = request_id {
        body["requestId"] = Value::String(id);
    }
    Ok(body.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    // 依赖项初始化与注入 (Dependency Injection)
    let config = AppConfig::load_from(&cli.config)?;
    let registry = Arc::new(PlatformRegistry::new(&config)?);
    let collectors = CollectorSet::standard(registry.clone(), &config);
    let provider = Arc::new(ChromeProvider::new(config.browser.clone()));

    let (event_sender, event_receiver) = create_event_channel();
    let logger = spawn_event_logger(event_receiver);
    let crawler = Crawler::new(provider, collectors).with_events(event_sender);

    let mut sinks: Vec<Arc<dyn ResultSink>> = vec![Arc::new(LogSink)];
    let output_dir = cli
        .output
        .clone()
        .or_else(|| config.delivery.output_dir.as_ref().map(PathBuf::from));
    if let Some(dir) = output_dir {
        info!("结果将保存到: {}", dir.display());
        sinks.push(Arc::new(JsonFileSink::new(dir)));
    }
    let handler = MessageHandler::new(crawler, sinks, config.delivery.mode);
    debug!("已注册平台: {:?}", registry.list());

    let body = match cli.command {
        Commands::Crawl {
            event,
            data,
            request_id,
        } => build_body(event, data, request_id)?,
        Commands::Run { request } => read_request(&request).await?,
    };

    // 信号处理与优雅退出 (Signal Handling)
    let result = tokio::select! {
        result = handler.handle_message(&body, None) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("收到中断信号，放弃当前请求");
            return Ok(());
        }
    };

    drop(handler);
    let _ = logger.await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    if result.status_code >= 500 {
        std::process::exit(1);
    }
    Ok(())
}
