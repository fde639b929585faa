use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Local;
use serde::Serialize;
use tokio::fs;
use tracing::info;

use crate::core::error::Result;
use crate::core::message::{CrawlResult, ErrorReport};
use crate::interfaces::sink::ResultSink;

/// 把结果以 JSON 文件保存到目录
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 写入 `{dir}/{filename}`，目录不存在时自动创建
    pub async fn save<T: Serialize + ?Sized>(&self, data: &T, filename: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(filename);
        let json = serde_json::to_string_pretty(data)?;
        fs::write(&path, json).await?;
        info!("结果已保存: {}", path.display());
        Ok(path)
    }
}

/// `{prefix}_{requestId}_{时间戳}.json`
fn file_name(prefix: &str, request_id: &str, suffix: Option<usize>) -> String {
    let stamp = Local::now().format("%Y%m%d_%H%M%S%3f");
    let safe: String = request_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    match suffix {
        Some(n) => format!("{}_{}_{}_{}.json", prefix, safe, stamp, n),
        None => format!("{}_{}_{}.json", prefix, safe, stamp),
    }
}

#[async_trait]
impl ResultSink for JsonFileSink {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn deliver(&self, result: &CrawlResult) -> Result<()> {
        // 按条投递时同一请求会写多次，重名时追加序号
        let mut name = file_name("result", &result.request_id, None);
        let mut n = 0usize;
        while fs::try_exists(self.dir.join(&name)).await.unwrap_or(false) {
            n += 1;
            name = file_name("result", &result.request_id, Some(n));
        }
        self.save(result, &name).await.map(|_| ())
    }

    async fn deliver_error(&self, report: &ErrorReport) -> Result<()> {
        let name = file_name("error", &report.request_id, None);
        self.save(report, &name).await.map(|_| ())
    }
}
