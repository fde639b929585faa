//! 结果输出端口
//!
//! 核心只在产出 `CrawlResult` 之后调用这些端口，不引用任何具体的通知客户端。

use async_trait::async_trait;

use crate::core::error::Result;
use crate::core::message::{CrawlResult, ErrorReport};

#[async_trait]
pub trait ResultSink: Send + Sync {
    fn name(&self) -> &str;

    /// 投递结果对象
    async fn deliver(&self, result: &CrawlResult) -> Result<()>;

    /// 投递错误对象
    async fn deliver_error(&self, report: &ErrorReport) -> Result<()>;
}
