use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::core::error::Result;
use crate::core::message::{CrawlResult, ErrorReport, STATUS_FAILED};
use crate::interfaces::sink::ResultSink;

/// 把结果摘要写入日志
#[derive(Debug, Default, Clone)]
pub struct LogSink;

#[async_trait]
impl ResultSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn deliver(&self, result: &CrawlResult) -> Result<()> {
        if result.status_code == STATUS_FAILED {
            warn!(
                request_id = %result.request_id,
                event_type = %result.event_type,
                status = result.status_code,
                items = result.data.len(),
                "{}",
                result.message
            );
        } else {
            info!(
                request_id = %result.request_id,
                event_type = %result.event_type,
                status = result.status_code,
                items = result.data.len(),
                "{}",
                result.message
            );
        }
        Ok(())
    }

    async fn deliver_error(&self, report: &ErrorReport) -> Result<()> {
        error!(
            request_id = %report.request_id,
            event_type = %report.event_type,
            error = %report.error.name,
            "{}",
            report.error.message
        );
        Ok(())
    }
}
