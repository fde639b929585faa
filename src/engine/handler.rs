//! 消息处理入口
//!
//! 接收原始请求体，执行抓取并把结果交给各输出端口。

use std::sync::Arc;

use serde_json::Value;
use tracing::{error, warn};

use crate::core::config::DeliveryMode;
use crate::core::error::CrawlerError;
use crate::core::message::{
    CrawlRequest, CrawlResult, ErrorInfo, ErrorReport, STATUS_FAILED, generate_request_id,
};
use crate::core::model::EventType;
use crate::interfaces::sink::ResultSink;

use super::crawler::Crawler;

/// 消息体中读不到 `eventType` 时使用的占位值
pub const UNREADABLE_EVENT_TYPE: &str = "UNKNOWN";

pub struct MessageHandler {
    crawler: Crawler,
    sinks: Vec<Arc<dyn ResultSink>>,
    mode: DeliveryMode,
}

impl MessageHandler {
    pub fn new(crawler: Crawler, sinks: Vec<Arc<dyn ResultSink>>, mode: DeliveryMode) -> Self {
        Self {
            crawler,
            sinks,
            mode,
        }
    }

    /// 解析原始消息体并处理
    ///
    /// 解析失败同样生成 500 结果并投递错误报告。
    pub async fn handle_message(&self, body: &str, message_id: Option<&str>) -> CrawlResult {
        match CrawlRequest::from_json(body, message_id) {
            Ok(request) => self.handle(&request).await,
            Err(e) => {
                error!("请求解析失败: {}", e);
                let request_id = message_id
                    .map(str::to_string)
                    .unwrap_or_else(generate_request_id);
                let event_type = raw_event_type(body);
                self.report_error(&request_id, &event_type, &e).await;
                CrawlResult::failure(request_id, event_type, &e)
            }
        }
    }

    pub async fn handle(&self, request: &CrawlRequest) -> CrawlResult {
        let result = match self.crawler.execute(request).await {
            Ok(result) => result,
            Err(e) => {
                error!("请求 {} 失败: {}", request.request_id, e);
                self.report_error(&request.request_id, &request.event_type, &e)
                    .await;
                CrawlResult::failure(request.request_id.clone(), request.event_type.clone(), &e)
            }
        };

        self.deliver(&result).await;
        result
    }

    async fn deliver(&self, result: &CrawlResult) {
        let shaped = match self.mode {
            DeliveryMode::Batch => vec![result.clone()],
            DeliveryMode::PerItem if result.data.is_empty() => vec![result.clone()],
            DeliveryMode::PerItem => result.split(),
        };

        for sink in &self.sinks {
            for item in &shaped {
                if let Err(e) = sink.deliver(item).await {
                    warn!("结果投递失败 [{}]: {}", sink.name(), e);
                }
            }
        }

        if result.status_code == STATUS_FAILED && !result.data.is_empty() {
            let failed = result.data.iter().filter(|o| o.is_failure()).count();
            warn!(
                "请求 {} 部分失败: {}/{} 个条目",
                result.request_id,
                failed,
                result.data.len()
            );
        }
    }

    async fn report_error(&self, request_id: &str, event_type: &EventType, err: &CrawlerError) {
        let report = ErrorReport {
            request_id: request_id.to_string(),
            event_type: event_type.clone(),
            error: ErrorInfo::from(err),
        };
        for sink in &self.sinks {
            if let Err(e) = sink.deliver_error(&report).await {
                warn!("错误报告投递失败 [{}]: {}", sink.name(), e);
            }
        }
    }
}

/// 消息体无法解析为请求时，尽量回显其中的 `eventType`
fn raw_event_type(body: &str) -> EventType {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("eventType")?.as_str().map(EventType::from_key))
        .unwrap_or_else(|| EventType::Unsupported(UNREADABLE_EVENT_TYPE.to_string()))
}
