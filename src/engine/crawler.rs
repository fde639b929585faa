//! 抓取调度器
//!
//! 负责一次调用的生命周期：选择收集器 -> 建立会话 -> 逐条处理 -> 关闭会话

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{error, info, warn};

use crate::core::error::{CrawlerError, Result};
use crate::core::event::{CrawlEvent, EventSender};
use crate::core::message::{CollectionOutcome, CrawlRequest, CrawlResult};
use crate::core::model::WorkItem;
use crate::interfaces::render::{RenderSession, SessionProvider};

use super::collectors::{Collector, CollectorSet};

/// 抓取调度器
pub struct Crawler {
    provider: Arc<dyn SessionProvider>,
    collectors: CollectorSet,
    events: Option<EventSender>,
}

impl Crawler {
    pub fn new(provider: Arc<dyn SessionProvider>, collectors: CollectorSet) -> Self {
        Self {
            provider,
            collectors,
            events: None,
        }
    }

    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    fn emit(&self, event: CrawlEvent) {
        if let Some(events) = &self.events {
            events.emit(event);
        }
    }

    /// 执行一次抓取请求
    ///
    /// 只有在逐条处理开始前的失败 (事件类型不受支持、会话无法建立) 才返回 `Err`；
    /// 条目级错误都记录在结果中。
    pub async fn execute(&self, request: &CrawlRequest) -> Result<CrawlResult> {
        // 1. 选择收集器 (不建立会话)
        let collector = self.collectors.select(&request.event_type)?;
        info!(
            "受理请求 {} [{}]: {} 个条目",
            request.request_id,
            request.event_type,
            request.data.len()
        );
        self.emit(CrawlEvent::RequestAccepted {
            request_id: request.request_id.clone(),
            event_type: request.event_type.to_string(),
            items: request.data.len(),
        });

        // 2. 建立会话
        let session = self.provider.launch().await?;
        self.emit(CrawlEvent::SessionOpened);

        // 3. 逐条处理 (不会提前返回)
        let outcomes = self
            .dispatch(collector.as_ref(), session.as_ref(), &request.data)
            .await;

        // 4. 关闭会话
        if let Err(e) = session.close().await {
            warn!("关闭渲染会话失败: {}", e);
        }
        self.emit(CrawlEvent::SessionClosed);

        let result = CrawlResult::aggregate(
            request.request_id.clone(),
            request.event_type.clone(),
            outcomes,
        );
        info!("请求 {} 完成: {}", result.request_id, result.message);
        self.emit(CrawlEvent::RequestCompleted {
            request_id: result.request_id.clone(),
            status_code: result.status_code,
        });
        Ok(result)
    }

    /// 与 `execute` 相同，但前置失败也折叠为 500 结果
    pub async fn run(&self, request: &CrawlRequest) -> CrawlResult {
        match self.execute(request).await {
            Ok(result) => result,
            Err(e) => {
                error!("请求 {} 失败: {}", request.request_id, e);
                let result =
                    CrawlResult::failure(request.request_id.clone(), request.event_type.clone(), &e);
                self.emit(CrawlEvent::RequestCompleted {
                    request_id: result.request_id.clone(),
                    status_code: result.status_code,
                });
                result
            }
        }
    }

    async fn dispatch(
        &self,
        collector: &dyn Collector,
        session: &dyn RenderSession,
        items: &[WorkItem],
    ) -> Vec<CollectionOutcome> {
        let total = items.len();
        let mut outcomes = Vec::with_capacity(total);

        for (index, item) in items.iter().enumerate() {
            let label = item.label();
            if let Some(events) = &self.events {
                events.item_started(index, total, &label);
            }
            info!("[{}/{}] {} 处理: {}", index + 1, total, collector.name(), label);

            let result = AssertUnwindSafe(collector.execute(session, item))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(CrawlerError::Custom(panic_message(&*panic))));

            match result {
                Ok(produced) => {
                    for outcome in &produced {
                        self.emit(CrawlEvent::ItemFinished {
                            index,
                            status_code: outcome.status_code,
                        });
                    }
                    outcomes.extend(produced);
                }
                Err(e) => {
                    error!("条目处理失败 [{}]: {}", label, e);
                    if let Some(events) = &self.events {
                        events.item_failed(index, &label, &e);
                    }
                    outcomes.push(CollectionOutcome::failed(item, &e));
                }
            }
        }

        outcomes
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("collector panicked: {}", detail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_payloads_are_readable() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(&*payload), "collector panicked: boom");

        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(&*payload), "collector panicked: bang");

        let payload: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(&*payload), "collector panicked: unknown panic");
    }
}
