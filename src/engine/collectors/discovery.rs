use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use crate::core::error::Result;
use crate::core::message::{CollectionOutcome, OutcomeData};
use crate::core::model::WorkItem;
use crate::interfaces::render::RenderSession;
use crate::sites::PlatformRegistry;

use super::{Collector, DetailCollector};

/// 今日新作收集器
///
/// `collect_details` 打开时逐个抓取详情，单个作品失败只影响它自己的结果。
pub struct DiscoveryCollector {
    registry: Arc<PlatformRegistry>,
    detail: Arc<DetailCollector>,
    collect_details: bool,
}

impl DiscoveryCollector {
    pub fn new(
        registry: Arc<PlatformRegistry>,
        detail: Arc<DetailCollector>,
        collect_details: bool,
    ) -> Self {
        Self {
            registry,
            detail,
            collect_details,
        }
    }
}

#[async_trait]
impl Collector for DiscoveryCollector {
    fn name(&self) -> &'static str {
        "new-title-discovery"
    }

    async fn execute(
        &self,
        session: &dyn RenderSession,
        item: &WorkItem,
    ) -> Result<Vec<CollectionOutcome>> {
        let adapter = self.registry.resolve(&item.platform)?;
        let titles = adapter.scrap_new_title_list(session).await?;
        info!("发现今日新作 {} 部", titles.len());

        if !self.collect_details || titles.is_empty() {
            return Ok(vec![CollectionOutcome::ok(OutcomeData::Titles(titles))]);
        }

        let mut outcomes = Vec::with_capacity(titles.len());
        for (i, summary) in titles.iter().enumerate() {
            info!("[{}/{}] 抓取新作详情: {}", i + 1, titles.len(), summary.title);
            let work = WorkItem::from(summary);
            match self.detail.collect(session, &work).await {
                Ok(record) => outcomes.push(CollectionOutcome::ok(OutcomeData::Record(
                    Box::new(record),
                ))),
                Err(e) => {
                    error!("新作详情失败 [{}]: {}", summary.id, e);
                    outcomes.push(CollectionOutcome::failed(&work, &e));
                }
            }
        }
        Ok(outcomes)
    }
}
