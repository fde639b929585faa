use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::core::error::Result;
use crate::core::message::{CollectionOutcome, OutcomeData};
use crate::core::model::{CatalogScope, WorkItem};
use crate::interfaces::render::RenderSession;
use crate::sites::PlatformRegistry;

use super::Collector;

/// 全目录收集器
pub struct CatalogCollector {
    registry: Arc<PlatformRegistry>,
}

impl CatalogCollector {
    pub fn new(registry: Arc<PlatformRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl Collector for CatalogCollector {
    fn name(&self) -> &'static str {
        "full-catalog"
    }

    async fn execute(
        &self,
        session: &dyn RenderSession,
        item: &WorkItem,
    ) -> Result<Vec<CollectionOutcome>> {
        let adapter = self.registry.resolve(&item.platform)?;

        let titles = match item.scope {
            CatalogScope::Weekly => adapter.scrap_full_catalog(session).await?,
            CatalogScope::Completed => adapter.scrap_completed_catalog(session).await?,
            CatalogScope::All => {
                let mut titles = adapter.scrap_full_catalog(session).await?;
                titles.extend(adapter.scrap_completed_catalog(session).await?);
                titles
            }
        };

        info!("目录抓取完成 ({:?}): {} 部作品", item.scope, titles.len());
        Ok(vec![CollectionOutcome::ok(OutcomeData::Titles(titles))])
    }
}
