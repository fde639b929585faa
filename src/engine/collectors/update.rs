use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::core::error::{CrawlerError, Result};
use crate::core::message::{CollectionOutcome, OutcomeData};
use crate::core::model::{EpisodeUpdate, WorkItem};
use crate::interfaces::platform::{PageState, PlatformAdapter};
use crate::interfaces::render::{RenderPage, RenderSession, close_page};
use crate::sites::PlatformRegistry;

use super::{Collector, merge_episodes, require_target};

/// 没有新话时附带的说明
pub const NO_NEW_EPISODES: &str = "No new episodes. Collection is on hold.";

/// 增量更新收集器
///
/// 只比较话数；话数增加 N 时返回最新的 N 话 (免费与付费合并)。
pub struct UpdateCollector {
    registry: Arc<PlatformRegistry>,
}

impl UpdateCollector {
    pub fn new(registry: Arc<PlatformRegistry>) -> Self {
        Self { registry }
    }

    async fn check(
        &self,
        adapter: &dyn PlatformAdapter,
        page: &dyn RenderPage,
        item: &WorkItem,
        target: &str,
        previous: u32,
    ) -> Result<CollectionOutcome> {
        let mut state = PageState::default();
        adapter.load_page(page, &mut state, target).await?;
        let url = match state.loaded() {
            Some(url) => url.to_string(),
            None => adapter.resolve_url(target)?,
        };

        let current = adapter.scrap_episode_count(page).await?;
        let id = match &item.identifier {
            Some(id) => id.clone(),
            None => adapter.scrap_unique_id(page).await?,
        };

        if current <= previous {
            info!("[{}] 无新话: 当前 {} / 已知 {}", id, current, previous);
            return Ok(CollectionOutcome::no_change(OutcomeData::Update(
                EpisodeUpdate {
                    id,
                    url,
                    platform: adapter.platform(),
                    episode_count: current,
                    episodes: Vec::new(),
                    last_updated_date: None,
                    message: Some(NO_NEW_EPISODES.to_string()),
                },
            )));
        }

        let delta = (current - previous) as usize;
        info!("[{}] 新增 {} 话: {} -> {}", id, delta, previous, current);

        let last_updated_date = adapter.scrap_last_updated_date(page).await?;
        let free = adapter
            .scrap_latest_free_episodes(page, &mut state, delta)
            .await?;
        adapter.load_page(page, &mut state, target).await?;
        let paid = adapter
            .scrap_latest_paid_episodes(page, &mut state, delta)
            .await?;

        Ok(CollectionOutcome::ok(OutcomeData::Update(EpisodeUpdate {
            id,
            url,
            platform: adapter.platform(),
            episode_count: current,
            episodes: merge_episodes(paid, free, delta),
            last_updated_date,
            message: None,
        })))
    }
}

#[async_trait]
impl Collector for UpdateCollector {
    fn name(&self) -> &'static str {
        "incremental-update"
    }

    async fn execute(
        &self,
        session: &dyn RenderSession,
        item: &WorkItem,
    ) -> Result<Vec<CollectionOutcome>> {
        let adapter = self.registry.resolve(&item.platform)?;
        let target = require_target(item)?;
        let previous = item.episode_count.ok_or_else(|| {
            CrawlerError::InvalidRequest("episodeCount is required for incremental update".into())
        })?;

        let page = session.new_page().await?;
        let result = self
            .check(adapter.as_ref(), page.as_ref(), item, target, previous)
            .await;
        close_page(page.as_ref()).await;
        Ok(vec![result?])
    }
}
