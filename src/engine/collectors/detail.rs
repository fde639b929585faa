use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::core::error::Result;
use crate::core::message::{CollectionOutcome, OutcomeData};
use crate::core::model::{WebtoonRecord, WorkItem};
use crate::interfaces::platform::{PageState, PlatformAdapter};
use crate::interfaces::render::{RenderPage, RenderSession, close_page};
use crate::sites::PlatformRegistry;

use super::{Collector, merge_episodes, require_target};

/// 作品详情收集器
///
/// 一个条目产出一条完整的 [`WebtoonRecord`]。
pub struct DetailCollector {
    registry: Arc<PlatformRegistry>,
}

impl DetailCollector {
    pub fn new(registry: Arc<PlatformRegistry>) -> Self {
        Self { registry }
    }

    /// 抓取单个作品的完整记录
    pub async fn collect(
        &self,
        session: &dyn RenderSession,
        item: &WorkItem,
    ) -> Result<WebtoonRecord> {
        let adapter = self.registry.resolve(&item.platform)?;
        let target = require_target(item)?;

        let page = session.new_page().await?;
        let result = self
            .assemble(session, adapter.as_ref(), page.as_ref(), item, target)
            .await;
        close_page(page.as_ref()).await;
        result
    }

    async fn assemble(
        &self,
        session: &dyn RenderSession,
        adapter: &dyn PlatformAdapter,
        page: &dyn RenderPage,
        item: &WorkItem,
        target: &str,
    ) -> Result<WebtoonRecord> {
        let mut state = PageState::default();
        adapter.load_page(page, &mut state, target).await?;
        let url = match state.loaded() {
            Some(url) => url.to_string(),
            None => adapter.resolve_url(target)?,
        };

        // 各批次内的字段互不依赖，全部执行完后再检查结果
        let (title, unique_id, description, thumbnail_url) = tokio::join!(
            adapter.scrap_title(page),
            adapter.scrap_unique_id(page),
            adapter.scrap_description(page),
            adapter.scrap_thumbnail_url(page),
        );
        let (title, unique_id) = (title?, unique_id?);
        let (description, thumbnail_url) = (description?, thumbnail_url?);
        info!("正在抓取作品: {} ({})", title, unique_id);

        let (day_of_week, status, age_rating, episode_count, preview_count) = tokio::join!(
            adapter.scrap_day_of_week(page),
            adapter.scrap_status(page),
            adapter.scrap_age_rating(page),
            adapter.scrap_episode_count(page),
            adapter.scrap_preview_count(page),
        );
        let (day_of_week, status, age_rating) = (day_of_week?, status?, age_rating?);
        let (episode_count, preview_count) = (episode_count?, preview_count?);

        let (genres, authors) =
            tokio::join!(adapter.scrap_genres(page), adapter.scrap_authors(page));
        let (genres, authors) = (genres?, authors?);

        // 侧栏内容与最近更新日期都在初始页面上
        let (related_novels, related_webtoon_ids, last_updated_date) = tokio::join!(
            adapter.scrap_related_novels(page),
            adapter.scrap_related_webtoon_ids(page),
            adapter.scrap_last_updated_date(page),
        );
        let (related_novels, related_webtoon_ids) = (related_novels?, related_webtoon_ids?);
        let last_updated_date = last_updated_date?;

        let latest_free_episode = adapter
            .scrap_latest_free_episodes(page, &mut state, 1)
            .await?
            .into_iter()
            .next();

        adapter.load_page(page, &mut state, target).await?;
        let free = adapter.scrap_free_episodes(page, &mut state).await?;

        // 付费预览需要初始页面
        adapter.load_page(page, &mut state, target).await?;
        let paid = adapter.scrap_paid_episodes(page, &mut state).await?;
        debug!("免费话 {} 条, 付费话 {} 条", free.len(), paid.len());
        let episodes = merge_episodes(paid, free, usize::MAX);

        let publish_start_date = self.publish_start_date(session, adapter, target).await;

        Ok(WebtoonRecord {
            id: item.identifier.clone().unwrap_or_else(|| unique_id.clone()),
            url,
            title,
            unique_id,
            platform: adapter.platform(),
            description,
            thumbnail_url,
            day_of_week,
            status,
            age_rating,
            episode_count,
            preview_count,
            genres,
            authors,
            episodes,
            latest_free_episode,
            related_novels,
            related_webtoon_ids,
            publish_start_date,
            last_updated_date,
        })
    }

    /// 在独立页面上读取出版日期，失败时记为空
    async fn publish_start_date(
        &self,
        session: &dyn RenderSession,
        adapter: &dyn PlatformAdapter,
        target: &str,
    ) -> Option<NaiveDate> {
        let page = match session.new_page().await {
            Ok(page) => page,
            Err(e) => {
                warn!("无法打开出版日期页面: {}", e);
                return None;
            }
        };

        let mut state = PageState::default();
        let result = async {
            adapter.load_page(page.as_ref(), &mut state, target).await?;
            adapter
                .scrap_publish_start_date(page.as_ref(), &mut state)
                .await
        }
        .await;
        close_page(page.as_ref()).await;

        match result {
            Ok(date) => date,
            Err(e) => {
                warn!("出版日期抓取失败: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl Collector for DetailCollector {
    fn name(&self) -> &'static str {
        "full-detail"
    }

    async fn execute(
        &self,
        session: &dyn RenderSession,
        item: &WorkItem,
    ) -> Result<Vec<CollectionOutcome>> {
        let record = self.collect(session, item).await?;
        info!(
            "作品详情完成: {} (共 {} 话, 抓到 {} 条)",
            record.title,
            record.episode_count,
            record.episodes.len()
        );
        Ok(vec![CollectionOutcome::ok(OutcomeData::Record(Box::new(
            record,
        )))])
    }
}
