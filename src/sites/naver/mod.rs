//! Naver Webtoon 适配器
//!
//! 渲染后的 HTML 交给 `parser` 中的纯函数解析，本模块只负责等待、点击与导航。

mod episodes;
pub mod parser;
pub mod selectors;
pub mod urls;

use async_trait::async_trait;
use chrono::NaiveDate;
use indexmap::IndexSet;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::core::config::{AppConfig, PaginationConfig, TimeoutConfig};
use crate::core::error::{CrawlerError, FieldContext, Result};
use crate::core::model::{
    AgeRating, Author, Episode, Novel, Platform, Status, TitleSummary,
};
use crate::engine::pagination::{PaginationWalker, ScrollPolicy, scroll_until_stable};
use crate::interfaces::platform::{PageState, PlatformAdapter};
use crate::interfaces::render::{RenderPage, RenderSession, close_page};

use self::episodes::{FreeListSource, PaidListSource};
use self::selectors::{self as css, SiteSelectors};
use self::urls::{UrlScheme, WEEKLY_TABS};

/// 触发懒加载内容
const NUDGE_SCRIPT: &str = "window.scrollBy(0, 500)";

/// Naver 适配器
pub struct Naver {
    urls: UrlScheme,
    timeouts: TimeoutConfig,
    pagination: PaginationConfig,
    scroll: ScrollPolicy,
}

impl Naver {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let urls = UrlScheme::new(&config.platform(&Platform::Naver.config_key()))?;
        Ok(Self {
            urls,
            timeouts: config.timeouts.clone(),
            pagination: config.pagination.clone(),
            scroll: ScrollPolicy {
                stall_threshold: config.catalog.scroll_stall_threshold,
                max_scrolls: config.catalog.max_scrolls,
                wait: config.timeouts.scroll_wait(),
            },
        })
    }

    /// 等待选择器后读取整页 HTML
    async fn snapshot(&self, page: &dyn RenderPage, selector: &str) -> Result<String> {
        page.wait_for_selector(selector, self.timeouts.selector_wait())
            .await?;
        page.content().await
    }

    async fn meta(&self, page: &dyn RenderPage) -> Result<(String, String)> {
        let html = self.snapshot(page, css::META_INFO).await?;
        let meta = parser::meta_text(&html).unwrap_or_default();
        Ok((meta, html))
    }

    /// 当前页面对应的 titleId
    async fn current_title_id(&self, page: &dyn RenderPage, state: &PageState) -> Result<String> {
        let url = match state.loaded() {
            Some(url) => url.to_string(),
            None => page
                .url()
                .await?
                .ok_or_else(|| CrawlerError::Malformed("page has no URL".into()))?,
        };
        parser::parse_unique_id(&url)
    }

    async fn walk_free(
        &self,
        page: &dyn RenderPage,
        state: &mut PageState,
        limit: usize,
        max_failures: u32,
    ) -> Result<Vec<Episode>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut source = FreeListSource {
            page,
            urls: &self.urls,
            timeouts: &self.timeouts,
            title_id: self.current_title_id(page, state).await?,
            navigated: false,
        };

        let walker = PaginationWalker::new(max_failures, self.timeouts.error_recovery());
        let report = walker.walk(&mut source, limit).await;
        if source.navigated {
            state.invalidate();
        }
        debug!(
            "免费话遍历完成: {} 条 / 目标 {} / {} 页",
            report.episodes.len(),
            limit,
            report.pages
        );
        if let Some(stall) = &report.stall {
            debug!("免费话列表不完整 (标题 {}): {}", source.title_id, stall);
        }
        Ok(report.episodes)
    }

    async fn collect_paid(
        &self,
        page: &dyn RenderPage,
        state: &mut PageState,
        total: u32,
        limit: usize,
        max_failures: u32,
    ) -> Result<Vec<Episode>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let title_id = self.current_title_id(page, state).await?;

        if !page.click(css::PREVIEW_BUTTON).await? {
            debug!("未找到预览按钮，无付费话");
            return Ok(Vec::new());
        }
        // 预览区展开后页面不再是初始状态
        state.invalidate();
        sleep(self.timeouts.dynamic_content()).await;

        let mut source = PaidListSource {
            page,
            urls: &self.urls,
            timeouts: &self.timeouts,
            title_id,
            total,
        };
        let walker = PaginationWalker::new(max_failures, self.timeouts.error_recovery());
        let report = walker.walk(&mut source, limit).await;
        if let Some(stall) = &report.stall {
            debug!("付费话列表不完整 (标题 {}): {}", source.title_id, stall);
        }
        Ok(report.episodes)
    }

    /// 打开列表页并解析条目
    async fn read_listing(
        &self,
        page: &dyn RenderPage,
        url: &str,
        today_only: bool,
    ) -> Result<Vec<TitleSummary>> {
        page.goto(url, self.timeouts.page_load()).await?;
        page.wait_for_selector(css::CONTENT_LIST, self.timeouts.navigation_wait())
            .await
            .map_err(|e| CrawlerError::navigation(url, e))?;
        sleep(self.timeouts.dynamic_content()).await;

        let html = page.content().await?;
        Ok(parser::parse_title_list(&html, &self.urls, today_only))
    }

    async fn weekly_catalog(&self, page: &dyn RenderPage) -> Result<Vec<TitleSummary>> {
        let mut titles = Vec::new();
        let mut failed = 0usize;

        for tab in WEEKLY_TABS {
            sleep(self.timeouts.before_navigation()).await;
            match self.read_listing(page, &self.urls.tab_url(tab), false).await {
                Ok(found) => {
                    info!("目录 [{}]: {} 部作品", tab, found.len());
                    titles.extend(found);
                }
                Err(e) => {
                    warn!("目录 [{}] 抓取失败: {}", tab, e);
                    failed += 1;
                }
            }
        }

        if failed == WEEKLY_TABS.len() {
            return Err(CrawlerError::navigation(
                self.urls.tab_url(WEEKLY_TABS[0]),
                "every weekday tab failed",
            ));
        }
        Ok(titles)
    }

    async fn completed_catalog(&self, page: &dyn RenderPage) -> Result<Vec<TitleSummary>> {
        let url = self.urls.tab_url("finish");
        page.goto(&url, self.timeouts.page_load()).await?;
        page.wait_for_selector(css::CONTENT_LIST, self.timeouts.navigation_wait())
            .await
            .map_err(|e| CrawlerError::navigation(&url, e))?;

        let report =
            scroll_until_stable(page, &SiteSelectors::get().content_item, &self.scroll).await?;
        info!(
            "完结目录滚动结束: {} 次滚动, {} 个条目",
            report.scrolls, report.item_count
        );

        let html = page.content().await?;
        Ok(parser::parse_title_list(&html, &self.urls, false))
    }
}

#[async_trait]
impl PlatformAdapter for Naver {
    fn platform(&self) -> Platform {
        Platform::Naver
    }

    fn resolve_url(&self, target: &str) -> Result<String> {
        self.urls.resolve(target)
    }

    async fn load_page(
        &self,
        page: &dyn RenderPage,
        state: &mut PageState,
        target: &str,
    ) -> Result<()> {
        let url = self.resolve_url(target)?;
        if state.is_loaded(&url) {
            debug!("页面已加载，跳过导航: {}", url);
            return Ok(());
        }

        state.invalidate();
        page.goto(&url, self.timeouts.page_load()).await?;

        let wait = self.timeouts.navigation_wait();
        tokio::try_join!(
            page.wait_for_selector(css::TITLE, wait),
            page.wait_for_selector(css::EPISODE_ITEM, wait),
            page.wait_for_selector(css::DESCRIPTION, wait),
        )
        .map_err(|e| CrawlerError::navigation(&url, e))?;

        if let Err(e) = page.evaluate(NUDGE_SCRIPT).await {
            debug!("懒加载触发失败: {}", e);
        }
        sleep(self.timeouts.dynamic_content()).await;

        state.mark_loaded(url);
        Ok(())
    }

    async fn scrap_title(&self, page: &dyn RenderPage) -> Result<String> {
        let html = self.snapshot(page, css::TITLE).await.field("title")?;
        parser::parse_title(&html).field("title")
    }

    async fn scrap_description(&self, page: &dyn RenderPage) -> Result<String> {
        let html = self
            .snapshot(page, css::DESCRIPTION)
            .await
            .field("description")?;
        parser::parse_description(&html).field("description")
    }

    async fn scrap_thumbnail_url(&self, page: &dyn RenderPage) -> Result<String> {
        let html = self
            .snapshot(page, css::THUMBNAIL)
            .await
            .field("thumbnail")?;
        parser::parse_thumbnail(&html, &self.urls).field("thumbnail")
    }

    async fn scrap_unique_id(&self, page: &dyn RenderPage) -> Result<String> {
        let url = page
            .url()
            .await?
            .ok_or_else(|| CrawlerError::Malformed("page has no URL".into()))
            .field("unique id")?;
        parser::parse_unique_id(&url).field("unique id")
    }

    async fn scrap_age_rating(&self, page: &dyn RenderPage) -> Result<Option<AgeRating>> {
        let (meta, _) = self.meta(page).await.field("age rating")?;
        Ok(parser::parse_age_rating(&meta))
    }

    async fn scrap_status(&self, page: &dyn RenderPage) -> Result<Status> {
        let (meta, html) = self.meta(page).await.field("status")?;
        let badge = parser::hiatus_badge(&html);
        Ok(parser::parse_status(&meta, badge.as_deref()))
    }

    async fn scrap_day_of_week(&self, page: &dyn RenderPage) -> Result<Option<String>> {
        let (meta, _) = self.meta(page).await.field("day of week")?;
        Ok(parser::parse_day_of_week(&meta))
    }

    async fn scrap_episode_count(&self, page: &dyn RenderPage) -> Result<u32> {
        let html = self
            .snapshot(page, css::EPISODE_COUNT)
            .await
            .field("episode count")?;
        parser::parse_episode_count(&html).field("episode count")
    }

    async fn scrap_preview_count(&self, page: &dyn RenderPage) -> Result<u32> {
        match self.snapshot(page, css::PREVIEW_AREA).await {
            Ok(html) => Ok(parser::parse_preview_count(&html)),
            Err(e) if e.is_timeout() => Ok(0),
            Err(e) => Err(e).field("preview count"),
        }
    }

    async fn scrap_genres(&self, page: &dyn RenderPage) -> Result<IndexSet<String>> {
        match page.click(css::GENRE_EXPAND_BUTTON).await {
            Ok(true) => sleep(self.timeouts.dynamic_content()).await,
            Ok(false) => debug!("未找到分类展开按钮"),
            Err(e) => debug!("分类展开失败: {}", e),
        }

        match self.snapshot(page, css::GENRE_TAG).await {
            Ok(html) => Ok(parser::parse_genres(&html)),
            Err(e) if e.is_timeout() => Ok(IndexSet::new()),
            Err(e) => Err(e).field("genres"),
        }
    }

    async fn scrap_authors(&self, page: &dyn RenderPage) -> Result<Vec<Author>> {
        let html = self
            .snapshot(page, css::AUTHOR_CATEGORY)
            .await
            .field("authors")?;
        Ok(parser::parse_authors(&html))
    }

    async fn scrap_last_updated_date(&self, page: &dyn RenderPage) -> Result<Option<NaiveDate>> {
        let html = self
            .snapshot(page, css::EPISODE_ITEM)
            .await
            .field("last updated date")?;
        parser::parse_first_episode_date(&html).field("last updated date")
    }

    async fn scrap_publish_start_date(
        &self,
        page: &dyn RenderPage,
        state: &mut PageState,
    ) -> Result<Option<NaiveDate>> {
        let origin = match state.loaded() {
            Some(url) => url.to_string(),
            None => page
                .url()
                .await?
                .ok_or_else(|| CrawlerError::Malformed("page has no URL".into()))?,
        };
        let title_id = parser::parse_unique_id(&origin).field("publish start date")?;
        let oldest = self.urls.oldest_first_url(&title_id);

        let outcome = async {
            page.goto(&oldest, self.timeouts.page_load()).await?;
            let html = self.snapshot(page, css::EPISODE_ITEM).await?;
            parser::parse_first_episode_date(&html)
        }
        .await
        .field("publish start date");

        // 恢复原页面
        let restored = async {
            page.goto(&origin, self.timeouts.page_load()).await?;
            page.wait_for_selector(css::TITLE, self.timeouts.navigation_wait())
                .await
        }
        .await;
        if let Err(e) = restored {
            warn!("恢复原页面失败: {}", e);
            state.invalidate();
        }

        outcome
    }

    async fn scrap_free_episodes(
        &self,
        page: &dyn RenderPage,
        state: &mut PageState,
    ) -> Result<Vec<Episode>> {
        let (total, preview) = tokio::try_join!(
            self.scrap_episode_count(page),
            self.scrap_preview_count(page)
        )?;
        let limit = total.saturating_sub(preview) as usize;
        self.walk_free(page, state, limit, self.pagination.full_max_failures)
            .await
            .field("free episodes")
    }

    async fn scrap_paid_episodes(
        &self,
        page: &dyn RenderPage,
        state: &mut PageState,
    ) -> Result<Vec<Episode>> {
        let (total, preview) = tokio::try_join!(
            self.scrap_episode_count(page),
            self.scrap_preview_count(page)
        )?;
        self.collect_paid(
            page,
            state,
            total,
            preview as usize,
            self.pagination.full_max_failures,
        )
        .await
        .field("paid episodes")
    }

    async fn scrap_latest_free_episodes(
        &self,
        page: &dyn RenderPage,
        state: &mut PageState,
        count: usize,
    ) -> Result<Vec<Episode>> {
        self.walk_free(page, state, count, self.pagination.latest_max_failures)
            .await
            .field("latest free episodes")
    }

    async fn scrap_latest_paid_episodes(
        &self,
        page: &dyn RenderPage,
        state: &mut PageState,
        count: usize,
    ) -> Result<Vec<Episode>> {
        let total = self.scrap_episode_count(page).await?;
        self.collect_paid(
            page,
            state,
            total,
            count,
            self.pagination.latest_max_failures,
        )
        .await
        .field("latest paid episodes")
    }

    async fn scrap_related_novels(&self, page: &dyn RenderPage) -> Result<Option<Vec<Novel>>> {
        match self.snapshot(page, css::PRODUCT_LIST).await {
            Ok(html) => Ok(parser::parse_related_novels(&html, &self.urls)),
            Err(e) if e.is_timeout() => Ok(None),
            Err(e) => Err(e).field("related novels"),
        }
    }

    async fn scrap_related_webtoon_ids(
        &self,
        page: &dyn RenderPage,
    ) -> Result<Option<Vec<String>>> {
        match self.snapshot(page, css::RELATED_WEBTOONS).await {
            Ok(html) => Ok(parser::parse_related_webtoon_ids(&html)),
            Err(e) if e.is_timeout() => Ok(None),
            Err(e) => Err(e).field("related webtoons"),
        }
    }

    async fn scrap_new_title_list(&self, session: &dyn RenderSession) -> Result<Vec<TitleSummary>> {
        let page = session.new_page().await?;
        let result = self
            .read_listing(page.as_ref(), &self.urls.tab_url("new"), true)
            .await;
        close_page(page.as_ref()).await;
        result
    }

    async fn scrap_full_catalog(&self, session: &dyn RenderSession) -> Result<Vec<TitleSummary>> {
        let page = session.new_page().await?;
        let result = self.weekly_catalog(page.as_ref()).await;
        close_page(page.as_ref()).await;
        result
    }

    async fn scrap_completed_catalog(
        &self,
        session: &dyn RenderSession,
    ) -> Result<Vec<TitleSummary>> {
        let page = session.new_page().await?;
        let result = self.completed_catalog(page.as_ref()).await;
        close_page(page.as_ref()).await;
        result
    }
}
