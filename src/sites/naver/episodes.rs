//! Naver 话数列表来源
//!
//! 免费列表按页码翻页；付费预览区只有一屏，不翻页。

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::debug;

use crate::core::config::TimeoutConfig;
use crate::core::error::Result;
use crate::core::model::Episode;
use crate::engine::pagination::EpisodeSource;
use crate::interfaces::render::RenderPage;

use super::parser;
use super::selectors as css;
use super::urls::UrlScheme;

/// 倒序免费列表
pub struct FreeListSource<'a> {
    pub(super) page: &'a dyn RenderPage,
    pub(super) urls: &'a UrlScheme,
    pub(super) timeouts: &'a TimeoutConfig,
    pub(super) title_id: String,
    /// 是否离开过初始页面
    pub(super) navigated: bool,
}

#[async_trait]
impl EpisodeSource for FreeListSource<'_> {
    async fn load(&mut self, page_no: u32) -> Result<bool> {
        let url = self.urls.page_url(&self.title_id, page_no);
        debug!("翻页: {}", url);

        sleep(self.timeouts.before_navigation()).await;
        self.navigated = true;
        self.page.goto(&url, self.timeouts.page_load()).await?;
        sleep(self.timeouts.after_navigation()).await;

        self.page
            .wait_for_selector(css::EPISODE_LIST, self.timeouts.navigation_wait())
            .await?;
        let html = self.page.content().await?;
        Ok(parser::has_free_episodes(&html))
    }

    async fn extract(&mut self, _page_no: u32) -> Result<Vec<Episode>> {
        self.page
            .wait_for_selector(css::EPISODE_LIST, self.timeouts.selector_wait())
            .await?;
        let html = self.page.content().await?;
        parser::parse_free_episodes(&html, self.urls)
    }
}

/// 付费预览区
pub struct PaidListSource<'a> {
    pub(super) page: &'a dyn RenderPage,
    pub(super) urls: &'a UrlScheme,
    pub(super) timeouts: &'a TimeoutConfig,
    pub(super) title_id: String,
    pub(super) total: u32,
}

#[async_trait]
impl EpisodeSource for PaidListSource<'_> {
    async fn load(&mut self, _page_no: u32) -> Result<bool> {
        Ok(false)
    }

    async fn extract(&mut self, _page_no: u32) -> Result<Vec<Episode>> {
        self.page
            .wait_for_selector(css::EPISODE_PAID_ITEM, self.timeouts.selector_wait())
            .await?;
        let html = self.page.content().await?;
        parser::parse_paid_episodes(&html, self.total, &self.title_id, self.urls)
    }
}
