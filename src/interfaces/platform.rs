//! 平台适配器定义
//!
//! 将通用抽取契约绑定到具体平台的选择器与 URL 方案。

use async_trait::async_trait;
use chrono::NaiveDate;
use indexmap::IndexSet;

use crate::core::error::Result;
use crate::core::model::{
    AgeRating, Author, Episode, Novel, Platform, Status, TitleSummary,
};
use crate::interfaces::render::{RenderPage, RenderSession};

/// 页面加载状态
///
/// 由调用方持有并显式传入 `load_page`，适配器本身不保存任何可变状态。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageState {
    loaded: Option<String>,
}

impl PageState {
    /// 当前已加载的目标 URL
    pub fn loaded(&self) -> Option<&str> {
        self.loaded.as_deref()
    }

    pub fn is_loaded(&self, url: &str) -> bool {
        self.loaded.as_deref() == Some(url)
    }

    pub fn mark_loaded(&mut self, url: impl Into<String>) {
        self.loaded = Some(url.into());
    }

    /// 页面已离开加载时的状态 (翻页、点击展开等)
    pub fn invalidate(&mut self) {
        self.loaded = None;
    }
}

/// 平台适配器
///
/// 除 `load_page`、翻页与出版日期外，所有抽取方法都只读取当前页面，不改变导航状态，
/// 因此可以对同一页面并发调用。
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    fn platform(&self) -> Platform;

    /// 将标识符或 URL 解析为作品页 URL
    fn resolve_url(&self, target: &str) -> Result<String>;

    /// 加载作品页，已加载同一目标时为空操作
    async fn load_page(
        &self,
        page: &dyn RenderPage,
        state: &mut PageState,
        target: &str,
    ) -> Result<()>;

    // ---- 基本信息 ----
    async fn scrap_title(&self, page: &dyn RenderPage) -> Result<String>;
    async fn scrap_description(&self, page: &dyn RenderPage) -> Result<String>;
    async fn scrap_thumbnail_url(&self, page: &dyn RenderPage) -> Result<String>;
    async fn scrap_unique_id(&self, page: &dyn RenderPage) -> Result<String>;

    // ---- 元信息 ----
    async fn scrap_age_rating(&self, page: &dyn RenderPage) -> Result<Option<AgeRating>>;
    async fn scrap_status(&self, page: &dyn RenderPage) -> Result<Status>;
    async fn scrap_day_of_week(&self, page: &dyn RenderPage) -> Result<Option<String>>;
    async fn scrap_episode_count(&self, page: &dyn RenderPage) -> Result<u32>;
    async fn scrap_preview_count(&self, page: &dyn RenderPage) -> Result<u32>;

    // ---- 分类与作者 ----
    /// 会先尝试点击“展开”按钮，按钮缺失不视为错误
    async fn scrap_genres(&self, page: &dyn RenderPage) -> Result<IndexSet<String>>;
    async fn scrap_authors(&self, page: &dyn RenderPage) -> Result<Vec<Author>>;

    // ---- 日期 ----
    async fn scrap_last_updated_date(&self, page: &dyn RenderPage) -> Result<Option<NaiveDate>>;

    /// 跳转到正序列表读取第一话日期，返回前恢复原页面
    ///
    /// 恢复失败时 `state` 会被置为失效，调用方不应依赖页面状态。
    async fn scrap_publish_start_date(
        &self,
        page: &dyn RenderPage,
        state: &mut PageState,
    ) -> Result<Option<NaiveDate>>;

    // ---- 话数列表 ----
    /// 全部免费话 (经分页遍历)
    async fn scrap_free_episodes(
        &self,
        page: &dyn RenderPage,
        state: &mut PageState,
    ) -> Result<Vec<Episode>>;

    /// 全部付费预览话，需要页面处于刚加载的状态
    async fn scrap_paid_episodes(
        &self,
        page: &dyn RenderPage,
        state: &mut PageState,
    ) -> Result<Vec<Episode>>;

    async fn scrap_latest_free_episodes(
        &self,
        page: &dyn RenderPage,
        state: &mut PageState,
        count: usize,
    ) -> Result<Vec<Episode>>;

    async fn scrap_latest_paid_episodes(
        &self,
        page: &dyn RenderPage,
        state: &mut PageState,
        count: usize,
    ) -> Result<Vec<Episode>>;

    // ---- 关联内容 ----
    async fn scrap_related_novels(&self, page: &dyn RenderPage) -> Result<Option<Vec<Novel>>>;
    async fn scrap_related_webtoon_ids(&self, page: &dyn RenderPage)
    -> Result<Option<Vec<String>>>;

    // ---- 列表页 (自行开关页面) ----
    async fn scrap_new_title_list(&self, session: &dyn RenderSession) -> Result<Vec<TitleSummary>>;
    async fn scrap_full_catalog(&self, session: &dyn RenderSession) -> Result<Vec<TitleSummary>>;
    async fn scrap_completed_catalog(
        &self,
        session: &dyn RenderSession,
    ) -> Result<Vec<TitleSummary>>;
}
