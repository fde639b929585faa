//! 离线测试用的渲染会话替身与 Naver 页面夹具

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use scraper::{Html, Selector};
use serde_json::Value;

use webtoon_crawler::core::config::{AppConfig, TimeoutConfig};
use webtoon_crawler::core::error::{CrawlerError, Result};
use webtoon_crawler::core::message::{CrawlResult, ErrorReport};
use webtoon_crawler::interfaces::{RenderPage, RenderSession, ResultSink, SessionProvider};
use webtoon_crawler::sites::naver::selectors as css;

pub const BASE: &str = "https://comic.naver.com";

/// 无等待的测试配置
pub fn test_config() -> AppConfig {
    AppConfig {
        timeouts: TimeoutConfig::instant(),
        ..Default::default()
    }
}

// ============================================================================
// 脚本化站点
// ============================================================================

#[derive(Default)]
struct SiteState {
    routes: HashMap<String, String>,
    clicks: HashMap<(String, String), String>,
    scrolls: HashMap<String, Vec<String>>,
    gotos: HashMap<String, usize>,
    scroll_steps: usize,
}

#[derive(Default)]
struct Counters {
    launches: AtomicUsize,
    session_closes: AtomicUsize,
    pages_opened: AtomicUsize,
    pages_closed: AtomicUsize,
}

/// 所有页面共享的站点脚本与计数器
#[derive(Clone, Default)]
pub struct MockSite {
    state: Arc<Mutex<SiteState>>,
    counters: Arc<Counters>,
}

impl MockSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(&self, url: impl Into<String>, html: impl Into<String>) {
        self.state.lock().routes.insert(url.into(), html.into());
    }

    /// 在 `url` 上点击 `selector` 后页面变为 `html`
    pub fn on_click(&self, url: impl Into<String>, selector: &str, html: impl Into<String>) {
        self.state
            .lock()
            .clicks
            .insert((url.into(), selector.to_string()), html.into());
    }

    /// 每次滚动依次切换到下一个快照，用尽后停留在最后一个
    pub fn on_scroll(&self, url: impl Into<String>, snapshots: Vec<String>) {
        self.state.lock().scrolls.insert(url.into(), snapshots);
    }

    pub fn gotos(&self, url: &str) -> usize {
        self.state.lock().gotos.get(url).copied().unwrap_or(0)
    }

    pub fn scroll_steps(&self) -> usize {
        self.state.lock().scroll_steps
    }

    pub fn launches(&self) -> usize {
        self.counters.launches.load(Ordering::SeqCst)
    }

    pub fn session_closes(&self) -> usize {
        self.counters.session_closes.load(Ordering::SeqCst)
    }

    pub fn pages_opened(&self) -> usize {
        self.counters.pages_opened.load(Ordering::SeqCst)
    }

    pub fn pages_closed(&self) -> usize {
        self.counters.pages_closed.load(Ordering::SeqCst)
    }

    pub fn provider(&self) -> Arc<MockProvider> {
        Arc::new(MockProvider { site: self.clone() })
    }

    pub fn session(&self) -> MockSession {
        MockSession { site: self.clone() }
    }

    pub fn page(&self) -> MockPage {
        self.counters.pages_opened.fetch_add(1, Ordering::SeqCst);
        MockPage {
            site: self.clone(),
            view: Mutex::new(PageView::default()),
        }
    }
}

pub struct MockProvider {
    site: MockSite,
}

#[async_trait]
impl SessionProvider for MockProvider {
    async fn launch(&self) -> Result<Box<dyn RenderSession>> {
        self.site.counters.launches.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.site.session()))
    }
}

pub struct MockSession {
    site: MockSite,
}

#[async_trait]
impl RenderSession for MockSession {
    async fn new_page(&self) -> Result<Box<dyn RenderPage>> {
        Ok(Box::new(self.site.page()))
    }

    async fn close(&self) -> Result<()> {
        self.site
            .counters
            .session_closes
            .fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct PageView {
    url: Option<String>,
    html: String,
    scroll_idx: usize,
}

pub struct MockPage {
    site: MockSite,
    view: Mutex<PageView>,
}

fn matches(html: &str, selector: &str) -> Result<bool> {
    let sel = Selector::parse(selector)
        .map_err(|e| CrawlerError::Custom(format!("bad selector '{}': {:?}", selector, e)))?;
    Ok(Html::parse_document(html).select(&sel).next().is_some())
}

#[async_trait]
impl RenderPage for MockPage {
    async fn goto(&self, url: &str, _timeout: Duration) -> Result<()> {
        let html = {
            let mut state = self.site.state.lock();
            *state.gotos.entry(url.to_string()).or_default() += 1;
            state.routes.get(url).cloned()
        };
        let html = html.ok_or_else(|| CrawlerError::navigation(url, "no route"))?;

        let mut view = self.view.lock();
        view.url = Some(url.to_string());
        view.html = html;
        view.scroll_idx = 0;
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        let html = self.view.lock().html.clone();
        if matches(&html, selector)? {
            Ok(())
        } else {
            Err(CrawlerError::SelectorTimeout {
                selector: selector.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            })
        }
    }

    async fn evaluate(&self, script: &str) -> Result<Value> {
        if !script.contains("scrollHeight") {
            return Ok(Value::Null);
        }

        let mut view = self.view.lock();
        let mut state = self.site.state.lock();
        state.scroll_steps += 1;
        let Some(url) = view.url.clone() else {
            return Ok(Value::Null);
        };
        if let Some(snapshots) = state.scrolls.get(&url)
            && let Some(next) = snapshots.get(view.scroll_idx)
        {
            view.html = next.clone();
            view.scroll_idx += 1;
        }
        Ok(Value::Null)
    }

    async fn click(&self, selector: &str) -> Result<bool> {
        let (url, html) = {
            let view = self.view.lock();
            (view.url.clone(), view.html.clone())
        };
        if !matches(&html, selector)? {
            return Ok(false);
        }

        let next = url.and_then(|url| {
            self.site
                .state
                .lock()
                .clicks
                .get(&(url, selector.to_string()))
                .cloned()
        });
        if let Some(next) = next {
            self.view.lock().html = next;
        }
        Ok(true)
    }

    async fn content(&self) -> Result<String> {
        Ok(self.view.lock().html.clone())
    }

    async fn url(&self) -> Result<Option<String>> {
        Ok(self.view.lock().url.clone())
    }

    async fn close(&self) -> Result<()> {
        self.site
            .counters
            .pages_closed
            .fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// 输出端口替身
// ============================================================================

#[derive(Default)]
pub struct RecordingSink {
    pub results: Mutex<Vec<CrawlResult>>,
    pub errors: Mutex<Vec<ErrorReport>>,
}

#[async_trait]
impl ResultSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    async fn deliver(&self, result: &CrawlResult) -> Result<()> {
        self.results.lock().push(result.clone());
        Ok(())
    }

    async fn deliver_error(&self, report: &ErrorReport) -> Result<()> {
        self.errors.lock().push(report.clone());
        Ok(())
    }
}

// ============================================================================
// Naver 页面夹具
// ============================================================================

pub fn title_url(id: &str) -> String {
    format!("{}/webtoon/list?titleId={}", BASE, id)
}

pub fn page_url(id: &str, page: usize) -> String {
    format!("{}/webtoon/list?titleId={}&page={}&sort=DESC", BASE, id, page)
}

pub fn oldest_url(id: &str) -> String {
    format!("{}/webtoon/list?titleId={}&page=1&sort=ASC", BASE, id)
}

pub fn tab_url(tab: &str) -> String {
    format!("{}/webtoon?tab={}", BASE, tab)
}

/// 第 `no` 话的上传日期文本 (`YY.MM.DD`)
pub fn episode_date(no: u32) -> String {
    format!("24.{:02}.{:02}", 1 + (no / 28) % 12, 1 + no % 28)
}

/// 一部作品的页面集合
pub struct TitleFixture {
    pub id: String,
    pub title: String,
    pub total: u32,
    pub preview: u32,
    pub per_page: usize,
}

impl TitleFixture {
    pub fn new(id: &str, total: u32, preview: u32) -> Self {
        Self {
            id: id.to_string(),
            title: format!("작품 {}", id),
            total,
            preview,
            per_page: 5,
        }
    }

    pub fn free_total(&self) -> u32 {
        self.total - self.preview
    }

    fn free_pages(&self) -> Vec<Vec<u32>> {
        let numbers: Vec<u32> = (1..=self.free_total()).rev().collect();
        numbers.chunks(self.per_page).map(|c| c.to_vec()).collect()
    }

    fn free_item(&self, no: u32) -> String {
        format!(
            r#"<li class="EpisodeListList__item--M8zq4"><a href="/webtoon/detail?titleId={id}&no={no}&week=mon"><img src="/thumb/{no}.jpg"><span class="EpisodeListList__title--lfIzU">{no}화</span><span class="date">{date}</span></a></li>"#,
            id = self.id,
            no = no,
            date = episode_date(no)
        )
    }

    fn paid_item(&self, no: u32) -> String {
        format!(
            r#"<li class="EpisodeListList__item--M8zq4 EpisodeListList__bm--HDC0X"><a href="/webtoon/detail?titleId={id}&no={no}"><span class="EpisodeListList__title--lfIzU">{no}화</span><span class="date">3일 후 무료</span></a></li>"#,
            id = self.id,
            no = no
        )
    }

    /// 作品页外壳，`items` 为话数列表内容
    pub fn shell(&self, items: &str) -> String {
        let preview = if self.preview > 0 {
            format!(
                r#"<div class="EpisodeListPreview__text_area--WMXZz"><strong>미리보기 {}화</strong></div>
                <button class="EpisodeListPreview__button_preview--IBGaa">미리보기</button>"#,
                self.preview
            )
        } else {
            String::new()
        };

        format!(
            r#"<html><body>
              <div class="Poster__thumbnail_area--gviWY"><img src="https://image-comic.pstatic.net/{id}/thumb.jpg"></div>
              <h2 class="EpisodeListInfo__title--mYLjC">{title}</h2>
              <div class="ContentMetaInfo__meta_info--GbTg4">
                <span class="ContentMetaInfo__category--WwrCp"><a href="/artistTitle?id=111">김작가</a> 글/그림</span>
              </div>
              <div class="ContentMetaInfo__meta_info--GbTg4">
                <em class="ContentMetaInfo__info_item--utGrf">월요웹툰 ∙ 15세 이용가</em>
              </div>
              <div class="EpisodeListInfo__summary_wrap--ZWNW5"><p>{title} 줄거리</p></div>
              <div><a class="TagGroup__tag--xu0OH">#판타지</a><a class="TagGroup__tag--xu0OH">#액션</a></div>
              <div class="EpisodeListView__count--fTMc5">총 {total}화</div>
              {preview}
              <ul class="EpisodeListList__episode_list--_N3ks">{items}</ul>
            </body></html>"#,
            id = self.id,
            title = self.title,
            total = self.total,
            preview = preview,
            items = items
        )
    }

    fn render(&self, numbers: &[u32]) -> String {
        let items: String = numbers.iter().map(|no| self.free_item(*no)).collect();
        self.shell(&items)
    }

    /// 预览区展开后的作品页
    pub fn preview_page(&self) -> String {
        let mut items: String = (self.free_total() + 1..=self.total)
            .rev()
            .map(|no| self.paid_item(no))
            .collect();
        if let Some(first) = self.free_pages().first() {
            items.extend(first.iter().map(|no| self.free_item(*no)));
        }
        self.shell(&items)
    }

    /// 注册作品页、各分页、正序页与预览点击
    pub fn install(&self, site: &MockSite) {
        let pages = self.free_pages();
        let first = pages.first().cloned().unwrap_or_default();
        site.route(title_url(&self.id), self.render(&first));

        for (i, numbers) in pages.iter().enumerate() {
            site.route(page_url(&self.id, i + 1), self.render(numbers));
        }
        // 越界页码被钳制到最后一页
        if let Some(last) = pages.last() {
            site.route(page_url(&self.id, pages.len() + 1), self.render(last));
        }

        let oldest: Vec<u32> = (1..=self.free_total()).take(self.per_page).collect();
        site.route(oldest_url(&self.id), self.render(&oldest));

        if self.preview > 0 {
            site.on_click(title_url(&self.id), css::PREVIEW_BUTTON, self.preview_page());
        }
    }
}

/// 列表页 (新作/目录)，`(id, 标题, 是否今日上线)`
pub fn listing_html(items: &[(&str, &str, bool)]) -> String {
    let body: String = items
        .iter()
        .map(|(id, title, today)| {
            let badge = if *today { "오늘 공개" } else { "UP" };
            format!(
                r#"<li class="item"><div class="Poster__badge_wrap--zo3Dq"><span class="blind">{badge}</span></div><a class="ContentTitle__title_area--x24vt" href="/webtoon/list?titleId={id}"><span class="ContentTitle__title--e3qXt"><span class="text">{title}</span></span></a></li>"#
            )
        })
        .collect();
    format!(
        r#"<html><body><ul class="ContentList__content_list--q5KXY">{}</ul></body></html>"#,
        body
    )
}

/// `count` 个条目的列表页，编号从 1 开始
pub fn numbered_listing(count: usize) -> String {
    let ids: Vec<String> = (1..=count).map(|i| i.to_string()).collect();
    let titles: Vec<String> = (1..=count).map(|i| format!("완결작 {}", i)).collect();
    let items: Vec<(&str, &str, bool)> = ids
        .iter()
        .zip(&titles)
        .map(|(id, title)| (id.as_str(), title.as_str(), false))
        .collect();
    listing_html(&items)
}
