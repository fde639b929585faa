//! 分页遍历器 (Pagination Walker)
//!
//! 逐页抽取并前进，直到满足数量、列表结束或连续失败达到上限。
//! 同时提供无限滚动页面的停滞检测。

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::core::error::{CrawlerError, Result};
use crate::core::model::Episode;
use crate::interfaces::render::RenderPage;

/// 可分页的话数来源
///
/// 第 1 页默认已处于加载状态，`load` 只会对第 2 页及之后调用
/// (以及第 1 页抽取失败后的重试)。
#[async_trait]
pub trait EpisodeSource: Send {
    /// 加载第 `page_no` 页，返回 `false` 表示已无更多页
    async fn load(&mut self, page_no: u32) -> Result<bool>;

    /// 抽取当前页
    async fn extract(&mut self, page_no: u32) -> Result<Vec<Episode>>;
}

/// 遍历结果
#[derive(Debug)]
pub struct WalkReport {
    pub episodes: Vec<Episode>,
    /// 成功抽取的页数
    pub pages: u32,
    /// 因连续失败提前结束时的原因
    pub stall: Option<CrawlerError>,
}

/// 分页遍历器
#[derive(Debug, Clone)]
pub struct PaginationWalker {
    max_failures: u32,
    backoff: Duration,
}

impl PaginationWalker {
    pub fn new(max_failures: u32, backoff: Duration) -> Self {
        Self {
            max_failures: max_failures.max(1),
            backoff,
        }
    }

    /// 遍历直到收集 `limit` 条
    ///
    /// 失败时重试同一页码而不是跳过；达到失败上限时返回已收集的部分结果。
    pub async fn walk<S>(&self, source: &mut S, limit: usize) -> WalkReport
    where
        S: EpisodeSource + ?Sized,
    {
        let mut collected: Vec<Episode> = Vec::new();
        let mut page_no = 1u32;
        let mut needs_load = false;
        let mut failures = 0u32;
        let mut pages = 0u32;
        let mut stall = None;
        let mut seen = HashSet::new();

        while seen.len() < limit {
            if failures >= self.max_failures {
                let err = CrawlerError::PaginationStall {
                    page: page_no,
                    failures,
                };
                warn!("{}，返回已收集的 {} 条", err, collected.len());
                stall = Some(err);
                break;
            }

            let step: Result<Option<Vec<Episode>>> = async {
                if needs_load && !source.load(page_no).await? {
                    return Ok(None);
                }
                source.extract(page_no).await.map(Some)
            }
            .await;

            match step {
                Ok(None) => {
                    debug!("第 {} 页无内容，列表结束", page_no);
                    break;
                }
                Ok(Some(items)) if items.is_empty() => {
                    debug!("第 {} 页为空，列表结束", page_no);
                    break;
                }
                Ok(Some(items)) => {
                    failures = 0;
                    let fresh = items
                        .iter()
                        .filter(|e| seen.insert(e.episode_number))
                        .count();
                    if fresh == 0 {
                        // 越界页码被站点钳制到最后一页
                        debug!("第 {} 页全部重复，列表结束", page_no);
                        break;
                    }
                    debug!("第 {} 页抽取 {} 条 (新 {} 条)", page_no, items.len(), fresh);
                    pages += 1;
                    collected.extend(items);
                    page_no += 1;
                    needs_load = true;
                }
                Err(e) => {
                    failures += 1;
                    warn!(
                        "第 {} 页处理失败 ({}/{}): {}",
                        page_no, failures, self.max_failures, e
                    );
                    // 重新加载同一页
                    needs_load = true;
                    if !self.backoff.is_zero() {
                        tokio::time::sleep(self.backoff).await;
                    }
                }
            }
        }

        WalkReport {
            episodes: dedup_and_cap(collected, limit),
            pages,
            stall,
        }
    }
}

/// 按话数编号去重 (先出现者保留)，并截断到 `limit`
pub fn dedup_and_cap(episodes: Vec<Episode>, limit: usize) -> Vec<Episode> {
    let mut seen = HashSet::new();
    episodes
        .into_iter()
        .filter(|e| seen.insert(e.episode_number))
        .take(limit)
        .collect()
}

// ============================================================================
// 无限滚动
// ============================================================================

const SCROLL_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight)";

/// 滚动停滞检测参数
#[derive(Debug, Clone)]
pub struct ScrollPolicy {
    /// 连续多少次未增长视为到底
    pub stall_threshold: u32,
    pub max_scrolls: u32,
    pub wait: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollReport {
    pub scrolls: u32,
    pub item_count: usize,
}

/// 反复滚动到底部，直到可见条目数在连续 `stall_threshold` 次滚动中不再增长
pub async fn scroll_until_stable(
    page: &dyn RenderPage,
    items: &Selector,
    policy: &ScrollPolicy,
) -> Result<ScrollReport> {
    let threshold = policy.stall_threshold.max(1);
    let mut count = count_matches(&page.content().await?, items);
    let mut stalls = 0u32;
    let mut scrolls = 0u32;

    while scrolls < policy.max_scrolls {
        page.evaluate(SCROLL_SCRIPT).await?;
        scrolls += 1;
        if !policy.wait.is_zero() {
            tokio::time::sleep(policy.wait).await;
        }

        let current = count_matches(&page.content().await?, items);
        if current > count {
            debug!("滚动 #{}: 条目 {} -> {}", scrolls, count, current);
            count = current;
            stalls = 0;
        } else {
            stalls += 1;
            debug!("滚动 #{}: 条目未增长 ({}/{})", scrolls, stalls, threshold);
            if stalls >= threshold {
                break;
            }
        }
    }

    Ok(ScrollReport {
        scrolls,
        item_count: count,
    })
}

fn count_matches(html: &str, selector: &Selector) -> usize {
    Html::parse_document(html).select(selector).count()
}
