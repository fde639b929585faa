//! Naver URL 方案

use url::Url;

use crate::core::config::PlatformConfig;
use crate::core::error::{CrawlerError, Result};
use crate::utils::{strip_query_param, to_absolute_url};

const DEFAULT_BASE: &str = "https://comic.naver.com";
const DEFAULT_MOBILE_BASE: &str = "https://m.comic.naver.com";

/// 星期目录标签，最后一个为每日连载
pub const WEEKLY_TABS: [&str; 8] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun", "dailyPlus"];

#[derive(Debug, Clone)]
pub struct UrlScheme {
    base: Url,
    mobile: Url,
}

impl UrlScheme {
    pub fn new(config: &PlatformConfig) -> Result<Self> {
        let base = config.base_url.as_deref().unwrap_or(DEFAULT_BASE);
        let mobile = config.mobile_base_url.as_deref().unwrap_or(DEFAULT_MOBILE_BASE);
        Ok(Self {
            base: Url::parse(base)?,
            mobile: Url::parse(mobile)?,
        })
    }

    fn root(url: &Url) -> String {
        url.as_str().trim_end_matches('/').to_string()
    }

    /// 作品页
    pub fn title_url(&self, title_id: &str) -> String {
        format!("{}/webtoon/list?titleId={}", Self::root(&self.base), title_id)
    }

    /// 倒序列表第 N 页
    pub fn page_url(&self, title_id: &str, page: u32) -> String {
        format!(
            "{}/webtoon/list?titleId={}&page={}&sort=DESC",
            Self::root(&self.base),
            title_id,
            page
        )
    }

    /// 正序列表第一页 (最早的话)
    pub fn oldest_first_url(&self, title_id: &str) -> String {
        format!(
            "{}/webtoon/list?titleId={}&page=1&sort=ASC",
            Self::root(&self.base),
            title_id
        )
    }

    pub fn tab_url(&self, tab: &str) -> String {
        format!("{}/webtoon?tab={}", Self::root(&self.base), tab)
    }

    pub fn mobile_episode_url(&self, title_id: &str, no: u32) -> String {
        format!(
            "{}/external/appLaunchBridge?type=ARTICLE_DETAIL&titleId={}&no={}",
            Self::root(&self.mobile),
            title_id,
            no
        )
    }

    /// 站内链接转绝对地址，并去掉 `week` 参数
    pub fn episode_link(&self, href: &str) -> String {
        strip_query_param(&to_absolute_url(&self.base, href), "week")
    }

    pub fn absolute(&self, href: &str) -> String {
        to_absolute_url(&self.base, href)
    }

    /// 标识符或 URL 解析为作品页 URL
    ///
    /// URL 必须属于本站，且统一归一为作品首页 (去掉 `page`/`sort` 等参数)。
    pub fn resolve(&self, target: &str) -> Result<String> {
        let target = target.trim();
        if target.starts_with("http://") || target.starts_with("https://") {
            return self.canonical_title_url(target);
        }
        if !target.is_empty() && target.chars().all(|c| c.is_ascii_digit()) {
            return Ok(self.title_url(target));
        }
        Err(CrawlerError::InvalidRequest(format!(
            "'{}' is neither a titleId nor a URL",
            target
        )))
    }

    fn canonical_title_url(&self, target: &str) -> Result<String> {
        let url = Url::parse(target)
            .map_err(|e| CrawlerError::InvalidRequest(format!("bad url '{}': {}", target, e)))?;
        if url.host_str() != self.base.host_str()
            || url.port_or_known_default() != self.base.port_or_known_default()
        {
            return Err(CrawlerError::InvalidRequest(format!(
                "'{}' is not on {}",
                target,
                Self::root(&self.base)
            )));
        }
        let title_id = url
            .query_pairs()
            .find(|(k, _)| k == "titleId")
            .map(|(_, v)| v.into_owned())
            .filter(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()))
            .ok_or_else(|| CrawlerError::InvalidRequest(format!("no titleId in '{}'", target)))?;
        Ok(self.title_url(&title_id))
    }
}
