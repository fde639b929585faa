//! 核心数据模型 (Domain Models)
//!
//! 抽取结果、工作条目以及平台/事件类型的封闭枚举。

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use indexmap::IndexSet;
use serde::{Deserialize, Deserializer, Serialize};
use strum::EnumString;

// ============================================================================
// 平台与事件类型
// ============================================================================

/// 平台键
///
/// 未知平台落入 `Unsupported`，由注册表在解析适配器时报错。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Platform {
    #[default]
    #[strum(serialize = "NAVER")]
    Naver,
    #[strum(default)]
    Unsupported(String),
}

impl Platform {
    pub fn as_str(&self) -> &str {
        match self {
            Platform::Naver => "NAVER",
            Platform::Unsupported(raw) => raw,
        }
    }

    /// 配置表中使用的小写键
    pub fn config_key(&self) -> String {
        self.as_str().to_ascii_lowercase()
    }
}

/// 事件类型
///
/// 兼容旧版事件名 (`WEBTOON_CRAWL` 等)，大小写不敏感。
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum EventType {
    #[strum(serialize = "FULL_DETAIL", serialize = "WEBTOON_CRAWL")]
    FullDetail,
    #[strum(
        serialize = "INCREMENTAL_UPDATE",
        serialize = "WEBTOON_UPDATE",
        serialize = "CRAWL_WEBTOON_EPISODE"
    )]
    IncrementalUpdate,
    #[strum(serialize = "NEW_TITLE_DISCOVERY", serialize = "CRAWL_WEBTOON_NEW")]
    NewTitleDiscovery,
    #[strum(serialize = "FULL_CATALOG", serialize = "CRAWL_WEBTOON_ALL")]
    FullCatalog,
    #[strum(default)]
    Unsupported(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            EventType::FullDetail => "FULL_DETAIL",
            EventType::IncrementalUpdate => "INCREMENTAL_UPDATE",
            EventType::NewTitleDiscovery => "NEW_TITLE_DISCOVERY",
            EventType::FullCatalog => "FULL_CATALOG",
            EventType::Unsupported(raw) => raw,
        }
    }
}

macro_rules! string_enum_serde {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ty {
            /// 宽松解析，未知值落入 `Unsupported`
            pub fn from_key(raw: &str) -> Self {
                <$ty>::from_str(raw.trim()).unwrap_or_else(|_| Self::Unsupported(raw.to_string()))
            }
        }

        impl Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(d)?;
                Ok(Self::from_key(&raw))
            }
        }
    };
}

string_enum_serde!(Platform);
string_enum_serde!(EventType);

// ============================================================================
// 抽取字段
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PricingType {
    Free,
    Paid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Ongoing,
    Completed,
    Hiatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgeRating {
    All,
    #[serde(rename = "AGE_12")]
    Age12,
    #[serde(rename = "AGE_15")]
    Age15,
    Adult,
}

/// 作者角色 (封闭集合)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorRole {
    Writer,
    Illustrator,
    Original,
    Author,
    WriterAndIllustrator,
    WriterAndOriginal,
    IllustratorAndOriginal,
    WriterAndIllustratorAndOriginal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NovelType {
    Original,
    Book,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: Option<String>,
    pub name: String,
    pub role: Option<AuthorRole>,
}

/// 单话信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub title: String,
    pub upload_date: Option<NaiveDate>,
    pub link: String,
    pub episode_number: u32,
    pub thumbnail_url: Option<String>,
    pub pricing_type: PricingType,
    pub days_until_free: Option<u32>,
    pub mobile_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Novel {
    pub title: String,
    pub link: String,
    pub thumbnail_url: Option<String>,
    #[serde(rename = "type")]
    pub novel_type: NovelType,
    pub free_episode_count: Option<u32>,
}

/// 列表页上的作品摘要 (新作发现/目录)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleSummary {
    pub id: String,
    pub title: String,
    pub url: String,
    pub platform: Platform,
}

// ============================================================================
// 组合记录
// ============================================================================

/// 完整作品记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebtoonRecord {
    pub id: String,
    pub url: String,
    pub title: String,
    pub unique_id: String,
    pub platform: Platform,
    pub description: String,
    pub thumbnail_url: String,
    pub day_of_week: Option<String>,
    pub status: Status,
    pub age_rating: Option<AgeRating>,
    pub episode_count: u32,
    pub preview_count: u32,
    pub genres: IndexSet<String>,
    pub authors: Vec<Author>,
    pub episodes: Vec<Episode>,
    pub latest_free_episode: Option<Episode>,
    pub related_novels: Option<Vec<Novel>>,
    pub related_webtoon_ids: Option<Vec<String>>,
    pub publish_start_date: Option<NaiveDate>,
    pub last_updated_date: Option<NaiveDate>,
}

impl WebtoonRecord {
    /// 免费话数 = 总话数 - 预览话数
    pub fn free_episode_count(&self) -> u32 {
        self.episode_count.saturating_sub(self.preview_count)
    }
}

/// 增量更新结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeUpdate {
    pub id: String,
    pub url: String,
    pub platform: Platform,
    pub episode_count: u32,
    pub episodes: Vec<Episode>,
    pub last_updated_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ============================================================================
// 工作条目
// ============================================================================

/// 目录抓取范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CatalogScope {
    /// 按星期分类的连载目录
    #[default]
    Weekly,
    /// 完结作品 (无限滚动)
    Completed,
    All,
}

/// 一个抓取单元
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    #[serde(default)]
    pub platform: Platform,
    #[serde(
        default,
        alias = "id",
        alias = "titleId",
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// 上次已知的总话数
    #[serde(
        default,
        alias = "expectedEpisodeCount",
        skip_serializing_if = "Option::is_none"
    )]
    pub episode_count: Option<u32>,
    #[serde(default)]
    pub scope: CatalogScope,
}

impl WorkItem {
    pub fn for_identifier(platform: Platform, identifier: impl Into<String>) -> Self {
        Self {
            platform,
            identifier: Some(identifier.into()),
            ..Default::default()
        }
    }

    /// 导航目标：优先 URL，其次标识符
    pub fn target(&self) -> Option<&str> {
        self.url
            .as_deref()
            .or(self.identifier.as_deref())
            .filter(|s| !s.trim().is_empty())
    }

    /// 日志展示用标签
    pub fn label(&self) -> String {
        match (&self.title, self.target()) {
            (Some(title), Some(target)) => format!("{} ({})", title, target),
            (None, Some(target)) => target.to_string(),
            (Some(title), None) => title.clone(),
            (None, None) => format!("{} <singleton>", self.platform),
        }
    }
}

impl From<&TitleSummary> for WorkItem {
    fn from(summary: &TitleSummary) -> Self {
        Self {
            platform: summary.platform.clone(),
            identifier: Some(summary.id.clone()),
            url: Some(summary.url.clone()),
            title: Some(summary.title.clone()),
            ..Default::default()
        }
    }
}

/// 接受字符串或数字形式的标识符
fn string_or_number<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(Option::<Raw>::deserialize(d)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_accepts_aliases_case_insensitively() {
        assert_eq!(EventType::from_key("full_detail"), EventType::FullDetail);
        assert_eq!(EventType::from_key("WEBTOON_CRAWL"), EventType::FullDetail);
        assert_eq!(
            EventType::from_key("CRAWL_WEBTOON_EPISODE"),
            EventType::IncrementalUpdate
        );
        assert_eq!(EventType::from_key("CRAWL_WEBTOON_ALL"), EventType::FullCatalog);
        assert_eq!(
            EventType::from_key("DELETE_EVERYTHING"),
            EventType::Unsupported("DELETE_EVERYTHING".into())
        );
    }

    #[test]
    fn platform_round_trips_through_json() {
        let p: Platform = serde_json::from_str("\"naver\"").unwrap();
        assert_eq!(p, Platform::Naver);
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"NAVER\"");

        let other: Platform = serde_json::from_str("\"KAKAO\"").unwrap();
        assert_eq!(other, Platform::Unsupported("KAKAO".into()));
        assert_eq!(other.config_key(), "kakao");
    }

    #[test]
    fn work_item_accepts_legacy_field_names() {
        let item: WorkItem =
            serde_json::from_str(r#"{"titleId": 183559, "expectedEpisodeCount": 42}"#).unwrap();
        assert_eq!(item.platform, Platform::Naver);
        assert_eq!(item.identifier.as_deref(), Some("183559"));
        assert_eq!(item.episode_count, Some(42));
        assert_eq!(item.scope, CatalogScope::Weekly);
    }

    #[test]
    fn target_prefers_url_over_identifier() {
        let item = WorkItem {
            identifier: Some("1".into()),
            url: Some("https://comic.naver.com/webtoon/list?titleId=2".into()),
            ..Default::default()
        };
        assert_eq!(
            item.target(),
            Some("https://comic.naver.com/webtoon/list?titleId=2")
        );
        assert_eq!(WorkItem::default().target(), None);
    }

    #[test]
    fn age_rating_serializes_with_numeric_suffix() {
        assert_eq!(
            serde_json::to_string(&AgeRating::Age15).unwrap(),
            "\"AGE_15\""
        );
        assert_eq!(
            serde_json::to_string(&AuthorRole::WriterAndIllustrator).unwrap(),
            "\"WRITER_AND_ILLUSTRATOR\""
        );
    }
}
