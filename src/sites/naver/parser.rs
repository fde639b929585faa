//! Naver 页面解析
//!
//! 纯函数：输入渲染后的 HTML，输出单个字段。不持有 `Html` 跨越 await 点。

use std::sync::OnceLock;

use chrono::NaiveDate;
use indexmap::IndexSet;
use regex::Regex;
use scraper::{ElementRef, Html};

use crate::core::error::{CrawlerError, Result};
use crate::core::model::{
    AgeRating, Author, AuthorRole, Episode, Novel, NovelType, Platform, PricingType, Status,
    TitleSummary,
};
use crate::utils::{contains_date, first_number, format_date, query_param};

use super::selectors::{self as css, SiteSelectors};
use super::urls::UrlScheme;

/// 同日上线徽标
const TODAY_BADGE: &str = "오늘 공개";
const HIATUS_LABEL: &str = "휴재";
const COMPLETED_LABEL: &str = "완결";

fn text_of(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("valid regex"))
}

fn title_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"titleId=(\d+)")
}

/// 从 URL 中提取 titleId
pub fn title_id_of(url: &str) -> Option<String> {
    title_id_re()
        .captures(url)
        .map(|caps| caps[1].to_string())
}

// ============================================================================
// 基本信息
// ============================================================================

pub fn parse_title(html: &str) -> Result<String> {
    let doc = Html::parse_document(html);
    doc.select(&SiteSelectors::get().title)
        .next()
        .map(text_of)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| CrawlerError::missing(css::TITLE))
}

pub fn parse_description(html: &str) -> Result<String> {
    let doc = Html::parse_document(html);
    doc.select(&SiteSelectors::get().description_text)
        .next()
        .map(text_of)
        .ok_or_else(|| CrawlerError::missing(css::DESCRIPTION))
}

pub fn parse_thumbnail(html: &str, urls: &UrlScheme) -> Result<String> {
    let doc = Html::parse_document(html);
    doc.select(&SiteSelectors::get().thumbnail)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(|src| urls.absolute(src))
        .ok_or_else(|| CrawlerError::missing(css::THUMBNAIL))
}

pub fn parse_unique_id(url: &str) -> Result<String> {
    title_id_of(url).ok_or_else(|| CrawlerError::Malformed(format!("no titleId in '{}'", url)))
}

// ============================================================================
// 元信息
// ============================================================================

/// 元信息行，例如 `월요웹툰 ∙ 15세 이용가`
pub fn meta_text(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let s = SiteSelectors::get();
    doc.select(&s.meta_info)
        .flat_map(|block| block.select(&s.meta_info_item).collect::<Vec<_>>())
        .next()
        .map(text_of)
}

pub fn parse_age_rating(meta: &str) -> Option<AgeRating> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let caps = regex(&RE, r"(전체연령가|12세|15세|19세)").captures(meta)?;
    match &caps[1] {
        "전체연령가" => Some(AgeRating::All),
        "12세" => Some(AgeRating::Age12),
        "15세" => Some(AgeRating::Age15),
        "19세" => Some(AgeRating::Adult),
        _ => None,
    }
}

pub fn parse_status(meta: &str, hiatus_badge: Option<&str>) -> Status {
    if hiatus_badge.is_some_and(|b| b.trim() == HIATUS_LABEL) {
        return Status::Hiatus;
    }
    if meta.contains(COMPLETED_LABEL) {
        Status::Completed
    } else {
        Status::Ongoing
    }
}

pub fn hiatus_badge(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    doc.select(&SiteSelectors::get().hiatus_info)
        .next()
        .map(text_of)
}

pub fn parse_day_of_week(meta: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"[월화수목금토일]")
        .find(meta)
        .map(|m| m.as_str().to_string())
}

pub fn parse_episode_count(html: &str) -> Result<u32> {
    let doc = Html::parse_document(html);
    let text = doc
        .select(&SiteSelectors::get().episode_count)
        .next()
        .map(text_of)
        .ok_or_else(|| CrawlerError::missing(css::EPISODE_COUNT))?;
    first_number(&text)
        .ok_or_else(|| CrawlerError::Malformed(format!("episode count '{}'", text)))
}

/// 预览话数，区域缺失时为 0
pub fn parse_preview_count(html: &str) -> u32 {
    let doc = Html::parse_document(html);
    doc.select(&SiteSelectors::get().preview_count)
        .next()
        .and_then(|el| first_number(&text_of(el)))
        .unwrap_or(0)
}

// ============================================================================
// 分类与作者
// ============================================================================

pub fn parse_genres(html: &str) -> IndexSet<String> {
    let doc = Html::parse_document(html);
    doc.select(&SiteSelectors::get().genre_tag)
        .map(|el| text_of(el).replace('#', "").trim().to_string())
        .filter(|g| !g.is_empty())
        .collect()
}

/// 复合角色，三段式先于两段式匹配
const COMPOUND_ROLES: &[(&str, AuthorRole)] = &[
    ("글/그림/원작", AuthorRole::WriterAndIllustratorAndOriginal),
    ("글/원작/그림", AuthorRole::WriterAndIllustratorAndOriginal),
    ("그림/글/원작", AuthorRole::WriterAndIllustratorAndOriginal),
    ("그림/원작/글", AuthorRole::WriterAndIllustratorAndOriginal),
    ("원작/글/그림", AuthorRole::WriterAndIllustratorAndOriginal),
    ("원작/그림/글", AuthorRole::WriterAndIllustratorAndOriginal),
    ("글/그림", AuthorRole::WriterAndIllustrator),
    ("그림/글", AuthorRole::WriterAndIllustrator),
    ("글/원작", AuthorRole::WriterAndOriginal),
    ("원작/글", AuthorRole::WriterAndOriginal),
    ("그림/원작", AuthorRole::IllustratorAndOriginal),
    ("원작/그림", AuthorRole::IllustratorAndOriginal),
];

const SINGLE_ROLES: &[(&str, AuthorRole)] = &[
    ("원작", AuthorRole::Original),
    ("그림", AuthorRole::Illustrator),
    ("글", AuthorRole::Writer),
    ("작가", AuthorRole::Author),
];

/// 角色标签映射，复合词典优先
pub fn resolve_role(label: &str) -> Option<AuthorRole> {
    let normalized: String = label.chars().filter(|c| !c.is_whitespace()).collect();
    if normalized.is_empty() {
        return None;
    }
    COMPOUND_ROLES
        .iter()
        .chain(SINGLE_ROLES)
        .find(|(pattern, _)| normalized.contains(pattern))
        .map(|(_, role)| *role)
}

/// 作者 ID：`artistTitle?id=123` 或 `community/u/abc`
pub fn parse_author_id(href: &str) -> Option<String> {
    static ARTIST: OnceLock<Regex> = OnceLock::new();
    static COMMUNITY: OnceLock<Regex> = OnceLock::new();

    if href.contains("artistTitle") {
        return regex(&ARTIST, r"id=(\d+)")
            .captures(href)
            .map(|c| c[1].to_string());
    }
    if href.contains("community") {
        return regex(&COMMUNITY, r"u/([^?/]+)")
            .captures(href)
            .map(|c| c[1].to_string());
    }
    None
}

pub fn parse_authors(html: &str) -> Vec<Author> {
    let doc = Html::parse_document(html);
    let s = SiteSelectors::get();

    doc.select(&s.author_category)
        .filter_map(|category| {
            let link = category.select(&s.anchor).next()?;
            let name = text_of(link);
            if name.is_empty() {
                return None;
            }
            let full = text_of(category);
            let role_text = full.replacen(&name, "", 1);

            Some(Author {
                id: link.value().attr("href").and_then(parse_author_id),
                role: resolve_role(&role_text),
                name,
            })
        })
        .collect()
}

// ============================================================================
// 话数列表
// ============================================================================

/// 当前页的免费话
///
/// 没有话数编号的条目被跳过；日期存在但格式错误时整页失败。
pub fn parse_free_episodes(html: &str, urls: &UrlScheme) -> Result<Vec<Episode>> {
    let doc = Html::parse_document(html);
    let s = SiteSelectors::get();
    let mut episodes = Vec::new();

    for item in doc.select(&s.free_episode_item) {
        let Some(title) = item.select(&s.episode_title).next().map(text_of) else {
            continue;
        };
        let Some(href) = item
            .select(&s.episode_link)
            .next()
            .and_then(|a| a.value().attr("href"))
        else {
            continue;
        };
        let link = urls.episode_link(href);
        let Some(no) = query_param(&link, "no").and_then(|n| n.parse::<u32>().ok()) else {
            continue;
        };

        let upload_date = match item.select(&s.episode_date).next().map(text_of) {
            Some(text) if !text.is_empty() => Some(format_date(&text)?),
            _ => None,
        };

        episodes.push(Episode {
            title,
            upload_date,
            mobile_url: title_id_of(&link).map(|id| urls.mobile_episode_url(&id, no)),
            link,
            episode_number: no,
            thumbnail_url: item
                .select(&s.image)
                .next()
                .and_then(|img| img.value().attr("src"))
                .map(|src| urls.absolute(src)),
            pricing_type: PricingType::Free,
            days_until_free: None,
        });
    }

    Ok(episodes)
}

/// 列表中是否存在免费条目
pub fn has_free_episodes(html: &str) -> bool {
    let doc = Html::parse_document(html);
    doc.select(&SiteSelectors::get().free_episode_item)
        .next()
        .is_some()
}

fn parse_days_until_free(text: &str) -> Option<u32> {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(\d+)일\s*후\s*무료")
        .captures(text)
        .and_then(|c| c[1].parse().ok())
}

/// 预览区的付费话
///
/// 预览区只暴露位置，编号按 `total - index` 倒序分配。
pub fn parse_paid_episodes(
    html: &str,
    total: u32,
    title_id: &str,
    urls: &UrlScheme,
) -> Result<Vec<Episode>> {
    let doc = Html::parse_document(html);
    let s = SiteSelectors::get();
    let mut episodes = Vec::new();

    for (index, item) in doc.select(&s.paid_episode_item).enumerate() {
        let Some(no) = total.checked_sub(index as u32).filter(|n| *n > 0) else {
            break;
        };
        let title = item
            .select(&s.episode_title)
            .next()
            .map(text_of)
            .unwrap_or_default();
        let date_text = item
            .select(&s.episode_date)
            .next()
            .map(text_of)
            .unwrap_or_default();
        let upload_date = if contains_date(&date_text) {
            Some(format_date(&date_text)?)
        } else {
            None
        };

        episodes.push(Episode {
            title,
            upload_date,
            link: item
                .select(&s.episode_link)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(|href| urls.episode_link(href))
                .unwrap_or_default(),
            episode_number: no,
            thumbnail_url: item
                .select(&s.image)
                .next()
                .and_then(|img| img.value().attr("src"))
                .map(|src| urls.absolute(src)),
            pricing_type: PricingType::Paid,
            days_until_free: parse_days_until_free(&text_of(item)),
            mobile_url: Some(urls.mobile_episode_url(title_id, no)),
        });
    }

    Ok(episodes)
}

/// 首个免费条目的日期
pub fn parse_first_episode_date(html: &str) -> Result<Option<NaiveDate>> {
    let doc = Html::parse_document(html);
    let s = SiteSelectors::get();
    let text = doc
        .select(&s.free_episode_item)
        .next()
        .and_then(|item| item.select(&s.episode_date).next())
        .map(text_of);

    match text {
        Some(t) if contains_date(&t) => format_date(&t).map(Some),
        _ => Ok(None),
    }
}

// ============================================================================
// 关联内容
// ============================================================================

const FUNDING_LABEL: &str = "펀딩";
const NOVEL_LABEL: &str = "웹소설";
const BOOK_LABEL: &str = "[단행본]";

fn parse_free_novel_episodes(text: &str) -> Option<u32> {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(\d+)화\s*무료")
        .captures(text)
        .and_then(|c| c[1].parse().ok())
}

/// 侧栏关联小说，列表缺失时为 `None`
pub fn parse_related_novels(html: &str, urls: &UrlScheme) -> Option<Vec<Novel>> {
    let doc = Html::parse_document(html);
    let s = SiteSelectors::get();
    let list = doc.select(&s.product_list).next()?;

    let novels = list
        .select(&s.product_item)
        .filter_map(|item| {
            let info = item
                .select(&s.product_info)
                .next()
                .map(text_of)
                .unwrap_or_default();
            if info.contains(FUNDING_LABEL) {
                return None;
            }

            let raw_title = item.select(&s.product_title).next().map(text_of)?;
            if !raw_title.contains(NOVEL_LABEL) {
                return None;
            }
            let title = raw_title
                .replace(NOVEL_LABEL, "")
                .replace(['<', '>'], "")
                .trim()
                .to_string();

            Some(Novel {
                novel_type: if raw_title.contains(BOOK_LABEL) {
                    NovelType::Book
                } else {
                    NovelType::Original
                },
                title,
                link: item
                    .select(&s.product_link)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .map(|href| urls.absolute(href))
                    .unwrap_or_default(),
                thumbnail_url: item
                    .select(&s.product_thumbnail)
                    .next()
                    .and_then(|img| img.value().attr("src"))
                    .map(str::to_string),
                free_episode_count: parse_free_novel_episodes(&info),
            })
        })
        .collect();

    Some(novels)
}

/// 侧栏关联作品 ID，列表缺失时为 `None`
pub fn parse_related_webtoon_ids(html: &str) -> Option<Vec<String>> {
    let doc = Html::parse_document(html);
    let s = SiteSelectors::get();
    let list = doc.select(&s.related_webtoons).next()?;

    let mut ids: IndexSet<String> = IndexSet::new();
    for link in list.select(&s.related_webtoon_link) {
        if let Some(id) = link.value().attr("href").and_then(title_id_of) {
            ids.insert(id);
        }
    }
    Some(ids.into_iter().collect())
}

// ============================================================================
// 列表页
// ============================================================================

/// 列表页条目
///
/// `today_only` 时只保留带“오늘 공개”徽标的条目。
pub fn parse_title_list(html: &str, urls: &UrlScheme, today_only: bool) -> Vec<TitleSummary> {
    let doc = Html::parse_document(html);
    let s = SiteSelectors::get();

    doc.select(&s.content_item)
        .filter(|item| {
            !today_only
                || item
                    .select(&s.content_badge)
                    .any(|badge| text_of(badge) == TODAY_BADGE)
        })
        .filter_map(|item| {
            let link = item
                .select(&s.content_title_link)
                .next()
                .or_else(|| item.select(&s.content_poster_link).next())?;
            let url = urls.absolute(link.value().attr("href")?);
            let id = title_id_of(&url)?;
            let title = item
                .select(&s.content_title_text)
                .next()
                .map(text_of)
                .unwrap_or_else(|| text_of(link));

            Some(TitleSummary {
                id,
                title,
                url,
                platform: Platform::Naver,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::PlatformConfig;

    fn urls() -> UrlScheme {
        UrlScheme::new(&PlatformConfig::default()).unwrap()
    }

    const DETAIL: &str = r#"
    <html><body>
      <div class="Poster__thumbnail_area--gviWY"><img src="https://image-comic.pstatic.net/thumb.jpg"></div>
      <h2 class="EpisodeListInfo__title--mYLjC"> 테스트 웹툰 </h2>
      <div class="ContentMetaInfo__meta_info--GbTg4">
        <span class="ContentMetaInfo__category--WwrCp"><a href="/artistTitle?id=111">김작가</a> 글/그림</span>
        <span class="ContentMetaInfo__category--WwrCp"><a href="https://comic.naver.com/community/u/_abc12?tab=1">박원작</a> 원작</span>
      </div>
      <div class="ContentMetaInfo__meta_info--GbTg4">
        <em class="ContentMetaInfo__info_item--utGrf">월요웹툰 ∙ 15세 이용가</em>
      </div>
      <div class="EpisodeListInfo__summary_wrap--ZWNW5"><p>줄거리 설명</p></div>
      <div class="TagGroup__tag_group"><a class="TagGroup__tag--xu0OH">#판타지</a><a class="TagGroup__tag--xu0OH">#액션</a><a class="TagGroup__tag--xu0OH">#판타지</a></div>
      <div class="EpisodeListView__count--fTMc5">총 12화</div>
      <div class="EpisodeListPreview__text_area--WMXZz"><strong>미리보기 2화</strong></div>
      <ul class="EpisodeListList__episode_list--_N3ks">
        <li class="EpisodeListList__item--M8zq4"><a href="/webtoon/detail?titleId=777&no=10&week=mon"><img src="/t10.jpg"><span class="EpisodeListList__title--lfIzU">10화</span><span class="date">24.03.07</span></a></li>
        <li class="EpisodeListList__item--M8zq4"><a href="/webtoon/detail?titleId=777&no=9&week=mon"><span class="EpisodeListList__title--lfIzU">9화</span><span class="date">24.02.29</span></a></li>
        <li class="EpisodeListList__item--M8zq4"><span class="EpisodeListList__title--lfIzU">링크 없음</span></li>
      </ul>
    </body></html>
    "#;

    #[test]
    fn basic_fields() {
        assert_eq!(parse_title(DETAIL).unwrap(), "테스트 웹툰");
        assert_eq!(parse_description(DETAIL).unwrap(), "줄거리 설명");
        assert_eq!(
            parse_thumbnail(DETAIL, &urls()).unwrap(),
            "https://image-comic.pstatic.net/thumb.jpg"
        );
        assert_eq!(
            parse_unique_id("https://comic.naver.com/webtoon/list?titleId=777").unwrap(),
            "777"
        );
    }

    #[test]
    fn missing_title_is_an_extraction_error() {
        let err = parse_title("<html></html>").unwrap_err();
        assert_eq!(err.name(), "ExtractionError");
    }

    #[test]
    fn meta_fields() {
        let meta = meta_text(DETAIL).unwrap();
        assert_eq!(parse_age_rating(&meta), Some(AgeRating::Age15));
        assert_eq!(parse_day_of_week(&meta).as_deref(), Some("월"));
        assert_eq!(parse_status(&meta, None), Status::Ongoing);
        assert_eq!(parse_status("완결 ∙ 전체연령가", None), Status::Completed);
        assert_eq!(parse_status(&meta, Some(" 휴재 ")), Status::Hiatus);
        assert_eq!(parse_age_rating("19세 이용가"), Some(AgeRating::Adult));
        assert_eq!(parse_age_rating("전체연령가"), Some(AgeRating::All));
        assert_eq!(parse_age_rating("이용가 정보 없음"), None);
        assert_eq!(parse_episode_count(DETAIL).unwrap(), 12);
        assert_eq!(parse_preview_count(DETAIL), 2);
        assert_eq!(parse_preview_count("<div></div>"), 0);
    }

    #[test]
    fn genres_are_deduplicated_and_stripped() {
        let genres: Vec<String> = parse_genres(DETAIL).into_iter().collect();
        assert_eq!(genres, vec!["판타지", "액션"]);
    }

    #[test]
    fn compound_roles_win_over_single_roles() {
        assert_eq!(resolve_role("글/그림"), Some(AuthorRole::WriterAndIllustrator));
        assert_eq!(resolve_role(" 그림 / 글 "), Some(AuthorRole::WriterAndIllustrator));
        assert_eq!(resolve_role("원작/글"), Some(AuthorRole::WriterAndOriginal));
        assert_eq!(resolve_role("그림/원작"), Some(AuthorRole::IllustratorAndOriginal));
        assert_eq!(
            resolve_role("글/그림/원작"),
            Some(AuthorRole::WriterAndIllustratorAndOriginal)
        );
        assert_eq!(
            resolve_role("원작/그림/글"),
            Some(AuthorRole::WriterAndIllustratorAndOriginal)
        );
        assert_eq!(resolve_role("글"), Some(AuthorRole::Writer));
        assert_eq!(resolve_role("그림"), Some(AuthorRole::Illustrator));
        assert_eq!(resolve_role("작가"), Some(AuthorRole::Author));
        assert_eq!(resolve_role(""), None);
        assert_eq!(resolve_role("번역"), None);
    }

    #[test]
    fn authors_split_name_and_role() {
        let authors = parse_authors(DETAIL);
        assert_eq!(authors.len(), 2);
        assert_eq!(authors[0].name, "김작가");
        assert_eq!(authors[0].id.as_deref(), Some("111"));
        assert_eq!(authors[0].role, Some(AuthorRole::WriterAndIllustrator));
        assert_eq!(authors[1].id.as_deref(), Some("_abc12"));
        assert_eq!(authors[1].role, Some(AuthorRole::Original));
    }

    #[test]
    fn free_episodes_skip_items_without_links() {
        let eps = parse_free_episodes(DETAIL, &urls()).unwrap();
        assert_eq!(eps.len(), 2);
        assert_eq!(eps[0].episode_number, 10);
        assert_eq!(
            eps[0].link,
            "https://comic.naver.com/webtoon/detail?titleId=777&no=10"
        );
        assert_eq!(eps[0].upload_date.unwrap().to_string(), "2024-03-07");
        assert_eq!(
            eps[0].mobile_url.as_deref(),
            Some("https://m.comic.naver.com/external/appLaunchBridge?type=ARTICLE_DETAIL&titleId=777&no=10")
        );
        assert_eq!(eps[0].thumbnail_url.as_deref(), Some("https://comic.naver.com/t10.jpg"));
        assert_eq!(
            parse_first_episode_date(DETAIL).unwrap().unwrap().to_string(),
            "2024-03-07"
        );
    }

    #[test]
    fn malformed_episode_date_fails_the_page() {
        let html = r#"<ul><li class="EpisodeListList__item--M8zq4"><a href="/webtoon/detail?titleId=1&no=1"><span class="EpisodeListList__title--lfIzU">1화</span><span class="date">어제</span></a></li></ul>"#;
        let err = parse_free_episodes(html, &urls()).unwrap_err();
        assert!(matches!(err, CrawlerError::DateFormat(_)));
    }

    #[test]
    fn paid_episodes_are_numbered_from_the_total() {
        let html = r#"<ul>
          <li class="EpisodeListList__item--M8zq4 EpisodeListList__bm--HDC0X"><span class="EpisodeListList__title--lfIzU">12화</span><span class="date">6일 후 무료</span></li>
          <li class="EpisodeListList__item--M8zq4 EpisodeListList__bm--HDC0X"><span class="EpisodeListList__title--lfIzU">11화</span><span class="date">24.03.14</span></li>
          <li class="EpisodeListList__item--M8zq4"><a href="/webtoon/detail?titleId=5&no=10"><span class="EpisodeListList__title--lfIzU">10화</span><span class="date">24.03.07</span></a></li>
        </ul>"#;
        let paid = parse_paid_episodes(html, 12, "5", &urls()).unwrap();
        assert_eq!(paid.len(), 2);
        assert_eq!(paid[0].episode_number, 12);
        assert_eq!(paid[0].days_until_free, Some(6));
        assert_eq!(paid[0].upload_date, None);
        assert_eq!(paid[1].episode_number, 11);
        assert_eq!(paid[1].upload_date.unwrap().to_string(), "2024-03-14");
        assert!(paid.iter().all(|e| e.pricing_type == PricingType::Paid));

        // 付费条目不会混入免费列表
        let free = parse_free_episodes(html, &urls()).unwrap();
        assert_eq!(free.len(), 1);
        assert_eq!(free[0].episode_number, 10);
    }

    #[test]
    fn related_novels_filtering_rules() {
        let html = r#"<ul class="AsideProductList__product_list--yMw4n">
          <li class="AsideProductList__item--riayO"><a class="Poster__link--sopnC" href="https://series.naver.com/novel/1"><img class="Poster__image--d9XTI" src="n1.jpg"></a>
            <span class="AsideProductList__title--TXUE9">웹소설 &lt;검의 노래&gt;</span><span class="AsideProductList__price--UYuzI">10화 무료</span></li>
          <li class="AsideProductList__item--riayO"><span class="AsideProductList__title--TXUE9">웹소설 [단행본] 검의 노래</span><span class="AsideProductList__price--UYuzI">구매</span></li>
          <li class="AsideProductList__item--riayO"><span class="AsideProductList__title--TXUE9">웹소설 굿즈</span><span class="AsideProductList__price--UYuzI">펀딩 진행중</span></li>
          <li class="AsideProductList__item--riayO"><span class="AsideProductList__title--TXUE9">아크릴 스탠드</span></li>
        </ul>"#;
        let novels = parse_related_novels(html, &urls()).unwrap();
        assert_eq!(novels.len(), 2);
        assert_eq!(novels[0].title, "검의 노래");
        assert_eq!(novels[0].novel_type, NovelType::Original);
        assert_eq!(novels[0].free_episode_count, Some(10));
        assert_eq!(novels[1].novel_type, NovelType::Book);
        assert_eq!(novels[1].free_episode_count, None);

        assert!(parse_related_novels("<div></div>", &urls()).is_none());
    }

    #[test]
    fn related_webtoon_ids_come_from_links() {
        let html = r#"<ul class="AsideList__content_list--FXDvm">
          <li class="AsideList__item--i30ly"><a href="/webtoon/list?titleId=10">A</a></li>
          <li class="AsideList__item--i30ly"><a href="/webtoon/list?titleId=20">B</a></li>
        </ul>"#;
        assert_eq!(
            parse_related_webtoon_ids(html).unwrap(),
            vec!["10".to_string(), "20".to_string()]
        );
        assert!(parse_related_webtoon_ids("<div></div>").is_none());
    }

    #[test]
    fn title_list_honours_today_badge() {
        let html = r#"<ul class="ContentList__content_list--q5KXY">
          <li class="item"><div class="Poster__badge_wrap--zo3Dq"><span class="blind">오늘 공개</span></div>
            <a class="ContentTitle__title_area--x24vt" href="/webtoon/list?titleId=1"><span class="ContentTitle__title--e3qXt"><span class="text">새 작품</span></span></a></li>
          <li class="item"><div class="Poster__badge_wrap--zo3Dq"><span class="blind">UP</span></div>
            <a class="ContentTitle__title_area--x24vt" href="/webtoon/list?titleId=2"><span class="ContentTitle__title--e3qXt"><span class="text">기존 작품</span></span></a></li>
        </ul>"#;
        let today = parse_title_list(html, &urls(), true);
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].id, "1");
        assert_eq!(today[0].title, "새 작품");
        assert_eq!(today[0].url, "https://comic.naver.com/webtoon/list?titleId=1");
        assert_eq!(parse_title_list(html, &urls(), false).len(), 2);
    }
}
