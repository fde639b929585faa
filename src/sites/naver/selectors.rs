//! Naver 选择器
//!
//! 等待用的 CSS 字符串与解析用的预编译选择器

use std::sync::OnceLock;

use scraper::Selector;

// 作品页
pub const TITLE: &str = ".EpisodeListInfo__title--mYLjC";
pub const DESCRIPTION: &str = ".EpisodeListInfo__summary_wrap--ZWNW5";
pub const THUMBNAIL: &str = ".Poster__thumbnail_area--gviWY img";
pub const META_INFO: &str = ".ContentMetaInfo__meta_info--GbTg4";
pub const META_INFO_ITEM: &str = ".ContentMetaInfo__info_item--utGrf";
pub const AUTHOR_CATEGORY: &str = ".ContentMetaInfo__category--WwrCp";
pub const GENRE_TAG: &str = ".TagGroup__tag--xu0OH";
pub const GENRE_EXPAND_BUTTON: &str = ".EpisodeListInfo__button_fold--ZKgEw";
pub const HIATUS_INFO: &str = ".EpisodeListInfo__info_text--MO6kz";

// 话数列表
pub const EPISODE_LIST: &str = ".EpisodeListList__episode_list--_N3ks";
pub const EPISODE_ITEM: &str = ".EpisodeListList__item--M8zq4";
pub const EPISODE_PAID_ITEM: &str = ".EpisodeListList__item--M8zq4.EpisodeListList__bm--HDC0X";
pub const EPISODE_COUNT: &str = ".EpisodeListView__count--fTMc5";
pub const PREVIEW_AREA: &str = ".EpisodeListPreview__text_area--WMXZz";
pub const PREVIEW_BUTTON: &str = ".EpisodeListPreview__button_preview--IBGaa";

// 侧栏
pub const PRODUCT_LIST: &str = ".AsideProductList__product_list--yMw4n";
pub const RELATED_WEBTOONS: &str = ".AsideList__content_list--FXDvm";

// 列表页 (新作/目录)
pub const CONTENT_LIST: &str = "ul.ContentList__content_list--q5KXY";
pub const CONTENT_ITEM: &str = "ul.ContentList__content_list--q5KXY > li.item";

/// 站点选择器集合
pub struct SiteSelectors {
    pub title: Selector,
    pub description_text: Selector,
    pub thumbnail: Selector,
    pub meta_info: Selector,
    pub meta_info_item: Selector,
    pub author_category: Selector,
    pub anchor: Selector,
    pub genre_tag: Selector,
    pub hiatus_info: Selector,

    /// 免费列表条目 (排除预览条目)
    pub free_episode_item: Selector,
    pub paid_episode_item: Selector,
    pub episode_title: Selector,
    pub episode_date: Selector,
    pub episode_link: Selector,
    pub image: Selector,
    pub episode_count: Selector,
    pub preview_count: Selector,

    pub product_list: Selector,
    pub product_item: Selector,
    pub product_link: Selector,
    pub product_title: Selector,
    pub product_thumbnail: Selector,
    pub product_info: Selector,
    pub related_webtoons: Selector,
    pub related_webtoon_link: Selector,

    pub content_item: Selector,
    pub content_badge: Selector,
    pub content_title_link: Selector,
    pub content_poster_link: Selector,
    pub content_title_text: Selector,
}

static SELECTORS: OnceLock<SiteSelectors> = OnceLock::new();

fn sel(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

impl SiteSelectors {
    /// 获取全局选择器实例
    pub fn get() -> &'static SiteSelectors {
        SELECTORS.get_or_init(|| SiteSelectors {
            title: sel(TITLE),
            description_text: sel(&format!("{} p", DESCRIPTION)),
            thumbnail: sel(THUMBNAIL),
            meta_info: sel(META_INFO),
            meta_info_item: sel(META_INFO_ITEM),
            author_category: sel(AUTHOR_CATEGORY),
            anchor: sel("a"),
            genre_tag: sel(GENRE_TAG),
            hiatus_info: sel(HIATUS_INFO),

            free_episode_item: sel(&format!(
                "{}:not(.EpisodeListList__bm--HDC0X)",
                EPISODE_ITEM
            )),
            paid_episode_item: sel(EPISODE_PAID_ITEM),
            episode_title: sel(".EpisodeListList__title--lfIzU"),
            episode_date: sel(".date"),
            episode_link: sel("a[href]"),
            image: sel("img"),
            episode_count: sel(EPISODE_COUNT),
            preview_count: sel(&format!("{} strong", PREVIEW_AREA)),

            product_list: sel(PRODUCT_LIST),
            product_item: sel(".AsideProductList__item--riayO"),
            product_link: sel(".Poster__link--sopnC"),
            product_title: sel(".AsideProductList__title--TXUE9"),
            product_thumbnail: sel(".Poster__image--d9XTI"),
            product_info: sel(".AsideProductList__price--UYuzI"),
            related_webtoons: sel(RELATED_WEBTOONS),
            related_webtoon_link: sel(".AsideList__item--i30ly a[href]"),

            content_item: sel(CONTENT_ITEM),
            content_badge: sel(".Poster__badge_wrap--zo3Dq .blind"),
            content_title_link: sel("a.ContentTitle__title_area--x24vt"),
            content_poster_link: sel("a.Poster__link--sopnC"),
            content_title_text: sel(".ContentTitle__title--e3qXt .text"),
        })
    }
}
