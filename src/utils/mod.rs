use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use url::Url;

use crate::core::error::{CrawlerError, Result};

pub fn to_absolute_url(base: &Url, href: &str) -> String {
    if href.is_empty() {
        return String::new();
    }

    if let Some(path_without_slashes) = href.strip_prefix("//") {
        return format!("{}://{}", base.scheme(), path_without_slashes);
    }

    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }

    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// 读取查询参数
pub fn query_param(url: &str, key: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// 移除指定查询参数，其余参数保持原顺序
pub fn strip_query_param(url: &str, key: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };
    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(k, _)| k != key)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.query_pairs_mut().clear().extend_pairs(kept);
    }
    parsed.to_string()
}

/// 文本中的第一个整数
pub fn first_number(text: &str) -> Option<u32> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\d+").expect("valid regex"));
    re.find(text).and_then(|m| m.as_str().parse().ok())
}

fn date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{2})\.(\d{2})\.(\d{2})").expect("valid regex"))
}

/// 将 `YY.MM.DD` 规范化为 `20YY-MM-DD`
///
/// 不匹配或不是合法日期时返回 `DateFormat` 错误，而不是猜测。
pub fn format_date(text: &str) -> Result<NaiveDate> {
    let caps = date_regex()
        .captures(text)
        .ok_or_else(|| CrawlerError::DateFormat(text.trim().to_string()))?;

    let iso = format!("20{}-{}-{}", &caps[1], &caps[2], &caps[3]);
    NaiveDate::parse_from_str(&iso, "%Y-%m-%d")
        .map_err(|_| CrawlerError::DateFormat(text.trim().to_string()))
}

/// 文本是否包含 `YY.MM.DD` 日期
pub fn contains_date(text: &str) -> bool {
    date_regex().is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_date_expands_two_digit_year() {
        assert_eq!(
            format_date("24.03.07").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
        );
        assert_eq!(
            format_date(" 업데이트 19.12.31 ").unwrap().to_string(),
            "2019-12-31"
        );
    }

    #[test]
    fn format_date_rejects_non_matching_input() {
        for bad in ["", "2024-03-07", "3일 후 무료", "24.3.7"] {
            let err = format_date(bad).unwrap_err();
            assert!(matches!(err, CrawlerError::DateFormat(_)), "{bad}");
        }
    }

    #[test]
    fn format_date_rejects_impossible_calendar_dates() {
        assert!(format_date("24.13.40").is_err());
    }

    #[test]
    fn strip_query_param_drops_only_the_named_key() {
        let url = "https://comic.naver.com/webtoon/detail?titleId=1&no=5&week=mon";
        assert_eq!(
            strip_query_param(url, "week"),
            "https://comic.naver.com/webtoon/detail?titleId=1&no=5"
        );
        assert_eq!(query_param(url, "no").as_deref(), Some("5"));
        assert_eq!(query_param(url, "missing"), None);
    }

    #[test]
    fn absolute_url_resolution() {
        let base = Url::parse("https://comic.naver.com").unwrap();
        assert_eq!(
            to_absolute_url(&base, "/webtoon/list?titleId=1"),
            "https://comic.naver.com/webtoon/list?titleId=1"
        );
        assert_eq!(
            to_absolute_url(&base, "//image.example.com/a.jpg"),
            "https://image.example.com/a.jpg"
        );
    }

    #[test]
    fn first_number_reads_leading_digits() {
        assert_eq!(first_number("총 125화"), Some(125));
        assert_eq!(first_number("미리보기"), None);
    }
}
