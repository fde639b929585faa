//! 错误处理体系 (Error Handling System)
//!
//! 定义抓取领域的错误分类、对外暴露的错误名称以及全局 Result 别名。

use thiserror::Error;

/// 全局错误定义 (Crawler Domain Errors)
#[derive(Error, Debug)]
pub enum CrawlerError {
    /// 页面加载失败或未达到预期状态
    #[error("Navigation failed for {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Selector '{selector}' did not appear within {timeout_ms}ms")]
    SelectorTimeout { selector: String, timeout_ms: u64 },

    /// 必需元素缺失
    #[error("Required element missing: {selector}")]
    ElementMissing { selector: String },

    /// 元素存在但内容无法解析
    #[error("Malformed content: {0}")]
    Malformed(String),

    #[error("Invalid date format: '{0}' (expected YY.MM.DD)")]
    DateFormat(String),

    /// 单字段抽取失败，附带字段名
    #[error("Failed to extract {field}: {source}")]
    Field {
        field: &'static str,
        #[source]
        source: Box<CrawlerError>,
    },

    #[error("Unsupported event type: {0}")]
    UnsupportedEventType(String),

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// 连续失败达到上限，仅用于内部降级为部分结果
    #[error("Pagination stalled at page {page} after {failures} consecutive failures")]
    PaginationStall { page: u32, failures: u32 },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Other error: {0}")]
    Custom(String),
}

/// 全局 Result 别名
pub type Result<T> = std::result::Result<T, CrawlerError>;

impl CrawlerError {
    /// 对外暴露的错误名称
    ///
    /// 投递端只会看到 `name` 与 `message`，堆栈只留在内部日志中。
    pub fn name(&self) -> &'static str {
        match self {
            CrawlerError::Navigation { .. } => "NavigationError",
            CrawlerError::SelectorTimeout { .. }
            | CrawlerError::ElementMissing { .. }
            | CrawlerError::Malformed(_)
            | CrawlerError::DateFormat(_) => "ExtractionError",
            CrawlerError::Field { source, .. } => source.name(),
            CrawlerError::UnsupportedEventType(_) => "UnsupportedEventTypeError",
            CrawlerError::UnsupportedPlatform(_) => "UnsupportedPlatformError",
            CrawlerError::PaginationStall { .. } => "PaginationStallError",
            CrawlerError::InvalidRequest(_) => "InvalidRequestError",
            CrawlerError::Browser(_) => "BrowserError",
            _ => "InternalError",
        }
    }

    /// 是否为选择器等待超时（包括字段包装后的情况）
    pub fn is_timeout(&self) -> bool {
        match self {
            CrawlerError::SelectorTimeout { .. } => true,
            CrawlerError::Field { source, .. } => source.is_timeout(),
            _ => false,
        }
    }

    pub fn navigation(url: impl Into<String>, reason: impl ToString) -> Self {
        CrawlerError::Navigation {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn missing(selector: impl Into<String>) -> Self {
        CrawlerError::ElementMissing {
            selector: selector.into(),
        }
    }
}

/// 为抽取结果附加字段名
pub trait FieldContext<T> {
    fn field(self, field: &'static str) -> Result<T>;
}

impl<T> FieldContext<T> for Result<T> {
    fn field(self, field: &'static str) -> Result<T> {
        self.map_err(|e| match e {
            // 已包装过的错误保持最内层字段名
            wrapped @ CrawlerError::Field { .. } => wrapped,
            other => CrawlerError::Field {
                field,
                source: Box::new(other),
            },
        })
    }
}
