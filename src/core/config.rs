//! 配置管理系统 (Configuration Management)
//!
//! 负责 `config.toml` 的反序列化及其层级结构映射，支持环境变量覆盖与默认值回退机制。
//! 环境变量以 `CRAWLER__` 为前缀，双下划线分隔层级，例如 `CRAWLER__TIMEOUTS__PAGE_LOAD=45000`。

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use bon::Builder;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::core::error::{CrawlerError, Result};

/// 全局应用配置
#[derive(Debug, Deserialize, Builder, Clone, Default)]
pub struct AppConfig {
    /// 自动化浏览器 (Chromium) 相关配置
    #[serde(default)]
    #[builder(default)]
    pub browser: BrowserConfig,

    /// 各类操作的独立超时
    #[serde(default)]
    #[builder(default)]
    pub timeouts: TimeoutConfig,

    /// 分页遍历参数
    #[serde(default)]
    #[builder(default)]
    pub pagination: PaginationConfig,

    /// 无限滚动目录参数
    #[serde(default)]
    #[builder(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    #[builder(default)]
    pub discovery: DiscoveryConfig,

    /// 结果投递参数
    #[serde(default)]
    #[builder(default)]
    pub delivery: DeliveryConfig,

    /// 平台特定配置覆盖映射 (键为小写平台名)
    #[serde(default)]
    #[builder(default)]
    pub platforms: HashMap<String, PlatformConfig>,
}

/// 浏览器引擎配置
#[derive(Debug, Deserialize, Builder, Clone)]
pub struct BrowserConfig {
    /// 是否以无头模式 (Headless) 运行
    #[serde(default = "default_headless")]
    #[builder(default = default_headless())]
    pub headless: bool,
    /// 自定义可执行文件路径
    pub chrome_path: Option<String>,
    #[serde(default = "default_window_width")]
    #[builder(default = default_window_width())]
    pub window_width: u32,
    #[serde(default = "default_window_height")]
    #[builder(default = default_window_height())]
    pub window_height: u32,
    /// 追加的启动参数
    #[serde(default)]
    #[builder(default)]
    pub extra_args: Vec<String>,
}

/// 超时配置 (毫秒)
///
/// 每个值只约束自己那一类操作，不存在全局预算。
#[derive(Debug, Deserialize, Builder, Clone)]
pub struct TimeoutConfig {
    #[serde(default = "default_page_load")]
    pub page_load: u64,
    #[serde(default = "default_selector_wait")]
    pub selector_wait: u64,
    #[serde(default = "default_navigation_wait")]
    pub navigation_wait: u64,
    #[serde(default = "default_before_navigation")]
    pub before_navigation: u64,
    #[serde(default = "default_after_navigation")]
    pub after_navigation: u64,
    #[serde(default = "default_error_recovery")]
    pub error_recovery: u64,
    #[serde(default = "default_dynamic_content")]
    pub dynamic_content: u64,
    #[serde(default = "default_scroll_wait")]
    pub scroll_wait: u64,
}

/// 分页遍历参数
#[derive(Debug, Deserialize, Builder, Clone)]
pub struct PaginationConfig {
    /// 抓取最新 N 话时的连续失败上限
    #[serde(default = "default_latest_max_failures")]
    #[builder(default = default_latest_max_failures())]
    pub latest_max_failures: u32,
    /// 抓取全部免费话时的连续失败上限
    #[serde(default = "default_full_max_failures")]
    #[builder(default = default_full_max_failures())]
    pub full_max_failures: u32,
}

/// 无限滚动目录参数
#[derive(Debug, Deserialize, Builder, Clone)]
pub struct CatalogConfig {
    /// 连续多少次滚动未增长即视为到底
    #[serde(default = "default_scroll_stall_threshold")]
    #[builder(default = default_scroll_stall_threshold())]
    pub scroll_stall_threshold: u32,
    /// 滚动次数硬上限
    #[serde(default = "default_max_scrolls")]
    #[builder(default = default_max_scrolls())]
    pub max_scrolls: u32,
}

#[derive(Debug, Deserialize, Builder, Clone)]
pub struct DiscoveryConfig {
    /// 发现新作品后是否立即抓取完整详情
    #[serde(default = "default_collect_details")]
    #[builder(default = default_collect_details())]
    pub collect_details: bool,
}

/// 投递形态
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// 整批一条消息
    #[default]
    Batch,
    /// 每个条目一条消息
    PerItem,
}

#[derive(Debug, Deserialize, Builder, Clone, Default)]
pub struct DeliveryConfig {
    #[serde(default)]
    #[builder(default)]
    pub mode: DeliveryMode,
    /// JSON 持久化目录，未设置时不落盘
    pub output_dir: Option<String>,
}

/// 平台特定配置覆盖
#[derive(Debug, Deserialize, Builder, Clone, Default)]
pub struct PlatformConfig {
    /// 自定义域名 (用于镜像或测试环境)
    pub base_url: Option<String>,
    pub mobile_base_url: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            window_width: default_window_width(),
            window_height: default_window_height(),
            extra_args: Vec::new(),
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            page_load: default_page_load(),
            selector_wait: default_selector_wait(),
            navigation_wait: default_navigation_wait(),
            before_navigation: default_before_navigation(),
            after_navigation: default_after_navigation(),
            error_recovery: default_error_recovery(),
            dynamic_content: default_dynamic_content(),
            scroll_wait: default_scroll_wait(),
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            latest_max_failures: default_latest_max_failures(),
            full_max_failures: default_full_max_failures(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            scroll_stall_threshold: default_scroll_stall_threshold(),
            max_scrolls: default_max_scrolls(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            collect_details: default_collect_details(),
        }
    }
}

fn default_headless() -> bool {
    true
}
fn default_window_width() -> u32 {
    1920
}
fn default_window_height() -> u32 {
    1080
}
fn default_page_load() -> u64 {
    30_000
}
fn default_selector_wait() -> u64 {
    1_000
}
fn default_navigation_wait() -> u64 {
    10_000
}
fn default_before_navigation() -> u64 {
    300
}
fn default_after_navigation() -> u64 {
    500
}
fn default_error_recovery() -> u64 {
    500
}
fn default_dynamic_content() -> u64 {
    500
}
fn default_scroll_wait() -> u64 {
    1_000
}
fn default_latest_max_failures() -> u32 {
    2
}
fn default_full_max_failures() -> u32 {
    3
}
fn default_scroll_stall_threshold() -> u32 {
    10
}
fn default_max_scrolls() -> u32 {
    500
}
fn default_collect_details() -> bool {
    true
}

impl TimeoutConfig {
    /// 所有等待都归零，供离线测试使用
    pub fn instant() -> Self {
        Self::builder()
            .page_load(1_000)
            .selector_wait(50)
            .navigation_wait(1_000)
            .before_navigation(0)
            .after_navigation(0)
            .error_recovery(0)
            .dynamic_content(0)
            .scroll_wait(0)
            .build()
    }

    pub fn page_load(&self) -> Duration {
        Duration::from_millis(self.page_load)
    }
    pub fn selector_wait(&self) -> Duration {
        Duration::from_millis(self.selector_wait)
    }
    pub fn navigation_wait(&self) -> Duration {
        Duration::from_millis(self.navigation_wait)
    }
    pub fn before_navigation(&self) -> Duration {
        Duration::from_millis(self.before_navigation)
    }
    pub fn after_navigation(&self) -> Duration {
        Duration::from_millis(self.after_navigation)
    }
    pub fn error_recovery(&self) -> Duration {
        Duration::from_millis(self.error_recovery)
    }
    pub fn dynamic_content(&self) -> Duration {
        Duration::from_millis(self.dynamic_content)
    }
    pub fn scroll_wait(&self) -> Duration {
        Duration::from_millis(self.scroll_wait)
    }
}

impl AppConfig {
    /// 从指定文件与环境变量加载，文件不存在时仅使用默认值与环境变量
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let builder = Config::builder();

        let builder = if config_path.exists() {
            builder.add_source(File::from(config_path))
        } else {
            builder
        };

        let settings = builder
            .add_source(Environment::with_prefix("CRAWLER").separator("__"))
            .build()
            .map_err(CrawlerError::Config)?;
        settings.try_deserialize().map_err(CrawlerError::Config)
    }

    /// 获取平台覆盖配置
    pub fn platform(&self, key: &str) -> PlatformConfig {
        self.platforms.get(key).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.timeouts.page_load, 30_000);
        assert_eq!(cfg.timeouts.selector_wait, 1_000);
        assert_eq!(cfg.pagination.latest_max_failures, 2);
        assert_eq!(cfg.pagination.full_max_failures, 3);
        assert_eq!(cfg.catalog.scroll_stall_threshold, 10);
        assert!(cfg.discovery.collect_details);
        assert_eq!(cfg.delivery.mode, DeliveryMode::Batch);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let settings = Config::builder()
            .add_source(config::File::from_str(
                r#"
                [timeouts]
                selector_wait = 2500

                [delivery]
                mode = "per_item"

                [platforms.naver]
                base_url = "http://localhost:8080"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let cfg: AppConfig = settings.try_deserialize().unwrap();

        assert_eq!(cfg.timeouts.selector_wait(), Duration::from_millis(2_500));
        assert_eq!(cfg.timeouts.page_load, 30_000);
        assert_eq!(cfg.delivery.mode, DeliveryMode::PerItem);
        assert_eq!(
            cfg.platform("naver").base_url.as_deref(),
            Some("http://localhost:8080")
        );
        assert!(cfg.platform("kakao").base_url.is_none());
    }
}
