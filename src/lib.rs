//! NAVER 网络漫画抓取服务
//!
//! 通过无头浏览器渲染作品页，按事件类型收集作品详情、增量更新、今日新作与全目录。

pub mod core;
pub mod delivery;
pub mod engine;
pub mod interfaces;
pub mod network;
pub mod sites;
pub mod utils;

pub use crate::core::config::AppConfig;
pub use crate::core::error::{CrawlerError, Result};
pub use crate::core::message::{CrawlRequest, CrawlResult};
pub use crate::engine::{Crawler, MessageHandler};
