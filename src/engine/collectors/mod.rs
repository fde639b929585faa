//! 内容收集器 (Content Collectors)
//!
//! 每个收集器把多个适配器调用编排成一个工作条目的结果。

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::config::AppConfig;
use crate::core::error::{CrawlerError, Result};
use crate::core::message::CollectionOutcome;
use crate::core::model::{Episode, EventType, WorkItem};
use crate::engine::pagination::dedup_and_cap;
use crate::interfaces::render::RenderSession;
use crate::sites::PlatformRegistry;

mod catalog;
mod detail;
mod discovery;
mod update;

pub use catalog::CatalogCollector;
pub use detail::DetailCollector;
pub use discovery::DiscoveryCollector;
pub use update::{NO_NEW_EPISODES, UpdateCollector};

/// 收集器接口
#[async_trait]
pub trait Collector: Send + Sync {
    fn name(&self) -> &'static str;

    /// 处理一个工作条目，可能产出一个或多个结果
    ///
    /// 返回 `Err` 时由调度器转换为该条目的 500 结果。
    async fn execute(
        &self,
        session: &dyn RenderSession,
        item: &WorkItem,
    ) -> Result<Vec<CollectionOutcome>>;
}

/// 事件类型到收集器的映射
///
/// 每个受支持的事件类型一个字段，选择时穷尽匹配。
#[derive(Clone)]
pub struct CollectorSet {
    pub full_detail: Arc<dyn Collector>,
    pub incremental_update: Arc<dyn Collector>,
    pub new_title_discovery: Arc<dyn Collector>,
    pub full_catalog: Arc<dyn Collector>,
}

impl CollectorSet {
    /// 标准装配：所有收集器共享同一个平台注册表
    pub fn standard(registry: Arc<PlatformRegistry>, config: &AppConfig) -> Self {
        let detail = Arc::new(DetailCollector::new(registry.clone()));
        Self {
            full_detail: detail.clone(),
            incremental_update: Arc::new(UpdateCollector::new(registry.clone())),
            new_title_discovery: Arc::new(DiscoveryCollector::new(
                registry.clone(),
                detail,
                config.discovery.collect_details,
            )),
            full_catalog: Arc::new(CatalogCollector::new(registry)),
        }
    }

    pub fn select(&self, event_type: &EventType) -> Result<Arc<dyn Collector>> {
        match event_type {
            EventType::FullDetail => Ok(self.full_detail.clone()),
            EventType::IncrementalUpdate => Ok(self.incremental_update.clone()),
            EventType::NewTitleDiscovery => Ok(self.new_title_discovery.clone()),
            EventType::FullCatalog => Ok(self.full_catalog.clone()),
            EventType::Unsupported(raw) => Err(CrawlerError::UnsupportedEventType(raw.clone())),
        }
    }
}

/// 条目的导航目标
fn require_target(item: &WorkItem) -> Result<&str> {
    item.target().ok_or_else(|| {
        CrawlerError::InvalidRequest("work item has neither identifier nor url".into())
    })
}

/// 付费与免费话合并：按编号倒序、去重，最多 `limit` 条
fn merge_episodes(paid: Vec<Episode>, free: Vec<Episode>, limit: usize) -> Vec<Episode> {
    let mut merged: Vec<Episode> = paid.into_iter().chain(free).collect();
    merged.sort_by(|a, b| b.episode_number.cmp(&a.episode_number));
    dedup_and_cap(merged, limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::PricingType;

    fn ep(no: u32, pricing_type: PricingType) -> Episode {
        Episode {
            title: format!("{}화", no),
            upload_date: None,
            link: String::new(),
            episode_number: no,
            thumbnail_url: None,
            pricing_type,
            days_until_free: None,
            mobile_url: None,
        }
    }

    #[test]
    fn merge_orders_newest_first_and_caps() {
        let paid = vec![ep(45, PricingType::Paid), ep(44, PricingType::Paid)];
        let free = vec![
            ep(43, PricingType::Free),
            ep(42, PricingType::Free),
            ep(41, PricingType::Free),
        ];
        let merged = merge_episodes(paid, free, 3);
        let nos: Vec<u32> = merged.iter().map(|e| e.episode_number).collect();
        assert_eq!(nos, vec![45, 44, 43]);
    }

    #[test]
    fn merge_prefers_paid_entry_on_number_clash() {
        let merged = merge_episodes(
            vec![ep(10, PricingType::Paid)],
            vec![ep(10, PricingType::Free)],
            usize::MAX,
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].pricing_type, PricingType::Paid);
    }

    #[test]
    fn unsupported_event_type_has_no_collector() {
        let registry = Arc::new(PlatformRegistry::new(&AppConfig::default()).unwrap());
        let set = CollectorSet::standard(registry, &AppConfig::default());
        assert_eq!(set.select(&EventType::FullDetail).unwrap().name(), "full-detail");
        assert_eq!(set.select(&EventType::FullCatalog).unwrap().name(), "full-catalog");
        let err = match set.select(&EventType::Unsupported("PURGE".into())) {
            Err(e) => e,
            Ok(_) => panic!("PURGE must not resolve"),
        };
        assert_eq!(err.name(), "UnsupportedEventTypeError");
    }
}
