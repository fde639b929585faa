use std::sync::Arc;

use crate::core::config::AppConfig;
use crate::core::error::{CrawlerError, Result};
use crate::core::model::Platform;
use crate::interfaces::platform::PlatformAdapter;

pub mod naver;

// ============================================================================
// 平台注册表
// ============================================================================

/// 平台注册表
///
/// 每个受支持的平台对应一个字段，解析时按枚举穷尽匹配。
#[derive(Clone)]
pub struct PlatformRegistry {
    naver: Arc<dyn PlatformAdapter>,
}

impl PlatformRegistry {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            naver: Arc::new(naver::Naver::new(config)?),
        })
    }

    /// 按平台键解析适配器，未知平台立即失败
    pub fn resolve(&self, platform: &Platform) -> Result<Arc<dyn PlatformAdapter>> {
        match platform {
            Platform::Naver => Ok(self.naver.clone()),
            Platform::Unsupported(key) => Err(CrawlerError::UnsupportedPlatform(key.clone())),
        }
    }

    pub fn list(&self) -> Vec<Platform> {
        vec![self.naver.platform()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_platform_fails_fast() {
        let registry = PlatformRegistry::new(&AppConfig::default()).unwrap();
        assert!(registry.resolve(&Platform::Naver).is_ok());

        let err = match registry.resolve(&Platform::from_key("kakao")) {
            Err(e) => e,
            Ok(_) => panic!("kakao must not resolve"),
        };
        assert_eq!(err.name(), "UnsupportedPlatformError");
        assert_eq!(registry.list(), vec![Platform::Naver]);
    }
}
