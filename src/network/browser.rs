//! 浏览器服务
//!
//! 基于 chromiumoxide 的渲染会话实现。会话与页面都只通过 `interfaces::render`
//! 中的能力接口暴露给核心逻辑。

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::{
    Page,
    browser::{Browser, BrowserConfig as ChromeConfig},
};
use futures::StreamExt;
use serde_json::Value;
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{interval, timeout},
};
use tracing::{debug, info};

use crate::core::config::BrowserConfig;
use crate::core::error::{CrawlerError, Result};
use crate::interfaces::render::{RenderPage, RenderSession, SessionProvider};

/// 选择器轮询间隔
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Chromium 会话提供者
pub struct ChromeProvider {
    config: BrowserConfig,
}

impl ChromeProvider {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionProvider for ChromeProvider {
    async fn launch(&self) -> Result<Box<dyn RenderSession>> {
        let session = ChromeSession::launch(&self.config).await?;
        Ok(Box::new(session))
    }
}

/// 浏览器会话
/// 采用显式的所有权管理，确保关闭逻辑的确定性
pub struct ChromeSession {
    inner: Mutex<Option<(Browser, JoinHandle<()>)>>,
}

impl ChromeSession {
    /// 启动浏览器会话
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let browser_config = build_browser_config(config)?;

        info!("正在启动浏览器 (headless: {})...", config.headless);
        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| CrawlerError::Browser(e.to_string()))?;

        // 启动事件循环
        let handle = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            inner: Mutex::new(Some((browser, handle))),
        })
    }
}

#[async_trait]
impl RenderSession for ChromeSession {
    async fn new_page(&self) -> Result<Box<dyn RenderPage>> {
        let guard = self.inner.lock().await;
        let (browser, _) = guard
            .as_ref()
            .ok_or_else(|| CrawlerError::Browser("Browser already closed".into()))?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| CrawlerError::Browser(e.to_string()))?;

        Ok(Box::new(ChromePage { page }))
    }

    /// 优雅关闭浏览器，并等待事件循环结束
    async fn close(&self) -> Result<()> {
        let taken = self.inner.lock().await.take();

        if let Some((mut browser, handler)) = taken {
            if let Err(e) = browser.close().await {
                debug!("关闭浏览器时发生非致命错误: {}", e);
            }
            let _ = handler.await;
            info!("浏览器会话已关闭");
        }
        Ok(())
    }
}

// 在 Drop 时尝试最后一次保护，但不报 WARN
impl Drop for ChromeSession {
    fn drop(&mut self) {
        let Some((mut browser, handler)) = self.inner.get_mut().take() else {
            return;
        };
        // 在后台清理
        if let Ok(rt) = tokio::runtime::Handle::try_current() {
            rt.spawn(async move {
                let _ = browser.close().await;
                let _ = handler.await;
            });
        }
    }
}

/// 单个标签页
pub struct ChromePage {
    page: Page,
}

#[async_trait]
impl RenderPage for ChromePage {
    async fn goto(&self, url: &str, limit: Duration) -> Result<()> {
        debug!("导航至: {}", url);
        match timeout(limit, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(CrawlerError::navigation(url, e)),
            Err(_) => Err(CrawlerError::navigation(
                url,
                format!("page load timed out after {}ms", limit.as_millis()),
            )),
        }
    }

    async fn wait_for_selector(&self, selector: &str, limit: Duration) -> Result<()> {
        timeout(limit, async {
            let mut ticker = interval(POLL_INTERVAL);
            loop {
                ticker.tick().await;
                if self.page.find_element(selector).await.is_ok() {
                    return;
                }
            }
        })
        .await
        .map_err(|_| CrawlerError::SelectorTimeout {
            selector: selector.to_string(),
            timeout_ms: limit.as_millis() as u64,
        })
    }

    async fn evaluate(&self, script: &str) -> Result<Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| CrawlerError::Browser(e.to_string()))?;
        // undefined 结果没有值
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn click(&self, selector: &str) -> Result<bool> {
        let Ok(element) = self.page.find_element(selector).await else {
            return Ok(false);
        };
        element
            .click()
            .await
            .map_err(|e| CrawlerError::Browser(e.to_string()))?;
        Ok(true)
    }

    async fn content(&self) -> Result<String> {
        self.page
            .content()
            .await
            .map_err(|e| CrawlerError::Browser(e.to_string()))
    }

    async fn url(&self) -> Result<Option<String>> {
        self.page
            .url()
            .await
            .map_err(|e| CrawlerError::Browser(e.to_string()))
    }

    async fn close(&self) -> Result<()> {
        self.page
            .clone()
            .close()
            .await
            .map_err(|e| CrawlerError::Browser(e.to_string()))
    }
}

/// 构建浏览器配置
fn build_browser_config(config: &BrowserConfig) -> Result<ChromeConfig> {
    let mut builder = ChromeConfig::builder()
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--disable-infobars")
        .arg("--no-sandbox")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-gpu")
        .arg("--disable-extensions")
        .arg(format!(
            "--window-size={},{}",
            config.window_width, config.window_height
        ))
        .window_size(config.window_width, config.window_height);

    for arg in &config.extra_args {
        builder = builder.arg(arg.as_str());
    }

    if config.headless {
        builder = builder.arg("--headless=new");
    } else {
        builder = builder.with_head();
    }

    let chrome_path = if let Some(path) = &config.chrome_path {
        Some(path.clone())
    } else {
        [
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/usr/bin/google-chrome",
            "/opt/chrome/chrome",
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ]
        .iter()
        .find(|p| Path::new(p).exists())
        .map(|p| p.to_string())
    };

    if let Some(path) = chrome_path {
        builder = builder.chrome_executable(path);
    }

    builder.build().map_err(CrawlerError::Browser)
}
