//! 渲染能力接口
//!
//! 核心逻辑只依赖这里的能力形状，不依赖具体浏览器引擎的方法名。

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::error::Result;

/// 单个页面 (标签页)
#[async_trait]
pub trait RenderPage: Send + Sync {
    /// 导航并等待文档加载完成
    async fn goto(&self, url: &str, timeout: Duration) -> Result<()>;

    /// 等待选择器出现，超时返回 `SelectorTimeout`
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// 在页面上下文中执行脚本并返回其 JSON 值
    async fn evaluate(&self, script: &str) -> Result<Value>;

    /// 点击首个匹配元素，元素不存在时返回 `false`
    async fn click(&self, selector: &str) -> Result<bool>;

    /// 当前渲染后的完整 HTML
    async fn content(&self) -> Result<String>;

    async fn url(&self) -> Result<Option<String>>;

    async fn close(&self) -> Result<()>;
}

/// 一个渲染会话 (浏览器进程)
#[async_trait]
pub trait RenderSession: Send + Sync {
    async fn new_page(&self) -> Result<Box<dyn RenderPage>>;

    /// 关闭会话，重复调用应为空操作
    async fn close(&self) -> Result<()>;
}

/// 会话提供者
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn RenderSession>>;
}

/// 关闭页面，失败只记录日志
pub async fn close_page(page: &dyn RenderPage) {
    if let Err(e) = page.close().await {
        tracing::debug!("关闭页面时发生非致命错误: {}", e);
    }
}
