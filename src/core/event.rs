//! 事件系统定义
//!
//! 用于 Crawler 与外部观察者 (日志、进度展示) 之间的完全解耦通信

use flume::{Receiver, Sender};

/// 抓取事件类型
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlEvent {
    /// 请求已受理
    RequestAccepted {
        request_id: String,
        event_type: String,
        items: usize,
    },

    /// 渲染会话已建立
    SessionOpened,

    /// 条目开始处理
    ItemStarted {
        index: usize,
        total: usize,
        label: String,
    },

    /// 条目处理结束 (含 204)
    ItemFinished { index: usize, status_code: u16 },

    /// 条目处理失败
    ItemFailed {
        index: usize,
        label: String,
        error: String,
    },

    /// 渲染会话已关闭
    SessionClosed,

    /// 请求处理完成
    RequestCompleted { request_id: String, status_code: u16 },
}

/// 事件发送器
#[derive(Clone)]
pub struct EventSender {
    tx: Sender<CrawlEvent>,
}

impl EventSender {
    pub fn new(tx: Sender<CrawlEvent>) -> Self {
        Self { tx }
    }

    /// 发送事件，接收端已关闭时静默丢弃
    pub fn emit(&self, event: CrawlEvent) {
        let _ = self.tx.send(event);
    }

    pub fn item_started(&self, index: usize, total: usize, label: &str) {
        self.emit(CrawlEvent::ItemStarted {
            index,
            total,
            label: label.to_string(),
        });
    }

    pub fn item_failed(&self, index: usize, label: &str, error: impl ToString) {
        self.emit(CrawlEvent::ItemFailed {
            index,
            label: label.to_string(),
            error: error.to_string(),
        });
    }
}

/// 事件接收器
pub struct EventReceiver {
    rx: Receiver<CrawlEvent>,
}

impl EventReceiver {
    pub fn new(rx: Receiver<CrawlEvent>) -> Self {
        Self { rx }
    }

    /// 异步接收事件
    pub async fn recv_async(&self) -> Option<CrawlEvent> {
        self.rx.recv_async().await.ok()
    }

    /// 取出当前已缓冲的全部事件
    pub fn drain(&self) -> Vec<CrawlEvent> {
        self.rx.drain().collect()
    }
}

/// 创建事件通道
pub fn create_event_channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = flume::unbounded();
    (EventSender::new(tx), EventReceiver::new(rx))
}
