//! 请求与结果报文 (Request / Result Envelopes)
//!
//! 入站请求的宽松解析，以及出站 `CrawlResult` 的组装规则。

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::core::error::{CrawlerError, Result};
use crate::core::model::{EpisodeUpdate, EventType, TitleSummary, WebtoonRecord, WorkItem};

/// 入站抓取请求
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlRequest {
    pub request_id: String,
    pub event_type: EventType,
    pub data: Vec<WorkItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRequest {
    request_id: Option<String>,
    event_type: Option<String>,
    #[serde(default)]
    data: Value,
    /// 旧版增量更新报文
    requests: Option<Value>,
}

impl CrawlRequest {
    pub fn new(event_type: EventType, data: Vec<WorkItem>) -> Self {
        Self {
            request_id: generate_request_id(),
            event_type,
            data,
        }
    }

    /// 解析队列消息体
    ///
    /// `requestId` 缺失时依次回退到传输层消息 ID 与随机 UUID。
    pub fn from_json(body: &str, message_id: Option<&str>) -> Result<Self> {
        let raw: RawRequest = serde_json::from_str(body)
            .map_err(|e| CrawlerError::InvalidRequest(format!("malformed body: {}", e)))?;

        let request_id = raw
            .request_id
            .filter(|id| !id.trim().is_empty())
            .or_else(|| message_id.map(str::to_string))
            .unwrap_or_else(generate_request_id);

        let (event_type, data) = match (raw.event_type, raw.requests) {
            (Some(event), _) => (EventType::from_key(&event), raw.data),
            (None, Some(requests)) => (EventType::IncrementalUpdate, requests),
            (None, None) => {
                return Err(CrawlerError::InvalidRequest("missing eventType".into()));
            }
        };

        Ok(Self {
            request_id,
            event_type,
            data: parse_items(data)?,
        })
    }
}

/// 数据载荷：对象、数组或缺省 (单例)
fn parse_items(data: Value) -> Result<Vec<WorkItem>> {
    let items = match data {
        Value::Null => vec![WorkItem::default()],
        Value::Array(values) => values
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<WorkItem>, _>>()
            .map_err(|e| CrawlerError::InvalidRequest(format!("malformed data item: {}", e)))?,
        other => vec![
            serde_json::from_value(other)
                .map_err(|e| CrawlerError::InvalidRequest(format!("malformed data: {}", e)))?,
        ],
    };
    Ok(items)
}

pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

// ============================================================================
// 出站结果
// ============================================================================

pub const STATUS_OK: u16 = 200;
pub const STATUS_NO_CHANGE: u16 = 204;
pub const STATUS_FAILED: u16 = 500;

/// 条目产出数据
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutcomeData {
    Record(Box<WebtoonRecord>),
    Update(EpisodeUpdate),
    Titles(Vec<TitleSummary>),
    /// 失败条目回显原始输入
    Item(WorkItem),
}

/// 对外暴露的错误信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub name: String,
    pub message: String,
}

impl From<&CrawlerError> for ErrorInfo {
    fn from(e: &CrawlerError) -> Self {
        Self {
            name: e.name().to_string(),
            message: e.to_string(),
        }
    }
}

/// 单个工作条目的处理结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionOutcome {
    pub status_code: u16,
    pub data: Option<OutcomeData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl CollectionOutcome {
    pub fn ok(data: OutcomeData) -> Self {
        Self {
            status_code: STATUS_OK,
            data: Some(data),
            error: None,
        }
    }

    /// 已检查，无新内容
    pub fn no_change(data: OutcomeData) -> Self {
        Self {
            status_code: STATUS_NO_CHANGE,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(item: &WorkItem, error: &CrawlerError) -> Self {
        Self {
            status_code: STATUS_FAILED,
            data: Some(OutcomeData::Item(item.clone())),
            error: Some(error.into()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status_code == STATUS_FAILED
    }

    pub fn record(&self) -> Option<&WebtoonRecord> {
        match &self.data {
            Some(OutcomeData::Record(record)) => Some(record),
            _ => None,
        }
    }

    pub fn update(&self) -> Option<&EpisodeUpdate> {
        match &self.data {
            Some(OutcomeData::Update(update)) => Some(update),
            _ => None,
        }
    }

    pub fn titles(&self) -> Option<&[TitleSummary]> {
        match &self.data {
            Some(OutcomeData::Titles(titles)) => Some(titles),
            _ => None,
        }
    }
}

/// 聚合后的抓取结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlResult {
    pub request_id: String,
    pub event_type: EventType,
    pub data: Vec<CollectionOutcome>,
    pub message: String,
    pub status_code: u16,
}

impl CrawlResult {
    /// 由条目结果聚合：任一条目 500 则整体 500，否则 200
    pub fn aggregate(request_id: String, event_type: EventType, data: Vec<CollectionOutcome>) -> Self {
        let failed = data.iter().filter(|o| o.is_failure()).count();
        let unchanged = data
            .iter()
            .filter(|o| o.status_code == STATUS_NO_CHANGE)
            .count();
        let succeeded = data.len() - failed - unchanged;

        let status_code = if failed > 0 { STATUS_FAILED } else { STATUS_OK };
        let message = format!(
            "{} processed {} item(s): {} succeeded, {} unchanged, {} failed",
            event_type,
            data.len(),
            succeeded,
            unchanged,
            failed
        );

        Self {
            request_id,
            event_type,
            data,
            message,
            status_code,
        }
    }

    /// 调用在逐条处理开始前就失败时的结果
    pub fn failure(request_id: String, event_type: EventType, error: &CrawlerError) -> Self {
        Self {
            request_id,
            event_type,
            data: Vec::new(),
            message: error.to_string(),
            status_code: STATUS_FAILED,
        }
    }

    /// 拆分为逐条结果，供按条投递
    pub fn split(&self) -> Vec<CrawlResult> {
        self.data
            .iter()
            .map(|outcome| CrawlResult {
                request_id: self.request_id.clone(),
                event_type: self.event_type.clone(),
                message: match &outcome.error {
                    Some(e) => e.message.clone(),
                    None => self.message.clone(),
                },
                status_code: outcome.status_code,
                data: vec![outcome.clone()],
            })
            .collect()
    }
}

/// 整体失败时投递给错误通道的报告
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub request_id: String,
    pub event_type: EventType,
    pub error: ErrorInfo,
}
