// ==========================================
// 拣货批次系统 - 操作日志领域模型
// ==========================================
// 红线: 批次创建与装箱传播必须留痕
// 对齐: action_log 表
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ==========================================
// ActionLog - 操作日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub action_id: String,               // 日志ID (UUID)
    pub batch_id: Option<i64>,           // 关联批次
    pub action_type: String,             // 操作类型 (存储为字符串)
    pub action_ts: NaiveDateTime,        // 操作时间戳
    pub actor: String,                   // 操作人
    pub payload_json: Option<JsonValue>, // 操作负载 (JSON)
    pub detail: Option<String>,          // 详细描述
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    BatchCreation,  // 规则创建批次
    BoxPropagation, // 装箱库位传播
}

impl ActionType {
    /// 转换为字符串 (用于数据库存储)
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::BatchCreation => "BatchCreation",
            ActionType::BoxPropagation => "BoxPropagation",
        }
    }

    /// 从字符串解析
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "BatchCreation" => Some(ActionType::BatchCreation),
            "BoxPropagation" => Some(ActionType::BoxPropagation),
            _ => None,
        }
    }
}

// ==========================================
// BoxPropagationPayload - 装箱传播负载
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxPropagationPayload {
    pub batch_id: i64,
    pub batch_name: String,
    pub location_dest_id: i64,
    pub origins: Vec<String>,
    pub line_ids: Vec<i64>,
}

impl ActionLog {
    /// 创建新的操作日志
    pub fn new(action_type: ActionType, batch_id: Option<i64>, actor: &str) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            batch_id,
            action_type: action_type.as_str().to_string(),
            action_ts: chrono::Utc::now().naive_utc(),
            actor: actor.to_string(),
            payload_json: None,
            detail: None,
        }
    }

    /// 设置操作负载 (转换为JSON)
    pub fn with_payload<T: Serialize>(mut self, payload: &T) -> Self {
        self.payload_json = serde_json::to_value(payload).ok();
        self
    }

    /// 设置详细描述
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
