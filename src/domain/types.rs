// ==========================================
// 拣货批次系统 - 领域类型定义
// ==========================================
// 职责: 订单状态、批次状态等枚举
// 存储格式: 小写 snake_case (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 拣货单状态 (Picking State)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickingState {
    Draft,     // 草稿
    Waiting,   // 等待其他作业
    Confirmed, // 等待库存
    Assigned,  // 已预留(可批次化)
    Done,      // 完成
    Cancel,    // 取消
}

impl PickingState {
    /// 从数据库字符串解析
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "waiting" => PickingState::Waiting,
            "confirmed" => PickingState::Confirmed,
            "assigned" => PickingState::Assigned,
            "done" => PickingState::Done,
            "cancel" => PickingState::Cancel,
            _ => PickingState::Draft, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            PickingState::Draft => "draft",
            PickingState::Waiting => "waiting",
            PickingState::Confirmed => "confirmed",
            PickingState::Assigned => "assigned",
            PickingState::Done => "done",
            PickingState::Cancel => "cancel",
        }
    }
}

impl fmt::Display for PickingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 批次状态 (Batch State)
// ==========================================
// 红线: draft / in_progress 视为"活动批次"，参与装箱占用校验
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchState {
    Draft,      // 草稿
    InProgress, // 进行中
    Done,       // 完成
    Cancelled,  // 取消
}

impl BatchState {
    /// 活动批次状态集合
    pub const OPEN: [BatchState; 2] = [BatchState::Draft, BatchState::InProgress];

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "in_progress" => BatchState::InProgress,
            "done" => BatchState::Done,
            "cancel" | "cancelled" => BatchState::Cancelled,
            _ => BatchState::Draft,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            BatchState::Draft => "draft",
            BatchState::InProgress => "in_progress",
            BatchState::Done => "done",
            BatchState::Cancelled => "cancelled",
        }
    }

    /// 是否为活动批次
    pub fn is_open(&self) -> bool {
        Self::OPEN.contains(self)
    }
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_state_open_set() {
        assert!(BatchState::Draft.is_open());
        assert!(BatchState::InProgress.is_open());
        assert!(!BatchState::Done.is_open());
        assert!(!BatchState::Cancelled.is_open());
    }

    #[test]
    fn test_state_db_strings() {
        assert_eq!(PickingState::from_str("ASSIGNED"), PickingState::Assigned);
        assert_eq!(PickingState::Assigned.to_db_str(), "assigned");
        assert_eq!(BatchState::from_str("in_progress"), BatchState::InProgress);
        assert_eq!(BatchState::InProgress.to_string(), "in_progress");
    }
}
