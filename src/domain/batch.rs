// ==========================================
// 拣货批次系统 - 批次与批次规则领域模型
// ==========================================
// 对齐: stock_picking_batch / stock_picking_batch_rule / ir_filters 表
// ==========================================

use crate::domain::types::BatchState;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 批次规则允许引用的过滤器模型
pub const PICKING_MODEL: &str = "stock.picking";

/// 默认每批箱数
pub const DEFAULT_BOXES_PER_BATCH: i64 = 9;

/// 默认每箱订单数
pub const DEFAULT_ORDERS_PER_BOX: i64 = 6;

/// 默认规则序号
pub const DEFAULT_RULE_PRIORITY: i64 = 5;

// ==========================================
// BatchRule - 批次创建规则
// ==========================================
// 一个批次 = boxes_per_batch 箱 × orders_per_box 单
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRule {
    pub id: i64,
    pub name: Option<String>,
    pub filter_id: i64,                   // 动态过滤器 (必填)
    pub boxes_per_batch: i64,
    pub orders_per_box: i64,
    pub picking_type_id: Option<i64>,     // 目标作业类型
    pub priority: i64,                    // 规则序号，越小越先执行
}

impl BatchRule {
    /// 单个批次包含的订单数
    ///
    /// 箱数或每箱订单数非正、或乘积溢出时返回 None
    pub fn group_size(&self) -> Option<usize> {
        if self.boxes_per_batch <= 0 || self.orders_per_box <= 0 {
            return None;
        }
        self.boxes_per_batch
            .checked_mul(self.orders_per_box)
            .and_then(|n| usize::try_from(n).ok())
    }
}

/// 新建规则参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBatchRule {
    pub name: Option<String>,
    pub filter_id: i64,
    pub boxes_per_batch: i64,
    pub orders_per_box: i64,
    pub picking_type_id: Option<i64>,
    pub priority: i64,
}

impl NewBatchRule {
    pub fn new(filter_id: i64, picking_type_id: Option<i64>) -> Self {
        Self {
            name: None,
            filter_id,
            boxes_per_batch: DEFAULT_BOXES_PER_BATCH,
            orders_per_box: DEFAULT_ORDERS_PER_BOX,
            picking_type_id,
            priority: DEFAULT_RULE_PRIORITY,
        }
    }
}

// ==========================================
// PickingBatch - 拣货批次
// ==========================================
// 红线: 成员在创建时一次性确定，不存在部分订单
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickingBatch {
    pub id: i64,
    pub name: String,
    pub company_id: i64,
    pub batch_rule_id: Option<i64>,
    pub state: BatchState,
    pub created_at: NaiveDateTime,
}

// ==========================================
// StoredFilter - 已保存的过滤器
// ==========================================
// domain 为受限过滤表达式文本，由 filter 模块解析
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFilter {
    pub id: i64,
    pub name: String,
    pub model: String,
    pub domain: String,
}
