// ==========================================
// 拣货批次系统 - 拣货单/作业明细领域模型
// ==========================================
// 对齐: stock_picking / stock_move_line / stock_picking_type 表
// 红线: 本系统只修改 picking.batch_id 与 move_line.location_dest_id
// ==========================================

use crate::domain::types::PickingState;
use serde::{Deserialize, Serialize};

// ==========================================
// PickingType - 作业类型
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickingType {
    pub id: i64,
    pub name: String,
}

// ==========================================
// Picking - 出库拣货单 (订单)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Picking {
    pub id: i64,
    pub name: String,
    pub origin: Option<String>,           // 来源单据号
    pub state: PickingState,
    pub priority: i64,
    pub picking_type_id: Option<i64>,
    pub partner_id: Option<i64>,
    pub company_id: Option<i64>,
    pub location_id: Option<i64>,
    pub location_dest_id: Option<i64>,
    pub scheduled_date: Option<String>,   // 'YYYY-MM-DD HH:MM:SS'
    pub batch_id: Option<i64>,            // 所属批次
}

// ==========================================
// MoveLine - 作业明细行 (订单行)
// ==========================================
// 装箱传播的操作对象
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveLine {
    pub id: i64,
    pub picking_id: i64,
    pub origin: Option<String>,  // 逻辑订单号 (同一订单的多行共享)
    pub location_dest_id: i64,
    pub quantity: f64,
}

// ==========================================
// MoveLineValues - 明细行写入值
// ==========================================
// None 表示该字段不在本次写入中
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveLineValues {
    pub location_dest_id: Option<i64>,
    pub quantity: Option<f64>,
}

impl MoveLineValues {
    /// 仅修改目标库位
    pub fn location_dest(location_id: i64) -> Self {
        Self {
            location_dest_id: Some(location_id),
            ..Default::default()
        }
    }

    /// 是否没有任何字段需要写入
    pub fn is_empty(&self) -> bool {
        self.location_dest_id.is_none() && self.quantity.is_none()
    }
}

/// 新建拣货单参数
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPicking {
    pub name: String,
    pub origin: Option<String>,
    pub state: Option<PickingState>,
    pub priority: i64,
    pub picking_type_id: Option<i64>,
    pub partner_id: Option<i64>,
    pub company_id: Option<i64>,
    pub scheduled_date: Option<String>,
}

/// 新建明细行参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMoveLine {
    pub picking_id: i64,
    pub origin: Option<String>,
    pub location_dest_id: i64,
    pub quantity: f64,
}
