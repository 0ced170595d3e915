// ==========================================
// 拣货批次系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod action_log;
pub mod batch;
pub mod location;
pub mod picking;
pub mod types;

// 重导出核心类型
pub use action_log::{ActionLog, ActionType, BoxPropagationPayload};
pub use batch::{BatchRule, NewBatchRule, PickingBatch, StoredFilter, PICKING_MODEL};
pub use location::Location;
pub use picking::{MoveLine, MoveLineValues, NewMoveLine, NewPicking, Picking, PickingType};
pub use types::{BatchState, PickingState};
