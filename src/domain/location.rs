// ==========================================
// 拣货批次系统 - 库位领域模型
// ==========================================

use serde::{Deserialize, Serialize};

/// 库位 (暂存区/箱位)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
}
