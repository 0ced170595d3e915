// ==========================================
// 拣货批次系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 仓库拣货批次规则执行 + 装箱库位传播
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 过滤表达式层 - 已保存过滤器的解析与编译
pub mod filter;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{BatchState, PickingState};

// 领域实体
pub use domain::{
    ActionLog, ActionType, BatchRule, Location, MoveLine, MoveLineValues, Picking, PickingBatch,
    StoredFilter,
};

// 过滤器
pub use filter::{FilterDomain, FilterError};

// 引擎
pub use engine::{
    BatchCreationEngine, BoxPropagationEngine, EngineError, OperationContext, TracingNotifier,
};

// API
pub use api::{ApiError, BatchApi, BatchCreationView, MoveLineApi};

// 配置
pub use config::{BoxConfigReader, ConfigManager};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "拣货批次系统";

// 数据库版本
pub const DB_VERSION: &str = "v0.1";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
