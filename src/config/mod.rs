// ==========================================
// 拣货批次系统 - 配置层
// ==========================================
// 职责: 进程级配置管理
// 存储: config_kv 表
// ==========================================

pub mod box_config_trait;
pub mod config_manager;

// 重导出核心配置管理器
pub use box_config_trait::BoxConfigReader;
pub use config_manager::{
    config_keys, ConfigManager, DEFAULT_ORDERS_PER_BOX, DEFAULT_STAGING_LOCATION_NAME,
};
