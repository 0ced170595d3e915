// ==========================================
// 拣货批次系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod action_log_repo;
pub mod batch_repo;
pub mod batch_rule_repo;
pub mod error;
pub mod filter_repo;
pub mod location_repo;
pub mod move_line_repo;
pub mod picking_repo;
pub mod sql_utils;

// 重导出核心仓储
pub use action_log_repo::ActionLogRepository;
pub use batch_repo::BatchRepository;
pub use batch_rule_repo::BatchRuleRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use filter_repo::FilterRepository;
pub use location_repo::LocationRepository;
pub use move_line_repo::{MoveLineContext, MoveLineRepository};
pub use picking_repo::PickingRepository;
