// ==========================================
// 拣货批次系统 - API 层
// ==========================================
// 职责: 面向宿主的入口，错误统一转换为 ApiError
// ==========================================

pub mod batch_api;
pub mod error;
pub mod move_line_api;

pub use batch_api::{BatchApi, BatchCreationView};
pub use error::{ApiError, ApiResult};
pub use move_line_api::MoveLineApi;
