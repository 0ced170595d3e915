// ==========================================
// 拣货批次系统 - 业务规则引擎层
// ==========================================
// 职责: 批次规则执行、装箱库位传播
// 约束: 纯逻辑放在 *_core，I/O 通过 Repository
// ==========================================

pub mod batch_core;
pub mod batch_creation;
pub mod box_core;
pub mod box_propagation;
pub mod context;
pub mod error;
pub mod notifier;

pub use batch_core::BatchCore;
pub use batch_creation::BatchCreationEngine;
pub use box_core::BoxCore;
pub use box_propagation::BoxPropagationEngine;
pub use context::OperationContext;
pub use error::{EngineError, EngineResult};
pub use notifier::{Notifier, TracingNotifier};
