// ==========================================
// 拣货批次系统 - 操作日志数据仓储
// ==========================================
// 对齐: action_log 表
// 红线: 批次创建与装箱传播必须留痕
// ==========================================

mod core;
mod queries;

#[cfg(test)]
mod tests;

pub use core::ActionLogRepository;
