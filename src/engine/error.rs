// ==========================================
// 拣货批次系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 规则或过滤器配置错误（规则整体不执行）
    #[error("规则配置错误: {0}")]
    Configuration(String),

    /// 目标箱位已被活动批次占用
    #[error("Box is not empty")]
    BoxOccupied,

    /// 配置读取失败
    #[error("配置读取失败: {0}")]
    Config(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type EngineResult<T> = Result<T, EngineError>;
