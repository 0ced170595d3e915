// ==========================================
// 拣货批次系统 - 过滤表达式错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 过滤表达式解析/校验错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("过滤表达式语法错误 (位置 {position}): {message}")]
    Syntax { position: usize, message: String },

    #[error("过滤条件格式错误: {0}")]
    MalformedTerm(String),

    #[error("不允许的字段: {0}")]
    UnknownField(String),

    #[error("不允许的运算符: {0}")]
    UnsupportedOperator(String),

    #[error("字段值错误 (field={field}): {message}")]
    InvalidValue { field: String, message: String },
}

/// Result 类型别名
pub type FilterResult<T> = Result<T, FilterError>;
