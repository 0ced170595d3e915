// ==========================================
// 拣货批次系统 - 受限过滤表达式层
// ==========================================
// 职责: 解析已保存过滤器的 domain 文本，输出谓词与参数化 SQL
// 红线: 只接受白名单字段/运算符，不执行任何代码
// ==========================================

pub mod ast;
pub mod error;
pub mod parser;
pub mod sql;

pub use ast::{Condition, DomainExpr, Literal, Operator, PickingField};
pub use error::{FilterError, FilterResult};
pub use sql::SqlFragment;

use crate::domain::picking::Picking;

// ==========================================
// FilterDomain - 已编译的过滤器
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct FilterDomain {
    expr: DomainExpr,
}

impl FilterDomain {
    /// 解析并校验 domain 文本
    pub fn parse(src: &str) -> FilterResult<Self> {
        Ok(Self {
            expr: parser::parse_domain(src)?,
        })
    }

    /// 匹配所有记录的空过滤器
    pub fn all() -> Self {
        Self {
            expr: DomainExpr::All,
        }
    }

    pub fn expr(&self) -> &DomainExpr {
        &self.expr
    }

    /// 谓词: 判定单个拣货单是否满足过滤器
    pub fn matches(&self, picking: &Picking) -> bool {
        self.expr.matches(picking)
    }

    /// 编译为 stock_picking 表上的 WHERE 片段
    pub fn to_sql(&self) -> SqlFragment {
        sql::to_sql(&self.expr)
    }
}
