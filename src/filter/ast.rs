// ==========================================
// 拣货批次系统 - 过滤表达式语法树
// ==========================================
// 红线: 封闭语法树，只允许白名单字段与运算符
// ==========================================

use crate::domain::picking::Picking;
use crate::filter::error::{FilterError, FilterResult};
use std::fmt;

// ==========================================
// Literal - 字面量
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null, // None / False
    Int(i64),
    Text(String),
    List(Vec<Literal>),
}

impl Literal {
    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }
}

// ==========================================
// FieldKind - 字段类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Text,
}

// ==========================================
// PickingField - 可过滤的拣货单字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickingField {
    Id,
    Name,
    Origin,
    State,
    Priority,
    PickingTypeId,
    PartnerId,
    CompanyId,
    LocationId,
    LocationDestId,
    ScheduledDate,
    BatchId,
}

impl PickingField {
    pub fn from_name(name: &str) -> Option<Self> {
        let field = match name {
            "id" => PickingField::Id,
            "name" => PickingField::Name,
            "origin" => PickingField::Origin,
            "state" => PickingField::State,
            "priority" => PickingField::Priority,
            "picking_type_id" => PickingField::PickingTypeId,
            "partner_id" => PickingField::PartnerId,
            "company_id" => PickingField::CompanyId,
            "location_id" => PickingField::LocationId,
            "location_dest_id" => PickingField::LocationDestId,
            "scheduled_date" => PickingField::ScheduledDate,
            "batch_id" => PickingField::BatchId,
            _ => return None,
        };
        Some(field)
    }

    /// 数据库列名 (stock_picking 表)
    pub fn column(&self) -> &'static str {
        match self {
            PickingField::Id => "id",
            PickingField::Name => "name",
            PickingField::Origin => "origin",
            PickingField::State => "state",
            PickingField::Priority => "priority",
            PickingField::PickingTypeId => "picking_type_id",
            PickingField::PartnerId => "partner_id",
            PickingField::CompanyId => "company_id",
            PickingField::LocationId => "location_id",
            PickingField::LocationDestId => "location_dest_id",
            PickingField::ScheduledDate => "scheduled_date",
            PickingField::BatchId => "batch_id",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            PickingField::Name
            | PickingField::Origin
            | PickingField::State
            | PickingField::ScheduledDate => FieldKind::Text,
            _ => FieldKind::Integer,
        }
    }

    /// 读取拣货单上的字段值
    pub fn value_of(&self, picking: &Picking) -> Literal {
        fn opt_int(v: Option<i64>) -> Literal {
            v.map(Literal::Int).unwrap_or(Literal::Null)
        }
        fn opt_text(v: &Option<String>) -> Literal {
            v.clone().map(Literal::Text).unwrap_or(Literal::Null)
        }

        match self {
            PickingField::Id => Literal::Int(picking.id),
            PickingField::Name => Literal::Text(picking.name.clone()),
            PickingField::Origin => opt_text(&picking.origin),
            PickingField::State => Literal::Text(picking.state.to_db_str().to_string()),
            PickingField::Priority => Literal::Int(picking.priority),
            PickingField::PickingTypeId => opt_int(picking.picking_type_id),
            PickingField::PartnerId => opt_int(picking.partner_id),
            PickingField::CompanyId => opt_int(picking.company_id),
            PickingField::LocationId => opt_int(picking.location_id),
            PickingField::LocationDestId => opt_int(picking.location_dest_id),
            PickingField::ScheduledDate => opt_text(&picking.scheduled_date),
            PickingField::BatchId => opt_int(picking.batch_id),
        }
    }
}

impl fmt::Display for PickingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column())
    }
}

// ==========================================
// Operator - 白名单运算符
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
    Like,
    NotLike,
    ILike,
    NotILike,
}

impl Operator {
    pub fn from_token(token: &str) -> Option<Self> {
        let op = match token.to_lowercase().as_str() {
            "=" | "==" => Operator::Eq,
            "!=" | "<>" => Operator::Ne,
            "<" => Operator::Lt,
            "<=" => Operator::Le,
            ">" => Operator::Gt,
            ">=" => Operator::Ge,
            "in" => Operator::In,
            "not in" => Operator::NotIn,
            "like" => Operator::Like,
            "not like" => Operator::NotLike,
            "ilike" => Operator::ILike,
            "not ilike" => Operator::NotILike,
            _ => return None,
        };
        Some(op)
    }

    fn is_ordering(&self) -> bool {
        matches!(self, Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge)
    }

    fn is_pattern(&self) -> bool {
        matches!(
            self,
            Operator::Like | Operator::NotLike | Operator::ILike | Operator::NotILike
        )
    }
}

// ==========================================
// Condition - 叶子条件 (field, operator, value)
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: PickingField,
    pub operator: Operator,
    pub value: Literal,
}

impl Condition {
    /// 构造并校验条件
    ///
    /// # 规则
    /// - in / not in: 值必须为列表 (标量自动包装)
    /// - 比较运算: 值不能为空
    /// - like 系列: 值必须为文本，且字段为文本字段
    /// - 字面量类型必须与字段类型一致
    pub fn new(field: PickingField, operator: Operator, value: Literal) -> FilterResult<Self> {
        let invalid = |message: &str| FilterError::InvalidValue {
            field: field.column().to_string(),
            message: message.to_string(),
        };

        let value = match (operator, value) {
            (Operator::In | Operator::NotIn, Literal::List(items)) => Literal::List(items),
            (Operator::In | Operator::NotIn, scalar) => Literal::List(vec![scalar]),
            (_, Literal::List(_)) => return Err(invalid("只有 in / not in 允许列表值")),
            (_, scalar) => scalar,
        };

        if operator.is_ordering() && value.is_null() {
            return Err(invalid("比较运算不允许空值"));
        }

        if operator.is_pattern() {
            if field.kind() != FieldKind::Text {
                return Err(invalid("like 运算只适用于文本字段"));
            }
            if !matches!(value, Literal::Text(_)) {
                return Err(invalid("like 运算的值必须为文本"));
            }
        }

        let scalars: Vec<&Literal> = match &value {
            Literal::List(items) => items.iter().collect(),
            other => vec![other],
        };
        for scalar in scalars {
            match (field.kind(), scalar) {
                (_, Literal::Null) => {}
                (FieldKind::Integer, Literal::Int(_)) => {}
                (FieldKind::Text, Literal::Text(_)) => {}
                (_, Literal::List(_)) => return Err(invalid("不允许嵌套列表")),
                (FieldKind::Integer, _) => return Err(invalid("整数字段需要整数值")),
                (FieldKind::Text, _) => return Err(invalid("文本字段需要文本值")),
            }
        }

        Ok(Self {
            field,
            operator,
            value,
        })
    }

    /// 在内存中判定拣货单是否满足条件
    pub fn matches(&self, picking: &Picking) -> bool {
        let actual = self.field.value_of(picking);

        match self.operator {
            Operator::Eq => match &self.value {
                Literal::Null => actual.is_null(),
                expected => actual == *expected,
            },
            Operator::Ne => match &self.value {
                Literal::Null => !actual.is_null(),
                expected => actual.is_null() || actual != *expected,
            },
            Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge => {
                match compare(&actual, &self.value) {
                    Some(ord) => match self.operator {
                        Operator::Lt => ord.is_lt(),
                        Operator::Le => ord.is_le(),
                        Operator::Gt => ord.is_gt(),
                        _ => ord.is_ge(),
                    },
                    None => false,
                }
            }
            Operator::In | Operator::NotIn => {
                let items: &[Literal] = match &self.value {
                    Literal::List(items) => items.as_slice(),
                    _ => &[],
                };
                let has_null = items.iter().any(Literal::is_null);
                let contained = if actual.is_null() {
                    has_null
                } else {
                    items.contains(&actual)
                };
                if self.operator == Operator::In {
                    contained
                } else {
                    !contained
                }
            }
            Operator::Like | Operator::NotLike | Operator::ILike | Operator::NotILike => {
                let case_insensitive =
                    matches!(self.operator, Operator::ILike | Operator::NotILike);
                let found = match (&actual, &self.value) {
                    (Literal::Text(text), Literal::Text(pattern)) if case_insensitive => {
                        text.to_lowercase().contains(&pattern.to_lowercase())
                    }
                    (Literal::Text(text), Literal::Text(pattern)) => text.contains(pattern.as_str()),
                    _ => false,
                };
                match self.operator {
                    Operator::Like | Operator::ILike => found,
                    _ => actual.is_null() || !found,
                }
            }
        }
    }
}

fn compare(left: &Literal, right: &Literal) -> Option<std::cmp::Ordering> {
    match (left, right) {
        (Literal::Int(a), Literal::Int(b)) => Some(a.cmp(b)),
        (Literal::Text(a), Literal::Text(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

// ==========================================
// DomainExpr - 布尔组合表达式
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum DomainExpr {
    /// 空过滤器，匹配所有记录
    All,
    Leaf(Condition),
    Not(Box<DomainExpr>),
    And(Box<DomainExpr>, Box<DomainExpr>),
    Or(Box<DomainExpr>, Box<DomainExpr>),
}

impl DomainExpr {
    pub fn and(left: DomainExpr, right: DomainExpr) -> DomainExpr {
        match (left, right) {
            (DomainExpr::All, other) | (other, DomainExpr::All) => other,
            (l, r) => DomainExpr::And(Box::new(l), Box::new(r)),
        }
    }

    pub fn matches(&self, picking: &Picking) -> bool {
        match self {
            DomainExpr::All => true,
            DomainExpr::Leaf(cond) => cond.matches(picking),
            DomainExpr::Not(inner) => !inner.matches(picking),
            DomainExpr::And(l, r) => l.matches(picking) && r.matches(picking),
            DomainExpr::Or(l, r) => l.matches(picking) || r.matches(picking),
        }
    }
}
