// ==========================================
// 拣货批次系统 - 过滤表达式 → SQL 片段
// ==========================================
// 红线: 所有值参数化绑定，列名只来自白名单字段
// 语义与 DomainExpr::matches 保持一致
// ==========================================

use crate::filter::ast::{Condition, DomainExpr, Literal, Operator};
use rusqlite::types::Value;

/// 参数化 SQL 条件片段
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFragment {
    pub sql: String,
    pub params: Vec<Value>,
}

impl SqlFragment {
    fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    fn constant(truth: bool) -> Self {
        Self::new(if truth { "1" } else { "0" }, Vec::new())
    }
}

fn bind(literal: &Literal) -> Value {
    match literal {
        Literal::Null => Value::Null,
        Literal::Int(i) => Value::Integer(*i),
        Literal::Text(s) => Value::Text(s.clone()),
        Literal::List(_) => Value::Null,
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

fn condition_sql(cond: &Condition) -> SqlFragment {
    let col = cond.field.column();

    match cond.operator {
        Operator::Eq if cond.value.is_null() => SqlFragment::new(format!("{} IS NULL", col), vec![]),
        Operator::Eq => SqlFragment::new(format!("{} = ?", col), vec![bind(&cond.value)]),
        Operator::Ne if cond.value.is_null() => {
            SqlFragment::new(format!("{} IS NOT NULL", col), vec![])
        }
        Operator::Ne => SqlFragment::new(
            format!("({} != ? OR {} IS NULL)", col, col),
            vec![bind(&cond.value)],
        ),
        Operator::Lt => SqlFragment::new(format!("{} < ?", col), vec![bind(&cond.value)]),
        Operator::Le => SqlFragment::new(format!("{} <= ?", col), vec![bind(&cond.value)]),
        Operator::Gt => SqlFragment::new(format!("{} > ?", col), vec![bind(&cond.value)]),
        Operator::Ge => SqlFragment::new(format!("{} >= ?", col), vec![bind(&cond.value)]),
        Operator::In | Operator::NotIn => {
            let items: &[Literal] = match &cond.value {
                Literal::List(items) => items.as_slice(),
                _ => &[],
            };
            let has_null = items.iter().any(Literal::is_null);
            let values: Vec<Value> = items.iter().filter(|v| !v.is_null()).map(bind).collect();
            let in_list = format!("{} IN ({})", col, placeholders(values.len()));
            let not_in_list = format!("{} NOT IN ({})", col, placeholders(values.len()));

            match (cond.operator, values.is_empty(), has_null) {
                (Operator::In, true, false) => SqlFragment::constant(false),
                (Operator::In, true, true) => SqlFragment::new(format!("{} IS NULL", col), vec![]),
                (Operator::In, false, false) => SqlFragment::new(in_list, values),
                (Operator::In, false, true) => {
                    SqlFragment::new(format!("({} OR {} IS NULL)", in_list, col), values)
                }
                (_, true, false) => SqlFragment::constant(true),
                (_, true, true) => SqlFragment::new(format!("{} IS NOT NULL", col), vec![]),
                (_, false, true) => SqlFragment::new(not_in_list, values),
                (_, false, false) => {
                    SqlFragment::new(format!("({} OR {} IS NULL)", not_in_list, col), values)
                }
            }
        }
        Operator::Like => {
            SqlFragment::new(format!("instr({}, ?) > 0", col), vec![bind(&cond.value)])
        }
        Operator::ILike => SqlFragment::new(
            format!("instr(lower({}), lower(?)) > 0", col),
            vec![bind(&cond.value)],
        ),
        Operator::NotLike => SqlFragment::new(
            format!("({} IS NULL OR instr({}, ?) = 0)", col, col),
            vec![bind(&cond.value)],
        ),
        Operator::NotILike => SqlFragment::new(
            format!("({} IS NULL OR instr(lower({}), lower(?)) = 0)", col, col),
            vec![bind(&cond.value)],
        ),
    }
}

/// 将语法树编译为 WHERE 子句片段
pub fn to_sql(expr: &DomainExpr) -> SqlFragment {
    match expr {
        DomainExpr::All => SqlFragment::constant(true),
        DomainExpr::Leaf(cond) => condition_sql(cond),
        DomainExpr::Not(inner) => {
            // NULL 视为不满足，与内存谓词一致
            let inner = to_sql(inner);
            SqlFragment::new(format!("NOT COALESCE(({}), 0)", inner.sql), inner.params)
        }
        DomainExpr::And(l, r) | DomainExpr::Or(l, r) => {
            let joiner = if matches!(expr, DomainExpr::And(..)) { "AND" } else { "OR" };
            let left = to_sql(l);
            let right = to_sql(r);
            let mut params = left.params;
            params.extend(right.params);
            SqlFragment::new(format!("({} {} {})", left.sql, joiner, right.sql), params)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::parser::parse_domain;

    #[test]
    fn test_eq_false_is_null_check() {
        let frag = to_sql(&parse_domain("[('batch_id', '=', False)]").unwrap());
        assert_eq!(frag.sql, "batch_id IS NULL");
        assert!(frag.params.is_empty());
    }

    #[test]
    fn test_or_with_params_in_order() {
        let frag = to_sql(
            &parse_domain("['|', ('origin', 'ilike', 'web'), ('partner_id', 'in', [3, 4])]")
                .unwrap(),
        );
        assert_eq!(
            frag.sql,
            "(instr(lower(origin), lower(?)) > 0 OR partner_id IN (?, ?))"
        );
        assert_eq!(
            frag.params,
            vec![
                Value::Text("web".to_string()),
                Value::Integer(3),
                Value::Integer(4)
            ]
        );
    }

    #[test]
    fn test_empty_in_list_is_false() {
        let frag = to_sql(&parse_domain("[('partner_id', 'in', [])]").unwrap());
        assert_eq!(frag.sql, "0");
    }

    #[test]
    fn test_not_in_includes_nulls() {
        let frag = to_sql(&parse_domain("[('partner_id', 'not in', [1])]").unwrap());
        assert_eq!(frag.sql, "(partner_id NOT IN (?) OR partner_id IS NULL)");
    }

    #[test]
    fn test_not_treats_null_as_unmatched() {
        let frag = to_sql(&parse_domain("['!', ('partner_id', '=', 3)]").unwrap());
        assert_eq!(frag.sql, "NOT COALESCE((partner_id = ?), 0)");
    }
}
