// ==========================================
// 拣货批次系统 - 过滤表达式解析器
// ==========================================
// 输入: 已保存过滤器的 domain 文本，例如
//   [('origin', 'ilike', 'WEB'), '|', ('priority', '>', 0), ('partner_id', 'in', [3, 4])]
// 红线: 只做字面量解析，不执行任何代码
// ==========================================

use crate::filter::ast::{Condition, DomainExpr, Literal, Operator, PickingField};
use crate::filter::error::{FilterError, FilterResult};
use std::iter::Peekable;
use std::str::CharIndices;

/// 列表嵌套与逻辑运算符嵌套的最大深度
pub const MAX_DEPTH: usize = 64;

/// 单个过滤器允许的最大项数（条件 + 逻辑运算符）
pub const MAX_TERMS: usize = 1024;

fn too_deep() -> FilterError {
    FilterError::MalformedTerm(format!("嵌套深度超过上限 {}", MAX_DEPTH))
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Open(char),
    Close(char),
    Comma,
    Str(String),
    Int(i64),
    Ident(String),
}

struct Lexer<'a> {
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            chars: src.char_indices().peekable(),
        }
    }

    fn tokenize(mut self) -> FilterResult<Vec<(usize, Token)>> {
        let mut tokens = Vec::new();

        while let Some(&(pos, c)) = self.chars.peek() {
            match c {
                c if c.is_whitespace() => {
                    self.chars.next();
                }
                '[' | '(' => {
                    self.chars.next();
                    tokens.push((pos, Token::Open(c)));
                }
                ']' | ')' => {
                    self.chars.next();
                    tokens.push((pos, Token::Close(c)));
                }
                ',' => {
                    self.chars.next();
                    tokens.push((pos, Token::Comma));
                }
                '\'' | '"' => {
                    self.chars.next();
                    tokens.push((pos, Token::Str(self.read_string(pos, c)?)));
                }
                '-' | '0'..='9' => tokens.push((pos, self.read_number(pos)?)),
                c if c.is_alphabetic() || c == '_' => {
                    let mut ident = String::new();
                    while let Some(&(_, c)) = self.chars.peek() {
                        if c.is_alphanumeric() || c == '_' {
                            ident.push(c);
                            self.chars.next();
                        } else {
                            break;
                        }
                    }
                    tokens.push((pos, Token::Ident(ident)));
                }
                other => {
                    return Err(FilterError::Syntax {
                        position: pos,
                        message: format!("非法字符 '{}'", other),
                    })
                }
            }
        }

        Ok(tokens)
    }

    fn read_string(&mut self, start: usize, quote: char) -> FilterResult<String> {
        let mut out = String::new();
        while let Some((_, c)) = self.chars.next() {
            match c {
                '\\' => match self.chars.next() {
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, 't')) => out.push('\t'),
                    Some((_, escaped)) => out.push(escaped),
                    None => break,
                },
                c if c == quote => return Ok(out),
                c => out.push(c),
            }
        }
        Err(FilterError::Syntax {
            position: start,
            message: "字符串未闭合".to_string(),
        })
    }

    fn read_number(&mut self, start: usize) -> FilterResult<Token> {
        let mut text = String::new();
        if let Some(&(_, '-')) = self.chars.peek() {
            text.push('-');
            self.chars.next();
        }
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_ascii_digit() || c == '.' {
                text.push(c);
                self.chars.next();
            } else {
                break;
            }
        }

        let invalid = || FilterError::Syntax {
            position: start,
            message: format!("无效数字 '{}'", text),
        };
        // 白名单字段均为整数或文本，不接受小数
        text.parse::<i64>().map(Token::Int).map_err(|_| invalid())
    }
}

// ==========================================
// 字面量解析
// ==========================================
struct LiteralParser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
}

impl LiteralParser {
    fn next(&mut self) -> Option<(usize, Token)> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn end_position(&self) -> usize {
        self.tokens.last().map(|(p, _)| *p + 1).unwrap_or(0)
    }

    fn parse_literal(&mut self, depth: usize) -> FilterResult<Literal> {
        if depth > MAX_DEPTH {
            return Err(too_deep());
        }
        let end = self.end_position();
        let (position, token) = self.next().ok_or(FilterError::Syntax {
            position: end,
            message: "表达式意外结束".to_string(),
        })?;

        match token {
            Token::Str(s) => Ok(Literal::Text(s)),
            Token::Int(i) => Ok(Literal::Int(i)),
            Token::Ident(ident) => match ident.as_str() {
                "False" | "false" | "None" | "null" => Ok(Literal::Null),
                "True" | "true" => Ok(Literal::Int(1)),
                _ => Err(FilterError::Syntax {
                    position,
                    message: format!("不允许的标识符 '{}'", ident),
                }),
            },
            Token::Open(open) => self.parse_list(position, open, depth),
            Token::Close(_) | Token::Comma => Err(FilterError::Syntax {
                position,
                message: "此处需要一个值".to_string(),
            }),
        }
    }

    fn parse_list(&mut self, start: usize, open: char, depth: usize) -> FilterResult<Literal> {
        let close = if open == '[' { ']' } else { ')' };
        let mut items = Vec::new();

        loop {
            match self.peek() {
                Some(Token::Close(c)) if *c == close => {
                    self.next();
                    return Ok(Literal::List(items));
                }
                Some(_) => {
                    items.push(self.parse_literal(depth + 1)?);
                    match self.next() {
                        Some((_, Token::Comma)) => {}
                        Some((_, Token::Close(c))) if c == close => {
                            return Ok(Literal::List(items));
                        }
                        Some((position, _)) => {
                            return Err(FilterError::Syntax {
                                position,
                                message: format!("此处需要 ',' 或 '{}'", close),
                            })
                        }
                        None => break,
                    }
                }
                None => break,
            }
        }

        Err(FilterError::Syntax {
            position: start,
            message: format!("括号 '{}' 未闭合", open),
        })
    }
}

// ==========================================
// 前缀表达式 → 语法树
// ==========================================
enum Item {
    And,
    Or,
    Not,
    Term(Condition),
}

fn to_item(literal: Literal) -> FilterResult<Item> {
    match literal {
        Literal::Text(op) if op == "&" => Ok(Item::And),
        Literal::Text(op) if op == "|" => Ok(Item::Or),
        Literal::Text(op) if op == "!" => Ok(Item::Not),
        Literal::List(parts) if parts.len() == 3 => {
            let [field, operator, value]: [Literal; 3] = parts.try_into().map_err(|p| {
                FilterError::MalformedTerm(format!("条件必须为三元组: {:?}", p))
            })?;

            let field = match field {
                Literal::Text(name) => {
                    PickingField::from_name(&name).ok_or(FilterError::UnknownField(name))?
                }
                other => {
                    return Err(FilterError::MalformedTerm(format!(
                        "字段名必须为文本: {:?}",
                        other
                    )))
                }
            };
            let operator = match operator {
                Literal::Text(op) => {
                    Operator::from_token(&op).ok_or(FilterError::UnsupportedOperator(op))?
                }
                other => {
                    return Err(FilterError::MalformedTerm(format!(
                        "运算符必须为文本: {:?}",
                        other
                    )))
                }
            };

            Ok(Item::Term(Condition::new(field, operator, value)?))
        }
        other => Err(FilterError::MalformedTerm(format!("{:?}", other))),
    }
}

fn build_expr(items: &mut std::vec::IntoIter<Item>, depth: usize) -> FilterResult<DomainExpr> {
    let missing = || FilterError::MalformedTerm("逻辑运算符缺少操作数".to_string());
    if depth > MAX_DEPTH {
        return Err(too_deep());
    }

    match items.next().ok_or_else(missing)? {
        Item::Term(cond) => Ok(DomainExpr::Leaf(cond)),
        Item::Not => Ok(DomainExpr::Not(Box::new(build_expr(items, depth + 1)?))),
        Item::And => {
            let left = build_expr(items, depth + 1)?;
            let right = build_expr(items, depth + 1)?;
            Ok(DomainExpr::And(Box::new(left), Box::new(right)))
        }
        Item::Or => {
            let left = build_expr(items, depth + 1)?;
            let right = build_expr(items, depth + 1)?;
            Ok(DomainExpr::Or(Box::new(left), Box::new(right)))
        }
    }
}

/// 解析 domain 文本为语法树
///
/// # 规则
/// - 顶层必须是列表；空文本或空列表匹配所有记录
/// - '&' '|' 为二元前缀运算符，'!' 为一元前缀运算符
/// - 顶层相邻表达式之间为隐式 AND
/// - 嵌套深度不超过 MAX_DEPTH，项数不超过 MAX_TERMS
pub fn parse_domain(src: &str) -> FilterResult<DomainExpr> {
    if src.trim().is_empty() {
        return Ok(DomainExpr::All);
    }

    let tokens = Lexer::new(src).tokenize()?;
    let mut parser = LiteralParser { tokens, pos: 0 };
    let root = parser.parse_literal(0)?;

    if let Some((position, _)) = parser.next() {
        return Err(FilterError::Syntax {
            position,
            message: "表达式结尾存在多余内容".to_string(),
        });
    }

    let elements = match root {
        Literal::List(elements) => elements,
        other => {
            return Err(FilterError::MalformedTerm(format!(
                "过滤器顶层必须为列表: {:?}",
                other
            )))
        }
    };

    // 顶层隐式 AND 会形成一条左深链
    if elements.len() > MAX_TERMS {
        return Err(FilterError::MalformedTerm(format!(
            "过滤器项数 {} 超过上限 {}",
            elements.len(),
            MAX_TERMS
        )));
    }

    let items = elements
        .into_iter()
        .map(to_item)
        .collect::<FilterResult<Vec<_>>>()?;

    let mut iter = items.into_iter();
    let mut expr = DomainExpr::All;
    while iter.len() > 0 {
        expr = DomainExpr::and(expr, build_expr(&mut iter, 0)?);
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_domain_matches_all() {
        assert_eq!(parse_domain("").unwrap(), DomainExpr::All);
        assert_eq!(parse_domain("[]").unwrap(), DomainExpr::All);
    }

    #[test]
    fn test_implicit_and_of_terms() {
        let expr = parse_domain("[('priority', '>', 0), ('origin', '!=', False)]").unwrap();
        match expr {
            DomainExpr::And(l, r) => {
                assert!(matches!(*l, DomainExpr::Leaf(ref c) if c.operator == Operator::Gt));
                assert!(matches!(*r, DomainExpr::Leaf(ref c) if c.value == Literal::Null));
            }
            other => panic!("unexpected expr: {:?}", other),
        }
    }

    #[test]
    fn test_prefix_or_and_not() {
        let expr =
            parse_domain(r#"["|", ["state", "=", "assigned"], "!", ["partner_id", "in", [1, 2]]]"#)
                .unwrap();
        match expr {
            DomainExpr::Or(_, r) => assert!(matches!(*r, DomainExpr::Not(_))),
            other => panic!("unexpected expr: {:?}", other),
        }
    }

    #[test]
    fn test_scalar_in_is_wrapped() {
        let expr = parse_domain("[('partner_id', 'in', 7)]").unwrap();
        match expr {
            DomainExpr::Leaf(c) => assert_eq!(c.value, Literal::List(vec![Literal::Int(7)])),
            other => panic!("unexpected expr: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_operator() {
        let err = parse_domain("[('name', 'child_of', 'x')]").unwrap_err();
        assert_eq!(err, FilterError::UnsupportedOperator("child_of".to_string()));
    }

    #[test]
    fn test_rejects_unknown_field() {
        let err = parse_domain("[('move_ids.product_id', '=', 1)]").unwrap_err();
        assert!(matches!(err, FilterError::UnknownField(_)));
    }

    #[test]
    fn test_rejects_code() {
        let err = parse_domain("[('name', '=', __import__('os'))]").unwrap_err();
        assert!(matches!(err, FilterError::Syntax { .. }));
    }

    #[test]
    fn test_rejects_dangling_operator() {
        let err = parse_domain("['|', ('priority', '=', 1)]").unwrap_err();
        assert!(matches!(err, FilterError::MalformedTerm(_)));
    }

    #[test]
    fn test_rejects_type_mismatch() {
        let err = parse_domain("[('priority', '=', 'high')]").unwrap_err();
        assert!(matches!(err, FilterError::InvalidValue { .. }));
    }

    #[test]
    fn test_rejects_decimal_literal() {
        let err = parse_domain("[('priority', '>', 1.5)]").unwrap_err();
        assert!(matches!(err, FilterError::Syntax { .. }));
    }

    #[test]
    fn test_long_not_chain_is_rejected() {
        let src = format!("[{}('priority', '=', 1)]", "'!', ".repeat(200_000));
        let err = parse_domain(&src).unwrap_err();
        assert!(matches!(err, FilterError::MalformedTerm(_)));
    }

    #[test]
    fn test_deeply_nested_list_is_rejected() {
        let src = format!("{}{}", "[".repeat(200_000), "]".repeat(200_000));
        let err = parse_domain(&src).unwrap_err();
        assert!(matches!(err, FilterError::MalformedTerm(_)));
    }

    #[test]
    fn test_too_many_top_level_terms_is_rejected() {
        let src = format!("[{}]", "('priority', '=', 1), ".repeat(MAX_TERMS + 1));
        let err = parse_domain(&src).unwrap_err();
        assert!(matches!(err, FilterError::MalformedTerm(_)));
    }

    #[test]
    fn test_nesting_within_limit_is_accepted() {
        let src = format!("[{}('priority', '=', 1)]", "'!', ".repeat(MAX_DEPTH));
        assert!(parse_domain(&src).is_ok());
    }

    #[test]
    fn test_unclosed_string() {
        let err = parse_domain("[('name', '=', 'abc)]").unwrap_err();
        assert!(matches!(err, FilterError::Syntax { .. }));
    }
}
