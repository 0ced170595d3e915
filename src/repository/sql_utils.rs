// ==========================================
// 拣货批次系统 - 仓储层 SQL 工具
// ==========================================

use rusqlite::types::Value;

/// 构建 IN 子句的 SQL 片段
///
/// # 示例
/// ```
/// use picking_batch::repository::sql_utils::build_in_clause;
///
/// assert_eq!(build_in_clause("ml.origin", 2), "ml.origin IN (?, ?)");
///
/// // 空列表返回永假条件
/// assert_eq!(build_in_clause("ml.origin", 0), "1 = 0");
/// ```
pub fn build_in_clause(column_name: &str, count: usize) -> String {
    if count == 0 {
        // 空列表时返回永假条件，确保 SQL 语法正确
        return "1 = 0".to_string();
    }

    let placeholders = vec!["?"; count].join(", ");
    format!("{} IN ({})", column_name, placeholders)
}

/// 将 id 列表转换为绑定参数
pub fn id_params(ids: &[i64]) -> Vec<Value> {
    ids.iter().map(|id| Value::Integer(*id)).collect()
}

/// 将文本列表转换为绑定参数
pub fn text_params(values: &[String]) -> Vec<Value> {
    values.iter().map(|v| Value::Text(v.clone())).collect()
}
