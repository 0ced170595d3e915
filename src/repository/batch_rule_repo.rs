// ==========================================
// 拣货批次系统 - 批次规则数据仓储
// ==========================================
// 对齐: stock_picking_batch_rule 表
// 字段映射: nbr_box → boxes_per_batch, nbr_order → orders_per_box, sequence → priority
// ==========================================

use crate::domain::batch::{BatchRule, NewBatchRule};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_utils::{build_in_clause, id_params};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const RULE_COLUMNS: &str = "id, name, filter_id, nbr_box, nbr_order, picking_type_id, sequence";

fn map_rule(row: &Row) -> rusqlite::Result<BatchRule> {
    Ok(BatchRule {
        id: row.get(0)?,
        name: row.get(1)?,
        filter_id: row.get(2)?,
        boxes_per_batch: row.get(3)?,
        orders_per_box: row.get(4)?,
        picking_type_id: row.get(5)?,
        priority: row.get(6)?,
    })
}

// ==========================================
// BatchRuleRepository - 批次规则仓储
// ==========================================
pub struct BatchRuleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BatchRuleRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建规则
    pub fn create(&self, rule: &NewBatchRule) -> RepositoryResult<BatchRule> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO stock_picking_batch_rule (
                name, filter_id, nbr_box, nbr_order, picking_type_id, sequence
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                rule.name,
                rule.filter_id,
                rule.boxes_per_batch,
                rule.orders_per_box,
                rule.picking_type_id,
                rule.priority,
            ],
        )?;

        Ok(BatchRule {
            id: conn.last_insert_rowid(),
            name: rule.name.clone(),
            filter_id: rule.filter_id,
            boxes_per_batch: rule.boxes_per_batch,
            orders_per_box: rule.orders_per_box,
            picking_type_id: rule.picking_type_id,
            priority: rule.priority,
        })
    }

    /// 显式修改规则
    pub fn update(&self, rule: &BatchRule) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE stock_picking_batch_rule
            SET name = ?1, filter_id = ?2, nbr_box = ?3, nbr_order = ?4,
                picking_type_id = ?5, sequence = ?6
            WHERE id = ?7
            "#,
            params![
                rule.name,
                rule.filter_id,
                rule.boxes_per_batch,
                rule.orders_per_box,
                rule.picking_type_id,
                rule.priority,
                rule.id,
            ],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "stock_picking_batch_rule".to_string(),
                id: rule.id.to_string(),
            });
        }
        Ok(())
    }

    /// 按主键查询
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<BatchRule>> {
        let conn = self.get_conn()?;
        Self::find_by_id_tx(&conn, id)
    }

    /// 在调用方事务内按主键查询
    pub fn find_by_id_tx(conn: &Connection, id: i64) -> RepositoryResult<Option<BatchRule>> {
        let sql = format!(
            "SELECT {} FROM stock_picking_batch_rule WHERE id = ?1",
            RULE_COLUMNS
        );
        let rule = conn.query_row(&sql, params![id], map_rule).optional()?;
        Ok(rule)
    }

    /// 按 id 列表查询（按 sequence, id 排序）
    pub fn find_by_ids(&self, ids: &[i64]) -> RepositoryResult<Vec<BatchRule>> {
        let sql = format!(
            "SELECT {} FROM stock_picking_batch_rule WHERE {} ORDER BY sequence ASC, id ASC",
            RULE_COLUMNS,
            build_in_clause("id", ids.len())
        );
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rules = stmt
            .query_map(params_from_iter(id_params(ids).iter()), map_rule)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rules)
    }

    /// 查询全部规则（按 sequence, id 排序）
    pub fn find_all(&self) -> RepositoryResult<Vec<BatchRule>> {
        let sql = format!(
            "SELECT {} FROM stock_picking_batch_rule ORDER BY sequence ASC, id ASC",
            RULE_COLUMNS
        );
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rules = stmt
            .query_map([], map_rule)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rules)
    }

    /// 查询作业类型下的规则
    pub fn find_by_picking_type(&self, picking_type_id: i64) -> RepositoryResult<Vec<BatchRule>> {
        let sql = format!(
            "SELECT {} FROM stock_picking_batch_rule WHERE picking_type_id = ?1 \
             ORDER BY sequence ASC, id ASC",
            RULE_COLUMNS
        );
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rules = stmt
            .query_map(params![picking_type_id], map_rule)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rules)
    }
}
