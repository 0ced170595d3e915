// ==========================================
// 拣货批次系统 - 拣货批次数据仓储
// ==========================================
// 对齐: stock_picking_batch 表
// 红线: 批次创建与成员分配在同一事务内完成，不允许部分成员
// ==========================================

use crate::domain::batch::PickingBatch;
use crate::domain::types::BatchState;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_utils::{build_in_clause, id_params};
use chrono::{NaiveDateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const BATCH_COLUMNS: &str = "id, name, company_id, batch_rule_id, state, created_at";

fn map_batch(row: &Row) -> rusqlite::Result<PickingBatch> {
    Ok(PickingBatch {
        id: row.get(0)?,
        name: row.get(1)?,
        company_id: row.get(2)?,
        batch_rule_id: row.get(3)?,
        state: BatchState::from_str(&row.get::<_, String>(4)?),
        created_at: row.get::<_, NaiveDateTime>(5)?,
    })
}

// ==========================================
// BatchRepository - 拣货批次仓储
// ==========================================
pub struct BatchRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BatchRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建批次并分配成员（单事务）
    ///
    /// # 参数
    /// - `company_id`: 所属公司
    /// - `batch_rule_id`: 来源规则
    /// - `picking_ids`: 成员拣货单
    /// - `on_created`: 成员分配后、提交前在同一事务内执行（如写操作日志）
    ///
    /// # 返回
    /// - Ok(PickingBatch): 新建的草稿批次
    /// - Err(PartialAssignment): 有拣货单已被其他批次占用，整个事务回滚
    /// - Err(_): on_created 失败时整个事务回滚
    pub fn create_with_pickings<F>(
        &self,
        company_id: i64,
        batch_rule_id: Option<i64>,
        picking_ids: &[i64],
        on_created: F,
    ) -> RepositoryResult<PickingBatch>
    where
        F: FnOnce(&Connection, &PickingBatch) -> RepositoryResult<()>,
    {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let created_at = Utc::now().naive_utc();
        tx.execute(
            r#"
            INSERT INTO stock_picking_batch (company_id, batch_rule_id, state, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                company_id,
                batch_rule_id,
                BatchState::Draft.to_db_str(),
                created_at,
            ],
        )?;
        let id = tx.last_insert_rowid();
        let name = format!("BATCH/{:05}", id);
        tx.execute(
            "UPDATE stock_picking_batch SET name = ?1 WHERE id = ?2",
            params![name, id],
        )?;

        // 批量写入 batch_id；只允许写入未入批次的拣货单
        let sql = format!(
            "UPDATE stock_picking SET batch_id = ? WHERE batch_id IS NULL AND {}",
            build_in_clause("id", picking_ids.len())
        );
        let mut bind = vec![Value::Integer(id)];
        bind.extend(id_params(picking_ids));
        let assigned = tx.execute(&sql, params_from_iter(bind.iter()))?;

        if assigned != picking_ids.len() {
            // tx 未提交，drop 时自动回滚
            return Err(RepositoryError::PartialAssignment {
                batch_id: id,
                expected: picking_ids.len(),
                assigned,
            });
        }

        let batch = PickingBatch {
            id,
            name,
            company_id,
            batch_rule_id,
            state: BatchState::Draft,
            created_at,
        };
        on_created(&tx, &batch)?;

        tx.commit()?;
        Ok(batch)
    }

    /// 按主键查询
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<PickingBatch>> {
        let conn = self.get_conn()?;
        Self::find_by_id_tx(&conn, id)
    }

    /// 在调用方事务内按主键查询
    pub fn find_by_id_tx(conn: &Connection, id: i64) -> RepositoryResult<Option<PickingBatch>> {
        let sql = format!("SELECT {} FROM stock_picking_batch WHERE id = ?1", BATCH_COLUMNS);
        let batch = conn.query_row(&sql, params![id], map_batch).optional()?;
        Ok(batch)
    }

    /// 查询规则创建的批次
    pub fn find_by_rule_id(&self, batch_rule_id: i64) -> RepositoryResult<Vec<PickingBatch>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM stock_picking_batch WHERE batch_rule_id = ?1 ORDER BY id ASC",
            BATCH_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let batches = stmt
            .query_map(params![batch_rule_id], map_batch)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(batches)
    }

    /// 修改批次状态
    pub fn update_state(&self, id: i64, state: BatchState) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE stock_picking_batch SET state = ?1 WHERE id = ?2",
            params![state.to_db_str(), id],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "stock_picking_batch".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// 批次成员数量
    pub fn count_members(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM stock_picking WHERE batch_id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
