// ==========================================
// 拣货批次系统 - 作业明细行数据仓储
// ==========================================
// 对齐: stock_move_line 表
// 红线: Repository 不含业务逻辑
// 说明: *_tx 关联函数接收调用方事务内的连接，
//       用于把校验与写入放进同一个事务（见 with_transaction）
// ==========================================

use crate::domain::batch::PickingBatch;
use crate::domain::picking::{MoveLine, MoveLineValues, NewMoveLine};
use crate::domain::types::BatchState;
use crate::repository::batch_repo::BatchRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::sql_utils::{build_in_clause, id_params, text_params};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const LINE_COLUMNS: &str = "ml.id, ml.picking_id, ml.origin, ml.location_dest_id, ml.quantity";

fn map_line(row: &Row) -> rusqlite::Result<MoveLine> {
    Ok(MoveLine {
        id: row.get(0)?,
        picking_id: row.get(1)?,
        origin: row.get(2)?,
        location_dest_id: row.get(3)?,
        quantity: row.get(4)?,
    })
}

// ==========================================
// MoveLineContext - 明细行上下文 (读模型)
// ==========================================
// 装箱传播判定所需的关联数据
#[derive(Debug, Clone, PartialEq)]
pub struct MoveLineContext {
    pub line: MoveLine,
    pub current_location_name: String,
    pub batch: Option<PickingBatch>,
    /// 批次来源规则的每箱订单数（批次无来源规则时为 None）
    pub rule_orders_per_box: Option<i64>,
}

// ==========================================
// MoveLineRepository - 作业明细行仓储
// ==========================================
pub struct MoveLineRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MoveLineRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 在单个事务内执行闭包
    ///
    /// 闭包返回 Err 时事务回滚；闭包内只能使用 *_tx 函数（连接锁已被持有）
    pub fn with_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Connection) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction().map_err(RepositoryError::from)?;
        let out = f(&tx)?;
        tx.commit().map_err(RepositoryError::from)?;
        Ok(out)
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 创建明细行
    pub fn create(&self, line: &NewMoveLine) -> RepositoryResult<MoveLine> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO stock_move_line (picking_id, origin, location_dest_id, quantity)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                line.picking_id,
                line.origin,
                line.location_dest_id,
                line.quantity,
            ],
        )?;
        Ok(MoveLine {
            id: conn.last_insert_rowid(),
            picking_id: line.picking_id,
            origin: line.origin.clone(),
            location_dest_id: line.location_dest_id,
            quantity: line.quantity,
        })
    }

    /// 批量写入（单事务）
    pub fn write(&self, ids: &[i64], values: &MoveLineValues) -> RepositoryResult<usize> {
        self.with_transaction(|conn| Self::write_tx(conn, ids, values))
    }

    /// 在调用方事务内批量写入
    ///
    /// # 返回
    /// - 受影响行数
    pub fn write_tx(conn: &Connection, ids: &[i64], values: &MoveLineValues) -> RepositoryResult<usize> {
        if ids.is_empty() || values.is_empty() {
            return Ok(0);
        }

        let mut sets = Vec::new();
        let mut bind: Vec<Value> = Vec::new();
        if let Some(location_dest_id) = values.location_dest_id {
            sets.push("location_dest_id = ?");
            bind.push(Value::Integer(location_dest_id));
        }
        if let Some(quantity) = values.quantity {
            if quantity < 0.0 {
                return Err(RepositoryError::FieldValueError {
                    field: "quantity".to_string(),
                    message: format!("数量不能为负: {}", quantity),
                });
            }
            sets.push("quantity = ?");
            bind.push(Value::Real(quantity));
        }

        let sql = format!(
            "UPDATE stock_move_line SET {} WHERE {}",
            sets.join(", "),
            build_in_clause("id", ids.len())
        );
        bind.extend(id_params(ids));

        let rows = conn.execute(&sql, params_from_iter(bind.iter()))?;
        Ok(rows)
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按主键查询
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<MoveLine>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM stock_move_line ml WHERE ml.id = ?1", LINE_COLUMNS);
        let line = conn.query_row(&sql, params![id], map_line).optional()?;
        Ok(line)
    }

    /// 按 id 列表查询（id 升序）
    pub fn find_by_ids(&self, ids: &[i64]) -> RepositoryResult<Vec<MoveLine>> {
        let sql = format!(
            "SELECT {} FROM stock_move_line ml WHERE {} ORDER BY ml.id ASC",
            LINE_COLUMNS,
            build_in_clause("ml.id", ids.len())
        );
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let lines = stmt
            .query_map(params_from_iter(id_params(ids).iter()), map_line)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(lines)
    }

    /// 查询批次下全部明细行（id 升序）
    pub fn find_by_batch_id(&self, batch_id: i64) -> RepositoryResult<Vec<MoveLine>> {
        let sql = format!(
            "SELECT {} FROM stock_move_line ml \
             JOIN stock_picking p ON p.id = ml.picking_id \
             WHERE p.batch_id = ?1 ORDER BY ml.id ASC",
            LINE_COLUMNS
        );
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let lines = stmt
            .query_map(params![batch_id], map_line)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(lines)
    }

    /// 加载明细行上下文（当前库位名、批次、来源规则每箱订单数）
    pub fn load_context_tx(
        conn: &Connection,
        line_id: i64,
    ) -> RepositoryResult<Option<MoveLineContext>> {
        let sql = format!(
            "SELECT {}, loc.name, p.batch_id, r.nbr_order \
             FROM stock_move_line ml \
             JOIN stock_location loc ON loc.id = ml.location_dest_id \
             JOIN stock_picking p ON p.id = ml.picking_id \
             LEFT JOIN stock_picking_batch b ON b.id = p.batch_id \
             LEFT JOIN stock_picking_batch_rule r ON r.id = b.batch_rule_id \
             WHERE ml.id = ?1",
            LINE_COLUMNS
        );

        let row = conn
            .query_row(&sql, params![line_id], |row| {
                Ok((
                    map_line(row)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, Option<i64>>(6)?,
                    row.get::<_, Option<i64>>(7)?,
                ))
            })
            .optional()?;

        let (line, current_location_name, batch_id, rule_orders_per_box) = match row {
            Some(r) => r,
            None => return Ok(None),
        };

        let batch = match batch_id {
            Some(id) => BatchRepository::find_by_id_tx(conn, id)?,
            None => None,
        };

        Ok(Some(MoveLineContext {
            line,
            current_location_name,
            batch,
            rule_orders_per_box,
        }))
    }

    /// 活动批次（draft / in_progress）中是否已有明细行指向该库位
    ///
    /// # 参数
    /// - `location_id`: 目标库位（箱位）
    /// - `exclude_line_id`: 排除的明细行（正在写入的行本身）
    pub fn exists_open_batch_line_at_location_tx(
        conn: &Connection,
        location_id: i64,
        exclude_line_id: i64,
    ) -> RepositoryResult<bool> {
        let [draft, in_progress] = BatchState::OPEN;
        let found = conn
            .query_row(
                r#"
                SELECT 1
                FROM stock_move_line ml
                JOIN stock_picking p ON p.id = ml.picking_id
                JOIN stock_picking_batch b ON b.id = p.batch_id
                WHERE ml.location_dest_id = ?1
                  AND b.state IN (?2, ?3)
                  AND ml.id != ?4
                LIMIT 1
                "#,
                params![
                    location_id,
                    draft.to_db_str(),
                    in_progress.to_db_str(),
                    exclude_line_id
                ],
                |_row| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        Ok(found)
    }

    /// 查询批次中位于指定库位名下的明细行（id 升序）
    ///
    /// # 参数
    /// - `origins`: 非 None 时只返回来源单号在列表内的行
    pub fn find_batch_lines_at_location_name_tx(
        conn: &Connection,
        batch_id: i64,
        location_name: &str,
        origins: Option<&[String]>,
    ) -> RepositoryResult<Vec<MoveLine>> {
        let origin_clause = match origins {
            Some(list) => format!(" AND {}", build_in_clause("ml.origin", list.len())),
            None => String::new(),
        };
        let sql = format!(
            "SELECT {} FROM stock_move_line ml \
             JOIN stock_picking p ON p.id = ml.picking_id \
             JOIN stock_location loc ON loc.id = ml.location_dest_id \
             WHERE p.batch_id = ? AND loc.name = ?{} \
             ORDER BY ml.id ASC",
            LINE_COLUMNS, origin_clause
        );

        let mut bind = vec![
            Value::Integer(batch_id),
            Value::Text(location_name.to_string()),
        ];
        if let Some(list) = origins {
            bind.extend(text_params(list));
        }

        let mut stmt = conn.prepare(&sql)?;
        let lines = stmt
            .query_map(params_from_iter(bind.iter()), map_line)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(lines)
    }
}
