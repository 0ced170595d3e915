// ==========================================
// 拣货批次系统 - 拣货单数据仓储
// ==========================================
// 对齐: stock_picking / stock_picking_type 表
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::picking::{NewPicking, Picking, PickingType};
use crate::domain::types::PickingState;
use crate::filter::FilterDomain;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const PICKING_COLUMNS: &str = "id, name, origin, state, priority, picking_type_id, partner_id, \
     company_id, location_id, location_dest_id, scheduled_date, batch_id";

fn map_picking(row: &Row) -> rusqlite::Result<Picking> {
    Ok(Picking {
        id: row.get(0)?,
        name: row.get(1)?,
        origin: row.get(2)?,
        state: PickingState::from_str(&row.get::<_, String>(3)?),
        priority: row.get(4)?,
        picking_type_id: row.get(5)?,
        partner_id: row.get(6)?,
        company_id: row.get(7)?,
        location_id: row.get(8)?,
        location_dest_id: row.get(9)?,
        scheduled_date: row.get(10)?,
        batch_id: row.get(11)?,
    })
}

// ==========================================
// PickingRepository - 拣货单仓储
// ==========================================
pub struct PickingRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PickingRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 作业类型
    // ==========================================

    pub fn create_picking_type(&self, name: &str) -> RepositoryResult<PickingType> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO stock_picking_type (name) VALUES (?1)",
            params![name],
        )?;
        Ok(PickingType {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    // ==========================================
    // 拣货单
    // ==========================================

    /// 创建拣货单
    pub fn create(&self, picking: &NewPicking) -> RepositoryResult<Picking> {
        let conn = self.get_conn()?;
        let state = picking.state.unwrap_or(PickingState::Draft);
        conn.execute(
            r#"
            INSERT INTO stock_picking (
                name, origin, state, priority, picking_type_id,
                partner_id, company_id, scheduled_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                picking.name,
                picking.origin,
                state.to_db_str(),
                picking.priority,
                picking.picking_type_id,
                picking.partner_id,
                picking.company_id,
                picking.scheduled_date,
            ],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        self.find_by_id(id)?.ok_or(RepositoryError::NotFound {
            entity: "stock_picking".to_string(),
            id: id.to_string(),
        })
    }

    /// 按主键查询
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Picking>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM stock_picking WHERE id = ?1", PICKING_COLUMNS);
        let picking = conn.query_row(&sql, params![id], map_picking).optional()?;
        Ok(picking)
    }

    /// 查询批次成员（按 id 升序）
    pub fn find_by_batch_id(&self, batch_id: i64) -> RepositoryResult<Vec<Picking>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM stock_picking WHERE batch_id = ?1 ORDER BY id ASC",
            PICKING_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let pickings = stmt
            .query_map(params![batch_id], map_picking)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(pickings)
    }

    /// 修改拣货单状态
    pub fn update_state(&self, id: i64, state: PickingState) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "UPDATE stock_picking SET state = ?1 WHERE id = ?2",
            params![state.to_db_str(), id],
        )?;
        Ok(())
    }

    /// 查询可批次化的拣货单
    ///
    /// # 条件
    /// - picking_type_id = 规则目标作业类型（规则未指定时匹配无类型的拣货单）
    /// - state = 'assigned'
    /// - batch_id IS NULL（已入批次的不再参与）
    /// - 满足规则过滤器
    ///
    /// # 返回
    /// - 按 id 升序的稳定顺序
    pub fn search_eligible(
        &self,
        picking_type_id: Option<i64>,
        domain: &FilterDomain,
    ) -> RepositoryResult<Vec<Picking>> {
        let fragment = domain.to_sql();
        let type_clause = match picking_type_id {
            Some(_) => "picking_type_id = ?",
            None => "picking_type_id IS NULL",
        };

        let sql = format!(
            "SELECT {} FROM stock_picking \
             WHERE {} AND state = ? AND batch_id IS NULL AND ({}) \
             ORDER BY id ASC",
            PICKING_COLUMNS, type_clause, fragment.sql
        );

        let mut bind: Vec<Value> = Vec::with_capacity(fragment.params.len() + 2);
        if let Some(type_id) = picking_type_id {
            bind.push(Value::Integer(type_id));
        }
        bind.push(Value::Text(PickingState::Assigned.to_db_str().to_string()));
        bind.extend(fragment.params);

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let pickings = stmt
            .query_map(params_from_iter(bind.iter()), map_picking)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(pickings)
    }
}
