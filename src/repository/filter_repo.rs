// ==========================================
// 拣货批次系统 - 已保存过滤器仓储
// ==========================================
// 对齐: ir_filters 表
// 红线: 只存取 domain 文本，不做解析
// ==========================================

use crate::domain::batch::StoredFilter;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

pub struct FilterRepository {
    conn: Arc<Mutex<Connection>>,
}

impl FilterRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 保存过滤器
    pub fn create(&self, name: &str, model: &str, domain: &str) -> RepositoryResult<StoredFilter> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO ir_filters (name, model, domain) VALUES (?1, ?2, ?3)",
            params![name, model, domain],
        )?;
        Ok(StoredFilter {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            model: model.to_string(),
            domain: domain.to_string(),
        })
    }

    /// 修改过滤器 domain
    pub fn update_domain(&self, id: i64, domain: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE ir_filters SET domain = ?1 WHERE id = ?2",
            params![domain, id],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ir_filters".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// 按主键查询
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<StoredFilter>> {
        let conn = self.get_conn()?;
        let filter = conn
            .query_row(
                "SELECT id, name, model, domain FROM ir_filters WHERE id = ?1",
                params![id],
                |row| {
                    Ok(StoredFilter {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        model: row.get(2)?,
                        domain: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(filter)
    }
}
