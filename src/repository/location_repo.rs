// ==========================================
// 拣货批次系统 - 库位数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::location::Location;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// LocationRepository - 库位仓储
// ==========================================
pub struct LocationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl LocationRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建库位
    pub fn create(&self, name: &str) -> RepositoryResult<Location> {
        let conn = self.get_conn()?;
        conn.execute("INSERT INTO stock_location (name) VALUES (?1)", params![name])?;
        Ok(Location {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    /// 按主键查询
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Location>> {
        let conn = self.get_conn()?;
        Self::find_by_id_tx(&conn, id)
    }

    /// 在调用方事务内按主键查询
    pub fn find_by_id_tx(conn: &Connection, id: i64) -> RepositoryResult<Option<Location>> {
        let location = conn
            .query_row(
                "SELECT id, name FROM stock_location WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Location {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(location)
    }
}
