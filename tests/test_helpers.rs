// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================

#![allow(dead_code)]

use picking_batch::app::AppState;
use picking_batch::domain::{
    BatchRule, Location, MoveLine, NewBatchRule, NewMoveLine, NewPicking, Picking, PickingState,
    PICKING_MODEL,
};
use picking_batch::engine::TracingNotifier;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径不是 UTF-8")?
        .to_string();

    let conn = open_test_connection(&db_path)?;
    picking_batch::db::init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试数据库连接（统一 PRAGMA）
pub fn open_test_connection(db_path: &str) -> Result<Connection, Box<dyn Error>> {
    Ok(picking_batch::db::open_sqlite_connection(db_path)?)
}

/// 写入 global 配置
pub fn insert_test_config(conn: &Connection, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    conn.execute(
        r#"
        INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
        ON CONFLICT(scope_id, key) DO UPDATE SET value = excluded.value
        "#,
        params![key, value],
    )?;
    Ok(())
}

// ==========================================
// TestEnv - 完整组装的测试环境
// ==========================================
pub struct TestEnv {
    _temp_file: NamedTempFile,
    pub db_path: String,
    pub state: AppState,
}

impl TestEnv {
    pub fn new() -> Self {
        picking_batch::logging::init_test();
        let (temp_file, db_path) = create_test_db().expect("Failed to create test db");
        let conn = open_test_connection(&db_path).expect("Failed to open db");
        let state = AppState::from_connection(
            db_path.clone(),
            Arc::new(Mutex::new(conn)),
            Arc::new(TracingNotifier),
        )
        .expect("Failed to build AppState");

        Self {
            _temp_file: temp_file,
            db_path,
            state,
        }
    }

    pub fn conn(&self) -> Arc<Mutex<Connection>> {
        self.state.conn.clone()
    }

    /// 创建作业类型，返回 id
    pub fn picking_type(&self, name: &str) -> i64 {
        self.state
            .picking_repo
            .create_picking_type(name)
            .expect("create picking type")
            .id
    }

    /// 创建 n 张拣货单
    pub fn pickings(
        &self,
        picking_type_id: Option<i64>,
        state: PickingState,
        n: usize,
        prefix: &str,
    ) -> Vec<Picking> {
        (0..n)
            .map(|i| {
                self.state
                    .picking_repo
                    .create(&NewPicking {
                        name: format!("{}/{:04}", prefix, i + 1),
                        origin: Some(format!("{}-SO{:04}", prefix, i + 1)),
                        state: Some(state),
                        priority: (i % 2) as i64,
                        picking_type_id,
                        company_id: Some(1),
                        ..Default::default()
                    })
                    .expect("create picking")
            })
            .collect()
    }

    /// 保存作用于拣货单的过滤器，返回 id
    pub fn filter(&self, domain: &str) -> i64 {
        self.state
            .filter_repo
            .create("test filter", PICKING_MODEL, domain)
            .expect("create filter")
            .id
    }

    /// 创建规则
    pub fn rule(
        &self,
        filter_id: i64,
        picking_type_id: Option<i64>,
        boxes_per_batch: i64,
        orders_per_box: i64,
        priority: i64,
    ) -> BatchRule {
        let mut rule = NewBatchRule::new(filter_id, picking_type_id);
        rule.boxes_per_batch = boxes_per_batch;
        rule.orders_per_box = orders_per_box;
        rule.priority = priority;
        self.state.batch_rule_repo.create(&rule).expect("create rule")
    }

    pub fn location(&self, name: &str) -> Location {
        self.state.location_repo.create(name).expect("create location")
    }

    pub fn move_line(&self, picking_id: i64, origin: Option<&str>, location_dest_id: i64) -> MoveLine {
        self.state
            .move_line_repo
            .create(&NewMoveLine {
                picking_id,
                origin: origin.map(|s| s.to_string()),
                location_dest_id,
                quantity: 1.0,
            })
            .expect("create move line")
    }

    pub fn line_location(&self, line_id: i64) -> i64 {
        self.state
            .move_line_repo
            .find_by_id(line_id)
            .expect("find move line")
            .expect("move line exists")
            .location_dest_id
    }
}
