// ==========================================
// 拣货批次系统 - 应用状态
// ==========================================
// 职责: 管理共享连接与 API 实例
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::api::{BatchApi, MoveLineApi};
use crate::config::ConfigManager;
use crate::db;
use crate::engine::{BatchCreationEngine, BoxPropagationEngine, Notifier, TracingNotifier};
use crate::repository::{
    ActionLogRepository, BatchRepository, BatchRuleRepository, FilterRepository,
    LocationRepository, MoveLineRepository, PickingRepository,
};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "PICKING_BATCH_DB_PATH";

/// 应用状态
///
/// 所有仓储共享同一个连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    pub conn: Arc<Mutex<Connection>>,

    pub config_manager: Arc<ConfigManager>,

    /// 批次规则API
    pub batch_api: Arc<BatchApi>,

    /// 作业明细行API
    pub move_line_api: Arc<MoveLineApi<ConfigManager>>,

    pub picking_repo: Arc<PickingRepository>,
    pub move_line_repo: Arc<MoveLineRepository>,
    pub location_repo: Arc<LocationRepository>,
    pub filter_repo: Arc<FilterRepository>,
    pub batch_rule_repo: Arc<BatchRuleRepository>,
    pub batch_repo: Arc<BatchRepository>,

    /// 操作日志仓储（用于审计追踪）
    pub action_log_repo: Arc<ActionLogRepository>,
}

impl AppState {
    /// 打开数据库并组装应用状态
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 说明
    /// 打开时执行建表脚本（幂等）
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        db::init_schema(&conn).map_err(|e| format!("数据库初始化失败: {}", e))?;

        Self::from_connection(db_path, Arc::new(Mutex::new(conn)), Arc::new(TracingNotifier))
    }

    /// 使用已初始化的连接组装应用状态
    pub fn from_connection(
        db_path: String,
        conn: Arc<Mutex<Connection>>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, String> {
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        let picking_repo = Arc::new(PickingRepository::new(conn.clone()));
        let move_line_repo = Arc::new(MoveLineRepository::new(conn.clone()));
        let location_repo = Arc::new(LocationRepository::new(conn.clone()));
        let filter_repo = Arc::new(FilterRepository::new(conn.clone()));
        let batch_rule_repo = Arc::new(BatchRuleRepository::new(conn.clone()));
        let batch_repo = Arc::new(BatchRepository::new(conn.clone()));
        let action_log_repo = Arc::new(ActionLogRepository::new(conn.clone()));

        let batch_engine = Arc::new(BatchCreationEngine::new(
            picking_repo.clone(),
            batch_repo.clone(),
            filter_repo.clone(),
        ));
        let box_engine = Arc::new(BoxPropagationEngine::new(
            config_manager.clone(),
            move_line_repo.clone(),
        ));

        let batch_api = Arc::new(BatchApi::new(batch_rule_repo.clone(), batch_engine));
        let move_line_api = Arc::new(MoveLineApi::new(box_engine, notifier));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            conn,
            config_manager,
            batch_api,
            move_line_api,
            picking_repo,
            move_line_repo,
            location_repo,
            filter_repo,
            batch_rule_repo,
            batch_repo,
            action_log_repo,
        })
    }
}

/// 获取默认数据库路径
///
/// # 顺序
/// 1. 环境变量 PICKING_BATCH_DB_PATH
/// 2. 用户数据目录下 picking-batch/picking_batch.db
/// 3. 当前目录 ./picking_batch.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./picking_batch.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("picking-batch");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("picking_batch.db");
        }
    }

    path.to_string_lossy().to_string()
}
