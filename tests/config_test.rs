// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: 验证配置读取与写入在文件数据库上的行为
// ==========================================

mod test_helpers;

use picking_batch::config::{config_keys, BoxConfigReader, ConfigManager};
use test_helpers::{create_test_db, insert_test_config, open_test_connection};

#[tokio::test]
async fn test_config_manager_creation() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");

    let config_manager = ConfigManager::new(&db_path);
    assert!(
        config_manager.is_ok(),
        "ConfigManager should be created successfully"
    );
}

#[tokio::test]
async fn test_reads_values_written_by_other_connection() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config = ConfigManager::new(&db_path).unwrap();

    assert_eq!(config.get_default_orders_per_box().await.unwrap(), 6);

    let conn = open_test_connection(&db_path).expect("Failed to open db");
    insert_test_config(&conn, config_keys::PICKING_BOX_NBR_ORDER, "4").unwrap();
    insert_test_config(&conn, config_keys::DEST_LOCATION_TO_SPLIT_IN_BOX, "Staging").unwrap();

    // 不缓存: 同一实例立即读到新值
    assert_eq!(config.get_default_orders_per_box().await.unwrap(), 4);
    assert_eq!(config.get_staging_location_name().await.unwrap(), "Staging");
}

#[tokio::test]
async fn test_non_positive_orders_per_box_falls_back() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config = ConfigManager::new(&db_path).unwrap();

    config
        .set_global_config(config_keys::PICKING_BOX_NBR_ORDER, "0")
        .unwrap();
    assert_eq!(config.get_default_orders_per_box().await.unwrap(), 6);

    config
        .set_global_config(config_keys::PICKING_BOX_NBR_ORDER, " 3 ")
        .unwrap();
    assert_eq!(config.get_default_orders_per_box().await.unwrap(), 3);
}

#[test]
fn test_global_value_round_trip() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config = ConfigManager::new(&db_path).unwrap();

    assert_eq!(
        config
            .get_global_config_value(config_keys::DEST_LOCATION_TO_SPLIT_IN_BOX)
            .unwrap(),
        None
    );

    config
        .set_global_config(config_keys::DEST_LOCATION_TO_SPLIT_IN_BOX, "Dock")
        .unwrap();

    let reopened = ConfigManager::new(&db_path).unwrap();
    assert_eq!(
        reopened
            .get_global_config_value(config_keys::DEST_LOCATION_TO_SPLIT_IN_BOX)
            .unwrap()
            .as_deref(),
        Some("Dock")
    );
}
