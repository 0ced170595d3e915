use super::ActionLogRepository;
use crate::domain::action_log::{ActionLog, ActionType, BoxPropagationPayload};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

fn setup_test_db() -> Arc<Mutex<Connection>> {
    let conn = Connection::open_in_memory().unwrap();
    crate::db::init_schema(&conn).unwrap();
    Arc::new(Mutex::new(conn))
}

#[test]
fn test_insert_and_find_by_id() {
    let repo = ActionLogRepository::new(setup_test_db());

    let log = ActionLog::new(ActionType::BatchCreation, None, "tester").with_detail("rule=1");
    let id = repo.insert(&log).unwrap();
    assert_eq!(id, log.action_id);

    let found = repo.find_by_id(&id).unwrap().unwrap();
    assert_eq!(found.action_type, "BatchCreation");
    assert_eq!(found.actor, "tester");
    assert_eq!(found.detail.as_deref(), Some("rule=1"));
    assert!(found.batch_id.is_none());
}

#[test]
fn test_find_by_id_missing() {
    let repo = ActionLogRepository::new(setup_test_db());
    assert!(repo.find_by_id("nope").unwrap().is_none());
}

#[test]
fn test_payload_round_trip() {
    let repo = ActionLogRepository::new(setup_test_db());

    let payload = BoxPropagationPayload {
        batch_id: 7,
        batch_name: "BATCH/00007".to_string(),
        location_dest_id: 42,
        origins: vec!["SO1".to_string(), "SO2".to_string()],
        line_ids: vec![3, 4],
    };
    let log = ActionLog::new(ActionType::BoxPropagation, Some(7), "system").with_payload(&payload);
    repo.insert(&log).unwrap();

    let logs = repo.find_by_batch_id(7).unwrap();
    assert_eq!(logs.len(), 1);
    let restored: BoxPropagationPayload =
        serde_json::from_value(logs[0].payload_json.clone().unwrap()).unwrap();
    assert_eq!(restored, payload);
}

#[test]
fn test_find_by_action_type_with_limit() {
    let repo = ActionLogRepository::new(setup_test_db());

    for i in 0..3 {
        repo.insert(&ActionLog::new(ActionType::BatchCreation, Some(i), "system"))
            .unwrap();
    }
    repo.insert(&ActionLog::new(ActionType::BoxPropagation, Some(1), "system"))
        .unwrap();

    let creations = repo.find_by_action_type(ActionType::BatchCreation, 10).unwrap();
    assert_eq!(creations.len(), 3);

    let limited = repo.find_by_action_type(ActionType::BatchCreation, 2).unwrap();
    assert_eq!(limited.len(), 2);

    let propagations = repo.find_by_action_type(ActionType::BoxPropagation, 10).unwrap();
    assert_eq!(propagations.len(), 1);
}
