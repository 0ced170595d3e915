// ==========================================
// 装箱库位传播集成测试
// ==========================================
// 职责: 验证同箱订单传播、箱位独占、重入保护与配置实时读取
// ==========================================

mod helpers;
mod test_helpers;

use helpers::mock_config::MockConfig;
use picking_batch::api::{ApiError, MoveLineApi};
use picking_batch::domain::{ActionType, BatchState, BoxPropagationPayload, Location, MoveLine, MoveLineValues, PickingState};
use picking_batch::engine::{BoxPropagationEngine, EngineError, Notifier, OperationContext};
use std::sync::{Arc, Mutex};
use test_helpers::TestEnv;

const ORIGINS: [&str; 8] = ["O1", "O2", "O3", "O1", "O4", "O2", "O5", "O3"];

struct BoxFixture {
    env: TestEnv,
    config: Arc<MockConfig>,
    engine: BoxPropagationEngine<MockConfig>,
    staging: Location,
    box_a: Location,
    batch_id: i64,
    lines: Vec<MoveLine>,
}

/// 一个草稿批次，8 行明细位于暂存区，来源单号 O1..O5
fn setup(rule_orders_per_box: Option<i64>, config: MockConfig) -> BoxFixture {
    let env = TestEnv::new();
    let staging = env.location("Packing Zone");
    let box_a = env.location("Box A");

    let type_id = env.picking_type("Pick");
    let pickings = env.pickings(Some(type_id), PickingState::Assigned, 2, "P");
    let picking_ids: Vec<i64> = pickings.iter().map(|p| p.id).collect();

    let rule_id = rule_orders_per_box.map(|n| {
        let filter_id = env.filter("[]");
        env.rule(filter_id, Some(type_id), 1, n, 5).id
    });
    let batch = env
        .state
        .batch_repo
        .create_with_pickings(1, rule_id, &picking_ids, |_, _| Ok(()))
        .unwrap();

    let lines = ORIGINS
        .iter()
        .enumerate()
        .map(|(i, origin)| env.move_line(picking_ids[i % 2], Some(origin), staging.id))
        .collect();

    let config = Arc::new(config);
    let engine = BoxPropagationEngine::new(config.clone(), env.state.move_line_repo.clone());

    BoxFixture {
        env,
        config,
        engine,
        staging,
        box_a,
        batch_id: batch.id,
        lines,
    }
}

fn ctx() -> OperationContext {
    OperationContext::new("packer", 1)
}

impl BoxFixture {
    fn locations(&self) -> Vec<i64> {
        self.lines
            .iter()
            .map(|l| self.env.line_location(l.id))
            .collect()
    }

    /// 另一个活动批次在指定库位上放一行
    fn occupy(&self, location_id: i64, state: BatchState) -> MoveLine {
        let other = self
            .env
            .pickings(None, PickingState::Assigned, 1, "X")
            .remove(0);
        let batch = self
            .env
            .state
            .batch_repo
            .create_with_pickings(1, None, &[other.id], |_, _| Ok(()))
            .unwrap();
        self.env.state.batch_repo.update_state(batch.id, state).unwrap();
        self.env.move_line(other.id, Some("X1"), location_id)
    }
}

#[tokio::test]
async fn test_propagates_to_selected_origins() {
    let f = setup(Some(3), MockConfig::default());

    let written = f
        .engine
        .write(&ctx(), &[f.lines[0].id], &MoveLineValues::location_dest(f.box_a.id))
        .await
        .unwrap();
    assert_eq!(written, 1);

    // 首次出现顺序: O1, O2, O3, O4, O5 → 选中 O1 + O2, O3
    let expected: Vec<i64> = ORIGINS
        .iter()
        .map(|o| match *o {
            "O1" | "O2" | "O3" => f.box_a.id,
            _ => f.staging.id,
        })
        .collect();
    assert_eq!(f.locations(), expected);
}

#[tokio::test]
async fn test_propagation_writes_action_log() {
    let f = setup(Some(3), MockConfig::default());

    f.engine
        .write(&ctx(), &[f.lines[0].id], &MoveLineValues::location_dest(f.box_a.id))
        .await
        .unwrap();

    let logs: Vec<_> = f
        .env
        .state
        .action_log_repo
        .find_by_batch_id(f.batch_id)
        .unwrap()
        .into_iter()
        .filter(|l| l.action_type == ActionType::BoxPropagation.as_str())
        .collect();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].actor, "packer");

    let payload: BoxPropagationPayload =
        serde_json::from_value(logs[0].payload_json.clone().unwrap()).unwrap();
    assert_eq!(payload.batch_id, f.batch_id);
    assert_eq!(payload.location_dest_id, f.box_a.id);
    assert_eq!(payload.origins, vec!["O1", "O2", "O3"]);
    assert_eq!(payload.line_ids.len(), 6);
}

#[tokio::test]
async fn test_default_orders_per_box_without_rule() {
    let f = setup(None, MockConfig::with_values(2, "Packing Zone"));

    f.engine
        .write(&ctx(), &[f.lines[0].id], &MoveLineValues::location_dest(f.box_a.id))
        .await
        .unwrap();

    let expected: Vec<i64> = ORIGINS
        .iter()
        .map(|o| match *o {
            "O1" | "O2" => f.box_a.id,
            _ => f.staging.id,
        })
        .collect();
    assert_eq!(f.locations(), expected);
}

#[tokio::test]
async fn test_occupied_box_rejects_without_mutation() {
    let f = setup(Some(3), MockConfig::default());
    f.occupy(f.box_a.id, BatchState::InProgress);
    let before = f.locations();

    let result = f
        .engine
        .write(&ctx(), &[f.lines[0].id], &MoveLineValues::location_dest(f.box_a.id))
        .await;

    assert!(matches!(result, Err(EngineError::BoxOccupied)));
    assert_eq!(f.locations(), before);
    assert!(f.locations().iter().all(|loc| *loc == f.staging.id));
}

#[tokio::test]
async fn test_closed_batch_does_not_occupy_box() {
    let f = setup(Some(3), MockConfig::default());
    f.occupy(f.box_a.id, BatchState::Done);

    f.engine
        .write(&ctx(), &[f.lines[0].id], &MoveLineValues::location_dest(f.box_a.id))
        .await
        .unwrap();

    assert_eq!(f.env.line_location(f.lines[0].id), f.box_a.id);
}

#[tokio::test]
async fn test_line_itself_does_not_occupy_target() {
    let env = TestEnv::new();
    let staging = env.location("Packing Zone");
    let picking = env.pickings(None, PickingState::Assigned, 1, "P").remove(0);
    env.state
        .batch_repo
        .create_with_pickings(1, None, &[picking.id], |_, _| Ok(()))
        .unwrap();
    let line = env.move_line(picking.id, Some("O1"), staging.id);

    let engine = BoxPropagationEngine::new(
        Arc::new(MockConfig::default()),
        env.state.move_line_repo.clone(),
    );
    let result = engine
        .write(&ctx(), &[line.id], &MoveLineValues::location_dest(staging.id))
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_multi_line_write_is_plain() {
    let f = setup(Some(3), MockConfig::default());
    f.occupy(f.box_a.id, BatchState::Draft);

    let ids = [f.lines[0].id, f.lines[4].id];
    let written = f
        .engine
        .write(&ctx(), &ids, &MoveLineValues::location_dest(f.box_a.id))
        .await
        .unwrap();
    assert_eq!(written, 2);

    let locations = f.locations();
    assert_eq!(locations[0], f.box_a.id);
    assert_eq!(locations[4], f.box_a.id);
    // 同来源的其他行不受影响
    assert_eq!(locations[3], f.staging.id);
    assert_eq!(f.config.reads(), 0);
}

#[tokio::test]
async fn test_propagating_context_is_plain() {
    let f = setup(Some(3), MockConfig::default());
    f.occupy(f.box_a.id, BatchState::Draft);

    f.engine
        .write(
            &ctx().propagating(),
            &[f.lines[0].id],
            &MoveLineValues::location_dest(f.box_a.id),
        )
        .await
        .unwrap();

    let locations = f.locations();
    assert_eq!(locations[0], f.box_a.id);
    assert!(locations[1..].iter().all(|loc| *loc == f.staging.id));
}

#[tokio::test]
async fn test_quantity_only_write_skips_propagation() {
    let f = setup(Some(3), MockConfig::default());

    let values = MoveLineValues {
        quantity: Some(4.0),
        ..Default::default()
    };
    f.engine.write(&ctx(), &[f.lines[0].id], &values).await.unwrap();

    let line = f
        .env
        .state
        .move_line_repo
        .find_by_id(f.lines[0].id)
        .unwrap()
        .unwrap();
    assert_eq!(line.quantity, 4.0);
    assert_eq!(line.location_dest_id, f.staging.id);
    assert_eq!(f.config.reads(), 0);
}

#[tokio::test]
async fn test_line_outside_staging_is_plain() {
    let f = setup(Some(3), MockConfig::default());
    let box_b = f.env.location("Box B");

    // 先放入 A，再从 A 移到 B：A 不是暂存区，不传播
    f.engine
        .write(&ctx(), &[f.lines[0].id], &MoveLineValues::location_dest(f.box_a.id))
        .await
        .unwrap();
    f.engine
        .write(&ctx(), &[f.lines[0].id], &MoveLineValues::location_dest(box_b.id))
        .await
        .unwrap();

    let locations = f.locations();
    assert_eq!(locations[0], box_b.id);
    assert_eq!(locations[3], f.box_a.id);
}

#[tokio::test]
async fn test_config_is_read_on_every_call() {
    let f = setup(Some(3), MockConfig::default());

    f.engine
        .write(&ctx(), &[f.lines[0].id], &MoveLineValues::location_dest(f.box_a.id))
        .await
        .unwrap();
    let reads_after_first = f.config.reads();
    assert!(reads_after_first > 0);

    // 暂存库位改名后，原暂存区的行不再触发传播
    f.config.set_staging_location_name("Somewhere Else");
    let box_b = f.env.location("Box B");
    f.engine
        .write(&ctx(), &[f.lines[4].id], &MoveLineValues::location_dest(box_b.id))
        .await
        .unwrap();

    assert!(f.config.reads() > reads_after_first);
    let locations = f.locations();
    assert_eq!(locations[4], box_b.id);
    assert_eq!(locations[6], f.staging.id);
}

#[tokio::test]
async fn test_config_orders_per_box_change_applies_immediately() {
    let f = setup(None, MockConfig::with_values(1, "Packing Zone"));

    f.engine
        .write(&ctx(), &[f.lines[0].id], &MoveLineValues::location_dest(f.box_a.id))
        .await
        .unwrap();
    // 每箱 1 单: 只有 O1 的两行
    let locations = f.locations();
    assert_eq!(locations[0], f.box_a.id);
    assert_eq!(locations[3], f.box_a.id);
    assert_eq!(locations[1], f.staging.id);

    f.config.set_orders_per_box(6);
    let box_b = f.env.location("Box B");
    f.engine
        .write(&ctx(), &[f.lines[1].id], &MoveLineValues::location_dest(box_b.id))
        .await
        .unwrap();

    // 剩余 O2..O5 全部进入 B
    let locations = f.locations();
    for i in [1, 2, 4, 5, 6, 7] {
        assert_eq!(locations[i], box_b.id);
    }
}

// ==========================================
// API 层: 箱位占用时通知操作人
// ==========================================

#[derive(Default)]
struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn error(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

#[tokio::test]
async fn test_api_notifies_box_occupied() {
    let f = setup(Some(3), MockConfig::default());
    f.occupy(f.box_a.id, BatchState::Draft);

    let notifier = Arc::new(RecordingNotifier::default());
    let api = MoveLineApi::new(
        Arc::new(BoxPropagationEngine::new(
            f.config.clone(),
            f.env.state.move_line_repo.clone(),
        )),
        notifier.clone(),
    );

    let result = api
        .write(&ctx(), &[f.lines[0].id], &MoveLineValues::location_dest(f.box_a.id))
        .await;

    match result {
        Err(ApiError::UserError(msg)) => assert_eq!(msg, "Box is not empty"),
        other => panic!("Expected UserError, got {:?}", other),
    }
    assert_eq!(*notifier.messages.lock().unwrap(), vec!["Box is not empty".to_string()]);
}

#[tokio::test]
async fn test_app_state_uses_stored_config() {
    let f = setup(Some(3), MockConfig::default());
    {
        let conn = f.env.conn();
        let conn = conn.lock().unwrap();
        test_helpers::insert_test_config(
            &conn,
            picking_batch::config::config_keys::DEST_LOCATION_TO_SPLIT_IN_BOX,
            "Packing Zone",
        )
        .unwrap();
    }

    f.env
        .state
        .move_line_api
        .write(&ctx(), &[f.lines[0].id], &MoveLineValues::location_dest(f.box_a.id))
        .await
        .unwrap();

    let locations = f.locations();
    assert_eq!(locations[1], f.box_a.id);
    assert_eq!(locations[4], f.staging.id);
}
