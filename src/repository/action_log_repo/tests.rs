use super::ActionLogRepository;
use crate::domain::action_log::{entity, ActionLog, ActionType};
use rusqlite::Connection;
use serde_json::json;
use std::sync::{Arc, Mutex};

fn setup_test_db() -> Arc<Mutex<Connection>> {
    let conn = Connection::open_in_memory().unwrap();
    crate::db::configure_sqlite_connection(&conn).unwrap();
    crate::db::apply_schema(&conn).unwrap();
    Arc::new(Mutex::new(conn))
}

fn make_test_log(actor: &str, entity_id: i64) -> ActionLog {
    ActionLog::now(
        ActionType::Create,
        actor,
        entity::ORG_UNIT,
        Some(entity_id),
        Some(json!({ "name": "Lagos" })),
        Some("Test log".to_string()),
    )
}

#[test]
fn test_insert_and_find_by_id() {
    let repo = ActionLogRepository::new(setup_test_db());

    let log = make_test_log("admin@church.org", 7);
    let id = repo.insert(&log).unwrap();
    assert_eq!(id, log.action_id);

    let found = repo.find_by_id(&id).unwrap().unwrap();
    assert_eq!(found.action_type, "CREATE");
    assert_eq!(found.entity, "ORG_UNIT");
    assert_eq!(found.entity_id, Some(7));
    assert_eq!(found.payload_json, Some(json!({ "name": "Lagos" })));
}

#[test]
fn test_find_by_id_missing() {
    let repo = ActionLogRepository::new(setup_test_db());
    assert!(repo.find_by_id("nope").unwrap().is_none());
}

#[test]
fn test_batch_insert_and_list_recent() {
    let repo = ActionLogRepository::new(setup_test_db());

    let logs = (1..=5).map(|i| make_test_log("a", i)).collect();
    assert_eq!(repo.batch_insert(logs).unwrap(), 5);

    let recent = repo.list_recent(3).unwrap();
    assert_eq!(recent.len(), 3);
    assert_eq!(repo.count_by_actor("a").unwrap(), 5);
}

#[test]
fn test_list_by_entity() {
    let repo = ActionLogRepository::new(setup_test_db());
    repo.insert(&make_test_log("a", 1)).unwrap();
    repo.insert(&make_test_log("a", 2)).unwrap();
    repo.insert(&make_test_log("b", 1)).unwrap();

    let logs = repo.list_by_entity(entity::ORG_UNIT, 1).unwrap();
    assert_eq!(logs.len(), 2);
    assert!(logs.iter().all(|l| l.entity_id == Some(1)));
}
