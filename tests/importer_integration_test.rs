// ==========================================
// 导入器集成测试
// ==========================================
// 覆盖: 缺列、重名、未知上级、更新开关、行数上限、多文件
// ==========================================

mod helpers;
mod test_helpers;

use std::sync::{Arc, Mutex};

use church_admin::db::open_sqlite_connection;
use church_admin::domain::org::NewOrgUnit;
use church_admin::domain::types::OrgLevel;
use church_admin::importer::{ImportError, OrgUnitImporter, OrgUnitImporterImpl};
use church_admin::repository::{
    ActionLogRepository, ImportBatchRepository, OrgUnitRepository,
};
use helpers::mock_config::MockConfig;
use tempfile::TempDir;
use test_helpers::{create_test_db, write_csv};

struct ImportEnv {
    importer: OrgUnitImporterImpl<MockConfig>,
    org_repo: Arc<OrgUnitRepository>,
    batch_repo: Arc<ImportBatchRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    dir: TempDir,
    _db: tempfile::NamedTempFile,
}

fn setup(config: MockConfig) -> ImportEnv {
    let (db, db_path) = create_test_db().unwrap();
    let conn = Arc::new(Mutex::new(open_sqlite_connection(&db_path).unwrap()));
    let org_repo = Arc::new(OrgUnitRepository::new(conn.clone()));
    let batch_repo = Arc::new(ImportBatchRepository::new(conn.clone()));
    let action_log_repo = Arc::new(ActionLogRepository::new(conn));
    let importer = OrgUnitImporterImpl::new(
        org_repo.clone(),
        batch_repo.clone(),
        action_log_repo.clone(),
        Arc::new(config),
    );
    ImportEnv {
        importer,
        org_repo,
        batch_repo,
        action_log_repo,
        dir: TempDir::new().unwrap(),
        _db: db,
    }
}

fn seed_state(env: &ImportEnv, name: &str) -> i64 {
    env.org_repo
        .insert(&NewOrgUnit {
            level: OrgLevel::State,
            name: name.to_string(),
            code: None,
            leader: None,
            parents: Default::default(),
        })
        .unwrap()
}

#[tokio::test]
async fn test_import_states_creates_units() {
    let env = setup(MockConfig::default());
    let file = write_csv(
        env.dir.path(),
        "states.csv",
        &["STATE NAME,CODE,LEADER", "Lagos,LG,Pastor Ade", "Ogun,OG,"],
    );

    let summary = env
        .importer
        .import_file(OrgLevel::State, &file, "tester")
        .await
        .unwrap();

    assert_eq!(summary.total_rows, 2);
    assert_eq!(summary.added, 2);
    assert_eq!(summary.updated, 0);
    assert!(summary.errors.is_empty());

    let lagos = env.org_repo.find_by_name(OrgLevel::State, "lagos").unwrap().unwrap();
    assert_eq!(lagos.code.as_deref(), Some("LG"));
    assert_eq!(lagos.leader.as_deref(), Some("Pastor Ade"));

    // 批次与操作日志均已记录
    let batch = env.batch_repo.find_by_id(&summary.batch_id).unwrap().unwrap();
    assert_eq!(batch.added, 2);
    assert_eq!(env.action_log_repo.count_by_actor("tester").unwrap(), 1);
}

#[tokio::test]
async fn test_missing_required_column_errors_every_row() {
    let env = setup(MockConfig::default());
    seed_state(&env, "Lagos");
    // 导入大区但缺少 STATE 列
    let file = write_csv(env.dir.path(), "regions.csv", &["NAME", "Ikeja", "Lekki"]);

    let summary = env
        .importer
        .import_file(OrgLevel::Region, &file, "tester")
        .await
        .unwrap();

    assert_eq!(summary.added, 0);
    assert_eq!(summary.updated, 0);
    assert_eq!(summary.errors.len(), 2);
    assert_eq!(summary.errors[0].row, 1);
    assert_eq!(summary.errors[1].row, 2);
    assert!(env.org_repo.list_by_level(OrgLevel::Region).unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_required_value_is_row_error() {
    let env = setup(MockConfig::default());
    seed_state(&env, "Lagos");
    let file = write_csv(
        env.dir.path(),
        "regions.csv",
        &["REGION,STATE", "Ikeja,Lagos", "Lekki,"],
    );

    let summary = env
        .importer
        .import_file(OrgLevel::Region, &file, "tester")
        .await
        .unwrap();

    assert_eq!(summary.added, 1);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].row, 2);
}

#[tokio::test]
async fn test_duplicate_names_flagged_once_each() {
    let env = setup(MockConfig::default());
    let file = write_csv(
        env.dir.path(),
        "states.csv",
        &["NAME", "Lagos", "Ogun", "lagos", "Ogun", "LAGOS", "Oyo"],
    );

    let summary = env
        .importer
        .import_file(OrgLevel::State, &file, "tester")
        .await
        .unwrap();

    // 首次出现的 Lagos / Ogun 与 Oyo 被导入
    assert_eq!(summary.added, 3);
    // 每个重名只报一次
    assert_eq!(summary.errors.len(), 2);
    let lagos_error = summary
        .errors
        .iter()
        .find(|e| e.name.as_deref().map(|n| n.eq_ignore_ascii_case("lagos")) == Some(true))
        .unwrap();
    assert!(lagos_error.message.contains('1'));
    assert!(lagos_error.message.contains('3'));
    assert!(lagos_error.message.contains('5'));
    assert_eq!(env.org_repo.list_by_level(OrgLevel::State).unwrap().len(), 3);
}

#[tokio::test]
async fn test_unknown_parent_is_row_error() {
    let env = setup(MockConfig::default());
    seed_state(&env, "Lagos");
    let file = write_csv(
        env.dir.path(),
        "regions.csv",
        &["REGION NAME,STATE NAME", "Ikeja,LAGOS", "Abeokuta,Ogun"],
    );

    let summary = env
        .importer
        .import_file(OrgLevel::Region, &file, "tester")
        .await
        .unwrap();

    assert_eq!(summary.added, 1);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].name.as_deref(), Some("Abeokuta"));

    let ikeja = env.org_repo.find_by_name(OrgLevel::Region, "Ikeja").unwrap().unwrap();
    assert!(ikeja.state_id.is_some());
}

#[tokio::test]
async fn test_existing_unit_updated_by_name_then_code() {
    let env = setup(MockConfig::default());
    let first = write_csv(env.dir.path(), "a.csv", &["NAME,CODE", "Lagos,LG"]);
    env.importer.import_file(OrgLevel::State, &first, "tester").await.unwrap();

    // 名称命中 → 更新负责人；编码命中 → 改名
    let second = write_csv(
        env.dir.path(),
        "b.csv",
        &["NAME,CODE,LEADER", "lagos,,Pastor Ade", "Lagos Mainland,LG,"],
    );
    let summary = env
        .importer
        .import_file(OrgLevel::State, &second, "tester")
        .await
        .unwrap();

    assert_eq!(summary.added, 0);
    assert_eq!(summary.updated, 2);
    let states = env.org_repo.list_by_level(OrgLevel::State).unwrap();
    assert_eq!(states.len(), 1);
    assert_eq!(states[0].name, "Lagos Mainland");
    assert_eq!(states[0].code.as_deref(), Some("LG"));
    assert_eq!(states[0].leader.as_deref(), Some("Pastor Ade"));
}

#[tokio::test]
async fn test_update_disabled_reports_existing() {
    let env = setup(MockConfig::no_update());
    seed_state(&env, "Lagos");
    let file = write_csv(env.dir.path(), "states.csv", &["NAME", "Lagos", "Ogun"]);

    let summary = env
        .importer
        .import_file(OrgLevel::State, &file, "tester")
        .await
        .unwrap();

    assert_eq!(summary.added, 1);
    assert_eq!(summary.updated, 0);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].row, 1);
}

#[tokio::test]
async fn test_too_many_rows_rejected() {
    let env = setup(MockConfig::with_max_rows(2));
    let file = write_csv(env.dir.path(), "states.csv", &["NAME", "A", "B", "C"]);

    let result = env.importer.import_file(OrgLevel::State, &file, "tester").await;
    assert!(matches!(result, Err(ImportError::TooManyRows { rows: 3, max: 2 })));
    assert!(env.org_repo.list_by_level(OrgLevel::State).unwrap().is_empty());
}

#[tokio::test]
async fn test_unsupported_and_missing_files() {
    let env = setup(MockConfig::default());
    let txt = env.dir.path().join("states.txt");
    std::fs::write(&txt, "NAME\nLagos\n").unwrap();

    let result = env.importer.import_file(OrgLevel::State, &txt, "tester").await;
    assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));

    let missing = env.dir.path().join("nope.csv");
    let result = env.importer.import_file(OrgLevel::State, &missing, "tester").await;
    assert!(matches!(result, Err(ImportError::FileNotFound(_))));
}

#[tokio::test]
async fn test_import_many_isolates_failures() {
    let env = setup(MockConfig::default());
    let good = write_csv(env.dir.path(), "good.csv", &["NAME", "Lagos"]);
    let other = write_csv(env.dir.path(), "other.csv", &["NAME", "Ogun"]);
    let bad = env.dir.path().join("missing.csv");

    let results = env
        .importer
        .import_many(OrgLevel::State, vec![good, bad, other], "tester")
        .await;

    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
    assert!(results[2].is_ok());
    assert_eq!(env.org_repo.list_by_level(OrgLevel::State).unwrap().len(), 2);
}
