// ==========================================
// 教会行政管理系统 - SQLite 连接初始化与建表
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键、busy_timeout）
// - 建表幂等，启动时可重复执行
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 时间戳落库格式
pub const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 建表（幂等）并记录 schema_version
pub fn apply_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    if let Some(version) = read_schema_version(conn)? {
        if version > CURRENT_SCHEMA_VERSION {
            tracing::warn!(
                db_version = version,
                expected = CURRENT_SCHEMA_VERSION,
                "数据库 schema 版本高于当前程序"
            );
        }
    }
    Ok(())
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS config_kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS org_unit (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    level TEXT NOT NULL,
    name TEXT NOT NULL,
    code TEXT,
    leader TEXT,
    state_id INTEGER REFERENCES org_unit(id),
    region_id INTEGER REFERENCES org_unit(id),
    old_group_id INTEGER REFERENCES org_unit(id),
    group_id INTEGER REFERENCES org_unit(id),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS uq_org_unit_name ON org_unit(level, name COLLATE NOCASE);
CREATE UNIQUE INDEX IF NOT EXISTS uq_org_unit_code ON org_unit(level, code COLLATE NOCASE)
    WHERE code IS NOT NULL;
CREATE INDEX IF NOT EXISTS idx_org_unit_state ON org_unit(state_id);
CREATE INDEX IF NOT EXISTS idx_org_unit_region ON org_unit(region_id);
CREATE INDEX IF NOT EXISTS idx_org_unit_group ON org_unit(group_id);

CREATE TABLE IF NOT EXISTS attendance (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    service_type TEXT NOT NULL,
    state_id INTEGER NOT NULL REFERENCES org_unit(id),
    region_id INTEGER NOT NULL REFERENCES org_unit(id),
    group_id INTEGER NOT NULL REFERENCES org_unit(id),
    old_group_id INTEGER REFERENCES org_unit(id),
    district_id INTEGER REFERENCES org_unit(id),
    year INTEGER NOT NULL,
    month INTEGER NOT NULL,
    week INTEGER NOT NULL,
    men INTEGER NOT NULL DEFAULT 0,
    women INTEGER NOT NULL DEFAULT 0,
    youth_boys INTEGER NOT NULL DEFAULT 0,
    youth_girls INTEGER NOT NULL DEFAULT 0,
    children_boys INTEGER NOT NULL DEFAULT 0,
    children_girls INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_attendance_period ON attendance(year, month, week);
CREATE INDEX IF NOT EXISTS idx_attendance_group ON attendance(group_id);

CREATE TABLE IF NOT EXISTS youth_weekly_attendance (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    state_id INTEGER NOT NULL REFERENCES org_unit(id),
    region_id INTEGER NOT NULL REFERENCES org_unit(id),
    old_group_id INTEGER REFERENCES org_unit(id),
    group_id INTEGER NOT NULL REFERENCES org_unit(id),
    attendance_type TEXT NOT NULL,
    year INTEGER NOT NULL,
    month INTEGER NOT NULL,
    week INTEGER NOT NULL,
    male INTEGER NOT NULL DEFAULT 0,
    female INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS youth_revival_attendance (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    state_id INTEGER NOT NULL REFERENCES org_unit(id),
    region_id INTEGER NOT NULL REFERENCES org_unit(id),
    year INTEGER NOT NULL,
    month INTEGER NOT NULL,
    male INTEGER NOT NULL DEFAULT 0,
    female INTEGER NOT NULL DEFAULT 0,
    testimonies INTEGER NOT NULL DEFAULT 0,
    new_converts INTEGER NOT NULL DEFAULT 0,
    holy_ghost_baptism INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS admin_profile (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    phone TEXT,
    access_level TEXT NOT NULL,
    state_id INTEGER REFERENCES org_unit(id),
    region_id INTEGER REFERENCES org_unit(id),
    group_id INTEGER REFERENCES org_unit(id),
    district_id INTEGER REFERENCES org_unit(id),
    password_hash TEXT NOT NULL,
    password_salt TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    last_login_at TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS uq_admin_email ON admin_profile(email COLLATE NOCASE);

CREATE TABLE IF NOT EXISTS action_log (
    action_id TEXT PRIMARY KEY,
    action_type TEXT NOT NULL,
    action_ts TEXT NOT NULL,
    actor TEXT NOT NULL,
    entity TEXT NOT NULL,
    entity_id INTEGER,
    payload_json TEXT,
    detail TEXT
);
CREATE INDEX IF NOT EXISTS idx_action_ts ON action_log(action_ts);
CREATE INDEX IF NOT EXISTS idx_action_entity ON action_log(entity, entity_id);

CREATE TABLE IF NOT EXISTS import_batch (
    batch_id TEXT PRIMARY KEY,
    level TEXT NOT NULL,
    file_name TEXT,
    total_rows INTEGER NOT NULL,
    added INTEGER NOT NULL,
    updated INTEGER NOT NULL,
    errors INTEGER NOT NULL,
    imported_by TEXT NOT NULL,
    imported_at TEXT NOT NULL,
    elapsed_ms INTEGER NOT NULL,
    errors_json TEXT
);
"#;
