use super::core::ActionLogRepository;
use crate::domain::action_log::ActionLog;
use crate::repository::db_utils::parse_ts;
use crate::repository::error::RepositoryResult;
use rusqlite::{params, OptionalExtension, Result as SqliteResult, Row};

const SELECT_COLUMNS: &str = r#"
    SELECT action_id, action_type, action_ts, actor,
           entity, entity_id, payload_json, detail
    FROM action_log
"#;

impl ActionLogRepository {
    // ==========================================
    // 查询操作
    // ==========================================

    /// 按 action_id 查询单个日志
    pub fn find_by_id(&self, action_id: &str) -> RepositoryResult<Option<ActionLog>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE action_id = ?", SELECT_COLUMNS);
        Ok(conn
            .query_row(&sql, params![action_id], map_row)
            .optional()?)
    }

    /// 最近的操作日志（时间倒序）
    pub fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<ActionLog>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} ORDER BY action_ts DESC, rowid DESC LIMIT ?",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let logs = stmt
            .query_map(params![limit as i64], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(logs)
    }

    /// 查询某个实体的全部日志
    pub fn list_by_entity(&self, entity: &str, entity_id: i64) -> RepositoryResult<Vec<ActionLog>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} WHERE entity = ? AND entity_id = ? ORDER BY action_ts DESC, rowid DESC",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let logs = stmt
            .query_map(params![entity, entity_id], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(logs)
    }

    /// 按操作人统计条数
    pub fn count_by_actor(&self, actor: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM action_log WHERE actor = ?",
            params![actor],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn map_row(row: &Row<'_>) -> SqliteResult<ActionLog> {
    let action_ts: String = row.get(2)?;
    let payload_json: Option<String> = row.get(6)?;
    Ok(ActionLog {
        action_id: row.get(0)?,
        action_type: row.get(1)?,
        action_ts: parse_ts(2, &action_ts)?,
        actor: row.get(3)?,
        entity: row.get(4)?,
        entity_id: row.get(5)?,
        // 损坏的 JSON 不阻断日志读取
        payload_json: payload_json.and_then(|s| serde_json::from_str(&s).ok()),
        detail: row.get(7)?,
    })
}
