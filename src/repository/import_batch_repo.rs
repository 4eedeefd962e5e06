// ==========================================
// 教会行政管理系统 - 导入批次仓储
// ==========================================
// 对齐: import_batch 表
// ==========================================

use crate::domain::import::ImportBatch;
use crate::domain::types::OrgLevel;
use crate::repository::db_utils::parse_enum;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const BATCH_COLUMNS: &str = r#"
    batch_id, level, file_name, total_rows, added, updated, errors,
    imported_by, imported_at, elapsed_ms, errors_json
"#;

pub struct ImportBatchRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ImportBatchRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, batch: &ImportBatch) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO import_batch (
                batch_id, level, file_name, total_rows, added, updated, errors,
                imported_by, imported_at, elapsed_ms, errors_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                batch.batch_id,
                batch.level.to_db_str(),
                batch.file_name,
                batch.total_rows,
                batch.added,
                batch.updated,
                batch.errors,
                batch.imported_by,
                batch.imported_at.to_rfc3339(),
                batch.elapsed_ms,
                batch.errors_json,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, batch_id: &str) -> RepositoryResult<Option<ImportBatch>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM import_batch WHERE batch_id = ?1", BATCH_COLUMNS);
        Ok(conn.query_row(&sql, params![batch_id], map_batch).optional()?)
    }

    /// 最近的导入批次，可按层级过滤
    pub fn list_recent(&self, level: Option<OrgLevel>, limit: usize) -> RepositoryResult<Vec<ImportBatch>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {} FROM import_batch
            WHERE (?1 IS NULL OR level = ?1)
            ORDER BY imported_at DESC, rowid DESC
            LIMIT ?2
            "#,
            BATCH_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![level.map(|l| l.to_db_str()), limit as i64], map_batch)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }
}

fn map_batch(row: &Row<'_>) -> SqliteResult<ImportBatch> {
    let level: String = row.get(1)?;
    let imported_at: String = row.get(8)?;
    let imported_at = DateTime::parse_from_rfc3339(&imported_at)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, Type::Text, Box::new(e)))?
        .with_timezone(&Utc);
    Ok(ImportBatch {
        batch_id: row.get(0)?,
        level: parse_enum(1, &level, "层级", OrgLevel::parse)?,
        file_name: row.get(2)?,
        total_rows: row.get(3)?,
        added: row.get(4)?,
        updated: row.get(5)?,
        errors: row.get(6)?,
        imported_by: row.get(7)?,
        imported_at,
        elapsed_ms: row.get(9)?,
        errors_json: row.get(10)?,
    })
}
