// ==========================================
// 教会行政管理系统 - 青年出勤数据仓储
// ==========================================
// 对齐: youth_weekly_attendance / youth_revival_attendance 表
// ==========================================

use crate::domain::attendance::{
    NewYouthRevivalAttendance, NewYouthWeeklyAttendance, YouthRevivalAttendance,
    YouthWeeklyAttendance,
};
use crate::domain::types::YouthAttendanceType;
use crate::repository::db_utils::{format_ts, now_ts, parse_enum, parse_ts};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Result as SqliteResult, Row};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

// ==========================================
// YouthFilter - 青年出勤筛选条件
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YouthFilter {
    pub state_id: Option<i64>,
    pub region_id: Option<i64>,
    /// 仅对周出勤生效
    pub group_id: Option<i64>,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl YouthFilter {
    fn to_where(&self, with_group: bool) -> (String, Vec<Value>) {
        let mut clauses = Vec::new();
        let mut values = Vec::new();

        let group_id = if with_group { self.group_id } else { None };
        for (column, value) in [
            ("state_id = ?", self.state_id),
            ("region_id = ?", self.region_id),
            ("group_id = ?", group_id),
            ("year = ?", self.year.map(|y| y as i64)),
            ("month = ?", self.month.map(|m| m as i64)),
        ] {
            if let Some(v) = value {
                clauses.push(column);
                values.push(Value::Integer(v));
            }
        }

        if clauses.is_empty() {
            (String::new(), values)
        } else {
            (format!("WHERE {}", clauses.join(" AND ")), values)
        }
    }
}

// ==========================================
// YouthWeeklyRepository - 青年周出勤仓储
// ==========================================
pub struct YouthWeeklyRepository {
    conn: Arc<Mutex<Connection>>,
}

const WEEKLY_COLUMNS: &str = r#"
    id, state_id, region_id, old_group_id, group_id, attendance_type,
    year, month, week, male, female, created_at, updated_at
"#;

impl YouthWeeklyRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, record: &NewYouthWeeklyAttendance) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let now = format_ts(&now_ts());
        conn.execute(
            r#"
            INSERT INTO youth_weekly_attendance (
                state_id, region_id, old_group_id, group_id, attendance_type,
                year, month, week, male, female, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
            "#,
            params![
                record.state_id,
                record.region_id,
                record.old_group_id,
                record.group_id,
                record.attendance_type.to_db_str(),
                record.year,
                record.month,
                record.week,
                record.male,
                record.female,
                now,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update(&self, id: i64, record: &NewYouthWeeklyAttendance) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE youth_weekly_attendance SET
                state_id = ?2, region_id = ?3, old_group_id = ?4, group_id = ?5,
                attendance_type = ?6, year = ?7, month = ?8, week = ?9,
                male = ?10, female = ?11, updated_at = ?12
            WHERE id = ?1
            "#,
            params![
                id,
                record.state_id,
                record.region_id,
                record.old_group_id,
                record.group_id,
                record.attendance_type.to_db_str(),
                record.year,
                record.month,
                record.week,
                record.male,
                record.female,
                format_ts(&now_ts()),
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("YouthWeeklyAttendance", id));
        }
        Ok(())
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM youth_weekly_attendance WHERE id = ?1",
            params![id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("YouthWeeklyAttendance", id));
        }
        Ok(())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<YouthWeeklyAttendance>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM youth_weekly_attendance WHERE id = ?1",
            WEEKLY_COLUMNS
        );
        Ok(conn.query_row(&sql, params![id], map_weekly).optional()?)
    }

    pub fn list(&self, filter: &YouthFilter) -> RepositoryResult<Vec<YouthWeeklyAttendance>> {
        let (where_clause, values) = filter.to_where(true);
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM youth_weekly_attendance {} ORDER BY year DESC, month DESC, week DESC, id DESC",
            WEEKLY_COLUMNS, where_clause
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values), map_weekly)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }
}

fn map_weekly(row: &Row<'_>) -> SqliteResult<YouthWeeklyAttendance> {
    let attendance_type: String = row.get(5)?;
    let created_at: String = row.get(11)?;
    let updated_at: String = row.get(12)?;
    Ok(YouthWeeklyAttendance {
        id: row.get(0)?,
        state_id: row.get(1)?,
        region_id: row.get(2)?,
        old_group_id: row.get(3)?,
        group_id: row.get(4)?,
        attendance_type: parse_enum(5, &attendance_type, "青年出勤类型", YouthAttendanceType::parse)?,
        year: row.get(6)?,
        month: row.get(7)?,
        week: row.get(8)?,
        male: row.get(9)?,
        female: row.get(10)?,
        created_at: parse_ts(11, &created_at)?,
        updated_at: parse_ts(12, &updated_at)?,
    })
}

// ==========================================
// YouthRevivalRepository - 青年复兴会出勤仓储
// ==========================================
pub struct YouthRevivalRepository {
    conn: Arc<Mutex<Connection>>,
}

const REVIVAL_COLUMNS: &str = r#"
    id, state_id, region_id, year, month, male, female,
    testimonies, new_converts, holy_ghost_baptism, created_at, updated_at
"#;

impl YouthRevivalRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, record: &NewYouthRevivalAttendance) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let now = format_ts(&now_ts());
        conn.execute(
            r#"
            INSERT INTO youth_revival_attendance (
                state_id, region_id, year, month, male, female,
                testimonies, new_converts, holy_ghost_baptism, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
            "#,
            params![
                record.state_id,
                record.region_id,
                record.year,
                record.month,
                record.male,
                record.female,
                record.testimonies,
                record.new_converts,
                record.holy_ghost_baptism,
                now,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update(&self, id: i64, record: &NewYouthRevivalAttendance) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE youth_revival_attendance SET
                state_id = ?2, region_id = ?3, year = ?4, month = ?5,
                male = ?6, female = ?7, testimonies = ?8, new_converts = ?9,
                holy_ghost_baptism = ?10, updated_at = ?11
            WHERE id = ?1
            "#,
            params![
                id,
                record.state_id,
                record.region_id,
                record.year,
                record.month,
                record.male,
                record.female,
                record.testimonies,
                record.new_converts,
                record.holy_ghost_baptism,
                format_ts(&now_ts()),
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("YouthRevivalAttendance", id));
        }
        Ok(())
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM youth_revival_attendance WHERE id = ?1",
            params![id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("YouthRevivalAttendance", id));
        }
        Ok(())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<YouthRevivalAttendance>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM youth_revival_attendance WHERE id = ?1",
            REVIVAL_COLUMNS
        );
        Ok(conn.query_row(&sql, params![id], map_revival).optional()?)
    }

    pub fn list(&self, filter: &YouthFilter) -> RepositoryResult<Vec<YouthRevivalAttendance>> {
        let (where_clause, values) = filter.to_where(false);
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM youth_revival_attendance {} ORDER BY year DESC, month DESC, id DESC",
            REVIVAL_COLUMNS, where_clause
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values), map_revival)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }
}

fn map_revival(row: &Row<'_>) -> SqliteResult<YouthRevivalAttendance> {
    let created_at: String = row.get(10)?;
    let updated_at: String = row.get(11)?;
    Ok(YouthRevivalAttendance {
        id: row.get(0)?,
        state_id: row.get(1)?,
        region_id: row.get(2)?,
        year: row.get(3)?,
        month: row.get(4)?,
        male: row.get(5)?,
        female: row.get(6)?,
        testimonies: row.get(7)?,
        new_converts: row.get(8)?,
        holy_ghost_baptism: row.get(9)?,
        created_at: parse_ts(10, &created_at)?,
        updated_at: parse_ts(11, &updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Arc<Mutex<Connection>> {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::apply_schema(&conn).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO org_unit (id, level, name, created_at, updated_at)
                VALUES (1, 'STATE', 'Lagos', '2025-01-01 00:00:00', '2025-01-01 00:00:00');
            INSERT INTO org_unit (id, level, name, state_id, created_at, updated_at)
                VALUES (2, 'REGION', 'Ikeja', 1, '2025-01-01 00:00:00', '2025-01-01 00:00:00');
            INSERT INTO org_unit (id, level, name, state_id, region_id, created_at, updated_at)
                VALUES (3, 'GROUP', 'Alausa', 1, 2, '2025-01-01 00:00:00', '2025-01-01 00:00:00');
            "#,
        )
        .unwrap();
        Arc::new(Mutex::new(conn))
    }

    #[test]
    fn test_weekly_crud() {
        let repo = YouthWeeklyRepository::new(setup());
        let new = NewYouthWeeklyAttendance {
            state_id: 1,
            region_id: 2,
            old_group_id: None,
            group_id: 3,
            attendance_type: YouthAttendanceType::Visitor,
            year: 2025,
            month: 4,
            week: 2,
            male: 3,
            female: 8,
        };
        let id = repo.insert(&new).unwrap();
        let found = repo.find_by_id(id).unwrap().unwrap();
        assert_eq!(found.total(), 11);
        assert_eq!(found.attendance_type, YouthAttendanceType::Visitor);

        let listed = repo
            .list(&YouthFilter {
                group_id: Some(3),
                month: Some(4),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(listed.len(), 1);

        repo.delete(id).unwrap();
        assert!(repo.list(&YouthFilter::default()).unwrap().is_empty());
    }

    #[test]
    fn test_revival_filter_ignores_group() {
        let repo = YouthRevivalRepository::new(setup());
        let new = NewYouthRevivalAttendance {
            state_id: 1,
            region_id: 2,
            year: 2025,
            month: 8,
            male: 20,
            female: 25,
            testimonies: 4,
            new_converts: 2,
            holy_ghost_baptism: 1,
        };
        repo.insert(&new).unwrap();

        let listed = repo
            .list(&YouthFilter {
                group_id: Some(999),
                year: Some(2025),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].total(), 45);
    }
}
