// ==========================================
// 教会行政管理系统 - 聚会出勤数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 对齐: attendance 表
// ==========================================

use crate::domain::attendance::{Attendance, AttendanceCounts, AttendanceTotals, NewAttendance};
use crate::domain::types::ServiceType;
use crate::repository::db_utils::{format_ts, now_ts, parse_enum, parse_ts};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Result as SqliteResult, Row};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

const ATTENDANCE_COLUMNS: &str = r#"
    id, service_type, state_id, region_id, group_id, old_group_id, district_id,
    year, month, week,
    men, women, youth_boys, youth_girls, children_boys, children_girls,
    created_at, updated_at
"#;

// ==========================================
// AttendanceFilter - 列表筛选条件
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttendanceFilter {
    pub service_type: Option<ServiceType>,
    pub state_id: Option<i64>,
    pub region_id: Option<i64>,
    pub group_id: Option<i64>,
    pub district_id: Option<i64>,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl AttendanceFilter {
    /// 生成 WHERE 子句与参数
    fn to_where(&self) -> (String, Vec<Value>) {
        let mut clauses = Vec::new();
        let mut values = Vec::new();

        if let Some(t) = self.service_type {
            clauses.push("service_type = ?");
            values.push(Value::Text(t.to_db_str().to_string()));
        }
        for (column, value) in [
            ("state_id = ?", self.state_id),
            ("region_id = ?", self.region_id),
            ("group_id = ?", self.group_id),
            ("district_id = ?", self.district_id),
        ] {
            if let Some(v) = value {
                clauses.push(column);
                values.push(Value::Integer(v));
            }
        }
        if let Some(year) = self.year {
            clauses.push("year = ?");
            values.push(Value::Integer(year as i64));
        }
        if let Some(month) = self.month {
            clauses.push("month = ?");
            values.push(Value::Integer(month as i64));
        }

        if clauses.is_empty() {
            (String::new(), values)
        } else {
            (format!("WHERE {}", clauses.join(" AND ")), values)
        }
    }
}

// ==========================================
// AttendanceRepository - 聚会出勤仓储
// ==========================================
pub struct AttendanceRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AttendanceRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, record: &NewAttendance) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let now = format_ts(&now_ts());
        conn.execute(
            r#"
            INSERT INTO attendance (
                service_type, state_id, region_id, group_id, old_group_id, district_id,
                year, month, week,
                men, women, youth_boys, youth_girls, children_boys, children_girls,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?16)
            "#,
            params![
                record.service_type.to_db_str(),
                record.state_id,
                record.region_id,
                record.group_id,
                record.old_group_id,
                record.district_id,
                record.year,
                record.month,
                record.week,
                record.counts.men,
                record.counts.women,
                record.counts.youth_boys,
                record.counts.youth_girls,
                record.counts.children_boys,
                record.counts.children_girls,
                now,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update(&self, id: i64, record: &NewAttendance) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE attendance SET
                service_type = ?2, state_id = ?3, region_id = ?4, group_id = ?5,
                old_group_id = ?6, district_id = ?7,
                year = ?8, month = ?9, week = ?10,
                men = ?11, women = ?12, youth_boys = ?13, youth_girls = ?14,
                children_boys = ?15, children_girls = ?16,
                updated_at = ?17
            WHERE id = ?1
            "#,
            params![
                id,
                record.service_type.to_db_str(),
                record.state_id,
                record.region_id,
                record.group_id,
                record.old_group_id,
                record.district_id,
                record.year,
                record.month,
                record.week,
                record.counts.men,
                record.counts.women,
                record.counts.youth_boys,
                record.counts.youth_girls,
                record.counts.children_boys,
                record.counts.children_girls,
                format_ts(&now_ts()),
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Attendance", id));
        }
        Ok(())
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM attendance WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Attendance", id));
        }
        Ok(())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Attendance>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM attendance WHERE id = ?1", ATTENDANCE_COLUMNS);
        Ok(conn.query_row(&sql, params![id], map_attendance).optional()?)
    }

    /// 按筛选条件查询（按周期倒序）
    pub fn list(&self, filter: &AttendanceFilter) -> RepositoryResult<Vec<Attendance>> {
        let (where_clause, values) = filter.to_where();
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM attendance {} ORDER BY year DESC, month DESC, week DESC, id DESC",
            ATTENDANCE_COLUMNS, where_clause
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values), map_attendance)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 按月汇总分类人数（图表数据）
    ///
    /// # 返回
    /// - Vec<(month, totals)>: 仅包含有数据的月份，按月份升序
    pub fn monthly_totals(
        &self,
        year: i32,
        service_type: Option<ServiceType>,
    ) -> RepositoryResult<Vec<(u32, AttendanceTotals)>> {
        let filter = AttendanceFilter {
            service_type,
            year: Some(year),
            ..Default::default()
        };
        let (where_clause, values) = filter.to_where();
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT month,
                   SUM(men), SUM(women), SUM(youth_boys), SUM(youth_girls),
                   SUM(children_boys), SUM(children_girls)
            FROM attendance {}
            GROUP BY month
            ORDER BY month ASC
            "#,
            where_clause
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values), |row| {
                Ok((
                    row.get::<_, u32>(0)?,
                    AttendanceTotals {
                        men: sum_column(row, 1)?,
                        women: sum_column(row, 2)?,
                        youth_boys: sum_column(row, 3)?,
                        youth_girls: sum_column(row, 4)?,
                        children_boys: sum_column(row, 5)?,
                        children_girls: sum_column(row, 6)?,
                    },
                ))
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }
}

/// SUM 列按 i64 读出（超出 u32 的月合计不能按计数列读）
fn sum_column(row: &Row<'_>, idx: usize) -> SqliteResult<u64> {
    let value: Option<i64> = row.get(idx)?;
    Ok(value.map_or(0, |v| u64::try_from(v).unwrap_or(0)))
}

fn map_attendance(row: &Row<'_>) -> SqliteResult<Attendance> {
    let service_type: String = row.get(1)?;
    let created_at: String = row.get(16)?;
    let updated_at: String = row.get(17)?;
    Ok(Attendance {
        id: row.get(0)?,
        service_type: parse_enum(1, &service_type, "聚会类型", ServiceType::parse)?,
        state_id: row.get(2)?,
        region_id: row.get(3)?,
        group_id: row.get(4)?,
        old_group_id: row.get(5)?,
        district_id: row.get(6)?,
        year: row.get(7)?,
        month: row.get(8)?,
        week: row.get(9)?,
        counts: AttendanceCounts {
            men: row.get(10)?,
            women: row.get(11)?,
            youth_boys: row.get(12)?,
            youth_girls: row.get(13)?,
            children_boys: row.get(14)?,
            children_girls: row.get(15)?,
        },
        created_at: parse_ts(16, &created_at)?,
        updated_at: parse_ts(17, &updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> AttendanceRepository {
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
        AttendanceRepository::new(Arc::new(Mutex::new(conn)))
    }

    fn record(service_type: ServiceType, month: u32, men: u32) -> NewAttendance {
        NewAttendance {
            service_type,
            state_id: 1,
            region_id: 2,
            group_id: 3,
            old_group_id: None,
            district_id: None,
            year: 2025,
            month,
            week: 1,
            counts: AttendanceCounts {
                men,
                women: 5,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_insert_update_delete() {
        let repo = setup();
        let id = repo.insert(&record(ServiceType::SundayService, 1, 10)).unwrap();

        let found = repo.find_by_id(id).unwrap().unwrap();
        assert_eq!(found.total(), 15);

        repo.update(id, &record(ServiceType::SundayService, 1, 20)).unwrap();
        assert_eq!(repo.find_by_id(id).unwrap().unwrap().counts.men, 20);

        repo.delete(id).unwrap();
        assert!(repo.find_by_id(id).unwrap().is_none());
        assert!(matches!(
            repo.delete(id),
            Err(RepositoryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_list_with_filter() {
        let repo = setup();
        repo.insert(&record(ServiceType::SundayService, 1, 10)).unwrap();
        repo.insert(&record(ServiceType::HouseCaring, 1, 10)).unwrap();
        repo.insert(&record(ServiceType::SundayService, 2, 10)).unwrap();

        let all = repo.list(&AttendanceFilter::default()).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].month, 2);

        let sunday = repo
            .list(&AttendanceFilter {
                service_type: Some(ServiceType::SundayService),
                month: Some(1),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(sunday.len(), 1);
    }

    #[test]
    fn test_monthly_totals() {
        let repo = setup();
        repo.insert(&record(ServiceType::SundayService, 1, 10)).unwrap();
        repo.insert(&record(ServiceType::SundayService, 1, 7)).unwrap();
        repo.insert(&record(ServiceType::HouseCaring, 3, 4)).unwrap();

        let totals = repo.monthly_totals(2025, None).unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].0, 1);
        assert_eq!(totals[0].1.men, 17);
        assert_eq!(totals[0].1.women, 10);

        let sunday_only = repo
            .monthly_totals(2025, Some(ServiceType::SundayService))
            .unwrap();
        assert_eq!(sunday_only.len(), 1);
    }

    #[test]
    fn test_monthly_totals_beyond_u32() {
        let repo = setup();
        repo.insert(&record(ServiceType::SundayService, 4, 3_000_000_000)).unwrap();
        repo.insert(&record(ServiceType::SundayService, 4, 3_000_000_000)).unwrap();

        let totals = repo.monthly_totals(2025, None).unwrap();
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].1.men, 6_000_000_000);
        assert_eq!(totals[0].1.total(), 6_000_000_010);
    }
}
