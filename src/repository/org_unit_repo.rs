// ==========================================
// 教会行政管理系统 - 组织单元数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 对齐: org_unit 表
// ==========================================

use crate::domain::org::{NewOrgUnit, OrgUnit};
use crate::domain::types::OrgLevel;
use crate::repository::db_utils::{format_ts, normalize_opt, now_ts, parse_enum, parse_ts};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const ORG_UNIT_COLUMNS: &str = r#"
    id, level, name, code, leader,
    state_id, region_id, old_group_id, group_id,
    created_at, updated_at
"#;

// ==========================================
// OrgUnitRepository - 组织单元仓储
// ==========================================
pub struct OrgUnitRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OrgUnitRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增组织单元
    ///
    /// # 返回
    /// - Ok(id): 新记录ID
    /// - Err(UniqueConstraintViolation): 同层级名称/编码重复
    pub fn insert(&self, unit: &NewOrgUnit) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let now = format_ts(&now_ts());
        conn.execute(
            r#"
            INSERT INTO org_unit (
                level, name, code, leader,
                state_id, region_id, old_group_id, group_id,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            "#,
            params![
                unit.level.to_db_str(),
                unit.name.trim(),
                normalize_opt(unit.code.as_deref()),
                normalize_opt(unit.leader.as_deref()),
                unit.parents.state_id,
                unit.parents.region_id,
                unit.parents.old_group_id,
                unit.parents.group_id,
                now,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 更新组织单元（层级不可变）
    pub fn update(&self, id: i64, unit: &NewOrgUnit) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE org_unit SET
                name = ?2, code = ?3, leader = ?4,
                state_id = ?5, region_id = ?6, old_group_id = ?7, group_id = ?8,
                updated_at = ?9
            WHERE id = ?1 AND level = ?10
            "#,
            params![
                id,
                unit.name.trim(),
                normalize_opt(unit.code.as_deref()),
                normalize_opt(unit.leader.as_deref()),
                unit.parents.state_id,
                unit.parents.region_id,
                unit.parents.old_group_id,
                unit.parents.group_id,
                format_ts(&now_ts()),
                unit.level.to_db_str(),
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("OrgUnit", id));
        }
        Ok(())
    }

    /// 删除组织单元
    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM org_unit WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("OrgUnit", id));
        }
        Ok(())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<OrgUnit>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM org_unit WHERE id = ?1", ORG_UNIT_COLUMNS);
        let unit = conn
            .query_row(&sql, params![id], map_org_unit)
            .optional()?;
        Ok(unit)
    }

    /// 查询某层级全部单元（按名称排序）
    pub fn list_by_level(&self, level: OrgLevel) -> RepositoryResult<Vec<OrgUnit>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM org_unit WHERE level = ?1 ORDER BY name COLLATE NOCASE ASC",
            ORG_UNIT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let units = stmt
            .query_map(params![level.to_db_str()], map_org_unit)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(units)
    }

    /// 查询挂靠在某上级下的指定层级单元（级联下拉）
    pub fn find_children(
        &self,
        child_level: OrgLevel,
        parent_level: OrgLevel,
        parent_id: i64,
    ) -> RepositoryResult<Vec<OrgUnit>> {
        let column = parent_column(parent_level).ok_or_else(|| RepositoryError::FieldValueError {
            field: "parent_level".to_string(),
            message: format!("{} 不能作为上级", parent_level),
        })?;

        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM org_unit WHERE level = ?1 AND {} = ?2 ORDER BY name COLLATE NOCASE ASC",
            ORG_UNIT_COLUMNS, column
        );
        let mut stmt = conn.prepare(&sql)?;
        let units = stmt
            .query_map(params![child_level.to_db_str(), parent_id], map_org_unit)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(units)
    }

    /// 按名称查找（大小写不敏感）
    pub fn find_by_name(&self, level: OrgLevel, name: &str) -> RepositoryResult<Option<OrgUnit>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM org_unit WHERE level = ?1 AND name = ?2 COLLATE NOCASE",
            ORG_UNIT_COLUMNS
        );
        let unit = conn
            .query_row(&sql, params![level.to_db_str(), name.trim()], map_org_unit)
            .optional()?;
        Ok(unit)
    }

    /// 按编码查找（大小写不敏感）
    pub fn find_by_code(&self, level: OrgLevel, code: &str) -> RepositoryResult<Option<OrgUnit>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM org_unit WHERE level = ?1 AND code = ?2 COLLATE NOCASE",
            ORG_UNIT_COLUMNS
        );
        let unit = conn
            .query_row(&sql, params![level.to_db_str(), code.trim()], map_org_unit)
            .optional()?;
        Ok(unit)
    }

    /// 统计引用该单元的下级单元与出勤记录数
    pub fn count_dependents(&self, id: i64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            r#"
            SELECT
                (SELECT COUNT(*) FROM org_unit
                    WHERE state_id = ?1 OR region_id = ?1 OR old_group_id = ?1 OR group_id = ?1)
              + (SELECT COUNT(*) FROM attendance
                    WHERE state_id = ?1 OR region_id = ?1 OR group_id = ?1
                       OR old_group_id = ?1 OR district_id = ?1)
              + (SELECT COUNT(*) FROM youth_weekly_attendance
                    WHERE state_id = ?1 OR region_id = ?1 OR group_id = ?1 OR old_group_id = ?1)
              + (SELECT COUNT(*) FROM youth_revival_attendance
                    WHERE state_id = ?1 OR region_id = ?1)
            "#,
            params![id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// 各层级单元数量
    pub fn count_by_level(&self) -> RepositoryResult<Vec<(OrgLevel, i64)>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT level, COUNT(*) FROM org_unit GROUP BY level")?;
        let rows = stmt
            .query_map([], |row| {
                let level: String = row.get(0)?;
                Ok((parse_enum(0, &level, "组织层级", OrgLevel::parse)?, row.get(1)?))
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }
}

/// 上级层级对应的引用列
fn parent_column(level: OrgLevel) -> Option<&'static str> {
    match level {
        OrgLevel::State => Some("state_id"),
        OrgLevel::Region => Some("region_id"),
        OrgLevel::OldGroup => Some("old_group_id"),
        OrgLevel::Group => Some("group_id"),
        OrgLevel::District => None,
    }
}

fn map_org_unit(row: &Row<'_>) -> SqliteResult<OrgUnit> {
    let level: String = row.get(1)?;
    let created_at: String = row.get(9)?;
    let updated_at: String = row.get(10)?;
    Ok(OrgUnit {
        id: row.get(0)?,
        level: parse_enum(1, &level, "组织层级", OrgLevel::parse)?,
        name: row.get(2)?,
        code: row.get(3)?,
        leader: row.get(4)?,
        state_id: row.get(5)?,
        region_id: row.get(6)?,
        old_group_id: row.get(7)?,
        group_id: row.get(8)?,
        created_at: parse_ts(9, &created_at)?,
        updated_at: parse_ts(10, &updated_at)?,
    })
}
