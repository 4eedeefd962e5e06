// ==========================================
// 教会行政管理系统 - 管理员数据仓储
// ==========================================
// 对齐: admin_profile 表
// 红线: 密码摘要只在 find_credentials_by_email 中读出
// ==========================================

use crate::domain::admin::{AdminDetails, AdminProfile, PasswordDigest};
use crate::domain::types::AccessLevel;
use crate::repository::db_utils::{format_ts, now_ts, parse_enum, parse_ts};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const PROFILE_COLUMNS: &str = r#"
    id, name, email, phone, access_level,
    state_id, region_id, group_id, district_id,
    is_active, last_login_at, created_at, updated_at
"#;

// ==========================================
// AdminRepository - 管理员仓储
// ==========================================
pub struct AdminRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AdminRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新建管理员
    ///
    /// # 返回
    /// - `Ok(id)`: 新管理员ID
    /// - `Err(UniqueConstraintViolation)`: 邮箱已存在
    pub fn insert(&self, details: &AdminDetails, digest: &PasswordDigest) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let now = format_ts(&now_ts());
        conn.execute(
            r#"
            INSERT INTO admin_profile (
                name, email, phone, access_level,
                state_id, region_id, group_id, district_id,
                password_hash, password_salt, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 1, ?11, ?11)
            "#,
            params![
                details.name,
                details.email,
                details.phone,
                details.access_level.to_db_str(),
                details.state_id,
                details.region_id,
                details.group_id,
                details.district_id,
                digest.hash,
                digest.salt,
                now,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 更新资料（不含密码）
    pub fn update_details(&self, id: i64, details: &AdminDetails) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE admin_profile SET
                name = ?2, email = ?3, phone = ?4, access_level = ?5,
                state_id = ?6, region_id = ?7, group_id = ?8, district_id = ?9,
                updated_at = ?10
            WHERE id = ?1
            "#,
            params![
                id,
                details.name,
                details.email,
                details.phone,
                details.access_level.to_db_str(),
                details.state_id,
                details.region_id,
                details.group_id,
                details.district_id,
                format_ts(&now_ts()),
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("AdminProfile", id));
        }
        Ok(())
    }

    pub fn update_password(&self, id: i64, digest: &PasswordDigest) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE admin_profile SET password_hash = ?2, password_salt = ?3, updated_at = ?4 WHERE id = ?1",
            params![id, digest.hash, digest.salt, format_ts(&now_ts())],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("AdminProfile", id));
        }
        Ok(())
    }

    pub fn set_active(&self, id: i64, active: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE admin_profile SET is_active = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, active, format_ts(&now_ts())],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("AdminProfile", id));
        }
        Ok(())
    }

    pub fn touch_last_login(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "UPDATE admin_profile SET last_login_at = ?2 WHERE id = ?1",
            params![id, format_ts(&now_ts())],
        )?;
        Ok(())
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM admin_profile WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("AdminProfile", id));
        }
        Ok(())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<AdminProfile>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM admin_profile WHERE id = ?1", PROFILE_COLUMNS);
        Ok(conn.query_row(&sql, params![id], map_profile).optional()?)
    }

    /// 按邮箱查找（大小写不敏感）
    pub fn find_by_email(&self, email: &str) -> RepositoryResult<Option<AdminProfile>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM admin_profile WHERE email = ?1 COLLATE NOCASE",
            PROFILE_COLUMNS
        );
        Ok(conn
            .query_row(&sql, params![email.trim()], map_profile)
            .optional()?)
    }

    /// 登录校验用：档案 + 密码摘要
    pub fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> RepositoryResult<Option<(AdminProfile, PasswordDigest)>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {}, password_hash, password_salt FROM admin_profile WHERE email = ?1 COLLATE NOCASE",
            PROFILE_COLUMNS
        );
        Ok(conn
            .query_row(&sql, params![email.trim()], |row| {
                let profile = map_profile(row)?;
                let digest = PasswordDigest {
                    hash: row.get(13)?,
                    salt: row.get(14)?,
                };
                Ok((profile, digest))
            })
            .optional()?)
    }

    pub fn find_digest(&self, id: i64) -> RepositoryResult<Option<PasswordDigest>> {
        let conn = self.get_conn()?;
        Ok(conn
            .query_row(
                "SELECT password_hash, password_salt FROM admin_profile WHERE id = ?1",
                params![id],
                |row| {
                    Ok(PasswordDigest {
                        hash: row.get(0)?,
                        salt: row.get(1)?,
                    })
                },
            )
            .optional()?)
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<AdminProfile>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM admin_profile ORDER BY name COLLATE NOCASE, id",
            PROFILE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], map_profile)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM admin_profile", [], |row| row.get(0))?)
    }
}

fn map_profile(row: &Row<'_>) -> SqliteResult<AdminProfile> {
    let access_level: String = row.get(4)?;
    let last_login_at: Option<String> = row.get(10)?;
    let created_at: String = row.get(11)?;
    let updated_at: String = row.get(12)?;
    Ok(AdminProfile {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        access_level: parse_enum(4, &access_level, "权限级别", AccessLevel::parse)?,
        state_id: row.get(5)?,
        region_id: row.get(6)?,
        group_id: row.get(7)?,
        district_id: row.get(8)?,
        is_active: row.get(9)?,
        last_login_at: last_login_at.map(|ts| parse_ts(10, &ts)).transpose()?,
        created_at: parse_ts(11, &created_at)?,
        updated_at: parse_ts(12, &updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> AdminRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::apply_schema(&conn).unwrap();
        AdminRepository::new(Arc::new(Mutex::new(conn)))
    }

    fn details(email: &str) -> AdminDetails {
        AdminDetails {
            name: "Pastor Ade".to_string(),
            email: email.to_string(),
            phone: Some("+2348012345678".to_string()),
            access_level: AccessLevel::SuperAdmin,
            state_id: None,
            region_id: None,
            group_id: None,
            district_id: None,
        }
    }

    #[test]
    fn test_insert_and_credentials() {
        let repo = setup();
        let digest = PasswordDigest::generate("Secret#123");
        let id = repo.insert(&details("ade@church.org"), &digest).unwrap();

        let (profile, stored) = repo
            .find_credentials_by_email("ADE@church.org")
            .unwrap()
            .unwrap();
        assert_eq!(profile.id, id);
        assert!(profile.is_active);
        assert!(profile.last_login_at.is_none());
        assert!(stored.verify("Secret#123"));
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let repo = setup();
        let digest = PasswordDigest::generate("Secret#123");
        repo.insert(&details("ade@church.org"), &digest).unwrap();
        let err = repo
            .insert(&details("Ade@Church.org"), &digest)
            .unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
    }

    #[test]
    fn test_password_and_activation_updates() {
        let repo = setup();
        let id = repo
            .insert(&details("ade@church.org"), &PasswordDigest::generate("Secret#123"))
            .unwrap();

        repo.update_password(id, &PasswordDigest::generate("Newer#456"))
            .unwrap();
        assert!(repo.find_digest(id).unwrap().unwrap().verify("Newer#456"));

        repo.set_active(id, false).unwrap();
        repo.touch_last_login(id).unwrap();
        let profile = repo.find_by_id(id).unwrap().unwrap();
        assert!(!profile.is_active);
        assert!(profile.last_login_at.is_some());
    }

    #[test]
    fn test_missing_admin_not_found() {
        let repo = setup();
        assert!(matches!(
            repo.set_active(42, true),
            Err(RepositoryError::NotFound { .. })
        ));
        assert!(repo.find_by_email("ghost@church.org").unwrap().is_none());
    }
}
