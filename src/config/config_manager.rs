// ==========================================
// 教会行政管理系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (key-value)
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        crate::db::apply_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入配置值（存在则覆盖）
    pub fn set_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(config_key = key, value = value, "配置已更新");
        Ok(())
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 读取数值配置，格式错误时回退默认值
    fn get_parsed_or<T: std::str::FromStr + Copy + std::fmt::Display>(
        &self,
        key: &str,
        default: T,
    ) -> ConfigResult<T> {
        let raw = self.get_config_or_default(key, &default.to_string())?;
        Ok(raw.trim().parse::<T>().unwrap_or_else(|_| {
            tracing::warn!(config_key = key, raw_value = %raw, "配置格式错误，使用默认值");
            default
        }))
    }

    /// 获取所有配置的快照
    pub fn get_config_snapshot(&self) -> ConfigResult<BTreeMap<String, String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let mut stmt = conn.prepare("SELECT key, value FROM config_kv ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut map = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            map.insert(key, value);
        }
        Ok(map)
    }

    // ===== 列表配置 =====

    /// 默认每页条数（默认 10）
    pub fn get_default_page_size(&self) -> ConfigResult<usize> {
        let size = self.get_parsed_or(config_keys::LIST_DEFAULT_PAGE_SIZE, 10usize)?;
        Ok(if size == 0 { 10 } else { size })
    }

    /// 每页条数上限（默认 100）
    pub fn get_max_page_size(&self) -> ConfigResult<usize> {
        let size = self.get_parsed_or(config_keys::LIST_MAX_PAGE_SIZE, 100usize)?;
        Ok(if size == 0 { 100 } else { size })
    }

    /// 把调用方给的 page_size 规整到 [1, max]，0 或缺省取默认值
    pub fn resolve_page_size(&self, requested: Option<usize>) -> ConfigResult<usize> {
        let max = self.get_max_page_size()?;
        match requested {
            Some(size) if size > 0 => Ok(size.min(max)),
            _ => Ok(self.get_default_page_size()?.min(max)),
        }
    }

    // ===== 账号配置 =====

    /// 密码最小长度（默认 8）
    pub fn get_password_min_length(&self) -> ConfigResult<usize> {
        self.get_parsed_or(config_keys::PASSWORD_MIN_LENGTH, 8usize)
    }

    // ===== 界面配置 =====

    pub fn get_locale(&self) -> ConfigResult<String> {
        self.get_config_or_default(config_keys::UI_LOCALE, "en")
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_max_rows(&self) -> ConfigResult<usize> {
        self.get_parsed_or(config_keys::IMPORT_MAX_ROWS, 5000usize)
    }

    async fn get_update_existing(&self) -> ConfigResult<bool> {
        let value = self.get_config_or_default(config_keys::IMPORT_UPDATE_EXISTING, "true")?;
        Ok(!matches!(
            value.trim().to_lowercase().as_str(),
            "false" | "0" | "no" | "off"
        ))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 列表
    pub const LIST_DEFAULT_PAGE_SIZE: &str = "list.default_page_size";
    pub const LIST_MAX_PAGE_SIZE: &str = "list.max_page_size";

    // 导入
    pub const IMPORT_MAX_ROWS: &str = "import.max_rows";
    pub const IMPORT_UPDATE_EXISTING: &str = "import.update_existing";

    // 账号
    pub const PASSWORD_MIN_LENGTH: &str = "password.min_length";

    // 界面
    pub const UI_LOCALE: &str = "ui.locale";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::apply_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[tokio::test]
    async fn test_defaults() {
        let config = manager();
        assert_eq!(config.get_default_page_size().unwrap(), 10);
        assert_eq!(config.get_max_page_size().unwrap(), 100);
        assert_eq!(config.get_password_min_length().unwrap(), 8);
        assert_eq!(config.get_locale().unwrap(), "en");
        assert_eq!(config.get_max_rows().await.unwrap(), 5000);
        assert!(config.get_update_existing().await.unwrap());
    }

    #[tokio::test]
    async fn test_overrides_and_bad_values() {
        let config = manager();
        config
            .set_config_value(config_keys::IMPORT_UPDATE_EXISTING, "false")
            .unwrap();
        config
            .set_config_value(config_keys::PASSWORD_MIN_LENGTH, "abc")
            .unwrap();
        config
            .set_config_value(config_keys::LIST_MAX_PAGE_SIZE, "25")
            .unwrap();

        assert!(!config.get_update_existing().await.unwrap());
        assert_eq!(config.get_password_min_length().unwrap(), 8);
        assert_eq!(config.resolve_page_size(Some(500)).unwrap(), 25);
        assert_eq!(config.resolve_page_size(Some(0)).unwrap(), 10);
        assert_eq!(config.resolve_page_size(None).unwrap(), 10);
        assert_eq!(config.get_config_snapshot().unwrap().len(), 3);
    }
}
