// ==========================================
// 教会行政管理系统 - 操作日志领域模型
// ==========================================
// 红线: 所有写入必须记录
// 对齐: action_log 表
// ==========================================

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

// ==========================================
// ActionLog - 操作日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub action_id: String,        // 日志ID (uuid)
    pub action_type: String,      // 操作类型 (存储为字符串)
    pub action_ts: NaiveDateTime, // 操作时间戳
    pub actor: String,            // 操作人

    pub entity: String,         // 实体类型 (ORG_UNIT / ATTENDANCE / ...)
    pub entity_id: Option<i64>, // 实体ID (批量导入等场景可为空)

    pub payload_json: Option<JsonValue>, // 操作参数 (JSON)
    pub detail: Option<String>,          // 详细描述
}

impl ActionLog {
    /// 以当前时间构造一条日志
    pub fn now(
        action_type: ActionType,
        actor: &str,
        entity: &str,
        entity_id: Option<i64>,
        payload_json: Option<JsonValue>,
        detail: Option<String>,
    ) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            action_type: action_type.to_string(),
            action_ts: Utc::now().naive_utc(),
            actor: actor.to_string(),
            entity: entity.to_string(),
            entity_id,
            payload_json,
            detail,
        }
    }
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    Create,         // 新增
    Update,         // 修改
    Delete,         // 删除
    Import,         // 表格导入
    Export,         // 表格导出
    ChangePassword, // 修改密码
    Login,          // 登录
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionType::Create => "CREATE",
            ActionType::Update => "UPDATE",
            ActionType::Delete => "DELETE",
            ActionType::Import => "IMPORT",
            ActionType::Export => "EXPORT",
            ActionType::ChangePassword => "CHANGE_PASSWORD",
            ActionType::Login => "LOGIN",
        };
        write!(f, "{}", s)
    }
}

/// 日志中的实体名称
pub mod entity {
    pub const ORG_UNIT: &str = "ORG_UNIT";
    pub const ATTENDANCE: &str = "ATTENDANCE";
    pub const YOUTH_WEEKLY: &str = "YOUTH_WEEKLY_ATTENDANCE";
    pub const YOUTH_REVIVAL: &str = "YOUTH_REVIVAL_ATTENDANCE";
    pub const ADMIN: &str = "ADMIN_PROFILE";
}
