// ==========================================
// 教会行政管理系统 - 管理员领域模型
// ==========================================
// 红线: 密码只以加盐摘要形式存在，不进入任何 DTO
// ==========================================

use crate::domain::types::AccessLevel;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// ==========================================
// AdminProfile - 管理员档案
// ==========================================
// 对齐: admin_profile 表（不含 password_hash / password_salt）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub access_level: AccessLevel,

    // ===== 权限范围 =====
    pub state_id: Option<i64>,
    pub region_id: Option<i64>,
    pub group_id: Option<i64>,
    pub district_id: Option<i64>,

    pub is_active: bool,
    pub last_login_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// 管理员资料（可编辑部分）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminDetails {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub access_level: AccessLevel,
    pub state_id: Option<i64>,
    pub region_id: Option<i64>,
    pub group_id: Option<i64>,
    pub district_id: Option<i64>,
}

// ==========================================
// PasswordDigest - 密码摘要
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordDigest {
    pub hash: String,
    pub salt: String,
}

impl PasswordDigest {
    /// 以随机盐生成摘要
    pub fn generate(password: &str) -> Self {
        let salt = uuid::Uuid::new_v4().simple().to_string();
        Self::with_salt(password, salt)
    }

    pub fn with_salt(password: &str, salt: String) -> Self {
        let hash = digest(&salt, password);
        Self { hash, salt }
    }

    pub fn verify(&self, password: &str) -> bool {
        digest(&self.salt, password) == self.hash
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
