// ==========================================
// 教会行政管理系统 - 组织单元领域模型
// ==========================================
// 覆盖: State / Region / OldGroup / Group / District
// 对齐: org_unit 表（level 区分层级）
// ==========================================

use crate::domain::types::OrgLevel;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// OrgUnit - 组织单元
// ==========================================
// 约束: 同层级内 name / code 大小写不敏感唯一
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgUnit {
    // ===== 主键 =====
    pub id: i64,
    pub level: OrgLevel,

    // ===== 基础信息 =====
    pub name: String,
    pub code: Option<String>,
    pub leader: Option<String>,

    // ===== 上级引用 =====
    pub state_id: Option<i64>,
    pub region_id: Option<i64>,
    pub old_group_id: Option<i64>,
    pub group_id: Option<i64>,

    // ===== 生命周期 =====
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl OrgUnit {
    /// 读取指定上级层级的引用
    pub fn parent_id(&self, parent: OrgLevel) -> Option<i64> {
        match parent {
            OrgLevel::State => self.state_id,
            OrgLevel::Region => self.region_id,
            OrgLevel::OldGroup => self.old_group_id,
            OrgLevel::Group => self.group_id,
            OrgLevel::District => None,
        }
    }

    /// 名称匹配（大小写不敏感，忽略首尾空白）
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(name.trim())
    }

    /// 编码匹配（大小写不敏感；任一侧为空则不匹配）
    pub fn code_matches(&self, code: Option<&str>) -> bool {
        match (self.code.as_deref(), code) {
            (Some(a), Some(b)) if !a.trim().is_empty() && !b.trim().is_empty() => {
                a.trim().eq_ignore_ascii_case(b.trim())
            }
            _ => false,
        }
    }
}

// ==========================================
// OrgParents - 上级引用集合
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgParents {
    pub state_id: Option<i64>,
    pub region_id: Option<i64>,
    pub old_group_id: Option<i64>,
    pub group_id: Option<i64>,
}

impl OrgParents {
    pub fn get(&self, level: OrgLevel) -> Option<i64> {
        match level {
            OrgLevel::State => self.state_id,
            OrgLevel::Region => self.region_id,
            OrgLevel::OldGroup => self.old_group_id,
            OrgLevel::Group => self.group_id,
            OrgLevel::District => None,
        }
    }

    pub fn set(&mut self, level: OrgLevel, id: Option<i64>) {
        match level {
            OrgLevel::State => self.state_id = id,
            OrgLevel::Region => self.region_id = id,
            OrgLevel::OldGroup => self.old_group_id = id,
            OrgLevel::Group => self.group_id = id,
            OrgLevel::District => {}
        }
    }

    /// 只保留目标层级允许的上级
    pub fn restricted_to(mut self, level: OrgLevel) -> Self {
        for parent in OrgLevel::ALL {
            if !level.accepts_parent(parent) {
                self.set(parent, None);
            }
        }
        self
    }
}

impl From<&OrgUnit> for OrgParents {
    fn from(unit: &OrgUnit) -> Self {
        Self {
            state_id: unit.state_id,
            region_id: unit.region_id,
            old_group_id: unit.old_group_id,
            group_id: unit.group_id,
        }
    }
}

// ==========================================
// NewOrgUnit - 待写入的组织单元
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrgUnit {
    pub level: OrgLevel,
    pub name: String,
    pub code: Option<String>,
    pub leader: Option<String>,
    pub parents: OrgParents,
}
