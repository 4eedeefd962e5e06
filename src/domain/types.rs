// ==========================================
// 教会行政管理系统 - 领域类型定义
// ==========================================
// 职责: 组织层级、聚会类型、青年出勤类型、管理员权限级别
// 存储: 统一使用 SCREAMING_SNAKE_CASE 字符串落库
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 组织层级 (Org Level)
// ==========================================
// 层级关系: State → Region → OldGroup → Group → District
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrgLevel {
    State,    // 州
    Region,   // 大区
    OldGroup, // 旧组（历史分组）
    Group,    // 组
    District, // 区
}

impl OrgLevel {
    /// 全部层级（自上而下）
    pub const ALL: [OrgLevel; 5] = [
        OrgLevel::State,
        OrgLevel::Region,
        OrgLevel::OldGroup,
        OrgLevel::Group,
        OrgLevel::District,
    ];

    pub fn to_db_str(&self) -> &'static str {
        match self {
            OrgLevel::State => "STATE",
            OrgLevel::Region => "REGION",
            OrgLevel::OldGroup => "OLD_GROUP",
            OrgLevel::Group => "GROUP",
            OrgLevel::District => "DISTRICT",
        }
    }

    /// 从数据库字符串/命令行参数解析（大小写、空格、连字符不敏感）
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value
            .trim()
            .to_uppercase()
            .replace(['-', ' '], "_");
        match normalized.as_str() {
            "STATE" | "STATES" => Some(OrgLevel::State),
            "REGION" | "REGIONS" => Some(OrgLevel::Region),
            "OLD_GROUP" | "OLDGROUP" | "OLD_GROUPS" | "OLDGROUPS" => Some(OrgLevel::OldGroup),
            "GROUP" | "GROUPS" => Some(OrgLevel::Group),
            "DISTRICT" | "DISTRICTS" => Some(OrgLevel::District),
            _ => None,
        }
    }

    /// 表格中的列标签（导入/导出共用）
    pub fn column_label(&self) -> &'static str {
        match self {
            OrgLevel::State => "STATE",
            OrgLevel::Region => "REGION",
            OrgLevel::OldGroup => "OLD GROUP",
            OrgLevel::Group => "GROUP",
            OrgLevel::District => "DISTRICT",
        }
    }

    /// 该层级必须挂靠的上级
    pub fn required_parents(&self) -> &'static [OrgLevel] {
        match self {
            OrgLevel::State => &[],
            OrgLevel::Region => &[OrgLevel::State],
            OrgLevel::OldGroup => &[OrgLevel::State, OrgLevel::Region],
            OrgLevel::Group => &[OrgLevel::State, OrgLevel::Region],
            OrgLevel::District => &[OrgLevel::State, OrgLevel::Region, OrgLevel::Group],
        }
    }

    /// 该层级允许挂靠的上级（必填 + 可选）
    pub fn allowed_parents(&self) -> &'static [OrgLevel] {
        match self {
            OrgLevel::State => &[],
            OrgLevel::Region => &[OrgLevel::State],
            OrgLevel::OldGroup => &[OrgLevel::State, OrgLevel::Region],
            OrgLevel::Group => &[OrgLevel::State, OrgLevel::Region, OrgLevel::OldGroup],
            OrgLevel::District => &[
                OrgLevel::State,
                OrgLevel::Region,
                OrgLevel::OldGroup,
                OrgLevel::Group,
            ],
        }
    }

    /// 指定层级是否可作为本层级的上级
    pub fn accepts_parent(&self, parent: OrgLevel) -> bool {
        self.allowed_parents().contains(&parent)
    }
}

impl fmt::Display for OrgLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 聚会类型 (Service Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceType {
    SundayService,       // 主日崇拜
    HouseCaring,         // 家庭关怀聚会
    SearchTheScriptures, // 查经
    ThursdayRevival,     // 周四复兴聚会
    MondayBibleStudy,    // 周一查经
}

impl ServiceType {
    pub const ALL: [ServiceType; 5] = [
        ServiceType::SundayService,
        ServiceType::HouseCaring,
        ServiceType::SearchTheScriptures,
        ServiceType::ThursdayRevival,
        ServiceType::MondayBibleStudy,
    ];

    pub fn to_db_str(&self) -> &'static str {
        match self {
            ServiceType::SundayService => "SUNDAY_SERVICE",
            ServiceType::HouseCaring => "HOUSE_CARING",
            ServiceType::SearchTheScriptures => "SEARCH_THE_SCRIPTURES",
            ServiceType::ThursdayRevival => "THURSDAY_REVIVAL",
            ServiceType::MondayBibleStudy => "MONDAY_BIBLE_STUDY",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_uppercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|t| t.to_db_str() == normalized)
    }

    /// 导出文件中的可读名称
    pub fn label(&self) -> &'static str {
        match self {
            ServiceType::SundayService => "Sunday Service",
            ServiceType::HouseCaring => "House Caring",
            ServiceType::SearchTheScriptures => "Search The Scriptures",
            ServiceType::ThursdayRevival => "Thursday Revival",
            ServiceType::MondayBibleStudy => "Monday Bible Study",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 青年周出勤类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum YouthAttendanceType {
    Member,  // 会友
    Visitor, // 新朋友
}

impl YouthAttendanceType {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            YouthAttendanceType::Member => "MEMBER",
            YouthAttendanceType::Visitor => "VISITOR",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "MEMBER" => Some(YouthAttendanceType::Member),
            "VISITOR" => Some(YouthAttendanceType::Visitor),
            _ => None,
        }
    }
}

impl fmt::Display for YouthAttendanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 管理员权限级别 (Access Level)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessLevel {
    SuperAdmin,    // 全局
    StateAdmin,    // 州级
    RegionAdmin,   // 大区级
    GroupAdmin,    // 组级
    DistrictAdmin, // 区级
}

impl AccessLevel {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            AccessLevel::SuperAdmin => "SUPER_ADMIN",
            AccessLevel::StateAdmin => "STATE_ADMIN",
            AccessLevel::RegionAdmin => "REGION_ADMIN",
            AccessLevel::GroupAdmin => "GROUP_ADMIN",
            AccessLevel::DistrictAdmin => "DISTRICT_ADMIN",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().replace(['-', ' '], "_").as_str() {
            "SUPER_ADMIN" => Some(AccessLevel::SuperAdmin),
            "STATE_ADMIN" => Some(AccessLevel::StateAdmin),
            "REGION_ADMIN" => Some(AccessLevel::RegionAdmin),
            "GROUP_ADMIN" => Some(AccessLevel::GroupAdmin),
            "DISTRICT_ADMIN" => Some(AccessLevel::DistrictAdmin),
            _ => None,
        }
    }

    /// 该权限级别需要绑定的组织层级（SuperAdmin 不绑定）
    pub fn scope_level(&self) -> Option<OrgLevel> {
        match self {
            AccessLevel::SuperAdmin => None,
            AccessLevel::StateAdmin => Some(OrgLevel::State),
            AccessLevel::RegionAdmin => Some(OrgLevel::Region),
            AccessLevel::GroupAdmin => Some(OrgLevel::Group),
            AccessLevel::DistrictAdmin => Some(OrgLevel::District),
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}
