// ==========================================
// 教会行政管理系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑
// ==========================================

pub mod action_log;
pub mod admin;
pub mod attendance;
pub mod import;
pub mod org;
pub mod types;

// 重导出核心类型
pub use action_log::{ActionLog, ActionType};
pub use admin::{AdminDetails, AdminProfile, PasswordDigest};
pub use attendance::{
    Attendance, AttendanceCounts, AttendanceTotals, NewAttendance, NewYouthRevivalAttendance,
    NewYouthWeeklyAttendance, YouthRevivalAttendance, YouthWeeklyAttendance,
};
pub use import::{ImportBatch, ImportRowError, ImportSummary};
pub use org::{NewOrgUnit, OrgParents, OrgUnit};
pub use types::{AccessLevel, OrgLevel, ServiceType, YouthAttendanceType};
