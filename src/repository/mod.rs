// ==========================================
// 教会行政管理系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod action_log_repo;
pub mod admin_repo;
pub mod attendance_repo;
pub(crate) mod db_utils;
pub mod error;
pub mod import_batch_repo;
pub mod org_unit_repo;
pub mod youth_attendance_repo;

// 重导出核心仓储
pub use action_log_repo::ActionLogRepository;
pub use admin_repo::AdminRepository;
pub use attendance_repo::{AttendanceFilter, AttendanceRepository};
pub use error::{RepositoryError, RepositoryResult};
pub use import_batch_repo::ImportBatchRepository;
pub use org_unit_repo::OrgUnitRepository;
pub use youth_attendance_repo::{YouthFilter, YouthRevivalRepository, YouthWeeklyRepository};
