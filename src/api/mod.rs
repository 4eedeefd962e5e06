// ==========================================
// 教会行政管理系统 - API 层
// ==========================================
// 职责: 提供带校验、日志与操作记录的业务接口，供界面与命令行调用
// ==========================================

pub mod admin_api;
pub mod attendance_api;
pub mod dashboard_api;
pub mod error;
pub mod export_api;
pub mod import_api;
pub mod org_api;
pub mod support;
pub mod youth_attendance_api;

// 重导出核心类型
pub use admin_api::AdminApi;
pub use attendance_api::{AttendanceApi, AttendancePatch};
pub use dashboard_api::{CategorySlice, DashboardApi, MonthlyPoint, OrgCount};
pub use error::{ApiError, ApiResult};
pub use export_api::{ExportApi, ExportApiResponse};
pub use import_api::{ImportApi, ImportApiResponse};
pub use org_api::{OrgApi, OrgUnitPatch};
pub use support::{run_bulk, BulkOutcome};
pub use youth_attendance_api::{YouthAttendanceApi, YouthPatch};
