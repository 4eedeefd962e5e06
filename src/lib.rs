// ==========================================
// 教会行政管理系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 教会行政仪表盘的数据核心（界面之下的一层）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// 表单校验
pub mod validation;

// 列表查询 - 搜索/排序/分页
pub mod query;

// 内存状态 - 集合镜像/选中/快照
pub mod store;

// 导入层 - 表格数据
pub mod importer;

// 导出层 - CSV
pub mod exporter;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AccessLevel, OrgLevel, ServiceType, YouthAttendanceType};

// 领域实体
pub use domain::{
    ActionLog, ActionType, AdminProfile, Attendance, ImportSummary, OrgUnit,
    YouthRevivalAttendance, YouthWeeklyAttendance,
};

// API
pub use api::{
    AdminApi, ApiError, ApiResult, AttendanceApi, BulkOutcome, DashboardApi, ExportApi,
    ImportApi, OrgApi, YouthAttendanceApi,
};

// 列表与状态
pub use query::{ListQuery, Page, SortDirection, SortState};
pub use store::EntityStore;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "教会行政管理系统";
