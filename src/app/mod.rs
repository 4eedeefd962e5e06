// ==========================================
// 教会行政管理系统 - 应用层
// ==========================================
// 职责: 组装仓储、导入导出组件与 API
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
