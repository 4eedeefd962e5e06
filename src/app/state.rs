// ==========================================
// 教会行政管理系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 约定: 进程内共享一个 SQLite 连接
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::{
    AdminApi, AttendanceApi, DashboardApi, ExportApi, ImportApi, OrgApi, YouthAttendanceApi,
};
use crate::config::config_manager::ConfigManager;
use crate::db::{apply_schema, open_sqlite_connection};
use crate::exporter::CsvExporter;
use crate::importer::OrgUnitImporterImpl;
use crate::repository::{
    ActionLogRepository, AdminRepository, AttendanceRepository, ImportBatchRepository,
    OrgUnitRepository, YouthRevivalRepository, YouthWeeklyRepository,
};

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 组织单元API（州/大区/老组/组/区）
    pub org_api: Arc<OrgApi>,

    /// 聚会出勤API
    pub attendance_api: Arc<AttendanceApi>,

    /// 青年出勤API
    pub youth_attendance_api: Arc<YouthAttendanceApi>,

    /// 管理员API
    pub admin_api: Arc<AdminApi>,

    /// 表格导入API
    pub import_api: Arc<ImportApi>,

    /// CSV 导出API
    pub export_api: Arc<ExportApi>,

    /// 仪表盘API
    pub dashboard_api: Arc<DashboardApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（不存在则创建并建表）
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        apply_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;

        Self::from_connection(db_path, Arc::new(Mutex::new(conn)))
    }

    /// 基于已建表的连接组装所有API
    pub fn from_connection(db_path: String, conn: Arc<Mutex<Connection>>) -> Result<Self, String> {
        // ==========================================
        // 初始化Repository层
        // ==========================================
        let org_repo = Arc::new(OrgUnitRepository::new(conn.clone()));
        let attendance_repo = Arc::new(AttendanceRepository::new(conn.clone()));
        let weekly_repo = Arc::new(YouthWeeklyRepository::new(conn.clone()));
        let revival_repo = Arc::new(YouthRevivalRepository::new(conn.clone()));
        let admin_repo = Arc::new(AdminRepository::new(conn.clone()));
        let action_log_repo = Arc::new(ActionLogRepository::new(conn.clone()));
        let batch_repo = Arc::new(ImportBatchRepository::new(conn.clone()));

        // 配置管理器
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        match config_manager.get_locale() {
            Ok(locale) => crate::i18n::apply_locale(&locale),
            Err(e) => tracing::warn!("界面语言读取失败(使用默认): {}", e),
        }

        // ==========================================
        // 初始化导入导出组件
        // ==========================================
        let importer = Arc::new(OrgUnitImporterImpl::new(
            org_repo.clone(),
            batch_repo.clone(),
            action_log_repo.clone(),
            config_manager.clone(),
        ));
        let exporter = Arc::new(CsvExporter::new(org_repo.clone(), attendance_repo.clone()));

        // ==========================================
        // 初始化API层
        // ==========================================
        let org_api = Arc::new(OrgApi::new(
            org_repo.clone(),
            action_log_repo.clone(),
            config_manager.clone(),
        ));
        let attendance_api = Arc::new(AttendanceApi::new(
            attendance_repo.clone(),
            org_repo.clone(),
            action_log_repo.clone(),
            config_manager.clone(),
        ));
        let youth_attendance_api = Arc::new(YouthAttendanceApi::new(
            weekly_repo,
            revival_repo,
            org_repo.clone(),
            action_log_repo.clone(),
            config_manager.clone(),
        ));
        let admin_api = Arc::new(AdminApi::new(
            admin_repo,
            action_log_repo.clone(),
            config_manager.clone(),
        ));
        let import_api = Arc::new(ImportApi::new(importer, batch_repo));
        let export_api = Arc::new(ExportApi::new(exporter, action_log_repo.clone()));
        let dashboard_api = Arc::new(DashboardApi::new(org_repo, attendance_repo, action_log_repo));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            org_api,
            attendance_api,
            youth_attendance_api,
            admin_api,
            import_api,
            export_api,
            dashboard_api,
            config_manager,
        })
    }
}

/// 默认数据库路径
///
/// 优先级: 环境变量 CHURCH_ADMIN_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("CHURCH_ADMIN_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./church_admin.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("church-admin");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("church_admin.db");
        }
    }

    path.to_string_lossy().to_string()
}
