// ==========================================
// 教会行政管理系统 - CSV 导出 API
// ==========================================

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::error::ApiResult;
use crate::api::support::record_action;
use crate::domain::action_log::{entity, ActionType};
use crate::domain::types::OrgLevel;
use crate::exporter::CsvExporter;
use crate::i18n::t_with_args;
use crate::repository::{ActionLogRepository, AttendanceFilter};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportApiResponse {
    pub count: usize,
    pub message: String,
}

impl ExportApiResponse {
    fn new(count: usize, path: &Path) -> Self {
        let message = t_with_args(
            "export.done",
            &[
                ("count", count.to_string().as_str()),
                ("path", path.display().to_string().as_str()),
            ],
        );
        Self { count, message }
    }
}

pub struct ExportApi {
    exporter: Arc<CsvExporter>,
    action_log_repo: Arc<ActionLogRepository>,
}

impl ExportApi {
    pub fn new(exporter: Arc<CsvExporter>, action_log_repo: Arc<ActionLogRepository>) -> Self {
        Self {
            exporter,
            action_log_repo,
        }
    }

    pub fn export_org_units(&self, level: OrgLevel, path: &Path, actor: &str) -> ApiResult<ExportApiResponse> {
        let count = self.exporter.export_org_units(level, path)?;
        record_action(
            &self.action_log_repo,
            ActionType::Export,
            actor,
            entity::ORG_UNIT,
            None,
            Some(json!({ "level": level.to_db_str(), "count": count })),
            Some(path.display().to_string()),
        )?;
        Ok(ExportApiResponse::new(count, path))
    }

    pub fn export_attendance(
        &self,
        filter: &AttendanceFilter,
        path: &Path,
        actor: &str,
    ) -> ApiResult<ExportApiResponse> {
        let count = self.exporter.export_attendance(filter, path)?;
        record_action(
            &self.action_log_repo,
            ActionType::Export,
            actor,
            entity::ATTENDANCE,
            None,
            serde_json::to_value(filter).ok(),
            Some(path.display().to_string()),
        )?;
        Ok(ExportApiResponse::new(count, path))
    }
}
