// ==========================================
// 教会行政管理系统 - 表格导入 API
// ==========================================
// 职责: 封装组织单元导入、多文件导入、批次查询
// ==========================================

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::ApiResult;
use crate::config::ConfigManager;
use crate::domain::import::{ImportBatch, ImportSummary};
use crate::domain::types::OrgLevel;
use crate::importer::{summary_line, OrgUnitImporter, OrgUnitImporterImpl};
use crate::repository::ImportBatchRepository;

/// 导入API响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportApiResponse {
    pub summary: ImportSummary,
    /// 本地化汇总提示
    pub message: String,
}

impl From<ImportSummary> for ImportApiResponse {
    fn from(summary: ImportSummary) -> Self {
        let message = summary_line(&summary);
        Self { summary, message }
    }
}

/// 导入API
pub struct ImportApi {
    importer: Arc<OrgUnitImporterImpl<ConfigManager>>,
    batch_repo: Arc<ImportBatchRepository>,
}

impl ImportApi {
    pub fn new(
        importer: Arc<OrgUnitImporterImpl<ConfigManager>>,
        batch_repo: Arc<ImportBatchRepository>,
    ) -> Self {
        Self {
            importer,
            batch_repo,
        }
    }

    /// 导入单个文件
    ///
    /// # 返回
    /// - Ok(ImportApiResponse): 行级错误包含在 summary.errors 中
    /// - Err(ApiError): 整文件级失败（文件不存在、格式不支持、超过行数上限等）
    pub async fn import_org_units(
        &self,
        level: OrgLevel,
        file_path: &Path,
        actor: &str,
    ) -> ApiResult<ImportApiResponse> {
        let summary = self.importer.import_file(level, file_path, actor).await?;
        Ok(summary.into())
    }

    /// 并发导入多个文件，单个文件失败不影响其他文件
    pub async fn import_many(
        &self,
        level: OrgLevel,
        file_paths: Vec<PathBuf>,
        actor: &str,
    ) -> Vec<Result<ImportApiResponse, String>> {
        let results = self.importer.import_many(level, file_paths, actor).await;
        info!(files = results.len(), "多文件导入结束");
        results.into_iter().map(|r| r.map(Into::into)).collect()
    }

    /// 最近的导入批次
    pub fn list_batches(&self, level: Option<OrgLevel>, limit: usize) -> ApiResult<Vec<ImportBatch>> {
        Ok(self.batch_repo.list_recent(level, limit)?)
    }
}
