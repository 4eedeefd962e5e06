// ==========================================
// 教会行政管理系统 - 组织单元导入器实现
// ==========================================
// 职责: 整合导入流程，从文件到数据库
// 流程: 解析 → 映射 → 重名检测 → 上级解析 → 新增/更新 → 批次记录
// 红线: 行级错误只收集，不中断整批
// ==========================================

use crate::config::{config_keys, ImportConfigReader};
use crate::domain::action_log::{entity, ActionLog, ActionType};
use crate::domain::import::{ImportBatch, ImportRowError, ImportSummary};
use crate::domain::org::{NewOrgUnit, OrgParents, OrgUnit};
use crate::domain::types::OrgLevel;
use crate::i18n::t_with_args;
use crate::importer::conflict_handler::ConflictHandler as ConflictHandlerImpl;
use crate::importer::data_cleaner::DataCleaner as DataCleanerImpl;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{FieldMapper, OrgUnitRow};
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::org_importer_trait::{
    ConflictHandler, DataCleaner, FileParser, OrgUnitImporter,
};
use crate::importer::parent_resolver::ParentResolver;
use crate::repository::{
    ActionLogRepository, ImportBatchRepository, OrgUnitRepository, RepositoryResult,
};
use chrono::Utc;
use serde_json::json;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// 单行写入结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpsertOutcome {
    Added,
    Updated,
}

/// 汇总提示语（本地化）
pub fn summary_line(summary: &ImportSummary) -> String {
    t_with_args(
        "import.summary",
        &[
            ("added", summary.added.to_string().as_str()),
            ("updated", summary.updated.to_string().as_str()),
            ("errors", summary.error_count().to_string().as_str()),
        ],
    )
}

// ==========================================
// OrgUnitImporterImpl - 组织单元导入器实现
// ==========================================
pub struct OrgUnitImporterImpl<C>
where
    C: ImportConfigReader,
{
    // 数据访问层
    org_repo: Arc<OrgUnitRepository>,
    batch_repo: Arc<ImportBatchRepository>,
    action_log_repo: Arc<ActionLogRepository>,

    // 配置读取器
    config: Arc<C>,

    // 导入组件
    file_parser: Box<dyn FileParser>,
    data_cleaner: Box<dyn DataCleaner>,
    conflict_handler: Box<dyn ConflictHandler>,
}

impl<C> OrgUnitImporterImpl<C>
where
    C: ImportConfigReader,
{
    /// 使用默认组件创建导入器
    pub fn new(
        org_repo: Arc<OrgUnitRepository>,
        batch_repo: Arc<ImportBatchRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        config: Arc<C>,
    ) -> Self {
        Self::with_components(
            org_repo,
            batch_repo,
            action_log_repo,
            config,
            Box::new(UniversalFileParser),
            Box::new(DataCleanerImpl),
            Box::new(ConflictHandlerImpl),
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn with_components(
        org_repo: Arc<OrgUnitRepository>,
        batch_repo: Arc<ImportBatchRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        config: Arc<C>,
        file_parser: Box<dyn FileParser>,
        data_cleaner: Box<dyn DataCleaner>,
        conflict_handler: Box<dyn ConflictHandler>,
    ) -> Self {
        Self {
            org_repo,
            batch_repo,
            action_log_repo,
            config,
            file_parser,
            data_cleaner,
            conflict_handler,
        }
    }

    /// 按名称、再按编码查找已有单元
    fn find_existing(&self, level: OrgLevel, row: &OrgUnitRow) -> RepositoryResult<Option<OrgUnit>> {
        if let Some(unit) = self.org_repo.find_by_name(level, &row.name)? {
            return Ok(Some(unit));
        }
        match &row.code {
            Some(code) => self.org_repo.find_by_code(level, code),
            None => Ok(None),
        }
    }

    /// 新增或更新一行；更新时空单元格保留原值
    fn upsert_row(
        &self,
        level: OrgLevel,
        row: &OrgUnitRow,
        parents: OrgParents,
        update_existing: bool,
    ) -> Result<UpsertOutcome, ImportRowError> {
        let row_error = |message: String| ImportRowError {
            row: row.row_number,
            name: Some(row.name.clone()),
            message,
        };

        let existing = self
            .find_existing(level, row)
            .map_err(|e| row_error(e.to_string()))?;

        match existing {
            Some(unit) => {
                if !update_existing {
                    return Err(row_error(t_with_args(
                        "import.already_exists",
                        &[("name", unit.name.as_str())],
                    )));
                }

                let mut merged = OrgParents::from(&unit);
                for parent in level.allowed_parents() {
                    if let Some(id) = parents.get(*parent) {
                        merged.set(*parent, Some(id));
                    }
                }
                let update = NewOrgUnit {
                    level,
                    name: row.name.clone(),
                    code: row.code.clone().or(unit.code.clone()),
                    leader: row.leader.clone().or(unit.leader.clone()),
                    parents: merged.restricted_to(level),
                };
                self.org_repo
                    .update(unit.id, &update)
                    .map_err(|e| row_error(e.to_string()))?;
                debug!(row = row.row_number, id = unit.id, "已更新");
                Ok(UpsertOutcome::Updated)
            }
            None => {
                let new = NewOrgUnit {
                    level,
                    name: row.name.clone(),
                    code: row.code.clone(),
                    leader: row.leader.clone(),
                    parents: parents.restricted_to(level),
                };
                let id = self
                    .org_repo
                    .insert(&new)
                    .map_err(|e| row_error(e.to_string()))?;
                debug!(row = row.row_number, id = id, "已新增");
                Ok(UpsertOutcome::Added)
            }
        }
    }

    fn config_error(key: &str, err: impl std::fmt::Display) -> ImportError {
        ImportError::ConfigReadError {
            key: key.to_string(),
            message: err.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl<C> OrgUnitImporter for OrgUnitImporterImpl<C>
where
    C: ImportConfigReader + Send + Sync,
{
    #[instrument(skip(self, file_path, actor), fields(level = %level))]
    async fn import_file(
        &self,
        level: OrgLevel,
        file_path: &Path,
        actor: &str,
    ) -> ImportResult<ImportSummary> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        info!(batch_id = %batch_id, file = %file_path.display(), "开始导入组织单元");

        // === 步骤 1: 解析文件 ===
        let table = self.file_parser.parse_to_raw_table(file_path).map_err(|e| {
            error!(error = %e, "文件解析失败");
            e
        })?;
        let total_rows = table.rows.len();
        if total_rows == 0 {
            return Err(ImportError::EmptyFile);
        }

        let max_rows = self
            .config
            .get_max_rows()
            .await
            .map_err(|e| Self::config_error(config_keys::IMPORT_MAX_ROWS, e))?;
        if total_rows > max_rows {
            return Err(ImportError::TooManyRows {
                rows: total_rows,
                max: max_rows,
            });
        }
        let update_existing = self
            .config
            .get_update_existing()
            .await
            .map_err(|e| Self::config_error(config_keys::IMPORT_UPDATE_EXISTING, e))?;
        info!(total_rows = total_rows, update_existing = update_existing, "文件解析完成");

        // === 步骤 2: 字段映射 ===
        let cleaner = self.data_cleaner.as_ref();
        let mapper = FieldMapper::new(level, &table.headers, cleaner);
        let missing = mapper.missing_columns();
        if !missing.is_empty() {
            warn!(missing = ?missing, "缺少必填列，所有行将记为错误");
        }

        let mut errors: Vec<ImportRowError> = Vec::new();
        let mut rows = Vec::with_capacity(total_rows);
        for raw in &table.rows {
            match mapper.map_row(raw, cleaner) {
                Ok(row) => rows.push(row),
                Err(e) => errors.push(e),
            }
        }
        debug!(mapped = rows.len(), failed = errors.len(), "字段映射完成");

        // === 步骤 3: 同批次重名 ===
        let duplicates = self.conflict_handler.detect_duplicates(&rows);
        let skipped: HashSet<usize> = duplicates
            .iter()
            .flat_map(|g| g.duplicate_rows.iter().copied())
            .collect();
        for group in &duplicates {
            let row_list = group
                .all_rows()
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            errors.push(ImportRowError {
                row: group.duplicate_rows.first().copied().unwrap_or(group.first_row),
                name: Some(group.name.clone()),
                message: t_with_args(
                    "import.duplicate_name",
                    &[("name", group.name.as_str()), ("rows", row_list.as_str())],
                ),
            });
        }
        rows.retain(|r| !skipped.contains(&r.row_number));
        if !duplicates.is_empty() {
            warn!(names = duplicates.len(), skipped = skipped.len(), "同批次存在重名");
        }

        // === 步骤 4/5: 上级解析 + 新增/更新 ===
        let resolver = ParentResolver::load(&self.org_repo, level)?;
        let (mut added, mut updated) = (0usize, 0usize);
        for row in &rows {
            let parents = match resolver.resolve(row) {
                Ok(parents) => parents,
                Err(e) => {
                    errors.push(e);
                    continue;
                }
            };
            match self.upsert_row(level, row, parents, update_existing) {
                Ok(UpsertOutcome::Added) => added += 1,
                Ok(UpsertOutcome::Updated) => updated += 1,
                Err(e) => errors.push(e),
            }
        }
        errors.sort_by_key(|e| e.row);

        let summary = ImportSummary {
            batch_id: batch_id.clone(),
            level,
            total_rows,
            added,
            updated,
            errors,
            elapsed_ms: start_time.elapsed().as_millis(),
        };

        // === 步骤 6: 批次与日志 ===
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string());
        self.batch_repo.insert(&ImportBatch {
            batch_id: batch_id.clone(),
            level,
            file_name: file_name.clone(),
            total_rows: total_rows as i64,
            added: added as i64,
            updated: updated as i64,
            errors: summary.error_count() as i64,
            imported_by: actor.to_string(),
            imported_at: Utc::now(),
            elapsed_ms: summary.elapsed_ms as i64,
            errors_json: serde_json::to_string(&summary.errors).ok(),
        })?;

        let line = summary_line(&summary);
        self.action_log_repo.insert(&ActionLog::now(
            ActionType::Import,
            actor,
            entity::ORG_UNIT,
            None,
            Some(json!({
                "batch_id": batch_id,
                "level": level.to_db_str(),
                "file_name": file_name,
                "added": added,
                "updated": updated,
                "errors": summary.error_count(),
            })),
            Some(line.clone()),
        ))?;

        info!(
            batch_id = %summary.batch_id,
            added = added,
            updated = updated,
            errors = summary.error_count(),
            elapsed_ms = summary.elapsed_ms as u64,
            "{}",
            line
        );
        Ok(summary)
    }

    async fn import_many(
        &self,
        level: OrgLevel,
        file_paths: Vec<PathBuf>,
        actor: &str,
    ) -> Vec<Result<ImportSummary, String>> {
        use futures::future::join_all;

        info!(count = file_paths.len(), level = %level, "开始批量导入文件");

        // 为每个文件创建导入任务
        let import_tasks = file_paths.into_iter().map(|path| async move {
            let path_str = path.display().to_string();
            match self.import_file(level, &path, actor).await {
                Ok(summary) => {
                    info!(file = %path_str, added = summary.added, "文件导入成功");
                    Ok(summary)
                }
                Err(e) => {
                    error!(file = %path_str, error = %e, "文件导入失败");
                    Err(format!("{}: {}", path_str, e.localized()))
                }
            }
        });

        // 并发执行所有导入任务
        let results = join_all(import_tasks).await;

        info!(
            total = results.len(),
            success = results.iter().filter(|r| r.is_ok()).count(),
            failed = results.iter().filter(|r| r.is_err()).count(),
            "批量导入完成"
        );

        results
    }
}
