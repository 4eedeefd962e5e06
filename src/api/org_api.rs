// ==========================================
// 教会行政管理系统 - 组织单元 API
// ==========================================
// 职责: 州/大区/老组/组/区 的增删改查、级联选择、批量操作
// 规则: 层级创建后不可修改；仍有下级或出勤记录的单元不可删除
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::api::support::{
    check_org_refs, record_action, resolve_page_size, run_bulk, BulkOutcome,
};
use crate::config::ConfigManager;
use crate::domain::action_log::{entity, ActionType};
use crate::domain::org::{NewOrgUnit, OrgParents, OrgUnit};
use crate::domain::types::OrgLevel;
use crate::i18n::{t, t_with_args};
use crate::query::{ListQuery, Page};
use crate::repository::{ActionLogRepository, OrgUnitRepository, RepositoryError};
use crate::validation::OrgUnitForm;

// ==========================================
// OrgUnitPatch - 批量修改内容
// ==========================================
/// 仅 Some 的字段会被覆盖
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrgUnitPatch {
    pub leader: Option<String>,
    pub parents: OrgParents,
}

impl OrgUnitPatch {
    fn apply(&self, form: &mut OrgUnitForm) {
        if let Some(leader) = &self.leader {
            form.leader = Some(leader.clone());
        }
        for level in OrgLevel::ALL {
            if let Some(id) = self.parents.get(level) {
                form.parents.set(level, Some(id));
            }
        }
    }
}

// ==========================================
// OrgApi
// ==========================================
pub struct OrgApi {
    org_repo: Arc<OrgUnitRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    config: Arc<ConfigManager>,
}

impl OrgApi {
    pub fn new(
        org_repo: Arc<OrgUnitRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            org_repo,
            action_log_repo,
            config,
        }
    }

    // ==========================================
    // 查询接口
    // ==========================================

    pub fn get(&self, id: i64) -> ApiResult<OrgUnit> {
        self.org_repo
            .find_by_id(id)?
            .ok_or_else(|| RepositoryError::not_found("OrgUnit", id).into())
    }

    /// 列表页：搜索 → 排序 → 分页
    pub fn list(&self, level: OrgLevel, query: &ListQuery) -> ApiResult<Page<OrgUnit>> {
        let page_size = resolve_page_size(&self.config, query.page_size)?;
        let units = self.org_repo.list_by_level(level)?;
        debug!(level = %level, total = units.len(), "查询组织单元列表");
        Ok(query.run(units, page_size))
    }

    /// 级联选择：某上级下的指定层级单元
    ///
    /// # 参数
    /// - level: 要列出的层级
    /// - parent_id: 上级单元 id（层级由记录本身决定）
    pub fn children(&self, level: OrgLevel, parent_id: i64) -> ApiResult<Vec<OrgUnit>> {
        let parent = self.get(parent_id)?;
        if !level.accepts_parent(parent.level) {
            return Err(ApiError::InvalidInput(t_with_args(
                "validation.parent_not_allowed",
                &[
                    ("level", level.column_label()),
                    ("parent", parent.level.column_label()),
                ],
            )));
        }
        Ok(self.org_repo.find_children(level, parent.level, parent_id)?)
    }

    // ==========================================
    // 写入接口
    // ==========================================

    #[instrument(skip(self, form), fields(level = %form.level))]
    pub fn create(&self, form: OrgUnitForm, actor: &str) -> ApiResult<OrgUnit> {
        let unit = form.into_new()?;
        self.check_parents(&unit)?;

        let id = self.org_repo.insert(&unit)?;
        record_action(
            &self.action_log_repo,
            ActionType::Create,
            actor,
            entity::ORG_UNIT,
            Some(id),
            serde_json::to_value(&unit).ok(),
            Some(format!("{} {}", unit.level, unit.name)),
        )?;
        info!(id = id, name = %unit.name, "组织单元已创建");
        self.get(id)
    }

    #[instrument(skip(self, form))]
    pub fn update(&self, id: i64, form: OrgUnitForm, actor: &str) -> ApiResult<OrgUnit> {
        let existing = self.get(id)?;
        if existing.level != form.level {
            return Err(ApiError::BusinessRuleViolation(t("org.level_immutable")));
        }
        let unit = form.into_new()?;
        self.check_parents(&unit)?;

        self.org_repo.update(id, &unit)?;
        record_action(
            &self.action_log_repo,
            ActionType::Update,
            actor,
            entity::ORG_UNIT,
            Some(id),
            serde_json::to_value(&unit).ok(),
            None,
        )?;
        info!(id = id, "组织单元已更新");
        self.get(id)
    }

    #[instrument(skip(self))]
    pub fn delete(&self, id: i64, actor: &str) -> ApiResult<()> {
        let existing = self.get(id)?;
        let dependents = self.org_repo.count_dependents(id)?;
        if dependents > 0 {
            return Err(ApiError::BusinessRuleViolation(t_with_args(
                "org.has_dependents",
                &[
                    ("name", existing.name.as_str()),
                    ("count", dependents.to_string().as_str()),
                ],
            )));
        }

        self.org_repo.delete(id)?;
        record_action(
            &self.action_log_repo,
            ActionType::Delete,
            actor,
            entity::ORG_UNIT,
            Some(id),
            Some(json!({ "level": existing.level.to_db_str(), "name": existing.name })),
            None,
        )?;
        info!(id = id, "组织单元已删除");
        Ok(())
    }

    // ==========================================
    // 批量操作
    // ==========================================

    pub fn bulk_delete(&self, ids: &[i64], actor: &str) -> BulkOutcome {
        let outcome = run_bulk(ids, |id| self.delete(id, actor));
        info!(
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "批量删除组织单元完成"
        );
        outcome
    }

    /// 批量修改负责人 / 上级
    pub fn bulk_update(&self, ids: &[i64], patch: &OrgUnitPatch, actor: &str) -> BulkOutcome {
        let outcome = run_bulk(ids, |id| {
            let existing = self.get(id)?;
            let mut form = OrgUnitForm::from(&existing);
            patch.apply(&mut form);
            self.update(id, form, actor).map(|_| ())
        });
        info!(
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "批量修改组织单元完成"
        );
        outcome
    }

    /// 上级 id 必须存在且层级匹配
    fn check_parents(&self, unit: &NewOrgUnit) -> ApiResult<()> {
        let refs: Vec<(OrgLevel, Option<i64>)> = unit
            .level
            .allowed_parents()
            .iter()
            .map(|parent| (*parent, unit.parents.get(*parent)))
            .collect();
        check_org_refs(&self.org_repo, &refs)
    }
}
