// ==========================================
// 教会行政管理系统 - 青年出勤 API
// ==========================================
// 覆盖: 青年周出勤 / 青年复兴会出勤
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::api::error::ApiResult;
use crate::api::support::{
    check_org_refs, record_action, resolve_page_size, run_bulk, BulkOutcome,
};
use crate::config::ConfigManager;
use crate::domain::action_log::{entity, ActionType};
use crate::domain::attendance::{
    NewYouthRevivalAttendance, NewYouthWeeklyAttendance, YouthRevivalAttendance,
    YouthWeeklyAttendance,
};
use crate::domain::types::OrgLevel;
use crate::query::{ListQuery, Page};
use crate::repository::{
    ActionLogRepository, OrgUnitRepository, RepositoryError, YouthFilter, YouthRevivalRepository,
    YouthWeeklyRepository,
};
use crate::validation::{YouthRevivalForm, YouthWeeklyForm};

/// 青年出勤批量修改（统计周期）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YouthPatch {
    pub year: Option<i32>,
    pub month: Option<i64>,
    /// 仅对周出勤生效
    pub week: Option<i64>,
}

pub struct YouthAttendanceApi {
    weekly_repo: Arc<YouthWeeklyRepository>,
    revival_repo: Arc<YouthRevivalRepository>,
    org_repo: Arc<OrgUnitRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    config: Arc<ConfigManager>,
}

impl YouthAttendanceApi {
    pub fn new(
        weekly_repo: Arc<YouthWeeklyRepository>,
        revival_repo: Arc<YouthRevivalRepository>,
        org_repo: Arc<OrgUnitRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            weekly_repo,
            revival_repo,
            org_repo,
            action_log_repo,
            config,
        }
    }

    fn check_weekly_units(&self, record: &NewYouthWeeklyAttendance) -> ApiResult<()> {
        check_org_refs(
            &self.org_repo,
            &[
                (OrgLevel::State, Some(record.state_id)),
                (OrgLevel::Region, Some(record.region_id)),
                (OrgLevel::OldGroup, record.old_group_id),
                (OrgLevel::Group, Some(record.group_id)),
            ],
        )
    }

    fn check_revival_units(&self, record: &NewYouthRevivalAttendance) -> ApiResult<()> {
        check_org_refs(
            &self.org_repo,
            &[
                (OrgLevel::State, Some(record.state_id)),
                (OrgLevel::Region, Some(record.region_id)),
            ],
        )
    }

    fn log(&self, action: ActionType, actor: &str, entity: &str, id: i64, payload: Option<serde_json::Value>) -> ApiResult<()> {
        record_action(&self.action_log_repo, action, actor, entity, Some(id), payload, None)
    }

    // ==========================================
    // 青年周出勤
    // ==========================================

    pub fn get_weekly(&self, id: i64) -> ApiResult<YouthWeeklyAttendance> {
        self.weekly_repo
            .find_by_id(id)?
            .ok_or_else(|| RepositoryError::not_found("YouthWeeklyAttendance", id).into())
    }

    pub fn list_weekly(&self, filter: &YouthFilter, query: &ListQuery) -> ApiResult<Page<YouthWeeklyAttendance>> {
        let page_size = resolve_page_size(&self.config, query.page_size)?;
        Ok(query.run(self.weekly_repo.list(filter)?, page_size))
    }

    #[instrument(skip(self, form))]
    pub fn create_weekly(&self, form: YouthWeeklyForm, actor: &str) -> ApiResult<YouthWeeklyAttendance> {
        let record = form.into_new()?;
        self.check_weekly_units(&record)?;
        let id = self.weekly_repo.insert(&record)?;
        self.log(ActionType::Create, actor, entity::YOUTH_WEEKLY, id, serde_json::to_value(&record).ok())?;
        info!(id = id, "青年周出勤已创建");
        self.get_weekly(id)
    }

    #[instrument(skip(self, form))]
    pub fn update_weekly(&self, id: i64, form: YouthWeeklyForm, actor: &str) -> ApiResult<YouthWeeklyAttendance> {
        let record = form.into_new()?;
        self.check_weekly_units(&record)?;
        self.weekly_repo.update(id, &record)?;
        self.log(ActionType::Update, actor, entity::YOUTH_WEEKLY, id, serde_json::to_value(&record).ok())?;
        self.get_weekly(id)
    }

    pub fn delete_weekly(&self, id: i64, actor: &str) -> ApiResult<()> {
        self.weekly_repo.delete(id)?;
        self.log(ActionType::Delete, actor, entity::YOUTH_WEEKLY, id, None)
    }

    pub fn bulk_delete_weekly(&self, ids: &[i64], actor: &str) -> BulkOutcome {
        run_bulk(ids, |id| self.delete_weekly(id, actor))
    }

    pub fn bulk_update_weekly(&self, ids: &[i64], patch: &YouthPatch, actor: &str) -> BulkOutcome {
        run_bulk(ids, |id| {
            let mut form = YouthWeeklyForm::from(&self.get_weekly(id)?);
            if let Some(year) = patch.year {
                form.year = year;
            }
            if let Some(month) = patch.month {
                form.month = month;
            }
            if let Some(week) = patch.week {
                form.week = week;
            }
            self.update_weekly(id, form, actor).map(|_| ())
        })
    }

    // ==========================================
    // 青年复兴会出勤
    // ==========================================

    pub fn get_revival(&self, id: i64) -> ApiResult<YouthRevivalAttendance> {
        self.revival_repo
            .find_by_id(id)?
            .ok_or_else(|| RepositoryError::not_found("YouthRevivalAttendance", id).into())
    }

    pub fn list_revival(&self, filter: &YouthFilter, query: &ListQuery) -> ApiResult<Page<YouthRevivalAttendance>> {
        let page_size = resolve_page_size(&self.config, query.page_size)?;
        Ok(query.run(self.revival_repo.list(filter)?, page_size))
    }

    #[instrument(skip(self, form))]
    pub fn create_revival(&self, form: YouthRevivalForm, actor: &str) -> ApiResult<YouthRevivalAttendance> {
        let record = form.into_new()?;
        self.check_revival_units(&record)?;
        let id = self.revival_repo.insert(&record)?;
        self.log(ActionType::Create, actor, entity::YOUTH_REVIVAL, id, serde_json::to_value(&record).ok())?;
        info!(id = id, "青年复兴会出勤已创建");
        self.get_revival(id)
    }

    #[instrument(skip(self, form))]
    pub fn update_revival(&self, id: i64, form: YouthRevivalForm, actor: &str) -> ApiResult<YouthRevivalAttendance> {
        let record = form.into_new()?;
        self.check_revival_units(&record)?;
        self.revival_repo.update(id, &record)?;
        self.log(ActionType::Update, actor, entity::YOUTH_REVIVAL, id, serde_json::to_value(&record).ok())?;
        self.get_revival(id)
    }

    pub fn delete_revival(&self, id: i64, actor: &str) -> ApiResult<()> {
        self.revival_repo.delete(id)?;
        self.log(ActionType::Delete, actor, entity::YOUTH_REVIVAL, id, None)
    }

    pub fn bulk_delete_revival(&self, ids: &[i64], actor: &str) -> BulkOutcome {
        run_bulk(ids, |id| self.delete_revival(id, actor))
    }

    pub fn bulk_update_revival(&self, ids: &[i64], patch: &YouthPatch, actor: &str) -> BulkOutcome {
        run_bulk(ids, |id| {
            let mut form = YouthRevivalForm::from(&self.get_revival(id)?);
            if let Some(year) = patch.year {
                form.year = year;
            }
            if let Some(month) = patch.month {
                form.month = month;
            }
            self.update_revival(id, form, actor).map(|_| ())
        })
    }
}
