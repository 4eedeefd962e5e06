// ==========================================
// 教会行政管理系统 - 聚会出勤 API
// ==========================================
// 职责: 出勤记录增删改查、列表、批量操作
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
use crate::domain::attendance::{Attendance, NewAttendance};
use crate::domain::types::{OrgLevel, ServiceType};
use crate::query::{ListQuery, Page};
use crate::repository::{
    ActionLogRepository, AttendanceFilter, AttendanceRepository, OrgUnitRepository, RepositoryError,
};
use crate::validation::AttendanceForm;

// ==========================================
// AttendancePatch - 批量修改内容
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttendancePatch {
    pub service_type: Option<ServiceType>,
    pub year: Option<i32>,
    pub month: Option<i64>,
    pub week: Option<i64>,
}

impl AttendancePatch {
    fn apply(&self, form: &mut AttendanceForm) {
        if let Some(service_type) = self.service_type {
            form.service_type = service_type;
        }
        if let Some(year) = self.year {
            form.year = year;
        }
        if let Some(month) = self.month {
            form.month = month;
        }
        if let Some(week) = self.week {
            form.week = week;
        }
    }
}

// ==========================================
// AttendanceApi
// ==========================================
pub struct AttendanceApi {
    attendance_repo: Arc<AttendanceRepository>,
    org_repo: Arc<OrgUnitRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    config: Arc<ConfigManager>,
}

impl AttendanceApi {
    pub fn new(
        attendance_repo: Arc<AttendanceRepository>,
        org_repo: Arc<OrgUnitRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            attendance_repo,
            org_repo,
            action_log_repo,
            config,
        }
    }

    pub fn get(&self, id: i64) -> ApiResult<Attendance> {
        self.attendance_repo
            .find_by_id(id)?
            .ok_or_else(|| RepositoryError::not_found("Attendance", id).into())
    }

    /// 先按条件取数，再在内存中搜索/排序/分页
    pub fn list(&self, filter: &AttendanceFilter, query: &ListQuery) -> ApiResult<Page<Attendance>> {
        let page_size = resolve_page_size(&self.config, query.page_size)?;
        let records = self.attendance_repo.list(filter)?;
        Ok(query.run(records, page_size))
    }

    /// 各级单元 id 必须指向对应层级
    fn check_units(&self, record: &NewAttendance) -> ApiResult<()> {
        check_org_refs(
            &self.org_repo,
            &[
                (OrgLevel::State, Some(record.state_id)),
                (OrgLevel::Region, Some(record.region_id)),
                (OrgLevel::OldGroup, record.old_group_id),
                (OrgLevel::Group, Some(record.group_id)),
                (OrgLevel::District, record.district_id),
            ],
        )
    }

    #[instrument(skip(self, form), fields(service_type = %form.service_type))]
    pub fn create(&self, form: AttendanceForm, actor: &str) -> ApiResult<Attendance> {
        let record = form.into_new()?;
        self.check_units(&record)?;
        let id = self.attendance_repo.insert(&record)?;
        record_action(
            &self.action_log_repo,
            ActionType::Create,
            actor,
            entity::ATTENDANCE,
            Some(id),
            serde_json::to_value(&record).ok(),
            None,
        )?;
        info!(id = id, total = record.counts.total(), "出勤记录已创建");
        self.get(id)
    }

    #[instrument(skip(self, form))]
    pub fn update(&self, id: i64, form: AttendanceForm, actor: &str) -> ApiResult<Attendance> {
        let record = form.into_new()?;
        self.check_units(&record)?;
        self.attendance_repo.update(id, &record)?;
        record_action(
            &self.action_log_repo,
            ActionType::Update,
            actor,
            entity::ATTENDANCE,
            Some(id),
            serde_json::to_value(&record).ok(),
            None,
        )?;
        info!(id = id, "出勤记录已更新");
        self.get(id)
    }

    #[instrument(skip(self))]
    pub fn delete(&self, id: i64, actor: &str) -> ApiResult<()> {
        self.attendance_repo.delete(id)?;
        record_action(
            &self.action_log_repo,
            ActionType::Delete,
            actor,
            entity::ATTENDANCE,
            Some(id),
            None,
            None,
        )?;
        info!(id = id, "出勤记录已删除");
        Ok(())
    }

    pub fn bulk_delete(&self, ids: &[i64], actor: &str) -> BulkOutcome {
        run_bulk(ids, |id| self.delete(id, actor))
    }

    /// 批量修改聚会类型 / 统计周期
    pub fn bulk_update(&self, ids: &[i64], patch: &AttendancePatch, actor: &str) -> BulkOutcome {
        run_bulk(ids, |id| {
            let mut form = AttendanceForm::from(&self.get(id)?);
            patch.apply(&mut form);
            self.update(id, form, actor).map(|_| ())
        })
    }
}
