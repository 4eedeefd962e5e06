// ==========================================
// 教会行政管理系统 - 仪表盘 API
// ==========================================
// 职责: 图表数据（按月出勤、分类占比）、组织数量、最近操作
// 说明: 只产出数据序列，不涉及图表绘制
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::error::ApiResult;
use crate::domain::action_log::ActionLog;
use crate::domain::attendance::AttendanceTotals;
use crate::domain::types::{OrgLevel, ServiceType};
use crate::repository::{ActionLogRepository, AttendanceRepository, OrgUnitRepository};

// ==========================================
// 图表数据 DTO
// ==========================================

/// 按月出勤（折线/柱状图的一个点）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    pub month: u32,
    pub total: u64,
    pub counts: AttendanceTotals,
}

/// 分类占比（饼图的一块）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySlice {
    pub category: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgCount {
    pub level: OrgLevel,
    pub count: i64,
}

// ==========================================
// DashboardApi
// ==========================================
pub struct DashboardApi {
    org_repo: Arc<OrgUnitRepository>,
    attendance_repo: Arc<AttendanceRepository>,
    action_log_repo: Arc<ActionLogRepository>,
}

impl DashboardApi {
    pub fn new(
        org_repo: Arc<OrgUnitRepository>,
        attendance_repo: Arc<AttendanceRepository>,
        action_log_repo: Arc<ActionLogRepository>,
    ) -> Self {
        Self {
            org_repo,
            attendance_repo,
            action_log_repo,
        }
    }

    /// 全年 12 个月的出勤序列（无数据的月份补零）
    pub fn monthly_totals(&self, year: i32, service_type: Option<ServiceType>) -> ApiResult<Vec<MonthlyPoint>> {
        let rows = self.attendance_repo.monthly_totals(year, service_type)?;
        debug!(year = year, months_with_data = rows.len(), "按月出勤汇总");

        let series = (1..=12u32)
            .map(|month| {
                let counts = rows
                    .iter()
                    .find(|(m, _)| *m == month)
                    .map(|(_, c)| *c)
                    .unwrap_or_default();
                MonthlyPoint {
                    month,
                    total: counts.total(),
                    counts,
                }
            })
            .collect();
        Ok(series)
    }

    /// 全年分类人数
    pub fn category_breakdown(&self, year: i32) -> ApiResult<Vec<CategorySlice>> {
        let sum = self
            .attendance_repo
            .monthly_totals(year, None)?
            .into_iter()
            .fold(AttendanceTotals::default(), |mut acc, (_, c)| {
                acc.add(&c);
                acc
            });

        let slices = [
            ("men", sum.men),
            ("women", sum.women),
            ("youth_boys", sum.youth_boys),
            ("youth_girls", sum.youth_girls),
            ("children_boys", sum.children_boys),
            ("children_girls", sum.children_girls),
        ];
        Ok(slices
            .into_iter()
            .map(|(category, value)| CategorySlice {
                category: category.to_string(),
                value,
            })
            .collect())
    }

    /// 各层级单元数量（没有单元的层级为 0）
    pub fn org_counts(&self) -> ApiResult<Vec<OrgCount>> {
        let counts = self.org_repo.count_by_level()?;
        Ok(OrgLevel::ALL
            .into_iter()
            .map(|level| OrgCount {
                level,
                count: counts
                    .iter()
                    .find(|(l, _)| *l == level)
                    .map(|(_, c)| *c)
                    .unwrap_or(0),
            })
            .collect())
    }

    pub fn recent_actions(&self, limit: usize) -> ApiResult<Vec<ActionLog>> {
        Ok(self.action_log_repo.list_recent(limit)?)
    }
}
