// ==========================================
// 教会行政管理系统 - CSV 导出器
// ==========================================
// 职责: 组织单元 / 聚会出勤 导出为 CSV
// 规则: 组织单元导出的表头与导入表头一致，上级以名称输出
//       （导出文件可直接重新导入，命中已有记录即更新）
// ==========================================

use crate::domain::attendance::Attendance;
use crate::domain::org::OrgUnit;
use crate::domain::types::OrgLevel;
use crate::exporter::error::ExportResult;
use crate::repository::{AttendanceFilter, AttendanceRepository, OrgUnitRepository, RepositoryResult};
use csv::Writer;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// 出勤导出表头
pub const ATTENDANCE_HEADER: [&str; 16] = [
    "SERVICE TYPE",
    "STATE",
    "REGION",
    "OLD GROUP",
    "GROUP",
    "DISTRICT",
    "YEAR",
    "MONTH",
    "WEEK",
    "MEN",
    "WOMEN",
    "YOUTH BOYS",
    "YOUTH GIRLS",
    "CHILDREN BOYS",
    "CHILDREN GIRLS",
    "TOTAL",
];

/// 组织单元导出表头（仅含该层级适用的上级列）
pub fn org_unit_header(level: OrgLevel) -> Vec<&'static str> {
    let mut header = vec!["NAME", "CODE", "LEADER"];
    header.extend(level.allowed_parents().iter().map(|p| p.column_label()));
    header
}

/// id -> 名称
pub type NameLookup = HashMap<i64, String>;

fn name_of(names: &NameLookup, id: Option<i64>) -> String {
    id.and_then(|id| names.get(&id).cloned()).unwrap_or_default()
}

fn org_unit_row(level: OrgLevel, unit: &OrgUnit, names: &NameLookup) -> Vec<String> {
    let mut row = vec![
        unit.name.clone(),
        unit.code.clone().unwrap_or_default(),
        unit.leader.clone().unwrap_or_default(),
    ];
    row.extend(
        level
            .allowed_parents()
            .iter()
            .map(|parent| name_of(names, unit.parent_id(*parent))),
    );
    row
}

fn attendance_row(record: &Attendance, names: &NameLookup) -> Vec<String> {
    let c = &record.counts;
    vec![
        record.service_type.label().to_string(),
        name_of(names, Some(record.state_id)),
        name_of(names, Some(record.region_id)),
        name_of(names, record.old_group_id),
        name_of(names, Some(record.group_id)),
        name_of(names, record.district_id),
        record.year.to_string(),
        record.month.to_string(),
        record.week.to_string(),
        c.men.to_string(),
        c.women.to_string(),
        c.youth_boys.to_string(),
        c.youth_girls.to_string(),
        c.children_boys.to_string(),
        c.children_girls.to_string(),
        record.total().to_string(),
    ]
}

/// 写出组织单元（任意 Write）
pub fn write_org_units<W: Write>(
    writer: W,
    level: OrgLevel,
    units: &[OrgUnit],
    names: &NameLookup,
) -> ExportResult<usize> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(org_unit_header(level))?;
    for unit in units {
        wtr.write_record(org_unit_row(level, unit, names))?;
    }
    wtr.flush()?;
    Ok(units.len())
}

/// 写出聚会出勤（任意 Write）
pub fn write_attendance<W: Write>(
    writer: W,
    records: &[Attendance],
    names: &NameLookup,
) -> ExportResult<usize> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(ATTENDANCE_HEADER)?;
    for record in records {
        wtr.write_record(attendance_row(record, names))?;
    }
    wtr.flush()?;
    Ok(records.len())
}

// ==========================================
// CsvExporter
// ==========================================
pub struct CsvExporter {
    org_repo: Arc<OrgUnitRepository>,
    attendance_repo: Arc<AttendanceRepository>,
}

impl CsvExporter {
    pub fn new(org_repo: Arc<OrgUnitRepository>, attendance_repo: Arc<AttendanceRepository>) -> Self {
        Self {
            org_repo,
            attendance_repo,
        }
    }

    fn load_names(&self, levels: &[OrgLevel]) -> RepositoryResult<NameLookup> {
        let mut names = NameLookup::new();
        for level in levels {
            for unit in self.org_repo.list_by_level(*level)? {
                names.insert(unit.id, unit.name);
            }
        }
        Ok(names)
    }

    /// 导出某层级全部组织单元
    ///
    /// # 返回
    /// - 写出的数据行数
    pub fn export_org_units(&self, level: OrgLevel, path: &Path) -> ExportResult<usize> {
        let units = self.org_repo.list_by_level(level)?;
        let names = self.load_names(level.allowed_parents())?;
        debug!(level = %level, units = units.len(), "导出组织单元");

        let file = std::fs::File::create(path)?;
        let count = write_org_units(file, level, &units, &names)?;
        info!(level = %level, count = count, path = %path.display(), "组织单元导出完成");
        Ok(count)
    }

    /// 按条件导出聚会出勤
    pub fn export_attendance(&self, filter: &AttendanceFilter, path: &Path) -> ExportResult<usize> {
        let records = self.attendance_repo.list(filter)?;
        let names = self.load_names(&[
            OrgLevel::State,
            OrgLevel::Region,
            OrgLevel::OldGroup,
            OrgLevel::Group,
            OrgLevel::District,
        ])?;

        let file = std::fs::File::create(path)?;
        let count = write_attendance(file, &records, &names)?;
        info!(count = count, path = %path.display(), "出勤导出完成");
        Ok(count)
    }
}
