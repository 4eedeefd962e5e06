// ==========================================
// 教会行政管理系统 - 演示数据库
// ==========================================
// 用法: seed_demo_db [db_path]
// 说明: 已有库先备份再重建；数据全部经 API 写入（带校验与操作日志）
// ==========================================

use chrono::{Datelike, Local};
use std::error::Error;
use std::fs;
use std::path::Path;

use church_admin::app::{get_default_db_path, AppState};
use church_admin::domain::types::{AccessLevel, OrgLevel, ServiceType, YouthAttendanceType};
use church_admin::validation::{
    AdminProfileForm, AttendanceForm, NewAdminForm, OrgUnitForm, YouthRevivalForm,
    YouthWeeklyForm,
};

const ACTOR: &str = "seed";
const STATES: [&str; 2] = ["Lagos", "Ogun"];
const REGIONS_PER_STATE: usize = 2;
const GROUPS_PER_REGION: usize = 2;
const DISTRICTS_PER_GROUP: usize = 2;

fn main() -> Result<(), Box<dyn Error>> {
    church_admin::logging::init();

    let db_path = std::env::args().nth(1).unwrap_or_else(get_default_db_path);
    backup_and_reset_db(&db_path)?;

    let state = AppState::new(db_path.clone())?;
    let year = Local::now().year();

    let mut groups = Vec::new();
    for (s, state_name) in STATES.iter().enumerate() {
        let state_unit = state.org_api.create(
            code(OrgUnitForm::new(OrgLevel::State, state_name), &format!("S{}", s + 1)),
            ACTOR,
        )?;

        for r in 0..REGIONS_PER_STATE {
            let region = state.org_api.create(
                OrgUnitForm::new(OrgLevel::Region, &format!("{} Region {}", state_name, r + 1))
                    .with_parent(OrgLevel::State, state_unit.id),
                ACTOR,
            )?;
            let old_group = state.org_api.create(
                OrgUnitForm::new(OrgLevel::OldGroup, &format!("{} Old Group", region.name))
                    .with_parent(OrgLevel::State, state_unit.id)
                    .with_parent(OrgLevel::Region, region.id),
                ACTOR,
            )?;

            for g in 0..GROUPS_PER_REGION {
                let group = state.org_api.create(
                    OrgUnitForm::new(OrgLevel::Group, &format!("{} Group {}", region.name, g + 1))
                        .with_parent(OrgLevel::State, state_unit.id)
                        .with_parent(OrgLevel::Region, region.id)
                        .with_parent(OrgLevel::OldGroup, old_group.id),
                    ACTOR,
                )?;
                for d in 0..DISTRICTS_PER_GROUP {
                    state.org_api.create(
                        OrgUnitForm::new(
                            OrgLevel::District,
                            &format!("{} District {}", group.name, d + 1),
                        )
                        .with_parent(OrgLevel::State, state_unit.id)
                        .with_parent(OrgLevel::Region, region.id)
                        .with_parent(OrgLevel::Group, group.id),
                        ACTOR,
                    )?;
                }
                groups.push((state_unit.id, region.id, old_group.id, group.id));
            }
        }
    }

    seed_attendance(&state, &groups, year)?;

    state.admin_api.create_admin(
        NewAdminForm {
            profile: AdminProfileForm {
                name: "Demo Admin".to_string(),
                email: "admin@example.org".to_string(),
                phone: None,
                access_level: AccessLevel::SuperAdmin,
                state_id: None,
                region_id: None,
                group_id: None,
                district_id: None,
            },
            password: "Demo#2024".to_string(),
            confirm_password: "Demo#2024".to_string(),
        },
        ACTOR,
    )?;

    print_quick_counts(&state)?;
    eprintln!("Seeded {}", db_path);
    Ok(())
}

fn code(mut form: OrgUnitForm, code: &str) -> OrgUnitForm {
    form.code = Some(code.to_string());
    form
}

fn seed_attendance(
    state: &AppState,
    groups: &[(i64, i64, i64, i64)],
    year: i32,
) -> Result<(), Box<dyn Error>> {
    for (i, &(state_id, region_id, old_group_id, group_id)) in groups.iter().enumerate() {
        let base = 20 + (i as i64 * 3);
        for month in 1..=3i64 {
            for (k, service_type) in ServiceType::ALL.into_iter().enumerate() {
                let k = k as i64;
                state.attendance_api.create(
                    AttendanceForm {
                        service_type,
                        state_id: Some(state_id),
                        region_id: Some(region_id),
                        group_id: Some(group_id),
                        old_group_id: Some(old_group_id),
                        district_id: None,
                        year,
                        month,
                        week: 1,
                        men: base + month - k,
                        women: base + month + 4 - k,
                        youth_boys: 6 + month,
                        youth_girls: 7 + month,
                        children_boys: 5,
                        children_girls: 6,
                    },
                    ACTOR,
                )?;
            }

            state.youth_attendance_api.create_weekly(
                YouthWeeklyForm {
                    state_id: Some(state_id),
                    region_id: Some(region_id),
                    old_group_id: Some(old_group_id),
                    group_id: Some(group_id),
                    attendance_type: YouthAttendanceType::Member,
                    year,
                    month,
                    week: 1,
                    male: 8 + month,
                    female: 9 + month,
                },
                ACTOR,
            )?;
        }
    }

    let (state_id, region_id, _, _) = groups.first().copied().unwrap_or_default();
    if state_id > 0 {
        state.youth_attendance_api.create_revival(
            YouthRevivalForm {
                state_id: Some(state_id),
                region_id: Some(region_id),
                year,
                month: 1,
                male: 40,
                female: 45,
                testimonies: 6,
                new_converts: 3,
                holy_ghost_baptism: 2,
            },
            ACTOR,
        )?;
    }
    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> Result<(), Box<dyn Error>> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path)?;
    fs::remove_file(path)?;

    eprintln!("Backed up {} -> {}", db_path, backup_path);
    Ok(())
}

fn print_quick_counts(state: &AppState) -> Result<(), Box<dyn Error>> {
    for count in state.dashboard_api.org_counts()? {
        eprintln!("{:<10} {}", count.level.column_label(), count.count);
    }
    Ok(())
}
