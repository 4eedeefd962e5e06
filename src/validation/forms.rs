// ==========================================
// 教会行政管理系统 - 表单定义
// ==========================================
// 表单字段保留原始输入类型（计数用 i64），校验通过后再转换为领域对象
// ==========================================

use crate::domain::admin::{AdminDetails, AdminProfile};
use crate::domain::attendance::{
    Attendance, AttendanceCounts, NewAttendance, NewYouthRevivalAttendance,
    NewYouthWeeklyAttendance, YouthRevivalAttendance, YouthWeeklyAttendance,
};
use crate::domain::org::{NewOrgUnit, OrgParents, OrgUnit};
use crate::domain::types::{AccessLevel, OrgLevel, ServiceType, YouthAttendanceType};
use crate::i18n::t_with_args;
use crate::validation::rules::{self, PasswordPolicy};
use crate::validation::{Validate, ValidationErrors};
use serde::{Deserialize, Serialize};

/// 上级层级对应的表单字段名
pub fn parent_field(level: OrgLevel) -> &'static str {
    match level {
        OrgLevel::State => "state_id",
        OrgLevel::Region => "region_id",
        OrgLevel::OldGroup => "old_group_id",
        OrgLevel::Group => "group_id",
        OrgLevel::District => "district_id",
    }
}

/// 校验通过后的计数转换；人数已由 count_in_range 限定在 u32 范围内
fn count(value: i64) -> u32 {
    u32::try_from(value.clamp(0, rules::MAX_COUNT)).unwrap_or_default()
}

fn trimmed_opt(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// ==========================================
// OrgUnitForm - 州/大区/老组/组/区 表单
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgUnitForm {
    pub level: OrgLevel,
    pub name: String,
    pub code: Option<String>,
    pub leader: Option<String>,
    pub parents: OrgParents,
}

impl OrgUnitForm {
    pub fn new(level: OrgLevel, name: &str) -> Self {
        Self {
            level,
            name: name.to_string(),
            code: None,
            leader: None,
            parents: OrgParents::default(),
        }
    }

    pub fn with_parent(mut self, parent: OrgLevel, id: i64) -> Self {
        self.parents.set(parent, Some(id));
        self
    }

    /// 校验并转换为待写入对象（多余的上级引用被丢弃）
    pub fn into_new(self) -> Result<NewOrgUnit, ValidationErrors> {
        self.validate().into_result()?;
        Ok(NewOrgUnit {
            level: self.level,
            name: self.name.trim().to_string(),
            code: trimmed_opt(&self.code),
            leader: trimmed_opt(&self.leader),
            parents: self.parents.restricted_to(self.level),
        })
    }
}

impl Validate for OrgUnitForm {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        rules::require_text(&mut errors, "name", &self.name);

        for parent in self.level.required_parents() {
            if self.parents.get(*parent).is_none() {
                errors.push(
                    parent_field(*parent),
                    t_with_args(
                        "validation.parent_required",
                        &[
                            ("parent", parent.column_label()),
                            ("level", self.level.column_label()),
                        ],
                    ),
                );
            }
        }
        errors
    }
}

impl From<&OrgUnit> for OrgUnitForm {
    fn from(unit: &OrgUnit) -> Self {
        Self {
            level: unit.level,
            name: unit.name.clone(),
            code: unit.code.clone(),
            leader: unit.leader.clone(),
            parents: OrgParents::from(unit),
        }
    }
}

// ==========================================
// AttendanceForm - 聚会出勤表单
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceForm {
    pub service_type: ServiceType,
    pub state_id: Option<i64>,
    pub region_id: Option<i64>,
    pub group_id: Option<i64>,
    pub old_group_id: Option<i64>,
    pub district_id: Option<i64>,
    pub year: i32,
    pub month: i64,
    pub week: i64,
    pub men: i64,
    pub women: i64,
    pub youth_boys: i64,
    pub youth_girls: i64,
    pub children_boys: i64,
    pub children_girls: i64,
}

impl AttendanceForm {
    pub fn into_new(self) -> Result<NewAttendance, ValidationErrors> {
        self.validate().into_result()?;
        Ok(NewAttendance {
            service_type: self.service_type,
            state_id: self.state_id.unwrap_or_default(),
            region_id: self.region_id.unwrap_or_default(),
            group_id: self.group_id.unwrap_or_default(),
            old_group_id: self.old_group_id,
            district_id: self.district_id,
            year: self.year,
            month: count(self.month),
            week: count(self.week),
            counts: AttendanceCounts {
                men: count(self.men),
                women: count(self.women),
                youth_boys: count(self.youth_boys),
                youth_girls: count(self.youth_girls),
                children_boys: count(self.children_boys),
                children_girls: count(self.children_girls),
            },
        })
    }
}

impl Validate for AttendanceForm {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        rules::require_id(&mut errors, "state_id", self.state_id);
        rules::require_id(&mut errors, "region_id", self.region_id);
        rules::require_id(&mut errors, "group_id", self.group_id);
        rules::year_in_range(&mut errors, self.year);
        rules::month_in_range(&mut errors, self.month);
        rules::week_in_range(&mut errors, self.week);
        for (field, value) in [
            ("men", self.men),
            ("women", self.women),
            ("youth_boys", self.youth_boys),
            ("youth_girls", self.youth_girls),
            ("children_boys", self.children_boys),
            ("children_girls", self.children_girls),
        ] {
            rules::count_in_range(&mut errors, field, value);
        }
        errors
    }
}

// ==========================================
// YouthWeeklyForm - 青年周出勤表单
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YouthWeeklyForm {
    pub state_id: Option<i64>,
    pub region_id: Option<i64>,
    pub old_group_id: Option<i64>,
    pub group_id: Option<i64>,
    pub attendance_type: YouthAttendanceType,
    pub year: i32,
    pub month: i64,
    pub week: i64,
    pub male: i64,
    pub female: i64,
}

impl YouthWeeklyForm {
    pub fn into_new(self) -> Result<NewYouthWeeklyAttendance, ValidationErrors> {
        self.validate().into_result()?;
        Ok(NewYouthWeeklyAttendance {
            state_id: self.state_id.unwrap_or_default(),
            region_id: self.region_id.unwrap_or_default(),
            old_group_id: self.old_group_id,
            group_id: self.group_id.unwrap_or_default(),
            attendance_type: self.attendance_type,
            year: self.year,
            month: count(self.month),
            week: count(self.week),
            male: count(self.male),
            female: count(self.female),
        })
    }
}

impl Validate for YouthWeeklyForm {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        rules::require_id(&mut errors, "state_id", self.state_id);
        rules::require_id(&mut errors, "region_id", self.region_id);
        rules::require_id(&mut errors, "group_id", self.group_id);
        rules::year_in_range(&mut errors, self.year);
        rules::month_in_range(&mut errors, self.month);
        rules::week_in_range(&mut errors, self.week);
        rules::count_in_range(&mut errors, "male", self.male);
        rules::count_in_range(&mut errors, "female", self.female);
        errors
    }
}

// ==========================================
// YouthRevivalForm - 青年复兴会出勤表单
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YouthRevivalForm {
    pub state_id: Option<i64>,
    pub region_id: Option<i64>,
    pub year: i32,
    pub month: i64,
    pub male: i64,
    pub female: i64,
    pub testimonies: i64,
    pub new_converts: i64,
    pub holy_ghost_baptism: i64,
}

impl YouthRevivalForm {
    pub fn into_new(self) -> Result<NewYouthRevivalAttendance, ValidationErrors> {
        self.validate().into_result()?;
        Ok(NewYouthRevivalAttendance {
            state_id: self.state_id.unwrap_or_default(),
            region_id: self.region_id.unwrap_or_default(),
            year: self.year,
            month: count(self.month),
            male: count(self.male),
            female: count(self.female),
            testimonies: count(self.testimonies),
            new_converts: count(self.new_converts),
            holy_ghost_baptism: count(self.holy_ghost_baptism),
        })
    }
}

impl Validate for YouthRevivalForm {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        rules::require_id(&mut errors, "state_id", self.state_id);
        rules::require_id(&mut errors, "region_id", self.region_id);
        rules::year_in_range(&mut errors, self.year);
        rules::month_in_range(&mut errors, self.month);
        for (field, value) in [
            ("male", self.male),
            ("female", self.female),
            ("testimonies", self.testimonies),
            ("new_converts", self.new_converts),
            ("holy_ghost_baptism", self.holy_ghost_baptism),
        ] {
            rules::count_in_range(&mut errors, field, value);
        }
        errors
    }
}

// ==========================================
// AdminProfileForm - 管理员资料表单
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminProfileForm {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub access_level: AccessLevel,
    pub state_id: Option<i64>,
    pub region_id: Option<i64>,
    pub group_id: Option<i64>,
    pub district_id: Option<i64>,
}

impl AdminProfileForm {
    pub fn scope_id(&self, level: OrgLevel) -> Option<i64> {
        match level {
            OrgLevel::State => self.state_id,
            OrgLevel::Region => self.region_id,
            OrgLevel::Group => self.group_id,
            OrgLevel::District => self.district_id,
            OrgLevel::OldGroup => None,
        }
    }

    pub fn into_details(self) -> Result<AdminDetails, ValidationErrors> {
        self.validate().into_result()?;
        Ok(AdminDetails {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            phone: trimmed_opt(&self.phone),
            access_level: self.access_level,
            state_id: self.state_id,
            region_id: self.region_id,
            group_id: self.group_id,
            district_id: self.district_id,
        })
    }
}

impl Validate for AdminProfileForm {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        rules::require_text(&mut errors, "name", &self.name);
        rules::email(&mut errors, "email", &self.email);
        rules::optional_phone(&mut errors, "phone", self.phone.as_deref());

        if let Some(scope) = self.access_level.scope_level() {
            if self.scope_id(scope).is_none() {
                errors.push(
                    parent_field(scope),
                    t_with_args(
                        "validation.scope_required",
                        &[
                            ("scope", scope.column_label()),
                            ("access", self.access_level.to_db_str()),
                        ],
                    ),
                );
            }
        }
        errors
    }
}

impl From<&AdminProfile> for AdminProfileForm {
    fn from(profile: &AdminProfile) -> Self {
        Self {
            name: profile.name.clone(),
            email: profile.email.clone(),
            phone: profile.phone.clone(),
            access_level: profile.access_level,
            state_id: profile.state_id,
            region_id: profile.region_id,
            group_id: profile.group_id,
            district_id: profile.district_id,
        }
    }
}

// ==========================================
// NewAdminForm - 新建管理员（含初始密码）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAdminForm {
    pub profile: AdminProfileForm,
    pub password: String,
    pub confirm_password: String,
}

impl NewAdminForm {
    pub fn validate_with_policy(&self, policy: &PasswordPolicy) -> ValidationErrors {
        let mut errors = self.profile.validate();
        policy.check(&mut errors, "password", &self.password);
        if self.password != self.confirm_password {
            errors.push("confirm_password", crate::i18n::t("validation.password_mismatch"));
        }
        errors
    }
}

impl Validate for NewAdminForm {
    fn validate(&self) -> ValidationErrors {
        self.validate_with_policy(&PasswordPolicy::default())
    }
}

// ==========================================
// ChangePasswordForm - 修改密码
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangePasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl ChangePasswordForm {
    pub fn validate_with_policy(&self, policy: &PasswordPolicy) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        rules::require_text(&mut errors, "current_password", &self.current_password);
        policy.check(&mut errors, "new_password", &self.new_password);
        if self.new_password != self.confirm_password {
            errors.push("confirm_password", crate::i18n::t("validation.password_mismatch"));
        }
        if !self.current_password.is_empty() && self.new_password == self.current_password {
            errors.push("new_password", crate::i18n::t("validation.password_unchanged"));
        }
        errors
    }
}

impl Validate for ChangePasswordForm {
    fn validate(&self) -> ValidationErrors {
        self.validate_with_policy(&PasswordPolicy::default())
    }
}

// ==========================================
// LoginForm - 登录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl Validate for LoginForm {
    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        rules::email(&mut errors, "email", &self.email);
        rules::require_text(&mut errors, "password", &self.password);
        errors
    }
}

// ==========================================
// 已有记录 -> 表单（编辑 / 批量修改的起点）
// ==========================================
impl From<&Attendance> for AttendanceForm {
    fn from(record: &Attendance) -> Self {
        let c = &record.counts;
        Self {
            service_type: record.service_type,
            state_id: Some(record.state_id),
            region_id: Some(record.region_id),
            group_id: Some(record.group_id),
            old_group_id: record.old_group_id,
            district_id: record.district_id,
            year: record.year,
            month: record.month as i64,
            week: record.week as i64,
            men: c.men as i64,
            women: c.women as i64,
            youth_boys: c.youth_boys as i64,
            youth_girls: c.youth_girls as i64,
            children_boys: c.children_boys as i64,
            children_girls: c.children_girls as i64,
        }
    }
}

impl From<&YouthWeeklyAttendance> for YouthWeeklyForm {
    fn from(record: &YouthWeeklyAttendance) -> Self {
        Self {
            state_id: Some(record.state_id),
            region_id: Some(record.region_id),
            old_group_id: record.old_group_id,
            group_id: Some(record.group_id),
            attendance_type: record.attendance_type,
            year: record.year,
            month: record.month as i64,
            week: record.week as i64,
            male: record.male as i64,
            female: record.female as i64,
        }
    }
}

impl From<&YouthRevivalAttendance> for YouthRevivalForm {
    fn from(record: &YouthRevivalAttendance) -> Self {
        Self {
            state_id: Some(record.state_id),
            region_id: Some(record.region_id),
            year: record.year,
            month: record.month as i64,
            male: record.male as i64,
            female: record.female as i64,
            testimonies: record.testimonies as i64,
            new_converts: record.new_converts as i64,
            holy_ghost_baptism: record.holy_ghost_baptism as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attendance_form() -> AttendanceForm {
        AttendanceForm {
            service_type: ServiceType::SundayService,
            state_id: Some(1),
            region_id: Some(2),
            group_id: Some(3),
            old_group_id: None,
            district_id: None,
            year: 2025,
            month: 6,
            week: 2,
            men: 10,
            women: 12,
            youth_boys: 4,
            youth_girls: 5,
            children_boys: 3,
            children_girls: 1,
        }
    }

    fn admin_form(access_level: AccessLevel) -> AdminProfileForm {
        AdminProfileForm {
            name: "Pastor Ade".to_string(),
            email: " Ade@Church.org ".to_string(),
            phone: None,
            access_level,
            state_id: None,
            region_id: None,
            group_id: None,
            district_id: None,
        }
    }

    #[test]
    fn test_org_form_requires_parents() {
        let form = OrgUnitForm::new(OrgLevel::District, "Ikeja North");
        let errors = form.validate();
        assert!(errors.has_field("state_id"));
        assert!(errors.has_field("region_id"));
        assert!(errors.has_field("group_id"));
        assert!(!errors.has_field("old_group_id"));
    }

    #[test]
    fn test_org_form_into_new_trims_and_restricts() {
        let mut form = OrgUnitForm::new(OrgLevel::Region, "  Ikeja  ")
            .with_parent(OrgLevel::State, 1)
            .with_parent(OrgLevel::Group, 9);
        form.code = Some("   ".to_string());
        form.leader = Some(" Bro. Tunde ".to_string());

        let new = form.into_new().unwrap();
        assert_eq!(new.name, "Ikeja");
        assert_eq!(new.code, None);
        assert_eq!(new.leader.as_deref(), Some("Bro. Tunde"));
        assert_eq!(new.parents.state_id, Some(1));
        assert_eq!(new.parents.group_id, None);
    }

    #[test]
    fn test_org_form_blank_name() {
        let errors = OrgUnitForm::new(OrgLevel::State, "   ").validate();
        assert!(errors.has_field("name"));
    }

    #[test]
    fn test_attendance_form_ok() {
        let new = attendance_form().into_new().unwrap();
        assert_eq!(new.counts.total(), 35);
        assert_eq!(new.week, 2);
    }

    #[test]
    fn test_attendance_form_rejects_bad_period_and_counts() {
        let mut form = attendance_form();
        form.month = 13;
        form.week = 6;
        form.women = -2;
        form.group_id = None;
        let errors = form.validate();
        assert!(errors.has_field("month"));
        assert!(errors.has_field("week"));
        assert!(errors.has_field("women"));
        assert!(errors.has_field("group_id"));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_attendance_form_rejects_oversized_counts() {
        let mut form = attendance_form();
        form.men = 5_000_000_000;
        form.children_girls = rules::MAX_COUNT + 1;
        let errors = form.validate();
        assert!(errors.has_field("men"));
        assert!(errors.has_field("children_girls"));
        assert!(form.into_new().is_err());

        let mut form = attendance_form();
        form.women = rules::MAX_COUNT;
        assert_eq!(form.into_new().unwrap().counts.women, 1_000_000);
    }

    #[test]
    fn test_youth_forms() {
        let weekly = YouthWeeklyForm {
            state_id: Some(1),
            region_id: Some(2),
            old_group_id: None,
            group_id: Some(3),
            attendance_type: YouthAttendanceType::Member,
            year: 2025,
            month: 1,
            week: 5,
            male: 7,
            female: 9,
        };
        assert!(weekly.validate().is_empty());

        let revival = YouthRevivalForm {
            state_id: Some(1),
            region_id: None,
            year: 2025,
            month: 0,
            male: 1,
            female: 1,
            testimonies: -1,
            new_converts: 0,
            holy_ghost_baptism: 0,
        };
        let errors = revival.validate();
        assert!(errors.has_field("region_id"));
        assert!(errors.has_field("month"));
        assert!(errors.has_field("testimonies"));
    }

    #[test]
    fn test_admin_scope_required() {
        let errors = admin_form(AccessLevel::GroupAdmin).validate();
        assert!(errors.has_field("group_id"));

        let mut form = admin_form(AccessLevel::GroupAdmin);
        form.group_id = Some(3);
        let details = form.into_details().unwrap();
        assert_eq!(details.email, "ade@church.org");

        assert!(admin_form(AccessLevel::SuperAdmin).validate().is_empty());
    }

    #[test]
    fn test_new_admin_password_rules() {
        let form = NewAdminForm {
            profile: admin_form(AccessLevel::SuperAdmin),
            password: "Password!".to_string(),
            confirm_password: "Password!".to_string(),
        };
        let errors = form.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors.has_field("password"));

        let form = NewAdminForm {
            password: "Password1!".to_string(),
            confirm_password: "Password2!".to_string(),
            ..form
        };
        let errors = form.validate();
        assert!(errors.has_field("confirm_password"));
        assert!(!errors.has_field("password"));
    }

    #[test]
    fn test_change_password_rules() {
        let same = ChangePasswordForm {
            current_password: "Secret#123".to_string(),
            new_password: "Secret#123".to_string(),
            confirm_password: "Secret#123".to_string(),
        };
        assert!(same.validate().has_field("new_password"));

        let ok = ChangePasswordForm {
            current_password: "Secret#123".to_string(),
            new_password: "Newer#4567".to_string(),
            confirm_password: "Newer#4567".to_string(),
        };
        assert!(ok.validate().is_empty());
        assert!(ok
            .validate_with_policy(&PasswordPolicy::new(12))
            .has_field("new_password"));
    }

    #[test]
    fn test_login_form() {
        let form = LoginForm {
            email: "not-an-email".to_string(),
            password: String::new(),
        };
        let errors = form.validate();
        assert!(errors.has_field("email"));
        assert!(errors.has_field("password"));
    }
}
