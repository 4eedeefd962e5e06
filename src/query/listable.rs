// ==========================================
// 教会行政管理系统 - 可列表实体
// ==========================================
// 各实体的搜索文本与排序键
// ==========================================

use crate::domain::admin::AdminProfile;
use crate::domain::attendance::{Attendance, YouthRevivalAttendance, YouthWeeklyAttendance};
use crate::domain::import::ImportBatch;
use crate::domain::org::OrgUnit;
use crate::query::sort::compare_options;
use chrono::NaiveDateTime;
use std::cmp::Ordering;

/// 排序键
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Text(String),
    Number(i64),
    Date(Option<NaiveDateTime>),
    /// 未知字段，所有元素视为相等
    None,
}

impl SortKey {
    pub fn text_opt(value: Option<&str>) -> Self {
        SortKey::Text(value.unwrap_or_default().to_string())
    }

    pub fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Text(a), SortKey::Text(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            (SortKey::Number(a), SortKey::Number(b)) => a.cmp(b),
            (SortKey::Date(a), SortKey::Date(b)) => compare_options(a, b),
            _ => Ordering::Equal,
        }
    }
}

/// 可出现在列表页的实体
pub trait Listable {
    /// 搜索框匹配的文本
    fn search_text(&self) -> String;

    /// 指定列的排序键；未知列返回 SortKey::None
    fn sort_key(&self, field: &str) -> SortKey;
}

impl Listable for OrgUnit {
    fn search_text(&self) -> String {
        [
            Some(self.name.as_str()),
            self.code.as_deref(),
            self.leader.as_deref(),
        ]
        .iter()
        .flatten()
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
    }

    fn sort_key(&self, field: &str) -> SortKey {
        match field {
            "id" => SortKey::Number(self.id),
            "name" => SortKey::Text(self.name.clone()),
            "code" => SortKey::text_opt(self.code.as_deref()),
            "leader" => SortKey::text_opt(self.leader.as_deref()),
            "created_at" => SortKey::Date(Some(self.created_at)),
            "updated_at" => SortKey::Date(Some(self.updated_at)),
            _ => SortKey::None,
        }
    }
}

fn period_key(year: i32, month: u32, week: u32) -> i64 {
    (year as i64) * 1_000 + (month as i64) * 10 + week as i64
}

impl Listable for Attendance {
    fn search_text(&self) -> String {
        format!(
            "{} {} {}-{:02} W{}",
            self.service_type.label(),
            self.service_type.to_db_str(),
            self.year,
            self.month,
            self.week
        )
    }

    fn sort_key(&self, field: &str) -> SortKey {
        let c = &self.counts;
        match field {
            "id" => SortKey::Number(self.id),
            "service_type" => SortKey::Text(self.service_type.label().to_string()),
            "period" => SortKey::Number(period_key(self.year, self.month, self.week)),
            "year" => SortKey::Number(self.year as i64),
            "month" => SortKey::Number(self.month as i64),
            "week" => SortKey::Number(self.week as i64),
            "men" => SortKey::Number(c.men as i64),
            "women" => SortKey::Number(c.women as i64),
            "youth" => SortKey::Number(c.youth() as i64),
            "children" => SortKey::Number(c.children() as i64),
            "total" => SortKey::Number(c.total() as i64),
            "created_at" => SortKey::Date(Some(self.created_at)),
            _ => SortKey::None,
        }
    }
}

impl Listable for YouthWeeklyAttendance {
    fn search_text(&self) -> String {
        format!(
            "{} {}-{:02} W{}",
            self.attendance_type, self.year, self.month, self.week
        )
    }

    fn sort_key(&self, field: &str) -> SortKey {
        match field {
            "id" => SortKey::Number(self.id),
            "attendance_type" => SortKey::Text(self.attendance_type.to_string()),
            "period" => SortKey::Number(period_key(self.year, self.month, self.week)),
            "male" => SortKey::Number(self.male as i64),
            "female" => SortKey::Number(self.female as i64),
            "total" => SortKey::Number(self.total() as i64),
            _ => SortKey::None,
        }
    }
}

impl Listable for YouthRevivalAttendance {
    fn search_text(&self) -> String {
        format!("{}-{:02}", self.year, self.month)
    }

    fn sort_key(&self, field: &str) -> SortKey {
        match field {
            "id" => SortKey::Number(self.id),
            "period" => SortKey::Number(period_key(self.year, self.month, 0)),
            "male" => SortKey::Number(self.male as i64),
            "female" => SortKey::Number(self.female as i64),
            "testimonies" => SortKey::Number(self.testimonies as i64),
            "new_converts" => SortKey::Number(self.new_converts as i64),
            "holy_ghost_baptism" => SortKey::Number(self.holy_ghost_baptism as i64),
            "total" => SortKey::Number(self.total() as i64),
            _ => SortKey::None,
        }
    }
}

impl Listable for AdminProfile {
    fn search_text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.name,
            self.email,
            self.phone.as_deref().unwrap_or_default(),
            self.access_level
        )
    }

    fn sort_key(&self, field: &str) -> SortKey {
        match field {
            "id" => SortKey::Number(self.id),
            "name" => SortKey::Text(self.name.clone()),
            "email" => SortKey::Text(self.email.clone()),
            "access_level" => SortKey::Text(self.access_level.to_string()),
            "last_login_at" => SortKey::Date(self.last_login_at),
            _ => SortKey::None,
        }
    }
}

impl Listable for ImportBatch {
    fn search_text(&self) -> String {
        format!(
            "{} {} {}",
            self.level,
            self.file_name.as_deref().unwrap_or_default(),
            self.imported_by
        )
    }

    fn sort_key(&self, field: &str) -> SortKey {
        match field {
            "imported_at" => SortKey::Date(Some(self.imported_at.naive_utc())),
            "added" => SortKey::Number(self.added),
            "errors" => SortKey::Number(self.errors),
            _ => SortKey::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::OrgLevel;
    use chrono::Utc;

    fn unit(name: &str, code: Option<&str>) -> OrgUnit {
        let now = Utc::now().naive_utc();
        OrgUnit {
            id: 1,
            level: OrgLevel::Group,
            name: name.to_string(),
            code: code.map(str::to_string),
            leader: Some("Bro. Tunde".to_string()),
            state_id: Some(1),
            region_id: Some(2),
            old_group_id: None,
            group_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_org_unit_search_text() {
        let text = unit("Alausa", Some("ALS")).search_text();
        assert_eq!(text, "Alausa ALS Bro. Tunde");
        assert_eq!(unit("Alausa", None).search_text(), "Alausa Bro. Tunde");
    }

    #[test]
    fn test_text_keys_case_insensitive() {
        let a = SortKey::Text("alpha".to_string());
        let b = SortKey::Text("Beta".to_string());
        assert_eq!(a.compare(&b), Ordering::Less);
        assert_eq!(SortKey::None.compare(&a), Ordering::Equal);
        assert_eq!(
            SortKey::Date(None).compare(&SortKey::Date(Some(Utc::now().naive_utc()))),
            Ordering::Less
        );
    }
}
