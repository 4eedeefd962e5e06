// ==========================================
// 教会行政管理系统 - 出勤领域模型
// ==========================================
// 覆盖: 聚会出勤 / 青年周出勤 / 青年复兴会出勤
// 约束: 所有人数非负；month 1..=12；week 1..=5
// ==========================================

use crate::domain::types::{ServiceType, YouthAttendanceType};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Attendance - 聚会出勤记录
// ==========================================
// 对齐: attendance 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendance {
    pub id: i64,
    pub service_type: ServiceType,

    // ===== 组织范围 =====
    pub state_id: i64,
    pub region_id: i64,
    pub group_id: i64,
    pub old_group_id: Option<i64>,
    pub district_id: Option<i64>,

    // ===== 统计周期 =====
    pub year: i32,
    pub month: u32,
    pub week: u32,

    // ===== 分类人数 =====
    pub counts: AttendanceCounts,

    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// 聚会分类人数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceCounts {
    pub men: u32,
    pub women: u32,
    pub youth_boys: u32,
    pub youth_girls: u32,
    pub children_boys: u32,
    pub children_girls: u32,
}

impl AttendanceCounts {
    // 合计按 u64 计算，单项接近 u32 上限时也不溢出
    pub fn total(&self) -> u64 {
        self.adults() + self.youth() + self.children()
    }

    pub fn adults(&self) -> u64 {
        u64::from(self.men) + u64::from(self.women)
    }

    pub fn youth(&self) -> u64 {
        u64::from(self.youth_boys) + u64::from(self.youth_girls)
    }

    pub fn children(&self) -> u64 {
        u64::from(self.children_boys) + u64::from(self.children_girls)
    }
}

impl Attendance {
    pub fn total(&self) -> u64 {
        self.counts.total()
    }
}

// ==========================================
// AttendanceTotals - 多条出勤的分类累计
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceTotals {
    pub men: u64,
    pub women: u64,
    pub youth_boys: u64,
    pub youth_girls: u64,
    pub children_boys: u64,
    pub children_girls: u64,
}

impl AttendanceTotals {
    pub fn total(&self) -> u64 {
        [
            self.men,
            self.women,
            self.youth_boys,
            self.youth_girls,
            self.children_boys,
            self.children_girls,
        ]
        .iter()
        .fold(0u64, |acc, v| acc.saturating_add(*v))
    }

    /// 逐项累加（饱和）
    pub fn add(&mut self, other: &AttendanceTotals) {
        self.men = self.men.saturating_add(other.men);
        self.women = self.women.saturating_add(other.women);
        self.youth_boys = self.youth_boys.saturating_add(other.youth_boys);
        self.youth_girls = self.youth_girls.saturating_add(other.youth_girls);
        self.children_boys = self.children_boys.saturating_add(other.children_boys);
        self.children_girls = self.children_girls.saturating_add(other.children_girls);
    }
}

impl From<AttendanceCounts> for AttendanceTotals {
    fn from(c: AttendanceCounts) -> Self {
        Self {
            men: c.men.into(),
            women: c.women.into(),
            youth_boys: c.youth_boys.into(),
            youth_girls: c.youth_girls.into(),
            children_boys: c.children_boys.into(),
            children_girls: c.children_girls.into(),
        }
    }
}

/// 待写入的聚会出勤
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAttendance {
    pub service_type: ServiceType,
    pub state_id: i64,
    pub region_id: i64,
    pub group_id: i64,
    pub old_group_id: Option<i64>,
    pub district_id: Option<i64>,
    pub year: i32,
    pub month: u32,
    pub week: u32,
    pub counts: AttendanceCounts,
}

// ==========================================
// YouthWeeklyAttendance - 青年周出勤
// ==========================================
// 对齐: youth_weekly_attendance 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YouthWeeklyAttendance {
    pub id: i64,
    pub state_id: i64,
    pub region_id: i64,
    pub old_group_id: Option<i64>,
    pub group_id: i64,
    pub attendance_type: YouthAttendanceType,
    pub year: i32,
    pub month: u32,
    pub week: u32,
    pub male: u32,
    pub female: u32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl YouthWeeklyAttendance {
    pub fn total(&self) -> u64 {
        u64::from(self.male) + u64::from(self.female)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewYouthWeeklyAttendance {
    pub state_id: i64,
    pub region_id: i64,
    pub old_group_id: Option<i64>,
    pub group_id: i64,
    pub attendance_type: YouthAttendanceType,
    pub year: i32,
    pub month: u32,
    pub week: u32,
    pub male: u32,
    pub female: u32,
}

// ==========================================
// YouthRevivalAttendance - 青年复兴会出勤
// ==========================================
// 对齐: youth_revival_attendance 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YouthRevivalAttendance {
    pub id: i64,
    pub state_id: i64,
    pub region_id: i64,
    pub year: i32,
    pub month: u32,
    pub male: u32,
    pub female: u32,
    pub testimonies: u32,
    pub new_converts: u32,
    pub holy_ghost_baptism: u32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl YouthRevivalAttendance {
    pub fn total(&self) -> u64 {
        u64::from(self.male) + u64::from(self.female)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewYouthRevivalAttendance {
    pub state_id: i64,
    pub region_id: i64,
    pub year: i32,
    pub month: u32,
    pub male: u32,
    pub female: u32,
    pub testimonies: u32,
    pub new_converts: u32,
    pub holy_ghost_baptism: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attendance_counts_total() {
        let counts = AttendanceCounts {
            men: 10,
            women: 12,
            youth_boys: 3,
            youth_girls: 4,
            children_boys: 5,
            children_girls: 6,
        };
        assert_eq!(counts.total(), 40);
        assert_eq!(counts.adults(), 22);
        assert_eq!(counts.youth(), 7);
        assert_eq!(counts.children(), 11);
    }

    #[test]
    fn test_totals_do_not_overflow_u32() {
        let counts = AttendanceCounts {
            men: u32::MAX,
            women: u32::MAX,
            youth_boys: u32::MAX,
            youth_girls: u32::MAX,
            children_boys: u32::MAX,
            children_girls: u32::MAX,
        };
        assert_eq!(counts.total(), 6 * u64::from(u32::MAX));
        assert_eq!(counts.adults(), 2 * u64::from(u32::MAX));

        let mut sum = AttendanceTotals::from(counts);
        sum.add(&AttendanceTotals::from(counts));
        assert_eq!(sum.men, 2 * u64::from(u32::MAX));
        assert_eq!(sum.total(), 12 * u64::from(u32::MAX));

        let mut full = AttendanceTotals {
            men: u64::MAX,
            ..Default::default()
        };
        full.add(&AttendanceTotals {
            men: 1,
            women: 2,
            ..Default::default()
        });
        assert_eq!(full.men, u64::MAX);
        assert_eq!(full.total(), u64::MAX);
    }
}
