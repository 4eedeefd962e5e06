// ==========================================
// 教会行政管理系统 - 列表排序
// ==========================================

use crate::query::listable::Listable;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

// ==========================================
// SortState - 表头点击排序状态
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub field: String,
    pub direction: SortDirection,
}

impl SortState {
    pub fn ascending(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: SortDirection::Asc,
        }
    }

    pub fn descending(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: SortDirection::Desc,
        }
    }

    /// 点击表头：同一字段翻转方向，新字段从升序开始
    pub fn toggle(&mut self, field: &str) {
        if self.field == field {
            self.direction = self.direction.flipped();
        } else {
            self.field = field.to_string();
            self.direction = SortDirection::Asc;
        }
    }

    /// 对可选排序状态点击表头
    pub fn toggled(current: Option<SortState>, field: &str) -> SortState {
        match current {
            Some(mut state) => {
                state.toggle(field);
                state
            }
            None => SortState::ascending(field),
        }
    }
}

/// 稳定排序，相等元素保持输入顺序
pub fn sort_items<T: Listable>(mut items: Vec<T>, sort: &SortState) -> Vec<T> {
    items.sort_by(|a, b| {
        let ordering = a.sort_key(&sort.field).compare(&b.sort_key(&sort.field));
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    items
}

/// 比较两个可选值，None 排在最前
pub(crate) fn compare_options<T: Ord>(a: &Option<T>, b: &Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
