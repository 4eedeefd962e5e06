// ==========================================
// 教会行政管理系统 - 实体状态仓
// ==========================================
// 职责: 列表页的内存集合 + 批量操作选择集 + 本地快照
// 约束: 选择集只保留集合内仍存在的 id
// ==========================================

use crate::domain::admin::AdminProfile;
use crate::domain::attendance::{Attendance, YouthRevivalAttendance, YouthWeeklyAttendance};
use crate::domain::org::OrgUnit;
use crate::query::{paginate, Listable, ListQuery, Page};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

/// 带主键的记录
pub trait Record {
    fn record_id(&self) -> i64;
}

macro_rules! impl_record {
    ($($ty:ty),* $(,)?) => {
        $(impl Record for $ty {
            fn record_id(&self) -> i64 {
                self.id
            }
        })*
    };
}

impl_record!(
    OrgUnit,
    Attendance,
    YouthWeeklyAttendance,
    YouthRevivalAttendance,
    AdminProfile,
);

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("快照读写失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("快照格式错误: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize)]
struct Snapshot<T> {
    items: Vec<T>,
    selected: Vec<i64>,
}

// ==========================================
// EntityStore - 单个集合的内存镜像
// ==========================================
#[derive(Debug, Clone)]
pub struct EntityStore<T> {
    items: Vec<T>,
    selected: BTreeSet<i64>,
}

impl<T> Default for EntityStore<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            selected: BTreeSet::new(),
        }
    }
}

impl<T: Record + Clone> EntityStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 用服务端结果整体替换
    pub fn replace_all(&mut self, items: Vec<T>) {
        self.items = items;
        self.prune_selection();
    }

    /// 新增或按 id 替换
    pub fn upsert(&mut self, item: T) {
        let id = item.record_id();
        match self.items.iter_mut().find(|i| i.record_id() == id) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    pub fn remove(&mut self, id: i64) -> Option<T> {
        let index = self.items.iter().position(|i| i.record_id() == id)?;
        self.selected.remove(&id);
        Some(self.items.remove(index))
    }

    pub fn get(&self, id: i64) -> Option<&T> {
        self.items.iter().find(|i| i.record_id() == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    // ===== 选择集 =====

    /// 切换单条选中状态，返回切换后是否选中；不存在的 id 忽略
    pub fn toggle_selected(&mut self, id: i64) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        if !self.selected.remove(&id) {
            self.selected.insert(id);
            return true;
        }
        false
    }

    /// 全选当前页；当前页已全选时取消
    pub fn select_page(&mut self, page: &Page<T>) {
        let ids: Vec<i64> = page.items.iter().map(Record::record_id).collect();
        if !ids.is_empty() && ids.iter().all(|id| self.selected.contains(id)) {
            for id in ids {
                self.selected.remove(&id);
            }
        } else {
            self.selected.extend(ids);
            self.prune_selection();
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, id: i64) -> bool {
        self.selected.contains(&id)
    }

    pub fn selected_ids(&self) -> Vec<i64> {
        self.selected.iter().copied().collect()
    }

    fn prune_selection(&mut self) {
        let ids: BTreeSet<i64> = self.items.iter().map(Record::record_id).collect();
        self.selected.retain(|id| ids.contains(id));
    }
}

impl<T: Record + Listable + Clone> EntityStore<T> {
    /// 当前列表页视图
    pub fn view(&self, query: &ListQuery, page_size: usize) -> Page<T> {
        query.run(self.items.clone(), page_size)
    }

    /// 仅分页，不做过滤排序
    pub fn page(&self, page: usize, page_size: usize) -> Page<T> {
        paginate(self.items.clone(), page, page_size)
    }
}

impl<T: Record + Clone + Serialize + DeserializeOwned> EntityStore<T> {
    /// 保存为 JSON 快照
    pub fn save_snapshot(&self, path: &Path) -> Result<(), StoreError> {
        let snapshot = Snapshot {
            items: self.items.clone(),
            selected: self.selected_ids(),
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_vec_pretty(&snapshot)?)?;
        tracing::debug!(path = %path.display(), items = self.items.len(), "状态快照已保存");
        Ok(())
    }

    /// 从 JSON 快照恢复；文件不存在时返回空集合
    pub fn load_snapshot(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let snapshot: Snapshot<T> = serde_json::from_slice(&std::fs::read(path)?)?;
        let mut store = Self {
            items: snapshot.items,
            selected: snapshot.selected.into_iter().collect(),
        };
        store.prune_selection();
        Ok(store)
    }
}
