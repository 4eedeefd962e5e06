// ==========================================
// 教会行政管理系统 - 列表查询层
// ==========================================
// 职责: 列表页的搜索 / 排序 / 分页
// 流程: filter_by_search -> sort_items -> paginate
// ==========================================

pub mod listable;
pub mod sort;

use serde::{Deserialize, Serialize};

pub use listable::{Listable, SortKey};
pub use sort::{sort_items, SortDirection, SortState};

// ==========================================
// Page - 一页数据
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 过滤后的总条数
    pub total: usize,
    /// 当前页（1 起）
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 转换页内元素，分页信息不变
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}

/// 按搜索词过滤（大小写不敏感的子串匹配，空白搜索词保留全部）
pub fn filter_by_search<T: Listable>(items: Vec<T>, term: &str) -> Vec<T> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|item| item.search_text().to_lowercase().contains(&term))
        .collect()
}

/// 按页切片
///
/// # 参数
/// - `page`: 页码，1 起；小于 1 按 1 处理
/// - `page_size`: 每页条数；0 按 1 处理（调用方应先按配置规整）
///
/// # 返回
/// 超出末页时 items 为空，total / total_pages 仍如实返回
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(page_size);

    let start = (page - 1).saturating_mul(page_size);
    let items = if start >= total {
        Vec::new()
    } else {
        items.into_iter().skip(start).take(page_size).collect()
    };

    Page {
        items,
        total,
        page,
        page_size,
        total_pages,
    }
}

// ==========================================
// ListQuery - 列表页查询参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub sort: Option<SortState>,
    pub page: usize,
    /// 为空时使用配置的默认值
    pub page_size: Option<usize>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: None,
            sort: None,
            page: 1,
            page_size: None,
        }
    }
}

impl ListQuery {
    pub fn page(page: usize, page_size: usize) -> Self {
        Self {
            page,
            page_size: Some(page_size),
            ..Self::default()
        }
    }

    pub fn with_search(mut self, term: &str) -> Self {
        self.search = Some(term.to_string());
        self
    }

    pub fn with_sort(mut self, sort: SortState) -> Self {
        self.sort = Some(sort);
        self
    }

    /// 执行 过滤 -> 排序 -> 分页
    ///
    /// # 参数
    /// - `page_size`: 已按配置规整过的每页条数
    pub fn run<T: Listable>(&self, items: Vec<T>, page_size: usize) -> Page<T> {
        let filtered = match &self.search {
            Some(term) => filter_by_search(items, term),
            None => items,
        };
        let sorted = match &self.sort {
            Some(sort) => sort_items(filtered, sort),
            None => filtered,
        };
        paginate(sorted, self.page, page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: &'static str,
        size: i64,
    }

    impl Listable for Row {
        fn search_text(&self) -> String {
            self.name.to_string()
        }

        fn sort_key(&self, field: &str) -> SortKey {
            match field {
                "name" => SortKey::Text(self.name.to_string()),
                "size" => SortKey::Number(self.size),
                _ => SortKey::None,
            }
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { name: "Lagos", size: 3 },
            Row { name: "Abuja", size: 1 },
            Row { name: "Ogun", size: 2 },
            Row { name: "Oyo", size: 2 },
        ]
    }

    #[test]
    fn test_paginate_subsets() {
        let items: Vec<i32> = (1..=23).collect();

        let first = paginate(items.clone(), 1, 10);
        assert_eq!(first.items, (1..=10).collect::<Vec<_>>());
        assert_eq!(first.total, 23);
        assert_eq!(first.total_pages, 3);

        let last = paginate(items.clone(), 3, 10);
        assert_eq!(last.items, vec![21, 22, 23]);

        let beyond = paginate(items.clone(), 4, 10);
        assert!(beyond.is_empty());
        assert_eq!(beyond.total, 23);

        let zero = paginate(items, 0, 5);
        assert_eq!(zero.page, 1);
        assert_eq!(zero.items, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_paginate_empty() {
        let page = paginate(Vec::<i32>::new(), 1, 10);
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);
        assert!(page.is_empty());
    }

    #[test]
    fn test_filter_by_search_case_insensitive() {
        let found = filter_by_search(rows(), "  o  ");
        let names: Vec<_> = found.iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Lagos", "Ogun", "Oyo"]);

        assert_eq!(filter_by_search(rows(), "").len(), 4);
        assert_eq!(filter_by_search(rows(), "ABU").len(), 1);
    }

    #[test]
    fn test_list_query_pipeline() {
        let query = ListQuery::page(1, 2)
            .with_search("o")
            .with_sort(SortState::ascending("size"));
        let page = query.run(rows(), 2);
        let names: Vec<_> = page.items.iter().map(|r| r.name).collect();
        // Ogun / Oyo 同 size，保持输入顺序
        assert_eq!(names, vec!["Ogun", "Oyo"]);
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
    }
}
