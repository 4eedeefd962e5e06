// ==========================================
// 教会行政管理系统 - 冲突处理器实现
// ==========================================
// 职责: 检测同批次内重名（大小写不敏感）
// 策略: 首次出现照常导入，后续行跳过，每个重名只报一条错误
// ==========================================

use crate::importer::field_mapper::OrgUnitRow;
use crate::importer::org_importer_trait::{ConflictHandler as ConflictHandlerTrait, DuplicateGroup};
use std::collections::HashMap;

pub struct ConflictHandler;

impl ConflictHandlerTrait for ConflictHandler {
    fn detect_duplicates(&self, rows: &[OrgUnitRow]) -> Vec<DuplicateGroup> {
        let mut groups: Vec<DuplicateGroup> = Vec::new();
        let mut index_by_name: HashMap<String, usize> = HashMap::new();

        for row in rows {
            let key = row.name.trim().to_lowercase();
            match index_by_name.get(&key) {
                Some(&idx) => groups[idx].duplicate_rows.push(row.row_number),
                None => {
                    index_by_name.insert(key, groups.len());
                    groups.push(DuplicateGroup {
                        name: row.name.clone(),
                        first_row: row.row_number,
                        duplicate_rows: Vec::new(),
                    });
                }
            }
        }

        groups.retain(|g| !g.duplicate_rows.is_empty());
        groups
    }
}
