// ==========================================
// 教会行政管理系统 - 数据清洗器实现
// ==========================================
// 职责: 表头归一化 / TRIM / NULL 标准化
// ==========================================

use crate::importer::org_importer_trait::DataCleaner as DataCleanerTrait;

pub struct DataCleaner;

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl DataCleanerTrait for DataCleaner {
    fn normalize_header(&self, header: &str) -> String {
        let replaced: String = header
            .trim_start_matches('\u{feff}')
            .chars()
            .map(|c| if c == '_' || c == '-' { ' ' } else { c })
            .collect();
        let normalized = collapse_whitespace(&replaced).to_uppercase();

        // OLDGROUP 与 OLD GROUP 等价
        match normalized.strip_prefix("OLDGROUP") {
            Some(rest) => format!("OLD GROUP{}", rest),
            None => normalized,
        }
    }

    fn clean_text(&self, value: &str) -> String {
        collapse_whitespace(value)
    }

    fn normalize_null(&self, value: Option<&str>) -> Option<String> {
        value
            .map(|v| self.clean_text(v))
            .filter(|v| !v.is_empty())
    }
}
