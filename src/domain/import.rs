// ==========================================
// 教会行政管理系统 - 导入结果领域模型
// ==========================================
// 规则: 行级错误只收集、不中断整批导入
// ==========================================

use crate::domain::types::OrgLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// ImportRowError - 行级错误
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRowError {
    /// 数据行号（1 起，不含表头）
    pub row: usize,
    /// 该行的名称（缺失时为空）
    pub name: Option<String>,
    pub message: String,
}

// ==========================================
// ImportSummary - 单次导入汇总
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    pub batch_id: String,
    pub level: OrgLevel,
    pub total_rows: usize,
    pub added: usize,
    pub updated: usize,
    pub errors: Vec<ImportRowError>,
    pub elapsed_ms: u128,
}

impl ImportSummary {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

// ==========================================
// ImportBatch - 导入批次记录
// ==========================================
// 对齐: import_batch 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportBatch {
    pub batch_id: String,
    pub level: OrgLevel,
    pub file_name: Option<String>,
    pub total_rows: i64,
    pub added: i64,
    pub updated: i64,
    pub errors: i64,
    pub imported_by: String,
    pub imported_at: DateTime<Utc>,
    pub elapsed_ms: i64,
    pub errors_json: Option<String>,
}
