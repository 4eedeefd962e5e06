// ==========================================
// 教会行政管理系统 - 组织单元导入 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// ==========================================

use crate::domain::import::ImportSummary;
use crate::domain::types::OrgLevel;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::OrgUnitRow;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

// ==========================================
// RawTable - 解析后的原始表格
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// 表头（原样去首尾空白，保持列顺序）
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 数据行号（1 起，不含表头，空行也计数）
    pub row_number: usize,
    /// 表头 -> 单元格值
    pub cells: HashMap<String, String>,
}

// ==========================================
// OrgUnitImporter Trait
// ==========================================
// 用途: 组织单元导入主接口
// 实现者: OrgUnitImporterImpl
#[async_trait]
pub trait OrgUnitImporter: Send + Sync {
    /// 导入单个文件
    ///
    /// # 参数
    /// - level: 导入的层级（决定列要求与上级解析）
    /// - file_path: .csv / .xlsx / .xls
    /// - actor: 操作人
    ///
    /// # 返回
    /// - Ok(ImportSummary): 新增/更新/行错误汇总
    /// - Err: 文件级错误（不存在、格式不支持、超出行数上限等）
    ///
    /// # 导入流程
    /// 1. 文件读取与解析
    /// 2. 表头归一化与字段映射
    /// 3. 同批次重名检测
    /// 4. 上级名称解析为 id
    /// 5. 按名称/编码 新增或更新
    /// 6. 记录导入批次与操作日志
    async fn import_file(
        &self,
        level: OrgLevel,
        file_path: &Path,
        actor: &str,
    ) -> ImportResult<ImportSummary>;

    /// 批量导入多个文件（并发执行）
    ///
    /// # 说明
    /// - 每个文件的导入是独立的，互不影响
    /// - 如果某个文件导入失败，不影响其他文件
    async fn import_many(
        &self,
        level: OrgLevel,
        file_paths: Vec<PathBuf>,
        actor: &str,
    ) -> Vec<Result<ImportSummary, String>>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 1）
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始表格（第一行为表头，完全空白的行跳过）
    fn parse_to_raw_table(&self, file_path: &Path) -> ImportResult<RawTable>;
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 用途: 表头与单元格清洗接口（阶段 2）
// 实现者: DataCleanerImpl
pub trait DataCleaner: Send + Sync {
    /// 归一化表头：TRIM + UPPER，`_`/`-` 视为空格，连续空白合并
    fn normalize_header(&self, header: &str) -> String;

    /// 清洗文本（TRIM + 内部连续空白合并）
    fn clean_text(&self, value: &str) -> String;

    /// 标准化空值（空字符串/空白 → None）
    fn normalize_null(&self, value: Option<&str>) -> Option<String>;
}

// ==========================================
// ConflictHandler Trait
// ==========================================
// 用途: 同批次冲突检测（阶段 3）
// 实现者: ConflictHandlerImpl
pub trait ConflictHandler: Send + Sync {
    /// 检测同批次内重名（大小写不敏感）
    ///
    /// # 返回
    /// - 每个重复名称一组：首次出现保留，其余行号列入组内
    fn detect_duplicates(&self, rows: &[OrgUnitRow]) -> Vec<DuplicateGroup>;
}

/// 同名的一组行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// 首次出现时的原始名称
    pub name: String,
    /// 首次出现的行号（该行照常导入）
    pub first_row: usize,
    /// 后续重复行号（这些行被跳过）
    pub duplicate_rows: Vec<usize>,
}

impl DuplicateGroup {
    pub fn all_rows(&self) -> Vec<usize> {
        std::iter::once(self.first_row)
            .chain(self.duplicate_rows.iter().copied())
            .collect()
    }
}
