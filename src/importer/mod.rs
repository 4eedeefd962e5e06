// ==========================================
// 教会行政管理系统 - 导入层
// ==========================================
// 职责: 表格数据导入为组织单元
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod conflict_handler;
pub mod data_cleaner;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod org_importer_impl;
pub mod org_importer_trait;
pub mod parent_resolver;

// 重导出核心类型
pub use conflict_handler::ConflictHandler as ConflictHandlerImpl;
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use error::{ImportError, ImportResult};
pub use field_mapper::{classify_header, ColumnKind, FieldMapper, OrgUnitRow};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use org_importer_impl::{summary_line, OrgUnitImporterImpl};
pub use parent_resolver::ParentResolver;

// 重导出 Trait 接口
pub use org_importer_trait::{
    ConflictHandler, DataCleaner, DuplicateGroup, FileParser, OrgUnitImporter, RawRow, RawTable,
};
