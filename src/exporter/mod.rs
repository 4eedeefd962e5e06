// ==========================================
// 教会行政管理系统 - 导出层
// ==========================================
// 格式: CSV
// ==========================================

pub mod csv_exporter;
pub mod error;

pub use csv_exporter::{org_unit_header, write_attendance, write_org_units, CsvExporter, ATTENDANCE_HEADER};
pub use error::{ExportError, ExportResult};
