// ==========================================
// 教会行政管理系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 行级问题记入 ImportSummary.errors，不走这里
// ==========================================

use crate::repository::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型（整文件级）
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("文件无数据行")]
    EmptyFile,

    #[error("数据行过多: {rows} 行，上限 {max}")]
    TooManyRows { rows: usize, max: usize },

    // ===== 配置错误 =====
    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    // ===== 数据库错误 =====
    #[error("数据库操作失败: {0}")]
    Repository(#[from] RepositoryError),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 面向用户的本地化描述
    pub fn localized(&self) -> String {
        use crate::i18n::{t, t_with_args};
        match self {
            ImportError::FileNotFound(path) => {
                t_with_args("import.file_not_found", &[("path", path.as_str())])
            }
            ImportError::UnsupportedFormat(ext) => {
                t_with_args("import.unsupported_format", &[("ext", ext.as_str())])
            }
            ImportError::EmptyFile => t("import.empty_file"),
            ImportError::TooManyRows { rows, max } => t_with_args(
                "import.too_many_rows",
                &[("rows", rows.to_string().as_str()), ("max", max.to_string().as_str())],
            ),
            other => other.to_string(),
        }
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
