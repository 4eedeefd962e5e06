// ==========================================
// 教会行政管理系统 - 导出模块错误类型
// ==========================================

use crate::repository::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("文件写入失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV 写入失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("数据库操作失败: {0}")]
    Repository(#[from] RepositoryError),
}

pub type ExportResult<T> = Result<T, ExportError>;
