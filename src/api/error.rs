// ==========================================
// 教会行政管理系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换下层错误为用户友好的错误消息
// ==========================================

use crate::exporter::ExportError;
use crate::i18n::t_with_args;
use crate::importer::ImportError;
use crate::repository::error::RepositoryError;
use crate::validation::ValidationErrors;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    /// 表单校验失败（字段级）
    #[error("数据验证失败: {errors}")]
    ValidationFailed { errors: ValidationErrors },

    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    /// 登录失败 / 账号停用 / 原密码错误
    #[error("身份验证失败: {0}")]
    Unauthorized(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 导入导出错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("文件导出失败: {0}")]
    ExportError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 面向用户的提示
    pub fn user_message(&self) -> String {
        match self {
            ApiError::ValidationFailed { errors } => {
                let head = t_with_args(
                    "common.validation_failed",
                    &[("count", errors.len().to_string().as_str())],
                );
                format!("{}: {}", head, errors)
            }
            ApiError::InvalidInput(msg)
            | ApiError::NotFound(msg)
            | ApiError::BusinessRuleViolation(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::ImportError(msg) => msg.clone(),
            other => other.to_string(),
        }
    }

    /// 字段级错误（仅 ValidationFailed 有）
    pub fn field_errors(&self) -> Option<&ValidationErrors> {
        match self {
            ApiError::ValidationFailed { errors } => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::ValidationFailed { errors }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(t_with_args(
                    "common.not_found",
                    &[("entity", entity.as_str()), ("id", id.as_str())],
                ))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseTransactionError(msg)
            | RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::DatabaseError(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 ImportError / ExportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Repository(inner) => ApiError::from(inner),
            other => ApiError::ImportError(other.localized()),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Repository(inner) => ApiError::from(inner),
            other => ApiError::ExportError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_conversion() {
        let err: ApiError = RepositoryError::not_found("OrgUnit", 42).into();
        match err {
            ApiError::NotFound(msg) => assert!(msg.contains("42")),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_unique_violation_is_business_rule() {
        let err: ApiError =
            RepositoryError::UniqueConstraintViolation("UNIQUE constraint failed".into()).into();
        assert!(matches!(err, ApiError::BusinessRuleViolation(_)));
    }

    #[test]
    fn test_validation_errors_conversion() {
        let mut errors = ValidationErrors::new();
        errors.push("name", "required");
        let err: ApiError = errors.into();
        assert_eq!(err.field_errors().map(|e| e.len()), Some(1));
    }

    #[test]
    fn test_import_repository_error_unwrapped() {
        let err: ApiError = ImportError::Repository(RepositoryError::LockError("x".into())).into();
        assert!(matches!(err, ApiError::DatabaseConnectionError(_)));
    }
}
