// ==========================================
// 教会行政管理系统 - API 公共工具
// ==========================================
// 批量操作: 逐个 id 调用单条操作，单条失败不中断
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::types::OrgLevel;
use crate::i18n::t_with_args;
use crate::repository::{ActionLogRepository, OrgUnitRepository};
use crate::validation::forms::parent_field;
use crate::validation::ValidationErrors;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use tracing::warn;

// ==========================================
// BulkOutcome - 批量操作结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOutcome {
    /// 成功的 id（按输入顺序）
    pub succeeded: Vec<i64>,
    /// 失败的 id 与原因
    pub failed: Vec<(i64, String)>,
}

impl BulkOutcome {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// 对每个 id 执行单条操作（重复 id 只执行一次）
pub fn run_bulk<F>(ids: &[i64], mut op: F) -> BulkOutcome
where
    F: FnMut(i64) -> ApiResult<()>,
{
    let mut seen = HashSet::new();
    let mut outcome = BulkOutcome::default();
    for &id in ids {
        if !seen.insert(id) {
            continue;
        }
        match op(id) {
            Ok(()) => outcome.succeeded.push(id),
            Err(e) => {
                warn!(id = id, error = %e, "批量操作单条失败");
                outcome.failed.push((id, e.user_message()));
            }
        }
    }
    outcome
}

/// 按配置规整每页条数
pub(crate) fn resolve_page_size(config: &ConfigManager, requested: Option<usize>) -> ApiResult<usize> {
    config
        .resolve_page_size(requested)
        .map_err(|e| ApiError::InternalError(format!("配置读取失败: {}", e)))
}

/// 引用的组织单元必须存在且属于对应层级
///
/// # 参数
/// - `refs`: (期望层级, id)；None 跳过
///
/// # 返回
/// - Err(ApiError::ValidationFailed): 错误记在层级对应的表单字段上
pub(crate) fn check_org_refs(
    org_repo: &OrgUnitRepository,
    refs: &[(OrgLevel, Option<i64>)],
) -> ApiResult<()> {
    let mut errors = ValidationErrors::new();
    for &(level, id) in refs {
        let Some(id) = id else {
            continue;
        };
        let matches = org_repo
            .find_by_id(id)?
            .map(|unit| unit.level == level)
            .unwrap_or(false);
        if !matches {
            errors.push(
                parent_field(level),
                t_with_args(
                    "common.not_found",
                    &[
                        ("entity", level.column_label()),
                        ("id", id.to_string().as_str()),
                    ],
                ),
            );
        }
    }
    errors.into_result()?;
    Ok(())
}

/// 写操作日志
pub(crate) fn record_action(
    repo: &ActionLogRepository,
    action_type: ActionType,
    actor: &str,
    entity: &str,
    entity_id: Option<i64>,
    payload: Option<JsonValue>,
    detail: Option<String>,
) -> ApiResult<()> {
    repo.insert(&ActionLog::now(
        action_type,
        actor,
        entity,
        entity_id,
        payload,
        detail,
    ))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use std::sync::{Arc, Mutex};

    fn org_repo() -> OrgUnitRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::apply_schema(&conn).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO org_unit (id, level, name, created_at, updated_at)
                VALUES (1, 'STATE', 'Lagos', '2025-01-01 00:00:00', '2025-01-01 00:00:00');
            INSERT INTO org_unit (id, level, name, state_id, created_at, updated_at)
                VALUES (2, 'REGION', 'Ikeja', 1, '2025-01-01 00:00:00', '2025-01-01 00:00:00');
            "#,
        )
        .unwrap();
        OrgUnitRepository::new(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_check_org_refs_levels() {
        let repo = org_repo();
        assert!(check_org_refs(
            &repo,
            &[(OrgLevel::State, Some(1)), (OrgLevel::Region, Some(2)), (OrgLevel::Group, None)],
        )
        .is_ok());

        // 州/大区 id 对调，另有一个不存在的 id
        let err = check_org_refs(
            &repo,
            &[
                (OrgLevel::State, Some(2)),
                (OrgLevel::Region, Some(1)),
                (OrgLevel::Group, Some(99)),
            ],
        )
        .unwrap_err();
        let errors = err.field_errors().unwrap();
        assert_eq!(errors.len(), 3);
        assert!(errors.has_field("state_id"));
        assert!(errors.has_field("region_id"));
        assert!(errors.has_field("group_id"));
    }

    #[test]
    fn test_run_bulk_continues_after_failure() {
        let outcome = run_bulk(&[1, 2, 3], |id| {
            if id == 2 {
                Err(ApiError::NotFound("missing".into()))
            } else {
                Ok(())
            }
        });
        assert_eq!(outcome.succeeded, vec![1, 3]);
        assert_eq!(outcome.failed, vec![(2, "missing".to_string())]);
        assert!(!outcome.all_succeeded());
        assert_eq!(outcome.total(), 3);
    }

    #[test]
    fn test_run_bulk_skips_repeated_ids() {
        let mut calls = 0;
        let outcome = run_bulk(&[5, 5, 6], |_| {
            calls += 1;
            Ok(())
        });
        assert_eq!(calls, 2);
        assert_eq!(outcome.succeeded, vec![5, 6]);
    }
}
