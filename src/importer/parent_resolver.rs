// ==========================================
// 教会行政管理系统 - 上级名称解析
// ==========================================
// 每批次构建一次 名称(小写) -> id 映射
// ==========================================

use crate::domain::import::ImportRowError;
use crate::domain::org::OrgParents;
use crate::domain::types::OrgLevel;
use crate::i18n::t_with_args;
use crate::importer::field_mapper::OrgUnitRow;
use crate::repository::{OrgUnitRepository, RepositoryResult};
use std::collections::HashMap;

pub struct ParentResolver {
    by_level: HashMap<OrgLevel, HashMap<String, i64>>,
}

impl ParentResolver {
    /// 加载导入层级允许的全部上级
    pub fn load(repo: &OrgUnitRepository, level: OrgLevel) -> RepositoryResult<Self> {
        let mut by_level = HashMap::new();
        for parent in level.allowed_parents() {
            let names = repo
                .list_by_level(*parent)?
                .into_iter()
                .map(|unit| (unit.name.trim().to_lowercase(), unit.id))
                .collect();
            by_level.insert(*parent, names);
        }
        Ok(Self { by_level })
    }

    pub fn lookup(&self, level: OrgLevel, name: &str) -> Option<i64> {
        self.by_level
            .get(&level)
            .and_then(|names| names.get(&name.trim().to_lowercase()))
            .copied()
    }

    /// 解析一行的全部上级；任一名称未知即为行错误
    pub fn resolve(&self, row: &OrgUnitRow) -> Result<OrgParents, ImportRowError> {
        let mut parents = OrgParents::default();
        for (level, name) in &row.parent_names {
            match self.lookup(*level, name) {
                Some(id) => parents.set(*level, Some(id)),
                None => {
                    return Err(ImportRowError {
                        row: row.row_number,
                        name: Some(row.name.clone()),
                        message: t_with_args(
                            "import.unknown_parent",
                            &[("level", level.column_label()), ("name", name.as_str())],
                        ),
                    })
                }
            }
        }
        Ok(parents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::org::NewOrgUnit;
    use rusqlite::Connection;
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    fn repo_with_state() -> OrgUnitRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::apply_schema(&conn).unwrap();
        let repo = OrgUnitRepository::new(Arc::new(Mutex::new(conn)));
        repo.insert(&NewOrgUnit {
            level: OrgLevel::State,
            name: "Lagos".to_string(),
            code: None,
            leader: None,
            parents: OrgParents::default(),
        })
        .unwrap();
        repo
    }

    fn row(state: &str) -> OrgUnitRow {
        let mut parent_names = BTreeMap::new();
        parent_names.insert(OrgLevel::State, state.to_string());
        OrgUnitRow {
            row_number: 2,
            name: "Ikeja".to_string(),
            code: None,
            leader: None,
            parent_names,
        }
    }

    #[test]
    fn test_resolve_case_insensitive() {
        let resolver = ParentResolver::load(&repo_with_state(), OrgLevel::Region).unwrap();
        let parents = resolver.resolve(&row(" LAGOS ")).unwrap();
        assert!(parents.state_id.is_some());
    }

    #[test]
    fn test_unknown_parent_is_row_error() {
        let resolver = ParentResolver::load(&repo_with_state(), OrgLevel::Region).unwrap();
        let err = resolver.resolve(&row("Kano")).unwrap_err();
        assert_eq!(err.row, 2);
        assert_eq!(err.name.as_deref(), Some("Ikeja"));
    }
}
