// ==========================================
// 教会行政管理系统 - 字段映射器实现
// ==========================================
// 职责: 表头 → 标准字段映射 + 必填列/必填值检查
// 规则: 导入层级自身的列标签（如导入组时的 GROUP）等同 NAME
// ==========================================

use crate::domain::import::ImportRowError;
use crate::domain::types::OrgLevel;
use crate::i18n::t_with_args;
use crate::importer::org_importer_trait::{DataCleaner, RawRow};
use std::collections::BTreeMap;

/// 标准列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Name,
    Code,
    Leader,
    Parent(OrgLevel),
}

impl ColumnKind {
    pub fn label(&self) -> &'static str {
        match self {
            ColumnKind::Name => "NAME",
            ColumnKind::Code => "CODE",
            ColumnKind::Leader => "LEADER",
            ColumnKind::Parent(level) => level.column_label(),
        }
    }
}

/// 识别已归一化的表头
///
/// # 参数
/// - header: 经 DataCleaner::normalize_header 处理后的表头
/// - level: 正在导入的层级
pub fn classify_header(header: &str, level: OrgLevel) -> Option<ColumnKind> {
    let own = level.column_label();
    if header == "NAME" || header == own || header == format!("{} NAME", own) {
        return Some(ColumnKind::Name);
    }
    if header == "CODE" || header == format!("{} CODE", own) {
        return Some(ColumnKind::Code);
    }
    if header == "LEADER" || header == "LEADER NAME" || header == format!("{} LEADER", own) {
        return Some(ColumnKind::Leader);
    }

    let base = header.strip_suffix(" NAME").unwrap_or(header);
    level
        .allowed_parents()
        .iter()
        .find(|parent| parent.column_label() == base)
        .map(|parent| ColumnKind::Parent(*parent))
}

// ==========================================
// OrgUnitRow - 映射后的一行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgUnitRow {
    pub row_number: usize,
    pub name: String,
    pub code: Option<String>,
    pub leader: Option<String>,
    /// 上级层级 -> 上级名称
    pub parent_names: BTreeMap<OrgLevel, String>,
}

// ==========================================
// FieldMapper - 按表头构建一次，逐行映射
// ==========================================
pub struct FieldMapper {
    level: OrgLevel,
    columns: Vec<(String, ColumnKind)>,
    missing: Vec<ColumnKind>,
}

impl FieldMapper {
    pub fn new(level: OrgLevel, headers: &[String], cleaner: &dyn DataCleaner) -> Self {
        let columns: Vec<(String, ColumnKind)> = headers
            .iter()
            .filter_map(|raw| {
                classify_header(&cleaner.normalize_header(raw), level)
                    .map(|kind| (raw.clone(), kind))
            })
            .collect();

        let missing = Self::required_kinds(level)
            .into_iter()
            .filter(|kind| !columns.iter().any(|(_, k)| k == kind))
            .collect();

        Self {
            level,
            columns,
            missing,
        }
    }

    /// 该层级的必填列：NAME + 必填上级
    fn required_kinds(level: OrgLevel) -> Vec<ColumnKind> {
        std::iter::once(ColumnKind::Name)
            .chain(level.required_parents().iter().map(|p| ColumnKind::Parent(*p)))
            .collect()
    }

    pub fn level(&self) -> OrgLevel {
        self.level
    }

    /// 表头中缺失的必填列
    pub fn missing_columns(&self) -> Vec<&'static str> {
        self.missing.iter().map(ColumnKind::label).collect()
    }

    /// 同一标准列出现多次时取第一个非空值
    fn value(&self, row: &RawRow, kind: ColumnKind, cleaner: &dyn DataCleaner) -> Option<String> {
        self.columns
            .iter()
            .filter(|(_, k)| *k == kind)
            .find_map(|(header, _)| cleaner.normalize_null(row.cells.get(header).map(String::as_str)))
    }

    /// 映射一行
    ///
    /// # 返回
    /// - Ok(OrgUnitRow): 必填列齐全且非空
    /// - Err(ImportRowError): 缺列或必填值为空，该行不得写入
    pub fn map_row(
        &self,
        row: &RawRow,
        cleaner: &dyn DataCleaner,
    ) -> Result<OrgUnitRow, ImportRowError> {
        let name = self.value(row, ColumnKind::Name, cleaner);

        if !self.missing.is_empty() {
            let columns = self.missing_columns().join(", ");
            return Err(ImportRowError {
                row: row.row_number,
                name,
                message: t_with_args("import.missing_column", &[("column", columns.as_str())]),
            });
        }

        let empty: Vec<&'static str> = Self::required_kinds(self.level)
            .into_iter()
            .filter(|kind| self.value(row, *kind, cleaner).is_none())
            .map(|kind| kind.label())
            .collect();
        if !empty.is_empty() {
            let columns = empty.join(", ");
            return Err(ImportRowError {
                row: row.row_number,
                name,
                message: t_with_args("import.missing_value", &[("column", columns.as_str())]),
            });
        }

        let parent_names = self
            .level
            .allowed_parents()
            .iter()
            .filter_map(|parent| {
                self.value(row, ColumnKind::Parent(*parent), cleaner)
                    .map(|value| (*parent, value))
            })
            .collect();

        Ok(OrgUnitRow {
            row_number: row.row_number,
            name: name.unwrap_or_default(),
            code: self.value(row, ColumnKind::Code, cleaner),
            leader: self.value(row, ColumnKind::Leader, cleaner),
            parent_names,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::data_cleaner::DataCleaner as Cleaner;
    use std::collections::HashMap;

    fn raw(row_number: usize, pairs: &[(&str, &str)]) -> RawRow {
        RawRow {
            row_number,
            cells: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        }
    }

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_classify_header_variants() {
        use ColumnKind::*;
        assert_eq!(classify_header("NAME", OrgLevel::State), Some(Name));
        assert_eq!(classify_header("STATE", OrgLevel::State), Some(Name));
        assert_eq!(classify_header("STATE NAME", OrgLevel::State), Some(Name));
        assert_eq!(classify_header("STATE", OrgLevel::Region), Some(Parent(OrgLevel::State)));
        assert_eq!(classify_header("GROUP", OrgLevel::Group), Some(Name));
        assert_eq!(classify_header("GROUP", OrgLevel::District), Some(Parent(OrgLevel::Group)));
        assert_eq!(classify_header("DISTRICT", OrgLevel::District), Some(Name));
        assert_eq!(classify_header("OLD GROUP NAME", OrgLevel::Group), Some(Parent(OrgLevel::OldGroup)));
        assert_eq!(classify_header("LEADER NAME", OrgLevel::Region), Some(Leader));
        assert_eq!(classify_header("REGION CODE", OrgLevel::Region), Some(Code));
        assert_eq!(classify_header("DISTRICT", OrgLevel::Group), None);
        assert_eq!(classify_header("REMARKS", OrgLevel::Group), None);
    }

    #[test]
    fn test_map_row_with_parents() {
        let cleaner = Cleaner;
        let mapper = FieldMapper::new(
            OrgLevel::Group,
            &headers(&["Group", "state_name", "Region", "OldGroup", "Leader"]),
            &cleaner,
        );
        assert!(mapper.missing_columns().is_empty());

        let row = raw(
            4,
            &[
                ("Group", " Alausa "),
                ("state_name", "Lagos"),
                ("Region", "Ikeja"),
                ("OldGroup", ""),
                ("Leader", "Bro.  Tunde"),
            ],
        );
        let mapped = mapper.map_row(&row, &cleaner).unwrap();
        assert_eq!(mapped.name, "Alausa");
        assert_eq!(mapped.leader.as_deref(), Some("Bro. Tunde"));
        assert_eq!(mapped.parent_names.get(&OrgLevel::State).map(String::as_str), Some("Lagos"));
        assert!(!mapped.parent_names.contains_key(&OrgLevel::OldGroup));
    }

    #[test]
    fn test_missing_required_column_errors_every_row() {
        let cleaner = Cleaner;
        let mapper = FieldMapper::new(OrgLevel::Region, &headers(&["REGION NAME", "CODE"]), &cleaner);
        assert_eq!(mapper.missing_columns(), vec!["STATE"]);

        let err = mapper
            .map_row(&raw(1, &[("REGION NAME", "Ikeja"), ("CODE", "IK")]), &cleaner)
            .unwrap_err();
        assert_eq!(err.row, 1);
        assert_eq!(err.name.as_deref(), Some("Ikeja"));
    }

    #[test]
    fn test_empty_required_value() {
        let cleaner = Cleaner;
        let mapper = FieldMapper::new(OrgLevel::Region, &headers(&["NAME", "STATE"]), &cleaner);
        let err = mapper
            .map_row(&raw(2, &[("NAME", "Ikeja"), ("STATE", "  ")]), &cleaner)
            .unwrap_err();
        assert_eq!(err.row, 2);

        let err = mapper
            .map_row(&raw(3, &[("NAME", ""), ("STATE", "Lagos")]), &cleaner)
            .unwrap_err();
        assert_eq!(err.name, None);
    }
}
