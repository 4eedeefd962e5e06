// ==========================================
// 教会行政管理系统 - 仓储层行映射工具
// ==========================================

use crate::db::TS_FORMAT;
use chrono::{NaiveDateTime, Utc};
use rusqlite::types::Type;

/// 当前 UTC 时间（秒精度，与落库格式一致）
pub(crate) fn now_ts() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    NaiveDateTime::parse_from_str(&now.format(TS_FORMAT).to_string(), TS_FORMAT).unwrap_or(now)
}

pub(crate) fn format_ts(ts: &NaiveDateTime) -> String {
    ts.format(TS_FORMAT).to_string()
}

/// 解析时间戳列
pub(crate) fn parse_ts(idx: usize, value: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TS_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// 解析枚举列（parser 返回 None 视为脏数据）
pub(crate) fn parse_enum<T>(
    idx: usize,
    value: &str,
    what: &str,
    parser: impl Fn(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    parser(value).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("无效的{}: {}", what, value).into(),
        )
    })
}

/// 文本规整：去首尾空白，空串视为 None
pub(crate) fn normalize_opt(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ts_roundtrip() {
        let ts = now_ts();
        let parsed = parse_ts(0, &format_ts(&ts)).unwrap();
        assert_eq!(parsed, ts);
    }

    #[test]
    fn test_parse_enum_invalid() {
        let result = parse_enum(3, "PARISH", "层级", crate::domain::OrgLevel::parse);
        assert!(result.is_err());
    }

    #[test]
    fn test_normalize_opt() {
        assert_eq!(normalize_opt(Some("  ")), None);
        assert_eq!(normalize_opt(Some(" Bro. John ")), Some("Bro. John".to_string()));
        assert_eq!(normalize_opt(None), None);
    }
}
