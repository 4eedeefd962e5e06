// ==========================================
// 教会行政管理系统 - 校验规则
// ==========================================

use crate::i18n::{t, t_with_args};
use crate::validation::ValidationErrors;
use regex::Regex;
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
            .expect("invalid regex")
    })
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+?[0-9]{7,15}$").expect("invalid regex"))
}

/// 必填文本（去空白后非空）
pub fn require_text(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(field, t_with_args("validation.required", &[("field", field)]));
    }
}

/// 必填引用
pub fn require_id(errors: &mut ValidationErrors, field: &str, value: Option<i64>) {
    if value.is_none() {
        errors.push(field, t_with_args("validation.required", &[("field", field)]));
    }
}

/// 单项人数上限
pub const MAX_COUNT: i64 = 1_000_000;

pub fn non_negative(errors: &mut ValidationErrors, field: &str, value: i64) {
    if value < 0 {
        errors.push(field, t_with_args("validation.non_negative", &[("field", field)]));
    }
}

/// 人数: 0..=MAX_COUNT
pub fn count_in_range(errors: &mut ValidationErrors, field: &str, value: i64) {
    non_negative(errors, field, value);
    if value > MAX_COUNT {
        let max = MAX_COUNT.to_string();
        errors.push(
            field,
            t_with_args(
                "validation.count_too_large",
                &[("field", field), ("max", max.as_str())],
            ),
        );
    }
}

pub fn month_in_range(errors: &mut ValidationErrors, month: i64) {
    if !(1..=12).contains(&month) {
        errors.push("month", t("validation.month_range"));
    }
}

pub fn week_in_range(errors: &mut ValidationErrors, week: i64) {
    if !(1..=5).contains(&week) {
        errors.push("week", t("validation.week_range"));
    }
}

pub fn year_in_range(errors: &mut ValidationErrors, year: i32) {
    if !(2000..=2100).contains(&year) {
        errors.push("year", t("validation.year_range"));
    }
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email.trim())
}

pub fn email(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        require_text(errors, field, value);
    } else if !is_valid_email(value) {
        errors.push(field, t("validation.invalid_email"));
    }
}

/// 电话可空；填写时须为 7-15 位数字，可带前导 +
pub fn optional_phone(errors: &mut ValidationErrors, field: &str, value: Option<&str>) {
    if let Some(phone) = value.map(str::trim).filter(|p| !p.is_empty()) {
        let compact: String = phone.chars().filter(|c| !matches!(c, ' ' | '-')).collect();
        if !phone_regex().is_match(&compact) {
            errors.push(field, t("validation.invalid_phone"));
        }
    }
}

// ==========================================
// PasswordPolicy - 密码强度规则
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self { min_length: 8 }
    }
}

impl PasswordPolicy {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    /// 逐条检查，每条未满足的规则记一条错误
    pub fn check(&self, errors: &mut ValidationErrors, field: &str, password: &str) {
        let min = self.min_length.to_string();
        if password.chars().count() < self.min_length {
            errors.push(
                field,
                t_with_args("validation.password_too_short", &[("min", min.as_str())]),
            );
        }
        if !password.chars().any(|c| c.is_uppercase()) {
            errors.push(field, t("validation.password_uppercase"));
        }
        if !password.chars().any(|c| c.is_lowercase()) {
            errors.push(field, t("validation.password_lowercase"));
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push(field, t("validation.password_digit"));
        }
        if !password
            .chars()
            .any(|c| !c.is_alphanumeric() && !c.is_whitespace())
        {
            errors.push(field, t("validation.password_special"));
        }
    }

    pub fn is_strong(&self, password: &str) -> bool {
        let mut errors = ValidationErrors::new();
        self.check(&mut errors, "password", password);
        errors.is_empty()
    }
}
