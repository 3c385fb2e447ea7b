// ==========================================
// G4IT 设备清单 - 单值类型校验器
// ==========================================
// 职责: 判断单个原始值是否符合声明类型
// 规则:
// - 空值恒通过（必填性由调用方判断）
// - string: 任意非空值
// - integer: TRIM 后可选 +/- 号 + 十进制数字（不含小数点）
// - number: TRIM 后可解析为浮点数
// - date: TRIM 后匹配 YYYY-MM-DD 且为合法日历日期
// ==========================================

use crate::domain::schema::ColumnType;
use crate::domain::table::CellValue;
use crate::i18n::t_with_args;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

static ISO_DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("ISO 日期正则非法"));

/// 校验单值
///
/// # 返回
/// - Ok(()): 通过
/// - Err(String): 失败原因（含被拒绝的值）
pub fn validate_value(value: &CellValue, expected_type: ColumnType) -> Result<(), String> {
    if value.is_empty() {
        return Ok(());
    }

    let text = value.as_text();
    let trimmed = text.trim();

    match expected_type {
        ColumnType::String => Ok(()),
        ColumnType::Integer => {
            if is_integer_literal(value, trimmed) {
                Ok(())
            } else {
                Err(t_with_args("validation.invalid_integer", &[("value", &text)]))
            }
        }
        ColumnType::Number => {
            if value.as_f64().is_some() {
                Ok(())
            } else {
                Err(t_with_args("validation.invalid_number", &[("value", &text)]))
            }
        }
        ColumnType::Date => {
            if parse_iso_date(trimmed).is_some() {
                Ok(())
            } else {
                Err(t_with_args("validation.invalid_date", &[("value", &text)]))
            }
        }
    }
}

/// 按类型名校验（类型名来自外部输入时使用）
///
/// 未知类型名返回 "unknown type" 错误。
pub fn validate_value_named(value: &CellValue, type_name: &str) -> Result<(), String> {
    if value.is_empty() {
        return Ok(());
    }
    match type_name.parse::<ColumnType>() {
        Ok(column_type) => validate_value(value, column_type),
        Err(_) => Err(t_with_args("validation.unknown_type", &[("type", type_name)])),
    }
}

/// 严格解析 YYYY-MM-DD（拒绝 2024-02-30、2024-1-5 等）
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    if !ISO_DATE_PATTERN.is_match(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn is_integer_literal(value: &CellValue, trimmed: &str) -> bool {
    match value {
        CellValue::Integer(_) => true,
        // 浮点单元格按显示形式判断（3.0 显示为 "3"）
        _ => {
            let digits = trimmed
                .strip_prefix('+')
                .or_else(|| trimmed.strip_prefix('-'))
                .unwrap_or(trimmed);
            !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
        }
    }
}
