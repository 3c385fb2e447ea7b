// ==========================================
// G4IT 设备清单 - 日期修复引擎
// ==========================================
// 职责: 检测日/月颠倒的日期并修复为 MM-DD-YYYY（连字符）
// 规则: 按 '/'（优先）或 '-' 拆成三段整数，位置解释为 (月, 日, 年)
//       月 > 12 ⇒ 视为日月颠倒，交换后输出
// 局限: 两段都 ≤ 12 时（如 03-04-2024）无法判断，保持原样
// ==========================================
// 单元格状态:
//   EMPTY                       → 跳过
//   PARSE_FAIL                  → 无法修复（保留原值）
//   PARSE_OK & 月≤12 & 分隔'-'  → 不变
//   PARSE_OK & 月≤12 & 分隔'/'  → 规范化
//   PARSE_OK & 月>12            → 交换 + 规范化
// ==========================================

use crate::domain::report::{DateCheckReport, DateFixReport, DateIssue, DateIssueKind};
use crate::domain::table::{CellValue, Table};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::table_validator::FIRST_DATA_ROW;
use crate::engine::type_validator::parse_iso_date;
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// 日志中逐条展示的问题数上限
const MAX_LOGGED_ISSUES: usize = 5;

/// 解析后的日期三段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DateParts {
    month: i64,
    day: i64,
    year: i64,
    /// 原分隔符为 '/'（需要规范化）
    slash: bool,
}

impl DateParts {
    fn needs_swap(&self) -> bool {
        self.month > 12
    }
}

/// 单元格分类结果
#[derive(Debug, Clone, PartialEq, Eq)]
enum DateCell {
    Empty,
    Unparseable(String),
    Parsed(DateParts),
}

/// 单元格修复动作
#[derive(Debug, Clone, PartialEq, Eq)]
enum DateAction {
    Skip,
    Unfixable(String),
    Unchanged,
    Normalized(String),
    Swapped(String),
}

fn classify(value: &CellValue) -> DateCell {
    if value.is_empty() {
        return DateCell::Empty;
    }

    let text = value.as_text();
    let slash = text.contains('/');
    let separator = if slash { '/' } else { '-' };

    let parts: Vec<&str> = text.split(separator).collect();
    if parts.len() != 3 {
        return DateCell::Unparseable(text);
    }

    let parsed: Option<Vec<i64>> = parts.iter().map(|p| p.trim().parse::<i64>().ok()).collect();
    match parsed.as_deref() {
        Some([month, day, year]) => DateCell::Parsed(DateParts {
            month: *month,
            day: *day,
            year: *year,
            slash,
        }),
        _ => DateCell::Unparseable(text),
    }
}

fn plan_action(value: &CellValue) -> DateAction {
    match classify(value) {
        DateCell::Empty => DateAction::Skip,
        DateCell::Unparseable(text) => DateAction::Unfixable(text),
        DateCell::Parsed(parts) if parts.needs_swap() => {
            // 大于 12 的一段只能是日：原"日"成为月
            DateAction::Swapped(format!("{:02}-{:02}-{}", parts.day, parts.month, parts.year))
        }
        DateCell::Parsed(parts) if parts.slash => {
            DateAction::Normalized(format!("{:02}-{:02}-{}", parts.month, parts.day, parts.year))
        }
        DateCell::Parsed(_) => DateAction::Unchanged,
    }
}

/// 扫描日期列，遇到首个月份 > 12 的单元格即停止
///
/// # 错误
/// - ColumnNotFound: 扫描到的某行缺少该列（逐行惰性检查）
#[instrument(skip(table), fields(rows = table.len()))]
pub fn scan_dates(table: &Table, date_column: &str) -> EngineResult<DateCheckReport> {
    let mut report = DateCheckReport {
        column: date_column.to_string(),
        ..Default::default()
    };

    for (idx, row) in table.rows.iter().enumerate() {
        let row_number = idx + FIRST_DATA_ROW;
        let value = row.get(date_column).ok_or_else(|| EngineError::ColumnNotFound {
            column: date_column.to_string(),
            row: row_number,
        })?;
        report.rows_scanned += 1;

        match classify(value) {
            DateCell::Empty => report.issues.push(DateIssue {
                row: row_number,
                value: String::new(),
                kind: DateIssueKind::Missing,
            }),
            DateCell::Unparseable(text) => report.issues.push(DateIssue {
                row: row_number,
                value: text,
                kind: DateIssueKind::Unparseable,
            }),
            DateCell::Parsed(parts) if parts.needs_swap() => {
                let text = value.as_text();
                info!(row = row_number, value = %text, month = parts.month, "检测到日月颠倒的日期");
                report.needs_repair = true;
                report.first_swapped_row = Some(row_number);
                report.first_swapped_value = Some(text);
                return Ok(report);
            }
            DateCell::Parsed(_) => {}
        }
    }

    log_issues("无效日期", &report.issues);
    Ok(report)
}

/// 判断日期列是否需要修复
pub fn needs_repair(table: &Table, date_column: &str) -> EngineResult<bool> {
    scan_dates(table, date_column).map(|report| report.needs_repair)
}

/// 修复日期列（原地修改）
///
/// 先对所有行规划动作，任何一行缺列则整体失败、表格保持不变；
/// 无法解析的单元格保留原值并计入报告。
#[instrument(skip(table), fields(rows = table.len()))]
pub fn fix_dates(table: &mut Table, date_column: &str) -> EngineResult<DateFixReport> {
    repair(table, date_column, |_, _| true)
}

/// 仅修复指定行（行号同校验报告）中不符合 YYYY-MM-DD 的单元格
///
/// 未选中的行与已合法的 ISO 日期计为不变。缺列检查仍覆盖所有行。
#[instrument(skip(table, rows), fields(rows = table.len(), selected = rows.len()))]
pub fn fix_invalid_dates(
    table: &mut Table,
    date_column: &str,
    rows: &HashSet<usize>,
) -> EngineResult<DateFixReport> {
    repair(table, date_column, |row_number, value| {
        rows.contains(&row_number) && parse_iso_date(value.as_text().trim()).is_none()
    })
}

fn repair<F>(table: &mut Table, date_column: &str, selected: F) -> EngineResult<DateFixReport>
where
    F: Fn(usize, &CellValue) -> bool,
{
    // 阶段 1: 规划（只读）
    let mut actions = Vec::with_capacity(table.len());
    for (idx, row) in table.rows.iter().enumerate() {
        let row_number = idx + FIRST_DATA_ROW;
        let value = row.get(date_column).ok_or_else(|| EngineError::ColumnNotFound {
            column: date_column.to_string(),
            row: row_number,
        })?;
        let action = if selected(row_number, value) {
            plan_action(value)
        } else {
            DateAction::Unchanged
        };
        actions.push((row_number, action));
    }

    // 阶段 2: 应用
    let mut report = DateFixReport {
        column: date_column.to_string(),
        ..Default::default()
    };

    for (row, (row_number, action)) in table.rows.iter_mut().zip(actions) {
        match action {
            DateAction::Skip => report.skipped_empty += 1,
            DateAction::Unchanged => report.unchanged += 1,
            DateAction::Unfixable(text) => report.unfixable.push(DateIssue {
                row: row_number,
                value: text,
                kind: DateIssueKind::Unparseable,
            }),
            DateAction::Normalized(fixed) => {
                debug!(row = row_number, fixed = %fixed, "日期分隔符已规范化");
                row.insert(date_column.to_string(), CellValue::Text(fixed));
                report.normalized += 1;
            }
            DateAction::Swapped(fixed) => {
                debug!(row = row_number, fixed = %fixed, "日期日月已交换");
                row.insert(date_column.to_string(), CellValue::Text(fixed));
                report.swapped += 1;
            }
        }
    }

    log_issues("无法修复的日期", &report.unfixable);
    info!(
        column = date_column,
        swapped = report.swapped,
        normalized = report.normalized,
        unfixable = report.unfixable.len(),
        "日期修复完成"
    );

    Ok(report)
}

fn log_issues(label: &str, issues: &[DateIssue]) {
    if issues.is_empty() {
        return;
    }
    for issue in issues.iter().take(MAX_LOGGED_ISSUES) {
        warn!(row = issue.row, value = %issue.value, kind = ?issue.kind, "{}", label);
    }
    if issues.len() > MAX_LOGGED_ISSUES {
        warn!(remaining = issues.len() - MAX_LOGGED_ISSUES, "{}: 其余问题未逐条列出", label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date_table(values: &[&str]) -> Table {
        Table::from_values(
            ["nomEquipementPhysique", "dateAchat"],
            values
                .iter()
                .enumerate()
                .map(|(i, v)| vec![CellValue::text(format!("EQ{}", i)), CellValue::from_raw(v)])
                .collect(),
        )
    }

    fn cell(table: &Table, idx: usize) -> String {
        table.rows[idx]
            .get("dateAchat")
            .map(|v| v.as_text())
            .unwrap_or_default()
    }

    #[test]
    fn test_classify_cells() {
        assert_eq!(classify(&CellValue::Empty), DateCell::Empty);
        assert_eq!(
            classify(&CellValue::text("15/03/2024")),
            DateCell::Parsed(DateParts { month: 15, day: 3, year: 2024, slash: true })
        );
        assert_eq!(
            classify(&CellValue::text("03-15-2024")),
            DateCell::Parsed(DateParts { month: 3, day: 15, year: 2024, slash: false })
        );
        assert!(matches!(classify(&CellValue::text("15/03")), DateCell::Unparseable(_)));
        assert!(matches!(classify(&CellValue::text("aa/bb/cc")), DateCell::Unparseable(_)));
        assert!(matches!(classify(&CellValue::Integer(20240315)), DateCell::Unparseable(_)));
    }

    #[test]
    fn test_needs_repair_detects_swapped_month() {
        let table = date_table(&["03/15/2024", "15/03/2024"]);
        assert!(needs_repair(&table, "dateAchat").unwrap());

        let report = scan_dates(&table, "dateAchat").unwrap();
        assert_eq!(report.first_swapped_row, Some(3));
        assert_eq!(report.first_swapped_value.as_deref(), Some("15/03/2024"));
    }

    #[test]
    fn test_needs_repair_ambiguous_dates_not_flagged() {
        let table = date_table(&["03-04-2024", "12/01/2023"]);
        assert!(!needs_repair(&table, "dateAchat").unwrap());
    }

    #[test]
    fn test_needs_repair_invalid_cells_do_not_trigger() {
        let table = date_table(&["", "n/a", "2024"]);
        let report = scan_dates(&table, "dateAchat").unwrap();

        assert!(!report.needs_repair);
        assert_eq!(report.issues.len(), 3);
        assert_eq!(report.issues[0].kind, DateIssueKind::Missing);
        assert_eq!(report.issues[1].kind, DateIssueKind::Unparseable);
        assert_eq!(report.rows_scanned, 3);
    }

    #[test]
    fn test_needs_repair_missing_column_fails() {
        let table = date_table(&["03/15/2024"]);
        let err = needs_repair(&table, "dateRetrait").unwrap_err();
        assert_eq!(
            err,
            EngineError::ColumnNotFound {
                column: "dateRetrait".to_string(),
                row: 2
            }
        );
    }

    #[test]
    fn test_needs_repair_short_circuits_before_sparse_row() {
        let mut table = date_table(&["15/03/2024"]);
        table.rows.push(Default::default());
        assert!(needs_repair(&table, "dateAchat").unwrap());
    }

    #[test]
    fn test_fix_dates_all_transitions() {
        let mut table = date_table(&["03/15/2024", "15/03/2024", "03-15-2024", "", "bad", "25-12-2023"]);
        let report = fix_dates(&mut table, "dateAchat").unwrap();

        assert_eq!(cell(&table, 0), "03-15-2024");
        assert_eq!(cell(&table, 1), "03-15-2024");
        assert_eq!(cell(&table, 2), "03-15-2024");
        assert_eq!(cell(&table, 3), "");
        assert_eq!(cell(&table, 4), "bad");
        assert_eq!(cell(&table, 5), "12-25-2023");

        assert_eq!(report.swapped, 2);
        assert_eq!(report.normalized, 1);
        assert_eq!(report.unchanged, 1);
        assert_eq!(report.skipped_empty, 1);
        assert_eq!(report.unfixable.len(), 1);
        assert_eq!(report.unfixable[0].row, 6);
        assert_eq!(report.corrections_applied(), 3);
    }

    #[test]
    fn test_fix_dates_zero_pads() {
        let mut table = date_table(&["3/5/2024", "31/1/2024"]);
        fix_dates(&mut table, "dateAchat").unwrap();
        assert_eq!(cell(&table, 0), "03-05-2024");
        assert_eq!(cell(&table, 1), "01-31-2024");
    }

    #[test]
    fn test_fix_dates_is_idempotent() {
        let mut table = date_table(&["15/03/2024", "03/15/2024", "07-04-2021"]);
        fix_dates(&mut table, "dateAchat").unwrap();
        let once = table.clone();

        let report = fix_dates(&mut table, "dateAchat").unwrap();
        assert_eq!(table, once);
        assert_eq!(report.corrections_applied(), 0);
    }

    #[test]
    fn test_fix_dates_missing_column_leaves_table_untouched() {
        let mut table = date_table(&["15/03/2024", "15/03/2024"]);
        table.rows[1].remove("dateAchat");
        let before = table.clone();

        let err = fix_dates(&mut table, "dateAchat").unwrap_err();
        assert!(matches!(err, EngineError::ColumnNotFound { row: 3, .. }));
        assert_eq!(table, before);
    }

    #[test]
    fn test_fix_dates_preserves_other_columns_and_order() {
        let mut table = date_table(&["15/03/2024", "01/02/2020"]);
        let names_before: Vec<_> = table.column_values("nomEquipementPhysique").cloned().collect();
        fix_dates(&mut table, "dateAchat").unwrap();

        let names_after: Vec<_> = table.column_values("nomEquipementPhysique").cloned().collect();
        assert_eq!(names_before, names_after);
        assert_eq!(table.columns, vec!["nomEquipementPhysique", "dateAchat"]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_fix_invalid_dates_keeps_iso_cells() {
        let mut table = date_table(&["2024-03-15", "15/03/2024", "03/04/2024"]);
        // 行号 2 为 ISO 日期，即使被选中也不改写
        let rows: HashSet<usize> = [2, 3].into_iter().collect();

        let report = fix_invalid_dates(&mut table, "dateAchat", &rows).unwrap();
        assert_eq!(cell(&table, 0), "2024-03-15");
        assert_eq!(cell(&table, 1), "03-15-2024");
        // 行号 4 未被选中
        assert_eq!(cell(&table, 2), "03/04/2024");
        assert_eq!(report.swapped, 1);
        assert_eq!(report.normalized, 0);
        assert_eq!(report.unchanged, 2);
    }

    #[test]
    fn test_fix_invalid_dates_still_checks_every_row() {
        let mut table = date_table(&["15/03/2024", "2024-01-01"]);
        table.rows[1].remove("dateAchat");
        let before = table.clone();
        let rows: HashSet<usize> = [2].into_iter().collect();

        let err = fix_invalid_dates(&mut table, "dateAchat", &rows).unwrap_err();
        assert!(matches!(err, EngineError::ColumnNotFound { row: 3, .. }));
        assert_eq!(table, before);
    }
}
