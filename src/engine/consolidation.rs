// ==========================================
// G4IT 设备清单 - 合并引擎
// ==========================================
// 职责: 按分组字段合并设备行 → ConsolidatedRecord
// 聚合: 全表有限数值列 → 组内求和；其他列 → 组内众数（并列取首次出现）
//       组内无非空值 → NoValue
// 计数: quantite 恒为组内行数；数据列 quantite 照常聚合，
//       输出为表格时改名为 quantiteCumulee
// 顺序: 分组按键元组首次出现的顺序输出
// ==========================================

use crate::domain::report::{AggregatedValue, ConsolidatedRecord};
use crate::domain::table::{CellValue, Row, Table};
use crate::engine::error::{EngineError, EngineResult};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument};

/// 组内行数列名
pub const QUANTITY_FIELD: &str = "quantite";

/// 数据列 quantite 聚合值在输出表中的列名
pub const CUMULATED_QUANTITY_FIELD: &str = "quantiteCumulee";

/// 合并设备行
///
/// # 错误
/// - MissingField: 分组字段不在表格列集合中
#[instrument(skip(table), fields(rows = table.len()))]
pub fn consolidate(table: &Table, group_by: &[String]) -> EngineResult<Vec<ConsolidatedRecord>> {
    let columns = table.detected_columns();
    if let Some(missing) = group_by.iter().find(|field| !columns.contains(*field)) {
        return Err(EngineError::MissingField(missing.clone()));
    }

    let value_columns: Vec<String> = columns
        .iter()
        .filter(|c| !group_by.contains(*c))
        .cloned()
        .collect();
    let numeric: HashSet<&str> = value_columns
        .iter()
        .filter(|c| is_numeric_column(table, c))
        .map(String::as_str)
        .collect();
    debug!(numeric_columns = ?numeric, "数值列识别完成");

    let groups = group_rows(table, group_by);

    let records: Vec<ConsolidatedRecord> = groups
        .into_iter()
        .map(|(key, rows)| ConsolidatedRecord {
            group_key: group_by.iter().cloned().zip(key).collect(),
            values: value_columns
                .iter()
                .map(|column| {
                    let value = if numeric.contains(column.as_str()) {
                        sum_of(&rows, column)
                    } else {
                        mode_of(&rows, column)
                    };
                    (column.clone(), value)
                })
                .collect(),
            quantite: rows.len(),
        })
        .collect();

    info!(groups = records.len(), "设备合并完成");
    Ok(records)
}

/// 合并结果转为表格（分组列 + 聚合列 + quantite）
///
/// `source_columns` 为原表列顺序，决定聚合列的输出顺序。
/// 输出列名冲突时（如按 quantite 分组，或原表已有 quantiteCumulee），
/// 原表列名保持不变，派生列名依次追加 `_2`、`_3` 后缀。
pub fn consolidated_to_table(
    records: &[ConsolidatedRecord],
    group_by: &[String],
    source_columns: &[String],
) -> Table {
    let value_columns: Vec<&String> = source_columns
        .iter()
        .filter(|c| !group_by.contains(*c))
        .collect();

    let mut taken: HashSet<String> = group_by.iter().cloned().collect();
    taken.extend(
        value_columns
            .iter()
            .filter(|c| output_name(c) == c.as_str())
            .map(|c| c.to_string()),
    );
    let value_names: Vec<String> = value_columns
        .iter()
        .map(|c| {
            if output_name(c) == c.as_str() {
                c.to_string()
            } else {
                unique_name(output_name(c), &mut taken)
            }
        })
        .collect();
    let count_name = unique_name(QUANTITY_FIELD, &mut taken);
    if count_name != QUANTITY_FIELD {
        debug!(column = %count_name, "quantite 列名已占用，计数列改名");
    }

    let mut columns: Vec<String> = group_by.to_vec();
    columns.extend(value_names.iter().cloned());
    columns.push(count_name.clone());

    let mut table = Table::new(columns);
    for record in records {
        let mut row = Row::new();
        for (field, value) in &record.group_key {
            row.insert(field.clone(), value.clone());
        }
        for (column, name) in value_columns.iter().zip(&value_names) {
            let cell = record
                .value(column)
                .map(AggregatedValue::to_cell)
                .unwrap_or_default();
            row.insert(name.clone(), cell);
        }
        row.insert(count_name.clone(), CellValue::Integer(record.quantite as i64));
        table.push_row(row);
    }
    table
}

fn output_name(column: &str) -> &str {
    if column == QUANTITY_FIELD {
        CUMULATED_QUANTITY_FIELD
    } else {
        column
    }
}

/// 取未占用的列名并登记
fn unique_name(base: &str, taken: &mut HashSet<String>) -> String {
    let mut name = base.to_string();
    let mut suffix = 2;
    while taken.contains(&name) {
        name = format!("{}_{}", base, suffix);
        suffix += 1;
    }
    taken.insert(name.clone());
    name
}

/// 有限数值解释（NaN / inf 不参与求和）
fn finite_value(value: &CellValue) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

/// 全表数值列：至少一个非空值，且所有非空值均为有限数值
fn is_numeric_column(table: &Table, column: &str) -> bool {
    let mut any = false;
    for value in table.column_values(column) {
        if value.is_empty() {
            continue;
        }
        if finite_value(value).is_none() {
            return false;
        }
        any = true;
    }
    any
}

/// 按键元组分组（保持首次出现顺序）
fn group_rows<'a>(table: &'a Table, group_by: &[String]) -> Vec<(Vec<CellValue>, Vec<&'a Row>)> {
    let mut index: HashMap<Vec<CellValue>, usize> = HashMap::new();
    let mut groups: Vec<(Vec<CellValue>, Vec<&Row>)> = Vec::new();

    for row in &table.rows {
        let key: Vec<CellValue> = group_by
            .iter()
            .map(|field| row.get(field).cloned().unwrap_or_default())
            .collect();

        match index.get(&key) {
            Some(&slot) => groups[slot].1.push(row),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![row]));
            }
        }
    }
    groups
}

fn non_empty<'a>(rows: &'a [&'a Row], column: &'a str) -> impl Iterator<Item = &'a CellValue> + 'a {
    rows.iter()
        .filter_map(move |row| row.get(column))
        .filter(|value| !value.is_empty())
}

fn sum_of(rows: &[&Row], column: &str) -> AggregatedValue {
    let mut seen = false;
    let mut sum = 0.0;
    for value in non_empty(rows, column) {
        if let Some(v) = finite_value(value) {
            sum += v;
            seen = true;
        }
    }
    if seen {
        AggregatedValue::Sum(sum)
    } else {
        AggregatedValue::NoValue
    }
}

fn mode_of(rows: &[&Row], column: &str) -> AggregatedValue {
    let mut counts: HashMap<&CellValue, usize> = HashMap::new();
    let mut order: Vec<&CellValue> = Vec::new();

    for value in non_empty(rows, column) {
        let count = counts.entry(value).or_insert(0);
        if *count == 0 {
            order.push(value);
        }
        *count += 1;
    }

    // 严格大于：并列时保留先出现的值
    let mut best: Option<(&CellValue, usize)> = None;
    for value in order {
        let count = counts[value];
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }

    match best {
        Some((value, _)) => AggregatedValue::Mode(value.clone()),
        None => AggregatedValue::NoValue,
    }
}
