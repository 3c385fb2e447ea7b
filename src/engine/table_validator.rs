// ==========================================
// G4IT 设备清单 - 表格校验器
// ==========================================
// 职责: 列完整性 + 单元格类型校验 → ValidationReport
// 红线: 不修改表格；单元格问题全部进入报告，不抛错
// 行号: 表头为第 1 行，首个数据行为第 2 行
// ==========================================

use crate::domain::report::{TypeError, ValidationReport};
use crate::domain::schema::Schema;
use crate::domain::table::Table;
use crate::engine::type_validator::validate_value;
use crate::i18n::t;
use tracing::{debug, info, instrument};

/// 首个数据行的行号（表头占第 1 行）
pub const FIRST_DATA_ROW: usize = 2;

/// 校验整张表
#[instrument(skip_all, fields(rows = table.len()))]
pub fn validate(table: &Table, schema: &Schema) -> ValidationReport {
    if table.is_empty() {
        info!("表格无数据行");
        return ValidationReport {
            is_valid: false,
            general_error: Some(t("validation.no_data")),
            ..Default::default()
        };
    }

    let mut report = header_report(table.detected_columns(), schema);

    // 单元格校验
    for (idx, row) in table.rows.iter().enumerate() {
        let row_number = idx + FIRST_DATA_ROW;

        for spec in schema.iter() {
            // 行中不存在该列：跳过（列缺失已由表头检查报告）
            let Some(value) = row.get(&spec.name) else {
                continue;
            };

            if value.is_empty() {
                if spec.required {
                    report.type_errors.push(TypeError {
                        row: row_number,
                        column: spec.name.clone(),
                        value: String::new(),
                        expected_type: spec.column_type.to_string(),
                        error: t("validation.required_missing"),
                    });
                }
                continue;
            }

            if let Err(error) = validate_value(value, spec.column_type) {
                debug!(row = row_number, column = %spec.name, "类型校验失败");
                report.type_errors.push(TypeError {
                    row: row_number,
                    column: spec.name.clone(),
                    value: value.as_text(),
                    expected_type: spec.column_type.to_string(),
                    error,
                });
            }
        }
    }

    report.is_valid = report.missing_required_columns.is_empty() && report.type_errors.is_empty();

    info!(
        is_valid = report.is_valid,
        missing_columns = report.missing_required_columns.len(),
        type_errors = report.type_errors.len(),
        "表格校验完成"
    );

    report
}

/// 仅校验表头（上传时的列检测）
pub fn validate_headers(headers: &[String], schema: &Schema) -> ValidationReport {
    let mut report = header_report(headers.to_vec(), schema);
    report.is_valid = report.missing_required_columns.is_empty();
    report
}

fn header_report(detected_columns: Vec<String>, schema: &Schema) -> ValidationReport {
    let missing_required_columns = schema
        .iter()
        .filter(|spec| spec.required && !detected_columns.iter().any(|c| *c == spec.name))
        .map(|spec| spec.name.clone())
        .collect();

    ValidationReport {
        is_valid: false,
        required_columns: schema.required_columns(),
        optional_columns: schema.optional_columns(),
        detected_columns,
        missing_required_columns,
        type_errors: Vec::new(),
        general_error: None,
    }
}
