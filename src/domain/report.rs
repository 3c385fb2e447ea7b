// ==========================================
// G4IT 设备清单 - 报告与结果模型
// ==========================================
// 职责: 校验报告 / 日期诊断与修复报告 / 合并结果 / 标准化报告
// 红线: 报告每次调用新建，生成后只读
// ==========================================

use crate::domain::table::CellValue;
use serde::{Deserialize, Serialize};

// ==========================================
// ValidationReport - 表格校验报告
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub required_columns: Vec<String>,
    pub optional_columns: Vec<String>,
    pub detected_columns: Vec<String>,
    pub missing_required_columns: Vec<String>,
    pub type_errors: Vec<TypeError>,
    /// 整体性问题（如无数据），与单元格错误区分
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub general_error: Option<String>,
}

impl ValidationReport {
    pub fn error_count(&self) -> usize {
        self.missing_required_columns.len() + self.type_errors.len()
    }
}

/// 单元格级问题（类型不符或必填值缺失）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeError {
    /// 行号（表头为第 1 行，首个数据行为第 2 行）
    pub row: usize,
    pub column: String,
    pub value: String,
    pub expected_type: String,
    pub error: String,
}

// ==========================================
// 日期诊断
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateIssueKind {
    /// 值为空，跳过
    Missing,
    /// 无法解析为三段整数
    Unparseable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateIssue {
    pub row: usize,
    pub value: String,
    pub kind: DateIssueKind,
}

/// 日期列扫描结果（needs_repair 的详细版本）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateCheckReport {
    pub column: String,
    pub needs_repair: bool,
    /// 首个触发修复的行（月份 > 12）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_swapped_row: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_swapped_value: Option<String>,
    /// 扫描中遇到的空值/无法解析值（遇到首个触发行即停止扫描）
    pub issues: Vec<DateIssue>,
    pub rows_scanned: usize,
}

/// 日期修复统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateFixReport {
    pub column: String,
    /// 月/日互换并统一分隔符
    pub swapped: usize,
    /// 仅分隔符 '/' → '-'
    pub normalized: usize,
    /// 已是规范形式
    pub unchanged: usize,
    /// 空值跳过
    pub skipped_empty: usize,
    /// 无法修复的单元格（保持原值）
    pub unfixable: Vec<DateIssue>,
}

impl DateFixReport {
    /// 实际改写的单元格数
    pub fn corrections_applied(&self) -> usize {
        self.swapped + self.normalized
    }

    pub fn unfixable_count(&self) -> usize {
        self.unfixable.len()
    }
}

// ==========================================
// 合并结果
// ==========================================

/// 非分组列的聚合值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AggregatedValue {
    /// 全表数值列：组内求和
    Sum(f64),
    /// 非数值列：组内众数（并列取首次出现）
    Mode(CellValue),
    /// 组内无非空值
    NoValue,
}

impl AggregatedValue {
    /// 转为单元格（整数和输出为整数）
    pub fn to_cell(&self) -> CellValue {
        match self {
            AggregatedValue::Sum(sum) => {
                if sum.fract() == 0.0 && sum.abs() < i64::MAX as f64 {
                    CellValue::Integer(*sum as i64)
                } else {
                    CellValue::Float(*sum)
                }
            }
            AggregatedValue::Mode(value) => value.clone(),
            AggregatedValue::NoValue => CellValue::Empty,
        }
    }
}

/// 一个分组键元组对应的合并记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedRecord {
    /// 分组字段（按调用方给定顺序）
    pub group_key: Vec<(String, CellValue)>,
    /// 其余列的聚合值（按表头顺序）
    pub values: Vec<(String, AggregatedValue)>,
    /// 组内行数
    pub quantite: usize,
}

impl ConsolidatedRecord {
    pub fn key(&self, field: &str) -> Option<&CellValue> {
        self.group_key
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, v)| v)
    }

    pub fn value(&self, column: &str) -> Option<&AggregatedValue> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| v)
    }
}

// ==========================================
// StandardizeReport - 取值标准化统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardizeReport {
    pub statut_changed: usize,
    pub type_changed: usize,
}

impl StandardizeReport {
    pub fn total_changed(&self) -> usize {
        self.statut_changed + self.type_changed
    }
}
