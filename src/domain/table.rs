// ==========================================
// G4IT 设备清单 - 表格数据模型
// ==========================================
// 职责: 单元格值 / 行 / 表 的内存表示
// 来源: 文件读取器产出（CSV/XLSX），引擎层读取或原地修改
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};

// ==========================================
// CellValue - 原始单元格值
// ==========================================
// 取值: 字符串 | 数值 | 空
// 相等性: 严格按变体比较（"5" 与 5 不相等，不做类型转换）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    /// 从原始文本构造（TRIM 后为空 → Empty）
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(trimmed.to_string())
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// 空值判定：Empty 或 TRIM 后为空的文本
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 数值解释（数值单元格，或可解析为浮点数的文本）
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            CellValue::Empty => None,
        }
    }

    /// 是否为数值（空值不算数值）
    pub fn is_numeric(&self) -> bool {
        !self.is_empty() && self.as_f64().is_some()
    }

    /// 文本形式（与写出文件时一致）
    pub fn as_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Empty, CellValue::Empty) => true,
            (CellValue::Integer(a), CellValue::Integer(b)) => a == b,
            (CellValue::Float(a), CellValue::Float(b)) => a.to_bits() == b.to_bits(),
            (CellValue::Text(a), CellValue::Text(b)) => a == b,
            _ => false,
        }
    }
}

// 分组键需要 Hash；浮点按位比较
impl Eq for CellValue {}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Empty => {}
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(v) => v.to_bits().hash(state),
            CellValue::Text(s) => s.hash(state),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::from_raw(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::from_raw(&value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

/// 行：列名 → 原始值
///
/// 行之间的键集合可能不一致（稀疏数据），按列名访问时需容忍缺失。
pub type Row = HashMap<String, CellValue>;

// ==========================================
// Table - 一个 CSV/XLSX 文件的内存表示
// ==========================================
// 生命周期: 读取文件创建 → 修复/映射步骤可原地修改 → 写回文件或生成报告
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// 表头（保持文件中的列顺序）
    pub columns: Vec<String>,
    /// 数据行（不含表头）
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// 按列顺序从值列表构造（多余的值忽略，缺少的列不写入行）
    pub fn from_values<C, S>(columns: C, rows: Vec<Vec<CellValue>>) -> Self
    where
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Table::new(columns.into_iter().map(Into::into).collect());
        for values in rows {
            table.push_values(values);
        }
        table
    }

    /// 追加一行（按列顺序给值）
    pub fn push_values(&mut self, values: Vec<CellValue>) {
        let row: Row = self
            .columns
            .iter()
            .cloned()
            .zip(values)
            .collect();
        self.rows.push(row);
    }

    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// 检测到的列集合
    ///
    /// 有结构化表头时直接使用表头；否则退化为第一行的键（按名称排序以保证确定性）。
    pub fn detected_columns(&self) -> Vec<String> {
        if !self.columns.is_empty() {
            return self.columns.clone();
        }
        let mut keys: Vec<String> = self
            .rows
            .first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    /// 某列的所有值（行中缺失该键时视为空）
    pub fn column_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a CellValue> + 'a {
        static EMPTY: CellValue = CellValue::Empty;
        self.rows.iter().map(move |row| row.get(name).unwrap_or(&EMPTY))
    }

    /// 行按表头顺序输出的值（缺失键输出空值）
    pub fn ordered_values(&self, row: &Row) -> Vec<CellValue> {
        self.columns
            .iter()
            .map(|c| row.get(c).cloned().unwrap_or_default())
            .collect()
    }

    /// 表头中是否存在重复列名
    pub fn duplicate_columns(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.columns
            .iter()
            .filter(|c| !seen.insert(c.as_str()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_from_raw_trims_and_detects_empty() {
        assert_eq!(CellValue::from_raw("  DC-PARIS "), CellValue::text("DC-PARIS"));
        assert_eq!(CellValue::from_raw("   "), CellValue::Empty);
        assert!(CellValue::Text("  ".to_string()).is_empty());
        assert!(!CellValue::Integer(0).is_empty());
    }

    #[test]
    fn test_cell_equality_is_strict_across_variants() {
        assert_ne!(CellValue::text("5"), CellValue::Integer(5));
        assert_ne!(CellValue::Integer(5), CellValue::Float(5.0));
        assert_eq!(CellValue::Float(2.5), CellValue::Float(2.5));
    }

    #[test]
    fn test_cell_display_whole_float_has_no_fraction() {
        assert_eq!(CellValue::Float(3.0).to_string(), "3");
        assert_eq!(CellValue::Float(2450.75).to_string(), "2450.75");
        assert_eq!(CellValue::Empty.to_string(), "");
    }

    #[test]
    fn test_cell_numeric_interpretation() {
        assert_eq!(CellValue::text(" 12 ").as_f64(), Some(12.0));
        assert!(CellValue::Integer(3).is_numeric());
        assert!(!CellValue::text("abc").is_numeric());
        assert!(!CellValue::Empty.is_numeric());
    }

    #[test]
    fn test_table_from_values_and_detected_columns() {
        let table = Table::from_values(
            ["modele", "quantite"],
            vec![vec![CellValue::text("A"), CellValue::Integer(3)]],
        );
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].get("quantite"), Some(&CellValue::Integer(3)));
        assert_eq!(table.detected_columns(), vec!["modele", "quantite"]);
    }

    #[test]
    fn test_detected_columns_falls_back_to_first_row_keys() {
        let mut table = Table::default();
        let mut row = Row::new();
        row.insert("type".to_string(), CellValue::text("PC"));
        row.insert("modele".to_string(), CellValue::text("A"));
        table.push_row(row);

        assert_eq!(table.detected_columns(), vec!["modele", "type"]);
    }

    #[test]
    fn test_column_values_tolerates_sparse_rows() {
        let mut table = Table::new(vec!["a".to_string(), "b".to_string()]);
        table.push_values(vec![CellValue::text("x")]);
        let values: Vec<&CellValue> = table.column_values("b").collect();
        assert_eq!(values, vec![&CellValue::Empty]);
    }
}
