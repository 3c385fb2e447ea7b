// ==========================================
// G4IT 设备清单 - 列定义模型
// ==========================================
// 职责: ColumnSpec / ColumnType / Schema
// 红线: Schema 部署期固定、只读；列名在 Schema 内唯一
// ==========================================

use crate::engine::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

// ==========================================
// ColumnType - 声明类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Integer,
    Number,
    Date,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Integer => "integer",
            ColumnType::Number => "number",
            ColumnType::Date => "date",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "string" => Ok(ColumnType::String),
            "integer" => Ok(ColumnType::Integer),
            "number" => Ok(ColumnType::Number),
            "date" => Ok(ColumnType::Date),
            other => Err(other.to_string()),
        }
    }
}

// ==========================================
// ColumnSpec - 单列定义
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub required: bool,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub description: String,
    /// 示例值（供前端表单生成）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    /// 显示格式提示（如日期 YYYY-MM-DD）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl ColumnSpec {
    pub fn new(
        name: impl Into<String>,
        required: bool,
        column_type: ColumnType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            required,
            column_type,
            description: description.into(),
            example: None,
            format: None,
        }
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

// ==========================================
// Schema - 有序列定义集合
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<ColumnSpec>,
}

impl Schema {
    /// 构造 Schema，列名重复时报错
    pub fn new(columns: Vec<ColumnSpec>) -> EngineResult<Self> {
        let mut seen = HashSet::new();
        for spec in &columns {
            if !seen.insert(spec.name.as_str()) {
                return Err(EngineError::DuplicateSchemaColumn(spec.name.clone()));
            }
        }
        Ok(Self { columns })
    }

    /// 内置常量表构造（不重复校验）
    pub(crate) fn from_trusted(columns: Vec<ColumnSpec>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter()
    }

    pub fn get(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// 必填列（定义顺序）
    pub fn required_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.required)
            .map(|c| c.name.clone())
            .collect()
    }

    /// 可选列（定义顺序）
    pub fn optional_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| !c.required)
            .map(|c| c.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_rejects_duplicate_names() {
        let result = Schema::new(vec![
            ColumnSpec::new("modele", true, ColumnType::String, "Modèle"),
            ColumnSpec::new("modele", false, ColumnType::String, "Doublon"),
        ]);
        assert!(matches!(
            result,
            Err(EngineError::DuplicateSchemaColumn(name)) if name == "modele"
        ));
    }

    #[test]
    fn test_required_and_optional_keep_definition_order() {
        let schema = Schema::new(vec![
            ColumnSpec::new("b", true, ColumnType::String, ""),
            ColumnSpec::new("x", false, ColumnType::Date, ""),
            ColumnSpec::new("a", true, ColumnType::Integer, ""),
        ])
        .unwrap();
        assert_eq!(schema.required_columns(), vec!["b", "a"]);
        assert_eq!(schema.optional_columns(), vec!["x"]);
    }

    #[test]
    fn test_column_type_parse_and_serde() {
        assert_eq!("Integer".parse::<ColumnType>(), Ok(ColumnType::Integer));
        assert_eq!("uuid".parse::<ColumnType>(), Err("uuid".to_string()));

        let spec = ColumnSpec::new("dateAchat", false, ColumnType::Date, "Date d'achat")
            .with_format("YYYY-MM-DD");
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["type"], "date");
        assert_eq!(json["format"], "YYYY-MM-DD");
        assert!(json.get("example").is_none());
    }
}
