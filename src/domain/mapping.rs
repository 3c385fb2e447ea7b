// ==========================================
// G4IT 设备清单 - 列映射模型
// ==========================================
// 职责: 源列（位置或名称）→ 标准列名
// ==========================================

use serde::{Deserialize, Serialize};

/// 映射源列
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MappingKey {
    /// 按当前列顺序的位置（从 0 开始）
    Index(usize),
    /// 列名；若无同名列且内容为非负整数，则按位置解析
    Name(String),
}

impl From<usize> for MappingKey {
    fn from(index: usize) -> Self {
        MappingKey::Index(index)
    }
}

impl From<&str> for MappingKey {
    fn from(name: &str) -> Self {
        MappingKey::Name(name.to_string())
    }
}

impl From<String> for MappingKey {
    fn from(name: String) -> Self {
        MappingKey::Name(name)
    }
}

/// 有序映射表（保持调用方给定顺序，便于错误信息稳定）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub entries: Vec<(MappingKey, String)>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<MappingKey>, target: impl Into<String>) {
        self.entries.push((key.into(), target.into()));
    }

    pub fn with(mut self, key: impl Into<MappingKey>, target: impl Into<String>) -> Self {
        self.insert(key, target);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 解析 "源=目标" 形式的映射项（CLI 使用）
    pub fn parse_pair(raw: &str) -> Option<(MappingKey, String)> {
        let (source, target) = raw.split_once('=')?;
        let source = source.trim();
        let target = target.trim();
        if source.is_empty() || target.is_empty() {
            return None;
        }
        Some((MappingKey::Name(source.to_string()), target.to_string()))
    }
}

impl<K, V> FromIterator<(K, V)> for ColumnMapping
where
    K: Into<MappingKey>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mapping = ColumnMapping::new();
        for (k, v) in iter {
            mapping.insert(k, v);
        }
        mapping
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pair() {
        assert_eq!(
            ColumnMapping::parse_pair("0=nomEquipementPhysique"),
            Some((MappingKey::Name("0".to_string()), "nomEquipementPhysique".to_string()))
        );
        assert_eq!(ColumnMapping::parse_pair("modele"), None);
        assert_eq!(ColumnMapping::parse_pair("=modele"), None);
    }

    #[test]
    fn test_from_iter_keeps_order() {
        let mapping: ColumnMapping = [("1", "modele"), ("0", "type")].into_iter().collect();
        assert_eq!(mapping.entries[0].1, "modele");
        assert_eq!(mapping.entries[1].1, "type");
    }
}
