// ==========================================
// G4IT 设备清单 - 列映射器
// ==========================================
// 职责: 将源列（位置或名称）重命名为标准列名
// 解析: 同名列优先；否则可解析为非负整数的键按当前列顺序定位
// 红线: 未解析到任何列 / 源列重复 / 目标列冲突 → InvalidMapping，输入表不变
// ==========================================

use crate::domain::mapping::{ColumnMapping, MappingKey};
use crate::domain::table::{Row, Table};
use crate::engine::error::{EngineError, EngineResult};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// 应用列映射，返回重命名后的新表
///
/// 未映射的列原样保留，列顺序与行顺序不变。
#[instrument(skip_all, fields(rows = table.len(), entries = mapping.len()))]
pub fn apply_mapping(table: &Table, mapping: &ColumnMapping) -> EngineResult<Table> {
    let renames = resolve(table, mapping)?;

    let mut new_columns = table.columns.clone();
    for (&position, target) in &renames {
        new_columns[position] = target.clone();
    }
    check_collisions(&new_columns, renames.values())?;

    // 旧列名 → 新列名（恒等映射不需要改写行）
    let by_name: HashMap<&str, &str> = renames
        .iter()
        .map(|(&position, target)| (table.columns[position].as_str(), target.as_str()))
        .filter(|(old, new)| old != new)
        .collect();

    let rows = table
        .rows
        .iter()
        .map(|row| rename_row(row, &by_name))
        .collect();

    info!(renamed = by_name.len(), resolved = renames.len(), "列映射完成");

    Ok(Table {
        columns: new_columns,
        rows,
    })
}

/// 解析映射键 → (列位置, 目标名)
fn resolve(table: &Table, mapping: &ColumnMapping) -> EngineResult<HashMap<usize, String>> {
    let mut renames: HashMap<usize, String> = HashMap::new();

    for (key, target) in &mapping.entries {
        let target = target.trim();
        if target.is_empty() {
            return Err(EngineError::InvalidMapping(format!(
                "nom cible vide pour la clé {}",
                describe_key(key)
            )));
        }

        let Some(position) = resolve_key(table, key) else {
            warn!(key = %describe_key(key), "映射键未匹配任何列，忽略");
            continue;
        };

        if renames.insert(position, target.to_string()).is_some() {
            return Err(EngineError::InvalidMapping(format!(
                "la colonne '{}' est mappée plusieurs fois",
                table.columns[position]
            )));
        }
        debug!(position, source = %table.columns[position], target, "映射键已解析");
    }

    if renames.is_empty() {
        return Err(EngineError::InvalidMapping(
            "aucune colonne ne correspond au mapping".to_string(),
        ));
    }

    Ok(renames)
}

fn resolve_key(table: &Table, key: &MappingKey) -> Option<usize> {
    match key {
        MappingKey::Index(index) => (*index < table.columns.len()).then_some(*index),
        MappingKey::Name(name) => table.column_index(name).or_else(|| {
            name.trim()
                .parse::<usize>()
                .ok()
                .filter(|index| *index < table.columns.len())
        }),
    }
}

fn check_collisions<'a>(
    new_columns: &[String],
    targets: impl Iterator<Item = &'a String>,
) -> EngineResult<()> {
    for target in targets {
        let occurrences = new_columns.iter().filter(|c| *c == target).count();
        if occurrences > 1 {
            return Err(EngineError::InvalidMapping(format!(
                "le nom cible '{}' apparaît {} fois après le mapping",
                target, occurrences
            )));
        }
    }
    Ok(())
}

fn rename_row(row: &Row, by_name: &HashMap<&str, &str>) -> Row {
    row.iter()
        .map(|(key, value)| {
            let key = by_name
                .get(key.as_str())
                .map(|new| new.to_string())
                .unwrap_or_else(|| key.clone());
            (key, value.clone())
        })
        .collect()
}

fn describe_key(key: &MappingKey) -> String {
    match key {
        MappingKey::Index(index) => format!("#{}", index),
        MappingKey::Name(name) => format!("'{}'", name),
    }
}
