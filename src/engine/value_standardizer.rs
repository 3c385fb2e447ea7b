// ==========================================
// G4IT 设备清单 - 取值标准化器
// ==========================================
// 职责: statut / type 同义词归一为 G4IT 标准取值
// 规则: 小写 + TRIM 后查表；未识别的值保持原样
// 红线: 仅处理行中存在的键；statut 为空视为 "En service"
// ==========================================

use crate::domain::report::StandardizeReport;
use crate::domain::table::{CellValue, Table};
use tracing::{debug, info};

pub const STATUT_FIELD: &str = "statut";
pub const TYPE_FIELD: &str = "type";

pub const STATUT_IN_SERVICE: &str = "En service";
pub const STATUT_OUT_OF_SERVICE: &str = "Hors service";

/// statut 同义词 → 标准值
pub fn standardize_statut(raw: &str) -> Option<&'static str> {
    match raw.trim().to_lowercase().as_str() {
        "" | "n/a" | "na" | "non applicable" => Some(STATUT_IN_SERVICE),
        "actif" | "en activité" | "fonctionnel" | "en fonction" => Some(STATUT_IN_SERVICE),
        "inactif" | "hors service" | "non fonctionnel" => Some(STATUT_OUT_OF_SERVICE),
        _ => None,
    }
}

/// type 同义词 → 标准值
pub fn standardize_type(raw: &str) -> Option<&'static str> {
    match raw.trim().to_lowercase().as_str() {
        "pc" | "ordinateur" | "laptop" | "desktop" => Some("Ordinateur"),
        "ecran" | "moniteur" | "display" => Some("Écran"),
        "serveur" | "server" => Some("Serveur"),
        "imprimante" | "printer" => Some("Imprimante"),
        "telephone" | "phone" | "smartphone" | "mobile" => Some("Téléphone"),
        _ => None,
    }
}

/// 原地标准化整张表
pub fn standardize_values(table: &mut Table) -> StandardizeReport {
    let mut report = StandardizeReport::default();

    for row in table.rows.iter_mut() {
        if let Some(cell) = row.get_mut(STATUT_FIELD) {
            if replace_with(cell, standardize_statut) {
                report.statut_changed += 1;
            }
        }
        if let Some(cell) = row.get_mut(TYPE_FIELD) {
            if replace_with(cell, standardize_type) {
                report.type_changed += 1;
            }
        }
    }

    debug!(statut = report.statut_changed, r#type = report.type_changed, "取值标准化明细");
    info!(changed = report.total_changed(), "取值标准化完成");
    report
}

/// 按规则替换单元格，返回是否发生变化
fn replace_with(cell: &mut CellValue, rule: fn(&str) -> Option<&'static str>) -> bool {
    let Some(standard) = rule(&cell.as_text()) else {
        return false;
    };
    let replacement = CellValue::text(standard);
    if *cell == replacement {
        return false;
    }
    *cell = replacement;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statut_synonyms() {
        assert_eq!(standardize_statut(" Actif "), Some("En service"));
        assert_eq!(standardize_statut("N/A"), Some("En service"));
        assert_eq!(standardize_statut(""), Some("En service"));
        assert_eq!(standardize_statut("NON FONCTIONNEL"), Some("Hors service"));
        assert_eq!(standardize_statut("En réparation"), None);
    }

    #[test]
    fn test_type_synonyms() {
        assert_eq!(standardize_type("Laptop"), Some("Ordinateur"));
        assert_eq!(standardize_type("moniteur"), Some("Écran"));
        assert_eq!(standardize_type("SMARTPHONE"), Some("Téléphone"));
        assert_eq!(standardize_type("Switch"), None);
    }

    #[test]
    fn test_standardize_values_counts_only_real_changes() {
        let mut table = Table::from_values(
            ["type", "statut"],
            vec![
                vec![CellValue::text("pc"), CellValue::text("actif")],
                vec![CellValue::text("Serveur"), CellValue::text("En service")],
                vec![CellValue::text("Switch"), CellValue::Empty],
            ],
        );
        let report = standardize_values(&mut table);

        assert_eq!(report.type_changed, 1);
        assert_eq!(report.statut_changed, 2);
        assert_eq!(table.rows[0].get("type"), Some(&CellValue::text("Ordinateur")));
        assert_eq!(table.rows[2].get("type"), Some(&CellValue::text("Switch")));
        assert_eq!(table.rows[2].get("statut"), Some(&CellValue::text("En service")));
    }

    #[test]
    fn test_absent_columns_untouched() {
        let mut table = Table::from_values(["modele"], vec![vec![CellValue::text("T14")]]);
        let report = standardize_values(&mut table);
        assert_eq!(report.total_changed(), 0);
        assert!(table.rows[0].get("statut").is_none());
    }
}
