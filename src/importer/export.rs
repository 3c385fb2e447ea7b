// ==========================================
// G4IT 设备清单 - 导出文件命名
// ==========================================
// 规则: {base}_NumEcoEval_{YYYY-MM-DD}.csv
// ==========================================

use chrono::NaiveDate;

/// 导出文件名后缀（NumEcoEval 导入格式）
pub const EXPORT_TAG: &str = "NumEcoEval";

/// 生成导出文件名
///
/// `base` 去除首尾空白与扩展名；为空时使用 "equipements"。
pub fn export_file_name(base: &str, date: NaiveDate) -> String {
    let trimmed = base.trim();
    let stem = trimmed
        .rsplit_once('.')
        .filter(|(stem, ext)| !stem.is_empty() && matches!(ext.to_lowercase().as_str(), "csv" | "xlsx"))
        .map(|(stem, _)| stem)
        .unwrap_or(trimmed);
    let stem = if stem.is_empty() { "equipements" } else { stem };

    format!("{}_{}_{}.csv", stem, EXPORT_TAG, date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(
            export_file_name("equipements", day()),
            "equipements_NumEcoEval_2024-03-15.csv"
        );
        assert_eq!(
            export_file_name(" inventaire.xlsx ", day()),
            "inventaire_NumEcoEval_2024-03-15.csv"
        );
        assert_eq!(export_file_name("", day()), "equipements_NumEcoEval_2024-03-15.csv");
        assert_eq!(
            export_file_name("v1.2", day()),
            "v1.2_NumEcoEval_2024-03-15.csv"
        );
    }
}
