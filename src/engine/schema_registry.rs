// ==========================================
// G4IT 设备清单 - 列定义注册表
// ==========================================
// 职责: 提供固定的 G4IT 列定义（只读、无状态）
// 红线: 部署期常量，通过 get_schema() 注入各操作，不作为可变全局量
// ==========================================

use crate::domain::schema::{ColumnSpec, ColumnType, Schema};
use std::sync::LazyLock;

// (列名, 必填, 类型, 示例, 说明)
const G4IT_COLUMNS: &[(&str, bool, ColumnType, &str, &str)] = &[
    // ===== 设备标识 =====
    (
        "nomEquipementPhysique",
        true,
        ColumnType::String,
        "Serveur Dell PowerEdge R740",
        "Nom ou référence de l'équipement physique",
    ),
    (
        "modele",
        true,
        ColumnType::String,
        "Serveur-Milieu-de-Gamme",
        "Modèle ou catégorie de l'équipement",
    ),
    (
        "quantite",
        true,
        ColumnType::Integer,
        "25000",
        "Nombre d'unités de cet équipement",
    ),
    (
        "nomCourtDatacenter",
        true,
        ColumnType::String,
        "DC-PARIS",
        "Identifiant du datacenter hébergeant l'équipement",
    ),
    // ===== 时间信息 =====
    (
        "dateAchat",
        false,
        ColumnType::Date,
        "2015-12-25",
        "Date d'acquisition de l'équipement",
    ),
    (
        "dateRetrait",
        false,
        ColumnType::Date,
        "2018-12-25",
        "Date de mise hors service prévue ou effective",
    ),
    (
        "dureeUsageInterne",
        false,
        ColumnType::Integer,
        "36",
        "Durée d'utilisation interne en mois",
    ),
    (
        "dureeUsageAmont",
        false,
        ColumnType::Integer,
        "12",
        "Durée d'utilisation en amont en mois",
    ),
    (
        "dureeUsageAval",
        false,
        ColumnType::Integer,
        "24",
        "Durée d'utilisation en aval en mois",
    ),
    // ===== 设备特征 =====
    (
        "type",
        true,
        ColumnType::String,
        "Ecran",
        "Type d'équipement (Serveur, Ecran, PC, etc.)",
    ),
    (
        "statut",
        true,
        ColumnType::String,
        "Active",
        "État actuel de l'équipement (Active, Inactive, En maintenance, etc.)",
    ),
    (
        "paysDUtilisation",
        true,
        ColumnType::String,
        "France",
        "Pays où l'équipement est utilisé",
    ),
    // ===== 能耗与使用 =====
    (
        "consoElecAnnuelle",
        false,
        ColumnType::Number,
        "2450.75",
        "Consommation électrique annuelle en kWh",
    ),
    (
        "utilisateur",
        false,
        ColumnType::String,
        "Service IT",
        "Service ou personne utilisant l'équipement",
    ),
    (
        "nomSourceDonnee",
        false,
        ColumnType::String,
        "Inventaire 2023",
        "Source des données pour cet équipement",
    ),
    (
        "nomEntite",
        false,
        ColumnType::String,
        "Département Réseau",
        "Entité responsable de l'équipement",
    ),
    // ===== 技术参数 =====
    (
        "nbCoeur",
        false,
        ColumnType::Integer,
        "16",
        "Nombre de cœurs de processeur (pour serveurs/PC)",
    ),
    (
        "nbJourUtiliseAn",
        false,
        ColumnType::Integer,
        "252",
        "Nombre de jours d'utilisation par an",
    ),
    (
        "goTelecharge",
        false,
        ColumnType::Integer,
        "5000",
        "Volume de données téléchargées en Go",
    ),
    // ===== 使用方式 =====
    (
        "modeUtilisation",
        false,
        ColumnType::String,
        "Production",
        "Mode d'utilisation (Production, Test, Développement, etc.)",
    ),
    (
        "tauxUtilisation",
        false,
        ColumnType::Number,
        "0.75",
        "Taux d'utilisation moyen (entre 0 et 1)",
    ),
    (
        "qualite",
        false,
        ColumnType::String,
        "Haute",
        "Niveau de qualité ou de performance (Haute, Moyenne, Standard, etc.)",
    ),
];

/// 日期列显示格式
pub const DATE_FORMAT_HINT: &str = "YYYY-MM-DD";

static G4IT_SCHEMA: LazyLock<Schema> = LazyLock::new(build_g4it_schema);

fn build_g4it_specs() -> Vec<ColumnSpec> {
    G4IT_COLUMNS
        .iter()
        .map(|(name, required, column_type, example, description)| {
            let spec =
                ColumnSpec::new(*name, *required, *column_type, *description).with_example(*example);
            if *column_type == ColumnType::Date {
                spec.with_format(DATE_FORMAT_HINT)
            } else {
                spec
            }
        })
        .collect()
}

fn build_g4it_schema() -> Schema {
    // 列名唯一性由单元测试保证
    Schema::from_trusted(build_g4it_specs())
}

/// 获取 G4IT 列定义（每次返回同一静态结构）
pub fn get_schema() -> &'static Schema {
    &G4IT_SCHEMA
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_is_complete_and_unique() {
        // 直接构造，确保常量表本身无重复列名
        let schema = Schema::new(build_g4it_specs()).unwrap();
        assert_eq!(schema.len(), G4IT_COLUMNS.len());
        assert_eq!(get_schema().len(), G4IT_COLUMNS.len());
    }

    #[test]
    fn test_required_columns() {
        assert_eq!(
            get_schema().required_columns(),
            vec![
                "nomEquipementPhysique",
                "modele",
                "quantite",
                "nomCourtDatacenter",
                "type",
                "statut",
                "paysDUtilisation",
            ]
        );
    }

    #[test]
    fn test_date_columns_carry_format_hint() {
        let spec = get_schema().get("dateAchat").unwrap();
        assert_eq!(spec.column_type, ColumnType::Date);
        assert_eq!(spec.format.as_deref(), Some(DATE_FORMAT_HINT));
        assert_eq!(get_schema().get("quantite").unwrap().column_type, ColumnType::Integer);
    }

    #[test]
    fn test_get_schema_returns_same_instance() {
        assert!(std::ptr::eq(get_schema(), get_schema()));
    }
}
