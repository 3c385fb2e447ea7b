// ==========================================
// 引擎间集成测试
// ==========================================
// 职责: 验证多个引擎之间的协作和数据流转
// 场景: 映射 → 校验 → 日期修复 → 标准化 → 合并
// ==========================================


use g4it_inventory::domain::{AggregatedValue, CellValue, ColumnMapping, Table};
use g4it_inventory::engine::{
    apply_mapping, consolidate, consolidated_to_table, fix_dates, get_schema, needs_repair,
    scan_dates, validate, EngineError, InventoryPipeline, PipelineOptions,
    CUMULATED_QUANTITY_FIELD, QUANTITY_FIELD,
};
use test_helpers::{equipment_row, inventory_columns, valid_inventory, REQUIRED_COLUMNS};

// ==========================================
// 测试辅助函数
// ==========================================

/// 供应商导出的原始清单：列名不规范、日期为 DD/MM/YYYY
fn vendor_export() -> Table {
    Table::from_values(
        [
            "Nom", "Modèle", "Qté", "DC", "Type", "Etat", "Pays", "Date d'achat",
        ],
        vec![
            vec![
                "srv-01".into(), "R740".into(), "2".into(), "DC-PARIS".into(),
                "serveur".into(), "actif".into(), "France".into(), "25/03/2021".into(),
            ],
            vec![
                "srv-02".into(), "R740".into(), "3".into(), "DC-PARIS".into(),
                "server".into(), "Inactif".into(), "France".into(), "01/04/2021".into(),
            ],
            vec![
                "pc-01".into(), "Latitude".into(), "10".into(), "DC-LYON".into(),
                "laptop".into(), "".into(), "France".into(), "".into(),
            ],
        ],
    )
}

fn vendor_mapping() -> ColumnMapping {
    ColumnMapping::new()
        .with("Nom", "nomEquipementPhysique")
        .with("Modèle", "modele")
        .with("Qté", "quantite")
        .with("DC", "nomCourtDatacenter")
        .with("Type", "type")
        .with("Etat", "statut")
        .with("Pays", "paysDUtilisation")
        .with(7usize, "dateAchat")
}

fn fields(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

// ==========================================
// 映射 → 校验
// ==========================================

#[test]
fn test_mapping_makes_vendor_export_valid() {
    let raw = vendor_export();

    // 映射前: 全部必填列缺失
    let before = validate(&raw, get_schema());
    assert!(!before.is_valid);
    assert_eq!(before.missing_required_columns.len(), REQUIRED_COLUMNS.len());

    let mapped = apply_mapping(&raw, &vendor_mapping()).unwrap();
    assert_eq!(mapped.columns, inventory_columns());
    assert_eq!(mapped.len(), raw.len());

    // 映射后: 列齐全，但 DD/MM/YYYY 日期与空 statut 产生单元格错误
    let after = validate(&mapped, get_schema());
    assert!(after.missing_required_columns.is_empty());
    assert!(!after.is_valid);
    assert!(after
        .type_errors
        .iter()
        .any(|e| e.column == "dateAchat" && e.row == 2));
    assert!(after
        .type_errors
        .iter()
        .any(|e| e.column == "statut" && e.row == 4 && e.value.is_empty()));
}

#[test]
fn test_mapping_failure_leaves_source_untouched() {
    let raw = vendor_export();
    let mapping = ColumnMapping::new()
        .with("Nom", "modele")
        .with("Modèle", "modele");

    let err = apply_mapping(&raw, &mapping).unwrap_err();
    assert!(matches!(err, EngineError::InvalidMapping(_)));
    assert_eq!(raw, vendor_export());
}

// ==========================================
// 日期诊断 → 修复
// ==========================================

#[test]
fn test_scan_then_fix_dates() {
    let mut table = apply_mapping(&vendor_export(), &vendor_mapping()).unwrap();

    let report = scan_dates(&table, "dateAchat").unwrap();
    assert!(report.needs_repair);
    assert_eq!(report.first_swapped_row, Some(2));
    assert_eq!(report.first_swapped_value.as_deref(), Some("25/03/2021"));

    let fix = fix_dates(&mut table, "dateAchat").unwrap();
    assert_eq!(fix.swapped, 1);
    assert_eq!(fix.normalized, 1);
    assert_eq!(fix.skipped_empty, 1);
    assert!(fix.unfixable.is_empty());

    let dates: Vec<String> = table.column_values("dateAchat").map(CellValue::as_text).collect();
    assert_eq!(dates, vec!["03-25-2021", "01-04-2021", ""]);

    // 修复后不再有月份 > 12 的值
    assert!(!needs_repair(&table, "dateAchat").unwrap());
}

#[test]
fn test_fix_dates_missing_column_is_atomic() {
    let mut table = valid_inventory();
    table.rows[1].remove("dateAchat");
    let snapshot = table.clone();

    let err = fix_dates(&mut table, "dateAchat").unwrap_err();
    match err {
        EngineError::ColumnNotFound { column, row } => {
            assert_eq!(column, "dateAchat");
            assert_eq!(row, 3);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(table, snapshot);
}

// ==========================================
// 合并
// ==========================================

#[test]
fn test_consolidation_sums_numeric_and_counts_rows() {
    let table = valid_inventory();
    let group_by = fields(&["modele"]);

    let records = consolidate(&table, &group_by).unwrap();
    assert_eq!(records.len(), 2);

    let r740 = &records[0];
    assert_eq!(r740.key("modele"), Some(&CellValue::text("R740")));
    assert_eq!(r740.quantite, 2);
    assert_eq!(r740.value("quantite"), Some(&AggregatedValue::Sum(5.0)));
    assert_eq!(
        r740.value("nomCourtDatacenter"),
        Some(&AggregatedValue::Mode(CellValue::text("DC-PARIS")))
    );

    let r640 = &records[1];
    assert_eq!(r640.quantite, 1);
    assert_eq!(r640.value("dateAchat"), Some(&AggregatedValue::NoValue));

    // 行数守恒
    let total: usize = records.iter().map(|r| r.quantite).sum();
    assert_eq!(total, table.len());
}

#[test]
fn test_consolidated_table_renames_quantity_column() {
    let table = valid_inventory();
    let group_by = fields(&["modele", "type"]);
    let records = consolidate(&table, &group_by).unwrap();

    let out = consolidated_to_table(&records, &group_by, &table.columns);
    assert_eq!(&out.columns[..2], &group_by[..]);
    assert!(out.has_column(CUMULATED_QUANTITY_FIELD));
    assert_eq!(out.columns.last().map(String::as_str), Some(QUANTITY_FIELD));

    let first = &out.rows[0];
    assert_eq!(first.get(CUMULATED_QUANTITY_FIELD), Some(&CellValue::Integer(5)));
    assert_eq!(first.get(QUANTITY_FIELD), Some(&CellValue::Integer(2)));
}

#[test]
fn test_consolidation_unknown_group_field() {
    let err = consolidate(&valid_inventory(), &fields(&["modele", "fabricant"])).unwrap_err();
    assert_eq!(err.identifier(), Some("fabricant"));
}

#[test]
fn test_consolidation_mode_tie_keeps_first_seen() {
    let table = Table::from_values(
        ["modele", "paysDUtilisation"],
        vec![
            vec!["R740".into(), "Belgique".into()],
            vec!["R740".into(), "France".into()],
            vec!["R740".into(), "France".into()],
            vec!["R740".into(), "Belgique".into()],
        ],
    );
    let records = consolidate(&table, &fields(&["modele"])).unwrap();
    assert_eq!(
        records[0].value("paysDUtilisation"),
        Some(&AggregatedValue::Mode(CellValue::text("Belgique")))
    );
}

// ==========================================
// 流水线
// ==========================================

#[test]
fn test_pipeline_end_to_end() {
    let options = PipelineOptions {
        mapping: Some(vendor_mapping()),
        date_columns: fields(&["dateAchat", "dateRetrait"]),
        standardize: true,
        group_by: Some(fields(&["type"])),
        stop_on_invalid: false,
    };

    let outcome = InventoryPipeline::new(get_schema(), options)
        .run(vendor_export())
        .unwrap();

    // 校验结果反映映射后、修复前的表
    assert!(!outcome.validation.is_valid);
    assert!(!outcome.stopped_early);

    // dateRetrait 不存在: 仅修复 dateAchat
    assert_eq!(outcome.date_fixes.len(), 1);
    assert_eq!(outcome.date_fixes[0].swapped, 1);

    let standardization = outcome.standardization.as_ref().unwrap();
    assert_eq!(standardization.statut_changed, 3);
    assert_eq!(standardization.type_changed, 3);

    let types: Vec<String> = outcome.table.column_values("type").map(CellValue::as_text).collect();
    assert_eq!(types, vec!["Serveur", "Serveur", "Ordinateur"]);

    let consolidated = outcome.consolidated.as_ref().unwrap();
    assert_eq!(consolidated.len(), 2);
    assert_eq!(consolidated[0].quantite, 2);
    assert_eq!(consolidated[1].quantite, 1);
}

#[test]
fn test_pipeline_stops_on_invalid() {
    let options = PipelineOptions {
        date_columns: fields(&["dateAchat"]),
        standardize: true,
        group_by: Some(fields(&["modele"])),
        stop_on_invalid: true,
        ..Default::default()
    };

    let input = vendor_export();
    let outcome = InventoryPipeline::new(get_schema(), options)
        .run(input.clone())
        .unwrap();

    assert!(outcome.stopped_early);
    assert!(outcome.date_fixes.is_empty());
    assert!(outcome.consolidated.is_none());
    assert_eq!(outcome.table, input);
}

#[test]
fn test_pipeline_on_valid_inventory_changes_nothing() {
    let options = PipelineOptions {
        date_columns: fields(&["dateAchat"]),
        standardize: true,
        ..Default::default()
    };

    let outcome = InventoryPipeline::new(get_schema(), options)
        .run(valid_inventory())
        .unwrap();

    assert!(outcome.validation.is_valid);
    // YYYY-MM-DD 列已合法，不进入日期修复
    assert!(outcome.date_fixes.is_empty());
    assert_eq!(outcome.standardization.unwrap().total_changed(), 0);
    assert_eq!(outcome.table, valid_inventory());
}

#[test]
fn test_pipeline_repairs_only_invalid_dates_in_mixed_column() {
    let table = Table::from_values(
        inventory_columns(),
        vec![
            equipment_row("srv-01", "R740", 1, "2020-01-15"),
            equipment_row("srv-02", "R740", 1, "25/03/2021"),
            equipment_row("srv-03", "R640", 1, "2021-06-30"),
            equipment_row("srv-04", "R640", 1, "04/05/2022"),
        ],
    );
    let options = PipelineOptions {
        date_columns: fields(&["dateAchat"]),
        ..Default::default()
    };

    let outcome = InventoryPipeline::new(get_schema(), options).run(table).unwrap();

    assert_eq!(outcome.validation.type_errors.len(), 2);
    let dates: Vec<String> = outcome.table.column_values("dateAchat").map(CellValue::as_text).collect();
    assert_eq!(dates, vec!["2020-01-15", "03-25-2021", "2021-06-30", "04-05-2022"]);

    let report = &outcome.date_fixes[0];
    assert_eq!(report.swapped, 1);
    assert_eq!(report.normalized, 1);
    assert_eq!(report.unchanged, 2);
    assert!(report.unfixable.is_empty());
}

#[test]
fn test_validation_reports_rows_from_two() {
    let table = Table::from_values(
        inventory_columns(),
        vec![
            equipment_row("srv-01", "R740", 1, "2020-01-01"),
            equipment_row("srv-02", "R740", 1, "2020-02-30"),
        ],
    );
    let report = validate(&table, get_schema());
    assert!(!report.is_valid);
    assert_eq!(report.type_errors.len(), 1);
    assert_eq!(report.type_errors[0].row, 3);
    assert_eq!(report.type_errors[0].column, "dateAchat");
}
