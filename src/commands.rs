//! Exécution des sous-commandes.
//!
//! Chaque commande écrit son rapport JSON sur stdout et renvoie le code de sortie:
//! 0 succès, 1 inventaire invalide ou dates irréparables.

use crate::cli::{Command, ConsolidateArgs, RunArgs};
use chrono::Local;
use g4it_inventory::api::{ApiError, ApiResult, InventoryApi};
use g4it_inventory::config::{ConfigManager, ProcessingConfigReader};
use g4it_inventory::domain::ColumnMapping;
use g4it_inventory::engine::PipelineOptions;
use g4it_inventory::i18n::{t, t_with_args};
use serde::Serialize;
use tracing::{info, warn};

pub const EXIT_OK: i32 = 0;
pub const EXIT_INVALID: i32 = 1;

pub fn execute(command: &Command, api: &InventoryApi, config: &ConfigManager) -> ApiResult<i32> {
    match command {
        Command::Schema => emit(&api.schema()),
        Command::Config => {
            println!("{}", config.get_config_snapshot()?);
            Ok(EXIT_OK)
        }
        Command::Check(args) => {
            let kind = api.check_file(&args.file)?;
            emit(&serde_json::json!({ "file": args.file, "kind": kind }))
        }
        Command::Headers(args) => {
            let report = api.detect_headers(&args.file)?;
            emit(&report)?;
            Ok(exit_for(report.is_valid))
        }
        Command::Validate(args) => {
            let report = api.validate_file(&args.file)?;
            if report.is_valid {
                info!("{}", t("validation.success"));
            } else {
                let count = report.error_count().to_string();
                warn!("{}", t_with_args("validation.failed", &[("count", &count)]));
            }
            emit(&report)?;
            Ok(exit_for(report.is_valid))
        }
        Command::CheckDates(args) => {
            let report = api.check_dates(&args.file, &args.column)?;
            if let (Some(row), Some(value)) = (report.first_swapped_row, &report.first_swapped_value) {
                let row = row.to_string();
                warn!("{}", t_with_args("dates.swap_detected", &[("row", &row), ("value", value)]));
            }
            emit(&report)
        }
        Command::FixDates(args) => {
            let response = api.fix_dates_file(&args.file, &args.column, args.output.as_deref())?;
            let report = &response.report;
            info!(
                "{}",
                t_with_args(
                    "dates.summary",
                    &[
                        ("swapped", &report.swapped.to_string()),
                        ("normalized", &report.normalized.to_string()),
                        ("unfixable", &report.unfixable_count().to_string()),
                    ],
                )
            );
            emit(&response)?;
            Ok(exit_for(response.report.unfixable_count() == 0))
        }
        Command::Map(args) => {
            let mapping: ColumnMapping = args.map.iter().cloned().collect();
            emit(&api.map_file(&args.file, &mapping, &args.output)?)
        }
        Command::Consolidate(args) => run_consolidate(args, api, config),
        Command::Run(args) => run_pipeline(args, api, config),
        Command::Export(args) => {
            let date = args.date.unwrap_or_else(|| Local::now().date_naive());
            emit(&api.export(&args.file, &args.out_dir, args.base.as_deref(), date)?)
        }
    }
}

fn run_consolidate(
    args: &ConsolidateArgs,
    api: &InventoryApi,
    config: &ConfigManager,
) -> ApiResult<i32> {
    let group_by = group_by_or_config(&args.group_by, config)?;
    emit(&api.consolidate_file(&args.file, &group_by, args.output.as_deref())?)
}

fn run_pipeline(args: &RunArgs, api: &InventoryApi, config: &ConfigManager) -> ApiResult<i32> {
    let mut options = PipelineOptions::from_config(config)?;
    options.mapping = args.mapping();
    if !args.date_columns.is_empty() {
        options.date_columns = args.date_columns.clone();
    }
    if args.no_standardize {
        options.standardize = false;
    }
    if args.consolidate || !args.group_by.is_empty() {
        options.group_by = Some(group_by_or_config(&args.group_by, config)?);
    }
    options.stop_on_invalid = args.stop_on_invalid;

    let outcome = api.run_pipeline(
        &args.file,
        options,
        args.output.as_deref(),
        args.consolidated_output.as_deref(),
    )?;
    emit(&outcome)?;
    Ok(exit_for(outcome.validation.is_valid))
}

fn group_by_or_config(cli: &[String], config: &ConfigManager) -> ApiResult<Vec<String>> {
    let fields: Vec<String> = cli
        .iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect();
    if fields.is_empty() {
        Ok(config.get_group_by()?)
    } else {
        Ok(fields)
    }
}

fn emit<T: Serialize>(value: &T) -> ApiResult<i32> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::InvalidInput(format!("sérialisation du rapport impossible: {}", e)))?;
    println!("{}", json);
    Ok(EXIT_OK)
}

fn exit_for(ok: bool) -> i32 {
    if ok {
        EXIT_OK
    } else {
        EXIT_INVALID
    }
}
