// ==========================================
// G4IT 设备清单 - 命令行入口
// ==========================================
// 退出码: 0 成功；1 清单无效；2 结构性错误/文件错误/配置错误
// ==========================================

use anyhow::anyhow;
use clap::Parser;
use g4it_inventory::api::{ApiError, InventoryApi};
use g4it_inventory::config::{ConfigManager, ProcessingConfigReader};
use g4it_inventory::logging::{self, LogConfig};
use g4it_inventory::{i18n, APP_NAME, VERSION};

mod cli;
mod commands;

use crate::cli::Cli;

const EXIT_ERROR: i32 = 2;

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(error) => {
            report_error(&error);
            EXIT_ERROR
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> anyhow::Result<i32> {
    let config = ConfigManager::load_or_default(cli.config.as_deref()).map_err(ApiError::from)?;

    let log_filter = config.get_log_filter().map_err(ApiError::from)?;
    let log_config = LogConfig::from_verbosity(cli.verbose, &log_filter).with_format(cli.log_format.into());
    logging::init_with(&log_config).map_err(|e| anyhow!("initialisation des logs impossible: {}", e))?;

    let locale = match &cli.locale {
        Some(locale) => locale.clone(),
        None => config.get_locale().map_err(ApiError::from)?,
    };
    let locale = i18n::set_locale(&locale);

    tracing::info!("{} v{} 启动 (locale={})", APP_NAME, VERSION, locale);
    if let Some(path) = config.source() {
        tracing::debug!(config = %path.display(), "已加载配置文件");
    }

    let api = InventoryApi::from_config(&config)?;
    Ok(commands::execute(&cli.command, &api, &config)?)
}

/// 错误输出到 stderr（API 错误输出 JSON 响应体）
fn report_error(error: &anyhow::Error) {
    match error.downcast_ref::<ApiError>() {
        Some(api_error) => match serde_json::to_string(&api_error.to_response()) {
            Ok(json) => eprintln!("{}", json),
            Err(_) => eprintln!("erreur: {}", api_error),
        },
        None => eprintln!("erreur: {:#}", error),
    }
}
