// ==========================================
// G4IT 设备清单 - 核心库
// ==========================================
// 职责: 设备清单（CSV/XLSX）校验、日期修复、列映射与合并
// 分层: domain → engine → importer → api
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "fr");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 表格、列定义与报告
pub mod domain;

// 引擎层 - 校验/修复/映射/合并
pub mod engine;

// 文件读写层 - CSV / XLSX
pub mod importer;

// 配置层 - 处理配置
pub mod config;

// API 层 - 文件级业务接口
pub mod api;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    AggregatedValue, CellValue, ColumnMapping, ColumnSpec, ColumnType, ConsolidatedRecord,
    DateCheckReport, DateFixReport, MappingKey, Row, Schema, Table, TypeError, ValidationReport,
};

// 引擎
pub use engine::{
    apply_mapping, consolidate, fix_dates, get_schema, needs_repair, validate, EngineError,
    InventoryPipeline, PipelineOptions,
};

// 文件读写
pub use importer::{read_table, write_table, ImportError};

// API
pub use api::{ApiError, InventoryApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "G4IT Inventory";
