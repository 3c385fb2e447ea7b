// ==========================================
// G4IT 设备清单 - 引擎层
// ==========================================
// 职责: 列定义、校验、日期修复、列映射、合并等纯函数操作
// 红线: 不读写文件；结构性错误走 EngineError，单元格问题进入报告
// ==========================================

pub mod column_mapper;
pub mod consolidation;
pub mod date_repair;
pub mod error;
pub mod pipeline;
pub mod schema_registry;
pub mod table_validator;
pub mod type_validator;
pub mod value_standardizer;

// 重导出核心引擎
pub use column_mapper::apply_mapping;
pub use consolidation::{
    consolidate, consolidated_to_table, CUMULATED_QUANTITY_FIELD, QUANTITY_FIELD,
};
pub use date_repair::{fix_dates, fix_invalid_dates, needs_repair, scan_dates};
pub use error::{EngineError, EngineResult};
pub use pipeline::{InventoryPipeline, PipelineOptions, PipelineOutcome};
pub use schema_registry::get_schema;
pub use table_validator::{validate, validate_headers, FIRST_DATA_ROW};
pub use type_validator::{validate_value, validate_value_named};
pub use value_standardizer::standardize_values;
