// ==========================================
// G4IT 设备清单 - API 层
// ==========================================
// 职责: 提供文件级业务 API，供 CLI 或 HTTP 层调用
// ==========================================

pub mod error;
pub mod inventory_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use inventory_api::{
    ConsolidationResponse, DateFixResponse, ExportResponse, InventoryApi, MappingResponse,
    SchemaResponse,
};
