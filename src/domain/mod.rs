// ==========================================
// G4IT 设备清单 - 领域模型层
// ==========================================
// 职责: 表格数据、列定义、映射、报告等领域类型
// 红线: 不含文件读写逻辑,不含引擎逻辑
// ==========================================

pub mod mapping;
pub mod report;
pub mod schema;
pub mod table;

// 重导出核心类型
pub use mapping::{ColumnMapping, MappingKey};
pub use report::{
    AggregatedValue, ConsolidatedRecord, DateCheckReport, DateFixReport, DateIssue,
    DateIssueKind, StandardizeReport, TypeError, ValidationReport,
};
pub use schema::{ColumnSpec, ColumnType, Schema};
pub use table::{CellValue, Row, Table};
