// ==========================================
// G4IT 设备清单 - 文件读写层
// ==========================================
// 职责: CSV/XLSX 读取为 Table，Table 写出为 CSV，导出命名
// 支持: 读 .csv / .xlsx，写 .csv
// ==========================================

// 模块声明
pub mod error;
pub mod export;
pub mod file_handler_trait;
pub mod file_parser;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use export::export_file_name;
pub use file_handler_trait::TableFile;
pub use file_parser::{
    check_file, read_table, sniff_delimiter, write_table, CsvHandler, ExcelHandler, FileKind,
    UniversalFileHandler,
};
