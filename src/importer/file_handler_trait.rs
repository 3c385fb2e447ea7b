// ==========================================
// G4IT 设备清单 - 表格文件 Trait
// ==========================================
// 职责: 定义表格文件的读写能力接口（不包含实现）
// 实现者: CsvHandler, ExcelHandler, UniversalFileHandler（按扩展名分派）
// ==========================================

use crate::domain::table::Table;
use crate::importer::error::ImportResult;
use std::path::Path;

// ==========================================
// TableFile Trait
// ==========================================
pub trait TableFile: Send + Sync {
    /// 读取整张表
    ///
    /// # 返回
    /// - Ok(Table): 表头顺序保留；完全空白的行跳过
    /// - Err: 文件不存在 / 格式不支持 / 解析失败
    fn load(&self, path: &Path) -> ImportResult<Table>;

    /// 写出整张表（首行为表头，列顺序与 table.columns 一致）
    fn save(&self, table: &Table, path: &Path) -> ImportResult<()>;

    /// 仅读取表头（上传时的列检测）
    fn get_headers(&self, path: &Path) -> ImportResult<Vec<String>>;
}
