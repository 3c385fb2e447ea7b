// ==========================================
// G4IT 设备清单 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 只承载结构性错误（整次操作中止）；
//       单元格级数据质量问题进入报告，不走错误通道
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    // ===== 列/字段缺失 =====
    #[error("La colonne '{column}' est absente (ligne {row})")]
    ColumnNotFound { column: String, row: usize },

    #[error("Champ de regroupement absent du tableau: {0}")]
    MissingField(String),

    // ===== 映射错误 =====
    #[error("Mapping de colonnes invalide: {0}")]
    InvalidMapping(String),

    // ===== 列定义错误 =====
    #[error("Colonne en double dans le schéma: {0}")]
    DuplicateSchemaColumn(String),
}

impl EngineError {
    /// 出错的列/字段名（供上层拼装 4xx 响应）
    pub fn identifier(&self) -> Option<&str> {
        match self {
            EngineError::ColumnNotFound { column, .. } => Some(column),
            EngineError::MissingField(field) => Some(field),
            EngineError::DuplicateSchemaColumn(column) => Some(column),
            EngineError::InvalidMapping(_) => None,
        }
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
