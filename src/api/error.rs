// ==========================================
// G4IT 设备清单 - API 层错误类型
// ==========================================
// 职责: 汇总各层错误，提供错误种类标识与 HTTP 状态码
// 红线: 结构性错误 → 4xx（含出错列/字段名）；存储不可用 → 5xx
// ==========================================

use crate::config::ConfigError;
use crate::engine::EngineError;
use crate::importer::ImportError;
use serde::Serialize;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ===== 文件读写 =====
    #[error(transparent)]
    Import(#[from] ImportError),

    // ===== 结构性数据错误 =====
    #[error(transparent)]
    Engine(#[from] EngineError),

    // ===== 配置错误 =====
    #[error(transparent)]
    Config(#[from] ConfigError),

    // ===== 请求参数错误 =====
    #[error("Requête invalide: {0}")]
    InvalidInput(String),
}

impl ApiError {
    /// 稳定的错误种类标识（snake_case）
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Import(err) => err.kind(),
            ApiError::Engine(err) => match err {
                EngineError::ColumnNotFound { .. } => "column_not_found",
                EngineError::MissingField(_) => "missing_field",
                EngineError::InvalidMapping(_) => "invalid_mapping",
                EngineError::DuplicateSchemaColumn(_) => "duplicate_schema_column",
            },
            ApiError::Config(_) => "config",
            ApiError::InvalidInput(_) => "invalid_input",
        }
    }

    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Import(err) => match err {
                ImportError::FileNotFound(_) => 404,
                ImportError::UnsupportedFormat(_) => 415,
                ImportError::EmptyFile(_)
                | ImportError::CsvParseError(_)
                | ImportError::ExcelParseError(_) => 422,
                ImportError::FileReadError(_) | ImportError::FileWriteError(_) => 500,
            },
            ApiError::Engine(_) => 422,
            ApiError::Config(_) => 500,
            ApiError::InvalidInput(_) => 400,
        }
    }

    /// 出错的列/字段名
    pub fn identifier(&self) -> Option<&str> {
        match self {
            ApiError::Engine(err) => err.identifier(),
            ApiError::Config(ConfigError::InvalidValue { key, .. }) => Some(key),
            _ => None,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            status: self.status_code(),
            kind: self.kind().to_string(),
            message: self.to_string(),
            identifier: self.identifier().map(str::to_string),
        }
    }
}

/// 错误响应体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_error_mapping() {
        let err: ApiError = ImportError::FileNotFound("a.csv".to_string()).into();
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.kind(), "file_not_found");

        let err: ApiError = ImportError::UnsupportedFormat(".pdf".to_string()).into();
        assert_eq!(err.status_code(), 415);
        assert_eq!(err.kind(), "file_format");

        let err: ApiError = ImportError::FileWriteError("disque plein".to_string()).into();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.kind(), "io");
    }

    #[test]
    fn test_engine_error_response_carries_identifier() {
        let err: ApiError = EngineError::MissingField("fabricant".to_string()).into();
        let response = err.to_response();

        assert_eq!(response.status, 422);
        assert_eq!(response.kind, "missing_field");
        assert_eq!(response.identifier.as_deref(), Some("fabricant"));
        assert!(response.message.contains("fabricant"));
    }

    #[test]
    fn test_invalid_input() {
        let err = ApiError::InvalidInput("mapping vide".to_string());
        assert_eq!(err.status_code(), 400);
        assert!(err.identifier().is_none());
    }
}
