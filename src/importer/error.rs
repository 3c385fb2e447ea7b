// ==========================================
// G4IT 设备清单 - 文件读写错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 文件读写错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("Fichier introuvable: {0}")]
    FileNotFound(String),

    #[error("Format de fichier non supporté: {0} (seuls .csv et .xlsx sont acceptés)")]
    UnsupportedFormat(String),

    #[error("Le fichier est vide: {0}")]
    EmptyFile(String),

    #[error("Erreur de lecture du fichier: {0}")]
    FileReadError(String),

    #[error("Erreur d'écriture du fichier: {0}")]
    FileWriteError(String),

    // ===== 解析错误 =====
    #[error("Fichier Excel illisible: {0}")]
    ExcelParseError(String),

    #[error("Fichier CSV illisible: {0}")]
    CsvParseError(String),
}

impl ImportError {
    /// 错误种类标识（snake_case，供上层响应使用）
    pub fn kind(&self) -> &'static str {
        match self {
            ImportError::FileNotFound(_) => "file_not_found",
            ImportError::UnsupportedFormat(_) => "file_format",
            ImportError::EmptyFile(_) => "empty_file",
            ImportError::FileReadError(_) | ImportError::FileWriteError(_) => "io",
            ImportError::ExcelParseError(_) | ImportError::CsvParseError(_) => "file_format",
        }
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        match err.kind() {
            csv::ErrorKind::Io(_) => ImportError::FileReadError(err.to_string()),
            _ => ImportError::CsvParseError(err.to_string()),
        }
    }
}

// 实现 From<calamine::XlsxError>
impl From<calamine::XlsxError> for ImportError {
    fn from(err: calamine::XlsxError) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
