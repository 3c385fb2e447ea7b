// ==========================================
// G4IT 设备清单 - 配置层错误类型
// ==========================================

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Impossible de lire le fichier de configuration {path}: {message}")]
    ReadFailed { path: PathBuf, message: String },

    #[error("Fichier de configuration invalide {path}: {message}")]
    ParseFailed { path: PathBuf, message: String },

    #[error("Valeur invalide pour '{key}' ('{value}'): {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, value: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            message: message.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
