// ==========================================
// G4IT 设备清单 - 配置层
// ==========================================
// 职责: 处理配置管理，支持文件 + 环境变量覆写
// 存储: JSON 配置文件（可选）
// ==========================================

pub mod config_manager;
pub mod error;
pub mod processing_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager, ENV_PREFIX};
pub use error::{ConfigError, ConfigResult};
pub use processing_config_trait::ProcessingConfigReader;
