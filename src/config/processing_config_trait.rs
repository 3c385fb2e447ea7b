// ==========================================
// G4IT 设备清单 - 处理配置读取 Trait
// ==========================================
// 职责: 定义处理流程所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::error::ConfigResult;

// ==========================================
// ProcessingConfigReader Trait
// ==========================================
// 用途: 流水线 / CLI 所需的配置读取接口
// 实现者: ConfigManager（JSON 文件 + 环境变量）
pub trait ProcessingConfigReader: Send + Sync {
    /// 报告消息语言
    ///
    /// # 默认值
    /// - fr
    fn get_locale(&self) -> ConfigResult<String>;

    /// CSV 分隔符
    ///
    /// # 返回
    /// - None: 自动识别（auto）
    /// - Some(b): 固定分隔符
    fn get_csv_delimiter(&self) -> ConfigResult<Option<u8>>;

    /// 流水线默认修复的日期列
    ///
    /// # 默认值
    /// - ["dateAchat", "dateRetrait"]
    fn get_date_columns(&self) -> ConfigResult<Vec<String>>;

    /// 默认合并分组字段（不能为空）
    ///
    /// # 默认值
    /// - ["modele", "type"]
    fn get_group_by(&self) -> ConfigResult<Vec<String>>;

    /// 流水线是否执行取值标准化
    fn get_standardize_values(&self) -> ConfigResult<bool>;

    /// 默认日志过滤器（RUST_LOG 语法）
    fn get_log_filter(&self) -> ConfigResult<String>;
}
