// ==========================================
// G4IT 设备清单 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 来源优先级: 环境变量 G4IT_<KEY> > JSON 配置文件 > 内置默认值
// 默认位置: <config_dir>/g4it-inventory/config.json
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::processing_config_trait::ProcessingConfigReader;
use crate::i18n::SUPPORTED_LOCALES;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 环境变量前缀
pub const ENV_PREFIX: &str = "G4IT_";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    values: HashMap<String, String>,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// 仅使用内置默认值
    pub fn new() -> Self {
        Self::default()
    }

    /// 从键值对创建（测试与嵌入调用使用）
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            source: None,
        }
    }

    /// 默认配置文件路径
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("g4it-inventory").join("config.json"))
    }

    /// 从 JSON 文件加载
    ///
    /// 文件内容为对象；值可为字符串、布尔、数字或字符串数组（数组以逗号拼接）。
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let parsed: BTreeMap<String, Value> =
            serde_json::from_str(&raw).map_err(|e| ConfigError::ParseFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let mut values = HashMap::with_capacity(parsed.len());
        for (key, value) in parsed {
            let text = json_to_config_value(&key, &value)?;
            values.insert(key, text);
        }

        info!(path = %path.display(), keys = values.len(), "配置文件已加载");
        Ok(Self {
            values,
            source: Some(path.to_path_buf()),
        })
    }

    /// 加载配置：显式路径 > 默认路径（存在时）> 内置默认值，再应用环境变量覆写
    pub fn load_or_default(path: Option<&Path>) -> ConfigResult<Self> {
        let manager = match path {
            Some(p) => Self::load(p)?,
            None => match Self::default_config_path() {
                Some(p) if p.is_file() => Self::load(&p)?,
                _ => {
                    debug!("未找到配置文件，使用内置默认值");
                    Self::new()
                }
            },
        };
        Ok(manager.with_env_overrides())
    }

    /// 应用进程环境变量中的 G4IT_<KEY> 覆写
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(std::env::vars())
    }

    /// 应用覆写（变量名去掉前缀后小写作为配置键）
    pub fn with_overrides<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            if let Some(key) = name.strip_prefix(ENV_PREFIX) {
                let key = key.to_lowercase();
                if config_keys::ALL.contains(&key.as_str()) {
                    debug!(key = %key, "环境变量覆写配置");
                    self.values.insert(key, value);
                }
            }
        }
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// 配置来源文件
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    fn get_config_value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> String {
        self.get_config_value(key)
            .map(str::trim)
            .unwrap_or(default)
            .to_string()
    }

    /// 生效配置快照（JSON，按键排序）
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let snapshot: BTreeMap<&str, String> = config_keys::ALL
            .iter()
            .map(|key| (*key, self.get_config_or_default(key, config_keys::default_for(key))))
            .collect();
        serde_json::to_string_pretty(&snapshot)
            .map_err(|e| ConfigError::invalid("snapshot", "", e.to_string()))
    }
}

fn json_to_config_value(key: &str, value: &Value) -> ConfigResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(ConfigError::invalid(
                    key,
                    &other.to_string(),
                    "les listes ne peuvent contenir que des chaînes",
                )),
            })
            .collect::<ConfigResult<Vec<String>>>()
            .map(|parts| parts.join(",")),
        other => Err(ConfigError::invalid(key, &other.to_string(), "type non supporté")),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ==========================================
// ProcessingConfigReader Trait 实现
// ==========================================
impl ProcessingConfigReader for ConfigManager {
    fn get_locale(&self) -> ConfigResult<String> {
        let value = self.get_config_or_default(config_keys::LOCALE, "fr");
        SUPPORTED_LOCALES
            .iter()
            .find(|l| l.eq_ignore_ascii_case(&value))
            .map(|l| l.to_string())
            .ok_or_else(|| {
                ConfigError::invalid(
                    config_keys::LOCALE,
                    &value,
                    format!("langues supportées: {}", SUPPORTED_LOCALES.join(", ")),
                )
            })
    }

    fn get_csv_delimiter(&self) -> ConfigResult<Option<u8>> {
        let raw = self
            .get_config_value(config_keys::CSV_DELIMITER)
            .unwrap_or("auto");
        match raw {
            "auto" | "AUTO" => Ok(None),
            "tab" | "\\t" | "\t" => Ok(Some(b'\t')),
            other if other.len() == 1 && other.is_ascii() => Ok(Some(other.as_bytes()[0])),
            other => Err(ConfigError::invalid(
                config_keys::CSV_DELIMITER,
                other,
                "attendu 'auto' ou un caractère ASCII unique",
            )),
        }
    }

    fn get_date_columns(&self) -> ConfigResult<Vec<String>> {
        let value = self.get_config_or_default(config_keys::DATE_COLUMNS, "dateAchat,dateRetrait");
        Ok(split_list(&value))
    }

    fn get_group_by(&self) -> ConfigResult<Vec<String>> {
        let value = self.get_config_or_default(config_keys::GROUP_BY, "modele,type");
        let fields = split_list(&value);
        if fields.is_empty() {
            return Err(ConfigError::invalid(
                config_keys::GROUP_BY,
                &value,
                "au moins un champ de regroupement est requis",
            ));
        }
        Ok(fields)
    }

    fn get_standardize_values(&self) -> ConfigResult<bool> {
        let value = self.get_config_or_default(config_keys::STANDARDIZE_VALUES, "true");
        match value.to_lowercase().as_str() {
            "true" | "1" | "yes" | "oui" => Ok(true),
            "false" | "0" | "no" | "non" => Ok(false),
            _ => Err(ConfigError::invalid(
                config_keys::STANDARDIZE_VALUES,
                &value,
                "booléen attendu",
            )),
        }
    }

    fn get_log_filter(&self) -> ConfigResult<String> {
        Ok(self.get_config_or_default(config_keys::LOG_FILTER, "info"))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    pub const LOCALE: &str = "locale";
    pub const CSV_DELIMITER: &str = "csv_delimiter";
    pub const DATE_COLUMNS: &str = "date_columns";
    pub const GROUP_BY: &str = "group_by";
    pub const STANDARDIZE_VALUES: &str = "standardize_values";
    pub const LOG_FILTER: &str = "log_filter";

    pub const ALL: &[&str] = &[
        LOCALE,
        CSV_DELIMITER,
        DATE_COLUMNS,
        GROUP_BY,
        STANDARDIZE_VALUES,
        LOG_FILTER,
    ];

    pub fn default_for(key: &str) -> &'static str {
        match key {
            LOCALE => "fr",
            CSV_DELIMITER => "auto",
            DATE_COLUMNS => "dateAchat,dateRetrait",
            GROUP_BY => "modele,type",
            STANDARDIZE_VALUES => "true",
            LOG_FILTER => "info",
            _ => "",
        }
    }
}
