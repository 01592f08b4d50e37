use crate::error::{AppError, AppResult, ConfigError, FileError};
use crate::models::TableDialect;
use crate::services::path_guard::DEFAULT_SUFFIX;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// 默认输出字段
pub const DEFAULT_OUTFIELDS: [&str; 3] = ["taxonomy", "description", "substituents"];

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 分类服务地址
    pub base_url: String,
    /// 每个任务最多提交的化合物数量
    pub chunk_size: usize,
    /// 任务未完成时两次轮询之间的等待秒数
    pub sleep_interval_secs: u64,
    /// 单次 HTTP 请求超时秒数
    pub request_timeout_secs: u64,
    /// 表格方言
    pub dialect: TableDialect,
    /// 追加到输出表格的字段（按顺序）
    pub outfields: Vec<String>,
    /// 输出文件名冲突时插入的后缀
    pub output_suffix: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://classyfire.wishartlab.com".to_string(),
            chunk_size: 1000,
            sleep_interval_secs: 60,
            request_timeout_secs: 120,
            dialect: TableDialect::Excel,
            outfields: DEFAULT_OUTFIELDS.iter().map(|s| s.to_string()).collect(),
            output_suffix: DEFAULT_SUFFIX.to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            base_url: std::env::var("CLASSYFIRE_BASE_URL").unwrap_or(default.base_url),
            chunk_size: std::env::var("CLASSYFIRE_CHUNK_SIZE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.chunk_size),
            sleep_interval_secs: std::env::var("CLASSYFIRE_SLEEP_INTERVAL").ok().and_then(|v| v.parse().ok()).unwrap_or(default.sleep_interval_secs),
            request_timeout_secs: std::env::var("CLASSYFIRE_REQUEST_TIMEOUT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            dialect: std::env::var("CLASSYFIRE_DIALECT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.dialect),
            outfields: std::env::var("CLASSYFIRE_OUTFIELDS").ok().map(|v| parse_outfields(&v)).unwrap_or(default.outfields),
            output_suffix: default.output_suffix,
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 从 TOML 文件加载配置，未出现的键使用默认值
    pub async fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

        let config: Config = toml::from_str(&content).map_err(|e| FileError::TomlParseFailed {
            path: path.display().to_string(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// 校验配置取值
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: "chunk_size".to_string(),
                value: "0".to_string(),
                expected: "大于 0 的整数".to_string(),
            });
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "base_url".to_string(),
                value: self.base_url.clone(),
                expected: "非空 URL".to_string(),
            });
        }
        if self.output_suffix.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "output_suffix".to_string(),
                value: String::new(),
                expected: "非空后缀".to_string(),
            });
        }
        if self.outfields.is_empty() {
            return Err(ConfigError::EmptyOutFields);
        }
        Ok(())
    }

    pub fn sleep_interval(&self) -> Duration {
        Duration::from_secs(self.sleep_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// 解析逗号分隔的字段列表
pub fn parse_outfields(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
