use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;

/// 失败页的处理方式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionMode {
    /// 每轮结束后在终端询问
    Prompt,
    /// 自动重试 `auto_retry_rounds` 轮，之后接受部分结果
    Retry,
    /// 直接接受部分结果
    Accept,
    /// 直接取消
    Cancel,
}

impl FromStr for DecisionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prompt" => Ok(DecisionMode::Prompt),
            "retry" => Ok(DecisionMode::Retry),
            "accept" => Ok(DecisionMode::Accept),
            "cancel" => Ok(DecisionMode::Cancel),
            other => Err(format!("未知的处理方式: {}", other)),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 同时进行的请求数上限
    pub max_concurrent_requests: usize,
    /// 单个请求超时（秒）
    pub request_timeout_secs: u64,
    /// 建立连接超时（秒）
    pub connect_timeout_secs: u64,
    /// 输出 PDF 路径
    pub output_path: String,
    /// 页面 JPEG 质量
    pub jpeg_quality: u8,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 失败页的处理方式
    pub decision_mode: DecisionMode,
    /// `retry` 模式下的自动重试轮数
    pub auto_retry_rounds: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 16,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            output_path: "output.pdf".to_string(),
            jpeg_quality: 95,
            verbose_logging: false,
            decision_mode: DecisionMode::Prompt,
            auto_retry_rounds: 3,
        }
    }
}

/// 指定配置文件路径的环境变量
pub const CONFIG_FILE_ENV: &str = "DOWNLOADER_CONFIG";

impl Config {
    /// 加载配置：先读 `DOWNLOADER_CONFIG` 指向的 TOML 文件（若有），再应用环境变量覆盖
    pub fn load() -> Result<Self, ConfigError> {
        let base = match std::env::var(CONFIG_FILE_ENV) {
            Ok(path) => Self::from_toml_file(&path)?,
            Err(_) => Self::default(),
        };
        let config = base.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// 只使用默认值和环境变量
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::default().with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文本解析，缺省字段取默认值
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn from_toml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileLoadFailed {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&content).map_err(|e| ConfigError::FileLoadFailed {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    fn with_env_overrides(self) -> Result<Self, ConfigError> {
        Ok(Self {
            max_concurrent_requests: env_or(
                "MAX_CONCURRENT_REQUESTS",
                self.max_concurrent_requests,
            )?,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", self.request_timeout_secs)?,
            connect_timeout_secs: env_or("CONNECT_TIMEOUT_SECS", self.connect_timeout_secs)?,
            output_path: std::env::var("OUTPUT_PATH").unwrap_or(self.output_path),
            jpeg_quality: env_or("JPEG_QUALITY", self.jpeg_quality)?,
            verbose_logging: env_or("VERBOSE_LOGGING", self.verbose_logging)?,
            decision_mode: env_or("DECISION_MODE", self.decision_mode)?,
            auto_retry_rounds: env_or("AUTO_RETRY_ROUNDS", self.auto_retry_rounds)?,
        })
    }

    /// 检查取值范围
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_requests == 0 {
            return Err(ConfigError::invalid_value("max_concurrent_requests", "必须大于 0"));
        }
        if self.request_timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(ConfigError::invalid_value("timeout", "超时必须大于 0 秒"));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::invalid_value("jpeg_quality", "必须在 1..=100 之间"));
        }
        if self.output_path.trim().is_empty() {
            return Err(ConfigError::invalid_value("output_path", "不能为空"));
        }
        Ok(())
    }
}

/// 读取环境变量，未设置时返回默认值，设置了但无法解析时报错
fn env_or<T: FromStr>(var_name: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::EnvVarParseFailed {
            var_name: var_name.to_string(),
            value,
            expected_type: std::any::type_name::<T>().to_string(),
        }),
        Err(_) => Ok(default),
    }
}
