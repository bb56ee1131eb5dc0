use thiserror::Error;

/// 应用程序错误类型
///
/// 只有这里的错误会终止整次运行；单页抓取失败是数据（[`FetchFailure`]），不是错误。
#[derive(Debug, Error)]
pub enum AppError {
    /// 示例 URL 不含 `bg<数字>.png` 结构，在任何网络请求之前失败
    #[error("URL 格式无效，找不到 bgX.png 结构: {url}")]
    InvalidPattern { url: String },

    /// 命令行或交互输入无效
    #[error("输入无效: {0}")]
    InvalidInput(String),

    /// 没有任何一页下载成功
    #[error("没有成功下载任何页面 (共请求 {requested} 页)")]
    EmptyResult { requested: u32 },

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 生成文档失败
    #[error("生成文档失败: {0}")]
    Assemble(#[from] AssembleError),

    /// HTTP 会话创建失败
    #[error("HTTP 会话创建失败: {0}")]
    Session(#[source] reqwest::Error),

    /// 文件或终端 IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 后台任务异常退出
    #[error("后台任务执行失败: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// 单个位置的抓取失败原因
///
/// 由抓取器产生，作为数据进入结果表，从不向上传播。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    /// 连接、DNS、TLS 等传输层错误
    #[error("网络请求失败: {0}")]
    Transport(String),

    /// 请求超时
    #[error("请求超时")]
    Timeout,

    /// 非 200 状态码
    #[error("HTTP 状态码 {0}")]
    Status(u16),

    /// 读取响应体失败
    #[error("读取响应失败: {0}")]
    Body(String),

    /// 图像解码失败
    #[error("图像解码失败: {0}")]
    Decode(String),

    /// 抓取任务 panic 或被中止
    #[error("抓取任务异常: {0}")]
    Task(String),
}

impl From<reqwest::Error> for FetchFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return FetchFailure::Timeout;
        }
        if let Some(status) = err.status() {
            return FetchFailure::Status(status.as_u16());
        }
        if err.is_body() || err.is_decode() {
            return FetchFailure::Body(err.to_string());
        }
        FetchFailure::Transport(err.to_string())
    }
}

/// 文档生成错误
#[derive(Debug, Error)]
pub enum AssembleError {
    /// 没有可用页面
    #[error("没有可写入的页面")]
    EmptyInput,

    /// JPEG 编码失败
    #[error("第 {page} 页编码失败: {source}")]
    Encode {
        page: usize,
        #[source]
        source: image::ImageError,
    },

    /// 写入输出文件失败
    #[error("写入文件失败 ({path}): {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },

    /// 配置文件读取或解析失败
    #[error("配置文件 {path} 无法加载: {reason}")]
    FileLoadFailed { path: String, reason: String },

    /// 配置值超出允许范围
    #[error("配置项 {field} 无效: {reason}")]
    InvalidValue { field: String, reason: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建 URL 格式错误
    pub fn invalid_pattern(url: impl Into<String>) -> Self {
        AppError::InvalidPattern { url: url.into() }
    }

    /// 创建输入错误
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        AppError::InvalidInput(msg.into())
    }
}

impl ConfigError {
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
