//! HTTP 会话 - 基础设施层
//!
//! 持有整次运行共享的连接池，只暴露"发 GET"的能力

use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// 模拟浏览器直接加载图片时的请求头
const BROWSER_IMAGE_HEADERS: &[(&str, &str)] = &[
    (
        "user-agent",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:135.0) Gecko/20100101 Firefox/135.0",
    ),
    (
        "accept",
        "image/avif,image/jxl,image/webp,image/png,image/svg+xml,image/*;q=0.8,*/*;q=0.5",
    ),
    ("accept-language", "en-US,en;q=0.5"),
    ("sec-gpc", "1"),
    ("sec-fetch-dest", "image"),
    ("sec-fetch-mode", "no-cors"),
    ("sec-fetch-site", "same-site"),
    ("priority", "u=5, i"),
    ("pragma", "no-cache"),
    ("cache-control", "no-cache"),
];

/// HTTP 会话
///
/// 职责：
/// - 在运行开始时创建一次，所有轮次的所有请求共用
/// - 固定请求头与超时
/// - 不认识页码，不处理重试
///
/// 内部的 `reqwest::Client` 基于 `Arc`，克隆只增加引用计数；最后一个副本释放时连接池关闭。
#[derive(Clone, Debug)]
pub struct HttpSession {
    client: Client,
}

impl HttpSession {
    /// 根据配置创建会话
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = Client::builder()
            .default_headers(browser_image_headers())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_max_idle_per_host(config.max_concurrent_requests)
            .build()
            .map_err(AppError::Session)?;

        Ok(Self { client })
    }

    /// 发送一次 GET 请求
    pub async fn get(&self, url: &str) -> reqwest::Result<Response> {
        self.client.get(url).send().await
    }
}

fn browser_image_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    for &(name, value) in BROWSER_IMAGE_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    headers
}

/// 请求头中的 User-Agent，供测试比对
pub fn user_agent() -> &'static str {
    BROWSER_IMAGE_HEADERS
        .iter()
        .find(|(name, _)| *name == header::USER_AGENT.as_str())
        .map(|(_, value)| *value)
        .unwrap_or_default()
}
