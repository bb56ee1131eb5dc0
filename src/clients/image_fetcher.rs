/// 页面图像抓取客户端
///
/// 一次调用只发一次请求，不重试，所有失败都转换为 [`FetchOutcome::Failed`]
use std::future::Future;

use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::error::FetchFailure;
use crate::infrastructure::HttpSession;
use crate::models::{FetchOutcome, PageImage};
use crate::services::decode_page;

/// 抓取能力：URL → 结果
///
/// 实现不得 panic 或返回错误，失败一律作为 `FetchOutcome::Failed` 返回。
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = FetchOutcome> + Send;
}

/// 基于共享 HTTP 会话的图像抓取器
#[derive(Clone)]
pub struct HttpImageFetcher {
    session: HttpSession,
}

impl HttpImageFetcher {
    pub fn new(session: HttpSession) -> Self {
        Self { session }
    }

    async fn try_fetch(&self, url: &str) -> Result<PageImage, FetchFailure> {
        let response = self.session.get(url).await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchFailure::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        debug!("下载完成 {} ({} 字节)", url, bytes.len());

        // 解码是 CPU 密集操作，不占用异步工作线程
        tokio::task::spawn_blocking(move || decode_page(&bytes))
            .await
            .map_err(|e| FetchFailure::Task(e.to_string()))?
    }
}

impl Fetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        let result = self.try_fetch(url).await;
        if let Err(reason) = &result {
            warn!("下载失败 {}: {}", url, reason);
        }
        result.into()
    }
}
