use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::clients::HttpImageFetcher;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::HttpSession;
use crate::orchestrator::{
    BatchScheduler, DecisionSource, LogProgress, RetryCoordinator, RunOutcome, RunSummary,
};
use crate::services::{PdfAssembler, UrlTemplate};
use crate::utils::logging;

/// 一次下载请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    /// 任意一页的图片 URL
    pub sample_url: String,
    /// 总页数 N
    pub total_pages: u32,
}

/// 运行结束状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// 已生成文件（可能缺页）
    Written(RunSummary),
    /// 用户取消，未生成文件
    Cancelled,
}

/// 应用主结构
///
/// 持有整次运行共享的 HTTP 会话；`App` 释放时会话随之释放。
pub struct App {
    config: Config,
    session: HttpSession,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> AppResult<Self> {
        let session = HttpSession::new(&config)?;
        Ok(Self { config, session })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 运行应用主逻辑
    ///
    /// URL 格式无效时在任何网络请求之前返回错误。
    pub async fn run<D>(&self, request: RunRequest, decider: D) -> AppResult<Completion>
    where
        D: DecisionSource,
    {
        let template = UrlTemplate::parse(&request.sample_url)?;
        logging::log_startup(&self.config, request.total_pages);

        let fetcher = Arc::new(HttpImageFetcher::new(self.session.clone()));
        let scheduler = BatchScheduler::new(fetcher, self.config.max_concurrent_requests);
        let mut coordinator =
            RetryCoordinator::new(scheduler, decider).with_progress(LogProgress::new());

        let (table, rounds) = match coordinator.run(&template, request.total_pages).await {
            RunOutcome::Cancelled { .. } => return Ok(Completion::Cancelled),
            RunOutcome::Complete { table, rounds } | RunOutcome::Partial { table, rounds } => {
                (table, rounds)
            }
        };

        let requested = table.len();
        let pages = table.into_pages();
        if pages.is_empty() {
            warn!("❌ 没有成功下载任何页面");
            return Err(AppError::EmptyResult {
                requested: request.total_pages,
            });
        }

        info!("\n📄 正在生成 PDF...");
        let output = PathBuf::from(&self.config.output_path);
        let assembler = PdfAssembler::new(self.config.jpeg_quality);
        let target = output.clone();
        let delivered = tokio::task::spawn_blocking(move || {
            assembler.assemble(&pages, requested, &target)
        })
        .await??;

        let summary = RunSummary {
            requested,
            delivered,
            rounds,
            output,
        };
        logging::print_final_stats(&summary);

        Ok(Completion::Written(summary))
    }
}
