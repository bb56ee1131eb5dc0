//! 批次调度器 - 编排层
//!
//! ## 职责
//!
//! 给定一组页码，为每一页启动一个抓取任务，全部完成后按页码返回结果。
//!
//! ## 设计特点
//!
//! - **扇出/扇入**：所有任务同时提交，批次在最后一个任务结束时才算完成
//! - **并发上限**：通过 Semaphore 限制同时进行的请求数
//! - **按页码关联**：结果以页码为键收集，与完成顺序无关
//! - **不持有结果表**：结果按值返回，由重试协调器统一合并

use std::collections::BTreeSet;
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tracing::{debug, error};

use crate::clients::Fetcher;
use crate::error::FetchFailure;
use crate::models::{BatchResults, FetchOutcome, Position};
use crate::orchestrator::progress::ProgressObserver;
use crate::services::UrlTemplate;

/// 批次调度器
pub struct BatchScheduler<F> {
    fetcher: Arc<F>,
    semaphore: Arc<Semaphore>,
}

impl<F> BatchScheduler<F>
where
    F: Fetcher + 'static,
{
    /// # 参数
    /// - `fetcher`: 共享的抓取器
    /// - `max_in_flight`: 同时进行的请求数上限（至少为 1）
    pub fn new(fetcher: Arc<F>, max_in_flight: usize) -> Self {
        Self {
            fetcher,
            semaphore: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    /// 并发抓取一组页码，等待全部完成
    ///
    /// 重复的页码只抓取一次。单个任务 panic 不会中断批次，对应页码记为失败。
    pub async fn run_batch(
        &self,
        template: &UrlTemplate,
        positions: &[Position],
        progress: &mut dyn ProgressObserver,
    ) -> BatchResults {
        let unique: BTreeSet<Position> = positions.iter().copied().collect();
        let total = unique.len();
        let mut pending = FuturesUnordered::new();

        // 为本批创建并发任务
        for position in unique {
            let url = template.resolve(position);
            let fetcher = Arc::clone(&self.fetcher);
            let semaphore = Arc::clone(&self.semaphore);

            let handle = tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => return FetchOutcome::Failed(FetchFailure::Task(e.to_string())),
                };
                debug!("[第 {} 页] 请求 {}", position, url);
                fetcher.fetch(&url).await
            });

            pending.push(async move { (position, handle.await) });
        }

        // 等待本批所有任务完成
        let mut results = BatchResults::new();
        while let Some((position, joined)) = pending.next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("[第 {} 页] 任务执行失败: {}", position, e);
                    FetchOutcome::Failed(FetchFailure::Task(e.to_string()))
                }
            };
            results.insert(position, outcome);
            progress.on_progress(results.len(), total);
        }

        results
    }
}
