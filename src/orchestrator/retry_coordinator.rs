//! 重试协调器 - 编排层
//!
//! ## 状态机
//!
//! ```text
//! Running(1) ──► 无失败 ──► Complete
//!     │
//!     ▼
//! AwaitingDecision ──cancel──► Cancelled
//!     │        └────accept──► Partial
//!     └─retry─► Running(n+1)（只抓取失败页）
//! ```
//!
//! 结果表由本模块独占，只在批次全部完成后合并；成功的页不会被再次请求或覆盖。

use tracing::{info, warn};

use crate::clients::Fetcher;
use crate::models::{FailedSet, Position, ResultTable};
use crate::orchestrator::batch_scheduler::BatchScheduler;
use crate::orchestrator::decision::{Decision, DecisionSource};
use crate::orchestrator::progress::{NoProgress, ProgressObserver};
use crate::services::UrlTemplate;
use crate::utils::logging;

/// 一次运行的最终结果
#[derive(Debug)]
pub enum RunOutcome {
    /// 全部页面下载成功
    Complete { table: ResultTable, rounds: usize },
    /// 存在缺页，用户选择接受
    Partial { table: ResultTable, rounds: usize },
    /// 用户取消，结果表已丢弃
    Cancelled { rounds: usize },
}

impl RunOutcome {
    pub fn rounds(&self) -> usize {
        match self {
            RunOutcome::Complete { rounds, .. }
            | RunOutcome::Partial { rounds, .. }
            | RunOutcome::Cancelled { rounds } => *rounds,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunOutcome::Cancelled { .. })
    }
}

enum State {
    Running { round: usize, positions: Vec<Position> },
    AwaitingDecision { round: usize, failed: FailedSet },
}

/// 重试协调器
pub struct RetryCoordinator<F, D> {
    scheduler: BatchScheduler<F>,
    decider: D,
    progress: Box<dyn ProgressObserver>,
}

impl<F, D> RetryCoordinator<F, D>
where
    F: Fetcher + 'static,
    D: DecisionSource,
{
    pub fn new(scheduler: BatchScheduler<F>, decider: D) -> Self {
        Self {
            scheduler,
            decider,
            progress: Box::new(NoProgress),
        }
    }

    /// 设置进度观察者
    pub fn with_progress(mut self, progress: impl ProgressObserver + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    /// 下载第 1..=`total` 页，按决定重试，直到得到最终结果
    pub async fn run(&mut self, template: &UrlTemplate, total: u32) -> RunOutcome {
        let mut table = ResultTable::new(total);
        let mut state = State::Running {
            round: 1,
            positions: Position::range(total).collect(),
        };
        let mut previous_failed = table.len();

        loop {
            state = match state {
                State::Running { round, positions } => {
                    logging::log_round_start(round, positions.len(), table.len());

                    let batch = self
                        .scheduler
                        .run_batch(template, &positions, self.progress.as_mut())
                        .await;
                    let stats = table.merge(batch);
                    logging::log_round_complete(round, &stats, &table);

                    let failed = table.failed_set();
                    if failed.len() > previous_failed {
                        warn!(
                            "⚠️ 失败页数从 {} 增加到 {}",
                            previous_failed,
                            failed.len()
                        );
                    }
                    previous_failed = failed.len();

                    if failed.is_empty() {
                        info!("✅ 全部 {} 页下载成功", table.len());
                        return RunOutcome::Complete {
                            table,
                            rounds: round,
                        };
                    }
                    State::AwaitingDecision { round, failed }
                }

                State::AwaitingDecision { round, failed } => {
                    logging::log_failure_report(&failed, &table);

                    match self.decider.decide(round, &failed).await {
                        Decision::Cancel => {
                            info!("🛑 操作已取消，不会生成任何文件");
                            return RunOutcome::Cancelled { rounds: round };
                        }
                        Decision::Accept => {
                            info!(
                                "➡️ 接受部分结果: {}/{} 页",
                                table.delivered(),
                                table.len()
                            );
                            return RunOutcome::Partial {
                                table,
                                rounds: round,
                            };
                        }
                        Decision::Retry => State::Running {
                            round: round + 1,
                            positions: failed.positions().to_vec(),
                        },
                    }
                }
            };
        }
    }
}
