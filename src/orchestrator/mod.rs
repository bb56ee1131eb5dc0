//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责并发下载和重试调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_scheduler` - 批次调度器
//! - 为一组页码并发启动抓取任务
//! - 控制并发数量（Semaphore）
//! - 按页码收集结果，回报进度
//!
//! ### `retry_coordinator` - 重试协调器
//! - 独占结果表，批次完成后合并
//! - 计算失败集合，向决定来源请求 retry / accept / cancel
//! - 只重试失败页，直到得到最终结果
//!
//! ## 层次关系
//!
//! ```text
//! retry_coordinator (处理 1..=N 页与多轮重试)
//!     ↓
//! batch_scheduler (处理一轮中的一组页码)
//!     ↓
//! clients::Fetcher (处理单个 URL)
//!     ↓
//! infrastructure (基础设施：HttpSession)
//! ```

pub mod batch_scheduler;
pub mod decision;
pub mod progress;
pub mod retry_coordinator;

#[cfg(test)]
pub(crate) mod test_support;

use std::fmt::Display;
use std::path::PathBuf;

// 重新导出主要类型
pub use batch_scheduler::BatchScheduler;
pub use decision::{AutoDecider, Decision, DecisionSource};
pub use progress::{LogProgress, NoProgress, ProgressObserver};
pub use retry_coordinator::{RetryCoordinator, RunOutcome};

/// 生成文件后的运行统计
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// 请求页数
    pub requested: usize,
    /// 写入文件的页数
    pub delivered: usize,
    /// 下载轮次
    pub rounds: usize,
    /// 输出文件
    pub output: PathBuf,
}

impl RunSummary {
    /// 缺页数
    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.delivered)
    }
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.delivered, self.requested)
    }
}
