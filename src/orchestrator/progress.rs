//! 批次进度回报

use tracing::info;

/// 进度观察者
///
/// 只用于用户反馈；调用方保证在编排任务上同步调用，实现不应阻塞。
pub trait ProgressObserver: Send {
    fn on_progress(&mut self, completed: usize, total: usize);
}

/// 不回报进度
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _completed: usize, _total: usize) {}
}

/// 每完成约 10% 输出一行日志
#[derive(Debug, Default)]
pub struct LogProgress {
    last_decile: Option<usize>,
}

impl LogProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressObserver for LogProgress {
    fn on_progress(&mut self, completed: usize, total: usize) {
        if total == 0 {
            return;
        }
        if completed <= 1 {
            self.last_decile = None;
        }

        let decile = completed * 10 / total;
        if self.last_decile != Some(decile) || completed == total {
            self.last_decile = Some(decile);
            info!(
                "⏳ 进度: {}/{} ({}%)",
                completed,
                total,
                completed * 100 / total
            );
        }
    }
}
