//! 失败页的处理决定
//!
//! 决定作为显式输入交给重试协调器，协调器本身不读终端。

use std::future::Future;

use tracing::info;

use crate::config::DecisionMode;
use crate::models::FailedSet;

/// 一轮结束后仍有失败页时的处理决定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// 只重新下载失败的页
    Retry,
    /// 接受已有页面，缺页跳过
    Accept,
    /// 放弃全部进度，不生成文件
    Cancel,
}

/// 决定来源（终端交互、自动策略、测试脚本）
pub trait DecisionSource: Send {
    /// `round` 为刚结束的轮次；实现负责处理无效输入并重新询问
    fn decide(&mut self, round: usize, failed: &FailedSet)
        -> impl Future<Output = Decision> + Send;
}

/// 无人值守的自动决定
#[derive(Debug, Clone)]
pub struct AutoDecider {
    retries_left: usize,
    fallback: Decision,
}

impl AutoDecider {
    /// 先重试 `rounds` 轮，之后接受部分结果
    pub fn retry_then_accept(rounds: usize) -> Self {
        Self {
            retries_left: rounds,
            fallback: Decision::Accept,
        }
    }

    pub fn accept() -> Self {
        Self::retry_then_accept(0)
    }

    pub fn cancel() -> Self {
        Self {
            retries_left: 0,
            fallback: Decision::Cancel,
        }
    }

    /// 由配置构造；`Prompt` 需要终端交互，返回 `None`
    pub fn from_mode(mode: DecisionMode, auto_retry_rounds: usize) -> Option<Self> {
        match mode {
            DecisionMode::Prompt => None,
            DecisionMode::Retry => Some(Self::retry_then_accept(auto_retry_rounds)),
            DecisionMode::Accept => Some(Self::accept()),
            DecisionMode::Cancel => Some(Self::cancel()),
        }
    }
}

impl DecisionSource for AutoDecider {
    async fn decide(&mut self, round: usize, failed: &FailedSet) -> Decision {
        let decision = if self.retries_left > 0 {
            self.retries_left -= 1;
            Decision::Retry
        } else {
            self.fallback
        };
        info!(
            "🤖 第 {} 轮后 {} 页失败，自动选择: {:?}",
            round,
            failed.len(),
            decision
        );
        decision
    }
}
