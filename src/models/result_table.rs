//! 结果表与失败集合
//!
//! 结果表只由编排层持有，批次结束后统一合并，不存在并发写入。

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::FetchFailure;
use crate::models::outcome::{FetchOutcome, PageImage};
use crate::models::position::Position;

/// 一个批次的全部结果，按位置索引（与完成顺序无关）
pub type BatchResults = BTreeMap<Position, FetchOutcome>;

/// 结果表中的一个槽位
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    /// 已成功下载并解码
    Ready(PageImage),
    /// 缺失；`None` 表示尚未尝试
    Missing(Option<FetchFailure>),
}

/// 合并统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeStats {
    pub succeeded: usize,
    pub failed: usize,
    /// 已成功的位置或越界位置，被忽略
    pub ignored: usize,
}

/// 结果表：位置 1..=N 到图像或缺失标记的稠密映射
///
/// 大小恒为 N，只增不减；已成功的槽位不会被后续轮次覆盖。
#[derive(Debug, Clone)]
pub struct ResultTable {
    slots: Vec<Slot>,
}

impl ResultTable {
    /// 创建 `total` 个全部缺失的槽位
    pub fn new(total: u32) -> Self {
        Self {
            slots: vec![Slot::Missing(None); total as usize],
        }
    }

    /// 请求的总页数 N
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, position: Position) -> Option<&Slot> {
        self.slots.get(position.slot())
    }

    /// 已成功的页数
    pub fn delivered(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }

    /// 合并一个已完成批次的结果
    pub fn merge(&mut self, batch: BatchResults) -> MergeStats {
        let mut stats = MergeStats::default();

        for (position, outcome) in batch {
            let Some(slot) = self.slots.get_mut(position.slot()) else {
                warn!("⚠️ 位置 {} 超出范围 [1, {}]，忽略", position, self.slots.len());
                stats.ignored += 1;
                continue;
            };

            if matches!(slot, Slot::Ready(_)) {
                debug!("位置 {} 已成功，忽略新结果", position);
                stats.ignored += 1;
                continue;
            }

            match outcome {
                FetchOutcome::Ok(page) => {
                    *slot = Slot::Ready(page);
                    stats.succeeded += 1;
                }
                FetchOutcome::Failed(reason) => {
                    *slot = Slot::Missing(Some(reason));
                    stats.failed += 1;
                }
            }
        }

        stats
    }

    /// 根据当前结果重新计算失败集合（按位置升序）
    pub fn failed_set(&self) -> FailedSet {
        let positions = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| matches!(slot, Slot::Missing(_)))
            .filter_map(|(idx, _)| Position::new(idx as u32 + 1))
            .collect();
        FailedSet(positions)
    }

    /// 最近一次失败原因
    pub fn failure_reason(&self, position: Position) -> Option<&FetchFailure> {
        match self.get(position) {
            Some(Slot::Missing(reason)) => reason.as_ref(),
            _ => None,
        }
    }

    /// 按原始页码顺序取出成功的页面，缺失的页被跳过
    pub fn into_pages(self) -> Vec<PageImage> {
        self.slots
            .into_iter()
            .filter_map(|slot| match slot {
                Slot::Ready(page) => Some(page),
                Slot::Missing(_) => None,
            })
            .collect()
    }
}

/// 当前缺失的位置集合（升序）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailedSet(Vec<Position>);

impl FailedSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn positions(&self) -> &[Position] {
        &self.0
    }

    pub fn contains(&self, position: Position) -> bool {
        self.0.binary_search(&position).is_ok()
    }
}
