//! 测试用的假抓取器与脚本化决定来源

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use image::{Rgb, RgbImage};

use crate::clients::Fetcher;
use crate::error::FetchFailure;
use crate::models::{FailedSet, FetchOutcome, PageImage, Position};
use crate::orchestrator::decision::{Decision, DecisionSource};
use crate::services::UrlTemplate;

pub const SAMPLE_URL: &str = "https://assets.example.com/doc/bg1.png?sig=abc";

pub fn template() -> UrlTemplate {
    UrlTemplate::parse(SAMPLE_URL).unwrap()
}

pub fn pos(n: u32) -> Position {
    Position::new(n).unwrap()
}

/// 每页颜色不同，便于检查顺序
pub fn page_for(n: u32) -> PageImage {
    let shade = (n % 256) as u8;
    PageImage::new(RgbImage::from_pixel(3, 3, Rgb([shade, 0, 0])))
}

/// 从 `.../bg<hex>.png...` 中取出页码
fn position_of(url: &str) -> u32 {
    let start = url.rfind("bg").map(|i| i + 2).unwrap_or(0);
    let end = url[start..].find(".png").map(|i| start + i).unwrap_or(url.len());
    u32::from_str_radix(&url[start..end], 16).unwrap()
}

/// 按页码脚本返回结果的假抓取器
///
/// 每页有一个失败次数；调用次数未超过该值时返回失败，之后成功。
#[derive(Default)]
pub struct ScriptedFetcher {
    failures_left: Mutex<HashMap<u32, usize>>,
    always_fail: Mutex<Vec<u32>>,
    delays: HashMap<u32, Duration>,
    calls: Mutex<HashMap<u32, usize>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 第 `n` 页先失败 `times` 次
    pub fn fail_times(self, n: u32, times: usize) -> Self {
        self.failures_left.lock().unwrap().insert(n, times);
        self
    }

    /// 第 `n` 页永远失败
    pub fn fail_always(self, n: u32) -> Self {
        self.always_fail.lock().unwrap().push(n);
        self
    }

    pub fn delay(mut self, n: u32, delay: Duration) -> Self {
        self.delays.insert(n, delay);
        self
    }

    pub fn calls(&self, n: u32) -> usize {
        self.calls.lock().unwrap().get(&n).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_outcome(&self, n: u32) -> FetchOutcome {
        *self.calls.lock().unwrap().entry(n).or_default() += 1;

        if self.always_fail.lock().unwrap().contains(&n) {
            return FetchOutcome::Failed(FetchFailure::Status(503));
        }

        let mut failures = self.failures_left.lock().unwrap();
        match failures.get_mut(&n) {
            Some(left) if *left > 0 => {
                *left -= 1;
                FetchOutcome::Failed(FetchFailure::Timeout)
            }
            _ => FetchOutcome::Ok(page_for(n)),
        }
    }
}

impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        let n = position_of(url);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self.delays.get(&n).copied().unwrap_or(Duration::from_millis(5));
        tokio::time::sleep(delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.next_outcome(n)
    }
}

/// 按顺序给出预设决定，并记录每次看到的失败集合
pub struct ScriptedDecider {
    script: VecDeque<Decision>,
    pub seen: Vec<Vec<u32>>,
}

impl ScriptedDecider {
    pub fn new(script: impl IntoIterator<Item = Decision>) -> Self {
        Self {
            script: script.into_iter().collect(),
            seen: Vec::new(),
        }
    }
}

impl DecisionSource for ScriptedDecider {
    async fn decide(&mut self, _round: usize, failed: &FailedSet) -> Decision {
        self.seen
            .push(failed.positions().iter().map(|p| p.get()).collect());
        self.script.pop_front().expect("决定脚本已用完")
    }
}
