/// 日志工具模块
///
/// 提供日志初始化以及格式化输出的辅助函数
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::{FailedSet, MergeStats, ResultTable};
use crate::orchestrator::RunSummary;

/// 初始化日志
///
/// `RUST_LOG` 优先；否则 `verbose` 为真时输出 debug 级别。重复调用无副作用。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config, total_pages: u32) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 并发下载模式");
    info!("📄 请求页数: {}", total_pages);
    info!("📊 最大并发数: {}", config.max_concurrent_requests);
    info!("⏱️ 请求超时: {} 秒", config.request_timeout_secs);
    info!("{}", "=".repeat(60));
}

/// 记录一轮下载开始
///
/// # 参数
/// - `round`: 轮次（从 1 开始）
/// - `count`: 本轮请求数
/// - `total`: 总页数
pub fn log_round_start(round: usize, count: usize, total: usize) {
    info!("\n{}", "=".repeat(60));
    if round == 1 {
        info!("📦 第 {} 轮: 下载全部 {} 页", round, total);
    } else {
        info!("🔁 第 {} 轮: 重试 {} 页 / 共 {} 页", round, count, total);
    }
    info!("{}", "=".repeat(60));
}

/// 记录一轮下载完成
pub fn log_round_complete(round: usize, stats: &MergeStats, table: &ResultTable) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ 第 {} 轮完成: 成功 {}/{}，累计 {}/{}",
        round,
        stats.succeeded,
        stats.succeeded + stats.failed,
        table.delivered(),
        table.len()
    );
    info!("{}", "─".repeat(60));
}

/// 列出所有失败的页面（页码与资源标识）
pub fn log_failure_report(failed: &FailedSet, table: &ResultTable) {
    warn!("\n❌ {} 页下载失败:", failed.len());
    for position in failed.positions() {
        match table.failure_reason(*position) {
            Some(reason) => warn!("  第 {} 页 (bg{}.png): {}", position, position.hex_id(), reason),
            None => warn!("  第 {} 页 (bg{}.png)", position, position.hex_id()),
        }
    }
}

/// 打印最终统计信息
pub fn print_final_stats(summary: &RunSummary) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}", summary);
    info!("🔁 下载轮次: {}", summary.rounds);
    info!("📁 输出文件: {}", summary.output.display());
    if summary.shortfall() > 0 {
        warn!(
            "⚠️ 仅成功下载 {} 页，共请求 {} 页",
            summary.delivered, summary.requested
        );
    }
    info!("{}", "=".repeat(60));
}
