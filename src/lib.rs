//! # Doc Page Downloader
//!
//! 按页码并发下载文档页面图片，失败页可多轮重试，最后按原顺序合成一个 PDF
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（HTTP 连接池），只暴露能力
//! - `HttpSession` - 整次运行唯一的会话，固定请求头与超时
//!
//! ### ② 客户端与业务能力层（Clients / Services）
//! - `clients/` - `Fetcher` 抓取能力：一个 URL → 一个结果，不重试
//! - `services/` - 纯转换：URL 模板、图像解码、PDF 生成
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/batch_scheduler` - 一轮并发下载，按页码收集结果
//! - `orchestrator/retry_coordinator` - 结果表、失败集合与重试状态机
//!
//! ### ④ 应用层（App）
//! - `app` - 串起模板解析、下载、生成文件与统计
//! - `console` - 命令行参数、交互输入与重试选择
//!
//! ## 模块结构

pub mod app;
pub mod clients;
pub mod config;
pub mod console;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use app::{App, Completion, RunRequest};
pub use config::{Config, DecisionMode};
pub use console::Console;
pub use error::{AppError, AppResult, FetchFailure};
pub use models::{FetchOutcome, Position, ResultTable};
pub use orchestrator::{AutoDecider, Decision, DecisionSource, RunOutcome, RunSummary};
pub use services::UrlTemplate;
