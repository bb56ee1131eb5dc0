//! 终端交互
//!
//! 读取命令行参数或交互输入，并在每轮结束后询问失败页的处理方式

use tokio::io::{
    self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines, Stdin,
    Stdout,
};
use tracing::{error, warn};

use crate::app::RunRequest;
use crate::error::{AppError, AppResult};
use crate::models::FailedSet;
use crate::orchestrator::{Decision, DecisionSource};

const DECISION_MENU: &str = "\n可选操作:\n\
1. 重新下载失败的页面\n\
2. 使用已下载的页面继续\n\
3. 取消整个操作\n\
\n请输入选择 (1/2/3): ";

/// 解析命令行参数：`<示例URL> <页数>`；没有参数时返回 `None`，改为交互输入
pub fn request_from_args(args: &[String]) -> AppResult<Option<RunRequest>> {
    match args {
        [] => Ok(None),
        [url, pages] => Ok(Some(RunRequest {
            sample_url: url.trim().to_string(),
            total_pages: parse_page_count(pages)?,
        })),
        _ => Err(AppError::invalid_input("用法: doc_page_downloader <示例URL> <页数>")),
    }
}

/// 解析页数，必须是不小于 1 的整数
pub fn parse_page_count(input: &str) -> AppResult<u32> {
    match input.trim().parse::<u32>() {
        Ok(0) => Err(AppError::invalid_input("页数必须大于 0")),
        Ok(n) => Ok(n),
        Err(_) => Err(AppError::invalid_input(format!(
            "页数必须是整数: '{}'",
            input.trim()
        ))),
    }
}

/// 解析处理决定；无法识别时返回 `None`
pub fn parse_decision(input: &str) -> Option<Decision> {
    match input.trim().to_lowercase().as_str() {
        "1" | "r" | "retry" => Some(Decision::Retry),
        "2" | "a" | "accept" | "continue" => Some(Decision::Accept),
        "3" | "c" | "cancel" => Some(Decision::Cancel),
        _ => None,
    }
}

/// 终端输入输出
///
/// 整个程序只创建一个，避免多个缓冲读取器争抢标准输入。
/// 默认读写标准输入输出，也可以用 [`Console::with_io`] 接入任意读写端。
pub struct Console<R = BufReader<Stdin>, W = Stdout> {
    lines: Lines<R>,
    out: W,
}

impl Console {
    pub fn new() -> Self {
        Self::with_io(BufReader::new(io::stdin()), io::stdout())
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn with_io(reader: R, out: W) -> Self {
        Self {
            lines: reader.lines(),
            out,
        }
    }

    /// 输出提示并读取一行；输入结束时返回 `None`
    async fn ask(&mut self, question: &str) -> AppResult<Option<String>> {
        self.out.write_all(question.as_bytes()).await?;
        self.out.flush().await?;

        Ok(self
            .lines
            .next_line()
            .await?
            .map(|line| line.trim().to_string()))
    }

    /// 交互读取示例 URL 和页数，页数无效时重新询问
    pub async fn read_request(&mut self) -> AppResult<RunRequest> {
        let sample_url = self
            .ask("请输入包含 bgX.png 的页面图片 URL: ")
            .await?
            .ok_or_else(|| AppError::invalid_input("未输入 URL"))?;

        loop {
            let answer = self
                .ask("请输入总页数: ")
                .await?
                .ok_or_else(|| AppError::invalid_input("未输入页数"))?;

            match parse_page_count(&answer) {
                Ok(total_pages) => {
                    return Ok(RunRequest {
                        sample_url,
                        total_pages,
                    })
                }
                Err(e) => warn!("{}", e),
            }
        }
    }
}

impl<R, W> DecisionSource for Console<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn decide(&mut self, _round: usize, _failed: &FailedSet) -> Decision {
        loop {
            match self.ask(DECISION_MENU).await {
                Ok(Some(answer)) => match parse_decision(&answer) {
                    Some(decision) => return decision,
                    None => warn!("无效的选择 '{}'，请重新输入", answer),
                },
                Ok(None) => {
                    warn!("输入已结束，取消操作");
                    return Decision::Cancel;
                }
                Err(e) => {
                    error!("读取输入失败: {}，取消操作", e);
                    return Decision::Cancel;
                }
            }
        }
    }
}
