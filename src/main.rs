use anyhow::Result;
use doc_page_downloader::console::request_from_args;
use doc_page_downloader::utils::logging;
use doc_page_downloader::{App, AutoDecider, Config, Console};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 读取下载请求
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut console = Console::new();
    let request = match request_from_args(&args)? {
        Some(request) => request,
        None => console.read_request().await?,
    };

    // 初始化并运行应用
    let app = App::initialize(config)?;
    match AutoDecider::from_mode(app.config().decision_mode, app.config().auto_retry_rounds) {
        Some(decider) => app.run(request, decider).await?,
        None => app.run(request, console).await?,
    };

    Ok(())
}
