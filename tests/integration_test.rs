use doc_page_downloader::{App, AppError, AutoDecider, Completion, Config, RunRequest};
use image::{Rgba, RgbaImage};
use std::io::Cursor;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 收集日志输出的缓冲区
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    (buffer, tracing::subscriber::set_default(subscriber))
}

/// 第 n 页宽度为 10 + n，便于从 PDF 中检查页序
fn page_png(n: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(10 + n, 20, Rgba([n as u8, 50, 50, 255]));
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, image::ImageFormat::Png)
        .expect("Failed to encode PNG");
    buffer.into_inner()
}

async fn serve_page(server: &MockServer, n: u32) {
    Mock::given(method("GET"))
        .and(path(format!("/doc/bg{:x}.png", n)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(page_png(n)))
        .mount(server)
        .await;
}

async fn fail_page(server: &MockServer, n: u32, status: u16, times: Option<u64>) {
    let mock = Mock::given(method("GET"))
        .and(path(format!("/doc/bg{:x}.png", n)))
        .respond_with(ResponseTemplate::new(status))
        .with_priority(1);
    let mock = match times {
        Some(times) => mock.up_to_n_times(times),
        None => mock,
    };
    mock.mount(server).await;
}

fn app_writing_to(dir: &TempDir) -> App {
    let config = Config {
        max_concurrent_requests: 3,
        request_timeout_secs: 5,
        output_path: dir.path().join("output.pdf").display().to_string(),
        ..Config::default()
    };
    App::initialize(config).expect("创建应用失败")
}

fn request(server: &MockServer, total_pages: u32) -> RunRequest {
    RunRequest {
        sample_url: format!("{}/doc/bg1.png", server.uri()),
        total_pages,
    }
}

/// 按出现顺序返回 PDF 中各页的宽度
fn page_widths(pdf: &Path) -> Vec<u32> {
    let bytes = std::fs::read(pdf).expect("读取 PDF 失败");
    let text = String::from_utf8_lossy(&bytes);
    text.match_indices("/MediaBox [0 0 ")
        .map(|(idx, marker)| {
            let rest = &text[idx + marker.len()..];
            rest.split(' ').next().unwrap().parse().unwrap()
        })
        .collect()
}

#[tokio::test]
async fn test_all_pages_succeed() {
    let server = MockServer::start().await;
    for n in 1..=5 {
        serve_page(&server, n).await;
    }
    let dir = TempDir::new().unwrap();
    let app = app_writing_to(&dir);

    let completion = app
        .run(request(&server, 5), AutoDecider::cancel())
        .await
        .unwrap();

    let Completion::Written(summary) = completion else {
        panic!("应该生成文件");
    };
    assert_eq!(summary.delivered, 5);
    assert_eq!(summary.requested, 5);
    assert_eq!(summary.rounds, 1);
    assert_eq!(summary.shortfall(), 0);
    assert_eq!(page_widths(&summary.output), vec![11, 12, 13, 14, 15]);
}

#[tokio::test]
async fn test_retry_fills_original_slots() {
    let server = MockServer::start().await;
    for n in 1..=5 {
        serve_page(&server, n).await;
    }
    fail_page(&server, 2, 503, Some(1)).await;
    fail_page(&server, 4, 500, Some(1)).await;
    let dir = TempDir::new().unwrap();
    let app = app_writing_to(&dir);

    let completion = app
        .run(request(&server, 5), AutoDecider::retry_then_accept(1))
        .await
        .unwrap();

    let Completion::Written(summary) = completion else {
        panic!("应该生成文件");
    };
    assert_eq!(summary.delivered, 5);
    assert_eq!(summary.rounds, 2);
    assert_eq!(page_widths(&summary.output), vec![11, 12, 13, 14, 15]);

    // 第二轮只请求失败的两页
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 7);
}

#[tokio::test]
async fn test_accept_partial_result() {
    let server = MockServer::start().await;
    for n in 1..=5 {
        serve_page(&server, n).await;
    }
    fail_page(&server, 3, 500, None).await;
    let dir = TempDir::new().unwrap();
    let app = app_writing_to(&dir);

    let completion = app
        .run(request(&server, 5), AutoDecider::retry_then_accept(1))
        .await
        .unwrap();

    let Completion::Written(summary) = completion else {
        panic!("应该生成文件");
    };
    assert_eq!(summary.to_string(), "4/5");
    assert_eq!(summary.shortfall(), 1);
    assert_eq!(summary.rounds, 2);
    assert_eq!(page_widths(&summary.output), vec![11, 12, 14, 15]);
}

#[tokio::test]
async fn test_cancel_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let app = app_writing_to(&dir);

    let completion = app
        .run(request(&server, 5), AutoDecider::cancel())
        .await
        .unwrap();

    assert_eq!(completion, Completion::Cancelled);
    assert!(!dir.path().join("output.pdf").exists());
}

#[tokio::test]
async fn test_nothing_downloaded_is_empty_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let app = app_writing_to(&dir);

    let err = app
        .run(request(&server, 3), AutoDecider::accept())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::EmptyResult { requested: 3 }));
    assert!(!dir.path().join("output.pdf").exists());
}

#[tokio::test]
async fn test_invalid_pattern_makes_no_requests() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let app = app_writing_to(&dir);

    let err = app
        .run(
            RunRequest {
                sample_url: format!("{}/doc/page1.jpg", server.uri()),
                total_pages: 5,
            },
            AutoDecider::accept(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidPattern { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_shortfall_warning_logged_once() {
    let server = MockServer::start().await;
    for n in 1..=5 {
        serve_page(&server, n).await;
    }
    fail_page(&server, 3, 500, None).await;
    let dir = TempDir::new().unwrap();
    let app = app_writing_to(&dir);
    let (logs, _guard) = capture_logs();

    app.run(request(&server, 5), AutoDecider::accept())
        .await
        .unwrap();

    assert_eq!(logs.contents().matches("⚠️ 仅").count(), 1);
}

#[tokio::test]
async fn test_cancel_logged_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let app = app_writing_to(&dir);
    let (logs, _guard) = capture_logs();

    app.run(request(&server, 2), AutoDecider::cancel())
        .await
        .unwrap();

    assert_eq!(logs.contents().matches("已取消").count(), 1);
}
