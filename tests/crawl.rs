use std::path::Path;
use std::time::Duration;

use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use weibo_wall_downloader::api::{ClientSettings, DEFAULT_USER_AGENT};
use weibo_wall_downloader::download::{progress, run_crawl, RetryPolicy};
use weibo_wall_downloader::{
    start_crawl, CrawlHandle, CrawlReport, CrawlRequest, CrawlSettings, CrawlStatus, Error,
    ProgressEvent,
};

const UID: &str = "1234567890";
const COOKIE: &str = "SUB=test-session; SUBP=abc";
const WALL_PATH: &str = "/ajax/profile/getImageWall";

struct Dirs {
    images: TempDir,
    videos: TempDir,
}

impl Dirs {
    fn new() -> Self {
        Self {
            images: tempfile::tempdir().unwrap(),
            videos: tempfile::tempdir().unwrap(),
        }
    }

    fn request(&self) -> CrawlRequest {
        CrawlRequest::new(UID, COOKIE, self.images.path(), self.videos.path())
    }
}

fn settings(server: &MockServer) -> CrawlSettings {
    CrawlSettings {
        client: ClientSettings {
            api_base: server.uri(),
            image_cdn_base: format!("{}/large/", server.uri()),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(5),
        },
        concurrent_downloads: 4,
        retry: RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        },
        page_delay: Duration::ZERO,
    }
}

fn page(items: Value, since_id: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "ok": 1,
        "data": { "list": items, "since_id": since_id }
    }))
}

async fn mount_page(server: &MockServer, since_id: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(WALL_PATH))
        .and(query_param("uid", UID))
        .and(query_param("sinceid", since_id))
        .and(query_param("has_album", "true"))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn mount_media(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/large/[^/]+\.jpg$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg-bytes".to_vec()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/video/[^/]+\.mov$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"mov-bytes".to_vec()))
        .mount(server)
        .await;
}

async fn drain(mut handle: CrawlHandle) -> (Vec<ProgressEvent>, CrawlReport) {
    let mut events = Vec::new();
    while let Some(event) = handle.next_event().await {
        events.push(event);
    }
    (events, handle.wait().await)
}

async fn crawl(request: CrawlRequest, settings: CrawlSettings) -> (Vec<ProgressEvent>, CrawlReport) {
    drain(start_crawl(request, settings)).await
}

/// Image host where `bad.jpg` fails after 300ms and every other file sends
/// 10 of its 100 bytes, then stalls.
async fn spawn_stalling_cdn() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = vec![0u8; 4096];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]).into_owned();

                if request.starts_with("GET /large/bad.jpg") {
                    tokio::time::sleep(Duration::from_millis(300)).await;
                    let _ = socket
                        .write_all(b"HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\n\r\n")
                        .await;
                } else {
                    let _ = socket
                        .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 100\r\n\r\n0123456789")
                        .await;
                    tokio::time::sleep(Duration::from_secs(60)).await;
                }
            });
        }
    });

    format!("http://{}/large/", addr)
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn terminal_events(events: &[ProgressEvent]) -> usize {
    events.iter().filter(|e| e.is_terminal()).count()
}

async fn requested_cursors(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == WALL_PATH)
        .filter_map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "sinceid")
                .map(|(_, v)| v.into_owned())
        })
        .collect()
}

#[tokio::test]
async fn two_page_wall_downloads_every_item() {
    let server = MockServer::start().await;
    let video_url = format!("{}/video/clip.mov", server.uri());

    Mock::given(method("GET"))
        .and(path(WALL_PATH))
        .and(query_param("sinceid", ""))
        .and(header("cookie", COOKIE))
        .and(header("referer", "https://weibo.com/u/1234567890?tabtype=album"))
        .respond_with(page(
            json!([
                {"type": "pic", "pid": "img001"},
                {"type": "pic", "pid": "img002"},
                {"type": "livephoto", "pid": "lp001", "video": video_url},
                {"type": "pic", "pid": "img003"}
            ]),
            json!("100"),
        ))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "100", page(json!([]), json!(0))).await;
    mount_media(&server).await;

    let dirs = Dirs::new();
    let (events, report) = crawl(dirs.request(), settings(&server)).await;

    assert_eq!(report.status, CrawlStatus::Completed);
    assert_eq!(report.stats.images_downloaded, 3);
    assert_eq!(report.stats.videos_downloaded, 1);
    assert_eq!(report.stats.pages_processed, 1);

    assert_eq!(terminal_events(&events), 1);
    assert!(matches!(
        events.last(),
        Some(ProgressEvent::Completed {
            total_images: 3,
            total_videos: 1
        })
    ));
    assert!(events.iter().any(|e| matches!(
        e,
        ProgressEvent::PageSummary {
            page: 1,
            images: 3,
            videos: 1
        }
    )));
    assert!(events
        .iter()
        .any(|e| e.to_string() == "reached last page, no more data"));

    assert_eq!(
        file_names(dirs.images.path()),
        vec!["img001.jpg", "img002.jpg", "img003.jpg"]
    );
    assert_eq!(file_names(dirs.videos.path()), vec!["clip.mp4"]);
    assert_eq!(
        std::fs::read(dirs.videos.path().join("clip.mp4")).unwrap(),
        b"mov-bytes"
    );
}

#[tokio::test]
async fn forbidden_first_page_fails_with_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WALL_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .expect(1)
        .mount(&server)
        .await;
    mount_media(&server).await;

    let dirs = Dirs::new();
    let (events, report) = crawl(dirs.request(), settings(&server)).await;

    assert_eq!(report.status, CrawlStatus::Failed);
    assert_eq!(terminal_events(&events), 1);

    let failures: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::Failed { error, .. } => Some(error),
            _ => None,
        })
        .collect();
    assert_eq!(failures.len(), 1);
    assert!(matches!(failures[0], Error::Authentication { status: 403, .. }));

    assert!(file_names(dirs.images.path()).is_empty());
    assert!(file_names(dirs.videos.path()).is_empty());
}

#[tokio::test]
async fn unknown_item_types_are_ignored() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "",
        page(
            json!([
                {"type": "pic", "pid": "keep01"},
                {"type": "unknown_type", "pid": "skip01"},
                {"type": "article", "pid": "skip02"}
            ]),
            json!("5"),
        ),
    )
    .await;
    mount_page(&server, "5", page(json!([]), json!("0"))).await;
    mount_media(&server).await;

    let dirs = Dirs::new();
    let (events, report) = crawl(dirs.request(), settings(&server)).await;

    assert_eq!(report.status, CrawlStatus::Completed);
    assert_eq!(report.stats.images_downloaded, 1);
    assert_eq!(report.stats.videos_downloaded, 0);
    assert!(matches!(
        events.last(),
        Some(ProgressEvent::Completed {
            total_images: 1,
            total_videos: 0
        })
    ));
    assert_eq!(file_names(dirs.images.path()), vec!["keep01.jpg"]);
    assert!(file_names(dirs.videos.path()).is_empty());
}

#[tokio::test]
async fn terminal_page_items_are_not_downloaded() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "",
        page(json!([{"type": "pic", "pid": "never"}]), json!(0)),
    )
    .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/large/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dirs = Dirs::new();
    let (events, report) = crawl(dirs.request(), settings(&server)).await;

    assert_eq!(report.status, CrawlStatus::Completed);
    assert_eq!(report.stats.pages_processed, 0);
    assert_eq!(terminal_events(&events), 1);
    assert!(matches!(
        events.last(),
        Some(ProgressEvent::Completed {
            total_images: 0,
            total_videos: 0
        })
    ));
    assert!(file_names(dirs.images.path()).is_empty());
}

#[tokio::test]
async fn cursors_are_never_reissued() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "",
        page(json!([{"type": "pic", "pid": "first"}]), json!("7")),
    )
    .await;
    // A misbehaving server that hands back the cursor it was just given.
    mount_page(
        &server,
        "7",
        page(json!([{"type": "pic", "pid": "second"}]), json!("7")),
    )
    .await;
    mount_media(&server).await;

    let dirs = Dirs::new();
    let (events, report) = crawl(dirs.request(), settings(&server)).await;

    assert_eq!(report.status, CrawlStatus::Completed);
    assert_eq!(report.stats.pages_processed, 2);
    assert_eq!(terminal_events(&events), 1);
    assert_eq!(file_names(dirs.images.path()), vec!["first.jpg", "second.jpg"]);

    let cursors = requested_cursors(&server).await;
    assert_eq!(cursors, vec!["".to_string(), "7".to_string()]);
}

#[tokio::test]
async fn transient_server_errors_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WALL_PATH))
        .and(query_param("sinceid", ""))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_page(
        &server,
        "",
        page(json!([{"type": "pic", "pid": "after_retry"}]), json!("2")),
    )
    .await;
    mount_page(&server, "2", page(json!([]), json!(0))).await;
    mount_media(&server).await;

    let dirs = Dirs::new();
    let (_, report) = crawl(dirs.request(), settings(&server)).await;

    assert_eq!(report.status, CrawlStatus::Completed);
    assert_eq!(file_names(dirs.images.path()), vec!["after_retry.jpg"]);
}

#[tokio::test]
async fn failed_download_aborts_the_crawl() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "",
        page(json!([{"type": "pic", "pid": "missing"}]), json!("9")),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/large/missing.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let dirs = Dirs::new();
    let (events, report) = crawl(dirs.request(), settings(&server)).await;

    assert_eq!(report.status, CrawlStatus::Failed);
    assert!(matches!(
        events.last(),
        Some(ProgressEvent::Failed {
            error: Error::Download {
                status: Some(404),
                ..
            },
            ..
        })
    ));
    assert!(file_names(dirs.images.path()).is_empty());

    // The crawl stopped before asking for the next page.
    assert_eq!(requested_cursors(&server).await, vec!["".to_string()]);
}

#[tokio::test]
async fn failed_page_leaves_no_partial_files() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "",
        page(
            json!([
                {"type": "pic", "pid": "bad"},
                {"type": "pic", "pid": "slow"}
            ]),
            json!("2"),
        ),
    )
    .await;

    let dirs = Dirs::new();
    let mut settings = settings(&server);
    settings.client.image_cdn_base = spawn_stalling_cdn().await;
    settings.retry = RetryPolicy::none();

    let (events, report) = crawl(dirs.request(), settings).await;

    assert_eq!(report.status, CrawlStatus::Failed);
    assert!(matches!(
        events.last(),
        Some(ProgressEvent::Failed {
            error: Error::Download {
                status: Some(404),
                ..
            },
            ..
        })
    ));
    // Neither the truncated "slow.jpg" nor its ".part" file survives.
    assert!(file_names(dirs.images.path()).is_empty());
}

#[tokio::test]
async fn malformed_page_is_a_fetch_error() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "",
        ResponseTemplate::new(200).set_body_json(json!({"ok": 1, "data": {}})),
    )
    .await;

    let dirs = Dirs::new();
    let (events, report) = crawl(dirs.request(), settings(&server)).await;

    assert_eq!(report.status, CrawlStatus::Failed);
    assert!(matches!(
        events.last(),
        Some(ProgressEvent::Failed {
            error: Error::Fetch { status: Some(200), .. },
            ..
        })
    ));
}

#[tokio::test]
async fn cancelled_crawl_reports_cancelled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WALL_PATH))
        .respond_with(page(json!([]), json!(0)))
        .expect(0)
        .mount(&server)
        .await;

    let dirs = Dirs::new();
    let handle = start_crawl(dirs.request(), settings(&server));
    handle.cancel();

    let (events, report) = drain(handle).await;

    assert_eq!(report.status, CrawlStatus::Cancelled);
    assert_eq!(terminal_events(&events), 1);
    assert!(matches!(events.last(), Some(ProgressEvent::Cancelled { .. })));
}

#[tokio::test]
async fn cancel_between_pages_stops_before_next_fetch() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "",
        page(json!([{"type": "pic", "pid": "p1"}]), json!("2")),
    )
    .await;
    Mock::given(method("GET"))
        .and(path(WALL_PATH))
        .and(query_param("sinceid", "2"))
        .respond_with(page(json!([]), json!(0)))
        .expect(0)
        .mount(&server)
        .await;
    mount_media(&server).await;

    let dirs = Dirs::new();
    let mut settings = settings(&server);
    settings.page_delay = Duration::from_secs(30);

    let mut handle = start_crawl(dirs.request(), settings);
    let mut events = Vec::new();
    while let Some(event) = handle.next_event().await {
        if matches!(event, ProgressEvent::PageSummary { .. }) {
            handle.cancel();
        }
        events.push(event);
    }
    let report = handle.wait().await;

    assert_eq!(report.status, CrawlStatus::Cancelled);
    assert_eq!(terminal_events(&events), 1);
    match events.last() {
        Some(ProgressEvent::Cancelled { stats }) => {
            assert_eq!(stats.pages_processed, 1);
            assert_eq!(stats.images_downloaded, 1);
        }
        other => panic!("unexpected last event: {:?}", other),
    }
    assert_eq!(file_names(dirs.images.path()), vec!["p1.jpg"]);
    assert_eq!(requested_cursors(&server).await, vec!["".to_string()]);
}

#[tokio::test]
async fn cancel_during_retry_backoff_ends_promptly() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WALL_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let dirs = Dirs::new();
    let mut settings = settings(&server);
    settings.retry = RetryPolicy {
        max_retries: 3,
        base_delay: Duration::from_secs(30),
        max_delay: Duration::from_secs(60),
    };

    let handle = start_crawl(dirs.request(), settings);
    while requested_cursors(&server).await.is_empty() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    handle.cancel();

    let (events, report) = tokio::time::timeout(Duration::from_secs(5), drain(handle))
        .await
        .expect("crawl kept sleeping after cancel");

    assert_eq!(report.status, CrawlStatus::Cancelled);
    assert_eq!(report.stats.pages_processed, 0);
    assert!(matches!(events.last(), Some(ProgressEvent::Cancelled { .. })));
}

#[tokio::test]
async fn missing_destination_directory_fails_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dirs = Dirs::new();
    let missing = dirs.videos.path().join("not-created");
    let request = CrawlRequest::new(UID, COOKIE, dirs.images.path(), &missing);

    let (events, report) = crawl(request, settings(&server)).await;

    assert_eq!(report.status, CrawlStatus::Failed);
    assert!(matches!(
        events.last(),
        Some(ProgressEvent::Failed {
            error: Error::ConfigValidation { .. },
            ..
        })
    ));
    assert!(!missing.exists());
}

#[tokio::test]
async fn run_crawl_reports_through_caller_channel() {
    let server = MockServer::start().await;
    mount_page(&server, "", page(json!([]), json!(0))).await;

    let dirs = Dirs::new();
    let (sender, mut rx) = progress::channel();
    let report = run_crawl(
        dirs.request(),
        settings(&server),
        sender,
        CancellationToken::new(),
    )
    .await;

    assert_eq!(report.status, CrawlStatus::Completed);

    let mut texts = Vec::new();
    while let Ok(event) = rx.try_recv() {
        texts.push(event.to_string());
    }
    assert_eq!(
        texts,
        vec![
            format!("crawl started for {}", UID),
            "reached last page, no more data".to_string(),
            "download complete: 0 images, 0 live photos".to_string(),
        ]
    );
}
