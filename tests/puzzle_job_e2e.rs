//! End-to-end job cycles against a mocked puzzle feed and image host.
//!
//! Covers the full path: feed → ledger → image → caption → dispatcher →
//! cleanup, with a file-backed ledger in a temp directory and a recording
//! dispatcher standing in for the messaging backend.

use async_trait::async_trait;
use chrono::{Local, TimeZone};
use puzzlebot::board_image::{ImageRetriever, RetrievedImage};
use puzzlebot::channels::Dispatcher;
use puzzlebot::config::{FeedConfig, ImageConfig};
use puzzlebot::puzzle::archive::PUZZLE_ARCHIVE;
use puzzlebot::puzzle::{FallbackReason, FileLedger, PuzzleLedger, PuzzleOrigin, PuzzleSource};
use puzzlebot::scheduler::ManualClock;
use puzzlebot::{DeliveryStatus, PuzzleJob};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Clone)]
struct Sent {
    image: PathBuf,
    image_existed: bool,
    caption: String,
    recipient: String,
}

#[derive(Default)]
struct RecordingDispatcher {
    sent: Mutex<Vec<Sent>>,
}

impl RecordingDispatcher {
    fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Dispatcher for RecordingDispatcher {
    fn id(&self) -> &'static str {
        "recording"
    }

    async fn send_image(&self, image: &Path, caption: &str, recipient: &str) -> anyhow::Result<()> {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Sent {
                image: image.to_path_buf(),
                image_existed: image.exists(),
                caption: caption.to_owned(),
                recipient: recipient.to_owned(),
            });
        Ok(())
    }

    async fn health_check(&self) -> anyhow::Result<bool> {
        Ok(true)
    }
}

struct Harness {
    _dir: tempfile::TempDir,
    ledger_path: PathBuf,
    download_dir: PathBuf,
    dispatcher: Arc<RecordingDispatcher>,
    job: PuzzleJob,
}

fn harness(server: &MockServer) -> Harness {
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
    let ledger_path = dir.path().join("used_puzzles.txt");
    let download_dir = dir.path().join("downloads");
    std::fs::create_dir_all(&download_dir).unwrap_or_else(|e| panic!("mkdir: {e}"));

    let feed = FeedConfig {
        url: format!("{}/pub/puzzle", server.uri()),
        archive_image_base: format!("{}/archive/board.gif", server.uri()),
        timeout_secs: 5,
        ..FeedConfig::default()
    };
    let images = ImageConfig {
        temp_dir: download_dir.clone(),
        fallback_path: dir.path().join("fallback_image.jpg"),
    };
    let clock = Arc::new(ManualClock::new(
        Local
            .with_ymd_and_hms(2024, 1, 5, 15, 0, 0)
            .single()
            .unwrap_or_else(|| panic!("unambiguous local time")),
    ));
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let job = PuzzleJob::new(
        PuzzleSource::new(&feed, Arc::new(FileLedger::new(&ledger_path))),
        ImageRetriever::new(&images, 5),
        dispatcher.clone(),
        "+15550001111",
        clock,
    );

    Harness {
        _dir: dir,
        ledger_path,
        download_dir,
        dispatcher,
        job,
    }
}

async fn mount_feed(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/pub/puzzle"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn feed_p1() -> serde_json::Value {
    json!({
        "puzzle_id": "p1",
        "title": "Test",
        "fen": "... b ...",
        "url": "http://x"
    })
}

#[tokio::test]
async fn first_run_accepts_remote_puzzle_and_records_it() {
    let server = MockServer::start().await;
    mount_feed(&server, feed_p1()).await;
    let h = harness(&server);

    let report = h.job.run_once().await;

    assert_eq!(
        report.origin,
        PuzzleOrigin::Remote {
            id: Some("p1".to_owned())
        }
    );
    let ledger = FileLedger::new(&h.ledger_path);
    assert!(ledger.contains("p1").unwrap_or(false));

    let sent = h.dispatcher.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].caption, report.caption);
    assert_eq!(sent[0].recipient, "+15550001111");
    assert!(sent[0].caption.contains("Title: Test"));
    assert!(sent[0].caption.contains("Turn: Black"));
    assert!(sent[0].caption.contains("URL: http://x"));
    assert!(!sent[0].caption.contains("Solution:"));

    // The feed carried no image, so the static fallback was sent.
    assert!(report.image.is_fallback());
    assert_eq!(sent[0].image, report.image.path());
    assert_eq!(report.delivery, DeliveryStatus::Sent);
}

#[tokio::test]
async fn second_run_with_same_feed_uses_archive() {
    let server = MockServer::start().await;
    mount_feed(&server, feed_p1()).await;
    let h = harness(&server);

    h.job.run_once().await;
    let report = h.job.run_once().await;

    assert_eq!(
        report.origin,
        PuzzleOrigin::Archive {
            reason: FallbackReason::AlreadyUsed("p1".to_owned())
        }
    );
    let title = report
        .caption
        .lines()
        .find_map(|l| l.strip_prefix("Title: "))
        .unwrap_or_default();
    assert!(PUZZLE_ARCHIVE.iter().any(|e| e.title == title));
    assert!(!report.caption.contains("URL: http://x"));

    let ledger = std::fs::read_to_string(&h.ledger_path).unwrap_or_default();
    assert_eq!(ledger, "p1\n");
    assert_eq!(h.dispatcher.sent().len(), 2);
}

#[tokio::test]
async fn pre_seeded_ledger_blocks_remote_puzzle() {
    let server = MockServer::start().await;
    mount_feed(&server, json!({"puzzle": {"puzzle_id": "p7", "title": "Seven"}})).await;
    let h = harness(&server);
    std::fs::write(&h.ledger_path, "p7\np7\n").unwrap_or_else(|e| panic!("seed ledger: {e}"));

    let report = h.job.run_once().await;

    assert!(matches!(report.origin, PuzzleOrigin::Archive { .. }));
    assert!(!report.caption.contains("Title: Seven"));
}

#[tokio::test]
async fn downloaded_image_is_sent_then_deleted() {
    let server = MockServer::start().await;
    mount_feed(
        &server,
        json!({
            "puzzle_id": "p2",
            "title": "With Image",
            "fen": "8/8/8/8/8/8/8/K6k w - - 0 1",
            "solution": ["e4", "e5"],
            "image": format!("{}/board.gif", server.uri())
        }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/board.gif"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"GIF89a".to_vec()))
        .mount(&server)
        .await;
    let h = harness(&server);

    let report = h.job.run_once().await;

    let RetrievedImage::Downloaded(image) = &report.image else {
        panic!("expected downloaded image, got {:?}", report.image);
    };
    let sent = h.dispatcher.sent();
    assert_eq!(&sent[0].image, image);
    assert!(sent[0].image_existed);
    assert!(sent[0].caption.contains("Turn: White"));
    assert!(sent[0].caption.contains("Solution: e4 e5\n"));

    assert!(report.cleaned_up);
    assert!(!image.exists());
    assert_eq!(
        std::fs::read_dir(&h.download_dir).map(|d| d.count()).unwrap_or(usize::MAX),
        0
    );
}

#[tokio::test]
async fn feed_outage_still_delivers_from_archive() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pub/puzzle"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let h = harness(&server);

    let report = h.job.run_once().await;

    assert_eq!(
        report.origin,
        PuzzleOrigin::Archive {
            reason: FallbackReason::HttpStatus(500)
        }
    );
    assert!(!h.ledger_path.exists());
    assert_eq!(h.dispatcher.sent().len(), 1);
    // No archive renderer route is mounted, so the fallback image goes out.
    assert!(report.image.is_fallback());
}

#[tokio::test]
async fn archive_board_is_downloaded_from_configured_renderer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pub/puzzle"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/archive/board.gif"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"GIF89a".to_vec()))
        .expect(1)
        .mount(&server)
        .await;
    let h = harness(&server);

    let report = h.job.run_once().await;

    assert!(matches!(report.origin, PuzzleOrigin::Archive { .. }));
    let RetrievedImage::Downloaded(image) = &report.image else {
        panic!("expected downloaded archive board, got {:?}", report.image);
    };
    assert!(h.dispatcher.sent()[0].image_existed);
    assert!(report.cleaned_up);
    assert!(!image.exists());
}
