//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! fetch, classify, extract and enqueue cycle end-to-end. Most of them swap
//! the tag parser for a stub so media bodies can be plain text.

use media_crawler::config::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use media_crawler::crawler::{crawl, Coordinator, HttpFetcher};
use media_crawler::media::{MetadataParser, ParsedTags};
use media_crawler::storage::{SqliteStorage, Storage};
use media_crawler::{CrawlState, CrawlerError, MetadataParseError, OutputRecord};
use std::cell::Cell;
use std::collections::HashMap;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Reads `artist|title|album` bodies; anything else is corrupt
///
/// Counts calls so tests can check how often extraction ran.
#[derive(Default)]
struct StubParser {
    calls: Cell<usize>,
}

impl MetadataParser for StubParser {
    fn parse_tags(&self, bytes: &[u8]) -> Result<ParsedTags, MetadataParseError> {
        self.calls.set(self.calls.get() + 1);

        let text = std::str::from_utf8(bytes)
            .map_err(|e| MetadataParseError::Corrupt(e.to_string()))?;
        let fields: Vec<&str> = text.split('|').collect();
        let [artist, title, album] = fields[..] else {
            return Err(MetadataParseError::Corrupt(format!("bad stub body {:?}", text)));
        };

        let mut tags = HashMap::new();
        tags.insert("artist".to_string(), vec![artist.to_string()]);
        tags.insert("title".to_string(), vec![title.to_string()]);
        tags.insert("album".to_string(), vec![album.to_string()]);

        Ok(ParsedTags {
            stream_length_seconds: Some(180.0),
            tags,
        })
    }
}

fn crawler_config(max_depth: Option<u32>) -> CrawlerConfig {
    CrawlerConfig {
        max_depth,
        ..CrawlerConfig::default()
    }
}

fn test_fetcher() -> HttpFetcher {
    HttpFetcher::new(&UserAgentConfig::default(), Duration::from_secs(5))
        .expect("Failed to build HTTP client")
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html")
}

fn audio(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "audio/mpeg")
}

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn mount_once(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

async fn requested_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .expect("Request recording is enabled")
        .iter()
        .map(|request| request.url.path().to_string())
        .collect()
}

#[tokio::test]
async fn test_index_with_six_tracks_at_depth_one() {
    let server = MockServer::start().await;

    mount(
        &server,
        "/index.htm",
        html(
            r#"<html><body>
            <a href="/music/1.mp3">one</a>
            <a href="/music/2.mp3">two</a>
            <a href="music/3.mp3">three</a>
            <a class="track" href='music/4.mp3'>four</a>
            <A HREF="/music/5.mp3">five</A>
            <a
               href="/music/6.mp3">six</a>
            <a href="/about.htm">about</a>
            <a href="/more.htm">more</a>
            </body></html>"#,
        ),
    )
    .await;

    for n in 1..=6 {
        mount_once(
            &server,
            &format!("/music/{}.mp3", n),
            audio(&format!("Artist {}|Track {}|Album", n, n)),
        )
        .await;
    }

    mount_once(&server, "/about.htm", html(r#"<a href="/deeper.htm">x</a>"#)).await;
    mount_once(&server, "/more.htm", html(r#"<a href="/music/1.mp3">1</a>"#)).await;
    Mock::given(method("GET"))
        .and(path("/deeper.htm"))
        .respond_with(html(""))
        .expect(0)
        .mount(&server)
        .await;

    let parser = StubParser::default();
    let mut coordinator = Coordinator::new(
        SqliteStorage::new_in_memory().unwrap(),
        test_fetcher(),
        &parser,
        Vec::<OutputRecord>::new(),
        &crawler_config(Some(1)),
    );

    coordinator
        .seed(&format!("{}/index.htm", server.uri()))
        .unwrap();
    let stats = coordinator.run().await.unwrap();

    assert_eq!(coordinator.state(), CrawlState::Drained);
    assert_eq!(stats.files_found, 6);
    assert_eq!(stats.items_processed, 9);
    assert_eq!(stats.links_enqueued, 8);
    assert_eq!(stats.links_depth_suppressed, 2);
    assert_eq!(parser.calls.get(), 6);

    let records = coordinator.sink();
    assert_eq!(records.len(), 6);
    for (n, record) in (1..=6).zip(records) {
        assert_eq!(record.artist.as_deref(), Some(format!("Artist {}", n).as_str()));
        assert_eq!(record.title.as_deref(), Some(format!("Track {}", n).as_str()));
        assert_eq!(record.album.as_deref(), Some("Album"));
        assert_eq!(record.duration, 180.0);
        assert_eq!(record.source_url, format!("{}/music/{}.mp3", server.uri(), n));
    }

    let storage = coordinator.storage();
    assert_eq!(storage.frontier_len().unwrap(), 0);
    assert_eq!(storage.history_len().unwrap(), 9);
}

#[tokio::test]
async fn test_breadth_first_order() {
    let server = MockServer::start().await;

    mount(&server, "/", html(r#"<a href="/a">a</a><a href="/b">b</a>"#)).await;
    mount(&server, "/a", html(r#"<a href="/c">c</a>"#)).await;
    mount(&server, "/b", html(r#"<a href="/d">d</a>"#)).await;
    mount(&server, "/c", html("leaf")).await;
    mount(&server, "/d", html("leaf")).await;

    let mut coordinator = Coordinator::new(
        SqliteStorage::new_in_memory().unwrap(),
        test_fetcher(),
        StubParser::default(),
        Vec::<OutputRecord>::new(),
        &crawler_config(None),
    );
    coordinator.seed(&format!("{}/", server.uri())).unwrap();
    coordinator.run().await.unwrap();

    assert_eq!(requested_paths(&server).await, vec!["/", "/a", "/b", "/c", "/d"]);

    let history = coordinator.storage().history().unwrap();
    let parents: Vec<i64> = history.iter().map(|h| h.parent_id).collect();
    assert_eq!(parents, vec![0, 1, 1, 2, 3]);
}

#[tokio::test]
async fn test_cycles_fetch_each_url_once() {
    let server = MockServer::start().await;

    mount_once(
        &server,
        "/",
        html(r#"<a href="/a">a</a><a href="/b">b</a><a href="/">home</a>"#),
    )
    .await;
    mount_once(&server, "/a", html(r#"<a href="/">home</a><a href="/b">b</a>"#)).await;
    mount_once(
        &server,
        "/b",
        html(r##"<a href="/a">a</a><a href="#top">self</a><a href="b">again</a>"##),
    )
    .await;

    let mut coordinator = Coordinator::new(
        SqliteStorage::new_in_memory().unwrap(),
        test_fetcher(),
        StubParser::default(),
        Vec::<OutputRecord>::new(),
        &crawler_config(None),
    );
    coordinator.seed(&format!("{}/", server.uri())).unwrap();
    let stats = coordinator.run().await.unwrap();

    assert_eq!(stats.items_processed, 3);
    assert_eq!(stats.links_enqueued, 2);
    assert_eq!(coordinator.storage().history_len().unwrap(), 3);
}

#[tokio::test]
async fn test_depth_zero_fetches_only_seed() {
    let server = MockServer::start().await;

    mount_once(
        &server,
        "/",
        html(r#"<a href="/a">a</a><a href="/song.mp3">song</a>"#),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html(""))
        .expect(0)
        .mount(&server)
        .await;

    let mut coordinator = Coordinator::new(
        SqliteStorage::new_in_memory().unwrap(),
        test_fetcher(),
        StubParser::default(),
        Vec::<OutputRecord>::new(),
        &crawler_config(Some(0)),
    );
    coordinator.seed(&format!("{}/", server.uri())).unwrap();
    let stats = coordinator.run().await.unwrap();

    assert_eq!(stats.items_processed, 1);
    assert_eq!(stats.links_discovered, 2);
    assert_eq!(stats.links_depth_suppressed, 2);
    assert_eq!(stats.links_enqueued, 0);
}

#[tokio::test]
async fn test_depth_limit_follows_links_up_to_limit() {
    let server = MockServer::start().await;

    mount_once(&server, "/", html(r#"<a href="/one">1</a>"#)).await;
    mount_once(&server, "/one", html(r#"<a href="/two">2</a>"#)).await;
    mount_once(&server, "/two", html(r#"<a href="/three">3</a>"#)).await;
    Mock::given(method("GET"))
        .and(path("/three"))
        .respond_with(html(""))
        .expect(0)
        .mount(&server)
        .await;

    let mut coordinator = Coordinator::new(
        SqliteStorage::new_in_memory().unwrap(),
        test_fetcher(),
        StubParser::default(),
        Vec::<OutputRecord>::new(),
        &crawler_config(Some(2)),
    );
    coordinator.seed(&format!("{}/", server.uri())).unwrap();
    let stats = coordinator.run().await.unwrap();

    assert_eq!(stats.items_processed, 3);
    assert_eq!(stats.links_depth_suppressed, 1);
}

#[tokio::test]
async fn test_failed_fetch_is_dropped_without_history() {
    let server = MockServer::start().await;

    mount(
        &server,
        "/",
        html(r#"<a href="/gone.mp3">gone</a><a href="/ok.mp3">ok</a>"#),
    )
    .await;
    mount(&server, "/gone.mp3", ResponseTemplate::new(404)).await;
    mount(&server, "/ok.mp3", audio("A|T|L")).await;

    let mut coordinator = Coordinator::new(
        SqliteStorage::new_in_memory().unwrap(),
        test_fetcher(),
        StubParser::default(),
        Vec::<OutputRecord>::new(),
        &crawler_config(None),
    );
    coordinator.seed(&format!("{}/", server.uri())).unwrap();
    let stats = coordinator.run().await.unwrap();

    assert_eq!(stats.items_processed, 3);
    assert_eq!(stats.fetch_failures, 1);
    assert_eq!(stats.files_found, 1);

    let storage = coordinator.storage();
    assert_eq!(storage.frontier_len().unwrap(), 0);
    let visited: Vec<String> = storage.history().unwrap().into_iter().map(|h| h.url).collect();
    assert_eq!(
        visited,
        vec![format!("{}/", server.uri()), format!("{}/ok.mp3", server.uri())]
    );
}

#[tokio::test]
async fn test_unreachable_seed_drains_cleanly() {
    let mut coordinator = Coordinator::new(
        SqliteStorage::new_in_memory().unwrap(),
        test_fetcher(),
        StubParser::default(),
        Vec::<OutputRecord>::new(),
        &crawler_config(None),
    );
    // Port 9 (discard) is closed on test hosts
    coordinator.seed("http://127.0.0.1:9/").unwrap();
    let stats = coordinator.run().await.unwrap();

    assert_eq!(stats.fetch_failures, 1);
    assert_eq!(coordinator.storage().history_len().unwrap(), 0);
    assert_eq!(coordinator.storage().frontier_len().unwrap(), 0);
}

#[tokio::test]
async fn test_malformed_media_does_not_stop_crawl() {
    let server = MockServer::start().await;

    mount(
        &server,
        "/",
        html(r#"<a href="/broken.mp3">b</a><a href="/good.mp3">g</a>"#),
    )
    .await;
    mount(&server, "/broken.mp3", audio("not a tagged file")).await;
    mount(&server, "/good.mp3", audio("Band|Song|Record")).await;

    let parser = StubParser::default();
    let mut coordinator = Coordinator::new(
        SqliteStorage::new_in_memory().unwrap(),
        test_fetcher(),
        &parser,
        Vec::<OutputRecord>::new(),
        &crawler_config(None),
    );
    coordinator.seed(&format!("{}/", server.uri())).unwrap();
    let stats = coordinator.run().await.unwrap();

    assert_eq!(parser.calls.get(), 2);
    assert_eq!(stats.metadata_failures, 1);
    assert_eq!(stats.files_found, 1);
    assert_eq!(coordinator.sink()[0].title.as_deref(), Some("Song"));
    // Both media items were fetched, so both are in history
    assert_eq!(coordinator.storage().history_len().unwrap(), 3);
}

#[tokio::test]
async fn test_media_is_not_scanned_for_links() {
    let server = MockServer::start().await;

    mount(&server, "/", html(r#"<a href="/tricky.mp3">t</a>"#)).await;
    mount(
        &server,
        "/tricky.mp3",
        audio(r#"<a href="/hidden">x</a>"#),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/hidden"))
        .respond_with(html(""))
        .expect(0)
        .mount(&server)
        .await;

    let mut coordinator = Coordinator::new(
        SqliteStorage::new_in_memory().unwrap(),
        test_fetcher(),
        StubParser::default(),
        Vec::<OutputRecord>::new(),
        &crawler_config(None),
    );
    coordinator.seed(&format!("{}/", server.uri())).unwrap();
    let stats = coordinator.run().await.unwrap();

    assert_eq!(stats.media_classified, 1);
    assert_eq!(stats.pages_parsed, 1);
}

#[tokio::test]
async fn test_unsupported_audio_type_is_treated_as_page() {
    let server = MockServer::start().await;

    mount(&server, "/", html(r#"<a href="/clip.flac">f</a>"#)).await;
    mount(
        &server,
        "/clip.flac",
        ResponseTemplate::new(200).set_body_raw("A|B|C", "audio/flac"),
    )
    .await;

    let parser = StubParser::default();
    let mut coordinator = Coordinator::new(
        SqliteStorage::new_in_memory().unwrap(),
        test_fetcher(),
        &parser,
        Vec::<OutputRecord>::new(),
        &crawler_config(None),
    );
    coordinator.seed(&format!("{}/", server.uri())).unwrap();
    let stats = coordinator.run().await.unwrap();

    assert_eq!(parser.calls.get(), 0);
    assert_eq!(stats.pages_parsed, 2);
    assert!(coordinator.sink().is_empty());
}

#[tokio::test]
async fn test_undecodable_page_falls_back_to_lossy_text() {
    let server = MockServer::start().await;

    let mut body = br#"<a href="/next">next</a>"#.to_vec();
    body.extend_from_slice(&[0xff, 0xfe, 0xfd]);
    mount(
        &server,
        "/",
        ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8"),
    )
    .await;
    mount_once(&server, "/next", html("end")).await;

    let mut coordinator = Coordinator::new(
        SqliteStorage::new_in_memory().unwrap(),
        test_fetcher(),
        StubParser::default(),
        Vec::<OutputRecord>::new(),
        &crawler_config(None),
    );
    coordinator.seed(&format!("{}/", server.uri())).unwrap();
    let stats = coordinator.run().await.unwrap();

    assert_eq!(stats.decode_fallbacks, 1);
    assert_eq!(stats.items_processed, 2);
}

#[tokio::test]
async fn test_requests_carry_user_agent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "MediaCrawler"))
        .respond_with(html("hello"))
        .expect(1)
        .mount(&server)
        .await;

    let mut coordinator = Coordinator::new(
        SqliteStorage::new_in_memory().unwrap(),
        test_fetcher(),
        StubParser::default(),
        Vec::<OutputRecord>::new(),
        &crawler_config(None),
    );
    coordinator.seed(&format!("{}/", server.uri())).unwrap();
    let stats = coordinator.run().await.unwrap();

    assert_eq!(stats.items_fetched, 1);
}

#[tokio::test]
async fn test_interrupt_keeps_item_in_frontier() {
    let server = MockServer::start().await;
    mount(&server, "/", html("hello")).await;

    let mut coordinator = Coordinator::new(
        SqliteStorage::new_in_memory().unwrap(),
        test_fetcher(),
        StubParser::default(),
        Vec::<OutputRecord>::new(),
        &crawler_config(None),
    );
    coordinator.seed(&format!("{}/", server.uri())).unwrap();

    let result = coordinator.run_until(std::future::ready(())).await;

    assert!(matches!(result, Err(CrawlerError::Interrupted)));
    assert_eq!(coordinator.state(), CrawlState::Aborted);
    assert_eq!(coordinator.storage().frontier_len().unwrap(), 1);
    assert_eq!(coordinator.storage().history_len().unwrap(), 0);
}

#[tokio::test]
async fn test_resume_from_persisted_frontier() {
    let server = MockServer::start().await;

    mount_once(&server, "/", html(r#"<a href="/a">a</a><a href="/b">b</a>"#)).await;
    mount_once(&server, "/a", html(r#"<a href="/">home</a>"#)).await;
    mount_once(&server, "/b", html("leaf")).await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("crawl.db");

    // First run handles only the seed, then stops
    {
        let mut coordinator = Coordinator::new(
            SqliteStorage::new(&db_path).unwrap(),
            test_fetcher(),
            StubParser::default(),
            Vec::<OutputRecord>::new(),
            &crawler_config(None),
        );
        coordinator.seed(&format!("{}/", server.uri())).unwrap();
        assert!(coordinator.step().await.unwrap());

        let pending = coordinator.storage().frontier_items().unwrap();
        let depths: Vec<u32> = pending.iter().map(|item| item.depth).collect();
        assert_eq!(depths, vec![1, 1]);
        coordinator.finish().unwrap();
    }

    // Second run starts with an empty session cache and no seed
    let mut coordinator = Coordinator::new(
        SqliteStorage::new(&db_path).unwrap(),
        test_fetcher(),
        StubParser::default(),
        Vec::<OutputRecord>::new(),
        &crawler_config(None),
    );
    let stats = coordinator.run().await.unwrap();

    assert_eq!(stats.items_processed, 2);
    assert_eq!(stats.duplicates_skipped, 1);

    let history = coordinator.storage().history().unwrap();
    let crawl_ids: Vec<i64> = history.iter().map(|h| h.crawl_id).collect();
    assert_eq!(crawl_ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_item_with_history_still_queued_is_fetched_again() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/x"))
        .respond_with(html("leaf"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("crawl.db");
    let url = format!("{}/x", server.uri());

    // A run that stopped after writing history for X but before removing it
    let id = {
        let mut storage = SqliteStorage::new(&db_path).unwrap();
        let id = storage.enqueue(0, 0, &url).unwrap();
        storage.record_visit(id, 0, &url).unwrap();
        storage.close().unwrap();
        id
    };

    let mut coordinator = Coordinator::new(
        SqliteStorage::new(&db_path).unwrap(),
        test_fetcher(),
        StubParser::default(),
        Vec::<OutputRecord>::new(),
        &crawler_config(None),
    );
    let stats = coordinator.run().await.unwrap();

    assert_eq!(stats.items_fetched, 1);
    assert_eq!(requested_paths(&server).await, vec!["/x"]);

    let storage = coordinator.storage();
    assert_eq!(storage.frontier_len().unwrap(), 0);
    let visits = storage.history_for(&url).unwrap();
    assert_eq!(visits.len(), 2);
    assert!(visits.iter().all(|visit| visit.crawl_id == id));
}

#[tokio::test]
async fn test_crawl_appends_csv_rows_with_lofty() {
    let server = MockServer::start().await;

    mount(&server, "/", html(r#"<a href="/tone.mp3">tone</a>"#)).await;
    Mock::given(method("GET"))
        .and(path("/tone.mp3"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(silent_wav(3), "audio/mpeg"),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let output_path = dir.path().join("found.csv");
    let config = Config {
        crawler: crawler_config(Some(1)),
        user_agent: UserAgentConfig::default(),
        output: OutputConfig {
            database_path: dir.path().join("crawl.db").to_string_lossy().into_owned(),
        },
    };

    let seed = format!("{}/", server.uri());
    let (stats, result) = crawl(&config, Some(&seed), &output_path).await;

    assert!(result.is_ok(), "crawl failed: {:?}", result);
    assert_eq!(stats.files_found, 1);

    let csv = std::fs::read_to_string(&output_path).unwrap();
    let rows: Vec<&str> = csv.lines().collect();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].starts_with(",,,3"), "unexpected row {:?}", rows[0]);
    assert!(rows[0].ends_with(&format!("{}/tone.mp3", server.uri())));

    // Crawling again with the same database finds nothing new
    let (stats, result) = crawl(&config, None, &output_path).await;
    assert!(result.is_ok());
    assert_eq!(stats.items_processed, 0);
    assert_eq!(std::fs::read_to_string(&output_path).unwrap().lines().count(), 1);
}

/// Builds a tagless 8 kHz mono 8-bit PCM WAV of the given length
fn silent_wav(seconds: u32) -> Vec<u8> {
    let sample_rate: u32 = 8000;
    let data_len = sample_rate * seconds;

    let mut wav = Vec::new();
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes());
    wav.extend_from_slice(&8u16.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.resize(wav.len() + data_len as usize, 0x80);
    wav
}
