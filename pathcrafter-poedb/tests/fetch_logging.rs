//! Every failed lookup or fetch is reported by exactly one warn event.

mod common;

use common::{fixture, mock_settings};
use pathcrafter_poedb::{IdentifierResolver, PageSource, PoedbFetcher, PoedbSettings};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Records the target of every WARN event from our crates.
#[derive(Clone, Default)]
struct WarnRecorder(Arc<Mutex<Vec<String>>>);

impl<S: Subscriber> Layer<S> for WarnRecorder {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if *meta.level() == Level::WARN && meta.target().starts_with("pathcrafter") {
            self.0.lock().unwrap().push(meta.target().to_string());
        }
    }
}

impl WarnRecorder {
    fn install(&self) -> DefaultGuard {
        tracing::subscriber::set_default(tracing_subscriber::registry().with(self.clone()))
    }

    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

#[tokio::test]
async fn http_status_failure_warns_once() {
    let warns = WarnRecorder::default();
    let _guard = warns.install();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/kr/Nope"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let fetcher = PoedbFetcher::new(&mock_settings(&server.uri())).unwrap();
    assert!(fetcher.fetch_item("Nope").await.is_none());

    assert_eq!(warns.take(), ["pathcrafter_poedb::fetcher"]);
}

#[tokio::test]
async fn structure_miss_warns_once() {
    let warns = WarnRecorder::default();
    let _guard = warns.install();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/kr/Odd"))
        .respond_with(ResponseTemplate::new(200).set_body_string(fixture("item_unrecognized.html")))
        .mount(&server)
        .await;

    let fetcher = PoedbFetcher::new(&mock_settings(&server.uri())).unwrap();
    assert!(fetcher.fetch_item("Odd").await.is_none());

    assert_eq!(warns.take(), ["pathcrafter_poedb::fetcher"]);
}

#[tokio::test]
async fn transport_failures_warn_once_per_call() {
    let warns = WarnRecorder::default();
    let _guard = warns.install();
    let fetcher = PoedbFetcher::new(&PoedbSettings {
        base_url: "http://127.0.0.1:1/kr/".to_string(),
        politeness_delay: Duration::ZERO,
        ..PoedbSettings::default()
    })
    .unwrap();

    assert!(fetcher.fetch_item("Mageblood").await.is_none());
    assert_eq!(warns.take().len(), 1);

    assert!(fetcher.fetch_current_league().await.is_none());
    assert_eq!(warns.take().len(), 1);
}

#[tokio::test]
async fn invalid_target_warns_once_without_a_request() {
    let warns = WarnRecorder::default();
    let _guard = warns.install();
    let server = MockServer::start().await;

    let fetcher = PoedbFetcher::new(&mock_settings(&server.uri())).unwrap();
    assert!(fetcher.fetch_item("http://[::1").await.is_none());

    assert_eq!(warns.take(), ["pathcrafter_poedb::fetcher"]);
    let received = server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty());
}

#[test]
fn resolver_miss_warns_once_and_guesses_do_not_warn() {
    let warns = WarnRecorder::default();
    let _guard = warns.install();
    let resolver = IdentifierResolver::bundled().unwrap();

    assert!(resolver.resolve("존재하지 않는 반지").is_none());
    assert_eq!(warns.take(), ["pathcrafter_poedb::resolver"]);

    assert!(resolver.resolve("some ring").is_some());
    assert!(resolver.resolve("   ").is_none());
    assert!(warns.take().is_empty());
}
