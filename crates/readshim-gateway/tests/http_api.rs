use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use bytes::Bytes;
use readshim_cache::{CachedController, MokaResourceCache};
use readshim_core::{
    Author, Book, BulkBook, CacheKey, Error, ForeignId, InMemoryUpstream, ResourceCache, Series,
    Upstream, Work,
};
use readshim_gateway::{App, AppState};
use tower::ServiceExt;

struct Fixture {
    router: Router,
    upstream: InMemoryUpstream,
    cache: MokaResourceCache,
}

impl Fixture {
    fn new() -> Self {
        let upstream = InMemoryUpstream::new();
        let cache = MokaResourceCache::new();
        let controller = CachedController::new(upstream.clone(), cache.clone());
        let router = App::router(AppState::new(Arc::new(controller)));
        Self {
            router,
            upstream,
            cache,
        }
    }

    async fn send(&self, method: Method, uri: &str, body: Body) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(body)
            .expect("request should build");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router should respond")
    }

    async fn get(&self, uri: &str) -> Response {
        self.send(Method::GET, uri, Body::empty()).await
    }

    async fn delete(&self, uri: &str) -> Response {
        self.send(Method::DELETE, uri, Body::empty()).await
    }

    async fn post(&self, uri: &str, body: &'static str) -> Response {
        self.send(Method::POST, uri, Body::from(body)).await
    }
}

fn id(n: i64) -> ForeignId {
    ForeignId::new(n).unwrap()
}

fn author(n: i64) -> Author {
    Author {
        foreign_id: n,
        name: format!("Author {n}"),
        ..Default::default()
    }
}

fn work(n: i64, ratings: i64, authors: Vec<Author>) -> Work {
    Work {
        foreign_id: n,
        title: format!("Work {n}"),
        books: vec![Book {
            foreign_id: n * 100,
            rating_count: ratings,
            ..Default::default()
        }],
        authors,
        ..Default::default()
    }
}

fn header<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
        .await
        .expect("body should read")
        .to_vec()
}

async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).expect("body should be utf-8")
}

#[tokio::test]
async fn get_work_returns_payload_with_work_cache_headers() {
    let fixture = Fixture::new();
    fixture
        .upstream
        .insert_work(id(9), &work(9, 3, vec![author(1)]));

    let response = fixture.get("/work/9").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header(&response, "cache-control"),
        Some("public, s-maxage=2592000, max-age=3600")
    );
    assert_eq!(header(&response, "vary"), Some("Content-Type, Accept-Encoding"));
    assert_eq!(header(&response, "no-vary-search"), Some("params"));
    assert_eq!(header(&response, "content-type"), Some("application/json"));

    let decoded: Work = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(decoded.foreign_id, 9);
}

#[tokio::test]
async fn get_work_not_found_is_plain_text_404() {
    let fixture = Fixture::new();

    let response = fixture.get("/work/12345").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(header(&response, "cache-control").is_none());
    assert!(body_text(response).await.contains("work:12345"));
}

#[tokio::test]
async fn malformed_ids_are_bad_requests() {
    let fixture = Fixture::new();

    for uri in ["/work/abc", "/work/0", "/book/-5", "/author/nope"] {
        let response = fixture.get(uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
    assert_eq!(fixture.upstream.fetches(), 0);
}

#[tokio::test]
async fn delete_work_always_succeeds_and_purges() {
    let fixture = Fixture::new();

    let response = fixture.delete("/work/9").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_bytes(response).await.is_empty());

    fixture
        .upstream
        .insert_work(id(9), &work(9, 0, vec![author(1)]));
    fixture.get("/work/9").await;
    assert!(fixture
        .cache
        .get(&CacheKey::Work(id(9)))
        .await
        .unwrap()
        .is_some());

    let response = fixture.delete("/work/9").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(fixture
        .cache
        .get(&CacheKey::Work(id(9)))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn delete_book_and_author_purge_their_keys() {
    let fixture = Fixture::new();
    for key in [CacheKey::Book(id(500)), CacheKey::Author(id(7))] {
        fixture
            .cache
            .set(&key, Bytes::from_static(b"{}"))
            .await
            .unwrap();
    }

    assert_eq!(fixture.delete("/book/500").await.status(), StatusCode::OK);
    assert_eq!(fixture.delete("/author/7").await.status(), StatusCode::OK);

    for key in [CacheKey::Book(id(500)), CacheKey::Author(id(7))] {
        assert!(fixture.cache.get(&key).await.unwrap().is_none());
    }
}

#[tokio::test]
async fn get_book_redirects_to_author_with_edition() {
    let fixture = Fixture::new();
    fixture
        .upstream
        .insert_book(id(500), &work(10, 0, vec![author(7), author(8)]));

    let response = fixture.get("/book/500").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(header(&response, "location"), Some("/author/7?edition=500"));
    assert_eq!(header(&response, "no-vary-search"), Some("params"));
    assert_eq!(
        header(&response, "cache-control"),
        Some("public, s-maxage=2592000, max-age=3600")
    );
}

#[tokio::test]
async fn get_book_without_authors_redirects_to_work() {
    let fixture = Fixture::new();
    fixture.upstream.insert_book(id(501), &work(11, 0, vec![]));

    let response = fixture.get("/book/501").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(header(&response, "location"), Some("/work/11"));
}

#[tokio::test]
async fn get_author_returns_payload_varying_on_params() {
    let fixture = Fixture::new();
    fixture.upstream.insert_author(id(7), &author(7));

    let response = fixture.get("/author/7").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header(&response, "cache-control"),
        Some("public, s-maxage=604800, max-age=3600")
    );
    assert!(header(&response, "no-vary-search").is_none());

    let decoded: Author = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(decoded, author(7));
}

#[tokio::test]
async fn get_author_with_edition_is_narrowed() {
    let fixture = Fixture::new();
    let mut stored = author(7);
    stored.works = vec![work(1, 0, vec![]), work(2, 0, vec![]), work(3, 0, vec![])];
    fixture.upstream.insert_author(id(7), &stored);
    let target = work(10, 42, vec![author(7)]);
    fixture.upstream.insert_book(id(500), &target);

    let response = fixture.get("/author/7?edition=500").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "vary"), Some("Content-Type, Accept-Encoding"));
    assert!(header(&response, "no-vary-search").is_none());

    let decoded: Author = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(decoded.works, vec![target]);

    // The cached author is untouched by narrowing.
    let response = fixture.get("/author/7").await;
    let decoded: Author = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(decoded.works.len(), 3);
}

#[tokio::test]
async fn follows_book_redirect_to_narrowed_author() {
    let fixture = Fixture::new();
    fixture.upstream.insert_author(id(7), &author(7));
    fixture
        .upstream
        .insert_book(id(500), &work(10, 0, vec![author(7)]));

    let redirect = fixture.get("/book/500").await;
    let location = header(&redirect, "location").unwrap().to_string();

    let response = fixture.get(&location).await;
    assert_eq!(response.status(), StatusCode::OK);
    let decoded: Author = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(decoded.works.len(), 1);
    assert_eq!(decoded.works[0].foreign_id, 10);
}

#[tokio::test]
async fn get_author_with_bad_edition_is_bad_request() {
    let fixture = Fixture::new();
    fixture.upstream.insert_author(id(7), &author(7));

    let response = fixture.get("/author/7?edition=zero").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_author_with_empty_edition_is_unnarrowed() {
    let fixture = Fixture::new();
    fixture.upstream.insert_author(id(7), &author(7));

    let response = fixture.get("/author/7?edition=").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn author_changed_is_a_fixed_empty_feed() {
    let fixture = Fixture::new();

    for uri in [
        "/author/changed?since=2020-01-01",
        "/author/changed?since=1999-12-31T00:00:00Z",
        "/author/changed",
    ] {
        let response = fixture.get(uri).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            header(&response, "cache-control"),
            Some("public, s-maxage=86400, max-age=3600")
        );
        assert_eq!(header(&response, "no-vary-search"), Some("params"));

        let value: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(value, serde_json::json!({"Limitted": true, "Ids": []}));
    }
    assert_eq!(fixture.upstream.fetches(), 0);
}

#[tokio::test]
async fn bulk_post_redirects_to_cacheable_get() {
    let fixture = Fixture::new();

    let response = fixture.post("/book/bulk", "[3, 1, 2]").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(header(&response, "location"), Some("/book/bulk?id=3&id=1&id=2"));
    assert_eq!(fixture.upstream.fetches(), 0);
}

#[tokio::test]
async fn bulk_post_with_empty_list_is_missing_ids() {
    let fixture = Fixture::new();

    let response = fixture.post("/book/bulk", "[]").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, Error::MissingIds.to_string());
    assert_eq!(fixture.upstream.fetches(), 0);
}

#[tokio::test]
async fn bulk_post_with_malformed_body_is_bad_request() {
    let fixture = Fixture::new();

    let response = fixture.post("/book/bulk", "not json").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.starts_with("bad request"));
}

#[tokio::test]
async fn bulk_get_drops_missing_books_and_sorts_by_rating() {
    let fixture = Fixture::new();
    fixture
        .upstream
        .insert_book(id(1), &work(1, 10, vec![author(7)]));
    fixture
        .upstream
        .insert_book(id(3), &work(3, 30, vec![author(8)]));

    let response = fixture.get("/book/bulk?id=1&id=2&id=3").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header(&response, "cache-control"),
        Some("public, s-maxage=86400, max-age=3600")
    );
    assert!(header(&response, "no-vary-search").is_none());

    let result: BulkBook = serde_json::from_slice(&body_bytes(response).await).unwrap();
    let ids: Vec<i64> = result.works.iter().map(|w| w.foreign_id).collect();
    assert_eq!(ids, vec![3, 1]);
}

#[tokio::test]
async fn bulk_get_tolerates_upstream_failures() {
    let fixture = Fixture::new();
    fixture
        .upstream
        .insert_book(id(1), &work(1, 10, vec![author(7)]));
    fixture.upstream.fail(
        CacheKey::Book(id(2)),
        Error::Upstream {
            status: 503,
            message: "unavailable".into(),
        },
    );

    let response = fixture.get("/book/bulk?id=1&id=2").await;
    assert_eq!(response.status(), StatusCode::OK);
    let result: BulkBook = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(result.works.len(), 1);
}

/// Delays book lookups per ID so that bulk merges complete in a fixed order.
#[derive(Clone)]
struct DelayedUpstream {
    inner: InMemoryUpstream,
    delays: Arc<HashMap<i64, Duration>>,
}

#[async_trait]
impl Upstream for DelayedUpstream {
    async fn book(&self, id: ForeignId) -> readshim_core::Result<Bytes> {
        if let Some(delay) = self.delays.get(&id.get()) {
            tokio::time::sleep(*delay).await;
        }
        self.inner.book(id).await
    }

    async fn work(&self, id: ForeignId) -> readshim_core::Result<Bytes> {
        self.inner.work(id).await
    }

    async fn author(&self, id: ForeignId) -> readshim_core::Result<Bytes> {
        self.inner.author(id).await
    }
}

/// Router over books 1 (`[42, 99]`) and 2 (`[42]`), with book 2 answered
/// `book_two_delay_ms` after book 1.
fn co_author_router(book_one_delay_ms: u64, book_two_delay_ms: u64) -> Router {
    let inner = InMemoryUpstream::new();
    let mut primary = author(42);
    primary.series = vec![Series {
        foreign_id: 5,
        ..Default::default()
    }];
    inner.insert_book(id(1), &work(1, 10, vec![primary.clone(), author(99)]));
    inner.insert_book(id(2), &work(2, 20, vec![primary]));

    let delays = HashMap::from([
        (1, Duration::from_millis(book_one_delay_ms)),
        (2, Duration::from_millis(book_two_delay_ms)),
    ]);
    let upstream = DelayedUpstream {
        inner,
        delays: Arc::new(delays),
    };
    let controller = CachedController::new(upstream, MokaResourceCache::new());
    App::router(AppState::new(Arc::new(controller)))
}

async fn bulk_via(router: Router, uri: &str) -> BulkBook {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    let response = router.oneshot(request).await.expect("router should respond");
    assert_eq!(response.status(), StatusCode::OK);
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn author_ids(result: &BulkBook) -> Vec<i64> {
    result.authors.iter().map(|a| a.foreign_id).collect()
}

#[tokio::test]
async fn bulk_get_adds_co_authors_of_a_new_primary_author() {
    let result = bulk_via(co_author_router(0, 200), "/book/bulk?id=1&id=2").await;

    assert_eq!(author_ids(&result), vec![42, 99]);
    let series: Vec<i64> = result.series.iter().map(|s| s.foreign_id).collect();
    assert_eq!(series, vec![5]);
    let works: Vec<i64> = result.works.iter().map(|w| w.foreign_id).collect();
    assert_eq!(works, vec![2, 1]);
}

#[tokio::test]
async fn bulk_get_skips_co_authors_when_primary_author_is_known() {
    let result = bulk_via(co_author_router(200, 0), "/book/bulk?id=1&id=2").await;

    assert_eq!(author_ids(&result), vec![42]);
    let series: Vec<i64> = result.series.iter().map(|s| s.foreign_id).collect();
    assert_eq!(series, vec![5]);
}

#[tokio::test]
async fn bulk_get_without_ids_is_missing_ids() {
    let fixture = Fixture::new();

    let response = fixture.get("/book/bulk").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "missing ids");
}

#[tokio::test]
async fn bulk_get_with_invalid_id_is_bad_request() {
    let fixture = Fixture::new();

    let response = fixture.get("/book/bulk?id=1&id=abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(fixture.upstream.fetches(), 0);
}

#[tokio::test]
async fn unknown_paths_are_not_found() {
    let fixture = Fixture::new();

    for uri in ["/", "/series/1", "/work/1/editions", "/book/show/1"] {
        let response = fixture.get(uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn unsupported_methods_on_known_paths_are_rejected() {
    let fixture = Fixture::new();

    let cases = [
        (Method::POST, "/work/9"),
        (Method::PUT, "/book/500"),
        (Method::DELETE, "/book/bulk"),
        (Method::POST, "/author/changed"),
    ];
    for (method, uri) in cases {
        let response = fixture.send(method, uri, Body::empty()).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{uri}");
    }
}

#[tokio::test]
async fn repeated_edition_uses_the_first_value() {
    let fixture = Fixture::new();
    fixture.upstream.insert_author(id(7), &author(7));
    let target = work(10, 0, vec![author(7)]);
    fixture.upstream.insert_book(id(500), &target);

    let response = fixture.get("/author/7?edition=500&edition=501").await;
    assert_eq!(response.status(), StatusCode::OK);
    let decoded: Author = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(decoded.works, vec![target]);
}

#[tokio::test]
async fn bulk_post_with_null_body_is_missing_ids() {
    let fixture = Fixture::new();

    let response = fixture.post("/book/bulk", "null").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "missing ids");
}
