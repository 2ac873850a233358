use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use estate_portal::domain::{EntityId, EstateDraft, EstateFilter};
use estate_portal::http::ReqwestTransport;
use estate_portal::pagination::InfiniteList;
use estate_portal::toast::RecordingNotifier;
use estate_portal::{PortalClient, QueryCache, Toast};
use serde_json::{json, Value};

#[derive(Clone, Default)]
struct Fixture {
    list_queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

impl Fixture {
    fn list_queries(&self) -> Vec<HashMap<String, String>> {
        self.list_queries.lock().expect("fixture mutex poisoned").clone()
    }
}

async fn list_estates(
    State(fixture): State<Fixture>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let page: u64 = query.get("page").and_then(|raw| raw.parse().ok()).unwrap_or(1);
    fixture
        .list_queries
        .lock()
        .expect("fixture mutex poisoned")
        .push(query);

    Json(json!({
        "data": [
            { "id": page * 10, "title": format!("Loft {page}a") },
            { "id": page * 10 + 1, "title": format!("Loft {page}b") }
        ],
        "page": page,
        "totalPages": 2,
        "total": 4
    }))
}

async fn get_estate(Path(id): Path<String>) -> (StatusCode, Json<Value>) {
    match id.as_str() {
        "500" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "listing index unavailable" })),
        ),
        "404" => (
            StatusCode::NOT_FOUND,
            Json(json!({ "details": "no estate with id 404" })),
        ),
        _ => (
            StatusCode::OK,
            Json(json!({ "id": id, "title": "Courtyard house", "rooms": 4 })),
        ),
    }
}

async fn create_estate(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let authorized = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        == Some("Bearer agent-token");
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Sign in first" })),
        );
    }

    (
        StatusCode::CREATED,
        Json(json!({
            "message": "Estate created",
            "data": { "id": 77, "title": body["title"] }
        })),
    )
}

async fn spawn_backend(fixture: Fixture) -> String {
    let routes = Router::new()
        .route("/estates", get(list_estates).post(create_estate))
        .route("/estates/:id", get(get_estate))
        .with_state(fixture);
    let app = Router::new().nest("/api", routes);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fixture backend");
    let addr = listener.local_addr().expect("fixture address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fixture backend runs");
    });
    format!("http://{addr}/api")
}

fn client_for(base_url: &str) -> (PortalClient<ReqwestTransport, RecordingNotifier>, RecordingNotifier) {
    let transport =
        ReqwestTransport::new(base_url, Duration::from_secs(5)).expect("transport builds");
    let notifier = RecordingNotifier::default();
    let cache = Arc::new(QueryCache::new(Duration::from_secs(30)));
    (PortalClient::new(transport, cache, notifier.clone()), notifier)
}

fn draft(title: &str) -> EstateDraft {
    EstateDraft {
        title: title.to_string(),
        description: Some("Renovated, two terraces".to_string()),
        price: Some(240000.0),
        area: Some(180.0),
        rooms: Some(4),
        address: None,
        category_id: None,
        region_id: None,
        owner_id: None,
        images: Vec::new(),
    }
}

#[tokio::test]
async fn infinite_list_walks_every_page_over_http() {
    let fixture = Fixture::default();
    let base_url = spawn_backend(fixture.clone()).await;
    let (client, notifier) = client_for(&base_url);

    let filter = EstateFilter {
        search: Some("loft".to_string()),
        ..EstateFilter::default()
    };
    let source = client.estates().pages(&filter, 2);
    let mut list = InfiniteList::new();

    assert_eq!(list.load_until(&source, 10).await, 2);
    assert!(!list.has_next_page());
    assert!(!list.load_more(&source).await);

    let titles: Vec<&str> = list.items().map(|estate| estate.title.as_str()).collect();
    assert_eq!(titles, vec!["Loft 1a", "Loft 1b", "Loft 2a", "Loft 2b"]);

    let queries = fixture.list_queries();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[1].get("page").map(String::as_str), Some("2"));
    assert_eq!(queries[1].get("limit").map(String::as_str), Some("2"));
    assert_eq!(queries[1].get("search").map(String::as_str), Some("loft"));
    assert!(notifier.toasts().is_empty());
}

#[tokio::test]
async fn failing_statuses_become_single_toasts() {
    let base_url = spawn_backend(Fixture::default()).await;
    let (client, notifier) = client_for(&base_url);

    assert!(client.estates().get(&EntityId::from(500u64)).await.is_none());
    assert!(client.estates().get(&EntityId::from(404u64)).await.is_none());
    let estate = client
        .estates()
        .get(&EntityId::from(12u64))
        .await
        .expect("healthy estate loads");

    assert_eq!(estate.rooms, Some(4));
    assert_eq!(
        notifier.toasts(),
        vec![
            Toast::error("listing index unavailable"),
            Toast::error("no estate with id 404"),
        ]
    );
}

#[tokio::test]
async fn bearer_token_authorizes_mutations() {
    let base_url = spawn_backend(Fixture::default()).await;
    let (client, notifier) = client_for(&base_url);

    assert!(client.estates().create(&draft("Courtyard house")).await.is_none());
    assert_eq!(notifier.toasts(), vec![Toast::error("Sign in first")]);

    notifier.clear();
    client.set_token("agent-token");
    let ack = client
        .estates()
        .create(&draft("Courtyard house"))
        .await
        .expect("authorized create succeeds");

    let created = ack.data.expect("created estate returned");
    assert_eq!(created.id, EntityId::from(77u64));
    assert_eq!(created.title, "Courtyard house");
    assert_eq!(notifier.toasts(), vec![Toast::success("Estate created")]);
}

#[tokio::test]
async fn unreachable_backend_is_reported_once() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("reserve a port");
    let addr = listener.local_addr().expect("address");
    drop(listener);

    let (client, notifier) = client_for(&format!("http://{addr}/api"));
    assert!(client.landing().get().await.is_none());

    let errors = notifier.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.starts_with("could not reach the server"));
}
