//! Gateway behaviour against a mock backend.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lessondesk_core::api::endpoints::{ADMIN_STATS, ADMIN_USERS, EDUCATION_LESSONS};
use lessondesk_core::api::{GetOptions, QueryParams};
use lessondesk_core::models::{AdminStats, NewLesson, Student, SubscriptionFilters, TokenPair};
use lessondesk_core::{
    ApiError, ApiGateway, AuthContext, CacheStore, Config, CredentialStore, ErrorKind,
    MemoryStorage, PersistentStore, ResponseSource,
};

fn gateway(base_url: &str, storage: Arc<MemoryStorage>) -> ApiGateway {
    let config = Config {
        api_base_url: base_url.to_string(),
        request_timeout_secs: 5,
        ..Config::default()
    };
    let cache = Arc::new(CacheStore::new(storage.clone()));
    let credentials = Arc::new(CredentialStore::load(storage));
    ApiGateway::new(&config, cache, credentials).unwrap()
}

fn signed_in(access: &str, refresh: &str) -> Arc<MemoryStorage> {
    let storage = Arc::new(MemoryStorage::new());
    CredentialStore::load(storage.clone()).store_tokens(&TokenPair {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
    });
    storage
}

fn stats_body(users: u64) -> serde_json::Value {
    json!({"total_users": users, "total_lessons": 4, "total_packs": 9})
}

#[tokio::test]
async fn test_get_within_ttl_is_served_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ADMIN_USERS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "first_name": "Aziza", "last_name": "Karimova"}
        ])))
        .expect(2)
        .mount(&server)
        .await;

    let gateway = gateway(&server.uri(), signed_in("a1", "r1"));
    let options = GetOptions::default().with_ttl(Duration::from_millis(1000));

    let first = gateway
        .get::<Vec<Student>>(ADMIN_USERS, QueryParams::new(), options)
        .await
        .unwrap();
    assert_eq!(first.source, ResponseSource::Network);
    assert_eq!(first.data[0].full_name(), "Aziza Karimova");

    let second = gateway
        .get::<Vec<Student>>(ADMIN_USERS, QueryParams::new(), options)
        .await
        .unwrap();
    assert!(second.is_cached());
    assert_eq!(second.data, first.data);

    tokio::time::sleep(Duration::from_millis(1100)).await;

    let third = gateway
        .get::<Vec<Student>>(ADMIN_USERS, QueryParams::new(), options)
        .await
        .unwrap();
    assert_eq!(third.source, ResponseSource::Network);
}

#[tokio::test]
async fn test_force_refresh_hits_network_and_overwrites() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ADMIN_STATS))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_body(10)))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ADMIN_STATS))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_body(11)))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway(&server.uri(), signed_in("a1", "r1"));

    assert_eq!(gateway.fetch_stats(false).await.unwrap().data.total_users, 10);

    let forced = gateway.fetch_stats(true).await.unwrap();
    assert_eq!(forced.source, ResponseSource::Network);
    assert_eq!(forced.data.total_users, 11);

    let cached = gateway.fetch_stats(false).await.unwrap();
    assert!(cached.is_cached());
    assert_eq!(cached.data.total_users, 11);
}

#[tokio::test]
async fn test_creating_lesson_invalidates_lessons_and_stats() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EDUCATION_LESSONS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"modules": []})))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ADMIN_STATS))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_body(3)))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ADMIN_USERS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(EDUCATION_LESSONS))
        .and(body_json(json!({"module_id": 1, "title": "Greetings"})))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"id": 7, "title": "Greetings", "module_id": 1})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway(&server.uri(), signed_in("a1", "r1"));
    gateway.fetch_lessons(false).await.unwrap();
    gateway.fetch_stats(false).await.unwrap();
    gateway.fetch_users(false).await.unwrap();

    let lesson = gateway
        .create_lesson(&NewLesson {
            module_id: 1,
            title: "Greetings".to_string(),
            description: None,
        })
        .await
        .unwrap();
    assert_eq!(lesson.id, 7);

    assert_eq!(gateway.fetch_lessons(false).await.unwrap().source, ResponseSource::Network);
    assert_eq!(gateway.fetch_stats(false).await.unwrap().source, ResponseSource::Network);
    assert!(gateway.fetch_users(false).await.unwrap().is_cached());
}

#[tokio::test]
async fn test_expired_token_is_refreshed_once_and_request_replayed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ADMIN_STATS))
        .and(header("authorization", "Bearer old-access"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Token expired"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(body_json(json!({"refresh_token": "old-refresh"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new-access",
            "refresh_token": "new-refresh"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ADMIN_STATS))
        .and(header("authorization", "Bearer new-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_body(5)))
        .expect(1)
        .mount(&server)
        .await;

    let storage = signed_in("old-access", "old-refresh");
    let gateway = gateway(&server.uri(), storage.clone());

    let stats = gateway.fetch_stats(false).await.unwrap();
    assert_eq!(stats.data.total_users, 5);

    assert_eq!(gateway.credentials().access_token().as_deref(), Some("new-access"));
    assert_eq!(
        storage.get_item("admin_refresh_token").unwrap().as_deref(),
        Some("new-refresh")
    );
}

#[tokio::test]
async fn test_persistent_401_refreshes_exactly_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ADMIN_STATS))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "a2",
            "refresh_token": "r2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let storage = signed_in("a1", "r1");
    let gateway = gateway(&server.uri(), storage.clone());

    let err = gateway.fetch_stats(false).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert!(!gateway.credentials().is_authenticated());
    assert_eq!(storage.get_item("admin_access_token").unwrap(), None);
}

#[tokio::test]
async fn test_failed_refresh_purges_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ADMIN_USERS))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid refresh token"})))
        .expect(1)
        .mount(&server)
        .await;

    let storage = signed_in("a1", "r1");
    let gateway = gateway(&server.uri(), storage.clone());

    let err = gateway.fetch_users(false).await.unwrap_err();
    assert!(err.is_auth());
    assert!(storage.keys().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_refresh_token_fails_without_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ADMIN_STATS))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let gateway = gateway(&server.uri(), Arc::new(MemoryStorage::new()));
    let err = gateway.fetch_stats(false).await.unwrap_err();
    assert!(err.is_auth());
}

#[tokio::test]
async fn test_unauthenticated_request_has_no_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/subscription/admin/financial"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total_revenue": 0.0})))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway(&server.uri(), Arc::new(MemoryStorage::new()));
    gateway.fetch_financial_stats().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_subscriptions_are_never_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/subscription/admin/subscriptions"))
        .and(query_param("active_only", "true"))
        .and(query_param("limit", "20"))
        .and(query_param("skip", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&server)
        .await;

    let storage = signed_in("a1", "r1");
    let gateway = gateway(&server.uri(), storage.clone());
    let filters = SubscriptionFilters {
        active_only: true,
        ..SubscriptionFilters::default()
    };

    gateway.fetch_subscriptions(&filters).await.unwrap();
    gateway.fetch_subscriptions(&filters).await.unwrap();
    assert!(gateway.cache().is_empty());
}

#[tokio::test]
async fn test_validation_failure_keeps_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ADMIN_STATS))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_body(2)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(EDUCATION_LESSONS))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [{"loc": ["body", "title"], "msg": "field required"}]
        })))
        .mount(&server)
        .await;

    let gateway = gateway(&server.uri(), signed_in("a1", "r1"));
    gateway.fetch_stats(false).await.unwrap();

    let err = gateway
        .post::<serde_json::Value, _>(EDUCATION_LESSONS, &json!({"module_id": 1}))
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::Validation("field required".to_string()));
    assert_eq!(err.user_message(), "field required");

    assert!(gateway.fetch_stats(false).await.unwrap().is_cached());
}

#[tokio::test]
async fn test_server_error_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ADMIN_STATS))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(2)
        .mount(&server)
        .await;

    let gateway = gateway(&server.uri(), signed_in("a1", "r1"));
    for _ in 0..2 {
        let err = gateway
            .get::<AdminStats>(ADMIN_STATS, QueryParams::new(), GetOptions::default())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Server {
                status: 500,
                message: "boom".to_string()
            }
        );
    }
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let gateway = gateway("http://127.0.0.1:9", signed_in("a1", "r1"));
    let err = gateway.fetch_stats(false).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert!(gateway.cache().is_empty());
}

#[tokio::test]
async fn test_disabled_cache_always_hits_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ADMIN_STATS))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_body(1)))
        .expect(2)
        .mount(&server)
        .await;

    let storage = signed_in("a1", "r1");
    let config = Config {
        api_base_url: server.uri(),
        cache_enabled: false,
        ..Config::default()
    };
    let gateway = ApiGateway::new(
        &config,
        Arc::new(CacheStore::new(storage.clone())),
        Arc::new(CredentialStore::load(storage)),
    )
    .unwrap();

    assert!(!gateway.fetch_stats(false).await.unwrap().is_cached());
    assert!(!gateway.fetch_stats(false).await.unwrap().is_cached());
}

#[tokio::test]
async fn test_login_then_logout_leaves_nothing_behind() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/login"))
        .and(body_json(json!({"phone_number": "+998901234567", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "a1",
            "refresh_token": "r1"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ADMIN_STATS))
        .and(header("authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_body(8)))
        .expect(1)
        .mount(&server)
        .await;

    let storage = Arc::new(MemoryStorage::new());
    let mut ctx = AuthContext::new(gateway(&server.uri(), storage.clone()));
    assert!(!ctx.restore().is_authenticated());

    let user = ctx.login("+998 90 123 45 67", "secret").await.unwrap();
    assert_eq!(user.phone_number, "+998901234567");
    assert!(ctx.is_authenticated());

    ctx.gateway().fetch_stats(false).await.unwrap();
    assert!(!storage.keys().unwrap().is_empty());

    ctx.logout();
    assert!(storage.keys().unwrap().is_empty());

    let mut restarted = AuthContext::new(gateway(&server.uri(), storage));
    assert!(!restarted.restore().is_authenticated());
}

#[tokio::test]
async fn test_rejected_login_sets_error_without_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid phone or password"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut ctx = AuthContext::new(gateway(&server.uri(), Arc::new(MemoryStorage::new())));
    let err = ctx.login("+998901234567", "wrong").await.unwrap_err();

    assert!(err.is_auth());
    assert_eq!(ctx.state().error(), Some("Invalid phone or password"));
}

#[tokio::test]
async fn test_refresh_during_request_is_reflected_in_auth_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ADMIN_STATS))
        .and(header("authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "a2",
            "refresh_token": "r2"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ADMIN_STATS))
        .and(header("authorization", "Bearer a2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_body(1)))
        .mount(&server)
        .await;

    let mut ctx = AuthContext::new(gateway(&server.uri(), signed_in("a1", "r1")));
    ctx.restore();

    ctx.verify().await.unwrap();
    assert!(ctx.is_authenticated());
    assert!(!ctx.state().is_loading());
}

#[tokio::test]
async fn test_verify_with_dead_session_logs_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ADMIN_STATS))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let storage = signed_in("a1", "r1");
    let mut ctx = AuthContext::new(gateway(&server.uri(), storage.clone()));
    assert!(ctx.restore().is_authenticated());

    let err = ctx.verify().await.unwrap_err();
    assert!(err.is_auth());
    assert!(!ctx.is_authenticated());
    assert!(storage.keys().unwrap().is_empty());
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let server = MockServer::start().await;
    for endpoint in [ADMIN_STATS, "/api/subscription/admin/financial"] {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .and(header("authorization", "Bearer a1"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path(ADMIN_STATS))
        .and(header("authorization", "Bearer a2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_body(8)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/subscription/admin/financial"))
        .and(header("authorization", "Bearer a2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total_revenue": 120.0})))
        .expect(1)
        .mount(&server)
        .await;
    // Refresh tokens rotate: a second exchange of r1 would be rejected.
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(body_json(json!({"refresh_token": "r1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "a2",
            "refresh_token": "r2"
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Token reused"})))
        .expect(0)
        .mount(&server)
        .await;

    let storage = signed_in("a1", "r1");
    let gateway = gateway(&server.uri(), storage.clone());

    let (stats, financial) = tokio::join!(gateway.fetch_stats(false), gateway.fetch_financial_stats());

    assert_eq!(stats.unwrap().data.total_users, 8);
    assert_eq!(financial.unwrap().total_revenue, 120.0);
    assert!(gateway.credentials().is_authenticated());
    assert_eq!(
        storage.get_item("admin_refresh_token").unwrap().as_deref(),
        Some("r2")
    );
}

#[tokio::test]
async fn test_forbidden_ends_session_without_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ADMIN_USERS))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"detail": "Not an admin"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let storage = signed_in("a1", "r1");
    let mut ctx = AuthContext::new(gateway(&server.uri(), storage.clone()));
    assert!(ctx.restore().is_authenticated());

    let err = ctx.gateway().fetch_users(false).await.unwrap_err();
    assert_eq!(err, ApiError::Auth("Not an admin".to_string()));
    assert!(storage.keys().unwrap().is_empty());

    ctx.sync_events();
    assert!(!ctx.is_authenticated());
    assert!(ctx.state().error().is_some());
}

/// Prime the lessons, stats and users caches.
async fn mount_content_reads(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(EDUCATION_LESSONS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"modules": []})))
        .expect(2)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(ADMIN_STATS))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_body(3)))
        .expect(2)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(ADMIN_USERS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(server)
        .await;
}

async fn warm_content_cache(gateway: &ApiGateway) {
    gateway.fetch_lessons(false).await.unwrap();
    gateway.fetch_stats(false).await.unwrap();
    gateway.fetch_users(false).await.unwrap();
    assert!(gateway.fetch_lessons(false).await.unwrap().is_cached());
}

async fn assert_content_cache_dropped(gateway: &ApiGateway) {
    assert_eq!(gateway.fetch_lessons(false).await.unwrap().source, ResponseSource::Network);
    assert_eq!(gateway.fetch_stats(false).await.unwrap().source, ResponseSource::Network);
    assert!(gateway.fetch_users(false).await.unwrap().is_cached());
}

#[tokio::test]
async fn test_updating_lesson_invalidates_lessons_and_stats() {
    let server = MockServer::start().await;
    mount_content_reads(&server).await;
    Mock::given(method("PUT"))
        .and(path("/api/education/lessons/7"))
        .and(body_json(json!({"module_id": 1, "title": "Greetings II"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": 7, "title": "Greetings II", "module_id": 1})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway(&server.uri(), signed_in("a1", "r1"));
    warm_content_cache(&gateway).await;

    let lesson = gateway
        .update_lesson(
            7,
            &NewLesson {
                module_id: 1,
                title: "Greetings II".to_string(),
                description: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(lesson.title, "Greetings II");

    assert_content_cache_dropped(&gateway).await;
}

#[tokio::test]
async fn test_deleting_lesson_invalidates_lessons_and_stats() {
    let server = MockServer::start().await;
    mount_content_reads(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/api/education/lessons/7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway(&server.uri(), signed_in("a1", "r1"));
    warm_content_cache(&gateway).await;

    gateway.delete_lesson(7).await.unwrap();

    assert_content_cache_dropped(&gateway).await;
}

#[tokio::test]
async fn test_empty_delete_body_is_null() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/education/packs/3"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway(&server.uri(), signed_in("a1", "r1"));
    let value = gateway.delete("/api/education/packs/3").await.unwrap();
    assert_eq!(value, serde_json::Value::Null);
}

#[tokio::test]
async fn test_write_without_rule_drops_its_own_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/translation/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/translation/history"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway(&server.uri(), signed_in("a1", "r1"));
    let read = || {
        gateway.get::<serde_json::Value>("/api/translation/history", QueryParams::new(), GetOptions::default())
    };

    assert_eq!(read().await.unwrap().source, ResponseSource::Network);
    assert!(read().await.unwrap().is_cached());

    let created: serde_json::Value = gateway
        .post("/api/translation/history", &json!({"text": "salom"}))
        .await
        .unwrap();
    assert_eq!(created["id"], 1);

    assert_eq!(read().await.unwrap().source, ResponseSource::Network);
}
