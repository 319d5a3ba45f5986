//! Client façade against a live server on an ephemeral port

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;

use bookdesk_server::{
    api,
    client::{ApiClient, ClientConfig, ClientError, SessionStore},
    clock::FixedClock,
    config::AppConfig,
    models::{book::BookQuery, loan::IssueLoan, Role},
    repository::{seed, Repository},
    AppState,
};

async fn spawn_server() -> String {
    let today = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
    let now = today.and_hms_opt(12, 0, 0).unwrap().and_utc();
    let data = seed::demo_data(today, now).unwrap();
    let state = AppState::new(AppConfig::default(), Repository::new(data), Arc::new(FixedClock(today)));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, api::router(state)).await.unwrap();
    });
    format!("http://{}/api/v1", addr)
}

fn session_path() -> PathBuf {
    std::env::temp_dir().join(format!("bookdesk-client-{}.json", uuid::Uuid::new_v4()))
}

async fn client(base_url: &str, path: &PathBuf) -> ApiClient {
    let session = SessionStore::open(path).await.unwrap();
    ApiClient::new(ClientConfig::new(base_url), session).unwrap()
}

#[tokio::test]
async fn test_login_persists_and_restores_session() {
    let base_url = spawn_server().await;
    let path = session_path();

    let first = client(&base_url, &path).await;
    assert!(!first.is_authenticated().await);
    let user = first.login("librarian@library.com", "lib123").await.unwrap();
    assert_eq!(user.role, Role::Librarian);
    assert!(path.exists());

    // A fresh client picks up the stored session
    let second = client(&base_url, &path).await;
    let restored = second.session().user().await.unwrap();
    assert_eq!(restored.email, "librarian@library.com");
    let me = second.me().await.unwrap();
    assert_eq!(me.id, user.id);

    second.logout().await.unwrap();
    assert!(!second.is_authenticated().await);
    assert!(!path.exists());
}

#[tokio::test]
async fn test_wrong_password_leaves_no_session() {
    let base_url = spawn_server().await;
    let path = session_path();
    let client = client(&base_url, &path).await;

    let err = client.login("admin@library.com", "nope").await.unwrap_err();
    assert!(matches!(err, ClientError::Authentication(_)), "got {:?}", err);
    assert!(client.session().current().await.is_none());
    assert!(!path.exists());
}

#[tokio::test]
async fn test_rejected_token_clears_session() {
    let base_url = spawn_server().await;
    let path = session_path();

    let first = client(&base_url, &path).await;
    first.login("admin@library.com", "admin123").await.unwrap();

    // Revoke the shared token through a second client
    let second = client(&base_url, &path).await;
    second.logout().await.unwrap();

    let err = first.dashboard_stats().await.unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired), "got {:?}", err);
    assert!(first.session().token().await.is_none());
    assert!(first.session().user().await.is_none());
    assert!(!path.exists());
}

#[tokio::test]
async fn test_typed_results_and_errors() {
    let base_url = spawn_server().await;
    let staff = client(&base_url, &session_path()).await;
    staff.login("librarian@library.com", "lib123").await.unwrap();

    let page = staff
        .list_books(&BookQuery {
            category: Some("Fantasy".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.total, 2);

    let stats = staff.dashboard_stats().await.unwrap();
    assert_eq!(stats.total_books, 32);
    assert_eq!(stats.pending_reservations, 2);

    let err = staff
        .issue_book(&IssueLoan {
            book_copy_id: Some("copy-012".to_string()),
            member_id: Some("mem-002".to_string()),
            due_date: NaiveDate::from_ymd_opt(2024, 12, 20),
        })
        .await
        .unwrap_err();
    assert!(err.is_rule_violation(), "got {:?}", err);

    let err = staff.get_book("book-404").await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));

    let member = client(&base_url, &session_path()).await;
    member.login("member@library.com", "member123").await.unwrap();
    let err = member
        .issue_book(&IssueLoan {
            book_copy_id: Some("copy-001".to_string()),
            member_id: Some("mem-007".to_string()),
            due_date: NaiveDate::from_ymd_opt(2024, 12, 20),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Authorization(_)));

    let reservation = member.reserve_book("book-004", None).await.unwrap();
    assert_eq!(reservation.member_id, "mem-007");
    member.cancel_reservation(&reservation.id).await.unwrap();
    let err = member.cancel_reservation(&reservation.id).await.unwrap_err();
    assert!(matches!(err, ClientError::Conflict(_)));
}

#[tokio::test]
async fn test_health_needs_no_session() {
    let base_url = spawn_server().await;
    let client = ApiClient::new(ClientConfig::new(&base_url), SessionStore::in_memory()).unwrap();
    let health = client.health().await.unwrap();
    assert_eq!(health.status, "healthy");
}

#[tokio::test]
async fn test_protected_call_without_session_is_an_authentication_error() {
    let base_url = spawn_server().await;
    let client = ApiClient::new(ClientConfig::new(&base_url), SessionStore::in_memory()).unwrap();

    let err = client.dashboard_stats().await.unwrap_err();
    assert!(matches!(err, ClientError::Authentication(_)), "got {:?}", err);
    assert!(client.session().current().await.is_none());
}
