//! Backend client behavior against a scripted fake backend.
//!
//! Covers the pieces that are hard to see from unit tests alone: credential
//! cookie handling, the shared filter parameters between the listing and the
//! CSV export, the status-vocabulary cache, and the global 401 interceptor
//! clearing the session.

#![allow(clippy::unwrap_used)]

use secrecy::SecretString;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gavelpoint_core::{Email, UserRole};
use gavelpoint_portal::backend::types::{AuctionFilters, NewUser};
use gavelpoint_portal::backend::{BackendClient, BackendError};
use gavelpoint_portal::models::UserProfile;
use gavelpoint_portal::session::{SessionFile, SessionManager};

fn temp_session() -> (SessionManager, SessionFile) {
    let path = std::env::temp_dir().join(format!(
        "gavelpoint-client-test-{}.json",
        uuid::Uuid::new_v4()
    ));
    let file = SessionFile::new(path);
    (SessionManager::new(file.clone()), file)
}

async fn client_for(server: &MockServer) -> (BackendClient, SessionManager, SessionFile) {
    let (session, file) = temp_session();
    let base: url::Url = server.uri().parse().unwrap();
    let client = BackendClient::new(&base, session.clone()).unwrap();
    (client, session, file)
}

fn operator() -> UserProfile {
    UserProfile {
        name: "Pat".to_string(),
        email: Email::parse("pat@example.com").unwrap(),
        role: UserRole::Admin,
    }
}

#[tokio::test]
async fn login_returns_profile_and_carries_credential_cookie_afterwards() {
    let server = MockServer::start().await;
    let (client, session, file) = client_for(&server).await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(serde_json::json!({
            "email": "pat@example.com",
            "password": "hunter2",
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "access_token=tok123; HttpOnly; Path=/")
                .set_body_json(serde_json::json!({
                    "success": true,
                    "message": "Login successful",
                    "email": "pat@example.com",
                    "name": "Pat",
                    "role": "admin",
                })),
        )
        .mount(&server)
        .await;

    // The follow-up call only matches if the jar replays the cookie.
    Mock::given(method("GET"))
        .and(path("/auctions"))
        .and(wiremock::matchers::header("cookie", "access_token=tok123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "auctions": [],
            "total_pages": 1,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let email = Email::parse("pat@example.com").unwrap();
    let password = SecretString::from("hunter2");
    let profile = client.login(&email, &password).await.unwrap();

    assert_eq!(profile.name, "Pat");
    assert_eq!(profile.role, UserRole::Admin);

    client
        .auctions(&AuctionFilters::default(), 1)
        .await
        .unwrap();

    session.logout();
    file.clear().unwrap();
}

#[tokio::test]
async fn listing_and_download_send_identical_filter_parameters() {
    let server = MockServer::start().await;
    let (client, _session, file) = client_for(&server).await;

    let filters = AuctionFilters {
        auction_status: Some("Canceled".to_string()),
        search: Some("Main St".to_string()),
        ..AuctionFilters::default()
    };

    Mock::given(method("GET"))
        .and(path("/auctions"))
        .and(query_param("auction_status", "Canceled"))
        .and(query_param("search", "Main St"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "auctions": [{
                "id": 1,
                "AuctionStatus": "Auction Canceled 06/30/2025",
                "PropertyAddress": "12 Main St",
            }],
            "total_pages": 4,
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/auctions/download"))
        .and(query_param("auction_status", "Canceled"))
        .and(query_param("search", "Main St"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/csv")
                .insert_header(
                    "content-disposition",
                    "attachment; filename=auctions_20250715_110000.csv",
                )
                .set_body_string("id,PropertyAddress\n1,12 Main St\n"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let page = client.auctions(&filters, 3).await.unwrap();
    assert_eq!(page.total_pages, 4);
    assert!(page.auctions[0].is_canceled());

    let export = client.download_csv(&filters).await.unwrap();
    assert_eq!(export.filename, "auctions_20250715_110000.csv");
    assert!(export.content.starts_with(b"id,PropertyAddress"));

    file.clear().unwrap();
}

#[tokio::test]
async fn any_401_clears_the_session_everywhere() {
    let server = MockServer::start().await;
    let (client, session, file) = client_for(&server).await;

    session.login(operator());
    assert!(session.current_user().is_some());
    assert!(file.load().unwrap().is_some());

    Mock::given(method("GET"))
        .and(path("/auction_counts"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "success": false,
            "message": "Not authorized",
        })))
        .mount(&server)
        .await;

    let err = client
        .auction_counts(&AuctionFilters::default())
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    // Memory and the persisted document are gone together.
    assert!(session.current_user().is_none());
    assert!(file.load().unwrap().is_none());
}

#[tokio::test]
async fn validation_failure_carries_the_backend_message() {
    let server = MockServer::start().await;
    let (client, _session, file) = client_for(&server).await;

    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "success": false,
            "message": "Email and password cannot be empty",
        })))
        .mount(&server)
        .await;

    let err = client
        .register(&NewUser {
            username: "pat".to_string(),
            email: String::new(),
            dob: "2002-01-10".to_string(),
            password: String::new(),
        })
        .await
        .unwrap_err();

    match err {
        BackendError::Validation { message } => {
            assert_eq!(message, "Email and password cannot be empty");
        }
        other => panic!("expected Validation, got {other:?}"),
    }

    file.clear().unwrap();
}

#[tokio::test]
async fn counts_parse_sparse_mapping_with_zero_default() {
    let server = MockServer::start().await;
    let (client, _session, file) = client_for(&server).await;

    Mock::given(method("GET"))
        .and(path("/auction_counts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "07/15/2025": 3,
            "07/20/2025": 1,
        })))
        .mount(&server)
        .await;

    let counts = client
        .auction_counts(&AuctionFilters::default())
        .await
        .unwrap();

    assert_eq!(counts.get("07/15/2025".parse().unwrap()), 3);
    assert_eq!(counts.get("07/16/2025".parse().unwrap()), 0);

    file.clear().unwrap();
}

#[tokio::test]
async fn statuses_are_cached_and_blank_entries_dropped() {
    let server = MockServer::start().await;
    let (client, _session, file) = client_for(&server).await;

    Mock::given(method("GET"))
        .and(path("/auctions-status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "auction_status": ["", "Scheduled", "Auction Canceled"],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let first = client.auction_statuses().await.unwrap();
    assert_eq!(first, vec!["Scheduled", "Auction Canceled"]);

    // Second read is served from the cache; the mock's expect(1) verifies it.
    let second = client.auction_statuses().await.unwrap();
    assert_eq!(second, first);

    file.clear().unwrap();
}

#[tokio::test]
async fn connectivity_failure_is_distinguishable() {
    let (session, file) = temp_session();
    // Nothing listens here.
    let base: url::Url = "http://127.0.0.1:1/".parse().unwrap();
    let client = BackendClient::new(&base, session).unwrap();

    let err = client
        .auctions(&AuctionFilters::default(), 1)
        .await
        .unwrap_err();
    assert!(err.is_connectivity());

    file.clear().unwrap();
}

#[tokio::test]
async fn scraper_envelope_failure_surfaces_as_rejected() {
    let server = MockServer::start().await;
    let (client, _session, file) = client_for(&server).await;

    Mock::given(method("POST"))
        .and(path("/scraper/start"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": false,
            "message": "Scraper already running",
        })))
        .mount(&server)
        .await;

    let err = client.scraper_start().await.unwrap_err();
    match err {
        BackendError::Rejected { message } => assert_eq!(message, "Scraper already running"),
        other => panic!("expected Rejected, got {other:?}"),
    }

    file.clear().unwrap();
}
