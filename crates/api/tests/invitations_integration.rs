//! Integration tests for invitation endpoints.
//!
//! These tests require a running PostgreSQL instance.
//! Set TEST_DATABASE_URL environment variable or use docker-compose.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    cleanup_all_test_data, create_test_app, create_test_pool, is_attendee, is_invited_member,
    json_request, parse_response_body, run_migrations, seed_event, seed_user, test_config,
    unique_username, TestEvent,
};
use serde_json::json;
use serial_test::serial;
use tower::ServiceExt;
use uuid::Uuid;

#[tokio::test]
#[serial]
async fn test_invite_user_creates_manual_invitation() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let host_name = unique_username("host");
    let host = seed_user(&pool, &host_name, &[], false).await;
    let guest_name = unique_username("guest");
    let guest = seed_user(&pool, &guest_name, &[], false).await;

    let event_id = seed_event(&pool, host, &TestEvent::new(&[])).await;

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/events/{}/invitations", event_id),
            json!({ "username": guest_name, "invited_by": host_name }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = parse_response_body(response).await;
    assert_eq!(body["kind"], "manual");
    assert_eq!(body["username"], guest_name.as_str());

    let is_auto: bool = sqlx::query_scalar(
        "SELECT is_auto_matched FROM invitations WHERE event_id = $1 AND user_id = $2",
    )
    .bind(event_id)
    .bind(guest)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert!(!is_auto);
    assert!(is_invited_member(&pool, event_id, guest).await);
}

#[tokio::test]
#[serial]
async fn test_invite_user_is_host_only() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let host = seed_user(&pool, &unique_username("host"), &[], false).await;
    let guest_name = unique_username("guest");
    seed_user(&pool, &guest_name, &[], false).await;
    let stranger_name = unique_username("stranger");
    seed_user(&pool, &stranger_name, &[], false).await;

    let event_id = seed_event(&pool, host, &TestEvent::new(&[])).await;

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/events/{}/invitations", event_id),
            json!({ "username": guest_name, "invited_by": stranger_name }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[serial]
async fn test_duplicate_invite_is_a_conflict() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let host_name = unique_username("host");
    let host = seed_user(&pool, &host_name, &[], false).await;
    let guest_name = unique_username("guest");
    seed_user(&pool, &guest_name, &[], false).await;

    let event_id = seed_event(&pool, host, &TestEvent::new(&[])).await;
    let body = json!({ "username": guest_name, "invited_by": host_name });
    let uri = format!("/api/v1/events/{}/invitations", event_id);

    let first = app
        .clone()
        .oneshot(json_request(Method::POST, &uri, body.clone()))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .clone()
        .oneshot(json_request(Method::POST, &uri, body))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[serial]
async fn test_host_cannot_invite_themselves() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let host_name = unique_username("host");
    let host = seed_user(&pool, &host_name, &[], false).await;
    let event_id = seed_event(&pool, host, &TestEvent::new(&[])).await;

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/events/{}/invitations", event_id),
            json!({ "username": host_name, "invited_by": host_name }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[serial]
async fn test_accept_invitation_adds_attendee() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let host_name = unique_username("host");
    let host = seed_user(&pool, &host_name, &[], false).await;
    let guest_name = unique_username("guest");
    let guest = seed_user(&pool, &guest_name, &[], false).await;

    let event_id = seed_event(&pool, host, &TestEvent::new(&[])).await;

    app.clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/events/{}/invitations", event_id),
            json!({ "username": guest_name, "invited_by": host_name }),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/events/{}/invitations/respond", event_id),
            json!({ "username": guest_name, "accept": true }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(body["accepted"], true);
    assert!(is_attendee(&pool, event_id, guest).await);
}

#[tokio::test]
#[serial]
async fn test_decline_invitation_removes_row_and_membership() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let host_name = unique_username("host");
    let host = seed_user(&pool, &host_name, &[], false).await;
    let guest_name = unique_username("guest");
    let guest = seed_user(&pool, &guest_name, &[], false).await;

    let event_id = seed_event(&pool, host, &TestEvent::new(&[])).await;

    app.clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/events/{}/invitations", event_id),
            json!({ "username": guest_name, "invited_by": host_name }),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/events/{}/invitations/respond", event_id),
            json!({ "username": guest_name, "accept": false }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let rows: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM invitations WHERE event_id = $1 AND user_id = $2",
    )
    .bind(event_id)
    .bind(guest)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(rows, 0);
    assert!(!is_invited_member(&pool, event_id, guest).await);
    assert!(!is_attendee(&pool, event_id, guest).await);
}

#[tokio::test]
#[serial]
async fn test_accept_full_event_is_a_conflict() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let host_name = unique_username("host");
    let host = seed_user(&pool, &host_name, &[], false).await;
    let guest_name = unique_username("guest");
    seed_user(&pool, &guest_name, &[], false).await;

    // Capacity 1 is consumed by the host's own attendance.
    let event_id = seed_event(&pool, host, &TestEvent::new(&[]).with_capacity(1)).await;

    app.clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/events/{}/invitations", event_id),
            json!({ "username": guest_name, "invited_by": host_name }),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/events/{}/invitations/respond", event_id),
            json!({ "username": guest_name, "accept": true }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[serial]
async fn test_respond_without_invitation_is_not_found() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let host = seed_user(&pool, &unique_username("host"), &[], false).await;
    let guest_name = unique_username("guest");
    seed_user(&pool, &guest_name, &[], false).await;

    let event_id = seed_event(&pool, host, &TestEvent::new(&[])).await;

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/events/{}/invitations/respond", event_id),
            json!({ "username": guest_name, "accept": true }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[serial]
async fn test_invite_unknown_user_is_not_found() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let host_name = unique_username("host");
    let host = seed_user(&pool, &host_name, &[], false).await;
    let event_id = seed_event(&pool, host, &TestEvent::new(&[])).await;

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/events/{}/invitations", event_id),
            json!({ "username": unique_username("ghost"), "invited_by": host_name }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[serial]
async fn test_invite_to_unknown_event_is_not_found() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let host_name = unique_username("host");
    seed_user(&pool, &host_name, &[], false).await;

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/events/{}/invitations", Uuid::new_v4()),
            json!({ "username": host_name, "invited_by": host_name }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
