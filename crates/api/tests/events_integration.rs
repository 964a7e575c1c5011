//! Integration tests for event endpoints and the bucketed feed.
//!
//! These tests require a running PostgreSQL instance.
//! Set TEST_DATABASE_URL environment variable or use docker-compose.

mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use common::{
    cleanup_all_test_data, create_test_app, create_test_pool, get_request, is_attendee,
    json_request, parse_response_body, post_request, run_migrations, seed_event, seed_user,
    test_config, unique_username, TestEvent,
};
use serde_json::json;
use serial_test::serial;
use tower::ServiceExt;
use uuid::Uuid;

#[tokio::test]
#[serial]
async fn test_create_event_seeds_host_attendee_and_normalizes_tags() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let host_name = unique_username("host");
    let host_id = seed_user(&pool, &host_name, &[], false).await;

    let starts_at = Utc::now() + Duration::days(1);
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/events",
            json!({
                "host_username": host_name,
                "title": "Spanish study night",
                "interest_tags": ["  Spanish ", "PHOTOGRAPHY", "spanish"],
                "latitude": 48.137,
                "longitude": 11.575,
                "starts_at": starts_at.to_rfc3339(),
                "ends_at": (starts_at + Duration::hours(2)).to_rfc3339(),
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = parse_response_body(response).await;
    assert_eq!(body["host_username"], host_name.as_str());
    let tags: Vec<&str> = body["interest_tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t.as_str().unwrap())
        .collect();
    assert_eq!(tags, vec!["spanish", "photography"]);

    let event_id: Uuid = body["id"].as_str().unwrap().parse().unwrap();
    assert!(is_attendee(&pool, event_id, host_id).await);
}

#[tokio::test]
#[serial]
async fn test_create_event_rejects_inverted_time_window() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let host_name = unique_username("host");
    seed_user(&pool, &host_name, &[], false).await;

    let starts_at = Utc::now() + Duration::days(1);
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/events",
            json!({
                "host_username": host_name,
                "title": "Backwards event",
                "latitude": 48.137,
                "longitude": 11.575,
                "starts_at": starts_at.to_rfc3339(),
                "ends_at": (starts_at - Duration::hours(1)).to_rfc3339(),
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[serial]
async fn test_update_event_is_host_only() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let host = seed_user(&pool, &unique_username("host"), &[], false).await;
    let other_name = unique_username("other");
    seed_user(&pool, &other_name, &[], false).await;

    let event_id = seed_event(&pool, host, &TestEvent::new(&["spanish"])).await;

    let response = app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &format!("/api/v1/events/{}", event_id),
            json!({ "host_username": other_name, "title": "Hijacked" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[serial]
async fn test_update_event_replaces_tags() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let host_name = unique_username("host");
    let host = seed_user(&pool, &host_name, &[], false).await;
    let event_id = seed_event(&pool, host, &TestEvent::new(&["spanish"])).await;

    let response = app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &format!("/api/v1/events/{}", event_id),
            json!({ "host_username": host_name, "interest_tags": ["Cooking"] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(body["interest_tags"][0], "cooking");
}

#[tokio::test]
#[serial]
async fn test_get_event_not_found() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/v1/events/{}", Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[serial]
async fn test_feed_buckets_partition_events() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let viewer_name = unique_username("viewer");
    let viewer = seed_user(&pool, &viewer_name, &["spanish"], true).await;
    let other = seed_user(&pool, &unique_username("other"), &[], false).await;

    // Hosting: the viewer's own event.
    let hosted = seed_event(&pool, viewer, &TestEvent::new(&["spanish"])).await;

    // Attending: someone else's event the viewer joined.
    let joined = seed_event(&pool, other, &TestEvent::new(&[])).await;
    sqlx::query("INSERT INTO event_attendees (event_id, user_id) VALUES ($1, $2)")
        .bind(joined)
        .bind(viewer)
        .execute(&pool)
        .await
        .unwrap();

    // Invited: a manual invitation.
    let invited = seed_event(&pool, other, &TestEvent::new(&[])).await;
    sqlx::query(
        "INSERT INTO invitations (event_id, user_id, is_auto_matched) VALUES ($1, $2, false)",
    )
    .bind(invited)
    .bind(viewer)
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query("INSERT INTO event_invited_users (event_id, user_id) VALUES ($1, $2)")
        .bind(invited)
        .bind(viewer)
        .execute(&pool)
        .await
        .unwrap();

    // Auto-matched: produced by a matching run.
    let auto = seed_event(&pool, other, &TestEvent::new(&["spanish"])).await;
    app.clone()
        .oneshot(post_request(&format!("/api/v1/matching/events/{}", auto)))
        .await
        .unwrap();

    // Public: unrelated discoverable event.
    let public = seed_event(&pool, other, &TestEvent::new(&[])).await;

    // Ended: excluded everywhere.
    let ended = seed_event(&pool, viewer, &TestEvent::new(&[]).starting_in_hours(-5)).await;

    let response = app
        .clone()
        .oneshot(get_request(&format!(
            "/api/v1/users/{}/events?include_public=true",
            viewer_name
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    let ids_in = |bucket: &str| -> Vec<String> {
        body[bucket]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["id"].as_str().unwrap().to_string())
            .collect()
    };

    assert_eq!(ids_in("hosting"), vec![hosted.to_string()]);
    assert_eq!(ids_in("attending"), vec![joined.to_string()]);
    assert_eq!(ids_in("invited"), vec![invited.to_string()]);
    assert_eq!(ids_in("auto_matched"), vec![auto.to_string()]);
    assert!(ids_in("public").contains(&public.to_string()));
    for bucket in ["hosting", "attending", "invited", "auto_matched", "public"] {
        assert!(!ids_in(bucket).contains(&ended.to_string()));
    }
}

#[tokio::test]
#[serial]
async fn test_feed_without_public_bucket() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let viewer_name = unique_username("viewer");
    seed_user(&pool, &viewer_name, &[], false).await;
    let other = seed_user(&pool, &unique_username("other"), &[], false).await;
    seed_event(&pool, other, &TestEvent::new(&[])).await;

    let response = app
        .clone()
        .oneshot(get_request(&format!(
            "/api/v1/users/{}/events",
            viewer_name
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(body["public"].as_array().unwrap().len(), 0);
}

#[tokio::test]
#[serial]
async fn test_private_event_invisible_to_unrelated_user() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let viewer_name = unique_username("viewer");
    seed_user(&pool, &viewer_name, &[], false).await;
    let other = seed_user(&pool, &unique_username("other"), &[], false).await;
    let private = seed_event(&pool, other, &TestEvent::new(&[]).private()).await;

    let response = app
        .clone()
        .oneshot(get_request(&format!(
            "/api/v1/users/{}/events?include_public=true",
            viewer_name
        )))
        .await
        .unwrap();
    let body = parse_response_body(response).await;

    for bucket in ["hosting", "attending", "invited", "auto_matched", "public"] {
        let ids: Vec<&str> = body[bucket]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["id"].as_str().unwrap())
            .collect();
        assert!(!ids.contains(&private.to_string().as_str()));
    }
}

#[tokio::test]
#[serial]
async fn test_delete_event_is_host_only_and_cascades() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;
    let app = create_test_app(test_config(), pool.clone());

    let host_name = unique_username("host");
    let host = seed_user(&pool, &host_name, &[], false).await;
    let other_name = unique_username("other");
    seed_user(&pool, &other_name, &[], false).await;
    seed_user(&pool, &unique_username("anna"), &["spanish"], true).await;

    let event_id = seed_event(&pool, host, &TestEvent::new(&["spanish"])).await;
    app.clone()
        .oneshot(post_request(&format!("/api/v1/matching/events/{}", event_id)))
        .await
        .unwrap();

    let forbidden = app
        .clone()
        .oneshot(
            axum::http::Request::builder()
                .method(Method::DELETE)
                .uri(format!(
                    "/api/v1/events/{}?requested_by={}",
                    event_id, other_name
                ))
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(
            axum::http::Request::builder()
                .method(Method::DELETE)
                .uri(format!(
                    "/api/v1/events/{}?requested_by={}",
                    event_id, host_name
                ))
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Invitation rows and relation memberships cascade with the event.
    let leftovers: i64 = sqlx::query_scalar(
        "SELECT (SELECT COUNT(*) FROM invitations WHERE event_id = $1)
              + (SELECT COUNT(*) FROM event_invited_users WHERE event_id = $1)
              + (SELECT COUNT(*) FROM event_attendees WHERE event_id = $1)",
    )
    .bind(event_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(leftovers, 0);
}
