mod common;

use axum::http::StatusCode;
use common::{admin_header, admin_value, unique_title};

#[tokio::test]
async fn create_post_derives_slug_and_excerpt() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    let body = "x".repeat(200);
    let response = server
        .post("/posts")
        .add_header(admin_header(), admin_value())
        .json(&serde_json::json!({ "title": "Hello World!", "body": body }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let created: serde_json::Value = response.json();
    let post = &created["data"];
    assert_eq!(created["success"], true);
    assert_eq!(post["slug"], "hello-world");
    assert_eq!(post["excerpt"], format!("{}...", "x".repeat(150)));
    assert_eq!(post["published"], false);
    assert_eq!(post["author"], "Admin");
    assert_eq!(post["views"], 0);

    // Drafts are reachable by id but not through public reads
    let id = post["_id"].as_str().unwrap();
    let by_id: serde_json::Value = server.get(&format!("/posts/{id}")).await.json();
    assert_eq!(by_id["data"]["slug"], "hello-world");

    env.server_permissive()
        .get("/posts/slug/hello-world")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn duplicate_slug_is_rejected() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();

    server
        .post("/posts")
        .add_header(admin_header(), admin_value())
        .json(&serde_json::json!({ "title": "Same Title", "body": "one" }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post("/posts")
        .add_header(admin_header(), admin_value())
        .json(&serde_json::json!({ "title": "same -- title!", "body": "two" }))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("same-title"));
}

#[tokio::test]
async fn create_validates_and_requires_admin() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();

    server
        .post("/posts")
        .json(&serde_json::json!({ "title": "No Auth", "body": "x" }))
        .await
        .assert_status_unauthorized();

    server
        .post("/posts")
        .add_header(admin_header(), axum::http::HeaderValue::from_static("wrong"))
        .json(&serde_json::json!({ "title": "Bad Auth", "body": "x" }))
        .await
        .assert_status_unauthorized();

    server
        .post("/posts")
        .add_header(admin_header(), admin_value())
        .json(&serde_json::json!({ "title": "No Body" }))
        .await
        .assert_status_bad_request();

    let all: serde_json::Value = env
        .server()
        .get("/admin/posts")
        .add_header(admin_header(), admin_value())
        .await
        .json();
    assert_eq!(all["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn update_and_delete_post() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    let post = env.create_post(&server, &unique_title("Original"), false).await;
    let id = post["_id"].as_str().unwrap();

    let response = server
        .put(&format!("/posts/{id}"))
        .add_header(admin_header(), admin_value())
        .json(&serde_json::json!({
            "title": "Renamed Post",
            "published": true,
            "trending": true,
            "category": "essays"
        }))
        .await;
    let updated: serde_json::Value = response.json();
    assert_eq!(updated["data"]["slug"], "renamed-post");
    assert_eq!(updated["data"]["published"], true);
    assert_eq!(updated["data"]["category"], "essays");
    assert_eq!(updated["data"]["excerpt"], post["excerpt"]);

    let public: serde_json::Value = server.get("/posts/slug/renamed-post").await.json();
    assert_eq!(public["data"]["_id"], id);

    server
        .delete(&format!("/posts/{id}"))
        .add_header(admin_header(), admin_value())
        .await;

    let permissive = env.server_permissive();
    permissive
        .get(&format!("/posts/{id}"))
        .await
        .assert_status_not_found();
    permissive
        .delete(&format!("/posts/{id}"))
        .add_header(admin_header(), admin_value())
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn unknown_and_malformed_ids_are_not_found() {
    let env = common::TestEnv::start().await;
    let server = env.server_permissive();

    server.get("/posts/not-an-object-id").await.assert_status_not_found();
    server
        .get("/posts/65f1c0ffee0000000000abcd")
        .await
        .assert_status_not_found();
    server
        .put("/posts/65f1c0ffee0000000000abcd")
        .add_header(admin_header(), admin_value())
        .json(&serde_json::json!({ "title": "Ghost" }))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn listing_is_published_newest_first_with_filters() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    env.create_post(&server, "Draft Only", false).await;
    env.create_post(&server, "First Live", true).await;
    let trending = env.create_post(&server, "Second Live", true).await;
    env.create_post(&server, "Third Live", true).await;

    let id = trending["_id"].as_str().unwrap();
    server
        .put(&format!("/posts/{id}"))
        .add_header(admin_header(), admin_value())
        .json(&serde_json::json!({ "trending": true }))
        .await;

    let listed: serde_json::Value = server.get("/posts").await.json();
    let slugs: Vec<&str> = listed["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, vec!["third-live", "second-live", "first-live"]);

    let home: serde_json::Value = server.get("/posts?trendingOnly=true").await.json();
    assert_eq!(home["data"].as_array().unwrap().len(), 1);
    assert_eq!(home["data"][0]["slug"], "second-live");

    let articles: serde_json::Value = server.get("/posts?excludeTrending=true").await.json();
    assert_eq!(articles["data"].as_array().unwrap().len(), 2);

    env.server_permissive()
        .get("/posts?trendingOnly=true&excludeTrending=true")
        .await
        .assert_status_bad_request();

    let all: serde_json::Value = server
        .get("/admin/posts")
        .add_header(admin_header(), admin_value())
        .await
        .json();
    assert_eq!(all["data"].as_array().unwrap().len(), 4);
}
