mod common;

use std::future::IntoFuture;
use axum::http::StatusCode;
use common::{admin_header, admin_value};

#[tokio::test]
async fn like_then_comment_notifies_admin() {
    let env = common::TestEnv::start().await;
    let server = env.server();

    env.create_post(&server, "Hello World", true).await;

    let liked: serde_json::Value = server
        .post("/posts/hello-world/like")
        .json(&serde_json::json!({ "name": "Ann" }))
        .await
        .json();
    assert_eq!(liked["success"], true);
    assert_eq!(liked["likes"], 1);

    let commented: serde_json::Value = server
        .post("/posts/hello-world/comment")
        .json(&serde_json::json!({ "name": "Bob", "comment": "Nice post" }))
        .await
        .json();
    let comments = commented["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["name"], "Bob");
    assert_eq!(comments[0]["comment"], "Nice post");

    let feed: serde_json::Value = server.get("/notifications").await.json();
    let items = feed["notifications"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(feed["unreadCount"], 2);

    assert_eq!(items[0]["type"], "comment");
    assert_eq!(items[0]["userName"], "Bob");
    assert_eq!(items[0]["comment"], "Nice post");
    assert_eq!(items[0]["postSlug"], "hello-world");
    assert_eq!(items[1]["type"], "like");
    assert_eq!(items[1]["userName"], "Ann");
    assert_eq!(items[1]["postTitle"], "Hello World");
    assert!(items.iter().all(|n| n["read"] == false));

    let post: serde_json::Value = server.get("/posts/slug/hello-world").await.json();
    assert_eq!(post["data"]["likes"].as_array().unwrap().len(), 1);
    assert_eq!(post["data"]["comments"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn engagement_on_drafts_and_unknown_posts_is_not_found() {
    let env = common::TestEnv::start().await;
    let server = env.server();
    env.create_post(&server, "Secret Draft", false).await;

    let permissive = env.server_permissive();
    permissive
        .post("/posts/secret-draft/like")
        .json(&serde_json::json!({ "name": "Ann" }))
        .await
        .assert_status_not_found();
    permissive
        .post("/posts/secret-draft/comment")
        .json(&serde_json::json!({ "name": "Ann", "comment": "hi" }))
        .await
        .assert_status_not_found();
    permissive
        .post("/posts/no-such-post/increment-view")
        .await
        .assert_status_not_found();

    let feed: serde_json::Value = server.get("/notifications").await.json();
    assert_eq!(feed["notifications"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn engagement_requires_name_and_text() {
    let env = common::TestEnv::start().await;
    let server = env.server();
    env.create_post(&server, "Talk", true).await;

    let permissive = env.server_permissive();
    permissive
        .post("/posts/talk/like")
        .json(&serde_json::json!({ "name": "" }))
        .await
        .assert_status_bad_request();
    permissive
        .post("/posts/talk/comment")
        .json(&serde_json::json!({ "name": "Ann" }))
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn concurrent_view_increments_are_not_lost() {
    let env = common::TestEnv::start().await;
    let server = env.server();
    env.create_post(&server, "Popular", true).await;

    let tasks: Vec<_> = (0..20)
        .map(|_| {
            let repo = env.post_repo.clone();
            tokio::spawn(async move { repo.increment_views("popular").await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap().expect("post exists");
    }

    let viewed: serde_json::Value = server.post("/posts/popular/increment-view").await.json();
    assert_eq!(viewed["views"], 21);

    let post: serde_json::Value = server.get("/posts/slug/popular").await.json();
    assert_eq!(post["data"]["views"], 21);
}

#[tokio::test]
async fn concurrent_likes_are_all_recorded() {
    let env = common::TestEnv::start().await;
    let server = env.server();
    env.create_post(&server, "Liked", true).await;

    let requests = (0..10).map(|i| {
        server
            .post("/posts/liked/like")
            .json(&serde_json::json!({ "name": format!("reader-{i}") }))
            .into_future()
    });
    futures::future::join_all(requests).await;

    let post: serde_json::Value = server.get("/posts/slug/liked").await.json();
    assert_eq!(post["data"]["likes"].as_array().unwrap().len(), 10);

    let feed: serde_json::Value = server.get("/notifications").await.json();
    assert_eq!(feed["notifications"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn delete_comment_by_index() {
    let env = common::TestEnv::start().await;
    let server = env.server();
    env.create_post(&server, "Thread", true).await;

    for (name, text) in [("A", "first"), ("B", "second"), ("C", "third")] {
        server
            .post("/posts/thread/comment")
            .json(&serde_json::json!({ "name": name, "comment": text }))
            .await;
    }

    let permissive = env.server_permissive();
    permissive
        .delete("/posts/thread/comment")
        .json(&serde_json::json!({ "commentIndex": 1 }))
        .await
        .assert_status_unauthorized();

    let response = permissive
        .delete("/posts/thread/comment")
        .add_header(admin_header(), admin_value())
        .json(&serde_json::json!({ "commentIndex": 7 }))
        .await;
    response.assert_status_not_found();

    let post: serde_json::Value = server.get("/posts/slug/thread").await.json();
    assert_eq!(post["data"]["comments"].as_array().unwrap().len(), 3);

    let remaining: serde_json::Value = server
        .delete("/posts/thread/comment")
        .add_header(admin_header(), admin_value())
        .json(&serde_json::json!({ "commentIndex": 1 }))
        .await
        .json();
    let texts: Vec<&str> = remaining["comments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["comment"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["first", "third"]);

    permissive
        .delete("/posts/thread/comment")
        .add_header(admin_header(), admin_value())
        .json(&serde_json::json!({}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
