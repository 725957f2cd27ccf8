use crate::fixtures::test_app::TestApp;
use serde_json::{Value, json};

#[tokio::test]
async fn empty_body_lists_every_missing_field() {
    let app = TestApp::spawn().await;

    let resp = app.post_chat(&json!({})).await;

    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "bad_request");
    let message = body["message"].as_str().unwrap();
    for field in ["chatId", "senderId", "message", "participants"] {
        assert!(message.contains(field), "missing {field} in {message:?}");
    }
    assert_eq!(app.push.batch_count(), 0);
}

#[tokio::test]
async fn only_absent_fields_are_listed() {
    let app = TestApp::spawn().await;

    let resp = app
        .post_chat(&json!({
            "chatId": "42",
            "senderId": "1",
            "participants": [],
        }))
        .await;

    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("message"));
    assert!(!message.contains("chatId"));
    assert!(!message.contains("senderId"));
    assert!(!message.contains("participants"));
}

#[tokio::test]
async fn empty_message_counts_as_missing() {
    let app = TestApp::spawn().await;

    let resp = app
        .post_chat(&json!({
            "chatId": "42",
            "senderId": "1",
            "message": "",
            "participants": [],
        }))
        .await;

    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn empty_roster_is_a_valid_request_with_nothing_to_send() {
    let app = TestApp::spawn().await;

    let resp = app
        .post_chat(&json!({
            "chatId": "42",
            "senderId": "1",
            "message": "hello",
            "participants": [],
        }))
        .await;

    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "No valid tokens to send");
    assert_eq!(app.push.batch_count(), 0);
}

#[tokio::test]
async fn wrong_method_is_rejected() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .get(app.url("/api/notification/chat"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 405);
}
