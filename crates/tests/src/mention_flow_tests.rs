use crate::fixtures::test_app::TestApp;
use serde_json::{Value, json};

#[tokio::test]
async fn mention_without_group_name() {
    let app = TestApp::spawn().await;

    let resp = app
        .post_chat(&json!({
            "chatId": "42",
            "senderId": 1,
            "message": "@Bob please check this",
            "participants": [
                {"userId": 1, "name": "Alice"},
                {"userId": 2, "name": "Bob", "fcmToken": "tokentokentoken"},
            ],
        }))
        .await;

    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["response"]["success_count"], 1);
    assert_eq!(body["response"]["failure_count"], 0);

    let batch = app.push.single_batch();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].token, "tokentokentoken");
    assert_eq!(batch[0].notification.title, "You were mentioned");
    assert_eq!(batch[0].notification.body, "Alice: @Bob please check this");
    assert_eq!(batch[0].data["isMentioned"], "1");
    assert_eq!(batch[0].data["chatId"], "42");
    assert_eq!(batch[0].data["type"], "chat");
    assert_eq!(batch[0].data["screen"], "ChatThreadScreen");
}

#[tokio::test]
async fn mention_with_group_name() {
    let app = TestApp::spawn().await;

    let resp = app
        .post_chat(&json!({
            "chatId": "42",
            "senderId": 1,
            "message": "@Bob please check this",
            "groupName": "Sales Team",
            "participants": [
                {"userId": 1, "name": "Alice"},
                {"userId": 2, "name": "Bob", "fcmToken": "tokentokentoken"},
            ],
        }))
        .await;

    assert_eq!(resp.status().as_u16(), 200);
    let batch = app.push.single_batch();
    assert_eq!(
        batch[0].notification.title,
        "You were mentioned in Sales Team"
    );
}

#[tokio::test]
async fn no_mentions_notifies_everyone_but_the_sender() {
    let app = TestApp::spawn().await;

    let resp = app
        .post_chat(&json!({
            "chatId": 7,
            "senderId": "1",
            "message": "shipment delayed until Monday",
            "participants": [
                {"userId": "1", "name": "Alice", "fcmToken": "sender-token-long"},
                {"userId": "2", "name": "Bob", "fcmToken": "bob-token-long-enough"},
                {"userId": "3", "name": "Carol", "fcmToken": ["carol-token-long-enough"]},
            ],
        }))
        .await;

    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["response"]["success_count"], 2);

    let batch = app.push.single_batch();
    assert_eq!(batch.len(), 2);
    assert!(batch.iter().all(|m| m.token != "sender-token-long"));
    for message in &batch {
        assert_eq!(message.notification.title, "New Chat Message");
        assert_eq!(
            message.notification.body,
            "Alice: shipment delayed until Monday"
        );
        assert_eq!(message.data["isMentioned"], "0");
    }
}

#[tokio::test]
async fn explicit_ids_take_precedence_over_text_tokens() {
    let app = TestApp::spawn().await;

    let resp = app
        .post_chat(&json!({
            "chatId": "42",
            "senderId": "1",
            "message": "fyi @Charlie",
            "mentionedUserIds": ["2"],
            "participants": [
                {"userId": "1", "name": "Alice"},
                {"userId": "2", "name": "Bob", "fcmToken": "bob-token-long-enough"},
                {"userId": "3", "name": "Charlie", "fcmToken": "charlie-token-long-enough"},
            ],
        }))
        .await;

    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();

    let debug = body["debug"].as_array().unwrap();
    let bob = debug.iter().find(|t| t["user_id"] == "2").unwrap();
    let charlie = debug.iter().find(|t| t["user_id"] == "3").unwrap();
    assert_eq!(bob["is_mentioned"], true);
    assert_eq!(charlie["is_mentioned"], false);

    let batch = app.push.single_batch();
    let charlie_msg = batch
        .iter()
        .find(|m| m.token == "charlie-token-long-enough")
        .unwrap();
    assert_eq!(charlie_msg.data["isMentioned"], "0");
    assert_eq!(
        charlie_msg.notification.body,
        "Alice mentioned @Bob: fyi @Charlie"
    );
}

#[tokio::test]
async fn thread_replies_carry_the_parent_id() {
    let app = TestApp::spawn().await;

    app.post_chat(&json!({
        "chatId": "42",
        "senderId": "1",
        "message": "replying in thread",
        "parentMessageId": 777,
        "participants": [
            {"userId": "1", "name": "Alice"},
            {"userId": "2", "name": "Bob", "fcmToken": "bob-token-long-enough"},
        ],
    }))
    .await;

    let batch = app.push.single_batch();
    assert_eq!(batch[0].data["parentMessageId"], "777");
}
