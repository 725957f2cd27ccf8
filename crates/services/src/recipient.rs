//! Per-recipient notification fan-out.
//!
//! One fold over the roster yields two positionally aligned sequences: the
//! outgoing push payloads (one per valid device token) and the per-message
//! debug trace returned to the caller for troubleshooting.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::mention::MentionSet;

pub const DEFAULT_KIND: &str = "chat";
pub const DEFAULT_SCREEN: &str = "ChatThreadScreen";

/// Device tokens shorter than this are placeholders, never real registrations.
const MIN_TOKEN_LEN: usize = 11;

/// One chat participant, ids and tokens already coerced at the API boundary.
#[derive(Debug, Clone)]
pub struct Participant {
    pub user_id: String,
    pub name: Option<String>,
    pub tokens: Vec<String>,
}

/// A validated notification request in domain form.
#[derive(Debug, Clone)]
pub struct NotificationInput {
    pub chat_id: String,
    pub sender_id: String,
    pub message: String,
    pub participants: Vec<Participant>,
    pub group_name: Option<String>,
    pub mentioned_user_ids: Vec<String>,
    pub kind: String,
    pub screen: String,
    pub parent_message_id: Option<String>,
}

/// FCM v1 `Message` shape: token, notification, android sound override, data.
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingMessage {
    pub token: String,
    pub notification: PushNotification,
    pub android: AndroidConfig,
    pub data: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PushNotification {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AndroidConfig {
    pub notification: AndroidNotification,
}

#[derive(Debug, Clone, Serialize)]
pub struct AndroidNotification {
    pub sound: String,
}

/// Diagnostic record for one built message, aligned with the dispatch order.
#[derive(Debug, Clone, Serialize)]
pub struct RecipientTrace {
    pub user_id: String,
    pub name: Option<String>,
    pub is_mentioned: bool,
    pub title: String,
    pub body: String,
}

/// Build one message per (participant, valid token) pair, skipping the sender
/// and malformed tokens. Returns the messages and the aligned debug trace;
/// both empty is a normal outcome the caller short-circuits on.
pub fn build_notifications(
    input: &NotificationInput,
    mentions: &MentionSet,
    sound: &str,
) -> (Vec<OutgoingMessage>, Vec<RecipientTrace>) {
    let sender_name = input
        .participants
        .iter()
        .find(|p| p.user_id == input.sender_id)
        .and_then(|p| p.name.as_deref())
        .unwrap_or("Someone");

    let first_mention = mentions.first_mention_display(&input.participants);
    let someone_mentioned = !mentions.explicit_ids().is_empty();

    let mut messages = Vec::new();
    let mut trace = Vec::new();

    for participant in &input.participants {
        if participant.user_id == input.sender_id {
            continue;
        }

        let is_mentioned = mentions.is_mentioned(&participant.user_id, participant.name.as_deref());
        let title = title_for(is_mentioned, input.group_name.as_deref());
        let body = body_for(
            is_mentioned,
            someone_mentioned,
            sender_name,
            first_mention.as_deref(),
            &input.message,
        );

        for token in &participant.tokens {
            if token.len() < MIN_TOKEN_LEN {
                debug!(
                    user_id = %participant.user_id,
                    token_len = token.len(),
                    "Skipping invalid device token"
                );
                continue;
            }

            trace.push(RecipientTrace {
                user_id: participant.user_id.clone(),
                name: participant.name.clone(),
                is_mentioned,
                title: title.clone(),
                body: body.clone(),
            });
            messages.push(OutgoingMessage {
                token: token.clone(),
                notification: PushNotification {
                    title: title.clone(),
                    body: body.clone(),
                },
                android: AndroidConfig {
                    notification: AndroidNotification {
                        sound: sound.to_string(),
                    },
                },
                data: data_for(input, is_mentioned),
            });
        }
    }

    (messages, trace)
}

fn title_for(is_mentioned: bool, group_name: Option<&str>) -> String {
    match (is_mentioned, group_name) {
        (true, Some(group)) => format!("You were mentioned in {group}"),
        (true, None) => "You were mentioned".to_string(),
        (false, Some(group)) => group.to_string(),
        (false, None) => "New Chat Message".to_string(),
    }
}

fn body_for(
    is_mentioned: bool,
    someone_mentioned: bool,
    sender_name: &str,
    first_mention: Option<&str>,
    message: &str,
) -> String {
    if !is_mentioned && someone_mentioned {
        let first = first_mention.unwrap_or("@someone");
        format!("{sender_name} mentioned {first}: {message}")
    } else {
        format!("{sender_name}: {message}")
    }
}

fn data_for(input: &NotificationInput, is_mentioned: bool) -> BTreeMap<String, String> {
    let mut data = BTreeMap::new();
    data.insert("chatId".to_string(), input.chat_id.clone());
    data.insert("type".to_string(), input.kind.clone());
    data.insert("screen".to_string(), input.screen.clone());
    data.insert(
        "isMentioned".to_string(),
        if is_mentioned { "1" } else { "0" }.to_string(),
    );
    if let Some(parent) = input.parent_message_id.as_deref() {
        if !parent.is_empty() {
            data.insert("parentMessageId".to_string(), parent.to_string());
        }
    }
    data
}
