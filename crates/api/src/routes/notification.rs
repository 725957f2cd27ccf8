use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use chatpush_services::mention::MentionSet;
use chatpush_services::recipient::{
    DEFAULT_KIND, DEFAULT_SCREEN, NotificationInput, Participant, build_notifications,
};

use crate::{error::ApiError, state::AppState};

/// An id on the wire may be a JSON string or a number; either way it is
/// compared as a string from here on.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Text(String),
    Number(i64),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            WireId::Text(s) => s,
            WireId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireParticipant {
    pub user_id: Option<WireId>,
    pub name: Option<String>,
    /// A single token, an array of tokens, or absent.
    #[serde(default)]
    pub fcm_token: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatNotificationRequest {
    pub chat_id: Option<WireId>,
    pub sender_id: Option<WireId>,
    pub message: Option<String>,
    pub participants: Option<Vec<WireParticipant>>,
    pub group_name: Option<String>,
    #[serde(default)]
    pub mentioned_user_ids: Vec<WireId>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub screen: Option<String>,
    pub parent_message_id: Option<WireId>,
}

pub async fn send_chat(
    State(state): State<AppState>,
    Json(body): Json<ChatNotificationRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut missing = Vec::new();
    if body.chat_id.is_none() {
        missing.push("chatId");
    }
    if body.sender_id.is_none() {
        missing.push("senderId");
    }
    if body.message.as_deref().is_none_or(str::is_empty) {
        missing.push("message");
    }
    if body.participants.is_none() {
        missing.push("participants");
    }
    if !missing.is_empty() {
        warn!(?missing, "Rejecting chat notification request");
        return Err(ApiError::BadRequest(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let input = to_input(body);
    info!(
        chat_id = %input.chat_id,
        sender_id = %input.sender_id,
        participants = input.participants.len(),
        group = ?input.group_name,
        "Chat notification request"
    );

    let mentions = MentionSet::resolve(&input.message, &input.mentioned_user_ids, &input.participants);
    debug!(
        explicit = mentions.explicit_ids().len(),
        parsed = mentions.parsed_names().len(),
        "Resolved mentions"
    );

    let (messages, trace) = build_notifications(&input, &mentions, &state.settings.fcm.sound);
    info!(prepared = messages.len(), "Prepared notification messages");

    if messages.is_empty() {
        return Ok(Json(serde_json::json!({
            "success": true,
            "message": "No valid tokens to send",
            "debug": trace,
        })));
    }

    let response = state.push.send_batch(&messages).await.map_err(|e| {
        error!(error = %e, "Push batch dispatch failed");
        ApiError::Internal("Failed to send chat notification".to_string())
    })?;
    info!(
        success = response.success_count,
        failure = response.failure_count,
        "Chat notification dispatched"
    );

    Ok(Json(serde_json::json!({
        "success": true,
        "response": response,
        "debug": trace,
    })))
}

/// Coerce the untyped wire payload into the domain form: ids stringified
/// once, token unions flattened to a sequence, defaults applied.
fn to_input(body: ChatNotificationRequest) -> NotificationInput {
    let participants = body
        .participants
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| {
            let Some(user_id) = p.user_id else {
                warn!("Dropping participant without userId");
                return None;
            };
            Some(Participant {
                user_id: user_id.into_string(),
                name: p.name,
                tokens: collect_tokens(&p.fcm_token),
            })
        })
        .collect();

    NotificationInput {
        chat_id: body.chat_id.expect("validated").into_string(),
        sender_id: body.sender_id.expect("validated").into_string(),
        message: body.message.expect("validated"),
        participants,
        group_name: body.group_name.filter(|g| !g.is_empty()),
        mentioned_user_ids: body
            .mentioned_user_ids
            .into_iter()
            .map(WireId::into_string)
            .collect(),
        kind: body.kind.unwrap_or_else(|| DEFAULT_KIND.to_string()),
        screen: body.screen.unwrap_or_else(|| DEFAULT_SCREEN.to_string()),
        parent_message_id: body.parent_message_id.map(WireId::into_string),
    }
}

fn collect_tokens(value: &Value) -> Vec<String> {
    match value {
        Value::String(token) => vec![token.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}
