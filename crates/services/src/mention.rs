//! Mention extraction from chat message text.
//!
//! Turns a free-text message plus an optional client-resolved id list into a
//! [`MentionSet`] that downstream code queries per recipient. Matching is
//! deliberately fuzzy: `@John` mentions a participant named "John Smith".

use std::sync::LazyLock;

use regex::Regex;

use crate::recipient::Participant;

/// `@`, optional whitespace, then up to 50 chars of name-ish characters.
/// The class includes space so multi-word names (`@John Smith`) survive.
static MENTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@\s?([A-Za-z0-9_. -]{1,50})").expect("valid mention pattern"));

const TRAILING_PUNCTUATION: [char; 8] = ['.', ',', '!', '?', ';', ':', '(', ')'];

/// Normalize a display name or mention fragment for comparison.
///
/// Lowercases, collapses whitespace runs to a single space, and strips any
/// trailing mix of punctuation and whitespace so `"Bob ,"` and `"bob"` compare
/// equal. Idempotent.
pub fn normalize_name(raw: &str) -> String {
    let collapsed = raw
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    collapsed
        .trim_end_matches(|c: char| c.is_whitespace() || TRAILING_PUNCTUATION.contains(&c))
        .to_string()
}

/// Extract normalized `@name` fragments from a message, deduplicated,
/// in order of first occurrence.
pub fn parse_mentions(message: &str) -> Vec<String> {
    let mut names = Vec::new();
    for cap in MENTION_PATTERN.captures_iter(message) {
        if let Some(fragment) = cap.get(1) {
            let name = normalize_name(fragment.as_str());
            if !name.is_empty() && !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Trailing punctuation stripped but case preserved, for display copy.
fn display_name(raw: &str) -> &str {
    raw.trim()
        .trim_end_matches(|c: char| c.is_whitespace() || TRAILING_PUNCTUATION.contains(&c))
}

/// The mention state of one message: explicit ids (client-supplied or derived
/// from the roster) plus the raw parsed name fragments.
#[derive(Debug, Clone, Default)]
pub struct MentionSet {
    explicit_ids: Vec<String>,
    parsed_names: Vec<String>,
    /// True when `explicit_ids` came from the client. A client-supplied list
    /// is authoritative: name matching must not add recipients to it.
    from_client: bool,
}

impl MentionSet {
    /// Reconcile the message text and the client's id list against the roster.
    ///
    /// A non-empty `mentioned_user_ids` is taken verbatim. Only when it is
    /// empty are ids derived from `@name` parsing: a participant qualifies if
    /// their normalized name equals a fragment or extends it as a prefix
    /// (`@John` -> "John Smith").
    pub fn resolve(
        message: &str,
        mentioned_user_ids: &[String],
        participants: &[Participant],
    ) -> Self {
        let parsed_names = parse_mentions(message);
        let mut explicit_ids: Vec<String> = mentioned_user_ids.to_vec();
        let from_client = !explicit_ids.is_empty();

        if !from_client && !parsed_names.is_empty() {
            for participant in participants {
                let Some(name) = participant.name.as_deref() else {
                    continue;
                };
                let normalized = normalize_name(name);
                if normalized.is_empty() {
                    continue;
                }
                let matched = parsed_names
                    .iter()
                    .any(|fragment| normalized == *fragment || normalized.starts_with(fragment.as_str()));
                if matched && !explicit_ids.contains(&participant.user_id) {
                    explicit_ids.push(participant.user_id.clone());
                }
            }
        }

        Self {
            explicit_ids,
            parsed_names,
            from_client,
        }
    }

    pub fn explicit_ids(&self) -> &[String] {
        &self.explicit_ids
    }

    pub fn parsed_names(&self) -> &[String] {
        &self.parsed_names
    }

    /// No mention signal at all, neither ids nor parsed fragments.
    pub fn is_empty(&self) -> bool {
        self.explicit_ids.is_empty() && self.parsed_names.is_empty()
    }

    /// Whether this recipient was mentioned.
    ///
    /// Id membership wins. The name-based fallback applies only when the id
    /// list was not supplied by the client; it accepts containment in either
    /// direction, so a fragment that swallowed trailing words
    /// (`@Bob please check this`) still hits a participant named "Bob".
    pub fn is_mentioned(&self, user_id: &str, name: Option<&str>) -> bool {
        if self.explicit_ids.iter().any(|id| id == user_id) {
            return true;
        }
        if self.from_client || self.parsed_names.is_empty() {
            return false;
        }
        let Some(name) = name else {
            return false;
        };
        let normalized = normalize_name(name);
        !normalized.is_empty() && self.name_matches(&normalized)
    }

    fn name_matches(&self, normalized: &str) -> bool {
        self.parsed_names
            .iter()
            .any(|fragment| normalized.contains(fragment.as_str()) || fragment.contains(normalized))
    }

    /// Display string for the first mentioned person, e.g. `"@John Smith"`.
    ///
    /// `None` when the message mentions nobody. Falls back to the literal
    /// `"@someone"` when a mention exists but no roster name resolves.
    pub fn first_mention_display(&self, participants: &[Participant]) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        let by_id = self
            .explicit_ids
            .first()
            .and_then(|id| participants.iter().find(|p| p.user_id == *id));

        let resolved = by_id.or_else(|| {
            participants.iter().find(|p| {
                p.name.as_deref().is_some_and(|name| {
                    let normalized = normalize_name(name);
                    !normalized.is_empty() && self.name_matches(&normalized)
                })
            })
        });

        let display = resolved
            .and_then(|p| p.name.as_deref())
            .map(|name| format!("@{}", display_name(name)));

        Some(display.unwrap_or_else(|| "@someone".to_string()))
    }
}
