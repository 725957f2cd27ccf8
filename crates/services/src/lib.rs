pub mod mention;
pub mod push;
pub mod recipient;

pub use mention::MentionSet;
pub use push::{BatchResponse, FcmClient, PushError, PushSend, SendOutcome};
pub use recipient::{NotificationInput, OutgoingMessage, Participant, RecipientTrace};
