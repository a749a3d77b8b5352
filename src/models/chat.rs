use serde::{ Serialize, Deserialize };

/// One submitted user message, persisted as `{"user": "..."}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub user: String,
}

impl ConversationRecord {
    pub fn new(user: impl Into<String>) -> Self {
        Self { user: user.into() }
    }
}

/// Outcome of reading the whole log for the training endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrainingSummary {
    Empty,
    Data(Vec<ConversationRecord>),
}
