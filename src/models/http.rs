use serde::{ Serialize, Deserialize };
use serde_json::Value;

use super::chat::ConversationRecord;

/// Body of `POST /message`. `text` is kept as a raw value so a missing,
/// null or non-string field can be rejected with the fixed error message.
#[derive(Deserialize, Debug, Default)]
pub struct MessageRequest {
    #[serde(default)]
    pub text: Option<Value>,
}

impl MessageRequest {
    pub fn text(&self) -> Option<&str> {
        match &self.text {
            Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct QuantumQuery {
    pub shots: Option<usize>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct StatusResponse {
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub response: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct QuantumResponse {
    pub quantum_result: Vec<Vec<u8>>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TrainResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_data: Option<Vec<ConversationRecord>>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}
