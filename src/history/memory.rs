use async_trait::async_trait;
use crate::history::{ HistoryError, HistoryStore };
use crate::models::chat::ConversationRecord;
use tokio::sync::Mutex;

/// Process-local log, gone on restart.
#[derive(Default)]
pub struct MemoryHistoryStore {
    records: Mutex<Vec<ConversationRecord>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn append(&self, text: &str) -> Result<ConversationRecord, HistoryError> {
        if text.is_empty() {
            return Err(HistoryError::InvalidInput);
        }
        let record = ConversationRecord::new(text);
        self.records.lock().await.push(record.clone());
        Ok(record)
    }

    async fn read_all(&self) -> Result<Vec<ConversationRecord>, HistoryError> {
        Ok(self.records.lock().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn keeps_order_and_rejects_empty() {
        let store = MemoryHistoryStore::new();
        store.append("one").await.unwrap();
        assert!(matches!(store.append("").await, Err(HistoryError::InvalidInput)));
        store.append("two").await.unwrap();
        assert_eq!(
            store.read_all().await.unwrap(),
            vec![ConversationRecord::new("one"), ConversationRecord::new("two")]
        );
    }
}
