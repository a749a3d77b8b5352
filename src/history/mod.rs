mod file;
mod memory;

pub use file::FileHistoryStore;
pub use memory::MemoryHistoryStore;

use async_trait::async_trait;
use log::info;
use std::error::Error as StdError;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use crate::cli::Args;
use crate::models::chat::ConversationRecord;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Invalid input")]
    InvalidInput,
    #[error("History file IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("History serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to replace history file: {0}")]
    Persist(#[from] tempfile::PersistError),
    #[error("History task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Append-only conversation log. Records come back in arrival order.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Appends one record. Empty text is rejected without touching the log.
    async fn append(&self, text: &str) -> Result<ConversationRecord, HistoryError>;

    async fn read_all(&self) -> Result<Vec<ConversationRecord>, HistoryError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryType {
    File,
    Memory,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseHistoryTypeError {
    message: String,
}

impl fmt::Display for ParseHistoryTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseHistoryTypeError {}

impl FromStr for HistoryType {
    type Err = ParseHistoryTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(HistoryType::File),
            "memory" => Ok(HistoryType::Memory),
            _ =>
                Err(ParseHistoryTypeError {
                    message: format!("Unsupported history store type: '{}'", s),
                }),
        }
    }
}

pub fn create_history_store(
    args: &Args
) -> Result<Arc<dyn HistoryStore>, Box<dyn StdError + Send + Sync>> {
    match args.history_type.parse::<HistoryType>()? {
        HistoryType::File => {
            let store = FileHistoryStore::open(&args.history_path)?;
            Ok(Arc::new(store))
        }
        HistoryType::Memory => Ok(Arc::new(MemoryHistoryStore::new())),
    }
}

pub fn initialize_history_store(
    args: &Args
) -> Result<Arc<dyn HistoryStore>, Box<dyn StdError + Send + Sync>> {
    match args.history_type.parse::<HistoryType>() {
        Ok(HistoryType::File) => info!("Chat history will be stored in: {}", args.history_path),
        Ok(HistoryType::Memory) => info!("Chat history will be kept in memory only"),
        Err(_) => {}
    }
    create_history_store(args)
}
