use crate::cli::Args;
use crate::history::{ initialize_history_store, HistoryError, HistoryStore };
use crate::models::chat::TrainingSummary;
use crate::quantum::{ create_executor, Circuit, CircuitExecutor, QuantumError };

use log::{ info, warn };
use std::error::Error;
use std::sync::Arc;
use tokio::task;

pub const STATUS_MESSAGE: &str = "AGI system is online and training...";

/// Request-facing facade over the conversation log and the circuit executor.
/// Built once at startup and cloned into every handler.
#[derive(Clone)]
pub struct AIAgent {
    history_store: Arc<dyn HistoryStore>,
    executor: Arc<dyn CircuitExecutor>,
    default_shots: usize,
    max_shots: usize,
}

impl AIAgent {
    pub fn new(args: &Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let history_store = initialize_history_store(args)?;
        let executor = create_executor(args);
        info!(
            "Quantum executor configured: DefaultShots={}, MaxShots={}, Seed={:?}",
            args.quantum_shots,
            args.quantum_max_shots,
            args.quantum_seed
        );
        Ok(Self::with_parts(history_store, executor, args.quantum_shots, args.quantum_max_shots))
    }

    pub fn with_parts(
        history_store: Arc<dyn HistoryStore>,
        executor: Arc<dyn CircuitExecutor>,
        default_shots: usize,
        max_shots: usize
    ) -> Self {
        Self { history_store, executor, default_shots, max_shots }
    }

    pub fn status(&self) -> &'static str {
        STATUS_MESSAGE
    }

    /// Logs the message and answers with the canned acknowledgement.
    pub async fn respond(&self, text: &str) -> Result<String, HistoryError> {
        self.history_store.append(text).await?;
        Ok(format!("AI is learning: You said '{}'", text))
    }

    pub async fn training_summary(&self) -> Result<TrainingSummary, HistoryError> {
        let records = self.history_store.read_all().await?;
        if records.is_empty() {
            Ok(TrainingSummary::Empty)
        } else {
            Ok(TrainingSummary::Data(records))
        }
    }

    pub fn default_shots(&self) -> usize {
        self.default_shots
    }

    pub fn max_shots(&self) -> usize {
        self.max_shots
    }

    /// Runs the Bell demonstration circuit on the blocking pool.
    pub async fn run_quantum(&self, shots: usize) -> Result<Vec<Vec<u8>>, QuantumError> {
        let executor = Arc::clone(&self.executor);
        task::spawn_blocking(move || executor.run(&Circuit::bell(), shots))
            .await
            .map_err(|e| {
                warn!("Quantum simulation task did not complete: {}", e);
                QuantumError::Task(e.to_string())
            })?
    }
}
