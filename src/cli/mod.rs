use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- History Store Args ---
    /// History chat store type (file, memory)
    #[arg(long, env = "HISTORY_TYPE", default_value = "file")]
    pub history_type: String,

    /// Path of the JSON file holding the conversation log (file store only).
    #[arg(long, env = "HISTORY_PATH", default_value = "chat_history.json")]
    pub history_path: String,

    // --- Quantum Simulator Args ---
    /// Number of shots used by GET /quantum when the request does not ask for one.
    #[arg(long, env = "QUANTUM_SHOTS", default_value = "100")]
    pub quantum_shots: usize,

    /// Largest shot count a client may request through `?shots=`.
    #[arg(long, env = "QUANTUM_MAX_SHOTS", default_value = "10000")]
    pub quantum_max_shots: usize,

    /// Fixed RNG seed for measurement sampling. Unset means OS entropy.
    #[arg(long, env = "QUANTUM_SEED")]
    pub quantum_seed: Option<u64>,

    // --- General App Args ---
    /// Host address and port for the HTTP server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "0.0.0.0:5001")]
    pub server_addr: String,

    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            history_type: "file".to_string(),
            history_path: "chat_history.json".to_string(),
            quantum_shots: 100,
            quantum_max_shots: 10_000,
            quantum_seed: None,
            server_addr: "0.0.0.0:5001".to_string(),
            debug: false,
        }
    }
}
