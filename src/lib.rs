pub mod agent;
pub mod cli;
pub mod history;
pub mod models;
pub mod quantum;
pub mod server;

use agent::AIAgent;
use cli::Args;
use log::info;
use server::Server;
use std::error::Error;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("History Store Type: {}", args.history_type);
    info!("History Path: {}", args.history_path);
    info!("Quantum Shots: {}", args.quantum_shots);
    info!("Quantum Max Shots: {}", args.quantum_max_shots);
    if let Some(seed) = args.quantum_seed {
        info!("Quantum Seed: {}", seed);
    }
    info!("Debug: {}", args.debug);
    info!("-------------------------");

    let agent = AIAgent::new(&args)?;
    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, agent);
    server.run().await?;

    Ok(())
}
