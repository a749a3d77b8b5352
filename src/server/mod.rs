pub mod api;

pub use api::build_router;

use crate::agent::AIAgent;
use log::{ info, error };
use std::error::Error;
use tokio::net::TcpListener;

pub struct Server {
    addr: String,
    agent: AIAgent,
}

impl Server {
    pub fn new(addr: String, agent: AIAgent) -> Self {
        Self { addr, agent }
    }

    /// Serves until Ctrl-C, then drains in-flight requests.
    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let listener = TcpListener::bind(&self.addr).await.map_err(|e|
            format!("Failed to bind HTTP server to {}: {}. Try a different port.", self.addr, e)
        )?;
        info!("HTTP server listening on: http://{}", listener.local_addr()?);

        let app = build_router(self.agent.clone());
        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("HTTP server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
