use crate::agent::AIAgent;
use crate::history::HistoryError;
use crate::models::chat::TrainingSummary;
use crate::models::http::{
    ErrorResponse,
    MessageRequest,
    MessageResponse,
    QuantumQuery,
    QuantumResponse,
    StatusResponse,
    TrainResponse,
};
use axum::{
    body::Bytes,
    extract::{ rejection::QueryRejection, Query, State },
    http::StatusCode,
    response::{ IntoResponse, Response },
    routing::{ get, post },
    Json,
    Router,
};
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, warn, error };

const INVALID_INPUT: &str = "Invalid input";

#[derive(Clone)]
struct AppState {
    agent: AIAgent,
}

/// Builds the full route table with permissive CORS on every route.
pub fn build_router(agent: AIAgent) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/status", get(status_handler))
        .route("/quantum", get(quantum_handler))
        .route("/message", post(message_handler))
        .route("/train", post(train_handler))
        .layer(cors)
        .with_state(AppState { agent })
}

fn error_response(code: StatusCode, message: impl Into<String>) -> Response {
    (code, Json(ErrorResponse::new(message))).into_response()
}

async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(StatusResponse { message: state.agent.status().to_string() })
}

async fn quantum_handler(
    State(state): State<AppState>,
    query: Result<Query<QuantumQuery>, QueryRejection>
) -> Response {
    let shots = match query {
        Ok(Query(q)) => q.shots.unwrap_or(state.agent.default_shots()),
        Err(e) => {
            warn!("Rejected /quantum query: {}", e);
            return error_response(StatusCode::BAD_REQUEST, format!("Invalid shots: {}", e.body_text()));
        }
    };

    if shots == 0 || shots > state.agent.max_shots() {
        warn!("Rejected /quantum shot count {}", shots);
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("Invalid shots: {} (expected 1..={})", shots, state.agent.max_shots())
        );
    }

    info!("Running quantum circuit with {} shot(s)", shots);
    match state.agent.run_quantum(shots).await {
        Ok(quantum_result) => Json(QuantumResponse { quantum_result }).into_response(),
        Err(e) => {
            error!("Quantum simulation failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn message_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let request = match serde_json::from_slice::<MessageRequest>(&body) {
        Ok(req) => req,
        Err(e) => {
            warn!("Rejected /message body: {}", e);
            return error_response(StatusCode::BAD_REQUEST, INVALID_INPUT);
        }
    };

    let Some(text) = request.text() else {
        warn!("Rejected /message without a usable 'text' field");
        return error_response(StatusCode::BAD_REQUEST, INVALID_INPUT);
    };

    info!("Received message ({} bytes)", text.len());
    match state.agent.respond(text).await {
        Ok(response) => Json(MessageResponse { response }).into_response(),
        Err(HistoryError::InvalidInput) => error_response(StatusCode::BAD_REQUEST, INVALID_INPUT),
        Err(e) => {
            error!("Failed to log message: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn train_handler(State(state): State<AppState>) -> Response {
    match state.agent.training_summary().await {
        Ok(TrainingSummary::Empty) => {
            info!("Training requested with an empty conversation log");
            Json(TrainResponse {
                message: "No training data yet.".into(),
                training_data: None,
            }).into_response()
        }
        Ok(TrainingSummary::Data(records)) => {
            info!("Training requested over {} record(s)", records.len());
            Json(TrainResponse {
                message: "AGI is learning from data!".into(),
                training_data: Some(records),
            }).into_response()
        }
        Err(e) => {
            error!("Failed to read conversation log: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
