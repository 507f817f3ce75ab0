pub mod config;
pub mod error;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use error::ApiError;
use ledger_core::{BigInt, Block, CancelToken, Ledger, Transaction};
use serde::Serialize;
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use tower_http::trace::TraceLayer;
use tracing::warn;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
    pub mine_timeout: Option<Duration>,
}

impl AppState {
    pub fn new(ledger: Ledger, mine_timeout: Option<Duration>) -> Self {
        Self {
            ledger: Arc::new(ledger),
            mine_timeout,
        }
    }
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

#[derive(Serialize)]
struct ChainBody {
    chain: Vec<Block>,
}

#[derive(Serialize)]
struct MinedNonce(#[serde(with = "ledger_core::block::nonce_serde")] BigInt);

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(Health { status: "ok" }) }))
        .route("/blockchain", get(get_chain))
        .route("/blockchain/", get(get_chain))
        .route("/blockchain/transactions", post(submit_transaction))
        .route("/blockchain/mine", get(mine))
        .route("/blockchain/verifyChain", get(verify_chain))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn get_chain(State(state): State<AppState>) -> Json<ChainBody> {
    let chain = state
        .ledger
        .chain_snapshot()
        .iter()
        .map(|block| Block::clone(block))
        .collect();
    Json(ChainBody { chain })
}

async fn submit_transaction(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Transaction>, ApiError> {
    let Json(payload) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    Ok(Json(state.ledger.submit_payload(payload)?))
}

async fn mine(State(state): State<AppState>) -> Result<Json<MinedNonce>, ApiError> {
    let cancel = CancelToken::new();
    let ledger = state.ledger.clone();
    let worker_cancel = cancel.clone();
    let worker = tokio::task::spawn_blocking(move || ledger.mine_next_block_with(&worker_cancel));

    let joined = match state.mine_timeout {
        Some(limit) => match tokio::time::timeout(limit, worker).await {
            Ok(joined) => joined,
            Err(_) => {
                // the worker stops at its next attempt; a proof found before it
                // sees the flag is still appended as a complete block
                cancel.cancel();
                warn!(?limit, "mining request timed out");
                return Err(ApiError::MiningTimedOut(limit));
            }
        },
        None => worker.await,
    };
    let nonce = joined.map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(Json(MinedNonce(nonce)))
}

async fn verify_chain(State(state): State<AppState>) -> Json<bool> {
    Json(state.ledger.validate_chain())
}
