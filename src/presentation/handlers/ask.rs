use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use crate::application::ports::Row;
use crate::presentation::state::AppState;

#[derive(Deserialize)]
pub struct AskParams {
    pub q: String,
}

#[derive(Serialize)]
pub struct AskResponse {
    pub query: String,
    pub sql_query: String,
    pub result: Vec<Row>,
}

#[tracing::instrument(skip(state, params), fields(question = %params.q))]
pub async fn ask_handler(
    State(state): State<AppState>,
    Query(params): Query<AskParams>,
) -> impl IntoResponse {
    let outcome = state.record_service.query(&params.q).await;

    tracing::info!(rows = outcome.result.len(), "Question answered");

    (
        StatusCode::OK,
        Json(AskResponse {
            query: params.q,
            sql_query: outcome.sql_query,
            result: outcome.result,
        }),
    )
}
