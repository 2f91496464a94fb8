//! Axum route handlers for text enhancement.
//!
//! Collaborator failures never produce an error status: the response says
//! `applied: false` and the draft is unchanged.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::enhance::AiStatus;
use crate::errors::AppError;
use crate::session::{enhance, EnhanceOutcome, EnhanceTarget};
use crate::state::AppState;

/// POST /api/v1/enhance/summary
pub async fn handle_enhance_summary(
    State(state): State<AppState>,
) -> Result<Json<EnhanceOutcome>, AppError> {
    let outcome = enhance(&state.session, state.enhancer.as_ref(), EnhanceTarget::Summary).await?;
    Ok(Json(outcome))
}

/// POST /api/v1/enhance/experience/:index
pub async fn handle_enhance_experience(
    State(state): State<AppState>,
    Path(index): Path<u32>,
) -> Result<Json<EnhanceOutcome>, AppError> {
    let outcome = enhance(
        &state.session,
        state.enhancer.as_ref(),
        EnhanceTarget::ExperienceDescription { index },
    )
    .await?;
    Ok(Json(outcome))
}

/// GET /api/v1/ai-status
pub async fn handle_ai_status(State(state): State<AppState>) -> Json<AiStatus> {
    Json(state.enhancer.status())
}
