//! Axum route handlers for the draft, wizard, persistence and finalize APIs.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::draft::{EducationPatch, ExperiencePatch, PersonalField, SkillCategory, TemplateId};
use crate::errors::AppError;
use crate::persistence::{load_draft, save_draft};
use crate::preview::PreviewModel;
use crate::render::{finalize, FinalizeResponse};
use crate::session::SessionView;
use crate::state::AppState;
use crate::wizard::{Advance, WizardView};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TemplateRequest {
    pub template: String,
}

#[derive(Debug, Deserialize)]
pub struct SkillRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub preview: PreviewModel,
}

#[derive(Debug, Serialize)]
pub struct AddEntryResponse {
    pub index: u32,
    pub preview: PreviewModel,
}

#[derive(Debug, Serialize)]
pub struct AdvanceResponse {
    #[serde(flatten)]
    pub outcome: Advance,
    pub wizard: WizardView,
    pub finalized: Option<FinalizeResponse>,
}

#[derive(Debug, Serialize)]
pub struct LoadResponse {
    pub restored: bool,
    pub preview: PreviewModel,
}

fn parse_category(raw: &str) -> Result<SkillCategory, AppError> {
    raw.parse().map_err(AppError::Validation)
}

fn preview(preview: PreviewModel) -> Json<PreviewResponse> {
    Json(PreviewResponse { preview })
}

// ────────────────────────────────────────────────────────────────────────────
// Draft
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/draft
pub async fn handle_get_draft(State(state): State<AppState>) -> Json<SessionView> {
    Json(state.session.lock().await.view())
}

/// GET /api/v1/preview
pub async fn handle_get_preview(State(state): State<AppState>) -> Json<PreviewResponse> {
    preview(state.session.lock().await.preview())
}

/// PATCH /api/v1/draft/personal
///
/// Body is a map of field name to new value, e.g. `{"first_name": "Ada"}`.
/// Unknown field names reject the whole edit.
pub async fn handle_edit_personal(
    State(state): State<AppState>,
    Json(req): Json<HashMap<String, String>>,
) -> Result<Json<PreviewResponse>, AppError> {
    let edits = req
        .into_iter()
        .map(|(name, value)| {
            name.parse::<PersonalField>()
                .map(|field| (field, value))
                .map_err(AppError::Validation)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(preview(state.session.lock().await.set_personal(&edits)))
}

/// PUT /api/v1/draft/template
pub async fn handle_set_template(
    State(state): State<AppState>,
    Json(req): Json<TemplateRequest>,
) -> Result<Json<PreviewResponse>, AppError> {
    let template: TemplateId = req.template.parse().map_err(AppError::Validation)?;
    Ok(preview(state.session.lock().await.set_template(template)))
}

/// POST /api/v1/draft/experience
pub async fn handle_add_experience(
    State(state): State<AppState>,
) -> Result<Json<AddEntryResponse>, AppError> {
    let (index, preview) = state.session.lock().await.add_experience()?;
    Ok(Json(AddEntryResponse { index, preview }))
}

/// PATCH /api/v1/draft/experience/:index
pub async fn handle_edit_experience(
    State(state): State<AppState>,
    Path(index): Path<u32>,
    Json(patch): Json<ExperiencePatch>,
) -> Result<Json<PreviewResponse>, AppError> {
    Ok(preview(
        state.session.lock().await.edit_experience(index, patch)?,
    ))
}

/// DELETE /api/v1/draft/experience/:index
pub async fn handle_remove_experience(
    State(state): State<AppState>,
    Path(index): Path<u32>,
) -> Result<Json<PreviewResponse>, AppError> {
    Ok(preview(state.session.lock().await.remove_experience(index)?))
}

/// POST /api/v1/draft/education
pub async fn handle_add_education(
    State(state): State<AppState>,
) -> Result<Json<AddEntryResponse>, AppError> {
    let (index, preview) = state.session.lock().await.add_education()?;
    Ok(Json(AddEntryResponse { index, preview }))
}

/// PATCH /api/v1/draft/education/:index
pub async fn handle_edit_education(
    State(state): State<AppState>,
    Path(index): Path<u32>,
    Json(patch): Json<EducationPatch>,
) -> Result<Json<PreviewResponse>, AppError> {
    Ok(preview(
        state.session.lock().await.edit_education(index, patch)?,
    ))
}

/// DELETE /api/v1/draft/education/:index
pub async fn handle_remove_education(
    State(state): State<AppState>,
    Path(index): Path<u32>,
) -> Result<Json<PreviewResponse>, AppError> {
    Ok(preview(state.session.lock().await.remove_education(index)?))
}

/// POST /api/v1/draft/skills/:category
pub async fn handle_add_skill(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Json(req): Json<SkillRequest>,
) -> Result<Json<PreviewResponse>, AppError> {
    let category = parse_category(&category)?;
    Ok(preview(
        state.session.lock().await.add_skill(category, &req.text),
    ))
}

/// DELETE /api/v1/draft/skills/:category/:position
pub async fn handle_remove_skill(
    State(state): State<AppState>,
    Path((category, position)): Path<(String, usize)>,
) -> Result<Json<PreviewResponse>, AppError> {
    let category = parse_category(&category)?;
    Ok(preview(
        state.session.lock().await.remove_skill(category, position)?,
    ))
}

// ────────────────────────────────────────────────────────────────────────────
// Persistence & finalize
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/draft/save
pub async fn handle_save(State(state): State<AppState>) -> Result<Json<PreviewResponse>, AppError> {
    let session = state.session.lock().await;
    save_draft(state.store.as_ref(), session.draft())?;
    Ok(preview(session.preview()))
}

/// POST /api/v1/draft/load
///
/// A missing record is not an error: the current draft is kept and `restored` is false.
pub async fn handle_load(State(state): State<AppState>) -> Result<Json<LoadResponse>, AppError> {
    let restored = load_draft(state.store.as_ref())?;
    let mut session = state.session.lock().await;
    let response = match restored {
        Some(draft) => LoadResponse {
            restored: true,
            preview: session.replace_draft(draft),
        },
        None => LoadResponse {
            restored: false,
            preview: session.preview(),
        },
    };
    Ok(Json(response))
}

/// POST /api/v1/draft/finalize
pub async fn handle_finalize(State(state): State<AppState>) -> Json<FinalizeResponse> {
    let snapshot = state.session.lock().await.draft().clone();
    Json(finalize(&snapshot, state.render_sink.as_deref()).await)
}

// ────────────────────────────────────────────────────────────────────────────
// Wizard
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/wizard/advance
///
/// On the last step this hands the draft to the render sink instead of moving.
pub async fn handle_advance(State(state): State<AppState>) -> Json<AdvanceResponse> {
    let (outcome, wizard, snapshot) = {
        let mut session = state.session.lock().await;
        let outcome = session.advance();
        let snapshot = (outcome == Advance::Finalize).then(|| session.draft().clone());
        (outcome, session.wizard(), snapshot)
    };
    let finalized = match snapshot {
        Some(draft) => {
            info!("Advance on last step: finalizing draft");
            Some(finalize(&draft, state.render_sink.as_deref()).await)
        }
        None => None,
    };
    Json(AdvanceResponse {
        outcome,
        wizard,
        finalized,
    })
}

/// POST /api/v1/wizard/retreat
pub async fn handle_retreat(State(state): State<AppState>) -> Json<WizardView> {
    Json(state.session.lock().await.retreat())
}

/// PUT /api/v1/wizard/step/:step
pub async fn handle_go_to_step(
    State(state): State<AppState>,
    Path(step): Path<i64>,
) -> Result<Json<WizardView>, AppError> {
    Ok(Json(state.session.lock().await.go_to(step)?))
}
