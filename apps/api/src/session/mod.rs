//! Editor session: the single owner of the draft and the wizard.
//!
//! Contract: every mutating operation returns the freshly projected `PreviewModel`.
//! Projection is synchronous and runs before the operation returns, so the preview can
//! never lag behind the draft.

pub mod handlers;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::draft::{
    EducationPatch, ExperiencePatch, PersonalField, ResumeDraft, SkillCategory, TemplateId,
};
use crate::enhance::{EnhanceError, EnhanceKind, EnhanceRequest, EnhanceResponse, Enhancer};
use crate::errors::{AppError, DraftError};
use crate::preview::{project, PreviewModel};
use crate::wizard::{Advance, WizardController, WizardView};

/// Text field an enhancement call writes back into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum EnhanceTarget {
    Summary,
    ExperienceDescription { index: u32 },
}

#[derive(Debug, Clone, Serialize)]
pub struct EnhanceOutcome {
    pub target: EnhanceTarget,
    pub applied: bool,
    pub error: Option<String>,
    pub preview: PreviewModel,
}

/// Everything the adapter layer needs to redraw the form.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub draft: ResumeDraft,
    pub preview: PreviewModel,
    pub wizard: WizardView,
    pub busy: Vec<EnhanceTarget>,
}

pub struct EditorSession {
    draft: ResumeDraft,
    wizard: WizardController,
    /// In-flight enhancement calls per target.
    busy: BTreeMap<EnhanceTarget, u32>,
}

impl EditorSession {
    pub fn new(draft: ResumeDraft, total_steps: u8) -> Self {
        Self {
            draft,
            wizard: WizardController::new(total_steps),
            busy: BTreeMap::new(),
        }
    }

    pub fn draft(&self) -> &ResumeDraft {
        &self.draft
    }

    pub fn preview(&self) -> PreviewModel {
        project(&self.draft)
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            draft: self.draft.clone(),
            preview: self.preview(),
            wizard: self.wizard.view(),
            busy: self.busy.keys().copied().collect(),
        }
    }

    /// Replaces the whole draft, e.g. after a restore. Wizard position is kept.
    pub fn replace_draft(&mut self, draft: ResumeDraft) -> PreviewModel {
        self.draft = draft;
        self.preview()
    }

    // ── Personal info & template ────────────────────────────────────────────

    pub fn set_personal(&mut self, edits: &[(PersonalField, String)]) -> PreviewModel {
        for (field, value) in edits {
            self.draft.personal.set(*field, value);
        }
        debug!("Updated {} personal field(s)", edits.len());
        self.preview()
    }

    pub fn set_template(&mut self, template: TemplateId) -> PreviewModel {
        self.draft.template = template;
        debug!("Template set to {template}");
        self.preview()
    }

    // ── Entity collections ──────────────────────────────────────────────────

    pub fn add_experience(&mut self) -> Result<(u32, PreviewModel), DraftError> {
        let index = self.draft.experience.add()?;
        Ok((index, self.preview()))
    }

    pub fn remove_experience(&mut self, index: u32) -> Result<PreviewModel, DraftError> {
        self.draft.experience.remove(index)?;
        Ok(self.preview())
    }

    pub fn edit_experience(
        &mut self,
        index: u32,
        patch: ExperiencePatch,
    ) -> Result<PreviewModel, AppError> {
        let entry = self
            .draft
            .experience
            .get_mut(index)
            .ok_or_else(|| AppError::NotFound(format!("experience entry {index}")))?;
        patch.apply(entry)?;
        Ok(self.preview())
    }

    pub fn add_education(&mut self) -> Result<(u32, PreviewModel), DraftError> {
        let index = self.draft.education.add()?;
        Ok((index, self.preview()))
    }

    pub fn remove_education(&mut self, index: u32) -> Result<PreviewModel, DraftError> {
        self.draft.education.remove(index)?;
        Ok(self.preview())
    }

    pub fn edit_education(
        &mut self,
        index: u32,
        patch: EducationPatch,
    ) -> Result<PreviewModel, AppError> {
        let entry = self
            .draft
            .education
            .get_mut(index)
            .ok_or_else(|| AppError::NotFound(format!("education entry {index}")))?;
        patch.apply(entry)?;
        Ok(self.preview())
    }

    // ── Skills ──────────────────────────────────────────────────────────────

    pub fn add_skill(&mut self, category: SkillCategory, raw: &str) -> PreviewModel {
        if self.draft.skills.add(category, raw) {
            debug!("Added {category} skill '{}'", raw.trim());
        }
        self.preview()
    }

    pub fn remove_skill(
        &mut self,
        category: SkillCategory,
        position: usize,
    ) -> Result<PreviewModel, DraftError> {
        let removed = self.draft.skills.remove(category, position)?;
        debug!("Removed {category} skill '{removed}'");
        Ok(self.preview())
    }

    // ── Wizard ──────────────────────────────────────────────────────────────

    pub fn advance(&mut self) -> Advance {
        self.wizard.advance()
    }

    pub fn retreat(&mut self) -> WizardView {
        self.wizard.retreat();
        self.wizard.view()
    }

    pub fn go_to(&mut self, step: i64) -> Result<WizardView, DraftError> {
        self.wizard.go_to(step)?;
        Ok(self.wizard.view())
    }

    pub fn wizard(&self) -> WizardView {
        self.wizard.view()
    }

    // ── Enhancement ─────────────────────────────────────────────────────────

    /// Captures the text to send and marks `target` busy. The draft is not touched.
    pub fn begin_enhancement(&mut self, target: EnhanceTarget) -> Result<EnhanceRequest, AppError> {
        let request = match target {
            EnhanceTarget::Summary => EnhanceRequest {
                kind: EnhanceKind::Summary,
                text: self
                    .draft
                    .personal
                    .get(PersonalField::Summary)
                    .unwrap_or_default()
                    .to_string(),
                context: self
                    .draft
                    .personal
                    .get(PersonalField::JobTitle)
                    .map(str::to_string),
            },
            EnhanceTarget::ExperienceDescription { index } => {
                let entry = self
                    .draft
                    .experience
                    .get(index)
                    .ok_or_else(|| AppError::NotFound(format!("experience entry {index}")))?;
                EnhanceRequest {
                    kind: EnhanceKind::Bullet,
                    text: entry.description.clone(),
                    context: None,
                }
            }
        };
        *self.busy.entry(target).or_insert(0) += 1;
        Ok(request)
    }

    /// Clears the busy mark and writes the improved text back on success. Any failure,
    /// or a target that disappeared meanwhile, leaves the draft exactly as it was.
    pub fn finish_enhancement(
        &mut self,
        target: EnhanceTarget,
        result: Result<EnhanceResponse, EnhanceError>,
    ) -> EnhanceOutcome {
        self.release(target);

        let applied = match result {
            Ok(response) if !response.improved.trim().is_empty() => {
                self.write_enhanced(target, response.improved)
            }
            Ok(_) => Err(DraftError::CollaboratorFailure(
                EnhanceError::EmptyContent.to_string(),
            )),
            Err(e) => Err(DraftError::CollaboratorFailure(e.to_string())),
        };

        let error = match applied {
            Ok(()) => None,
            Err(e) => {
                warn!("Enhancement of {target:?} not applied: {e}");
                Some(e.to_string())
            }
        };
        EnhanceOutcome {
            target,
            applied: error.is_none(),
            error,
            preview: self.preview(),
        }
    }

    /// Drops one in-flight call on `target`; the mark clears when none remain.
    fn release(&mut self, target: EnhanceTarget) {
        if let Some(count) = self.busy.get_mut(&target) {
            *count -= 1;
            if *count == 0 {
                self.busy.remove(&target);
            }
        }
    }

    fn write_enhanced(&mut self, target: EnhanceTarget, text: String) -> Result<(), DraftError> {
        match target {
            EnhanceTarget::Summary => {
                self.draft.personal.set(PersonalField::Summary, &text);
                Ok(())
            }
            EnhanceTarget::ExperienceDescription { index } => {
                let entry = self.draft.experience.get_mut(index).ok_or_else(|| {
                    DraftError::CollaboratorFailure(format!(
                        "experience entry {index} was removed while enhancing"
                    ))
                })?;
                entry.description = text;
                Ok(())
            }
        }
    }
}

/// Releases the busy mark of a call that never reached `finish_enhancement`, e.g. when
/// the client disconnects and the handler future is dropped mid-call.
struct InFlight {
    session: Arc<Mutex<EditorSession>>,
    target: EnhanceTarget,
    armed: bool,
}

impl InFlight {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        debug!("Enhancement of {:?} cancelled", self.target);
        if let Ok(mut session) = self.session.try_lock() {
            session.release(self.target);
            return;
        }
        let session = Arc::clone(&self.session);
        let target = self.target;
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                session.lock().await.release(target);
            });
        }
    }
}

/// Runs one enhancement round-trip without holding the session lock across the call.
///
/// Overlapping requests on the same target are tolerated: whichever response returns
/// last wins, and the target stays busy until every request has returned. A call dropped
/// before it completes leaves the draft untouched and clears its busy mark.
pub async fn enhance(
    session: &Arc<Mutex<EditorSession>>,
    enhancer: &dyn Enhancer,
    target: EnhanceTarget,
) -> Result<EnhanceOutcome, AppError> {
    let request = session.lock().await.begin_enhancement(target)?;
    let in_flight = InFlight {
        session: Arc::clone(session),
        target,
        armed: true,
    };
    info!("Requesting {:?} enhancement for {target:?}", request.kind);
    let result = enhancer.enhance(&request).await;

    let mut session = session.lock().await;
    in_flight.disarm();
    Ok(session.finish_enhancement(target, result))
}
