// Resume draft model: the single source of truth for an editing session.
// The preview is always derived from it (see `preview::project`), never edited directly.

pub mod collection;
pub mod education;
pub mod experience;
pub mod personal;
pub mod skills;
pub mod template;

use serde::Serialize;
use thiserror::Error;

pub use collection::{Entity, EntityCollection};
pub use education::{EducationEntry, EducationPatch};
pub use experience::{EndDate, ExperienceEntry, ExperiencePatch, YearMonth};
pub use personal::{PersonalField, PersonalInfo};
pub use skills::{SkillCategory, SkillSet};
pub use template::TemplateId;

/// Aggregate root for one resume draft.
///
/// Both entity collections start with one blank entry and can never be emptied.
/// Wizard position lives in the session, not here: step navigation never mutates the draft.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResumeDraft {
    pub personal: PersonalInfo,
    pub experience: EntityCollection<ExperienceEntry>,
    pub education: EntityCollection<EducationEntry>,
    pub skills: SkillSet,
    pub template: TemplateId,
}

impl ResumeDraft {
    pub fn new() -> Self {
        Self::default()
    }
}

/// User input rejected at the edit boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct InvalidField {
    pub field: &'static str,
    pub message: String,
}

impl InvalidField {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}
