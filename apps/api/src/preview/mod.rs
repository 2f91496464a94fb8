//! Live Preview Projector: a pure function from `ResumeDraft` to `PreviewModel`.
//!
//! The projector keeps no state of its own, so the preview cannot drift from the draft.
//! Placeholder text (`"Your"`, `"Name"`) exists only in the preview and is never written
//! back into the model. It tolerates a completely empty draft.

use serde::Serialize;

use crate::draft::{EducationEntry, ExperienceEntry, PersonalInfo, ResumeDraft, TemplateId};

pub const FIRST_NAME_PLACEHOLDER: &str = "Your";
pub const LAST_NAME_PLACEHOLDER: &str = "Name";
pub const CONTACT_SEPARATOR: &str = " • ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewModel {
    pub template: TemplateId,
    pub display_name: String,
    pub job_title: Option<String>,
    pub contact_line: String,
    pub summary: SummaryPreview,
    pub experience: SectionPreview<EntryPreview>,
    pub education: SectionPreview<EntryPreview>,
    pub skills: SectionPreview<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryPreview {
    pub visible: bool,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionPreview<T> {
    pub visible: bool,
    pub items: Vec<T>,
}

/// One rendered card in the experience or education section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryPreview {
    /// Permanent index of the source entry.
    pub index: u32,
    pub title: String,
    pub subtitle: String,
    pub description: Option<String>,
}

pub fn project(draft: &ResumeDraft) -> PreviewModel {
    let summary_text = draft.personal.summary.clone().unwrap_or_default();
    let experience = draft
        .experience
        .iter()
        .filter_map(project_experience)
        .collect::<Vec<_>>();
    let education = draft
        .education
        .iter()
        .filter_map(project_education)
        .collect::<Vec<_>>();
    let skills = draft
        .skills
        .all()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();

    PreviewModel {
        template: draft.template,
        display_name: display_name(&draft.personal),
        job_title: draft.personal.job_title.clone(),
        contact_line: contact_line(&draft.personal),
        summary: SummaryPreview {
            visible: !summary_text.is_empty(),
            text: summary_text,
        },
        experience: section(experience),
        education: section(education),
        skills: section(skills),
    }
}

fn section<T>(items: Vec<T>) -> SectionPreview<T> {
    SectionPreview {
        visible: !items.is_empty(),
        items,
    }
}

fn display_name(p: &PersonalInfo) -> String {
    format!(
        "{} {}",
        p.first_name.as_deref().unwrap_or(FIRST_NAME_PLACEHOLDER),
        p.last_name.as_deref().unwrap_or(LAST_NAME_PLACEHOLDER)
    )
}

/// Present-only contact fields joined by the separator; absent fields leave no gap.
fn contact_line(p: &PersonalInfo) -> String {
    [p.email.as_deref(), p.phone.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(CONTACT_SEPARATOR)
}

/// Entries with neither a title nor a company render nothing.
fn project_experience(e: &ExperienceEntry) -> Option<EntryPreview> {
    if e.title.is_empty() && e.company.is_empty() {
        return None;
    }
    Some(EntryPreview {
        index: e.index,
        title: e.title.clone(),
        subtitle: e.company.clone(),
        description: (!e.description.is_empty()).then(|| e.description.clone()),
    })
}

/// Entries with neither a degree nor a school render nothing.
fn project_education(e: &EducationEntry) -> Option<EntryPreview> {
    if e.degree.is_empty() && e.school.is_empty() {
        return None;
    }
    let title = match (e.degree.is_empty(), e.field.is_empty()) {
        (_, true) => e.degree.clone(),
        (true, false) => format!("in {}", e.field),
        (false, false) => format!("{} in {}", e.degree, e.field),
    };
    Some(EntryPreview {
        index: e.index,
        title,
        subtitle: e.school.clone(),
        description: None,
    })
}
