//! Rendering sink hand-off.
//!
//! Assembles the finalized draft into a flat payload and hands it to an external
//! document renderer. Document generation itself happens elsewhere.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::draft::{PersonalField, ResumeDraft, SkillCategory, TemplateId};

const SKILL_SEPARATOR: &str = ",";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderPayload {
    pub first_name: String,
    pub last_name: String,
    pub job_title: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub linkedin: String,
    pub website: String,
    pub summary: String,
    pub template: TemplateId,
    pub experience: Vec<RenderExperience>,
    pub education: Vec<RenderEducation>,
    pub skills: RenderSkills,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderExperience {
    pub title: String,
    pub company: String,
    pub start: String,
    pub end: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderEducation {
    pub degree: String,
    pub field: String,
    pub school: String,
    pub start: String,
    pub end: String,
}

/// Skill categories as comma-joined strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderSkills {
    pub technical: String,
    pub soft: String,
    pub languages: String,
}

impl RenderPayload {
    /// Flattens a draft snapshot. Experience entries without a title and education entries
    /// without a degree are left out; a missing end date renders as `Present`.
    pub fn from_draft(draft: &ResumeDraft) -> Self {
        let field = |f: PersonalField| draft.personal.get(f).unwrap_or_default().to_string();
        let skills = |c: SkillCategory| draft.skills.get(c).join(SKILL_SEPARATOR);

        RenderPayload {
            first_name: field(PersonalField::FirstName),
            last_name: field(PersonalField::LastName),
            job_title: field(PersonalField::JobTitle),
            email: field(PersonalField::Email),
            phone: field(PersonalField::Phone),
            location: field(PersonalField::Location),
            linkedin: field(PersonalField::Linkedin),
            website: field(PersonalField::Website),
            summary: field(PersonalField::Summary),
            template: draft.template,
            experience: draft
                .experience
                .iter()
                .filter(|e| !e.title.is_empty())
                .map(|e| RenderExperience {
                    title: e.title.clone(),
                    company: e.company.clone(),
                    start: e.start.map(|m| m.to_string()).unwrap_or_default(),
                    end: e
                        .end
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "Present".to_string()),
                    description: e.description.clone(),
                })
                .collect(),
            education: draft
                .education
                .iter()
                .filter(|e| !e.degree.is_empty())
                .map(|e| RenderEducation {
                    degree: e.degree.clone(),
                    field: e.field.clone(),
                    school: e.school.clone(),
                    start: e.start_year.map(|y| y.to_string()).unwrap_or_default(),
                    end: e.end_year.map(|y| y.to_string()).unwrap_or_default(),
                })
                .collect(),
            skills: RenderSkills {
                technical: skills(SkillCategory::Technical),
                soft: skills(SkillCategory::Soft),
                languages: skills(SkillCategory::Language),
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Renderer rejected payload (status {0})")]
    Rejected(u16),
}

/// Consumer of finalized drafts.
#[async_trait]
pub trait RenderSink: Send + Sync {
    async fn deliver(&self, payload: &RenderPayload) -> Result<(), RenderError>;
}

/// POSTs the payload as JSON to a rendering service.
pub struct HttpRenderSink {
    client: Client,
    url: String,
}

impl HttpRenderSink {
    pub fn new(url: String) -> Result<Self, RenderError> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(60)).build()?,
            url,
        })
    }
}

#[async_trait]
impl RenderSink for HttpRenderSink {
    async fn deliver(&self, payload: &RenderPayload) -> Result<(), RenderError> {
        let status = self.client.post(&self.url).json(payload).send().await?.status();
        if !status.is_success() {
            return Err(RenderError::Rejected(status.as_u16()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FinalizeResponse {
    pub payload: RenderPayload,
    pub delivered: bool,
    pub error: Option<String>,
}

/// Builds the payload and, when a sink is configured, delivers it. Delivery failures are
/// reported in the response, never raised.
pub async fn finalize(draft: &ResumeDraft, sink: Option<&dyn RenderSink>) -> FinalizeResponse {
    let payload = RenderPayload::from_draft(draft);
    let Some(sink) = sink else {
        info!("Finalized draft (no render sink configured)");
        return FinalizeResponse {
            payload,
            delivered: false,
            error: None,
        };
    };
    match sink.deliver(&payload).await {
        Ok(()) => {
            info!("Finalized draft delivered to render sink");
            FinalizeResponse {
                payload,
                delivered: true,
                error: None,
            }
        }
        Err(e) => {
            warn!("Render sink delivery failed: {e}");
            FinalizeResponse {
                payload,
                delivered: false,
                error: Some(e.to_string()),
            }
        }
    }
}
