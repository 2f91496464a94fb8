//! Draft Persistence: saves and restores the whole draft under one fixed key.
//!
//! Save fully replaces the previous record. Restore is forward-compatible: unknown keys
//! are ignored and malformed values are skipped field by field rather than failing the
//! whole load. Skill tags are re-inserted through `SkillSet::add`, so a hand-edited
//! record cannot smuggle in blank or duplicate tags.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::draft::{
    EducationEntry, Entity, EntityCollection, ExperienceEntry, PersonalField, PersonalInfo,
    ResumeDraft, SkillCategory, SkillSet, TemplateId,
};
use crate::errors::DraftError;

/// The fixed key the draft lives under.
pub const DRAFT_KEY: &str = "cv-draft";

/// Durable local key/value storage for serialized drafts.
pub trait DraftStore: Send + Sync {
    /// Returns `Ok(None)` when nothing is stored under `key`.
    fn read(&self, key: &str) -> Result<Option<String>, DraftError>;

    /// Replaces whatever is stored under `key`.
    fn write(&self, key: &str, record: &str) -> Result<(), DraftError>;
}

/// Stores each key as `<dir>/<key>.json`. Writes go through a temp file in the same
/// directory and are renamed into place, so a reader never sees a half-written record.
pub struct FileDraftStore {
    dir: PathBuf,
}

impl FileDraftStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl DraftStore for FileDraftStore {
    fn read(&self, key: &str) -> Result<Option<String>, DraftError> {
        match fs::read_to_string(self.path(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error(e)),
        }
    }

    fn write(&self, key: &str, record: &str) -> Result<(), DraftError> {
        fs::create_dir_all(&self.dir).map_err(storage_error)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir).map_err(storage_error)?;
        tmp.write_all(record.as_bytes()).map_err(storage_error)?;
        tmp.persist(self.path(key))
            .map_err(|e| storage_error(e.error))?;
        Ok(())
    }
}

fn storage_error(e: std::io::Error) -> DraftError {
    DraftError::Storage(e.to_string())
}

#[derive(Serialize)]
struct DraftRecord<'a> {
    saved_at: DateTime<Utc>,
    #[serde(flatten)]
    personal: &'a PersonalInfo,
    template: TemplateId,
    experience: &'a EntityCollection<ExperienceEntry>,
    education: &'a EntityCollection<EducationEntry>,
    skills: &'a SkillSet,
}

/// Serializes the draft and overwrites the record at `DRAFT_KEY`.
pub fn save_draft(store: &dyn DraftStore, draft: &ResumeDraft) -> Result<(), DraftError> {
    let record = DraftRecord {
        saved_at: Utc::now(),
        personal: &draft.personal,
        template: draft.template,
        experience: &draft.experience,
        education: &draft.education,
        skills: &draft.skills,
    };
    let json = serde_json::to_string(&record).map_err(|e| DraftError::Storage(e.to_string()))?;
    store.write(DRAFT_KEY, &json)?;
    info!("Saved draft ({} bytes)", json.len());
    Ok(())
}

/// Reads the record at `DRAFT_KEY`. `Ok(None)` means no draft has been saved, or the
/// stored record is not a JSON object at all.
pub fn load_draft(store: &dyn DraftStore) -> Result<Option<ResumeDraft>, DraftError> {
    let Some(raw) = store.read(DRAFT_KEY)? else {
        debug!("No saved draft under '{DRAFT_KEY}'");
        return Ok(None);
    };
    let record = match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            warn!("Saved draft is not a JSON object; ignoring it");
            return Ok(None);
        }
        Err(e) => {
            warn!("Saved draft is not valid JSON ({e}); ignoring it");
            return Ok(None);
        }
    };
    let draft = restore(&record);
    match record.get("saved_at").and_then(Value::as_str) {
        Some(ts) => info!("Restored draft saved at {ts}"),
        None => info!("Restored draft"),
    }
    Ok(Some(draft))
}

fn restore(record: &Map<String, Value>) -> ResumeDraft {
    let mut draft = ResumeDraft::new();

    for field in PersonalField::ALL {
        match record.get(field.as_str()) {
            Some(Value::String(s)) => draft.personal.set(field, s),
            None | Some(Value::Null) => {}
            Some(_) => warn!("Ignoring malformed draft field '{}'", field.as_str()),
        }
    }

    if let Some(value) = record.get("template") {
        match value.as_str().map(str::parse::<TemplateId>) {
            Some(Ok(template)) => draft.template = template,
            _ => warn!("Ignoring unrecognized template {value}"),
        }
    }

    if let Some(experience) = record
        .get("experience")
        .and_then(restore_collection::<ExperienceEntry>)
    {
        draft.experience = experience;
    }
    if let Some(education) = record
        .get("education")
        .and_then(restore_collection::<EducationEntry>)
    {
        draft.education = education;
    }

    if let Some(skills) = record.get("skills") {
        restore_skills(&mut draft.skills, skills);
    }

    draft
}

fn restore_collection<T: Entity>(value: &Value) -> Option<EntityCollection<T>> {
    let entries = value.get("entries").and_then(Value::as_array)?;
    let parsed: Vec<T> = entries
        .iter()
        .filter_map(|v| match serde_json::from_value::<T>(v.clone()) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping malformed {} entry: {e}", T::KIND);
                None
            }
        })
        .collect();
    let next_index = value
        .get("next_index")
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok());
    let collection = EntityCollection::from_entries(parsed, next_index);
    if collection.is_none() {
        warn!("Saved {} entries are unusable; starting fresh", T::KIND);
    }
    collection
}

/// Merges saved tags into `skills` category by category, preserving saved order.
fn restore_skills(skills: &mut SkillSet, value: &Value) {
    let Some(categories) = value.as_object() else {
        warn!("Ignoring malformed skills record");
        return;
    };
    for (name, tags) in categories {
        let Ok(category) = name.parse::<SkillCategory>() else {
            debug!("Ignoring unknown skill category '{name}'");
            continue;
        };
        for tag in tags.as_array().into_iter().flatten().filter_map(Value::as_str) {
            skills.add(category, tag);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::memory::MemoryDraftStore;
    use super::*;
    use crate::draft::{EndDate, ExperiencePatch};
    use serde_json::json;

    fn sample_draft() -> ResumeDraft {
        let mut d = ResumeDraft::new();
        d.personal.set(PersonalField::FirstName, "Ada");
        d.personal.set(PersonalField::LastName, "Lovelace");
        d.personal.set(PersonalField::Summary, "Analytical engine programmer.");
        d.template = TemplateId::Minimal;
        let second = d.experience.add().unwrap();
        d.experience.remove(1).unwrap();
        ExperiencePatch {
            title: Some("Engineer".into()),
            company: Some("Babbage & Co".into()),
            start: Some("1842-07".into()),
            end: Some("present".into()),
            description: Some("Wrote the first program.".into()),
        }
        .apply(d.experience.get_mut(second).unwrap())
        .unwrap();
        d.education.get_mut(1).unwrap().degree = "Mathematics".into();
        d.skills.add(SkillCategory::Technical, "Punch cards");
        d.skills.add(SkillCategory::Language, "French");
        d
    }

    #[test]
    fn test_round_trip_preserves_draft() {
        let store = MemoryDraftStore::default();
        let draft = sample_draft();
        save_draft(&store, &draft).unwrap();
        let restored = load_draft(&store).unwrap().unwrap();
        assert_eq!(restored, draft);
        assert_eq!(
            restored.experience.get(2).unwrap().end,
            Some(EndDate::Present)
        );
    }

    #[test]
    fn test_restored_counter_does_not_reuse_indices() {
        let store = MemoryDraftStore::default();
        let mut draft = sample_draft();
        draft.experience.add().unwrap();
        draft.experience.remove(3).unwrap();
        save_draft(&store, &draft).unwrap();

        let mut restored = load_draft(&store).unwrap().unwrap();
        assert_eq!(restored.experience.add().unwrap(), 4);
    }

    #[test]
    fn test_missing_record_is_absent() {
        let store = MemoryDraftStore::default();
        assert_eq!(load_draft(&store).unwrap(), None);
    }

    #[test]
    fn test_garbage_record_is_absent() {
        let store = MemoryDraftStore::with_record("not json {");
        assert_eq!(load_draft(&store).unwrap(), None);
    }

    #[test]
    fn test_unknown_and_malformed_fields_are_ignored() {
        let record = json!({
            "first_name": "Grace",
            "last_name": 42,
            "favourite_colour": "teal",
            "template": "baroque",
            "education": { "entries": [] },
            "experience": {
                "entries": [
                    { "index": 3, "title": "Admiral" },
                    { "index": "x" }
                ]
            }
        });
        let store = MemoryDraftStore::with_record(&record.to_string());
        let d = load_draft(&store).unwrap().unwrap();

        assert_eq!(d.personal.first_name.as_deref(), Some("Grace"));
        assert_eq!(d.personal.last_name, None);
        assert_eq!(d.template, TemplateId::Professional);
        assert_eq!(d.education.len(), 1, "empty collection falls back to default");
        assert_eq!(d.experience.len(), 1);
        assert_eq!(d.experience.get(3).unwrap().title, "Admiral");
        assert_eq!(d.experience.next_index(), 4);
    }

    #[test]
    fn test_max_index_entry_is_skipped() {
        let record = json!({
            "experience": {
                "entries": [
                    { "index": 2, "title": "Engineer" },
                    { "index": 4294967295u32, "title": "X" }
                ],
                "next_index": 4294967295u32
            },
            "education": {
                "entries": [{ "index": 4294967295u32, "degree": "BSc" }]
            }
        });
        let store = MemoryDraftStore::with_record(&record.to_string());
        let mut d = load_draft(&store).unwrap().unwrap();

        assert_eq!(d.experience.len(), 1);
        assert_eq!(d.experience.get(2).unwrap().title, "Engineer");
        assert!(matches!(d.experience.add(), Err(DraftError::InvariantViolation(_))));
        assert_eq!(d.experience.len(), 1);

        assert_eq!(d.education.len(), 1, "unusable collection falls back to default");
        assert!(d.education.get(1).is_some());
    }

    #[test]
    fn test_repeated_index_keeps_first_entry() {
        let record = json!({
            "experience": {
                "entries": [
                    { "index": 1, "title": "First" },
                    { "index": 5, "title": "Second" },
                    { "index": 1, "title": "Impostor" }
                ]
            }
        });
        let store = MemoryDraftStore::with_record(&record.to_string());
        let d = load_draft(&store).unwrap().unwrap();

        assert_eq!(d.experience.len(), 2);
        assert_eq!(d.experience.get(1).unwrap().title, "First");
        assert_eq!(d.experience.get(5).unwrap().title, "Second");
        assert_eq!(d.experience.next_index(), 6);
    }

    #[test]
    fn test_skills_reinserted_with_uniqueness() {
        let record = json!({
            "skills": {
                "technical": ["Rust", "  Rust ", "", "Go", 7],
                "languages": ["Spanish"],
                "hobbies": ["Chess"]
            }
        });
        let store = MemoryDraftStore::with_record(&record.to_string());
        let d = load_draft(&store).unwrap().unwrap();
        assert_eq!(d.skills.all(), vec!["Rust", "Go", "Spanish"]);
    }

    #[test]
    fn test_file_store_round_trip_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDraftStore::new(dir.path().join("drafts"));
        assert_eq!(store.read(DRAFT_KEY).unwrap(), None);

        store.write(DRAFT_KEY, "{\"a\":1}").unwrap();
        store.write(DRAFT_KEY, "{\"a\":2}").unwrap();
        assert_eq!(store.read(DRAFT_KEY).unwrap().as_deref(), Some("{\"a\":2}"));
        assert!(dir.path().join("drafts").join("cv-draft.json").exists());
    }

    #[test]
    fn test_file_store_full_draft() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDraftStore::new(dir.path());
        let draft = sample_draft();
        save_draft(&store, &draft).unwrap();
        assert_eq!(load_draft(&store).unwrap(), Some(draft));
    }
}
