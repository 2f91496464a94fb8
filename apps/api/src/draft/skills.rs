//! Skill Set Manager: per-category ordered sets of unique tags.
//!
//! Tags are trimmed before insertion; blank tags and exact (case-sensitive) duplicates
//! within a category are dropped silently. Insertion order is display order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DraftError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Technical,
    Soft,
    Language,
}

impl SkillCategory {
    /// Fixed display order used when the categories are concatenated.
    pub const ALL: [SkillCategory; 3] = [
        SkillCategory::Technical,
        SkillCategory::Soft,
        SkillCategory::Language,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillCategory::Technical => "technical",
            SkillCategory::Soft => "soft",
            SkillCategory::Language => "language",
        }
    }
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkillCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "technical" | "tech" => Ok(SkillCategory::Technical),
            "soft" => Ok(SkillCategory::Soft),
            "language" | "languages" => Ok(SkillCategory::Language),
            other => Err(format!("unknown skill category '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkillSet {
    technical: Vec<String>,
    soft: Vec<String>,
    language: Vec<String>,
}

impl SkillSet {
    /// Adds a tag to `category`. Returns `false` when the trimmed tag is blank or already
    /// present, in which case nothing changes.
    pub fn add(&mut self, category: SkillCategory, raw: &str) -> bool {
        let tag = raw.trim();
        if tag.is_empty() {
            return false;
        }
        let tags = self.tags_mut(category);
        if tags.iter().any(|t| t == tag) {
            return false;
        }
        tags.push(tag.to_string());
        true
    }

    /// Removes the tag at `position`, shifting later tags left.
    pub fn remove(
        &mut self,
        category: SkillCategory,
        position: usize,
    ) -> Result<String, DraftError> {
        let tags = self.tags_mut(category);
        if position >= tags.len() {
            return Err(DraftError::OutOfRange {
                what: "skill position",
                value: position as i64,
                min: 0,
                max: tags.len() as i64 - 1,
            });
        }
        Ok(tags.remove(position))
    }

    pub fn get(&self, category: SkillCategory) -> &[String] {
        match category {
            SkillCategory::Technical => &self.technical,
            SkillCategory::Soft => &self.soft,
            SkillCategory::Language => &self.language,
        }
    }

    /// All tags, categories concatenated in fixed order (technical, soft, language).
    pub fn all(&self) -> Vec<&str> {
        SkillCategory::ALL
            .iter()
            .flat_map(|&c| self.get(c).iter().map(String::as_str))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        SkillCategory::ALL.iter().all(|&c| self.get(c).is_empty())
    }

    fn tags_mut(&mut self, category: SkillCategory) -> &mut Vec<String> {
        match category {
            SkillCategory::Technical => &mut self.technical,
            SkillCategory::Soft => &mut self.soft,
            SkillCategory::Language => &mut self.language,
        }
    }
}
