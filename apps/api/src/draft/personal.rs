use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identity and contact fields. Every field is optional: `None` means "not yet
/// provided", never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub location: Option<String>,
    pub linkedin: Option<String>,
    pub website: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalField {
    FirstName,
    LastName,
    Email,
    Phone,
    JobTitle,
    Location,
    Linkedin,
    Website,
    Summary,
}

impl PersonalField {
    pub const ALL: [PersonalField; 9] = [
        PersonalField::FirstName,
        PersonalField::LastName,
        PersonalField::Email,
        PersonalField::Phone,
        PersonalField::JobTitle,
        PersonalField::Location,
        PersonalField::Linkedin,
        PersonalField::Website,
        PersonalField::Summary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PersonalField::FirstName => "first_name",
            PersonalField::LastName => "last_name",
            PersonalField::Email => "email",
            PersonalField::Phone => "phone",
            PersonalField::JobTitle => "job_title",
            PersonalField::Location => "location",
            PersonalField::Linkedin => "linkedin",
            PersonalField::Website => "website",
            PersonalField::Summary => "summary",
        }
    }
}

impl FromStr for PersonalField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PersonalField::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("unknown personal field '{s}'"))
    }
}

impl PersonalInfo {
    pub fn get(&self, field: PersonalField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Stores `value` in `field`. Blank input clears the field.
    pub fn set(&mut self, field: PersonalField, value: &str) {
        *self.slot_mut(field) = if value.trim().is_empty() {
            None
        } else {
            Some(value.to_string())
        };
    }

    fn slot(&self, field: PersonalField) -> &Option<String> {
        match field {
            PersonalField::FirstName => &self.first_name,
            PersonalField::LastName => &self.last_name,
            PersonalField::Email => &self.email,
            PersonalField::Phone => &self.phone,
            PersonalField::JobTitle => &self.job_title,
            PersonalField::Location => &self.location,
            PersonalField::Linkedin => &self.linkedin,
            PersonalField::Website => &self.website,
            PersonalField::Summary => &self.summary,
        }
    }

    fn slot_mut(&mut self, field: PersonalField) -> &mut Option<String> {
        match field {
            PersonalField::FirstName => &mut self.first_name,
            PersonalField::LastName => &mut self.last_name,
            PersonalField::Email => &mut self.email,
            PersonalField::Phone => &mut self.phone,
            PersonalField::JobTitle => &mut self.job_title,
            PersonalField::Location => &mut self.location,
            PersonalField::Linkedin => &mut self.linkedin,
            PersonalField::Website => &mut self.website,
            PersonalField::Summary => &mut self.summary,
        }
    }
}
