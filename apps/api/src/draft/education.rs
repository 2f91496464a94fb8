use serde::{Deserialize, Deserializer, Serialize};

use crate::draft::collection::Entity;
use crate::draft::InvalidField;

/// Plausible year range enforced at the edit boundary. The model itself stores any year.
pub const MIN_YEAR: i32 = 1950;
pub const MAX_YEAR: i32 = 2030;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub index: u32,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub start_year: Option<i32>,
    #[serde(default)]
    pub end_year: Option<i32>,
}

impl Entity for EducationEntry {
    const KIND: &'static str = "education";

    fn blank(index: u32) -> Self {
        EducationEntry {
            index,
            degree: String::new(),
            field: String::new(),
            school: String::new(),
            start_year: None,
            end_year: None,
        }
    }

    fn index(&self) -> u32 {
        self.index
    }
}

/// Field edits for one education entry. A year sent as `null` clears it; an omitted
/// year is left alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EducationPatch {
    pub degree: Option<String>,
    pub field: Option<String>,
    pub school: Option<String>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub start_year: Option<Option<i32>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub end_year: Option<Option<i32>>,
}

impl EducationPatch {
    pub fn apply(self, entry: &mut EducationEntry) -> Result<(), InvalidField> {
        check_year("start_year", self.start_year)?;
        check_year("end_year", self.end_year)?;

        if let Some(degree) = self.degree {
            entry.degree = degree;
        }
        if let Some(field) = self.field {
            entry.field = field;
        }
        if let Some(school) = self.school {
            entry.school = school;
        }
        if let Some(year) = self.start_year {
            entry.start_year = year;
        }
        if let Some(year) = self.end_year {
            entry.end_year = year;
        }
        Ok(())
    }
}

fn check_year(field: &'static str, year: Option<Option<i32>>) -> Result<(), InvalidField> {
    match year {
        Some(Some(y)) if !(MIN_YEAR..=MAX_YEAR).contains(&y) => Err(InvalidField::new(
            field,
            format!("{y} is outside {MIN_YEAR}..={MAX_YEAR}"),
        )),
        _ => Ok(()),
    }
}

fn explicit_null<'de, D>(deserializer: D) -> Result<Option<Option<i32>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i32>::deserialize(deserializer).map(Some)
}
