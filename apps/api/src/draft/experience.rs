use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::draft::collection::Entity;
use crate::draft::InvalidField;

/// A calendar month, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let date = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
            .map_err(|_| format!("'{s}' is not a YYYY-MM month"))?;
        Ok(YearMonth {
            year: date.year(),
            month: date.month(),
        })
    }
}

impl TryFrom<String> for YearMonth {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// End of a position: a month, or still ongoing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EndDate {
    Present,
    Month(YearMonth),
}

impl FromStr for EndDate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("present") {
            Ok(EndDate::Present)
        } else {
            s.parse().map(EndDate::Month)
        }
    }
}

impl TryFrom<String> for EndDate {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EndDate> for String {
    fn from(value: EndDate) -> Self {
        value.to_string()
    }
}

impl fmt::Display for EndDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndDate::Present => f.write_str("Present"),
            EndDate::Month(m) => write!(f, "{m}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub index: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub start: Option<YearMonth>,
    #[serde(default)]
    pub end: Option<EndDate>,
    #[serde(default)]
    pub description: String,
}

impl Entity for ExperienceEntry {
    const KIND: &'static str = "experience";

    fn blank(index: u32) -> Self {
        ExperienceEntry {
            index,
            title: String::new(),
            company: String::new(),
            start: None,
            end: None,
            description: String::new(),
        }
    }

    fn index(&self) -> u32 {
        self.index
    }
}

/// Field edits for one experience entry, as typed by the user. Absent fields are left
/// alone; an empty date string clears the date.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExperiencePatch {
    pub title: Option<String>,
    pub company: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub description: Option<String>,
}

impl ExperiencePatch {
    /// Applies the patch. Dates are parsed first so a bad date leaves the entry untouched.
    pub fn apply(self, entry: &mut ExperienceEntry) -> Result<(), InvalidField> {
        let start = self
            .start
            .map(|s| parse_optional::<YearMonth>(&s))
            .transpose()
            .map_err(|message| InvalidField::new("start", message))?;
        let end = self
            .end
            .map(|s| parse_optional::<EndDate>(&s))
            .transpose()
            .map_err(|message| InvalidField::new("end", message))?;

        if let Some(title) = self.title {
            entry.title = title;
        }
        if let Some(company) = self.company {
            entry.company = company;
        }
        if let Some(start) = start {
            entry.start = start;
        }
        if let Some(end) = end {
            entry.end = end;
        }
        if let Some(description) = self.description {
            entry.description = description;
        }
        Ok(())
    }
}

fn parse_optional<T: FromStr<Err = String>>(raw: &str) -> Result<Option<T>, String> {
    if raw.trim().is_empty() {
        Ok(None)
    } else {
        raw.parse().map(Some)
    }
}
