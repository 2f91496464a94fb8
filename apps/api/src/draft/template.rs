use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The closed set of document templates. Exactly one is active per draft.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateId {
    #[default]
    Professional,
    Modern,
    Minimal,
    Creative,
}

impl TemplateId {
    pub const ALL: [TemplateId; 4] = [
        TemplateId::Professional,
        TemplateId::Modern,
        TemplateId::Minimal,
        TemplateId::Creative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::Professional => "professional",
            TemplateId::Modern => "modern",
            TemplateId::Minimal => "minimal",
            TemplateId::Creative => "creative",
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemplateId::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown template '{s}'"))
    }
}
