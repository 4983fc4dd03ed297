use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One task record as exported by the external project-management tool.
///
/// Every field is optional in practice: exports vary between API versions
/// and the importer treats the shape as untrusted. Unknown fields are
/// ignored; missing ones fall back to their defaults and are filtered
/// further down the pipeline.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalTaskRecord {
    #[serde(default)]
    pub gid: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub completed: bool,

    #[serde(default)]
    pub due_on: Option<String>,

    #[serde(default)]
    pub due_at: Option<String>,

    #[serde(default)]
    pub permalink_url: String,

    #[serde(default)]
    pub memberships: Vec<Membership>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Membership {
    #[serde(default)]
    pub section: Option<SectionRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SectionRef {
    #[serde(default)]
    pub name: String,
}

/// Internal task model. Immutable after normalization; a re-import replaces
/// the whole task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,

    #[serde(default)]
    pub date: Option<NaiveDate>,

    pub completed: bool,
    pub section: String,
    pub url: String,
}

impl ExternalTaskRecord {
    /// Derive the all-day calendar date: a usable `due_on` wins, else the
    /// date part of `due_at` (everything before the `T`). An empty or
    /// unparseable `due_on` does not block the fallback; a date that
    /// parses nowhere is treated as no date at all.
    pub fn due_date(&self) -> Option<NaiveDate> {
        if let Some(due_on) = self.due_on.as_deref()
            && let Ok(date) = NaiveDate::parse_from_str(due_on, "%Y-%m-%d")
        {
            return Some(date);
        }

        let due_at = self.due_at.as_deref()?;
        let text = due_at.split('T').next().unwrap_or("");
        NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
    }
}
