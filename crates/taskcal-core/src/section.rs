use serde::{Deserialize, Serialize};

/// Colors handed out to sections in first-seen order, cycling when a load
/// introduces more than ten new sections.
pub const COLOR_PALETTE: [&str; 10] = [
    "#1E90FF", "#FF7F50", "#32CD32", "#FFB400", "#BA55D3", "#FF69B4", "#20B2AA", "#F08080",
    "#DAA520", "#708090",
];

/// Event color when a task's section is unexpectedly missing.
pub const FALLBACK_COLOR: &str = "#708090";

/// A named grouping of tasks with display preferences. Visibility and color
/// are user-editable and survive re-imports for sections whose name matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub name: String,
    pub is_visible: bool,
    pub color: String,
}

impl Section {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_visible: true,
            color: color.into(),
        }
    }
}
