use std::collections::HashMap;

use tracing::debug;

use crate::section::{COLOR_PALETTE, Section};
use crate::task::{ExternalTaskRecord, Task};

pub const DEFAULT_SECTION: &str = "Uncategorized";

/// Replacement task and section lists produced by one import.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub tasks: Vec<Task>,
    pub sections: Vec<Section>,
}

/// Map external records into the internal model and derive the section list.
///
/// Records without a name or without any membership are dropped silently.
/// Section names are collected in first-seen order. A name already present
/// in `existing_sections` keeps that section's color and visibility; a new
/// name gets the next palette color, where "next" counts only sections
/// created by this load, so reused sections do not consume palette slots.
#[tracing::instrument(skip(records, existing_sections), fields(records = records.len()))]
pub fn normalize(records: &[ExternalTaskRecord], existing_sections: &[Section]) -> Normalized {
    let mut tasks = Vec::with_capacity(records.len());
    let mut section_order: Vec<String> = Vec::new();

    for record in records {
        if record.name.is_empty() || record.memberships.is_empty() {
            continue;
        }

        let section_name = record.memberships[0]
            .section
            .as_ref()
            .filter(|s| !s.name.is_empty())
            .map(|s| s.name.clone())
            .unwrap_or_else(|| DEFAULT_SECTION.to_string());

        if !section_order.contains(&section_name) {
            section_order.push(section_name.clone());
        }

        tasks.push(Task {
            id: record.gid.clone(),
            title: record.name.clone(),
            date: record.due_date(),
            completed: record.completed,
            section: section_name,
            url: record.permalink_url.clone(),
        });
    }

    let existing: HashMap<&str, &Section> = existing_sections
        .iter()
        .map(|section| (section.name.as_str(), section))
        .collect();

    let mut fresh = 0usize;
    let sections: Vec<Section> = section_order
        .into_iter()
        .map(|name| match existing.get(name.as_str()) {
            Some(section) => (*section).clone(),
            None => {
                let color = COLOR_PALETTE[fresh % COLOR_PALETTE.len()];
                fresh += 1;
                Section::new(name, color)
            }
        })
        .collect();

    debug!(
        tasks = tasks.len(),
        sections = sections.len(),
        created = fresh,
        "normalized export"
    );

    Normalized { tasks, sections }
}
