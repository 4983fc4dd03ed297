use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::trace;

use crate::section::{FALLBACK_COLOR, Section};
use crate::task::Task;

/// One calendar entry as handed to the rendering collaborator: an all-day
/// point event carrying the resolved section color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: NaiveDate,
    pub all_day: bool,
    pub color: String,
    pub completed: bool,
    pub url: String,
}

/// Pure projection of (tasks, sections, show_completed) into calendar
/// events. A task is included iff it has a date, its section is visible,
/// and it is either not completed or completed tasks are being shown.
/// Iteration order over the task list is preserved.
pub fn project_events(tasks: &[Task], sections: &[Section], show_completed: bool) -> Vec<CalendarEvent> {
    let colors: HashMap<&str, &Section> = sections
        .iter()
        .map(|section| (section.name.as_str(), section))
        .collect();

    tasks
        .iter()
        .filter_map(|task| {
            let start = task.date?;
            if let Some(section) = colors.get(task.section.as_str())
                && !section.is_visible
            {
                trace!(id = %task.id, section = %task.section, "hidden section");
                return None;
            }
            if !show_completed && task.completed {
                return None;
            }

            let color = colors
                .get(task.section.as_str())
                .map(|section| section.color.clone())
                .unwrap_or_else(|| FALLBACK_COLOR.to_string());

            Some(CalendarEvent {
                id: task.id.clone(),
                title: task.title.clone(),
                start,
                all_day: true,
                color,
                completed: task.completed,
                url: task.url.clone(),
            })
        })
        .collect()
}

/// Undated tasks grouped by section, under the same visibility and
/// completion filters as the calendar. Groups follow the section list's
/// order; tasks keep their list order within a group.
pub fn undated_by_section<'a>(
    tasks: &'a [Task],
    sections: &[Section],
    show_completed: bool,
) -> Vec<(String, Vec<&'a Task>)> {
    // Groups exist only for visible sections, so tasks in hidden or unknown
    // sections simply find no bucket.
    let mut groups: Vec<(String, Vec<&Task>)> = sections
        .iter()
        .filter(|section| section.is_visible)
        .map(|section| (section.name.clone(), Vec::new()))
        .collect();

    for task in tasks {
        if task.date.is_some() || (!show_completed && task.completed) {
            continue;
        }
        if let Some((_, group)) = groups.iter_mut().find(|(name, _)| *name == task.section) {
            group.push(task);
        }
    }

    groups.retain(|(_, group)| !group.is_empty());
    groups
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use proptest::prelude::*;

    use super::{project_events, undated_by_section};
    use crate::section::{FALLBACK_COLOR, Section};
    use crate::task::Task;

    fn task(id: &str, section: &str, date: Option<NaiveDate>, completed: bool) -> Task {
        Task {
            id: id.to_string(),
            title: format!("task {id}"),
            date,
            completed,
            section: section.to_string(),
            url: format!("https://example.test/{id}"),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).expect("valid date")
    }

    #[test]
    fn annotates_events_with_the_section_color() {
        let sections = vec![Section::new("Design", "#112233")];
        let tasks = vec![task("1", "Design", Some(day(5)), false)];

        let events = project_events(&tasks, &sections, true);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].color, "#112233");
        assert!(events[0].all_day);
        assert_eq!(events[0].start, day(5));
    }

    #[test]
    fn missing_section_falls_back_to_the_neutral_color() {
        let tasks = vec![task("1", "Ghost", Some(day(5)), false)];
        let events = project_events(&tasks, &[], true);
        assert_eq!(events[0].color, FALLBACK_COLOR);
    }

    #[test]
    fn hidden_sections_and_completed_tasks_are_excluded() {
        let mut hidden = Section::new("Hidden", "#000000");
        hidden.is_visible = false;
        let sections = vec![Section::new("Shown", "#111111"), hidden];

        let tasks = vec![
            task("1", "Shown", Some(day(1)), false),
            task("2", "Hidden", Some(day(2)), false),
            task("3", "Shown", Some(day(3)), true),
            task("4", "Shown", None, false),
        ];

        let shown: Vec<_> = project_events(&tasks, &sections, false)
            .into_iter()
            .map(|event| event.id)
            .collect();
        assert_eq!(shown, vec!["1"]);

        let with_completed: Vec<_> = project_events(&tasks, &sections, true)
            .into_iter()
            .map(|event| event.id)
            .collect();
        assert_eq!(with_completed, vec!["1", "3"]);
    }

    #[test]
    fn undated_view_mirrors_the_calendar_filters() {
        let mut hidden = Section::new("Hidden", "#000000");
        hidden.is_visible = false;
        let sections = vec![Section::new("Shown", "#111111"), hidden];

        let tasks = vec![
            task("1", "Shown", None, false),
            task("2", "Shown", Some(day(1)), false),
            task("3", "Hidden", None, false),
            task("4", "Shown", None, true),
        ];

        let groups = undated_by_section(&tasks, &sections, false);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, "Shown");
        assert_eq!(groups[0].1.len(), 1);
        assert_eq!(groups[0].1[0].id, "1");
    }

    prop_compose! {
        fn arb_task(section_pool: Vec<&'static str>)(
            id in "[0-9]{1,6}",
            section_idx in 0..4usize,
            dated in any::<bool>(),
            offset in 1..28u32,
            completed in any::<bool>(),
        ) -> Task {
            task(
                &id,
                section_pool[section_idx % section_pool.len()],
                dated.then(|| day(offset)),
                completed,
            )
        }
    }

    proptest! {
        #[test]
        fn projector_never_emits_an_excluded_task(
            tasks in prop::collection::vec(
                arb_task(vec!["A", "B", "C", "Ghost"]), 0..32
            ),
            a_visible in any::<bool>(),
            b_visible in any::<bool>(),
            show_completed in any::<bool>(),
        ) {
            // Re-id by position so the event-to-task lookup is unambiguous.
            let tasks: Vec<Task> = tasks
                .into_iter()
                .enumerate()
                .map(|(idx, mut task)| {
                    task.id = idx.to_string();
                    task.title = format!("task {idx}");
                    task
                })
                .collect();

            let mut section_a = Section::new("A", "#111111");
            section_a.is_visible = a_visible;
            let mut section_b = Section::new("B", "#222222");
            section_b.is_visible = b_visible;
            let sections = vec![section_a, section_b, Section::new("C", "#333333")];

            let events = project_events(&tasks, &sections, show_completed);

            for event in &events {
                let source = tasks
                    .iter()
                    .find(|task| task.id == event.id && task.title == event.title)
                    .expect("event corresponds to a task");

                prop_assert_eq!(Some(event.start), source.date);
                prop_assert!(show_completed || !source.completed);
                if let Some(section) = sections.iter().find(|s| s.name == source.section) {
                    prop_assert!(section.is_visible);
                    prop_assert_eq!(&event.color, &section.color);
                } else {
                    prop_assert_eq!(event.color.as_str(), FALLBACK_COLOR);
                }
            }

            // Nothing eligible is dropped either.
            let eligible = tasks.iter().filter(|task| {
                task.date.is_some()
                    && (show_completed || !task.completed)
                    && sections
                        .iter()
                        .find(|s| s.name == task.section)
                        .map(|s| s.is_visible)
                        .unwrap_or(true)
            });
            prop_assert_eq!(eligible.count(), events.len());
        }
    }
}
