use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use unicode_width::UnicodeWidthStr;

use crate::config::Config;
use crate::events::CalendarEvent;
use crate::section::Section;
use crate::store::AppState;
use crate::task::Task;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => true,
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self { color })
    }

    #[tracing::instrument(skip(self, events))]
    pub fn print_event_table(&mut self, events: &[CalendarEvent]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        let headers = vec![
            "Date".to_string(),
            "Title".to_string(),
            "Color".to_string(),
            "Id".to_string(),
        ];

        let mut rows = Vec::with_capacity(events.len());
        for event in events {
            let date = event.start.format("%Y-%m-%d").to_string();
            let title = if event.completed {
                self.paint(&event.title, "2")
            } else {
                event.title.clone()
            };
            rows.push(vec![date, title, event.color.clone(), event.id.clone()]);
        }

        write_table(&mut out, headers, rows)?;
        Ok(())
    }

    #[tracing::instrument(skip(self, tasks))]
    pub fn print_task_table(&mut self, tasks: &[Task]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        let headers = vec![
            "Id".to_string(),
            "Date".to_string(),
            "Section".to_string(),
            "Title".to_string(),
            "Done".to_string(),
        ];

        let mut rows = Vec::with_capacity(tasks.len());
        for task in tasks {
            let date = task
                .date
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            let done = if task.completed { "x" } else { "" }.to_string();
            let title = if task.completed {
                self.paint(&task.title, "2")
            } else {
                task.title.clone()
            };

            rows.push(vec![
                self.paint(&task.id, "33"),
                date,
                task.section.clone(),
                title,
                done,
            ]);
        }

        write_table(&mut out, headers, rows)?;
        Ok(())
    }

    #[tracing::instrument(skip(self, sections))]
    pub fn print_section_table(&mut self, sections: &[Section]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        let headers = vec![
            "Section".to_string(),
            "Color".to_string(),
            "Visible".to_string(),
        ];

        let rows = sections
            .iter()
            .map(|section| {
                vec![
                    section.name.clone(),
                    section.color.clone(),
                    if section.is_visible { "yes" } else { "no" }.to_string(),
                ]
            })
            .collect();

        write_table(&mut out, headers, rows)?;
        Ok(())
    }

    #[tracing::instrument(skip(self, groups))]
    pub fn print_undated(&mut self, groups: &[(String, Vec<&Task>)]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        if groups.is_empty() {
            writeln!(out, "No undated tasks.")?;
            return Ok(());
        }

        for (section, tasks) in groups {
            writeln!(out, "{}", self.paint(section, "1"))?;
            for task in tasks {
                let title = if task.completed {
                    self.paint(&task.title, "2")
                } else {
                    task.title.clone()
                };
                writeln!(out, "  {title}")?;
            }
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, state, snapshot))]
    pub fn print_summary(&mut self, state: &AppState, snapshot: &std::path::Path) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        writeln!(out, "project    {}", state.project_name)?;
        writeln!(out, "tasks      {}", state.tasks.len())?;
        writeln!(out, "sections   {}", state.sections.len())?;
        writeln!(
            out,
            "completed  {}",
            if state.show_completed { "shown" } else { "hidden" }
        )?;
        writeln!(out, "snapshot   {}", snapshot.display())?;
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || !io::stdout().is_terminal() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for idx in 0..column_count {
        write!(writer, "{:-<width$} ", "", width = widths[idx])?;
    }
    writeln!(writer)?;

    for row in rows {
        for idx in 0..column_count {
            let cell = &row[idx];
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::{strip_ansi, write_table};

    #[test]
    fn table_columns_align_to_the_widest_cell() {
        let mut buf = Vec::new();
        write_table(
            &mut buf,
            vec!["A".to_string(), "B".to_string()],
            vec![
                vec!["x".to_string(), "longer".to_string()],
                vec!["yy".to_string(), "z".to_string()],
            ],
        )
        .expect("write table");

        let text = String::from_utf8(buf).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "A  B      ");
        assert_eq!(lines[1], "-- ------ ");
        assert_eq!(lines[2], "x  longer ");
        assert_eq!(lines[3], "yy z      ");
    }

    #[test]
    fn ansi_sequences_do_not_count_toward_width() {
        assert_eq!(strip_ansi("\x1b[33mhi\x1b[0m"), "hi");
        assert_eq!(strip_ansi("plain"), "plain");
    }
}
