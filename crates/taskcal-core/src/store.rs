use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::import::{ImportError, parse_export};
use crate::normalize::{Normalized, normalize};
use crate::section::Section;
use crate::task::Task;

pub const DEFAULT_PROJECT_NAME: &str = "Client Calendar";

const SNAPSHOT_FILE: &str = "state.json";

/// The whole application state. One JSON snapshot of this structure is the
/// only durable record; it is rewritten wholesale after every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub project_name: String,

    #[serde(default)]
    pub tasks: Vec<Task>,

    #[serde(default)]
    pub sections: Vec<Section>,

    pub show_completed: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            tasks: vec![],
            sections: vec![],
            show_completed: true,
        }
    }
}

/// Counts reported back to the user after a successful import.
#[derive(Debug, Clone, Copy)]
pub struct LoadSummary {
    pub tasks: usize,
    pub sections: usize,
}

/// Owns the [`AppState`] and its snapshot file. Constructed once at startup;
/// every mutation re-persists the whole state, best-effort. There is no
/// locking: all callers run on one thread and the snapshot is a single file
/// overwritten wholesale.
#[derive(Debug)]
pub struct Store {
    state: AppState,
    snapshot_path: PathBuf,
}

impl Store {
    /// Open the store under `data_dir`, restoring the previous snapshot if
    /// one is present and readable. A missing or corrupt snapshot falls
    /// back silently to the default state.
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;

        let snapshot_path = data_dir.join(SNAPSHOT_FILE);
        let state = read_snapshot(&snapshot_path);

        info!(
            snapshot = %snapshot_path.display(),
            tasks = state.tasks.len(),
            sections = state.sections.len(),
            "opened store"
        );

        Ok(Self {
            state,
            snapshot_path,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    #[tracing::instrument(skip(self))]
    pub fn set_project_name(&mut self, name: &str) {
        self.state.project_name = name.to_string();
        self.persist();
    }

    /// Run the import pipeline over raw export text. On success the task
    /// and section lists are replaced and the new counts returned. Any
    /// failure, including an import that yields zero usable tasks, leaves
    /// the state untouched.
    #[tracing::instrument(skip(self, raw_json))]
    pub fn load_tasks(&mut self, raw_json: &str) -> Result<LoadSummary, ImportError> {
        let records = parse_export(raw_json)?;
        let Normalized { tasks, sections } = normalize(&records, &self.state.sections);

        if tasks.is_empty() {
            return Err(ImportError::NoTasks);
        }

        let summary = LoadSummary {
            tasks: tasks.len(),
            sections: sections.len(),
        };

        self.state.tasks = tasks;
        self.state.sections = sections;
        self.persist();

        info!(
            tasks = summary.tasks,
            sections = summary.sections,
            "loaded tasks"
        );
        Ok(summary)
    }

    /// Flip one section's visibility. Returns false (and does nothing) if
    /// no section has that name.
    #[tracing::instrument(skip(self))]
    pub fn toggle_section_visibility(&mut self, name: &str) -> bool {
        let Some(section) = self.find_section_mut(name) else {
            debug!(name, "toggle on unknown section ignored");
            return false;
        };
        section.is_visible = !section.is_visible;
        self.persist();
        true
    }

    /// Set one section's color. The color is taken as-is; it is not checked
    /// against the palette. Returns false if no section has that name.
    #[tracing::instrument(skip(self))]
    pub fn set_section_color(&mut self, name: &str, color: &str) -> bool {
        let Some(section) = self.find_section_mut(name) else {
            debug!(name, "recolor of unknown section ignored");
            return false;
        };
        section.color = color.to_string();
        self.persist();
        true
    }

    /// Flip the completed-tasks filter; returns the new value.
    #[tracing::instrument(skip(self))]
    pub fn toggle_show_completed(&mut self) -> bool {
        self.state.show_completed = !self.state.show_completed;
        self.persist();
        self.state.show_completed
    }

    /// Clear tasks, sections, and the completed filter back to defaults,
    /// keeping the project name. The old snapshot is erased and the
    /// post-reset state written in its place, so the kept name also
    /// survives a restart.
    #[tracing::instrument(skip(self))]
    pub fn reset(&mut self) {
        let project_name = std::mem::take(&mut self.state.project_name);
        self.state = AppState {
            project_name,
            ..AppState::default()
        };

        if let Err(err) = fs::remove_file(&self.snapshot_path)
            && err.kind() != std::io::ErrorKind::NotFound
        {
            warn!(
                snapshot = %self.snapshot_path.display(),
                error = %err,
                "failed to remove snapshot"
            );
        }
        self.persist();
        info!("state reset");
    }

    fn find_section_mut(&mut self, name: &str) -> Option<&mut Section> {
        self.state
            .sections
            .iter_mut()
            .find(|section| section.name == name)
    }

    /// Best-effort snapshot write. Persistence failures are logged and
    /// otherwise ignored; the in-memory state stays authoritative.
    fn persist(&self) {
        if let Err(err) = write_snapshot_atomic(&self.snapshot_path, &self.state) {
            warn!(
                snapshot = %self.snapshot_path.display(),
                error = %err,
                "failed to persist state"
            );
        }
    }
}

fn read_snapshot(path: &Path) -> AppState {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            debug!(snapshot = %path.display(), error = %err, "no snapshot, using defaults");
            return AppState::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(state) => state,
        Err(err) => {
            warn!(
                snapshot = %path.display(),
                error = %err,
                "corrupt snapshot, using defaults"
            );
            AppState::default()
        }
    }
}

fn write_snapshot_atomic(path: &Path, state: &AppState) -> anyhow::Result<()> {
    debug!(snapshot = %path.display(), "writing snapshot");

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut temp, state)?;
    temp.flush()?;

    temp.persist(path)
        .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{AppState, DEFAULT_PROJECT_NAME};

    #[test]
    fn snapshot_uses_the_original_camel_case_layout() {
        let state = AppState::default();
        let raw = serde_json::to_string(&state).expect("serialize");

        assert!(raw.contains("\"projectName\""));
        assert!(raw.contains("\"showCompleted\""));
        assert!(raw.contains(DEFAULT_PROJECT_NAME));
    }

    #[test]
    fn partial_snapshot_still_deserializes() {
        // Older snapshots may predate some fields; lists default to empty.
        let raw = r#"{"projectName": "P", "showCompleted": false}"#;
        let state: AppState = serde_json::from_str(raw).expect("deserialize");
        assert_eq!(state.project_name, "P");
        assert!(!state.show_completed);
        assert!(state.tasks.is_empty());
    }
}
