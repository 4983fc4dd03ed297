use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::Context;
use tracing::{debug, info, instrument};

use crate::cli::Command;
use crate::events::{project_events, undated_by_section};
use crate::render::Renderer;
use crate::store::Store;

#[instrument(skip(store, renderer, command))]
pub fn dispatch(store: &mut Store, renderer: &mut Renderer, command: Command) -> anyhow::Result<()> {
    debug!(?command, "dispatching command");

    match command {
        Command::Import { file } => cmd_import(store, &file),
        Command::Events { json } => cmd_events(store, renderer, json),
        Command::Tasks => renderer.print_task_table(&store.state().tasks),
        Command::Undated => {
            let state = store.state();
            let groups = undated_by_section(&state.tasks, &state.sections, state.show_completed);
            renderer.print_undated(&groups)
        }
        Command::Sections => renderer.print_section_table(&store.state().sections),
        Command::Toggle { section } => cmd_toggle(store, &section),
        Command::Color { section, color } => cmd_color(store, &section, &color),
        Command::Completed => {
            let shown = store.toggle_show_completed();
            println!(
                "Completed tasks are now {}.",
                if shown { "shown" } else { "hidden" }
            );
            Ok(())
        }
        Command::Rename { name } => {
            store.set_project_name(&name);
            println!("Project renamed to '{name}'.");
            Ok(())
        }
        Command::Reset => {
            store.reset();
            println!("All tasks and settings have been cleared.");
            Ok(())
        }
        Command::Show => renderer.print_summary(store.state(), store.snapshot_path()),
    }
}

#[instrument(skip(store))]
fn cmd_import(store: &mut Store, file: &Path) -> anyhow::Result<()> {
    info!(file = %file.display(), "command import");

    let raw = if file == Path::new("-") {
        let mut stdin = String::new();
        io::stdin()
            .read_to_string(&mut stdin)
            .context("failed reading stdin")?;
        stdin
    } else {
        fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?
    };

    let summary = store.load_tasks(&raw)?;
    println!(
        "Loaded {} tasks and {} sections.",
        summary.tasks, summary.sections
    );
    Ok(())
}

#[instrument(skip(store, renderer))]
fn cmd_events(store: &mut Store, renderer: &mut Renderer, json: bool) -> anyhow::Result<()> {
    let state = store.state();
    let events = project_events(&state.tasks, &state.sections, state.show_completed);

    if json {
        let out = serde_json::to_string(&events)?;
        println!("{out}");
        return Ok(());
    }

    renderer.print_event_table(&events)
}

fn cmd_toggle(store: &mut Store, section: &str) -> anyhow::Result<()> {
    if !store.toggle_section_visibility(section) {
        println!("No section named '{section}'.");
        return Ok(());
    }

    let visible = store
        .state()
        .sections
        .iter()
        .find(|s| s.name == section)
        .map(|s| s.is_visible)
        .unwrap_or(false);
    println!(
        "Section '{section}' is now {}.",
        if visible { "visible" } else { "hidden" }
    );
    Ok(())
}

fn cmd_color(store: &mut Store, section: &str, color: &str) -> anyhow::Result<()> {
    if store.set_section_color(section, color) {
        println!("Section '{section}' recolored to {color}.");
    } else {
        println!("No section named '{section}'.");
    }
    Ok(())
}
