use std::io::{self, Write};

use anyhow::{Context, Result};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::models::{parse_due_date, Priority, Theme};
use crate::render::ProgressBand;
use crate::storage::PersistencePort;
use crate::store::{EditRequest, TaskStore};

/// Adds a new task.
///
/// `due` may be empty for "no due date".
pub fn cmd_add<P: PersistencePort>(store: &mut TaskStore<P>, text: &str, priority: Priority, due: Option<&str>) -> Result<()> {
    let due_date = match due {
        Some(d) => parse_due_date(d)?,
        None => None,
    };
    let index = store.create(text, priority, due_date)?;
    println!("Task added (index = {})", index);
    Ok(())
}

/// Flips a task between open and completed.
pub fn cmd_toggle<P: PersistencePort>(store: &mut TaskStore<P>, index: usize) -> Result<()> {
    if store.toggle(index)? {
        println!("Task {} marked as complete.", index);
    } else {
        println!("Task {} reopened.", index);
    }
    Ok(())
}

/// Edits an existing task's details.
pub fn cmd_edit<P: PersistencePort>(store: &mut TaskStore<P>, index: usize, request: EditRequest) -> Result<()> {
    if let Some(token) = request.priority.as_deref() {
        if !token.trim().is_empty() && Priority::parse(token).is_none() {
            eprintln!("Unknown priority '{}' ignored. Use low, medium or high.", token);
        }
    }
    store.edit(index, request)?;
    println!("Task {} updated.", index);
    Ok(())
}

/// Removes a task, asking first unless `force` is set.
pub fn cmd_remove<P: PersistencePort>(store: &mut TaskStore<P>, index: usize, force: bool) -> Result<()> {
    if let Some(task) = store.get(index) {
        if !force && !confirm(&format!("Delete \"{}\"?", task.text))? {
            println!("Aborted.");
            return Ok(());
        }
    }
    let removed = store.delete(index)?;
    println!("Task {} removed: {}", index, removed.text);
    Ok(())
}

/// Lists tasks in display order with their progress.
///
/// `pending_only` hides completed tasks from the table but not from the progress figure.
pub fn cmd_list<P: PersistencePort>(store: &TaskStore<P>, pending_only: bool) -> Result<()> {
    let snapshot = store.snapshot();
    if snapshot.is_empty() {
        println!("No tasks yet. Add one!");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("#").add_attribute(Attribute::Bold),
            Cell::new("Pri").add_attribute(Attribute::Bold),
            Cell::new("Task").add_attribute(Attribute::Bold),
            Cell::new("Due").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    for view in snapshot.tasks.iter().filter(|v| !(pending_only && v.task.completed)) {
        let t = &view.task;
        let due = t.due_date.map(|d| d.to_string()).unwrap_or_default();
        let (status, status_color) = if t.completed {
            ("Done", Color::Green)
        } else if view.overdue {
            ("Overdue", Color::Red)
        } else {
            ("Pending", Color::Yellow)
        };
        let text = if t.completed {
            Cell::new(&t.text).add_attribute(Attribute::CrossedOut)
        } else {
            Cell::new(&t.text)
        };

        table.add_row(vec![
            Cell::new(view.index),
            Cell::new(t.priority.symbol()),
            text,
            Cell::new(due).fg(if view.overdue { Color::Red } else { Color::Reset }),
            Cell::new(status).fg(status_color),
        ]);
    }

    println!("{table}");
    println!(
        "{}% Completed ({}/{})",
        snapshot.progress, snapshot.completed, snapshot.total
    );
    Ok(())
}

/// Shows completions for the last seven days.
pub fn cmd_stats<P: PersistencePort>(store: &TaskStore<P>) -> Result<()> {
    let snapshot = store.snapshot();
    let peak = snapshot.week.iter().map(|d| d.count).max().unwrap_or(0).max(1);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Day", "Completed", ""]);
    for day in &snapshot.week {
        let width = (day.count as usize * 20).div_ceil(peak as usize);
        table.add_row(vec![
            Cell::new(&day.label),
            Cell::new(day.count),
            Cell::new("█".repeat(width)).fg(Color::Blue),
        ]);
    }
    println!("{table}");

    let color = match ProgressBand::of(snapshot.progress) {
        ProgressBand::OnTrack => Color::Green,
        ProgressBand::Halfway => Color::Yellow,
        ProgressBand::Behind => Color::Red,
    };
    let mut summary = Table::new();
    summary.load_preset(UTF8_FULL).add_row(vec![
        Cell::new("Progress"),
        Cell::new(format!("{}% Completed", snapshot.progress)).fg(color),
        Cell::new(format!("{} completions in the last 30 days", store.ledger().total())),
    ]);
    println!("{summary}");
    Ok(())
}

/// Prints the theme, or switches to `dark`, `light` or the opposite of the current one (`toggle`).
pub fn cmd_theme<P: PersistencePort>(store: &mut TaskStore<P>, choice: Option<&str>) -> Result<()> {
    let current = store.theme()?;
    let next = match choice.map(|c| c.trim().to_lowercase()) {
        None => {
            println!("Theme: {}", current.as_str());
            return Ok(());
        }
        Some(c) if c == "toggle" => current.toggled(),
        Some(c) if c == "dark" => Theme::Dark,
        Some(c) if c == "light" => Theme::Light,
        Some(c) => anyhow::bail!("Unknown theme '{}'. Use dark, light or toggle.", c),
    };
    store.set_theme(next)?;
    println!("Theme set to {}.", next.as_str());
    Ok(())
}

/// Deletes all tasks and completion stats.
pub fn cmd_reset<P: PersistencePort>(store: &mut TaskStore<P>, force: bool) -> Result<()> {
    if !force && !confirm("Are you sure you want to delete all tasks and stats? This cannot be undone.")? {
        println!("Aborted.");
        return Ok(());
    }
    store.reset().context("Failed to reset task data")?;
    println!("Task data reset successfully.");
    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}
