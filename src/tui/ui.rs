use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table},
    Frame,
};
use crate::models::Theme;
use crate::render::ProgressBand;
use crate::storage::PersistencePort;
use super::app::{App, InputField, InputMode};

/// Colours for one theme.
struct Palette {
    background: Color,
    text: Color,
    muted: Color,
    accent: Color,
    highlight: Color,
    bar: Color,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            background: Color::Rgb(15, 23, 42),
            text: Color::Rgb(248, 250, 252),
            muted: Color::DarkGray,
            accent: Color::Rgb(96, 165, 250),
            highlight: Color::Rgb(51, 65, 85),
            bar: Color::Rgb(96, 165, 250),
        },
        Theme::Light => Palette {
            background: Color::Rgb(248, 250, 252),
            text: Color::Rgb(30, 41, 59),
            muted: Color::Gray,
            accent: Color::Rgb(79, 70, 229),
            highlight: Color::Rgb(226, 232, 240),
            bar: Color::Rgb(79, 70, 229),
        },
    }
}

fn band_color(progress: u8) -> Color {
    match ProgressBand::of(progress) {
        ProgressBand::OnTrack => Color::Rgb(16, 185, 129),
        ProgressBand::Halfway => Color::Rgb(245, 158, 11),
        ProgressBand::Behind => Color::Rgb(239, 68, 68),
    }
}

pub fn ui<P: PersistencePort>(f: &mut Frame, app: &mut App<P>) {
    let p = palette(app.theme);
    let base = Style::default().fg(p.text).bg(p.background);
    f.render_widget(Block::default().style(base), f.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Progress
            Constraint::Min(0),    // Tasks + chart
            Constraint::Length(3), // Help
        ].as_ref())
        .split(f.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(38)].as_ref())
        .split(chunks[1]);

    let (progress, week) = {
        let snapshot = app.view.get();
        (snapshot.progress, snapshot.week.clone())
    };

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Progress"))
        .gauge_style(Style::default().fg(band_color(progress)).bg(p.highlight))
        .percent(u16::from(progress))
        .label(format!("{}% Completed", progress));
    f.render_widget(gauge, chunks[0]);

    if app.rows.is_empty() {
        let empty = Paragraph::new("No tasks yet. Add one! (press a)")
            .style(Style::default().fg(p.muted))
            .block(Block::default().borders(Borders::ALL).title("Taskpulse - Tasks"));
        f.render_widget(empty, body[0]);
    } else {
        let rows: Vec<Row> = app
            .rows
            .iter()
            .map(|v| {
                let t = &v.task;
                let style = if t.completed {
                    Style::default().fg(p.muted).add_modifier(Modifier::CROSSED_OUT)
                } else if v.overdue {
                    Style::default().fg(Color::Red)
                } else {
                    Style::default().fg(p.text)
                };

                Row::new(vec![
                    Cell::from(v.index.to_string()),
                    Cell::from(t.priority.symbol()),
                    Cell::from(t.text.clone()),
                    Cell::from(t.due_date.map(|d| d.to_string()).unwrap_or_default()),
                    Cell::from(if t.completed { "Done" } else if v.overdue { "Overdue" } else { "Pending" }),
                ]).style(style)
            })
            .collect();

        let widths = [
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(20),
            Constraint::Length(12),
            Constraint::Length(8),
        ];

        let table = Table::new(rows, widths)
            .header(Row::new(vec!["#", "", "Task", "Due", "Status"])
                .style(Style::default().fg(p.accent).add_modifier(Modifier::BOLD))
                .bottom_margin(1))
            .block(Block::default().borders(Borders::ALL).title("Taskpulse - Tasks"))
            .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(p.highlight))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, body[0], &mut app.state);
    }

    let bars: Vec<Bar> = week
        .iter()
        .map(|d| {
            Bar::default()
                .value(u64::from(d.count))
                .label(Line::from(d.date.format("%a").to_string()))
                .style(Style::default().fg(p.bar))
                .value_style(Style::default().fg(p.background).bg(p.bar))
        })
        .collect();
    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title("Completed (7 days)"))
        .data(BarGroup::default().bars(&bars))
        .bar_width(4)
        .bar_gap(1);
    f.render_widget(chart, body[1]);

    let (help_text, help_style) = match (&app.status, &app.input_mode) {
        (Some(message), _) => (message.as_str(), Style::default().fg(Color::Red)),
        (None, InputMode::Normal) => (
            "q: Quit | a: Add | Space: Done/Undo | n: Text | p: Priority | t: Due | d: Del | c: Show/Hide Done | T: Theme",
            Style::default().fg(p.muted),
        ),
        (None, InputMode::Editing) => ("Enter: Save | Esc: Cancel", Style::default().fg(p.muted)),
        (None, InputMode::Adding) => ("Enter: Next Step | Esc: Cancel", Style::default().fg(p.muted)),
        (None, InputMode::ConfirmDelete) => ("y: Delete | any other key: Keep", Style::default().fg(p.muted)),
    };

    let help = Paragraph::new(help_text)
        .style(help_style)
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(help, chunks[2]);

    // Render Input Box if needed
    let title = match app.input_mode {
        InputMode::Adding => match app.add_state.step {
            0 => "Add Task: Enter Text",
            1 => "Add Task: Priority (low/medium/high, blank = medium)",
            2 => "Add Task: Due Date (YYYY-MM-DD, blank = none)",
            _ => "Add Task",
        },
        InputMode::Editing => match app.input_field {
            InputField::Text => "Edit Text",
            InputField::Priority => "Edit Priority (low/medium/high)",
            InputField::Due => "Edit Due Date (YYYY-MM-DD, blank clears)",
            InputField::None => "Edit",
        },
        InputMode::ConfirmDelete => "Delete this task? (y/N)",
        InputMode::Normal => return,
    };

    let content = match app.input_mode {
        InputMode::ConfirmDelete => app
            .target_index
            .and_then(|i| app.store.get(i))
            .map(|t| t.text.clone())
            .unwrap_or_default(),
        _ => app.input_buffer.clone(),
    };

    let area = centered_rect(60, 3, f.area()); // Fixed height of 3 (border + 1 line)
    f.render_widget(Clear, area); // Clear the area first

    let input = Paragraph::new(content)
        .style(Style::default().fg(p.accent).bg(p.background))
        .block(Block::default().borders(Borders::ALL).title(title));

    f.render_widget(input, area);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let margin = r.height.saturating_sub(height) / 2;
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(margin),
            Constraint::Length(height),
            Constraint::Length(margin),
        ].as_ref())
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ].as_ref())
        .split(popup_layout[1])[1]
}
