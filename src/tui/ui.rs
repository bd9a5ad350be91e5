//! UI layout and rendering logic for the TUI.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::app::{App, Focus};
use crate::catalog::CatalogStatus;

const ACCENT: Color = Color::Rgb(0x26, 0x59, 0x2a);
const PANE_BG: Color = Color::Rgb(0x28, 0x2c, 0x34);

/// Render the main UI
pub fn render_ui(frame: &mut Frame, app: &mut App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Min(5),    // Editor + output panes
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, main_layout[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(main_layout[1]);

    render_editor(frame, app, body[0]);
    render_output_panes(frame, app, body[1]);
    render_status_bar(frame, app, main_layout[2]);

    if app.focus == Focus::Picker {
        render_language_picker(frame, app);
    }

    // Render help overlay if requested
    if app.show_help {
        render_help_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let button_style = if app.can_execute() {
        Style::default().fg(Color::Black).bg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray).bg(Color::Gray)
    };

    let line = Line::from(vec![
        Span::styled(" Codepad ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(format!(" {} ", app.execute_label()), button_style),
        Span::raw("  "),
        Span::styled(
            format!(" {} {} ▾ ", app.state.selection.language, app.state.selection.version),
            Style::default().fg(Color::Black).bg(Color::White),
        ),
    ]);

    let bar = Paragraph::new(line).style(Style::default().bg(ACCENT).fg(Color::White));
    frame.render_widget(bar, area);
}

fn render_editor(frame: &mut Frame, app: &mut App, area: Rect) {
    let title = format!("main · {}", app.state.selection.language);
    let border = if app.focus == Focus::Editor { Color::Green } else { Color::DarkGray };
    app.editor.set_block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(title),
    );
    app.editor
        .set_line_number_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(&app.editor, area);
}

fn render_output_panes(frame: &mut Frame, app: &App, area: Rect) {
    let panes = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let console = Paragraph::new(app.console_text())
        .style(Style::default().bg(PANE_BG).fg(Color::White))
        .block(pane_block("Console"))
        .wrap(Wrap { trim: false });
    frame.render_widget(console, panes[0]);

    let error_fg = if app.state.error.is_empty() { Color::White } else { Color::Red };
    let error = Paragraph::new(app.error_text())
        .style(Style::default().bg(PANE_BG).fg(error_fg))
        .block(pane_block("Error"))
        .wrap(Wrap { trim: false });
    frame.render_widget(error, panes[1]);
}

fn pane_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_style(Style::default().add_modifier(Modifier::BOLD))
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status_paragraph =
        Paragraph::new(app.status_line()).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(status_paragraph, area);
}

fn render_language_picker(frame: &mut Frame, app: &mut App) {
    let popup_area = centered_rect(40, 60, frame.area());
    frame.render_widget(Clear, popup_area);

    let title = match &app.state.catalog_status {
        CatalogStatus::Loading => "Language (loading...)".to_string(),
        CatalogStatus::Loaded => "Language".to_string(),
        CatalogStatus::Unavailable(reason) => format!("Language (unavailable: {})", reason),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    if app.state.catalog.is_empty() {
        let hint = match app.state.catalog_status {
            CatalogStatus::Loading => "Fetching runtimes...",
            _ => "No runtimes available. Press F3 to retry.",
        };
        frame.render_widget(Paragraph::new(hint).block(block).wrap(Wrap { trim: true }), popup_area);
        return;
    }

    let items: Vec<ListItem> = app
        .state
        .catalog
        .options()
        .iter()
        .map(|o| {
            ListItem::new(Line::from(vec![
                Span::raw(o.language.clone()),
                Span::styled(format!("  {}", o.version), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(ACCENT).fg(Color::White).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, popup_area, &mut app.picker);
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame) {
    let popup_area = centered_rect(60, 60, frame.area());

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let help_lines = vec![
        Line::from("Codepad Help"),
        Line::from(""),
        Line::from("Run:"),
        Line::from("  Ctrl+E / F5   - Execute buffer"),
        Line::from(""),
        Line::from("Language:"),
        Line::from("  Ctrl+L / F2   - Open/close language picker"),
        Line::from("  ↑/↓ Enter Esc - Move, select, close"),
        Line::from("  F3            - Reload runtimes"),
        Line::from(""),
        Line::from("General:"),
        Line::from("  F1            - Toggle this help"),
        Line::from("  Ctrl+Q        - Quit"),
    ];

    let help_paragraph = Paragraph::new(Text::from(help_lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help")
                .title_style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(help_paragraph, popup_area);
}

/// Helper function to create a centered rectangle
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
