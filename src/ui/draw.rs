use chrono::{Datelike, Local, Months, NaiveDate};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use super::{App, Focus, Tab, format_number};
use crate::insights;
use crate::model::{Condition, Flow, MetricField};

const ACCENT: Color = Color::Magenta;

struct HelpTopic {
    title: &'static str,
    detail: &'static str,
}

const HELP_TOPICS: &[HelpTopic] = &[
    HelpTopic {
        title: "Open Help",
        detail: "Press ? to open this help, Esc to hide it.",
    },
    HelpTopic {
        title: "Moving Around",
        detail: "Tab / Shift+Tab switch between Calendar, Insights and Settings. In the calendar, Up/Down move between Flow, Symptoms, metrics, Notes and Save.",
    },
    HelpTopic {
        title: "Picking a Day",
        detail: "[ and ] step one day, t jumps to today, c opens the month picker (arrows move, PgUp/PgDn change month, Enter picks). Switching days drops edits you have not saved.",
    },
    HelpTopic {
        title: "Logging a Day",
        detail: "Flow: Left/Right or 1-3, Backspace clears. Symptoms: Left/Right then Space to toggle. Weight and insulin: Enter, type, Enter. Severities: Left/Right. Notes: Enter to write, Esc to finish.",
    },
    HelpTopic {
        title: "Saving",
        detail: "Ctrl+S or the Save Entry button stores the day. Saving again replaces the stored entry for that date.",
    },
    HelpTopic {
        title: "Changing Condition",
        detail: "Settings > Change condition (r) takes you back to the first screen. Entries you saved are kept.",
    },
    HelpTopic {
        title: "Mouse Basics",
        detail: "Click buttons, symptoms and fields directly. Click a metric to edit it, click the notes box to write.",
    },
];

/// Get centered popup area for overlays
fn get_popup_area(frame_width: u16, frame_height: u16, width_percent: u16, height_percent: u16) -> Rect {
    let width = frame_width.saturating_mul(width_percent) / 100;
    let height = frame_height.saturating_mul(height_percent) / 100;
    let x = (frame_width.saturating_sub(width)) / 2;
    let y = (frame_height.saturating_sub(height)) / 2;
    Rect { x, y, width, height }
}

// Helper: Render button with color
fn render_button(frame: &mut ratatui::Frame, text: &str, area: Rect, style: Style) {
    let btn = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center)
        .style(style);
    frame.render_widget(btn, area);
}

// Helper: Split a rectangular area into N equal horizontal chunks
fn split_equal_horizontal(area: Rect, count: usize) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }
    let pct = 100 / count.max(1) as u16;
    let constraints = vec![Constraint::Percentage(pct); count];
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area)
        .to_vec()
}

fn section_block(title: String, focused: bool) -> Block<'static> {
    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border)
}

fn chip_width(label: &str) -> u16 {
    // "[x] " prefix
    label.chars().count() as u16 + 4
}

/// Place symptom chips left to right, wrapping at `width`.
/// Returns `(x offset, row, width)` per label.
fn chip_layout(labels: &[&str], width: u16) -> Vec<(u16, u16, u16)> {
    let mut out = Vec::with_capacity(labels.len());
    let (mut x, mut row) = (0u16, 0u16);
    for label in labels {
        let w = chip_width(label);
        if x > 0 && x.saturating_add(w) > width {
            x = 0;
            row += 1;
        }
        out.push((x, row, w));
        x = x.saturating_add(w + 2);
    }
    out
}

pub fn draw(frame: &mut ratatui::Frame, app: &mut App) {
    app.validate_focus();

    if app.tracker.is_onboarded() {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(frame.size());

        draw_tab_bar(frame, app, chunks[0]);
        match app.tab {
            Tab::Calendar => draw_calendar_tab(frame, app, chunks[1]),
            Tab::Insights => draw_insights_tab(frame, app, chunks[1]),
            Tab::Settings => draw_settings_tab(frame, app, chunks[1]),
        }
        draw_footer(frame, app, chunks[2]);
    } else {
        draw_onboarding(frame, app);
    }

    if app.show_calendar {
        draw_calendar_picker(frame, app);
    }

    if app.show_help_overlay {
        draw_help_overlay(frame, app);
    }

    if app.show_validation_error {
        draw_validation_error_popup(frame, app);
    }
}

// ============================================================================
// ONBOARDING
// ============================================================================

fn draw_onboarding(frame: &mut ratatui::Frame, app: &mut App) {
    let size = frame.size();
    let area = get_popup_area(size.width, size.height, 70, 90);
    app.condition_btns.clear();

    let block = Block::default()
        .title("Welcome to Luna Track")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .style(Style::default().fg(ACCENT));
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(inner);

    let intro = Paragraph::new(
        "To provide you with better tracking and insights, please let us know if you have been diagnosed with any of the following conditions:",
    )
    .wrap(Wrap { trim: true })
    .alignment(Alignment::Center)
    .style(Style::default().fg(Color::Gray));
    frame.render_widget(intro, chunks[0]);

    for (i, condition) in Condition::ALL.iter().enumerate() {
        let area = chunks[i + 1];
        let style = if i == app.onboarding_cursor {
            Style::default()
                .bg(ACCENT)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(ACCENT)
        };
        let text = vec![
            Line::from(Span::styled(
                format!("{}. {}", i + 1, condition.label()),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(condition.description()),
        ];
        let btn = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL))
            .style(style);
        app.condition_btns.push((*condition, area));
        frame.render_widget(btn, area);
    }

    let footnote = Paragraph::new(
        "This information helps us provide more relevant tracking features and insights for your specific needs.",
    )
    .wrap(Wrap { trim: true })
    .alignment(Alignment::Center)
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footnote, chunks[4]);
}

// ============================================================================
// TABS & FOOTER
// ============================================================================

fn draw_tab_bar(frame: &mut ratatui::Frame, app: &mut App, area: Rect) {
    let chunks = split_equal_horizontal(area, 4);
    app.tab_btns.clear();

    let title = Paragraph::new("Luna Track")
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center)
        .style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD));
    frame.render_widget(title, chunks[0]);

    for (tab, rect) in Tab::ALL.iter().zip(chunks.iter().skip(1)) {
        let style = if *tab == app.tab {
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };
        render_button(frame, tab.label(), *rect, style);
        app.tab_btns.push((*tab, *rect));
    }
}

fn draw_footer(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let line = match &app.status_message {
        Some(msg) => Line::from(Span::styled(msg.clone(), Style::default().fg(Color::Green))),
        None => {
            let hint = match app.tab {
                Tab::Calendar if app.editing_notes => "Esc finish notes  Ctrl+S save",
                Tab::Calendar if app.metric_input.is_some() => "Enter confirm  Esc cancel",
                Tab::Calendar => {
                    "Up/Down section  Left/Right choose  Space toggle  Enter edit  [ ] day  c calendar  Ctrl+S save  Tab switch  ? help  q quit"
                }
                Tab::Insights => "Tab switch  ? help  q quit",
                Tab::Settings => "r change condition  Space checkbox  Tab switch  ? help  q quit",
            };
            Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray)))
        }
    };
    frame.render_widget(Paragraph::new(line), area);
}

// ============================================================================
// CALENDAR TAB
// ============================================================================

fn draw_calendar_tab(frame: &mut ratatui::Frame, app: &mut App, area: Rect) {
    let labels = app.tracker.symptom_options();
    let chips = chip_layout(labels, area.width.saturating_sub(2));
    let symptom_rows = chips.last().map(|c| c.1 + 1).unwrap_or(1);
    let fields = app
        .tracker
        .condition()
        .map(Condition::metric_fields)
        .unwrap_or(&[]);

    let mut constraints = vec![
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(symptom_rows + 2),
    ];
    if !fields.is_empty() {
        constraints.push(Constraint::Length(fields.len() as u16 + 2));
    }
    constraints.push(Constraint::Min(3));
    constraints.push(Constraint::Length(3));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    draw_date_navigation(frame, app, chunks[0]);
    draw_flow(frame, app, chunks[1]);
    draw_symptoms(frame, app, chunks[2], &chips);
    let mut next = 3;
    app.metric_items.clear();
    if !fields.is_empty() {
        draw_metrics(frame, app, chunks[next], fields);
        next += 1;
    }
    draw_notes(frame, app, chunks[next]);
    draw_save_button(frame, app, chunks[next + 1]);
}

fn draw_date_navigation(frame: &mut ratatui::Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(20),
            Constraint::Percentage(40),
            Constraint::Percentage(20),
        ])
        .split(area);

    let nav_style = Style::default().fg(Color::Cyan);
    render_button(frame, "Previous Day", chunks[0], nav_style);
    app.prev_day_btn = chunks[0];
    render_button(frame, "Next Day", chunks[1], nav_style);
    app.next_day_btn = chunks[1];

    let date = app.tracker.selected_date();
    let marker = if app.tracker.has_unsaved_changes() {
        " (unsaved)"
    } else if app.tracker.record(date).is_some() {
        " (saved)"
    } else {
        ""
    };
    let date_display = Paragraph::new(format!("Date {}{}", date, marker))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    app.date_btn = chunks[2];
    frame.render_widget(date_display, chunks[2]);

    render_button(frame, "Jump to Today", chunks[3], Style::default().fg(Color::Green));
    app.today_btn = chunks[3];
}

fn draw_flow(frame: &mut ratatui::Frame, app: &mut App, area: Rect) {
    let block = section_block("Flow".to_string(), app.focus == Focus::Flow);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    app.flow_btns.clear();

    let current = app.tracker.draft().flow;
    for (flow, rect) in Flow::ALL.iter().zip(split_equal_horizontal(inner, Flow::ALL.len())) {
        let selected = current == Some(*flow);
        let style = if selected {
            Style::default()
                .bg(ACCENT)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(ACCENT)
        };
        let text = format!("({}) {}", if selected { "*" } else { " " }, flow.label());
        frame.render_widget(
            Paragraph::new(text).alignment(Alignment::Center).style(style),
            rect,
        );
        app.flow_btns.push((*flow, rect));
    }
}

fn draw_symptoms(frame: &mut ratatui::Frame, app: &mut App, area: Rect, chips: &[(u16, u16, u16)]) {
    let focused = app.focus == Focus::Symptoms;
    let block = section_block("Symptoms".to_string(), focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    app.symptom_items.clear();

    let labels = app.tracker.symptom_options();
    for (idx, (label, (x, row, w))) in labels.iter().zip(chips.iter()).enumerate() {
        if *row >= inner.height || *x >= inner.width {
            continue;
        }
        let rect = Rect {
            x: inner.x + x,
            y: inner.y + row,
            width: (*w).min(inner.width - x),
            height: 1,
        };
        let on = app.tracker.has_symptom(label);
        let mut style = if on {
            Style::default().bg(ACCENT).fg(Color::White)
        } else {
            Style::default().fg(ACCENT)
        };
        if focused && idx == app.symptom_cursor {
            style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
        }
        let text = format!("[{}] {}", if on { "x" } else { " " }, label);
        frame.render_widget(Paragraph::new(text).style(style), rect);
        app.symptom_items.push((idx, rect));
    }
}

fn metric_line(app: &App, field: MetricField) -> String {
    if let Some(input) = app.metric_input.as_ref().filter(|i| i.field == field) {
        return format!("{}: {}_", field.label(), input.buffer);
    }
    let metrics = &app.tracker.draft().metrics;
    let value = match field {
        MetricField::Weight => metrics.weight_kg().map(format_number),
        MetricField::InsulinLevel => metrics.insulin_level().map(format_number),
        MetricField::HairLoss => Some(format!("< {} >", metrics.hair_loss().unwrap_or_default().label())),
        MetricField::Acne => Some(format!("< {} >", metrics.acne().unwrap_or_default().label())),
    };
    format!("{}: {}", field.label(), value.unwrap_or_else(|| "-".to_string()))
}

fn draw_metrics(frame: &mut ratatui::Frame, app: &mut App, area: Rect, fields: &[MetricField]) {
    let focused = matches!(app.focus, Focus::Metric(_));
    let title = match app.tracker.condition() {
        Some(condition) => format!("{} Specific Metrics", condition.label()),
        None => "Metrics".to_string(),
    };
    let block = section_block(title, focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    for (i, field) in fields.iter().enumerate() {
        if i as u16 >= inner.height {
            break;
        }
        let rect = Rect {
            x: inner.x,
            y: inner.y + i as u16,
            width: inner.width,
            height: 1,
        };
        let is_focused = app.focus == Focus::Metric(*field);
        let style = if app.metric_input.as_ref().is_some_and(|m| m.field == *field) {
            Style::default().fg(Color::Yellow).bg(Color::Rgb(30, 30, 40))
        } else if is_focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let prefix = if is_focused { "> " } else { "  " };
        let text = format!("{}{}", prefix, metric_line(app, *field));
        frame.render_widget(Paragraph::new(text).style(style), rect);
        app.metric_items.push((*field, rect));
    }
}

fn textarea_lines_with_cursor(app: &App, height: u16) -> Vec<Line<'static>> {
    let (cursor_row, cursor_col) = app.textarea.cursor();
    let mut lines = Vec::new();
    let text_lines = app.textarea.lines();

    if text_lines.is_empty() {
        lines.push(Line::from("|"));
        return lines;
    }

    for (idx, line) in text_lines.iter().enumerate() {
        if idx == cursor_row {
            let char_col = cursor_col.min(line.chars().count());
            let mut new_line = String::new();
            for (i, c) in line.chars().enumerate() {
                if i == char_col {
                    new_line.push('|');
                }
                new_line.push(c);
            }
            if char_col == line.chars().count() {
                new_line.push('|');
            }
            lines.push(Line::from(Span::styled(
                new_line,
                Style::default().fg(Color::Yellow).bg(Color::Rgb(30, 30, 40)),
            )));
        } else {
            lines.push(Line::from(line.clone()));
        }
    }
    let view_height = height.max(1) as usize;
    if lines.len() > view_height {
        let start = cursor_row.saturating_sub(view_height.saturating_sub(1));
        let end = (start + view_height).min(lines.len());
        lines[start..end].to_vec()
    } else {
        lines
    }
}

fn draw_notes(frame: &mut ratatui::Frame, app: &mut App, area: Rect) {
    app.notes_area = area;
    let focused = app.focus == Focus::Notes;

    if app.editing_notes {
        let inner_height = area.height.saturating_sub(2);
        let lines = textarea_lines_with_cursor(app, inner_height);
        let panel = Paragraph::new(lines)
            .block(section_block(
                "Notes (Esc to finish, Ctrl+S to save)".to_string(),
                true,
            ))
            .wrap(Wrap { trim: false })
            .style(Style::default().fg(Color::Yellow));
        frame.render_widget(panel, area);
        return;
    }

    let notes = &app.tracker.draft().notes;
    let panel = if notes.is_empty() {
        Paragraph::new("Add any notes about your day...")
            .style(Style::default().fg(Color::DarkGray))
    } else {
        Paragraph::new(notes.clone()).wrap(Wrap { trim: false })
    };
    frame.render_widget(panel.block(section_block("Notes".to_string(), focused)), area);
}

fn draw_save_button(frame: &mut ratatui::Frame, app: &mut App, area: Rect) {
    let style = if app.focus == Focus::Save {
        Style::default()
            .bg(ACCENT)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(ACCENT)
    };
    render_button(frame, "Save Entry", area, style);
    app.save_btn = area;
}

// ============================================================================
// INSIGHTS & SETTINGS
// ============================================================================

fn draw_insights_tab(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let condition = app.tracker.condition();
    let mut lines = vec![Line::from(""), Line::from(insights::PLACEHOLDER)];

    if let Some(heading) = insights::focus_heading(condition) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            heading,
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )));
        for item in insights::focus_areas(condition) {
            lines.push(Line::from(format!("  - {item}")));
        }
    }

    let panel = Paragraph::new(lines)
        .block(Block::default().title("Insights").borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    frame.render_widget(panel, area);
}

fn draw_settings_tab(frame: &mut ratatui::Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(0),
        ])
        .split(area);

    let profile = Block::default()
        .title("Your Profile")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT));
    let inner = profile.inner(chunks[0]);
    frame.render_widget(profile, chunks[0]);
    let condition = app
        .tracker
        .condition()
        .map(Condition::profile_label)
        .unwrap_or("Not set");
    frame.render_widget(
        Paragraph::new(format!("Condition: {condition}")).style(Style::default().fg(Color::Gray)),
        Rect { height: 1, ..inner },
    );
    let btn_text = "[ Change condition ] (r)";
    let btn = Rect {
        x: inner.x,
        y: inner.y + 1,
        width: (btn_text.len() as u16).min(inner.width),
        height: inner.height.saturating_sub(1).min(1),
    };
    frame.render_widget(
        Paragraph::new(btn_text).style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
        btn,
    );
    app.change_condition_btn = btn;

    let notifications = Block::default()
        .title("Notifications")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT));
    let inner = notifications.inner(chunks[1]);
    frame.render_widget(notifications, chunks[1]);
    let tick = if app.predictions_checkbox { "x" } else { " " };
    frame.render_widget(
        Paragraph::new(format!("[{tick}] Enable period predictions (Space)")),
        inner,
    );
    app.predictions_btn = inner;

    let privacy = Paragraph::new(
        "Your entries live only in this session's memory and are never shared with third parties. Nothing is written to disk; quitting clears them.",
    )
    .wrap(Wrap { trim: true })
    .style(Style::default().fg(Color::Gray))
    .block(
        Block::default()
            .title("Data Privacy")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT)),
    );
    frame.render_widget(privacy, chunks[2]);
}

// ============================================================================
// POPUPS
// ============================================================================

fn draw_validation_error_popup(frame: &mut ratatui::Frame, app: &App) {
    let size = frame.size();
    let area = get_popup_area(size.width, size.height, 70, 38);

    let block = Block::default()
        .title("[!] Validation Error")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .style(Style::default().fg(Color::Red).bg(Color::Black));

    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(inner);

    let para = Paragraph::new(app.validation_error_message.as_str())
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::White));
    frame.render_widget(para, chunks[0]);

    let hint = Paragraph::new("Press Esc to dismiss")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC));
    frame.render_widget(hint, chunks[1]);
}

fn draw_help_overlay(frame: &mut ratatui::Frame, app: &App) {
    let size = frame.size();
    let area = get_popup_area(size.width, size.height, 80, 80);

    let mut lines = Vec::new();
    for topic in HELP_TOPICS {
        lines.push(Line::from(Span::styled(
            topic.title,
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(topic.detail));
        lines.push(Line::from(""));
    }

    let panel = Paragraph::new(lines)
        .block(
            Block::default()
                .title("Help (Esc to close)")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .style(Style::default().fg(Color::Cyan).bg(Color::Black)),
        )
        .wrap(Wrap { trim: true })
        .scroll((app.help_scroll, 0))
        .style(Style::default().fg(Color::White));
    frame.render_widget(Clear, area);
    frame.render_widget(panel, area);
}

fn draw_calendar_picker(frame: &mut ratatui::Frame, app: &mut App) {
    let size = frame.size();
    let width = 50.min(size.width.saturating_sub(4));
    let height = 20.min(size.height.saturating_sub(4));
    let x = size.x + (size.width.saturating_sub(width)) / 2;
    let y = size.y + (size.height.saturating_sub(height)) / 2;
    let area = Rect { x, y, width, height };

    frame.render_widget(Clear, area);

    let outer_block = Block::default()
        .title("Select Date (Esc to cancel)")
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Cyan).bg(Color::Black));
    let inner_area = outer_block.inner(area);
    frame.render_widget(outer_block, area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(8)])
        .split(inner_area);

    let header_text = vec![
        Line::from(vec![
            Span::styled("◄ ", Style::default().fg(Color::Cyan)),
            Span::styled(
                app.calendar_cursor.format("%B %Y").to_string(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" ►", Style::default().fg(Color::Cyan)),
        ]),
        Line::from(Span::styled(
            "Arrows: day/week  PgUp/PgDn: month  Enter: pick",
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            "Days with a saved entry are marked *",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(
        Paragraph::new(header_text).alignment(Alignment::Center),
        layout[0],
    );

    draw_calendar_grid(frame, app, layout[1]);
}

fn days_in_month(year: i32, month: u32) -> u32 {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(30)
}

fn draw_calendar_grid(frame: &mut ratatui::Frame, app: &mut App, area: Rect) {
    app.calendar_day_rects.clear();

    let (year, month) = app.calendar_month();
    let Some(first_day) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return;
    };
    let weekday_offset = first_day.weekday().num_days_from_monday() as usize;
    let days = days_in_month(year, month);
    let today = Local::now().date_naive();

    let mut lines = Vec::new();
    lines.push(Line::from(vec![
        Span::styled(" Mo  ", Style::default().fg(Color::Cyan)),
        Span::styled(" Tu  ", Style::default().fg(Color::Cyan)),
        Span::styled(" We  ", Style::default().fg(Color::Cyan)),
        Span::styled(" Th  ", Style::default().fg(Color::Cyan)),
        Span::styled(" Fr  ", Style::default().fg(Color::Cyan)),
        Span::styled(" Sa  ", Style::default().fg(Color::Yellow)),
        Span::styled(" Su  ", Style::default().fg(Color::Yellow)),
    ]));
    lines.push(Line::from(""));

    let mut day: u32 = 1;
    let rows = (weekday_offset + days as usize).div_ceil(7);

    for week in 0..rows {
        let mut week_spans = Vec::new();
        for day_of_week in 0..7 {
            let cell_idx = week * 7 + day_of_week;
            if cell_idx < weekday_offset || day > days {
                week_spans.push(Span::raw("     "));
                continue;
            }
            let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
                break;
            };
            let saved = app.tracker.record(date).is_some();

            let style = if date == app.calendar_cursor {
                Style::default().bg(Color::Cyan).fg(Color::Black).add_modifier(Modifier::BOLD)
            } else if saved {
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
            } else if date == today {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else if day_of_week >= 5 {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };

            let day_rect = Rect {
                x: area.x + (day_of_week * 5) as u16,
                y: area.y + 2 + week as u16,
                width: 5,
                height: 1,
            };
            app.calendar_day_rects.push((date, day_rect));

            let mark = if saved { "*" } else { " " };
            week_spans.push(Span::styled(format!(" {:2}{} ", day, mark), style));
            day += 1;
        }
        lines.push(Line::from(week_spans));
    }

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Left), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::Tracker;
    use ratatui::{Terminal, backend::TestBackend, buffer::Buffer};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn buffer_text(buffer: &Buffer) -> String {
        buffer.content.iter().map(|cell| cell.symbol()).collect()
    }

    fn render(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 48)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn test_chip_layout_wraps() {
        let chips = chip_layout(&["Cramps", "Headache", "Fatigue"], 24);
        assert_eq!(chips[0], (0, 0, 10));
        assert_eq!(chips[1], (12, 0, 12));
        assert_eq!(chips[2], (0, 1, 11));
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 12), 31);
        assert_eq!(days_in_month(2024, 4), 30);
    }

    #[test]
    fn test_popup_area_is_centered() {
        let area = get_popup_area(100, 50, 50, 50);
        assert_eq!(area, Rect::new(25, 12, 50, 25));
    }

    #[test]
    fn test_onboarding_screen() {
        let mut app = App::new(Tracker::new(ymd(2024, 3, 1)));
        let text = render(&mut app);
        assert!(text.contains("Welcome to Luna Track"));
        assert!(text.contains("Polycystic Ovary Syndrome"));
        assert!(text.contains("Polycystic Ovarian Disease"));
        assert_eq!(app.condition_btns.len(), 3);
    }

    #[test]
    fn test_calendar_tab_for_pcos() {
        let mut app = App::new(Tracker::new(ymd(2024, 3, 1)));
        app.choose_condition(Condition::Pcos);
        let text = render(&mut app);
        assert!(text.contains("Date 2024-03-01"));
        assert!(text.contains("PCOS Specific Metrics"));
        assert!(text.contains("Insulin Level"));
        assert!(text.contains("Hair Loss"));
        assert!(text.contains("Save Entry"));
        assert_eq!(app.flow_btns.len(), 3);
        assert_eq!(app.symptom_items.len(), 13);
        assert_eq!(app.metric_items.len(), 3);
    }

    #[test]
    fn test_calendar_tab_for_neither_has_no_metrics() {
        let mut app = App::new(Tracker::new(ymd(2024, 3, 1)));
        app.choose_condition(Condition::Neither);
        let text = render(&mut app);
        assert!(!text.contains("Specific Metrics"));
        assert!(app.metric_items.is_empty());
        assert_eq!(app.symptom_items.len(), 7);
    }

    #[test]
    fn test_insights_tab_placeholder() {
        let mut app = App::new(Tracker::new(ymd(2024, 3, 1)));
        app.choose_condition(Condition::Pcod);
        app.tab = Tab::Insights;
        let text = render(&mut app);
        assert!(text.contains("Track your cycle for at least one month"));
        assert!(text.contains("Period heaviness patterns"));
    }

    #[test]
    fn test_insights_tab_stays_static_after_a_month() {
        let mut app = App::new(Tracker::new(ymd(2024, 3, 1)));
        app.choose_condition(Condition::Pcos);
        app.tracker.toggle_symptom("Cramps");
        app.tracker.save();
        app.select_date(ymd(2024, 3, 30));
        app.tracker.save();
        app.select_date(ymd(2024, 4, 15));
        app.tracker.save();
        app.tab = Tab::Insights;
        let text = render(&mut app);
        assert!(text.contains("Track your cycle for at least one month"));
        assert!(text.contains("Insulin level trends"));
        assert!(!text.contains("Cramps"));
    }

    #[test]
    fn test_settings_tab() {
        let mut app = App::new(Tracker::new(ymd(2024, 3, 1)));
        app.choose_condition(Condition::Neither);
        app.tab = Tab::Settings;
        let text = render(&mut app);
        assert!(text.contains("Condition: No specific condition"));
        assert!(text.contains("Enable period predictions"));
        assert!(text.contains("Data Privacy"));
        assert!(app.change_condition_btn.width > 0);
    }

    #[test]
    fn test_calendar_picker_marks_saved_days() {
        let mut app = App::new(Tracker::new(ymd(2024, 3, 1)));
        app.choose_condition(Condition::Pcos);
        app.tracker.save();
        app.open_calendar();
        let text = render(&mut app);
        assert!(text.contains("March 2024"));
        assert!(text.contains(" 1* "));
        assert_eq!(app.calendar_day_rects.len(), 31);
    }

    #[test]
    fn test_validation_popup_renders() {
        let mut app = App::new(Tracker::new(ymd(2024, 3, 1)));
        app.choose_condition(Condition::Pcos);
        app.show_validation_error = true;
        app.validation_error_message = "Weight (kg) Error: bad".to_string();
        let text = render(&mut app);
        assert!(text.contains("Validation Error"));
    }
}
