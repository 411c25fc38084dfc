use chrono::{Duration, Local, Months};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tracing::debug;
use tui_textarea::{Input, Key};

use super::{App, Focus, Tab};
use crate::model::{Condition, Flow};

/// Handle one key press. Returns true when the app should quit.
pub fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if key.code == KeyCode::Char('c') && ctrl {
        return true;
    }

    if app.show_validation_error {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
            app.show_validation_error = false;
            app.validation_error_message.clear();
        }
        return false;
    }

    if app.show_help_overlay {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?') => {
                app.show_help_overlay = false;
                app.help_scroll = 0;
            }
            KeyCode::Up => app.help_scroll = app.help_scroll.saturating_sub(1),
            KeyCode::Down => app.help_scroll = app.help_scroll.saturating_add(1),
            _ => {}
        }
        return false;
    }

    if app.show_calendar {
        handle_calendar_key(app, key);
        return false;
    }

    if app.metric_input.is_some() {
        handle_metric_input_key(app, key);
        return false;
    }

    if app.editing_notes {
        handle_notes_key(app, key);
        return false;
    }

    if !app.tracker.is_onboarded() {
        return handle_onboarding_key(app, key);
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('?') => {
            app.show_help_overlay = true;
            return false;
        }
        KeyCode::Tab => {
            app.tab = app.tab.next();
            return false;
        }
        KeyCode::BackTab => {
            app.tab = app.tab.prev();
            return false;
        }
        KeyCode::Char('s') if ctrl => {
            if app.tab == Tab::Calendar {
                app.save();
            }
            return false;
        }
        _ => {}
    }

    match app.tab {
        Tab::Calendar => handle_calendar_tab_key(app, key),
        Tab::Insights => {}
        Tab::Settings => handle_settings_key(app, key),
    }
    false
}

fn handle_onboarding_key(app: &mut App, key: KeyEvent) -> bool {
    let choice = match key.code {
        KeyCode::Char('1') | KeyCode::Char('p') => Some(Condition::Pcos),
        KeyCode::Char('2') | KeyCode::Char('d') => Some(Condition::Pcod),
        KeyCode::Char('3') | KeyCode::Char('n') => Some(Condition::Neither),
        KeyCode::Enter => Condition::ALL.get(app.onboarding_cursor).copied(),
        KeyCode::Up => {
            app.onboarding_cursor = app.onboarding_cursor.saturating_sub(1);
            None
        }
        KeyCode::Down => {
            app.onboarding_cursor = (app.onboarding_cursor + 1).min(Condition::ALL.len() - 1);
            None
        }
        KeyCode::Char('q') => return true,
        _ => None,
    };
    if let Some(condition) = choice {
        app.choose_condition(condition);
    }
    false
}

fn handle_calendar_tab_key(app: &mut App, key: KeyEvent) {
    // Date navigation works from any section
    match key.code {
        KeyCode::Char('[') => {
            app.step_day(false);
            return;
        }
        KeyCode::Char(']') => {
            app.step_day(true);
            return;
        }
        KeyCode::Char('t') => {
            app.select_date(Local::now().date_naive());
            return;
        }
        KeyCode::Char('c') => {
            app.open_calendar();
            return;
        }
        KeyCode::Up => {
            app.move_focus(false);
            return;
        }
        KeyCode::Down => {
            app.move_focus(true);
            return;
        }
        _ => {}
    }

    match app.focus {
        Focus::Flow => match key.code {
            KeyCode::Left => app.tracker.set_flow(step_flow(app.tracker.draft().flow, false)),
            KeyCode::Right => app.tracker.set_flow(step_flow(app.tracker.draft().flow, true)),
            KeyCode::Char('1') => app.tracker.set_flow(Some(Flow::Light)),
            KeyCode::Char('2') => app.tracker.set_flow(Some(Flow::Medium)),
            KeyCode::Char('3') => app.tracker.set_flow(Some(Flow::Heavy)),
            KeyCode::Backspace | KeyCode::Delete => app.tracker.set_flow(None),
            _ => {}
        },
        Focus::Symptoms => {
            let count = app.tracker.symptom_options().len();
            match key.code {
                KeyCode::Left => app.symptom_cursor = app.symptom_cursor.saturating_sub(1),
                KeyCode::Right => {
                    app.symptom_cursor = (app.symptom_cursor + 1).min(count.saturating_sub(1));
                }
                KeyCode::Char(' ') | KeyCode::Enter => app.toggle_symptom_at(app.symptom_cursor),
                _ => {}
            }
        }
        Focus::Metric(field) if field.is_numeric() => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                app.start_metric_input(field);
            }
        }
        Focus::Metric(field) => match key.code {
            KeyCode::Left => app.cycle_severity(field, false),
            KeyCode::Right | KeyCode::Enter | KeyCode::Char(' ') => app.cycle_severity(field, true),
            _ => {}
        },
        Focus::Notes => {
            if key.code == KeyCode::Enter {
                app.start_notes_editing();
            }
        }
        Focus::Save => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                app.save();
            }
        }
    }
}

fn step_flow(current: Option<Flow>, forward: bool) -> Option<Flow> {
    let idx = current.and_then(|f| Flow::ALL.iter().position(|x| *x == f));
    match (idx, forward) {
        (None, true) => Some(Flow::Light),
        (None, false) => Some(Flow::Heavy),
        (Some(i), true) => Flow::ALL.get(i + 1).copied().or(current),
        (Some(0), false) => current,
        (Some(i), false) => Flow::ALL.get(i - 1).copied(),
    }
}

fn handle_settings_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') => app.reset_condition(),
        KeyCode::Char(' ') => app.predictions_checkbox = !app.predictions_checkbox,
        _ => {}
    }
}

fn handle_calendar_key(app: &mut App, key: KeyEvent) {
    let cursor = app.calendar_cursor;
    match key.code {
        KeyCode::Esc => app.show_calendar = false,
        KeyCode::Enter => {
            app.show_calendar = false;
            app.select_date(cursor);
        }
        KeyCode::Left => app.calendar_cursor = cursor - Duration::days(1),
        KeyCode::Right => app.calendar_cursor = cursor + Duration::days(1),
        KeyCode::Up => app.calendar_cursor = cursor - Duration::days(7),
        KeyCode::Down => app.calendar_cursor = cursor + Duration::days(7),
        KeyCode::PageUp => {
            app.calendar_cursor = cursor.checked_sub_months(Months::new(1)).unwrap_or(cursor);
        }
        KeyCode::PageDown => {
            app.calendar_cursor = cursor.checked_add_months(Months::new(1)).unwrap_or(cursor);
        }
        _ => {}
    }
}

fn handle_metric_input_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.metric_input = None,
        KeyCode::Enter => app.commit_metric_input(),
        KeyCode::Char('s') if ctrl => {
            app.commit_metric_input();
            if !app.show_validation_error {
                app.save();
            }
        }
        KeyCode::Backspace => {
            if let Some(input) = app.metric_input.as_mut() {
                input.buffer.pop();
            }
        }
        KeyCode::Char(c) if !ctrl => {
            if let Some(input) = app.metric_input.as_mut() {
                input.buffer.push(c);
            }
        }
        _ => {}
    }
}

fn handle_notes_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if key.code == KeyCode::Esc {
        app.finish_notes_editing();
        return;
    }
    if key.code == KeyCode::Char('s') && ctrl {
        app.save();
        return;
    }

    // Forward everything else to the textarea for normal text editing
    let input = Input {
        key: match key.code {
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Enter => Key::Enter,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Delete => Key::Delete,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Tab => Key::Tab,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            KeyCode::F(n) => Key::F(n),
            _ => Key::Null,
        },
        ctrl,
        alt: key.modifiers.contains(KeyModifiers::ALT),
    };
    app.textarea.input(input);
}

// ============================================================================
// MOUSE
// ============================================================================

fn inside_rect(mouse: MouseEvent, rect: Rect) -> bool {
    mouse.row >= rect.y
        && mouse.row < rect.y + rect.height
        && mouse.column >= rect.x
        && mouse.column < rect.x + rect.width
}

fn find_clicked<T: Copy>(mouse: MouseEvent, items: &[(T, Rect)]) -> Option<T> {
    items
        .iter()
        .find(|(_, rect)| inside_rect(mouse, *rect))
        .map(|(item, _)| *item)
}

pub fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.show_help_overlay {
        match mouse.kind {
            MouseEventKind::ScrollUp => app.help_scroll = app.help_scroll.saturating_sub(3),
            MouseEventKind::ScrollDown => app.help_scroll = app.help_scroll.saturating_add(3),
            _ => {}
        }
        return;
    }

    if mouse.kind != MouseEventKind::Down(MouseButton::Left) || app.show_validation_error {
        return;
    }

    if app.show_calendar {
        if let Some(date) = find_clicked(mouse, &app.calendar_day_rects) {
            app.show_calendar = false;
            app.select_date(date);
        }
        return;
    }

    if !app.tracker.is_onboarded() {
        if let Some(condition) = find_clicked(mouse, &app.condition_btns) {
            app.choose_condition(condition);
        }
        return;
    }

    // A click anywhere outside the notes box ends notes editing
    if app.editing_notes && !inside_rect(mouse, app.notes_area) {
        app.finish_notes_editing();
    }
    if app.metric_input.is_some() {
        app.metric_input = None;
    }

    if let Some(tab) = find_clicked(mouse, &app.tab_btns) {
        app.tab = tab;
        return;
    }

    match app.tab {
        Tab::Calendar => handle_calendar_tab_mouse(app, mouse),
        Tab::Insights => {}
        Tab::Settings => {
            if inside_rect(mouse, app.change_condition_btn) {
                app.reset_condition();
            } else if inside_rect(mouse, app.predictions_btn) {
                app.predictions_checkbox = !app.predictions_checkbox;
            }
        }
    }
}

fn handle_calendar_tab_mouse(app: &mut App, mouse: MouseEvent) {
    if inside_rect(mouse, app.prev_day_btn) {
        app.step_day(false);
        return;
    }
    if inside_rect(mouse, app.next_day_btn) {
        app.step_day(true);
        return;
    }
    if inside_rect(mouse, app.date_btn) {
        app.open_calendar();
        return;
    }
    if inside_rect(mouse, app.today_btn) {
        app.select_date(Local::now().date_naive());
        return;
    }
    if let Some(flow) = find_clicked(mouse, &app.flow_btns) {
        app.tracker.set_flow(Some(flow));
        app.focus = Focus::Flow;
        return;
    }
    if let Some(idx) = find_clicked(mouse, &app.symptom_items) {
        app.toggle_symptom_at(idx);
        app.focus = Focus::Symptoms;
        return;
    }
    if let Some(field) = find_clicked(mouse, &app.metric_items) {
        if field.is_numeric() {
            app.start_metric_input(field);
        } else {
            app.focus = Focus::Metric(field);
            app.cycle_severity(field, true);
        }
        return;
    }
    if inside_rect(mouse, app.notes_area) {
        if !app.editing_notes {
            app.start_notes_editing();
        }
        return;
    }
    if inside_rect(mouse, app.save_btn) {
        app.focus = Focus::Save;
        app.save();
        return;
    }
    debug!(column = mouse.column, row = mouse.row, "click outside controls");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MetricField, Severity};
    use crate::tracker::Tracker;
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(app: &mut App, c: char) -> bool {
        handle_key(app, KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn click(app: &mut App, rect: Rect) {
        handle_mouse(
            app,
            MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column: rect.x,
                row: rect.y,
                modifiers: KeyModifiers::NONE,
            },
        );
    }

    fn new_app() -> App {
        App::new(Tracker::new(ymd(2024, 3, 1)))
    }

    #[test]
    fn test_onboarding_keys() {
        let mut app = new_app();
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.tracker.condition(), Some(Condition::Pcod));

        let mut app = new_app();
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.tracker.condition(), Some(Condition::Neither));
    }

    #[test]
    fn test_quit_keys() {
        let mut app = new_app();
        assert!(ctrl(&mut app, 'c'));
        assert!(press(&mut app, KeyCode::Char('q')));
        press(&mut app, KeyCode::Char('p'));
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn test_flow_keys() {
        let mut app = new_app();
        press(&mut app, KeyCode::Char('p'));
        press(&mut app, KeyCode::Right);
        assert_eq!(app.tracker.draft().flow, Some(Flow::Light));
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.tracker.draft().flow, Some(Flow::Heavy));
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.tracker.draft().flow, Some(Flow::Medium));
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.tracker.draft().flow, None);
    }

    #[test]
    fn test_step_flow() {
        assert_eq!(step_flow(None, false), Some(Flow::Heavy));
        assert_eq!(step_flow(Some(Flow::Light), false), Some(Flow::Light));
        assert_eq!(step_flow(Some(Flow::Medium), false), Some(Flow::Light));
    }

    #[test]
    fn test_symptom_toggle_keys() {
        let mut app = new_app();
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Down);
        assert_eq!(app.focus, Focus::Symptoms);
        press(&mut app, KeyCode::Char(' '));
        assert!(app.tracker.has_symptom("Cramps"));
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);
        assert!(app.tracker.has_symptom("Headache"));
        press(&mut app, KeyCode::Enter);
        assert!(!app.tracker.has_symptom("Headache"));
    }

    #[test]
    fn test_numeric_metric_entry() {
        let mut app = new_app();
        press(&mut app, KeyCode::Char('p'));
        app.focus = Focus::Metric(MetricField::Weight);
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "62.5q");
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);
        assert!(app.metric_input.is_none());
        assert_eq!(app.tracker.draft().metrics.weight_kg(), Some(62.5));
    }

    #[test]
    fn test_bad_numeric_metric_shows_popup_and_blocks_keys() {
        let mut app = new_app();
        press(&mut app, KeyCode::Char('p'));
        app.focus = Focus::Metric(MetricField::InsulinLevel);
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "high");
        press(&mut app, KeyCode::Enter);
        assert!(app.show_validation_error);
        assert!(!press(&mut app, KeyCode::Char('q')));
        press(&mut app, KeyCode::Esc);
        assert!(!app.show_validation_error);
        assert_eq!(app.tracker.draft().metrics.insulin_level(), None);
    }

    #[test]
    fn test_ctrl_s_commits_and_saves_metric_input() {
        let mut app = new_app();
        press(&mut app, KeyCode::Char('p'));
        app.focus = Focus::Metric(MetricField::Weight);
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "6");
        ctrl(&mut app, 's');
        assert!(app.metric_input.is_none());
        let record = app.tracker.record(ymd(2024, 3, 1)).unwrap();
        assert_eq!(record.metrics.weight_kg(), Some(6.0));
    }

    #[test]
    fn test_ctrl_s_with_bad_metric_does_not_save() {
        let mut app = new_app();
        press(&mut app, KeyCode::Char('p'));
        app.focus = Focus::Metric(MetricField::Weight);
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "six");
        ctrl(&mut app, 's');
        assert!(app.show_validation_error);
        assert!(app.tracker.record(ymd(2024, 3, 1)).is_none());
    }

    #[test]
    fn test_severity_keys() {
        let mut app = new_app();
        press(&mut app, KeyCode::Char('d'));
        app.focus = Focus::Metric(MetricField::Acne);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.tracker.draft().metrics.acne(), Some(Severity::Moderate));
    }

    #[test]
    fn test_notes_editing_keys() {
        let mut app = new_app();
        press(&mut app, KeyCode::Char('n'));
        app.focus = Focus::Notes;
        press(&mut app, KeyCode::Enter);
        assert!(app.editing_notes);
        type_text(&mut app, "q is a letter");
        assert!(app.editing_notes);
        press(&mut app, KeyCode::Esc);
        assert!(!app.editing_notes);
        assert_eq!(app.tracker.draft().notes, "q is a letter");
    }

    #[test]
    fn test_ctrl_s_saves_while_editing_notes() {
        let mut app = new_app();
        press(&mut app, KeyCode::Char('n'));
        app.focus = Focus::Notes;
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "ok");
        ctrl(&mut app, 's');
        let record = app.tracker.record(ymd(2024, 3, 1)).unwrap();
        assert_eq!(record.notes, "ok");
    }

    #[test]
    fn test_day_navigation_keys() {
        let mut app = new_app();
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Char(']'));
        assert_eq!(app.tracker.selected_date(), ymd(2024, 3, 2));
        press(&mut app, KeyCode::Char('['));
        press(&mut app, KeyCode::Char('['));
        assert_eq!(app.tracker.selected_date(), ymd(2024, 2, 29));
        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.tracker.selected_date(), Local::now().date_naive());
    }

    #[test]
    fn test_calendar_picker_keys() {
        let mut app = new_app();
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Char('c'));
        assert!(app.show_calendar);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::PageDown);
        press(&mut app, KeyCode::Enter);
        assert!(!app.show_calendar);
        assert_eq!(app.tracker.selected_date(), ymd(2024, 4, 9));
    }

    #[test]
    fn test_calendar_picker_escape_keeps_date() {
        let mut app = new_app();
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Char('c'));
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.tracker.selected_date(), ymd(2024, 3, 1));
    }

    #[test]
    fn test_tab_switching_and_settings_reset() {
        let mut app = new_app();
        press(&mut app, KeyCode::Char('p'));
        app.tracker.save();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.tab, Tab::Insights);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.tab, Tab::Settings);
        press(&mut app, KeyCode::Char(' '));
        assert!(app.predictions_checkbox);
        press(&mut app, KeyCode::Char('r'));
        assert!(!app.tracker.is_onboarded());
        assert_eq!(app.tracker.cycle_data().len(), 1);
    }

    #[test]
    fn test_help_overlay_toggle() {
        let mut app = new_app();
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help_overlay);
        press(&mut app, KeyCode::Char('?'));
        assert!(!app.show_help_overlay);
    }

    #[test]
    fn test_mouse_clicks() {
        let mut app = new_app();
        app.condition_btns = vec![(Condition::Pcos, Rect::new(0, 0, 10, 3))];
        click(&mut app, Rect::new(2, 1, 1, 1));
        assert_eq!(app.tracker.condition(), Some(Condition::Pcos));

        app.flow_btns = vec![(Flow::Heavy, Rect::new(0, 5, 10, 1))];
        app.symptom_items = vec![(3, Rect::new(0, 7, 10, 1))];
        app.save_btn = Rect::new(0, 9, 10, 3);
        click(&mut app, Rect::new(0, 5, 1, 1));
        click(&mut app, Rect::new(0, 7, 1, 1));
        click(&mut app, Rect::new(0, 10, 1, 1));

        let record = app.tracker.record(ymd(2024, 3, 1)).unwrap();
        assert_eq!(record.flow, Some(Flow::Heavy));
        assert!(record.symptoms.contains("Bloating"));
    }
}
