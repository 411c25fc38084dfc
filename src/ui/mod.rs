// ============================================================================
// TERMINAL UI
// ============================================================================
//
// 1. App state        - tracker plus purely presentational state
// 2. Main loop        - terminal setup and the event loop
// 3. Input            - keyboard and mouse handling (input.rs)
// 4. Rendering        - all drawing (draw.rs)
// ============================================================================

mod draw;
mod input;

use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use tracing::{debug, info};
use tui_textarea::{CursorMove, TextArea};

use crate::config::Config;
use crate::model::{Condition, Flow, MetricField};
use crate::tracker::Tracker;

pub use draw::draw;
pub use input::{handle_key, handle_mouse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Calendar,
    Insights,
    Settings,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Calendar, Tab::Insights, Tab::Settings];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Calendar => "Calendar",
            Tab::Insights => "Insights",
            Tab::Settings => "Settings",
        }
    }

    fn next(self) -> Self {
        match self {
            Tab::Calendar => Tab::Insights,
            Tab::Insights => Tab::Settings,
            Tab::Settings => Tab::Calendar,
        }
    }

    fn prev(self) -> Self {
        match self {
            Tab::Calendar => Tab::Settings,
            Tab::Insights => Tab::Calendar,
            Tab::Settings => Tab::Insights,
        }
    }
}

/// Section of the day editor that receives arrow keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Flow,
    Symptoms,
    Metric(MetricField),
    Notes,
    Save,
}

/// A numeric metric being typed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricInput {
    pub field: MetricField,
    pub buffer: String,
}

pub struct App {
    pub tracker: Tracker,
    pub tab: Tab,
    pub focus: Focus,
    pub symptom_cursor: usize,
    pub onboarding_cursor: usize,

    // Settings checkbox; never reaches the tracker
    pub predictions_checkbox: bool,

    // Notes editor
    pub textarea: TextArea<'static>,
    pub editing_notes: bool,
    pub metric_input: Option<MetricInput>,

    // Calendar picker state
    pub show_calendar: bool,
    pub calendar_cursor: NaiveDate,
    pub calendar_day_rects: Vec<(NaiveDate, Rect)>,

    pub show_help_overlay: bool,
    pub help_scroll: u16,

    // Validation error popup
    pub show_validation_error: bool,
    pub validation_error_message: String,
    pub status_message: Option<String>,

    // UI areas for mouse support
    pub condition_btns: Vec<(Condition, Rect)>,
    pub tab_btns: Vec<(Tab, Rect)>,
    pub prev_day_btn: Rect,
    pub next_day_btn: Rect,
    pub date_btn: Rect,
    pub today_btn: Rect,
    pub flow_btns: Vec<(Flow, Rect)>,
    pub symptom_items: Vec<(usize, Rect)>,
    pub metric_items: Vec<(MetricField, Rect)>,
    pub notes_area: Rect,
    pub save_btn: Rect,
    pub change_condition_btn: Rect,
    pub predictions_btn: Rect,
}

impl App {
    pub fn new(tracker: Tracker) -> Self {
        let calendar_cursor = tracker.selected_date();
        Self {
            tracker,
            tab: Tab::Calendar,
            focus: Focus::Flow,
            symptom_cursor: 0,
            onboarding_cursor: 0,
            predictions_checkbox: false,
            textarea: TextArea::default(),
            editing_notes: false,
            metric_input: None,
            show_calendar: false,
            calendar_cursor,
            calendar_day_rects: Vec::new(),
            show_help_overlay: false,
            help_scroll: 0,
            show_validation_error: false,
            validation_error_message: String::new(),
            status_message: None,
            condition_btns: Vec::new(),
            tab_btns: Vec::new(),
            prev_day_btn: Rect::default(),
            next_day_btn: Rect::default(),
            date_btn: Rect::default(),
            today_btn: Rect::default(),
            flow_btns: Vec::new(),
            symptom_items: Vec::new(),
            metric_items: Vec::new(),
            notes_area: Rect::default(),
            save_btn: Rect::default(),
            change_condition_btn: Rect::default(),
            predictions_btn: Rect::default(),
        }
    }

    /// Editor sections in top-to-bottom order for the current condition.
    pub fn focus_order(&self) -> Vec<Focus> {
        let mut order = vec![Focus::Flow, Focus::Symptoms];
        if let Some(condition) = self.tracker.condition() {
            order.extend(condition.metric_fields().iter().map(|f| Focus::Metric(*f)));
        }
        order.push(Focus::Notes);
        order.push(Focus::Save);
        order
    }

    fn move_focus(&mut self, forward: bool) {
        let order = self.focus_order();
        let pos = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (pos + 1).min(order.len() - 1)
        } else {
            pos.saturating_sub(1)
        };
        self.focus = order[next];
        debug!(focus = ?self.focus, "focus moved");
    }

    /// Clamp focus and cursors after the condition changes.
    pub fn validate_focus(&mut self) {
        if !self.focus_order().contains(&self.focus) {
            self.focus = Focus::Flow;
        }
        let count = self.tracker.symptom_options().len();
        if self.symptom_cursor >= count {
            self.symptom_cursor = count.saturating_sub(1);
        }
        if self.onboarding_cursor >= Condition::ALL.len() {
            self.onboarding_cursor = 0;
        }
    }

    pub fn choose_condition(&mut self, condition: Condition) {
        self.tracker.choose_condition(condition);
        self.tab = Tab::Calendar;
        self.validate_focus();
    }

    pub fn reset_condition(&mut self) {
        self.finish_notes_editing();
        self.metric_input = None;
        self.tracker.reset_condition();
        self.onboarding_cursor = 0;
        self.validate_focus();
    }

    pub fn select_date(&mut self, date: NaiveDate) {
        self.finish_notes_editing();
        self.metric_input = None;
        self.tracker.select_date(date);
        self.status_message = None;
    }

    /// Move the editor one day back or forward.
    pub fn step_day(&mut self, forward: bool) {
        self.finish_notes_editing();
        self.metric_input = None;
        if forward {
            self.tracker.select_next_day();
        } else {
            self.tracker.select_previous_day();
        }
        self.status_message = None;
    }

    pub fn toggle_symptom_at(&mut self, idx: usize) {
        if let Some(label) = self.tracker.symptom_options().get(idx) {
            self.tracker.toggle_symptom(label);
            self.symptom_cursor = idx;
        }
    }

    pub fn save(&mut self) {
        self.finish_notes_editing();
        self.tracker.save();
        self.status_message = Some(format!("Saved entry for {}", self.tracker.selected_date()));
    }

    pub fn open_calendar(&mut self) {
        self.show_calendar = true;
        self.calendar_cursor = self.tracker.selected_date();
    }

    pub fn start_notes_editing(&mut self) {
        // split keeps a trailing empty line, so lines().join("\n") round-trips
        let lines: Vec<String> = self
            .tracker
            .draft()
            .notes
            .split('\n')
            .map(|s| s.to_string())
            .collect();
        let last_row = lines.len().saturating_sub(1);
        let last_col = lines.last().map(|l| l.chars().count()).unwrap_or(0);
        self.textarea = TextArea::new(lines);
        self.textarea
            .move_cursor(CursorMove::Jump(last_row as u16, last_col as u16));
        self.editing_notes = true;
        self.focus = Focus::Notes;
    }

    /// Copy the notes editor into the draft and leave edit mode.
    pub fn finish_notes_editing(&mut self) {
        if self.editing_notes {
            self.tracker.set_notes(self.textarea.lines().join("\n"));
            self.editing_notes = false;
        }
    }

    pub fn start_metric_input(&mut self, field: MetricField) {
        let metrics = &self.tracker.draft().metrics;
        let current = match field {
            MetricField::Weight => metrics.weight_kg(),
            MetricField::InsulinLevel => metrics.insulin_level(),
            MetricField::HairLoss | MetricField::Acne => None,
        };
        self.metric_input = Some(MetricInput {
            field,
            buffer: current.map(format_number).unwrap_or_default(),
        });
        self.focus = Focus::Metric(field);
    }

    pub fn commit_metric_input(&mut self) {
        let Some(input) = self.metric_input.take() else {
            return;
        };
        if let Err(err) = self.tracker.enter_numeric_metric(input.field, &input.buffer) {
            handle_validation_error(self, &err.to_string(), input.field.label());
        }
    }

    pub fn cycle_severity(&mut self, field: MetricField, forward: bool) {
        let metrics = &self.tracker.draft().metrics;
        let current = match field {
            MetricField::HairLoss => metrics.hair_loss(),
            MetricField::Acne => metrics.acne(),
            MetricField::Weight | MetricField::InsulinLevel => return,
        }
        .unwrap_or_default();
        let next = if forward { current.next() } else { current.prev() };
        if let Err(err) = self
            .tracker
            .set_metric_field(field, crate::model::MetricValue::Severity(next))
        {
            handle_validation_error(self, &err.to_string(), field.label());
        }
    }

    pub fn calendar_month(&self) -> (i32, u32) {
        (self.calendar_cursor.year(), self.calendar_cursor.month())
    }
}

/// Show validation error popup without touching the draft.
#[inline]
fn handle_validation_error(app: &mut App, error_msg: &str, context: &str) {
    app.show_validation_error = true;
    app.validation_error_message = format!(
        "{} Error: {}\n\nPlease correct and try again.",
        context, error_msg
    );
}

/// Numbers as typed: `70` rather than `70.0`.
pub fn format_number(value: f64) -> String {
    format!("{value}")
}

// ============================================================================
// MAIN LOOP
// ============================================================================

/// Take over the terminal and run until the user quits.
pub fn run(config: &Config, tracker: Tracker) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    if config.ui.mouse {
        execute!(stdout, event::EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(tracker);
    info!(onboarded = app.tracker.is_onboarded(), "ui started");
    let res = run_app(&mut terminal, &mut app, config.tick_rate());

    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        event::DisableMouseCapture
    )
    .ok();
    terminal.show_cursor().ok();

    info!(records = app.tracker.cycle_data().len(), "ui stopped");
    res
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    tick_rate: Duration,
) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|frame| draw(frame, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::from_secs(0));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if handle_key(app, key) {
                        break;
                    }
                }
                Event::Mouse(mouse) => handle_mouse(app, mouse),
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }

    Ok(())
}
