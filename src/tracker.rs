//! The in-memory application state: chosen condition, saved day records, and
//! the editor draft for the selected date.
//!
//! The draft is a separate value from anything in [`CycleData`]. Edits land in
//! the draft only; [`Tracker::save`] is the single path into stored records.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::model::{Condition, DayRecord, Flow, MetricField, MetricValue, Metrics, symptom_options};

/// Saved records keyed by date, oldest first.
pub type CycleData = BTreeMap<NaiveDate, DayRecord>;

/// Onboarding outcome. Replaced wholesale on reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub condition: Option<Condition>,
}

/// Unsaved working copy of a day's fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayDraft {
    pub flow: Option<Flow>,
    pub symptoms: BTreeSet<String>,
    pub notes: String,
    pub metrics: Metrics,
}

impl DayDraft {
    /// Empty draft with metrics shaped for `condition`.
    pub fn empty(condition: Option<Condition>) -> Self {
        Self {
            metrics: Metrics::for_condition(condition),
            ..Self::default()
        }
    }

    fn from_record(record: &DayRecord) -> Self {
        Self {
            flow: record.flow,
            symptoms: record.symptoms.clone(),
            notes: record.notes.clone(),
            metrics: record.metrics,
        }
    }

    fn to_record(&self, date: NaiveDate) -> DayRecord {
        DayRecord {
            date,
            flow: self.flow,
            symptoms: self.symptoms.clone(),
            notes: self.notes.clone(),
            metrics: self.metrics,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tracker {
    session: Session,
    cycle_data: CycleData,
    selected_date: NaiveDate,
    draft: DayDraft,
}

impl Tracker {
    /// Fresh tracker with no condition, no records, and `date` selected.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            session: Session::default(),
            cycle_data: CycleData::new(),
            selected_date: date,
            draft: DayDraft::empty(None),
        }
    }

    // ------------------------------------------------------------------------
    // Onboarding / settings
    // ------------------------------------------------------------------------

    pub fn condition(&self) -> Option<Condition> {
        self.session.condition
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_onboarded(&self) -> bool {
        self.session.condition.is_some()
    }

    /// Record the onboarding choice. Choosing again is harmless.
    pub fn choose_condition(&mut self, condition: Condition) {
        info!(condition = %condition, "condition selected");
        self.session.condition = Some(condition);
        // A draft loaded from a stored record keeps that record's shape
        if self.draft.metrics.is_blank() && !self.cycle_data.contains_key(&self.selected_date) {
            self.draft.metrics = Metrics::for_condition(Some(condition));
        }
    }

    /// Forget the condition and send the user back to onboarding. Saved
    /// records and the current draft are left alone.
    pub fn reset_condition(&mut self) {
        info!(records = self.cycle_data.len(), "condition reset");
        self.session = Session::default();
    }

    // ------------------------------------------------------------------------
    // Day editor
    // ------------------------------------------------------------------------

    pub fn selected_date(&self) -> NaiveDate {
        self.selected_date
    }

    pub fn draft(&self) -> &DayDraft {
        &self.draft
    }

    /// Switch the editor to `date`, dropping any unsaved edits.
    pub fn select_date(&mut self, date: NaiveDate) {
        self.selected_date = date;
        self.draft = match self.cycle_data.get(&date) {
            Some(record) => DayDraft::from_record(record),
            None => DayDraft::empty(self.session.condition),
        };
        debug!(%date, existing = self.cycle_data.contains_key(&date), "date selected");
    }

    pub fn select_previous_day(&mut self) {
        if let Some(date) = self.selected_date.pred_opt() {
            self.select_date(date);
        }
    }

    pub fn select_next_day(&mut self) {
        if let Some(date) = self.selected_date.succ_opt() {
            self.select_date(date);
        }
    }

    pub fn set_flow(&mut self, flow: Option<Flow>) {
        self.draft.flow = flow;
    }

    /// Add the label if absent, remove it if present.
    pub fn toggle_symptom(&mut self, label: &str) {
        if !self.draft.symptoms.remove(label) {
            self.draft.symptoms.insert(label.to_string());
        }
    }

    pub fn has_symptom(&self, label: &str) -> bool {
        self.draft.symptoms.contains(label)
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.draft.notes = notes.into();
    }

    /// Write one metric into the draft.
    ///
    /// The draft metrics are first reshaped for the current condition, so a
    /// record saved under another condition keeps only its weight once edited.
    pub fn set_metric_field(&mut self, field: MetricField, value: MetricValue) -> Result<()> {
        let condition = self.session.condition.ok_or(Error::ConditionUnset)?;
        if !condition.tracks(field) {
            return Err(Error::MetricNotTracked { field, condition });
        }
        let mut metrics = self.draft.metrics.conform_to(condition);
        if !metrics.set(field, value) {
            return Err(Error::MetricKindMismatch {
                field,
                given: value.kind(),
            });
        }
        self.draft.metrics = metrics;
        Ok(())
    }

    /// Parse raw input for a numeric metric and store it. On error the draft
    /// keeps its previous value.
    pub fn enter_numeric_metric(&mut self, field: MetricField, raw: &str) -> Result<()> {
        let value = MetricValue::parse_number(field, raw).inspect_err(|_| {
            warn!(%field, "rejected metric input");
        })?;
        self.set_metric_field(field, value)
    }

    /// Store the draft under the selected date, replacing any earlier record.
    pub fn save(&mut self) {
        let record = self.draft.to_record(self.selected_date);
        let replaced = self.cycle_data.insert(self.selected_date, record).is_some();
        info!(date = %self.selected_date, replaced, "day saved");
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn cycle_data(&self) -> &CycleData {
        &self.cycle_data
    }

    pub fn record(&self, date: NaiveDate) -> Option<&DayRecord> {
        self.cycle_data.get(&date)
    }

    pub fn symptom_options(&self) -> &'static [&'static str] {
        symptom_options(self.session.condition)
    }

    /// True when the draft differs from what is stored for the selected date.
    pub fn has_unsaved_changes(&self) -> bool {
        match self.cycle_data.get(&self.selected_date) {
            Some(record) => DayDraft::from_record(record) != self.draft,
            None => self.draft != DayDraft::empty(self.session.condition),
        }
    }
}
