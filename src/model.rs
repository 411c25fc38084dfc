//! Day records and the condition-dependent vocabulary around them.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Canonical textual form of a date key.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date key.
pub fn parse_date_key(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    // chrono accepts unpadded fields, keys must be the canonical width
    if trimmed.len() != 10 {
        return Err(Error::InvalidDate {
            input: input.to_string(),
        });
    }
    NaiveDate::parse_from_str(trimmed, DATE_KEY_FORMAT).map_err(|_| Error::InvalidDate {
        input: input.to_string(),
    })
}

/// Render a date in its canonical key form.
#[must_use]
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

// ============================================================================
// CONDITION
// ============================================================================

/// Self-reported diagnosis class chosen at onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Pcos,
    Pcod,
    Neither,
}

impl Condition {
    /// Onboarding order.
    pub const ALL: [Condition; 3] = [Condition::Pcos, Condition::Pcod, Condition::Neither];

    pub fn label(self) -> &'static str {
        match self {
            Condition::Pcos => "PCOS",
            Condition::Pcod => "PCOD",
            Condition::Neither => "Neither",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Condition::Pcos => "Polycystic Ovary Syndrome",
            Condition::Pcod => "Polycystic Ovarian Disease",
            Condition::Neither => "I have not been diagnosed with either condition",
        }
    }

    /// Wording used on the settings profile card.
    pub fn profile_label(self) -> &'static str {
        match self {
            Condition::Neither => "No specific condition",
            other => other.label(),
        }
    }

    /// Metric inputs shown in the day editor, in display order.
    pub fn metric_fields(self) -> &'static [MetricField] {
        match self {
            Condition::Pcos => &[
                MetricField::Weight,
                MetricField::HairLoss,
                MetricField::InsulinLevel,
            ],
            Condition::Pcod => &[MetricField::Weight, MetricField::Acne],
            Condition::Neither => &[],
        }
    }

    pub fn tracks(self, field: MetricField) -> bool {
        self.metric_fields().contains(&field)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Condition {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pcos" => Ok(Condition::Pcos),
            "pcod" => Ok(Condition::Pcod),
            "neither" | "none" => Ok(Condition::Neither),
            _ => Err(format!(
                "Invalid condition '{s}'. Valid options: pcos|pcod|neither"
            )),
        }
    }
}

// ============================================================================
// SYMPTOM VOCABULARY
// ============================================================================

pub const BASE_SYMPTOMS: &[&str] = &[
    "Cramps",
    "Headache",
    "Fatigue",
    "Bloating",
    "Mood Swings",
    "Back Pain",
    "Breast Tenderness",
];

pub const PCOS_SYMPTOMS: &[&str] = &[
    "Cramps",
    "Headache",
    "Fatigue",
    "Bloating",
    "Mood Swings",
    "Back Pain",
    "Breast Tenderness",
    "Irregular Periods",
    "Weight Gain",
    "Hair Growth",
    "Hair Loss",
    "Acne",
    "Insulin Resistance",
];

pub const PCOD_SYMPTOMS: &[&str] = &[
    "Cramps",
    "Headache",
    "Fatigue",
    "Bloating",
    "Mood Swings",
    "Back Pain",
    "Breast Tenderness",
    "Pelvic Pain",
    "Heavy Periods",
    "Weight Gain",
    "Acne",
];

/// Symptom labels offered for a condition. An unset condition gets the base set.
#[must_use]
pub fn symptom_options(condition: Option<Condition>) -> &'static [&'static str] {
    match condition {
        Some(Condition::Pcos) => PCOS_SYMPTOMS,
        Some(Condition::Pcod) => PCOD_SYMPTOMS,
        Some(Condition::Neither) | None => BASE_SYMPTOMS,
    }
}

// ============================================================================
// FLOW & SEVERITY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Flow {
    Light,
    Medium,
    Heavy,
}

impl Flow {
    pub const ALL: [Flow; 3] = [Flow::Light, Flow::Medium, Flow::Heavy];

    pub fn label(self) -> &'static str {
        match self {
            Flow::Light => "Light",
            Flow::Medium => "Medium",
            Flow::Heavy => "Heavy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Severity {
    #[default]
    None,
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::None,
        Severity::Mild,
        Severity::Moderate,
        Severity::Severe,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Severity::None => "None",
            Severity::Mild => "Mild",
            Severity::Moderate => "Moderate",
            Severity::Severe => "Severe",
        }
    }

    /// Next level, wrapping from severe back to none.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Severity::None => Severity::Mild,
            Severity::Mild => Severity::Moderate,
            Severity::Moderate => Severity::Severe,
            Severity::Severe => Severity::None,
        }
    }

    #[must_use]
    pub fn prev(self) -> Self {
        match self {
            Severity::None => Severity::Severe,
            Severity::Mild => Severity::None,
            Severity::Moderate => Severity::Mild,
            Severity::Severe => Severity::Moderate,
        }
    }
}

// ============================================================================
// METRICS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricField {
    Weight,
    HairLoss,
    InsulinLevel,
    Acne,
}

impl MetricField {
    /// Input label shown in the editor.
    pub fn label(self) -> &'static str {
        match self {
            MetricField::Weight => "Weight (kg)",
            MetricField::HairLoss => "Hair Loss",
            MetricField::InsulinLevel => "Insulin Level (if measured)",
            MetricField::Acne => "Acne Severity",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, MetricField::Weight | MetricField::InsulinLevel)
    }
}

impl fmt::Display for MetricField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricField::Weight => "weight",
            MetricField::HairLoss => "hair loss",
            MetricField::InsulinLevel => "insulin level",
            MetricField::Acne => "acne severity",
        };
        f.write_str(name)
    }
}

/// A value destined for one metric field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    /// `None` clears the field.
    Number(Option<f64>),
    Severity(Severity),
}

impl MetricValue {
    /// Parse raw text typed into a numeric metric input.
    ///
    /// Blank text clears the field. Anything that is not a finite,
    /// non-negative number is refused so no NaN ever reaches a record.
    pub fn parse_number(field: MetricField, raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(MetricValue::Number(None));
        }
        let value: f64 = trimmed
            .parse()
            .map_err(|_| Error::invalid_number(field, raw, "not a number"))?;
        if !value.is_finite() {
            return Err(Error::invalid_number(field, raw, "not a finite number"));
        }
        if value < 0.0 {
            return Err(Error::invalid_number(field, raw, "must not be negative"));
        }
        Ok(MetricValue::Number(Some(value)))
    }

    /// Short name of the value kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            MetricValue::Number(_) => "number",
            MetricValue::Severity(_) => "severity",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PcosMetrics {
    pub weight_kg: Option<f64>,
    pub hair_loss: Severity,
    pub insulin_level: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PcodMetrics {
    pub weight_kg: Option<f64>,
    pub acne: Severity,
}

/// Condition-specific measurements for a day.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Metrics {
    #[default]
    Absent,
    Pcos(PcosMetrics),
    Pcod(PcodMetrics),
}

impl Metrics {
    /// Empty metrics shaped for a condition.
    #[must_use]
    pub fn for_condition(condition: Option<Condition>) -> Self {
        match condition {
            Some(Condition::Pcos) => Metrics::Pcos(PcosMetrics::default()),
            Some(Condition::Pcod) => Metrics::Pcod(PcodMetrics::default()),
            Some(Condition::Neither) | None => Metrics::Absent,
        }
    }

    /// The condition whose shape these metrics have, if any.
    pub fn shape(&self) -> Option<Condition> {
        match self {
            Metrics::Absent => None,
            Metrics::Pcos(_) => Some(Condition::Pcos),
            Metrics::Pcod(_) => Some(Condition::Pcod),
        }
    }

    /// Reshape for `condition`, keeping the weight when both shapes have one.
    #[must_use]
    pub fn conform_to(&self, condition: Condition) -> Self {
        if self.shape() == Some(condition) {
            return *self;
        }
        let weight_kg = self.weight_kg();
        match condition {
            Condition::Pcos => Metrics::Pcos(PcosMetrics {
                weight_kg,
                ..PcosMetrics::default()
            }),
            Condition::Pcod => Metrics::Pcod(PcodMetrics {
                weight_kg,
                ..PcodMetrics::default()
            }),
            Condition::Neither => Metrics::Absent,
        }
    }

    pub fn weight_kg(&self) -> Option<f64> {
        match self {
            Metrics::Absent => None,
            Metrics::Pcos(m) => m.weight_kg,
            Metrics::Pcod(m) => m.weight_kg,
        }
    }

    pub fn hair_loss(&self) -> Option<Severity> {
        match self {
            Metrics::Pcos(m) => Some(m.hair_loss),
            _ => None,
        }
    }

    pub fn insulin_level(&self) -> Option<f64> {
        match self {
            Metrics::Pcos(m) => m.insulin_level,
            _ => None,
        }
    }

    pub fn acne(&self) -> Option<Severity> {
        match self {
            Metrics::Pcod(m) => Some(m.acne),
            _ => None,
        }
    }

    /// Current value of a field, if this shape carries it.
    pub fn get(&self, field: MetricField) -> Option<MetricValue> {
        match (self, field) {
            (Metrics::Pcos(m), MetricField::Weight) => Some(MetricValue::Number(m.weight_kg)),
            (Metrics::Pcos(m), MetricField::HairLoss) => Some(MetricValue::Severity(m.hair_loss)),
            (Metrics::Pcos(m), MetricField::InsulinLevel) => {
                Some(MetricValue::Number(m.insulin_level))
            }
            (Metrics::Pcod(m), MetricField::Weight) => Some(MetricValue::Number(m.weight_kg)),
            (Metrics::Pcod(m), MetricField::Acne) => Some(MetricValue::Severity(m.acne)),
            _ => None,
        }
    }

    /// Write a value into a field this shape carries. Returns false when the
    /// shape has no such field or the value kind does not match it.
    pub fn set(&mut self, field: MetricField, value: MetricValue) -> bool {
        match (self, field, value) {
            (Metrics::Pcos(m), MetricField::Weight, MetricValue::Number(n)) => m.weight_kg = n,
            (Metrics::Pcos(m), MetricField::HairLoss, MetricValue::Severity(s)) => m.hair_loss = s,
            (Metrics::Pcos(m), MetricField::InsulinLevel, MetricValue::Number(n)) => {
                m.insulin_level = n;
            }
            (Metrics::Pcod(m), MetricField::Weight, MetricValue::Number(n)) => m.weight_kg = n,
            (Metrics::Pcod(m), MetricField::Acne, MetricValue::Severity(s)) => m.acne = s,
            _ => return false,
        }
        true
    }

    /// True when nothing has been entered.
    pub fn is_blank(&self) -> bool {
        match self {
            Metrics::Absent => true,
            Metrics::Pcos(m) => *m == PcosMetrics::default(),
            Metrics::Pcod(m) => *m == PcodMetrics::default(),
        }
    }
}

// ============================================================================
// DAY RECORD
// ============================================================================

/// The saved observations for one calendar date.
#[derive(Debug, Clone, PartialEq)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub flow: Option<Flow>,
    pub symptoms: BTreeSet<String>,
    pub notes: String,
    pub metrics: Metrics,
}

impl DayRecord {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            flow: None,
            symptoms: BTreeSet::new(),
            notes: String::new(),
            metrics: Metrics::Absent,
        }
    }

    pub fn key(&self) -> String {
        date_key(self.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_key() {
        assert_eq!(parse_date_key("2024-03-01").unwrap(), ymd(2024, 3, 1));
        assert_eq!(parse_date_key(" 2024-02-29 ").unwrap(), ymd(2024, 2, 29));
    }

    #[test]
    fn test_parse_date_key_rejects_other_forms() {
        for bad in ["2024-3-1", "03/01/2024", "2023-02-29", "", "yesterday"] {
            let err = parse_date_key(bad).unwrap_err();
            assert!(matches!(err, Error::InvalidDate { .. }), "accepted {bad}");
        }
    }

    #[test]
    fn test_date_key_round_trips_canonical_form() {
        assert_eq!(date_key(ymd(2024, 3, 1)), "2024-03-01");
    }

    #[test]
    fn test_base_vocabulary_for_neither_and_unset() {
        assert_eq!(symptom_options(None), BASE_SYMPTOMS);
        assert_eq!(symptom_options(Some(Condition::Neither)), BASE_SYMPTOMS);
        assert_eq!(BASE_SYMPTOMS.len(), 7);
    }

    #[test]
    fn test_pcos_vocabulary_is_strict_superset() {
        let pcos = symptom_options(Some(Condition::Pcos));
        assert!(BASE_SYMPTOMS.iter().all(|s| pcos.contains(s)));
        assert!(pcos.len() > BASE_SYMPTOMS.len());
        assert!(pcos.contains(&"Hair Loss"));
        assert!(pcos.contains(&"Insulin Resistance"));
        assert_eq!(&pcos[..7], BASE_SYMPTOMS);
    }

    #[test]
    fn test_pcod_vocabulary() {
        let pcod = symptom_options(Some(Condition::Pcod));
        assert!(BASE_SYMPTOMS.iter().all(|s| pcod.contains(s)));
        assert!(pcod.contains(&"Pelvic Pain"));
        assert!(pcod.contains(&"Heavy Periods"));
        assert!(!pcod.contains(&"Insulin Resistance"));
        assert_eq!(pcod.len(), 11);
    }

    #[test]
    fn test_condition_from_str() {
        assert_eq!("PCOS".parse::<Condition>().unwrap(), Condition::Pcos);
        assert_eq!("pcod".parse::<Condition>().unwrap(), Condition::Pcod);
        assert_eq!("neither".parse::<Condition>().unwrap(), Condition::Neither);
        assert!("endo".parse::<Condition>().is_err());
    }

    #[test]
    fn test_condition_labels() {
        assert_eq!(Condition::Pcos.profile_label(), "PCOS");
        assert_eq!(Condition::Neither.profile_label(), "No specific condition");
        assert_eq!(Condition::Pcod.to_string(), "PCOD");
    }

    #[test]
    fn test_metric_fields_per_condition() {
        assert!(Condition::Pcos.tracks(MetricField::InsulinLevel));
        assert!(!Condition::Pcos.tracks(MetricField::Acne));
        assert!(Condition::Pcod.tracks(MetricField::Acne));
        assert!(Condition::Neither.metric_fields().is_empty());
    }

    #[test]
    fn test_parse_number() {
        let field = MetricField::Weight;
        assert_eq!(
            MetricValue::parse_number(field, "62.5").unwrap(),
            MetricValue::Number(Some(62.5))
        );
        assert_eq!(
            MetricValue::parse_number(field, "   ").unwrap(),
            MetricValue::Number(None)
        );
    }

    #[test]
    fn test_parse_number_rejects_garbage() {
        for bad in ["abc", "NaN", "inf", "-3", "6 2"] {
            let err = MetricValue::parse_number(MetricField::InsulinLevel, bad).unwrap_err();
            assert!(matches!(err, Error::InvalidNumber { .. }), "accepted {bad}");
        }
    }

    #[test]
    fn test_severity_cycle() {
        assert_eq!(Severity::None.next(), Severity::Mild);
        assert_eq!(Severity::Severe.next(), Severity::None);
        assert_eq!(Severity::None.prev(), Severity::Severe);
        for s in Severity::ALL {
            assert_eq!(s.next().prev(), s);
        }
    }

    #[test]
    fn test_metrics_for_condition() {
        assert_eq!(Metrics::for_condition(None), Metrics::Absent);
        assert_eq!(Metrics::for_condition(Some(Condition::Neither)), Metrics::Absent);
        assert_eq!(Metrics::for_condition(Some(Condition::Pcos)).shape(), Some(Condition::Pcos));
        assert!(Metrics::for_condition(Some(Condition::Pcod)).is_blank());
    }

    #[test]
    fn test_conform_keeps_weight() {
        let pcos = Metrics::Pcos(PcosMetrics {
            weight_kg: Some(70.0),
            hair_loss: Severity::Moderate,
            insulin_level: Some(12.0),
        });
        let pcod = pcos.conform_to(Condition::Pcod);
        assert_eq!(pcod.weight_kg(), Some(70.0));
        assert_eq!(pcod.acne(), Some(Severity::None));
        assert_eq!(pcod.insulin_level(), None);
        assert_eq!(pcos.conform_to(Condition::Pcos), pcos);
        assert_eq!(pcos.conform_to(Condition::Neither), Metrics::Absent);
    }

    #[test]
    fn test_metrics_set_respects_shape() {
        let mut metrics = Metrics::for_condition(Some(Condition::Pcod));
        assert!(metrics.set(MetricField::Acne, MetricValue::Severity(Severity::Mild)));
        assert!(!metrics.set(MetricField::HairLoss, MetricValue::Severity(Severity::Mild)));
        assert!(!metrics.set(MetricField::Weight, MetricValue::Severity(Severity::Mild)));
        assert_eq!(metrics.get(MetricField::Acne), Some(MetricValue::Severity(Severity::Mild)));
        assert_eq!(metrics.get(MetricField::InsulinLevel), None);
        assert!(!metrics.is_blank());
    }
}
