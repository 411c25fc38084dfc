//! Static content for the Insights tab.
//!
//! Nothing here looks at saved days. The tab shows the same guidance whatever
//! has been logged, selected only by the chosen condition.

use crate::model::Condition;

pub const PLACEHOLDER: &str =
    "Track your cycle for at least one month to see insights about your patterns.";

const PCOS_FOCUS: &[&str] = &[
    "Cycle irregularity patterns",
    "Weight fluctuations",
    "Hair loss patterns",
    "Insulin level trends",
];

const PCOD_FOCUS: &[&str] = &[
    "Period heaviness patterns",
    "Weight changes",
    "Acne correlation with cycle",
];

/// Condition-specific topics the insights will cover.
pub fn focus_areas(condition: Option<Condition>) -> &'static [&'static str] {
    match condition {
        Some(Condition::Pcos) => PCOS_FOCUS,
        Some(Condition::Pcod) => PCOD_FOCUS,
        Some(Condition::Neither) | None => &[],
    }
}

/// Intro line for the focus list, absent for "neither".
pub fn focus_heading(condition: Option<Condition>) -> Option<String> {
    match condition {
        Some(c @ (Condition::Pcos | Condition::Pcod)) => Some(format!(
            "We'll provide specific insights related to your {} condition, including:",
            c.label()
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcos_focus() {
        let focus = focus_areas(Some(Condition::Pcos));
        assert_eq!(focus.len(), 4);
        assert!(focus.contains(&"Insulin level trends"));
        assert!(focus_heading(Some(Condition::Pcos)).unwrap().contains("PCOS"));
    }

    #[test]
    fn test_focus_heading_only_for_diagnosed() {
        assert!(focus_heading(Some(Condition::Pcod)).unwrap().contains("PCOD"));
        assert!(focus_areas(Some(Condition::Pcod)).contains(&"Acne correlation with cycle"));

        assert!(focus_heading(Some(Condition::Neither)).is_none());
        assert!(focus_areas(Some(Condition::Neither)).is_empty());
        assert!(focus_heading(None).is_none());
    }
}
