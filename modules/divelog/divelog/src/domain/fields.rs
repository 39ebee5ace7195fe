//! Input field names and a collector for validation failures.

use super::error::{DomainError, FieldViolation};

pub struct AccountFields;

impl AccountFields {
    pub const EMAIL: &'static str = "email";
    pub const DISPLAY_NAME: &'static str = "display_name";
    pub const PASSWORD: &'static str = "password";
    pub const CURRENT_PASSWORD: &'static str = "current_password";
    pub const NEW_PASSWORD: &'static str = "new_password";
}

pub struct DiveFields;

impl DiveFields {
    pub const DIVE_NUMBER: &'static str = "dive_number";
    pub const SITE_NAME: &'static str = "site_name";
    pub const LOCATION: &'static str = "location";
    pub const BOTTOM_TIME: &'static str = "bottom_time_min";
    pub const MAX_DEPTH: &'static str = "max_depth";
    pub const WATER_TEMP: &'static str = "water_temp";
    pub const VISIBILITY: &'static str = "visibility";
    pub const START_PRESSURE: &'static str = "start_pressure";
    pub const END_PRESSURE: &'static str = "end_pressure";
    pub const WEIGHT: &'static str = "weight";
    pub const NOTES: &'static str = "notes";
}

pub struct PlanFields;

impl PlanFields {
    pub const SITE_NAME: &'static str = "site_name";
    pub const PLANNED_MAX_DEPTH: &'static str = "planned_max_depth";
    pub const PLANNED_BOTTOM_TIME: &'static str = "planned_bottom_time_min";
    pub const GAS_MIX: &'static str = "gas_mix";
    pub const NOTES: &'static str = "notes";
    pub const SAFETY_BRIEFING: &'static str = "safety_briefing";
}

pub struct CertificationFields;

impl CertificationFields {
    pub const DEFINITION_ID: &'static str = "definition_id";
    pub const CARD_NUMBER: &'static str = "card_number";
    pub const INSTRUCTOR: &'static str = "instructor";
}

pub struct GearFields;

impl GearFields {
    pub const NAME: &'static str = "name";
    pub const KIND: &'static str = "kind";
    pub const BRAND: &'static str = "brand";
    pub const MODEL: &'static str = "model";
    pub const SERIAL_NUMBER: &'static str = "serial_number";
    pub const NOTES: &'static str = "notes";
    pub const ITEM_IDS: &'static str = "item_ids";
}

pub struct PreferenceFields;

impl PreferenceFields {
    pub const DEPTH: &'static str = "depth";
    pub const TEMPERATURE: &'static str = "temperature";
    pub const PRESSURE: &'static str = "pressure";
    pub const WEIGHT: &'static str = "weight";
}

/// Collects every failed field before reporting.
#[derive(Debug, Default)]
pub struct Violations(Vec<FieldViolation>);

impl Violations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldViolation::new(field, message));
    }

    /// Required text: trimmed, non-empty, at most `max` characters.
    pub fn require_text(&mut self, field: &str, value: &str, max: usize) {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.push(field, "must not be empty");
        } else if trimmed.chars().count() > max {
            self.push(field, format!("must be at most {max} characters"));
        }
    }

    /// Optional text: at most `max` characters when present.
    pub fn optional_text(&mut self, field: &str, value: Option<&str>, max: usize) {
        if let Some(v) = value
            && v.chars().count() > max
        {
            self.push(field, format!("must be at most {max} characters"));
        }
    }

    pub fn positive(&mut self, field: &str, value: i32) {
        if value <= 0 {
            self.push(field, "must be greater than zero");
        }
    }

    pub fn non_negative(&mut self, field: &str, value: Option<i32>) {
        if let Some(v) = value
            && v < 0
        {
            self.push(field, "must not be negative");
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok` when nothing was collected.
    ///
    /// # Errors
    /// Returns `DomainError::Validation` with every collected violation.
    pub fn finish(self) -> Result<(), DomainError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self.0))
        }
    }
}

/// Trim optional text, turning blanks into `None`.
#[must_use]
pub fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn collects_all_violations() {
        let mut v = Violations::new();
        v.require_text(DiveFields::SITE_NAME, "   ", 10);
        v.positive(DiveFields::BOTTOM_TIME, 0);
        v.optional_text(DiveFields::NOTES, Some("fine"), 10);

        let Err(DomainError::Validation(list)) = v.finish() else {
            panic!("expected validation error");
        };
        let fields: Vec<&str> = list.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, [DiveFields::SITE_NAME, DiveFields::BOTTOM_TIME]);
    }

    #[test]
    fn text_limit_counts_characters() {
        let mut v = Violations::new();
        v.require_text(GearFields::NAME, "ÄÖÜ", 3);
        assert!(v.is_empty());
        v.require_text(GearFields::NAME, "ÄÖÜß", 3);
        assert!(!v.is_empty());
    }

    #[test]
    fn blank_optional_text_becomes_none() {
        assert_eq!(clean_optional(Some("  ".to_owned())), None);
        assert_eq!(clean_optional(Some(" Reef ".to_owned())), Some("Reef".to_owned()));
        assert_eq!(clean_optional(None), None);
    }
}
