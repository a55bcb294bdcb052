//! Rule based form validation

use super::traits::FormValidator;
use crate::error::ServiceError;
use crate::state::{FieldError, FormState, SubEntry};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Constraint applied to every sub-entry of a section
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Field must hold a non-blank value
    Required(String),
    /// `end` may not be before `start` (ISO `YYYY-MM-DD` dates)
    DateOrder { start: String, end: String },
    /// Text field length limit in characters
    MaxLength { field: String, max: usize },
}

impl Rule {
    pub fn required(field: &str) -> Self {
        Rule::Required(field.to_string())
    }

    pub fn date_order(start: &str, end: &str) -> Self {
        Rule::DateOrder {
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    pub fn max_length(field: &str, max: usize) -> Self {
        Rule::MaxLength {
            field: field.to_string(),
            max,
        }
    }

    fn check(&self, entry: &SubEntry) -> Option<(&str, String)> {
        match self {
            Rule::Required(field) => {
                let present = entry
                    .get(field)
                    .is_some_and(|v| !crate::state::is_blank(v));
                (!present).then(|| (field.as_str(), "required".to_string()))
            }
            Rule::DateOrder { start, end } => {
                let start_date = entry.text(start).and_then(parse_date);
                let end_date = entry.text(end).and_then(parse_date);
                match (start_date, end_date) {
                    (Some(s), Some(e)) if e < s => {
                        Some((end.as_str(), format!("must not be before {}", start)))
                    }
                    _ => None,
                }
            }
            Rule::MaxLength { field, max } => {
                let len = entry.text(field).map(|t| t.chars().count()).unwrap_or(0);
                (len > *max).then(|| (field.as_str(), format!("at most {} characters", max)))
            }
        }
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    // Accept full timestamps too; only the date part matters
    let date_part = text.get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Validator running per-section rules over every sub-entry
#[derive(Debug, Clone, Default)]
pub struct RuleValidator {
    rules: HashMap<String, Vec<Rule>>,
}

impl RuleValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(mut self, section: &str, rules: Vec<Rule>) -> Self {
        self.rules.insert(section.to_string(), rules);
        self
    }

    /// Rules of the qualifications form
    pub fn qualifications() -> Self {
        Self::new()
            .section(
                "educations",
                vec![
                    Rule::required("school"),
                    Rule::required("diploma"),
                    Rule::required("startDate"),
                    Rule::date_order("startDate", "endDate"),
                ],
            )
            .section(
                "experiences",
                vec![
                    Rule::required("header"),
                    Rule::required("subheader"),
                    Rule::required("startDate"),
                    Rule::date_order("startDate", "endDate"),
                    Rule::max_length("content", 1500),
                ],
            )
    }

    /// Synchronous check used by the async trait impl
    pub fn check(&self, state: &FormState) -> Vec<FieldError> {
        let mut failures = Vec::new();
        for (section, entries) in state.sections() {
            let Some(rules) = self.rules.get(section) else {
                continue;
            };
            for (index, entry) in entries.iter().enumerate() {
                for rule in rules {
                    if let Some((field, message)) = rule.check(entry) {
                        failures.push(FieldError::new(
                            format!("{}.{}.{}", section, index, field),
                            message,
                        ));
                    }
                }
            }
        }
        failures
    }
}

#[async_trait]
impl FormValidator for RuleValidator {
    async fn validate(&self, state: &FormState) -> Result<Vec<FieldError>, ServiceError> {
        Ok(self.check(state))
    }
}
