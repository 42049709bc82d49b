//! Request validation.
//!
//! A [`Validator`] is an ordered list of independent [`Rule`]s. Every rule is
//! evaluated against the same value and all failures are reported together.

use serde::Serialize;

use crate::models::{CourseFilterRequest, NewCourse};

pub const MISSING_FILTER_MESSAGE: &str = "Missing conditional field, must provide at least 1";

/// One violated rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    /// Field the rule is attached to, `None` for rules over the whole request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
    pub message: String,
}

/// A single check. `check` returns `true` when the value is acceptable.
pub struct Rule<T> {
    field: Option<&'static str>,
    message: &'static str,
    check: fn(&T) -> bool,
}

impl<T> Rule<T> {
    fn evaluate(&self, target: &T) -> Option<ValidationFailure> {
        if (self.check)(target) {
            None
        } else {
            Some(ValidationFailure {
                field: self.field,
                message: self.message.to_string(),
            })
        }
    }
}

pub struct Validator<T> {
    rules: Vec<Rule<T>>,
}

impl<T> Default for Validator<T> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<T> Validator<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule over the whole value.
    pub fn rule(mut self, message: &'static str, check: fn(&T) -> bool) -> Self {
        self.rules.push(Rule { field: None, message, check });
        self
    }

    /// Adds a rule reported against `field`.
    pub fn field_rule(mut self, field: &'static str, message: &'static str, check: fn(&T) -> bool) -> Self {
        self.rules.push(Rule { field: Some(field), message, check });
        self
    }

    pub fn validate(&self, target: &T) -> Result<(), Vec<ValidationFailure>> {
        let failures: Vec<ValidationFailure> = self
            .rules
            .iter()
            .filter_map(|rule| rule.evaluate(target))
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures)
        }
    }
}

impl Validator<CourseFilterRequest> {
    /// Rules for the course lookup endpoints.
    pub fn course_filter() -> Self {
        Self::new().rule(MISSING_FILTER_MESSAGE, |req| {
            !is_blank(req.course_title.as_deref()) || !is_blank(req.course_code.as_deref())
        })
    }
}

impl Validator<NewCourse> {
    /// Column constraints of the `Courses` table.
    pub fn new_course() -> Self {
        Self::new()
            .field_rule("name", "Name is required", |c| !is_blank(Some(c.name.as_str())))
            .field_rule("name", "Name must be at most 100 characters", |c| c.name.chars().count() <= 100)
            .field_rule("code", "Code is required", |c| !is_blank(Some(c.code.as_str())))
            .field_rule("code", "Code must be at most 50 characters", |c| c.code.chars().count() <= 50)
    }
}

/// `None`, empty, or whitespace only.
pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}
