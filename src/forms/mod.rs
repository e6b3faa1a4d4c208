//! Form processing
//!
//! A submitted form runs through an ordered [`Pipeline`] of stages. Each stage
//! targets one field and either replaces its value or records a
//! [`FieldError`]; a failing stage leaves the value unchanged and later stages
//! still run, so the sanitized input can always be echoed back.

pub mod sanitize;

use std::borrow::Cow;
use validator::{ValidateLength, ValidationError};

/// A field-level validation message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Field values of one form submission plus the errors found so far
#[derive(Debug, Default, Clone)]
pub struct Submission {
    values: Vec<(&'static str, String)>,
    errors: Vec<FieldError>,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &'static str, value: impl Into<String>) -> Self {
        self.set(field, value.into());
        self
    }

    /// Current value of a field, empty when it was not submitted
    pub fn value(&self, field: &str) -> &str {
        self.values
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    fn set(&mut self, field: &'static str, value: String) {
        match self.values.iter_mut().find(|(name, _)| *name == field) {
            Some(slot) => slot.1 = value,
            None => self.values.push((field, value)),
        }
    }
}

type StageFn = Box<dyn Fn(&str) -> Result<String, ValidationError> + Send + Sync>;

struct Stage {
    field: &'static str,
    apply: StageFn,
}

/// Ordered list of validation and sanitization stages
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

fn failure(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a custom stage
    pub fn stage<F>(mut self, field: &'static str, apply: F) -> Self
    where
        F: Fn(&str) -> Result<String, ValidationError> + Send + Sync + 'static,
    {
        self.stages.push(Stage {
            field,
            apply: Box::new(apply),
        });
        self
    }

    pub fn trim(self, field: &'static str) -> Self {
        self.stage(field, |v| Ok(sanitize::trim(v)))
    }

    pub fn escape(self, field: &'static str) -> Self {
        self.stage(field, |v| Ok(sanitize::escape(v)))
    }

    /// Field must contain at least one character
    pub fn require(self, field: &'static str, message: &'static str) -> Self {
        self.stage(field, move |v| {
            if v.to_string().validate_length(Some(1_u64), None, None) {
                Ok(v.to_string())
            } else {
                Err(failure("length", message))
            }
        })
    }

    /// Empty is accepted; anything else must be an ISO 8601 date
    pub fn optional_date(self, field: &'static str, message: &'static str) -> Self {
        self.stage(field, move |v| {
            if v.is_empty() || sanitize::parse_iso_date(v).is_some() {
                Ok(v.to_string())
            } else {
                Err(failure("date", message))
            }
        })
    }

    /// Rewrite a parseable date as `YYYY-MM-DD`, leave anything else untouched
    pub fn to_date(self, field: &'static str) -> Self {
        self.stage(field, |v| {
            Ok(sanitize::parse_iso_date(v)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| v.to_string()))
        })
    }

    /// Empty is accepted; anything else must be one of `allowed`
    pub fn one_of(
        self,
        field: &'static str,
        allowed: &'static [&'static str],
        message: &'static str,
    ) -> Self {
        self.stage(field, move |v| {
            if v.is_empty() || allowed.contains(&v) {
                Ok(v.to_string())
            } else {
                Err(failure("one_of", message))
            }
        })
    }

    pub fn run(&self, mut submission: Submission) -> Submission {
        for stage in &self.stages {
            let current = submission.value(stage.field).to_string();
            match (stage.apply)(&current) {
                Ok(value) => submission.set(stage.field, value),
                Err(err) => submission.errors.push(FieldError {
                    field: stage.field,
                    message: err
                        .message
                        .map(|m| m.into_owned())
                        .unwrap_or_else(|| err.code.into_owned()),
                }),
            }
        }
        submission
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stages_run_in_order() {
        let pipeline = Pipeline::new()
            .trim("name")
            .require("name", "Name required")
            .escape("name");

        let out = pipeline.run(Submission::new().with("name", "  Tom & Jerry "));
        assert!(out.is_valid());
        assert_eq!(out.value("name"), "Tom &amp; Jerry");
    }

    #[test]
    fn test_whitespace_only_fails_require() {
        let pipeline = Pipeline::new()
            .trim("name")
            .require("name", "Name required");

        let out = pipeline.run(Submission::new().with("name", "   "));
        assert_eq!(
            out.errors(),
            &[FieldError {
                field: "name",
                message: "Name required".to_string()
            }]
        );
    }

    #[test]
    fn test_errors_accumulate_and_values_survive() {
        let pipeline = Pipeline::new()
            .require("a", "A required")
            .optional_date("due", "Invalid date")
            .escape("due");

        let out = pipeline.run(Submission::new().with("due", "<soon>"));
        assert_eq!(out.errors().len(), 2);
        assert_eq!(out.errors()[0].field, "a");
        assert_eq!(out.errors()[1].message, "Invalid date");
        assert_eq!(out.value("due"), "&lt;soon&gt;");
    }

    #[test]
    fn test_to_date_normalizes() {
        let pipeline = Pipeline::new().to_date("due");
        let out = pipeline.run(Submission::new().with("due", "2024-03-04T08:00:00Z"));
        assert_eq!(out.value("due"), "2024-03-04");
    }

    #[test]
    fn test_one_of_accepts_empty() {
        const ALLOWED: &[&str] = &["x", "y"];
        let pipeline = Pipeline::new().one_of("s", ALLOWED, "Invalid");
        assert!(pipeline.run(Submission::new().with("s", "")).is_valid());
        assert!(pipeline.run(Submission::new().with("s", "y")).is_valid());
        assert!(!pipeline.run(Submission::new().with("s", "z")).is_valid());
    }
}
