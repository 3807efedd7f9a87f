//! Struct validation and field message translation
//!
//! [`Validator`] is built once at startup and handed to handlers through
//! router state. It delegates rule checking to the `validator` crate and
//! turns failures into one readable English message per field.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

/// Validates request payloads and exposes the shared [`Translator`]
#[derive(Debug, Clone, Default)]
pub struct Validator {
    translator: Arc<Translator>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `field` as `display` in translated messages and detail keys.
    ///
    /// Typically used to surface the JSON name of a renamed field.
    pub fn with_field_name(mut self, field: impl Into<String>, display: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.translator)
            .field_names
            .insert(field.into(), display.into());
        self
    }

    /// Check `value` against its rules.
    ///
    /// The failure keeps this validator's translator, so `?` into an
    /// [`Error`](crate::Error) still reports the configured field names.
    pub fn validate<T: Validate>(&self, value: &T) -> Result<(), ValidationFailure> {
        value.validate().map_err(|errors| ValidationFailure {
            errors,
            translator: Arc::clone(&self.translator),
        })
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }
}

/// Rule failures paired with the translator of the validator that found them
#[derive(Debug, Clone, Error)]
#[error("{errors}")]
pub struct ValidationFailure {
    #[source]
    errors: ValidationErrors,
    translator: Arc<Translator>,
}

impl ValidationFailure {
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    /// Translated message per invalid field
    pub fn detail(&self) -> BTreeMap<String, String> {
        self.translator.translate_all(&self.errors)
    }

    pub fn into_errors(self) -> ValidationErrors {
        self.errors
    }
}

/// Renders validation failures as English messages
#[derive(Debug, Clone, Default)]
pub struct Translator {
    field_names: HashMap<String, String>,
}

impl Translator {
    /// Display name for a struct field
    pub fn field_name<'a>(&'a self, field: &'a str) -> &'a str {
        self.field_names
            .get(field)
            .map(String::as_str)
            .unwrap_or(field)
    }

    /// Message for a single failed rule on `field`.
    ///
    /// A message attached to the rule itself takes precedence.
    pub fn translate(&self, field: &str, error: &ValidationError) -> String {
        if let Some(message) = &error.message {
            return message.to_string();
        }

        let name = self.field_name(field);
        let param = |key: &str| error.params.get(key).map(render_param);

        match error.code.as_ref() {
            "required" => format!("{name} is a required field"),
            "email" => format!("{name} must be a valid email address"),
            "url" => format!("{name} must be a valid URL"),
            "ip" | "ipv4" | "ipv6" => format!("{name} must be a valid IP address"),
            "credit_card" => format!("{name} must be a valid credit card number"),
            "regex" => format!("{name} is not in the expected format"),
            "non_control_character" => {
                format!("{name} cannot contain control characters")
            }
            "length" => match (param("equal"), param("min"), param("max")) {
                (Some(equal), _, _) => format!("{name} must be {equal} characters in length"),
                (None, Some(min), Some(max)) => {
                    format!("{name} must be between {min} and {max} characters in length")
                }
                (None, Some(min), None) => {
                    format!("{name} must be at least {min} characters in length")
                }
                (None, None, Some(max)) => {
                    format!("{name} must be a maximum of {max} characters in length")
                }
                (None, None, None) => format!("{name} has an invalid length"),
            },
            "range" => match (param("min"), param("max")) {
                (Some(min), Some(max)) => format!("{name} must be between {min} and {max}"),
                (Some(min), None) => format!("{name} must be {min} or greater"),
                (None, Some(max)) => format!("{name} must be {max} or less"),
                (None, None) => format!("{name} is out of range"),
            },
            "must_match" => match param("other") {
                Some(other) => format!("{name} must be equal to {}", self.field_name(&other)),
                None => format!("{name} does not match"),
            },
            "contains" => match param("needle") {
                Some(needle) => format!("{name} must contain the text '{needle}'"),
                None => format!("{name} is missing required text"),
            },
            "does_not_contain" => match param("needle") {
                Some(needle) => format!("{name} cannot contain the text '{needle}'"),
                None => format!("{name} contains forbidden text"),
            },
            other => format!("{name} failed on the '{other}' rule"),
        }
    }

    /// One message per invalid field, keyed by display path.
    ///
    /// Nested structs become `parent.child` and list items `items[0].name`.
    /// When a field fails several rules the first message is kept.
    pub fn translate_all(&self, errors: &ValidationErrors) -> BTreeMap<String, String> {
        let mut detail = BTreeMap::new();
        self.collect(None, errors, &mut detail);
        detail
    }

    fn collect(
        &self,
        prefix: Option<&str>,
        errors: &ValidationErrors,
        detail: &mut BTreeMap<String, String>,
    ) {
        for (field, kind) in errors.errors() {
            let field = field.to_string();
            let name = self.field_name(&field);
            let path = match prefix {
                Some(prefix) => format!("{prefix}.{name}"),
                None => name.to_string(),
            };

            match kind {
                ValidationErrorsKind::Field(field_errors) => {
                    if let Some(first) = field_errors.first() {
                        detail
                            .entry(path)
                            .or_insert_with(|| self.translate(&field, first));
                    }
                }
                ValidationErrorsKind::Struct(nested) => {
                    self.collect(Some(&path), nested, detail);
                }
                ValidationErrorsKind::List(items) => {
                    for (index, nested) in items {
                        self.collect(Some(&format!("{path}[{index}]")), nested, detail);
                    }
                }
            }
        }
    }
}

fn render_param(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
