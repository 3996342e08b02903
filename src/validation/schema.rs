//! Declarative payload validation.
//!
//! A [`Schema`] is a set of per-field constraints compiled once (regexes
//! included) and applied to JSON payloads as a pure function. Fields not
//! declared in the schema are rejected.

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

// Same format check the login/register handlers rely on.
const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

/// A single field-level validation failure.
///
/// `field` is the name of the offending property, the name of a missing
/// required property, or `"root"` when neither applies (non-object payload,
/// undeclared property).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl FieldError {
    fn new(field: impl Into<String>, message: impl Into<String>, value: Option<&Value>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: value.cloned(),
        }
    }
}

/// String constraint applied to a present field value.
#[derive(Debug)]
enum Constraint {
    MinLength(usize),
    MaxLength(usize),
    /// Compiled pattern plus the diagnostic used when it does not match.
    Pattern(Regex, String),
    EmailFormat(Regex),
}

impl Constraint {
    fn check(&self, value: &str) -> Option<String> {
        match self {
            Self::MinLength(min) => (value.chars().count() < *min)
                .then(|| format!("must NOT have fewer than {min} characters")),
            Self::MaxLength(max) => (value.chars().count() > *max)
                .then(|| format!("must NOT have more than {max} characters")),
            Self::Pattern(regex, message) => (!regex.is_match(value)).then(|| message.clone()),
            Self::EmailFormat(regex) => {
                (!regex.is_match(value)).then(|| r#"must match format "email""#.to_string())
            }
        }
    }
}

/// Declared field: a required or optional string with its constraints.
#[derive(Debug)]
pub struct Field {
    name: &'static str,
    required: bool,
    constraints: Vec<Constraint>,
}

impl Field {
    #[must_use]
    pub fn string(name: &'static str) -> Self {
        Self {
            name,
            required: false,
            constraints: Vec::new(),
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn min_length(mut self, min: usize) -> Self {
        self.constraints.push(Constraint::MinLength(min));
        self
    }

    #[must_use]
    pub fn max_length(mut self, max: usize) -> Self {
        self.constraints.push(Constraint::MaxLength(max));
        self
    }

    /// Add a regex constraint with the diagnostic reported on mismatch.
    ///
    /// # Panics
    ///
    /// Panics if the pattern does not compile; schemas are built once at
    /// startup from literal patterns.
    #[must_use]
    pub fn pattern(mut self, pattern: &str, message: &str) -> Self {
        let regex = Regex::new(pattern)
            .unwrap_or_else(|err| panic!("invalid schema pattern {pattern:?}: {err}"));
        self.constraints
            .push(Constraint::Pattern(regex, message.to_string()));
        self
    }

    /// Require the value to look like an RFC-style email address.
    ///
    /// # Panics
    ///
    /// Panics if the built-in email pattern fails to compile.
    #[must_use]
    pub fn email(mut self) -> Self {
        let regex = Regex::new(EMAIL_PATTERN)
            .unwrap_or_else(|err| panic!("invalid email pattern: {err}"));
        self.constraints.push(Constraint::EmailFormat(regex));
        self
    }
}

/// A compiled, reusable payload validator.
#[derive(Debug)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Validate a candidate payload.
    ///
    /// Returns all failures: declared-field errors in declaration order,
    /// followed by one error per undeclared property.
    ///
    /// # Errors
    ///
    /// Returns the ordered list of [`FieldError`]s when the payload is
    /// invalid.
    pub fn validate(&self, payload: &Value) -> Result<(), Vec<FieldError>> {
        let Some(object) = payload.as_object() else {
            return Err(vec![FieldError::new(
                "root",
                "must be object",
                Some(payload),
            )]);
        };

        let mut errors = Vec::new();

        for field in &self.fields {
            match object.get(field.name) {
                None => {
                    if field.required {
                        errors.push(FieldError::new(
                            field.name,
                            format!("must have required property '{}'", field.name),
                            None,
                        ));
                    }
                }
                Some(value) => match value.as_str() {
                    None => errors.push(FieldError::new(field.name, "must be string", Some(value))),
                    Some(text) => {
                        for constraint in &field.constraints {
                            if let Some(message) = constraint.check(text) {
                                errors.push(FieldError::new(field.name, message, Some(value)));
                            }
                        }
                    }
                },
            }
        }

        // additionalProperties: false
        for (name, value) in object {
            if !self.fields.iter().any(|field| field.name == name.as_str()) {
                errors.push(FieldError::new(
                    "root",
                    format!("must NOT have additional property '{name}'"),
                    Some(value),
                ));
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}
