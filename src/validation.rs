//! Form validation and sanitization.
//!
//! A [`ValidationChain`] is an ordered list of [`FieldChain`]s. Each field
//! chain mixes sanitizers (trim, escape, date coercion) with checks. Every
//! field reports at most one [`FieldError`]: after the first failing check the
//! remaining checks of that field are skipped, but its sanitizers still run so
//! the values echoed back on the form are always sanitized.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::Serialize;
use uuid::Uuid;
use validator::ValidateLength;

/// One submitted form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(String),
    Many(Vec<String>),
}

/// Submitted form fields in submission order. A key sent more than once
/// (checkboxes) becomes a [`FieldValue::Many`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormData(IndexMap<String, FieldValue>);

impl FormData {
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut fields: IndexMap<String, FieldValue> = IndexMap::new();
        for (key, value) in pairs {
            let (key, value) = (key.into(), value.into());
            match fields.get_mut(&key) {
                Some(FieldValue::Many(values)) => values.push(value),
                Some(FieldValue::Single(first)) => {
                    let first = std::mem::take(first);
                    fields.insert(key, FieldValue::Many(vec![first, value]));
                }
                None => {
                    fields.insert(key, FieldValue::Single(value));
                }
            }
        }
        Self(fields)
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    pub fn set(&mut self, field: &str, value: FieldValue) {
        self.0.insert(field.to_string(), value);
    }

    pub fn remove(&mut self, field: &str) {
        self.0.shift_remove(field);
    }

    /// Scalar value of a field; the first element of a list, `""` if absent.
    pub fn text(&self, field: &str) -> String {
        match self.0.get(field) {
            Some(FieldValue::Single(value)) => value.clone(),
            Some(FieldValue::Many(values)) => values.first().cloned().unwrap_or_default(),
            None => String::new(),
        }
    }

    /// Scalar value, `None` when absent or empty.
    pub fn opt_text(&self, field: &str) -> Option<String> {
        Some(self.text(field)).filter(|v| !v.is_empty())
    }

    pub fn list(&self, field: &str) -> Vec<String> {
        match self.0.get(field) {
            Some(FieldValue::Single(value)) => vec![value.clone()],
            Some(FieldValue::Many(values)) => values.clone(),
            None => Vec::new(),
        }
    }

    /// Make `field` a list: absent becomes empty, a scalar becomes a single
    /// element, a list is left alone.
    pub fn normalize_list(&mut self, field: &str) {
        let values = self.list(field);
        self.set(field, FieldValue::Many(values));
    }
}

/// A failed check, shown next to the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub value: String,
}

/// Rejected submission: the sanitized values to redisplay and the errors,
/// in chain order.
#[derive(Debug, Clone, PartialEq)]
pub struct Invalid {
    pub values: FormData,
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Clone)]
pub enum Rule {
    Trim,
    Escape,
    MinLength(u64, &'static str),
    MaxLength(u64, &'static str),
    Alphanumeric(&'static str),
    /// ISO-8601 date or date-time, coerced to `YYYY-MM-DD`
    Date(&'static str),
    Uuid(&'static str),
    OneOf(Vec<&'static str>, &'static str),
}

impl Rule {
    fn is_sanitizer(&self) -> bool {
        matches!(self, Rule::Trim | Rule::Escape)
    }

    /// Run the rule on one value, returning the (possibly rewritten) value.
    fn apply(&self, value: String) -> Result<String, &'static str> {
        match self {
            Rule::Trim => Ok(value.trim().to_string()),
            Rule::Escape => Ok(escape_html(&value)),
            Rule::MinLength(min, message) => {
                if value.validate_length(Some(*min), None, None) {
                    Ok(value)
                } else {
                    Err(*message)
                }
            }
            Rule::MaxLength(max, message) => {
                if value.validate_length(None, Some(*max), None) {
                    Ok(value)
                } else {
                    Err(*message)
                }
            }
            Rule::Alphanumeric(message) => {
                if !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric()) {
                    Ok(value)
                } else {
                    Err(*message)
                }
            }
            Rule::Date(message) => parse_date(&value)
                .map(|date| date.format("%Y-%m-%d").to_string())
                .ok_or(*message),
            Rule::Uuid(message) => match Uuid::parse_str(&value) {
                Ok(_) => Ok(value),
                Err(_) => Err(*message),
            },
            Rule::OneOf(allowed, message) => {
                if allowed.contains(&value.as_str()) {
                    Ok(value)
                } else {
                    Err(*message)
                }
            }
        }
    }
}

/// Rules for one field
#[derive(Debug, Clone)]
pub struct FieldChain {
    field: String,
    optional: bool,
    rules: Vec<Rule>,
}

/// Start a chain for `name`.
pub fn field(name: &str) -> FieldChain {
    FieldChain {
        field: name.to_string(),
        optional: false,
        rules: Vec::new(),
    }
}

impl FieldChain {
    fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn trim(self) -> Self {
        self.rule(Rule::Trim)
    }

    pub fn escape(self) -> Self {
        self.rule(Rule::Escape)
    }

    /// At least `min` characters; `not_empty` is `min_length(1, ..)`.
    pub fn min_length(self, min: u64, message: &'static str) -> Self {
        self.rule(Rule::MinLength(min, message))
    }

    pub fn not_empty(self, message: &'static str) -> Self {
        self.min_length(1, message)
    }

    pub fn max_length(self, max: u64, message: &'static str) -> Self {
        self.rule(Rule::MaxLength(max, message))
    }

    pub fn alphanumeric(self, message: &'static str) -> Self {
        self.rule(Rule::Alphanumeric(message))
    }

    pub fn date(self, message: &'static str) -> Self {
        self.rule(Rule::Date(message))
    }

    pub fn uuid(self, message: &'static str) -> Self {
        self.rule(Rule::Uuid(message))
    }

    pub fn one_of(self, allowed: Vec<&'static str>, message: &'static str) -> Self {
        self.rule(Rule::OneOf(allowed, message))
    }

    /// Empty values skip every rule and are dropped from the form.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Run the rules over every value of the field.
    fn run(&self, form: &mut FormData, errors: &mut Vec<FieldError>) {
        let current = form.get(&self.field).cloned();

        if self.optional {
            let empty = match &current {
                None => true,
                Some(FieldValue::Single(value)) => value.trim().is_empty(),
                Some(FieldValue::Many(values)) => values.iter().all(|v| v.trim().is_empty()),
            };
            if empty {
                form.remove(&self.field);
                return;
            }
        }

        let mut failed = false;
        let mut check = |value: String| -> String {
            let mut value = value;
            for rule in &self.rules {
                if failed && !rule.is_sanitizer() {
                    continue;
                }
                match rule.apply(value.clone()) {
                    Ok(next) => value = next,
                    Err(message) => {
                        failed = true;
                        errors.push(FieldError {
                            field: self.field.clone(),
                            message: message.to_string(),
                            value: value.clone(),
                        });
                    }
                }
            }
            value
        };

        let sanitized = match current {
            None => FieldValue::Single(check(String::new())),
            Some(FieldValue::Single(value)) => FieldValue::Single(check(value)),
            Some(FieldValue::Many(values)) => {
                FieldValue::Many(values.into_iter().map(&mut check).collect())
            }
        };
        form.set(&self.field, sanitized);
    }
}

/// Ordered field chains evaluated against a submitted form
#[derive(Debug, Clone, Default)]
pub struct ValidationChain {
    fields: Vec<FieldChain>,
}

impl ValidationChain {
    pub fn new(fields: Vec<FieldChain>) -> Self {
        Self { fields }
    }

    pub fn validate(&self, mut form: FormData) -> Result<FormData, Invalid> {
        let mut errors = Vec::new();
        for chain in &self.fields {
            chain.run(&mut form, &mut errors);
        }
        if errors.is_empty() {
            Ok(form)
        } else {
            Err(Invalid {
                values: form,
                errors,
            })
        }
    }
}

/// Replace HTML-significant characters with entities.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            c => out.push(c),
        }
    }
    out
}

/// Parse an ISO-8601 date (`2024-03-09`) or date-time, keeping the date part.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}
