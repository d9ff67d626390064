//! Relative-date template context and `{{variable}}` interpolation for query text.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde_json::Value;

use crate::error::{MondayError, Result};
use crate::transport::Variables;

/// Fixed context keys and how many days each lies before the base date.
pub const FIXED_KEYS: [(&str, u64); 6] = [
    ("date", 0),
    ("date_minus_1", 1),
    ("date_minus_7", 7),
    ("date_minus_30", 30),
    ("date_minus_60", 60),
    ("date_minus_90", 90),
];

const DATE_FORMAT: &str = "%Y-%m-%d";

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{([^{}]*)\}\}").expect("placeholder pattern is valid")
});

/// A base date given either as text or as an already-parsed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseDate {
    Text(String),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

impl BaseDate {
    pub fn to_date(&self) -> Result<NaiveDate> {
        match self {
            BaseDate::Date(date) => Ok(*date),
            BaseDate::DateTime(dt) => Ok(dt.date_naive()),
            BaseDate::Text(text) => parse_date(text),
        }
    }
}

impl From<&str> for BaseDate {
    fn from(text: &str) -> Self {
        BaseDate::Text(text.to_string())
    }
}

impl From<String> for BaseDate {
    fn from(text: String) -> Self {
        BaseDate::Text(text)
    }
}

impl From<NaiveDate> for BaseDate {
    fn from(date: NaiveDate) -> Self {
        BaseDate::Date(date)
    }
}

impl From<DateTime<Utc>> for BaseDate {
    fn from(dt: DateTime<Utc>) -> Self {
        BaseDate::DateTime(dt)
    }
}

fn parse_date(text: &str) -> Result<NaiveDate> {
    let trimmed = text.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.date());
    }

    Err(MondayError::InvalidDate(text.to_string()))
}

/// Variable name to string value, used to render templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateContext {
    vars: BTreeMap<String, String>,
}

impl TemplateContext {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Merge caller variables; strings are taken as-is, other values by their JSON text.
    pub fn merge_variables(&mut self, variables: &Variables) {
        for (name, value) in variables {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            self.vars.insert(name.clone(), text);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Build the fixed relative-date context for `base_date`.
pub fn generate_context(base_date: impl Into<BaseDate>) -> Result<TemplateContext> {
    let base_date = base_date.into();
    let date = base_date.to_date()?;

    let mut context = TemplateContext::default();
    for (key, days) in FIXED_KEYS {
        let shifted = date
            .checked_sub_days(Days::new(days))
            .ok_or_else(|| MondayError::InvalidDate(format!("{date} minus {days} days")))?;
        context.insert(key, shifted.format(DATE_FORMAT).to_string());
    }

    Ok(context)
}

/// Renders a template against a context.
pub trait Renderer {
    fn render(&self, template: &str, context: &TemplateContext) -> Result<String>;
}

/// Logic-less `{{name}}` substitution. Unknown names render empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderRenderer;

impl Renderer for PlaceholderRenderer {
    fn render(&self, template: &str, context: &TemplateContext) -> Result<String> {
        let mut rendered = String::with_capacity(template.len());
        let mut last = 0;

        for captures in PLACEHOLDER.captures_iter(template) {
            let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
                continue;
            };

            let literal = &template[last..whole.start()];
            check_unclosed(literal, last)?;
            rendered.push_str(literal);

            let name = name.as_str().trim();
            if name.is_empty() {
                return Err(MondayError::Interpolation(format!(
                    "empty tag at byte {}",
                    whole.start()
                )));
            }
            rendered.push_str(context.get(name).unwrap_or_default());
            last = whole.end();
        }

        let tail = &template[last..];
        check_unclosed(tail, last)?;
        rendered.push_str(tail);

        Ok(rendered)
    }
}

fn check_unclosed(literal: &str, offset: usize) -> Result<()> {
    match literal.find("{{") {
        Some(pos) => Err(MondayError::Interpolation(format!(
            "unclosed tag at byte {}",
            offset + pos
        ))),
        None => Ok(()),
    }
}

/// Replace every `{{name}}` in `template` with its value from `context`.
///
/// Absent names are not an error here; check them with [`validate`] first.
pub fn interpolate(template: &str, context: &TemplateContext) -> Result<String> {
    PlaceholderRenderer.render(template, context)
}

/// Distinct placeholder names in order of first appearance.
pub fn extract_variables(template: &str) -> impl Iterator<Item = &str> + '_ {
    let mut seen = HashSet::new();
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|captures| captures.get(1))
        .map(|name| name.as_str().trim())
        .filter(|name| !name.is_empty())
        .filter(move |name| seen.insert(*name))
}

/// Placeholder names referenced by `template` that `context` does not define.
pub fn validate<'t>(template: &'t str, context: &TemplateContext) -> Vec<&'t str> {
    extract_variables(template)
        .filter(|name| !context.contains_key(name))
        .collect()
}

/// Generate the context for `base_date`, merge `variables`, validate and render.
pub fn expand(
    template: &str,
    base_date: impl Into<BaseDate>,
    variables: Option<&Variables>,
) -> Result<String> {
    let mut context = generate_context(base_date)?;
    if let Some(variables) = variables {
        context.merge_variables(variables);
    }

    render(template, &context)
}

/// Validate `template` against `context`, then interpolate it.
pub fn render(template: &str, context: &TemplateContext) -> Result<String> {
    let missing = validate(template, context);
    if !missing.is_empty() {
        return Err(MondayError::MissingVariables {
            names: missing.into_iter().map(String::from).collect(),
        });
    }

    interpolate(template, context)
}
