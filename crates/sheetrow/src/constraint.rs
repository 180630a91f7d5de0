use crate::coerce::FieldView;
use regex::Regex;

/// Declarative check run against a field after it has been assigned.
///
/// Except for [`Constraint::Required`], a null value passes every constraint.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Value must be present; empty text counts as absent.
    Required,
    /// Inclusive numeric bounds. Dates compare by serial number.
    Range { min: Option<f64>, max: Option<f64> },
    /// Inclusive bounds on the character count of text values.
    Length { min: Option<usize>, max: Option<usize> },
    /// The whole textual value must match `pattern`; `regex` is the anchored
    /// form actually evaluated.
    Pattern { pattern: String, regex: Regex },
    /// Textual value must equal one of the listed strings.
    OneOf(Vec<String>),
}

impl Constraint {
    pub fn required() -> Self {
        Constraint::Required
    }

    pub fn range(min: f64, max: f64) -> Self {
        Constraint::Range {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn min(min: f64) -> Self {
        Constraint::Range {
            min: Some(min),
            max: None,
        }
    }

    pub fn max(max: f64) -> Self {
        Constraint::Range {
            min: None,
            max: Some(max),
        }
    }

    pub fn length(min: usize, max: usize) -> Self {
        Constraint::Length {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn max_length(max: usize) -> Self {
        Constraint::Length {
            min: None,
            max: Some(max),
        }
    }

    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        // reject a malformed pattern on its own before wrapping it
        Regex::new(pattern)?;
        let regex = Regex::new(&format!("^(?:{pattern})$"))?;
        Ok(Constraint::Pattern {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Constraint::OneOf(values.into_iter().map(Into::into).collect())
    }

    /// Check a value; the error is a human-readable reason.
    pub fn check(&self, value: &FieldView<'_>) -> Result<(), String> {
        match self {
            Constraint::Required => match value {
                FieldView::Null => Err("value is required".to_string()),
                FieldView::Text(s) if s.is_empty() => Err("value is required".to_string()),
                _ => Ok(()),
            },
            _ if value.is_null() => Ok(()),
            Constraint::Range { min, max } => {
                let Some(n) = value.as_number() else {
                    return Err("value is not numeric".to_string());
                };
                if let Some(min) = min
                    && n < *min
                {
                    return Err(format!("{n} is below the minimum of {min}"));
                }
                if let Some(max) = max
                    && n > *max
                {
                    return Err(format!("{n} is above the maximum of {max}"));
                }
                Ok(())
            }
            Constraint::Length { min, max } => {
                let FieldView::Text(s) = value else {
                    return Err("value is not text".to_string());
                };
                let len = s.chars().count();
                if let Some(min) = min
                    && len < *min
                {
                    return Err(format!("length {len} is shorter than {min}"));
                }
                if let Some(max) = max
                    && len > *max
                {
                    return Err(format!("length {len} is longer than {max}"));
                }
                Ok(())
            }
            Constraint::Pattern { pattern, regex } => {
                let text = value.as_text().unwrap_or_default();
                if regex.is_match(&text) {
                    Ok(())
                } else {
                    Err(format!("`{text}` does not match pattern `{pattern}`"))
                }
            }
            Constraint::OneOf(allowed) => {
                let text = value.as_text().unwrap_or_default();
                if allowed.iter().any(|candidate| candidate == text.as_ref()) {
                    Ok(())
                } else {
                    Err(format!("`{text}` is not one of [{}]", allowed.join(", ")))
                }
            }
        }
    }
}
