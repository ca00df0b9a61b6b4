use serde::Serialize;
use std::fmt;

/// Outcome of validating one recipe property
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    pub property: String,
    pub invalid_value: Option<String>,
    pub message: Option<String>,
    pub valid: bool,
}

/// Conjunction of property validations
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Validated {
    entries: Vec<Validation>,
}

impl Validated {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn valid(property: impl Into<String>) -> Self {
        Validated {
            entries: vec![Validation {
                property: property.into(),
                invalid_value: None,
                message: None,
                valid: true,
            }],
        }
    }

    pub fn invalid(
        property: impl Into<String>,
        invalid_value: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Validated {
            entries: vec![Validation {
                property: property.into(),
                invalid_value,
                message: Some(message.into()),
                valid: false,
            }],
        }
    }

    /// Valid when the value is present and not blank
    pub fn required(property: impl Into<String>, value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.trim().is_empty() => Self::valid(property),
            other => Self::invalid(property, other.map(str::to_string), "is required"),
        }
    }

    /// Valid when `predicate` holds for `value`
    pub fn test<T: fmt::Debug>(
        property: impl Into<String>,
        message: impl Into<String>,
        value: &T,
        predicate: impl FnOnce(&T) -> bool,
    ) -> Self {
        if predicate(value) {
            Self::valid(property)
        } else {
            Self::invalid(property, Some(format!("{value:?}")), message)
        }
    }

    pub fn and(mut self, other: Validated) -> Self {
        self.entries.extend(other.entries);
        self
    }

    pub fn is_valid(&self) -> bool {
        self.entries.iter().all(|v| v.valid)
    }

    pub fn failures(&self) -> impl Iterator<Item = &Validation> {
        self.entries.iter().filter(|v| !v.valid)
    }

    /// `property: message` pairs joined for error reporting
    pub fn failure_summary(&self) -> String {
        self.failures()
            .map(|f| match &f.message {
                Some(message) => format!("{}: {}", f.property, message),
                None => f.property.clone(),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}
