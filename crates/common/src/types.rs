//! Common data types for obsreport components.

use crate::error::CommonError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator between a component's type and its optional instance name.
const TYPE_AND_NAME_SEPARATOR: char = '/';

/// Identity of a pipeline component, rendered as `type` or `type/name`.
///
/// ```
/// use common::types::ComponentId;
///
/// let id: ComponentId = "otlp/internal".parse().unwrap();
/// assert_eq!(id.component_type(), "otlp");
/// assert_eq!(id.name(), Some("internal"));
/// assert_eq!(id.to_string(), "otlp/internal");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ComponentId {
    component_type: String,
    name: Option<String>,
}

impl ComponentId {
    /// Create an identifier with only a component type.
    ///
    /// # Errors
    ///
    /// Returns `CommonError::InvalidComponentId` if the type is empty or
    /// contains whitespace or the separator.
    pub fn new(component_type: impl Into<String>) -> Result<Self, CommonError> {
        let component_type = component_type.into();
        validate_segment(&component_type, "type")?;
        Ok(Self {
            component_type,
            name: None,
        })
    }

    /// Create an identifier with a component type and instance name.
    ///
    /// # Errors
    ///
    /// Returns `CommonError::InvalidComponentId` if either segment is invalid.
    pub fn with_name(
        component_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, CommonError> {
        let mut id = Self::new(component_type)?;
        let name = name.into();
        validate_segment(&name, "name")?;
        id.name = Some(name);
        Ok(id)
    }

    /// The component type (e.g. `otlp`).
    #[must_use]
    pub fn component_type(&self) -> &str {
        &self.component_type
    }

    /// The optional instance name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

fn validate_segment(segment: &str, what: &str) -> Result<(), CommonError> {
    if segment.is_empty() {
        return Err(CommonError::InvalidComponentId(format!(
            "component {what} must not be empty"
        )));
    }
    if segment
        .chars()
        .any(|c| c.is_whitespace() || c == TYPE_AND_NAME_SEPARATOR)
    {
        return Err(CommonError::InvalidComponentId(format!(
            "component {what} '{segment}' contains an invalid character"
        )));
    }
    Ok(())
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(
                f,
                "{}{TYPE_AND_NAME_SEPARATOR}{name}",
                self.component_type
            ),
            None => f.write_str(&self.component_type),
        }
    }
}

impl FromStr for ComponentId {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(TYPE_AND_NAME_SEPARATOR) {
            Some((component_type, name)) => Self::with_name(component_type, name),
            None => Self::new(s),
        }
    }
}

impl TryFrom<String> for ComponentId {
    type Error = CommonError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ComponentId> for String {
    fn from(id: ComponentId) -> Self {
        id.to_string()
    }
}

/// The kind of telemetry data carried by a receive operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Trace spans
    Traces,
    /// Metric points
    Metrics,
    /// Log records
    Logs,
}

impl DataType {
    /// All data types, in a stable order.
    pub const ALL: [DataType; 3] = [DataType::Traces, DataType::Metrics, DataType::Logs];

    /// Lowercase name used in configuration and labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            DataType::Traces => "traces",
            DataType::Metrics => "metrics",
            DataType::Logs => "logs",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "traces" => Ok(DataType::Traces),
            "metrics" => Ok(DataType::Metrics),
            "logs" => Ok(DataType::Logs),
            other => Err(CommonError::UnknownDataType(other.to_string())),
        }
    }
}
