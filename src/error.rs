use crate::dom::NodeId;
use thiserror::Error;

pub type ClockResult<T> = Result<T, ClockError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClockError {
    #[error("Node {node} not found in document")]
    NodeNotFound { node: NodeId },

    #[error("Node {node} is not an element")]
    NotAnElement { node: NodeId },

    #[error("Clock on host {host} lost its '{part}' node")]
    MissingViewNode { host: NodeId, part: &'static str },

    #[error("Clock on host {host} has been destroyed")]
    InstanceDestroyed { host: NodeId },

    #[error("XML parse error: {0}")]
    XmlError(String),

    #[error("YAML error: {0}")]
    YamlError(String),

    #[error("Invalid setting '{field}': {reason}")]
    InvalidSettings { field: String, reason: String },

    #[error("Unknown preset '{name}'")]
    UnknownPreset { name: String },

    #[error("I/O error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for ClockError {
    fn from(err: std::io::Error) -> Self {
        ClockError::IoError(err.to_string())
    }
}

impl From<roxmltree::Error> for ClockError {
    fn from(err: roxmltree::Error) -> Self {
        ClockError::XmlError(err.to_string())
    }
}

impl From<serde_yaml::Error> for ClockError {
    fn from(err: serde_yaml::Error) -> Self {
        ClockError::YamlError(err.to_string())
    }
}

/// Non-fatal problems observed while resolving, constructing or refreshing clocks.
///
/// None of these stop the shared tick loop; each one degrades a single clock.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// A host asked for a style that is not in the catalog; defaults were used.
    UnknownStyle { host: Option<NodeId>, style: String },
    /// An attribute value could not be parsed; the pre-override value was kept.
    MalformedAttribute { attribute: String, value: String },
    /// Building a clock under a host failed; the remaining hosts were still initialized.
    ConstructFailed { host: NodeId, error: ClockError },
    /// Refreshing one clock failed; the other clocks were still refreshed.
    UpdateFailed { host: NodeId, error: ClockError },
    /// The host element disappeared, so its clock was dropped from the registry.
    HostRemoved { host: NodeId },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::UnknownStyle { host: Some(host), style } => {
                write!(f, "unknown clock style '{}' on host {}", style, host)
            }
            Warning::UnknownStyle { host: None, style } => {
                write!(f, "unknown clock style '{}'", style)
            }
            Warning::MalformedAttribute { attribute, value } => {
                write!(f, "ignoring malformed value '{}' for '{}'", value, attribute)
            }
            Warning::ConstructFailed { host, error } => {
                write!(f, "failed to initialize clock on host {}: {}", host, error)
            }
            Warning::UpdateFailed { host, error } => {
                write!(f, "failed to refresh clock on host {}: {}", host, error)
            }
            Warning::HostRemoved { host } => {
                write!(f, "host {} was removed; its clock was dropped", host)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_error_conversion() {
        let err: ClockError = roxmltree::Document::parse("<a>").unwrap_err().into();
        assert!(matches!(err, ClockError::XmlError(_)));
    }

    #[test]
    fn test_warning_display() {
        let w = Warning::MalformedAttribute {
            attribute: "data-width".to_string(),
            value: "wide".to_string(),
        };
        assert_eq!(w.to_string(), "ignoring malformed value 'wide' for 'data-width'");

        let w = Warning::UnknownStyle {
            host: None,
            style: "nope".to_string(),
        };
        assert_eq!(w.to_string(), "unknown clock style 'nope'");
    }
}
