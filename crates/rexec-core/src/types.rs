use clap::ValueEnum;
use serde::Serialize;

/// Output format for CLI responses
#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Result of dispatching one lifecycle event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Outcome {
    /// Neither the event-specific nor the fallback command is set.
    NotConfigured,
    /// The command ran but produced no value for the host.
    Empty,
    /// Trimmed stdout of a text-producing event.
    Text(String),
    /// Parsed stdout of a structured-result event.
    Structured(serde_json::Value),
}

impl Outcome {
    pub fn is_configured(&self) -> bool {
        !matches!(self, Self::NotConfigured)
    }

    /// Text result, treating empty output as absent.
    pub(crate) fn from_text(stdout: String) -> Self {
        if stdout.is_empty() {
            Self::Empty
        } else {
            Self::Text(stdout)
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_structured(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Structured(value) => Some(value),
            _ => None,
        }
    }
}

impl From<String> for Outcome {
    fn from(stdout: String) -> Self {
        Self::from_text(stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_text_is_no_value() {
        assert_eq!(Outcome::from(String::new()), Outcome::Empty);
        assert_eq!(
            Outcome::from("v2.0.0".to_string()),
            Outcome::Text("v2.0.0".to_string())
        );
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let value = serde_json::to_value(Outcome::Structured(json!({"id": 42}))).unwrap();
        assert_eq!(value, json!({"status": "structured", "value": {"id": 42}}));

        let value = serde_json::to_value(Outcome::NotConfigured).unwrap();
        assert_eq!(value, json!({"status": "not_configured"}));
    }

    #[test]
    fn test_accessors() {
        let text = Outcome::Text("notes".to_string());
        assert_eq!(text.as_text(), Some("notes"));
        assert!(text.as_structured().is_none());
        assert!(text.is_configured());
        assert!(!Outcome::NotConfigured.is_configured());
    }
}
