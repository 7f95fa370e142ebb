//! Placeholder substitution against a merged context.

use serde_json::{Map, Value};

use crate::path::{lookup, parse_path};

/// Namespace templates are rendered against.
///
/// `config` holds the plugin configuration; every runtime value is layered on
/// top at the root, so a runtime value named `config` shadows it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateContext {
    root: Value,
}

impl TemplateContext {
    pub fn new(config: Value, values: &Map<String, Value>) -> Self {
        let mut root = Map::with_capacity(values.len() + 1);
        root.insert("config".to_string(), config);
        for (key, value) in values {
            root.insert(key.clone(), value.clone());
        }
        Self {
            root: Value::Object(root),
        }
    }

    pub fn from_values(values: Map<String, Value>) -> Self {
        Self {
            root: Value::Object(values),
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    /// Resolve one placeholder expression to its rendered text.
    fn resolve(&self, expr: &str) -> String {
        let Some(path) = parse_path(expr) else {
            tracing::debug!(expr, "Malformed template expression, rendering as empty");
            return String::new();
        };
        match lookup(&self.root, &path) {
            Some(value) => format_value(&value),
            None => {
                tracing::debug!(expr, "Unresolved template expression, rendering as empty");
                String::new()
            }
        }
    }
}

/// Text form of a value inside a command line.
///
/// Arrays join their elements with `,`; objects render as compact JSON.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(format_value).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Expand every `${expr}` and `<%= expr %>` placeholder in `template`.
///
/// Single pass: substituted text is never re-scanned. Unresolved expressions
/// become empty strings; an unterminated opener is copied through unchanged.
pub fn render(template: &str, context: &TemplateContext) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("\\${") {
            result.push_str("${");
            rest = after;
        } else if let Some(after) = rest.strip_prefix("${") {
            match after.find('}') {
                Some(end) => {
                    result.push_str(&context.resolve(&after[..end]));
                    rest = &after[end + 1..];
                }
                None => {
                    result.push_str(rest);
                    break;
                }
            }
        } else if let Some(after) = rest.strip_prefix("<%=") {
            match after.find("%>") {
                Some(end) => {
                    result.push_str(&context.resolve(&after[..end]));
                    rest = &after[end + 2..];
                }
                None => {
                    result.push_str(rest);
                    break;
                }
            }
        } else {
            let mut chars = rest.chars();
            if let Some(ch) = chars.next() {
                result.push(ch);
            }
            rest = chars.as_str();
        }
    }

    result
}
