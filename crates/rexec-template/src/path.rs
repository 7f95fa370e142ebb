//! Placeholder expression parsing and lookup.

use serde_json::Value;

/// One step of a lookup path such as `commits[0].message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '$'
}

/// Parse `a.b[0]["c d"]` into segments. Returns `None` for malformed input.
pub fn parse_path(expr: &str) -> Option<Vec<PathSegment>> {
    let expr = expr.trim();
    let mut segments = Vec::new();
    let mut chars = expr.chars().peekable();
    let mut expect_ident = true;

    while let Some(&ch) = chars.peek() {
        if expect_ident {
            let mut ident = String::new();
            while let Some(&c) = chars.peek() {
                if !is_ident_char(c) {
                    break;
                }
                ident.push(c);
                chars.next();
            }
            if ident.is_empty() {
                return None;
            }
            segments.push(PathSegment::Key(ident));
            expect_ident = false;
            continue;
        }

        match ch {
            '.' => {
                chars.next();
                expect_ident = true;
            }
            '[' => {
                chars.next();
                let mut inner = String::new();
                let mut closed = false;
                let mut quote: Option<char> = None;
                for c in chars.by_ref() {
                    match quote {
                        Some(q) if c == q => quote = None,
                        None if c == '"' || c == '\'' => quote = Some(c),
                        None if c == ']' => {
                            closed = true;
                            break;
                        }
                        _ => {}
                    }
                    inner.push(c);
                }
                if !closed {
                    return None;
                }
                segments.push(parse_bracket(inner.trim())?);
            }
            _ => return None,
        }
    }

    if expect_ident {
        // Empty expression or trailing dot.
        return None;
    }
    Some(segments)
}

fn parse_bracket(inner: &str) -> Option<PathSegment> {
    for quote in ['"', '\''] {
        if let Some(key) = inner
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return Some(PathSegment::Key(key.to_string()));
        }
    }
    inner.parse().ok().map(PathSegment::Index)
}

/// Walk `segments` from `root`.
///
/// Arrays and strings answer `length` when they have no such key.
pub(crate) fn lookup(root: &Value, segments: &[PathSegment]) -> Option<Value> {
    let Some((segment, rest)) = segments.split_first() else {
        return Some(root.clone());
    };
    match (segment, root) {
        (PathSegment::Key(key), Value::Object(map)) => lookup(map.get(key)?, rest),
        (PathSegment::Index(index), Value::Object(map)) => lookup(map.get(&index.to_string())?, rest),
        (PathSegment::Index(index), Value::Array(items)) => lookup(items.get(*index)?, rest),
        (PathSegment::Key(key), Value::Array(items)) => match key.parse::<usize>() {
            Ok(index) => lookup(items.get(index)?, rest),
            Err(_) if key == "length" => lookup(&Value::from(items.len()), rest),
            Err(_) => None,
        },
        (PathSegment::Key(key), Value::String(s)) if key == "length" => {
            lookup(&Value::from(s.chars().count()), rest)
        }
        _ => None,
    }
}
