//! JSON text rendering for [`Value`]

use std::fmt::Write as _;
use std::slice;

use crate::value::Value;

const INDENT: &str = "  ";

/// Render `value` as compact JSON
pub fn to_string(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, None);
    out
}

/// Render `value` as JSON indented by two spaces per level
pub fn to_string_pretty(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, Some(INDENT));
    out
}

/// Container whose items are still being written
enum Open<'a> {
    Array {
        items: slice::Iter<'a, Value>,
        first: bool,
    },
    Object {
        entries: indexmap::map::Iter<'a, String, Value>,
        first: bool,
    },
}

/// Writes `root` using an explicit stack of open containers
fn write_value(out: &mut String, root: &Value, indent: Option<&str>) {
    let mut stack: Vec<Open<'_>> = Vec::new();
    let mut next = Some(root);

    loop {
        if let Some(value) = next.take() {
            match value {
                Value::Null => out.push_str("null"),
                Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
                Value::Number(n) => {
                    if n.is_finite() {
                        let _ = write!(out, "{n}");
                    } else {
                        out.push_str("null");
                    }
                }
                Value::String(s) => write_string(out, s),
                Value::Array(arr) if arr.is_empty() => out.push_str("[]"),
                Value::Array(arr) => {
                    out.push('[');
                    stack.push(Open::Array {
                        items: arr.iter(),
                        first: true,
                    });
                }
                Value::Object(obj) if obj.is_empty() => out.push_str("{}"),
                Value::Object(obj) => {
                    out.push('{');
                    stack.push(Open::Object {
                        entries: obj.iter(),
                        first: true,
                    });
                }
            }
        }

        let depth = stack.len();
        let Some(open) = stack.last_mut() else {
            break;
        };
        let (item, first, close) = match open {
            Open::Array { items, first } => (items.next().map(|v| (None, v)), first, ']'),
            Open::Object { entries, first } => {
                (entries.next().map(|(k, v)| (Some(k), v)), first, '}')
            }
        };

        match item {
            Some((key, value)) => {
                if !std::mem::replace(first, false) {
                    out.push(',');
                }
                newline(out, indent, depth);
                if let Some(key) = key {
                    write_string(out, key);
                    out.push(':');
                    if indent.is_some() {
                        out.push(' ');
                    }
                }
                next = Some(value);
            }
            None => {
                stack.pop();
                newline(out, indent, depth.saturating_sub(1));
                out.push(close);
            }
        }
    }
}

fn newline(out: &mut String, indent: Option<&str>, level: usize) {
    if let Some(indent) = indent {
        out.push('\n');
        for _ in 0..level {
            out.push_str(indent);
        }
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x08' => out.push_str("\\b"),
            '\x0C' => out.push_str("\\f"),
            c if u32::from(c) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
