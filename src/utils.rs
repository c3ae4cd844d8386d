//! Console presentation helpers.

use anyhow::Context as _;
use colored::Colorize;
use std::io::{self, ErrorKind, Write};

use crate::finder::PathSegment;
use crate::value::{Map, Value};

/// Strings longer than this many characters are summarized in field listings.
pub const LONG_STRING_LIMIT: usize = 100;

/// Formats a path as `a.b[0].c`.
#[must_use]
pub fn format_path(path: &[PathSegment]) -> String {
    let mut out = String::new();
    for segment in path {
        if matches!(segment, PathSegment::Field(_)) && !out.is_empty() {
            out.push('.');
        }
        out.push_str(&segment.to_string());
    }
    out
}

/// Returns the longest prefix of `text` with at most `limit` characters.
#[must_use]
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// One-line rendering of a value for field listings: long strings become
/// `<string, N chars>`, other strings print raw, everything else as compact
/// JSON.
#[must_use]
pub fn summarize(value: &Value) -> String {
    match value {
        Value::String(s) => {
            let len = s.chars().count();
            if len > LONG_STRING_LIMIT {
                format!("<string, {len} chars>")
            } else {
                s.clone()
            }
        }
        other => other.to_json().unwrap_or_default(),
    }
}

/// Writes `  key: value` for every entry of `object`, sorted by key.
///
/// # Errors
///
/// Returns an error if writing to `writer` fails.
pub fn write_field_listing<W: Write>(writer: &mut W, object: &Map) -> io::Result<()> {
    let mut keys: Vec<&str> = object.keys().collect();
    keys.sort_unstable();
    for key in keys {
        if let Some(value) = object.get(key) {
            writeln!(writer, "  {key}: {}", summarize(value))?;
        }
    }
    Ok(())
}

/// Treats a broken pipe as success so that piping into `head` or `less`
/// exits cleanly.
///
/// # Errors
///
/// Passes through every other I/O error with context attached.
pub fn ignore_broken_pipe(result: io::Result<()>) -> anyhow::Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::BrokenPipe => Ok(()),
        Err(err) => Err(err).context("write to stdout"),
    }
}

// ==============================================================================
// Colorized JSON Output
// ==============================================================================

/// Write a single match (path header + colorized JSON value) to `writer`.
///
/// # Errors
///
/// Returns an error if writing to `writer` fails.
pub fn write_colored_result<W: Write>(
    writer: &mut W,
    value: &Value,
    path: &[PathSegment],
    pretty: bool,
    show_path: bool,
) -> anyhow::Result<()> {
    let path = format_path(path);

    let result = (|| -> io::Result<()> {
        if show_path && !path.is_empty() {
            writeln!(writer, "{}:", path.bold().magenta())?;
        }
        write_colored_json(writer, value, 0, pretty)?;
        writeln!(writer)?;
        Ok(())
    })();

    ignore_broken_pipe(result)
}

/// Recursively write a JSON value with syntax highlighting.
fn write_colored_json<W: Write>(
    writer: &mut W,
    value: &Value,
    indent: usize,
    pretty: bool,
) -> io::Result<()> {
    let next_indent = indent + 2;
    let newline = |writer: &mut W, width: usize| -> io::Result<()> {
        if pretty {
            writeln!(writer)?;
            write!(writer, "{:width$}", "")?;
        }
        Ok(())
    };

    match value {
        Value::Null => write!(writer, "{}", "null".red().dimmed()),
        Value::Bool(b) => write!(writer, "{}", b.to_string().yellow().bold()),
        Value::Number(n) => write!(writer, "{}", n.to_string().yellow()),
        Value::String(s) => write!(writer, "{}", quote(s).green()),
        Value::Array(arr) => {
            write!(writer, "[")?;
            for (i, item) in arr.iter().enumerate() {
                if i > 0 {
                    write!(writer, ",")?;
                }
                newline(writer, next_indent)?;
                write_colored_json(writer, item, next_indent, pretty)?;
            }
            if !arr.is_empty() {
                newline(writer, indent)?;
            }
            write!(writer, "]")
        }
        Value::Object(obj) => {
            write!(writer, "{{")?;
            for (i, (key, val)) in obj.iter().enumerate() {
                if i > 0 {
                    write!(writer, ",")?;
                }
                newline(writer, next_indent)?;
                write!(writer, "{}", quote(key).cyan())?;
                write!(writer, "{}", if pretty { ": " } else { ":" })?;
                write_colored_json(writer, val, next_indent, pretty)?;
            }
            if !obj.is_empty() {
                newline(writer, indent)?;
            }
            write!(writer, "}}")
        }
    }
}

/// JSON-quote a string, with escaping.
fn quote(s: &str) -> String {
    // Serializing a &str cannot fail
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}
