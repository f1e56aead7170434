//! The `.ABOUT` descriptor text format.
//!
//! One `field_name: value` pair per line. A line starting with a space or a
//! tab continues the previous field's value; the continuation is appended
//! with a `\n` after dropping its single leading indentation character.
//!
//! ```text
//! about_resource: about.zip
//! name: AboutCode
//! description: first line
//!  second line
//! ```

use super::diagnostic::Diagnostic;
use indexmap::IndexMap;

/// Parse descriptor text into an ordered field mapping.
///
/// Empty lines are ignored. A continuation line with no preceding field, an
/// empty field name or a duplicated field name are malformed structure and
/// fail with CRITICAL diagnostics.
pub fn parse(text: &str) -> Result<IndexMap<String, String>, Vec<Diagnostic>> {
    let mut fields: IndexMap<String, String> = IndexMap::new();
    let mut current: Option<String> = None;
    let mut errors = Vec::new();

    for (index, raw_line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
        if line.trim().is_empty() && (line.is_empty() || current.is_none()) {
            continue;
        }

        if line.starts_with(' ') || line.starts_with('\t') {
            append_continuation(&mut fields, current.as_deref(), &line[1..], line_no, &mut errors);
            continue;
        }

        match line.split_once(':') {
            Some((key, value)) => {
                let key = key.trim_end();
                if key.is_empty() {
                    errors.push(Diagnostic::critical(format!(
                        "Invalid line {line_no}: empty field name: '{line}'"
                    )));
                    current = None;
                    continue;
                }
                if fields.contains_key(key) {
                    errors.push(Diagnostic::critical(format!(
                        "Duplicate field name: '{key}' at line {line_no}"
                    )));
                    current = None;
                    continue;
                }
                fields.insert(key.to_string(), value.trim_start().to_string());
                current = Some(key.to_string());
            }
            None => {
                append_continuation(&mut fields, current.as_deref(), line, line_no, &mut errors);
            }
        }
    }

    if errors.is_empty() {
        Ok(fields)
    } else {
        Err(errors)
    }
}

fn append_continuation(
    fields: &mut IndexMap<String, String>,
    current: Option<&str>,
    rest: &str,
    line_no: usize,
    errors: &mut Vec<Diagnostic>,
) {
    match current.and_then(|key| fields.get_mut(key)) {
        Some(value) => {
            value.push('\n');
            value.push_str(rest);
        }
        None => errors.push(Diagnostic::critical(format!(
            "Invalid line {line_no}: continuation without a field: '{rest}'"
        ))),
    }
}

/// Render an ordered field mapping as descriptor text.
///
/// Multi-line values are written with every line after the first indented by
/// one space. Empty lines inside a value are kept as a lone space so they
/// survive a parse.
pub fn dump<'a, I>(fields: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut out = String::new();
    for (key, value) in fields {
        let mut lines = value.split('\n');
        out.push_str(key);
        out.push(':');
        if let Some(first) = lines.next() {
            if !first.is_empty() {
                out.push(' ');
                out.push_str(first);
            }
        }
        out.push('\n');
        for line in lines {
            out.push(' ');
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}
