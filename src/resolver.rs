//! Source URL templates
//!
//! Turns a descriptor's `source_url` template plus a chosen version into the
//! concrete download URL. Supported placeholders:
//! - `{version}` — the whole version
//! - `{version[i]}` — a single zero-based component
//! - `{version[i..j]}` — components `i` to `j` (exclusive), dot-joined; this
//!   covers upstream layouts with a `major.minor` directory segment
//! - `{{` and `}}` — literal braces
//!
//! Out-of-range components and unknown placeholder names fail with
//! `TemplateError` rather than rendering something silently wrong.

use crate::domain::Version;
use crate::error::TemplateError;

/// Substitute `version` into a URL template
pub fn resolve(template: &str, version: &Version) -> Result<String, TemplateError> {
    let mut output = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    output.push('{');
                    continue;
                }
                let mut placeholder = String::new();
                let mut closed = false;
                for inner in chars.by_ref() {
                    if inner == '}' {
                        closed = true;
                        break;
                    }
                    placeholder.push(inner);
                }
                if !closed {
                    return Err(TemplateError::malformed(template, "unterminated placeholder"));
                }
                output.push_str(&expand(&placeholder, version)?);
            }
            '}' => {
                if chars.peek() == Some(&'}') {
                    chars.next();
                    output.push('}');
                } else {
                    return Err(TemplateError::malformed(template, "unmatched '}'"));
                }
            }
            _ => output.push(c),
        }
    }

    Ok(output)
}

/// Expand one placeholder body (the text between braces)
fn expand(placeholder: &str, version: &Version) -> Result<String, TemplateError> {
    if placeholder == "version" {
        return Ok(version.to_string());
    }

    let Some(index_expr) = placeholder
        .strip_prefix("version[")
        .and_then(|rest| rest.strip_suffix(']'))
    else {
        return Err(TemplateError::UnknownPlaceholder {
            placeholder: placeholder.to_string(),
        });
    };

    if let Some((start, end)) = index_expr.split_once("..") {
        let start = parse_index(placeholder, start)?;
        let end = parse_index(placeholder, end)?;
        if end > version.len() || start >= end {
            return Err(TemplateError::ComponentOutOfRange {
                index: end.saturating_sub(1),
                version: version.to_string(),
            });
        }
        let joined = version.parts()[start..end]
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(".");
        return Ok(joined);
    }

    let index = parse_index(placeholder, index_expr)?;
    match version.component(index) {
        Some(component) => Ok(component.to_string()),
        None => Err(TemplateError::ComponentOutOfRange {
            index,
            version: version.to_string(),
        }),
    }
}

fn parse_index(placeholder: &str, text: &str) -> Result<usize, TemplateError> {
    text.parse::<usize>().map_err(|_| TemplateError::malformed(
        format!("{{{}}}", placeholder),
        format!("invalid component index '{}'", text),
    ))
}
