//! Template rendering
//!
//! Renders every `*.j2` file in the template directory, substituting
//! `{{ variable }}` placeholders from the resolved variable map, and writes
//! each result over the sibling file with the `.j2` suffix stripped
//! (`manifest.yml.j2` → `manifest.yml`).
//!
//! A placeholder naming a variable that was never resolved is a fatal
//! `MissingVariable` error. All templates render in memory before anything is
//! written, so a broken template never produces a partial output set.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::RenderError;

/// File suffix marking a file as a template
const TEMPLATE_SUFFIX: &str = ".j2";

/// `{{ variable }}` with optional inner whitespace
fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap())
}

/// Render all templates in `template_dir` with `variables` in scope
///
/// Returns the rendered output paths in sorted order.
pub fn render_dir(
    template_dir: &Path,
    variables: &BTreeMap<String, String>,
) -> Result<Vec<PathBuf>, RenderError> {
    let mut template_paths = Vec::new();
    let entries = std::fs::read_dir(template_dir).map_err(|source| RenderError::ListError {
        path: template_dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| RenderError::ListError {
            path: template_dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && path.to_string_lossy().ends_with(TEMPLATE_SUFFIX) {
            template_paths.push(path);
        }
    }
    template_paths.sort();

    // render everything before writing anything
    let mut outputs = Vec::new();
    for path in &template_paths {
        let content = std::fs::read_to_string(path).map_err(|source| RenderError::ReadError {
            path: path.clone(),
            source,
        })?;
        let rendered = render_str(&content, variables)
            .map_err(|variable| RenderError::missing_variable(path.clone(), variable))?;
        outputs.push((output_path(path), rendered));
    }

    let mut written = Vec::new();
    for (path, rendered) in outputs {
        std::fs::write(&path, rendered).map_err(|source| RenderError::WriteError {
            path: path.clone(),
            source,
        })?;
        written.push(path);
    }

    Ok(written)
}

/// Substitute placeholders in one template body
///
/// Returns the missing variable's name on failure.
pub fn render_str(
    template: &str,
    variables: &BTreeMap<String, String>,
) -> Result<String, String> {
    let mut missing = None;
    let rendered = placeholder_regex().replace_all(template, |captures: &regex::Captures| {
        let name = &captures[1];
        match variables.get(name) {
            Some(value) => value.clone(),
            None => {
                if missing.is_none() {
                    missing = Some(name.to_string());
                }
                String::new()
            }
        }
    });

    match missing {
        Some(variable) => Err(variable),
        None => Ok(rendered.into_owned()),
    }
}

/// Output path for a template: same directory, `.j2` suffix stripped
fn output_path(template: &Path) -> PathBuf {
    let name = template.file_name().unwrap_or_default().to_string_lossy();
    let stripped = name.strip_suffix(TEMPLATE_SUFFIX).unwrap_or(&name);
    template.with_file_name(stripped.to_string())
}
