//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Per-dependency version lines with change markers
//! - Failure and warning listings with colors
//! - A one-line summary

use crate::orchestrator::RunReport;
use crate::output::{OutputFormatter, Verbosity};
use colored::Colorize;
use std::io::Write;

/// Text formatter for terminal output
pub struct TextFormatter {
    verbosity: Verbosity,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        if self.verbosity == Verbosity::Quiet {
            return format_quiet(report, writer);
        }

        for dependency in &report.resolved {
            let current = report
                .current
                .get(&dependency.name)
                .map(String::as_str)
                .unwrap_or("(none)");

            if report.changed.contains(&dependency.name) {
                writeln!(
                    writer,
                    "  {} {} {} -> {}",
                    "~".yellow().bold(),
                    dependency.name.bold(),
                    current,
                    dependency.version.green()
                )?;
                if self.verbosity == Verbosity::Verbose {
                    if let Some(ref url) = dependency.source_url {
                        writeln!(writer, "      url:    {}", url.dimmed())?;
                    }
                    if let Some(ref sha256) = dependency.sha256 {
                        writeln!(writer, "      sha256: {}", sha256.dimmed())?;
                    }
                    if let Some(ref date) = dependency.version_date {
                        writeln!(writer, "      date:   {}", date.dimmed())?;
                    }
                }
            } else if self.verbosity == Verbosity::Verbose {
                writeln!(
                    writer,
                    "  {} {} {}",
                    "=".dimmed(),
                    dependency.name,
                    dependency.version.dimmed()
                )?;
            }
        }

        for failure in &report.failures {
            writeln!(
                writer,
                "  {} {}: {}",
                "x".red().bold(),
                failure.name.bold(),
                failure.message.red()
            )?;
        }

        for warning in &report.warnings {
            writeln!(writer, "  {} {}", "!".yellow(), warning)?;
        }

        if !report.rendered.is_empty() {
            writeln!(writer)?;
            for path in &report.rendered {
                writeln!(writer, "  rendered {}", path.display())?;
            }
        }

        writeln!(writer)?;
        let summary = summary_line(report);
        writeln!(writer, "{}", summary)?;

        Ok(())
    }
}

fn format_quiet(report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
    for name in &report.changed {
        writeln!(writer, "{}", name)?;
    }
    for failure in &report.failures {
        writeln!(writer, "error: {}: {}", failure.name, failure.message)?;
    }
    Ok(())
}

fn summary_line(report: &RunReport) -> String {
    let changes = match report.changed.len() {
        0 => "everything up to date".to_string(),
        1 => "1 update".to_string(),
        n => format!("{} updates", n),
    };
    let mut line = if report.dry_run {
        format!("{} (dry run)", changes)
    } else {
        changes
    };
    if !report.failures.is_empty() {
        line = format!("{}, {} failed", line, report.failures.len());
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResolvedDependency;
    use crate::orchestrator::DescriptorFailure;
    use std::collections::{BTreeMap, BTreeSet};

    fn sample_report() -> RunReport {
        let mut app = ResolvedDependency::new("app", "1.1");
        app.source_url = Some("https://example.com/app-1.1.tar.gz".to_string());
        app.sha256 = Some("ab".repeat(32));

        RunReport {
            resolved: vec![app, ResolvedDependency::new("tool", "2.0")],
            current: BTreeMap::from([
                ("app".to_string(), "1.0".to_string()),
                ("tool".to_string(), "2.0".to_string()),
            ]),
            changed: BTreeSet::from(["app".to_string()]),
            rendered: vec![],
            failures: vec![],
            warnings: vec![],
            dry_run: false,
        }
    }

    fn render_to_string(formatter: &TextFormatter, report: &RunReport) -> String {
        let mut buffer = Vec::new();
        formatter.format(report, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_changed_dependency_shown() {
        colored::control::set_override(false);
        let output = render_to_string(&TextFormatter::new(Verbosity::Normal), &sample_report());
        assert!(output.contains("app 1.0 -> 1.1"));
        assert!(output.contains("1 update"));
        // unchanged deps are hidden at normal verbosity
        assert!(!output.contains("tool"));
    }

    #[test]
    fn test_verbose_shows_unchanged_and_details() {
        colored::control::set_override(false);
        let output = render_to_string(&TextFormatter::new(Verbosity::Verbose), &sample_report());
        assert!(output.contains("tool"));
        assert!(output.contains("sha256:"));
    }

    #[test]
    fn test_quiet_lists_changed_names_only() {
        colored::control::set_override(false);
        let output = render_to_string(&TextFormatter::new(Verbosity::Quiet), &sample_report());
        assert_eq!(output, "app\n");
    }

    #[test]
    fn test_failures_in_summary() {
        colored::control::set_override(false);
        let mut report = sample_report();
        report.failures.push(DescriptorFailure {
            name: "tool".to_string(),
            message: "no usable version candidates for 'tool'".to_string(),
        });
        let output = render_to_string(&TextFormatter::new(Verbosity::Normal), &report);
        assert!(output.contains("1 update, 1 failed"));
        assert!(output.contains("tool:"));
    }

    #[test]
    fn test_dry_run_marker() {
        colored::control::set_override(false);
        let mut report = sample_report();
        report.dry_run = true;
        let output = render_to_string(&TextFormatter::new(Verbosity::Normal), &report);
        assert!(output.contains("(dry run)"));
    }
}
